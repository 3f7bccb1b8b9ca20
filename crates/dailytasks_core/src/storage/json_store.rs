use crate::error::AppError;
use crate::storage::Storage;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const SCHEMA_VERSION: u32 = 1;
pub const STORE_ENV_VAR: &str = "DAILYTASKS_STORE_PATH";
const STORE_FILE_NAME: &str = "storage.json";

#[derive(Debug, Serialize, Deserialize)]
struct StoredSlots {
    schema_version: u32,
    #[serde(default)]
    slots: BTreeMap<String, String>,
}

impl StoredSlots {
    fn fresh() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            slots: BTreeMap::new(),
        }
    }
}

enum Envelope {
    Missing,
    Parsed(StoredSlots),
    Unparseable(String),
}

/// Resolves the storage file: env override, then the configured path, then the
/// per-user default location.
pub fn store_path(configured: Option<&Path>) -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var(STORE_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    if let Some(path) = configured {
        return Ok(path.to_path_buf());
    }

    if cfg!(windows) {
        let appdata =
            std::env::var("APPDATA").map_err(|_| AppError::invalid_data("APPDATA is not set"))?;
        Ok(PathBuf::from(appdata)
            .join("dailytasks")
            .join(STORE_FILE_NAME))
    } else {
        let home = std::env::var("HOME").map_err(|_| AppError::invalid_data("HOME is not set"))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("dailytasks")
            .join(STORE_FILE_NAME))
    }
}

/// A single JSON file holding every slot. Each write rewrites the whole file.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_envelope(&self) -> Result<Envelope, AppError> {
        if !self.path.exists() {
            return Ok(Envelope::Missing);
        }

        let content = std::fs::read_to_string(&self.path)
            .map_err(|err| AppError::io(format!("{}: {}", self.path.display(), err)))?;
        Ok(match serde_json::from_str::<StoredSlots>(&content) {
            Ok(stored) => Envelope::Parsed(stored),
            Err(err) => Envelope::Unparseable(format!(
                "invalid JSON in {}: {}",
                self.path.display(),
                err
            )),
        })
    }

    fn check_version(stored: StoredSlots) -> Result<StoredSlots, AppError> {
        if !(1..=SCHEMA_VERSION).contains(&stored.schema_version) {
            return Err(AppError::invalid_data(format!(
                "schema_version mismatch: found {}, supported up to {}",
                stored.schema_version, SCHEMA_VERSION
            )));
        }
        Ok(stored)
    }

    fn read_slots(&self) -> Result<StoredSlots, AppError> {
        match self.read_envelope()? {
            Envelope::Missing => Ok(StoredSlots::fresh()),
            Envelope::Parsed(stored) => Self::check_version(stored),
            Envelope::Unparseable(reason) => Err(AppError::invalid_data(reason)),
        }
    }

    // Only a file that is not JSON at all gets replaced; a well-formed file from
    // another schema version is left untouched.
    fn read_slots_for_write(&self) -> Result<StoredSlots, AppError> {
        match self.read_envelope()? {
            Envelope::Missing => Ok(StoredSlots::fresh()),
            Envelope::Parsed(stored) => Self::check_version(stored),
            Envelope::Unparseable(reason) => {
                warn!(path = %self.path.display(), %reason, "replacing unreadable storage file");
                Ok(StoredSlots::fresh())
            }
        }
    }

    fn write_slots(&self, stored: &StoredSlots) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(stored)
            .map_err(|err| AppError::invalid_data(err.to_string()))?;
        std::fs::write(&self.path, content)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&self.path, permissions)?;
        }

        debug!(path = %self.path.display(), slots = stored.slots.len(), "storage file written");
        Ok(())
    }
}

impl Storage for JsonFileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        Ok(self.read_slots()?.slots.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), AppError> {
        let mut stored = self.read_slots_for_write()?;
        stored.schema_version = SCHEMA_VERSION;
        stored.slots.insert(key.to_string(), value.to_string());
        self.write_slots(&stored)
    }
}
