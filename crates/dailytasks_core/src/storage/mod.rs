use crate::error::AppError;
use std::collections::HashMap;

pub mod json_store;

pub use json_store::{JsonFileStorage, store_path};

/// Key-value backend holding string slots, in the manner of browser local storage.
pub trait Storage {
    fn get(&self, key: &str) -> Result<Option<String>, AppError>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), AppError>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    slots: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_slot(key: &str, value: &str) -> Self {
        let mut storage = Self::default();
        storage.slots.insert(key.to_string(), value.to_string());
        storage
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        Ok(self.slots.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), AppError> {
        self.slots.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{MemoryStorage, Storage};

    #[test]
    fn memory_storage_overwrites() {
        let mut storage = MemoryStorage::new();
        assert_eq!(storage.get("slot").unwrap(), None);

        storage.set("slot", "one").unwrap();
        storage.set("slot", "two").unwrap();
        assert_eq!(storage.get("slot").unwrap().as_deref(), Some("two"));
        assert_eq!(storage.get("other").unwrap(), None);
    }
}
