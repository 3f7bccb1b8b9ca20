#![allow(dead_code)]

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

pub const SLOT: &str = "myDailyTasks";

pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("temp dir"),
        }
    }

    pub fn store_path(&self) -> PathBuf {
        self.dir.path().join("storage.json")
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.path().join("config.json")
    }

    fn command(&self) -> Command {
        let mut command = Command::new(env!("CARGO_BIN_EXE_dailytasks"));
        command
            .env("DAILYTASKS_STORE_PATH", self.store_path())
            .env("DAILYTASKS_CONFIG_PATH", self.config_path())
            .env_remove("DAILYTASKS_DISABLE_NOTIFICATIONS")
            .env_remove("DAILYTASKS_LOG");
        command
    }

    pub fn run(&self, args: &[&str]) -> Output {
        self.command()
            .args(args)
            .stdin(Stdio::null())
            .output()
            .expect("failed to run dailytasks")
    }

    pub fn run_with_input(&self, args: &[&str], input: &str) -> Output {
        let mut child = self
            .command()
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .expect("failed to spawn dailytasks");

        {
            let stdin = child.stdin.as_mut().expect("stdin");
            stdin
                .write_all(input.as_bytes())
                .expect("failed to write to stdin");
        }

        child
            .wait_with_output()
            .expect("failed to read dailytasks output")
    }

    pub fn write_tasks(&self, tasks: serde_json::Value) {
        write_slot(&self.store_path(), &tasks.to_string());
    }

    pub fn write_config(&self, config: serde_json::Value) {
        std::fs::write(self.config_path(), config.to_string()).expect("write config");
    }

    pub fn tasks(&self) -> serde_json::Value {
        let raw = std::fs::read_to_string(self.store_path()).expect("store written");
        let envelope: serde_json::Value = serde_json::from_str(&raw).expect("store json");
        let slot = envelope["slots"][SLOT].as_str().expect("slot string");
        serde_json::from_str(slot).expect("slot json")
    }
}

pub fn write_slot(path: &Path, value: &str) {
    let content = serde_json::json!({
        "schema_version": 1,
        "slots": { SLOT: value }
    });
    std::fs::write(path, serde_json::to_string_pretty(&content).unwrap()).unwrap();
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}
