#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::TempDir;

/// Isolated sandbox for CLI tests: a temp directory holding the task
/// storage file (and optionally a config file), wired up via env vars.
pub struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn store_path(&self) -> PathBuf {
        self.dir.path().join("tasks.json")
    }

    pub fn write_store(&self, contents: &str) -> std::io::Result<()> {
        fs::write(self.store_path(), contents)
    }

    pub fn read_store(&self) -> std::io::Result<String> {
        fs::read_to_string(self.store_path())
    }

    pub fn write_config(&self, contents: &str) -> std::io::Result<PathBuf> {
        let path = self.dir.path().join("config.toml");
        fs::write(&path, contents)?;
        Ok(path)
    }

    /// A command pointed at this sandbox's storage file.
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("taskpad").expect("taskpad binary");
        cmd.current_dir(self.dir.path());
        cmd.env("TASKPAD_STORE", self.store_path());
        cmd.env_remove("TASKPAD_CONFIG");
        cmd
    }
}

/// Run `taskpad add --json` and return the new task's id.
pub fn add_task(sandbox: &Sandbox, text: &str) -> String {
    let output = sandbox
        .cmd()
        .args(["add", text, "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let value: serde_json::Value = serde_json::from_slice(&output).expect("json envelope");
    value["data"]["task"]["id"]
        .as_str()
        .expect("task id")
        .to_string()
}
