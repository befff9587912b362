#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use assert_cmd::Command;
use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;
use taskboard::server::AppState;
use taskboard::storage::JsonFileStore;
use taskboard::task::Task;
use tempfile::TempDir;

/// taskboard binary with the environment overrides cleared.
pub fn taskboard_cmd() -> Command {
    let mut cmd = Command::cargo_bin("taskboard").expect("binary");
    cmd.env_remove("TASKBOARD_CONFIG")
        .env_remove("TASKBOARD_DATA")
        .env_remove("RUST_LOG");
    cmd
}

/// Fixed "now" for HTTP tests: Saturday 2024-06-15, noon.
pub fn fixed_now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, 15)
        .and_then(|date| date.and_hms_opt(12, 0, 0))
        .expect("valid time")
}

/// A temp directory holding a task file.
pub struct TestBoard {
    dir: TempDir,
}

impl TestBoard {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn tasks_path(&self) -> PathBuf {
        self.dir.path().join("tasks.json")
    }

    pub fn write_tasks(&self, tasks: Value) {
        let json = serde_json::to_string_pretty(&tasks).expect("serialize tasks");
        fs::write(self.tasks_path(), json).expect("write tasks");
    }

    pub fn write_raw(&self, contents: &str) {
        fs::write(self.tasks_path(), contents).expect("write tasks");
    }

    pub fn read_tasks(&self) -> Vec<Task> {
        let contents = fs::read_to_string(self.tasks_path()).expect("read tasks");
        serde_json::from_str(&contents).expect("parse tasks")
    }

    pub fn store(&self) -> JsonFileStore {
        JsonFileStore::new(self.tasks_path())
    }

    /// taskboard running inside the board directory.
    pub fn cmd(&self) -> Command {
        let mut cmd = taskboard_cmd();
        cmd.current_dir(self.path());
        cmd
    }

    pub fn state(&self) -> AppState {
        AppState::new(Arc::new(self.store()), "urgency").with_clock(fixed_now)
    }
}
