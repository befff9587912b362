//! Task persistence.
//!
//! The collection is always handled whole: a request loads every task,
//! changes what it needs in memory and writes every task back.
//!
//! ```text
//! tasks.json         # JSON array, 2-space indent
//! tasks.json.lock    # only with `storage.lock = true`
//! ```

use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::config::{StorageBackend, StorageConfig};
use crate::error::{Error, Result};
use crate::lock::{self, FileLock};
use crate::task::{Task, TaskList};

/// Somewhere a task list can be read from and written to in full.
pub trait TaskStore: Send + Sync {
    fn load(&self) -> Result<TaskList>;

    fn save(&self, tasks: &TaskList) -> Result<()>;

    /// Held across a load-modify-save cycle. Stores without locking return
    /// `None`, leaving concurrent writers to overwrite each other.
    fn write_guard(&self) -> Result<Option<FileLock>> {
        Ok(None)
    }

    /// Short human label for logs.
    fn describe(&self) -> String;
}

/// Load, apply `change`, and save. Nothing is written if `change` fails.
pub fn update<S, T, F>(store: &S, change: F) -> Result<T>
where
    S: TaskStore + ?Sized,
    F: FnOnce(&mut TaskList) -> Result<T>,
{
    let _guard = store.write_guard()?;
    let mut tasks = store.load()?;
    let outcome = change(&mut tasks)?;
    store.save(&tasks)?;
    Ok(outcome)
}

/// Build the store named by `[storage]`.
pub fn open_store(config: &StorageConfig) -> Arc<dyn TaskStore> {
    match config.backend {
        StorageBackend::File => Arc::new(JsonFileStore::from_config(config)),
        StorageBackend::Memory => Arc::new(MemoryStore::seeded()),
    }
}

/// A single JSON file holding every task.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    atomic_write: bool,
    lock: bool,
    lock_timeout_ms: u64,
}

impl JsonFileStore {
    /// Plain rewrite, no lock.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            atomic_write: false,
            lock: false,
            lock_timeout_ms: lock::DEFAULT_LOCK_TIMEOUT_MS,
        }
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        Self {
            path: config.path.clone(),
            atomic_write: config.atomic_write,
            lock: config.lock,
            lock_timeout_ms: config.lock_timeout_ms,
        }
    }

    pub fn with_atomic_write(mut self, enabled: bool) -> Self {
        self.atomic_write = enabled;
        self
    }

    pub fn with_lock(mut self, enabled: bool, timeout_ms: u64) -> Self {
        self.lock = enabled;
        self.lock_timeout_ms = timeout_ms;
        self
    }
}

impl TaskStore for JsonFileStore {
    fn load(&self) -> Result<TaskList> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "task file missing, starting empty");
            return Ok(TaskList::default());
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(TaskList::default());
        }
        let tasks: Vec<Task> = serde_json::from_str(&content)?;
        tracing::debug!(path = %self.path.display(), count = tasks.len(), "loaded tasks");
        Ok(TaskList::new(tasks))
    }

    fn save(&self, tasks: &TaskList) -> Result<()> {
        let json = serde_json::to_string_pretty(tasks.tasks())?;
        if self.atomic_write {
            lock::write_atomic(&self.path, json.as_bytes())?;
        } else {
            if let Some(parent) = self.path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }
            fs::write(&self.path, json)?;
        }
        tracing::debug!(
            path = %self.path.display(),
            count = tasks.len(),
            atomic = self.atomic_write,
            "saved tasks"
        );
        Ok(())
    }

    fn write_guard(&self) -> Result<Option<FileLock>> {
        if !self.lock {
            return Ok(None);
        }
        FileLock::acquire(lock::lock_path_for(&self.path), self.lock_timeout_ms).map(Some)
    }

    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }
}

/// Process-local list. Lost on exit.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tasks: Mutex<TaskList>,
}

impl MemoryStore {
    pub fn new(tasks: TaskList) -> Self {
        Self {
            tasks: Mutex::new(tasks),
        }
    }

    /// Starts with the three sample tasks.
    pub fn seeded() -> Self {
        Self::new(TaskList::sample())
    }

    fn guard(&self) -> Result<std::sync::MutexGuard<'_, TaskList>> {
        self.tasks
            .lock()
            .map_err(|_| Error::OperationFailed("task list mutex poisoned".to_string()))
    }
}

impl TaskStore for MemoryStore {
    fn load(&self) -> Result<TaskList> {
        Ok(self.guard()?.clone())
    }

    fn save(&self, tasks: &TaskList) -> Result<()> {
        *self.guard()? = tasks.clone();
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
