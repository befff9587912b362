//! Task records and the in-memory collection they live in.
//!
//! The whole collection is loaded, mutated and written back as a unit by
//! [`crate::storage`]; nothing here touches the filesystem.

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Priorities the UI offers. Stored values are free-form.
pub const PRIORITIES: [&str; 3] = ["High", "Medium", "Low"];

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: u64,
    pub description: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
    /// Fields written by other tools, kept so a rewrite does not drop them.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Task {
    pub fn new(id: u64, description: impl Into<String>) -> Self {
        Self {
            id,
            description: description.into(),
            completed: false,
            priority: None,
            due_date: None,
            created_at: None,
            completed_at: None,
            extra: Map::new(),
        }
    }

    /// The due date, treating a blank string as no deadline.
    pub fn due_date(&self) -> Option<&str> {
        non_blank(self.due_date.as_deref())
    }

    pub fn priority(&self) -> Option<&str> {
        self.priority.as_deref()
    }
}

/// Fields accepted when creating a task.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewTask {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
}

/// Fields accepted when editing a task.
///
/// An absent priority leaves the stored one alone and a blank one clears it.
/// An absent or blank due date clears it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskEdit {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
}

/// An ordered collection of tasks, in storage order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskList {
    tasks: Vec<Task>,
}

impl TaskList {
    pub fn new(tasks: Vec<Task>) -> Self {
        Self { tasks }
    }

    /// The seed list used by the in-memory backend.
    pub fn sample() -> Self {
        let mut done = Task::new(3, "Apply to jobs");
        done.completed = true;
        Self::new(vec![
            Task::new(1, "Learn Flask basics"),
            Task::new(2, "Build web task manager"),
            done,
        ])
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: u64) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    fn get_mut(&mut self, id: u64) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|task| task.id == id)
    }

    /// One past the largest id in use, or 1 for an empty list.
    pub fn next_id(&self) -> u64 {
        self.tasks.iter().map(|task| task.id).max().unwrap_or(0) + 1
    }

    /// Append a new task stamped with `now`.
    pub fn add(&mut self, new_task: NewTask, now: NaiveDateTime) -> Result<&Task> {
        let description = validate_description(&new_task.description)?;
        let mut task = Task::new(self.next_id(), description);
        task.priority = non_blank(new_task.priority.as_deref()).map(str::to_string);
        task.due_date = non_blank(new_task.due_date.as_deref()).map(str::to_string);
        task.created_at = Some(timestamp(now));
        self.tasks.push(task);
        Ok(&self.tasks[self.tasks.len() - 1])
    }

    /// Flip completion. Returns `None` when no task has this id.
    pub fn toggle_complete(&mut self, id: u64, now: NaiveDateTime) -> Option<&Task> {
        let task = self.get_mut(id)?;
        task.completed = !task.completed;
        if task.completed {
            task.completed_at = Some(timestamp(now));
        } else {
            task.completed_at = None;
        }
        Some(&*task)
    }

    /// Apply an edit. The description is checked before the id is looked up.
    pub fn edit(&mut self, id: u64, edit: TaskEdit) -> Result<&Task> {
        let description = validate_description(edit.description.as_deref().unwrap_or(""))?;
        let task = self.get_mut(id).ok_or(Error::TaskNotFound(id))?;
        task.description = description;
        if let Some(priority) = edit.priority {
            task.priority = non_blank(Some(priority.as_str())).map(str::to_string);
        }
        task.due_date = non_blank(edit.due_date.as_deref()).map(str::to_string);
        Ok(&*task)
    }

    /// Remove a task. Returns whether anything was removed.
    pub fn delete(&mut self, id: u64) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.id != id);
        self.tasks.len() != before
    }
}

/// Wall-clock time in the server's zone. Stored dates carry no offset.
pub fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

pub fn timestamp(now: NaiveDateTime) -> String {
    now.format(TIMESTAMP_FORMAT).to_string()
}

fn validate_description(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Error::EmptyDescription);
    }
    Ok(trimmed.to_string())
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}
