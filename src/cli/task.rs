//! taskboard task commands: list, add, complete, edit, delete.

use serde::Serialize;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::query::ListQuery;
use crate::storage;
use crate::task::{local_now, NewTask, Task, TaskEdit};
use crate::urgency::{calculate_urgency_score, parse_due_date};

pub struct ListOptions {
    pub priority: String,
    pub status: String,
    pub due: String,
    pub sort: Option<String>,
}

#[derive(Serialize)]
struct ListedTask<'a> {
    #[serde(flatten)]
    task: &'a Task,
    urgency: f64,
}

#[derive(Serialize)]
struct ListReport<'a> {
    total: usize,
    sort_by: &'a str,
    tasks: Vec<ListedTask<'a>>,
}

pub fn run_list(config: &Config, list: ListOptions, options: OutputOptions) -> Result<()> {
    let store = storage::open_store(&config.storage);
    let tasks = store.load()?;
    let now = local_now();

    let query = ListQuery {
        filter_priority: Some(list.priority),
        filter_status: Some(list.status),
        filter_due: Some(list.due),
        sort_by: list.sort,
    };
    let resolved = query.resolve(&config.tasks.default_sort);
    let selected = resolved.run(tasks.tasks(), now);

    let mut human = HumanOutput::new(format!(
        "{} of {} task(s), by {}",
        selected.len(),
        tasks.len(),
        resolved.sort.as_str()
    ));
    for task in &selected {
        human.push_detail(format_task_line(task));
        if let Some(warning) = due_date_warning(task) {
            human.push_warning(warning);
        }
    }

    let report = ListReport {
        total: tasks.len(),
        sort_by: resolved.sort.as_str(),
        tasks: selected
            .iter()
            .map(|task| ListedTask {
                task,
                urgency: calculate_urgency_score(task, now),
            })
            .collect(),
    };
    emit_success(options, "list", &report, Some(&human))
}

pub fn run_add(
    config: &Config,
    description: String,
    priority: Option<String>,
    due: Option<String>,
    options: OutputOptions,
) -> Result<()> {
    let store = storage::open_store(&config.storage);
    let new_task = NewTask {
        description,
        priority,
        due_date: due,
    };
    let task = storage::update(store.as_ref(), |tasks| {
        tasks.add(new_task, local_now()).cloned()
    })?;
    tracing::info!(task_id = task.id, store = %store.describe(), "task added");

    let mut human = HumanOutput::new(format!("Added task #{}", task.id));
    human.push_detail(format_task_line(&task));
    if let Some(warning) = due_date_warning(&task) {
        human.push_warning(warning);
    }
    emit_success(options, "add", &task, Some(&human))
}

pub fn run_complete(config: &Config, id: u64, options: OutputOptions) -> Result<()> {
    let store = storage::open_store(&config.storage);
    let task = storage::update(store.as_ref(), |tasks| {
        tasks
            .toggle_complete(id, local_now())
            .cloned()
            .ok_or(Error::TaskNotFound(id))
    })?;

    let verb = if task.completed { "Completed" } else { "Reopened" };
    let mut human = HumanOutput::new(format!("{verb} task #{}", task.id));
    human.push_detail(format_task_line(&task));
    emit_success(options, "complete", &task, Some(&human))
}

pub fn run_edit(
    config: &Config,
    id: u64,
    description: String,
    priority: Option<String>,
    due: Option<String>,
    options: OutputOptions,
) -> Result<()> {
    let store = storage::open_store(&config.storage);
    let edit = TaskEdit {
        description: Some(description),
        priority,
        due_date: due,
    };
    let task = storage::update(store.as_ref(), |tasks| tasks.edit(id, edit).cloned())?;

    let mut human = HumanOutput::new(format!("Edited task #{}", task.id));
    human.push_detail(format_task_line(&task));
    if let Some(warning) = due_date_warning(&task) {
        human.push_warning(warning);
    }
    emit_success(options, "edit", &task, Some(&human))
}

pub fn run_delete(config: &Config, id: u64, options: OutputOptions) -> Result<()> {
    let store = storage::open_store(&config.storage);
    storage::update(store.as_ref(), |tasks| {
        if tasks.delete(id) {
            Ok(())
        } else {
            Err(Error::TaskNotFound(id))
        }
    })?;

    #[derive(Serialize)]
    struct Deleted {
        id: u64,
    }
    let human = HumanOutput::new(format!("Deleted task #{id}"));
    emit_success(options, "delete", &Deleted { id }, Some(&human))
}

fn format_task_line(task: &Task) -> String {
    let mark = if task.completed { "x" } else { " " };
    let mut line = format!("#{} [{mark}] {}", task.id, task.description);
    let mut tags = Vec::new();
    if let Some(priority) = task.priority() {
        tags.push(priority.to_string());
    }
    if let Some(due) = task.due_date() {
        tags.push(format!("due {due}"));
    }
    if !tags.is_empty() {
        line.push_str(&format!(" ({})", tags.join(", ")));
    }
    line
}

fn due_date_warning(task: &Task) -> Option<String> {
    let due = task.due_date()?;
    if parse_due_date(due).is_some() {
        return None;
    }
    Some(format!(
        "task #{} has an unrecognised due date {due:?}; it is ranked as if undated",
        task.id
    ))
}
