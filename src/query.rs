//! The listing pipeline: filter chain, then a stable sort.
//!
//! Query values arrive as loose strings from the URL. Unknown filter values
//! mean "all"; an unknown sort key falls back to id order.

use std::cmp::Ordering;

use chrono::{Duration, NaiveDateTime};
use serde::Deserialize;

use crate::task::Task;
use crate::urgency::{calculate_urgency_score, parse_due_date};

pub const ALL: &str = "all";
pub const DEFAULT_SORT: &str = "urgency";

/// How far ahead the "upcoming" bucket looks.
const UPCOMING_DAYS: i64 = 7;

/// Raw listing parameters as they appear in the query string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub filter_priority: Option<String>,
    #[serde(default)]
    pub filter_status: Option<String>,
    #[serde(default)]
    pub filter_due: Option<String>,
    #[serde(default)]
    pub sort_by: Option<String>,
}

impl ListQuery {
    pub fn filter_priority(&self) -> &str {
        value_or(&self.filter_priority, ALL)
    }

    pub fn filter_status(&self) -> &str {
        value_or(&self.filter_status, ALL)
    }

    pub fn filter_due(&self) -> &str {
        value_or(&self.filter_due, ALL)
    }

    pub fn sort_by<'a>(&'a self, default_sort: &'a str) -> &'a str {
        value_or(&self.sort_by, default_sort)
    }

    /// Parse into typed stages. `default_sort` applies when `sort_by` is unset.
    pub fn resolve(&self, default_sort: &str) -> TaskQuery {
        TaskQuery {
            priority: PriorityFilter::parse(self.filter_priority()),
            status: StatusFilter::parse(self.filter_status()),
            due: DueFilter::parse(self.filter_due()),
            sort: SortKey::parse(self.sort_by(default_sort)),
        }
    }
}

fn value_or<'a>(value: &'a Option<String>, fallback: &'a str) -> &'a str {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(fallback)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PriorityFilter {
    All,
    /// Lowercased priority to match.
    Exactly(String),
}

impl PriorityFilter {
    pub fn parse(raw: &str) -> Self {
        let lowered = raw.to_lowercase();
        if lowered == ALL {
            PriorityFilter::All
        } else {
            PriorityFilter::Exactly(lowered)
        }
    }

    fn matches(&self, task: &Task) -> bool {
        match self {
            PriorityFilter::All => true,
            PriorityFilter::Exactly(wanted) => task
                .priority()
                .is_some_and(|priority| priority.to_lowercase() == *wanted),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    All,
    Completed,
    Active,
}

impl StatusFilter {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "completed" => StatusFilter::Completed,
            "active" => StatusFilter::Active,
            _ => StatusFilter::All,
        }
    }

    fn matches(self, task: &Task) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Completed => task.completed,
            StatusFilter::Active => !task.completed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueFilter {
    All,
    Overdue,
    Today,
    Upcoming,
    NoDate,
}

impl DueFilter {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "overdue" => DueFilter::Overdue,
            "today" => DueFilter::Today,
            "upcoming" => DueFilter::Upcoming,
            "no_date" => DueFilter::NoDate,
            _ => DueFilter::All,
        }
    }

    /// The overdue, today and upcoming buckets do not cover every dated task:
    /// anything more than a week out is in none of them.
    fn matches(self, task: &Task, now: NaiveDateTime) -> bool {
        match self {
            DueFilter::All => true,
            DueFilter::NoDate => task.due_date().is_none(),
            DueFilter::Overdue => {
                !task.completed && parsed_due(task).is_some_and(|due| due < now)
            }
            DueFilter::Today => parsed_due(task).is_some_and(|due| due.date() == now.date()),
            DueFilter::Upcoming => parsed_due(task).is_some_and(|due| {
                now <= due && due <= now + Duration::days(UPCOMING_DAYS)
            }),
        }
    }
}

fn parsed_due(task: &Task) -> Option<NaiveDateTime> {
    task.due_date().and_then(parse_due_date)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Urgency,
    DueDate,
    DueDateDesc,
    Priority,
    PriorityDesc,
    Description,
    DescriptionDesc,
    DateAdded,
    DateAddedDesc,
    Id,
}

impl SortKey {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "urgency" => SortKey::Urgency,
            "due_date" => SortKey::DueDate,
            "due_date_desc" => SortKey::DueDateDesc,
            "priority" => SortKey::Priority,
            "priority_desc" => SortKey::PriorityDesc,
            "description" => SortKey::Description,
            "description_desc" => SortKey::DescriptionDesc,
            "date_added" => SortKey::DateAdded,
            "date_added_desc" => SortKey::DateAddedDesc,
            _ => SortKey::Id,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::Urgency => "urgency",
            SortKey::DueDate => "due_date",
            SortKey::DueDateDesc => "due_date_desc",
            SortKey::Priority => "priority",
            SortKey::PriorityDesc => "priority_desc",
            SortKey::Description => "description",
            SortKey::DescriptionDesc => "description_desc",
            SortKey::DateAdded => "date_added",
            SortKey::DateAddedDesc => "date_added_desc",
            SortKey::Id => "id",
        }
    }

    /// Stable sort in place.
    pub fn sort(self, tasks: &mut Vec<&Task>, now: NaiveDateTime) {
        match self {
            SortKey::Urgency => {
                let mut scored: Vec<(f64, &Task)> = tasks
                    .iter()
                    .map(|task| (calculate_urgency_score(task, now), *task))
                    .collect();
                scored.sort_by(|left, right| left.0.total_cmp(&right.0));
                *tasks = scored.into_iter().map(|(_, task)| task).collect();
            }
            SortKey::DueDate => {
                tasks.sort_by(|left, right| missing_last(left.due_date(), right.due_date(), false))
            }
            SortKey::DueDateDesc => {
                tasks.sort_by(|left, right| missing_last(left.due_date(), right.due_date(), true))
            }
            SortKey::Priority => {
                tasks.sort_by_key(|task| priority_rank(task.priority()));
            }
            SortKey::PriorityDesc => {
                tasks.sort_by(|left, right| {
                    priority_rank(right.priority()).cmp(&priority_rank(left.priority()))
                });
            }
            SortKey::Description => {
                tasks.sort_by_cached_key(|task| task.description.to_lowercase());
            }
            SortKey::DescriptionDesc => {
                tasks.sort_by(|left, right| {
                    right
                        .description
                        .to_lowercase()
                        .cmp(&left.description.to_lowercase())
                });
            }
            SortKey::DateAdded => {
                tasks.sort_by(|left, right| created_key(left).cmp(created_key(right)));
            }
            SortKey::DateAddedDesc => {
                tasks.sort_by(|left, right| created_key(right).cmp(created_key(left)));
            }
            SortKey::Id => tasks.sort_by_key(|task| task.id),
        }
    }
}

/// High, Medium, Low, then anything else.
fn priority_rank(priority: Option<&str>) -> usize {
    match priority {
        Some("High") => 0,
        Some("Medium") => 1,
        Some("Low") => 2,
        _ => 3,
    }
}

fn created_key(task: &Task) -> &str {
    task.created_at.as_deref().unwrap_or("")
}

/// Compare optional date strings with `None` after every present value,
/// whichever direction the present values run.
fn missing_last(left: Option<&str>, right: Option<&str>, descending: bool) -> Ordering {
    match (left, right) {
        (Some(left), Some(right)) if descending => right.cmp(left),
        (Some(left), Some(right)) => left.cmp(right),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// A parsed listing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskQuery {
    pub priority: PriorityFilter,
    pub status: StatusFilter,
    pub due: DueFilter,
    pub sort: SortKey,
}

impl TaskQuery {
    /// Filter then sort, borrowing from `tasks`.
    pub fn run<'a>(&self, tasks: &'a [Task], now: NaiveDateTime) -> Vec<&'a Task> {
        let mut selected: Vec<&Task> = tasks
            .iter()
            .filter(|task| self.priority.matches(task))
            .filter(|task| self.status.matches(task))
            .filter(|task| self.due.matches(task, now))
            .collect();
        self.sort.sort(&mut selected, now);
        selected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 15)
            .and_then(|date| date.and_hms_opt(12, 0, 0))
            .expect("valid time")
    }

    fn task(id: u64, priority: Option<&str>, due_date: Option<&str>) -> Task {
        let mut task = Task::new(id, format!("task {id}"));
        task.priority = priority.map(str::to_string);
        task.due_date = due_date.map(str::to_string);
        task
    }

    fn ids(tasks: &[&Task]) -> Vec<u64> {
        tasks.iter().map(|task| task.id).collect()
    }

    fn query(filter_due: &str, sort_by: &str) -> TaskQuery {
        ListQuery {
            filter_due: Some(filter_due.to_string()),
            sort_by: Some(sort_by.to_string()),
            ..ListQuery::default()
        }
        .resolve(DEFAULT_SORT)
    }

    #[test]
    fn defaults_resolve_to_all_and_urgency() {
        let resolved = ListQuery::default().resolve(DEFAULT_SORT);
        assert_eq!(resolved.priority, PriorityFilter::All);
        assert_eq!(resolved.status, StatusFilter::All);
        assert_eq!(resolved.due, DueFilter::All);
        assert_eq!(resolved.sort, SortKey::Urgency);
    }

    #[test]
    fn priority_sort_groups_and_keeps_input_order() {
        let tasks = vec![
            task(1, Some("Low"), None),
            task(2, Some("urgent"), None),
            task(3, Some("High"), None),
            task(4, Some("Medium"), None),
            task(5, Some("High"), None),
            task(6, None, None),
            task(7, Some("Low"), None),
        ];
        let sorted = query(ALL, "priority").run(&tasks, now());
        assert_eq!(ids(&sorted), vec![3, 5, 4, 1, 7, 2, 6]);

        let sorted = query(ALL, "priority_desc").run(&tasks, now());
        assert_eq!(ids(&sorted), vec![2, 6, 1, 7, 4, 3, 5]);
    }

    #[test]
    fn priority_filter_is_case_insensitive() {
        let tasks = vec![
            task(1, Some("High"), None),
            task(2, Some("high"), None),
            task(3, Some("Low"), None),
            task(4, None, None),
        ];
        let resolved = ListQuery {
            filter_priority: Some("HIGH".to_string()),
            sort_by: Some("id".to_string()),
            ..ListQuery::default()
        }
        .resolve(DEFAULT_SORT);
        assert_eq!(ids(&resolved.run(&tasks, now())), vec![1, 2]);
    }

    #[test]
    fn status_filter_splits_on_completed() {
        let mut done = task(2, None, None);
        done.completed = true;
        let tasks = vec![task(1, None, None), done];

        let active = ListQuery {
            filter_status: Some("active".to_string()),
            ..ListQuery::default()
        }
        .resolve(DEFAULT_SORT);
        assert_eq!(ids(&active.run(&tasks, now())), vec![1]);

        let completed = ListQuery {
            filter_status: Some("completed".to_string()),
            ..ListQuery::default()
        }
        .resolve(DEFAULT_SORT);
        assert_eq!(ids(&completed.run(&tasks, now())), vec![2]);
    }

    #[test]
    fn due_buckets_leave_far_deadlines_uncovered() {
        let mut done_late = task(6, None, Some("2024-06-01"));
        done_late.completed = true;
        let tasks = vec![
            task(1, None, Some("2024-06-10")),
            task(2, None, Some("2024-06-15T18:00")),
            task(3, None, Some("2024-06-20")),
            task(4, None, Some("2024-07-30")),
            task(5, None, None),
            done_late,
            task(7, None, Some("not a date")),
        ];

        assert_eq!(ids(&query("overdue", "id").run(&tasks, now())), vec![1]);
        assert_eq!(ids(&query("today", "id").run(&tasks, now())), vec![2]);
        assert_eq!(ids(&query("upcoming", "id").run(&tasks, now())), vec![2, 3]);
        assert_eq!(ids(&query("no_date", "id").run(&tasks, now())), vec![5]);
        assert_eq!(ids(&query("sometime", "id").run(&tasks, now())).len(), 7);
    }

    #[test]
    fn tomorrow_is_upcoming_not_today() {
        let tasks = vec![task(1, Some("High"), Some("2024-06-16T12:00"))];
        assert_eq!(ids(&query("upcoming", "id").run(&tasks, now())), vec![1]);
        assert!(query("today", "id").run(&tasks, now()).is_empty());
    }

    #[test]
    fn due_date_sorts_put_missing_last_both_ways() {
        let tasks = vec![
            task(1, None, None),
            task(2, None, Some("2024-06-20")),
            task(3, None, Some("2024-06-18")),
            task(4, None, None),
        ];
        assert_eq!(ids(&query(ALL, "due_date").run(&tasks, now())), vec![3, 2, 1, 4]);
        assert_eq!(ids(&query(ALL, "due_date_desc").run(&tasks, now())), vec![2, 3, 1, 4]);
    }

    #[test]
    fn urgency_orders_overdue_first_and_completed_last() {
        let mut done = task(1, Some("High"), Some("2024-06-01"));
        done.completed = true;
        let tasks = vec![
            done,
            task(2, Some("Low"), None),
            task(3, Some("Medium"), Some("2024-06-17T12:00")),
            task(4, Some("High"), Some("2024-06-10T12:00")),
        ];
        assert_eq!(ids(&query(ALL, "urgency").run(&tasks, now())), vec![4, 3, 2, 1]);
    }

    #[test]
    fn description_sorts_ignore_case() {
        let mut tasks = vec![task(1, None, None), task(2, None, None), task(3, None, None)];
        tasks[0].description = "banana".to_string();
        tasks[1].description = "Apple".to_string();
        tasks[2].description = "cherry".to_string();
        assert_eq!(ids(&query(ALL, "description").run(&tasks, now())), vec![2, 1, 3]);
        assert_eq!(
            ids(&query(ALL, "description_desc").run(&tasks, now())),
            vec![3, 1, 2]
        );
    }

    #[test]
    fn date_added_sorts_by_created_string() {
        let mut tasks = vec![task(1, None, None), task(2, None, None), task(3, None, None)];
        tasks[0].created_at = Some("2024-06-02T10:00:00.000000".to_string());
        tasks[1].created_at = Some("2024-06-01T10:00:00.000000".to_string());
        assert_eq!(ids(&query(ALL, "date_added").run(&tasks, now())), vec![3, 2, 1]);
        assert_eq!(ids(&query(ALL, "date_added_desc").run(&tasks, now())), vec![1, 2, 3]);
    }

    #[test]
    fn unknown_sort_falls_back_to_id() {
        let tasks = vec![task(3, None, None), task(1, None, None), task(2, None, None)];
        assert_eq!(ids(&query(ALL, "colour").run(&tasks, now())), vec![1, 2, 3]);
    }
}
