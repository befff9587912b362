//! Urgency scoring.
//!
//! Lower scores are more urgent. The score only orders the list; it is never
//! shown as a number in the page.

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime};

use crate::task::Task;

/// Score for completed tasks, past anything an open task can reach.
pub const COMPLETED_SCORE: f64 = 9999.0;

/// Tasks due within this many days get the compressed slope.
const SOON_DAYS: i64 = 3;

const NAIVE_FORMATS: [&str; 6] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Base score for a priority: High=1, Medium=2, Low=3, anything else 2.
pub fn priority_base(priority: Option<&str>) -> f64 {
    match priority {
        Some("High") => 1.0,
        Some("Low") => 3.0,
        _ => 2.0,
    }
}

/// Parse a stored due date into local wall-clock time.
///
/// Date-only values mean midnight. Values carrying an offset are moved into
/// the local zone. Anything else is `None`.
pub fn parse_due_date(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|parsed| parsed.with_timezone(&Local).naive_local())
        })
}

/// Whole days from `now` until `due`, floored.
///
/// A deadline six hours ago is day -1, not day 0.
pub fn days_until(due: NaiveDateTime, now: NaiveDateTime) -> i64 {
    let delta = due - now;
    let days = delta.num_days();
    if delta < Duration::days(days) {
        days - 1
    } else {
        days
    }
}

pub fn calculate_urgency_score(task: &Task, now: NaiveDateTime) -> f64 {
    if task.completed {
        return COMPLETED_SCORE;
    }

    let base = priority_base(task.priority());
    let Some(due) = task.due_date().and_then(parse_due_date) else {
        return base * 100.0;
    };

    let days = days_until(due, now);
    if days < 0 {
        base - days.unsigned_abs() as f64 * 0.1
    } else if days <= SOON_DAYS {
        base + days as f64 * 0.5
    } else {
        base + days as f64
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

    fn task(priority: Option<&str>, due_date: Option<&str>) -> Task {
        let mut task = Task::new(1, "t");
        task.priority = priority.map(str::to_string);
        task.due_date = due_date.map(str::to_string);
        task
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn completed_is_sentinel_regardless_of_fields() {
        for due in [None, Some("2024-06-01"), Some("garbage")] {
            for priority in [None, Some("High"), Some("Low"), Some("urgent")] {
                let mut t = task(priority, due);
                t.completed = true;
                assert_eq!(calculate_urgency_score(&t, now()), 9999.0);
            }
        }
    }

    #[test]
    fn no_due_date_scales_base() {
        assert_close(calculate_urgency_score(&task(Some("High"), None), now()), 100.0);
        assert_close(calculate_urgency_score(&task(Some("Medium"), None), now()), 200.0);
        assert_close(calculate_urgency_score(&task(Some("Low"), None), now()), 300.0);
        assert_close(calculate_urgency_score(&task(None, None), now()), 200.0);
        assert_close(calculate_urgency_score(&task(Some("high"), None), now()), 200.0);
    }

    #[test]
    fn overdue_high_five_days() {
        let t = task(Some("High"), Some("2024-06-10T12:00:00"));
        assert_close(calculate_urgency_score(&t, now()), 0.5);
    }

    #[test]
    fn medium_due_in_two_days() {
        let t = task(Some("Medium"), Some("2024-06-17T12:00:00"));
        assert_close(calculate_urgency_score(&t, now()), 3.0);
    }

    #[test]
    fn far_deadline_adds_whole_days() {
        let t = task(Some("Low"), Some("2024-06-25T12:00:00"));
        assert_close(calculate_urgency_score(&t, now()), 13.0);
    }

    #[test]
    fn earlier_today_counts_as_one_day_overdue() {
        // Midnight today is twelve hours before `now`.
        let t = task(Some("Medium"), Some("2024-06-15"));
        assert_eq!(days_until(parse_due_date("2024-06-15").expect("date"), now()), -1);
        assert_close(calculate_urgency_score(&t, now()), 1.9);
    }

    #[test]
    fn malformed_due_date_falls_back() {
        let t = task(Some("Low"), Some("next tuesday"));
        assert_close(calculate_urgency_score(&t, now()), 300.0);
        let blank = task(Some("High"), Some("   "));
        assert_close(calculate_urgency_score(&blank, now()), 100.0);
    }

    #[test]
    fn parses_common_forms() {
        assert!(parse_due_date("2024-06-20").is_some());
        assert!(parse_due_date("2024-06-20T08:15").is_some());
        assert!(parse_due_date("2024-06-20T08:15:30").is_some());
        assert!(parse_due_date("2024-06-20T08:15:30.123456").is_some());
        assert!(parse_due_date("2024-06-20 08:15:30").is_some());
        assert!(parse_due_date("2024-06-20T08:15:30+02:00").is_some());
        assert!(parse_due_date("20/06/2024").is_none());
        assert!(parse_due_date("").is_none());
    }
}
