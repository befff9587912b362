//! HTML for the list page.

use std::fmt::Write;

use chrono::NaiveDateTime;

use crate::query::{ListQuery, ALL};
use crate::task::{Task, PRIORITIES};
use crate::urgency::parse_due_date;

const STATUS_OPTIONS: [(&str, &str); 3] = [
    ("all", "All"),
    ("active", "Active"),
    ("completed", "Completed"),
];

const DUE_OPTIONS: [(&str, &str); 5] = [
    ("all", "Any time"),
    ("overdue", "Overdue"),
    ("today", "Due today"),
    ("upcoming", "Next 7 days"),
    ("no_date", "No due date"),
];

const SORT_OPTIONS: [(&str, &str); 9] = [
    ("urgency", "Urgency"),
    ("due_date", "Due date (soonest)"),
    ("due_date_desc", "Due date (latest)"),
    ("priority", "Priority (high first)"),
    ("priority_desc", "Priority (low first)"),
    ("description", "Description A-Z"),
    ("description_desc", "Description Z-A"),
    ("date_added", "Oldest first"),
    ("date_added_desc", "Newest first"),
];

const EDIT_SCRIPT: &str = r#"
function editTask(id) {
  const row = document.getElementById('task-' + id);
  const description = prompt('Description', row.dataset.description);
  if (description === null) { return; }
  const priority = prompt('Priority (High, Medium, Low)', row.dataset.priority);
  const due = prompt('Due date (YYYY-MM-DD, blank for none)', row.dataset.due);
  fetch('/edit/' + id, {
    method: 'POST',
    headers: { 'Content-Type': 'application/json' },
    body: JSON.stringify({ description: description, priority: priority, due_date: due })
  })
    .then(r => r.json())
    .then(body => body.success ? location.reload() : alert(body.error));
}
"#;

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Render the whole index page for already filtered and sorted tasks.
pub fn render_index(
    tasks: &[&Task],
    query: &ListQuery,
    default_sort: &str,
    now: NaiveDateTime,
) -> String {
    let mut html = String::new();
    html.push_str(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>Tasks</title>\n</head>\n<body>\n<h1>Tasks</h1>\n",
    );

    render_add_form(&mut html);
    render_filters(&mut html, query, default_sort);

    if tasks.is_empty() {
        html.push_str("<p class=\"empty\">No tasks match.</p>\n");
    } else {
        html.push_str("<ul class=\"tasks\">\n");
        for task in tasks {
            render_task(&mut html, task, now);
        }
        html.push_str("</ul>\n");
    }

    let _ = write!(html, "<script>{EDIT_SCRIPT}</script>\n</body>\n</html>\n");
    html
}

fn render_add_form(html: &mut String) {
    html.push_str("<form method=\"post\" action=\"/add\" class=\"add\">\n");
    html.push_str(
        "<input type=\"text\" name=\"description\" placeholder=\"New task\" required>\n",
    );
    html.push_str("<select name=\"priority\">\n");
    for priority in PRIORITIES {
        let selected = if priority == "Medium" { " selected" } else { "" };
        let _ = writeln!(html, "<option value=\"{priority}\"{selected}>{priority}</option>");
    }
    html.push_str("</select>\n<input type=\"date\" name=\"due_date\">\n");
    html.push_str("<button type=\"submit\">Add</button>\n</form>\n");
}

fn render_filters(html: &mut String, query: &ListQuery, default_sort: &str) {
    html.push_str("<form method=\"get\" action=\"/\" class=\"filters\">\n");

    let mut priority_options = vec![(ALL, "Any priority")];
    priority_options.extend(PRIORITIES.iter().map(|priority| (*priority, *priority)));
    render_select(html, "filter_priority", &priority_options, query.filter_priority());
    render_select(html, "filter_status", &STATUS_OPTIONS, query.filter_status());
    render_select(html, "filter_due", &DUE_OPTIONS, query.filter_due());
    render_select(html, "sort_by", &SORT_OPTIONS, query.sort_by(default_sort));

    html.push_str("<button type=\"submit\">Apply</button>\n</form>\n");
}

fn render_select(html: &mut String, name: &str, options: &[(&str, &str)], current: &str) {
    let _ = writeln!(html, "<select name=\"{name}\">");
    for (value, label) in options {
        let selected = if value.eq_ignore_ascii_case(current) {
            " selected"
        } else {
            ""
        };
        let _ = writeln!(html, "<option value=\"{value}\"{selected}>{label}</option>");
    }
    html.push_str("</select>\n");
}

fn render_task(html: &mut String, task: &Task, now: NaiveDateTime) {
    let overdue = !task.completed
        && task
            .due_date()
            .and_then(parse_due_date)
            .is_some_and(|due| due < now);
    let mut classes = vec!["task"];
    if task.completed {
        classes.push("completed");
    }
    if overdue {
        classes.push("overdue");
    }

    let description = escape_html(&task.description);
    let priority = escape_html(task.priority().unwrap_or(""));
    let due = escape_html(task.due_date().unwrap_or(""));

    let _ = writeln!(
        html,
        "<li id=\"task-{id}\" class=\"{classes}\" data-description=\"{description}\" \
         data-priority=\"{priority}\" data-due=\"{due}\">",
        id = task.id,
        classes = classes.join(" "),
    );
    let _ = writeln!(html, "<span class=\"description\">{description}</span>");
    if !priority.is_empty() {
        let _ = writeln!(html, "<span class=\"priority\">{priority}</span>");
    }
    if !due.is_empty() {
        let _ = writeln!(html, "<span class=\"due\">Due {due}</span>");
    }

    let toggle_label = if task.completed { "Undo" } else { "Done" };
    let _ = writeln!(
        html,
        "<form method=\"post\" action=\"/complete/{id}\"><button>{toggle_label}</button></form>",
        id = task.id
    );
    let _ = writeln!(
        html,
        "<button type=\"button\" onclick=\"editTask({id})\">Edit</button>",
        id = task.id
    );
    let _ = writeln!(
        html,
        "<form method=\"post\" action=\"/delete/{id}\"><button>Delete</button></form>",
        id = task.id
    );
    html.push_str("</li>\n");
}
