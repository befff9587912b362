use taskboard::output::{format_human, HumanOutput};

#[test]
fn format_human_includes_sections() {
    let mut human = HumanOutput::new("2 of 3 task(s), by urgency");
    human.push_summary("store", "tasks.json");
    human.push_detail("#1 [ ] water plants (Low)");
    human.push_warning("task #2 has an unrecognised due date");

    let rendered = format_human(&human);
    assert!(rendered.starts_with("2 of 3 task(s), by urgency"));
    assert!(rendered.contains("- store: tasks.json"));
    assert!(rendered.contains("Tasks:"));
    assert!(rendered.contains("- #1 [ ] water plants (Low)"));
    assert!(rendered.contains("Warnings:"));
}

#[test]
fn format_human_omits_empty_sections() {
    let human = HumanOutput::new("Deleted task #4");
    assert_eq!(format_human(&human), "Deleted task #4");
}
