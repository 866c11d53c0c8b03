use dashboard_core::{
    DateRange, Entity, EntityId, EntityMeta, FilterCriteria, FilterError, FilterOptions, Job,
    JobInput, ManualClock, Priority, SeededIds, Skill, SkillInput, Task, TaskInput, TaskService,
};
use std::rc::Rc;

const DAY: i64 = 86_400_000;

fn task(id: &str, input: TaskInput) -> Task {
    Task::from_input(EntityMeta::new(EntityId::from(id), 0), input)
}

fn fixture() -> Vec<Task> {
    vec![
        task(
            "task-1",
            TaskInput {
                description: Some("Quarterly report".to_string()),
                due_date: Some("1970-01-05".to_string()),
                priority: Some("HIGH".to_string()),
                status: Some("IN_PROGRESS".to_string()),
                category: Some("DOCUMENTATION".to_string()),
                tags: Some(vec!["finance".to_string()]),
                ..TaskInput::named("Write report")
            },
        ),
        task(
            "task-2",
            TaskInput {
                due_date: Some("1970-01-20".to_string()),
                priority: Some("HIGH".to_string()),
                status: Some("BLOCKED".to_string()),
                category: Some("DEVELOPMENT".to_string()),
                tags: Some(vec!["backend".to_string()]),
                ..TaskInput::named("Fix login")
            },
        ),
        task(
            "task-3",
            TaskInput {
                priority: Some("LOW".to_string()),
                status: Some("IN_PROGRESS".to_string()),
                category: Some("DESIGN".to_string()),
                ..TaskInput::named("Report mockups")
            },
        ),
    ]
}

fn names(tasks: &[Task]) -> Vec<&str> {
    tasks.iter().map(|task| task.name.as_str()).collect()
}

#[test]
fn union_equals_sequential_filtering() {
    let tasks = fixture();
    let cases = vec![
        (
            FilterCriteria::new().priority(Priority::High),
            FilterCriteria::new().search("report"),
        ),
        (
            FilterCriteria::new().status("in_progress"),
            FilterCriteria::new().category("design"),
        ),
        (
            FilterCriteria::new().date_range(DateRange::new(0, 10 * DAY)),
            FilterCriteria::new().tag("FINANCE"),
        ),
        (FilterCriteria::new(), FilterCriteria::new().search("fix")),
    ];

    for (first, second) in cases {
        let combined = first.clone().union(second.clone()).apply(&tasks);
        let sequential = second.apply(&first.apply(&tasks));
        assert_eq!(combined, sequential);
    }
}

#[test]
fn search_is_case_insensitive_across_fields() {
    let tasks = fixture();
    let hits = FilterCriteria::new().search("REPORT").apply(&tasks);
    assert_eq!(names(&hits), vec!["Write report", "Report mockups"]);

    let by_tag = FilterCriteria::new().search("backend").apply(&tasks);
    assert_eq!(names(&by_tag), vec!["Fix login"]);
}

#[test]
fn criteria_combine_as_logical_and() {
    let tasks = fixture();
    let hits = FilterCriteria::new()
        .status("IN_PROGRESS")
        .priority(Priority::High)
        .apply(&tasks);
    assert_eq!(names(&hits), vec!["Write report"]);
}

#[test]
fn entities_without_the_attribute_never_match() {
    let tasks = fixture();
    let dated = FilterCriteria::new()
        .date_range(DateRange::new(i64::MIN, i64::MAX))
        .apply(&tasks);
    assert_eq!(names(&dated), vec!["Write report", "Fix login"]);

    let skills = vec![Skill::from_input(
        EntityMeta::new(EntityId::from("skill-1"), 0),
        SkillInput::named("Rust"),
    )];
    assert!(FilterCriteria::new()
        .priority(Priority::Low)
        .apply(&skills)
        .is_empty());
    assert!(FilterCriteria::new().tag("rust").apply(&skills).is_empty());
}

#[test]
fn date_range_uses_each_kinds_primary_date() {
    let job = Job::from_input(
        EntityMeta::new(EntityId::from("job-1"), 0),
        JobInput {
            posted_date: Some("1970-01-03".to_string()),
            ..JobInput::titled("Rust engineer")
        },
    );
    let jobs = vec![job];
    let inside = FilterCriteria::new()
        .date_range(DateRange::new(2 * DAY, 2 * DAY))
        .apply(&jobs);
    assert_eq!(inside.len(), 1);
    let outside = FilterCriteria::new()
        .date_range(DateRange::new(3 * DAY, 4 * DAY))
        .apply(&jobs);
    assert!(outside.is_empty());
}

#[test]
fn filtering_never_mutates_the_input() {
    let tasks = fixture();
    let before = tasks.clone();
    let _ = FilterCriteria::new().search("report").apply(&tasks);
    assert_eq!(tasks, before);
}

#[test]
fn service_filters_from_json_options() {
    let service = TaskService::new(
        Rc::new(ManualClock::new(0)),
        Rc::new(SeededIds::new(11)),
        5_000,
    );
    service
        .set_initial_data(fixture())
        .expect("fixture ids are present");

    let options =
        FilterOptions::from_json_str(r#"{"priority":"HIGH","date_range":{"start":"1970-01-01","end":"1970-01-10"}}"#)
            .unwrap();
    let hits = service.filter_with(options).unwrap();
    assert_eq!(names(&hits), vec!["Write report"]);

    let bad = FilterOptions::from_json_str(r#"{"priority":"URGENT"}"#).unwrap();
    assert!(matches!(service.filter_with(bad), Err(FilterError::Invalid(_))));
    assert!(matches!(
        FilterOptions::from_json_str(r#"{"colour":"red"}"#),
        Err(FilterError::Parse(_))
    ));
}
