use dashboard_core::metrics::{
    completion_rate, dashboard_statistics, insight_relevance, job_match_percentage,
    overdue_count, overdue_tasks, project_progress, skill_gaps,
};
use dashboard_core::{
    Entity, EntityId, EntityMeta, MarketInsight, MarketInsightInput, Project, ProjectInput, Skill,
    SkillInput, StatsPeriod, Task, TaskInput,
};

const NOW: i64 = 1_718_000_000_000;
const DAY: i64 = 86_400_000;

fn task(id: &str, completed: bool) -> Task {
    let mut task = Task::from_input(
        EntityMeta::new(EntityId::from(id), NOW - 30 * DAY),
        TaskInput::named(id),
    );
    task.is_completed = completed;
    task
}

fn skill(name: &str, level: i64, target: i64) -> Skill {
    Skill::from_input(
        EntityMeta::new(EntityId::from(name), 0),
        SkillInput {
            level: Some(level),
            target_level: Some(target),
            ..SkillInput::named(name)
        },
    )
}

fn skills(names: &[&str]) -> Vec<Skill> {
    names.iter().map(|name| skill(name, 0, 0)).collect()
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

#[test]
fn completion_rate_is_a_rounded_share() {
    let tasks = vec![
        task("a", true),
        task("b", true),
        task("c", true),
        task("d", false),
    ];
    assert_eq!(completion_rate(&tasks), 75);
    assert_eq!(completion_rate(&tasks[..3]), 100);
    assert_eq!(completion_rate(&[]), 0);
}

#[test]
fn overdue_excludes_completed_and_undated_tasks() {
    let mut late = task("late", false);
    late.due_at = Some(NOW - DAY);
    let mut done = task("done", true);
    done.due_at = Some(NOW - DAY);
    let mut future = task("future", false);
    future.due_at = Some(NOW + DAY);
    let undated = task("undated", false);

    let tasks = vec![late, done, future, undated];
    let overdue = overdue_tasks(&tasks, NOW);
    assert_eq!(overdue.len(), 1);
    assert_eq!(overdue[0].name, "late");
    assert_eq!(overdue_count(&tasks, NOW), 1);
}

#[test]
fn project_progress_counts_only_linked_tasks() {
    let mut tasks = vec![task("a", true), task("b", false), task("c", true)];
    tasks[0].project_id = Some(EntityId::from("proj-1"));
    tasks[1].project_id = Some(EntityId::from("proj-1"));

    assert_eq!(project_progress("proj-1", &tasks), 50);
    assert_eq!(project_progress("proj-2", &tasks), 0);
}

#[test]
fn job_match_accepts_containment_either_way() {
    let user = skills(&["Rust", "PostgreSQL"]);
    assert_eq!(
        job_match_percentage(&strings(&["rust", "SQL", "Kubernetes"]), &user),
        67
    );
    assert_eq!(
        job_match_percentage(&strings(&["Rust programming"]), &user),
        100
    );
    assert_eq!(job_match_percentage(&[], &user), 0);
    assert_eq!(job_match_percentage(&strings(&["Go"]), &[]), 0);
}

#[test]
fn insight_relevance_weights_skills_growth_and_level() {
    let insight = MarketInsight::from_input(
        EntityMeta::new(EntityId::from("insight-1"), 0),
        MarketInsightInput {
            growth_rate: Some(25),
            market_level: Some(80),
            top_skills: Some(strings(&["rust", "go"])),
            ..MarketInsightInput::named("Systems programming")
        },
    );
    assert_eq!(insight_relevance(&insight, &skills(&["Rust programming"])), 59);
    assert_eq!(insight_relevance(&insight, &[]), 39);

    let shrinking = MarketInsight {
        growth_rate: -200,
        ..insight
    };
    assert_eq!(insight_relevance(&shrinking, &[]), 0);
}

#[test]
fn skill_gaps_skip_met_targets_and_sort_descending() {
    let all = vec![
        skill("small", 60, 70),
        skill("met", 90, 80),
        skill("large", 10, 90),
    ];
    let names: Vec<String> = skill_gaps(&all).into_iter().map(|skill| skill.name).collect();
    assert_eq!(names, vec!["large", "small"]);
}

#[test]
fn statistics_scope_tasks_and_projects_to_the_user() {
    let mut mine_done = task("mine-done", true);
    mine_done.assignee_id = Some("u1".to_string());
    mine_done.completed_at = Some(NOW - 2 * DAY);
    let mut mine_old = task("mine-old", true);
    mine_old.assignee_id = Some("u1".to_string());
    mine_old.completed_at = Some(NOW - 60 * DAY);
    let mut mine_late = task("mine-late", false);
    mine_late.assignee_id = Some("u1".to_string());
    mine_late.due_at = Some(NOW - DAY);
    let mut theirs = task("theirs", false);
    theirs.assignee_id = Some("u2".to_string());
    let tasks = vec![mine_done, mine_old, mine_late, theirs];

    let project = |id: &str, owner: &str, completed: bool| {
        Project::from_input(
            EntityMeta::new(EntityId::from(id), 0),
            ProjectInput {
                owner_id: Some(owner.to_string()),
                is_completed: Some(completed),
                ..ProjectInput::named(id)
            },
        )
    };
    let projects = vec![
        project("p1", "u1", false),
        project("p2", "u1", true),
        project("p3", "u2", false),
    ];
    let notes = [NOW - DAY, NOW - 3 * DAY, NOW - 40 * DAY];

    let mine = dashboard_statistics(
        &tasks,
        &projects,
        notes,
        Some("u1"),
        StatsPeriod::Month,
        NOW,
    );
    assert_eq!(mine.tasks_completed, 1);
    assert_eq!(mine.active_projects, 1);
    assert_eq!(mine.notes_created, 2);
    assert_eq!(mine.completion_rate, 67);
    assert_eq!(mine.overdue_tasks, 1);

    let week = dashboard_statistics(&tasks, &projects, notes, None, StatsPeriod::Week, NOW);
    assert_eq!(week.tasks_completed, 1);
    assert_eq!(week.active_projects, 2);
    assert_eq!(week.notes_created, 2);
    assert_eq!(week.completion_rate, 50);
}
