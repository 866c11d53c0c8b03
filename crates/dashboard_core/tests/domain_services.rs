use dashboard_core::{
    ApplicationStatus, JobInput, JobService, ManualClock, MarketInsightInput, MarketService,
    NoteInput, NoteService, ProjectInput, ProjectService, ResourceInput, ResourceService,
    SeededIds, SkillInput, SkillService, StoreError, TrendDirection, TrendFilter,
};
use std::rc::Rc;

const NOW: i64 = 1_718_000_000_000;

fn parts(seed: u64) -> (Rc<ManualClock>, Rc<SeededIds>) {
    (Rc::new(ManualClock::new(NOW)), Rc::new(SeededIds::new(seed)))
}

#[test]
fn skill_levels_are_validated_and_ranked() {
    let (clock, ids) = parts(1);
    let skills = SkillService::new(clock, ids, 5_000);

    let rust = skills
        .create(SkillInput {
            category: Some("programming".to_string()),
            level: Some(40),
            target_level: Some(90),
            market_demand: Some(95),
            ..SkillInput::named("Rust")
        })
        .unwrap();
    skills
        .create(SkillInput {
            category: Some("design".to_string()),
            level: Some(70),
            target_level: Some(80),
            market_demand: Some(50),
            ..SkillInput::named("Figma")
        })
        .unwrap();

    let err = skills
        .update_skill_level(rust.meta.id.as_str(), 140)
        .unwrap_err();
    match err {
        StoreError::Validation(validation) => assert!(validation.has_field("level")),
        other => panic!("expected validation error, got {other:?}"),
    }

    let updated = skills.update_skill_level(rust.meta.id.as_str(), 60).unwrap();
    assert_eq!(updated.level, 60);
    assert_eq!(updated.gap(), 30);

    let by_demand: Vec<String> = skills
        .sorted_by_market_demand()
        .into_iter()
        .map(|skill| skill.name)
        .collect();
    assert_eq!(by_demand, vec!["Rust", "Figma"]);
    let gaps: Vec<String> = skills.skill_gaps().into_iter().map(|skill| skill.name).collect();
    assert_eq!(gaps, vec!["Rust", "Figma"]);
    assert_eq!(skills.skills_by_category("design").unwrap().len(), 1);
    assert!(skills.skills_by_category(" ").is_err());
}

#[test]
fn resources_form_a_tree_and_keep_module_counts_consistent() {
    let (clock, ids) = parts(2);
    let resources = ResourceService::new(clock, ids, 5_000);

    let course = resources
        .create(ResourceInput {
            resource_type: Some("course".to_string()),
            modules: Some(10),
            completed_modules: Some(4),
            ..ResourceInput::named("Rust course")
        })
        .unwrap();
    let chapter = resources
        .create(ResourceInput {
            parent_id: Some(course.meta.id.to_string()),
            ..ResourceInput::named("Ownership")
        })
        .unwrap();

    let roots = resources.resource_children(None);
    assert_eq!(roots.len(), 1);
    assert_eq!(roots[0].meta.id, course.meta.id);
    let children = resources.resource_children(Some(course.meta.id.as_str()));
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].meta.id, chapter.meta.id);
    assert_eq!(chapter.resource_type, "resource");

    let err = resources
        .update(
            course.meta.id.as_str(),
            ResourceInput {
                modules: Some(3),
                completed_modules: Some(5),
                ..ResourceInput::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));

    for partial in [
        ResourceInput {
            completed_modules: Some(12),
            ..ResourceInput::default()
        },
        ResourceInput {
            modules: Some(2),
            ..ResourceInput::default()
        },
    ] {
        match resources.update(course.meta.id.as_str(), partial).unwrap_err() {
            StoreError::Validation(validation) => {
                assert!(validation.has_field("completed_modules"))
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }
    let stored = resources.get_by_id(course.meta.id.as_str()).unwrap();
    assert_eq!((stored.modules, stored.completed_modules), (10, 4));

    let shrunk = resources
        .update(
            course.meta.id.as_str(),
            ResourceInput {
                modules: Some(2),
                completed_modules: Some(2),
                ..ResourceInput::default()
            },
        )
        .unwrap();
    assert_eq!(shrunk.completed_modules, 2);

    assert!(resources
        .create(ResourceInput {
            completed_modules: Some(1),
            ..ResourceInput::named("No modules yet")
        })
        .is_err());

    let progressed = resources
        .update_resource_progress(course.meta.id.as_str(), 55)
        .unwrap();
    assert_eq!(progressed.progress, 55);
    assert!(resources
        .update_resource_progress(course.meta.id.as_str(), -1)
        .is_err());
}

fn insight(name: &str, trend: &str, growth: i64, source: &str, updated: &str) -> MarketInsightInput {
    MarketInsightInput {
        category: Some("engineering".to_string()),
        trend: Some(trend.to_string()),
        growth_rate: Some(growth),
        source_type: Some(source.to_string()),
        last_updated: Some(updated.to_string()),
        ..MarketInsightInput::named(name)
    }
}

#[test]
fn market_insights_rank_hot_trends_and_filter_by_source() {
    let (clock, ids) = parts(3);
    let insights = MarketService::new(clock, ids, 5_000);

    insights
        .create(insight("Rust", "rising", 30, "report", "2024-06-01"))
        .unwrap();
    insights
        .create(insight("WebAssembly", "upward", 45, "news", "2024-05-01"))
        .unwrap();
    let cobol = insights
        .create(insight("COBOL", "declining", -10, "news", "2024-06-05"))
        .unwrap();
    insights
        .update(
            cobol.meta.id.as_str(),
            MarketInsightInput {
                is_starred: Some(true),
                ..MarketInsightInput::default()
            },
        )
        .unwrap();

    let hot: Vec<String> = insights
        .hot_skills(5)
        .into_iter()
        .map(|insight| insight.name)
        .collect();
    assert_eq!(hot, vec!["WebAssembly", "Rust"]);
    assert_eq!(insights.hot_skills(1).len(), 1);

    let news = insights
        .filter_trends(&TrendFilter {
            source_type: Some("news".to_string()),
            start: Some("2024-06-01".to_string()),
            ..TrendFilter::default()
        })
        .unwrap();
    assert_eq!(news.len(), 1);
    assert_eq!(news[0].name, "COBOL");

    let all = insights
        .filter_trends(&TrendFilter {
            source_type: Some("all".to_string()),
            ..TrendFilter::default()
        })
        .unwrap();
    assert_eq!(all.len(), 3);

    let starred = insights
        .filter_trends(&TrendFilter {
            source_type: Some("starred".to_string()),
            ..TrendFilter::default()
        })
        .unwrap();
    assert_eq!(starred.len(), 1);
    assert_eq!(insights.starred_insights().len(), 1);

    assert!(insights
        .filter_trends(&TrendFilter {
            end: Some("yesterday".to_string()),
            ..TrendFilter::default()
        })
        .is_err());

    let declining = insights.insights_by_trend("declining").unwrap();
    assert_eq!(declining[0].trend, TrendDirection::Declining);
    assert!(insights.insights_by_trend("sideways").is_err());
    assert_eq!(insights.insights_by_category("engineering").unwrap().len(), 3);
}

#[test]
fn jobs_toggle_star_and_track_application_status() {
    let (clock, ids) = parts(4);
    let jobs = JobService::new(clock, ids, 5_000);

    let job = jobs
        .create(JobInput {
            company: Some("Ferrous".to_string()),
            required_skills: Some(vec!["Rust".to_string()]),
            ..JobInput::titled("Backend engineer")
        })
        .unwrap();
    assert_eq!(job.application_status, ApplicationStatus::NotApplied);

    let starred = jobs.toggle_star(job.meta.id.as_str()).unwrap();
    assert!(starred.is_starred);
    assert_eq!(jobs.starred_jobs().len(), 1);
    let unstarred = jobs.toggle_star(job.meta.id.as_str()).unwrap();
    assert!(!unstarred.is_starred);
    assert!(jobs.starred_jobs().is_empty());

    let applied = jobs
        .update_application_status(job.meta.id.as_str(), ApplicationStatus::Interviewing)
        .unwrap();
    assert_eq!(applied.application_status, ApplicationStatus::Interviewing);

    assert!(matches!(
        jobs.toggle_star("job-missing"),
        Err(StoreError::NotFound { .. })
    ));
    assert!(jobs
        .create(JobInput {
            application_status: Some("ghosted".to_string()),
            ..JobInput::titled("Frontend")
        })
        .is_err());
}

#[test]
fn projects_are_queried_by_owner_department_and_activity() {
    let (clock, ids) = parts(5);
    let projects = ProjectService::new(clock, ids, 5_000);

    let launch = projects
        .create(ProjectInput {
            owner_id: Some("u1".to_string()),
            department: Some("Engineering".to_string()),
            ..ProjectInput::named("Launch")
        })
        .unwrap();
    projects
        .create(ProjectInput {
            owner_id: Some("u1".to_string()),
            is_completed: Some(true),
            ..ProjectInput::named("Archive")
        })
        .unwrap();
    projects
        .create(ProjectInput {
            owner_id: Some("u2".to_string()),
            department: Some("Design".to_string()),
            ..ProjectInput::named("Rebrand")
        })
        .unwrap();

    assert_eq!(projects.projects_by_owner("u1").unwrap().len(), 2);
    assert_eq!(projects.active_projects(Some("u1")).len(), 1);
    assert_eq!(projects.active_projects(None).len(), 2);
    assert_eq!(projects.projects_by_department("Engineering").unwrap().len(), 1);
    assert!(projects.projects_by_department("").is_err());

    let progressed = projects.update_progress(launch.meta.id.as_str(), 40).unwrap();
    assert_eq!(progressed.progress, 40);
    assert!(projects.update_progress(launch.meta.id.as_str(), 101).is_err());
}

#[test]
fn notes_are_searched_tagged_and_listed_by_recency() {
    let (clock, ids) = parts(6);
    let notes = NoteService::new(clock.clone(), ids, 5_000);

    let first = notes
        .create(NoteInput {
            tags: Some(vec!["Rust".to_string()]),
            ..NoteInput::new("Borrowing", "References must not outlive owners.")
        })
        .unwrap();
    clock.advance(1_000);
    notes
        .create(NoteInput::new("Groceries", "milk, eggs"))
        .unwrap();
    clock.advance(1_000);
    notes
        .update(first.meta.id.as_str(), NoteInput::new("Borrowing rules", ""))
        .unwrap();

    let recent: Vec<String> = notes
        .recent_notes(5)
        .into_iter()
        .map(|note| note.title)
        .collect();
    assert_eq!(recent, vec!["Borrowing rules", "Groceries"]);
    assert_eq!(notes.recent_notes(1).len(), 1);

    assert_eq!(notes.search_notes("EGGS").unwrap().len(), 1);
    assert_eq!(notes.notes_by_tag(" RUST ").unwrap().len(), 1);
    assert!(notes.search_notes("").is_err());
}
