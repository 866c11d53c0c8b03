//! CLI smoke entry point.
//!
//! # Responsibility
//! - Build an `AppContext` from `DASHBOARD_CONFIG` (or defaults), optionally
//!   seeded from the JSON file given as first argument.
//! - Print deterministic `key=value` summary lines for quick sanity checks.

use dashboard_core::{init_logging, AppContext, CoreConfig, SeedData, StatsPeriod};
use log::info;
use std::process::ExitCode;

/// Optional path to a `CoreConfig` JSON file.
const CONFIG_ENV: &str = "DASHBOARD_CONFIG";

fn main() -> ExitCode {
    match run(std::env::args().nth(1)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(seed_path: Option<String>) -> Result<(), String> {
    let config = match std::env::var_os(CONFIG_ENV) {
        Some(path) => CoreConfig::load(&path).map_err(|err| err.to_string())?,
        None => CoreConfig::default(),
    };
    if let Some(log_dir) = config.log_dir.as_deref() {
        init_logging(&config.log_level, log_dir).map_err(|err| err.to_string())?;
    }

    let context = AppContext::new(config);
    if let Some(path) = seed_path {
        let seed = SeedData::load(&path).map_err(|err| err.to_string())?;
        context.seed(seed).map_err(|err| err.to_string())?;
        info!("event=cli_seed module=cli status=ok");
    }

    let stats = context.statistics(None, StatsPeriod::Month);
    println!("dashboard_core version={}", dashboard_core::core_version());
    println!(
        "entities tasks={} projects={} notes={} skills={} resources={} insights={} jobs={}",
        context.tasks().len(),
        context.projects().len(),
        context.notes().len(),
        context.skills().len(),
        context.resources().len(),
        context.insights().len(),
        context.jobs().len()
    );
    println!(
        "statistics period=month tasks_completed={} active_projects={} notes_created={} completion_rate={} overdue_tasks={}",
        stats.tasks_completed,
        stats.active_projects,
        stats.notes_created,
        stats.completion_rate,
        stats.overdue_tasks
    );
    Ok(())
}
