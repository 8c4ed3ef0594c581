mod commands;
mod logging;
mod progress;

use std::path::Path;
use std::process;

use anyhow::Context;
use clap::{CommandFactory, Parser};
use colored::*;
use commands::{Cli, Commands};
use disparity_core::{AppConfig, DisparityEngine, ResultRecord};
use dotenv::dotenv;
use progress::CliReporter;
use tracing::{error, info};

fn main() {
    dotenv().ok();

    let _guard = logging::init_logger();

    let args = Cli::parse();

    let config = match disparity_core::config::load_configuration(&args.settings.overrides()) {
        Ok(config) => config,
        Err(err) => {
            error!("Error loading configuration: {}", err);
            process::exit(1);
        }
    };

    match args.command {
        Some(Commands::Compare { report }) => {
            if let Err(err) = run_compare(&config, report.as_deref()) {
                error!("Error: {:#}", err);
            }
        }
        Some(Commands::Snapshots) => {
            if let Err(err) = run_snapshots(&config) {
                error!("Error: {:#}", err);
            }
        }
        Some(Commands::PrintConfig) => {
            println!("Configuration: {:#?}", config);
        }
        None => {
            let _ = Cli::command().print_long_help();
        }
    }
}

fn run_compare(config: &AppConfig, report: Option<&Path>) -> anyhow::Result<()> {
    let engine = DisparityEngine::new(config.clone());
    let reporter = CliReporter::new();
    let result = engine.run(&reporter)?;

    let records: Vec<ResultRecord> = result.outcomes.iter().map(ResultRecord::from).collect();
    println!();
    for record in &records {
        let mark = if record.success { "✓".green() } else { "✗".red() };
        println!("{} {} {}", mark, record.source_path, record.message.dimmed());
    }

    info!(
        "{} compared, {} failed in {}",
        format!("{}", result.success_count()).green(),
        format!("{}", result.failure_count()).red(),
        format!("{:.2}s", result.compare_duration.as_secs_f64()).cyan(),
    );
    if let Some(prune) = &result.prune {
        info!(
            "{} snapshot directories pruned",
            format!("{}", prune.removed.len()).cyan()
        );
    }

    if let Some(path) = report {
        write_report(path, &records)?;
        info!("Report written to {}", path.display());
    }

    Ok(())
}

fn run_snapshots(config: &AppConfig) -> anyhow::Result<()> {
    let engine = DisparityEngine::new(config.clone());
    let snapshots = engine.snapshots()?;
    let endpoints = disparity_core::snapshot::select_endpoints(&snapshots, config.single_snapshot);

    for snapshot in &snapshots {
        let role = match &endpoints {
            Some(ends) if ends.oldest.path == snapshot.path && ends.newest.path == snapshot.path => {
                "oldest+newest".yellow()
            }
            Some(ends) if ends.oldest.path == snapshot.path => "oldest".green(),
            Some(ends) if ends.newest.path == snapshot.path => "newest".green(),
            _ => "".normal(),
        };
        let when = snapshot
            .timestamp
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_default();
        println!("{:<30} {:<20} {}", snapshot.name, when, role);
    }

    if endpoints.is_none() {
        println!("{}", "No snapshot endpoints to compare".red());
    }

    Ok(())
}

fn write_report(path: &Path, records: &[ResultRecord]) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating report {}", path.display()))?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}
