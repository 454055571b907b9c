#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the daily earthquake map bot.
//!
//! With no subcommand it runs the pipeline for yesterday (UTC), which is
//! what the daily scheduler invokes.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use daily_quakes_cli::BotConfig;
use daily_quakes_cli::config::DEFAULT_CONFIG_PATH;
use daily_quakes_cli::pipeline::{self, PipelineError, PublishTarget, RunOptions};
use daily_quakes_fetch::UsgsSource;
use daily_quakes_publish::{Credentials, Publisher, XPublisher};
use daily_quakes_quake_models::EventWindow;
use daily_quakes_run_log::{RunLogger, RunOutcome};

#[derive(Parser)]
#[command(name = "daily_quakes", about = "Daily global earthquake map bot")]
struct Cli {
    /// Path to the TOML config file (default: `daily_quakes.toml` if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch, render, and publish one day of earthquakes
    Run {
        /// UTC day to report on (YYYY-MM-DD). Defaults to yesterday.
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Render and save artifacts without publishing
        #[arg(long)]
        dry_run: bool,
        /// Publish even if the day was already published
        #[arg(long)]
        force: bool,
    },
    /// Show the most recent run records
    History {
        /// Number of records to show
        #[arg(long, default_value = "10")]
        limit: usize,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    daily_quakes_cli_utils::init_logger();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => BotConfig::load(path)?,
        None => BotConfig::load_optional(Path::new(DEFAULT_CONFIG_PATH))?,
    };
    let logger = RunLogger::new(&config.paths.run_log);

    let command = cli.command.unwrap_or(Commands::Run {
        date: None,
        dry_run: false,
        force: false,
    });

    match command {
        Commands::Run {
            date,
            dry_run,
            force,
        } => {
            let date = date.unwrap_or_else(|| EventWindow::previous_day(Utc::now()).date);
            let options = RunOptions { date, force };
            run(&config, &logger, options, dry_run).await
        }
        Commands::History { limit } => {
            history(&logger, limit)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn run(
    config: &BotConfig,
    logger: &RunLogger,
    options: RunOptions,
    dry_run: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let source = match UsgsSource::new(
        config.fetch.endpoint.clone(),
        Duration::from_secs(config.fetch.timeout_secs),
    ) {
        Ok(source) => source.with_min_magnitude(config.fetch.min_magnitude),
        Err(e) => {
            let record = pipeline::setup_failure(options.date, PipelineError::from(e));
            logger.append(&record)?;
            return Ok(ExitCode::FAILURE);
        }
    };

    let target = if dry_run || !config.publish.enabled {
        PublishTarget::DryRun
    } else {
        publish_target(config)
    };

    let record = pipeline::run(config, &source, target, logger, options).await?;

    Ok(match record.outcome {
        RunOutcome::Failure => ExitCode::FAILURE,
        RunOutcome::Success | RunOutcome::PartialFailure => ExitCode::SUCCESS,
    })
}

fn publish_target(config: &BotConfig) -> PublishTarget {
    let publisher = Credentials::from_env().and_then(|credentials| {
        XPublisher::new(
            credentials,
            Duration::from_secs(config.publish.timeout_secs),
        )
    });

    match publisher {
        Ok(publisher) => {
            let publisher: Box<dyn Publisher> = Box::new(publisher.with_endpoints(
                config.publish.media_upload_url.clone(),
                config.publish.create_post_url.clone(),
            ));
            PublishTarget::Live(publisher)
        }
        Err(e) => PublishTarget::Unavailable(e),
    }
}

fn history(logger: &RunLogger, limit: usize) -> Result<(), Box<dyn std::error::Error>> {
    let records = logger.read_all()?;
    if records.is_empty() {
        println!("No runs recorded in {}", logger.path().display());
        return Ok(());
    }

    println!(
        "{:<21} {:<11} {:<16} {:>6}  MESSAGE",
        "FINISHED", "DATE", "OUTCOME", "EVENTS"
    );
    println!("{}", "-".repeat(80));
    for record in records.iter().skip(records.len().saturating_sub(limit)) {
        let events = record
            .event_count
            .map_or_else(|| "-".to_string(), |n| n.to_string());
        println!(
            "{:<21} {:<11} {:<16} {:>6}  {}",
            record.timestamp.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
            record.target_date.to_string(),
            record.outcome.as_ref(),
            events,
            record.message
        );
    }
    Ok(())
}
