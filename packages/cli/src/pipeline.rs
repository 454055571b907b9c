//! The daily run: fetch, aggregate, render, publish, and record.
//!
//! Stages run strictly in order. The first failing stage stops the run;
//! whatever happened, exactly one [`RunRecord`] is appended to the run log
//! before [`run`] returns.

use chrono::{NaiveDate, Utc};
use daily_quakes_cli_utils::{timed, timed_blocking};
use daily_quakes_fetch::{EventSource, FetchError};
use daily_quakes_publish::{Post, PostId, PublishError, Publisher};
use daily_quakes_quake_models::EventWindow;
use daily_quakes_render::RenderError;
use daily_quakes_run_log::{POSTED_PREFIX, RunLogError, RunLogger, RunOutcome, RunRecord};
use strum_macros::Display;

use crate::artifacts;
use crate::config::BotConfig;

/// Pipeline stage, used to tag failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Stage {
    /// Downloading the day's events.
    Fetching,
    /// Computing the daily summary.
    Aggregating,
    /// Drawing the map and caption.
    Rendering,
    /// Submitting the post.
    Publishing,
    /// Appending the run record.
    Logging,
}

/// A stage failure.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The event catalog could not be read.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The map could not be drawn.
    #[error(transparent)]
    Render(#[from] RenderError),

    /// The post could not be published.
    #[error(transparent)]
    Publish(#[from] PublishError),

    /// The run record could not be written.
    #[error(transparent)]
    RunLog(#[from] RunLogError),
}

impl PipelineError {
    /// The stage that failed.
    #[must_use]
    pub const fn stage(&self) -> Stage {
        match self {
            Self::Fetch(_) => Stage::Fetching,
            Self::Render(_) => Stage::Rendering,
            Self::Publish(_) => Stage::Publishing,
            Self::RunLog(_) => Stage::Logging,
        }
    }
}

/// Where the finished post goes.
pub enum PublishTarget {
    /// Skip publishing (`--dry-run` or `publish.enabled = false`).
    DryRun,
    /// Publish through this publisher.
    Live(Box<dyn Publisher>),
    /// Publishing was requested but the publisher could not be set up
    /// (e.g., missing credentials). Fails the run at the publishing stage.
    Unavailable(PublishError),
}

/// What to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    /// The UTC day to report on.
    pub date: NaiveDate,
    /// Publish even if the run log shows a post for `date` already went out.
    pub force: bool,
}

/// Result of a run that reached the end.
struct Completed {
    event_count: usize,
    post_id: Option<PostId>,
    malformed: usize,
    artifact_error: Option<artifacts::ArtifactError>,
}

impl Completed {
    fn into_record(self, date: NaiveDate) -> RunRecord {
        let mut message = match &self.post_id {
            Some(id) => format!("{POSTED_PREFIX}{id}"),
            None => "dry run".to_string(),
        };
        if self.malformed > 0 {
            message.push_str(&format!("; skipped {} malformed records", self.malformed));
        }

        let outcome = match &self.artifact_error {
            Some(e) => {
                message.push_str(&format!("; artifacts not saved: {e}"));
                RunOutcome::PartialFailure
            }
            None => RunOutcome::Success,
        };

        RunRecord::new(Utc::now(), date, outcome, Some(self.event_count), message)
    }
}

/// A failed run: the error plus the event count if it was known.
struct Failed {
    error: PipelineError,
    event_count: Option<usize>,
}

impl Failed {
    fn new(error: impl Into<PipelineError>, event_count: Option<usize>) -> Self {
        Self {
            error: error.into(),
            event_count,
        }
    }

    fn into_record(self, date: NaiveDate) -> RunRecord {
        let stage = self.error.stage();
        log::error!("{stage} failed: {}", self.error);
        RunRecord::new(
            Utc::now(),
            date,
            RunOutcome::Failure,
            self.event_count,
            format!("{stage} failed: {}", self.error),
        )
    }
}

/// Builds the record for a failure that happened before the pipeline
/// could start (e.g., the event source could not be created).
#[must_use]
pub fn setup_failure(date: NaiveDate, error: PipelineError) -> RunRecord {
    Failed::new(error, None).into_record(date)
}

/// Runs the pipeline for one day and appends its record.
///
/// Returns the appended record. Stage failures are reported through the
/// record's outcome, not as an error.
///
/// # Errors
///
/// Returns [`RunLogError`] only if the record itself cannot be written.
pub async fn run(
    config: &BotConfig,
    source: &dyn EventSource,
    target: PublishTarget,
    logger: &RunLogger,
    options: RunOptions,
) -> Result<RunRecord, RunLogError> {
    let date = options.date;

    let record = if !options.force && already_published(logger, date) {
        log::info!("{date} was already published; use --force to post again");
        RunRecord::new(Utc::now(), date, RunOutcome::Success, None, "already published")
    } else {
        match execute(config, source, target, date).await {
            Ok(completed) => completed.into_record(date),
            Err(failed) => failed.into_record(date),
        }
    };

    timed_blocking("Logging", || logger.append(&record))?;
    log::info!("Run finished: {record}");
    Ok(record)
}

fn already_published(logger: &RunLogger, date: NaiveDate) -> bool {
    logger.has_post_for(date).unwrap_or_else(|e| {
        log::warn!("Could not read run log, assuming {date} is unpublished: {e}");
        false
    })
}

async fn execute(
    config: &BotConfig,
    source: &dyn EventSource,
    target: PublishTarget,
    date: NaiveDate,
) -> Result<Completed, Failed> {
    let window = EventWindow::new(date);
    log::info!("Fetching {} events for {window}", source.name());

    let fetched = timed("Fetching", source.fetch(&window))
        .await
        .map_err(|e| Failed::new(e, None))?;
    let event_count = fetched.events.len();
    log::info!(
        "Fetched {event_count} events ({} malformed, {} non-earthquake skipped)",
        fetched.malformed.len(),
        fetched.non_earthquake
    );

    let summary = timed_blocking("Aggregating", || {
        daily_quakes_analytics::summarize(date, &fetched.events)
    });

    let map = timed_blocking("Rendering", || {
        daily_quakes_render::render(&fetched.events, &summary, &config.render)
    })
    .map_err(|e| Failed::new(e, Some(event_count)))?;
    let caption = daily_quakes_render::build_caption(&summary);

    let artifact_error =
        match artifacts::save(&config.paths, date, &fetched.events, &map.png) {
            Ok(_) => None,
            Err(e) => {
                log::warn!("Artifacts not saved: {e}");
                Some(e)
            }
        };

    let post_id = publish(target, &caption, map.png)
        .await
        .map_err(|e| Failed::new(e, Some(event_count)))?;

    Ok(Completed {
        event_count,
        post_id,
        malformed: fetched.malformed.len(),
        artifact_error,
    })
}

async fn publish(
    target: PublishTarget,
    caption: &str,
    png: Vec<u8>,
) -> Result<Option<PostId>, PublishError> {
    match target {
        PublishTarget::DryRun => {
            log::info!("Dry run, not publishing. Caption:\n{caption}");
            Ok(None)
        }
        PublishTarget::Unavailable(e) => Err(e),
        PublishTarget::Live(publisher) => {
            let post = Post::new(caption, png)?;
            log::info!("Publishing to {}", publisher.name());
            let id = timed("Publishing", publisher.publish(&post)).await?;
            Ok(Some(id))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_are_tagged_with_their_stage() {
        let fetch = PipelineError::from(FetchError::InvalidResponse {
            message: "x".to_string(),
        });
        assert_eq!(fetch.stage(), Stage::Fetching);

        let publish = PipelineError::from(PublishError::MissingCredential { name: "API_KEY" });
        assert_eq!(publish.stage(), Stage::Publishing);

        let render = PipelineError::from(RenderError::Canvas {
            width: 1,
            height: 1,
        });
        assert_eq!(render.stage(), Stage::Rendering);
    }

    #[test]
    fn failure_record_names_the_stage() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 9).unwrap();
        let record = setup_failure(
            date,
            PipelineError::from(FetchError::InvalidResponse {
                message: "not a FeatureCollection".to_string(),
            }),
        );

        assert_eq!(record.outcome, RunOutcome::Failure);
        assert_eq!(record.event_count, None);
        assert!(record.message.starts_with("Fetching failed:"));
        assert!(record.message.contains("not a FeatureCollection"));
    }

    #[test]
    fn completed_record_reports_partial_failure() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 9).unwrap();
        let completed = Completed {
            event_count: 3,
            post_id: Some(PostId("42".to_string())),
            malformed: 1,
            artifact_error: Some(artifacts::ArtifactError::Io {
                path: "outputs".into(),
                source: std::io::Error::other("disk full"),
            }),
        };

        let record = completed.into_record(date);
        assert_eq!(record.outcome, RunOutcome::PartialFailure);
        assert_eq!(record.event_count, Some(3));
        assert!(record.message.starts_with("posted 42; skipped 1 malformed records"));
        assert!(record.message.contains("disk full"));
    }
}
