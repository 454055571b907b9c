#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Append-only run log.
//!
//! Every pipeline invocation appends exactly one line:
//!
//! ```text
//! 2024-01-10T06:00:03Z | 2024-01-09 | SUCCESS | events=312 | posted 1745...
//! ```
//!
//! Fields are the UTC completion time, the target date, the
//! [`RunOutcome`], the event count (`-` when the run failed before it was
//! known), and a single-line message. Existing lines are never rewritten.

use std::fs::OpenOptions;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SubsecRound as _, Utc};
use strum_macros::{AsRefStr, Display, EnumString};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";
const DATE_FORMAT: &str = "%Y-%m-%d";
const SEPARATOR: &str = " | ";

/// Message prefix of a run that published a post, followed by the post id.
pub const POSTED_PREFIX: &str = "posted ";

/// Errors that can occur while reading or writing the run log.
#[derive(Debug, thiserror::Error)]
pub enum RunLogError {
    /// The log file could not be read or written.
    #[error("run log {path}: {source}")]
    Io {
        /// Path of the log file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// A line that is not a valid run record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid run record ({field}): {line}")]
pub struct ParseRecordError {
    /// Field that failed to parse.
    pub field: &'static str,
    /// The offending line.
    pub line: String,
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum RunOutcome {
    /// The run finished (posted, dry run, or skipped) and artifacts saved.
    Success,
    /// The post was published but artifacts could not be saved.
    PartialFailure,
    /// A stage failed and nothing was published.
    Failure,
}

/// One line of the run log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRecord {
    /// When the run finished (UTC, second precision).
    pub timestamp: DateTime<Utc>,
    /// The day the run reported on.
    pub target_date: NaiveDate,
    /// How the run ended.
    pub outcome: RunOutcome,
    /// Number of events fetched, if the run got that far.
    pub event_count: Option<usize>,
    /// Human-readable detail (post id, error message).
    pub message: String,
}

impl RunRecord {
    /// Creates a record, flattening `message` onto one line and dropping
    /// the sub-second part of `timestamp`.
    #[must_use]
    pub fn new(
        timestamp: DateTime<Utc>,
        target_date: NaiveDate,
        outcome: RunOutcome,
        event_count: Option<usize>,
        message: impl AsRef<str>,
    ) -> Self {
        Self {
            timestamp: timestamp.trunc_subsecs(0),
            target_date,
            outcome,
            event_count,
            message: single_line(message.as_ref()),
        }
    }

    /// Whether this run published a post. Dry runs, skipped runs, and
    /// failures did not.
    #[must_use]
    pub fn posted(&self) -> bool {
        self.outcome != RunOutcome::Failure && self.message.starts_with(POSTED_PREFIX)
    }
}

fn single_line(message: &str) -> String {
    message.split_whitespace().collect::<Vec<_>>().join(" ")
}

impl std::fmt::Display for RunRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}{SEPARATOR}{}{SEPARATOR}{}{SEPARATOR}events=",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.target_date.format(DATE_FORMAT),
            self.outcome,
        )?;
        match self.event_count {
            Some(count) => write!(f, "{count}")?,
            None => f.write_str("-")?,
        }
        write!(f, "{SEPARATOR}{}", single_line(&self.message))
    }
}

impl FromStr for RunRecord {
    type Err = ParseRecordError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let invalid = |field| ParseRecordError {
            field,
            line: line.to_string(),
        };

        let mut fields = line.splitn(5, SEPARATOR);
        let mut next = |field| fields.next().ok_or_else(|| invalid(field));

        let timestamp = next("timestamp")?;
        let target_date = next("date")?;
        let outcome = next("outcome")?;
        let events = next("events")?;
        let message = fields.next().unwrap_or_default();

        let timestamp = NaiveDateTime::parse_from_str(timestamp, TIMESTAMP_FORMAT)
            .map_err(|_| invalid("timestamp"))?
            .and_utc();
        let target_date =
            NaiveDate::parse_from_str(target_date, DATE_FORMAT).map_err(|_| invalid("date"))?;
        let outcome = outcome.parse().map_err(|_| invalid("outcome"))?;
        let event_count = match events.strip_prefix("events=") {
            Some("-") => None,
            Some(count) => Some(count.parse().map_err(|_| invalid("events"))?),
            None => return Err(invalid("events")),
        };

        Ok(Self {
            timestamp,
            target_date,
            outcome,
            event_count,
            message: message.to_string(),
        })
    }
}

/// Appends records to, and reads them back from, one log file.
#[derive(Debug, Clone)]
pub struct RunLogger {
    path: PathBuf,
}

impl RunLogger {
    /// Creates a logger for the file at `path`. Nothing is touched until
    /// the first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the log file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> RunLogError {
        RunLogError::Io {
            path: self.path.clone(),
            source,
        }
    }

    /// Appends one record, creating the file and its parent directories
    /// if needed.
    ///
    /// # Errors
    ///
    /// Returns [`RunLogError::Io`] if the file cannot be opened or written.
    pub fn append(&self, record: &RunRecord) -> Result<(), RunLogError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.io_error(e))?;
        writeln!(file, "{record}").map_err(|e| self.io_error(e))?;

        log::debug!("Appended {} record to {}", record.outcome, self.path.display());
        Ok(())
    }

    /// Reads every record in file order. A missing file reads as empty;
    /// lines that do not parse are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`RunLogError::Io`] if the file exists but cannot be read.
    pub fn read_all(&self) -> Result<Vec<RunRecord>, RunLogError> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(self.io_error(e)),
        };

        let records = text
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| match line.parse::<RunRecord>() {
                Ok(record) => Some(record),
                Err(e) => {
                    log::warn!("Skipping line in {}: {e}", self.path.display());
                    None
                }
            })
            .collect();
        Ok(records)
    }

    /// Whether any run for `date` published a post (see
    /// [`RunRecord::posted`]).
    ///
    /// # Errors
    ///
    /// Returns [`RunLogError::Io`] if the file exists but cannot be read.
    pub fn has_post_for(&self, date: NaiveDate) -> Result<bool, RunLogError> {
        Ok(self
            .read_all()?
            .iter()
            .any(|r| r.target_date == date && r.posted()))
    }
}
