#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Run controller for the daily earthquake map bot.
//!
//! [`pipeline::run`] drives one day through fetching, aggregation,
//! rendering, and publishing, saving the artifacts under
//! [`config::PathsConfig`] and appending one record to the run log.
//! Sources and publishers are passed in as trait objects so the
//! controller runs unchanged against fakes.

pub mod artifacts;
pub mod config;
pub mod pipeline;

pub use config::BotConfig;
pub use pipeline::{PipelineError, PublishTarget, RunOptions, Stage, run};
