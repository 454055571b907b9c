#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Shared CLI utilities for the daily quakes bot.
//!
//! [`init_logger`] installs the `pretty_env_logger` backend for the `log`
//! facade; [`timed`] and [`timed_blocking`] log how long each pipeline
//! stage took.

use std::future::Future;
use std::time::Instant;

use log::LevelFilter;

/// Initializes the global logger at `info`, overridable with `RUST_LOG`.
///
/// Calling it again (e.g., from several tests) is a no-op.
pub fn init_logger() {
    let mut builder = pretty_env_logger::formatted_timed_builder();
    builder.filter_level(LevelFilter::Info);
    builder.parse_env("RUST_LOG");

    // Ignore error if logger was already set
    builder.try_init().ok();
}

/// Awaits `future` and logs its duration under `label`.
pub async fn timed<F: Future>(label: &str, future: F) -> F::Output {
    let start = Instant::now();
    let output = future.await;
    log::info!("{label} took {:.2}s", start.elapsed().as_secs_f64());
    output
}

/// Runs `f` and logs its duration under `label`.
pub fn timed_blocking<T>(label: &str, f: impl FnOnce() -> T) -> T {
    let start = Instant::now();
    let output = f();
    log::info!("{label} took {:.2}s", start.elapsed().as_secs_f64());
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn timed_returns_future_output() {
        let value = timed("Answer", async { 42 }).await;
        assert_eq!(value, 42);
    }

    #[test]
    fn timed_blocking_returns_closure_output() {
        let value = timed_blocking("Answer", || "done".to_string());
        assert_eq!(value, "done");
    }

    #[test]
    fn init_logger_twice_is_harmless() {
        init_logger();
        init_logger();
        log::info!("logger initialized");
    }
}
