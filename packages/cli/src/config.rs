//! Bot configuration loaded from `daily_quakes.toml`.
//!
//! Every field has a default, so an absent file or an empty table yields
//! the production setup.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use daily_quakes_render::RenderOptions;
use serde::{Deserialize, Serialize};

/// Config file read when `--config` is not given.
pub const DEFAULT_CONFIG_PATH: &str = "daily_quakes.toml";

/// Errors that can occur while loading the configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// Path of the config file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The file is not valid configuration TOML.
    #[error("failed to parse config {path}: {source}")]
    Parse {
        /// Path of the config file.
        path: PathBuf,
        /// Underlying TOML error.
        source: toml::de::Error,
    },
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// Event catalog settings.
    pub fetch: FetchConfig,
    /// Map rendering settings.
    pub render: RenderOptions,
    /// Publishing settings.
    pub publish: PublishConfig,
    /// Output locations.
    pub paths: PathsConfig,
}

/// `[fetch]` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// FDSN event query endpoint.
    pub endpoint: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Only request events at or above this magnitude.
    pub min_magnitude: Option<f64>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            endpoint: daily_quakes_fetch::usgs::DEFAULT_ENDPOINT.to_string(),
            timeout_secs: 30,
            min_magnitude: None,
        }
    }
}

/// `[publish]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PublishConfig {
    /// When `false`, runs behave as `--dry-run`.
    pub enabled: bool,
    /// Media upload endpoint.
    pub media_upload_url: String,
    /// Create-post endpoint.
    pub create_post_url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            media_upload_url: daily_quakes_publish::x::DEFAULT_MEDIA_UPLOAD_URL.to_string(),
            create_post_url: daily_quakes_publish::x::DEFAULT_CREATE_POST_URL.to_string(),
            timeout_secs: 60,
        }
    }
}

/// `[paths]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory for the daily map images.
    pub outputs_dir: PathBuf,
    /// Directory for the daily event tables.
    pub data_dir: PathBuf,
    /// Append-only run log file.
    pub run_log: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            outputs_dir: PathBuf::from("outputs"),
            data_dir: PathBuf::from("data"),
            run_log: PathBuf::from("log").join("runs.log"),
        }
    }
}

impl PathsConfig {
    /// Where the map for `date` is saved.
    #[must_use]
    pub fn image_path(&self, date: NaiveDate) -> PathBuf {
        self.outputs_dir.join(format!("{}.png", date.format("%Y-%m-%d")))
    }

    /// Where the event table for `date` is saved.
    #[must_use]
    pub fn data_path(&self, date: NaiveDate) -> PathBuf {
        self.data_dir.join(format!("{}.csv", date.format("%Y-%m-%d")))
    }
}

impl BotConfig {
    /// Parses configuration TOML.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if `text` is not valid configuration.
    pub fn from_toml_str(text: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads the file at `path`, which must exist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text, path)?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Loads the file at `path`, falling back to defaults if it does not
    /// exist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file exists but cannot be read or
    /// parsed.
    pub fn load_optional(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            log::debug!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use daily_quakes_render::Projection;

    use super::*;

    fn parse(text: &str) -> Result<BotConfig, ConfigError> {
        BotConfig::from_toml_str(text, Path::new("test.toml"))
    }

    #[test]
    fn empty_file_is_all_defaults() {
        let config = parse("").unwrap();
        assert_eq!(config, BotConfig::default());
        assert_eq!(config.fetch.timeout_secs, 30);
        assert_eq!(config.publish.timeout_secs, 60);
        assert!(config.publish.enabled);
        assert_eq!(config.render.width, 2400);
        assert_eq!(config.paths.run_log, PathBuf::from("log/runs.log"));
    }

    #[test]
    fn partial_tables_keep_other_defaults() {
        let config = parse(
            r#"
            [fetch]
            min_magnitude = 2.5

            [render]
            projection = "equirectangular"
            width = 1200

            [publish]
            enabled = false
            "#,
        )
        .unwrap();

        assert_eq!(config.fetch.min_magnitude, Some(2.5));
        assert_eq!(config.fetch.endpoint, FetchConfig::default().endpoint);
        assert_eq!(config.render.projection, Projection::Equirectangular);
        assert_eq!(config.render.width, 1200);
        assert_eq!(config.render.handle, "@TodayQuakes");
        assert!(!config.publish.enabled);
        assert_eq!(config.paths, PathsConfig::default());
    }

    #[test]
    fn unknown_projection_is_a_parse_error() {
        let result = parse("[render]\nprojection = \"mercator\"\n");
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn artifact_paths_use_iso_date() {
        let paths = PathsConfig::default();
        let date = NaiveDate::from_ymd_opt(2024, 1, 9).unwrap();
        assert_eq!(paths.image_path(date), PathBuf::from("outputs/2024-01-09.png"));
        assert_eq!(paths.data_path(date), PathBuf::from("data/2024-01-09.csv"));
    }

    #[test]
    fn missing_optional_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = BotConfig::load_optional(&dir.path().join("none.toml")).unwrap();
        assert_eq!(config, BotConfig::default());
    }

    #[test]
    fn missing_required_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = BotConfig::load(&dir.path().join("none.toml"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn shipped_sample_config_parses() {
        let text = include_str!("../../../daily_quakes.toml");
        let config = parse(text).unwrap();
        assert_eq!(config.render.projection, Projection::Robinson);
    }
}
