// crates/darkcut-cli/src/config.rs
//
// Run configuration: the three positionals plus environment overrides.
//
//   DARKCUT_STRATEGY   auto | reopen | seek   (default auto)
//   DARKCUT_EXTENSION  output container, e.g. mp4, mkv (default mp4)
//   RUST_LOG           log filter, read by env_logger (see logging.rs)
//
// Everything is validated here, before the input is opened.

use std::path::PathBuf;

use thiserror::Error;

use darkcut_core::{StrategyPreference, Threshold, ThresholdError, UnknownStrategy};

use crate::cli::Cli;

pub const ENV_STRATEGY: &str = "DARKCUT_STRATEGY";
pub const ENV_EXTENSION: &str = "DARKCUT_EXTENSION";
const DEFAULT_EXTENSION: &str = "mp4";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid threshold: {0}")]
    Threshold(#[from] ThresholdError),
    #[error("invalid DARKCUT_STRATEGY: {0}")]
    Strategy(#[from] UnknownStrategy),
    #[error("invalid DARKCUT_EXTENSION '{0}': expected letters and digits, e.g. mp4")]
    Extension(String),
}

#[derive(Debug)]
pub struct Config {
    pub input:         PathBuf,
    pub output_prefix: PathBuf,
    pub threshold:     Threshold,
    pub strategy:      StrategyPreference,
    pub extension:     String,
}

impl Config {
    /// `env` looks up one variable; the binary passes `std::env::var`.
    pub fn resolve<E>(cli: Cli, env: E) -> Result<Self, ConfigError>
    where
        E: Fn(&str) -> Option<String>,
    {
        let threshold: Threshold = cli.threshold.parse()?;

        let strategy = match env(ENV_STRATEGY) {
            Some(v) => v.parse()?,
            None    => StrategyPreference::default(),
        };

        let extension = match env(ENV_EXTENSION) {
            Some(v) => parse_extension(&v)?,
            None    => DEFAULT_EXTENSION.to_string(),
        };

        Ok(Self {
            input: cli.input,
            output_prefix: cli.output_prefix,
            threshold,
            strategy,
            extension,
        })
    }
}

/// Accepts `mkv` or `.mkv`.
fn parse_extension(raw: &str) -> Result<String, ConfigError> {
    let ext = raw.trim().trim_start_matches('.');
    if ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ConfigError::Extension(raw.to_string()));
    }
    Ok(ext.to_ascii_lowercase())
}
