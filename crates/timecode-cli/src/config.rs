//! Layered configuration: built-in defaults, then a TOML file, then
//! `TIMECODE_*` environment variables.

use std::path::Path;

use anyhow::{Context, Result};
use ::config::{Config, Environment, File};
use timecode_engine::Settings;

/// Looked up in the working directory when `--config` is not given.
const DEFAULT_FILE: &str = "timecode.toml";

#[derive(Debug, Clone)]
pub struct CliConfig {
    pub settings: Settings,
    /// `tracing` filter used when `RUST_LOG` is unset.
    pub log_level: String,
}

impl CliConfig {
    /// ## Summary
    /// Load the configuration. An explicit `path` must exist; the default
    /// file is optional.
    ///
    /// ## Errors
    /// Returns an error if a source cannot be read or a value does not
    /// deserialize (unknown zone, bad week start, ...).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_FILE).required(false),
        };

        let raw = Config::builder()
            .set_default("time_zone", "UTC")?
            .set_default("week_start", "MO")?
            .set_default("dst_policy", "shift_forward")?
            .set_default("log_level", "warn")?
            .add_source(file)
            .add_source(Environment::with_prefix("TIMECODE"))
            .build()
            .context("Failed to load configuration")?;

        let settings: Settings = raw
            .clone()
            .try_deserialize()
            .context("Invalid compiler settings in configuration")?;
        let log_level = raw.get_string("log_level")?;

        Ok(Self {
            settings,
            log_level,
        })
    }
}
