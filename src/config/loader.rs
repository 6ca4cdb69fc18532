//! Configuration loading from disk or standard input.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::schema::{Config, RawConfig};
use crate::config::validation::{validate, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unable to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("unable to parse configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unable to parse configuration: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid configuration: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Where the configuration document comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Stdin,
    File(PathBuf),
}

impl ConfigSource {
    /// Interpret a command line argument, `-` meaning standard input.
    pub fn from_arg(arg: &str) -> Self {
        if arg == "-" {
            ConfigSource::Stdin
        } else {
            ConfigSource::File(PathBuf::from(arg))
        }
    }

    /// The file path, if the source is a file.
    pub fn path(&self) -> Option<&Path> {
        match self {
            ConfigSource::File(path) => Some(path),
            ConfigSource::Stdin => None,
        }
    }
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Stdin => write!(f, "<stdin>"),
            ConfigSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Document encodings understood by the loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Toml,
}

impl Format {
    /// TOML for `*.toml` files, JSON for everything else (including stdin).
    pub fn detect(source: &ConfigSource) -> Self {
        match source.path().and_then(|p| p.extension()).and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Format::Toml,
            _ => Format::Json,
        }
    }
}

/// Read, decode and validate a configuration.
pub fn load_config(source: &ConfigSource) -> Result<Config, ConfigError> {
    let content = match source {
        ConfigSource::Stdin => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
        ConfigSource::File(path) => fs::read_to_string(path)?,
    };

    parse_config(&content, Format::detect(source))
}

/// [`load_config`] on the blocking thread pool, for callers inside the runtime.
///
/// Reading stdin blocks until the writer closes it, which must not tie up a
/// runtime worker.
pub async fn load_config_blocking(source: ConfigSource) -> Result<Config, ConfigError> {
    tokio::task::spawn_blocking(move || load_config(&source))
        .await
        .map_err(|e| ConfigError::Io(std::io::Error::other(e)))?
}

/// Decode and validate a configuration document held in memory.
pub fn parse_config(content: &str, format: Format) -> Result<Config, ConfigError> {
    let raw: RawConfig = match format {
        Format::Json => serde_json::from_str(content)?,
        Format::Toml => toml::from_str(content)?,
    };

    validate(raw).map_err(ConfigError::Validation)
}
