use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

pub use crate::config::engine::{DEFAULT_ENGINE_PROGRAM, EngineConfig, FileExtension};

pub mod engine;
mod loader;

/// Example configuration embedded at compile time.
///
/// Library users can access this to generate a starter config file.
pub const EXAMPLE_CONFIG: &str = include_str!("../../petta-kernel.example.toml");

/// Environment variable that overrides `petta_path`
pub const PETTA_PATH_ENV: &str = "PETTA_PATH";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid characters in file extension")]
    InvalidFileExtChars,

    #[error("failed to parse config: {0}")]
    Parse(#[from] config::ConfigError),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Config for the PeTTa kernel
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Root of the PeTTa checkout (the directory holding `src/main.pl`).
    ///
    /// The `PETTA_PATH` environment variable takes precedence over this value.
    #[serde(default)]
    pub petta_path: Option<PathBuf>,

    /// Directory for the temporary files handed to the engine.
    /// Uses the system temp directory if not specified.
    #[serde(default)]
    pub scratch_dir: Option<PathBuf>,

    /// Extension given to temporary source files
    #[serde(default)]
    pub unit_extension: FileExtension,

    /// Engine process launch settings
    #[serde(default)]
    pub engine: EngineConfig,
}

impl Config {
    /// Create a config with built-in values only and no PeTTa location
    pub fn empty() -> Self {
        Self {
            petta_path: None,
            scratch_dir: None,
            unit_extension: FileExtension::default(),
            engine: EngineConfig::default(),
        }
    }

    /// Path of PeTTa's main Prolog source, if `petta_path` is set
    pub fn petta_main(&self) -> Option<PathBuf> {
        self.petta_path
            .as_ref()
            .map(|root| root.join("src").join("main.pl"))
    }

    /// Directory for temporary source files
    pub fn scratch_dir(&self) -> PathBuf {
        self.scratch_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::parse_toml(EXAMPLE_CONFIG).expect("embedded default config should be valid")
    }
}
