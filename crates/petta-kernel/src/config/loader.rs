//! Configuration file loading for the PeTTa kernel
//!
//! Layers the embedded defaults, an optional config file and the
//! `PETTA_PATH` environment variable using the config crate.

use std::path::Path;

use config::{Config as ConfigBuilder, File, FileFormat};

use crate::config::{Config, ConfigError, EXAMPLE_CONFIG, PETTA_PATH_ENV};

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let config = ConfigBuilder::builder()
            .add_source(File::from(path))
            .build()?;

        let config: Config = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a TOML string
    pub fn parse_toml(content: &str) -> Result<Self, ConfigError> {
        let config = ConfigBuilder::builder()
            .add_source(File::from_str(content, FileFormat::Toml))
            .build()?;

        let config: Config = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Load the effective configuration
    ///
    /// Starts from the embedded defaults, layers `path` on top if given, then
    /// applies `PETTA_PATH` from the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_petta_path(path, std::env::var(PETTA_PATH_ENV).ok())
    }

    /// Load the effective configuration with an explicit `PETTA_PATH` value
    pub fn load_with_petta_path(
        path: Option<&Path>,
        petta_path: Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder()
            .add_source(File::from_str(EXAMPLE_CONFIG, FileFormat::Toml));
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }
        let petta_path = petta_path.filter(|p| !p.trim().is_empty());
        let config = builder
            .set_override_option("petta_path", petta_path)?
            .build()?;

        let config: Config = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    fn validate(&self) -> Result<(), ConfigError> {
        if self.engine.program.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "engine program must not be empty".to_string(),
            ));
        }
        if self.unit_extension.is_empty() {
            return Err(ConfigError::Invalid(
                "unit_extension must not be empty".to_string(),
            ));
        }
        let timeout = self.engine.startup_timeout;
        if !timeout.is_finite() || timeout <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "engine startup_timeout must be a positive number of seconds, got {timeout}"
            )));
        }
        if let Some(ref petta_path) = self.petta_path
            && petta_path.as_os_str().is_empty()
        {
            return Err(ConfigError::Invalid("petta_path is empty".to_string()));
        }

        Ok(())
    }
}
