use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize, de};

use crate::config::ConfigError;

const INVALID_FILE_EXT_CHARS: [char; 2] = ['/', '.'];

/// Default program used to host the PeTTa engine
pub const DEFAULT_ENGINE_PROGRAM: &str = "swipl";

/// How to launch the backend engine process
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Program to run (resolved through PATH when it has no `/`)
    #[serde(default = "default_program")]
    pub program: String,

    /// Arguments with placeholders
    /// Placeholders: {petta_path}, {driver}
    #[serde(default = "default_args")]
    pub args: Vec<String>,

    /// Extra environment variables for the engine process
    #[serde(default)]
    pub env: HashMap<String, String>,

    /// Driver script to load instead of the bundled one
    #[serde(default)]
    pub driver: Option<PathBuf>,

    /// Seconds to wait for the engine to report ready
    #[serde(default = "default_startup_timeout")]
    pub startup_timeout: f64,
}

impl EngineConfig {
    /// Expand placeholders in the configured arguments
    pub fn expand_args(args: &[String], petta_path: &Path, driver: &Path) -> Vec<String> {
        let petta_path = petta_path.to_string_lossy();
        let driver = driver.to_string_lossy();
        args.iter()
            .map(|arg| {
                arg.replace("{petta_path}", &petta_path)
                    .replace("{driver}", &driver)
            })
            .collect()
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            args: default_args(),
            env: HashMap::new(),
            driver: None,
            startup_timeout: default_startup_timeout(),
        }
    }
}

fn default_program() -> String {
    DEFAULT_ENGINE_PROGRAM.to_owned()
}

fn default_startup_timeout() -> f64 {
    30.0
}

fn default_args() -> Vec<String> {
    vec![
        "--stack_limit=8g".to_owned(),
        "-q".to_owned(),
        "{driver}".to_owned(),
    ]
}

/// File extension without dot (e.g., "metta")
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileExtension(String);

impl FileExtension {
    pub fn new(extension: &str) -> Result<Self, ConfigError> {
        let contains_invalid = extension
            .chars()
            .any(|c| INVALID_FILE_EXT_CHARS.contains(&c));
        if contains_invalid {
            return Err(ConfigError::InvalidFileExtChars);
        }
        Ok(Self(extension.to_owned()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Suffix for file names, including the leading dot
    pub fn suffix(&self) -> String {
        format!(".{}", self.0)
    }
}

impl Default for FileExtension {
    fn default() -> Self {
        Self("metta".to_owned())
    }
}

impl<'de> Deserialize<'de> for FileExtension {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        FileExtension::new(&s).map_err(|_| {
            de::Error::invalid_value(
                de::Unexpected::Str(&s),
                &"a file extension without '/' or '.' characters",
            )
        })
    }
}

impl std::fmt::Display for FileExtension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
