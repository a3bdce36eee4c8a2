//! Backend engine interface
//!
//! The kernel talks to PeTTa through the [`Engine`] trait. [`PettaEngine`]
//! implements it by hosting PeTTa in a long-lived SWI-Prolog process that
//! evaluates one source file per request.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;

pub use crate::engine::bridge::{DRIVER_SCRIPT, PettaEngine};
pub use crate::engine::reply::BridgeLine;

mod bridge;
mod reply;

/// Errors raised while starting or talking to the engine
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("petta_path is not configured (set PETTA_PATH or petta_path in the config)")]
    PettaPathMissing,

    #[error("no PeTTa installation found at {0}: missing src/main.pl")]
    PettaPathInvalid(PathBuf),

    #[error("driver script not found at {0}")]
    DriverNotFound(PathBuf),

    #[error("command '{0}' not found in PATH")]
    ProgramNotFound(String),

    #[error("failed to spawn engine process: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("engine did not become ready: {0}")]
    Handshake(String),

    #[error("engine process closed the connection: {0}")]
    BridgeClosed(String),

    #[error("{message}")]
    Raised { kind: String, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    /// Name of the failure kind, as reported to the notebook
    pub fn kind(&self) -> &str {
        match self {
            EngineError::PettaPathMissing => "PettaPathMissing",
            EngineError::PettaPathInvalid(_) => "PettaPathInvalid",
            EngineError::DriverNotFound(_) => "DriverNotFound",
            EngineError::ProgramNotFound(_) => "ProgramNotFound",
            EngineError::Spawn(_) => "SpawnError",
            EngineError::Handshake(_) => "HandshakeError",
            EngineError::BridgeClosed(_) => "BridgeClosed",
            EngineError::Raised { kind, .. } => kind,
            EngineError::Io(_) => "IoError",
        }
    }
}

/// A backend that evaluates MeTTa source files
///
/// One engine instance serves a whole kernel lifetime. Callers must not run
/// two evaluations on the same instance at once, which `&mut self` enforces.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Engine: Send {
    /// Evaluate the file at `unit` and return its results in order
    async fn evaluate(&mut self, unit: &Path) -> Result<Vec<String>, EngineError>;

    /// Release the engine's resources
    async fn shutdown(&mut self) -> Result<(), EngineError>;
}

/// Resolve a program name to an absolute path using the host's PATH.
///
/// Programs that already contain a `/` are returned unchanged.
pub fn resolve_program(program: &str) -> Result<PathBuf, EngineError> {
    if program.contains('/') {
        return Ok(PathBuf::from(program));
    }

    let path_var = std::env::var_os("PATH").unwrap_or_default();
    std::env::split_paths(&path_var)
        .map(|dir| dir.join(program))
        .find(|candidate| candidate.is_file())
        .ok_or_else(|| EngineError::ProgramNotFound(program.to_owned()))
}
