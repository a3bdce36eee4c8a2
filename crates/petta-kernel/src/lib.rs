//! A notebook kernel adapter for MeTTa, backed by PeTTa.
//!
//! The kernel takes MeTTa snippets from a notebook front-end, hands them to
//! a PeTTa engine hosted in SWI-Prolog and turns the engine's textual results
//! into readable output or error messages.
//!
//! # Features
//!
//! - **Persistent engine**: one SWI-Prolog process per kernel, so definitions
//!   from earlier cells stay visible to later ones.
//! - **Result formatting**: Prolog error terms are reduced to short messages.
//! - **Degraded mode**: if PeTTa cannot start, every request reports why
//!   instead of the kernel crashing.
//! - **TOML configuration**: engine command line, environment and scratch
//!   directory, with `PETTA_PATH` taking precedence.
//! - **JSON-lines transport**: a simple request/response loop over any async
//!   reader and writer.

pub use config::{Config, ConfigError, EXAMPLE_CONFIG};
pub use engine::{Engine, EngineError, PettaEngine};
pub use format::{ERROR_MARKER, classify, format_error};
pub use kernel::{Kernel, KernelError, KernelState};
pub use protocol::{Message, ProtocolError, Request, serve};
pub use types::{
    ClassifiedOutput, ExecuteReply, ExecuteRequest, ExecuteStatus, Execution, KernelInfo,
    LanguageInfo, ShutdownReply, Stream, StreamName,
};

pub mod config;
pub mod engine;
pub mod format;
pub mod kernel;
pub mod protocol;
pub mod types;
