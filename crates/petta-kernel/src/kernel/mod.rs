//! Execution adapter for notebook requests
//!
//! A [`Kernel`] owns one engine for its whole lifetime. Each execute request
//! is persisted as a temporary source file, evaluated once, and turned into a
//! reply plus at most one output stream.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};

use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, error, instrument, warn};

pub use crate::kernel::unit::SourceUnit;

mod unit;

use crate::config::Config;
use crate::engine::{Engine, EngineError, PettaEngine};
use crate::format::classify;
use crate::types::{ExecuteReply, ExecuteRequest, Execution, KernelInfo, ShutdownReply, Stream};

/// Failures surfaced to the notebook as error replies
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KernelError {
    /// The engine could not be constructed; permanent for this kernel
    #[error("PeTTa failed to initialize: {0}")]
    Initialization(String),

    /// One evaluation failed; later requests are unaffected
    #[error("{kind}: {message}")]
    Evaluation { kind: String, message: String },
}

impl KernelError {
    /// Error kind name for the reply
    pub fn ename(&self) -> &str {
        match self {
            KernelError::Initialization(_) => "InitializationFailure",
            KernelError::Evaluation { kind, .. } => kind,
        }
    }

    /// Error message for the reply
    pub fn evalue(&self) -> &str {
        match self {
            KernelError::Initialization(reason) => reason,
            KernelError::Evaluation { message, .. } => message,
        }
    }

    /// Text written to the error stream
    pub fn display_text(&self) -> String {
        match self {
            KernelError::Initialization(reason) => format!(
                "PeTTa failed to initialize:\n{reason}\n\nPlease check that:\n\
                 1. SWI-Prolog is installed and on PATH\n\
                 2. petta_path points at a PeTTa checkout"
            ),
            KernelError::Evaluation { message, .. } => {
                format!("Error executing MeTTa code:\n{message}")
            }
        }
    }
}

impl From<EngineError> for KernelError {
    fn from(err: EngineError) -> Self {
        let kind = err.kind().to_owned();
        let mut message = err.to_string();
        if message.trim().is_empty() {
            message = kind.clone();
        }
        KernelError::Evaluation { kind, message }
    }
}

/// Lifetime state of a kernel's engine
#[derive(Debug)]
pub enum KernelState<E> {
    /// The engine is constructed and serves requests one at a time
    Ready(Mutex<E>),

    /// Engine construction failed; the reason is reported on every request
    Degraded(String),
}

/// Notebook kernel backed by an [`Engine`]
#[derive(Debug)]
pub struct Kernel<E> {
    state: KernelState<E>,
    scratch_dir: PathBuf,
    unit_suffix: String,
    execution_count: AtomicU32,
    info: KernelInfo,
}

impl Kernel<PettaEngine> {
    /// Start a PeTTa engine and wrap it in a kernel
    ///
    /// Never fails: if the engine cannot start, the kernel is degraded and
    /// reports the failure on every request.
    pub async fn start(config: &Config) -> Self {
        Self::new(PettaEngine::start(config).await, config)
    }
}

impl<E: Engine> Kernel<E> {
    /// Create a kernel from the outcome of engine construction
    pub fn new(engine: Result<E, EngineError>, config: &Config) -> Self {
        let state = match engine {
            Ok(engine) => KernelState::Ready(Mutex::new(engine)),
            Err(e) => {
                error!(error = %e, "failed to initialize PeTTa engine");
                KernelState::Degraded(e.to_string())
            }
        };
        Self {
            state,
            scratch_dir: config.scratch_dir(),
            unit_suffix: config.unit_extension.suffix(),
            execution_count: AtomicU32::new(0),
            info: KernelInfo::default(),
        }
    }

    /// Create a kernel around a constructed engine
    pub fn ready(engine: E, config: &Config) -> Self {
        Self::new(Ok(engine), config)
    }

    /// Whether the engine was constructed successfully
    pub fn is_ready(&self) -> bool {
        matches!(self.state, KernelState::Ready(_))
    }

    /// Number of requests counted towards history so far
    pub fn execution_count(&self) -> u32 {
        self.execution_count.load(Ordering::SeqCst)
    }

    /// Kernel and language metadata
    pub fn info(&self) -> &KernelInfo {
        &self.info
    }

    /// Handle one execute request
    ///
    /// Never fails: every failure is turned into an error reply with the
    /// message on the error stream (unless the request is silent).
    #[instrument(skip(self, request), fields(silent = request.silent))]
    pub async fn execute(&self, request: &ExecuteRequest) -> Execution {
        let count = if request.store_history && !request.silent {
            self.execution_count.fetch_add(1, Ordering::SeqCst) + 1
        } else {
            self.execution_count()
        };

        match self.evaluate(&request.code).await {
            Ok(results) => {
                let output = classify(&results);
                debug!(
                    count = results.len(),
                    is_error = output.is_error,
                    "classified results"
                );
                let stream = if request.silent {
                    None
                } else {
                    output.into_stream()
                };
                Execution {
                    stream,
                    reply: ExecuteReply::ok(count),
                }
            }
            Err(err) => {
                warn!(ename = err.ename(), evalue = err.evalue(), "execution failed");
                let stream = (!request.silent).then(|| Stream::stderr(err.display_text()));
                Execution {
                    stream,
                    reply: ExecuteReply::error(count, err.ename(), err.evalue()),
                }
            }
        }
    }

    /// Evaluate a submission and return the raw results
    ///
    /// Blank submissions return no results without reaching the engine. The
    /// temporary source file is removed before this returns, on every path.
    pub async fn evaluate(&self, code: &str) -> Result<Vec<String>, KernelError> {
        let engine = match &self.state {
            KernelState::Ready(engine) => engine,
            KernelState::Degraded(reason) => {
                return Err(KernelError::Initialization(reason.clone()));
            }
        };

        if code.trim().is_empty() {
            debug!("empty submission, skipping evaluation");
            return Ok(Vec::new());
        }

        let unit = SourceUnit::create(&self.scratch_dir, &self.unit_suffix, code)
            .await
            .map_err(|e| KernelError::Evaluation {
                kind: "UnitWriteError".to_owned(),
                message: format!(
                    "failed to write source file in {}: {e}",
                    self.scratch_dir.display()
                ),
            })?;

        let result = {
            let mut engine = engine.lock().await;
            engine.evaluate(unit.path()).await
        };
        unit.remove();

        result.map_err(KernelError::from)
    }

    /// Handle a shutdown request
    #[instrument(skip(self))]
    pub async fn shutdown(&self, restart: bool) -> ShutdownReply {
        if let KernelState::Ready(engine) = &self.state {
            let mut engine = engine.lock().await;
            if let Err(e) = engine.shutdown().await {
                warn!(error = %e, "engine shutdown failed");
            }
        }
        ShutdownReply::ok(restart)
    }
}
