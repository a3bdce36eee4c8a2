//! Process bridge to a PeTTa engine
//!
//! Spawns the configured program with the driver script, waits for the ready
//! handshake, then exchanges one file path per request for a block of result
//! lines. The process lives as long as the engine so definitions persist
//! between evaluations.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tracing::{debug, instrument, warn};

use crate::config::{Config, EngineConfig, PETTA_PATH_ENV};
use crate::engine::reply::BridgeLine;
use crate::engine::{Engine, EngineError, resolve_program};

/// Driver script bundled with the kernel
pub const DRIVER_SCRIPT: &str = include_str!("../../resources/driver.pl");

const DRIVER_FILE_NAME: &str = "petta_kernel_driver.pl";
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);
const SHUT_DOWN: &str = "engine has been shut down";

/// A PeTTa engine hosted in a child process
#[derive(Debug)]
pub struct PettaEngine {
    child: Child,
    stdin: Option<ChildStdin>,
    stdout: BufReader<ChildStdout>,

    /// A request was sent and its `.` line has not been read yet
    pending: bool,

    /// Set once the stream position is unknown; every later request fails
    broken: Option<String>,

    /// Holds the bundled driver script for the lifetime of the process
    _driver_dir: Option<TempDir>,
}

impl PettaEngine {
    /// Start the engine process and wait until PeTTa has loaded
    #[instrument(skip(config))]
    pub async fn start(config: &Config) -> Result<Self, EngineError> {
        let petta_path = config
            .petta_path
            .as_deref()
            .ok_or(EngineError::PettaPathMissing)?;
        if !petta_path.join("src").join("main.pl").is_file() {
            return Err(EngineError::PettaPathInvalid(petta_path.to_path_buf()));
        }

        let program = resolve_program(&config.engine.program)?;
        let (driver, driver_dir) = prepare_driver(&config.engine)?;
        let args = EngineConfig::expand_args(&config.engine.args, petta_path, &driver);

        debug!(?program, ?args, "spawning engine process");

        let mut child = Command::new(&program)
            .args(&args)
            .env(PETTA_PATH_ENV, petta_path)
            .envs(&config.engine.env)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(EngineError::Spawn)?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| EngineError::Handshake("engine stdin not captured".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| EngineError::Handshake("engine stdout not captured".to_string()))?;

        let mut engine = Self {
            child,
            stdin: Some(stdin),
            stdout: BufReader::new(stdout),
            pending: false,
            broken: None,
            _driver_dir: driver_dir,
        };

        let timeout = Duration::try_from_secs_f64(config.engine.startup_timeout)
            .map_err(|e| EngineError::Handshake(format!("invalid startup timeout: {e}")))?;
        match tokio::time::timeout(timeout, engine.wait_ready()).await {
            Ok(Ok(banner)) => {
                debug!(%banner, "engine ready");
                Ok(engine)
            }
            Ok(Err(e)) => Err(e),
            Err(_) => Err(EngineError::Handshake(format!(
                "no ready signal within {:.1}s",
                config.engine.startup_timeout
            ))),
        }
    }

    /// Process id of the engine, if it is still running
    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    async fn wait_ready(&mut self) -> Result<String, EngineError> {
        loop {
            let Some(line) = self.read_line().await? else {
                let status = self.exit_description();
                return Err(EngineError::Handshake(format!(
                    "engine exited during startup ({status})"
                )));
            };
            match BridgeLine::parse(&line) {
                BridgeLine::Ready(banner) => return Ok(banner),
                other => debug!(?other, "ignoring output before ready"),
            }
        }
    }

    /// Read one line, replacing bytes that are not UTF-8
    async fn read_line(&mut self) -> Result<Option<String>, EngineError> {
        let mut buf = Vec::new();
        match self.stdout.read_until(b'\n', &mut buf).await {
            Ok(0) => Ok(None),
            Ok(_) => Ok(Some(String::from_utf8_lossy(&buf).into_owned())),
            Err(e) => {
                self.broken = Some(format!("failed to read engine output: {e}"));
                Err(EngineError::Io(e))
            }
        }
    }

    /// Record that the engine's output ended and describe how
    fn closed(&mut self) -> EngineError {
        let status = self.exit_description();
        self.broken = Some(status.clone());
        EngineError::BridgeClosed(status)
    }

    /// Skip the rest of a response whose request was abandoned
    async fn drain_response(&mut self) -> Result<(), EngineError> {
        warn!("discarding the rest of an interrupted response");
        loop {
            let Some(line) = self.read_line().await? else {
                return Err(self.closed());
            };
            if BridgeLine::parse(&line) == BridgeLine::End {
                self.pending = false;
                return Ok(());
            }
        }
    }

    async fn send_request(&mut self, unit: &Path) -> Result<(), EngineError> {
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| EngineError::BridgeClosed(SHUT_DOWN.to_string()))?;

        let mut request = unit.to_string_lossy().into_owned();
        request.push('\n');

        let written = async {
            stdin.write_all(request.as_bytes()).await?;
            stdin.flush().await
        };
        match written.await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => Err(self.closed()),
            Err(e) => Err(EngineError::Io(e)),
        }
    }

    fn exit_description(&mut self) -> String {
        match self.child.try_wait() {
            Ok(Some(status)) => status.to_string(),
            Ok(None) => "output closed".to_string(),
            Err(e) => format!("status unavailable: {e}"),
        }
    }
}

#[async_trait]
impl Engine for PettaEngine {
    #[instrument(skip(self))]
    async fn evaluate(&mut self, unit: &Path) -> Result<Vec<String>, EngineError> {
        if let Some(ref reason) = self.broken {
            return Err(EngineError::BridgeClosed(reason.clone()));
        }
        if self.pending {
            self.drain_response().await?;
        }

        // A request cut off mid-write leaves the driver's input unusable
        self.broken = Some("a request was not sent completely".to_string());
        self.send_request(unit).await?;
        self.broken = None;
        self.pending = true;

        let mut results = Vec::new();
        let mut raised = None;
        loop {
            let Some(line) = self.read_line().await? else {
                return Err(self.closed());
            };
            match BridgeLine::parse(&line) {
                BridgeLine::Result(text) => results.push(text),
                BridgeLine::Raised { kind, message } => {
                    if raised.is_some() {
                        warn!(%kind, "engine raised more than once, keeping the first");
                    } else {
                        raised = Some(EngineError::Raised { kind, message });
                    }
                }
                BridgeLine::End => {
                    self.pending = false;
                    break;
                }
                BridgeLine::Ready(banner) => debug!(%banner, "unexpected ready line"),
                BridgeLine::Noise(text) => debug!(%text, "engine output"),
            }
        }

        debug!(count = results.len(), raised = raised.is_some(), "evaluation complete");

        match raised {
            Some(err) => Err(err),
            None => Ok(results),
        }
    }

    #[instrument(skip(self))]
    async fn shutdown(&mut self) -> Result<(), EngineError> {
        // Closing stdin lets the driver loop see end_of_file and halt
        drop(self.stdin.take());
        self.broken = Some(SHUT_DOWN.to_string());

        match tokio::time::timeout(SHUTDOWN_GRACE, self.child.wait()).await {
            Ok(status) => {
                let status = status?;
                debug!(%status, "engine exited");
            }
            Err(_) => {
                warn!("engine did not exit after stdin closed, killing it");
                self.child.kill().await?;
            }
        }
        Ok(())
    }
}

/// Locate the driver script, writing the bundled one to a temp dir if needed
fn prepare_driver(engine: &EngineConfig) -> Result<(PathBuf, Option<TempDir>), EngineError> {
    if let Some(ref driver) = engine.driver {
        if !driver.is_file() {
            return Err(EngineError::DriverNotFound(driver.clone()));
        }
        return Ok((driver.clone(), None));
    }

    let dir = tempfile::Builder::new().prefix("petta-kernel-").tempdir()?;
    let driver = dir.path().join(DRIVER_FILE_NAME);
    std::fs::write(&driver, DRIVER_SCRIPT)?;
    debug!(?driver, "wrote bundled driver script");
    Ok((driver, Some(dir)))
}
