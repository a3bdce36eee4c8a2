//! Line-delimited JSON transport for the kernel
//!
//! Each request and each response is one JSON object on its own line, tagged
//! by `msg_type`. Requests are handled strictly in order; an execute request
//! produces its stream message (if any) before its reply.

use std::ops::ControlFlow;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, instrument, warn};

use crate::engine::Engine;
use crate::kernel::Kernel;
use crate::types::{ExecuteReply, ExecuteRequest, KernelInfo, ShutdownReply, Stream};

/// Transport faults that end the serve loop
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode message: {0}")]
    Json(#[from] serde_json::Error),
}

/// Incoming requests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "msg_type", rename_all = "snake_case")]
pub enum Request {
    ExecuteRequest(ExecuteRequest),
    KernelInfoRequest,
    ShutdownRequest {
        #[serde(default)]
        restart: bool,
    },
}

/// Outgoing messages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "msg_type", rename_all = "snake_case")]
pub enum Message {
    Stream(Stream),
    ExecuteReply(ExecuteReply),
    KernelInfoReply(KernelInfo),
    ShutdownReply(ShutdownReply),
    /// A request line that could not be decoded
    Error { message: String },
}

/// Serve requests from `reader` until EOF or a shutdown request
///
/// The engine is shut down before this returns normally.
#[instrument(skip_all)]
pub async fn serve<E, R, W>(kernel: &Kernel<E>, reader: R, mut writer: W) -> Result<(), ProtocolError>
where
    E: Engine,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let request = match serde_json::from_str::<Request>(&line) {
            Ok(request) => request,
            Err(e) => {
                warn!(error = %e, "malformed request");
                let message = Message::Error {
                    message: format!("invalid request: {e}"),
                };
                write_message(&mut writer, &message).await?;
                continue;
            }
        };

        if handle(kernel, request, &mut writer).await?.is_break() {
            return Ok(());
        }
    }

    info!("input closed, shutting down");
    kernel.shutdown(false).await;
    Ok(())
}

async fn handle<E, W>(
    kernel: &Kernel<E>,
    request: Request,
    writer: &mut W,
) -> Result<ControlFlow<()>, ProtocolError>
where
    E: Engine,
    W: AsyncWrite + Unpin,
{
    match request {
        Request::ExecuteRequest(request) => {
            let execution = kernel.execute(&request).await;
            if let Some(stream) = execution.stream {
                write_message(writer, &Message::Stream(stream)).await?;
            }
            write_message(writer, &Message::ExecuteReply(execution.reply)).await?;
            Ok(ControlFlow::Continue(()))
        }
        Request::KernelInfoRequest => {
            let info = kernel.info().clone();
            write_message(writer, &Message::KernelInfoReply(info)).await?;
            Ok(ControlFlow::Continue(()))
        }
        Request::ShutdownRequest { restart } => {
            info!(restart, "shutdown requested");
            let reply = kernel.shutdown(restart).await;
            write_message(writer, &Message::ShutdownReply(reply)).await?;
            Ok(ControlFlow::Break(()))
        }
    }
}

async fn write_message<W>(writer: &mut W, message: &Message) -> Result<(), ProtocolError>
where
    W: AsyncWrite + Unpin,
{
    let mut line = serde_json::to_string(message)?;
    line.push('\n');
    writer.write_all(line.as_bytes()).await?;
    writer.flush().await?;
    debug!(len = line.len(), "wrote message");
    Ok(())
}
