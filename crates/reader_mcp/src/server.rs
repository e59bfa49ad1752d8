//! Newline-delimited JSON-RPC transport
//!
//! Every request line is handled on its own task so a slow upstream call
//! does not hold up the rest. Responses are written as they complete; the
//! host matches them by id.

use crate::McpServer;
use reader_common::Result;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::task::JoinSet;

/// Serve requests from `input` until it closes and all in-flight requests finish
pub async fn serve<R, W>(server: Arc<McpServer>, input: R, mut output: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    let mut in_flight: JoinSet<Option<String>> = JoinSet::new();
    let mut input_open = true;

    while input_open || !in_flight.is_empty() {
        tokio::select! {
            line = lines.next_line(), if input_open => match line {
                Ok(Some(line)) => {
                    // Skip empty lines
                    if !line.trim().is_empty() {
                        let server = server.clone();
                        in_flight.spawn(async move { server.handle_line(&line).await });
                    }
                }
                Ok(None) => input_open = false,
                Err(e) => {
                    tracing::error!("Error reading stdin: {}", e);
                    input_open = false;
                }
            },
            Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => match joined {
                Ok(Some(response)) => write_line(&mut output, &response).await?,
                Ok(None) => {}
                Err(e) => tracing::error!("Request task failed: {}", e),
            },
            else => break,
        }
    }

    Ok(())
}

async fn write_line<W>(output: &mut W, line: &str) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    output.write_all(line.as_bytes()).await?;
    output.write_all(b"\n").await?;
    output.flush().await?;
    Ok(())
}
