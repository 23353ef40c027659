//! Line-oriented JSON request/response protocol served over any async
//! byte stream (stdin/stdout in production, an in-memory duplex in
//! tests).
//!
//! Each request line is `{"id": n, "name": "...", "args": ...}` and is
//! answered by exactly one `{"id": n, "result": ...}` or
//! `{"id": n, "error": "..."}` line. Requests run concurrently, so
//! responses may come back in any order; the id is the only correlation.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;

use crate::content::{sanitize, typeset};
use crate::errors::RetmapError;

#[derive(Debug, Deserialize)]
struct Request {
    id: u64,
    name: String,
    #[serde(default)]
    args: Value,
}

#[derive(Debug, Serialize)]
struct Response {
    id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl Response {
    fn ok(id: u64, result: Value) -> Self {
        Self { id, result: Some(result), error: None }
    }

    fn err(id: u64, message: String) -> Self {
        Self { id, result: None, error: Some(message) }
    }
}

/// Serve requests from `input` until it reaches end of stream, writing
/// one response line per request to `output`.
pub async fn serve<R, W>(input: R, mut output: W) -> Result<(), RetmapError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, mut rx) = mpsc::channel::<Response>(64);

    // Single writer: response lines must never interleave.
    let writer = tokio::spawn(async move {
        while let Some(response) = rx.recv().await {
            let mut line = match serde_json::to_string(&response) {
                Ok(line) => line,
                Err(err) => {
                    tracing::error!(id = response.id, %err, "failed to encode response");
                    continue;
                }
            };
            line.push('\n');
            if output.write_all(line.as_bytes()).await.is_err() {
                break;
            }
            if output.flush().await.is_err() {
                break;
            }
        }
    });

    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let request: Request = match serde_json::from_str(&line) {
            Ok(request) => request,
            Err(err) => {
                tracing::warn!(%err, "skipping malformed request line");
                continue;
            }
        };
        let tx = tx.clone();
        tokio::spawn(async move {
            let response = handle(request);
            let _ = tx.send(response).await;
        });
    }

    drop(tx);
    let _ = writer.await;
    Ok(())
}

fn handle(request: Request) -> Response {
    let Request { id, name, args } = request;
    match name.as_str() {
        "test" => Response::ok(id, args),
        "purify" => {
            // Fail open: anything that is not a string purifies to "".
            let html = args.as_str().unwrap_or_default();
            Response::ok(id, Value::String(sanitize::sanitize(html)))
        }
        "mathjax" => match args.as_str() {
            Some(text) => match typeset::typeset(text) {
                Ok(rendered) => Response::ok(id, Value::String(rendered)),
                Err(err) => Response::err(id, err.to_string()),
            },
            None => Response::err(id, String::from("mathjax expects a string argument")),
        },
        other => Response::err(id, format!("unknown operation: {other}")),
    }
}
