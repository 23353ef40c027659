//! Client side of the content protocol: spawns the agent as a child
//! process, writes request lines to its stdin and correlates response
//! lines from its stdout back to callers by id.

use std::collections::HashMap;
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, Command};
use tokio::sync::{oneshot, Mutex};

use crate::errors::RetmapError;

type Pending = Arc<Mutex<HashMap<u64, oneshot::Sender<Result<Value, RetmapError>>>>>;

/// Handle to a running content agent process.
pub struct ContentAgent {
    child: Child,
    stdin: Mutex<ChildStdin>,
    pending: Pending,
    next_id: AtomicU64,
}

impl ContentAgent {
    /// Spawn `program args...` with piped stdio and start the response
    /// reader task.
    pub fn spawn(program: &str, args: &[&str]) -> Result<Self, RetmapError> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| RetmapError::Protocol(String::from("child stdin not piped")))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| RetmapError::Protocol(String::from("child stdout not piped")))?;

        let pending: Pending = Arc::new(Mutex::new(HashMap::new()));
        tokio::spawn(read_responses(BufReader::new(stdout), Arc::clone(&pending)));

        Ok(Self {
            child,
            stdin: Mutex::new(stdin),
            pending,
            next_id: AtomicU64::new(1),
        })
    }

    /// Send one request and wait for its response. Responses arrive in
    /// whatever order the agent finishes them; the id does the matching.
    pub async fn call(&self, name: &str, args: Value) -> Result<Value, RetmapError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        self.pending.lock().await.insert(id, tx);

        let mut line = serde_json::to_string(&json!({ "id": id, "name": name, "args": args }))?;
        line.push('\n');
        {
            let mut stdin = self.stdin.lock().await;
            if stdin.write_all(line.as_bytes()).await.is_err() || stdin.flush().await.is_err() {
                self.pending.lock().await.remove(&id);
                return Err(RetmapError::AgentClosed);
            }
        }

        rx.await.map_err(|_| RetmapError::AgentClosed)?
    }

    /// Sanitize HTML via the agent.
    pub async fn purify(&self, html: &str) -> Result<String, RetmapError> {
        expect_string(self.call("purify", Value::String(html.to_owned())).await?)
    }

    /// Typeset TeX segments via the agent.
    pub async fn typeset(&self, text: &str) -> Result<String, RetmapError> {
        expect_string(self.call("mathjax", Value::String(text.to_owned())).await?)
    }

    /// Liveness check: the agent echoes the argument back.
    pub async fn ping(&self) -> Result<(), RetmapError> {
        let reply = self.call("test", json!("ping")).await?;
        if reply == json!("ping") {
            Ok(())
        } else {
            Err(RetmapError::Protocol(format!("unexpected ping reply: {reply}")))
        }
    }

    /// Shut the agent down and fail every request still in flight.
    pub async fn close(mut self) -> Result<(), RetmapError> {
        // Dropping the caller's sender of each pending slot resolves the
        // receiver with RecvError, which call() maps to AgentClosed.
        self.pending.lock().await.clear();
        self.child.start_kill()?;
        self.child.wait().await?;
        Ok(())
    }
}

fn expect_string(value: Value) -> Result<String, RetmapError> {
    match value {
        Value::String(s) => Ok(s),
        other => Err(RetmapError::Protocol(format!("expected string result, got {other}"))),
    }
}

async fn read_responses<R>(reader: BufReader<R>, pending: Pending)
where
    R: tokio::io::AsyncRead + Unpin,
{
    let mut lines = reader.lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) | Err(_) => break,
        };
        let parsed: Value = match serde_json::from_str(&line) {
            Ok(parsed) => parsed,
            Err(err) => {
                tracing::warn!(%err, "discarding unparseable agent line");
                continue;
            }
        };
        let Some(id) = parsed.get("id").and_then(Value::as_u64) else {
            tracing::warn!("agent response without id");
            continue;
        };
        let Some(tx) = pending.lock().await.remove(&id) else {
            // Late reply for a caller that gave up.
            continue;
        };
        let outcome = match parsed.get("error").and_then(Value::as_str) {
            Some(message) => Err(RetmapError::Protocol(message.to_owned())),
            None => Ok(parsed.get("result").cloned().unwrap_or(Value::Null)),
        };
        let _ = tx.send(outcome);
    }
    // End of stream: the agent is gone, nobody pending will ever hear back.
    pending.lock().await.clear();
}
