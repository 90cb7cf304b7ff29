//! The serialized output sink shared by all agents in a run.

use crate::error::RunError;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::io::{AsyncWriteExt, Stdout};
use tokio::sync::Mutex;

/// Destination for one rendered line per broadcast.
///
/// Implementations must write each line atomically: two agents
/// broadcasting at the same instant may be ordered either way, but their
/// lines never interleave character by character.
#[async_trait]
pub trait OutputSink: Send + Sync {
    /// Emits one line (without trailing newline).
    async fn emit(&self, line: &str) -> Result<(), RunError>;
}

/// Production sink writing to stdout.
///
/// A mutex around the handle makes each emitted line atomic; the lock is
/// scoped to the call and released on every exit path.
pub struct StdoutSink {
    out: Mutex<Stdout>,
}

impl StdoutSink {
    pub fn new() -> Self {
        Self {
            out: Mutex::new(tokio::io::stdout()),
        }
    }

    /// Creates an Arc-wrapped sink for sharing across a run.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

impl Default for StdoutSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OutputSink for StdoutSink {
    async fn emit(&self, line: &str) -> Result<(), RunError> {
        let mut buf = Vec::with_capacity(line.len() + 1);
        buf.extend_from_slice(line.as_bytes());
        buf.push(b'\n');

        let mut out = self.out.lock().await;
        out.write_all(&buf)
            .await
            .map_err(|e| RunError::sink(e.to_string()))?;
        out.flush().await.map_err(|e| RunError::sink(e.to_string()))
    }
}

/// Capturing sink for tests: records every emitted line in order.
#[derive(Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// The lines emitted so far.
    pub async fn lines(&self) -> Vec<String> {
        self.lines.lock().await.clone()
    }
}

#[async_trait]
impl OutputSink for MemorySink {
    async fn emit(&self, line: &str) -> Result<(), RunError> {
        self.lines.lock().await.push(line.to_string());
        Ok(())
    }
}
