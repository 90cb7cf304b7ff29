//! Error types for the real-time interpreter.

use thiserror::Error;

/// Faults surfaced by a real-time run.
///
/// A fault in one agent never silently stops the others; it is reported in
/// that agent's slot of the run result.
#[derive(Debug, Error)]
pub enum RunError {
    /// A receiver fell behind the shared transport and messages were
    /// overwritten before it could observe them.
    #[error("transport lagged: receiver fell {0} messages behind")]
    Lagged(u64),

    /// The shared transport closed while an agent was still receiving.
    #[error("transport closed while the agent was receiving")]
    TransportClosed,

    /// Writing a line to the output sink failed.
    #[error("output sink failed: {0}")]
    Sink(String),

    /// The agent's task panicked or was cancelled.
    #[error("agent task failed: {0}")]
    AgentFailed(String),

    /// The run was configured with unusable parameters.
    #[error("invalid runtime configuration: {0}")]
    Config(String),
}

impl RunError {
    /// Creates a sink error.
    pub fn sink(msg: impl Into<String>) -> Self {
        Self::Sink(msg.into())
    }

    /// Creates a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
