//! Slotcast Execution Environment - the real-time interpreter.
//!
//! This crate runs agents from `slotcast_core` against the real world:
//! each agent becomes its own tokio task, `pause` becomes a real sleep of
//! one tick, and broadcasts travel over one shared transport reaching every
//! agent in the run - the sender included.
//!
//! Shared resources are owned by the run, not ambient:
//!
//! - the broadcast transport (`tokio::sync::broadcast`, per-agent FIFO,
//!   subscribed before any task starts so nothing is ever missed), and
//! - the [`OutputSink`], which serializes whole lines so concurrent
//!   broadcasts never interleave mid-line.
//!
//! The deterministic counterpart of this crate is `slotcast_sim`, which
//! executes the same agents with no real time and no real concurrency.

mod error;
mod runtime;
mod sink;

pub use error::RunError;
pub use runtime::{RuntimeConfig, TokioRuntime};
pub use sink::{MemorySink, OutputSink, StdoutSink};
