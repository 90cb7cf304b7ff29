//! Slotcast Deterministic Simulator
//!
//! A single-threaded discrete-event interpreter for `slotcast_core`
//! agents. Where `slotcast_env` uses real tasks and real sleeps, this
//! crate replaces every source of nondeterminism with data structures:
//!
//! - **Time**: a virtual clock that advances to the next wake-up only when
//!   no agent can make progress at the current instant.
//! - **Scheduling**: agents run in their input-list order; an
//!   earlier-indexed agent's broadcast is fully delivered (including any
//!   unblocking) before a later-indexed agent's turn.
//! - **Transport**: per-agent FIFO inboxes; every broadcast reaches every
//!   agent exactly once, the sender included.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                     Simulation                       │
//! │   virtual clock ── min wake-up among sleeping tasks  │
//! │                                                      │
//! │   ready ──run to suspension──► sleeping / waiting    │
//! │     ▲                               │                │
//! │     └── broadcast delivery ◄────────┘                │
//! │                                                      │
//! │   every broadcast ──► (time, message) trace event    │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! The trace is produced lazily through `Iterator`, so never-ending agent
//! sets (the consensus protocol, ping/pong) are consumed one finite prefix
//! at a time. Re-running the same agent list reproduces the identical
//! trace.

mod scenario;
mod schedule;

pub use scenario::Scenario;
pub use schedule::{Simulation, VirtualTime};
