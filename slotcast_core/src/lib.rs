//! Slotcast Core - Suspendable Agents and Slot-Chain Consensus
//!
//! This crate owns everything the two slotcast interpreters share:
//!
//! - **Agents**: message-passing programs written against three primitive
//!   effects (pause one time unit, broadcast a message, block on receive),
//!   represented as explicit resumable state machines rather than host
//!   control flow.
//! - **Chain model**: blocks, genesis-rooted chains, round-robin slot
//!   leadership and the chain-validity predicate.
//! - **Protocol agents**: the `clock` and `node` roles of the consensus
//!   protocol, plus the `ping`/`pong` demonstration pair.
//!
//! Execution lives elsewhere: `slotcast_env` drives agents on a real tokio
//! runtime with real time, `slotcast_sim` drives the same agents through a
//! deterministic discrete-event scheduler. Neither is needed to construct
//! or unit-test an agent.
//!
//! # Example
//!
//! ```
//! use slotcast_core::{broadcast, pause, receive, Agent};
//!
//! // Greet, wait for an answer, report how long it was.
//! fn greeter() -> Agent<String, usize> {
//!     broadcast("hello".to_string())
//!         .and_then(|()| receive())
//!         .and_then(|reply: String| pause().map(move |()| reply.len()))
//! }
//! ```

pub mod agent;
pub mod chain;
pub mod message;
pub mod protocol;

pub use agent::{broadcast, pause, receive, Agent, Instr, Resume, ResumeWith};
pub use chain::{chain_valid, should_adopt, slot_leader, Block, Chain, NodeId, Slot};
pub use message::Message;
pub use protocol::{clock, node, ping, pong, ProtocolAgent, ProtocolError};
