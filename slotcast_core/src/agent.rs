//! The agent abstraction: suspendable programs over a small instruction set.
//!
//! An [`Agent`] is either finished ([`Agent::Done`]) or suspended at one
//! [`Instr`] holding the continuation that resumes it. Interpreters are plain
//! loops that pattern-match the current instruction, perform the matching
//! real-world (or simulated) action, and invoke the continuation to obtain
//! the next state. Nothing here performs I/O; constructing an agent is free
//! of side effects.

/// Continuation resumed with no value (`pause`, `broadcast`).
pub type Resume<M, A> = Box<dyn FnOnce() -> Agent<M, A> + Send>;

/// Continuation resumed with a delivered message (`receive`).
pub type ResumeWith<M, A> = Box<dyn FnOnce(M) -> Agent<M, A> + Send>;

/// One suspended instruction awaiting its interpreter.
///
/// The instruction set is closed: agents interact with the world only by
/// pausing, broadcasting and receiving. Protocol-specific vocabulary lives
/// in the message type `M`, not in new instruction variants.
pub enum Instr<M, A> {
    /// Suspend for one time unit, then resume with no value.
    Pause(Resume<M, A>),
    /// Deliver the message to every agent in the run (sender included),
    /// then resume once the send has been accepted.
    Broadcast(M, Resume<M, A>),
    /// Block until one message is delivered, then resume with it.
    Receive(ResumeWith<M, A>),
}

/// A suspendable message-passing program producing a value of type `A`.
///
/// Agents that intentionally run forever use [`std::convert::Infallible`]
/// as their result type, which makes "this never finishes" checkable.
pub enum Agent<M, A> {
    /// The program has finished with a result.
    Done(A),
    /// The program is suspended at an instruction.
    Yield(Instr<M, A>),
}

impl<M, A: std::fmt::Debug> std::fmt::Debug for Agent<M, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Agent::Done(a) => f.debug_tuple("Done").field(a).finish(),
            Agent::Yield(_) => f.write_str("Yield(..)"),
        }
    }
}

impl<M: Send + 'static, A: Send + 'static> Agent<M, A> {
    /// Sequences `self` with a continuation producing the next program.
    ///
    /// A finished program invokes `f` immediately, without a round trip
    /// through an interpreter. A suspended program stays suspended at the
    /// same instruction, with `f` folded into its continuation. This is
    /// what lets an interpreter resume a composite program one instruction
    /// at a time instead of re-running it from the start.
    pub fn and_then<B, F>(self, f: F) -> Agent<M, B>
    where
        B: Send + 'static,
        F: FnOnce(A) -> Agent<M, B> + Send + 'static,
    {
        match self {
            Agent::Done(value) => f(value),
            Agent::Yield(Instr::Pause(resume)) => {
                Agent::Yield(Instr::Pause(Box::new(move || resume().and_then(f))))
            }
            Agent::Yield(Instr::Broadcast(msg, resume)) => {
                Agent::Yield(Instr::Broadcast(msg, Box::new(move || resume().and_then(f))))
            }
            Agent::Yield(Instr::Receive(resume)) => {
                Agent::Yield(Instr::Receive(Box::new(move |msg| resume(msg).and_then(f))))
            }
        }
    }

    /// Transforms the eventual result without adding a suspension.
    pub fn map<B, F>(self, f: F) -> Agent<M, B>
    where
        B: Send + 'static,
        F: FnOnce(A) -> B + Send + 'static,
    {
        self.and_then(move |value| Agent::Done(f(value)))
    }
}

/// Suspends for exactly one time unit.
pub fn pause<M: Send + 'static>() -> Agent<M, ()> {
    Agent::Yield(Instr::Pause(Box::new(|| Agent::Done(()))))
}

/// Broadcasts `msg` to every agent in the run, the caller included.
pub fn broadcast<M: Send + 'static>(msg: M) -> Agent<M, ()> {
    Agent::Yield(Instr::Broadcast(msg, Box::new(|| Agent::Done(()))))
}

/// Blocks until exactly one message arrives and resumes with it.
pub fn receive<M: Send + 'static>() -> Agent<M, M> {
    Agent::Yield(Instr::Receive(Box::new(Agent::Done)))
}
