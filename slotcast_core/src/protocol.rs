//! The protocol agents: the slot clock, the consensus node, and the
//! `ping`/`pong` demonstration pair.
//!
//! All four are ordinary values built from `pause`/`broadcast`/`receive`;
//! they carry their state (chain, last-known slot) in the arguments of the
//! tail-recursive step functions below, never in shared memory.

use crate::agent::{broadcast, pause, receive, Agent};
use crate::chain::{should_adopt, slot_leader, Block, Chain, NodeId, Slot};
use crate::message::Message;
use std::convert::Infallible;
use thiserror::Error;

/// An agent over the protocol vocabulary that runs forever.
pub type ProtocolAgent = Agent<Message, Infallible>;

/// Rejected agent configurations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    /// A run needs at least one node for slot leadership to be defined.
    #[error("node count must be at least 1")]
    EmptyNodeSet,

    /// Node ids are dense indices into the node set.
    #[error("node id {id} out of range for {nodes} nodes")]
    NodeIdOutOfRange { id: NodeId, nodes: u64 },
}

/// The slot clock: broadcast `Time(slot)`, pause one unit, increment,
/// forever, starting at slot 0.
pub fn clock() -> ProtocolAgent {
    tick(0)
}

fn tick(slot: Slot) -> ProtocolAgent {
    broadcast(Message::Time(slot))
        .and_then(|()| pause())
        .and_then(move |()| tick(slot + 1))
}

/// A consensus node in a run of `nodes` nodes.
///
/// Starting from genesis at slot 0, the node reacts to whatever arrives:
///
/// - `Time(slot)`: record the slot; if this node is its leader, mint a
///   block, extend the current chain, broadcast the result and adopt it.
/// - `NewChain(chain)`: adopt iff valid at the last-known slot and strictly
///   longer than the current chain; otherwise discard.
/// - anything else: ignore.
///
/// Fails fast on configurations with no defined leadership semantics.
pub fn node(nodes: u64, id: NodeId) -> Result<ProtocolAgent, ProtocolError> {
    if nodes == 0 {
        return Err(ProtocolError::EmptyNodeSet);
    }
    if id >= nodes {
        return Err(ProtocolError::NodeIdOutOfRange { id, nodes });
    }
    Ok(node_step(nodes, id, Chain::genesis(), 0))
}

fn node_step(nodes: u64, id: NodeId, chain: Chain, slot: Slot) -> ProtocolAgent {
    receive().and_then(move |msg| match msg {
        Message::Time(now) => {
            if slot_leader(nodes, now) == id {
                let extended = chain.extend(Block { slot: now, creator: id });
                broadcast(Message::NewChain(extended.clone()))
                    .and_then(move |()| node_step(nodes, id, extended, now))
            } else {
                node_step(nodes, id, chain, now)
            }
        }
        Message::NewChain(candidate) => {
            if should_adopt(nodes, slot, &candidate, &chain) {
                node_step(nodes, id, candidate, slot)
            } else {
                node_step(nodes, id, chain, slot)
            }
        }
        Message::Ping | Message::Pong => node_step(nodes, id, chain, slot),
    })
}

/// Demonstration agent: broadcasts `Ping`, waits for a `Pong`, pauses and
/// starts over. Receives its own `Ping` back (broadcasts are delivered to
/// the sender too) and filters it by pattern.
pub fn ping() -> ProtocolAgent {
    broadcast(Message::Ping)
        .and_then(|()| await_pong())
        .and_then(|()| pause())
        .and_then(|()| ping())
}

fn await_pong() -> Agent<Message, ()> {
    receive().and_then(|msg| match msg {
        Message::Pong => Agent::Done(()),
        _ => await_pong(),
    })
}

/// Demonstration agent: answers every `Ping` with a `Pong`, forever.
pub fn pong() -> ProtocolAgent {
    receive().and_then(|msg| match msg {
        Message::Ping => broadcast(Message::Pong).and_then(|()| pong()),
        _ => pong(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::Instr;

    /// Runs `agent` forward past any broadcasts, collecting them, until it
    /// suspends on something else.
    fn drain_broadcasts(mut agent: ProtocolAgent) -> (Vec<Message>, ProtocolAgent) {
        let mut sent = Vec::new();
        loop {
            match agent {
                Agent::Yield(Instr::Broadcast(msg, resume)) => {
                    sent.push(msg);
                    agent = resume();
                }
                other => return (sent, other),
            }
        }
    }

    /// Delivers `msg` to an agent suspended on receive.
    fn deliver(agent: ProtocolAgent, msg: Message) -> ProtocolAgent {
        match agent {
            Agent::Yield(Instr::Receive(resume)) => resume(msg),
            _ => panic!("agent is not blocked on receive"),
        }
    }

    fn resume_pause(agent: ProtocolAgent) -> ProtocolAgent {
        match agent {
            Agent::Yield(Instr::Pause(resume)) => resume(),
            _ => panic!("agent is not pausing"),
        }
    }

    #[test]
    fn test_clock_counts_slots() {
        let (sent, rest) = drain_broadcasts(clock());
        assert_eq!(sent, vec![Message::Time(0)]);

        let (sent, _) = drain_broadcasts(resume_pause(rest));
        assert_eq!(sent, vec![Message::Time(1)]);
    }

    #[test]
    fn test_node_rejects_bad_configuration() {
        assert_eq!(node(0, 0).unwrap_err(), ProtocolError::EmptyNodeSet);
        assert_eq!(
            node(3, 3).unwrap_err(),
            ProtocolError::NodeIdOutOfRange { id: 3, nodes: 3 }
        );
    }

    #[test]
    fn test_leader_extends_and_publishes_on_its_slot() {
        let agent = node(3, 0).unwrap();
        let agent = deliver(agent, Message::Time(0));

        let (sent, _) = drain_broadcasts(agent);
        let expected = Chain::genesis().extend(Block { slot: 0, creator: 0 });
        assert_eq!(sent, vec![Message::NewChain(expected)]);
    }

    #[test]
    fn test_non_leader_stays_silent_on_time() {
        let agent = node(3, 2).unwrap();
        let agent = deliver(agent, Message::Time(0));

        let (sent, _) = drain_broadcasts(agent);
        assert!(sent.is_empty());
    }

    #[test]
    fn test_node_adopts_longer_valid_chain() {
        let longer = Chain::genesis()
            .extend(Block { slot: 0, creator: 0 })
            .extend(Block { slot: 1, creator: 1 });

        // Node 2 learns slot 2, receives a longer chain, then leads slot 2:
        // its published chain must build on the adopted one.
        let agent = node(3, 2).unwrap();
        let agent = deliver(agent, Message::Time(1));
        let agent = deliver(agent, Message::NewChain(longer.clone()));
        let agent = deliver(agent, Message::Time(2));

        let (sent, _) = drain_broadcasts(agent);
        let expected = longer.extend(Block { slot: 2, creator: 2 });
        assert_eq!(sent, vec![Message::NewChain(expected)]);
    }

    #[test]
    fn test_node_discards_future_chain() {
        // Tip slot 5 is ahead of the node's last-known slot 0.
        let future = Chain::genesis()
            .extend(Block { slot: 0, creator: 0 })
            .extend(Block { slot: 5, creator: 2 });

        let agent = node(3, 1).unwrap();
        let agent = deliver(agent, Message::Time(0));
        let agent = deliver(agent, Message::NewChain(future));
        let agent = deliver(agent, Message::Time(4));

        // Slot 4 belongs to node 1; the minted block extends genesis, not
        // the discarded chain.
        let (sent, _) = drain_broadcasts(agent);
        let expected = Chain::genesis().extend(Block { slot: 4, creator: 1 });
        assert_eq!(sent, vec![Message::NewChain(expected)]);
    }

    #[test]
    fn test_node_ignores_ping_pong() {
        let agent = node(3, 0).unwrap();
        let agent = deliver(agent, Message::Ping);
        let agent = deliver(agent, Message::Pong);
        let agent = deliver(agent, Message::Time(0));

        let (sent, _) = drain_broadcasts(agent);
        assert_eq!(sent.len(), 1);
    }

    #[test]
    fn test_ping_filters_its_own_broadcast() {
        let (sent, agent) = drain_broadcasts(ping());
        assert_eq!(sent, vec![Message::Ping]);

        // Its own ping comes back first; only a pong releases it.
        let agent = deliver(agent, Message::Ping);
        let agent = deliver(agent, Message::Pong);
        let agent = resume_pause(agent);

        let (sent, _) = drain_broadcasts(agent);
        assert_eq!(sent, vec![Message::Ping]);
    }

    #[test]
    fn test_pong_answers_ping() {
        let agent = deliver(pong(), Message::Ping);
        let (sent, agent) = drain_broadcasts(agent);
        assert_eq!(sent, vec![Message::Pong]);

        // Its own pong echoes back and is ignored.
        let agent = deliver(agent, Message::Pong);
        let (sent, _) = drain_broadcasts(agent);
        assert!(sent.is_empty());
    }
}
