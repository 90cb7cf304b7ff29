//! Scenario registry: named agent sets runnable on either interpreter.

use slotcast_core::{clock, node, ping, pong, ProtocolAgent, ProtocolError};
use std::fmt;
use std::str::FromStr;

/// A named, ready-to-run set of protocol agents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    /// The slot clock plus `nodes` consensus nodes.
    Consensus,
    /// The two-agent ping/pong demonstration.
    PingPong,
}

impl Scenario {
    pub fn all() -> Vec<Scenario> {
        vec![Scenario::Consensus, Scenario::PingPong]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Scenario::Consensus => "consensus",
            Scenario::PingPong => "ping_pong",
        }
    }

    /// Builds the agent list for this scenario, in scheduling order.
    ///
    /// `nodes` is the consensus node count; the ping/pong scenario
    /// ignores it.
    pub fn agents(&self, nodes: u64) -> Result<Vec<ProtocolAgent>, ProtocolError> {
        match self {
            Scenario::Consensus => {
                if nodes == 0 {
                    return Err(ProtocolError::EmptyNodeSet);
                }
                let mut agents = vec![clock()];
                for id in 0..nodes {
                    agents.push(node(nodes, id)?);
                }
                Ok(agents)
            }
            Scenario::PingPong => Ok(vec![ping(), pong()]),
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Scenario {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "consensus" => Ok(Scenario::Consensus),
            "ping_pong" | "ping-pong" => Ok(Scenario::PingPong),
            other => Err(format!(
                "unknown scenario '{other}' (available: consensus, ping_pong)"
            )),
        }
    }
}
