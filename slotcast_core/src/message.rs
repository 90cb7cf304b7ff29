//! The message vocabulary agents broadcast and receive.

use crate::chain::{Chain, Slot};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Messages carried as the payload of `Broadcast`/`Receive` instructions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Message {
    /// Demonstration protocol: request.
    Ping,
    /// Demonstration protocol: reply.
    Pong,
    /// The clock announcing the current slot.
    Time(Slot),
    /// A leader publishing its freshly extended chain.
    NewChain(Chain),
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Message::Ping => write!(f, "ping"),
            Message::Pong => write!(f, "pong"),
            Message::Time(slot) => write!(f, "time {slot}"),
            Message::NewChain(chain) => write!(f, "chain {chain}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::Block;

    #[test]
    fn test_message_rendering_is_one_line() {
        let chain = Chain::genesis()
            .extend(Block { slot: 0, creator: 0 })
            .extend(Block { slot: 1, creator: 1 });

        assert_eq!(Message::Ping.to_string(), "ping");
        assert_eq!(Message::Pong.to_string(), "pong");
        assert_eq!(Message::Time(7).to_string(), "time 7");
        assert_eq!(
            Message::NewChain(chain).to_string(),
            "chain Genesis :> (0,0) :> (1,1)"
        );
    }
}
