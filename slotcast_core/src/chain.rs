//! The consensus data model: blocks, chains, slot leadership and validity.
//!
//! Everything here is a pure value or a pure function of its arguments.
//! Chains are immutable; a node replaces its chain wholesale on adoption,
//! it never mutates blocks in place.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical time unit. Exactly one node is authorized to extend the chain
/// during each slot.
pub type Slot = u64;

/// Dense node identifier in `[0, n)` for a run of `n` nodes.
pub type NodeId = u64;

/// One block: the slot it was minted in and the node that minted it.
///
/// Blocks carry no payload; the protocol under test is about ordering and
/// leadership, not transaction content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Block {
    pub slot: Slot,
    pub creator: NodeId,
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.slot, self.creator)
    }
}

/// A genesis-rooted chain of blocks.
///
/// The empty chain is genesis itself. [`Chain::extend`] returns a fresh
/// chain, leaving the original untouched, so chains can be shared freely
/// between agents and across broadcast messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chain {
    blocks: Vec<Block>,
}

impl Chain {
    /// The empty chain.
    pub fn genesis() -> Self {
        Self { blocks: Vec::new() }
    }

    /// Returns a new chain with `block` appended at the tip.
    pub fn extend(&self, block: Block) -> Self {
        let mut blocks = self.blocks.clone();
        blocks.push(block);
        Self { blocks }
    }

    /// Number of blocks appended since genesis.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// True for genesis.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// The blocks in genesis-to-tip order.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// The most recently appended block, if any.
    pub fn tip(&self) -> Option<&Block> {
        self.blocks.last()
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Genesis")?;
        for block in &self.blocks {
            write!(f, " :> {block}")?;
        }
        Ok(())
    }
}

/// The node authorized to mint a block in `slot`, chosen round-robin.
///
/// # Panics
///
/// Panics if `nodes == 0`; leadership over an empty node set is a
/// configuration error and must never reach this function silently.
pub fn slot_leader(nodes: u64, slot: Slot) -> NodeId {
    assert!(nodes > 0, "slot leadership is undefined for an empty node set");
    slot % nodes
}

/// Checks whether `chain` is valid at `current_slot` for a run of `nodes`.
///
/// A chain is valid iff, walking genesis to tip:
/// 1. block slots are strictly increasing,
/// 2. every block's creator is the leader of its slot, and
/// 3. the tip is not from the future (`tip.slot <= current_slot`).
///
/// Genesis alone is always valid. Malformed chains evaluate to `false`;
/// nothing is mutated or partially applied.
pub fn chain_valid(nodes: u64, current_slot: Slot, chain: &Chain) -> bool {
    let mut previous: Option<Slot> = None;
    for block in chain.blocks() {
        if let Some(prev_slot) = previous {
            if block.slot <= prev_slot {
                return false;
            }
        }
        if slot_leader(nodes, block.slot) != block.creator {
            return false;
        }
        previous = Some(block.slot);
    }
    match chain.tip() {
        Some(tip) => tip.slot <= current_slot,
        None => true,
    }
}

/// The adoption rule: a node replaces `local` with `candidate` iff the
/// candidate is valid at the node's current slot and strictly longer.
/// Ties keep the local chain.
pub fn should_adopt(nodes: u64, current_slot: Slot, candidate: &Chain, local: &Chain) -> bool {
    chain_valid(nodes, current_slot, candidate) && candidate.len() > local.len()
}
