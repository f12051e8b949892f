//! Block clock
//!
//! Governance time advances only through block production. Every state
//! changing call receives the block it executes in.

use serde::{Deserialize, Serialize};

pub type BlockNumber = u64;

/// Default block interval used by the local chain
pub const DEFAULT_SECONDS_PER_BLOCK: u64 = 12;

/// The block a call executes in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub number: BlockNumber,
    pub timestamp: u64,
}

impl Block {
    pub fn new(number: BlockNumber, timestamp: u64) -> Self {
        Self { number, timestamp }
    }
}

/// Monotonic local chain used by the harness and tests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chain {
    head: Block,
    seconds_per_block: u64,
}

impl Chain {
    pub fn new(genesis_timestamp: u64, seconds_per_block: u64) -> Self {
        Self {
            head: Block::new(0, genesis_timestamp),
            seconds_per_block,
        }
    }

    pub fn head(&self) -> Block {
        self.head
    }

    pub fn number(&self) -> BlockNumber {
        self.head.number
    }

    /// Produce `blocks` empty blocks and return the new head.
    pub fn mine(&mut self, blocks: u64) -> Block {
        self.head.number += blocks;
        self.head.timestamp += blocks * self.seconds_per_block;
        log::debug!("mined {} block(s), head is now #{}", blocks, self.head.number);
        self.head
    }

    /// Advance wall time without producing blocks beyond the next one.
    pub fn advance_time(&mut self, seconds: u64) -> Block {
        self.head.number += 1;
        self.head.timestamp += seconds.max(self.seconds_per_block);
        self.head
    }
}

impl Default for Chain {
    fn default() -> Self {
        Self::new(0, DEFAULT_SECONDS_PER_BLOCK)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mine_advances_number_and_time() {
        let mut chain = Chain::new(1_000, 12);
        let head = chain.mine(5);
        assert_eq!(head.number, 5);
        assert_eq!(head.timestamp, 1_060);
    }

    #[test]
    fn test_advance_time() {
        let mut chain = Chain::new(0, 12);
        let head = chain.advance_time(3_600);
        assert_eq!(head.number, 1);
        assert_eq!(head.timestamp, 3_600);
    }
}
