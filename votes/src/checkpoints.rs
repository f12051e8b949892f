//! Append-only value history indexed by block number

use dao_core::BlockNumber;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub from_block: BlockNumber,
    pub value: u128,
}

/// History of a single value. Entries are ordered by `from_block`; a write
/// in the same block as the last entry overwrites it, and a write dated
/// before the last entry is applied to the last entry's block, so earlier
/// history never changes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoints {
    entries: Vec<Checkpoint>,
}

impl Checkpoints {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `value` as of `block`. Returns `(previous, new)`.
    pub fn push(&mut self, block: BlockNumber, value: u128) -> (u128, u128) {
        match self.entries.last_mut() {
            Some(last) if block <= last.from_block => {
                if block < last.from_block {
                    log::warn!(
                        "checkpoint for block {} written after block {}; recording at {}",
                        block,
                        last.from_block,
                        last.from_block
                    );
                }
                let previous = last.value;
                last.value = value;
                (previous, value)
            }
            Some(last) => {
                let previous = last.value;
                self.entries.push(Checkpoint { from_block: block, value });
                (previous, value)
            }
            None => {
                self.entries.push(Checkpoint { from_block: block, value });
                (0, value)
            }
        }
    }

    pub fn latest(&self) -> u128 {
        self.entries.last().map(|c| c.value).unwrap_or(0)
    }

    /// Value at the end of `block`: the last entry with `from_block <= block`.
    pub fn upper_lookup(&self, block: BlockNumber) -> u128 {
        let idx = self.entries.partition_point(|c| c.from_block <= block);
        if idx == 0 {
            0
        } else {
            self.entries[idx - 1].value
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Checkpoint> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_before_first_checkpoint() {
        let mut cp = Checkpoints::new();
        cp.push(10, 5);
        assert_eq!(cp.upper_lookup(9), 0);
        assert_eq!(cp.upper_lookup(10), 5);
        assert_eq!(cp.upper_lookup(1_000), 5);
    }

    #[test]
    fn test_history_is_preserved() {
        let mut cp = Checkpoints::new();
        cp.push(1, 100);
        cp.push(4, 40);
        cp.push(9, 900);

        assert_eq!(cp.upper_lookup(3), 100);
        assert_eq!(cp.upper_lookup(4), 40);
        assert_eq!(cp.upper_lookup(8), 40);
        assert_eq!(cp.upper_lookup(9), 900);
        assert_eq!(cp.latest(), 900);
        assert_eq!(cp.len(), 3);
    }

    #[test]
    fn test_same_block_overwrites() {
        let mut cp = Checkpoints::new();
        cp.push(2, 10);
        assert_eq!(cp.push(2, 25), (10, 25));
        assert_eq!(cp.len(), 1);
        assert_eq!(cp.upper_lookup(2), 25);
    }

    #[test]
    fn test_stale_write_keeps_history_ordered() {
        let mut cp = Checkpoints::new();
        cp.push(2, 10);
        cp.push(5, 50);
        assert_eq!(cp.push(3, 30), (50, 30));

        assert_eq!(cp.len(), 2);
        assert_eq!(cp.upper_lookup(3), 10);
        assert_eq!(cp.upper_lookup(4), 10);
        assert_eq!(cp.upper_lookup(5), 30);
        assert_eq!(cp.latest(), 30);
    }
}
