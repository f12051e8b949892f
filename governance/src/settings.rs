//! Governor parameters

use dao_core::{BlockNumber, TOKEN_UNIT};
use serde::{Deserialize, Serialize};

use crate::error::{GovernanceError, Result};

/// Quorum numerators are percentages.
pub const QUORUM_DENOMINATOR: u128 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernorSettings {
    /// Blocks between proposal creation and the voting snapshot
    pub voting_delay: BlockNumber,
    /// Blocks the vote stays open after the snapshot
    pub voting_period: BlockNumber,
    /// Votes a proposer needs in the pinned source, in base units
    pub proposal_threshold: u128,
    /// Percentage of past total supply that must take part
    pub quorum_numerator: u128,
}

impl Default for GovernorSettings {
    fn default() -> Self {
        Self {
            voting_delay: crate::config::VOTING_DELAY_BLOCKS,
            voting_period: crate::config::VOTING_PERIOD_BLOCKS,
            proposal_threshold: crate::config::PROPOSAL_THRESHOLD_TOKENS as u128 * TOKEN_UNIT,
            quorum_numerator: crate::config::QUORUM_PERCENTAGE,
        }
    }
}

impl GovernorSettings {
    pub fn validate(&self) -> Result<()> {
        if self.quorum_numerator > QUORUM_DENOMINATOR {
            return Err(GovernanceError::InvalidSettings(format!(
                "quorum numerator {} over denominator {}",
                self.quorum_numerator, QUORUM_DENOMINATOR
            )));
        }
        if self.voting_period == 0 {
            return Err(GovernanceError::InvalidSettings(
                "voting period must be at least one block".to_string(),
            ));
        }
        Ok(())
    }
}
