//! `governor.toml` configuration
//!
//! Every section and field is optional; missing values fall back to the
//! defaults of a local test deployment.

use anyhow::{Context, Result};
use dao_core::TOKEN_UNIT;
use governance::{config as defaults, GovernorSettings};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "governor.toml";
pub const DEFAULT_STATE_FILE: &str = "governor-state.json";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub governor: GovernorConfig,
    pub token: TokenConfig,
    pub nft: NftConfig,
    pub timelock: TimelockConfig,
    pub chain: ChainConfig,
    pub state_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GovernorConfig {
    pub name: String,
    pub info_uri: String,
    pub voting_delay: u64,
    pub voting_period: u64,
    /// Whole tokens
    pub proposal_threshold: u64,
    pub quorum_percentage: u64,
}

impl Default for GovernorConfig {
    fn default() -> Self {
        Self {
            name: defaults::GOVERNOR_NAME.to_string(),
            info_uri: "https://governor.example.org/info".to_string(),
            voting_delay: defaults::VOTING_DELAY_BLOCKS,
            voting_period: defaults::VOTING_PERIOD_BLOCKS,
            proposal_threshold: defaults::PROPOSAL_THRESHOLD_TOKENS,
            quorum_percentage: defaults::QUORUM_PERCENTAGE as u64,
        }
    }
}

impl GovernorConfig {
    pub fn settings(&self) -> GovernorSettings {
        GovernorSettings {
            voting_delay: self.voting_delay,
            voting_period: self.voting_period,
            proposal_threshold: u128::from(self.proposal_threshold) * TOKEN_UNIT,
            quorum_numerator: u128::from(self.quorum_percentage),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TokenConfig {
    pub name: String,
    pub symbol: String,
    /// Whole tokens minted to the deployer
    pub initial_supply: u64,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            name: "Governor Token".to_string(),
            symbol: "GT".to_string(),
            initial_supply: 1_000_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NftConfig {
    pub name: String,
    pub symbol: String,
    pub max_supply: u64,
    pub base_uri: String,
}

impl Default for NftConfig {
    fn default() -> Self {
        Self {
            name: "Governance NFT".to_string(),
            symbol: "GNFT".to_string(),
            max_supply: 10_000,
            base_uri: String::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimelockConfig {
    pub enabled: bool,
    pub min_delay: u64,
    pub grace_period: u64,
}

impl Default for TimelockConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            min_delay: defaults::MIN_DELAY_SECS,
            grace_period: defaults::GRACE_PERIOD_SECS,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ChainConfig {
    pub seconds_per_block: u64,
    pub genesis_timestamp: u64,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            seconds_per_block: dao_core::block::DEFAULT_SECONDS_PER_BLOCK,
            genesis_timestamp: 1_700_000_000,
        }
    }
}

impl Config {
    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("invalid governor config")
    }

    /// Load `path`, or `governor.toml` in the working directory when it
    /// exists, or the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !default.exists() {
                    log::debug!("no {} found, using defaults", DEFAULT_CONFIG_FILE);
                    return Ok(Self::default());
                }
                default
            }
        };
        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_toml(&contents).with_context(|| format!("in {}", path.display()))
    }

    pub fn state_path(&self) -> PathBuf {
        self.state_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_FILE))
    }
}
