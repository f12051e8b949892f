//! Local deployment persisted between CLI invocations

use anyhow::{bail, Context, Result};
use dao_core::{Address, Chain, ContractRegistry, H256, TOKEN_UNIT};
use dao_votes::{GovernanceNft, GovernanceToken, TokenLedger};
use governance::{Governor, GovernorParams, ProposalId, Role, Timelock};
use serde::{Deserialize, Serialize};
use std::path::Path;
use treasury::Treasury;

use crate::config::Config;

pub const DEPLOYER: &str = "deployer";

/// Everything the governor CLI operates on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deployment {
    pub chain: Chain,
    pub tokens: TokenLedger,
    pub governor: Governor,
    pub contracts: ContractRegistry<Treasury>,
    pub deployer: Address,
    pub token: Address,
    pub nft: Address,
    pub treasury: Address,
}

impl Deployment {
    /// Deploy token, collection, governor, optional timelock and treasury.
    pub fn deploy(config: &Config) -> Result<Self> {
        let mut chain = Chain::new(config.chain.genesis_timestamp, config.chain.seconds_per_block);
        let deployer = Address::from_label(DEPLOYER);
        let block = chain.mine(1).number;

        let mut tokens = TokenLedger::new();
        let token = tokens.insert(GovernanceToken::new(
            Address::from_label("governance-token"),
            config.token.name.clone(),
            config.token.symbol.clone(),
            deployer,
            u128::from(config.token.initial_supply) * TOKEN_UNIT,
            block,
        ));
        let mut collection = GovernanceNft::new(
            Address::from_label("governance-nft"),
            config.nft.name.clone(),
            config.nft.symbol.clone(),
            config.nft.max_supply,
            deployer,
        );
        if !config.nft.base_uri.is_empty() {
            collection.set_base_uri(&deployer, config.nft.base_uri.clone())?;
        }
        let nft = tokens.insert(collection);

        let governor_address = Address::from_label("governor");
        let params = GovernorParams {
            address: governor_address,
            name: config.governor.name.clone(),
            info_uri: config.governor.info_uri.clone(),
            owner: deployer,
            token,
            settings: config.governor.settings(),
        };
        let mut governor = Governor::new(params, &tokens).context("governor deployment failed")?;

        let mut treasury_owner = governor_address;
        if config.timelock.enabled {
            let timelock_address = Address::from_label("timelock");
            let mut timelock = Timelock::new(
                timelock_address,
                config.timelock.min_delay,
                config.timelock.grace_period,
                deployer,
            );
            timelock.grant_role(&deployer, Role::Proposer, governor_address)?;
            timelock.grant_role(&deployer, Role::Canceller, governor_address)?;
            timelock.grant_role(&deployer, Role::Executor, Address::ZERO)?;
            timelock.revoke_role(&deployer, Role::Admin, &deployer)?;
            governor = governor.with_timelock(timelock);
            treasury_owner = timelock_address;
        }

        let mut contracts = ContractRegistry::new();
        let treasury = contracts.deploy(Treasury::new(Address::from_label("treasury"), treasury_owner));

        log::info!("deployment complete at block {}", chain.number());
        Ok(Self {
            chain,
            tokens,
            governor,
            contracts,
            deployer,
            token,
            nft,
            treasury,
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).with_context(|| {
            format!("no deployment at {} (run `governor deploy` first)", path.display())
        })?;
        serde_json::from_str(&contents).with_context(|| format!("corrupt deployment state in {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
        log::debug!("saved deployment to {}", path.display());
        Ok(())
    }

    pub fn treasury(&self) -> Result<&Treasury> {
        self.contracts
            .get(&self.treasury)
            .context("treasury missing from deployment")
    }

    /// `deployer`, `treasury`, `governor`, `timelock`, a `0x` address, or any
    /// other label.
    pub fn account(&self, name: &str) -> Result<Address> {
        if name.starts_with("0x") {
            return name.parse().with_context(|| format!("invalid address {}", name));
        }
        Ok(match name {
            DEPLOYER => self.deployer,
            "treasury" => self.treasury,
            "governor" => self.governor.address(),
            "gt" | "token" => self.token,
            "nft" => self.nft,
            other => Address::from_label(other),
        })
    }

    /// A registered token by name, address or index in the governor.
    pub fn voting_token(&self, name: &str) -> Result<Address> {
        if let Ok(index) = name.parse::<usize>() {
            return Ok(self.governor.get_token_element(index)?);
        }
        self.account(name)
    }

    /// A proposal by `0x` id or by its 1-based position in creation order.
    pub fn proposal(&self, reference: &str) -> Result<ProposalId> {
        if reference.starts_with("0x") {
            let id: H256 = reference
                .parse()
                .with_context(|| format!("invalid proposal id {}", reference))?;
            return Ok(id);
        }
        let ids = self.governor.proposal_ids();
        let position: usize = reference
            .trim_start_matches('#')
            .parse()
            .with_context(|| format!("invalid proposal reference {}", reference))?;
        if position == 0 || position > ids.len() {
            bail!("no proposal #{} ({} proposals)", position, ids.len());
        }
        Ok(ids[position - 1])
    }
}

/// Base units as whole tokens, keeping a trimmed fraction.
pub fn format_tokens(amount: u128) -> String {
    let whole = amount / TOKEN_UNIT;
    let fraction = amount % TOKEN_UNIT;
    if fraction == 0 {
        return whole.to_string();
    }
    let digits = format!("{:018}", fraction);
    format!("{}.{}", whole, digits.trim_end_matches('0'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deploy_defaults() {
        let d = Deployment::deploy(&Config::default()).unwrap();
        assert_eq!(d.chain.number(), 1);
        assert_eq!(d.governor.token(), d.token);
        assert_eq!(d.governor.tokens().len(), 1);
        assert_eq!(d.treasury().unwrap().owner(), d.governor.address());
        assert!(d.governor.timelock().is_none());
    }

    #[test]
    fn test_deploy_with_timelock() {
        let mut config = Config::default();
        config.timelock.enabled = true;
        let d = Deployment::deploy(&config).unwrap();
        let timelock = d.governor.timelock().unwrap();
        assert_eq!(d.treasury().unwrap().owner(), timelock.address());
        assert!(timelock.has_role(Role::Proposer, &d.governor.address()));
        assert!(!timelock.has_role(Role::Admin, &d.deployer));
    }

    #[test]
    fn test_account_resolution() {
        let d = Deployment::deploy(&Config::default()).unwrap();
        assert_eq!(d.account("deployer").unwrap(), d.deployer);
        assert_eq!(d.account("alice").unwrap(), Address::from_label("alice"));
        let hex = d.treasury.to_string();
        assert_eq!(d.account(&hex).unwrap(), d.treasury);
        assert!(d.account("0xzz").is_err());
        assert_eq!(d.voting_token("0").unwrap(), d.token);
        assert!(d.voting_token("1").is_err());
        assert!(d.proposal("1").is_err());
    }

    #[test]
    fn test_format_tokens() {
        assert_eq!(format_tokens(1_000 * TOKEN_UNIT), "1000");
        assert_eq!(format_tokens(TOKEN_UNIT + TOKEN_UNIT / 2), "1.5");
        assert_eq!(format_tokens(0), "0");
    }
}
