//! Governor CLI subcommands

use anyhow::{bail, Context, Result};
use clap::Subcommand;
use dao_core::{encode_call, Address, Token, TOKEN_UNIT};
use dao_votes::SourceRegistry;
use governance::{Ballot, ProposalActions, ProposalId, ProposalRequest, ProposalState, VoteType};
use owo_colors::OwoColorize;
use treasury::{EXECUTE_SIGNATURE, RELEASE_SIGNATURE};

use crate::deployment::{format_tokens, Deployment, DEPLOYER};

pub const DEFAULT_DESCRIPTION: &str = "Proposal #1: execute";

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Deploy a fresh token, NFT collection, governor and treasury
    Deploy {
        /// Overwrite an existing deployment
        #[arg(long)]
        force: bool,
    },

    /// Show balances, votes and delegates
    Accounts {
        /// Accounts to show (defaults to the deployer)
        accounts: Vec<String>,
    },

    /// Transfer governance tokens (whole tokens)
    Transfer {
        #[arg(long, default_value = DEPLOYER)]
        from: String,
        to: String,
        amount: u64,
    },

    /// Delegate voting power
    Delegate {
        account: String,
        /// Delegatee (defaults to the account itself)
        #[arg(long)]
        to: Option<String>,
        /// Delegate NFT votes instead of token votes
        #[arg(long)]
        nft: bool,
    },

    /// Allow accounts to claim governance tokens (whole tokens each)
    ClaimList {
        accounts: Vec<String>,
        #[arg(long)]
        amount: u64,
    },

    /// Claim governance tokens from the claim list
    Claim { account: String, amount: u64 },

    /// Reserve NFTs to the deployer
    NftReserve { count: u64 },

    /// Transfer NFTs from the deployer
    NftTransfer { to: String, count: u64 },

    /// Register an additional voting token with the governor
    AddToken {
        #[arg(default_value = "nft")]
        token: String,
    },

    /// Propose calling `execute()` on the treasury
    Propose {
        #[arg(long, default_value = DEFAULT_DESCRIPTION)]
        description: String,
        #[arg(long, default_value = DEPLOYER)]
        proposer: String,
        /// Voting token to pin (name, address or index)
        #[arg(long)]
        token: Option<String>,
        #[arg(long)]
        info_uri: Option<String>,
        /// Value sent to the treasury with the call (whole tokens)
        #[arg(long, default_value_t = 0)]
        value: u64,
        /// Also release funds to this account
        #[arg(long, requires = "release_amount")]
        release_to: Option<String>,
        #[arg(long)]
        release_amount: Option<u64>,
    },

    /// Cast a vote (against, for or abstain)
    Vote {
        proposal: String,
        support: VoteType,
        #[arg(long, default_value = DEPLOYER)]
        voter: String,
        #[arg(long)]
        reason: Option<String>,
        /// Token the vote is cast with
        #[arg(long)]
        token: Option<String>,
    },

    /// Mine blocks, or advance time by `--seconds` in one block
    Mine {
        #[arg(default_value_t = 1)]
        blocks: u64,
        #[arg(long)]
        seconds: Option<u64>,
    },

    /// Queue a succeeded proposal in the timelock
    Queue { proposal: String },

    /// Execute a successful proposal
    Execute { proposal: String },

    /// Cancel a proposal
    Cancel {
        proposal: String,
        #[arg(long, default_value = DEPLOYER)]
        caller: String,
    },

    /// Show a proposal's state and tally
    State { proposal: String },

    /// List all proposals
    List,

    /// Show governor settings and registered tokens
    Info,
}

impl Command {
    /// Whether the command changes the deployment.
    pub fn mutates(&self) -> bool {
        !matches!(
            self,
            Command::Accounts { .. } | Command::State { .. } | Command::List | Command::Info
        )
    }
}

fn tokens(amount: u64) -> u128 {
    u128::from(amount) * TOKEN_UNIT
}

fn ok(message: impl std::fmt::Display) {
    println!("{} {}", "✓".green(), message);
}

fn paint_state(state: ProposalState) -> String {
    let label = state.to_string();
    match state {
        ProposalState::Succeeded | ProposalState::Executed => label.green().to_string(),
        ProposalState::Defeated | ProposalState::Canceled | ProposalState::Expired => label.red().to_string(),
        ProposalState::Active | ProposalState::Queued => label.yellow().to_string(),
        ProposalState::Pending => label.bright_black().to_string(),
    }
}

/// Run a command other than `deploy` against a loaded deployment.
pub fn run(d: &mut Deployment, command: Command) -> Result<()> {
    match command {
        Command::Deploy { .. } => bail!("deploy is handled before a deployment exists"),

        Command::Accounts { accounts } => {
            let names = if accounts.is_empty() {
                vec![DEPLOYER.to_string()]
            } else {
                accounts
            };
            for name in names {
                show_account(d, &name)?;
            }
        }

        Command::Transfer { from, to, amount } => {
            let (from, to) = (d.account(&from)?, d.account(&to)?);
            let block = d.chain.number();
            d.tokens
                .fungible_mut(&d.token)?
                .transfer(from, to, tokens(amount), block)?;
            ok(format!("transferred {} GT {} -> {}", amount, from.short(), to.short()));
        }

        Command::Delegate { account, to, nft } => {
            let account = d.account(&account)?;
            let delegatee = match to {
                Some(to) => d.account(&to)?,
                None => account,
            };
            let block = d.chain.number();
            let token = if nft { d.nft } else { d.token };
            d.tokens.get_mut(&token)?.delegate(account, delegatee, block);
            ok(format!("{} delegated to {}", account.short(), delegatee.short()));
        }

        Command::ClaimList { accounts, amount } => {
            let accounts = accounts
                .iter()
                .map(|a| d.account(a))
                .collect::<Result<Vec<Address>>>()?;
            let deployer = d.deployer;
            d.tokens
                .fungible_mut(&d.token)?
                .set_claim_list(&deployer, &accounts, tokens(amount))?;
            ok(format!("{} account(s) may claim {} GT", accounts.len(), amount));
        }

        Command::Claim { account, amount } => {
            let account = d.account(&account)?;
            let block = d.chain.number();
            d.tokens
                .fungible_mut(&d.token)?
                .claim(account, tokens(amount), block)?;
            ok(format!("{} claimed {} GT", account.short(), amount));
        }

        Command::NftReserve { count } => {
            let (deployer, block) = (d.deployer, d.chain.number());
            d.tokens.nft_mut(&d.nft)?.reserve(&deployer, count, block)?;
            ok(format!("reserved {} NFT(s)", count));
        }

        Command::NftTransfer { to, count } => {
            let to = d.account(&to)?;
            let (deployer, block) = (d.deployer, d.chain.number());
            d.tokens
                .nft_mut(&d.nft)?
                .transfer_many(deployer, to, count, block)?;
            ok(format!("transferred {} NFT(s) to {}", count, to.short()));
        }

        Command::AddToken { token } => {
            let token = d.account(&token)?;
            let deployer = d.deployer;
            d.governor.add_token(&d.tokens, &deployer, token)?;
            ok(format!(
                "registered {} at index {}",
                token,
                d.governor.tokens().len() - 1
            ));
        }

        Command::Propose {
            description,
            proposer,
            token,
            info_uri,
            value,
            release_to,
            release_amount,
        } => {
            let proposer = d.account(&proposer)?;
            let mut actions = ProposalActions::single(d.treasury, tokens(value), encode_call(EXECUTE_SIGNATURE, &[]));
            if let (Some(to), Some(amount)) = (release_to, release_amount) {
                let to = d.account(&to)?;
                actions = actions.push(
                    d.treasury,
                    0,
                    encode_call(RELEASE_SIGNATURE, &[Token::Address(to), Token::Uint(tokens(amount))]),
                );
            }
            let mut request = ProposalRequest::new(actions, description);
            if let Some(token) = token {
                request = request.with_token(d.voting_token(&token)?);
            }
            if let Some(uri) = info_uri {
                request = request.with_info_uri(uri);
            }
            let head = d.chain.head();
            let id = d.governor.propose(&d.tokens, proposer, request, &head)?;
            ok(format!("proposal #{} created", d.governor.proposal_count()));
            println!("  id:     {}", id.bright_blue());
            println!(
                "  voting: blocks {}..={}",
                d.governor.proposal_snapshot(&id)?,
                d.governor.proposal_deadline(&id)?
            );
        }

        Command::Vote {
            proposal,
            support,
            voter,
            reason,
            token,
        } => {
            let id = d.proposal(&proposal)?;
            let voter = d.account(&voter)?;
            let mut ballot = Ballot::new(id, support);
            if let Some(reason) = reason {
                ballot = ballot.with_reason(reason);
            }
            if let Some(token) = token {
                ballot = ballot.with_token(d.voting_token(&token)?);
            }
            let head = d.chain.head();
            let weight = d.governor.cast_ballot(&d.tokens, voter, ballot, &head)?;
            ok(format!(
                "{} voted {} with weight {}",
                voter.short(),
                support,
                format_weight(d, &id, weight)?
            ));
        }

        Command::Mine { blocks, seconds } => {
            let head = match seconds {
                Some(seconds) => d.chain.advance_time(seconds),
                None => d.chain.mine(blocks),
            };
            ok(format!("head is block #{} (t={})", head.number, head.timestamp));
        }

        Command::Queue { proposal } => {
            let (id, actions, hash) = proposal_call(d, &proposal)?;
            let head = d.chain.head();
            d.governor.queue(&d.tokens, &actions, &hash, &head)?;
            let eta = d.governor.proposal_eta(&id)?.unwrap_or_default();
            ok(format!("proposal {} queued, executable at t={}", id.short(), eta));
        }

        Command::Execute { proposal } => {
            let (id, actions, hash) = proposal_call(d, &proposal)?;
            let head = d.chain.head();
            d.governor
                .execute(&d.tokens, &actions, &hash, &head, &mut d.contracts)?;
            ok(format!(
                "proposal {} executed; treasury has executed {} proposal(s)",
                id.short(),
                d.treasury()?.executed_proposals()
            ));
        }

        Command::Cancel { proposal, caller } => {
            let (id, actions, hash) = proposal_call(d, &proposal)?;
            let caller = d.account(&caller)?;
            let head = d.chain.head();
            d.governor
                .cancel(&d.tokens, &caller, &actions, &hash, &head)?;
            ok(format!("proposal {} canceled", id.short()));
        }

        Command::State { proposal } => {
            let id = d.proposal(&proposal)?;
            show_proposal(d, &id)?;
        }

        Command::List => {
            let ids = d.governor.proposal_ids();
            if ids.is_empty() {
                println!("no proposals");
            }
            let head = d.chain.head();
            for (i, id) in ids.iter().enumerate() {
                let state = d.governor.state(&d.tokens, id, &head)?;
                let record = d.governor.proposal(id)?;
                println!(
                    "#{:<3} {} {:<10} {}",
                    i + 1,
                    id.short().bright_blue(),
                    paint_state(state),
                    record.core.description
                );
            }
        }

        Command::Info => show_info(d)?,
    }
    Ok(())
}

fn proposal_call(d: &Deployment, reference: &str) -> Result<(ProposalId, ProposalActions, dao_core::H256)> {
    let id = d.proposal(reference)?;
    let record = d.governor.proposal(&id)?;
    Ok((id, record.core.actions.clone(), record.core.description_hash))
}

fn format_weight(d: &Deployment, id: &ProposalId, weight: u128) -> Result<String> {
    let token = d.governor.proposal_token(id)?;
    Ok(if token == d.token {
        format!("{} GT", format_tokens(weight))
    } else {
        weight.to_string()
    })
}

fn show_account(d: &Deployment, name: &str) -> Result<()> {
    let account = d.account(name)?;
    println!("{} {}", name.bold(), account.to_string().bright_black());
    for address in d.tokens.addresses() {
        let token = d.tokens.get(address)?;
        let source = d
            .tokens
            .source(address)
            .context("ledger token without a voting source")?;
        let (balance, votes) = if *address == d.token {
            (
                format_tokens(token.balance_of(&account)),
                format_tokens(source.get_votes(&account)),
            )
        } else {
            (
                token.balance_of(&account).to_string(),
                source.get_votes(&account).to_string(),
            )
        };
        let delegate = token
            .delegates(&account)
            .map(|a| a.short())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {:<5} balance {:>24}  votes {:>24}  delegate {}",
            token.symbol(),
            balance,
            votes.green(),
            delegate
        );
    }
    Ok(())
}

fn show_proposal(d: &Deployment, id: &ProposalId) -> Result<()> {
    let head = d.chain.head();
    let record = d.governor.proposal(id)?;
    let state = d.governor.state(&d.tokens, id, &head)?;
    let quorum = d.governor.proposal_quorum(&d.tokens, id)?;
    let (against, for_votes, abstain) = d.governor.proposal_votes(id)?;

    println!("\n{}", "📋 Proposal".cyan().bold());
    println!("═══════════════════════════════════");
    println!("Id:          {}", id.bright_blue());
    println!("Description: {}", record.core.description);
    println!("State:       {} ({})", paint_state(state), state.code());
    println!("Proposer:    {}", record.core.proposer);
    println!("Token:       {}", record.core.voting_token);
    println!(
        "Voting:      blocks {}..={} (head #{})",
        record.core.vote_start, record.core.vote_end, head.number
    );
    if let Some(uri) = &record.core.info_uri {
        println!("Info:        {}", uri);
    }
    if let Some(eta) = record.core.eta {
        println!("ETA:         t={}", eta);
    }
    println!("For:         {}", format_weight(d, id, for_votes)?.green());
    println!("Against:     {}", format_weight(d, id, against)?.red());
    println!("Abstain:     {}", format_weight(d, id, abstain)?);
    println!("Quorum:      {}", format_weight(d, id, quorum)?);
    println!("Voters:      {}", record.tally.voter_count());
    println!();
    Ok(())
}

fn show_info(d: &Deployment) -> Result<()> {
    let g = &d.governor;
    println!("\n{}", format!("🏛️  {}", g.name()).cyan().bold());
    println!("═══════════════════════════════════");
    println!("Address:            {}", g.address());
    println!("Owner:              {}", g.owner());
    println!("Info URI:           {}", g.info_uri());
    println!("Voting delay:       {} block(s)", g.voting_delay());
    println!("Voting period:      {} block(s)", g.voting_period());
    println!("Proposal threshold: {} GT", format_tokens(g.proposal_threshold()));
    println!("Quorum:             {}/{}", g.quorum_numerator(), g.quorum_denominator());
    match g.timelock() {
        Some(t) => println!(
            "Timelock:           {} (delay {}s, grace {}s)",
            t.address(),
            t.min_delay(),
            t.grace_period()
        ),
        None => println!("Timelock:           none"),
    }
    println!("Tokens:");
    for (i, address) in g.tokens().iter().enumerate() {
        let token = d.tokens.get(address)?;
        println!("  [{}] {} {}", i, token.symbol().yellow(), address);
    }
    let treasury = d.treasury()?;
    println!(
        "Treasury:           {} ({} executed, balance {} GT)",
        d.treasury,
        treasury.executed_proposals(),
        format_tokens(treasury.balance())
    );
    println!("Proposals:          {}", g.proposal_count());
    println!("Head:               #{}", d.chain.number());
    println!();
    Ok(())
}
