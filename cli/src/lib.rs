//! Governor CLI
//!
//! Drives a local deployment of the governance token, NFT collection,
//! governor and treasury through the whole proposal lifecycle. The
//! deployment is kept in a JSON state file between invocations.

pub mod commands;
pub mod config;
pub mod deployment;

pub use commands::Command;
pub use config::Config;
pub use deployment::Deployment;

use anyhow::{bail, Result};
use std::path::Path;

/// Deploy (or redeploy with `force`) and persist to `state`.
pub fn deploy(config: &Config, state: &Path, force: bool) -> Result<Deployment> {
    if state.exists() && !force {
        bail!(
            "deployment already exists at {} (use --force to replace it)",
            state.display()
        );
    }
    let deployment = Deployment::deploy(config)?;
    deployment.save(state)?;
    Ok(deployment)
}

/// Load the deployment at `state`, run `command` and save it back if the
/// command changed anything. Failed commands leave the file untouched.
pub fn run(state: &Path, command: Command) -> Result<Deployment> {
    let mut deployment = Deployment::load(state)?;
    let mutates = command.mutates();
    commands::run(&mut deployment, command)?;
    if mutates {
        deployment.save(state)?;
    }
    Ok(deployment)
}
