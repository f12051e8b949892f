use anyhow::Result;
use clap::Parser;
use dao_cli::{Command, Config};
use owo_colors::OwoColorize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "governor")]
#[command(about = "Local DAO governor: propose, vote, queue and execute", version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Deployment state file (overrides `state_file` in the config)
    #[arg(short, long, value_name = "FILE", global = true)]
    state: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Err(e) = try_main() {
        eprintln!("{} {:#}", "✗".red().bold(), e);
        std::process::exit(1);
    }
}

fn try_main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;
    let state = cli.state.unwrap_or_else(|| config.state_path());

    match cli.command {
        Command::Deploy { force } => {
            let d = dao_cli::deploy(&config, &state, force)?;
            println!("{}", "🚀 Deployed local governor".green().bold());
            println!("  token:    {}", d.token);
            println!("  nft:      {}", d.nft);
            println!("  governor: {}", d.governor.address());
            if let Some(timelock) = d.governor.timelock() {
                println!("  timelock: {}", timelock.address());
            }
            println!("  treasury: {}", d.treasury);
            println!("  state:    {}", state.display());
        }
        command => {
            dao_cli::run(&state, command)?;
        }
    }
    Ok(())
}
