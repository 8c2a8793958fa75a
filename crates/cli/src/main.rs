//! # FELT Registry CLI
//!
//! Operator tool over a registry snapshot file. The caller identity of each
//! write is the `--caller` address; the tool trusts it as given.
//!
//! ## Environment Variables
//!
//! - `FELT_REGISTRY_SNAPSHOT`: snapshot path (overridden by `--snapshot`)
//! - `FELT_REGISTRY_LOG`: log filter when `RUST_LOG` is unset
//! - `RUST_LOG`: standard `tracing_subscriber` filter
//!
//! Logs go to stderr; stdout only carries command output.

mod cmd_membership;
mod cmd_query;
mod context;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use felt_registry::{Address, Bytes32};

use crate::cmd_membership::Write;
use crate::context::Context;

#[derive(Parser)]
#[command(author = "FELT", version, about = "FELT membership registry CLI")]
struct Cli {
    /// Registry config file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Registry snapshot file (overrides config and environment)
    #[arg(long, global = true)]
    snapshot: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new registry snapshot seated with founding members
    Init {
        /// Founder address (repeatable). Defaults to the config's founders.
        #[arg(long = "founder")]
        founders: Vec<Address>,
        /// Overwrite an existing snapshot
        #[arg(long)]
        force: bool,
    },

    /// Submit a join request for the caller
    RequestJoin {
        #[arg(long)]
        caller: Address,
        /// X coordinate of the caller's public key (32 bytes hex)
        #[arg(long)]
        public_key: Bytes32,
        /// Public key has odd Y
        #[arg(long)]
        odd: bool,
    },

    /// Admit the most recent pending request
    Accept {
        #[arg(long)]
        caller: Address,
        #[arg(long)]
        secret0: Bytes32,
        #[arg(long)]
        secret1: Bytes32,
        #[arg(long)]
        secret2: Bytes32,
        /// Shared-secret parity chosen by the accepting member
        #[arg(long)]
        odd: bool,
    },

    /// Decline the most recent pending request
    Decline {
        #[arg(long)]
        caller: Address,
    },

    /// Activate the caller's node
    Activate {
        #[arg(long)]
        caller: Address,
    },

    /// Deactivate the caller's node
    Deactivate {
        #[arg(long)]
        caller: Address,
    },

    /// Show an identity's status
    Status {
        address: Address,
        #[arg(long)]
        json: bool,
    },

    /// List registered nodes
    Nodes {
        #[arg(long)]
        json: bool,
    },

    /// List pending requests, oldest first
    Requests {
        #[arg(long)]
        json: bool,
    },

    /// Counters and state root
    Summary {
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn execute(ctx: &Context, cmd: Commands) -> Result<String> {
    let value = match cmd {
        Commands::Init { founders, force } => cmd_membership::init(ctx, &founders, force)?,
        Commands::RequestJoin { caller, public_key, odd } => cmd_membership::apply(
            ctx,
            Write::RequestJoin { caller, parity: odd, public_key },
        )?,
        Commands::Accept { caller, secret0, secret1, secret2, odd } => cmd_membership::apply(
            ctx,
            Write::Accept { caller, parity: odd, secrets: [secret0, secret1, secret2] },
        )?,
        Commands::Decline { caller } => cmd_membership::apply(ctx, Write::Decline { caller })?,
        Commands::Activate { caller } => cmd_membership::apply(ctx, Write::Activate { caller })?,
        Commands::Deactivate { caller } => {
            cmd_membership::apply(ctx, Write::Deactivate { caller })?
        }
        Commands::Status { address, json } => return cmd_query::status(&ctx.load()?, &address, json),
        Commands::Nodes { json } => return cmd_query::nodes(&ctx.load()?, json),
        Commands::Requests { json } => return cmd_query::requests(&ctx.load()?, json),
        Commands::Summary { json } => return cmd_query::summary(&ctx.load()?, json),
    };
    Ok(serde_json::to_string_pretty(&value)?)
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let ctx = Context::resolve(cli.config.as_deref(), cli.snapshot)?;
    init_tracing(&ctx.config.log_filter);

    let output = execute(&ctx, cli.cmd)?;
    println!("{}", output);
    Ok(())
}

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}
