//! CLI interface for trade-journal
//!
//! Provides subcommands for:
//! - `plan`: Evaluate a trade plan without recording it
//! - `size`: Risk-based position size
//! - `open`: Record a new position
//! - `exit`: Exit part or all of a position
//! - `guard`: Discipline state for a day
//! - `list`: Show positions and executions
//! - `export` / `import`: Copy the journal out or replace it
//! - `config`: Show the effective configuration

mod exit;
mod plan;
mod review;
mod size;
mod transfer;

pub use exit::ExitArgs;
pub use plan::{OpenArgs, PlanArgs, TradeArgs};
pub use review::{GuardArgs, ListArgs};
pub use size::SizeArgs;
pub use transfer::{ExportArgs, ImportArgs};

use crate::config::Config;
use crate::data::{CsvStore, LedgerStore};
use crate::ledger::{Ledger, PositionId};
use crate::session::Session;
use anyhow::{bail, Context as _};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "trade-journal")]
#[command(about = "Trading journal with trade economics and discipline guardrails")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,

    /// Journal directory, overrides `ledger.data_dir`
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Evaluate a trade plan without recording it
    Plan(PlanArgs),
    /// Risk-based position size for an entry and stop
    Size(SizeArgs),
    /// Record a new position
    Open(OpenArgs),
    /// Exit part or all of a position
    Exit(ExitArgs),
    /// Discipline state for a trading day
    Guard(GuardArgs),
    /// Show positions and executions
    List(ListArgs),
    /// Write the journal to another directory
    Export(ExportArgs),
    /// Replace the journal with another one
    Import(ImportArgs),
    /// Show the effective configuration
    Config,
}

/// State shared by the subcommands
pub struct Context {
    pub session: Session,
    pub store: CsvStore,
    pub config: Config,
    pub json: bool,
}

impl Context {
    /// Load the journal named by the config (or `--data-dir`)
    pub fn load(config: Config, data_dir: Option<PathBuf>, json: bool) -> anyhow::Result<Self> {
        let dir = data_dir.unwrap_or_else(|| config.ledger.data_dir.clone());
        let store = CsvStore::new(dir);
        let session = Session::load(&store, &config)
            .with_context(|| format!("loading journal from {}", store.dir().display()))?;
        Ok(Self {
            session,
            store,
            config,
            json,
        })
    }

    /// Persist the session's ledger
    pub fn save(&self) -> anyhow::Result<()> {
        self.store
            .save(self.session.ledger())
            .with_context(|| format!("saving journal to {}", self.store.dir().display()))
    }

    /// Print a value as pretty JSON
    pub fn print_json<T: Serialize>(&self, value: &T) -> anyhow::Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }
}

impl Cli {
    /// Run the selected subcommand
    pub fn execute(self, config: Config) -> anyhow::Result<()> {
        if let Commands::Config = self.command {
            return show_config(&config, self.json);
        }

        let mut ctx = Context::load(config, self.data_dir, self.json)?;
        match self.command {
            Commands::Plan(args) => args.execute(&ctx),
            Commands::Size(args) => args.execute(&ctx),
            Commands::Open(args) => args.execute(&mut ctx),
            Commands::Exit(args) => args.execute(&mut ctx),
            Commands::Guard(args) => args.execute(&ctx),
            Commands::List(args) => args.execute(&ctx),
            Commands::Export(args) => args.execute(&ctx),
            Commands::Import(args) => args.execute(&mut ctx),
            Commands::Config => Ok(()),
        }
    }
}

fn show_config(config: &Config, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(config)?);
    } else {
        println!("{}", toml::to_string_pretty(config)?);
    }
    Ok(())
}

/// Find a position by full id or unique id prefix
pub fn resolve_position(ledger: &Ledger, id: &str) -> anyhow::Result<PositionId> {
    if let Ok(id) = id.parse::<PositionId>() {
        return Ok(id);
    }

    let prefix = id.trim().to_ascii_lowercase();
    if prefix.is_empty() {
        bail!("empty position id");
    }
    let mut matches = ledger
        .positions()
        .iter()
        .filter(|p| p.id.to_string().starts_with(&prefix));

    match (matches.next(), matches.next()) {
        (Some(position), None) => Ok(position.id),
        (None, _) => bail!("no position matches {id:?}"),
        (Some(_), Some(_)) => bail!("{id:?} matches more than one position; use more characters"),
    }
}
