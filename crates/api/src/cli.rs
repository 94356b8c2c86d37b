//! Command line interface

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Scheduled post generation and publishing.
#[derive(Debug, Parser)]
#[command(name = "autopost", version, about)]
pub struct Cli {
    /// Config file (TOML or JSON); defaults to probing standard locations
    #[arg(short, long, global = true, env = "AUTOPOST_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Run a cycle now and every interval until Ctrl-C
    Run,
    /// Run a single manual cycle and exit
    Once,
    /// Validate configuration and report readiness
    Check,
}

impl Cli {
    /// Subcommand to execute; `run` when none is given.
    pub fn command(&self) -> Command {
        self.command.unwrap_or(Command::Run)
    }
}
