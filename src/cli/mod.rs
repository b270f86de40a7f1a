//! CLI module for the evidence filter
//!
//! Provides subcommands:
//! - `verify`: rerank and verify candidate chunks for a query

pub mod verify;

use clap::{Parser, Subcommand};

/// Evidence filter - rerank and verify retrieved chunks with a judge model
#[derive(Parser)]
#[command(name = "evidence-filter")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Verify candidate chunks read from a JSON file
    Verify(verify::VerifyArgs),
}
