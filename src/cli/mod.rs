//! CLI for the knowledge gateway

pub mod serve;

use clap::{Parser, Subcommand};

/// Knowledge Gateway - OpenAI-compatible chat completions with
/// knowledge base retrieval augmentation
#[derive(Parser)]
#[command(name = "knowledge-gateway")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the gateway server
    Serve,
}
