use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Cachet completion client
#[derive(Debug, Parser)]
#[command(name = "cachet", about = "Caching, streaming chat completion client")]
pub struct Args {
    /// Path to configuration file; the environment alone is used when it does not exist
    #[arg(short, long, default_value = "cachet.toml", env = "CACHET_CONFIG")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the models the endpoint serves
    Models,
    /// Complete a single prompt
    Complete(CompleteArgs),
}

#[derive(Debug, clap::Args)]
pub struct CompleteArgs {
    /// Model to use instead of the configured default
    #[arg(short, long)]
    pub model: Option<String>,

    /// Ask for a JSON object response
    #[arg(long)]
    pub json: bool,

    /// Neither read nor write the response cache
    #[arg(long)]
    pub no_cache: bool,

    /// Send a reproducibility seed
    #[arg(long)]
    pub seed: bool,

    /// System instruction sent before the prompt
    #[arg(short, long)]
    pub system: Option<String>,

    /// Prompt text
    pub prompt: String,
}
