//! CLI parse: clap types for click-censor. No behavior; definitions only.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Click Censor - hide selected text, reveal it on demand
#[derive(Parser)]
#[command(name = "click-censor")]
#[command(about = "Hide and reveal selected page text through the context menu protocol")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (layered over the global config)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (default: off)
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the hashId of a text
    Hash {
        /// Text to fingerprint
        text: String,
    },
    /// Run the censor, hover, uncensor scenario against an in-memory page
    Simulate {
        /// Page text
        #[arg(long)]
        page: String,
        /// Text selected before clicking "hide"
        #[arg(long)]
        select: String,
        /// Stop after hovering, leaving the text censored
        #[arg(long)]
        no_uncensor: bool,
    },
    /// Print the effective configuration as TOML
    Config,
}
