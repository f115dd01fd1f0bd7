//! Command-line parsing for the prospect research tool.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the normalization/scoring code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "prospect",
    version,
    about = "Corporate donor-prospect research from SEC and Form 990 filings"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Research every configured company, print summaries, and write profile files.
    Research(ResearchArgs),
    /// Print the outreach priority table only (useful for scripting).
    Rank(ResearchArgs),
    /// Print a previously written profile JSON.
    Show(ShowArgs),
    /// Print the effective configuration as TOML.
    Config(ConfigArgs),
}

/// Common options for research runs.
#[derive(Debug, Args, Clone)]
pub struct ResearchArgs {
    /// TOML config file (defaults to $PROSPECT_CONFIG, then built-in defaults).
    #[arg(short, long, value_name = "TOML")]
    pub config: Option<PathBuf>,

    /// Restrict the run to these tickers (repeatable).
    #[arg(short, long = "ticker", value_name = "TICKER")]
    pub tickers: Vec<String>,

    /// Directory for per-company profiles and the combined run file.
    #[arg(short, long, default_value = "prospect_output")]
    pub output_dir: PathBuf,

    /// Do not write any files.
    #[arg(long)]
    pub no_write: bool,

    /// Also export the priority list to CSV.
    #[arg(long = "export-csv", value_name = "CSV")]
    pub export_csv: Option<PathBuf>,

    /// Show only the top-N prospects in the priority table (0 = all).
    #[arg(long, default_value_t = 0)]
    pub top: usize,

    /// Debug-level logging (overridden by RUST_LOG).
    #[arg(short, long)]
    pub verbose: bool,
}

/// Options for showing a saved profile.
#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Profile JSON file produced by `prospect research`.
    #[arg(value_name = "JSON")]
    pub profile: PathBuf,
}

/// Options for printing the configuration.
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// TOML config file to load and validate instead of the defaults.
    #[arg(short, long, value_name = "TOML")]
    pub config: Option<PathBuf>,
}
