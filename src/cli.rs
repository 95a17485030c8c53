//! Command-line interface (CLI) argument parsing module.
//!
//! This module provides CLI argument parsing using `clap`. Without a
//! subcommand the interactive window starts; every window action also has a
//! one-shot subcommand.

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// CLI argument parser using clap derive macro.
///
/// # Example
///
/// ```ignore
/// let cli = Cli::parse();
/// match cli.command {
///     Some(Commands::Activate { profile }) => { /* ... */ }
///     None => { /* interactive mode */ }
///     _ => {}
/// }
/// ```
#[derive(Parser, Debug)]
#[command(
    name = "netopt",
    version,
    about = "Network optimization tool",
    long_about = "Switch DNS profiles, set adapter MTU, watch network stats and run speed tests",
    infer_subcommands = true
)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet mode (only errors)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "table")]
    pub format: OutputFormat,

    /// Settings file (JSON)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Network interface to configure (overrides the settings file)
    #[arg(short, long, global = true, env = "NETOPT_INTERFACE")]
    pub interface: Option<String>,

    /// Do not request administrator rights at start-up
    #[arg(long, global = true)]
    pub no_elevate: bool,

    /// Set on the relaunched, elevated process
    #[arg(long, global = true, hide = true)]
    pub elevated: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Output format for CLI commands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable text (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

impl OutputFormat {
    /// Get all available output format names.
    #[must_use]
    pub fn names() -> &'static [&'static str] {
        &["table", "json"]
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "json" => Ok(Self::Json),
            _ => Err(format!(
                "Unknown format: {}. Valid options are: {:?}",
                s,
                Self::names()
            )),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Table => write!(f, "table"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Available commands for the netopt CLI.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Launch the interactive window (default)
    #[command(alias = "i")]
    Interactive,

    /// Apply a DNS profile to the interface
    #[command(alias = "a")]
    Activate {
        /// Profile name (default: the settings' default_profile)
        #[arg(short, long)]
        profile: Option<String>,
    },

    /// Clear the static DNS servers of the interface
    #[command(alias = "d")]
    Deactivate,

    /// Set the interface MTU
    Mtu {
        /// MTU value (default: the settings' mtu)
        #[arg(short, long)]
        mtu: Option<u32>,
    },

    /// Ping a host once with the OS ping utility
    #[command(alias = "p")]
    Ping {
        /// Host to ping (default: the settings' ping_host)
        host: Option<String>,
    },

    /// Show the network stats line
    Stats,

    /// Run an internet speed test
    #[command(alias = "s")]
    Speed,

    /// Run traffic optimization
    Optimize,

    /// List the built-in DNS profiles
    #[command(alias = "l")]
    Profiles,

    /// Inspect or create the settings file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Target shell
        shell: clap_complete::Shell,
    },
}

/// `config` subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the effective settings
    Show,
    /// Write the default settings to a file
    Init {
        /// Output file path (default: the user config directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Parse CLI arguments.
#[must_use]
pub fn parse() -> Cli {
    Cli::parse()
}
