//! netopt - a small network optimization tool.
//!
//! This crate provides both a library API and a CLI tool for:
//! - Switching the adapter's DNS servers between built-in profiles
//! - Setting the adapter MTU
//! - Pinging a host and running an internet speed test
//! - An interactive TUI with a periodically refreshed stats line
//!
//! DNS and MTU changes are issued through `netsh` and need administrator
//! rights on Windows.
//!
//! # Library Usage
//!
//! ```ignore
//! use netopt::{NetworkUtils, Settings, find_profile};
//!
//! let utils = NetworkUtils::system(&Settings::default())?;
//! let profile = find_profile("Quad9").unwrap();
//! utils.change_dns(profile.primary, profile.secondary, "Ethernet").await?;
//!
//! let report = utils.run_speed_test().await?;
//! println!("{}", report.summary());
//! ```
//!
//! # CLI Usage
//!
//! ```bash
//! # Interactive TUI mode (default)
//! netopt
//!
//! # Apply or clear a DNS profile
//! netopt activate --profile Quad9
//! netopt deactivate
//!
//! # Adapter MTU
//! netopt mtu --mtu 1400 --interface Wi-Fi
//!
//! # Measurements
//! netopt ping 1.1.1.1
//! netopt speed --format json
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod net;
pub mod tui;

// Re-export commonly used types
pub use cli::{Cli, Commands, OutputFormat};
pub use config::{ConfigLoader, Settings};
pub use error::{Error, Result};
pub use net::{
    find_profile, ActivationState, DnsProfile, NetworkUtils, SpeedTestReport, StatsSnapshot,
    DNS_PROFILES,
};
