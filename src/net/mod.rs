//! Network module.
//!
//! This module provides the network settings operations:
//! - DNS and MTU changes through `netsh`
//! - Ping through the OS utility and native ICMP
//! - Internet speed testing
//! - Privilege elevation for the configuration commands

pub mod command;
pub mod elevation;
pub mod ping;
pub mod profiles;
pub mod speedtest;
pub mod types;
pub mod utils;

pub use command::{CommandOutput, CommandRunner, NetCommand, SystemRunner};
pub use profiles::{find_profile, DnsProfile, DNS_PROFILES};
pub use speedtest::{HttpSpeedTest, SpeedTestProvider};
pub use types::*;
pub use utils::NetworkUtils;
