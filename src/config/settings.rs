//! Settings model.

use crate::error::{Error, Result};
use crate::net::profiles::{find_profile, DNS_PROFILES};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Smallest MTU accepted for IPv4 subinterfaces.
pub const MIN_MTU: u32 = 576;

/// Largest MTU accepted (jumbo frames).
pub const MAX_MTU: u32 = 9000;

/// Application settings.
///
/// Every field has a default, so a partial file only overrides what it names.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Adapter the netsh commands target
    pub interface: String,
    /// MTU applied by the "apply MTU" action
    pub mtu: u32,
    /// Profile preselected in the window and used by `activate`
    pub default_profile: String,
    /// Period of the stats refresh in seconds
    pub stats_interval_secs: u64,
    /// Host pinged by the ping action
    pub ping_host: String,
    pub speed_test: SpeedTestSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            interface: "Ethernet".into(),
            mtu: 1500,
            default_profile: DNS_PROFILES[0].name.into(),
            stats_interval_secs: 5,
            ping_host: "8.8.8.8".into(),
            speed_test: SpeedTestSettings::default(),
        }
    }
}

impl Settings {
    #[must_use]
    pub fn stats_interval(&self) -> Duration {
        Duration::from_secs(self.stats_interval_secs)
    }

    /// Reject values the tool cannot act on.
    ///
    /// # Errors
    ///
    /// Returns a config error naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        if self.interface.trim().is_empty() {
            return Err(Error::config("interface must not be empty"));
        }
        if !(MIN_MTU..=MAX_MTU).contains(&self.mtu) {
            return Err(Error::config(format!(
                "mtu {} outside {MIN_MTU}..={MAX_MTU}",
                self.mtu
            )));
        }
        if find_profile(&self.default_profile).is_none() {
            return Err(Error::config(format!(
                "unknown default_profile: {}",
                self.default_profile
            )));
        }
        if self.stats_interval_secs == 0 {
            return Err(Error::config("stats_interval_secs must be at least 1"));
        }
        let host = self.ping_host.trim();
        if host.is_empty() || host.starts_with('-') {
            return Err(Error::config(format!("invalid ping_host: {:?}", self.ping_host)));
        }
        self.speed_test.validate()
    }
}

/// A speed-test endpoint speaking the `__down` / `__up` HTTP API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SpeedTestServer {
    pub name: String,
    /// Base URL, e.g. `https://speed.cloudflare.com`
    pub url: String,
}

impl SpeedTestServer {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }

    #[must_use]
    pub fn download_url(&self, bytes: u64) -> String {
        format!("{}/__down?bytes={bytes}", self.url.trim_end_matches('/'))
    }

    #[must_use]
    pub fn upload_url(&self) -> String {
        format!("{}/__up", self.url.trim_end_matches('/'))
    }
}

/// Speed-test tuning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SpeedTestSettings {
    /// Candidate servers; the fastest to answer is used
    pub servers: Vec<SpeedTestServer>,
    /// Bytes fetched for the download measurement
    pub download_bytes: u64,
    /// Bytes sent for the upload measurement
    pub upload_bytes: u64,
    /// Per-request HTTP timeout in seconds
    pub timeout_secs: u64,
    /// Measure ping with ICMP instead of HTTP round trips
    pub icmp_ping: bool,
    pub ping_timeout_ms: u64,
    pub ping_count: usize,
}

impl Default for SpeedTestSettings {
    fn default() -> Self {
        Self {
            servers: vec![SpeedTestServer::new(
                "Cloudflare",
                "https://speed.cloudflare.com",
            )],
            download_bytes: 25_000_000,
            upload_bytes: 10_000_000,
            timeout_secs: 60,
            icmp_ping: true,
            ping_timeout_ms: 1000,
            ping_count: 3,
        }
    }
}

impl SpeedTestSettings {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    #[must_use]
    pub fn ping_timeout(&self) -> Duration {
        Duration::from_millis(self.ping_timeout_ms)
    }

    fn validate(&self) -> Result<()> {
        if self.servers.is_empty() {
            return Err(Error::config("speed_test.servers must not be empty"));
        }
        for server in &self.servers {
            if reqwest::Url::parse(&server.url).is_err() {
                return Err(Error::config(format!(
                    "invalid speed-test url for {}: {}",
                    server.name, server.url
                )));
            }
        }
        if self.download_bytes == 0 || self.upload_bytes == 0 {
            return Err(Error::config("speed_test byte counts must be positive"));
        }
        if self.timeout_secs == 0 {
            return Err(Error::config("speed_test.timeout_secs must be at least 1"));
        }
        Ok(())
    }
}
