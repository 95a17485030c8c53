//! Network types and data structures.
//!
//! Snapshots and reports produced by [`NetworkUtils`](super::NetworkUtils)
//! and the activation state shown by the interactive window.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a DNS profile is currently applied by this tool.
///
/// Only tracks what the tool did last; drift in the real OS settings is not
/// reconciled.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ActivationState {
    /// A DNS profile has been applied
    Active,
    /// DNS has been cleared, or nothing was applied yet
    #[default]
    Inactive,
}

impl ActivationState {
    /// Check if the state is `Active`.
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }
}

impl fmt::Display for ActivationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "Active"),
            Self::Inactive => write!(f, "Inactive"),
        }
    }
}

/// Snapshot of the periodic stats line.
///
/// The values are placeholders; nothing is measured.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatsSnapshot {
    /// Ping text, e.g. `30ms`
    pub ping: String,
    /// Throughput text, e.g. `100Mbps`
    pub speed: String,
    /// When the snapshot was taken
    pub taken_at: DateTime<Local>,
}

impl StatsSnapshot {
    /// Render the text of the stats label.
    #[must_use]
    pub fn label(&self) -> String {
        format!("Network Stats: Ping: {}, Speed: {}", self.ping, self.speed)
    }
}

/// Result of one speed-test run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpeedTestReport {
    /// Name of the server the measurement ran against
    pub server: String,
    /// Round-trip latency in milliseconds
    pub ping_ms: f64,
    /// Download throughput in bits per second
    pub download_bps: f64,
    /// Upload throughput in bits per second
    pub upload_bps: f64,
    /// When the run finished
    pub taken_at: DateTime<Local>,
}

impl SpeedTestReport {
    /// Download throughput in megabits per second.
    #[must_use]
    pub fn download_mbps(&self) -> f64 {
        self.download_bps / 1_000_000.0
    }

    /// Upload throughput in megabits per second.
    #[must_use]
    pub fn upload_mbps(&self) -> f64 {
        self.upload_bps / 1_000_000.0
    }

    #[must_use]
    pub fn ping_text(&self) -> String {
        format!("{:.1} ms", self.ping_ms)
    }

    #[must_use]
    pub fn download_text(&self) -> String {
        format!("{:.2} Mbps", self.download_mbps())
    }

    #[must_use]
    pub fn upload_text(&self) -> String {
        format!("{:.2} Mbps", self.upload_mbps())
    }

    /// Multi-line summary used by the results dialog and the CLI.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Speed Test Results:\nPing: {}\nDownload Speed: {}\nUpload Speed: {}",
            self.ping_text(),
            self.download_text(),
            self.upload_text()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activation_state_display() {
        assert_eq!(ActivationState::Active.to_string(), "Active");
        assert_eq!(ActivationState::Inactive.to_string(), "Inactive");
        assert_eq!(ActivationState::default(), ActivationState::Inactive);
        assert!(ActivationState::Active.is_active());
    }

    #[test]
    fn test_stats_label() {
        let snapshot = StatsSnapshot {
            ping: "30ms".into(),
            speed: "100Mbps".into(),
            taken_at: Local::now(),
        };
        assert_eq!(snapshot.label(), "Network Stats: Ping: 30ms, Speed: 100Mbps");
    }

    #[test]
    fn test_report_unit_conversion() {
        let report = SpeedTestReport {
            server: "Test".into(),
            ping_ms: 12.34,
            download_bps: 93_456_000.0,
            upload_bps: 12_000_000.0,
            taken_at: Local::now(),
        };
        assert_eq!(report.download_text(), "93.46 Mbps");
        assert_eq!(report.upload_text(), "12.00 Mbps");
        assert_eq!(report.ping_text(), "12.3 ms");
        assert!(report.summary().starts_with("Speed Test Results:\nPing: 12.3 ms"));
    }
}
