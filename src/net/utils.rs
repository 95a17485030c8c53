//! Network settings operations.
//!
//! [`NetworkUtils`] is the façade the window and the CLI call into. It holds
//! no state of its own beyond the command runner and the speed-test
//! provider; each operation is a one-shot command or provider call.

#![allow(clippy::missing_errors_doc)]

use crate::config::Settings;
use crate::error::{Error, Result};
use crate::net::command::{CommandRunner, NetCommand, SystemRunner};
use crate::net::ping::parse_ping_output;
use crate::net::speedtest::{HttpSpeedTest, SpeedTestProvider};
use crate::net::types::{SpeedTestReport, StatsSnapshot};
use std::sync::Arc;
use std::time::Duration;

/// Placeholder ping shown in the stats line.
pub const PLACEHOLDER_PING: &str = "30ms";

/// Placeholder throughput shown in the stats line.
pub const PLACEHOLDER_SPEED: &str = "100Mbps";

/// Longest a single OS ping may run before its job gives up.
pub const PING_TIMEOUT: Duration = Duration::from_secs(10);

/// Network settings operations.
///
/// # Example
///
/// ```ignore
/// let utils = NetworkUtils::system(&Settings::default())?;
/// utils.change_dns("9.9.9.9", "149.112.112.112", "Ethernet").await?;
/// println!("{}", utils.check_ping("8.8.8.8").await);
/// ```
#[derive(Clone)]
pub struct NetworkUtils {
    runner: Arc<dyn CommandRunner>,
    speed_test: Arc<dyn SpeedTestProvider>,
    ping_timeout: Duration,
}

impl NetworkUtils {
    pub fn new(runner: Arc<dyn CommandRunner>, speed_test: Arc<dyn SpeedTestProvider>) -> Self {
        Self {
            runner,
            speed_test,
            ping_timeout: PING_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_ping_timeout(mut self, ping_timeout: Duration) -> Self {
        self.ping_timeout = ping_timeout;
        self
    }

    /// Real process runner plus the HTTP speed test from `settings`.
    pub fn system(settings: &Settings) -> Result<Self> {
        let speed_test = HttpSpeedTest::new(settings.speed_test.clone())?;
        Ok(Self::new(Arc::new(SystemRunner), Arc::new(speed_test)))
    }

    /// Point `interface` at a primary and a secondary DNS server.
    ///
    /// Empty addresses clear the static servers instead. Exit status is
    /// logged but not checked, and the interface is not verified to exist.
    pub async fn change_dns(&self, primary: &str, secondary: &str, interface: &str) -> Result<()> {
        self.issue(&NetCommand::set_dns(interface, primary))
            .await
            .map_err(|e| Error::Dns(e.to_string()))?;

        if !secondary.trim().is_empty() {
            self.issue(&NetCommand::add_dns(interface, secondary, 2))
                .await
                .map_err(|e| Error::Dns(e.to_string()))?;
        }
        Ok(())
    }

    /// Persistently set the IPv4 MTU of `interface`.
    pub async fn set_adapter_settings(&self, interface: &str, mtu: u32) -> Result<()> {
        self.issue(&NetCommand::set_mtu(interface, mtu))
            .await
            .map_err(|e| Error::Adapter(e.to_string()))
    }

    /// Placeholder for route or VPN tuning; does nothing yet.
    pub async fn optimize_traffic(&self) -> Result<()> {
        tracing::debug!("optimize_traffic: nothing to do");
        Ok(())
    }

    /// Ping `host` once and return the summary text.
    ///
    /// Never fails: errors come back as their message. A host starting with
    /// `-` would be read as a ping option and is refused.
    pub async fn check_ping(&self, host: &str) -> String {
        let host = host.trim();
        if host.is_empty() || host.starts_with('-') {
            return format!("Invalid host: {host:?}");
        }

        let command = NetCommand::ping_once(host);
        let Ok(result) = tokio::time::timeout(self.ping_timeout, self.runner.run(&command)).await
        else {
            return format!("Ping to {host} timed out after {}s", self.ping_timeout.as_secs_f64());
        };
        match result {
            Ok(output) if output.success() => parse_ping_output(&output.stdout),
            Ok(output) => {
                let code = output
                    .code
                    .map_or_else(|| "signal".to_string(), |c| c.to_string());
                format!("Command '{command}' returned non-zero exit status {code}.")
            }
            Err(e) => e.to_string(),
        }
    }

    /// Stats line values. Placeholders, not a measurement.
    #[must_use]
    pub fn get_network_stats(&self) -> StatsSnapshot {
        StatsSnapshot {
            ping: PLACEHOLDER_PING.into(),
            speed: PLACEHOLDER_SPEED.into(),
            taken_at: chrono::Local::now(),
        }
    }

    /// Run the speed test through the configured provider.
    pub async fn run_speed_test(&self) -> Result<SpeedTestReport> {
        self.speed_test
            .run()
            .await
            .map_err(|e| Error::SpeedTest(e.to_string()))
    }

    async fn issue(&self, command: &NetCommand) -> Result<()> {
        let output = self.runner.run(command).await?;
        if output.success() {
            tracing::debug!("{command}: ok");
        } else {
            let detail = if output.stdout.trim().is_empty() {
                output.stderr.trim()
            } else {
                output.stdout.trim()
            };
            tracing::warn!("{command} exited with {:?}: {detail}", output.code);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::command::testing::RecordingRunner;
    use crate::net::command::CommandOutput;
    use crate::net::speedtest::testing::FixedSpeedTest;

    fn utils_with(runner: Arc<RecordingRunner>, speed: FixedSpeedTest) -> NetworkUtils {
        NetworkUtils::new(runner, Arc::new(speed))
    }

    fn ok_output(stdout: &str) -> CommandOutput {
        CommandOutput {
            code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    #[tokio::test]
    async fn test_change_dns_issues_two_commands() {
        let runner = Arc::new(RecordingRunner::with_output(ok_output("")));
        let utils = utils_with(runner.clone(), FixedSpeedTest::ok());

        utils.change_dns("9.9.9.9", "149.112.112.112", "Ethernet").await.unwrap();

        let commands = runner.recorded();
        assert_eq!(commands.len(), 2);
        assert_eq!(commands[0], NetCommand::set_dns("Ethernet", "9.9.9.9"));
        assert_eq!(commands[1], NetCommand::add_dns("Ethernet", "149.112.112.112", 2));
    }

    #[tokio::test]
    async fn test_clear_dns_issues_single_clear_command() {
        let runner = Arc::new(RecordingRunner::with_output(ok_output("")));
        let utils = utils_with(runner.clone(), FixedSpeedTest::ok());

        utils.change_dns("", "", "Ethernet").await.unwrap();

        let commands = runner.recorded();
        assert_eq!(commands.len(), 1);
        assert_eq!(
            commands[0].to_string(),
            "netsh interface ip set dns name=Ethernet static none"
        );
    }

    #[tokio::test]
    async fn test_non_zero_exit_is_not_an_error() {
        let runner = Arc::new(RecordingRunner::with_output(CommandOutput {
            code: Some(1),
            stdout: "The filename, directory name, or volume label syntax is incorrect.".into(),
            stderr: String::new(),
        }));
        let utils = utils_with(runner, FixedSpeedTest::ok());

        assert!(utils.change_dns("8.8.8.8", "8.8.4.4", "Nope").await.is_ok());
        assert!(utils.set_adapter_settings("Nope", 1500).await.is_ok());
    }

    #[tokio::test]
    async fn test_spawn_failure_is_wrapped() {
        let runner = Arc::new(RecordingRunner::failing("netsh not found"));
        let utils = utils_with(runner, FixedSpeedTest::ok());

        let err = utils.change_dns("8.8.8.8", "8.8.4.4", "Ethernet").await.unwrap_err();
        assert!(matches!(err, Error::Dns(_)));
        assert!(err.to_string().contains("netsh not found"));

        let err = utils.set_adapter_settings("Ethernet", 1400).await.unwrap_err();
        assert!(err.to_string().starts_with("Error setting adapter MTU"));
        assert!(err.to_string().contains("netsh not found"));
    }

    #[tokio::test]
    async fn test_set_adapter_settings_command() {
        let runner = Arc::new(RecordingRunner::with_output(ok_output("Ok.")));
        let utils = utils_with(runner.clone(), FixedSpeedTest::ok());

        utils.set_adapter_settings("Ethernet", 1500).await.unwrap();
        assert_eq!(
            runner.recorded()[0].to_string(),
            "netsh interface ipv4 set subinterface Ethernet mtu=1500 store=persistent"
        );
    }

    #[tokio::test]
    async fn test_check_ping_parses_summary() {
        let runner = Arc::new(RecordingRunner::with_output(ok_output(
            "Reply from 8.8.8.8: bytes=32 time=9ms TTL=117\r\n    Minimum = 9ms, Maximum = 9ms, Average = 9ms\r\n",
        )));
        let utils = utils_with(runner, FixedSpeedTest::ok());

        assert_eq!(utils.check_ping("8.8.8.8").await, "9ms");
    }

    #[tokio::test]
    async fn test_check_ping_swallows_failures() {
        let runner = Arc::new(RecordingRunner::with_output(CommandOutput {
            code: Some(1),
            ..CommandOutput::default()
        }));
        let utils = utils_with(runner, FixedSpeedTest::ok());
        let text = utils.check_ping("unreachable.invalid").await;
        assert!(text.contains("non-zero exit status 1"));

        let runner = Arc::new(RecordingRunner::failing("ping missing"));
        let utils = utils_with(runner, FixedSpeedTest::ok());
        assert!(utils.check_ping("8.8.8.8").await.contains("ping missing"));
    }

    #[tokio::test]
    async fn test_check_ping_refuses_option_like_host() {
        let runner = Arc::new(RecordingRunner::with_output(ok_output("")));
        let utils = utils_with(runner.clone(), FixedSpeedTest::ok());

        assert!(utils.check_ping("-t").await.starts_with("Invalid host"));
        assert!(utils.check_ping("  ").await.starts_with("Invalid host"));
        assert!(runner.recorded().is_empty());
    }

    #[tokio::test]
    async fn test_check_ping_gives_up_after_timeout() {
        let runner = Arc::new(RecordingRunner::hanging(Duration::from_secs(30)));
        let utils = utils_with(runner.clone(), FixedSpeedTest::ok())
            .with_ping_timeout(Duration::from_millis(50));

        let text = utils.check_ping("8.8.8.8").await;
        assert!(text.contains("timed out"), "{text}");
        assert_eq!(runner.recorded().len(), 1);
    }

    #[tokio::test]
    async fn test_network_stats_are_placeholders() {
        let utils = utils_with(Arc::new(RecordingRunner::default()), FixedSpeedTest::ok());
        let stats = utils.get_network_stats();
        assert_eq!(stats.ping, "30ms");
        assert_eq!(stats.speed, "100Mbps");
    }

    #[tokio::test]
    async fn test_speed_test_error_keeps_message() {
        let utils = utils_with(
            Arc::new(RecordingRunner::default()),
            FixedSpeedTest::failing("server unreachable"),
        );
        let err = utils.run_speed_test().await.unwrap_err();
        assert!(matches!(err, Error::SpeedTest(_)));
        assert!(err.to_string().contains("server unreachable"));
    }

    #[tokio::test]
    async fn test_optimize_is_a_no_op() {
        let runner = Arc::new(RecordingRunner::default());
        let utils = utils_with(runner.clone(), FixedSpeedTest::ok());
        utils.optimize_traffic().await.unwrap();
        assert!(runner.recorded().is_empty());
    }
}
