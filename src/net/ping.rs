//! Latency probing.
//!
//! Two flavours live here: parsing the text printed by the OS `ping`
//! utility, and a native ICMP pinger used by the speed test.

#![allow(clippy::missing_errors_doc)]

use crate::error::{Error, Result};
use std::net::IpAddr;
use std::time::Duration;
use surge_ping::{Client, Config, PingIdentifier, PingSequence};
use tokio::time::timeout;

/// Payload size for native ICMP echo requests in bytes.
const ECHO_PAYLOAD_SIZE: usize = 32;

/// Extract the round-trip summary from `ping` output.
///
/// Takes the last non-empty line and returns the text after its last `=`.
/// On an English Windows this is the average, e.g. `12ms`; other locales and
/// platforms yield whatever their summary line ends with.
#[must_use]
pub fn parse_ping_output(output: &str) -> String {
    output
        .lines()
        .rev()
        .find(|line| !line.trim().is_empty())
        .and_then(|line| line.rsplit('=').next())
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

/// Native ICMP pinger.
///
/// Needs raw or datagram ICMP socket permission; [`IcmpPinger::new`] fails
/// without it and callers fall back to another latency source.
pub struct IcmpPinger {
    client: Client,
    timeout: Duration,
    count: usize,
}

impl IcmpPinger {
    pub fn new(timeout: Duration, count: usize) -> Result<Self> {
        let client = Client::new(&Config::default()).map_err(|e| Error::network(e.to_string()))?;
        Ok(Self {
            client,
            timeout,
            count: count.max(1),
        })
    }

    /// Average round trip to `ip` in milliseconds, `None` if every echo was lost.
    pub async fn average_ms(&self, ip: IpAddr) -> Option<f64> {
        let payload = [0u8; ECHO_PAYLOAD_SIZE];
        let mut pinger = self.client.pinger(ip, PingIdentifier(echo_id())).await;
        pinger.timeout(self.timeout);

        let mut latencies = Vec::with_capacity(self.count);
        for seq in 0..self.count {
            match timeout(self.timeout, pinger.ping(PingSequence(seq as u16), &payload)).await {
                Ok(Ok((_packet, rtt))) => latencies.push(rtt.as_secs_f64() * 1000.0),
                Ok(Err(e)) => tracing::debug!("Ping error for {ip}: {e}"),
                Err(_) => tracing::debug!("Ping to {ip} timed out"),
            }
        }

        if latencies.is_empty() {
            None
        } else {
            Some(latencies.iter().sum::<f64>() / latencies.len() as f64)
        }
    }
}

/// Identifier for an ICMP echo session.
fn echo_id() -> u16 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| (d.subsec_nanos() % 65536) as u16)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_windows_output() {
        let output = "\r\nPinging 8.8.8.8 with 32 bytes of data:\r\n\
Reply from 8.8.8.8: bytes=32 time=14ms TTL=117\r\n\r\n\
Ping statistics for 8.8.8.8:\r\n    Packets: Sent = 1, Received = 1, Lost = 0 (0% loss),\r\n\
Approximate round trip times in milli-seconds:\r\n    Minimum = 14ms, Maximum = 14ms, Average = 14ms\r\n";
        assert_eq!(parse_ping_output(output), "14ms");
    }

    #[test]
    fn test_parse_unix_output() {
        let output = "PING 1.1.1.1 (1.1.1.1) 56(84) bytes of data.\n\
64 bytes from 1.1.1.1: icmp_seq=1 ttl=57 time=9.87 ms\n\n\
--- 1.1.1.1 ping statistics ---\n\
1 packets transmitted, 1 received, 0% packet loss, time 0ms\n\
rtt min/avg/max/mdev = 9.870/9.870/9.870/0.000 ms\n";
        assert_eq!(parse_ping_output(output), "9.870/9.870/9.870/0.000 ms");
    }

    #[test]
    fn test_parse_without_equals_returns_line() {
        assert_eq!(parse_ping_output("Request timed out.\n"), "Request timed out.");
        assert_eq!(parse_ping_output(""), "");
    }

    #[tokio::test]
    async fn test_icmp_localhost() {
        // ICMP sockets are usually not permitted in CI
        if std::env::var("CI").is_ok() {
            return;
        }

        let Ok(icmp) = IcmpPinger::new(Duration::from_secs(1), 1) else {
            return;
        };
        if let Some(ms) = icmp.average_ms("127.0.0.1".parse().unwrap()).await {
            assert!(ms < 100.0);
        }
    }
}
