//! Internet speed test.
//!
//! The measurement itself is delegated to an HTTP speed-test endpoint
//! speaking the `__down` / `__up` API. [`HttpSpeedTest`] only picks the
//! fastest configured server, times a download and an upload against it, and
//! measures ping.

#![allow(clippy::missing_errors_doc)]

use crate::config::{SpeedTestServer, SpeedTestSettings};
use crate::error::{Error, Result};
use crate::net::ping::IcmpPinger;
use crate::net::types::SpeedTestReport;
use async_trait::async_trait;
use futures::future::join_all;
use std::net::IpAddr;
use std::time::{Duration, Instant};
use trust_dns_resolver::name_server::TokioHandle;
use trust_dns_resolver::TokioAsyncResolver;

/// Round trips per server during best-server selection.
const LATENCY_SAMPLES: usize = 3;

/// Source of speed-test results.
#[async_trait]
pub trait SpeedTestProvider: Send + Sync {
    async fn run(&self) -> Result<SpeedTestReport>;
}

/// Speed test over HTTP.
///
/// # Example
///
/// ```ignore
/// let tester = HttpSpeedTest::new(SpeedTestSettings::default())?;
/// let report = tester.run().await?;
/// println!("{}", report.summary());
/// ```
pub struct HttpSpeedTest {
    client: reqwest::Client,
    settings: SpeedTestSettings,
}

impl HttpSpeedTest {
    pub fn new(settings: SpeedTestSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout())
            .user_agent(concat!("netopt/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, settings })
    }

    /// Pick the server with the lowest HTTP round trip.
    ///
    /// All servers are timed concurrently; unreachable ones are skipped.
    pub async fn select_best_server(&self) -> Result<(SpeedTestServer, f64)> {
        let timings = self
            .settings
            .servers
            .iter()
            .map(|server| self.http_latency_ms(server));
        let latencies = join_all(timings).await;

        let mut best: Option<(&SpeedTestServer, f64)> = None;
        let mut last_error = None;
        for (server, latency) in self.settings.servers.iter().zip(latencies) {
            match latency {
                Ok(ms) => {
                    tracing::debug!("{} answered in {ms:.1} ms", server.name);
                    if best.map_or(true, |(_, best_ms)| ms < best_ms) {
                        best = Some((server, ms));
                    }
                }
                Err(e) => {
                    tracing::warn!("Speed-test server {} unreachable: {e}", server.name);
                    last_error = Some(e.to_string());
                }
            }
        }

        best.map(|(server, ms)| (server.clone(), ms)).ok_or_else(|| {
            Error::network(match last_error {
                Some(e) => format!("no speed-test server reachable: {e}"),
                None => "no speed-test server reachable".to_string(),
            })
        })
    }

    /// Best of [`LATENCY_SAMPLES`] empty-download round trips, in milliseconds.
    pub async fn http_latency_ms(&self, server: &SpeedTestServer) -> Result<f64> {
        let url = server.download_url(0);
        let mut best = f64::MAX;
        for _ in 0..LATENCY_SAMPLES {
            let start = Instant::now();
            self.client
                .get(&url)
                .send()
                .await?
                .error_for_status()?
                .bytes()
                .await?;
            best = best.min(start.elapsed().as_secs_f64() * 1000.0);
        }
        Ok(best)
    }

    /// Download throughput in bits per second.
    pub async fn measure_download(&self, server: &SpeedTestServer) -> Result<f64> {
        let start = Instant::now();
        let mut response = self
            .client
            .get(server.download_url(self.settings.download_bytes))
            .send()
            .await?
            .error_for_status()?;

        let mut received: u64 = 0;
        while let Some(chunk) = response.chunk().await? {
            received += chunk.len() as u64;
        }
        if received == 0 {
            return Err(Error::network(format!("{} sent no data", server.name)));
        }
        Ok(bits_per_second(received, start.elapsed()))
    }

    /// Upload throughput in bits per second.
    pub async fn measure_upload(&self, server: &SpeedTestServer) -> Result<f64> {
        let body = vec![0u8; self.settings.upload_bytes as usize];
        let start = Instant::now();
        self.client
            .post(server.upload_url())
            .body(body)
            .send()
            .await?
            .error_for_status()?;
        Ok(bits_per_second(self.settings.upload_bytes, start.elapsed()))
    }

    /// ICMP average to the server, or `http_ms` when ICMP is off or fails.
    async fn measure_ping(&self, server: &SpeedTestServer, http_ms: f64) -> f64 {
        if !self.settings.icmp_ping {
            return http_ms;
        }

        match self.icmp_average_ms(server).await {
            Ok(ms) => ms,
            Err(e) => {
                tracing::debug!("Using HTTP latency for {}: {e}", server.name);
                http_ms
            }
        }
    }

    async fn icmp_average_ms(&self, server: &SpeedTestServer) -> Result<f64> {
        let ip = resolve_ipv4(&server.url).await?;
        let icmp = IcmpPinger::new(self.settings.ping_timeout(), self.settings.ping_count)?;
        icmp
            .average_ms(ip)
            .await
            .ok_or_else(|| Error::network(format!("no ICMP reply from {ip}")))
    }
}

#[async_trait]
impl SpeedTestProvider for HttpSpeedTest {
    async fn run(&self) -> Result<SpeedTestReport> {
        let (server, http_ms) = self.select_best_server().await?;
        tracing::info!("Using speed-test server {} ({})", server.name, server.url);

        let download_bps = self.measure_download(&server).await?;
        let upload_bps = self.measure_upload(&server).await?;
        let ping_ms = self.measure_ping(&server, http_ms).await;

        Ok(SpeedTestReport {
            server: server.name,
            ping_ms,
            download_bps,
            upload_bps,
            taken_at: chrono::Local::now(),
        })
    }
}

fn bits_per_second(bytes: u64, elapsed: Duration) -> f64 {
    (bytes as f64 * 8.0) / elapsed.as_secs_f64().max(1e-6)
}

/// First IPv4 address of the host in `url`.
async fn resolve_ipv4(url: &str) -> Result<IpAddr> {
    let parsed = reqwest::Url::parse(url).map_err(|e| Error::network(e.to_string()))?;
    match parsed.host() {
        Some(url::Host::Ipv4(ip)) => Ok(IpAddr::V4(ip)),
        Some(url::Host::Ipv6(_)) => Err(Error::network("IPv6 ping not supported")),
        Some(url::Host::Domain(domain)) => {
            let resolver = TokioAsyncResolver::from_system_conf(TokioHandle)?;
            let lookup = resolver.lookup_ip(domain).await?;
            lookup
                .iter()
                .find(IpAddr::is_ipv4)
                .ok_or_else(|| Error::network(format!("no IPv4 address for {domain}")))
        }
        None => Err(Error::network(format!("no host in {url}"))),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Returns a canned report, or fails with a network error.
    pub struct FixedSpeedTest {
        pub outcome: std::result::Result<SpeedTestReport, String>,
    }

    impl FixedSpeedTest {
        pub fn ok() -> Self {
            Self {
                outcome: Ok(SpeedTestReport {
                    server: "Fixed".into(),
                    ping_ms: 12.0,
                    download_bps: 90_000_000.0,
                    upload_bps: 20_000_000.0,
                    taken_at: chrono::Local::now(),
                }),
            }
        }

        pub fn failing(message: &str) -> Self {
            Self {
                outcome: Err(message.to_string()),
            }
        }
    }

    #[async_trait]
    impl SpeedTestProvider for FixedSpeedTest {
        async fn run(&self) -> Result<SpeedTestReport> {
            self.outcome.clone().map_err(Error::network)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings_for(servers: &[(&str, String)]) -> SpeedTestSettings {
        SpeedTestSettings {
            servers: servers
                .iter()
                .map(|(name, url)| SpeedTestServer::new(*name, url.clone()))
                .collect(),
            download_bytes: 64 * 1024,
            upload_bytes: 32 * 1024,
            timeout_secs: 5,
            icmp_ping: false,
            ..SpeedTestSettings::default()
        }
    }

    async fn healthy_server() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/__down"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8; 64 * 1024]))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/__up"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        server
    }

    async fn broken_server() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/__down"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn test_run_against_mock_server() {
        let server = healthy_server().await;
        let tester = HttpSpeedTest::new(settings_for(&[("Mock", server.uri())])).unwrap();

        let report = tester.run().await.unwrap();
        assert_eq!(report.server, "Mock");
        assert!(report.download_bps > 0.0);
        assert!(report.upload_bps > 0.0);
        assert!(report.ping_ms >= 0.0);
    }

    #[tokio::test]
    async fn test_best_server_skips_broken_ones() {
        let broken = broken_server().await;
        let healthy = healthy_server().await;
        let tester = HttpSpeedTest::new(settings_for(&[
            ("Broken", broken.uri()),
            ("Healthy", healthy.uri()),
        ]))
        .unwrap();

        let (server, latency) = tester.select_best_server().await.unwrap();
        assert_eq!(server.name, "Healthy");
        assert!(latency >= 0.0);
    }

    #[tokio::test]
    async fn test_no_reachable_server_is_an_error() {
        let broken = broken_server().await;
        let tester = HttpSpeedTest::new(settings_for(&[("Broken", broken.uri())])).unwrap();

        let err = tester.run().await.unwrap_err();
        assert!(err.to_string().contains("no speed-test server reachable"));
    }

    fn icmp_settings(url: &str) -> SpeedTestSettings {
        SpeedTestSettings {
            icmp_ping: true,
            ping_timeout_ms: 50,
            ping_count: 1,
            ..settings_for(&[("Target", url.to_string())])
        }
    }

    #[tokio::test]
    async fn test_ping_falls_back_to_http_for_ipv6_host() {
        let tester = HttpSpeedTest::new(icmp_settings("http://[::1]:1")).unwrap();
        let server = SpeedTestServer::new("V6", "http://[::1]:1");

        let ping = tester.measure_ping(&server, 42.5).await;
        assert!((ping - 42.5).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_ping_falls_back_to_http_when_icmp_gets_no_reply() {
        // 192.0.2.0/24 is reserved for documentation and never answers
        let tester = HttpSpeedTest::new(icmp_settings("http://192.0.2.1")).unwrap();
        let server = SpeedTestServer::new("Silent", "http://192.0.2.1");

        let ping = tester.measure_ping(&server, 42.5).await;
        assert!((ping - 42.5).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_ping_uses_http_latency_when_icmp_disabled() {
        let tester = HttpSpeedTest::new(settings_for(&[("Any", "http://192.0.2.1".into())])).unwrap();
        let server = SpeedTestServer::new("Any", "http://192.0.2.1");

        let ping = tester.measure_ping(&server, 7.0).await;
        assert!((ping - 7.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_bits_per_second() {
        let bps = bits_per_second(1_000_000, Duration::from_secs(1));
        assert!((bps - 8_000_000.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_resolve_literal_ipv4() {
        let ip = resolve_ipv4("http://127.0.0.1:8080").await.unwrap();
        assert_eq!(ip, "127.0.0.1".parse::<IpAddr>().unwrap());
        assert!(resolve_ipv4("http://[::1]:8080").await.is_err());
    }
}
