//! Best-effort HTTP probing with simulated fallback.
//!
//! Each (exchange, region) pair gets one `HEAD` request against the exchange's
//! public endpoint, bounded by an explicit per-probe timeout. Probes run
//! concurrently (at most `concurrency` in flight) and results keep catalog
//! order. Any failure (connect error, TLS error, timeout, or a missing
//! endpoint) substitutes `round(U(20, 220))` for that pair only; the failure is
//! never surfaced to the caller.
//!
//! The region leg is not measurable from here, so a simulated `U(10, 110)` ms
//! is added to the exchange leg of every pair.
//!
//! ```text
//! pairs ──► stream::iter(measure) ──► buffered(concurrency) ──► Vec<Measurement>
//!                                                          └──► Snapshot
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use futures_util::{StreamExt, stream};
use rand::Rng;
use tokio::time::Instant;
use topo_core::error::{Result, TopoError};
use topo_core::time_util::now_ms;
use topo_core::types::{LatencySample, Measurement, Snapshot};
use topo_core::Catalog;
use topo_sim::synth::fallback_latency;
use tracing::debug;

use crate::source::SnapshotSource;

/// Bounds of the simulated region leg, in milliseconds.
const REGION_LEG_MS: std::ops::Range<f64> = 10.0..110.0;

/// Packet-loss ceiling for probed pairs.
const PROBE_LOSS_CEILING: f64 = 2.0;

/// A single reachability probe.
#[async_trait]
pub trait Prober: Send + Sync {
    /// Resolve once the endpoint answered (any HTTP status counts).
    async fn probe(&self, url: &str) -> Result<()>;
}

/// `HEAD` request prober over a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpProber {
    client: reqwest::Client,
}

impl HttpProber {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| TopoError::Probe(format!("building http client: {e}")))?;
        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Prober for HttpProber {
    async fn probe(&self, url: &str) -> Result<()> {
        self.client
            .head(url)
            .header(reqwest::header::CACHE_CONTROL, "no-cache")
            .send()
            .await
            .map_err(|e| TopoError::Probe(format!("{}: {e}", extract_host(url))))?;
        Ok(())
    }
}

/// Extract the host from a URL string for log lines.
pub fn extract_host(url: &str) -> String {
    url::Url::parse(url)
        .map(|u| u.host_str().unwrap_or("").to_string())
        .unwrap_or_default()
}

/// Counters of the last snapshot's measurement tags.
#[derive(Debug, Default)]
pub struct ProbeStats {
    measured: AtomicU64,
    simulated: AtomicU64,
}

impl ProbeStats {
    pub fn measured(&self) -> u64 {
        self.measured.load(Ordering::Relaxed)
    }

    pub fn simulated(&self) -> u64 {
        self.simulated.load(Ordering::Relaxed)
    }
}

/// Snapshot source timing live endpoints.
pub struct ProbingSource {
    catalog: Catalog,
    prober: Arc<dyn Prober>,
    timeout: Duration,
    concurrency: usize,
    stats: Arc<ProbeStats>,
}

impl ProbingSource {
    pub fn new(catalog: Catalog, prober: Arc<dyn Prober>, timeout: Duration, concurrency: usize) -> Self {
        Self {
            catalog,
            prober,
            timeout,
            concurrency: concurrency.max(1),
            stats: Arc::new(ProbeStats::default()),
        }
    }

    /// Measurement-tag counters, refreshed after every snapshot.
    pub fn stats(&self) -> Arc<ProbeStats> {
        Arc::clone(&self.stats)
    }

    /// Time one endpoint, falling back to a simulated value on any failure.
    async fn measure(&self, endpoint: Option<&str>) -> Measurement {
        let Some(url) = endpoint else {
            return Measurement::Simulated(simulated_exchange_leg());
        };

        let started = Instant::now();
        match tokio::time::timeout(self.timeout, self.prober.probe(url)).await {
            Ok(Ok(())) => Measurement::Measured(started.elapsed().as_millis().min(u128::from(u32::MAX)) as u32),
            Ok(Err(e)) => {
                debug!("[probe] {e}, using simulated latency");
                Measurement::Simulated(simulated_exchange_leg())
            }
            Err(_) => {
                debug!("[probe] {} timed out after {:?}, using simulated latency", extract_host(url), self.timeout);
                Measurement::Simulated(simulated_exchange_leg())
            }
        }
    }

    /// Combine per-pair measurements into a snapshot.
    fn assemble(&self, measurements: &[Measurement], taken_at_ms: u64) -> Snapshot {
        let mut rng = rand::thread_rng();
        let mut measured = 0u64;
        let samples = self
            .catalog
            .pairs()
            .zip(measurements)
            .map(|((exchange, region), m)| {
                if m.is_measured() {
                    measured += 1;
                }
                let total = f64::from(m.latency_ms()) + rng.gen_range(REGION_LEG_MS);
                LatencySample {
                    exchange_id: exchange.id.clone(),
                    cloud_region_id: region.id.clone(),
                    latency_ms: (total.round() as u32).max(1),
                    timestamp_ms: taken_at_ms,
                    packet_loss_pct: rng.gen_range(0.0..PROBE_LOSS_CEILING),
                }
            })
            .collect::<Vec<_>>();

        self.stats.measured.store(measured, Ordering::Relaxed);
        self.stats.simulated.store(samples.len() as u64 - measured, Ordering::Relaxed);
        Snapshot::new(taken_at_ms, samples)
    }
}

fn simulated_exchange_leg() -> u32 {
    fallback_latency(&mut rand::thread_rng())
}

#[async_trait]
impl SnapshotSource for ProbingSource {
    fn name(&self) -> &str {
        "probe"
    }

    fn measurement_stats(&self) -> Option<Arc<ProbeStats>> {
        Some(self.stats())
    }

    async fn snapshot(&self) -> Result<Snapshot> {
        let taken_at_ms = now_ms();
        let endpoints: Vec<Option<String>> =
            self.catalog.pairs().map(|(exchange, _)| exchange.endpoint.clone()).collect();
        let measurements: Vec<Measurement> = stream::iter(endpoints)
            .map(move |endpoint| async move { self.measure(endpoint.as_deref()).await })
            .buffered(self.concurrency)
            .collect()
            .await;

        let snap = self.assemble(&measurements, taken_at_ms);
        debug!(
            "[probe] snapshot: {} pairs, {} measured, {} simulated",
            snap.len(),
            self.stats.measured(),
            self.stats.simulated(),
        );
        Ok(snap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use topo_core::catalog::builtin_regions;
    use topo_core::types::{Exchange, ExchangeStatus, GeoPoint};

    struct OkProber;

    #[async_trait]
    impl Prober for OkProber {
        async fn probe(&self, _url: &str) -> Result<()> {
            tokio::time::sleep(Duration::from_millis(30)).await;
            Ok(())
        }
    }

    struct FailingProber;

    #[async_trait]
    impl Prober for FailingProber {
        async fn probe(&self, url: &str) -> Result<()> {
            Err(TopoError::Probe(format!("{url}: connection refused")))
        }
    }

    struct HangingProber;

    #[async_trait]
    impl Prober for HangingProber {
        async fn probe(&self, _url: &str) -> Result<()> {
            std::future::pending::<()>().await;
            Ok(())
        }
    }

    fn exchange(id: &str, endpoint: Option<&str>) -> Exchange {
        Exchange {
            id: id.into(),
            name: id.into(),
            coordinates: GeoPoint::new(0.0, 0.0),
            region: "Test".into(),
            volume_24h: 0.0,
            status: ExchangeStatus::Online,
            endpoint: endpoint.map(Into::into),
        }
    }

    fn probed_catalog() -> Catalog {
        Catalog::new(
            vec![exchange("a", Some("https://a.example/ping")), exchange("b", Some("https://b.example/ping"))],
            builtin_regions(),
        )
        .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn measured_when_probe_succeeds() {
        let catalog = probed_catalog();
        let src = ProbingSource::new(catalog.clone(), Arc::new(OkProber), Duration::from_secs(2), 64);
        let snap = src.snapshot().await.unwrap();

        assert_eq!(snap.len(), catalog.pair_count());
        assert_eq!(src.stats().measured(), catalog.pair_count() as u64);
        assert_eq!(src.stats().simulated(), 0);
        // 30ms exchange leg + 10..110ms region leg
        assert!(snap.samples.iter().all(|s| (40..=140).contains(&s.latency_ms)));
        assert!(snap.samples.iter().all(|s| (0.0..2.0).contains(&s.packet_loss_pct)));
    }

    #[tokio::test(start_paused = true)]
    async fn failures_fall_back_per_pair() {
        let catalog = Catalog::builtin();
        let src = ProbingSource::new(catalog.clone(), Arc::new(FailingProber), Duration::from_secs(2), 8);
        let snap = src.snapshot().await.unwrap();

        assert_eq!(snap.len(), catalog.pair_count());
        assert_eq!(src.stats().measured(), 0);
        assert!(snap.samples.iter().all(|s| (30..=330).contains(&s.latency_ms)));
        assert_eq!(snap.samples[0].pair(), ("binance", "aws-us-east-1"));
        assert_eq!(snap.samples.last().unwrap().pair(), ("bitbns", "azure-centralindia"));
    }

    #[tokio::test(start_paused = true)]
    async fn hung_probes_time_out_concurrently() {
        let catalog = probed_catalog();
        let pairs = catalog.pair_count();
        let src = ProbingSource::new(catalog, Arc::new(HangingProber), Duration::from_secs(2), pairs);

        let started = Instant::now();
        let snap = src.snapshot().await.unwrap();
        let elapsed = started.elapsed();

        assert_eq!(snap.len(), pairs);
        assert_eq!(src.stats().simulated(), pairs as u64);
        assert!(elapsed >= Duration::from_secs(2));
        assert!(elapsed < Duration::from_secs(3), "probes ran sequentially: {elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn concurrency_bound_is_respected() {
        let catalog = probed_catalog();
        let pairs = catalog.pair_count();
        let src = ProbingSource::new(catalog, Arc::new(HangingProber), Duration::from_secs(1), 2);

        let started = Instant::now();
        src.snapshot().await.unwrap();
        let batches = pairs.div_ceil(2) as u64;
        assert!(started.elapsed() >= Duration::from_secs(batches));
    }

    #[tokio::test]
    async fn snapshot_runs_on_spawned_task() {
        let catalog = probed_catalog();
        let pairs = catalog.pair_count();
        let src: Arc<dyn SnapshotSource> =
            Arc::new(ProbingSource::new(catalog, Arc::new(FailingProber), Duration::from_secs(1), 4));

        let task = tokio::spawn({
            let src = Arc::clone(&src);
            async move { src.snapshot().await }
        });
        let snap = task.await.unwrap().unwrap();
        assert_eq!(snap.len(), pairs);

        let stats = src.measurement_stats().unwrap();
        assert_eq!(stats.measured() + stats.simulated(), pairs as u64);
    }

    #[test]
    fn host_extraction() {
        assert_eq!(extract_host("https://api.binance.com/api/v3/ping"), "api.binance.com");
        assert_eq!(extract_host("not a url"), "");
    }
}
