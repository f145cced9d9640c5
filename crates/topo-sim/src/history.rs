//! Historical series generation for one (exchange, region) pair.
//!
//! For sample `i` of `N` over a window of `h` hours ending at `now`:
//!
//! ```text
//! t      = now - (N-1-i) * (h*3_600_000 / N)
//! base   = d_km * 0.1 + 30
//! daily  = sin(i/N * 2π * h/24) * 15
//! spike  = 5% chance of U(0, 100)
//! trend  = (i/N) * 10 - 5
//! noise  = U(-10, 10)
//! latency     = max(5, round(base + daily + spike + trend + noise))
//! packet_loss = max(0, (raw - 50) / 200 + U(0, 0.5))
//! ```
//!
//! The series length is always `N`; a longer window means coarser spacing,
//! not more points.

use std::f64::consts::TAU;

use rand::Rng;
use topo_core::Catalog;
use topo_core::config::DEFAULT_HISTORY_POINTS;
use topo_core::error::{Result, TopoError};
use topo_core::geo::haversine_km;
use topo_core::types::{HistoricalSeries, HistoryPoint, TimeWindow};
use tracing::debug;

use crate::synth::{MS_PER_KM, clamp_round};

/// Fixed per-pair overhead added to the distance-derived base latency.
pub const BASE_OVERHEAD_MS: f64 = 30.0;

/// Amplitude of the daily cycle in milliseconds.
pub const DAILY_AMPLITUDE_MS: f64 = 15.0;

/// Probability that a point carries a spike.
pub const SPIKE_PROBABILITY: f64 = 0.05;

/// Upper bound of a spike in milliseconds.
pub const SPIKE_MAX_MS: f64 = 100.0;

/// Floor applied to every historical latency.
pub const MIN_HISTORY_LATENCY_MS: u32 = 5;

/// Generates fixed-length historical series.
#[derive(Debug, Clone, Copy)]
pub struct HistoryGenerator {
    points: usize,
}

impl HistoryGenerator {
    /// A generator producing `points` samples per series.
    pub fn new(points: usize) -> Result<Self> {
        if points == 0 {
            return Err(TopoError::InvalidArgument("history point count must be > 0".into()));
        }
        Ok(Self { points })
    }

    pub fn points(&self) -> usize {
        self.points
    }

    /// Generate the series for `exchange_id` × `region_id` over `window`,
    /// ending at `now_ms`.
    ///
    /// Fails with `NotFound` when either id is absent from the catalog, and
    /// with `InvalidArgument` when the window is too short to give every point
    /// a distinct millisecond timestamp or starts before the epoch.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        catalog: &Catalog,
        exchange_id: &str,
        region_id: &str,
        window: TimeWindow,
        now_ms: u64,
        rng: &mut R,
    ) -> Result<HistoricalSeries> {
        let exchange = catalog.require_exchange(exchange_id)?;
        let region = catalog.require_region(region_id)?;

        let n = self.points as u64;
        let interval_ms = window.duration_ms() / n;
        if interval_ms == 0 {
            return Err(TopoError::InvalidArgument(format!(
                "{} points do not fit in a {window} window",
                self.points
            )));
        }
        let first_ts = now_ms.checked_sub((n - 1) * interval_ms).ok_or_else(|| {
            TopoError::InvalidArgument(format!("{window} window ending at {now_ms} starts before the epoch"))
        })?;

        let base = haversine_km(exchange.coordinates, region.coordinates) * MS_PER_KM + BASE_OVERHEAD_MS;
        debug!(
            "[history] {exchange_id} -> {region_id} over {window}: {} points every {interval_ms}ms, base={base:.1}ms",
            self.points
        );
        let cycles = window.hours() as f64 / 24.0;
        let nf = self.points as f64;

        let points = (0..self.points)
            .map(|i| {
                let frac = i as f64 / nf;
                let daily = (frac * TAU * cycles).sin() * DAILY_AMPLITUDE_MS;
                let spike = if rng.gen_bool(SPIKE_PROBABILITY) { rng.gen_range(0.0..SPIKE_MAX_MS) } else { 0.0 };
                let trend = frac * 10.0 - 5.0;
                let noise = rng.gen_range(-10.0..10.0);

                let raw = base + daily + spike + trend + noise;
                let packet_loss_pct = ((raw - 50.0) / 200.0 + rng.gen_range(0.0..0.5)).max(0.0);

                HistoryPoint {
                    timestamp_ms: first_ts + i as u64 * interval_ms,
                    latency_ms: clamp_round(raw, MIN_HISTORY_LATENCY_MS),
                    packet_loss_pct,
                }
            })
            .collect();

        Ok(HistoricalSeries {
            exchange_id: exchange.id.clone(),
            cloud_region_id: region.id.clone(),
            window,
            points,
        })
    }
}

impl Default for HistoryGenerator {
    fn default() -> Self {
        Self { points: DEFAULT_HISTORY_POINTS }
    }
}
