//! Distance-based latency synthesis for a single pair.
//!
//! `latency = max(1, round(d_km * 0.1 + U(-10, 10) + access_overhead))`
//! `packet_loss = U(0, d_km > 1000 ? 2 : 1)`
//!
//! 0.1 ms/km approximates propagation over fiber. The access overhead is zero
//! unless an [`AccessNetwork`] is configured.

use rand::Rng;
use topo_core::geo::haversine_km;
use topo_core::types::{AccessNetwork, CloudRegion, Exchange};

/// Milliseconds of latency per kilometer of great-circle distance.
pub const MS_PER_KM: f64 = 0.1;

/// Half-width of the uniform jitter added to every synthesized latency.
pub const JITTER_MS: f64 = 10.0;

/// Paths longer than this get the wider packet-loss distribution.
pub const LONG_HAUL_KM: f64 = 1000.0;

/// Fallback latency bounds used when a live probe fails.
pub const FALLBACK_MIN_MS: f64 = 20.0;
pub const FALLBACK_MAX_MS: f64 = 220.0;

/// Result of synthesizing one pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyntheticLatency {
    pub latency_ms: u32,
    pub packet_loss_pct: f64,
    pub distance_km: f64,
}

/// Maps an (exchange, region) pair to a plausible latency and packet loss.
#[derive(Debug, Clone, Copy, Default)]
pub struct LatencySynthesizer {
    access_network: Option<AccessNetwork>,
}

impl LatencySynthesizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the fixed overhead of the observer's access link to every value.
    pub fn with_access_network(mut self, access_network: Option<AccessNetwork>) -> Self {
        self.access_network = access_network;
        self
    }

    pub fn access_network(&self) -> Option<AccessNetwork> {
        self.access_network
    }

    fn overhead_ms(&self) -> f64 {
        self.access_network.map(|n| n.overhead_ms()).unwrap_or(0.0)
    }

    /// Synthesize latency from a precomputed distance.
    pub fn synthesize_distance<R: Rng + ?Sized>(&self, distance_km: f64, rng: &mut R) -> SyntheticLatency {
        let jitter = rng.gen_range(-JITTER_MS..JITTER_MS);
        let raw = distance_km * MS_PER_KM + jitter + self.overhead_ms();
        let latency_ms = clamp_round(raw, 1);

        let loss_ceiling = if distance_km > LONG_HAUL_KM { 2.0 } else { 1.0 };
        let packet_loss_pct = rng.gen_range(0.0..loss_ceiling);

        SyntheticLatency { latency_ms, packet_loss_pct, distance_km }
    }

    /// Synthesize latency for a catalog pair.
    pub fn synthesize<R: Rng + ?Sized>(
        &self,
        exchange: &Exchange,
        region: &CloudRegion,
        rng: &mut R,
    ) -> SyntheticLatency {
        self.synthesize_distance(haversine_km(exchange.coordinates, region.coordinates), rng)
    }
}

/// Substitute latency for a pair whose live probe failed: `round(U(20, 220))`.
pub fn fallback_latency<R: Rng + ?Sized>(rng: &mut R) -> u32 {
    rng.gen_range(FALLBACK_MIN_MS..FALLBACK_MAX_MS).round() as u32
}

/// Round `raw` to the nearest integer and clamp below at `floor`.
///
/// Non-finite inputs (from malformed coordinates) collapse to `floor`.
pub(crate) fn clamp_round(raw: f64, floor: u32) -> u32 {
    if !raw.is_finite() {
        return floor;
    }
    let r = raw.round();
    if r <= f64::from(floor) {
        floor
    } else if r >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        r as u32
    }
}
