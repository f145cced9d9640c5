//! Full cross-product snapshot generation.

use rand::Rng;
use topo_core::Catalog;
use topo_core::types::{LatencySample, Snapshot};

use crate::synth::LatencySynthesizer;

/// One sample per (exchange, region) pair, exchange-major, all stamped `now_ms`.
///
/// The shape is deterministic (`|exchanges| × |regions|` samples, no duplicate
/// pairs); the values are re-rolled on every call. Empty catalogs give an empty
/// snapshot.
pub fn generate_snapshot<R: Rng + ?Sized>(
    catalog: &Catalog,
    synth: &LatencySynthesizer,
    now_ms: u64,
    rng: &mut R,
) -> Snapshot {
    let mut samples = Vec::with_capacity(catalog.pair_count());
    for (exchange, region) in catalog.pairs() {
        let s = synth.synthesize(exchange, region, rng);
        samples.push(LatencySample {
            exchange_id: exchange.id.clone(),
            cloud_region_id: region.id.clone(),
            latency_ms: s.latency_ms,
            timestamp_ms: now_ms,
            packet_loss_pct: s.packet_loss_pct,
        });
    }
    Snapshot::new(now_ms, samples)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use topo_core::catalog::{builtin_exchanges, builtin_regions};

    #[test]
    fn cross_product_without_duplicates() {
        let c = Catalog::builtin();
        let mut rng = StdRng::seed_from_u64(42);
        let snap = generate_snapshot(&c, &LatencySynthesizer::new(), 1_000, &mut rng);

        assert_eq!(snap.len(), c.exchanges().len() * c.regions().len());
        let keys: HashSet<(&str, &str)> = snap.samples.iter().map(|s| s.pair()).collect();
        assert_eq!(keys.len(), snap.len());
        for s in &snap.samples {
            assert!(s.latency_ms >= 1);
            assert!(s.packet_loss_pct >= 0.0);
            assert_eq!(s.timestamp_ms, 1_000);
            assert!(c.knows(s));
        }
        assert_eq!(snap.samples[0].pair(), ("binance", "aws-us-east-1"));
        assert_eq!(snap.samples[1].pair(), ("binance", "aws-us-west-2"));
    }

    #[test]
    fn values_rerolled_each_call() {
        let c = Catalog::builtin();
        let synth = LatencySynthesizer::new();
        let mut rng = StdRng::seed_from_u64(9);
        let a = generate_snapshot(&c, &synth, 0, &mut rng);
        let b = generate_snapshot(&c, &synth, 0, &mut rng);
        assert_eq!(a.len(), b.len());
        assert_ne!(a.samples, b.samples);
    }

    #[test]
    fn empty_catalogs() {
        let mut rng = StdRng::seed_from_u64(0);
        let synth = LatencySynthesizer::new();

        let no_regions = Catalog::new(builtin_exchanges(), vec![]).unwrap();
        assert!(generate_snapshot(&no_regions, &synth, 0, &mut rng).is_empty());

        let no_exchanges = Catalog::new(vec![], builtin_regions()).unwrap();
        assert!(generate_snapshot(&no_exchanges, &synth, 0, &mut rng).is_empty());
    }
}
