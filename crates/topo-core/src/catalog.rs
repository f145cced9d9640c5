//! Static exchange and cloud-region catalogs.
//!
//! A [`Catalog`] is built once at startup (from the built-in dataset or from
//! config overrides) and shared read-only for the life of the process. Cloning
//! is cheap: both lists live behind `Arc`s.

use std::sync::Arc;

use ahash::{AHashMap, AHashSet};
use tracing::warn;

use crate::error::{Result, TopoError};
use crate::types::*;

/// Read-only exchange + region catalog with id indexes.
#[derive(Debug, Clone)]
pub struct Catalog {
    exchanges: Arc<[Exchange]>,
    regions: Arc<[CloudRegion]>,
    exchange_idx: Arc<AHashMap<String, usize>>,
    region_idx: Arc<AHashMap<String, usize>>,
}

impl Catalog {
    /// Build a catalog, rejecting duplicate ids.
    ///
    /// Out-of-range coordinates are accepted (distance is still computed) but
    /// logged at `warn`.
    pub fn new(exchanges: Vec<Exchange>, regions: Vec<CloudRegion>) -> Result<Self> {
        let mut exchange_idx = AHashMap::with_capacity(exchanges.len());
        for (i, ex) in exchanges.iter().enumerate() {
            if exchange_idx.insert(ex.id.clone(), i).is_some() {
                return Err(TopoError::Config(format!("duplicate exchange id: {}", ex.id)));
            }
            if !ex.coordinates.is_valid() {
                warn!("[catalog] exchange '{}' has out-of-range coordinates {:?}", ex.id, ex.coordinates);
            }
        }

        let mut region_idx = AHashMap::with_capacity(regions.len());
        for (i, r) in regions.iter().enumerate() {
            if region_idx.insert(r.id.clone(), i).is_some() {
                return Err(TopoError::Config(format!("duplicate region id: {}", r.id)));
            }
            if !r.coordinates.is_valid() {
                warn!("[catalog] region '{}' has out-of-range coordinates {:?}", r.id, r.coordinates);
            }
        }

        Ok(Self {
            exchanges: exchanges.into(),
            regions: regions.into(),
            exchange_idx: Arc::new(exchange_idx),
            region_idx: Arc::new(region_idx),
        })
    }

    /// The built-in dataset: nine exchanges and thirteen cloud regions.
    pub fn builtin() -> Self {
        // The built-in lists have unique ids by construction.
        Self::new(builtin_exchanges(), builtin_regions()).unwrap_or_else(|_| Self::empty())
    }

    /// A catalog with no entries.
    pub fn empty() -> Self {
        Self {
            exchanges: Arc::from(Vec::new()),
            regions: Arc::from(Vec::new()),
            exchange_idx: Arc::default(),
            region_idx: Arc::default(),
        }
    }

    pub fn exchanges(&self) -> &[Exchange] {
        &self.exchanges
    }

    pub fn regions(&self) -> &[CloudRegion] {
        &self.regions
    }

    pub fn exchange(&self, id: &str) -> Option<&Exchange> {
        self.exchange_idx.get(id).map(|&i| &self.exchanges[i])
    }

    pub fn region(&self, id: &str) -> Option<&CloudRegion> {
        self.region_idx.get(id).map(|&i| &self.regions[i])
    }

    /// Look up an exchange, failing with `NotFound` instead of substituting.
    pub fn require_exchange(&self, id: &str) -> Result<&Exchange> {
        self.exchange(id).ok_or_else(|| TopoError::exchange_not_found(id))
    }

    /// Look up a region, failing with `NotFound` instead of substituting.
    pub fn require_region(&self, id: &str) -> Result<&CloudRegion> {
        self.region(id).ok_or_else(|| TopoError::region_not_found(id))
    }

    /// Number of (exchange, region) pairs in the cross product.
    pub fn pair_count(&self) -> usize {
        self.exchanges.len() * self.regions.len()
    }

    /// Iterate over every (exchange, region) pair, exchange-major.
    pub fn pairs(&self) -> impl Iterator<Item = (&Exchange, &CloudRegion)> + '_ {
        self.exchanges
            .iter()
            .flat_map(move |ex| self.regions.iter().map(move |r| (ex, r)))
    }

    /// `true` if both ids of the sample resolve.
    pub fn knows(&self, sample: &LatencySample) -> bool {
        self.exchange_idx.contains_key(&sample.exchange_id)
            && self.region_idx.contains_key(&sample.cloud_region_id)
    }

    /// Drop samples whose exchange or region is not in the catalog, and
    /// duplicate pairs after the first. Returns the number dropped.
    pub fn retain_known(&self, samples: &mut Vec<LatencySample>) -> usize {
        let before = samples.len();
        let mut seen: AHashSet<(String, String)> = AHashSet::with_capacity(before);
        samples.retain(|s| {
            self.knows(s) && seen.insert((s.exchange_id.clone(), s.cloud_region_id.clone()))
        });
        before - samples.len()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

// ---------------------------------------------------------------------------
// Built-in dataset
// ---------------------------------------------------------------------------

fn exchange(
    id: &str,
    name: &str,
    coords: (f64, f64),
    region: &str,
    volume_24h: f64,
    endpoint: Option<&str>,
) -> Exchange {
    Exchange {
        id: id.into(),
        name: name.into(),
        coordinates: GeoPoint::new(coords.0, coords.1),
        region: region.into(),
        volume_24h,
        status: ExchangeStatus::Online,
        endpoint: endpoint.map(Into::into),
    }
}

fn region(
    id: &str,
    provider: CloudProvider,
    code: &str,
    location: &str,
    coords: (f64, f64),
    zones: &[&str],
) -> CloudRegion {
    CloudRegion {
        id: id.into(),
        provider,
        region_code: code.into(),
        location: location.into(),
        coordinates: GeoPoint::new(coords.0, coords.1),
        zones: zones.iter().map(|z| z.to_string()).collect(),
    }
}

#[rustfmt::skip]
pub fn builtin_exchanges() -> Vec<Exchange> {
    vec![
        exchange(
            "binance", "Binance", (35.6762, 139.6503), "Asia-Pacific", 15_240_000_000.0,
            Some("https://api.binance.com/api/v3/ping"),
        ),
        exchange(
            "coinbase", "Coinbase Pro", (37.7749, -122.4194), "North America", 8_960_000_000.0,
            Some("https://api.coinbase.com/v2/time"),
        ),
        exchange(
            "kraken", "Kraken", (37.7749, -122.4194), "North America", 2_340_000_000.0,
            Some("https://api.kraken.com/0/public/Time"),
        ),
        exchange(
            "bybit", "Bybit", (1.3521, 103.8198), "Asia-Pacific", 4_560_000_000.0,
            Some("https://api.bybit.com/v3/public/time"),
        ),
        exchange(
            "okx", "OKX", (1.3521, 103.8198), "Asia-Pacific", 3_920_000_000.0,
            Some("https://www.okx.com/api/v5/public/time"),
        ),
        exchange(
            "bitstamp", "Bitstamp", (51.5074, -0.1278), "Europe", 1_120_000_000.0,
            Some("https://www.bitstamp.net/api/v2/ticker/btcusd/"),
        ),
        exchange("coindcx", "CoinDCX", (28.7041, 77.1025), "India", 650_000_000.0, None),
        exchange("zebpay", "ZebPay", (18.5204, 73.8567), "India", 420_000_000.0, None),
        exchange("bitbns", "BitBNS", (12.9716, 77.5946), "India", 380_000_000.0, None),
    ]
}

#[rustfmt::skip]
pub fn builtin_regions() -> Vec<CloudRegion> {
    use CloudProvider::*;
    vec![
        region("aws-us-east-1", Aws, "us-east-1", "N. Virginia", (38.9072, -77.0369), &["a", "b", "c", "d", "e", "f"]),
        region("aws-us-west-2", Aws, "us-west-2", "Oregon", (45.5152, -122.6784), &["a", "b", "c", "d"]),
        region("aws-eu-west-1", Aws, "eu-west-1", "Ireland", (53.3498, -6.2603), &["a", "b", "c"]),
        region("aws-ap-southeast-1", Aws, "ap-southeast-1", "Singapore", (1.3521, 103.8198), &["a", "b", "c"]),
        region("aws-ap-south-1", Aws, "ap-south-1", "Mumbai", (19.076, 72.8777), &["a", "b", "c"]),
        region("gcp-us-central1", Gcp, "us-central1", "Iowa", (41.5868, -93.625), &["a", "b", "c", "f"]),
        region("gcp-europe-west1", Gcp, "europe-west1", "Belgium", (50.8503, 4.3517), &["a", "b", "c", "d"]),
        region("gcp-asia-southeast1", Gcp, "asia-southeast1", "Singapore", (1.3521, 103.8198), &["a", "b", "c"]),
        region("gcp-asia-south1", Gcp, "asia-south1", "Mumbai", (19.076, 72.8777), &["a", "b", "c"]),
        region("azure-eastus", Azure, "eastus", "Virginia", (38.9072, -77.0369), &["1", "2", "3"]),
        region("azure-westeurope", Azure, "westeurope", "Netherlands", (52.3676, 4.9041), &["1", "2", "3"]),
        region("azure-southeastasia", Azure, "southeastasia", "Singapore", (1.3521, 103.8198), &["1", "2", "3"]),
        region("azure-centralindia", Azure, "centralindia", "Pune", (18.5204, 73.8567), &["a", "b", "c"]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(ex: &str, r: &str) -> LatencySample {
        LatencySample {
            exchange_id: ex.into(),
            cloud_region_id: r.into(),
            latency_ms: 10,
            timestamp_ms: 0,
            packet_loss_pct: 0.0,
        }
    }

    #[test]
    fn builtin_sizes() {
        let c = Catalog::builtin();
        assert_eq!(c.exchanges().len(), 9);
        assert_eq!(c.regions().len(), 13);
        assert_eq!(c.pair_count(), 117);
        assert_eq!(c.pairs().count(), 117);
    }

    #[test]
    fn lookup_and_require() {
        let c = Catalog::builtin();
        assert_eq!(c.exchange("okx").unwrap().name, "OKX");
        assert_eq!(c.region("azure-eastus").unwrap().provider, CloudProvider::Azure);
        assert!(matches!(c.require_exchange("mtgox"), Err(TopoError::NotFound { .. })));
        assert!(matches!(c.require_region("aws-moon-1"), Err(TopoError::NotFound { .. })));
    }

    #[test]
    fn duplicate_ids_rejected() {
        let mut ex = builtin_exchanges();
        ex.push(ex[0].clone());
        assert!(matches!(Catalog::new(ex, builtin_regions()), Err(TopoError::Config(_))));
    }

    #[test]
    fn retain_known_drops_dangling_and_duplicates() {
        let c = Catalog::builtin();
        let mut samples = vec![
            sample("binance", "aws-us-east-1"),
            sample("ghost", "aws-us-east-1"),
            sample("binance", "aws-nowhere"),
            sample("binance", "aws-us-east-1"),
            sample("kraken", "gcp-us-central1"),
        ];
        let dropped = c.retain_known(&mut samples);
        assert_eq!(dropped, 3);
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[1].pair(), ("kraken", "gcp-us-central1"));
    }
}
