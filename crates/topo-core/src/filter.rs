//! User-selected filters over the catalogs and the live snapshot.
//!
//! Membership rules:
//! - an empty exchange selection matches every exchange;
//! - an empty provider selection matches **no** region;
//! - the latency range is inclusive on both ends.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::types::*;

/// Inclusive latency bound in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[u32; 2]", into = "[u32; 2]")]
pub struct LatencyRange {
    pub min: u32,
    pub max: u32,
}

impl LatencyRange {
    /// Build a range; bounds given in the wrong order are swapped.
    pub fn new(a: u32, b: u32) -> Self {
        Self { min: a.min(b), max: a.max(b) }
    }

    #[inline]
    pub fn contains(&self, latency_ms: u32) -> bool {
        (self.min..=self.max).contains(&latency_ms)
    }
}

impl Default for LatencyRange {
    fn default() -> Self {
        Self { min: 0, max: 500 }
    }
}

impl From<[u32; 2]> for LatencyRange {
    fn from(v: [u32; 2]) -> Self {
        Self::new(v[0], v[1])
    }
}

impl From<LatencyRange> for [u32; 2] {
    fn from(r: LatencyRange) -> Self {
        [r.min, r.max]
    }
}

/// Current filter selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    /// Selected exchange ids; empty means "all".
    #[serde(default, alias = "exchanges")]
    pub exchange_ids: BTreeSet<String>,
    /// Selected providers; empty means "none". Omitted means all.
    #[serde(default = "all_providers")]
    pub cloud_providers: BTreeSet<CloudProvider>,
    #[serde(default)]
    pub latency_range: LatencyRange,
}

fn all_providers() -> BTreeSet<CloudProvider> {
    CloudProvider::ALL.into_iter().collect()
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            exchange_ids: BTreeSet::new(),
            cloud_providers: all_providers(),
            latency_range: LatencyRange::default(),
        }
    }
}

impl FilterState {
    pub fn matches_exchange(&self, exchange_id: &str) -> bool {
        self.exchange_ids.is_empty() || self.exchange_ids.contains(exchange_id)
    }

    pub fn matches_region(&self, region: &CloudRegion) -> bool {
        self.cloud_providers.contains(&region.provider)
    }

    /// Add the exchange to the selection, or remove it if already selected.
    pub fn toggle_exchange(&mut self, exchange_id: &str) {
        if !self.exchange_ids.remove(exchange_id) {
            self.exchange_ids.insert(exchange_id.to_string());
        }
    }

    /// Add the provider to the selection, or remove it if already selected.
    pub fn toggle_provider(&mut self, provider: CloudProvider) {
        if !self.cloud_providers.remove(&provider) {
            self.cloud_providers.insert(provider);
        }
    }

    pub fn set_latency_range(&mut self, min: u32, max: u32) {
        self.latency_range = LatencyRange::new(min, max);
    }

    /// Exchanges passing the exchange selection, in catalog order.
    pub fn filter_exchanges<'a>(&self, catalog: &'a Catalog) -> Vec<&'a Exchange> {
        catalog.exchanges().iter().filter(|e| self.matches_exchange(&e.id)).collect()
    }

    /// Regions passing the provider selection, in catalog order.
    pub fn filter_regions<'a>(&self, catalog: &'a Catalog) -> Vec<&'a CloudRegion> {
        catalog.regions().iter().filter(|r| self.matches_region(r)).collect()
    }

    /// `true` if the sample's exchange and region pass the selection and its
    /// latency falls in range. Samples whose region is unknown never match.
    pub fn matches_sample(&self, catalog: &Catalog, sample: &LatencySample) -> bool {
        self.matches_exchange(&sample.exchange_id)
            && catalog.region(&sample.cloud_region_id).is_some_and(|r| self.matches_region(r))
            && self.latency_range.contains(sample.latency_ms)
    }

    /// Samples passing [`matches_sample`](Self::matches_sample), order preserved.
    pub fn filter_samples<'a>(&self, catalog: &Catalog, samples: &'a [LatencySample]) -> Vec<&'a LatencySample> {
        samples.iter().filter(|s| self.matches_sample(catalog, s)).collect()
    }
}
