//! Free-text search over the catalogs.
//!
//! Matching is a case-insensitive substring test. Exchanges are searched by
//! name, region label and id; cloud regions by location, provider and region
//! code. Each result list is ranked by the earliest match position across the
//! searched fields (ties keep catalog order) and capped at the caller's limit.

use serde::Serialize;

use crate::catalog::Catalog;
use crate::types::{CloudRegion, Exchange};

/// Default cap on each result list.
pub const DEFAULT_SEARCH_LIMIT: usize = 5;

/// Ranked search hits, exchanges and regions kept apart.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchResults<'a> {
    pub exchanges: Vec<&'a Exchange>,
    pub regions: Vec<&'a CloudRegion>,
}

impl SearchResults<'_> {
    pub fn is_empty(&self) -> bool {
        self.exchanges.is_empty() && self.regions.is_empty()
    }
}

/// Earliest position of `needle` in any of `fields`, lowercased.
fn first_match(needle: &str, fields: &[&str]) -> Option<usize> {
    fields.iter().filter_map(|f| f.to_lowercase().find(needle)).min()
}

fn rank<'a, T>(
    items: &'a [T],
    needle: &str,
    limit: usize,
    fields: impl Fn(&'a T) -> [&'a str; 3],
) -> Vec<&'a T> {
    let mut hits: Vec<(usize, usize, &T)> = items
        .iter()
        .enumerate()
        .filter_map(|(i, item)| first_match(needle, &fields(item)).map(|pos| (pos, i, item)))
        .collect();
    hits.sort_by_key(|&(pos, i, _)| (pos, i));
    hits.into_iter().take(limit).map(|(_, _, item)| item).collect()
}

/// Search both catalogs for `query`.
///
/// A blank query returns empty lists.
pub fn search<'a>(query: &str, catalog: &'a Catalog, limit: usize) -> SearchResults<'a> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return SearchResults::default();
    }

    let exchanges = rank(catalog.exchanges(), &needle, limit, |e| {
        [e.name.as_str(), e.region.as_str(), e.id.as_str()]
    });
    let regions = rank(catalog.regions(), &needle, limit, |r| {
        [r.location.as_str(), r.provider.as_str(), r.region_code.as_str()]
    });

    SearchResults { exchanges, regions }
}
