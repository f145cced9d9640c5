//! Catalog entities: exchanges, cloud regions and their coordinates.

use serde::{Deserialize, Serialize};

use super::enums::{CloudProvider, ExchangeStatus};

/// A point on the globe, in degrees.
///
/// Serialized as a `[lat, lng]` pair, matching the catalog files.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// `true` if latitude is within ±90° and longitude within ±180°.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

impl From<[f64; 2]> for GeoPoint {
    fn from(v: [f64; 2]) -> Self {
        Self::new(v[0], v[1])
    }
}

impl From<GeoPoint> for [f64; 2] {
    fn from(p: GeoPoint) -> Self {
        [p.lat, p.lng]
    }
}

/// A cryptocurrency trading venue anchored at a fixed location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exchange {
    pub id: String,
    pub name: String,
    pub coordinates: GeoPoint,
    /// Geographic region label (e.g. `"Asia-Pacific"`).
    pub region: String,
    /// 24-hour trading volume in USD.
    #[serde(rename = "volume24h")]
    pub volume_24h: f64,
    #[serde(default)]
    pub status: ExchangeStatus,
    /// Public REST endpoint a probe may time. Pairs without one are always
    /// simulated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

/// A cloud provider's regional deployment location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudRegion {
    pub id: String,
    pub provider: CloudProvider,
    /// Provider-specific code (e.g. `"us-east-1"`).
    pub region_code: String,
    /// Human-readable location (e.g. `"N. Virginia"`).
    pub location: String,
    pub coordinates: GeoPoint,
    #[serde(default)]
    pub zones: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exchange_json_shape() {
        let json = r#"{
            "id": "binance",
            "name": "Binance",
            "coordinates": [35.6762, 139.6503],
            "region": "Asia-Pacific",
            "volume24h": 15240000000,
            "status": "online"
        }"#;
        let ex: Exchange = serde_json::from_str(json).unwrap();
        assert_eq!(ex.coordinates, GeoPoint::new(35.6762, 139.6503));
        assert_eq!(ex.status, ExchangeStatus::Online);
        assert!(ex.endpoint.is_none());

        let back = serde_json::to_value(&ex).unwrap();
        assert_eq!(back["volume24h"], serde_json::json!(15240000000.0));
        assert_eq!(back["coordinates"][1], serde_json::json!(139.6503));
    }

    #[test]
    fn region_json_shape() {
        let json = r#"{
            "id": "aws-us-east-1",
            "provider": "AWS",
            "regionCode": "us-east-1",
            "location": "N. Virginia",
            "coordinates": [38.9072, -77.0369],
            "zones": ["a", "b"]
        }"#;
        let r: CloudRegion = serde_json::from_str(json).unwrap();
        assert_eq!(r.provider, CloudProvider::Aws);
        assert_eq!(r.region_code, "us-east-1");
        assert_eq!(r.zones.len(), 2);
    }

    #[test]
    fn geo_point_validity() {
        assert!(GeoPoint::new(51.5, -0.12).is_valid());
        assert!(!GeoPoint::new(91.0, 0.0).is_valid());
        assert!(!GeoPoint::new(0.0, f64::NAN).is_valid());
    }
}
