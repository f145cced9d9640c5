//! Enumerations shared across the topology engine.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Cloud providers
// ---------------------------------------------------------------------------

/// Cloud provider hosting a [`CloudRegion`](super::CloudRegion).
///
/// Serialized with the provider's own capitalization (`"AWS"`, `"GCP"`,
/// `"Azure"`), which is also what free-text search matches against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CloudProvider {
    #[serde(rename = "AWS", alias = "aws")]
    Aws,
    #[serde(rename = "GCP", alias = "gcp")]
    Gcp,
    #[serde(rename = "Azure", alias = "azure")]
    Azure,
}

impl CloudProvider {
    /// All providers, in display order.
    pub const ALL: [CloudProvider; 3] = [Self::Aws, Self::Gcp, Self::Azure];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Aws => "AWS",
            Self::Gcp => "GCP",
            Self::Azure => "Azure",
        }
    }
}

impl std::fmt::Display for CloudProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CloudProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "aws" => Ok(Self::Aws),
            "gcp" => Ok(Self::Gcp),
            "azure" => Ok(Self::Azure),
            other => Err(format!("unknown cloud provider: {other}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Exchange status
// ---------------------------------------------------------------------------

/// Operational status of an exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExchangeStatus {
    #[default]
    Online,
    Offline,
    Degraded,
}

// ---------------------------------------------------------------------------
// Entity kind (used by NotFound errors)
// ---------------------------------------------------------------------------

/// Which catalog a lookup was made against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Exchange,
    CloudRegion,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exchange => write!(f, "exchange"),
            Self::CloudRegion => write!(f, "cloud region"),
        }
    }
}

// ---------------------------------------------------------------------------
// History windows
// ---------------------------------------------------------------------------

/// Time window covered by a historical series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TimeWindow {
    #[serde(rename = "1h")]
    OneHour,
    #[default]
    #[serde(rename = "24h")]
    OneDay,
    #[serde(rename = "7d")]
    OneWeek,
    #[serde(rename = "30d")]
    OneMonth,
}

impl TimeWindow {
    pub const ALL: [TimeWindow; 4] = [Self::OneHour, Self::OneDay, Self::OneWeek, Self::OneMonth];

    /// Window length in hours.
    pub fn hours(&self) -> u64 {
        match self {
            Self::OneHour => 1,
            Self::OneDay => 24,
            Self::OneWeek => 168,
            Self::OneMonth => 720,
        }
    }

    /// Window length in milliseconds.
    pub fn duration_ms(&self) -> u64 {
        self.hours() * 3_600_000
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::OneHour => "1h",
            Self::OneDay => "24h",
            Self::OneWeek => "7d",
            Self::OneMonth => "30d",
        }
    }
}

impl std::fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TimeWindow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1h" | "1" => Ok(Self::OneHour),
            "24h" | "1d" | "24" => Ok(Self::OneDay),
            "7d" | "168h" | "168" => Ok(Self::OneWeek),
            "30d" | "720h" | "720" => Ok(Self::OneMonth),
            other => Err(format!("unsupported time window: {other} (expected 1h, 24h, 7d or 30d)")),
        }
    }
}

// ---------------------------------------------------------------------------
// Client access network
// ---------------------------------------------------------------------------

/// Effective type of the observer's access network.
///
/// Adds a fixed overhead on top of the distance-derived latency when the
/// simulator is told what kind of link the observer sits behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccessNetwork {
    #[serde(rename = "slow-2g")]
    Slow2g,
    #[serde(rename = "2g")]
    TwoG,
    #[serde(rename = "3g")]
    ThreeG,
    #[serde(rename = "4g")]
    FourG,
    #[serde(rename = "unknown")]
    Unknown,
}

impl AccessNetwork {
    /// Base overhead in milliseconds contributed by the access link.
    pub fn overhead_ms(&self) -> f64 {
        match self {
            Self::Slow2g => 300.0,
            Self::TwoG => 200.0,
            Self::ThreeG => 100.0,
            Self::FourG => 30.0,
            Self::Unknown => 20.0,
        }
    }
}

impl FromStr for AccessNetwork {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "slow-2g" => Ok(Self::Slow2g),
            "2g" => Ok(Self::TwoG),
            "3g" => Ok(Self::ThreeG),
            "4g" => Ok(Self::FourG),
            "unknown" => Ok(Self::Unknown),
            other => Err(format!("unknown access network: {other}")),
        }
    }
}
