//! Domain records shared by the feed, search, export, and websocket layers.
//!
//! DESIGN
//! ======
//! `Disruption` mirrors the JSON shape dashboards already consume
//! (camelCase keys, `type` for the category, `[lng, lat]` location). Enums
//! serialize lowercase except `Region`, which keeps its display name because
//! dashboards filter on the label directly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// SEVERITY
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub const ALL: [Severity; 4] = [Severity::Low, Severity::Medium, Severity::High, Severity::Critical];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    /// Case-insensitive parse; accepts both `critical` and `Critical`.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            "critical" => Some(Self::Critical),
            _ => None,
        }
    }

    /// Marker colour used by map and alert panels.
    #[must_use]
    pub fn color(self) -> &'static str {
        match self {
            Self::Critical => "#dc2626",
            Self::High => "#ef4444",
            Self::Medium => "#f59e0b",
            Self::Low => "#22c55e",
        }
    }

    /// Capitalised display label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Critical => "Critical",
        }
    }
}

// =============================================================================
// REGION
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Region {
    #[serde(rename = "Asia-Pacific")]
    AsiaPacific,
    #[serde(rename = "North America")]
    NorthAmerica,
    #[serde(rename = "Europe")]
    Europe,
    #[serde(rename = "Middle East")]
    MiddleEast,
    #[serde(rename = "South America")]
    SouthAmerica,
    #[serde(rename = "Africa")]
    Africa,
}

impl Region {
    pub const ALL: [Region; 6] = [
        Region::AsiaPacific,
        Region::NorthAmerica,
        Region::Europe,
        Region::MiddleEast,
        Region::SouthAmerica,
        Region::Africa,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AsiaPacific => "Asia-Pacific",
            Self::NorthAmerica => "North America",
            Self::Europe => "Europe",
            Self::MiddleEast => "Middle East",
            Self::SouthAmerica => "South America",
            Self::Africa => "Africa",
        }
    }

    /// Lenient parse: ignores case, spaces, dashes, and underscores so that
    /// `asia-pacific`, `Asia Pacific`, and `asia_pacific` all resolve.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let key: String = raw
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        Self::ALL.into_iter().find(|region| {
            let candidate: String = region
                .as_str()
                .chars()
                .filter(char::is_ascii_alphanumeric)
                .map(|c| c.to_ascii_lowercase())
                .collect();
            candidate == key
        })
    }
}

// =============================================================================
// DISRUPTION STATUS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisruptionStatus {
    Active,
    Resolved,
    Predicted,
}

impl DisruptionStatus {
    pub const ALL: [DisruptionStatus; 3] =
        [DisruptionStatus::Active, DisruptionStatus::Resolved, DisruptionStatus::Predicted];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Resolved => "resolved",
            Self::Predicted => "predicted",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "active" => Some(Self::Active),
            "resolved" => Some(Self::Resolved),
            "predicted" => Some(Self::Predicted),
            _ => None,
        }
    }
}

// =============================================================================
// DISRUPTION
// =============================================================================

/// A synthetic supply-chain event. Every field is sampled independently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Disruption {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    /// `[longitude, latitude]`.
    pub location: [f64; 2],
    pub location_name: String,
    pub region: Region,
    pub severity: Severity,
    pub status: DisruptionStatus,
    pub confidence: f64,
    pub affected_routes: u32,
    pub timestamp: DateTime<Utc>,
    pub description: String,
}

impl Disruption {
    #[must_use]
    pub fn longitude(&self) -> f64 {
        self.location[0]
    }

    #[must_use]
    pub fn latitude(&self) -> f64 {
        self.location[1]
    }
}

#[cfg(test)]
#[path = "model_test.rs"]
mod tests;
