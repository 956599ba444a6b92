//! Feed analytics: aggregate summary, insight tiles, and map markers.

use std::collections::BTreeMap;

use rand::Rng;
use serde::Serialize;

use crate::model::{Disruption, Region, Severity};

/// Critical count the insight tile compares against.
const CRITICAL_BASELINE: usize = 50;

// =============================================================================
// SUMMARY
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub total: usize,
    /// Every severity is present, zero when unseen.
    pub by_severity: BTreeMap<&'static str, usize>,
    pub by_type: BTreeMap<String, usize>,
    /// Every region is present, zero when unseen.
    pub by_region: BTreeMap<&'static str, usize>,
    pub average_confidence: f64,
    pub total_affected_routes: u64,
    /// Fraction of records that are critical, `0.0` for an empty feed.
    pub critical_share: f64,
}

#[must_use]
pub fn summarize(records: &[Disruption]) -> Summary {
    let mut by_severity: BTreeMap<&'static str, usize> = Severity::ALL.iter().map(|s| (s.as_str(), 0)).collect();
    let mut by_region: BTreeMap<&'static str, usize> = Region::ALL.iter().map(|r| (r.as_str(), 0)).collect();
    let mut by_type: BTreeMap<String, usize> = BTreeMap::new();
    let mut confidence_sum = 0.0;
    let mut total_affected_routes = 0u64;

    for d in records {
        *by_severity.entry(d.severity.as_str()).or_default() += 1;
        *by_region.entry(d.region.as_str()).or_default() += 1;
        *by_type.entry(d.kind.clone()).or_default() += 1;
        confidence_sum += d.confidence;
        total_affected_routes += u64::from(d.affected_routes);
    }

    let total = records.len();
    let critical = by_severity.get(Severity::Critical.as_str()).copied().unwrap_or(0);
    #[allow(clippy::cast_precision_loss)]
    let (average_confidence, critical_share) = if total == 0 {
        (0.0, 0.0)
    } else {
        (confidence_sum / total as f64, critical as f64 / total as f64)
    };

    Summary {
        total,
        by_severity,
        by_type,
        by_region,
        average_confidence,
        total_affected_routes,
        critical_share,
    }
}

// =============================================================================
// INSIGHTS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Stable,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insight {
    pub label: &'static str,
    pub value: String,
    pub change: String,
    pub trend: Trend,
    pub icon: &'static str,
}

fn insight(label: &'static str, icon: &'static str, value: String, change: impl Into<String>, trend: Trend) -> Insight {
    Insight { label, value, change: change.into(), trend, icon }
}

fn up_if(rising: bool) -> Trend {
    if rising { Trend::Up } else { Trend::Down }
}

/// The eight real-time tiles. Only the critical count comes from the feed;
/// the rest are sampled.
pub fn insights<R: Rng + ?Sized>(records: &[Disruption], rng: &mut R) -> Vec<Insight> {
    let critical = records.iter().filter(|d| d.severity == Severity::Critical).count();

    let wait_hours: u32 = rng.random_range(25..45);
    let vessels: u64 = rng.random_range(797..897);
    let weather_events: u32 = rng.random_range(3..8);
    let customs_ports: u32 = rng.random_range(45..75);
    let container_rate: u64 = rng.random_range(2400..2600);
    let fuel_price: u32 = rng.random_range(580..620);
    let co2_tons: u64 = rng.random_range(1200..1400);

    let critical_change = if critical > CRITICAL_BASELINE {
        format!("+{}", critical - CRITICAL_BASELINE)
    } else {
        format!("-{}", CRITICAL_BASELINE - critical)
    };

    vec![
        insight(
            "Avg Port Wait Time",
            "⏱️",
            format!("{wait_hours}hrs"),
            if wait_hours > 35 { "+12%" } else { "-5%" },
            up_if(wait_hours > 35),
        ),
        insight("Vessels In Transit", "🚢", group_thousands(vessels), "+23", Trend::Up),
        insight(
            "Active Weather Events",
            "🌦️",
            weather_events.to_string(),
            if weather_events > 5 { "+2" } else { "-1" },
            up_if(weather_events > 5),
        ),
        insight(
            "Customs Delays",
            "📋",
            format!("{customs_ports} ports"),
            if customs_ports > 60 { "+8" } else { "-4" },
            up_if(customs_ports > 60),
        ),
        insight("Container Rate (TEU)", "💰", format!("${}", group_thousands(container_rate)), "+3.2%", Trend::Up),
        insight("Fuel Price/MT", "⛽", format!("${fuel_price}.00"), "-1.8%", Trend::Down),
        insight("CO2 Emissions Today", "🌍", format!("{} tons", group_thousands(co2_tons)), "-15%", Trend::Down),
        insight(
            "Critical Disruptions",
            "🔴",
            critical.to_string(),
            critical_change,
            up_if(critical > CRITICAL_BASELINE),
        ),
    ]
}

/// `1234567` -> `"1,234,567"`.
#[must_use]
pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

// =============================================================================
// MAP
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapPoint {
    pub id: String,
    /// `[longitude, latitude]`.
    pub location: [f64; 2],
    pub location_name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub severity: Severity,
    pub color: &'static str,
    /// Popup text for the marker's severity badge.
    pub label: &'static str,
}

#[must_use]
pub fn map_points(records: &[Disruption]) -> Vec<MapPoint> {
    records
        .iter()
        .map(|d| MapPoint {
            id: d.id.clone(),
            location: d.location,
            location_name: d.location_name.clone(),
            kind: d.kind.clone(),
            severity: d.severity,
            color: d.severity.color(),
            label: d.severity.label(),
        })
        .collect()
}

#[cfg(test)]
#[path = "analytics_test.rs"]
mod tests;
