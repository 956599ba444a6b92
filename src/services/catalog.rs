//! Static shipping route catalog and headline metrics.
//!
//! These figures are hand-authored demo data; nothing recomputes them.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteStatus {
    Active,
    Delayed,
    Disrupted,
    Optimal,
}

impl RouteStatus {
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "active" => Some(Self::Active),
            "delayed" => Some(Self::Delayed),
            "disrupted" => Some(Self::Disrupted),
            "optimal" => Some(Self::Optimal),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Route {
    pub id: &'static str,
    pub name: &'static str,
    pub origin: &'static str,
    pub destination: &'static str,
    pub distance: &'static str,
    pub duration: &'static str,
    pub status: RouteStatus,
    pub vessels: u32,
    pub cargo: &'static str,
    pub reliability: u32,
}

pub const ROUTES: &[Route] = &[
    Route {
        id: "route-1",
        name: "Pacific Express",
        origin: "Shanghai",
        destination: "Los Angeles",
        distance: "6,500 nm",
        duration: "14 days",
        status: RouteStatus::Active,
        vessels: 12,
        cargo: "45,000 TEU",
        reliability: 94,
    },
    Route {
        id: "route-2",
        name: "Atlantic Bridge",
        origin: "Rotterdam",
        destination: "New York/New Jersey",
        distance: "3,200 nm",
        duration: "8 days",
        status: RouteStatus::Optimal,
        vessels: 8,
        cargo: "32,000 TEU",
        reliability: 98,
    },
    Route {
        id: "route-3",
        name: "Silk Road Maritime",
        origin: "Singapore",
        destination: "Hamburg",
        distance: "8,500 nm",
        duration: "21 days",
        status: RouteStatus::Delayed,
        vessels: 15,
        cargo: "67,000 TEU",
        reliability: 87,
    },
    Route {
        id: "route-4",
        name: "Trans-Pacific Line",
        origin: "Hong Kong",
        destination: "Long Beach",
        distance: "6,700 nm",
        duration: "15 days",
        status: RouteStatus::Active,
        vessels: 10,
        cargo: "41,000 TEU",
        reliability: 92,
    },
    Route {
        id: "route-5",
        name: "Nordic Route",
        origin: "Busan",
        destination: "Seattle",
        distance: "5,400 nm",
        duration: "12 days",
        status: RouteStatus::Optimal,
        vessels: 6,
        cargo: "28,000 TEU",
        reliability: 96,
    },
    Route {
        id: "route-6",
        name: "Mediterranean Express",
        origin: "Shanghai",
        destination: "Genoa",
        distance: "9,800 nm",
        duration: "24 days",
        status: RouteStatus::Disrupted,
        vessels: 9,
        cargo: "38,000 TEU",
        reliability: 78,
    },
    Route {
        id: "route-7",
        name: "Americas Corridor",
        origin: "Santos",
        destination: "Miami",
        distance: "4,200 nm",
        duration: "10 days",
        status: RouteStatus::Active,
        vessels: 5,
        cargo: "19,000 TEU",
        reliability: 90,
    },
    Route {
        id: "route-8",
        name: "Middle East Gateway",
        origin: "Dubai",
        destination: "Rotterdam",
        distance: "6,100 nm",
        duration: "16 days",
        status: RouteStatus::Optimal,
        vessels: 7,
        cargo: "31,000 TEU",
        reliability: 95,
    },
];

/// Routes with the given status, or every route for `None`.
#[must_use]
pub fn filter_by_status(status: Option<RouteStatus>) -> Vec<Route> {
    ROUTES
        .iter()
        .filter(|r| status.is_none_or(|s| r.status == s))
        .cloned()
        .collect()
}

/// Routes that start or end at the named port.
#[must_use]
pub fn routes_touching(port: &str) -> Vec<&'static Route> {
    ROUTES
        .iter()
        .filter(|r| r.origin == port || r.destination == port)
        .collect()
}

// =============================================================================
// METRICS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metrics {
    pub prediction_accuracy: f64,
    pub avg_warning_time_hours: u32,
    pub cost_saved_today: u64,
    pub disruptions_prevented: u32,
    pub routes_optimized: u32,
    pub active_agents: u32,
    pub mode: &'static str,
}

pub const METRICS: Metrics = Metrics {
    prediction_accuracy: 0.987,
    avg_warning_time_hours: 48,
    cost_saved_today: 2_400_000,
    disruptions_prevented: 23,
    routes_optimized: 156,
    active_agents: 3,
    mode: "demo",
};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutePerformance {
    pub route: &'static str,
    pub on_time: u32,
    pub delayed: u32,
}

pub const ROUTE_PERFORMANCE: &[RoutePerformance] = &[
    RoutePerformance { route: "Shanghai → Los Angeles", on_time: 87, delayed: 13 },
    RoutePerformance { route: "Rotterdam → New York", on_time: 92, delayed: 8 },
    RoutePerformance { route: "Singapore → Hamburg", on_time: 78, delayed: 22 },
    RoutePerformance { route: "Hong Kong → Long Beach", on_time: 85, delayed: 15 },
    RoutePerformance { route: "Busan → Seattle", on_time: 90, delayed: 10 },
];

/// Weekly prediction accuracy (percent), oldest first.
pub const PREDICTION_ACCURACY: &[f64] = &[94.5, 95.2, 96.1, 97.3, 98.7, 97.9, 98.2, 98.7];

#[cfg(test)]
#[path = "catalog_test.rs"]
mod tests;
