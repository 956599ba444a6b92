//! Mock generator: synthetic disruption records.
//!
//! DESIGN
//! ======
//! Every field is drawn independently and uniformly from static tables:
//! a port (which fixes location name, region, and base coordinate), a type,
//! a severity, a status, and a description phrase. Nothing correlates; a
//! "critical" record is no more likely to be a strike than a customs delay.
//!
//! Functions are generic over `rand::Rng` so callers pass `rand::rng()` in
//! production and a seeded `StdRng` in tests.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use rand::seq::IndexedRandom;

use crate::model::{Disruption, DisruptionStatus, Region, Severity};

// =============================================================================
// TABLES
// =============================================================================

pub const DISRUPTION_TYPES: &[&str] = &[
    "Port Congestion",
    "Weather Delay",
    "Labor Strike",
    "Infrastructure Damage",
    "Customs Delay",
    "Cyber Security Incident",
    "Equipment Failure",
    "Fuel Shortage",
    "Geopolitical Tension",
    "Natural Disaster",
    "Traffic Accident",
    "Border Closure",
    "Power Outage",
    "Supply Shortage",
    "Pandemic Restrictions",
];

pub const DESCRIPTIONS: &[&str] = &[
    "Heavy container backlog causing delays",
    "Severe weather conditions affecting operations",
    "Workers demanding better conditions",
    "Recent storm damaged loading equipment",
    "Documentation processing delays",
    "Ransomware attack on port systems",
    "Crane malfunction halting operations",
    "Limited fuel availability for vessels",
    "Trade restrictions impacting flow",
    "Earthquake damaged port infrastructure",
    "Multi-vehicle collision blocking access",
    "Temporary closure for security reasons",
    "Grid failure affecting operations",
    "Container shortage impacting capacity",
    "Health screening protocols causing delays",
    "Vessel grounding in shipping channel",
    "Labor union negotiations ongoing",
    "Extreme heat affecting operations",
    "Flooding in port area",
    "Customs inspection backlog",
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Port {
    pub name: &'static str,
    /// `[longitude, latitude]`.
    pub coords: [f64; 2],
    pub region: Region,
}

const fn port(name: &'static str, lng: f64, lat: f64, region: Region) -> Port {
    Port { name, coords: [lng, lat], region }
}

pub const PORTS: &[Port] = &[
    port("Shanghai", 121.4737, 31.2304, Region::AsiaPacific),
    port("Singapore", 103.8198, 1.3521, Region::AsiaPacific),
    port("Shenzhen", 114.0579, 22.5431, Region::AsiaPacific),
    port("Ningbo-Zhoushan", 121.5440, 29.8683, Region::AsiaPacific),
    port("Guangzhou Harbor", 113.2644, 23.1291, Region::AsiaPacific),
    port("Busan", 129.0756, 35.1796, Region::AsiaPacific),
    port("Hong Kong", 114.1694, 22.3193, Region::AsiaPacific),
    port("Qingdao", 120.3826, 36.0671, Region::AsiaPacific),
    port("Tianjin", 117.2008, 39.0842, Region::AsiaPacific),
    port("Rotterdam", 4.4777, 51.9244, Region::Europe),
    port("Antwerp", 4.4025, 51.2194, Region::Europe),
    port("Los Angeles", -118.2437, 34.0522, Region::NorthAmerica),
    port("Long Beach", -118.1937, 33.7701, Region::NorthAmerica),
    port("Hamburg", 9.9937, 53.5511, Region::Europe),
    port("New York/New Jersey", -74.0060, 40.7128, Region::NorthAmerica),
    port("Dubai", 55.2708, 25.2048, Region::MiddleEast),
    port("Tanjung Pelepas", 103.5500, 1.3667, Region::AsiaPacific),
    port("Kaohsiung", 120.2513, 22.6273, Region::AsiaPacific),
    port("Xiamen", 118.0894, 24.4798, Region::AsiaPacific),
    port("Dalian", 121.6147, 38.9140, Region::AsiaPacific),
    port("Savannah", -81.0998, 32.0809, Region::NorthAmerica),
    port("Seattle", -122.3321, 47.6062, Region::NorthAmerica),
    port("Vancouver", -123.1216, 49.2827, Region::NorthAmerica),
    port("Melbourne", 144.9631, -37.8136, Region::AsiaPacific),
    port("Sydney", 151.2093, -33.8688, Region::AsiaPacific),
    port("Genoa", 8.9463, 44.4056, Region::Europe),
    port("Barcelona", 2.1734, 41.3851, Region::Europe),
    port("Valencia", -0.3763, 39.4699, Region::Europe),
    port("Piraeus", 23.6433, 37.9420, Region::Europe),
    port("Jeddah", 39.1925, 21.5433, Region::MiddleEast),
    port("Santos", -46.3336, -23.9608, Region::SouthAmerica),
    port("Buenos Aires", -58.3816, -34.6037, Region::SouthAmerica),
    port("Tokyo", 139.6917, 35.6895, Region::AsiaPacific),
    port("Yokohama", 139.6380, 35.4437, Region::AsiaPacific),
    port("Kobe", 135.1955, 34.6901, Region::AsiaPacific),
    port("Colombo", 79.8612, 6.9271, Region::AsiaPacific),
    port("Chennai", 80.2707, 13.0827, Region::AsiaPacific),
    port("Mumbai", 72.8777, 19.0760, Region::AsiaPacific),
    port("Karachi", 67.0099, 24.8607, Region::AsiaPacific),
    port("Jakarta", 106.8456, -6.2088, Region::AsiaPacific),
    port("Manila", 120.9842, 14.5995, Region::AsiaPacific),
    port("Ho Chi Minh", 106.6297, 10.8231, Region::AsiaPacific),
    port("Bangkok", 100.5018, 13.7563, Region::AsiaPacific),
    port("Cape Town", 18.4241, -33.9249, Region::Africa),
    port("Durban", 31.0218, -29.8587, Region::Africa),
    port("Lagos", 3.3792, 6.5244, Region::Africa),
    port("Mombasa", 39.6682, -4.0435, Region::Africa),
    port("Istanbul", 28.9784, 41.0082, Region::Europe),
    port("Haifa", 34.9896, 32.7940, Region::MiddleEast),
    port("Alexandria", 29.9187, 31.2001, Region::Africa),
];

/// Total jitter applied to each coordinate axis (±half on either side).
pub const LOCATION_OFFSET: f64 = 0.5;

pub const CONFIDENCE_MIN: f64 = 0.75;
pub const CONFIDENCE_SPAN: f64 = 0.24;

pub const MAX_AFFECTED_ROUTES: u32 = 20;

/// Seeded records are backdated up to this many hours.
pub const MAX_HOURS_AGO: i64 = 72;

// =============================================================================
// GENERATION
// =============================================================================

/// Generate `count` records with ids `disruption-1..=count`, newest first.
pub fn generate_disruptions<R: Rng + ?Sized>(rng: &mut R, count: usize, now: DateTime<Utc>) -> Vec<Disruption> {
    let mut records = Vec::with_capacity(count);
    for seq in 1..=count as u64 {
        let hours_ago = rng.random_range(0..MAX_HOURS_AGO);
        records.push(sample_disruption(rng, seq, now, hours_ago));
    }

    records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    records
}

/// Sample one record stamped `hours_ago` hours before `now`.
pub fn sample_disruption<R: Rng + ?Sized>(rng: &mut R, seq: u64, now: DateTime<Utc>, hours_ago: i64) -> Disruption {
    let port = pick(rng, PORTS);
    let kind = *pick(rng, DISRUPTION_TYPES);
    let phrase = *pick(rng, DESCRIPTIONS);
    let severity = *pick(rng, &Severity::ALL);
    let status = *pick(rng, &DisruptionStatus::ALL);

    let location = [
        port.coords[0] + (rng.random::<f64>() - 0.5) * LOCATION_OFFSET,
        port.coords[1] + (rng.random::<f64>() - 0.5) * LOCATION_OFFSET,
    ];

    Disruption {
        id: format!("disruption-{seq}"),
        kind: kind.to_string(),
        location,
        location_name: port.name.to_string(),
        region: port.region,
        severity,
        status,
        confidence: CONFIDENCE_MIN + rng.random::<f64>() * CONFIDENCE_SPAN,
        affected_routes: rng.random_range(1..=MAX_AFFECTED_ROUTES),
        timestamp: now - Duration::hours(hours_ago),
        description: format!("{}: {phrase}", port.name),
    }
}

/// Closest port to a coordinate, by squared degree distance.
///
/// Good enough for labelling upstream records that arrive without a region;
/// not a geodesic distance.
#[must_use]
pub fn nearest_port(location: [f64; 2]) -> &'static Port {
    let dist = |p: &Port| {
        let dx = p.coords[0] - location[0];
        let dy = p.coords[1] - location[1];
        dx * dx + dy * dy
    };
    PORTS
        .iter()
        .min_by(|a, b| dist(a).total_cmp(&dist(b)))
        .unwrap_or(&PORTS[0])
}

fn pick<'a, R: Rng + ?Sized, T>(rng: &mut R, items: &'a [T]) -> &'a T {
    // Tables are non-empty constants.
    items.choose(rng).unwrap_or(&items[0])
}

#[cfg(test)]
#[path = "mock_test.rs"]
mod tests;
