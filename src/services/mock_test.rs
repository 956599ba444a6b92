use super::*;

use std::collections::HashSet;

use chrono::TimeZone;
use rand::SeedableRng;
use rand::rngs::StdRng;

fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 5, 12, 12, 0, 0).unwrap()
}

#[test]
fn generates_requested_count() {
    let mut rng = StdRng::seed_from_u64(1);
    assert_eq!(generate_disruptions(&mut rng, 150, fixed_now()).len(), 150);
    assert!(generate_disruptions(&mut rng, 0, fixed_now()).is_empty());
}

#[test]
fn fields_stay_in_range() {
    let mut rng = StdRng::seed_from_u64(7);
    let now = fixed_now();
    for d in generate_disruptions(&mut rng, 500, now) {
        assert!(Severity::ALL.contains(&d.severity));
        assert!((0.75..=0.99).contains(&d.confidence), "confidence {} out of range", d.confidence);
        assert!((1..=MAX_AFFECTED_ROUTES).contains(&d.affected_routes));
        assert!(DISRUPTION_TYPES.contains(&d.kind.as_str()));
        assert!(d.timestamp <= now);
        assert!(now - d.timestamp < Duration::hours(MAX_HOURS_AGO));
    }
}

#[test]
fn description_and_location_follow_port() {
    let mut rng = StdRng::seed_from_u64(11);
    for d in generate_disruptions(&mut rng, 200, fixed_now()) {
        let port = PORTS
            .iter()
            .find(|p| p.name == d.location_name)
            .expect("location name should be a known port");
        assert_eq!(d.region, port.region);
        assert!(d.description.starts_with(&format!("{}: ", port.name)));
        let phrase = &d.description[port.name.len() + 2..];
        assert!(DESCRIPTIONS.contains(&phrase));
        assert!((d.longitude() - port.coords[0]).abs() <= LOCATION_OFFSET / 2.0 + 1e-9);
        assert!((d.latitude() - port.coords[1]).abs() <= LOCATION_OFFSET / 2.0 + 1e-9);
    }
}

#[test]
fn ids_are_unique_and_sequential() {
    let mut rng = StdRng::seed_from_u64(3);
    let records = generate_disruptions(&mut rng, 50, fixed_now());
    let ids: HashSet<_> = records.iter().map(|d| d.id.clone()).collect();
    assert_eq!(ids.len(), 50);
    for n in 1..=50 {
        assert!(ids.contains(&format!("disruption-{n}")));
    }
}

#[test]
fn output_is_sorted_newest_first() {
    let mut rng = StdRng::seed_from_u64(5);
    let records = generate_disruptions(&mut rng, 300, fixed_now());
    assert!(records.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));
}

#[test]
fn every_severity_appears_in_a_large_sample() {
    let mut rng = StdRng::seed_from_u64(9);
    let seen: HashSet<_> = generate_disruptions(&mut rng, 400, fixed_now())
        .into_iter()
        .map(|d| d.severity)
        .collect();
    assert_eq!(seen.len(), 4);
}

#[test]
fn sample_uses_given_sequence_and_offset() {
    let mut rng = StdRng::seed_from_u64(13);
    let now = fixed_now();
    let d = sample_disruption(&mut rng, 42, now, 6);
    assert_eq!(d.id, "disruption-42");
    assert_eq!(d.timestamp, now - Duration::hours(6));
}

#[test]
fn nearest_port_resolves_known_coordinates() {
    assert_eq!(nearest_port([121.47, 31.23]).name, "Shanghai");
    assert_eq!(nearest_port([4.47, 51.92]).name, "Rotterdam");
    assert_eq!(nearest_port([-118.24, 33.74]).region, Region::NorthAmerica);
}
