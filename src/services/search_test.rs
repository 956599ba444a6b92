use super::*;

use chrono::TimeZone;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::services::mock;
use crate::state::test_helpers::disruption;

fn seeded(count: usize) -> Vec<Disruption> {
    let now = Utc.with_ymd_and_hms(2026, 5, 12, 12, 0, 0).unwrap();
    mock::generate_disruptions(&mut StdRng::seed_from_u64(42), count, now)
}

fn at(id: &str, y: i32, m: u32, d: u32, h: u32) -> Disruption {
    let mut record = disruption(id, Severity::Medium, "x");
    record.timestamp = Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap();
    record
}

fn query(pairs: &[(&str, &str)]) -> SearchQuery {
    let mut q = SearchQuery::default();
    for (key, value) in pairs {
        let value = Some((*value).to_string());
        match *key {
            "q" => q.q = value,
            "severity" => q.severity = value,
            "type" => q.kind = value,
            "status" => q.status = value,
            "region" => q.region = value,
            "start" => q.start = value,
            "end" => q.end = value,
            other => panic!("unexpected key {other}"),
        }
    }
    q
}

#[test]
fn empty_filters_match_everything() {
    let records = seeded(100);
    let filters = Filters::default();
    assert!(filters.is_empty());
    assert_eq!(filters.apply(&records).len(), 100);
}

#[test]
fn severity_facet_returns_only_selected() {
    let records = seeded(300);
    let filters = Filters { severity: vec![Severity::Critical, Severity::High], ..Filters::default() };
    let matched = filters.apply(&records);
    assert!(!matched.is_empty());
    assert!(matched.iter().all(|d| matches!(d.severity, Severity::Critical | Severity::High)));
    let expected = records
        .iter()
        .filter(|d| matches!(d.severity, Severity::Critical | Severity::High))
        .count();
    assert_eq!(matched.len(), expected);
}

#[test]
fn text_search_is_case_insensitive_substring() {
    let records = vec![
        disruption("disruption-1", Severity::Low, "Shanghai: Heavy FOG reducing visibility"),
        disruption("disruption-2", Severity::Low, "Rotterdam: Labor strike"),
    ];
    let filters = Filters { search: "fog".into(), ..Filters::default() };
    let ids: Vec<_> = filters.apply(&records).into_iter().map(|d| d.id).collect();
    assert_eq!(ids, vec!["disruption-1"]);
}

#[test]
fn date_range_is_inclusive_by_day() {
    let records = vec![
        at("disruption-1", 2026, 5, 9, 23),
        at("disruption-2", 2026, 5, 10, 0),
        at("disruption-3", 2026, 5, 11, 23),
        at("disruption-4", 2026, 5, 12, 0),
    ];
    let filters = Filters {
        date_start: NaiveDate::from_ymd_opt(2026, 5, 10),
        date_end: NaiveDate::from_ymd_opt(2026, 5, 11),
        ..Filters::default()
    };
    let ids: Vec<_> = filters.apply(&records).into_iter().map(|d| d.id).collect();
    assert_eq!(ids, vec!["disruption-2", "disruption-3"]);
    assert_eq!(filters.active_filter_count(), 1);
}

#[test]
fn types_match_case_insensitively() {
    let records = vec![disruption("disruption-1", Severity::Low, "x")];
    let filters = Filters { types: vec!["port congestion".into()], ..Filters::default() };
    assert_eq!(filters.apply(&records).len(), 1);
}

#[test]
fn clearing_restores_unfiltered_count() {
    let records = seeded(200);
    let mut filters = Filters {
        search: "port".into(),
        severity: vec![Severity::Low],
        region: vec![Region::Europe],
        ..Filters::default()
    };
    assert!(filters.apply(&records).len() < records.len());
    assert_eq!(filters.active_filter_count(), 2);

    filters.clear();
    assert!(filters.is_empty());
    assert_eq!(filters.apply(&records).len(), records.len());
}

#[test]
fn page_slices_and_clamps() {
    let items: Vec<u32> = (0..10).collect();
    assert_eq!(Page::new(2, 3).slice(&items), vec![2, 3, 4]);
    assert_eq!(Page::new(8, 5).slice(&items), vec![8, 9]);
    assert!(Page::new(20, 5).slice(&items).is_empty());
    assert_eq!(Page::new(0, 0).limit, 1);
    assert_eq!(Page::new(0, 10_000).limit, MAX_PAGE_LIMIT);
    assert_eq!(Page::default().limit, DEFAULT_PAGE_LIMIT);
}

#[test]
fn search_reports_total_beyond_page() {
    let records = seeded(120);
    let results = search(&records, &Filters::default(), Page::new(100, 50));
    assert_eq!(results.total, 120);
    assert_eq!(results.items.len(), 20);
}

#[test]
fn parse_comma_separated_facets() {
    let (filters, page) = query(&[
        ("q", "strike"),
        ("severity", "critical, High"),
        ("status", "active"),
        ("region", "asia-pacific,Europe"),
        ("type", "Weather,Labor Strike"),
        ("start", "2026-05-01"),
    ])
    .parse()
    .unwrap();

    assert_eq!(filters.search, "strike");
    assert_eq!(filters.severity, vec![Severity::Critical, Severity::High]);
    assert_eq!(filters.status, vec![DisruptionStatus::Active]);
    assert_eq!(filters.region, vec![Region::AsiaPacific, Region::Europe]);
    assert_eq!(filters.types, vec!["Weather", "Labor Strike"]);
    assert_eq!(filters.date_start, NaiveDate::from_ymd_opt(2026, 5, 1));
    assert_eq!(filters.date_end, None);
    assert_eq!(page, Page::default());
}

#[test]
fn parse_dedupes_repeated_values() {
    let (filters, _) = query(&[("severity", "low,LOW,low")]).parse().unwrap();
    assert_eq!(filters.severity, vec![Severity::Low]);
}

#[test]
fn parse_rejects_unknown_facet_values() {
    let err = query(&[("severity", "catastrophic")]).parse().unwrap_err();
    assert!(matches!(err, SearchError::UnknownFacetValue { facet: "severity", .. }));
    assert_eq!(crate::frame::ErrorCode::error_code(&err), "E_UNKNOWN_FACET");

    let err = query(&[("region", "Atlantis")]).parse().unwrap_err();
    assert!(matches!(err, SearchError::UnknownFacetValue { facet: "region", .. }));
}

#[test]
fn parse_rejects_bad_dates() {
    let err = query(&[("end", "05/12/2026")]).parse().unwrap_err();
    assert!(matches!(err, SearchError::InvalidDate { key: "end", .. }));
}

#[test]
fn from_data_accepts_arrays_and_strings() {
    let mut data = Data::new();
    data.insert("search".into(), serde_json::json!("fog"));
    data.insert("severity".into(), serde_json::json!(["critical", "high"]));
    data.insert("limit".into(), serde_json::json!(10));
    data.insert("offset".into(), serde_json::json!("5"));

    let q = SearchQuery::from_data(&data).unwrap();
    assert_eq!(q.q.as_deref(), Some("fog"));
    assert_eq!(q.severity.as_deref(), Some("critical,high"));
    let (filters, page) = q.parse().unwrap();
    assert_eq!(filters.severity.len(), 2);
    assert_eq!(page, Page::new(5, 10));
}

#[test]
fn from_data_rejects_negative_limit() {
    let mut data = Data::new();
    data.insert("limit".into(), serde_json::json!(-1));
    assert!(matches!(SearchQuery::from_data(&data), Err(SearchError::InvalidNumber { key: "limit", .. })));
}
