//! Pair selection for the geometry engine (§4.6): given scan results sorted by sky
//! start time, sweep a bounded time window around each scan looking for a partner
//! that is a flux-mode measurement from a different, co-volcano instrument within the
//! configured distance band and start-time tolerance. The sweep is O(n·k), where k is
//! the number of candidates within the time window, since candidates outside the
//! window can never match regardless of how many scans remain.

use chrono::{DateTime, Utc};

use novac_data::LocationCatalog;
use novac_geometry::gps::distance_m;
use novac_model::data::ScanMode;

use crate::config::Config;

/// The subset of a scan result's fields the pairing sweep needs, independent of the
/// evaluation payload itself.
#[derive(Debug, Clone, Copy)]
pub struct PairCandidate<'a> {
    pub index: usize,
    pub serial: &'a str,
    pub mode: ScanMode,
    pub start_time: DateTime<Utc>,
    pub completeness: f64,
}

/// For each scan, the index of the best partner found (if any), paired by mutual
/// agreement: `i` is paired with `j` only if `j` is also `i`'s nearest-in-time
/// eligible candidate from `i`'s perspective. Each scan appears in at most one pair.
pub fn find_pairs(candidates: &[PairCandidate], locations: &LocationCatalog, volcano_of: impl Fn(&str) -> Option<String>, config: &Config) -> Vec<(usize, usize)> {
    let mut paired = vec![false; candidates.len()];
    let mut pairs = Vec::new();

    for i in 0..candidates.len() {
        if paired[i] {
            continue;
        }
        let Some(j) = best_partner(candidates, i, locations, &volcano_of, config) else { continue };
        if paired[j] {
            continue;
        }
        paired[i] = true;
        paired[j] = true;
        pairs.push((i, j));
    }

    pairs
}

fn best_partner(candidates: &[PairCandidate], i: usize, locations: &LocationCatalog, volcano_of: &impl Fn(&str) -> Option<String>, config: &Config) -> Option<usize> {
    let a = &candidates[i];
    if a.mode != ScanMode::Flux || a.completeness < config.geometry_completeness_limit {
        return None;
    }
    let loc_a = locations.find(a.serial, a.start_time)?;
    let volcano_a = volcano_of(a.serial)?;

    let window = chrono::Duration::seconds(config.max_start_time_diff_s);
    let lo = a.start_time - window;
    let hi = a.start_time + window;

    // Candidates are sorted by start_time; restrict the sweep to the window on
    // either side of `i` rather than scanning the whole slice.
    let mut best: Option<(usize, i64)> = None;

    let mut k = i;
    while k > 0 && candidates[k - 1].start_time >= lo {
        k -= 1;
    }
    while k < candidates.len() && candidates[k].start_time <= hi {
        if k != i {
            let b = &candidates[k];
            if eligible(a, b, loc_a, locations, &volcano_a, volcano_of, config) {
                let dt = (b.start_time - a.start_time).num_seconds().abs();
                if best.map(|(_, best_dt)| dt < best_dt).unwrap_or(true) {
                    best = Some((k, dt));
                }
            }
        }
        k += 1;
    }

    best.map(|(idx, _)| idx)
}

fn eligible(
    a: &PairCandidate,
    b: &PairCandidate,
    loc_a: &novac_model::meta::InstrumentLocation,
    locations: &LocationCatalog,
    volcano_a: &str,
    volcano_of: &impl Fn(&str) -> Option<String>,
    config: &Config,
) -> bool {
    if b.mode != ScanMode::Flux || b.completeness < config.geometry_completeness_limit {
        return false;
    }
    if a.serial == b.serial {
        return false;
    }
    if (b.start_time - a.start_time).num_seconds().abs() > config.max_start_time_diff_s {
        return false;
    }
    let Some(volcano_b) = volcano_of(b.serial) else { return false };
    if volcano_b != volcano_a {
        return false;
    }
    let Some(loc_b) = locations.find(b.serial, b.start_time) else { return false };

    let distance = distance_m(loc_a.latitude(), loc_a.longitude(), loc_b.latitude(), loc_b.longitude());
    distance >= config.min_instrument_distance_m && distance <= config.max_instrument_distance_m
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::TimeZone;
    use novac_model::data::InstrumentType;

    fn location(serial: &str, lat: f64, lon: f64) -> novac_model::meta::InstrumentLocation {
        novac_model::meta::InstrumentLocation::new(
            serial,
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            lat,
            lon,
            1200.0,
            0.0,
            90.0,
            0.0,
            InstrumentType::Gothenburg,
            "Kilauea",
        )
    }

    fn at(min: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap() + chrono::Duration::minutes(min)
    }

    #[test]
    fn pairs_two_eligible_scans_within_window() {
        let mut locations = LocationCatalog::new();
        locations.insert(location("A", 19.40, -155.30)).unwrap();
        locations.insert(location("B", 19.40, -155.28)).unwrap();

        let candidates = vec![
            PairCandidate { index: 0, serial: "A", mode: ScanMode::Flux, start_time: at(0), completeness: 0.95 },
            PairCandidate { index: 1, serial: "B", mode: ScanMode::Flux, start_time: at(2), completeness: 0.9 },
        ];

        let config = Config::defaults(
            chrono::NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            chrono::NaiveDate::from_ymd_opt(2024, 6, 2).unwrap(),
            "Kilauea",
            std::path::PathBuf::from("/tmp/out"),
        );

        let pairs = find_pairs(&candidates, &locations, |_| Some("Kilauea".to_string()), &config);
        assert_eq!(pairs, vec![(0, 1)]);
    }

    #[test]
    fn rejects_pair_with_same_serial() {
        let mut locations = LocationCatalog::new();
        locations.insert(location("A", 19.40, -155.30)).unwrap();

        let candidates = vec![
            PairCandidate { index: 0, serial: "A", mode: ScanMode::Flux, start_time: at(0), completeness: 0.95 },
            PairCandidate { index: 1, serial: "A", mode: ScanMode::Flux, start_time: at(2), completeness: 0.9 },
        ];

        let config = Config::defaults(
            chrono::NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            chrono::NaiveDate::from_ymd_opt(2024, 6, 2).unwrap(),
            "Kilauea",
            std::path::PathBuf::from("/tmp/out"),
        );

        let pairs = find_pairs(&candidates, &locations, |_| Some("Kilauea".to_string()), &config);
        assert!(pairs.is_empty());
    }

    #[test]
    fn rejects_pair_outside_distance_band() {
        let mut locations = LocationCatalog::new();
        locations.insert(location("A", 19.40, -155.30)).unwrap();
        locations.insert(location("B", 19.40, -155.3001)).unwrap();

        let candidates = vec![
            PairCandidate { index: 0, serial: "A", mode: ScanMode::Flux, start_time: at(0), completeness: 0.95 },
            PairCandidate { index: 1, serial: "B", mode: ScanMode::Flux, start_time: at(1), completeness: 0.9 },
        ];

        let config = Config::defaults(
            chrono::NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            chrono::NaiveDate::from_ymd_opt(2024, 6, 2).unwrap(),
            "Kilauea",
            std::path::PathBuf::from("/tmp/out"),
        );

        let pairs = find_pairs(&candidates, &locations, |_| Some("Kilauea".to_string()), &config);
        assert!(pairs.is_empty());
    }
}
