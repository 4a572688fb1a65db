//! Unit tests for novac-model types.

use chrono::{TimeZone, Utc};
use novac_model::data::{
    EvaluationResult, FitInterval, FitMode, FitWindow, InstrumentType, ParameterPolicy,
    PlumeInScanProperty, Reference, ReferenceResult, ScanMode, ScanPoint, ScanResult,
};
use novac_model::meta::{InstrumentLocation, Volcano, VolcanoCatalog};

fn test_window() -> FitWindow {
    FitWindow::new(
        "main",
        vec![Reference::new(
            "SO2",
            vec![0.0; 2048],
            ParameterPolicy::Free,
            ParameterPolicy::Limited { low: -1.0, high: 1.0 },
            ParameterPolicy::Fixed(1.0),
        )],
        3,
        FitInterval::new(320, 460),
        2048,
        FitMode::HpSub,
        None,
        true,
    )
}

#[test]
fn fit_window_offset_band_uses_uv_side() {
    let window = test_window();
    let band = window.offset_band();
    assert_eq!(band, FitInterval::new(40, 80));
}

#[test]
fn plume_property_none_has_no_plume() {
    let property = PlumeInScanProperty::none();
    assert!(!property.is_plume_found());
    assert_eq!(property.completeness(), 0.0);
    assert_eq!(property.offset(), 0.0);
}

#[test]
fn scan_result_good_point_count_excludes_bad_points() {
    let time = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let good = ScanPoint::new(
        10.0,
        None,
        time,
        time,
        EvaluationResult::new(vec![ReferenceResult::default()], vec![], 0.01, 0.01, 5, true),
        true,
    );
    let bad = ScanPoint::new(
        20.0,
        None,
        time,
        time,
        EvaluationResult::new(vec![ReferenceResult::default()], vec![], 10.0, 10.0, 1000, false),
        false,
    );
    let result = ScanResult::new(
        "I2J1234",
        InstrumentType::Gothenburg,
        ScanMode::Flux,
        vec![good, bad],
        PlumeInScanProperty::none(),
        time,
    );

    assert_eq!(result.good_point_count(), 1);
    assert_eq!(result.points().len(), 2);
}

#[test]
fn instrument_locations_detect_overlap() {
    let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let t1 = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
    let t2 = Utc.with_ymd_and_hms(2024, 12, 1, 0, 0, 0).unwrap();

    let a = InstrumentLocation::new(
        "I2J1234", t0, t1, 0.0, 0.0, 1000.0, 0.0, 90.0, 0.0, InstrumentType::Gothenburg, "Etna",
    );
    let b = InstrumentLocation::new(
        "I2J1234", t1, t2, 0.0, 0.0, 1000.0, 0.0, 90.0, 0.0, InstrumentType::Gothenburg, "Etna",
    );
    assert!(!a.overlaps(&b));

    let c = InstrumentLocation::new(
        "I2J1234",
        t0 + chrono::Duration::days(1),
        t2,
        0.0,
        0.0,
        1000.0,
        0.0,
        90.0,
        0.0,
        InstrumentType::Gothenburg,
        "Etna",
    );
    assert!(a.overlaps(&c));
    assert!(a.is_flat_scanner());
}

#[test]
fn volcano_catalog_resolves_by_name_or_code() {
    let catalog = VolcanoCatalog::new(vec![Volcano::new(
        342060, "Etna", "etna", "Italy", 37.751, 14.993, 3350.0, 1, "INGV",
    )]);

    assert!(catalog.find("Etna").is_some());
    assert!(catalog.find("342060").is_some());
    assert!(catalog.find("Fuji").is_none());
}
