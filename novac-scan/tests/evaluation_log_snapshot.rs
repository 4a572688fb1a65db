//! Snapshots the rendered evaluation-log text for a small synthetic scan, so a change to
//! the on-disk format (field order, column formatting, header layout) shows up as a diff
//! against a committed reference instead of only being caught by the round-trip test.

use chrono::{TimeZone, Utc};

use novac_model::data::{
    EvaluationResult, FitInterval, FitMode, FitWindow, InstrumentType, ParameterPolicy, PlumeInScanProperty, Reference, ReferenceResult,
    ScanMode, ScanPoint, ScanResult,
};
use novac_scan::evaluation_log::{write_evaluation_log, FluxInfo, ScanInformation};

fn at(sec: i64) -> chrono::DateTime<Utc> {
    Utc.timestamp_opt(1_600_000_000 + sec, 0).unwrap()
}

#[test]
fn renders_evaluation_log_for_a_three_point_scan() {
    let window = FitWindow::new(
        "main",
        vec![Reference::new("SO2", vec![0.0; 64], ParameterPolicy::Free, ParameterPolicy::Fixed(0.0), ParameterPolicy::Fixed(1.0))],
        2,
        FitInterval::new(4, 60),
        64,
        FitMode::HpSub,
        None,
        true,
    );

    let points: Vec<ScanPoint> = (0..3)
        .map(|i| {
            let evaluation = EvaluationResult::new(
                vec![ReferenceResult {
                    column: 250.0 + i as f64 * 10.0,
                    column_error: 8.0,
                    shift: 0.1,
                    shift_error: 0.05,
                    squeeze: 1.0,
                    squeeze_error: 0.01,
                }],
                vec![0.0; 3],
                1.1,
                0.4,
                3,
                true,
            );
            ScanPoint::new(-30.0 + i as f64 * 30.0, None, at(i), at(i + 1), evaluation, true)
        })
        .collect();

    let scan = ScanResult::new("I2J456", InstrumentType::Gothenburg, ScanMode::Flux, points, PlumeInScanProperty::none(), at(0));

    let info = ScanInformation {
        date: "2020.09.01".into(),
        compass: 90.0,
        tilt: 0.0,
        latitude: 19.4,
        longitude: -155.3,
        altitude: 1200.0,
        volcano: "Kilauea".into(),
        site: "SiteA".into(),
        observatory: "HVO".into(),
        spectrometer: "SPEC001".into(),
        spectrometer_max_intensity: 4095.0,
        channel: 0,
        cone_angle: 90.0,
        interlace_steps: 1,
        start_channel: 0,
        software_version: "1.0".into(),
        compile_date: "2020-01-01".into(),
    };
    let flux = FluxInfo { flux: Some(12.5), wind_speed: Some(4.0), wind_direction: Some(270.0), ..Default::default() };

    let dir = std::env::temp_dir().join(format!("novac-scan-snapshot-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("snapshot.txt");

    write_evaluation_log(&path, &info, &flux, &window, &scan).expect("write should succeed");
    let text = std::fs::read_to_string(&path).unwrap();
    std::fs::remove_file(&path).ok();

    insta::assert_snapshot!(text);
}
