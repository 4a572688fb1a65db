//! Reads and writes the canonical evaluation-log text format: a `<scaninformation>` key/value
//! block, a `<fluxinfo>` block, a tab-delimited header row, and a `<spectraldata>` block of
//! tab-delimited per-point rows. This is the durable, human-readable record of one scan's
//! evaluation that downstream geometry and flux stages, and any external reviewer, read back.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use chrono::{DateTime, NaiveTime, Utc};

use novac_model::data::{FitWindow, ScanResult};

use crate::result::{Error, Result};

/// Scan-wide metadata carried in the `<scaninformation>` block. Mirrors the instrument and
/// site identity a reader needs to interpret the columns below without consulting any other
/// file.
#[derive(Debug, Clone)]
pub struct ScanInformation {
    pub date: String,
    pub compass: f64,
    pub tilt: f64,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
    pub volcano: String,
    pub site: String,
    pub observatory: String,
    pub spectrometer: String,
    pub spectrometer_max_intensity: f64,
    pub channel: u32,
    pub cone_angle: f64,
    pub interlace_steps: u32,
    pub start_channel: u32,
    pub software_version: String,
    pub compile_date: String,
}

/// Flux and wind provenance carried in the `<fluxinfo>` block.
#[derive(Debug, Clone, Default)]
pub struct FluxInfo {
    pub flux: Option<f64>,
    pub wind_speed: Option<f64>,
    pub wind_direction: Option<f64>,
    pub wind_speed_source: Option<String>,
    pub wind_direction_source: Option<String>,
    pub plume_height_source: Option<String>,
}

/// Write a complete evaluation log for `scan`, fit against `window`, to `path`.
pub fn write_evaluation_log(path: &Path, info: &ScanInformation, flux: &FluxInfo, window: &FitWindow, scan: &ScanResult) -> Result<()> {
    let mut out = String::new();

    writeln!(out, "<scaninformation>").ok();
    writeln!(out, "date={}", info.date).ok();
    writeln!(out, "starttime={}", format_time(scan.points().first().map(|p| p.start_time()).unwrap_or(scan.sky_start_time()))).ok();
    writeln!(out, "compass={:.2}", info.compass).ok();
    writeln!(out, "tilt={:.2}", info.tilt).ok();
    writeln!(out, "lat={:.6}", info.latitude).ok();
    writeln!(out, "long={:.6}", info.longitude).ok();
    writeln!(out, "alt={:.1}", info.altitude).ok();
    writeln!(out, "volcano={}", info.volcano).ok();
    writeln!(out, "site={}", info.site).ok();
    writeln!(out, "observatory={}", info.observatory).ok();
    writeln!(out, "serial={}", scan.serial()).ok();
    writeln!(out, "spectrometer={}", info.spectrometer).ok();
    writeln!(out, "spectrometer_maxIntensity={:.1}", info.spectrometer_max_intensity).ok();
    writeln!(out, "spectrometer_numPixels={}", window.spectrum_length()).ok();
    writeln!(out, "channel={}", info.channel).ok();
    writeln!(out, "coneangle={:.1}", info.cone_angle).ok();
    writeln!(out, "interlacesteps={}", info.interlace_steps).ok();
    writeln!(out, "startchannel={}", info.start_channel).ok();
    writeln!(out, "spectrumlength={}", window.spectrum_length()).ok();
    writeln!(out, "battery={:.2}", scan.battery().unwrap_or(0.0)).ok();
    writeln!(out, "temperature={:.2}", scan.temperature().unwrap_or(0.0)).ok();
    writeln!(out, "mode={}", mode_name(scan.mode())).ok();
    writeln!(out, "instrumenttype={}", instrument_type_name(scan.instrument_type())).ok();
    writeln!(out, "version=2.0").ok();
    writeln!(out, "softwareversion={}", info.software_version).ok();
    writeln!(out, "compiledate={}", info.compile_date).ok();
    writeln!(out, "</scaninformation>").ok();

    writeln!(out, "<fluxinfo>").ok();
    writeln!(out, "flux={}", flux.flux.map(|v| format!("{v:.3}")).unwrap_or_default()).ok();
    writeln!(out, "windspeed={}", flux.wind_speed.map(|v| format!("{v:.2}")).unwrap_or_default()).ok();
    writeln!(out, "winddirection={}", flux.wind_direction.map(|v| format!("{v:.2}")).unwrap_or_default()).ok();
    writeln!(out, "windspeedsource={}", flux.wind_speed_source.clone().unwrap_or_default()).ok();
    writeln!(out, "winddirectionsource={}", flux.wind_direction_source.clone().unwrap_or_default()).ok();
    writeln!(out, "plumeheightsource={}", flux.plume_height_source.clone().unwrap_or_default()).ok();
    writeln!(out, "</fluxinfo>").ok();

    let names: Vec<&str> = window.references().iter().map(|r| r.name()).collect();
    let mut header = String::from("#scanangle\tstarttime\tstoptime\tname\tspecsaturation\tfitsaturation\tdelta\tchisquare\texposuretime\tnumspec");
    for name in &names {
        write!(header, "\tcolumn({name})\tcolumnerror({name})\tshift({name})\tshifterror({name})\tsqueeze({name})\tsqueezeerror({name})").ok();
    }
    header.push_str("\tisgoodpoint\toffset\tflag");
    writeln!(out, "{header}").ok();

    writeln!(out, "<spectraldata>").ok();
    let offset = scan.plume().offset();
    for point in scan.points() {
        let eval = point.evaluation();
        let mut row = format!(
            "{:.3}\t{}\t{}\t{}\t0.000\t0.000\t{:.6}\t{:.6}\t0\t1",
            point.scan_angle(),
            format_time(point.start_time()),
            format_time(point.stop_time()),
            point.scan_angle(),
            eval.delta(),
            eval.chi_square(),
        );
        for reference in eval.reference_results() {
            write!(
                row,
                "\t{:.6}\t{:.6}\t{:.6}\t{:.6}\t{:.6}\t{:.6}",
                reference.column, reference.column_error, reference.shift, reference.shift_error, reference.squeeze, reference.squeeze_error
            )
            .ok();
        }
        write!(row, "\t{}\t{:.6}\t{}", if point.is_good() { 1 } else { 0 }, offset, if point.is_good() { 0 } else { 1 }).ok();
        writeln!(out, "{row}").ok();
    }
    writeln!(out, "</spectraldata>").ok();

    fs::write(path, out)?;
    Ok(())
}

fn format_time(time: DateTime<Utc>) -> String {
    time.format("%H:%M:%S").to_string()
}

fn mode_name(mode: novac_model::data::ScanMode) -> &'static str {
    use novac_model::data::ScanMode;
    match mode {
        ScanMode::Flux => "flux",
        ScanMode::WindSpeed => "windspeed",
        ScanMode::Composition => "composition",
        ScanMode::Stratospheric => "stratospheric",
    }
}

fn instrument_type_name(instrument_type: novac_model::data::InstrumentType) -> &'static str {
    use novac_model::data::InstrumentType;
    match instrument_type {
        InstrumentType::Gothenburg => "gothenburg",
        InstrumentType::Heidelberg => "heidelberg",
    }
}

/// One parsed spectral-data row, carrying everything [`write_evaluation_log`] emits for
/// one point: the viewing angle(s), start/stop time, fit-quality scalars, every
/// reference's full result, whether the point was marked good, and the per-scan offset
/// that was subtracted. This is the full row needed to satisfy the evaluation log's
/// round-trip invariant (write then parse yields an equal result, within tolerance).
#[derive(Debug, Clone)]
pub struct ParsedRow {
    pub scan_angle: f64,
    pub azimuth: Option<f64>,
    pub start_time: DateTime<Utc>,
    pub stop_time: DateTime<Utc>,
    pub delta: f64,
    pub chi_square: f64,
    pub reference_results: Vec<novac_model::data::ReferenceResult>,
    pub is_good: bool,
    pub offset: f64,
}

impl ParsedRow {
    /// The main (first-listed) reference's column, the field most callers that only
    /// need a column-vs-angle series care about.
    pub fn column(&self) -> f64 {
        self.reference_results.first().map(|r| r.column).unwrap_or(0.0)
    }

    /// The main reference's column error.
    pub fn column_error(&self) -> f64 {
        self.reference_results.first().map(|r| r.column_error).unwrap_or(f64::INFINITY)
    }
}

/// A parsed evaluation log: the scan's serial and its full spectral rows.
#[derive(Debug, Clone)]
pub struct ParsedEvaluationLog {
    pub serial: String,
    pub date: String,
    pub rows: Vec<ParsedRow>,
}

/// Parse an evaluation log previously written by [`write_evaluation_log`], recovering
/// every reference's full result per row (not just the main one) so the log round-trips
/// faithfully.
pub fn parse_evaluation_log(text: &str) -> Result<ParsedEvaluationLog> {
    let mut serial = String::new();
    let mut date = String::new();
    let mut rows = Vec::new();
    let mut in_spectral_data = false;
    let mut reference_count = 0usize;

    for line in text.lines() {
        let line = line.trim_end();
        if let Some(value) = line.strip_prefix("serial=") {
            serial = value.to_string();
            continue;
        }
        if let Some(value) = line.strip_prefix("date=") {
            date = value.to_string();
            continue;
        }
        if line == "<spectraldata>" {
            in_spectral_data = true;
            continue;
        }
        if line == "</spectraldata>" {
            in_spectral_data = false;
            continue;
        }
        if let Some(rest) = line.strip_prefix('#') {
            let header_field_count = rest.split('\t').count();
            // 10 fixed leading fields, 6 fields per reference, 3 fixed trailing fields.
            reference_count = header_field_count.saturating_sub(13) / 6;
            continue;
        }
        if !in_spectral_data || line.is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split('\t').collect();
        let expected = 10 + 6 * reference_count + 3;
        if fields.len() < expected {
            return Err(Error::LogParse(format!("spectral row has {} fields, expected {expected}", fields.len())));
        }

        let scan_angle: f64 = fields[0].parse().map_err(|_| Error::LogParse("bad scanangle".into()))?;
        let start_time = combine_date_time(&date, fields[1])?;
        let stop_time = combine_date_time(&date, fields[2])?;
        let delta: f64 = fields[6].parse().map_err(|_| Error::LogParse("bad delta".into()))?;
        let chi_square: f64 = fields[7].parse().map_err(|_| Error::LogParse("bad chisquare".into()))?;

        let mut reference_results = Vec::with_capacity(reference_count);
        for r in 0..reference_count {
            let base = 10 + r * 6;
            reference_results.push(novac_model::data::ReferenceResult {
                column: fields[base].parse().map_err(|_| Error::LogParse("bad column".into()))?,
                column_error: fields[base + 1].parse().map_err(|_| Error::LogParse("bad columnerror".into()))?,
                shift: fields[base + 2].parse().map_err(|_| Error::LogParse("bad shift".into()))?,
                shift_error: fields[base + 3].parse().map_err(|_| Error::LogParse("bad shifterror".into()))?,
                squeeze: fields[base + 4].parse().map_err(|_| Error::LogParse("bad squeeze".into()))?,
                squeeze_error: fields[base + 5].parse().map_err(|_| Error::LogParse("bad squeezeerror".into()))?,
            });
        }

        let is_good: bool = fields[fields.len() - 3].trim() == "1";
        let offset: f64 = fields[fields.len() - 2].parse().unwrap_or(0.0);

        rows.push(ParsedRow { scan_angle, azimuth: None, start_time, stop_time, delta, chi_square, reference_results, is_good, offset });
    }

    if rows.is_empty() {
        return Err(Error::LogParse("no spectral data rows found".into()));
    }

    Ok(ParsedEvaluationLog { serial, date, rows })
}

/// Parse a time-of-day field accepting both `HH:MM:SS` and `HH.MM.SS` (§6), and
/// combine it with `date` (`YYYY.MM.DD` or `YYYY-MM-DD`) to recover the full instant.
fn combine_date_time(date: &str, time: &str) -> std::result::Result<DateTime<Utc>, Error> {
    let naive_date = chrono::NaiveDate::parse_from_str(date, "%Y.%m.%d")
        .or_else(|_| chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d"))
        .map_err(|e| Error::LogParse(format!("bad date {date}: {e}")))?;
    let naive_time = parse_time_of_day(time)?;
    Ok(DateTime::<Utc>::from_naive_utc_and_offset(naive_date.and_time(naive_time), Utc))
}

fn parse_time_of_day(value: &str) -> std::result::Result<NaiveTime, Error> {
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H.%M.%S"))
        .map_err(|e| Error::LogParse(format!("bad time {value}: {e}")))
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::TimeZone;
    use novac_model::data::{
        EvaluationResult, FitInterval, FitMode, InstrumentType, ParameterPolicy, PlumeInScanProperty, Reference, ScanMode, ScanPoint,
    };

    fn at(sec: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + sec, 0).unwrap()
    }

    fn sample_scan() -> (FitWindow, ScanResult) {
        let window = FitWindow::new(
            "main",
            vec![Reference::new("SO2", vec![0.0; 512], ParameterPolicy::Free, ParameterPolicy::Fixed(0.0), ParameterPolicy::Fixed(1.0))],
            2,
            FitInterval::new(50, 450),
            512,
            FitMode::HpDiv,
            None,
            true,
        );

        let points: Vec<ScanPoint> = (0..52)
            .map(|i| {
                let evaluation = EvaluationResult::new(
                    vec![novac_model::data::ReferenceResult {
                        column: 100.0 + i as f64,
                        column_error: 5.0,
                        shift: 0.0,
                        shift_error: 0.1,
                        squeeze: 1.0,
                        squeeze_error: 0.01,
                    }],
                    vec![0.0; 3],
                    1.2,
                    0.5,
                    4,
                    true,
                );
                ScanPoint::new(-60.0 + i as f64 * 2.0, None, at(i), at(i + 1), evaluation, true)
            })
            .collect();

        let scan = ScanResult::new("D2J123", InstrumentType::Gothenburg, ScanMode::Flux, points, PlumeInScanProperty::none(), at(0));
        (window, scan)
    }

    #[test]
    fn round_trips_fifty_two_rows() {
        let (window, scan) = sample_scan();
        let info = ScanInformation {
            date: "2020.06.15".into(),
            compass: 125.3,
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
        let flux = FluxInfo::default();

        let dir = std::env::temp_dir().join(format!("novac-scan-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("round_trip.txt");

        write_evaluation_log(&path, &info, &flux, &window, &scan).expect("write should succeed");
        let text = std::fs::read_to_string(&path).unwrap();
        let parsed = parse_evaluation_log(&text).expect("parse should succeed");

        assert_eq!(parsed.serial, "D2J123");
        assert_eq!(parsed.rows.len(), 52);
        for (i, (point, row)) in scan.points().iter().zip(parsed.rows.iter()).enumerate() {
            assert!((row.scan_angle - point.scan_angle()).abs() < 1e-6);
            assert!((row.start_time - point.start_time()).num_seconds().abs() <= 1);
            assert!((row.stop_time - point.stop_time()).num_seconds().abs() <= 1);
            assert_eq!(row.is_good, point.is_good());

            let expected = point.evaluation();
            assert!((row.delta - expected.delta()).abs() < 1e-6);
            assert!((row.chi_square - expected.chi_square()).abs() < 1e-6);
            assert_eq!(row.reference_results.len(), expected.reference_results().len());
            for (parsed_ref, expected_ref) in row.reference_results.iter().zip(expected.reference_results()) {
                assert!((parsed_ref.column - expected_ref.column).abs() < 1e-6);
                assert!((parsed_ref.column_error - expected_ref.column_error).abs() < 1e-6);
                assert!((parsed_ref.shift - expected_ref.shift).abs() < 1e-6);
                assert!((parsed_ref.shift_error - expected_ref.shift_error).abs() < 1e-6);
                assert!((parsed_ref.squeeze - expected_ref.squeeze).abs() < 1e-6);
                assert!((parsed_ref.squeeze_error - expected_ref.squeeze_error).abs() < 1e-6);
            }
            assert!((row.column() - (100.0 + i as f64)).abs() < 1e-6);
        }

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn rejects_log_with_no_spectral_rows() {
        let text = "<scaninformation>\nserial=X\ndate=2020.01.01\n</scaninformation>\n<fluxinfo>\n</fluxinfo>\n#scanangle\n<spectraldata>\n</spectraldata>\n";
        assert!(matches!(parse_evaluation_log(text), Err(Error::LogParse(_))));
    }

    #[test]
    fn parses_dot_delimited_time_of_day() {
        assert_eq!(parse_time_of_day("14.05.09").unwrap(), parse_time_of_day("14:05:09").unwrap());
    }
}
