//! The pipeline entry point (§4.6, §5): discovers scan files, evaluates them across a
//! bounded worker pool, sweeps pairs for geometry, integrates flux, and persists every
//! run output under the configured output directory.

use std::path::Path;

use chrono::{DateTime, Utc};
use rayon::prelude::*;

use novac_data::{LocationCatalog, RawScanReader};
use novac_geometry::error_model::{exact_fix_altitude_error, fuzzy_fix_errors, scale_altitude_error_for_time_gap};
use novac_geometry::two_scan::{two_scan_exact, two_scan_fuzzy, ScanFix};
use novac_model::data::{FitWindow, InstrumentType, ScanMode, ScanResult};
use novac_model::meta::{PlumeDataBase, PlumeHeight, PlumeHeightSource, VolcanoCatalog, WindDataBase, WindField, WindSource};
use novac_scan::evaluation_log::{write_evaluation_log, FluxInfo, ScanInformation};
use novac_scan::evaluator::{evaluate_scan, MeasurementSpectrum};

use crate::config::Config;
use crate::continuation::{self, ContinuationState};
use crate::flux_log::{self, FluxLogRow};
use crate::pairing::{find_pairs, PairCandidate};
use crate::result::{Error, Result};
use crate::statistics::{ProcessingStatistics, RejectionReason};

/// A spectrometer's full-scale digitizer count, used to judge per-spectrum
/// saturation. The raw-file reader knows the true value per instrument model; this is
/// the fallback used when none is supplied.
const DEFAULT_FULL_SCALE_INTENSITY: f64 = 65_535.0;

/// One scan carried forward from evaluation into the pairing and flux stages.
struct EvaluatedScan {
    serial: String,
    scan_result: ScanResult,
}

/// Ties the pipeline's inputs together for one run.
pub struct Orchestrator<'a> {
    pub config: &'a Config,
    pub volcanoes: &'a VolcanoCatalog,
    pub locations: &'a LocationCatalog,
    pub fit_windows: &'a [FitWindow],
    pub reader: &'a dyn RawScanReader,
}

impl<'a> Orchestrator<'a> {
    pub fn new(config: &'a Config, volcanoes: &'a VolcanoCatalog, locations: &'a LocationCatalog, fit_windows: &'a [FitWindow], reader: &'a dyn RawScanReader) -> Self {
        Self { config, volcanoes, locations, fit_windows, reader }
    }

    pub fn run(&self, now: DateTime<Utc>) -> Result<ProcessingStatistics> {
        let volcano = self.volcanoes.find(&self.config.volcano).ok_or_else(|| Error::UnknownVolcano { query: self.config.volcano.clone() })?;
        if self.locations.is_empty() {
            return Err(Error::NoInstrumentLocations);
        }

        std::fs::create_dir_all(&self.config.output_directory).map_err(|source| Error::OutputDirectoryUnwritable { path: self.config.output_directory.display().to_string(), source })?;
        let status_path = flux_log::status_log_path(&self.config.output_directory);
        flux_log::append_status(&status_path, "information", "run started", now)?;

        let statistics = ProcessingStatistics::new();

        let mut wind_db = self.load_wind_database()?;
        let mut plume_db = PlumeDataBase::new();
        // Half the gap between the volcano's peak and its highest instrument, matching
        // the original `PreparePlumeHeights`; falls back to half the peak altitude when
        // no instrument is registered for this volcano.
        let default_plume_altitude_error = match self.locations.highest(volcano.name()) {
            Some(highest) => (volcano.peak_altitude_masl() - highest.altitude_masl()).abs() / 2.0,
            None => volcano.peak_altitude_masl() / 2.0,
        };
        plume_db.insert(PlumeHeight::new(
            volcano.peak_altitude_masl(),
            default_plume_altitude_error,
            PlumeHeightSource::Default,
            DateTime::<Utc>::MIN_UTC,
            DateTime::<Utc>::MAX_UTC,
        ));
        if wind_db.is_empty() {
            wind_db.insert(WindField::new(0.0, 0.0, 0.0, 180.0, WindSource::Default, DateTime::<Utc>::MIN_UTC, DateTime::<Utc>::MAX_UTC));
        }

        // `setup.xml`/`processing.xml` are external, foreign-parsed formats this
        // pipeline never generates; a formatted snapshot of the merged configuration
        // and instrument catalog stands in for their byte content for continuation
        // purposes, changing whenever either would.
        let setup_snapshot = format!("{:#?}", self.locations).into_bytes();
        let processing_snapshot = format!("{:#?}", self.config).into_bytes();

        let continuation = continuation::detect(&self.config.output_directory, &setup_snapshot, &processing_snapshot)?;

        let files = match &self.config.local_directory {
            Some(dir) => novac_data::discovery::discover_local_files(dir, self.config.include_subdirs_local)?,
            None => Vec::new(),
        };
        for _ in &files {
            statistics.record_discovered();
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.clamped_thread_num())
            .build()
            .map_err(|err| Error::Configuration(err.to_string()))?;

        let evaluated: Vec<EvaluatedScan> = pool.install(|| {
            files
                .par_iter()
                .filter_map(|path| self.evaluate_one(path, continuation, &statistics, now).ok().flatten())
                .collect()
        });

        let mut evaluated = evaluated;
        evaluated.sort_by_key(|e| e.scan_result.sky_start_time());

        let candidates: Vec<PairCandidate> = evaluated
            .iter()
            .enumerate()
            .map(|(index, e)| PairCandidate {
                index,
                serial: &e.serial,
                mode: e.scan_result.mode(),
                start_time: e.scan_result.sky_start_time(),
                completeness: e.scan_result.plume().completeness(),
            })
            .collect();

        let volcano_of = |serial: &str| -> Option<String> {
            evaluated.iter().find(|e| e.serial == serial).and_then(|e| self.locations.find(&e.serial, e.scan_result.sky_start_time())).map(|l| l.volcano().to_string())
        };

        let pairs = find_pairs(&candidates, self.locations, volcano_of, self.config);
        let mut geometry_results = Vec::with_capacity(pairs.len());

        for (i, j) in &pairs {
            statistics.record_geometry_attempt();
            let scan_a = &evaluated[*i];
            let scan_b = &evaluated[*j];
            let Some(loc_a) = self.locations.find(&scan_a.serial, scan_a.scan_result.sky_start_time()) else {
                statistics.record_rejection(RejectionReason::UnknownInstrumentLocation);
                continue;
            };
            let Some(loc_b) = self.locations.find(&scan_b.serial, scan_b.scan_result.sky_start_time()) else {
                statistics.record_rejection(RejectionReason::UnknownInstrumentLocation);
                continue;
            };

            let fix_a = ScanFix {
                location: loc_a,
                centre_angle_deg: scan_a.scan_result.plume().centre()[0],
                centre_error_deg: scan_a.scan_result.plume().centre_error()[0],
                start_time: scan_a.scan_result.sky_start_time(),
            };
            let fix_b = ScanFix {
                location: loc_b,
                centre_angle_deg: scan_b.scan_result.plume().centre()[0],
                centre_error_deg: scan_b.scan_result.plume().centre_error()[0],
                start_time: scan_b.scan_result.sky_start_time(),
            };

            let fuzzy = two_scan_fuzzy(&fix_a, &fix_b, volcano.peak_latitude(), volcano.peak_longitude(), volcano.peak_altitude_masl());
            let exact = two_scan_exact(&fix_a, &fix_b);

            let geometry = match (fuzzy, exact) {
                (Ok(fix), _) => {
                    let (altitude_error, wind_direction_error) = fuzzy_fix_errors(
                        &fix_a,
                        &fix_b,
                        volcano.peak_latitude(),
                        volcano.peak_longitude(),
                        volcano.peak_altitude_masl(),
                        fix.altitude_masl().unwrap_or(0.0),
                        fix.wind_direction().unwrap_or(0.0),
                    );
                    fix.with_errors(altitude_error, wind_direction_error)
                }
                (Err(_), Ok(fix)) => {
                    let altitude_error = exact_fix_altitude_error(&fix_a, &fix_b, fix.altitude_masl().unwrap_or(0.0));
                    fix.with_errors(altitude_error, None)
                }
                (Err(err), Err(_)) => {
                    log::info!("geometry pair {}/{} did not converge: {err}", scan_a.serial, scan_b.serial);
                    statistics.record_rejection(RejectionReason::GeometryNonConvergence);
                    continue;
                }
            };

            statistics.record_geometry_success();

            if let Some(altitude) = geometry.altitude_masl() {
                let time_gap_scaled_error = geometry.altitude_error().unwrap_or(self.config.max_plume_altitude_error_m);
                let error = scale_altitude_error_for_time_gap(time_gap_scaled_error, fix_a.start_time, fix_b.start_time);
                plume_db.insert(PlumeHeight::new(altitude, error, PlumeHeightSource::GeometryCalculation, geometry.time(), geometry.time() + chrono::Duration::hours(24)));
            }
            if let Some(direction) = geometry.wind_direction() {
                let error = geometry.wind_direction_error().unwrap_or(self.config.max_wind_direction_error_deg);
                wind_db.insert(WindField::new(wind_db.query(geometry.time()).map(|w| w.speed_ms()).unwrap_or(0.0), 0.0, direction, error, WindSource::GeometryCalculation, geometry.time(), geometry.time() + chrono::Duration::hours(24)));
            }

            geometry_results.push(geometry);
        }

        let paired_indices: std::collections::HashSet<usize> = pairs.iter().flat_map(|&(i, j)| [i, j]).collect();
        for (index, scan) in evaluated.iter().enumerate() {
            if paired_indices.contains(&index) {
                continue;
            }
            if scan.scan_result.mode() != ScanMode::Flux || scan.scan_result.plume().completeness() < self.config.geometry_completeness_limit {
                continue;
            }
            let Some(location) = self.locations.find(&scan.serial, scan.scan_result.sky_start_time()) else {
                continue;
            };
            let Some(plume_height) = plume_db.query(scan.scan_result.sky_start_time()) else {
                continue;
            };

            let centre_angle = scan.scan_result.plume().centre()[0];
            let centre_error = scan.scan_result.plume().centre_error()[0];
            if let Ok(direction) = novac_geometry::single_instrument::wind_direction_from_known_altitude(
                location,
                centre_angle,
                volcano.peak_latitude(),
                volcano.peak_longitude(),
                plume_height.altitude_masl(),
            ) {
                let error = novac_geometry::single_instrument::wind_direction_error_from_known_altitude(
                    location,
                    centre_angle,
                    centre_error,
                    volcano.peak_latitude(),
                    volcano.peak_longitude(),
                    plume_height.altitude_masl(),
                )
                .unwrap_or(self.config.max_wind_direction_error_deg);
                let time = scan.scan_result.sky_start_time();
                wind_db.insert(WindField::new(
                    wind_db.query(time).map(|w| w.speed_ms()).unwrap_or(0.0),
                    0.0,
                    direction,
                    error,
                    WindSource::GeometryCalculationSingleInstrument,
                    time,
                    time + chrono::Duration::hours(24),
                ));
            }
        }

        let mut flux_rows_owned: Vec<(DateTime<Utc>, DateTime<Utc>, String, String, novac_model::data::FluxResult)> = Vec::new();

        if matches!(self.config.mode, crate::config::ProcessingMode::Flux) {
            for scan in &evaluated {
                if scan.scan_result.mode() != ScanMode::Flux {
                    continue;
                }
                let Some(location) = self.locations.find(&scan.serial, scan.scan_result.sky_start_time()) else {
                    statistics.record_rejection(RejectionReason::UnknownInstrumentLocation);
                    continue;
                };
                let Some(wind) = wind_db.query(scan.scan_result.sky_start_time()) else {
                    statistics.record_rejection(RejectionReason::NoWindRecord);
                    continue;
                };
                let Some(plume_height) = plume_db.query(scan.scan_result.sky_start_time()) else {
                    statistics.record_rejection(RejectionReason::NoPlumeHeightRecord);
                    continue;
                };

                match novac_flux::compute_flux(&scan.scan_result, self.config.main_reference_index, location, wind, plume_height, self.config.completeness_limit) {
                    Ok(flux) => {
                        statistics.record_flux_computed();
                        let stop_time = scan.scan_result.points().last().map(|p| p.stop_time()).unwrap_or(scan.scan_result.sky_start_time());
                        let instrument_type = match location.instrument_type() {
                            InstrumentType::Gothenburg => "gothenburg",
                            InstrumentType::Heidelberg => "heidelberg",
                        };
                        flux_rows_owned.push((scan.scan_result.sky_start_time(), stop_time, scan.serial.clone(), instrument_type.to_string(), flux));
                    }
                    Err(_) => {
                        statistics.record_flux_rejected();
                        statistics.record_rejection(RejectionReason::NoPlumeDetected);
                    }
                }
            }
        }

        let flux_rows: Vec<FluxLogRow> = flux_rows_owned
            .iter()
            .map(|(start, stop, serial, instrument_type, result)| FluxLogRow { start_time: *start, stop_time: *stop, serial, instrument_type, result })
            .collect();

        flux_log::write_flux_log_txt(&self.config.output_directory.join("FluxLog.txt"), &flux_rows, now)?;
        flux_log::write_flux_log_xml(&self.config.output_directory.join("FluxLog.xml"), &flux_rows, now)?;
        flux_log::write_flux_result_xsl(&self.config.output_directory.join("fluxresult.xsl"))?;
        flux_log::write_geometry_log(&self.config.output_directory.join("GeometryLog.csv"), &geometry_results, now)?;
        flux_log::write_statistics(&self.config.output_directory.join("ProcessingStatistics.txt"), &statistics.render(), now)?;
        self.persist_wind_database(&wind_db, now)?;
        continuation::persist(&self.config.output_directory, &setup_snapshot, &processing_snapshot)?;

        flux_log::append_status(&status_path, "information", "run finished", now)?;

        Ok(statistics)
    }

    fn evaluate_one(&self, path: &Path, continuation: ContinuationState, statistics: &ProcessingStatistics, now: DateTime<Utc>) -> Result<Option<EvaluatedScan>> {
        let raw = match self.reader.read_scan(path) {
            Ok(raw) => raw,
            Err(err) => {
                log::warn!("unreadable raw scan {}: {err}", path.display());
                statistics.record_rejection(RejectionReason::UnreadableFile);
                return Ok(None);
            }
        };

        let Some(location) = self.locations.find(&raw.serial, raw.sky.start_time()) else {
            statistics.record_rejection(RejectionReason::UnknownInstrumentLocation);
            return Ok(None);
        };

        let log_path = continuation::evaluation_log_path(&self.config.output_directory, &raw.serial, &raw.sky.start_time().format("%Y.%m.%d").to_string());
        if continuation::has_existing_log(continuation, &log_path) {
            if let Ok(text) = std::fs::read_to_string(&log_path) {
                if let Ok(parsed) = novac_scan::evaluation_log::parse_evaluation_log(&text) {
                    statistics.record_evaluated_ok();
                    let scan_result = scan_from_parsed_log(&parsed, &raw);
                    return Ok(Some(EvaluatedScan { serial: raw.serial, scan_result }));
                }
            }
        }

        let measurements: Vec<MeasurementSpectrum> = raw
            .measurements
            .iter()
            .map(|s| MeasurementSpectrum {
                scan_angle: s.scan_angle(),
                azimuth: s.azimuth(),
                start_time: s.start_time(),
                stop_time: s.stop_time(),
                intensities: s.intensities().to_vec(),
                saturation_ratio: s.saturation_ratio(DEFAULT_FULL_SCALE_INTENSITY),
            })
            .collect();

        let extended = match evaluate_scan(
            &raw.serial,
            raw.instrument_type,
            raw.mode,
            raw.sky.intensities(),
            raw.sky.start_time(),
            &measurements,
            self.fit_windows,
            self.config.main_window_index,
            self.config.main_reference_index,
        ) {
            Ok(extended) => extended,
            Err(err) => {
                log::info!("evaluation failed for {}: {err}", path.display());
                statistics.record_rejection(RejectionReason::EvaluationFailed);
                return Ok(None);
            }
        };

        statistics.record_evaluated_ok();

        if let Some(window) = self.fit_windows.get(self.config.main_window_index) {
            let info = ScanInformation {
                date: raw.sky.start_time().format("%Y.%m.%d").to_string(),
                compass: location.compass(),
                tilt: location.tilt(),
                latitude: location.latitude(),
                longitude: location.longitude(),
                altitude: location.altitude_masl(),
                volcano: location.volcano().to_string(),
                site: location.volcano().to_string(),
                observatory: String::new(),
                spectrometer: raw.serial.clone(),
                spectrometer_max_intensity: DEFAULT_FULL_SCALE_INTENSITY,
                channel: raw.sky.channel() as u32,
                cone_angle: location.cone_angle(),
                interlace_steps: 1,
                start_channel: 0,
                software_version: env!("CARGO_PKG_VERSION").to_string(),
                compile_date: String::new(),
            };
            let flux_info = FluxInfo::default();
            let dir_result = match log_path.parent() {
                Some(parent) => std::fs::create_dir_all(parent).map_err(|source| source.to_string()),
                None => Ok(()),
            };
            let write_result = dir_result
                .and_then(|_| flux_log::archive_if_exists(&log_path, now).map_err(|err| err.to_string()))
                .and_then(|_| write_evaluation_log(&log_path, &info, &flux_info, window, &extended.scan_result).map_err(|err| err.to_string()));
            if let Err(err) = write_result {
                log::warn!("failed to write evaluation log {}: {err}", log_path.display());
                statistics.record_rejection(RejectionReason::EvaluationLogWriteFailed);
            }
        }

        Ok(Some(EvaluatedScan { serial: raw.serial, scan_result: extended.scan_result }))
    }

    fn load_wind_database(&self) -> Result<WindDataBase> {
        match &self.config.wind_field_file {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|source| Error::OutputDirectoryUnwritable { path: path.display().to_string(), source })?;
                let (_, db) = novac_data::wind_xml::parse_wind_xml(&text)?;
                Ok(db)
            }
            None => Ok(WindDataBase::new()),
        }
    }

    fn persist_wind_database(&self, db: &WindDataBase, now: DateTime<Utc>) -> Result<()> {
        let path = self.config.output_directory.join("GeneratedWindField.wxml");
        flux_log::archive_if_exists(&path, now)?;
        let file = std::fs::File::create(&path).map_err(|source| Error::OutputDirectoryUnwritable { path: path.display().to_string(), source })?;
        novac_data::wind_xml::write_wind_xml(file, &self.config.volcano, db)?;
        Ok(())
    }
}

/// Rebuilds a [`ScanResult`] from an already-written evaluation log under
/// continuation, so a scan whose log survives from a previous run skips DOAS fitting
/// entirely. The evaluation log's spectral-data block carries every reference's full
/// result plus each point's own start/stop time, so the reconstruction is exact to the
/// log's round-trip tolerance rather than a lossy stand-in.
fn scan_from_parsed_log(parsed: &novac_scan::evaluation_log::ParsedEvaluationLog, raw: &novac_data::RawScan) -> ScanResult {
    use novac_model::data::EvaluationResult;

    let points: Vec<_> = parsed
        .rows
        .iter()
        .map(|row| {
            let evaluation = EvaluationResult::new(row.reference_results.clone(), Vec::new(), row.chi_square, row.delta, 0, row.is_good);
            novac_model::data::ScanPoint::new(row.scan_angle, row.azimuth, row.start_time, row.stop_time, evaluation, row.is_good)
        })
        .collect();

    let column_points: Vec<novac_scan::plume::ColumnPoint> = points
        .iter()
        .map(|p| novac_scan::plume::ColumnPoint {
            angle: p.scan_angle(),
            azimuth: p.azimuth(),
            column: p.evaluation().reference_result(0).map(|r| r.column).unwrap_or(0.0),
            column_error: p.evaluation().reference_result(0).map(|r| r.column_error).unwrap_or(f64::INFINITY),
            is_good: p.is_good(),
        })
        .collect();
    let plume = novac_scan::plume::detect_plume(&column_points);

    ScanResult::new(&parsed.serial, raw.instrument_type, raw.mode, points, plume, raw.sky.start_time())
}
