//! Run-output writers (§6, §7): `FluxLog.txt`/`FluxLog.xml`, `GeometryLog.csv`,
//! `ProcessingStatistics.txt`, and `StatusLog.txt`, plus the archive-on-exists pattern
//! shared by all of them: a file about to be overwritten is first renamed to
//! `<name>_YYYYMMDD_HHMM<ext>`.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use novac_model::data::{FluxQuality, FluxResult, GeometryResult};

use crate::result::{Error, Result};

fn io(path: &Path, source: std::io::Error) -> Error {
    Error::OutputDirectoryUnwritable { path: path.display().to_string(), source }
}

/// If `path` already exists, rename it to `<stem>_YYYYMMDD_HHMM.<ext>` using `stamp`
/// as the archival time, freeing `path` for the new copy.
pub fn archive_if_exists(path: &Path, stamp: DateTime<Utc>) -> Result<()> {
    if !path.is_file() {
        return Ok(());
    }
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("file");
    let ext = path.extension().and_then(|s| s.to_str());
    let suffix = stamp.format("%Y%m%d_%H%M");
    let archived_name = match ext {
        Some(ext) => format!("{stem}_{suffix}.{ext}"),
        None => format!("{stem}_{suffix}"),
    };
    let archived_path = path.with_file_name(archived_name);
    fs::rename(path, &archived_path).map_err(|source| io(path, source))
}

fn quality_letter(quality: FluxQuality) -> char {
    match quality {
        FluxQuality::Green => 'g',
        FluxQuality::Yellow => 'y',
        FluxQuality::Red => 'r',
    }
}

/// One row of flux-log input: the computed result plus the scan's serial and
/// instrument type, which `FluxResult` itself does not carry.
pub struct FluxLogRow<'a> {
    pub start_time: DateTime<Utc>,
    pub stop_time: DateTime<Utc>,
    pub serial: &'a str,
    pub instrument_type: &'a str,
    pub result: &'a FluxResult,
}

const FLUX_LOG_HEADER: &str = "starttime\tstoptime\tserial\tinstrumenttype\tflux\tquality\twindErrorComponent\tplumeHeightErrorComponent\twindSpeed\twindSpeedError\twindSpeedSource\twindDirection\twindDirectionError\twindDirectionSource\tplumeHeight\tplumeHeightError\tplumeHeightSource\tcompass\tconeAngle\ttilt\tnumGoodSpectra\tplumeCentre1\tplumeCentre2\tcompleteness\toffset";

/// Writes the tab-delimited `FluxLog.txt`. Archives any existing copy first.
pub fn write_flux_log_txt(path: &Path, rows: &[FluxLogRow], now: DateTime<Utc>) -> Result<()> {
    archive_if_exists(path, now)?;

    let mut text = String::new();
    writeln!(text, "{FLUX_LOG_HEADER}").unwrap();
    for row in rows {
        let r = row.result;
        writeln!(
            text,
            "{}\t{}\t{}\t{}\t{:.6}\t{}\t{:.6}\t{:.6}\t{:.3}\t{:.3}\t{}\t{:.2}\t{:.2}\t{}\t{:.1}\t{:.1}\t{}\t{:.1}\t{:.1}\t{:.1}\t{}\t{:.3}\t{:.3}\t{:.4}\t{:.6}",
            row.start_time.format("%Y.%m.%d %H:%M:%S"),
            row.stop_time.format("%Y.%m.%d %H:%M:%S"),
            row.serial,
            row.instrument_type,
            r.flux_kg_s(),
            quality_letter(r.quality()),
            r.wind_error_component(),
            r.plume_height_error_component(),
            r.wind_speed(),
            r.wind_speed_error(),
            r.wind_source(),
            r.wind_direction(),
            r.wind_direction_error(),
            r.plume_height_source(),
            r.plume_altitude_masl(),
            r.plume_altitude_error(),
            r.plume_height_source(),
            r.compass(),
            r.cone_angle(),
            r.tilt(),
            r.good_spectrum_count(),
            r.plume_centre()[0],
            r.plume_centre()[1],
            r.completeness(),
            r.offset(),
        )
        .unwrap();
    }

    fs::write(path, text).map_err(|source| io(path, source))
}

/// Writes `FluxLog.xml`, an XSLT-styled sibling of `FluxLog.txt` referencing
/// `fluxresult.xsl` for browser rendering. Archives any existing copy first.
pub fn write_flux_log_xml(path: &Path, rows: &[FluxLogRow], now: DateTime<Utc>) -> Result<()> {
    archive_if_exists(path, now)?;

    let mut xml = String::new();
    writeln!(xml, "<?xml version=\"1.0\" encoding=\"UTF-8\"?>").unwrap();
    writeln!(xml, "<?xml-stylesheet type=\"text/xsl\" href=\"fluxresult.xsl\"?>").unwrap();
    writeln!(xml, "<FluxLog>").unwrap();
    for row in rows {
        let r = row.result;
        writeln!(xml, "  <Flux>").unwrap();
        writeln!(xml, "    <starttime>{}</starttime>", row.start_time.to_rfc3339()).unwrap();
        writeln!(xml, "    <stoptime>{}</stoptime>", row.stop_time.to_rfc3339()).unwrap();
        writeln!(xml, "    <serial>{}</serial>", row.serial).unwrap();
        writeln!(xml, "    <instrumenttype>{}</instrumenttype>", row.instrument_type).unwrap();
        writeln!(xml, "    <flux>{:.6}</flux>", r.flux_kg_s()).unwrap();
        writeln!(xml, "    <quality>{}</quality>", quality_letter(r.quality())).unwrap();
        writeln!(xml, "    <completeness>{:.4}</completeness>", r.completeness()).unwrap();
        writeln!(xml, "  </Flux>").unwrap();
    }
    writeln!(xml, "</FluxLog>").unwrap();

    fs::write(path, xml).map_err(|source| io(path, source))
}

/// A minimal identity-transform XSLT stylesheet good enough for a browser to render
/// `FluxLog.xml` as a table; written once per run alongside the XML log.
pub fn write_flux_result_xsl(path: &Path) -> Result<()> {
    let xsl = r#"<?xml version="1.0" encoding="UTF-8"?>
<xsl:stylesheet version="1.0" xmlns:xsl="http://www.w3.org/1999/XSL/Transform">
  <xsl:template match="/FluxLog">
    <html>
      <body>
        <table border="1">
          <tr><th>start</th><th>stop</th><th>serial</th><th>flux</th><th>quality</th></tr>
          <xsl:for-each select="Flux">
            <tr>
              <td><xsl:value-of select="starttime"/></td>
              <td><xsl:value-of select="stoptime"/></td>
              <td><xsl:value-of select="serial"/></td>
              <td><xsl:value-of select="flux"/></td>
              <td><xsl:value-of select="quality"/></td>
            </tr>
          </xsl:for-each>
        </table>
      </body>
    </html>
  </xsl:template>
</xsl:stylesheet>
"#;
    fs::write(path, xsl).map_err(|source| io(path, source))
}

/// Writes `GeometryLog.csv`: one row per successfully-paired geometry fix.
pub fn write_geometry_log(path: &Path, results: &[GeometryResult], now: DateTime<Utc>) -> Result<()> {
    archive_if_exists(path, now)?;

    let mut text = String::new();
    writeln!(text, "time,serial1,serial2,altitude,altitudeError,windDirection,windDirectionError").unwrap();
    for r in results {
        let (serial1, serial2) = r.serials();
        writeln!(
            text,
            "{},{},{},{},{},{},{}",
            r.time().to_rfc3339(),
            serial1,
            serial2.as_deref().unwrap_or(""),
            r.altitude_masl().map(|v| format!("{v:.1}")).unwrap_or_default(),
            r.altitude_error().map(|v| format!("{v:.1}")).unwrap_or_default(),
            r.wind_direction().map(|v| format!("{v:.2}")).unwrap_or_default(),
            r.wind_direction_error().map(|v| format!("{v:.2}")).unwrap_or_default(),
        )
        .unwrap();
    }

    fs::write(path, text).map_err(|source| io(path, source))
}

/// Writes `ProcessingStatistics.txt`.
pub fn write_statistics(path: &Path, rendered: &str, now: DateTime<Utc>) -> Result<()> {
    archive_if_exists(path, now)?;
    fs::write(path, rendered).map_err(|source| io(path, source))
}

/// Appends one line to `StatusLog.txt`, matching §7's {information, error, fatal}
/// severity tags. The status log is append-only across a run and is archived (not
/// appended to) only when a fresh run starts.
pub fn append_status(path: &Path, severity: &str, message: &str, now: DateTime<Utc>) -> Result<()> {
    use std::io::Write as _;
    let mut file = fs::OpenOptions::new().create(true).append(true).open(path).map_err(|source| io(path, source))?;
    writeln!(file, "{} [{severity}] {message}", now.to_rfc3339()).map_err(|source| io(path, source))
}

pub fn status_log_path(output_directory: &Path) -> PathBuf {
    output_directory.join("StatusLog.txt")
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn archive_renames_existing_file() {
        let dir = std::env::temp_dir().join(format!("novac-flux-log-test-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("FluxLog.txt");
        fs::write(&path, "old").unwrap();

        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 30, 0).unwrap();
        archive_if_exists(&path, now).unwrap();

        assert!(!path.exists());
        assert!(dir.join("FluxLog_20240601_1230.txt").exists());

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn flux_log_header_has_expected_columns() {
        assert!(FLUX_LOG_HEADER.starts_with("starttime\tstoptime\tserial"));
    }
}
