//! Reads and writes the wind-database XML format of §6: a root `<Wind volcano="...">`
//! element containing one or more `<windfield>` blocks, each carrying a `<source>`, an
//! `<altitude>`, a `<valid_from>`/`<valid_to>` pair, and one or more `<item ws= wse= wd=
//! wde= lat= lon= alt=>` records. Each `<item>` becomes one [`WindField`] sharing its
//! enclosing windfield's source and validity interval.

use std::io::Write;

use chrono::{DateTime, NaiveDateTime, Utc};
use xml::reader::XmlEvent as ReadEvent;
use xml::writer::XmlEvent as WriteEvent;
use xml::{EmitterConfig, EventReader};

use novac_model::meta::{normalize_latitude, normalize_longitude, WindDataBase, WindField, WindSource};

use crate::result::{Error, Result};

fn source_from_str(value: &str) -> WindSource {
    match value {
        "user" => WindSource::User,
        "ecmwf_forecast" => WindSource::EcmwfForecast,
        "ecmwf_analysis" => WindSource::EcmwfAnalysis,
        "dual_beam" => WindSource::DualBeam,
        "wrf" => WindSource::Wrf,
        "noaa_gdas" => WindSource::NoaaGdas,
        "noaa_fnl" => WindSource::NoaaFnl,
        "geometry_calc" => WindSource::GeometryCalculation,
        "geometry_calc_single_instr" => WindSource::GeometryCalculationSingleInstrument,
        _ => WindSource::Default,
    }
}

fn parse_time(value: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
        .map(|naive| naive.and_utc())
        .map_err(|e| Error::WindXmlParse(format!("invalid timestamp {value:?}: {e}")))
}

struct WindfieldBuilder {
    source: WindSource,
    valid_from: Option<DateTime<Utc>>,
    valid_to: Option<DateTime<Utc>>,
}

impl Default for WindfieldBuilder {
    fn default() -> Self {
        Self { source: WindSource::Default, valid_from: None, valid_to: None }
    }
}

/// Parse a wind-database XML document, returning the volcano it was scoped to and the
/// database of wind fields it contained.
pub fn parse_wind_xml(contents: &str) -> Result<(String, WindDataBase)> {
    let parser = EventReader::new(contents.as_bytes());
    let mut db = WindDataBase::new();
    let mut volcano = String::new();

    let mut in_windfield = false;
    let mut builder = WindfieldBuilder::default();
    let mut text_field: Option<&'static str> = None;
    let mut buffer = String::new();

    for event in parser {
        let event = event.map_err(|e| Error::WindXmlParse(e.to_string()))?;
        match event {
            ReadEvent::StartElement { name, attributes, .. } => match name.local_name.as_str() {
                "Wind" => {
                    volcano = attributes
                        .iter()
                        .find(|a| a.name.local_name == "volcano")
                        .map(|a| a.value.clone())
                        .unwrap_or_default();
                }
                "windfield" => {
                    in_windfield = true;
                    builder = WindfieldBuilder::default();
                }
                "source" | "altitude" | "valid_from" | "valid_to" if in_windfield => {
                    text_field = Some(match name.local_name.as_str() {
                        "source" => "source",
                        "altitude" => "altitude",
                        "valid_from" => "valid_from",
                        "valid_to" => "valid_to",
                        _ => unreachable!(),
                    });
                    buffer.clear();
                }
                "item" if in_windfield => {
                    let attr = |key: &str| attributes.iter().find(|a| a.name.local_name == key).map(|a| a.value.as_str());
                    let parse = |key: &str| -> Result<f64> {
                        attr(key)
                            .ok_or_else(|| Error::WindXmlParse(format!("<item> missing attribute {key}")))?
                            .parse::<f64>()
                            .map_err(|e| Error::WindXmlParse(format!("invalid {key}: {e}")))
                    };

                    let speed = parse("ws")?;
                    let speed_error = parse("wse")?;
                    let direction = parse("wd")?;
                    let direction_error = parse("wde")?;

                    let valid_from = builder.valid_from.ok_or_else(|| Error::WindXmlParse("<item> outside valid_from".into()))?;
                    let valid_to = builder.valid_to.ok_or_else(|| Error::WindXmlParse("<item> outside valid_to".into()))?;

                    let mut field = WindField::new(speed, speed_error, direction, direction_error, builder.source, valid_from, valid_to);

                    if let (Some(lat), Some(lon)) = (attr("lat"), attr("lon")) {
                        let lat: f64 = lat.parse().map_err(|e| Error::WindXmlParse(format!("invalid lat: {e}")))?;
                        let lon: f64 = lon.parse().map_err(|e| Error::WindXmlParse(format!("invalid lon: {e}")))?;
                        let alt: f64 = attr("alt").and_then(|v| v.parse().ok()).unwrap_or(0.0);
                        field = field.with_point(normalize_latitude(lat), normalize_longitude(lon), alt);
                    }

                    db.insert(field);
                }
                _ => {}
            },
            ReadEvent::Characters(chars) => {
                if text_field.is_some() {
                    buffer.push_str(&chars);
                }
            }
            ReadEvent::EndElement { name } => match name.local_name.as_str() {
                "windfield" => in_windfield = false,
                "source" | "altitude" | "valid_from" | "valid_to" => {
                    if let Some(field) = text_field.take() {
                        match field {
                            "source" => builder.source = source_from_str(buffer.trim()),
                            "valid_from" => builder.valid_from = Some(parse_time(buffer.trim())?),
                            "valid_to" => builder.valid_to = Some(parse_time(buffer.trim())?),
                            "altitude" => {}
                            _ => unreachable!(),
                        }
                    }
                }
                _ => {}
            },
            _ => {}
        }
    }

    Ok((volcano, db))
}

/// Serialize a wind database back to the XML format, one `<windfield>` per record
/// (the inverse granularity of the parser, which is simpler to keep correct than
/// trying to regroup records that share a source/validity interval).
pub fn write_wind_xml<W: Write>(writer: W, volcano: &str, db: &WindDataBase) -> Result<()> {
    let mut emitter = EmitterConfig::new().perform_indent(true).create_writer(writer);

    emitter.write(WriteEvent::start_element("Wind").attr("volcano", volcano)).map_err(|e| Error::WindXmlParse(e.to_string()))?;

    for field in db.iter() {
        emitter.write(WriteEvent::start_element("windfield")).map_err(|e| Error::WindXmlParse(e.to_string()))?;

        write_text_element(&mut emitter, "source", field.source().as_str())?;
        let altitude_text = field.point().map(|(_, _, alt)| alt).unwrap_or(0.0).to_string();
        write_text_element(&mut emitter, "altitude", &altitude_text)?;
        write_text_element(&mut emitter, "valid_from", &field.valid_from().to_rfc3339())?;
        write_text_element(&mut emitter, "valid_to", &field.valid_to().to_rfc3339())?;

        let mut item = WriteEvent::start_element("item")
            .attr("ws", &field.speed_ms().to_string())
            .attr("wse", &field.speed_error().to_string())
            .attr("wd", &field.direction_deg().to_string())
            .attr("wde", &field.direction_error().to_string());

        let lat_s;
        let lon_s;
        let alt_s;
        if let Some((lat, lon, alt)) = field.point() {
            lat_s = lat.to_string();
            lon_s = lon.to_string();
            alt_s = alt.to_string();
            item = item.attr("lat", &lat_s).attr("lon", &lon_s).attr("alt", &alt_s);
        }

        emitter.write(item).map_err(|e| Error::WindXmlParse(e.to_string()))?;
        emitter.write(WriteEvent::end_element()).map_err(|e| Error::WindXmlParse(e.to_string()))?;

        emitter.write(WriteEvent::end_element()).map_err(|e| Error::WindXmlParse(e.to_string()))?;
    }

    emitter.write(WriteEvent::end_element()).map_err(|e| Error::WindXmlParse(e.to_string()))?;
    Ok(())
}

fn write_text_element<W: Write>(emitter: &mut xml::EventWriter<W>, name: &str, text: &str) -> Result<()> {
    emitter.write(WriteEvent::start_element(name)).map_err(|e| Error::WindXmlParse(e.to_string()))?;
    emitter.write(WriteEvent::characters(text)).map_err(|e| Error::WindXmlParse(e.to_string()))?;
    emitter.write(WriteEvent::end_element()).map_err(|e| Error::WindXmlParse(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn round_trips_a_single_windfield() {
        let mut db = WindDataBase::new();
        db.insert(
            WindField::new(
                5.2,
                0.4,
                183.0,
                6.0,
                WindSource::EcmwfForecast,
                Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
            )
            .with_point(19.4, -155.3, 1200.0),
        );

        let mut buf = Vec::new();
        write_wind_xml(&mut buf, "Kilauea", &db).unwrap();
        let xml = String::from_utf8(buf).unwrap();

        let (volcano, parsed) = parse_wind_xml(&xml).unwrap();
        assert_eq!(volcano, "Kilauea");
        assert_eq!(parsed.len(), 1);

        let field = parsed.iter().next().unwrap();
        assert!((field.speed_ms() - 5.2).abs() < 1e-9);
        assert_eq!(field.source(), WindSource::EcmwfForecast);
        assert_eq!(field.point().unwrap().2, 1200.0);
    }

    #[test]
    fn latitude_out_of_range_is_normalized_on_parse() {
        let xml = r#"<Wind volcano="Kilauea">
            <windfield>
                <source>default</source>
                <altitude>1200</altitude>
                <valid_from>2024-06-01T00:00:00Z</valid_from>
                <valid_to>2024-06-01T12:00:00Z</valid_to>
                <item ws="3.0" wse="1.0" wd="90" wde="10" lat="95" lon="-155.3" alt="1200"/>
            </windfield>
        </Wind>"#;

        let (_, db) = parse_wind_xml(xml).unwrap();
        let field = db.iter().next().unwrap();
        assert!((field.point().unwrap().0 - 5.0).abs() < 1e-9);
    }
}
