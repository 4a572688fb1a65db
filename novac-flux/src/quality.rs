//! Quality grading: each of three sub-grades (wind source, plume-height source,
//! completeness) is graded green/yellow/red independently, and the worst of the three
//! is the overall grade.

use novac_model::data::FluxQuality;
use novac_model::meta::{PlumeHeightSource, WindSource};

fn wind_source_quality(source: WindSource) -> FluxQuality {
    match source {
        WindSource::Default | WindSource::User => FluxQuality::Red,
        WindSource::EcmwfForecast | WindSource::EcmwfAnalysis | WindSource::DualBeam | WindSource::Wrf | WindSource::NoaaGdas | WindSource::NoaaFnl => FluxQuality::Green,
        WindSource::GeometryCalculation | WindSource::GeometryCalculationSingleInstrument => FluxQuality::Yellow,
    }
}

fn plume_height_source_quality(source: PlumeHeightSource) -> FluxQuality {
    match source {
        PlumeHeightSource::Default | PlumeHeightSource::User => FluxQuality::Red,
        PlumeHeightSource::GeometryCalculation => FluxQuality::Green,
    }
}

fn completeness_quality(completeness: f64) -> FluxQuality {
    if completeness >= 0.9 {
        FluxQuality::Green
    } else if completeness >= 0.7 {
        FluxQuality::Yellow
    } else {
        FluxQuality::Red
    }
}

/// The overall quality grade for a flux result: the worst of the wind-source,
/// plume-height-source, and completeness sub-grades.
pub fn grade(wind_source: WindSource, plume_height_source: PlumeHeightSource, completeness: f64) -> FluxQuality {
    wind_source_quality(wind_source).max(plume_height_source_quality(plume_height_source)).max(completeness_quality(completeness))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn worst_sub_grade_wins() {
        let quality = grade(WindSource::EcmwfForecast, PlumeHeightSource::User, 0.95);
        assert_eq!(quality, FluxQuality::Red);
    }

    #[test]
    fn all_green_inputs_yield_green() {
        let quality = grade(WindSource::EcmwfForecast, PlumeHeightSource::GeometryCalculation, 0.95);
        assert_eq!(quality, FluxQuality::Green);
    }

    #[test]
    fn geometry_calculation_wind_source_is_yellow_not_green() {
        let quality = grade(WindSource::GeometryCalculation, PlumeHeightSource::GeometryCalculation, 0.95);
        assert_eq!(quality, FluxQuality::Yellow);
    }

    #[test]
    fn low_completeness_is_red_regardless_of_sources() {
        let quality = grade(WindSource::EcmwfForecast, PlumeHeightSource::GeometryCalculation, 0.5);
        assert_eq!(quality, FluxQuality::Red);
    }
}
