//!
//! Contains the Result and Error types for novac-geometry operations.
//!

use thiserror::Error as ThisError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(ThisError, Debug)]
pub enum Error {
    #[error("the two scanners' lines of sight are parallel and do not intersect")]
    ParallelLinesOfSight,

    #[error("two-scan altitude fixes disagree by {difference_m:.1}m, more than the 40m acceptance threshold")]
    AltitudeFixesDisagree { difference_m: f64 },

    #[error("fuzzy solver failed to converge after {steps} steps (residual {residual_deg:.3} degrees)")]
    NonConvergence { steps: u32, residual_deg: f64 },

    #[error("the instrument's line of sight is near-parallel to the wind direction line")]
    DegenerateSightLine,

    #[error("computed plume altitude is at or below the instrument's own altitude")]
    NonPositiveRelativeAltitude,

    #[error("no plume centre is available for this scan")]
    NoPlumeCentre,
}
