//!
//! Contains the Result and Error types for novac-doas operations.
//!

use thiserror::Error as ThisError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(ThisError, Debug)]
pub enum Error {
    #[error("fit window expects spectra of length {expected} but got {actual}")]
    WindowMismatch { expected: usize, actual: usize },

    #[error("fit interval [{low}, {high}) falls outside the spectrum of length {length}")]
    FitIntervalOutsideSpectrum { low: usize, high: usize, length: usize },

    #[error("fit window has no references configured")]
    ReferencesNotInitialized,

    #[error("linear algebra solve failed: normal equations are singular")]
    LinearAlgebraFailure,

    #[error("fit did not converge after {steps} steps (chi-square {chi_square:.6})")]
    NonConvergence { steps: u32, chi_square: f64 },

    #[error("solar-shift fit requires a designated Fraunhofer reference")]
    MissingFraunhoferReference,
}
