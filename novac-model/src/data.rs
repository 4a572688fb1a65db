//!
//! This module contains models representing the spectra, reference cross sections, and
//! evaluation results produced while processing one NOVAC scan. These models are ergonomic
//! and do not exactly mirror the instrument's raw on-disk spectrum format, which is treated
//! as an external collaborator.
//!

mod spectrum;
pub use spectrum::*;

mod reference;
pub use reference::*;

mod fit_window;
pub use fit_window::*;

mod evaluation_result;
pub use evaluation_result::*;

mod plume_property;
pub use plume_property::*;

mod scan_result;
pub use scan_result::*;

mod geometry_result;
pub use geometry_result::*;

mod flux_result;
pub use flux_result::*;
