//! Degraded-survey simulation of color-selected dropout samples.
//!
//! This crate takes a deep reference photometric catalog and simulates how
//! it would appear to a shallower survey: per-band flux noise drawn from a
//! parametric signal-to-noise law, asinh (luptitude) magnitudes that stay
//! finite at low or negative signal-to-noise, a detection gate against the
//! survey depth, and a color-color dropout classification. The recovered
//! redshift distribution (dN/dz) of the selected sample and the detection
//! statistics are the outputs.

pub mod bands;
pub mod catalog;
pub mod depths;
pub mod error;
pub mod histogram;
pub mod photometry;
pub mod selection;
pub mod sims;

// Re-exports for easier access
pub use bands::{Band, MagnitudeSet};
pub use catalog::{load_catalog, read_catalog, CatalogRow};
pub use depths::DepthProfile;
pub use error::ConfigError;
pub use histogram::{HistogramSpec, RedshiftHistogram};
pub use photometry::{luptitude, ColorLabel, ColorSet, NoiseModel, NoiseParameters};
pub use selection::{DropoutType, PredicateSet, SelectionRule};
pub use sims::{
    run_simulation, run_simulation_parallel, DegradationMode, DiagnosticPoint, RunConfig,
    RunOutcome, RunStatistics,
};
