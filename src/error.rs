//! Configuration-time error taxonomy.
//!
//! Everything here is fatal and raised before any per-object processing
//! begins. Per-object anomalies (undefined depth, non-finite flux
//! uncertainty, non-finite reference redshift) are never errors: they are
//! modeled as `Option<f64>` absences that propagate through the pipeline
//! and show up only in counts and omissions.

use thiserror::Error;

use crate::bands::Band;

/// Fatal setup errors. A run that returns one of these has processed
/// zero catalog objects.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Requested dropout type is not in the configured set.
    #[error("unknown dropout type '{0}' (expected 'u' or 'g')")]
    UnknownDropoutType(String),

    /// Band name not recognized.
    #[error("unknown band '{0}' (expected one of u, g, r, i, z)")]
    UnknownBand(String),

    /// A band consumed by the noise model has no depth entry.
    #[error("depth profile has no entry for band '{0}'")]
    MissingDepth(Band),

    /// Histogram range does not describe at least one bin.
    #[error("invalid histogram range start={start} stop={stop} width={width}")]
    InvalidHistogramRange {
        /// Lower edge of the first bin.
        start: f64,
        /// Upper limit of the binned range.
        stop: f64,
        /// Bin width.
        width: f64,
    },

    /// Non-dropout diagnostic sampling probability outside [0, 1].
    #[error("non-dropout sample rate {0} is outside [0, 1]")]
    InvalidSampleRate(f64),

    /// Malformed color label, expected "b1-b2".
    #[error("invalid color label '{0}' (expected e.g. 'g-r')")]
    InvalidColorLabel(String),
}
