//! Photometric models: flux conversions, survey noise, asinh magnitudes,
//! and color indices.

pub mod color;
pub mod flux;
pub mod luptitude;
pub mod noise;

pub use color::{ColorLabel, ColorSet};
pub use flux::{flux_to_mag, mag_to_flux, AB_ZERO_POINT};
pub use luptitude::luptitude;
pub use noise::{flux_uncertainty, inject_noise, NoiseModel, NoiseParameters};
