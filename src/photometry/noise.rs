//! Parametric photometric noise model and Gaussian noise injection.
//!
//! The flux uncertainty follows a signal-to-noise power law anchored at the
//! survey's limiting magnitude: a source exactly at the depth has
//! fractional error `estar`, and the S/N scales as a power of the flux
//! ratio with a distinct exponent on the bright and faint side of the
//! limit. An optional floor clips the minimum allowed S/N.
//!
//! Every function here is pure except the injection step, which consumes
//! draws from a caller-supplied seeded generator so runs are exactly
//! reproducible.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};

use crate::bands::Band;
use crate::depths::DepthProfile;
use crate::error::ConfigError;
use crate::photometry::flux::mag_to_flux;

/// Per-band parameters of the signal-to-noise law.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseParameters {
    /// Fractional flux error for a source exactly at the limiting depth.
    pub estar: f64,
    /// Power-law exponent for sources brighter than the depth.
    pub alpha_bright: f64,
    /// Power-law exponent for sources fainter than the depth.
    pub alpha_faint: f64,
    /// Optional lower clip on the signal-to-noise ratio.
    pub snr_floor: Option<f64>,
}

impl Default for NoiseParameters {
    /// Defaults matching the reference degradation run
    /// (estar=0.2, alphab=-0.25, alphaf=0.22, no floor).
    fn default() -> Self {
        Self {
            estar: 0.2,
            alpha_bright: -0.25,
            alpha_faint: 0.22,
            snr_floor: None,
        }
    }
}

/// Flux uncertainty for a source of magnitude `mag` observed at limiting
/// depth `limiting_mag`.
///
/// Returns `None` (the band is unmeasurable for this object, not an
/// error) when the depth is undefined or the magnitude is non-finite.
///
/// The law: with `dm = mag - limiting_mag` and `alpha` chosen per side,
/// `snr = (1/estar) * 10^(-0.4 * dm * (1 + alpha))`, clipped from below by
/// `snr_floor` when configured, and `sigma = flux(mag) / snr`.
pub fn flux_uncertainty(
    mag: f64,
    limiting_mag: Option<f64>,
    params: &NoiseParameters,
) -> Option<f64> {
    let depth = limiting_mag?;
    let flux = mag_to_flux(mag)?;

    let dm = mag - depth;
    let alpha = if dm < 0.0 {
        params.alpha_bright
    } else {
        params.alpha_faint
    };

    let mut snr = 10_f64.powf(-0.4 * dm * (1.0 + alpha)) / params.estar;
    if let Some(floor) = params.snr_floor {
        snr = snr.max(floor);
    }

    let sigma = flux / snr;
    sigma.is_finite().then_some(sigma)
}

/// Add one zero-mean Gaussian draw of standard deviation `sigma` to
/// `flux`.
///
/// An undefined `sigma` propagates an undefined noisy flux; it is never
/// silently treated as zero noise. The draw always comes from the supplied
/// generator so the stream position stays deterministic.
pub fn inject_noise(flux: Option<f64>, sigma: Option<f64>, rng: &mut StdRng) -> Option<f64> {
    let sigma = sigma.filter(|s| s.is_finite() && *s >= 0.0)?;
    let flux = flux?;
    let normal =
        Normal::new(0.0, sigma).expect("noise std-dev must be valid (finite, non-negative)");
    Some(flux + normal.sample(rng))
}

/// Per-band noise parameter table for one simulated survey.
#[derive(Debug, Clone)]
pub struct NoiseModel {
    params: HashMap<Band, NoiseParameters>,
}

impl NoiseModel {
    /// Same parameters for every band, as in the reference run.
    pub fn uniform(params: NoiseParameters) -> Self {
        let params = Band::ALL.iter().map(|&band| (band, params)).collect();
        Self { params }
    }

    /// Override the parameters for one band.
    pub fn with_band(mut self, band: Band, params: NoiseParameters) -> Self {
        self.params.insert(band, params);
        self
    }

    /// Parameters for `band`. Every band has an entry by construction.
    pub fn parameters(&self, band: Band) -> &NoiseParameters {
        self.params
            .get(&band)
            .expect("NoiseModel is constructed with an entry for every band")
    }

    /// Flux uncertainty in `band` for a source of true magnitude `mag`
    /// against the supplied depth profile.
    pub fn flux_uncertainty(&self, band: Band, mag: f64, depths: &DepthProfile) -> Option<f64> {
        flux_uncertainty(mag, depths.limiting_magnitude(band), self.parameters(band))
    }

    /// Check the depth profile carries an entry for every band this model
    /// will consume. Fatal at setup, before any object is processed.
    pub fn validate_depths(&self, depths: &DepthProfile) -> Result<(), ConfigError> {
        depths.validate_bands(&Band::ALL)
    }
}

impl Default for NoiseModel {
    fn default() -> Self {
        Self::uniform(NoiseParameters::default())
    }
}
