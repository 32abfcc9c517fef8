//! Inverse-hyperbolic-sine (asinh) magnitudes.
//!
//! A standard logarithmic magnitude is undefined for non-positive flux, so
//! a noisy faint source can fall out of magnitude space entirely. The
//! luptitude replaces the logarithm with an asinh whose softening scale is
//! the flux uncertainty itself:
//!
//! `L = -2.5/ln(10) * (asinh(F / (2*sigma)) + ln(sigma)) - 48.60`
//!
//! which is finite for every real flux, compresses smoothly through zero,
//! and converges to the ordinary AB magnitude when `F >> sigma`.

use crate::photometry::flux::AB_ZERO_POINT;

/// Pogson scale factor 2.5 / ln(10).
const POGSON: f64 = 2.5 / std::f64::consts::LN_10;

/// Asinh magnitude of a (possibly negative) flux with uncertainty `sigma`.
///
/// Returns `None` when `sigma` is undefined, non-finite, or non-positive:
/// the softening scale comes from the noise model, so a band without a
/// measurable uncertainty has no luptitude either.
pub fn luptitude(flux: Option<f64>, sigma: Option<f64>) -> Option<f64> {
    let sigma = sigma.filter(|s| s.is_finite() && *s > 0.0)?;
    let flux = flux.filter(|f| f.is_finite())?;

    Some(-POGSON * ((flux / (2.0 * sigma)).asinh() + sigma.ln()) - AB_ZERO_POINT)
}
