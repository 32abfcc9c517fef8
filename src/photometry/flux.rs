//! AB magnitude to flux conversions.
//!
//! Fluxes are in cgs units (erg/s/cm²/Hz) with the conventional AB zero
//! point, so `m = -2.5 log10(F) - 48.60`.

/// AB magnitude zero point.
pub const AB_ZERO_POINT: f64 = 48.60;

/// Convert an AB magnitude to flux.
///
/// Returns `None` for a non-finite magnitude so that undefined catalog
/// entries propagate as absences.
pub fn mag_to_flux(mag: f64) -> Option<f64> {
    if !mag.is_finite() {
        return None;
    }
    Some(10_f64.powf(-(mag + AB_ZERO_POINT) / 2.5))
}

/// Convert a strictly positive flux back to an AB magnitude.
///
/// Returns `None` for non-positive or non-finite flux; use the luptitude
/// transform for noisy fluxes that can reach zero or below.
pub fn flux_to_mag(flux: f64) -> Option<f64> {
    if !(flux.is_finite() && flux > 0.0) {
        return None;
    }
    Some(-2.5 * flux.log10() - AB_ZERO_POINT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_round_trip() {
        for mag in [18.0, 22.5, 24.0, 27.3] {
            let flux = mag_to_flux(mag).unwrap();
            assert_relative_eq!(flux_to_mag(flux).unwrap(), mag, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_fainter_means_less_flux() {
        let bright = mag_to_flux(20.0).unwrap();
        let faint = mag_to_flux(25.0).unwrap();
        assert!(bright > faint);
        // 5 magnitudes is exactly a factor of 100
        assert_relative_eq!(bright / faint, 100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_undefined_propagates() {
        assert_eq!(mag_to_flux(f64::NAN), None);
        assert_eq!(flux_to_mag(0.0), None);
        assert_eq!(flux_to_mag(-1.0e-30), None);
    }
}
