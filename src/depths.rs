//! Limiting-magnitude profiles for degradation scenarios.

use std::collections::HashMap;

use crate::bands::Band;
use crate::error::ConfigError;

/// Per-band limiting magnitude of the target (degraded) survey.
///
/// Constant for one simulation run. A band may carry a non-finite depth,
/// meaning the survey never observes it: the accessor reports it as
/// `None` and the noise model propagates "unmeasured" for that band. A
/// band with no entry at all is a configuration error, caught by
/// [`validate_bands`](Self::validate_bands) before any object is
/// processed.
#[derive(Debug, Clone, Default)]
pub struct DepthProfile {
    depths: HashMap<Band, f64>,
}

impl DepthProfile {
    /// Empty profile; populate with [`with_depth`](Self::with_depth).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the limiting magnitude for one band.
    pub fn with_depth(mut self, band: Band, limiting_mag: f64) -> Self {
        self.depths.insert(band, limiting_mag);
        self
    }

    /// Nominal degraded two-semester depths used as the default scenario.
    pub fn degraded_survey() -> Self {
        Self::new()
            .with_depth(Band::U, 24.4)
            .with_depth(Band::G, 24.7)
            .with_depth(Band::R, 24.2)
            .with_depth(Band::I, 23.8)
            .with_depth(Band::Z, 23.1)
    }

    /// Limiting magnitude of `band`, or `None` when the band is absent or
    /// its depth is non-finite (unusable for this run).
    pub fn limiting_magnitude(&self, band: Band) -> Option<f64> {
        self.depths.get(&band).copied().filter(|d| d.is_finite())
    }

    /// Require an entry for every listed band. Non-finite entries pass:
    /// they are a valid way to declare a band unobserved.
    pub fn validate_bands(&self, bands: &[Band]) -> Result<(), ConfigError> {
        for &band in bands {
            if !self.depths.contains_key(&band) {
                return Err(ConfigError::MissingDepth(band));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_scenario_covers_all_bands() {
        let depths = DepthProfile::degraded_survey();
        assert!(depths.validate_bands(&Band::ALL).is_ok());
        for band in Band::ALL {
            assert!(depths.limiting_magnitude(band).is_some());
        }
    }

    #[test]
    fn test_missing_band_is_config_error() {
        let depths = DepthProfile::new().with_depth(Band::R, 24.2);
        let err = depths.validate_bands(&Band::ALL).unwrap_err();
        assert!(matches!(err, ConfigError::MissingDepth(Band::U)));
    }

    #[test]
    fn test_non_finite_depth_is_present_but_unusable() {
        let depths = DepthProfile::degraded_survey().with_depth(Band::U, f64::NAN);
        assert!(depths.validate_bands(&Band::ALL).is_ok());
        assert_eq!(depths.limiting_magnitude(Band::U), None);
        assert!(depths.limiting_magnitude(Band::R).is_some());
    }
}
