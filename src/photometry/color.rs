//! Color indices derived from per-band magnitudes.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::bands::{Band, MagnitudeSet};
use crate::error::ConfigError;

/// A named color index "b1-b2" = mag(b1) - mag(b2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColorLabel {
    /// Bluer band (minuend).
    pub blue: Band,
    /// Redder band (subtrahend).
    pub red: Band,
}

impl ColorLabel {
    /// Color between two bands.
    pub fn new(blue: Band, red: Band) -> Self {
        Self { blue, red }
    }
}

impl fmt::Display for ColorLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.blue, self.red)
    }
}

impl FromStr for ColorLabel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (blue, red) = s
            .split_once('-')
            .ok_or_else(|| ConfigError::InvalidColorLabel(s.to_string()))?;
        Ok(Self {
            blue: blue.parse()?,
            red: red.parse()?,
        })
    }
}

/// Colors of one object. Undefined magnitudes yield undefined colors.
#[derive(Debug, Clone, Default)]
pub struct ColorSet {
    values: HashMap<ColorLabel, Option<f64>>,
}

impl ColorSet {
    /// Compute the requested colors from a magnitude (or luptitude) set.
    ///
    /// Pure and order-independent over `labels`; a `None` magnitude in
    /// either band makes the color `None` rather than an error.
    pub fn compute(mags: &MagnitudeSet, labels: &[ColorLabel]) -> Self {
        let values = labels
            .iter()
            .map(|&label| {
                let color = match (mags.get(label.blue), mags.get(label.red)) {
                    (Some(b), Some(r)) => Some(b - r),
                    _ => None,
                };
                (label, color)
            })
            .collect();
        Self { values }
    }

    /// Value of one color, `None` if it was not requested or is undefined.
    pub fn get(&self, label: ColorLabel) -> Option<f64> {
        self.values.get(&label).copied().flatten()
    }
}
