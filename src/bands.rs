//! Photometric bands and per-object magnitude sets.
//!
//! The simulation works with a fixed set of broadband filters. Magnitudes
//! are carried as `Option<f64>` so that an undefined measurement (a NaN in
//! the source catalog, or a band that could not be degraded) is an explicit
//! absence rather than a floating-point sentinel.

use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// Broadband photometric filters known to the simulation, blue to red.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Band {
    /// u band (atmospheric-cutoff ultraviolet)
    U,
    /// g band
    G,
    /// r band
    R,
    /// i band
    I,
    /// z band
    Z,
}

impl Band {
    /// All bands in wavelength order. Iteration order is fixed so that
    /// per-object random draws are consumed in a deterministic sequence.
    pub const ALL: [Band; 5] = [Band::U, Band::G, Band::R, Band::I, Band::Z];

    /// Number of bands.
    pub const COUNT: usize = Self::ALL.len();

    /// Stable index into fixed-size per-band arrays.
    pub fn index(self) -> usize {
        match self {
            Band::U => 0,
            Band::G => 1,
            Band::R => 2,
            Band::I => 3,
            Band::Z => 4,
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            Band::U => 'u',
            Band::G => 'g',
            Band::R => 'r',
            Band::I => 'i',
            Band::Z => 'z',
        };
        write!(f, "{letter}")
    }
}

impl FromStr for Band {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "u" | "U" => Ok(Band::U),
            "g" | "G" => Ok(Band::G),
            "r" | "R" => Ok(Band::R),
            "i" | "I" => Ok(Band::I),
            "z" | "Z" => Ok(Band::Z),
            other => Err(ConfigError::UnknownBand(other.to_string())),
        }
    }
}

/// One magnitude (or luptitude) per band for a single object.
///
/// `None` marks an undefined value; it propagates through color
/// computation and classification without ever raising.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MagnitudeSet {
    values: [Option<f64>; Band::COUNT],
}

impl MagnitudeSet {
    /// Empty set with every band undefined.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the magnitude in `band`, `None` if undefined.
    pub fn get(&self, band: Band) -> Option<f64> {
        self.values[band.index()]
    }

    /// Set the magnitude in `band`. Non-finite inputs are normalized to
    /// `None` so NaN sentinels cannot leak in.
    pub fn set(&mut self, band: Band, mag: Option<f64>) {
        self.values[band.index()] = mag.filter(|m| m.is_finite());
    }

    /// Builder-style variant of [`set`](Self::set).
    pub fn with(mut self, band: Band, mag: Option<f64>) -> Self {
        self.set(band, mag);
        self
    }

    /// Iterate over (band, magnitude) pairs in wavelength order.
    pub fn iter(&self) -> impl Iterator<Item = (Band, Option<f64>)> + '_ {
        Band::ALL.iter().map(move |&band| (band, self.get(band)))
    }
}
