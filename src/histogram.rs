//! Fixed-width redshift histogram (dN/dz accumulator).

use std::fmt;
use std::io::Write;
use std::str::FromStr;

use ndarray::Array1;

use crate::error::ConfigError;

/// Binning specification: `[start, stop)` in steps of `width`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramSpec {
    /// Lower edge of the first bin.
    pub start: f64,
    /// Upper limit of the binned range.
    pub stop: f64,
    /// Bin width.
    pub width: f64,
}

impl HistogramSpec {
    /// The dN/dz binning of the reference run: z in [0, 6) with dz = 0.2.
    pub fn default_dndz() -> Self {
        Self {
            start: 0.0,
            stop: 6.0,
            width: 0.2,
        }
    }

    /// Number of whole bins the range describes. The epsilon absorbs
    /// division error for ranges that divide evenly (6.0 / 0.2 lands just
    /// under 30 in IEEE arithmetic).
    fn bin_count(&self) -> usize {
        (((self.stop - self.start) / self.width) + 1e-9).floor() as usize
    }

    /// Validate that the spec describes at least one bin.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ok = self.start.is_finite()
            && self.stop.is_finite()
            && self.width.is_finite()
            && self.width > 0.0
            && self.stop > self.start
            && self.bin_count() >= 1;
        if ok {
            Ok(())
        } else {
            Err(ConfigError::InvalidHistogramRange {
                start: self.start,
                stop: self.stop,
                width: self.width,
            })
        }
    }
}

impl FromStr for HistogramSpec {
    type Err = String;

    /// Parse "start:stop:width", e.g. "0.0:6.0:0.2".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() != 3 {
            return Err("histogram bins must be in format 'start:stop:width'".to_string());
        }
        let start = parts[0]
            .trim()
            .parse::<f64>()
            .map_err(|_| "invalid start value".to_string())?;
        let stop = parts[1]
            .trim()
            .parse::<f64>()
            .map_err(|_| "invalid stop value".to_string())?;
        let width = parts[2]
            .trim()
            .parse::<f64>()
            .map_err(|_| "invalid width value".to_string())?;

        let spec = Self { start, stop, width };
        spec.validate().map_err(|e| e.to_string())?;
        Ok(spec)
    }
}

impl fmt::Display for HistogramSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.start, self.stop, self.width)
    }
}

/// Accumulated redshift counts for selected dropouts.
///
/// The `accumulated` counter increments exactly when a bin receives a
/// count, so the bin sum and the counter can never drift apart; that
/// equality is the invariant downstream consumers rely on.
#[derive(Debug, Clone)]
pub struct RedshiftHistogram {
    spec: HistogramSpec,
    counts: Array1<u64>,
    accumulated: u64,
}

impl RedshiftHistogram {
    /// Create an empty histogram. Invalid ranges are a configuration
    /// error, raised before any per-object processing.
    pub fn new(spec: HistogramSpec) -> Result<Self, ConfigError> {
        spec.validate()?;
        Ok(Self {
            spec,
            counts: Array1::zeros(spec.bin_count()),
            accumulated: 0,
        })
    }

    /// Record one reference redshift. `None`, non-finite, and
    /// out-of-range values are dropped silently; returns whether a bin
    /// was incremented.
    pub fn record(&mut self, redshift: Option<f64>) -> bool {
        let z = match redshift.filter(|z| z.is_finite()) {
            Some(z) => z,
            None => return false,
        };
        // Bins may not tile the full range when it does not divide evenly;
        // reject anything past the last whole bin.
        let effective_stop = self.spec.start + self.spec.width * self.counts.len() as f64;
        if z < self.spec.start || z >= effective_stop {
            return false;
        }
        let bin = ((z - self.spec.start) / self.spec.width) as usize;
        // Float division can land exactly on the upper edge of the last bin.
        let bin = bin.min(self.counts.len() - 1);
        self.counts[bin] += 1;
        self.accumulated += 1;
        true
    }

    /// Merge another histogram of the same spec into this one.
    /// Commutative and associative, safe as a parallel reduction.
    pub fn merge(&mut self, other: &RedshiftHistogram) {
        debug_assert_eq!(self.spec, other.spec);
        self.counts += &other.counts;
        self.accumulated += other.accumulated;
    }

    /// The binning this histogram was created with.
    pub fn spec(&self) -> HistogramSpec {
        self.spec
    }

    /// Per-bin counts.
    pub fn counts(&self) -> &Array1<u64> {
        &self.counts
    }

    /// Bin-center redshifts, one per count.
    pub fn bin_centers(&self) -> Array1<f64> {
        let half = self.spec.width / 2.0;
        Array1::from_iter(
            (0..self.counts.len()).map(|i| self.spec.start + self.spec.width * i as f64 + half),
        )
    }

    /// Total number of redshifts recorded into bins.
    pub fn total(&self) -> u64 {
        self.accumulated
    }

    /// Write the two-column text table: bin-center redshift and count,
    /// one row per bin, scientific notation.
    pub fn write_table<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for (center, count) in self.bin_centers().iter().zip(self.counts.iter()) {
            writeln!(writer, "{:.6e}\t{:.6e}", center, *count as f64)?;
        }
        Ok(())
    }
}
