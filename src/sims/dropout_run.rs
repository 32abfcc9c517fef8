//! Degrade-detect-classify-accumulate loop over a catalog.
//!
//! Each object walks a fixed state machine: degrade the true magnitudes
//! through the noise model and luptitude transform, gate on the detection
//! band, classify the surviving colors against the dropout selection rule,
//! and accumulate the reference redshift of selected objects into the
//! dN/dz histogram. Objects are independent; the only shared state is the
//! pair of accumulators, which merge commutatively so the serial and
//! rayon paths produce identical results.
//!
//! Reproducibility: every object owns an RNG seeded from
//! `(base_seed, object_index)`, so a fixed seed and catalog ordering give
//! bitwise-identical output regardless of the degree of parallelism.

use std::fmt;
use std::str::FromStr;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use crate::bands::{Band, MagnitudeSet};
use crate::catalog::CatalogRow;
use crate::depths::DepthProfile;
use crate::error::ConfigError;
use crate::histogram::{HistogramSpec, RedshiftHistogram};
use crate::photometry::color::ColorSet;
use crate::photometry::flux::mag_to_flux;
use crate::photometry::luptitude::luptitude;
use crate::photometry::noise::{inject_noise, NoiseModel};
use crate::selection::{DropoutType, PredicateSet, SelectionRule};

/// Whether to observe the catalog at full depth or through the degraded
/// survey's noise model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DegradationMode {
    /// Reference survey: no noise injection, true magnitudes pass through
    /// unchanged, every object counts as detected.
    Full,
    /// Target survey: inject noise, transform to luptitudes, gate
    /// detection on the degraded detection-band magnitude.
    Degraded,
}

impl FromStr for DegradationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "full" => Ok(DegradationMode::Full),
            "degraded" => Ok(DegradationMode::Degraded),
            other => Err(format!(
                "unknown degradation mode '{other}' (expected 'full' or 'degraded')"
            )),
        }
    }
}

impl fmt::Display for DegradationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DegradationMode::Full => write!(f, "Full"),
            DegradationMode::Degraded => write!(f, "Degraded"),
        }
    }
}

/// Configuration of one simulation run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Dropout type to select.
    pub dropout: DropoutType,
    /// Variant inequality set.
    pub predicates: PredicateSet,
    /// Apply the stricter fourth cut.
    pub fourth_cut: bool,
    /// Full or degraded observation.
    pub mode: DegradationMode,
    /// Base random seed; per-object streams derive from it.
    pub seed: u64,
    /// dN/dz binning.
    pub histogram: HistogramSpec,
    /// Probability of retaining a non-dropout for diagnostics, in [0, 1].
    pub nondropout_sample_rate: f64,
    /// Collect per-object diagnostic points at all.
    pub collect_diagnostics: bool,
}

impl RunConfig {
    /// Defaults of the reference run: degraded observation, seed 314,
    /// z in [0, 6) with dz = 0.2, 1% non-dropout sampling, diagnostics
    /// off.
    pub fn new(dropout: DropoutType) -> Self {
        Self {
            dropout,
            predicates: PredicateSet::Standard,
            fourth_cut: false,
            mode: DegradationMode::Degraded,
            seed: 314,
            histogram: HistogramSpec::default_dndz(),
            nondropout_sample_rate: 0.01,
            collect_diagnostics: false,
        }
    }

    fn validate(&self, depths: &DepthProfile, noise: &NoiseModel) -> Result<(), ConfigError> {
        noise.validate_depths(depths)?;
        self.histogram.validate()?;
        if !(0.0..=1.0).contains(&self.nondropout_sample_rate) {
            return Err(ConfigError::InvalidSampleRate(self.nondropout_sample_rate));
        }
        Ok(())
    }
}

/// Detection counters, updated once per processed object.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStatistics {
    /// Objects whose detection-band magnitude passed the depth gate.
    pub detected: u64,
    /// Objects that failed the gate (including undefined measurements).
    pub undetected: u64,
    /// Detected objects classified as dropouts (whether or not their
    /// redshift entered the histogram).
    pub dropouts: u64,
}

impl RunStatistics {
    /// Commutative merge for parallel reduction.
    pub fn merge(&mut self, other: &RunStatistics) {
        self.detected += other.detected;
        self.undetected += other.undetected;
        self.dropouts += other.dropouts;
    }
}

/// One point for the diagnostic color-color diagram.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiagnosticPoint {
    /// Index of the object in the input catalog.
    pub object_index: usize,
    /// Horizontal-axis color.
    pub red: f64,
    /// Vertical-axis (break) color.
    pub blue: f64,
    /// Reference redshift, if the catalog has one.
    pub redshift: Option<f64>,
    /// Whether the object was classified as a dropout.
    pub is_dropout: bool,
}

/// Products of one run.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Recovered redshift distribution of selected dropouts.
    pub histogram: RedshiftHistogram,
    /// Detection counters.
    pub statistics: RunStatistics,
    /// Diagnostic points, sorted by object index; empty unless
    /// `collect_diagnostics` was set.
    pub diagnostics: Vec<DiagnosticPoint>,
}

/// Derive the per-object RNG seed from the base seed and catalog index.
fn object_seed(base_seed: u64, object_index: usize) -> u64 {
    base_seed.wrapping_add(object_index as u64)
}

/// Degrade one object's true magnitudes into observed luptitudes.
///
/// Full mode passes the true magnitudes through unchanged. In degraded
/// mode every band with an undefined depth, magnitude, or uncertainty
/// comes out `None`.
fn degrade_magnitudes(
    row: &CatalogRow,
    depths: &DepthProfile,
    noise: &NoiseModel,
    mode: DegradationMode,
    rng: &mut StdRng,
) -> MagnitudeSet {
    match mode {
        DegradationMode::Full => row.magnitudes,
        DegradationMode::Degraded => {
            let mut degraded = MagnitudeSet::new();
            for band in Band::ALL {
                let observed = row.magnitudes.get(band).and_then(|mag| {
                    let sigma = noise.flux_uncertainty(band, mag, depths);
                    let noisy = inject_noise(mag_to_flux(mag), sigma, rng);
                    luptitude(noisy, sigma)
                });
                degraded.set(band, observed);
            }
            degraded
        }
    }
}

/// What one object contributed to the run.
struct ObjectOutcome {
    detected: bool,
    is_dropout: bool,
    redshift: Option<f64>,
    diagnostic: Option<DiagnosticPoint>,
}

/// Walk one object through degrade -> detect -> classify.
fn process_object(
    object_index: usize,
    row: &CatalogRow,
    depths: &DepthProfile,
    noise: &NoiseModel,
    rule: &SelectionRule,
    config: &RunConfig,
    rng: &mut StdRng,
) -> ObjectOutcome {
    let observed = degrade_magnitudes(row, depths, noise, config.mode, rng);

    // Detection gate: the full-depth reference survey sees every object;
    // the degraded survey requires the detection band to beat its depth.
    // Undefined values on either side compare as not-detected.
    let detection_band = rule.detection_band();
    let detected = match config.mode {
        DegradationMode::Full => true,
        DegradationMode::Degraded => matches!(
            (
                observed.get(detection_band),
                depths.limiting_magnitude(detection_band),
            ),
            (Some(mag), Some(depth)) if mag < depth
        ),
    };

    if !detected {
        return ObjectOutcome {
            detected: false,
            is_dropout: false,
            redshift: None,
            diagnostic: None,
        };
    }

    let colors = ColorSet::compute(&observed, &rule.required_colors());
    let is_dropout = rule.classify(&colors);

    let diagnostic = if config.collect_diagnostics {
        // Dropouts are always plotted; non-dropouts are down-sampled with
        // an independent per-object draw. Strict `<` so a rate of zero
        // retains nothing under any seed.
        let retain = is_dropout || rng.gen::<f64>() < config.nondropout_sample_rate;
        let [blue_label, red_label] = rule.required_colors();
        match (retain, colors.get(blue_label), colors.get(red_label)) {
            (true, Some(blue), Some(red)) => Some(DiagnosticPoint {
                object_index,
                red,
                blue,
                redshift: row.redshift,
                is_dropout,
            }),
            _ => None,
        }
    } else {
        None
    };

    ObjectOutcome {
        detected: true,
        is_dropout,
        redshift: if is_dropout { row.redshift } else { None },
        diagnostic,
    }
}

/// Partial accumulators for one worker.
struct Accumulator {
    histogram: RedshiftHistogram,
    statistics: RunStatistics,
    diagnostics: Vec<DiagnosticPoint>,
}

impl Accumulator {
    fn new(spec: HistogramSpec) -> Self {
        Self {
            // Spec was validated before the loop started.
            histogram: RedshiftHistogram::new(spec)
                .expect("histogram spec validated at setup"),
            statistics: RunStatistics::default(),
            diagnostics: Vec::new(),
        }
    }

    fn absorb(&mut self, outcome: ObjectOutcome) {
        if outcome.detected {
            self.statistics.detected += 1;
        } else {
            self.statistics.undetected += 1;
        }
        if outcome.is_dropout {
            self.statistics.dropouts += 1;
            self.histogram.record(outcome.redshift);
        }
        if let Some(point) = outcome.diagnostic {
            self.diagnostics.push(point);
        }
    }

    fn merge(mut self, other: Accumulator) -> Self {
        self.histogram.merge(&other.histogram);
        self.statistics.merge(&other.statistics);
        self.diagnostics.extend(other.diagnostics);
        self
    }

    fn finish(mut self) -> RunOutcome {
        // Merge order is nondeterministic under rayon; restore catalog
        // order so output is reproducible.
        self.diagnostics.sort_by_key(|p| p.object_index);
        RunOutcome {
            histogram: self.histogram,
            statistics: self.statistics,
            diagnostics: self.diagnostics,
        }
    }
}

/// Run the simulation over `rows` in a single pass.
///
/// Configuration problems (missing depth band, invalid histogram range,
/// sample rate outside [0, 1]) fail here, before any object is processed.
/// Per-object undefined values never abort the run.
pub fn run_simulation(
    rows: &[CatalogRow],
    depths: &DepthProfile,
    noise: &NoiseModel,
    config: &RunConfig,
) -> Result<RunOutcome, ConfigError> {
    config.validate(depths, noise)?;
    let rule = SelectionRule::new(config.dropout, config.predicates, config.fourth_cut);

    let mut accumulator = Accumulator::new(config.histogram);
    for (object_index, row) in rows.iter().enumerate() {
        let mut rng = StdRng::seed_from_u64(object_seed(config.seed, object_index));
        let outcome = process_object(object_index, row, depths, noise, &rule, config, &mut rng);
        accumulator.absorb(outcome);
    }

    let outcome = accumulator.finish();
    log::info!(
        "processed {} objects: {} detected, {} undetected, {} dropouts ({} with usable redshift)",
        rows.len(),
        outcome.statistics.detected,
        outcome.statistics.undetected,
        outcome.statistics.dropouts,
        outcome.histogram.total(),
    );
    Ok(outcome)
}

/// Parallel variant of [`run_simulation`].
///
/// Identical results to the serial pass for any worker count: per-object
/// seeds depend only on the catalog index, and the accumulators merge
/// commutatively.
pub fn run_simulation_parallel(
    rows: &[CatalogRow],
    depths: &DepthProfile,
    noise: &NoiseModel,
    config: &RunConfig,
) -> Result<RunOutcome, ConfigError> {
    config.validate(depths, noise)?;
    let rule = SelectionRule::new(config.dropout, config.predicates, config.fourth_cut);

    let accumulator = rows
        .par_iter()
        .enumerate()
        .map(|(object_index, row)| {
            let mut rng = StdRng::seed_from_u64(object_seed(config.seed, object_index));
            process_object(object_index, row, depths, noise, &rule, config, &mut rng)
        })
        .fold(
            || Accumulator::new(config.histogram),
            |mut accumulator, outcome| {
                accumulator.absorb(outcome);
                accumulator
            },
        )
        .reduce(|| Accumulator::new(config.histogram), Accumulator::merge);

    Ok(accumulator.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::photometry::noise::NoiseParameters;

    /// Noise model with vanishing fractional error: luptitudes collapse to
    /// the true magnitudes, making detection deterministic.
    fn near_noiseless() -> NoiseModel {
        NoiseModel::uniform(NoiseParameters {
            estar: 1.0e-12,
            ..NoiseParameters::default()
        })
    }

    fn row_with_r(mag: Option<f64>, redshift: Option<f64>) -> CatalogRow {
        let mags = MagnitudeSet::new().with(Band::R, mag);
        CatalogRow::new(mags, redshift)
    }

    /// A row whose colors land well inside the u-dropout region.
    fn u_dropout_row(redshift: Option<f64>) -> CatalogRow {
        let mags = MagnitudeSet::new()
            .with(Band::U, Some(26.0))
            .with(Band::G, Some(24.0))
            .with(Band::R, Some(23.7))
            .with(Band::I, Some(23.5))
            .with(Band::Z, Some(23.4));
        CatalogRow::new(mags, redshift)
    }

    fn u_config() -> RunConfig {
        RunConfig::new(DropoutType::U)
    }

    #[test]
    fn test_detection_scenario_three_objects() {
        // depth r=25, true r mags {24, 26, undefined}:
        // detected=1, undetected=2.
        let depths = DepthProfile::degraded_survey().with_depth(Band::R, 25.0);
        let rows = vec![
            row_with_r(Some(24.0), Some(3.0)),
            row_with_r(Some(26.0), Some(3.0)),
            row_with_r(None, Some(3.0)),
        ];

        let outcome = run_simulation(&rows, &depths, &near_noiseless(), &u_config()).unwrap();
        assert_eq!(outcome.statistics.detected, 1);
        assert_eq!(outcome.statistics.undetected, 2);
    }

    #[test]
    fn test_full_mode_passes_magnitudes_through() {
        let row = u_dropout_row(Some(3.2));
        let depths = DepthProfile::degraded_survey();
        let noise = NoiseModel::default();
        let mut rng = StdRng::seed_from_u64(99);

        let observed =
            degrade_magnitudes(&row, &depths, &noise, DegradationMode::Full, &mut rng);
        assert_eq!(observed, row.magnitudes);
    }

    #[test]
    fn test_full_mode_detects_everything() {
        let depths = DepthProfile::degraded_survey().with_depth(Band::R, 25.0);
        let rows = vec![
            row_with_r(Some(24.0), None),
            row_with_r(Some(28.0), None),
            row_with_r(None, None),
        ];
        let config = RunConfig {
            mode: DegradationMode::Full,
            ..u_config()
        };

        let outcome = run_simulation(&rows, &depths, &near_noiseless(), &config).unwrap();
        assert_eq!(outcome.statistics.detected, 3);
        assert_eq!(outcome.statistics.undetected, 0);
    }

    #[test]
    fn test_dropout_accumulates_finite_redshift_only() {
        let depths = DepthProfile::degraded_survey();
        let rows = vec![u_dropout_row(Some(3.2)), u_dropout_row(None)];
        let config = RunConfig {
            mode: DegradationMode::Full,
            ..u_config()
        };

        let outcome = run_simulation(&rows, &depths, &near_noiseless(), &config).unwrap();
        assert_eq!(outcome.statistics.dropouts, 2);
        assert_eq!(outcome.histogram.total(), 1);
        assert_eq!(outcome.histogram.counts().sum(), 1);
    }

    #[test]
    fn test_missing_depth_band_fails_before_processing() {
        let depths = DepthProfile::new().with_depth(Band::R, 25.0);
        let rows = vec![u_dropout_row(Some(3.2))];
        let err = run_simulation(&rows, &depths, &near_noiseless(), &u_config()).unwrap_err();
        assert!(matches!(err, ConfigError::MissingDepth(_)));
    }

    #[test]
    fn test_invalid_sample_rate_fails_before_processing() {
        let depths = DepthProfile::degraded_survey();
        let config = RunConfig {
            nondropout_sample_rate: 1.5,
            ..u_config()
        };
        let err = run_simulation(&[], &depths, &near_noiseless(), &config).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSampleRate(_)));
    }

    #[test]
    fn test_undefined_depth_band_never_aborts() {
        // u depth undefined: u-band measurements become None, u-g becomes
        // None, classification yields false. The run completes.
        let depths = DepthProfile::degraded_survey()
            .with_depth(Band::U, f64::NAN)
            .with_depth(Band::R, 25.0);
        let rows = vec![u_dropout_row(Some(3.2))];

        let outcome = run_simulation(&rows, &depths, &near_noiseless(), &u_config()).unwrap();
        assert_eq!(outcome.statistics.detected, 1);
        assert_eq!(outcome.statistics.dropouts, 0);
        assert_eq!(outcome.histogram.total(), 0);
    }

    #[test]
    fn test_zero_sample_rate_retains_no_nondropouts() {
        let depths = DepthProfile::degraded_survey();
        // Blue-ish rows that detect but do not select.
        let rows: Vec<CatalogRow> = (0..200)
            .map(|step| {
                let mags = MagnitudeSet::new()
                    .with(Band::U, Some(24.0))
                    .with(Band::G, Some(23.9))
                    .with(Band::R, Some(23.8 - 0.001 * step as f64))
                    .with(Band::I, Some(23.7))
                    .with(Band::Z, Some(23.6));
                CatalogRow::new(mags, Some(1.0))
            })
            .collect();

        for seed in [0, 314, 0xDEAD_BEEF] {
            let config = RunConfig {
                mode: DegradationMode::Full,
                collect_diagnostics: true,
                nondropout_sample_rate: 0.0,
                seed,
                ..u_config()
            };
            let outcome = run_simulation(&rows, &depths, &near_noiseless(), &config).unwrap();
            assert_eq!(outcome.statistics.dropouts, 0);
            assert!(outcome.diagnostics.is_empty(), "seed {seed} leaked points");
        }
    }

    #[test]
    fn test_reproducible_across_runs_and_parallelism() {
        let depths = DepthProfile::degraded_survey();
        let noise = NoiseModel::default();
        let rows: Vec<CatalogRow> = (0..300)
            .map(|step| {
                let base = 22.0 + 0.01 * step as f64;
                let mags = MagnitudeSet::new()
                    .with(Band::U, Some(base + 2.2))
                    .with(Band::G, Some(base + 0.4))
                    .with(Band::R, Some(base))
                    .with(Band::I, Some(base - 0.1))
                    .with(Band::Z, Some(base - 0.2));
                CatalogRow::new(mags, Some(0.01 * step as f64))
            })
            .collect();
        let config = RunConfig {
            collect_diagnostics: true,
            ..u_config()
        };

        let serial_a = run_simulation(&rows, &depths, &noise, &config).unwrap();
        let serial_b = run_simulation(&rows, &depths, &noise, &config).unwrap();
        let parallel = run_simulation_parallel(&rows, &depths, &noise, &config).unwrap();

        assert_eq!(serial_a.statistics, serial_b.statistics);
        assert_eq!(serial_a.histogram.counts(), serial_b.histogram.counts());
        assert_eq!(serial_a.diagnostics, serial_b.diagnostics);

        assert_eq!(serial_a.statistics, parallel.statistics);
        assert_eq!(serial_a.histogram.counts(), parallel.histogram.counts());
        assert_eq!(serial_a.diagnostics, parallel.diagnostics);
    }

    #[test]
    fn test_different_seeds_change_noisy_magnitudes() {
        let depths = DepthProfile::degraded_survey();
        let noise = NoiseModel::default();
        let row = u_dropout_row(Some(3.0));

        let mut rng_a = StdRng::seed_from_u64(1);
        let mut rng_b = StdRng::seed_from_u64(2);
        let observed_a =
            degrade_magnitudes(&row, &depths, &noise, DegradationMode::Degraded, &mut rng_a);
        let observed_b =
            degrade_magnitudes(&row, &depths, &noise, DegradationMode::Degraded, &mut rng_b);

        assert_ne!(observed_a.get(Band::R), observed_b.get(Band::R));
    }
}
