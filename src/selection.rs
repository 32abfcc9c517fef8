//! Color-color dropout classification.
//!
//! A dropout type fixes the detection band, the two colors spanning the
//! selection diagram, and a conjunction of linear inequalities (a wedge
//! plus a window) in that color-color plane. All string-keyed dispatch is
//! resolved once at setup into a [`SelectionRule`] value; classification
//! itself is a pure function of the supplied colors.

use std::fmt;
use std::str::FromStr;

use crate::bands::Band;
use crate::error::ConfigError;
use crate::photometry::color::{ColorLabel, ColorSet};

/// Which band is treated as "dropped".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropoutType {
    /// u-dropouts (z ~ 3 Lyman-break candidates), selected in u-g vs g-r.
    U,
    /// g-dropouts (z ~ 4), selected in g-r vs r-i.
    G,
}

impl DropoutType {
    /// Band whose degraded magnitude gates detection.
    pub fn detection_band(self) -> Band {
        match self {
            DropoutType::U => Band::R,
            DropoutType::G => Band::I,
        }
    }

    /// Vertical axis of the selection diagram (the break color).
    pub fn blue_color(self) -> ColorLabel {
        match self {
            DropoutType::U => ColorLabel::new(Band::U, Band::G),
            DropoutType::G => ColorLabel::new(Band::G, Band::R),
        }
    }

    /// Horizontal axis of the selection diagram.
    pub fn red_color(self) -> ColorLabel {
        match self {
            DropoutType::U => ColorLabel::new(Band::G, Band::R),
            DropoutType::G => ColorLabel::new(Band::R, Band::I),
        }
    }

    /// Plot window for the diagnostic diagram, ((red_lo, red_hi),
    /// (blue_lo, blue_hi)).
    pub fn diagram_window(self) -> ((f64, f64), (f64, f64)) {
        ((-0.3, 1.2), (-0.5, 2.5))
    }
}

impl fmt::Display for DropoutType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropoutType::U => write!(f, "u"),
            DropoutType::G => write!(f, "g"),
        }
    }
}

impl FromStr for DropoutType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "u" | "U" => Ok(DropoutType::U),
            "g" | "G" => Ok(DropoutType::G),
            other => Err(ConfigError::UnknownDropoutType(other.to_string())),
        }
    }
}

/// Variant inequality sets for a given dropout type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PredicateSet {
    /// The standard wedge-plus-window criteria.
    #[default]
    Standard,
    /// Narrowed red window and raised break-color floor, trading
    /// completeness for purity.
    Tight,
}

impl FromStr for PredicateSet {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(PredicateSet::Standard),
            "tight" => Ok(PredicateSet::Tight),
            other => Err(format!(
                "unknown predicate set '{other}' (expected 'standard' or 'tight')"
            )),
        }
    }
}

impl fmt::Display for PredicateSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PredicateSet::Standard => write!(f, "standard"),
            PredicateSet::Tight => write!(f, "tight"),
        }
    }
}

/// Fully resolved selection-region membership predicate.
///
/// Membership requires, over the blue color `B` and red color `R`:
/// `B > blue_min`, `red_min < R < red_max`, and the wedge
/// `B > wedge_slope * R + wedge_offset`.
#[derive(Debug, Clone, Copy)]
pub struct SelectionRule {
    dropout: DropoutType,
    blue: ColorLabel,
    red: ColorLabel,
    blue_min: f64,
    red_min: f64,
    red_max: f64,
    wedge_slope: f64,
    wedge_offset: f64,
}

impl SelectionRule {
    /// Resolve a dropout type, predicate-set variant, and optional
    /// stricter fourth cut into a concrete inequality set.
    pub fn new(dropout: DropoutType, predicates: PredicateSet, fourth_cut: bool) -> Self {
        let (blue_min, red_min, red_max, wedge_offset) = match (dropout, predicates) {
            (DropoutType::U, PredicateSet::Standard) => (1.5, -1.0, 1.2, 0.75),
            (DropoutType::U, PredicateSet::Tight) => (1.8, -0.3, 1.0, 0.75),
            (DropoutType::G, PredicateSet::Standard) => (1.0, -1.0, 1.0, 0.8),
            (DropoutType::G, PredicateSet::Tight) => (1.3, -0.3, 0.7, 0.8),
        };

        // The fourth cut raises the wedge, trimming the low-redshift
        // interloper corner of the region.
        let wedge_offset = if fourth_cut {
            wedge_offset + 0.45
        } else {
            wedge_offset
        };

        Self {
            dropout,
            blue: dropout.blue_color(),
            red: dropout.red_color(),
            blue_min,
            red_min,
            red_max,
            wedge_slope: 1.5,
            wedge_offset,
        }
    }

    /// The dropout type this rule was resolved for.
    pub fn dropout(&self) -> DropoutType {
        self.dropout
    }

    /// Band whose degraded magnitude gates detection.
    pub fn detection_band(&self) -> Band {
        self.dropout.detection_band()
    }

    /// The two colors this rule evaluates, blue axis first.
    pub fn required_colors(&self) -> [ColorLabel; 2] {
        [self.blue, self.red]
    }

    /// Evaluate region membership. Undefined colors yield `false`; this
    /// never raises.
    pub fn classify(&self, colors: &ColorSet) -> bool {
        let (blue, red) = match (colors.get(self.blue), colors.get(self.red)) {
            (Some(b), Some(r)) => (b, r),
            _ => return false,
        };

        blue > self.blue_min
            && red > self.red_min
            && red < self.red_max
            && blue > self.wedge_slope * red + self.wedge_offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bands::MagnitudeSet;

    fn colors_for(rule: &SelectionRule, blue: Option<f64>, red: Option<f64>) -> ColorSet {
        // Build a magnitude set that realizes the requested colors.
        let [blue_label, red_label] = rule.required_colors();
        let mut mags = MagnitudeSet::new();
        // Anchor the shared band at 24.0 and solve outward.
        mags.set(red_label.blue, Some(24.0));
        mags.set(red_label.red, red.map(|r| 24.0 - r));
        mags.set(blue_label.blue, blue.map(|b| 24.0 + b));
        ColorSet::compute(&mags, &rule.required_colors())
    }

    #[test]
    fn test_unknown_type_is_config_error() {
        let err = "q".parse::<DropoutType>().unwrap_err();
        assert!(matches!(err, ConfigError::UnknownDropoutType(_)));
    }

    #[test]
    fn test_u_drop_region_membership() {
        let rule = SelectionRule::new(DropoutType::U, PredicateSet::Standard, false);

        // Deep break, modest g-r: inside the wedge.
        assert!(rule.classify(&colors_for(&rule, Some(2.0), Some(0.3))));
        // Break too shallow.
        assert!(!rule.classify(&colors_for(&rule, Some(1.2), Some(0.3))));
        // Red color outside the window.
        assert!(!rule.classify(&colors_for(&rule, Some(2.0), Some(1.5))));
        // Inside the window but under the wedge: 1.6 < 1.5*0.8 + 0.75.
        assert!(!rule.classify(&colors_for(&rule, Some(1.6), Some(0.8))));
    }

    #[test]
    fn test_g_drop_region_membership() {
        let rule = SelectionRule::new(DropoutType::G, PredicateSet::Standard, false);

        assert!(rule.classify(&colors_for(&rule, Some(1.6), Some(0.2))));
        assert!(!rule.classify(&colors_for(&rule, Some(0.8), Some(0.2))));
        assert!(!rule.classify(&colors_for(&rule, Some(1.6), Some(1.1))));
    }

    #[test]
    fn test_undefined_colors_never_select() {
        let rule = SelectionRule::new(DropoutType::U, PredicateSet::Standard, false);
        assert!(!rule.classify(&colors_for(&rule, None, Some(0.3))));
        assert!(!rule.classify(&colors_for(&rule, Some(2.0), None)));
        assert!(!rule.classify(&ColorSet::default()));
    }

    #[test]
    fn test_fourth_cut_is_stricter() {
        let base = SelectionRule::new(DropoutType::U, PredicateSet::Standard, false);
        let strict = SelectionRule::new(DropoutType::U, PredicateSet::Standard, true);

        // Just above the standard wedge at red = 0.6:
        // 1.5*0.6 + 0.75 = 1.65 < 1.7 < 2.1 = 1.5*0.6 + 1.2.
        let colors = colors_for(&base, Some(1.7), Some(0.6));
        assert!(base.classify(&colors));
        assert!(!strict.classify(&colors));
    }

    #[test]
    fn test_tight_variant_is_subset_of_standard() {
        let standard = SelectionRule::new(DropoutType::G, PredicateSet::Standard, false);
        let tight = SelectionRule::new(DropoutType::G, PredicateSet::Tight, false);

        for blue_step in 0..30 {
            for red_step in 0..30 {
                let blue = -0.5 + 0.12 * blue_step as f64;
                let red = -1.2 + 0.08 * red_step as f64;
                let colors = colors_for(&standard, Some(blue), Some(red));
                if tight.classify(&colors) {
                    assert!(
                        standard.classify(&colors),
                        "tight selected ({blue}, {red}) but standard did not"
                    );
                }
            }
        }
    }

    #[test]
    fn test_classification_is_pure() {
        let rule = SelectionRule::new(DropoutType::U, PredicateSet::Standard, false);
        let colors = colors_for(&rule, Some(2.0), Some(0.3));
        let first = rule.classify(&colors);
        for _ in 0..10 {
            assert_eq!(rule.classify(&colors), first);
        }
    }
}
