// ABOUTME: Seven-band gradient classification with configurable boundaries
// ABOUTME: Maps a gradient percentage onto the category grid shared by profiles and predictions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use serde::{Deserialize, Serialize};

use crate::constants::gradient as defaults;
use crate::errors::{EngineError, EngineResult};

/// Terrain steepness category
///
/// Seven fixed bands spanning the whole gradient axis. Historical splits and
/// predicted segments are classified with the same bands, so a personalized
/// pace learned in one band is looked up for exactly that band later.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum GradientCategory {
    /// Steeper than the moderate-downhill edge
    SteepDownhill,
    /// Pronounced but controlled descent
    ModerateDownhill,
    /// Mild descent
    GentleDownhill,
    /// Level band around zero
    Flat,
    /// Mild climb
    GentleUphill,
    /// Pronounced climb
    ModerateUphill,
    /// Steeper than the moderate-uphill edge
    SteepUphill,
}

impl GradientCategory {
    /// All categories ordered from steepest descent to steepest climb
    pub const ALL: [Self; 7] = [
        Self::SteepDownhill,
        Self::ModerateDownhill,
        Self::GentleDownhill,
        Self::Flat,
        Self::GentleUphill,
        Self::ModerateUphill,
        Self::SteepUphill,
    ];

    /// Stable snake_case name
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::SteepDownhill => "steep_downhill",
            Self::ModerateDownhill => "moderate_downhill",
            Self::GentleDownhill => "gentle_downhill",
            Self::Flat => "flat",
            Self::GentleUphill => "gentle_uphill",
            Self::ModerateUphill => "moderate_uphill",
            Self::SteepUphill => "steep_uphill",
        }
    }

    /// True for the three descent bands
    #[must_use]
    pub const fn is_downhill(&self) -> bool {
        matches!(
            self,
            Self::SteepDownhill | Self::ModerateDownhill | Self::GentleDownhill
        )
    }

    /// True for the three climb bands
    #[must_use]
    pub const fn is_uphill(&self) -> bool {
        matches!(
            self,
            Self::GentleUphill | Self::ModerateUphill | Self::SteepUphill
        )
    }

    /// Gradient range `[low, high)` this category covers under the given bands
    ///
    /// The outermost categories are open-ended toward their infinity.
    #[must_use]
    pub const fn bounds(&self, bands: &GradientBands) -> (f64, f64) {
        match self {
            Self::SteepDownhill => (f64::NEG_INFINITY, bands.steep_downhill_max),
            Self::ModerateDownhill => (bands.steep_downhill_max, bands.moderate_downhill_max),
            Self::GentleDownhill => (bands.moderate_downhill_max, bands.gentle_downhill_max),
            Self::Flat => (bands.gentle_downhill_max, bands.flat_max),
            Self::GentleUphill => (bands.flat_max, bands.gentle_uphill_max),
            Self::ModerateUphill => (bands.gentle_uphill_max, bands.moderate_uphill_max),
            Self::SteepUphill => (bands.moderate_uphill_max, f64::INFINITY),
        }
    }
}

impl std::fmt::Display for GradientCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Interior band edges in percent, `[low, high)` on every band
///
/// Each field is the exclusive upper edge of the named category; the next
/// category starts there. `SteepUphill` is open-ended above
/// `moderate_uphill_max`, `SteepDownhill` below `steep_downhill_max`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientBands {
    /// Upper edge of steep downhill (percent)
    pub steep_downhill_max: f64,
    /// Upper edge of moderate downhill (percent)
    pub moderate_downhill_max: f64,
    /// Upper edge of gentle downhill, lower edge of flat (percent)
    pub gentle_downhill_max: f64,
    /// Upper edge of flat, lower edge of gentle uphill (percent)
    pub flat_max: f64,
    /// Upper edge of gentle uphill (percent)
    pub gentle_uphill_max: f64,
    /// Upper edge of moderate uphill (percent)
    pub moderate_uphill_max: f64,
}

impl Default for GradientBands {
    fn default() -> Self {
        Self {
            steep_downhill_max: defaults::MODERATE_DOWNHILL_BOUND,
            moderate_downhill_max: defaults::GENTLE_DOWNHILL_BOUND,
            gentle_downhill_max: defaults::FLAT_LOWER_BOUND,
            flat_max: defaults::FLAT_UPPER_BOUND,
            gentle_uphill_max: defaults::GENTLE_UPHILL_BOUND,
            moderate_uphill_max: defaults::MODERATE_UPHILL_BOUND,
        }
    }
}

impl GradientBands {
    /// Build a validated band set from the six interior edges
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidConfig` if the edges are not strictly
    /// increasing or the flat band does not contain zero.
    pub fn new(edges: [f64; 6]) -> EngineResult<Self> {
        let bands = Self {
            steep_downhill_max: edges[0],
            moderate_downhill_max: edges[1],
            gentle_downhill_max: edges[2],
            flat_max: edges[3],
            gentle_uphill_max: edges[4],
            moderate_uphill_max: edges[5],
        };
        bands.validate()?;
        Ok(bands)
    }

    /// Check ordering and flat-band invariants
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidConfig` when an invariant is violated.
    pub fn validate(&self) -> EngineResult<()> {
        let edges = self.edges();
        if edges.iter().any(|e| !e.is_finite()) {
            return Err(EngineError::invalid_config(
                "gradient_bands",
                "band edges must be finite",
            ));
        }
        if edges.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(EngineError::invalid_config(
                "gradient_bands",
                format!("band edges must be strictly increasing, got {edges:?}"),
            ));
        }
        if self.gentle_downhill_max > 0.0 || self.flat_max <= 0.0 {
            return Err(EngineError::invalid_config(
                "gradient_bands",
                format!(
                    "flat band [{}, {}) must contain zero",
                    self.gentle_downhill_max, self.flat_max
                ),
            ));
        }
        Ok(())
    }

    /// Classify a gradient percentage into its category
    ///
    /// Total over the real line: bands are `[low, high)`, and the outermost
    /// categories absorb everything beyond the interior edges, so extreme or
    /// out-of-calibration gradients still classify.
    #[must_use]
    pub fn classify(&self, gradient_percent: f64) -> GradientCategory {
        if gradient_percent < self.steep_downhill_max {
            GradientCategory::SteepDownhill
        } else if gradient_percent < self.moderate_downhill_max {
            GradientCategory::ModerateDownhill
        } else if gradient_percent < self.gentle_downhill_max {
            GradientCategory::GentleDownhill
        } else if gradient_percent < self.flat_max {
            GradientCategory::Flat
        } else if gradient_percent < self.gentle_uphill_max {
            GradientCategory::GentleUphill
        } else if gradient_percent < self.moderate_uphill_max {
            GradientCategory::ModerateUphill
        } else {
            GradientCategory::SteepUphill
        }
    }

    /// The six interior edges in ascending order
    #[must_use]
    pub const fn edges(&self) -> [f64; 6] {
        [
            self.steep_downhill_max,
            self.moderate_downhill_max,
            self.gentle_downhill_max,
            self.flat_max,
            self.gentle_uphill_max,
            self.moderate_uphill_max,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_bands_are_valid() {
        assert!(GradientBands::default().validate().is_ok());
    }

    #[test]
    fn classifies_band_interiors() {
        let bands = GradientBands::default();
        assert_eq!(bands.classify(-40.0), GradientCategory::SteepDownhill);
        assert_eq!(bands.classify(-10.0), GradientCategory::ModerateDownhill);
        assert_eq!(bands.classify(-5.0), GradientCategory::GentleDownhill);
        assert_eq!(bands.classify(0.0), GradientCategory::Flat);
        assert_eq!(bands.classify(5.0), GradientCategory::GentleUphill);
        assert_eq!(bands.classify(10.0), GradientCategory::ModerateUphill);
        assert_eq!(bands.classify(40.0), GradientCategory::SteepUphill);
    }

    #[test]
    fn boundaries_belong_to_the_upper_band() {
        let bands = GradientBands::default();
        // [low, high): an exact edge value falls into the band above it
        assert_eq!(bands.classify(-15.0), GradientCategory::ModerateDownhill);
        assert_eq!(bands.classify(-3.0), GradientCategory::Flat);
        assert_eq!(bands.classify(3.0), GradientCategory::GentleUphill);
        assert_eq!(bands.classify(15.0), GradientCategory::SteepUphill);
    }

    #[test]
    fn extreme_gradients_still_classify() {
        let bands = GradientBands::default();
        assert_eq!(bands.classify(-1000.0), GradientCategory::SteepDownhill);
        assert_eq!(bands.classify(1000.0), GradientCategory::SteepUphill);
    }

    #[test]
    fn bounds_round_trip_through_classify() {
        let bands = GradientBands::default();
        for category in GradientCategory::ALL {
            let (low, high) = category.bounds(&bands);
            let probe = if low.is_infinite() {
                high - 1.0
            } else if high.is_infinite() {
                low + 1.0
            } else {
                f64::midpoint(low, high)
            };
            assert_eq!(bands.classify(probe), category, "probe {probe} for {category}");
        }
    }

    #[test]
    fn rejects_unordered_edges() {
        let result = GradientBands::new([-15.0, -8.0, -3.0, 3.0, 15.0, 8.0]);
        assert!(matches!(
            result,
            Err(EngineError::InvalidConfig { parameter, .. }) if parameter == "gradient_bands"
        ));
    }

    #[test]
    fn rejects_flat_band_missing_zero() {
        let result = GradientBands::new([-15.0, -8.0, 1.0, 3.0, 8.0, 15.0]);
        assert!(result.is_err(), "flat band [1, 3) excludes zero");
    }
}
