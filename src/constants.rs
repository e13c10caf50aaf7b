// ABOUTME: Default numeric policy values for segmentation, pace models, fatigue, and personalization
// ABOUTME: Grouped by domain; tunable values seed config defaults, fixed model coefficients are read in place
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Default policy constants based on hiking/trail-running research
//!
//! Tunable values seed the `Default` impls of the config structs in
//! [`crate::config`]; callers that need different policies override the
//! corresponding config field. Fixed model coefficients (the Minetti
//! polynomial, clamp bounds, speed floors) are read directly where runtime
//! configurability has no value. The empirical values (GAP table, fatigue
//! rates, IQR multiplier) were tuned against real activity data and should
//! be recalibrated rather than assumed exact.

/// Geometry and elevation-series processing
pub mod geometry {
    /// Mean Earth radius in kilometers for haversine distances
    pub const EARTH_RADIUS_KM: f64 = 6371.0;

    /// Centered moving-average window for elevation smoothing (samples)
    /// Odd values keep the window symmetric around each point
    pub const DEFAULT_SMOOTHING_WINDOW: usize = 5;
}

/// Macro-segmentation thresholds
pub mod segmentation {
    /// Gradient band around zero treated as flat terrain (percent)
    pub const FLAT_THRESHOLD_PERCENT: f64 = 3.0;

    /// Minimum segment length before a direction reversal may close it (km)
    /// Shorter reversals are GPS jitter and are absorbed into the open segment
    pub const MIN_SEGMENT_KM: f64 = 0.3;
}

/// Gradient category boundaries (percent), `[low, high)` convention
///
/// Seven bands from steep downhill to steep uphill, symmetric around zero.
/// Derived from gradient distributions in trail activity data; the same
/// bands classify both route segments and historical splits so personalized
/// paces line up with prediction-time lookups.
pub mod gradient {
    /// Below this the descent is steep (percent)
    pub const MODERATE_DOWNHILL_BOUND: f64 = -15.0;

    /// Below this the descent is moderate (percent)
    pub const GENTLE_DOWNHILL_BOUND: f64 = -8.0;

    /// Lower edge of the flat band (percent)
    pub const FLAT_LOWER_BOUND: f64 = -3.0;

    /// Upper edge of the flat band (percent)
    pub const FLAT_UPPER_BOUND: f64 = 3.0;

    /// Above this the climb is moderate (percent)
    pub const GENTLE_UPHILL_BOUND: f64 = 8.0;

    /// Above this the climb is steep (percent)
    pub const MODERATE_UPHILL_BOUND: f64 = 15.0;
}

/// Naismith-style additive time rule with Langmuir descent corrections
///
/// References:
/// - Naismith, W. (1892). Scottish Mountaineering Club Journal (1 h per 3 mi + 1 h per 2000 ft)
/// - Langmuir, E. (1984). "Mountaincraft and Leadership" (descent corrections)
pub mod naismith {
    /// Base walking speed on flat ground (km/h)
    pub const BASE_FLAT_SPEED_KMH: f64 = 5.0;

    /// Vertical ascent absorbed per extra hour (m)
    pub const ASCENT_METERS_PER_HOUR: f64 = 600.0;

    /// Langmuir correction: minutes adjusted per descent block
    pub const DESCENT_CORRECTION_MINUTES: f64 = 10.0;

    /// Descent block size the correction applies to (m)
    pub const DESCENT_CORRECTION_BLOCK_M: f64 = 300.0;

    /// Gentle-descent band start where downhill walking speeds up (degrees)
    pub const GENTLE_DESCENT_MIN_DEGREES: f64 = 5.0;

    /// Beyond this descent angle braking slows the walker down (degrees)
    pub const STEEP_DESCENT_DEGREES: f64 = 12.0;
}

/// Tobler's exponential hiking function
///
/// Reference: Tobler, W. (1993). "Three presentations on geographical analysis
/// and modeling", NCGIA Technical Report 93-1
pub mod tobler {
    /// Peak speed coefficient (km/h), reached slightly downhill
    pub const BASE_SPEED_KMH: f64 = 6.0;

    /// Exponential decay rate per unit slope offset
    pub const DECAY_RATE: f64 = 3.5;

    /// Slope of maximum speed; walking is fastest at a -5% grade
    pub const OPTIMAL_SLOPE_OFFSET: f64 = 0.05;
}

/// Grade-adjusted pace model
///
/// References:
/// - Strava GAP model (2017), fitted to large-scale athlete split data
/// - Minetti, A.E. et al. (2002). "Energy cost of walking and running at
///   extreme uphill and downhill slopes", J Appl Physiol 93(3)
pub mod gap {
    /// Empirical pace multipliers by gradient percent, relative to flat pace
    ///
    /// Breakpoints must stay sorted by gradient; lookups interpolate linearly
    /// between neighbors and clamp beyond the extremes.
    pub const EMPIRICAL_TABLE: [(f64, f64); 22] = [
        (-30.0, 1.15),
        (-25.0, 1.05),
        (-20.0, 0.95),
        (-15.0, 0.90),
        (-10.0, 0.88),
        (-9.0, 0.88),
        (-5.0, 0.92),
        (-3.0, 0.96),
        (0.0, 1.00),
        (3.0, 1.08),
        (5.0, 1.15),
        (8.0, 1.28),
        (10.0, 1.38),
        (12.0, 1.50),
        (15.0, 1.70),
        (18.0, 1.95),
        (20.0, 2.15),
        (25.0, 2.70),
        (30.0, 3.30),
        (35.0, 4.00),
        (40.0, 4.80),
        (45.0, 5.70),
    ];

    /// Minetti cost-of-transport polynomial coefficients, degree 5 to 0
    /// C(i) = 155.4i^5 - 30.4i^4 - 43.3i^3 + 46.3i^2 + 19.5i + 3.6 (J/kg/m)
    pub const MINETTI_COEFFICIENTS: [f64; 6] = [155.4, -30.4, -43.3, 46.3, 19.5, 3.6];

    /// Metabolic cost of level running (J/kg/m), the Minetti C(0) term
    pub const FLAT_COST_J_PER_KG_M: f64 = 3.6;

    /// Exponent mapping energy-cost ratio to pace adjustment
    /// Sub-linear because runners recover part of the cost through gait changes
    pub const PACE_ADJUSTMENT_EXPONENT: f64 = 0.75;

    /// Lower clamp on any pace adjustment multiplier
    pub const ADJUSTMENT_MIN: f64 = 0.5;

    /// Upper clamp on any pace adjustment multiplier
    pub const ADJUSTMENT_MAX: f64 = 4.0;

    /// Population-average flat running pace (min/km) used when no profile exists
    pub const DEFAULT_FLAT_PACE_MIN_KM: f64 = 6.0;
}

/// Run/walk threshold policy
///
/// References:
/// - University of Colorado Boulder walking-efficiency studies (walk/run
///   transition on steep grades)
pub mod threshold {
    /// Uphill gradient above which running stops paying off (percent)
    pub const DEFAULT_UPHILL_PERCENT: f64 = 25.0;

    /// Downhill gradient below which terrain is walked as technical (percent)
    pub const DEFAULT_DOWNHILL_PERCENT: f64 = -30.0;

    /// Floor for detected or dynamically lowered thresholds (percent)
    pub const MIN_PERCENT: f64 = 15.0;

    /// Ceiling for detected thresholds (percent)
    pub const MAX_PERCENT: f64 = 35.0;

    /// Pace slower than this counts as walking when classifying splits (min/km)
    pub const WALK_PACE_MIN_KM: f64 = 9.0;

    /// Hours into the effort after which the dynamic cutoff starts dropping
    pub const FATIGUE_ONSET_HOURS: f64 = 2.0;

    /// Dynamic cutoff reduction per hour past onset (percent gradient)
    pub const FATIGUE_REDUCTION_PER_HOUR: f64 = 1.5;

    /// Cap on the fatigue-driven cutoff reduction (percent gradient)
    pub const MAX_FATIGUE_REDUCTION: f64 = 5.0;

    /// Route distance beyond which the ultra reduction applies (km)
    pub const ULTRA_ONSET_KM: f64 = 50.0;

    /// Kilometers past onset per percent of cutoff reduction
    pub const ULTRA_REDUCTION_DIVISOR: f64 = 25.0;

    /// Cap on the ultra-driven cutoff reduction (percent gradient)
    pub const MAX_ULTRA_REDUCTION: f64 = 3.0;

    /// Rough running speed for elapsed-time estimation between decisions (km/h)
    pub const ESTIMATE_RUN_SPEED_KMH: f64 = 9.0;

    /// Rough walking speed for elapsed-time estimation between decisions (km/h)
    pub const ESTIMATE_WALK_SPEED_KMH: f64 = 4.5;

    /// Minimum total splits before threshold detection is attempted
    pub const DETECTION_MIN_SPLITS: usize = 10;

    /// Minimum uphill splits before threshold detection is attempted
    pub const DETECTION_MIN_UPHILL_SPLITS: usize = 5;

    /// Gradient above which a split counts as uphill for detection (percent)
    pub const DETECTION_UPHILL_PERCENT: f64 = 5.0;
}

/// Fatigue degradation policy
///
/// Reference: UTMB pacing study (PMC7578994) - pace decay past roughly two
/// hours of trail running, with descents degrading fastest
pub mod fatigue {
    /// Hours of effort before degradation begins
    pub const THRESHOLD_HOURS: f64 = 2.0;

    /// Linear degradation rate per hour past threshold
    pub const LINEAR_RATE: f64 = 0.05;

    /// Quadratic degradation rate per squared hour past threshold
    pub const QUADRATIC_RATE: f64 = 0.008;

    /// Extra multiplier on fatigued descents (quadriceps braking damage)
    pub const DOWNHILL_MULTIPLIER: f64 = 1.5;

    /// Gradient below which a segment counts as a fatiguing descent (percent)
    pub const DOWNHILL_GRADIENT_CUTOFF: f64 = -5.0;

    /// Route distance where the first degradation escalation applies (km)
    pub const ULTRA_FIRST_KM: f64 = 50.0;

    /// Degradation-excess escalation beyond the first ultra boundary
    pub const ULTRA_FIRST_ESCALATION: f64 = 1.25;

    /// Route distance where the second degradation escalation applies (km)
    pub const ULTRA_SECOND_KM: f64 = 100.0;

    /// Degradation-excess escalation beyond the second ultra boundary
    pub const ULTRA_SECOND_ESCALATION: f64 = 1.5;
}

/// Profile-building policy
pub mod personalization {
    /// Minimum post-filter samples before a category pace is trusted
    pub const MIN_SAMPLES_PER_CATEGORY: usize = 5;

    /// Minimum usable splits before any category is populated
    pub const MIN_SPLITS_FOR_PROFILE: usize = 5;

    /// IQR fence multiplier for outlier exclusion
    /// Samples outside [Q1 - k*IQR, Q3 + k*IQR] are dropped before averaging
    pub const IQR_MULTIPLIER: f64 = 1.5;

    /// Population baseline for the uphill/flat pace ratio
    /// A runner matching this ratio has vertical ability 1.0
    pub const VERTICAL_ABILITY_BASELINE: f64 = 1.5;

    /// Population-average flat walking speed (km/h), Naismith's base rate
    pub const POPULATION_FLAT_SPEED_KMH: f64 = 5.0;

    /// Sane running split pace range; splits outside are sensor noise (min/km)
    pub const RUN_PACE_BOUNDS_MIN_KM: (f64, f64) = (2.5, 15.0);

    /// Sane hiking split pace range; splits outside are sensor noise (min/km)
    pub const HIKE_PACE_BOUNDS_MIN_KM: (f64, f64) = (4.0, 25.0);
}

/// Speed floors preventing degenerate division
pub mod limits {
    /// Absolute floor applied to every computed speed (km/h)
    /// Keeps segment times finite when an upstream bug produces absurd values
    pub const MIN_SPEED_KMH: f64 = 0.1;

    /// Floor applied to additive-rule segment times (hours)
    pub const MIN_SEGMENT_TIME_HOURS: f64 = 1e-6;
}
