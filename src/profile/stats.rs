// ABOUTME: Pace sample statistics used by the profile builder
// ABOUTME: Linear-interpolated percentiles, quartiles, and IQR outlier fences
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Sample statistics for profile building.
//!
//! All helpers take plain `f64` slices, return `None` on empty input, and
//! order NaN-safely via `total_cmp`. Percentiles interpolate linearly
//! between closest ranks.

#![allow(clippy::cast_precision_loss)] // Safe: sample counts stay far below 2^52
#![allow(clippy::cast_possible_truncation)] // Safe: rank indices bounded by slice length
#![allow(clippy::cast_sign_loss)] // Safe: ranks are clamped non-negative

/// Arithmetic mean; `None` for an empty slice
#[must_use]
pub fn mean(samples: &[f64]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    Some(samples.iter().sum::<f64>() / samples.len() as f64)
}

/// Linear-interpolated percentile, `p` in `0..=100`; `None` for an empty slice
#[must_use]
pub fn percentile(samples: &[f64], p: f64) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    let mut sorted = samples.to_vec();
    sorted.sort_by(f64::total_cmp);
    Some(percentile_sorted(&sorted, p))
}

/// First, second, and third quartiles; `None` for an empty slice
#[must_use]
pub fn quartiles(samples: &[f64]) -> Option<(f64, f64, f64)> {
    if samples.is_empty() {
        return None;
    }
    let mut sorted = samples.to_vec();
    sorted.sort_by(f64::total_cmp);
    Some((
        percentile_sorted(&sorted, 25.0),
        percentile_sorted(&sorted, 50.0),
        percentile_sorted(&sorted, 75.0),
    ))
}

/// Keep samples inside the Tukey fences `[Q1 - k*IQR, Q3 + k*IQR]`
///
/// Slices with fewer than four samples pass through unchanged; quartiles of
/// such slices say nothing about outliers.
#[must_use]
pub fn filter_outliers_iqr(samples: &[f64], k: f64) -> Vec<f64> {
    if samples.len() < 4 {
        return samples.to_vec();
    }
    let Some((q1, _, q3)) = quartiles(samples) else {
        return samples.to_vec();
    };
    let iqr = q3 - q1;
    let low = iqr.mul_add(-k, q1);
    let high = iqr.mul_add(k, q3);
    samples
        .iter()
        .copied()
        .filter(|pace| (low..=high).contains(pace))
        .collect()
}

/// Percentile over an already-sorted slice
fn percentile_sorted(sorted: &[f64], p: f64) -> f64 {
    let rank = p.clamp(0.0, 100.0) / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = (lower + 1).min(sorted.len() - 1);
    let weight = rank - rank.floor();
    (sorted[upper] - sorted[lower]).mul_add(weight, sorted[lower])
}
