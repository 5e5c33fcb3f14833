// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! String and pattern distance primitives.
//!
//! Shared by both calculators:
//!
//! ```text
//! left_alignment_distance   - edit-like distance between two strings
//! glob_to_regex             - Redis glob (KEYS pattern) -> anchored regex
//! RegexDistance             - edit distance from a string to a regex language
//! normalize / add_distances - scale helpers
//! ```

mod glob;
mod regex_distance;

pub use glob::glob_to_regex;
pub use regex_distance::{regex_match_distance, RegexDistance, DEFAULT_MAX_UNROLL};

/// Max distance for a single char (2^16), charged per unmatched position
pub const MAX_CHAR_DISTANCE: u64 = 65_536;

/// Distance between two strings aligned on their first character.
///
/// Each position of the common prefix costs the absolute code point
/// difference, each extra char in the longer string costs
/// [`MAX_CHAR_DISTANCE`]. Saturates instead of overflowing.
pub fn left_alignment_distance(a: &str, b: &str) -> u64 {
    let len_a = a.chars().count() as u64;
    let len_b = b.chars().count() as u64;
    let mut dist = len_a.abs_diff(len_b).saturating_mul(MAX_CHAR_DISTANCE);

    for (ca, cb) in a.chars().zip(b.chars()) {
        dist = dist.saturating_add((ca as u32).abs_diff(cb as u32) as u64);
    }
    dist
}

/// Map a non-negative distance into `[0, 1]` with `d / (d + 1)`.
///
/// Infinite or NaN inputs map to 1.0.
pub fn normalize(distance: f64) -> f64 {
    if distance.is_nan() || distance.is_infinite() || distance >= f64::MAX {
        return 1.0;
    }
    let d = distance.max(0.0);
    d / (d + 1.0)
}

/// Add two non-negative distances, saturating at `f64::MAX`
pub fn add_distances(a: f64, b: f64) -> f64 {
    let sum = a + b;
    if sum.is_infinite() || sum.is_nan() || sum > f64::MAX {
        f64::MAX
    } else {
        sum
    }
}
