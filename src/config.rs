// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Configuration for the heuristics calculators.
//!
//! # Example
//!
//! ```
//! use query_heuristics::HeuristicsConfig;
//!
//! // Minimal config (uses defaults)
//! let config = HeuristicsConfig::default();
//! assert_eq!(config.redis_worst_case_distance, 1.0);
//!
//! // Partial override from JSON
//! let config: HeuristicsConfig =
//!     serde_json::from_str(r#"{ "max_repetition_unroll": 8 }"#).unwrap();
//! assert_eq!(config.max_repetition_unroll, 8);
//! assert!(config.unique_warnings);
//! ```

use serde::Deserialize;

/// Configuration for the heuristics engine.
///
/// All fields have defaults matching the reference scale that the search
/// algorithm expects, so most callers only use `HeuristicsConfig::default()`.
#[derive(Debug, Clone, Deserialize)]
pub struct HeuristicsConfig {
    /// Distance returned by the Redis calculator when no gradient exists (default: 1.0)
    #[serde(default = "default_redis_worst_case_distance")]
    pub redis_worst_case_distance: f64,

    /// Counted regex repetitions (`x{n,m}`) above this bound are treated as unbounded
    #[serde(default = "default_max_repetition_unroll")]
    pub max_repetition_unroll: u32,

    /// Deduplicate recoverable-failure warnings by message
    #[serde(default = "default_unique_warnings")]
    pub unique_warnings: bool,

    /// Emit `metrics` counters and histograms for each evaluation
    #[serde(default = "default_record_metrics")]
    pub record_metrics: bool,
}

fn default_redis_worst_case_distance() -> f64 { 1.0 }
fn default_max_repetition_unroll() -> u32 { 32 }
fn default_unique_warnings() -> bool { true }
fn default_record_metrics() -> bool { true }

impl Default for HeuristicsConfig {
    fn default() -> Self {
        Self {
            redis_worst_case_distance: default_redis_worst_case_distance(),
            max_repetition_unroll: default_max_repetition_unroll(),
            unique_warnings: default_unique_warnings(),
            record_metrics: default_record_metrics(),
        }
    }
}
