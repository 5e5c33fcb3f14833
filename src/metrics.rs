// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Metrics instrumentation for the heuristics engine.
//!
//! Uses the `metrics` crate for backend-agnostic metrics collection.
//! The embedding process chooses the exporter (Prometheus, OTEL, etc.)
//!
//! # Metric Naming Convention
//! - `query_heuristics_` prefix for all metrics
//! - `_total` suffix for counters
//!
//! # Labels
//! - `engine`: mongo, redis
//! - `status`: solved, unsolved, worst_case

use metrics::{counter, histogram};

/// Outcome label for a single distance computation
pub fn status_for(distance: f64, worst_case: f64) -> &'static str {
    if distance == 0.0 {
        "solved"
    } else if distance >= worst_case {
        "worst_case"
    } else {
        "unsolved"
    }
}

/// Record one distance evaluation
pub fn record_evaluation(engine: &str, status: &str) {
    counter!(
        "query_heuristics_evaluations_total",
        "engine" => engine.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record how many stored keys a Redis evaluation compared against
pub fn record_evaluated_keys(command: &str, count: usize) {
    histogram!(
        "query_heuristics_evaluated_keys",
        "command" => command.to_string()
    )
    .record(count as f64);
}

/// Record a predicate that no selector recognised
pub fn record_unparseable_query() {
    counter!("query_heuristics_unparseable_queries_total").increment(1);
}
