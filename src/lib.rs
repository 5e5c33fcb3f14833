// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! # Query Heuristics
//!
//! Branch-distance heuristics for data-store queries, used as fitness by a
//! search-based test generator. Given a query and the data it runs against,
//! the engine answers "how far is this data from satisfying the query?".
//! 0 means satisfied; smaller is closer.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Mongo-style path                       │
//! │  • QueryParser: filter document → QueryOperation tree       │
//! │  • Selector registry tried in fixed priority order          │
//! │  • MongoHeuristicsCalculator: tree × document → f64         │
//! └─────────────────────────────────────────────────────────────┘
//!
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         Redis path                          │
//! │  • RedisCommand: keyword + unwrapped arguments              │
//! │  • RedisSnapshot: point-in-time hash fields / set members   │
//! │  • RedisHeuristicsCalculator: → distance in [0, 1] + keys   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   String metric primitives                  │
//! │  • Left-alignment distance, normalisation                   │
//! │  • Redis glob → regex, regex-match edit distance            │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use query_heuristics::{MongoHeuristicsCalculator, RedisCommand, RedisHeuristicsCalculator, RedisSnapshot};
//! use serde_json::json;
//!
//! let mongo = MongoHeuristicsCalculator::new();
//! let doc = json!({"age": 10});
//! let distance = mongo.compute_expression(&json!({"age": {"$gt": 13}}), doc.as_object().unwrap());
//! assert_eq!(distance, 4.0);
//!
//! let redis = RedisHeuristicsCalculator::new();
//! let snapshot = RedisSnapshot::new().with_set("user:1", ["a"]);
//! let result = redis.compute_distance(&RedisCommand::parse("KEYS", ["key<user*>"]), &snapshot);
//! assert_eq!(result.distance, 0.0);
//! ```
//!
//! ## Modules
//!
//! - [`mongo`]: operation model, parser, document view, calculator
//! - [`redis`]: command model, snapshot, calculator
//! - [`string_metric`]: distance primitives shared by both paths
//! - [`config`]: [`HeuristicsConfig`]
//! - [`error`]: [`HeuristicsError`]
//! - [`logging`]: deduplicated warnings
//! - [`metrics`]: evaluation counters

pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod mongo;
pub mod redis;
pub mod string_metric;

// Note: no `tracing` module, to avoid clashing with the tracing crate

pub use config::HeuristicsConfig;
pub use error::{HeuristicsError, Result};
pub use mongo::{
    BsonType, DocumentView, MongoHeuristicsCalculator, QueryOperation, QueryParser, MAX_DISTANCE,
    MIN_DISTANCE_TO_TRUE_VALUE,
};
pub use redis::{
    DistanceWithMetrics, RedisCommand, RedisCommandType, RedisHeuristicsCalculator, RedisSnapshot,
    RedisValueData, RedisValueType, WORST_CASE_DISTANCE,
};
pub use string_metric::{
    glob_to_regex, left_alignment_distance, normalize, regex_match_distance, MAX_CHAR_DISTANCE,
};
