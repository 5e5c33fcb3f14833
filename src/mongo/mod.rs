// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Mongo-style query heuristics.
//!
//! ```text
//! raw filter (serde_json::Value)
//!        │
//!        ▼
//! ┌──────────────┐   SELECTORS (priority order)
//! │ QueryParser  │── $not $type $mod $all $in $nin $size $elemMatch
//! └──────┬───────┘   $nearSphere $or $nor $and $eq.. $exists implicit
//!        │ QueryOperation
//!        ▼
//! ┌──────────────────────────┐
//! │ MongoHeuristicsCalculator│──► f64 distance (0 = match)
//! └──────────────────────────┘
//!        ▲
//!        │ DocumentView (Root / ElemMatch overlay)
//! document (serde_json::Map)
//! ```

pub mod bson_type;
pub mod calculator;
pub mod document;
pub mod geo;
pub mod operations;
pub mod parser;
pub mod selectors;

pub use bson_type::BsonType;
pub use calculator::MongoHeuristicsCalculator;
pub use document::DocumentView;
pub use operations::QueryOperation;
pub use parser::QueryParser;

/// Distance of a predicate that cannot be satisfied or evaluated
pub const MAX_DISTANCE: f64 = f64::MAX;

/// Distance of a boolean predicate that holds when its negation is wanted
pub const MIN_DISTANCE_TO_TRUE_VALUE: f64 = 1.0;
