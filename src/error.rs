// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Error taxonomy for the heuristics engine.
//!
//! None of these errors escape the public calculators: the Mongo path turns
//! them into [`MAX_DISTANCE`](crate::mongo::MAX_DISTANCE) and the Redis path
//! into the configured worst-case distance.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum HeuristicsError {
    #[error("Unsupported query shape: {0}")]
    UnsupportedQuery(String),
    #[error("Malformed glob pattern '{pattern}': {reason}")]
    MalformedGlob { pattern: String, reason: String },
    #[error("Invalid regex '{regex}': {reason}")]
    InvalidRegex { regex: String, reason: String },
    #[error("Missing argument #{index} for {command}")]
    MissingArgument { command: String, index: usize },
    #[error("Key '{key}' does not hold a {expected}")]
    WrongType { key: String, expected: String },
}

impl HeuristicsError {
    /// Returns true if the error comes from pattern translation or compilation
    pub fn is_pattern_error(&self) -> bool {
        matches!(
            self,
            HeuristicsError::MalformedGlob { .. } | HeuristicsError::InvalidRegex { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, HeuristicsError>;
