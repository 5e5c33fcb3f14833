// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Mongo-style branch distance.
//!
//! Walks a [`QueryOperation`] tree against one document and returns how far
//! the document is from satisfying it. 0 means the document matches; any
//! positive value means it does not, smaller being closer.
//!
//! # Composition
//!
//! ```text
//! And(cs)   sum of children (saturating)
//! Or(cs)    min of children
//! Nor(cs)   sum of inverted children
//! Not(f,c)  0 if f is absent or null, else distance of invert(c)
//! ```

use serde_json::{Map, Value};
use tracing::debug;

use super::bson_type::{object_id_hex, BsonType};
use super::document::DocumentView;
use super::geo::{haversine_distance, point_coordinates};
use super::operations::QueryOperation;
use super::parser::QueryParser;
use super::{MAX_DISTANCE, MIN_DISTANCE_TO_TRUE_VALUE};
use crate::config::HeuristicsConfig;
use crate::metrics;
use crate::string_metric::{add_distances, left_alignment_distance};

#[derive(Debug, Clone, Default)]
pub struct MongoHeuristicsCalculator {
    parser: QueryParser,
    config: HeuristicsConfig,
}

impl MongoHeuristicsCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: HeuristicsConfig) -> Self {
        Self {
            parser: QueryParser::new(),
            config,
        }
    }

    /// Parse `query` and compute its distance against `document`.
    ///
    /// Queries no selector recognises are reported as [`MAX_DISTANCE`].
    pub fn compute_expression(&self, query: &Value, document: &Map<String, Value>) -> f64 {
        let distance = match self.parser.try_parse(query) {
            Ok(operation) => self.calculate_distance(&operation, &DocumentView::new(document)),
            Err(e) => {
                debug!(error = %e, "Reporting maximum distance");
                if self.config.record_metrics {
                    metrics::record_unparseable_query();
                }
                MAX_DISTANCE
            }
        };

        debug!(distance, "Mongo query evaluated");
        if self.config.record_metrics {
            metrics::record_evaluation("mongo", metrics::status_for(distance, MAX_DISTANCE));
        }
        distance
    }

    /// Distance of an already parsed operation against a plain document
    pub fn compute_operation(&self, operation: &QueryOperation, document: &Map<String, Value>) -> f64 {
        self.calculate_distance(operation, &DocumentView::new(document))
    }

    pub fn calculate_distance(&self, operation: &QueryOperation, doc: &DocumentView<'_>) -> f64 {
        match operation {
            QueryOperation::Equals { field_name, value } => match doc.get(field_name) {
                Some(actual) => compare(actual, value).abs(),
                None => MAX_DISTANCE,
            },
            QueryOperation::NotEquals { field_name, value } => match doc.get(field_name) {
                Some(actual) if compare(actual, value) == 0.0 => MIN_DISTANCE_TO_TRUE_VALUE,
                _ => 0.0,
            },
            QueryOperation::GreaterThan { field_name, value } => {
                self.ordering(doc, field_name, value, |d| if d > 0.0 { 0.0 } else { 1.0 - d })
            }
            QueryOperation::GreaterThanEquals { field_name, value } => {
                self.ordering(doc, field_name, value, |d| if d >= 0.0 { 0.0 } else { -d })
            }
            QueryOperation::LessThan { field_name, value } => {
                self.ordering(doc, field_name, value, |d| if d < 0.0 { 0.0 } else { 1.0 + d })
            }
            QueryOperation::LessThanEquals { field_name, value } => {
                self.ordering(doc, field_name, value, |d| if d <= 0.0 { 0.0 } else { d })
            }

            QueryOperation::And { conditions } => conditions
                .iter()
                .map(|c| self.calculate_distance(c, doc))
                .fold(0.0, add_distances),
            QueryOperation::Or { conditions } => conditions
                .iter()
                .map(|c| self.calculate_distance(c, doc))
                .fold(MAX_DISTANCE, f64::min),
            QueryOperation::Nor { conditions } => conditions
                .iter()
                .map(|c| self.calculate_distance(&c.invert(), doc))
                .fold(0.0, add_distances),
            QueryOperation::Not { field_name, condition } => match doc.get(field_name) {
                None | Some(Value::Null) => 0.0,
                Some(_) => self.calculate_distance(&condition.invert(), doc),
            },

            QueryOperation::In { field_name, values } => match doc.get(field_name) {
                Some(Value::Array(items)) => values
                    .iter()
                    .map(|v| distance_to_closest_elem(items, v))
                    .fold(MAX_DISTANCE, f64::min),
                Some(actual) => values
                    .iter()
                    .map(|v| compare(actual, v).abs())
                    .fold(MAX_DISTANCE, f64::min),
                None => MAX_DISTANCE,
            },
            QueryOperation::NotIn { field_name, values } => match doc.get(field_name) {
                Some(Value::Array(items)) if items.iter().any(|i| contains(values, i)) => {
                    MIN_DISTANCE_TO_TRUE_VALUE
                }
                Some(actual) if !actual.is_array() && contains(values, actual) => {
                    MIN_DISTANCE_TO_TRUE_VALUE
                }
                _ => 0.0,
            },
            QueryOperation::All { field_name, values } => match doc.get(field_name) {
                Some(Value::Array(items)) => values
                    .iter()
                    .map(|v| distance_to_closest_elem(items, v))
                    .fold(0.0, add_distances),
                _ => MAX_DISTANCE,
            },
            QueryOperation::InvertedAll { field_name, values } => match doc.get(field_name) {
                Some(Value::Array(items)) if values.iter().all(|v| contains(items, v)) => {
                    MIN_DISTANCE_TO_TRUE_VALUE
                }
                _ => 0.0,
            },

            QueryOperation::Size { field_name, expected_size } => match doc.get(field_name) {
                Some(Value::Array(items)) => (items.len() as i64).abs_diff(*expected_size) as f64,
                _ => MAX_DISTANCE,
            },
            QueryOperation::InvertedSize { field_name, expected_size } => {
                match doc.get(field_name) {
                    Some(Value::Array(items)) if items.len() as i64 == *expected_size => {
                        MIN_DISTANCE_TO_TRUE_VALUE
                    }
                    _ => 0.0,
                }
            }

            QueryOperation::ElemMatch { field_name, condition } => match doc.get(field_name) {
                Some(Value::Array(items)) => items
                    .iter()
                    .map(|item| self.calculate_distance(condition, &doc.overlay(field_name, item)))
                    .fold(MAX_DISTANCE, f64::min),
                _ => MAX_DISTANCE,
            },

            QueryOperation::Exists { field_name, expected_presence: true } => {
                if doc.contains(field_name) {
                    return 0.0;
                }
                doc.keys()
                    .into_iter()
                    .map(|key| left_alignment_distance(key, field_name) as f64)
                    .fold(MAX_DISTANCE, f64::min)
            }
            QueryOperation::Exists { field_name, expected_presence: false } => {
                if doc.contains(field_name) {
                    MIN_DISTANCE_TO_TRUE_VALUE
                } else {
                    0.0
                }
            }

            QueryOperation::Mod { field_name, divisor, remainder } => {
                match doc.get(field_name).and_then(integer_value) {
                    Some(actual) => match actual.checked_rem(*divisor) {
                        Some(r) => r.abs_diff(*remainder) as f64,
                        None => MAX_DISTANCE,
                    },
                    None => MAX_DISTANCE,
                }
            }
            QueryOperation::InvertedMod { field_name, divisor, remainder } => {
                let actual = doc.get(field_name).and_then(integer_value);
                match actual.and_then(|a| a.checked_rem(*divisor)) {
                    Some(r) if r == *remainder => MIN_DISTANCE_TO_TRUE_VALUE,
                    _ => 0.0,
                }
            }

            QueryOperation::Type { field_name, expected_type } => match doc.get(field_name) {
                Some(actual) => {
                    let actual = BsonType::of(actual);
                    if expected_type.matches(actual) {
                        0.0
                    } else {
                        left_alignment_distance(actual.alias(), expected_type.alias()) as f64
                    }
                }
                None => MAX_DISTANCE,
            },
            QueryOperation::InvertedType { field_name, expected_type } => {
                match doc.get(field_name) {
                    Some(actual) if expected_type.matches(BsonType::of(actual)) => {
                        MIN_DISTANCE_TO_TRUE_VALUE
                    }
                    _ => 0.0,
                }
            }

            QueryOperation::NearSphere {
                field_name,
                longitude,
                latitude,
                max_distance,
                min_distance,
            } => {
                let Some((lon, lat)) = doc.get(field_name).and_then(point_coordinates) else {
                    return MAX_DISTANCE;
                };
                let distance = haversine_distance(lon, lat, *longitude, *latitude);
                let min = min_distance.unwrap_or(0.0);
                let max = max_distance.unwrap_or(MAX_DISTANCE);
                if distance > max {
                    distance - max
                } else if distance < min {
                    min - distance
                } else {
                    0.0
                }
            }
        }
    }

    fn ordering(
        &self,
        doc: &DocumentView<'_>,
        field_name: &str,
        expected: &Value,
        score: impl Fn(f64) -> f64,
    ) -> f64 {
        let Some(actual) = doc.get(field_name) else {
            return MAX_DISTANCE;
        };
        let d = compare(actual, expected);
        if d == MAX_DISTANCE {
            return MAX_DISTANCE;
        }
        score(d)
    }
}

/// Signed difference between two stored values.
///
/// Numbers subtract; strings and ObjectIds use the left-alignment distance;
/// booleans are 0/1. Structured values are 0 when equal. Any other pairing
/// is incomparable and yields [`MAX_DISTANCE`].
fn compare(actual: &Value, expected: &Value) -> f64 {
    if let (Some(a), Some(b)) = (numeric_value(actual), numeric_value(expected)) {
        let d = a - b;
        return if d.is_finite() { d } else { MAX_DISTANCE };
    }
    if let (Some(a), Some(b)) = (string_value(actual), string_value(expected)) {
        return left_alignment_distance(a, b) as f64;
    }
    match (actual, expected) {
        (Value::Bool(a), Value::Bool(b)) => {
            if a == b {
                0.0
            } else {
                1.0
            }
        }
        (Value::Null, Value::Null) => 0.0,
        (Value::Array(_), Value::Array(_)) | (Value::Object(_), Value::Object(_))
            if actual == expected =>
        {
            0.0
        }
        _ => MAX_DISTANCE,
    }
}

fn numeric_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::Object(map) if map.len() == 1 => {
            let (key, raw) = map.iter().next()?;
            match key.as_str() {
                "$numberInt" | "$numberLong" | "$numberDouble" | "$numberDecimal" => {
                    raw.as_str()?.parse().ok()
                }
                _ => None,
            }
        }
        _ => None,
    }
}

fn integer_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::Object(map) if map.len() == 1 => {
            let raw = map.get("$numberInt").or_else(|| map.get("$numberLong"))?;
            raw.as_str()?.parse().ok()
        }
        _ => None,
    }
}

fn string_value(value: &Value) -> Option<&str> {
    match value {
        Value::String(s) => Some(s),
        _ => object_id_hex(value),
    }
}

fn distance_to_closest_elem(items: &[Value], target: &Value) -> f64 {
    items
        .iter()
        .map(|item| compare(item, target).abs())
        .fold(MAX_DISTANCE, f64::min)
}

fn contains(items: &[Value], target: &Value) -> bool {
    items.iter().any(|item| compare(item, target) == 0.0)
}
