// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Query Operation Model
//!
//! A parsed filter predicate as a closed tree of operators. The tree is
//! immutable once built; negation is resolved on the fly through
//! [`QueryOperation::invert`] instead of rewriting the tree.
//!
//! ```text
//! {age: {$gt: 5}, name: "Alice"}
//!     ↓ QueryParser
//! And([GreaterThan(age, 5), Equals(name, "Alice")])
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::bson_type::BsonType;

/// Parsed predicate tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum QueryOperation {
    Equals { field_name: String, value: Value },
    NotEquals { field_name: String, value: Value },
    GreaterThan { field_name: String, value: Value },
    GreaterThanEquals { field_name: String, value: Value },
    LessThan { field_name: String, value: Value },
    LessThanEquals { field_name: String, value: Value },

    And { conditions: Vec<QueryOperation> },
    Or { conditions: Vec<QueryOperation> },
    Nor { conditions: Vec<QueryOperation> },
    /// `field_name` is the field the wrapped condition inspects
    Not { field_name: String, condition: Box<QueryOperation> },

    In { field_name: String, values: Vec<Value> },
    NotIn { field_name: String, values: Vec<Value> },
    All { field_name: String, values: Vec<Value> },
    InvertedAll { field_name: String, values: Vec<Value> },

    Size { field_name: String, expected_size: i64 },
    InvertedSize { field_name: String, expected_size: i64 },

    ElemMatch { field_name: String, condition: Box<QueryOperation> },
    Exists { field_name: String, expected_presence: bool },

    Mod { field_name: String, divisor: i64, remainder: i64 },
    InvertedMod { field_name: String, divisor: i64, remainder: i64 },

    Type { field_name: String, expected_type: BsonType },
    InvertedType { field_name: String, expected_type: BsonType },

    /// Longitude/latitude in degrees, distances in metres
    NearSphere {
        field_name: String,
        longitude: f64,
        latitude: f64,
        max_distance: Option<f64>,
        min_distance: Option<f64>,
    },
}

impl QueryOperation {
    pub fn equals(field: impl Into<String>, value: Value) -> Self {
        Self::Equals { field_name: field.into(), value }
    }

    pub fn not_equals(field: impl Into<String>, value: Value) -> Self {
        Self::NotEquals { field_name: field.into(), value }
    }

    pub fn greater_than(field: impl Into<String>, value: Value) -> Self {
        Self::GreaterThan { field_name: field.into(), value }
    }

    pub fn greater_than_equals(field: impl Into<String>, value: Value) -> Self {
        Self::GreaterThanEquals { field_name: field.into(), value }
    }

    pub fn less_than(field: impl Into<String>, value: Value) -> Self {
        Self::LessThan { field_name: field.into(), value }
    }

    pub fn less_than_equals(field: impl Into<String>, value: Value) -> Self {
        Self::LessThanEquals { field_name: field.into(), value }
    }

    /// Field inspected by this operation, `None` for boolean composition
    pub fn field_name(&self) -> Option<&str> {
        match self {
            QueryOperation::And { .. } | QueryOperation::Or { .. } | QueryOperation::Nor { .. } => {
                None
            }
            QueryOperation::Equals { field_name, .. }
            | QueryOperation::NotEquals { field_name, .. }
            | QueryOperation::GreaterThan { field_name, .. }
            | QueryOperation::GreaterThanEquals { field_name, .. }
            | QueryOperation::LessThan { field_name, .. }
            | QueryOperation::LessThanEquals { field_name, .. }
            | QueryOperation::Not { field_name, .. }
            | QueryOperation::In { field_name, .. }
            | QueryOperation::NotIn { field_name, .. }
            | QueryOperation::All { field_name, .. }
            | QueryOperation::InvertedAll { field_name, .. }
            | QueryOperation::Size { field_name, .. }
            | QueryOperation::InvertedSize { field_name, .. }
            | QueryOperation::ElemMatch { field_name, .. }
            | QueryOperation::Exists { field_name, .. }
            | QueryOperation::Mod { field_name, .. }
            | QueryOperation::InvertedMod { field_name, .. }
            | QueryOperation::Type { field_name, .. }
            | QueryOperation::InvertedType { field_name, .. }
            | QueryOperation::NearSphere { field_name, .. } => Some(field_name),
        }
    }

    /// Whether this operation has child operations
    pub fn is_leaf(&self) -> bool {
        !matches!(
            self,
            QueryOperation::And { .. }
                | QueryOperation::Or { .. }
                | QueryOperation::Nor { .. }
                | QueryOperation::Not { .. }
                | QueryOperation::ElemMatch { .. }
        )
    }

    /// Logical negation of this operation.
    ///
    /// Each pair is consistent with how the calculator evaluates the other
    /// side (`Or` takes the min, `Nor` sums the negated children), so no
    /// double negation is ever needed. `ElemMatch` and `NearSphere` have no
    /// counterpart and are returned unchanged.
    pub fn invert(&self) -> QueryOperation {
        match self {
            QueryOperation::Equals { field_name, value } => QueryOperation::NotEquals {
                field_name: field_name.clone(),
                value: value.clone(),
            },
            QueryOperation::NotEquals { field_name, value } => QueryOperation::Equals {
                field_name: field_name.clone(),
                value: value.clone(),
            },
            QueryOperation::GreaterThan { field_name, value } => QueryOperation::LessThanEquals {
                field_name: field_name.clone(),
                value: value.clone(),
            },
            QueryOperation::LessThanEquals { field_name, value } => QueryOperation::GreaterThan {
                field_name: field_name.clone(),
                value: value.clone(),
            },
            QueryOperation::GreaterThanEquals { field_name, value } => QueryOperation::LessThan {
                field_name: field_name.clone(),
                value: value.clone(),
            },
            QueryOperation::LessThan { field_name, value } => QueryOperation::GreaterThanEquals {
                field_name: field_name.clone(),
                value: value.clone(),
            },
            QueryOperation::And { conditions } => QueryOperation::Or {
                conditions: conditions.iter().map(QueryOperation::invert).collect(),
            },
            QueryOperation::Or { conditions } => QueryOperation::Nor {
                conditions: conditions.clone(),
            },
            QueryOperation::Nor { conditions } => QueryOperation::Or {
                conditions: conditions.clone(),
            },
            QueryOperation::Not { condition, .. } => condition.as_ref().clone(),
            QueryOperation::In { field_name, values } => QueryOperation::NotIn {
                field_name: field_name.clone(),
                values: values.clone(),
            },
            QueryOperation::NotIn { field_name, values } => QueryOperation::In {
                field_name: field_name.clone(),
                values: values.clone(),
            },
            QueryOperation::All { field_name, values } => QueryOperation::InvertedAll {
                field_name: field_name.clone(),
                values: values.clone(),
            },
            QueryOperation::InvertedAll { field_name, values } => QueryOperation::All {
                field_name: field_name.clone(),
                values: values.clone(),
            },
            QueryOperation::Size { field_name, expected_size } => QueryOperation::InvertedSize {
                field_name: field_name.clone(),
                expected_size: *expected_size,
            },
            QueryOperation::InvertedSize { field_name, expected_size } => QueryOperation::Size {
                field_name: field_name.clone(),
                expected_size: *expected_size,
            },
            QueryOperation::Exists { field_name, expected_presence } => QueryOperation::Exists {
                field_name: field_name.clone(),
                expected_presence: !expected_presence,
            },
            QueryOperation::Mod { field_name, divisor, remainder } => QueryOperation::InvertedMod {
                field_name: field_name.clone(),
                divisor: *divisor,
                remainder: *remainder,
            },
            QueryOperation::InvertedMod { field_name, divisor, remainder } => QueryOperation::Mod {
                field_name: field_name.clone(),
                divisor: *divisor,
                remainder: *remainder,
            },
            QueryOperation::Type { field_name, expected_type } => QueryOperation::InvertedType {
                field_name: field_name.clone(),
                expected_type: *expected_type,
            },
            QueryOperation::InvertedType { field_name, expected_type } => QueryOperation::Type {
                field_name: field_name.clone(),
                expected_type: *expected_type,
            },
            QueryOperation::ElemMatch { .. } | QueryOperation::NearSphere { .. } => self.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_comparison_inversion_pairs() {
        let gt = QueryOperation::greater_than("age", json!(5));
        assert_eq!(gt.invert(), QueryOperation::less_than_equals("age", json!(5)));

        let gte = QueryOperation::greater_than_equals("age", json!(5));
        assert_eq!(gte.invert(), QueryOperation::less_than("age", json!(5)));

        let eq = QueryOperation::equals("age", json!(5));
        assert_eq!(eq.invert(), QueryOperation::not_equals("age", json!(5)));
    }

    #[test]
    fn test_double_inversion_is_identity_for_leaves() {
        let ops = vec![
            QueryOperation::equals("a", json!(1)),
            QueryOperation::less_than("a", json!(1)),
            QueryOperation::In { field_name: "a".into(), values: vec![json!(1)] },
            QueryOperation::Size { field_name: "a".into(), expected_size: 2 },
            QueryOperation::Mod { field_name: "a".into(), divisor: 3, remainder: 1 },
            QueryOperation::Type { field_name: "a".into(), expected_type: BsonType::Int },
            QueryOperation::Exists { field_name: "a".into(), expected_presence: true },
        ];
        for op in ops {
            assert_eq!(op.invert().invert(), op);
        }
    }

    #[test]
    fn test_and_inverts_to_or_of_inverted() {
        let and = QueryOperation::And {
            conditions: vec![
                QueryOperation::greater_than("age", json!(1)),
                QueryOperation::equals("name", json!("x")),
            ],
        };
        assert_eq!(
            and.invert(),
            QueryOperation::Or {
                conditions: vec![
                    QueryOperation::less_than_equals("age", json!(1)),
                    QueryOperation::not_equals("name", json!("x")),
                ],
            }
        );
    }

    #[test]
    fn test_or_nor_swap_keeps_children() {
        let children = vec![QueryOperation::equals("a", json!(1))];
        let or = QueryOperation::Or { conditions: children.clone() };
        assert_eq!(or.invert(), QueryOperation::Nor { conditions: children.clone() });
        let nor = QueryOperation::Nor { conditions: children.clone() };
        assert_eq!(nor.invert(), QueryOperation::Or { conditions: children });
    }

    #[test]
    fn test_not_inverts_to_condition() {
        let inner = QueryOperation::greater_than("age", json!(10));
        let not = QueryOperation::Not {
            field_name: "age".into(),
            condition: Box::new(inner.clone()),
        };
        assert_eq!(not.invert(), inner);
    }

    #[test]
    fn test_field_name_and_leaf() {
        let and = QueryOperation::And { conditions: vec![] };
        assert_eq!(and.field_name(), None);
        assert!(!and.is_leaf());
        let eq = QueryOperation::equals("age", json!(1));
        assert_eq!(eq.field_name(), Some("age"));
        assert!(eq.is_leaf());
    }

    #[test]
    fn test_serialize_tagged() {
        let op = QueryOperation::equals("age", json!(10));
        let value = serde_json::to_value(&op).unwrap();
        assert_eq!(value["op"], "equals");
        assert_eq!(value["field_name"], "age");
        let back: QueryOperation = serde_json::from_value(value).unwrap();
        assert_eq!(back, op);
    }
}
