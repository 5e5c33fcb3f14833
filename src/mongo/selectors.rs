// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Operator selectors.
//!
//! Each selector recognises one query shape and builds the matching
//! [`QueryOperation`]. The parser tries them in [`SELECTORS`] order and
//! keeps the first hit, so specific operator shapes are listed before the
//! implicit-equality catch-all.
//!
//! # Shapes
//!
//! ```text
//! field operators   {field: {$op: arg}}           $not $type $mod $all $in $nin
//!                                                  $size $elemMatch $eq $ne $gt
//!                                                  $gte $lt $lte $exists
//! geo               {field: {$nearSphere: .., $maxDistance: .., $minDistance: ..}}
//! logical           {$op: [query, ...]}           $or $nor $and
//! implicit          {field: value, ...}
//! ```

use std::sync::LazyLock;

use serde_json::{Map, Value};

use super::bson_type::BsonType;
use super::geo::{point_coordinates, EARTH_RADIUS_METERS};
use super::operations::QueryOperation;
use super::parser::QueryParser;

/// Recognises one query shape.
pub trait QuerySelector: Send + Sync {
    /// Operator keyword this selector handles, for logging
    fn name(&self) -> &'static str;

    /// Build the operation if `query` has this selector's shape
    fn select(&self, query: &Map<String, Value>, parser: &QueryParser) -> Option<QueryOperation>;
}

type FieldBuilder = fn(&str, &Value, &QueryParser) -> Option<QueryOperation>;

/// `{field: {$op: arg}}`
struct FieldOperatorSelector {
    operator: &'static str,
    build: FieldBuilder,
}

impl QuerySelector for FieldOperatorSelector {
    fn name(&self) -> &'static str {
        self.operator
    }

    fn select(&self, query: &Map<String, Value>, parser: &QueryParser) -> Option<QueryOperation> {
        let (field, body) = single_entry(query)?;
        if field.starts_with('$') {
            return None;
        }
        let (operator, arg) = single_entry(body.as_object()?)?;
        if operator != self.operator {
            return None;
        }
        (self.build)(field, arg, parser)
    }
}

/// `{$op: [query, ...]}`
struct LogicalSelector {
    operator: &'static str,
    build: fn(Vec<QueryOperation>) -> QueryOperation,
}

impl QuerySelector for LogicalSelector {
    fn name(&self) -> &'static str {
        self.operator
    }

    fn select(&self, query: &Map<String, Value>, parser: &QueryParser) -> Option<QueryOperation> {
        let (operator, arg) = single_entry(query)?;
        if operator != self.operator {
            return None;
        }
        let items = arg.as_array()?;
        if items.is_empty() {
            return None;
        }
        let conditions = items
            .iter()
            .map(|item| parser.parse(item))
            .collect::<Option<Vec<_>>>()?;
        Some((self.build)(conditions))
    }
}

/// `{field: {$nearSphere: point, $maxDistance: m, $minDistance: m}}`
///
/// The point is either GeoJSON (`{$geometry: {type: "Point", ...}}`, metres)
/// or a legacy pair (`[lng, lat]`, radians converted to metres).
struct NearSphereSelector;

impl QuerySelector for NearSphereSelector {
    fn name(&self) -> &'static str {
        "$nearSphere"
    }

    fn select(&self, query: &Map<String, Value>, _parser: &QueryParser) -> Option<QueryOperation> {
        let (field, body) = single_entry(query)?;
        if field.starts_with('$') {
            return None;
        }
        let body = body.as_object()?;
        let near = body.get("$nearSphere")?;
        if body
            .keys()
            .any(|k| !matches!(k.as_str(), "$nearSphere" | "$maxDistance" | "$minDistance"))
        {
            return None;
        }

        let (point, nested_bounds, scale) = match near {
            Value::Object(options) => (options.get("$geometry")?, Some(options), 1.0),
            Value::Array(_) => (near, None, EARTH_RADIUS_METERS),
            _ => return None,
        };
        let (longitude, latitude) = point_coordinates(point)?;

        let bound = |key: &str| -> Option<Option<f64>> {
            let raw = nested_bounds
                .and_then(|options| options.get(key))
                .or_else(|| body.get(key));
            match raw {
                None | Some(Value::Null) => Some(None),
                Some(v) => v.as_f64().map(|d| Some(d * scale)),
            }
        };

        Some(QueryOperation::NearSphere {
            field_name: field.clone(),
            longitude,
            latitude,
            max_distance: bound("$maxDistance")?,
            min_distance: bound("$minDistance")?,
        })
    }
}

/// Equality by juxtaposition, plus conjunction of sibling keys and of
/// several operators on one field.
struct ImplicitSelector;

impl QuerySelector for ImplicitSelector {
    fn name(&self) -> &'static str {
        "implicit"
    }

    fn select(&self, query: &Map<String, Value>, parser: &QueryParser) -> Option<QueryOperation> {
        if query.len() > 1 {
            let conditions = query
                .iter()
                .map(|(k, v)| parser.parse_entry(k, v))
                .collect::<Option<Vec<_>>>()?;
            return Some(QueryOperation::And { conditions });
        }

        let (field, value) = single_entry(query)?;
        if field.starts_with('$') {
            return None;
        }

        if let Value::Object(body) = value {
            let operator_keys = body.keys().filter(|k| k.starts_with('$')).count();
            if operator_keys > 0 && operator_keys == body.len() {
                // A single unknown operator is unsupported; several known
                // ones on one field are a conjunction.
                if body.len() == 1 {
                    return None;
                }
                let conditions = body
                    .iter()
                    .map(|(op, arg)| {
                        let mut inner = Map::new();
                        inner.insert(op.clone(), arg.clone());
                        parser.parse_entry(field, &Value::Object(inner))
                    })
                    .collect::<Option<Vec<_>>>()?;
                return Some(QueryOperation::And { conditions });
            }
        }

        Some(QueryOperation::Equals {
            field_name: field.clone(),
            value: value.clone(),
        })
    }
}

fn single_entry(map: &Map<String, Value>) -> Option<(&String, &Value)> {
    if map.len() != 1 {
        return None;
    }
    map.iter().next()
}

fn values(arg: &Value) -> Option<Vec<Value>> {
    arg.as_array().cloned()
}

/// Integral argument; doubles are truncated like the server does
fn integer(arg: &Value) -> Option<i64> {
    arg.as_i64().or_else(|| arg.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
}

fn build_not(field: &str, arg: &Value, parser: &QueryParser) -> Option<QueryOperation> {
    if !arg.is_object() {
        return None;
    }
    let condition = parser.parse_entry(field, arg)?;
    Some(QueryOperation::Not {
        field_name: field.to_string(),
        condition: Box::new(condition),
    })
}

fn build_type(field: &str, arg: &Value, _: &QueryParser) -> Option<QueryOperation> {
    Some(QueryOperation::Type {
        field_name: field.to_string(),
        expected_type: BsonType::from_query_value(arg)?,
    })
}

fn build_mod(field: &str, arg: &Value, _: &QueryParser) -> Option<QueryOperation> {
    match arg.as_array()?.as_slice() {
        [divisor, remainder] => Some(QueryOperation::Mod {
            field_name: field.to_string(),
            divisor: integer(divisor)?,
            remainder: integer(remainder)?,
        }),
        _ => None,
    }
}

fn build_all(field: &str, arg: &Value, _: &QueryParser) -> Option<QueryOperation> {
    Some(QueryOperation::All {
        field_name: field.to_string(),
        values: values(arg)?,
    })
}

fn build_in(field: &str, arg: &Value, _: &QueryParser) -> Option<QueryOperation> {
    Some(QueryOperation::In {
        field_name: field.to_string(),
        values: values(arg)?,
    })
}

fn build_not_in(field: &str, arg: &Value, _: &QueryParser) -> Option<QueryOperation> {
    Some(QueryOperation::NotIn {
        field_name: field.to_string(),
        values: values(arg)?,
    })
}

fn build_size(field: &str, arg: &Value, _: &QueryParser) -> Option<QueryOperation> {
    Some(QueryOperation::Size {
        field_name: field.to_string(),
        expected_size: integer(arg)?,
    })
}

/// Accepts both `{$elemMatch: {field: cond}}` and the operator-only body
/// `{$elemMatch: {$gt: 1}}`, which applies to the element itself.
fn build_elem_match(field: &str, arg: &Value, parser: &QueryParser) -> Option<QueryOperation> {
    let body = arg.as_object()?;
    if body.is_empty() {
        return None;
    }
    let condition = if body.keys().all(|k| k.starts_with('$')) && !is_logical(body) {
        parser.parse_entry(field, arg)?
    } else {
        parser.parse(arg)?
    };
    Some(QueryOperation::ElemMatch {
        field_name: field.to_string(),
        condition: Box::new(condition),
    })
}

fn is_logical(body: &Map<String, Value>) -> bool {
    body.keys()
        .all(|k| matches!(k.as_str(), "$and" | "$or" | "$nor"))
}

fn build_exists(field: &str, arg: &Value, _: &QueryParser) -> Option<QueryOperation> {
    let expected_presence = match arg {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64()? != 0.0,
        _ => return None,
    };
    Some(QueryOperation::Exists {
        field_name: field.to_string(),
        expected_presence,
    })
}

macro_rules! comparison_builder {
    ($name:ident, $variant:ident) => {
        fn $name(field: &str, arg: &Value, _: &QueryParser) -> Option<QueryOperation> {
            Some(QueryOperation::$variant {
                field_name: field.to_string(),
                value: arg.clone(),
            })
        }
    };
}

comparison_builder!(build_eq, Equals);
comparison_builder!(build_ne, NotEquals);
comparison_builder!(build_gt, GreaterThan);
comparison_builder!(build_gte, GreaterThanEquals);
comparison_builder!(build_lt, LessThan);
comparison_builder!(build_lte, LessThanEquals);

fn field_selector(operator: &'static str, build: FieldBuilder) -> Box<dyn QuerySelector> {
    Box::new(FieldOperatorSelector { operator, build })
}

fn logical_selector(
    operator: &'static str,
    build: fn(Vec<QueryOperation>) -> QueryOperation,
) -> Box<dyn QuerySelector> {
    Box::new(LogicalSelector { operator, build })
}

/// Selectors in priority order; the implicit catch-all comes last.
pub static SELECTORS: LazyLock<Vec<Box<dyn QuerySelector>>> = LazyLock::new(|| {
    vec![
        field_selector("$not", build_not),
        field_selector("$type", build_type),
        field_selector("$mod", build_mod),
        field_selector("$all", build_all),
        field_selector("$in", build_in),
        field_selector("$nin", build_not_in),
        field_selector("$size", build_size),
        field_selector("$elemMatch", build_elem_match),
        Box::new(NearSphereSelector),
        logical_selector("$or", |conditions| QueryOperation::Or { conditions }),
        logical_selector("$nor", |conditions| QueryOperation::Nor { conditions }),
        logical_selector("$and", |conditions| QueryOperation::And { conditions }),
        field_selector("$eq", build_eq),
        field_selector("$ne", build_ne),
        field_selector("$gt", build_gt),
        field_selector("$gte", build_gte),
        field_selector("$lt", build_lt),
        field_selector("$lte", build_lte),
        field_selector("$exists", build_exists),
        Box::new(ImplicitSelector),
    ]
});
