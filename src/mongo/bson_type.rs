// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! BSON type tags for `$type`.
//!
//! Documents arrive as JSON, so the runtime kind of a value is recovered
//! from its JSON shape plus the MongoDB Extended JSON wrappers
//! (`{"$oid": ..}`, `{"$date": ..}`, `{"$numberLong": ..}`, ...).

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BsonType {
    Double,
    String,
    Object,
    Array,
    BinData,
    ObjectId,
    Bool,
    Date,
    Null,
    Regex,
    Int,
    Timestamp,
    Long,
    Decimal,
    /// `"number"` alias: any of `Double`, `Int`, `Long`, `Decimal`
    Number,
}

impl BsonType {
    const ALL: [BsonType; 14] = [
        BsonType::Double,
        BsonType::String,
        BsonType::Object,
        BsonType::Array,
        BsonType::BinData,
        BsonType::ObjectId,
        BsonType::Bool,
        BsonType::Date,
        BsonType::Null,
        BsonType::Regex,
        BsonType::Int,
        BsonType::Timestamp,
        BsonType::Long,
        BsonType::Decimal,
    ];

    /// Numeric type code used by `{$type: <number>}`. `Number` is alias-only.
    pub fn code(&self) -> Option<i64> {
        let code = match self {
            BsonType::Double => 1,
            BsonType::String => 2,
            BsonType::Object => 3,
            BsonType::Array => 4,
            BsonType::BinData => 5,
            BsonType::ObjectId => 7,
            BsonType::Bool => 8,
            BsonType::Date => 9,
            BsonType::Null => 10,
            BsonType::Regex => 11,
            BsonType::Int => 16,
            BsonType::Timestamp => 17,
            BsonType::Long => 18,
            BsonType::Decimal => 19,
            BsonType::Number => return None,
        };
        Some(code)
    }

    /// String alias used by `{$type: "<alias>"}`
    pub fn alias(&self) -> &'static str {
        match self {
            BsonType::Double => "double",
            BsonType::String => "string",
            BsonType::Object => "object",
            BsonType::Array => "array",
            BsonType::BinData => "binData",
            BsonType::ObjectId => "objectId",
            BsonType::Bool => "bool",
            BsonType::Date => "date",
            BsonType::Null => "null",
            BsonType::Regex => "regex",
            BsonType::Int => "int",
            BsonType::Timestamp => "timestamp",
            BsonType::Long => "long",
            BsonType::Decimal => "decimal",
            BsonType::Number => "number",
        }
    }

    /// Driver enum name (`BsonType.INT32` and friends)
    fn driver_name(&self) -> &'static str {
        match self {
            BsonType::Double => "DOUBLE",
            BsonType::String => "STRING",
            BsonType::Object => "DOCUMENT",
            BsonType::Array => "ARRAY",
            BsonType::BinData => "BINARY",
            BsonType::ObjectId => "OBJECT_ID",
            BsonType::Bool => "BOOLEAN",
            BsonType::Date => "DATE_TIME",
            BsonType::Null => "NULL",
            BsonType::Regex => "REGULAR_EXPRESSION",
            BsonType::Int => "INT32",
            BsonType::Timestamp => "TIMESTAMP",
            BsonType::Long => "INT64",
            BsonType::Decimal => "DECIMAL128",
            BsonType::Number => "NUMBER",
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.code() == Some(code))
    }

    /// Accepts the shell alias (`"int"`) or the driver name (`"INT32"`)
    pub fn from_alias(alias: &str) -> Option<Self> {
        if alias == BsonType::Number.alias() {
            return Some(BsonType::Number);
        }
        Self::ALL
            .into_iter()
            .find(|t| t.alias() == alias || t.driver_name() == alias)
    }

    /// Parse the argument of a `$type` operator
    pub fn from_query_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(alias) => Self::from_alias(alias),
            Value::Number(n) => n.as_i64().and_then(Self::from_code),
            _ => None,
        }
    }

    /// Whether a value of runtime kind `actual` satisfies `{$type: self}`
    pub fn matches(&self, actual: BsonType) -> bool {
        match self {
            BsonType::Number => matches!(
                actual,
                BsonType::Double | BsonType::Int | BsonType::Long | BsonType::Decimal
            ),
            expected => *expected == actual,
        }
    }

    /// Runtime kind of a document value
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => BsonType::Null,
            Value::Bool(_) => BsonType::Bool,
            Value::Number(n) => match n.as_i64() {
                Some(i) if i32::try_from(i).is_ok() => BsonType::Int,
                Some(_) => BsonType::Long,
                None if n.is_u64() => BsonType::Long,
                None => BsonType::Double,
            },
            Value::String(_) => BsonType::String,
            Value::Array(_) => BsonType::Array,
            Value::Object(map) => {
                if map.len() != 1 {
                    return BsonType::Object;
                }
                match map.keys().next().map(String::as_str) {
                    Some("$oid") => BsonType::ObjectId,
                    Some("$date") => BsonType::Date,
                    Some("$numberLong") => BsonType::Long,
                    Some("$numberInt") => BsonType::Int,
                    Some("$numberDouble") => BsonType::Double,
                    Some("$numberDecimal") => BsonType::Decimal,
                    Some("$binary") => BsonType::BinData,
                    Some("$timestamp") => BsonType::Timestamp,
                    Some("$regularExpression") => BsonType::Regex,
                    _ => BsonType::Object,
                }
            }
        }
    }
}

/// Hex string of an Extended JSON ObjectId (`{"$oid": "..."}`)
pub fn object_id_hex(value: &Value) -> Option<&str> {
    match value {
        Value::Object(map) if map.len() == 1 => map.get("$oid").and_then(Value::as_str),
        _ => None,
    }
}
