// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! End-to-end scenarios through the public API.
//!
//! Run with: `cargo test --test heuristics`

use serde_json::{json, Map, Value};

use query_heuristics::{
    BsonType, DistanceWithMetrics, HeuristicsConfig, MongoHeuristicsCalculator, QueryOperation,
    QueryParser, RedisCommand, RedisHeuristicsCalculator, RedisSnapshot, MAX_DISTANCE,
    WORST_CASE_DISTANCE,
};

fn doc(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected an object, got {other}"),
    }
}

fn mongo(query: Value, document: Value) -> f64 {
    MongoHeuristicsCalculator::new().compute_expression(&query, &doc(document))
}

// =============================================================================
// Mongo: literal scenarios
// =============================================================================

#[test]
fn test_equality_scenarios() {
    assert_eq!(mongo(json!({"age": 10}), json!({"age": 10})), 0.0);
    assert_eq!(mongo(json!({"age": 26}), json!({"age": 10})), 16.0);
    assert_eq!(mongo(json!({"age": {"$ne": 26}}), json!({"age": 10})), 0.0);
    assert_eq!(mongo(json!({"age": {"$ne": 10}}), json!({"age": 10})), 1.0);
}

#[test]
fn test_comparison_scenarios() {
    assert_eq!(mongo(json!({"age": {"$gt": 5}}), json!({"age": 10})), 0.0);
    assert_eq!(mongo(json!({"age": {"$gt": 13}}), json!({"age": 10})), 4.0);
}

#[test]
fn test_array_scenarios() {
    let employees = json!({"employees": [1, 5, 6]});
    assert_eq!(mongo(json!({"employees": {"$size": 3}}), employees.clone()), 0.0);
    assert_eq!(mongo(json!({"employees": {"$size": 5}}), employees.clone()), 2.0);
    assert_eq!(mongo(json!({"employees": {"$all": [1, 7, 8]}}), employees), 3.0);
    assert_eq!(mongo(json!({"age": {"$in": [1, 15]}}), json!({"age": 10})), 5.0);
}

#[test]
fn test_mod_and_exists_scenarios() {
    let d = json!({"age": 20});
    assert_eq!(mongo(json!({"age": {"$mod": [3, 2]}}), d.clone()), 0.0);
    assert_eq!(mongo(json!({"age": {"$mod": [3, 0]}}), d.clone()), 2.0);
    assert_eq!(mongo(json!({"age": {"$exists": true}}), d.clone()), 0.0);
    assert_eq!(mongo(json!({"name": {"$exists": true}}), d.clone()), 65_563.0);
    assert_eq!(mongo(json!({"age": {"$not": {"$gt": 10}}}), d), 10.0);
}

#[test]
fn test_elem_match_scenarios() {
    let d = json!({"years": [2002, 2010]});
    assert_eq!(mongo(json!({"years": {"$elemMatch": {"years": {"$gt": 2009}}}}), d.clone()), 0.0);
    assert_eq!(mongo(json!({"years": {"$elemMatch": {"years": {"$lt": 2001}}}}), d), 2.0);
}

#[test]
fn test_near_sphere_scenario() {
    let liberty = json!({"location": {"type": "Point", "coordinates": [-74.044502, 40.689247]}});
    let query = |max: f64| {
        json!({
            "location": {
                "$nearSphere": {
                    "$geometry": {
                        "type": "Point",
                        "coordinates": [2.29441692356368, 48.858504187164684]
                    },
                    "$maxDistance": max
                }
            }
        })
    };
    assert_eq!(mongo(query(6_000_000.0), liberty.clone()), 0.0);
    let d = mongo(query(5_000_000.0), liberty);
    assert!((d - 837_402.931_002_315_1).abs() < 1e-3, "got {d}");
}

#[test]
fn test_composition_scenarios() {
    let d = json!({"age": 10, "kg": 50});
    assert_eq!(mongo(json!({"$or": [{"age": {"$gt": 17}}, {"age": {"$lt": 8}}]}), d.clone()), 3.0);
    assert_eq!(mongo(json!({"$and": [{"age": {"$gt": 10}}, {"age": {"$lt": 8}}]}), d.clone()), 4.0);
    assert_eq!(mongo(json!({"age": 9, "kg": {"$gt": 40}}), d), 1.0);
}

#[test]
fn test_unsupported_query_is_max_distance() {
    assert_eq!(mongo(json!({"age": {"$regex": "1"}}), json!({"age": 1})), MAX_DISTANCE);
    assert!(QueryParser::new().parse(&json!({"$text": {"$search": "x"}})).is_none());
}

#[test]
fn test_operations_built_by_hand() {
    let calc = MongoHeuristicsCalculator::new();
    let d = doc(json!({"age": 20}));
    let op = QueryOperation::Type {
        field_name: "age".into(),
        expected_type: BsonType::Int,
    };
    assert_eq!(calc.compute_operation(&op, &d), 0.0);
    assert_eq!(calc.compute_operation(&op.invert(), &d), 1.0);
}

#[test]
fn test_calculator_with_metrics_disabled() {
    let config = HeuristicsConfig {
        record_metrics: false,
        ..HeuristicsConfig::default()
    };
    let calc = MongoHeuristicsCalculator::with_config(config);
    assert_eq!(calc.compute_expression(&json!({"age": 10}), &doc(json!({"age": 10}))), 0.0);
}

// =============================================================================
// Redis scenarios
// =============================================================================

#[test]
fn test_redis_empty_snapshot_is_worst_case() {
    let calc = RedisHeuristicsCalculator::new();
    let result = calc.compute_distance(&RedisCommand::parse("GET", ["key<user:1>"]), &RedisSnapshot::new());
    assert_eq!(result, DistanceWithMetrics::new(WORST_CASE_DISTANCE, 0));
}

#[test]
fn test_redis_keys_and_hget() {
    let snapshot = RedisSnapshot::new()
        .with_hash("profile", [("name", "alice")])
        .with_set("user:1", ["a"])
        .with_set("user:2", ["b"]);
    let calc = RedisHeuristicsCalculator::new();

    let keys = calc.compute_distance(&RedisCommand::parse("KEYS", ["key<user*>"]), &snapshot);
    assert_eq!(keys.distance, 0.0);

    let hget = calc.compute_distance(&RedisCommand::parse("HGET", ["key<profile>", "key<name>"]), &snapshot);
    assert_eq!(hget, DistanceWithMetrics::new(0.0, 1));
}

#[test]
fn test_redis_snapshot_from_json() {
    let snapshot: RedisSnapshot = serde_json::from_value(json!({
        "setA": {"type": "set", "members": ["a", "b"]},
        "setB": {"type": "set", "members": ["b"]}
    }))
    .unwrap();
    let calc = RedisHeuristicsCalculator::new();
    let result = calc.compute_distance(&RedisCommand::parse("sinter", ["key<setA>", "key<setB>"]), &snapshot);
    assert_eq!(result, DistanceWithMetrics::new(0.0, 2));
}

#[test]
fn test_redis_distances_stay_normalised() {
    let snapshot = RedisSnapshot::new()
        .with_hash("h", [("f", "v")])
        .with_set("s", ["m"]);
    let calc = RedisHeuristicsCalculator::new();
    let commands = [
        RedisCommand::parse("KEYS", ["key<zz*>"]),
        RedisCommand::parse("GET", ["key<something-long>"]),
        RedisCommand::parse("HGETALL", ["key<x>"]),
        RedisCommand::parse("SMEMBERS", ["key<x>"]),
        RedisCommand::parse("HGET", ["key<x>", "key<y>"]),
        RedisCommand::parse("SINTER", ["key<s>", "key<t>"]),
    ];
    for cmd in &commands {
        let result = calc.compute_distance(cmd, &snapshot);
        assert!((0.0..=1.0).contains(&result.distance), "{cmd:?} -> {result:?}");
    }
}
