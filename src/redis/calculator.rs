// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Redis command distance.
//!
//! Dispatches on the command keyword and compares its arguments with the
//! keys of a [`RedisSnapshot`]. Every per-key distance is normalised into
//! `[0, 1]`, so all commands share the same scale:
//!
//! ```text
//! KEYS pattern        glob -> regex, min regex distance over all keys
//! GET / EXISTS key    min alignment distance over all keys
//! HGETALL key         ... over hash keys
//! SMEMBERS key        ... over set keys
//! HGET key field      key alignment + closest field name, over hash keys
//! SINTER k1 k2 ..     (key existence + successive intersection) / 2
//! other               worst case
//! ```
//!
//! Failures (malformed glob, missing argument, wrong value type) never
//! escape: they are logged once and reported as the worst case.

use std::collections::HashSet;

use serde::Serialize;
use tracing::debug;

use super::command::{RedisCommand, RedisCommandType};
use super::snapshot::{RedisSnapshot, RedisValueData, RedisValueType};
use crate::config::HeuristicsConfig;
use crate::error::{HeuristicsError, Result};
use crate::logging::unique_warn;
use crate::metrics;
use crate::string_metric::{
    glob_to_regex, left_alignment_distance, normalize, RegexDistance, MAX_CHAR_DISTANCE,
};

/// Default distance when no gradient can be computed
pub const WORST_CASE_DISTANCE: f64 = 1.0;

/// Distance plus the number of stored keys compared to produce it
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DistanceWithMetrics {
    pub distance: f64,
    pub evaluated: usize,
}

impl DistanceWithMetrics {
    pub fn new(distance: f64, evaluated: usize) -> Self {
        Self { distance, evaluated }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RedisHeuristicsCalculator {
    config: HeuristicsConfig,
}

impl RedisHeuristicsCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: HeuristicsConfig) -> Self {
        Self { config }
    }

    fn worst_case(&self, evaluated: usize) -> DistanceWithMetrics {
        DistanceWithMetrics::new(self.config.redis_worst_case_distance, evaluated)
    }

    pub fn compute_distance(
        &self,
        command: &RedisCommand,
        snapshot: &RedisSnapshot,
    ) -> DistanceWithMetrics {
        let command_type = &command.command_type;
        let result = match self.dispatch(command, snapshot) {
            Ok(result) => result,
            Err(e) => {
                let message = format!("Could not compute distance for {command_type}: {e}");
                if self.config.unique_warnings {
                    unique_warn(message);
                } else {
                    tracing::warn!(command = %command_type, error = %e, "Could not compute distance");
                }
                self.worst_case(0)
            }
        };

        debug!(
            command = %command_type,
            distance = result.distance,
            evaluated = result.evaluated,
            "Redis command evaluated"
        );
        if self.config.record_metrics {
            let status = metrics::status_for(result.distance, self.config.redis_worst_case_distance);
            metrics::record_evaluation("redis", status);
            metrics::record_evaluated_keys(command_type.label(), result.evaluated);
        }
        result
    }

    fn dispatch(&self, command: &RedisCommand, snapshot: &RedisSnapshot) -> Result<DistanceWithMetrics> {
        match &command.command_type {
            RedisCommandType::Keys => self.pattern_distance(command.arg(0)?, snapshot),
            RedisCommandType::Get | RedisCommandType::Exists => {
                Ok(self.key_match_distance(command.arg(0)?, snapshot.keys()))
            }
            RedisCommandType::Hgetall => Ok(self.key_match_distance(
                command.arg(0)?,
                snapshot.keys_of_type(RedisValueType::Hash),
            )),
            RedisCommandType::Smembers => Ok(self.key_match_distance(
                command.arg(0)?,
                snapshot.keys_of_type(RedisValueType::Set),
            )),
            RedisCommandType::Hget => {
                Ok(self.hash_field_distance(command.arg(0)?, command.arg(1)?, snapshot))
            }
            RedisCommandType::Sinter => self.intersection_distance(&command.extract_args(), snapshot),
            RedisCommandType::Other(_) => Ok(self.worst_case(0)),
        }
    }

    /// KEYS: closest key to the pattern's language
    fn pattern_distance(&self, pattern: &str, snapshot: &RedisSnapshot) -> Result<DistanceWithMetrics> {
        let regex = glob_to_regex(pattern)?;
        let matcher = RegexDistance::compile_bounded(&regex, self.config.max_repetition_unroll)?;

        let mut min = self.config.redis_worst_case_distance;
        let mut evaluated = 0;
        for key in snapshot.keys() {
            let d = normalize(matcher.distance(key));
            evaluated += 1;
            if d == 0.0 {
                return Ok(DistanceWithMetrics::new(0.0, evaluated));
            }
            min = min.min(d);
        }
        Ok(DistanceWithMetrics::new(min, evaluated))
    }

    /// GET, EXISTS, HGETALL, SMEMBERS: closest candidate key
    fn key_match_distance<'a>(
        &self,
        target: &str,
        candidates: impl Iterator<Item = &'a str>,
    ) -> DistanceWithMetrics {
        let mut min = self.config.redis_worst_case_distance;
        let mut evaluated = 0;
        for key in candidates {
            let d = normalize(left_alignment_distance(target, key) as f64);
            evaluated += 1;
            if d == 0.0 {
                return DistanceWithMetrics::new(0.0, evaluated);
            }
            min = min.min(d);
        }
        if evaluated == 0 {
            return self.worst_case(0);
        }
        DistanceWithMetrics::new(min, evaluated)
    }

    /// HGET: hash key closeness plus closeness of the requested field
    fn hash_field_distance(&self, target_key: &str, field: &str, snapshot: &RedisSnapshot) -> DistanceWithMetrics {
        let mut min = self.config.redis_worst_case_distance;
        let mut evaluated = 0;
        for key in snapshot.keys_of_type(RedisValueType::Hash) {
            let field_distance = snapshot
                .hash_fields(key)
                .and_then(|fields| {
                    fields
                        .keys()
                        .map(|name| left_alignment_distance(field, name))
                        .min()
                })
                .unwrap_or(MAX_CHAR_DISTANCE);
            let key_distance = left_alignment_distance(target_key, key);
            let d = normalize(key_distance.saturating_add(field_distance) as f64);
            evaluated += 1;
            if d == 0.0 {
                return DistanceWithMetrics::new(0.0, evaluated);
            }
            min = min.min(d);
        }
        if evaluated == 0 {
            return self.worst_case(0);
        }
        DistanceWithMetrics::new(min, evaluated)
    }

    /// SINTER: mean of key existence and successive intersection distances
    fn intersection_distance(&self, keys: &[String], snapshot: &RedisSnapshot) -> Result<DistanceWithMetrics> {
        if keys.is_empty() {
            return Err(HeuristicsError::MissingArgument {
                command: RedisCommandType::Sinter.to_string(),
                index: 0,
            });
        }
        for key in keys {
            if let Some(RedisValueData::Hash { .. }) = snapshot.get(key) {
                return Err(HeuristicsError::WrongType {
                    key: key.clone(),
                    expected: "set".to_string(),
                });
            }
        }

        let set_keys: Vec<&str> = snapshot.keys_of_type(RedisValueType::Set).collect();
        let existence = keys
            .iter()
            .map(|key| self.key_match_distance(key, set_keys.iter().copied()).distance)
            .sum::<f64>()
            / keys.len() as f64;

        let empty = HashSet::new();
        let mut steps = 0;
        let mut total = 0.0;
        let mut running: HashSet<&str> = HashSet::new();
        for (i, key) in keys.iter().enumerate() {
            let members = snapshot.set_members(key).unwrap_or(&empty);
            let step = if i == 0 {
                running = members.iter().map(String::as_str).collect();
                if running.is_empty() {
                    self.config.redis_worst_case_distance
                } else {
                    0.0
                }
            } else {
                let next: HashSet<&str> = running
                    .iter()
                    .copied()
                    .filter(|m| members.contains(*m))
                    .collect();
                let d = if next.is_empty() {
                    self.set_distance(&running, members)
                } else {
                    0.0
                };
                running = next;
                d
            };
            total += step;
            steps += 1;
        }
        let intersection = total / keys.len() as f64;

        Ok(DistanceWithMetrics::new((existence + intersection) / 2.0, steps))
    }

    /// Closest pair of members across two disjoint sets
    fn set_distance(&self, left: &HashSet<&str>, right: &HashSet<String>) -> f64 {
        if left.is_empty() || right.is_empty() {
            return self.config.redis_worst_case_distance;
        }
        let mut min = self.config.redis_worst_case_distance;
        for a in left {
            for b in right {
                let d = normalize(left_alignment_distance(a, b) as f64);
                if d == 0.0 {
                    return 0.0;
                }
                min = min.min(d);
            }
        }
        min
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calc() -> RedisHeuristicsCalculator {
        RedisHeuristicsCalculator::new()
    }

    fn keys_snapshot(keys: &[&str]) -> RedisSnapshot {
        keys.iter()
            .fold(RedisSnapshot::new(), |s, k| s.with_set(*k, ["m"]))
    }

    #[test]
    fn test_keys_pattern_exact_match() {
        let cmd = RedisCommand::parse("KEYS", ["key<user*>"]);
        let result = calc().compute_distance(&cmd, &keys_snapshot(&["user:1", "user:2", "other"]));
        assert_eq!(result.distance, 0.0);
        assert!(result.evaluated >= 1);
    }

    #[test]
    fn test_keys_pattern_no_match() {
        let cmd = RedisCommand::parse("KEYS", ["key<thiskeydoesnotexist*>"]);
        let result = calc().compute_distance(&cmd, &keys_snapshot(&["user:1", "user:2"]));
        assert!(result.distance > 0.9 && result.distance < 1.0);
        assert_eq!(result.evaluated, 2);
    }

    #[test]
    fn test_keys_malformed_pattern_is_worst_case() {
        let cmd = RedisCommand::parse("KEYS", ["key<user:[0-9>"]);
        let result = calc().compute_distance(&cmd, &keys_snapshot(&["user:1"]));
        assert_eq!(result, DistanceWithMetrics::new(WORST_CASE_DISTANCE, 0));
    }

    #[test]
    fn test_exists_closer_key_is_smaller() {
        let snapshot = keys_snapshot(&["user:1", "user:2"]);
        let close = calc().compute_distance(&RedisCommand::parse("EXISTS", ["key<user:3>"]), &snapshot);
        let far = calc().compute_distance(&RedisCommand::parse("EXISTS", ["key<abcxyz>"]), &snapshot);
        assert!(close.distance < far.distance);
        assert_eq!(close.evaluated, 2);
    }

    #[test]
    fn test_get_exact_key() {
        let snapshot = keys_snapshot(&["user:1"]);
        let result = calc().compute_distance(&RedisCommand::parse("GET", ["key<user:1>"]), &snapshot);
        assert_eq!(result, DistanceWithMetrics::new(0.0, 1));
    }

    #[test]
    fn test_empty_snapshot_is_worst_case() {
        let empty = RedisSnapshot::new();
        for keyword in ["GET", "EXISTS", "HGETALL", "SMEMBERS", "KEYS"] {
            let result = calc().compute_distance(&RedisCommand::parse(keyword, ["key<a>"]), &empty);
            assert_eq!(result, DistanceWithMetrics::new(WORST_CASE_DISTANCE, 0), "{keyword}");
        }
    }

    #[test]
    fn test_smembers_only_considers_sets() {
        let snapshot = RedisSnapshot::new()
            .with_hash("user:set1", [("f", "v")])
            .with_set("orders", ["1"]);
        let result = calc().compute_distance(&RedisCommand::parse("SMEMBERS", ["key<user:set1>"]), &snapshot);
        assert!(result.distance > 0.0);
        assert_eq!(result.evaluated, 1);
    }

    #[test]
    fn test_smembers_similarity() {
        let snapshot = RedisSnapshot::new()
            .with_set("user:setA", ["1"])
            .with_set("user:setB", ["1"])
            .with_set("profile:set", ["1"]);
        let similar = calc().compute_distance(&RedisCommand::parse("SMEMBERS", ["key<user:set1>"]), &snapshot);
        let different = calc().compute_distance(&RedisCommand::parse("SMEMBERS", ["key<orders>"]), &snapshot);
        assert!(similar.distance < different.distance);
    }

    #[test]
    fn test_hget_field_exists() {
        let snapshot = RedisSnapshot::new()
            .with_hash("profile", [("name", "alice")])
            .with_hash("users", [("id", "1")]);
        let cmd = RedisCommand::parse("HGET", ["key<profile>", "key<name>"]);
        let result = calc().compute_distance(&cmd, &snapshot);
        assert_eq!(result.distance, 0.0);
        assert!(result.evaluated > 0);
    }

    #[test]
    fn test_hget_field_missing() {
        let snapshot = RedisSnapshot::new().with_hash("profile", [("name", "alice")]);
        let cmd = RedisCommand::parse("HGET", ["key<profile>", "key<age>"]);
        let result = calc().compute_distance(&cmd, &snapshot);
        assert!(result.distance > 0.0);
        assert_eq!(result.evaluated, 1);
    }

    #[test]
    fn test_hget_closer_field_is_smaller() {
        let snapshot = RedisSnapshot::new().with_hash("profile", [("name", "alice")]);
        let close = calc().compute_distance(&RedisCommand::parse("HGET", ["key<profile>", "key<namf>"]), &snapshot);
        let far = calc().compute_distance(&RedisCommand::parse("HGET", ["key<profile>", "key<zzzzzzzz>"]), &snapshot);
        assert!(close.distance < far.distance);
    }

    #[test]
    fn test_hget_missing_field_argument_is_worst_case() {
        let snapshot = RedisSnapshot::new().with_hash("profile", [("name", "alice")]);
        let result = calc().compute_distance(&RedisCommand::parse("HGET", ["key<profile>"]), &snapshot);
        assert_eq!(result, DistanceWithMetrics::new(WORST_CASE_DISTANCE, 0));
    }

    #[test]
    fn test_sinter_shared_members() {
        let snapshot = RedisSnapshot::new()
            .with_set("setA", ["a", "b", "c"])
            .with_set("setB", ["b", "c", "d"]);
        let result = calc().compute_distance(&RedisCommand::parse("SINTER", ["key<setA>", "key<setB>"]), &snapshot);
        assert_eq!(result, DistanceWithMetrics::new(0.0, 2));
    }

    #[test]
    fn test_sinter_disjoint_sets_ordering() {
        let snapshot = RedisSnapshot::new()
            .with_set("setA", ["a", "b", "c"])
            .with_set("setB", ["b", "c", "d"])
            .with_set("setC", ["a", "b"])
            .with_set("setD", ["c", "d"])
            .with_set("setE", ["a", "b"])
            .with_set("setF", ["y", "z"]);
        let sinter = |a: &str, b: &str| {
            calc()
                .compute_distance(&RedisCommand::parse("SINTER", [a, b]), &snapshot)
                .distance
        };
        let shared = sinter("setA", "setB");
        let close = sinter("setC", "setD");
        let far = sinter("setE", "setF");
        assert_eq!(shared, 0.0);
        assert!(close > 0.0);
        assert!(shared < close);
        assert!(close < far);
    }

    #[test]
    fn test_sinter_several_sets() {
        let args = ["key<setA>", "key<setB>", "key<setC>", "key<setD>"];
        let fewer_gaps = RedisSnapshot::new()
            .with_set("setA", ["a", "b", "c"])
            .with_set("setB", ["b", "c"])
            .with_set("setC", ["c", "d"])
            .with_set("setD", ["d", "e"]);
        let more_gaps = RedisSnapshot::new()
            .with_set("setA", ["a", "b", "c"])
            .with_set("setB", ["b", "c"])
            .with_set("setC", ["d", "e"])
            .with_set("setD", ["f", "g"]);
        let less = calc().compute_distance(&RedisCommand::parse("SINTER", args), &fewer_gaps);
        let more = calc().compute_distance(&RedisCommand::parse("SINTER", args), &more_gaps);
        assert!(less.distance > 0.0);
        assert!(more.distance > less.distance);
        assert_eq!(less.evaluated, 4);
    }

    #[test]
    fn test_sinter_missing_key_costs_existence() {
        let snapshot = RedisSnapshot::new().with_set("setA", ["a"]);
        let result = calc().compute_distance(&RedisCommand::parse("SINTER", ["setA", "setZ"]), &snapshot);
        assert!(result.distance > 0.0);
        assert!(result.distance <= 1.0);
    }

    #[test]
    fn test_sinter_hash_key_is_worst_case() {
        let snapshot = RedisSnapshot::new()
            .with_set("setA", ["a"])
            .with_hash("profile", [("name", "x")]);
        let result = calc().compute_distance(&RedisCommand::parse("SINTER", ["setA", "profile"]), &snapshot);
        assert_eq!(result, DistanceWithMetrics::new(WORST_CASE_DISTANCE, 0));
    }

    #[test]
    fn test_unknown_command_is_worst_case() {
        let snapshot = keys_snapshot(&["a"]);
        let result = calc().compute_distance(&RedisCommand::parse("ZADD", ["key<a>"]), &snapshot);
        assert_eq!(result, DistanceWithMetrics::new(WORST_CASE_DISTANCE, 0));
    }

    #[test]
    fn test_configured_worst_case() {
        let config = HeuristicsConfig {
            redis_worst_case_distance: 0.75,
            ..HeuristicsConfig::default()
        };
        let calc = RedisHeuristicsCalculator::with_config(config);
        let result = calc.compute_distance(&RedisCommand::parse("GET", ["key<a>"]), &RedisSnapshot::new());
        assert_eq!(result.distance, 0.75);
    }
}
