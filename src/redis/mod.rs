// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Redis command heuristics.

pub mod calculator;
pub mod command;
pub mod snapshot;

pub use calculator::{DistanceWithMetrics, RedisHeuristicsCalculator, WORST_CASE_DISTANCE};
pub use command::{RedisCommand, RedisCommandType};
pub use snapshot::{RedisSnapshot, RedisValueData, RedisValueType};
