// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Intercepted Redis commands.
//!
//! The instrumentation layer records each command keyword plus its raw
//! arguments. Arguments may come wrapped with a role label:
//!
//! ```text
//! HGET key<profile> key<name>   ->   HGET profile name
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{HeuristicsError, Result};

/// Command keyword. Anything without a dedicated heuristic is `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RedisCommandType {
    Keys,
    Get,
    Exists,
    Hget,
    Hgetall,
    Smembers,
    Sinter,
    Other(String),
}

impl RedisCommandType {
    pub fn label(&self) -> &str {
        match self {
            RedisCommandType::Keys => "KEYS",
            RedisCommandType::Get => "GET",
            RedisCommandType::Exists => "EXISTS",
            RedisCommandType::Hget => "HGET",
            RedisCommandType::Hgetall => "HGETALL",
            RedisCommandType::Smembers => "SMEMBERS",
            RedisCommandType::Sinter => "SINTER",
            RedisCommandType::Other(keyword) => keyword,
        }
    }
}

impl FromStr for RedisCommandType {
    type Err = std::convert::Infallible;

    /// Case-insensitive; unknown keywords become `Other` (upper-cased)
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let keyword = s.trim().to_ascii_uppercase();
        Ok(match keyword.as_str() {
            "KEYS" => RedisCommandType::Keys,
            "GET" => RedisCommandType::Get,
            "EXISTS" => RedisCommandType::Exists,
            "HGET" => RedisCommandType::Hget,
            "HGETALL" => RedisCommandType::Hgetall,
            "SMEMBERS" => RedisCommandType::Smembers,
            "SINTER" => RedisCommandType::Sinter,
            _ => RedisCommandType::Other(keyword),
        })
    }
}

impl fmt::Display for RedisCommandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedisCommand {
    pub command_type: RedisCommandType,
    pub args: Vec<String>,
}

impl RedisCommand {
    pub fn new(command_type: RedisCommandType, args: Vec<String>) -> Self {
        Self { command_type, args }
    }

    /// Build from a keyword and raw arguments
    pub fn parse(keyword: &str, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let command_type = match keyword.parse() {
            Ok(t) => t,
            Err(never) => match never {},
        };
        Self::new(command_type, args.into_iter().map(Into::into).collect())
    }

    /// Arguments with their `label<...>` wrapper removed
    pub fn extract_args(&self) -> Vec<String> {
        self.args.iter().map(|a| unwrap_arg(a).to_string()).collect()
    }

    /// Unwrapped argument at `index`
    pub fn arg(&self, index: usize) -> Result<&str> {
        self.args
            .get(index)
            .map(|a| unwrap_arg(a))
            .ok_or_else(|| HeuristicsError::MissingArgument {
                command: self.command_type.to_string(),
                index,
            })
    }
}

fn unwrap_arg(raw: &str) -> &str {
    let Some((label, rest)) = raw.split_once('<') else {
        return raw;
    };
    if label.is_empty() || !label.chars().all(|c| c.is_ascii_alphabetic()) {
        return raw;
    }
    rest.strip_suffix('>').unwrap_or(raw)
}
