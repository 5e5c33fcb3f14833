// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Point-in-time view of the keys a Redis command could touch.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

/// Stored value kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RedisValueType {
    Hash,
    Set,
}

/// Metadata for one key: hash field names or set members
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RedisValueData {
    Hash { fields: HashMap<String, String> },
    Set { members: HashSet<String> },
}

impl RedisValueData {
    pub fn value_type(&self) -> RedisValueType {
        match self {
            RedisValueData::Hash { .. } => RedisValueType::Hash,
            RedisValueData::Set { .. } => RedisValueType::Set,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RedisSnapshot {
    entries: HashMap<String, RedisValueData>,
}

impl RedisSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: RedisValueData) {
        self.entries.insert(key.into(), value);
    }

    /// Builder-style hash insert
    pub fn with_hash<K, F, V>(mut self, key: K, fields: impl IntoIterator<Item = (F, V)>) -> Self
    where
        K: Into<String>,
        F: Into<String>,
        V: Into<String>,
    {
        let fields = fields.into_iter().map(|(f, v)| (f.into(), v.into())).collect();
        self.insert(key, RedisValueData::Hash { fields });
        self
    }

    /// Builder-style set insert
    pub fn with_set<K, M>(mut self, key: K, members: impl IntoIterator<Item = M>) -> Self
    where
        K: Into<String>,
        M: Into<String>,
    {
        let members = members.into_iter().map(Into::into).collect();
        self.insert(key, RedisValueData::Set { members });
        self
    }

    pub fn get(&self, key: &str) -> Option<&RedisValueData> {
        self.entries.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn keys_of_type(&self, value_type: RedisValueType) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(move |(_, v)| v.value_type() == value_type)
            .map(|(k, _)| k.as_str())
    }

    /// Members of the set stored at `key`, `None` if absent or not a set
    pub fn set_members(&self, key: &str) -> Option<&HashSet<String>> {
        match self.entries.get(key)? {
            RedisValueData::Set { members } => Some(members),
            RedisValueData::Hash { .. } => None,
        }
    }

    /// Fields of the hash stored at `key`, `None` if absent or not a hash
    pub fn hash_fields(&self, key: &str) -> Option<&HashMap<String, String>> {
        match self.entries.get(key)? {
            RedisValueData::Hash { fields } => Some(fields),
            RedisValueData::Set { .. } => None,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, RedisValueData)> for RedisSnapshot {
    fn from_iter<T: IntoIterator<Item = (String, RedisValueData)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RedisSnapshot {
        RedisSnapshot::new()
            .with_hash("profile", [("name", "alice")])
            .with_set("tags", ["a", "b"])
    }

    #[test]
    fn test_keys_of_type() {
        let snapshot = sample();
        assert_eq!(snapshot.keys_of_type(RedisValueType::Hash).collect::<Vec<_>>(), vec!["profile"]);
        assert_eq!(snapshot.keys_of_type(RedisValueType::Set).collect::<Vec<_>>(), vec!["tags"]);
        assert_eq!(snapshot.keys().count(), 2);
    }

    #[test]
    fn test_typed_accessors() {
        let snapshot = sample();
        assert!(snapshot.set_members("tags").unwrap().contains("a"));
        assert!(snapshot.set_members("profile").is_none());
        assert_eq!(snapshot.hash_fields("profile").unwrap()["name"], "alice");
        assert!(snapshot.hash_fields("missing").is_none());
    }

    #[test]
    fn test_deserialize_tagged() {
        let snapshot: RedisSnapshot = serde_json::from_str(
            r#"{"s": {"type": "set", "members": ["x"]}, "h": {"type": "hash", "fields": {"f": "v"}}}"#,
        )
        .unwrap();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.get("s").unwrap().value_type(), RedisValueType::Set);
        assert_eq!(snapshot.get("h").unwrap().value_type(), RedisValueType::Hash);
    }
}
