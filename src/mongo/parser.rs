// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Filter document parser.
//!
//! Turns a raw filter (`{age: {$gt: 5}}`) into a [`QueryOperation`] by
//! trying every registered selector in priority order. Anything no
//! selector recognises yields `None`; the calculator reports that as the
//! maximum distance.

use serde_json::{Map, Value};
use tracing::trace;

use super::operations::QueryOperation;
use super::selectors::{QuerySelector, SELECTORS};
use crate::error::{HeuristicsError, Result};

#[derive(Clone, Copy)]
pub struct QueryParser {
    selectors: &'static [Box<dyn QuerySelector>],
}

impl Default for QueryParser {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for QueryParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryParser")
            .field("selectors", &self.selectors.len())
            .finish()
    }
}

impl QueryParser {
    pub fn new() -> Self {
        Self {
            selectors: SELECTORS.as_slice(),
        }
    }

    /// Parse a filter document. Non-object input is unsupported.
    pub fn parse(&self, query: &Value) -> Option<QueryOperation> {
        match query {
            Value::Object(map) => self.parse_map(map),
            _ => None,
        }
    }

    /// Like [`parse`](Self::parse) but reports the rejected query
    pub fn try_parse(&self, query: &Value) -> Result<QueryOperation> {
        self.parse(query)
            .ok_or_else(|| HeuristicsError::UnsupportedQuery(query.to_string()))
    }

    /// Parse the one-entry filter `{field: body}`
    pub fn parse_entry(&self, field: &str, body: &Value) -> Option<QueryOperation> {
        let mut map = Map::new();
        map.insert(field.to_string(), body.clone());
        self.parse_map(&map)
    }

    fn parse_map(&self, map: &Map<String, Value>) -> Option<QueryOperation> {
        let selected = self.selectors.iter().find_map(|selector| {
            let operation = selector.select(map, self)?;
            trace!(selector = selector.name(), "Query shape selected");
            Some(operation)
        });
        if selected.is_none() {
            trace!(keys = ?map.keys().collect::<Vec<_>>(), "No selector matched query");
        }
        selected
    }
}
