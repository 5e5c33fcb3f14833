// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Read-only document views.
//!
//! `$elemMatch` evaluates its condition once per array element with the
//! array field rebound to that element. Instead of cloning the record per
//! element, an [`DocumentView::Overlay`] shadows one field on top of the
//! record it came from:
//!
//! ```text
//! Overlay { field: "years", value: 2010 }
//!     └── Root { age: 10, years: [2002, 2010] }
//!
//! get("years") -> 2010
//! get("age")   -> 10
//! ```
//!
//! When the bound element is itself a document, bare field names resolve
//! inside that element only, so `{results: {$elemMatch: {score: {$gt: 8}}}}`
//! reaches `results[i].score` and never a root-level `score`.

use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy)]
pub enum DocumentView<'a> {
    Root(&'a Map<String, Value>),
    Overlay {
        base: &'a DocumentView<'a>,
        field: &'a str,
        value: &'a Value,
    },
}

impl<'a> DocumentView<'a> {
    pub fn new(document: &'a Map<String, Value>) -> Self {
        DocumentView::Root(document)
    }

    /// Rebind `field` to `value` on top of this view
    pub fn overlay(&'a self, field: &'a str, value: &'a Value) -> DocumentView<'a> {
        DocumentView::Overlay {
            base: self,
            field,
            value,
        }
    }

    /// Resolve a field. Dotted paths (`address.city`, `items.0`) descend
    /// into embedded documents and arrays when no key matches verbatim.
    pub fn get(&self, field: &str) -> Option<&'a Value> {
        match *self {
            DocumentView::Root(map) => lookup(map, field),
            DocumentView::Overlay { base, field: bound, value } => {
                if bound == field {
                    return Some(value);
                }
                if let Some(path) = field.strip_prefix(bound).and_then(|p| p.strip_prefix('.')) {
                    return descend(value, path);
                }
                match value {
                    Value::Object(inner) => lookup(inner, field),
                    _ => base.get(field),
                }
            }
        }
    }

    pub fn contains(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    /// Top-level field names visible through this view
    pub fn keys(&self) -> Vec<&'a str> {
        match *self {
            DocumentView::Root(map) => map.keys().map(String::as_str).collect(),
            DocumentView::Overlay { base, field, value } => {
                let mut keys = vec![field];
                let rest = match value {
                    Value::Object(inner) => inner.keys().map(String::as_str).collect(),
                    _ => base.keys(),
                };
                for key in rest {
                    if !keys.contains(&key) {
                        keys.push(key);
                    }
                }
                keys
            }
        }
    }
}

fn lookup<'a>(map: &'a Map<String, Value>, field: &str) -> Option<&'a Value> {
    if let Some(value) = map.get(field) {
        return Some(value);
    }
    let (head, rest) = field.split_once('.')?;
    descend(map.get(head)?, rest)
}

fn descend<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(value, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn test_root_lookup() {
        let d = doc(json!({"age": 10, "address": {"city": "Oslo"}, "tags": ["a", "b"]}));
        let view = DocumentView::new(&d);
        assert_eq!(view.get("age"), Some(&json!(10)));
        assert_eq!(view.get("address.city"), Some(&json!("Oslo")));
        assert_eq!(view.get("tags.1"), Some(&json!("b")));
        assert_eq!(view.get("missing"), None);
        assert!(!view.contains("address.zip"));
    }

    #[test]
    fn test_verbatim_dotted_key_wins() {
        let d = doc(json!({"a.b": 1, "a": {"b": 2}}));
        assert_eq!(DocumentView::new(&d).get("a.b"), Some(&json!(1)));
    }

    #[test]
    fn test_overlay_shadows_field() {
        let d = doc(json!({"age": 10, "years": [2002, 2010]}));
        let root = DocumentView::new(&d);
        let elem = json!(2010);
        let view = root.overlay("years", &elem);
        assert_eq!(view.get("years"), Some(&json!(2010)));
        assert_eq!(view.get("age"), Some(&json!(10)));
    }

    #[test]
    fn test_overlay_exposes_embedded_fields() {
        let d = doc(json!({"results": [{"score": 9}]}));
        let root = DocumentView::new(&d);
        let elem = json!({"score": 9, "product": "xyz"});
        let view = root.overlay("results", &elem);
        assert_eq!(view.get("score"), Some(&json!(9)));
        assert_eq!(view.get("results.product"), Some(&json!("xyz")));
    }

    #[test]
    fn test_overlay_keys_deduplicated() {
        let d = doc(json!({"age": 10, "years": [1]}));
        let root = DocumentView::new(&d);
        let elem = json!(1);
        let view = root.overlay("years", &elem);
        let mut keys = view.keys();
        keys.sort();
        assert_eq!(keys, vec!["age", "years"]);
    }

    #[test]
    fn test_embedded_overlay_hides_root_fields() {
        let d = doc(json!({"score": 10, "results": [{"product": "a"}]}));
        let root = DocumentView::new(&d);
        let elem = json!({"product": "a"});
        let view = root.overlay("results", &elem);
        assert_eq!(view.get("score"), None);
        assert_eq!(view.get("results.score"), None);
        assert_eq!(view.get("product"), Some(&json!("a")));
        let mut keys = view.keys();
        keys.sort();
        assert_eq!(keys, vec!["product", "results"]);
    }
}
