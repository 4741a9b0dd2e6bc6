//! Layering of caller-supplied values over defaults.
//!
//! Every configurable value in this crate (client options, request options,
//! record payloads) implements `Merge`. `base.merge(&overrides)` returns a new
//! value in which each field the override sets replaces the base, and each
//! field it leaves unset falls back to the base. Neither input is modified.
//!
//! Free-form JSON follows the same rule recursively: objects on both sides
//! are merged key by key, anything else (arrays, strings, numbers, `null`) is
//! replaced wholesale.

use serde_json::{Map, Value};

pub trait Merge {
    fn merge(&self, overrides: &Self) -> Self;
}

impl Merge for Value {
    fn merge(&self, overrides: &Self) -> Self {
        match (self, overrides) {
            (Value::Object(base), Value::Object(over)) => Value::Object(merge_objects(base, over)),
            (_, over) => over.clone(),
        }
    }
}

/// Deep-merge two JSON objects.
pub fn merge_objects(base: &Map<String, Value>, overrides: &Map<String, Value>) -> Map<String, Value> {
    let mut merged = base.clone();
    for (key, value) in overrides {
        let next = match merged.get(key) {
            Some(existing) => existing.merge(value),
            None => value.clone(),
        };
        merged.insert(key.clone(), next);
    }
    merged
}

/// The override when it is set, otherwise the base.
pub fn pick<T: Clone>(base: &Option<T>, overrides: &Option<T>) -> Option<T> {
    overrides.clone().or_else(|| base.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn override_wins_for_shared_keys() {
        let defaults = json!({"host": "cr-api.in.ft.com", "notify": false});
        let overrides = json!({"notify": true});
        assert_eq!(
            defaults.merge(&overrides),
            json!({"host": "cr-api.in.ft.com", "notify": true})
        );
    }

    #[test]
    fn nested_objects_merge_recursively() {
        let defaults = json!({"headers": {"X-Api-Key": "k", "User-Agent": "ua"}});
        let overrides = json!({"headers": {"Content-Type": "application/json"}});
        assert_eq!(
            defaults.merge(&overrides),
            json!({"headers": {
                "X-Api-Key": "k",
                "User-Agent": "ua",
                "Content-Type": "application/json"
            }})
        );
    }

    #[test]
    fn arrays_are_replaced_not_concatenated() {
        let defaults = json!({"serviceIds": ["a", "b"]});
        let overrides = json!({"serviceIds": ["c"]});
        assert_eq!(defaults.merge(&overrides), json!({"serviceIds": ["c"]}));
    }

    #[test]
    fn scalar_override_replaces_object() {
        let defaults = json!({"cause": {"errorMessage": "x"}});
        let overrides = json!({"cause": null});
        assert_eq!(defaults.merge(&overrides), json!({"cause": null}));
    }

    #[test]
    fn inputs_are_not_mutated() {
        let defaults = json!({"a": {"b": 1}, "c": 2});
        let overrides = json!({"a": {"d": 3}});
        let defaults_before = defaults.clone();
        let overrides_before = overrides.clone();

        let merged = defaults.merge(&overrides);
        assert_eq!(merged, json!({"a": {"b": 1, "d": 3}, "c": 2}));
        assert_eq!(defaults, defaults_before);
        assert_eq!(overrides, overrides_before);
    }

    #[test]
    fn pick_prefers_override() {
        assert_eq!(pick(&Some(1), &Some(2)), Some(2));
        assert_eq!(pick(&Some(1), &None), Some(1));
        assert_eq!(pick::<u8>(&None, &None), None);
    }
}
