//! Path parameter patterns.
//!
//! Built-in patterns are keyed either by a parameter name (`uuid`, `date`) or
//! by a `:`-prefixed type key (`:int`, `:float`, `:bool`, `:any`).

use std::collections::BTreeMap;

use regex::Regex;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

pub const ANY: &str = ":any";

const BUILTIN: [(&str, &str); 6] = [
    (":any", r"([^/]+)"),
    (":int", r"(\d+)"),
    (":float", r"[+-]?([0-9]*[.])?[0-9]+"),
    (":bool", r"(true|false|1|0)"),
    (
        "uuid",
        r"([0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12})",
    ),
    (
        "date",
        r"([0-9]{4}-(0[1-9]|1[0-2])-(0[1-9]|[1-2][0-9]|3[0-1]))",
    ),
];

/// Caller-supplied pattern overrides, keyed by parameter name or `:<type>`.
pub type PatternOverrides = BTreeMap<String, String>;

/// Looks up a built-in pattern by key.
pub fn builtin(key: &str) -> Option<&'static str> {
    BUILTIN
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, pattern)| *pattern)
}

/// The type key used for a declared type (`int` → `:int`).
pub fn type_key(declared_type: &str) -> String {
    format!(":{}", declared_type.trim().to_ascii_lowercase())
}

/// Resolves an override value: a value naming a built-in becomes that pattern.
pub fn resolve_value(value: &str) -> &str {
    builtin(value).unwrap_or(value)
}

/// Compiles `source` as a whole-segment match.
pub fn compile_anchored(source: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!("^(?:{source})$"))
}

/// Ordered mapping from parameter name to regex source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConstraintMap {
    entries: Vec<(String, String)>,
}

impl ConstraintMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces, keeping the original position on replace.
    pub fn insert(&mut self, name: impl Into<String>, pattern: impl Into<String>) {
        let name = name.into();
        let pattern = pattern.into();
        match self.entries.iter_mut().find(|(key, _)| *key == name) {
            Some(entry) => entry.1 = pattern,
            None => self.entries.push((name, pattern)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, pattern)| pattern.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for ConstraintMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, pattern) in &self.entries {
            map.serialize_entry(name, pattern)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_compile() {
        for (key, source) in BUILTIN {
            assert!(compile_anchored(source).is_ok(), "{key}");
        }
    }

    #[test]
    fn test_builtin_matching() {
        let int = compile_anchored(builtin(":int").unwrap()).unwrap();
        assert!(int.is_match("42"));
        assert!(!int.is_match("4a"));

        let uuid = compile_anchored(builtin("uuid").unwrap()).unwrap();
        assert!(uuid.is_match("123e4567-e89b-12d3-a456-426614174000"));
        assert!(!uuid.is_match("not-a-uuid"));

        let date = compile_anchored(builtin("date").unwrap()).unwrap();
        assert!(date.is_match("2024-02-29"));
        assert!(!date.is_match("2024-13-01"));
    }

    #[test]
    fn test_resolve_value() {
        assert_eq!(resolve_value(":int"), r"(\d+)");
        assert_eq!(resolve_value("[a-z]+"), "[a-z]+");
        assert_eq!(type_key(" Int "), ":int");
    }

    #[test]
    fn test_constraint_map_keeps_insertion_order() {
        let mut map = ConstraintMap::new();
        map.insert("slug", "[a-z]+");
        map.insert("id", r"\d+");
        map.insert("slug", "[a-z-]+");

        let keys: Vec<&str> = map.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["slug", "id"]);
        assert_eq!(map.get("slug"), Some("[a-z-]+"));
        assert_eq!(
            serde_json::to_string(&map).unwrap(),
            r#"{"slug":"[a-z-]+","id":"\\d+"}"#
        );
    }
}
