// SPDX-License-Identifier: MIT OR Apache-2.0
//! Parsed invocation arguments.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A parsed option or positional value, typed per [`OptionSpec::value_type`]
/// (or [`PositionalSpec::value_type`]).
///
/// This is the systems-language stand-in for "values of the declared
/// primitive types" — Rust has no host-language `any`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum ArgValue {
    /// No value (an option was not supplied, or a chained-step mapping's
    /// `jsonPath` did not resolve).
    Null,
    /// A boolean flag.
    Bool(bool),
    /// A numeric value.
    Number(f64),
    /// A string value.
    String(String),
    /// An array of values (for `array`-typed options).
    Array(Vec<ArgValue>),
}

impl ArgValue {
    /// Returns `true` for [`ArgValue::Null`].
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, ArgValue::Null)
    }

    /// Borrow as a string, if this value is a [`ArgValue::String`].
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ArgValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow as a number, if this value is a [`ArgValue::Number`].
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ArgValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Borrow as a bool, if this value is a [`ArgValue::Bool`].
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ArgValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Borrow as an array, if this value is a [`ArgValue::Array`].
    #[must_use]
    pub fn as_array(&self) -> Option<&[ArgValue]> {
        match self {
            ArgValue::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Convert to a [`serde_json::Value`], used by the chained-handler
    /// linker's JSON-path evaluator and by the default response renderer.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            ArgValue::Null => serde_json::Value::Null,
            ArgValue::Bool(b) => serde_json::Value::Bool(*b),
            ArgValue::Number(n) => serde_json::Number::from_f64(*n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            ArgValue::String(s) => serde_json::Value::String(s.clone()),
            ArgValue::Array(items) => {
                serde_json::Value::Array(items.iter().map(ArgValue::to_json).collect())
            }
        }
    }

    /// Build an [`ArgValue`] from a [`serde_json::Value`], used when
    /// binding a chained-step argument from a prior step's structured data.
    #[must_use]
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => ArgValue::Null,
            serde_json::Value::Bool(b) => ArgValue::Bool(*b),
            serde_json::Value::Number(n) => ArgValue::Number(n.as_f64().unwrap_or(0.0)),
            serde_json::Value::String(s) => ArgValue::String(s.clone()),
            serde_json::Value::Array(items) => {
                ArgValue::Array(items.iter().map(ArgValue::from_json).collect())
            }
            serde_json::Value::Object(_) => {
                ArgValue::String(value.to_string())
            }
        }
    }
}

impl From<&str> for ArgValue {
    fn from(s: &str) -> Self {
        ArgValue::String(s.to_string())
    }
}

impl From<String> for ArgValue {
    fn from(s: String) -> Self {
        ArgValue::String(s)
    }
}

impl From<bool> for ArgValue {
    fn from(b: bool) -> Self {
        ArgValue::Bool(b)
    }
}

impl From<f64> for ArgValue {
    fn from(n: f64) -> Self {
        ArgValue::Number(n)
    }
}

/// Parsed invocation arguments: a mapping from option name to value, plus
/// an ordered list of positional values.
///
/// By convention the argv front end stores the resolved command path under
/// the `_` key as an array of strings (mirroring `{ arguments: { _: [...] ,
/// ... } }` in the end-to-end scenarios).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Arguments {
    /// Option name → value.
    #[serde(flatten)]
    pub options: BTreeMap<String, ArgValue>,
    /// Ordered positional values, independent of `options`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub positional_list: Vec<ArgValue>,
}

impl Arguments {
    /// Create an empty set of arguments.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an option by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ArgValue> {
        self.options.get(name)
    }

    /// Set (or replace) an option's value.
    pub fn set(&mut self, name: impl Into<String>, value: ArgValue) {
        self.options.insert(name.into(), value);
    }

    /// `true` if an option is present and not [`ArgValue::Null`].
    #[must_use]
    pub fn is_present(&self, name: &str) -> bool {
        self.options.get(name).is_some_and(|v| !v.is_null())
    }

    /// The resolved command path stored under the conventional `_` key, if
    /// present.
    #[must_use]
    pub fn command_path(&self) -> Vec<String> {
        match self.options.get("_") {
            Some(ArgValue::Array(items)) => items
                .iter()
                .filter_map(ArgValue::as_str)
                .map(str::to_string)
                .collect(),
            _ => Vec::new(),
        }
    }

    /// A shallow copy of this value — used as the starting point for a
    /// chained step's arguments (spec.md §4.F step 1).
    #[must_use]
    pub fn shallow_copy(&self) -> Self {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_present_is_false_for_null() {
        let mut args = Arguments::new();
        args.set("name", ArgValue::Null);
        assert!(!args.is_present("name"));
    }

    #[test]
    fn is_present_is_true_for_non_null() {
        let mut args = Arguments::new();
        args.set("name", ArgValue::String("Ada".into()));
        assert!(args.is_present("name"));
    }

    #[test]
    fn command_path_reads_underscore_key() {
        let mut args = Arguments::new();
        args.set(
            "_",
            ArgValue::Array(vec!["greet".into(), "now".into()]),
        );
        assert_eq!(args.command_path(), vec!["greet".to_string(), "now".to_string()]);
    }

    #[test]
    fn json_roundtrip_preserves_types() {
        for v in [
            ArgValue::Null,
            ArgValue::Bool(true),
            ArgValue::Number(3.5),
            ArgValue::String("x".into()),
            ArgValue::Array(vec![ArgValue::Number(1.0), ArgValue::String("y".into())]),
        ] {
            let json = v.to_json();
            assert_eq!(ArgValue::from_json(&json), v);
        }
    }
}
