// SPDX-License-Identifier: MIT OR Apache-2.0
//! The trivial JSON-path language: dotted field access plus numeric array
//! indices, e.g. `"result.items.0.id"`.

use serde_json::Value;

/// Evaluate `path` against `root`. Each dotted segment is either an object
/// key or, if it parses as a `usize`, an array index. A segment that does
/// not resolve — a missing key, an out-of-range index, or indexing into a
/// non-container — yields [`Value::Null`] rather than an error (spec.md
/// §4.F step 3: "missing paths yield a binding of undefined/null").
#[must_use]
pub fn evaluate(root: &Value, path: &str) -> Value {
    if path.is_empty() {
        return root.clone();
    }
    let mut current = root;
    for segment in path.split('.') {
        let next = if let Ok(index) = segment.parse::<usize>() {
            current.as_array().and_then(|arr| arr.get(index))
        } else {
            current.as_object().and_then(|obj| obj.get(segment))
        };
        match next {
            Some(value) => current = value,
            None => return Value::Null,
        }
    }
    current.clone()
}
