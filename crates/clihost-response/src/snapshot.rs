// SPDX-License-Identifier: MIT OR Apache-2.0
//! The frozen, wire-stable [`ResponseSnapshot`].

use clihost_error::ErrorRecord;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The JSON-serializable snapshot returned from [`Response::finalize`] and
/// ultimately from `Processor::invoke`.
///
/// [`Response::finalize`]: crate::Response::finalize
///
/// Field names match the stable wire format exactly: `exitCode` rather
/// than `exit_code`, with every other field already a single lowercase
/// word.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResponseSnapshot {
    /// `true` iff the invocation succeeded.
    pub success: bool,
    /// `0` on success, non-zero on failure.
    pub exit_code: i32,
    /// Human-readable summary message.
    pub message: String,
    /// Arbitrary structured payload set by the handler.
    pub data: Value,
    /// Buffered stdout content.
    pub stdout: String,
    /// Buffered stderr content.
    pub stderr: String,
    /// Structured failure detail, or `None` on success. Always present on
    /// the wire as `"error": {…} | null`, never omitted.
    pub error: Option<ErrorRecord>,
}

impl ResponseSnapshot {
    /// `true` iff `exitCode == 0 == success == true == (error is None)`
    /// all agree, per spec.md §8 property 2.
    #[must_use]
    pub fn is_internally_consistent(&self) -> bool {
        (self.exit_code == 0) == self.success && self.success == self.error.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_format_uses_camel_case_exit_code() {
        let snap = ResponseSnapshot {
            success: true,
            exit_code: 0,
            message: "ok".into(),
            data: Value::Null,
            stdout: String::new(),
            stderr: String::new(),
            error: None,
        };
        let json = serde_json::to_value(&snap).unwrap();
        assert!(json.get("exitCode").is_some());
        assert!(json.get("exit_code").is_none());
        assert_eq!(json.get("error"), Some(&Value::Null));
    }

    #[test]
    fn internally_consistent_detects_mismatch() {
        let snap = ResponseSnapshot {
            success: true,
            exit_code: 1,
            message: String::new(),
            data: Value::Null,
            stdout: String::new(),
            stderr: String::new(),
            error: None,
        };
        assert!(!snap.is_internally_consistent());
    }
}
