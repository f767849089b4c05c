// SPDX-License-Identifier: MIT OR Apache-2.0
//! Unified error taxonomy with stable error codes for the command processor
//! pipeline.
//!
//! Every pipeline failure is converted into an [`ErrorRecord`] carrying a
//! machine-readable [`ErrorKind`] (and, where the kind has subkinds, an
//! [`ErrorSubkind`]), a human-readable message, optional additional details,
//! an optional stack string, and an optional cause chain. Use the builder
//! returned by [`ErrorRecord::new`] to construct records fluently.

#![deny(unsafe_code)]
#![warn(missing_docs)]

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ErrorKind
// ---------------------------------------------------------------------------

/// The closed set of error kinds a pipeline invocation can fail with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Syntax validation rejected the arguments.
    Syntax,
    /// Profile loading or stdin draining failed during preparation.
    Preparation,
    /// The handler threw a value shaped like an imperative error.
    HandlerImperative,
    /// The handler threw something that did not match any known shape.
    HandlerUnhandled,
    /// The handler threw a plain string.
    HandlerStringReject,
    /// The handler rejected silently (threw null/undefined, or nothing).
    HandlerSilentReject,
    /// A programmer/framework-level error (bad format, cancellation, ...).
    Internal,
}

impl ErrorKind {
    /// Stable `&'static str` representation (e.g. `"SYNTAX"`).
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Syntax => "SYNTAX",
            Self::Preparation => "PREPARATION",
            Self::HandlerImperative => "HANDLER_IMPERATIVE",
            Self::HandlerUnhandled => "HANDLER_UNHANDLED",
            Self::HandlerStringReject => "HANDLER_STRING_REJECT",
            Self::HandlerSilentReject => "HANDLER_SILENT_REJECT",
            Self::Internal => "INTERNAL",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ErrorSubkind
// ---------------------------------------------------------------------------

/// Finer-grained classification within [`ErrorKind::Preparation`] and
/// [`ErrorKind::Internal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorSubkind {
    /// A requested profile (type/name) could not be found.
    ProfileMissing,
    /// Profile dependency resolution found a cycle.
    ProfileCycle,
    /// A profile's dependency failed to load.
    DependencyFailed,
    /// A required secure field could not be retrieved from the credential
    /// manager.
    CredentialMissing,
    /// Draining stdin for the command failed.
    StdinFailed,
    /// A save to the credential manager was rejected for an empty secret.
    MissingSecureField,
    /// Resolving or instantiating the handler failed.
    HandlerInstantiation,
    /// An unsupported response format was requested.
    BadFormat,
    /// The invocation was cancelled via its cancellation token.
    Cancelled,
    /// Catch-all for unexpected internal errors.
    Unknown,
}

impl ErrorSubkind {
    /// Stable `&'static str` representation (e.g. `"PROFILE_CYCLE"`).
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProfileMissing => "PROFILE_MISSING",
            Self::ProfileCycle => "PROFILE_CYCLE",
            Self::DependencyFailed => "DEPENDENCY_FAILED",
            Self::CredentialMissing => "CREDENTIAL_MISSING",
            Self::StdinFailed => "STDIN_FAILED",
            Self::MissingSecureField => "MISSING_SECURE_FIELD",
            Self::HandlerInstantiation => "HANDLER_INSTANTIATION",
            Self::BadFormat => "BAD_FORMAT",
            Self::Cancelled => "CANCELLED",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for ErrorSubkind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ErrorRecord
// ---------------------------------------------------------------------------

/// A structured, serializable failure attached to a [`Response`].
///
/// [`Response`]: https://docs.rs/clihost-response
///
/// ```
/// use clihost_error::{ErrorKind, ErrorRecord};
///
/// let err = ErrorRecord::new(ErrorKind::Syntax, "Command syntax invalid")
///     .with_details("use \"--help\" for usage");
/// assert_eq!(err.kind, ErrorKind::Syntax);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ErrorRecord {
    /// Machine-readable error kind.
    pub kind: ErrorKind,
    /// Finer-grained classification, present for `Preparation` and
    /// `Internal` kinds where the spec names a closed subkind set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subkind: Option<ErrorSubkind>,
    /// Human-readable message.
    #[serde(rename = "msg")]
    pub message: String,
    /// Optional additional detail string (original error's
    /// `additionalDetails`, a stringified thrown value, a cycle path, ...).
    #[serde(rename = "additionalDetails", skip_serializing_if = "Option::is_none")]
    pub additional_details: Option<String>,
    /// Optional stack trace string, carried through from an unhandled
    /// handler error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
    /// Chain of causing errors, innermost last.
    #[serde(rename = "causeErrors", skip_serializing_if = "Vec::is_empty", default)]
    pub cause_chain: Vec<ErrorRecord>,
}

impl ErrorRecord {
    /// Create a new error record with the given kind and message.
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            subkind: None,
            message: message.into(),
            additional_details: None,
            stack: None,
            cause_chain: Vec::new(),
        }
    }

    /// Attach a subkind.
    #[must_use]
    pub fn with_subkind(mut self, subkind: ErrorSubkind) -> Self {
        self.subkind = Some(subkind);
        self
    }

    /// Attach additional details.
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.additional_details = Some(details.into());
        self
    }

    /// Attach a stack trace string.
    #[must_use]
    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }

    /// Append a causing error to the chain.
    #[must_use]
    pub fn with_cause(mut self, cause: ErrorRecord) -> Self {
        self.cause_chain.push(cause);
        self
    }

    /// Wrap this error as the sole cause of a new `Preparation` error with
    /// the given subkind and message, carrying the original message and
    /// additional details through to the wrapper's own fields as the spec
    /// requires ("the original error's `message` and `additionalDetails`
    /// are carried through").
    #[must_use]
    pub fn wrap(self, subkind: ErrorSubkind, message: impl Into<String>) -> Self {
        let mut wrapper = ErrorRecord::new(ErrorKind::Preparation, message)
            .with_subkind(subkind);
        if let Some(details) = self.additional_details.clone() {
            wrapper = wrapper.with_details(details);
        }
        wrapper.with_cause(self)
    }
}

impl std::fmt::Display for ErrorRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}", self.kind.as_str())?;
        if let Some(sub) = self.subkind {
            write!(f, "/{}", sub.as_str())?;
        }
        write!(f, "] {}", self.message)
    }
}

impl std::error::Error for ErrorRecord {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_construction() {
        let err = ErrorRecord::new(ErrorKind::Internal, "boom");
        assert_eq!(err.kind, ErrorKind::Internal);
        assert_eq!(err.message, "boom");
        assert!(err.subkind.is_none());
        assert!(err.cause_chain.is_empty());
    }

    #[test]
    fn display_without_subkind() {
        let err = ErrorRecord::new(ErrorKind::Syntax, "missing option");
        assert_eq!(err.to_string(), "[SYNTAX] missing option");
    }

    #[test]
    fn display_with_subkind() {
        let err = ErrorRecord::new(ErrorKind::Preparation, "cycle detected")
            .with_subkind(ErrorSubkind::ProfileCycle);
        assert_eq!(err.to_string(), "[PREPARATION/PROFILE_CYCLE] cycle detected");
    }

    #[test]
    fn wrap_carries_message_and_details_through() {
        let cause = ErrorRecord::new(ErrorKind::Internal, "credential backend unreachable")
            .with_details("account=main_m1_token");
        let wrapped = cause
            .clone()
            .wrap(ErrorSubkind::DependencyFailed, "failed to load dependency dep:d1");
        assert_eq!(wrapped.kind, ErrorKind::Preparation);
        assert_eq!(wrapped.subkind, Some(ErrorSubkind::DependencyFailed));
        assert_eq!(wrapped.additional_details.as_deref(), Some("account=main_m1_token"));
        assert_eq!(wrapped.cause_chain.len(), 1);
        assert_eq!(wrapped.cause_chain[0], cause);
    }

    #[test]
    fn serde_roundtrip_wire_shape() {
        let err = ErrorRecord::new(ErrorKind::HandlerUnhandled, "Unexpected Command Error: boom")
            .with_details("42");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["msg"], "Unexpected Command Error: boom");
        assert_eq!(json["additionalDetails"], "42");
        assert!(json.get("causeErrors").is_none());
        let back: ErrorRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, err);
    }

    #[test]
    fn all_kinds_have_stable_codes() {
        let kinds = [
            ErrorKind::Syntax,
            ErrorKind::Preparation,
            ErrorKind::HandlerImperative,
            ErrorKind::HandlerUnhandled,
            ErrorKind::HandlerStringReject,
            ErrorKind::HandlerSilentReject,
            ErrorKind::Internal,
        ];
        for k in kinds {
            assert!(!k.as_str().is_empty());
        }
    }
}
