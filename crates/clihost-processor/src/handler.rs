// SPDX-License-Identifier: MIT OR Apache-2.0
//! The [`Handler`] capability and the invocation context it receives.

use async_trait::async_trait;
use clihost_core::{Arguments, CommandNode};
use clihost_profile::ProfileMap;
use clihost_response::Response;
use serde_json::Value;

/// The read-only context and mutable [`Response`] a [`Handler`] is invoked
/// with, mirroring spec.md §4.G's `process({response, profiles, arguments,
/// definition, fullDefinition})`.
pub struct InvocationContext<'a> {
    /// The response the handler writes output and outcome into.
    pub response: &'a mut Response,
    /// Resolved profiles available to this invocation.
    pub profiles: &'a ProfileMap,
    /// The arguments driving this step (top-level, or chain-linked).
    pub arguments: &'a Arguments,
    /// The command node being invoked.
    pub definition: &'a CommandNode,
    /// The root of the full command tree.
    pub full_definition: &'a CommandNode,
}

/// The shape of a handler's failure, corresponding to the thrown-value
/// shapes of spec.md §4.G's handler-error mapping table.
#[derive(Debug, Clone, PartialEq)]
pub enum HandlerFailure {
    /// A structured, imperative-error-shaped failure.
    Imperative {
        /// The failure's message.
        message: String,
        /// Optional additional detail.
        additional_details: Option<String>,
        /// Causes already in `ErrorRecord` shape.
        cause_errors: Vec<clihost_error::ErrorRecord>,
    },
    /// A generic failure carrying a message and a stack trace.
    Unhandled {
        /// The failure's message.
        message: String,
        /// Stack trace text, if available.
        stack: Option<String>,
    },
    /// A plain string rejection.
    StringReject(String),
    /// A silent rejection (no value at all).
    SilentReject,
    /// Any other value shape.
    Other(Value),
}

/// A unit of work a [`crate::Processor`] can invoke: either the sole
/// handler for a command, or one step of a chain.
#[async_trait]
pub trait Handler: Send + Sync {
    /// Run this handler against `ctx`, writing to `ctx.response` and
    /// returning `Ok(())` on success or a [`HandlerFailure`] otherwise.
    async fn process(&self, ctx: &mut InvocationContext<'_>) -> Result<(), HandlerFailure>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handler_failure_variants_are_distinguishable() {
        assert_ne!(
            HandlerFailure::StringReject("a".into()),
            HandlerFailure::SilentReject
        );
    }
}
