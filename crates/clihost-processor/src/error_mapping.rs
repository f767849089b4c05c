// SPDX-License-Identifier: MIT OR Apache-2.0
//! Mapping a [`HandlerFailure`] onto [`ErrorRecord`], per spec.md §4.G's
//! handler-error mapping table.

use crate::handler::HandlerFailure;
use clihost_error::{ErrorKind, ErrorRecord};

/// Convert a handler's reported failure into the wire-stable
/// [`ErrorRecord`] shape.
#[must_use]
pub fn map_handler_failure(failure: HandlerFailure) -> ErrorRecord {
    match failure {
        HandlerFailure::Imperative {
            message,
            additional_details,
            cause_errors,
        } => {
            let mut err = ErrorRecord::new(ErrorKind::HandlerImperative, message);
            if let Some(details) = additional_details {
                err = err.with_details(details);
            }
            for cause in cause_errors {
                err = err.with_cause(cause);
            }
            err
        }
        HandlerFailure::Unhandled { message, stack } => {
            let mut err = ErrorRecord::new(
                ErrorKind::HandlerUnhandled,
                format!("Unexpected Command Error: {message}"),
            );
            if let Some(stack) = stack {
                err = err.with_stack(stack);
            }
            err
        }
        HandlerFailure::StringReject(message) => {
            ErrorRecord::new(ErrorKind::HandlerStringReject, message)
        }
        HandlerFailure::SilentReject => {
            ErrorRecord::new(ErrorKind::HandlerSilentReject, "Command Failed")
        }
        HandlerFailure::Other(value) => {
            ErrorRecord::new(ErrorKind::HandlerUnhandled, "Unexpected Command Error")
                .with_details(value.to_string())
        }
    }
}
