// SPDX-License-Identifier: MIT OR Apache-2.0
#![doc = include_str!("../README.md")]
//! clihost-processor
#![deny(unsafe_code)]
#![warn(missing_docs)]
//!
//! The command processor pipeline: validate, prepare, execute, finalize.
//! Ties together [`clihost_validate`], [`clihost_profile`], and
//! [`clihost_chain`] behind a single [`Processor`] entry point.

/// Cooperative cancellation ([`CancellationToken`]).
pub mod cancel;
/// Mapping a handler's reported failure onto [`clihost_error::ErrorRecord`].
pub mod error_mapping;
/// The [`Handler`] capability and [`InvocationContext`].
pub mod handler;
/// The [`Processor`] pipeline itself.
pub mod processor;
/// The [`HandlerRegistry`] used to resolve handler references.
pub mod registry;

pub use cancel::CancellationToken;
pub use error_mapping::map_handler_failure;
pub use handler::{Handler, HandlerFailure, InvocationContext};
pub use processor::{InvokeParams, Processor, STDIN_ARGUMENT_KEY};
pub use registry::HandlerRegistry;
