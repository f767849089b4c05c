// SPDX-License-Identifier: MIT OR Apache-2.0
#![doc = include_str!("../README.md")]
//! clihost-response
#![deny(unsafe_code)]
#![warn(missing_docs)]

/// The [`Response`] accumulator and its supporting types.
pub mod response;
/// The frozen [`snapshot::ResponseSnapshot`] wire type.
pub mod snapshot;

pub use response::{
    AlreadyFinalized, ProgressSpec, Response, ResponseFormat, ResponseState, Stream,
    EXIT_CODE_FAILURE, EXIT_CODE_SUCCESS,
};
pub use snapshot::ResponseSnapshot;
