// SPDX-License-Identifier: MIT OR Apache-2.0
#![doc = include_str!("../README.md")]
//! clihost-chain
#![deny(unsafe_code)]
#![warn(missing_docs)]

/// [`link_step`] and the chain-step argument computation it implements.
pub mod link;
/// The trivial dotted/indexed JSON-path evaluator ([`path::evaluate`]).
pub mod path;

pub use link::link_step;
pub use path::evaluate;
