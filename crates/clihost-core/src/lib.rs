// SPDX-License-Identifier: MIT OR Apache-2.0
#![doc = include_str!("../README.md")]
//! clihost-core
#![deny(unsafe_code)]
#![warn(missing_docs)]
//!
//! The stable contract for the command processor pipeline: the
//! [`CommandNode`] definition tree, [`Arguments`]/[`ArgValue`], and the
//! [`ChainedStep`] chained-handler definition. If a host application only
//! takes one dependency from this workspace, it takes this one.

/// Parsed invocation arguments ([`Arguments`], [`ArgValue`]).
pub mod arguments;
/// The command definition tree ([`CommandNode`] and friends).
pub mod command;
/// Prepared-tree emission: inherited-option propagation and alias
/// materialization.
pub mod prepare;

pub use arguments::{ArgValue, Arguments};
pub use command::{
    ArgMapping, ArrayCardinality, ChainedStep, CommandKind, CommandNode, DefinitionError,
    HandlerRef, Invocation, NumericRange, OptionSpec, PositionalSpec, ProfileRequirements,
    ValueType,
};
pub use prepare::{prepare, reprepare, PreparedNode};
