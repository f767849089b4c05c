// SPDX-License-Identifier: MIT OR Apache-2.0
#![doc = include_str!("../README.md")]
//! clihost-profile
#![deny(unsafe_code)]
#![warn(missing_docs)]

/// [`Profile`], [`ProfileDefinition`], and [`ProfileMap`].
pub mod definition;
/// [`ProfileManager`] and dependency resolution.
pub mod manager;
/// [`store::ProfileStore`] and [`store::MapProfileStore`].
pub mod store;

pub use definition::{Profile, ProfileDefinition, ProfileDependency, ProfileMap};
pub use manager::ProfileManager;
pub use store::{MapProfileStore, ProfileStore};
