// SPDX-License-Identifier: MIT OR Apache-2.0
//! Profile data types: the stored [`ProfileDefinition`], the resolved
//! [`Profile`], and the per-invocation [`ProfileMap`].

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A `{type, name}` reference to another profile a profile depends on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ProfileDependency {
    /// The dependency's profile type.
    pub profile_type: String,
    /// The dependency's profile name.
    pub name: String,
}

/// A profile as held by the backing store: non-secure fields inline, secure
/// field names recorded separately so their values are never held here in
/// plaintext (the [`crate::CredentialManager`] owns those).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ProfileDefinition {
    /// Profile name, unique within its type.
    pub name: String,
    /// Profile type (e.g. `"aws"`, `"github"`).
    pub profile_type: String,
    /// Non-secure field values.
    #[serde(default)]
    pub fields: BTreeMap<String, Value>,
    /// Names of fields whose values live in the credential manager instead
    /// of `fields`.
    #[serde(default)]
    pub secure_fields: Vec<String>,
    /// Other profiles this one depends on.
    #[serde(default)]
    pub dependencies: Vec<ProfileDependency>,
}

impl ProfileDefinition {
    /// Construct a definition with no secure fields or dependencies.
    #[must_use]
    pub fn new(name: impl Into<String>, profile_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            profile_type: profile_type.into(),
            fields: BTreeMap::new(),
            secure_fields: Vec::new(),
            dependencies: Vec::new(),
        }
    }
}

/// A fully resolved profile: dependencies validated, secure fields
/// materialized, handed to the handler read-only for the duration of one
/// invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Profile {
    /// Profile name.
    pub name: String,
    /// Profile type.
    pub profile_type: String,
    /// All field values, including materialized secure fields.
    pub fields: BTreeMap<String, Value>,
}

/// The per-invocation set of resolved profiles, grouped by type, built by
/// [`crate::ProfileManager::resolve_requirements`] and handed to the
/// handler via the invocation context.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ProfileMap {
    by_type: BTreeMap<String, Vec<Profile>>,
}

impl ProfileMap {
    /// An empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a resolved profile under its type.
    pub fn insert(&mut self, profile: Profile) {
        self.by_type
            .entry(profile.profile_type.clone())
            .or_default()
            .push(profile);
    }

    /// The first resolved profile of `profile_type`, if any.
    #[must_use]
    pub fn get(&self, profile_type: &str) -> Option<&Profile> {
        self.by_type.get(profile_type).and_then(|v| v.first())
    }

    /// All resolved profiles of `profile_type`.
    #[must_use]
    pub fn get_all(&self, profile_type: &str) -> &[Profile] {
        self.by_type
            .get(profile_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// A specific resolved profile by type and name.
    #[must_use]
    pub fn get_named(&self, profile_type: &str, name: &str) -> Option<&Profile> {
        self.get_all(profile_type).iter().find(|p| p.name == name)
    }
}
