// SPDX-License-Identifier: MIT OR Apache-2.0
//! The [`ProfileStore`] capability and its in-memory reference
//! implementation, [`MapProfileStore`].

use crate::definition::ProfileDefinition;
use async_trait::async_trait;
use clihost_error::ErrorRecord;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// The read-only backing store a [`crate::ProfileManager`] resolves
/// profiles against.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Fetch a named profile of the given type.
    async fn get(
        &self,
        profile_type: &str,
        name: &str,
    ) -> Result<Option<ProfileDefinition>, ErrorRecord>;

    /// The default profile name for a type, if one is configured.
    async fn default_name(&self, profile_type: &str) -> Result<Option<String>, ErrorRecord>;

    /// All profiles of the given type.
    async fn get_all(&self, profile_type: &str) -> Result<Vec<ProfileDefinition>, ErrorRecord>;
}

/// An in-memory [`ProfileStore`], useful as a reference implementation and
/// for tests; hosts with persistent profile storage provide their own.
#[derive(Default)]
pub struct MapProfileStore {
    profiles: RwLock<HashMap<(String, String), ProfileDefinition>>,
    defaults: RwLock<HashMap<String, String>>,
}

impl MapProfileStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a profile definition.
    pub async fn put(&self, definition: ProfileDefinition) {
        let key = (definition.profile_type.clone(), definition.name.clone());
        self.profiles.write().await.insert(key, definition);
    }

    /// Mark `name` as the default profile for `profile_type`.
    pub async fn set_default(&self, profile_type: impl Into<String>, name: impl Into<String>) {
        self.defaults
            .write()
            .await
            .insert(profile_type.into(), name.into());
    }
}

#[async_trait]
impl ProfileStore for MapProfileStore {
    async fn get(
        &self,
        profile_type: &str,
        name: &str,
    ) -> Result<Option<ProfileDefinition>, ErrorRecord> {
        let key = (profile_type.to_string(), name.to_string());
        Ok(self.profiles.read().await.get(&key).cloned())
    }

    async fn default_name(&self, profile_type: &str) -> Result<Option<String>, ErrorRecord> {
        Ok(self.defaults.read().await.get(profile_type).cloned())
    }

    async fn get_all(&self, profile_type: &str) -> Result<Vec<ProfileDefinition>, ErrorRecord> {
        Ok(self
            .profiles
            .read()
            .await
            .values()
            .filter(|def| def.profile_type == profile_type)
            .cloned()
            .collect())
    }
}
