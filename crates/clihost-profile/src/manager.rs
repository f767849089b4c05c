// SPDX-License-Identifier: MIT OR Apache-2.0
//! [`ProfileManager`]: dependency-resolving, secure-field-materializing
//! profile loading.

use crate::definition::{Profile, ProfileDefinition, ProfileMap};
use crate::store::ProfileStore;
use clihost_core::ProfileRequirements;
use clihost_credential::{account_key, CredentialManager};
use clihost_error::{ErrorKind, ErrorRecord, ErrorSubkind};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Resolves profiles by type/name against a [`ProfileStore`], following
/// `dependencies` depth-first with cycle detection, memoizing the result of
/// each `type:name` pair within one resolution, and materializing secure
/// fields through a [`CredentialManager`].
pub struct ProfileManager {
    store: Arc<dyn ProfileStore>,
    credentials: Arc<dyn CredentialManager>,
}

type Memo = HashMap<String, Profile>;
type Stack = Vec<String>;

impl ProfileManager {
    /// Build a manager over the given store and credential backend.
    #[must_use]
    pub fn new(store: Arc<dyn ProfileStore>, credentials: Arc<dyn CredentialManager>) -> Self {
        Self { store, credentials }
    }

    /// Load a single profile (by name, or the type's default if `name` is
    /// `None`), resolving its dependency graph as a side effect of
    /// validating it.
    pub async fn load(&self, profile_type: &str, name: Option<&str>) -> Result<Profile, ErrorRecord> {
        let mut memo = Memo::new();
        let mut stack = Stack::new();
        self.resolve_one(profile_type, name, &mut memo, &mut stack)
            .await
    }

    /// Load the default profile of a type.
    pub async fn load_default(&self, profile_type: &str) -> Result<Profile, ErrorRecord> {
        self.load(profile_type, None).await
    }

    /// Load every profile of a type.
    pub async fn load_all(&self, profile_type: &str) -> Result<Vec<Profile>, ErrorRecord> {
        let definitions = self.store.get_all(profile_type).await?;
        let mut memo = Memo::new();
        let mut out = Vec::with_capacity(definitions.len());
        for definition in definitions {
            let mut stack = Stack::new();
            out.push(
                self.resolve_one(&definition.profile_type, Some(&definition.name), &mut memo, &mut stack)
                    .await?,
            );
        }
        Ok(out)
    }

    /// Resolve a command's full [`ProfileRequirements`] into one
    /// [`ProfileMap`], memoizing across required and optional types so a
    /// shared dependency is only loaded once per invocation.
    pub async fn resolve_requirements(
        &self,
        requirements: &ProfileRequirements,
    ) -> Result<ProfileMap, ErrorRecord> {
        let mut memo = Memo::new();
        let mut map = ProfileMap::new();
        let mut inserted = std::collections::HashSet::new();

        for profile_type in &requirements.required {
            let mut stack = Stack::new();
            let profile = self
                .resolve_one(profile_type, None, &mut memo, &mut stack)
                .await?;
            inserted.insert(format!("{}:{}", profile.profile_type, profile.name));
            map.insert(profile);
        }

        for profile_type in &requirements.optional {
            let mut stack = Stack::new();
            match self
                .resolve_one(profile_type, None, &mut memo, &mut stack)
                .await
            {
                Ok(profile) => {
                    inserted.insert(format!("{}:{}", profile.profile_type, profile.name));
                    map.insert(profile);
                }
                Err(err) if err.subkind == Some(ErrorSubkind::ProfileMissing) => {
                    debug!(target: "clihost.profile", profile_type, "optional profile absent, skipping");
                }
                Err(err) => return Err(err),
            }
        }

        // `memo` also holds every transitive dependency resolved along the
        // way; the returned map must carry those too, not just the
        // top-level required/optional types.
        let mut remaining: Vec<_> = memo.into_iter().filter(|(key, _)| !inserted.contains(key)).collect();
        remaining.sort_by(|(a, _), (b, _)| a.cmp(b));
        for (_, profile) in remaining {
            map.insert(profile);
        }

        Ok(map)
    }

    fn resolve_one<'a>(
        &'a self,
        profile_type: &'a str,
        name: Option<&'a str>,
        memo: &'a mut Memo,
        stack: &'a mut Stack,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Profile, ErrorRecord>> + 'a>>
    {
        Box::pin(async move {
            let definition = self.fetch_definition(profile_type, name).await?;
            let key = format!("{}:{}", definition.profile_type, definition.name);

            if let Some(cached) = memo.get(&key) {
                return Ok(cached.clone());
            }
            if stack.contains(&key) {
                let path = format!("{} -> {key}", stack.join(" -> "));
                return Err(ErrorRecord::new(
                    ErrorKind::Preparation,
                    format!("profile dependency cycle detected: {path}"),
                )
                .with_subkind(ErrorSubkind::ProfileCycle)
                .with_details(path));
            }

            stack.push(key.clone());
            for dep in &definition.dependencies {
                if let Err(err) = self
                    .resolve_one(&dep.profile_type, Some(&dep.name), memo, stack)
                    .await
                {
                    stack.pop();
                    return Err(err.wrap(
                        ErrorSubkind::DependencyFailed,
                        format!(
                            "failed to load dependency {}:{}",
                            dep.profile_type, dep.name
                        ),
                    ));
                }
            }
            stack.pop();

            let profile = self.materialize_fields(definition).await?;
            memo.insert(key, profile.clone());
            Ok(profile)
        })
    }

    async fn fetch_definition(
        &self,
        profile_type: &str,
        name: Option<&str>,
    ) -> Result<ProfileDefinition, ErrorRecord> {
        let definition = match name {
            Some(n) => self.store.get(profile_type, n).await?,
            None => match self.store.default_name(profile_type).await? {
                Some(default_name) => self.store.get(profile_type, &default_name).await?,
                None => None,
            },
        };
        definition.ok_or_else(|| {
            ErrorRecord::new(
                ErrorKind::Preparation,
                format!("profile not found: type={profile_type}"),
            )
            .with_subkind(ErrorSubkind::ProfileMissing)
            .with_details(format!("{profile_type}:{}", name.unwrap_or("<default>")))
        })
    }

    async fn materialize_fields(&self, definition: ProfileDefinition) -> Result<Profile, ErrorRecord> {
        let mut fields = definition.fields;
        for field in &definition.secure_fields {
            let account = account_key(&definition.profile_type, &definition.name, field);
            let secret = self.credentials.load(&account).await.map_err(|err| {
                err.wrap(
                    ErrorSubkind::CredentialMissing,
                    format!("failed to retrieve secure field `{field}`"),
                )
            })?;
            let Some(secret) = secret else {
                return Err(ErrorRecord::new(
                    ErrorKind::Preparation,
                    format!("secure field `{field}` could not be retrieved"),
                )
                .with_subkind(ErrorSubkind::CredentialMissing)
                .with_details(account));
            };
            fields.insert(field.clone(), Value::String(secret));
        }
        debug!(target: "clihost.profile", profile_type = %definition.profile_type, name = %definition.name, "resolved");
        Ok(Profile {
            name: definition.name,
            profile_type: definition.profile_type,
            fields,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MapProfileStore;
    use clihost_credential::InertCredentialManager;

    async fn manager_with(store: MapProfileStore, creds: InertCredentialManager) -> ProfileManager {
        ProfileManager::new(Arc::new(store), Arc::new(creds))
    }

    #[tokio::test]
    async fn loads_default_profile() {
        let store = MapProfileStore::new();
        store.put(ProfileDefinition::new("main", "aws")).await;
        store.set_default("aws", "main").await;
        let mgr = manager_with(store, InertCredentialManager::new()).await;
        let profile = mgr.load_default("aws").await.unwrap();
        assert_eq!(profile.name, "main");
    }

    #[tokio::test]
    async fn missing_profile_is_profile_missing() {
        let store = MapProfileStore::new();
        let mgr = manager_with(store, InertCredentialManager::new()).await;
        let err = mgr.load("aws", Some("ghost")).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Preparation);
        assert_eq!(err.subkind, Some(ErrorSubkind::ProfileMissing));
    }

    #[tokio::test]
    async fn cycle_is_detected() {
        let store = MapProfileStore::new();
        let mut a = ProfileDefinition::new("a", "t");
        a.dependencies.push(crate::definition::ProfileDependency {
            profile_type: "t".into(),
            name: "b".into(),
        });
        let mut b = ProfileDefinition::new("b", "t");
        b.dependencies.push(crate::definition::ProfileDependency {
            profile_type: "t".into(),
            name: "a".into(),
        });
        store.put(a).await;
        store.put(b).await;
        let mgr = manager_with(store, InertCredentialManager::new()).await;
        let err = mgr.load("t", Some("a")).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Preparation);
        assert_eq!(err.subkind, Some(ErrorSubkind::ProfileCycle));
    }

    #[tokio::test]
    async fn dependency_failure_is_wrapped() {
        let store = MapProfileStore::new();
        let mut root = ProfileDefinition::new("root", "t");
        root.dependencies.push(crate::definition::ProfileDependency {
            profile_type: "t".into(),
            name: "missing".into(),
        });
        store.put(root).await;
        let mgr = manager_with(store, InertCredentialManager::new()).await;
        let err = mgr.load("t", Some("root")).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Preparation);
        assert_eq!(err.subkind, Some(ErrorSubkind::DependencyFailed));
        assert_eq!(err.cause_chain.len(), 1);
        assert_eq!(err.cause_chain[0].subkind, Some(ErrorSubkind::ProfileMissing));
    }

    #[tokio::test]
    async fn secure_field_missing_is_credential_missing() {
        let store = MapProfileStore::new();
        let mut def = ProfileDefinition::new("main", "aws");
        def.secure_fields.push("token".into());
        store.put(def).await;
        let mgr = manager_with(store, InertCredentialManager::new()).await;
        let err = mgr.load("aws", Some("main")).await.unwrap_err();
        assert_eq!(err.subkind, Some(ErrorSubkind::CredentialMissing));
    }

    #[tokio::test]
    async fn secure_field_is_materialized_from_credential_manager() {
        let store = MapProfileStore::new();
        let mut def = ProfileDefinition::new("main", "aws");
        def.secure_fields.push("token".into());
        store.put(def).await;
        let creds = InertCredentialManager::new();
        creds.save("aws_main_token", "s3cr3t").await.unwrap();
        let mgr = manager_with(store, creds).await;
        let profile = mgr.load("aws", Some("main")).await.unwrap();
        assert_eq!(
            profile.fields.get("token"),
            Some(&Value::String("s3cr3t".into()))
        );
    }

    #[tokio::test]
    async fn shared_dependency_resolves_for_independent_roots() {
        let store = MapProfileStore::new();
        let mut root = ProfileDefinition::new("root", "t");
        root.dependencies.push(crate::definition::ProfileDependency {
            profile_type: "shared".into(),
            name: "dep".into(),
        });
        let mut other = ProfileDefinition::new("other", "t");
        other.dependencies.push(crate::definition::ProfileDependency {
            profile_type: "shared".into(),
            name: "dep".into(),
        });
        store.put(root).await;
        store.put(other).await;
        store.put(ProfileDefinition::new("dep", "shared")).await;

        let mgr = manager_with(store, InertCredentialManager::new()).await;
        assert!(mgr.load("t", Some("root")).await.is_ok());
        assert!(mgr.load("t", Some("other")).await.is_ok());
    }

    #[tokio::test]
    async fn optional_missing_profile_is_skipped_in_requirements() {
        let store = MapProfileStore::new();
        store.put(ProfileDefinition::new("main", "aws")).await;
        store.set_default("aws", "main").await;
        let mgr = manager_with(store, InertCredentialManager::new()).await;
        let reqs = ProfileRequirements {
            required: vec!["aws".into()],
            optional: vec!["github".into()],
        };
        let map = mgr.resolve_requirements(&reqs).await.unwrap();
        assert!(map.get("aws").is_some());
        assert!(map.get("github").is_none());
    }

    #[tokio::test]
    async fn resolve_requirements_includes_transitive_dependencies_in_map() {
        let store = MapProfileStore::new();
        let mut main = ProfileDefinition::new("m1", "main");
        main.dependencies.push(crate::definition::ProfileDependency {
            profile_type: "dep".into(),
            name: "d1".into(),
        });
        store.put(main).await;
        store.set_default("main", "m1").await;
        store.put(ProfileDefinition::new("d1", "dep")).await;
        store.set_default("dep", "d1").await;

        let mgr = manager_with(store, InertCredentialManager::new()).await;
        let reqs = ProfileRequirements {
            required: vec!["main".into()],
            optional: vec![],
        };
        let map = mgr.resolve_requirements(&reqs).await.unwrap();
        assert_eq!(map.get("main").unwrap().name, "m1");
        assert_eq!(map.get("dep").unwrap().name, "d1");
    }

    #[tokio::test]
    async fn required_missing_profile_fails_requirements() {
        let store = MapProfileStore::new();
        let mgr = manager_with(store, InertCredentialManager::new()).await;
        let reqs = ProfileRequirements {
            required: vec!["aws".into()],
            optional: vec![],
        };
        let err = mgr.resolve_requirements(&reqs).await.unwrap_err();
        assert_eq!(err.subkind, Some(ErrorSubkind::ProfileMissing));
    }
}
