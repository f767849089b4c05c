// SPDX-License-Identifier: MIT OR Apache-2.0
#![doc = include_str!("../README.md")]
//! clihost-credential
#![deny(unsafe_code)]
#![warn(missing_docs)]

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use clihost_error::{ErrorKind, ErrorRecord, ErrorSubkind};
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::debug;

/// Build the account key the Profile Store & Manager uses to address a
/// secure field: `"<profileType>_<profileName>_<secureFieldName>"`.
#[must_use]
pub fn account_key(profile_type: &str, profile_name: &str, field: &str) -> String {
    format!("{profile_type}_{profile_name}_{field}")
}

/// The credential manager capability: `load`/`save`/`delete` of an opaque
/// secret string, plus an optional one-time async `initialize`.
///
/// Exactly one implementation is active per process (spec.md §4.E
/// replacement discipline); the host names or provides it at startup.
#[async_trait]
pub trait CredentialManager: Send + Sync {
    /// One-time asynchronous setup, invoked before first use. The default
    /// implementation does nothing.
    async fn initialize(&self) -> Result<(), ErrorRecord> {
        Ok(())
    }

    /// Retrieve the secret for `account`, or `None` if absent.
    async fn load(&self, account: &str) -> Result<Option<String>, ErrorRecord>;

    /// Persist `secret` under `account`. Rejects an empty secret with
    /// `Internal/MissingSecureField`.
    async fn save(&self, account: &str, secret: &str) -> Result<(), ErrorRecord>;

    /// Remove the secret stored under `account`, if any.
    async fn delete(&self, account: &str) -> Result<(), ErrorRecord>;
}

/// The default credential manager: symmetric base64 wrapping over an
/// in-memory map. Suitable for hosts that have not wired up an OS keystore
/// or other secret store; not intended to protect secrets at rest.
#[derive(Default)]
pub struct InertCredentialManager {
    store: Mutex<HashMap<String, String>>,
}

impl InertCredentialManager {
    /// Construct an empty manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialManager for InertCredentialManager {
    async fn load(&self, account: &str) -> Result<Option<String>, ErrorRecord> {
        let store = self.store.lock().await;
        let Some(encoded) = store.get(account) else {
            debug!(target: "clihost.credential", account, "load miss");
            return Ok(None);
        };
        let decoded = BASE64.decode(encoded.as_bytes()).map_err(|err| {
            ErrorRecord::new(ErrorKind::Internal, "stored credential is not valid base64")
                .with_subkind(ErrorSubkind::Unknown)
                .with_details(err.to_string())
        })?;
        let secret = String::from_utf8(decoded).map_err(|err| {
            ErrorRecord::new(ErrorKind::Internal, "stored credential is not valid UTF-8")
                .with_subkind(ErrorSubkind::Unknown)
                .with_details(err.to_string())
        })?;
        Ok(Some(secret))
    }

    async fn save(&self, account: &str, secret: &str) -> Result<(), ErrorRecord> {
        if secret.is_empty() {
            return Err(ErrorRecord::new(
                ErrorKind::Internal,
                "cannot save an empty or absent secret",
            )
            .with_subkind(ErrorSubkind::MissingSecureField)
            .with_details(account.to_string()));
        }
        let encoded = BASE64.encode(secret.as_bytes());
        let mut store = self.store.lock().await;
        store.insert(account.to_string(), encoded);
        debug!(target: "clihost.credential", account, "saved");
        Ok(())
    }

    async fn delete(&self, account: &str) -> Result<(), ErrorRecord> {
        let mut store = self.store.lock().await;
        store.remove(account);
        debug!(target: "clihost.credential", account, "deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_key_format() {
        assert_eq!(account_key("aws", "prod", "secret"), "aws_prod_secret");
    }

    #[tokio::test]
    async fn save_then_load_roundtrips() {
        let mgr = InertCredentialManager::new();
        mgr.save("aws_prod_secret", "s3cr3t").await.unwrap();
        let loaded = mgr.load("aws_prod_secret").await.unwrap();
        assert_eq!(loaded.as_deref(), Some("s3cr3t"));
    }

    #[tokio::test]
    async fn load_of_missing_account_is_none() {
        let mgr = InertCredentialManager::new();
        assert_eq!(mgr.load("nope").await.unwrap(), None);
    }

    #[tokio::test]
    async fn save_rejects_empty_secret() {
        let mgr = InertCredentialManager::new();
        let err = mgr.save("aws_prod_secret", "").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Internal);
        assert_eq!(err.subkind, Some(ErrorSubkind::MissingSecureField));
    }

    #[tokio::test]
    async fn delete_removes_secret() {
        let mgr = InertCredentialManager::new();
        mgr.save("a_b_c", "v").await.unwrap();
        mgr.delete("a_b_c").await.unwrap();
        assert_eq!(mgr.load("a_b_c").await.unwrap(), None);
    }

    #[tokio::test]
    async fn initialize_default_is_a_no_op() {
        let mgr = InertCredentialManager::new();
        mgr.initialize().await.unwrap();
    }
}
