// SPDX-License-Identifier: MIT OR Apache-2.0
//! A typed `name → Arc<dyn Handler>` registry populated at host startup,
//! in place of dynamic module loading.

use crate::handler::Handler;
use std::collections::HashMap;
use std::sync::Arc;

/// Maps a [`clihost_core::HandlerRef`] to a registered [`Handler`]
/// implementation.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Arc<dyn Handler>>,
}

impl HandlerRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler under the given reference, replacing any
    /// previous entry.
    pub fn register(&mut self, handler_ref: impl Into<String>, handler: impl Handler + 'static) {
        self.handlers.insert(handler_ref.into(), Arc::new(handler));
    }

    /// Look up a handler by reference.
    #[must_use]
    pub fn get(&self, handler_ref: &str) -> Option<Arc<dyn Handler>> {
        self.handlers.get(handler_ref).cloned()
    }

    /// Whether a handler is registered under the given reference.
    #[must_use]
    pub fn contains(&self, handler_ref: &str) -> bool {
        self.handlers.contains_key(handler_ref)
    }

    /// Sorted list of every registered reference.
    #[must_use]
    pub fn list(&self) -> Vec<&str> {
        let mut v: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        v.sort_unstable();
        v
    }
}
