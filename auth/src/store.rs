use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;

use crate::TokenNamespace;

/// Namespace-scoped persistence for access tokens.
///
/// Operations are synchronous and idempotent: the request path reads the
/// store on every call, so implementations must be cheap. The bundled
/// [`MemorySessionStore`] covers in-process use; an embedding shell with
/// session-scoped storage implements the same trait.
pub trait SessionStore: Send + Sync {
    /// Current token for `namespace`, if one is stored.
    fn get(&self, namespace: TokenNamespace) -> Option<String>;

    /// Replaces the token for `namespace`.
    fn set(&self, token: &str, namespace: TokenNamespace);

    /// Drops the token for `namespace`. A no-op when none is stored.
    fn remove(&self, namespace: TokenNamespace);

    /// Drops every namespace's token.
    fn clear_all(&self);
}

/// In-memory [`SessionStore`] keyed by namespace.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    tokens: Mutex<HashMap<TokenNamespace, String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tokens(&self) -> MutexGuard<'_, HashMap<TokenNamespace, String>> {
        self.tokens.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, namespace: TokenNamespace) -> Option<String> {
        self.tokens().get(&namespace).cloned()
    }

    fn set(&self, token: &str, namespace: TokenNamespace) {
        self.tokens().insert(namespace, token.to_string());
    }

    fn remove(&self, namespace: TokenNamespace) {
        self.tokens().remove(&namespace);
    }

    fn clear_all(&self) {
        self.tokens().clear();
    }
}
