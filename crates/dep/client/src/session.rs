//! Per-name DEP session token cache.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Process-local cache of DEP session tokens, keyed by DEP name.
///
/// The outer map lock is held only to look up the per-name slot; the slot
/// itself is an async mutex held across the `/session` fetch, so
/// concurrent callers for one name wait on a single upstream refresh while
/// distinct names proceed in parallel. Session tokens are never persisted.
#[derive(Clone, Default)]
pub(crate) struct SessionMap {
    inner: Arc<Mutex<HashMap<String, SessionSlot>>>,
}

pub(crate) type SessionSlot = Arc<tokio::sync::Mutex<Option<String>>>;

impl SessionMap {
    /// The slot for a DEP name, created empty on first use.
    pub(crate) fn slot(&self, name: &str) -> SessionSlot {
        let mut map = self.inner.lock().expect("session map lock");
        map.entry(name.to_string()).or_default().clone()
    }

    /// Drop the cached token for a name, but only if it still equals
    /// `stale` (a concurrent caller may have refreshed it already).
    pub(crate) async fn invalidate(&self, name: &str, stale: &str) {
        let slot = self.slot(name);
        let mut token = slot.lock().await;
        if token.as_deref() == Some(stale) {
            *token = None;
        }
    }
}
