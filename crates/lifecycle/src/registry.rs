//! Listener registry keyed by lifecycle event name
//!
//! Concurrency model: a plain map behind an `RwLock`, with dispatch
//! reading cloned snapshots. No lock is held across callback
//! invocation.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use parking_lot::RwLock;

use hostkit_core::HostContext;

/// Callback handle registered for a named lifecycle event
///
/// Identity is the `Arc` allocation: registering the same handle twice
/// under one name is a no-op, while two separately created closures are
/// always distinct.
pub type LifecycleCallback = Arc<dyn Fn(&HostContext) -> Result<()> + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("event name must not be empty")]
    EmptyEventName,
}

/// Thread-safe multiset of callbacks keyed by event name
///
/// Keys are created lazily on first registration and pruned once their
/// last callback is removed.
#[derive(Default)]
pub struct ListenerRegistry {
    listeners: RwLock<HashMap<String, Vec<LifecycleCallback>>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self {
            listeners: RwLock::new(HashMap::new()),
        }
    }

    /// Add `callback` to the set for `event`, creating the set if needed
    pub fn register(&self, event: &str, callback: LifecycleCallback) -> Result<(), RegistryError> {
        if event.is_empty() {
            return Err(RegistryError::EmptyEventName);
        }

        let mut listeners = self.listeners.write();
        let set = listeners.entry(event.to_string()).or_default();
        if !set.iter().any(|existing| Arc::ptr_eq(existing, &callback)) {
            set.push(callback);
        }

        Ok(())
    }

    /// Remove `callback` from `event`'s set; absent entries are a no-op
    pub fn unregister(&self, event: &str, callback: &LifecycleCallback) {
        let mut listeners = self.listeners.write();
        if let Some(set) = listeners.get_mut(event) {
            set.retain(|existing| !Arc::ptr_eq(existing, callback));
            if set.is_empty() {
                listeners.remove(event);
            }
        }
    }

    /// Remove `callback` from every event's set
    pub fn unregister_all(&self, callback: &LifecycleCallback) {
        let mut listeners = self.listeners.write();
        for set in listeners.values_mut() {
            set.retain(|existing| !Arc::ptr_eq(existing, callback));
        }
        listeners.retain(|_, set| !set.is_empty());
    }

    /// Snapshot of the callbacks registered for `event`
    ///
    /// The snapshot is stable for the caller's iteration; a registration
    /// racing a dispatch may or may not appear in it, but a callback
    /// never appears twice.
    pub fn listeners_for(&self, event: &str) -> Vec<LifecycleCallback> {
        self.listeners.read().get(event).cloned().unwrap_or_default()
    }

    pub fn has_listeners(&self, event: &str) -> bool {
        self.listeners.read().contains_key(event)
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.read().is_empty()
    }

    pub fn clear(&self) {
        self.listeners.write().clear();
    }
}
