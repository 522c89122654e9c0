//! # Accessibility State
//!
//! Framework-side view of the device accessibility services: a cached
//! enabled flag, announcement forwarding, and an enabled-change feed
//! that only stays attached to the platform notifier while someone is
//! actually listening.
//!
//! The platform services themselves stay behind [`AccessibilityHost`];
//! this crate never talks to an accessibility subsystem directly.

use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Narrow interface over the platform accessibility services
pub trait AccessibilityHost: Send + Sync {
    fn is_enabled(&self) -> bool;
    fn announce(&self, message: &str);
    fn add_state_listener(&self, listener: Arc<dyn AccessibilityStateListener>);
    fn remove_state_listener(&self, listener: &Arc<dyn AccessibilityStateListener>);
}

/// Receiver side of the host's enabled-state notifications
pub trait AccessibilityStateListener: Send + Sync {
    fn enabled_changed(&self, enabled: bool);
}

/// Enabled-state change delivered to subscribers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessibilityChange {
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnnounceError {
    #[error("accessibility services are not enabled on this device")]
    Disabled,
    #[error("no announcement text was provided")]
    EmptyMessage,
}

/// Forwards host notifications into the watcher without keeping it alive
struct Forwarder {
    watcher: Weak<AccessibilityWatcher>,
}

impl AccessibilityStateListener for Forwarder {
    fn enabled_changed(&self, enabled: bool) {
        if let Some(watcher) = self.watcher.upgrade() {
            *watcher.enabled.write() = enabled;
            let _ = watcher.changes.send(AccessibilityChange { enabled });
        }
    }
}

/// Watches device accessibility state on behalf of the host application
pub struct AccessibilityWatcher {
    host: Arc<dyn AccessibilityHost>,
    /// Cached flag, seeded from the host and refreshed by the forwarder
    enabled: RwLock<bool>,
    changes: broadcast::Sender<AccessibilityChange>,
    subscribers: RwLock<usize>,
    forwarder: RwLock<Option<Arc<dyn AccessibilityStateListener>>>,
    /// Handle to ourselves for the forwarding listener and guards
    weak: Weak<AccessibilityWatcher>,
}

impl AccessibilityWatcher {
    pub fn new(host: Arc<dyn AccessibilityHost>, capacity: usize) -> Arc<Self> {
        // broadcast::channel panics on a zero capacity, and the value
        // arrives from user-editable settings.
        let capacity = if capacity == 0 {
            tracing::warn!("accessibility channel capacity 0 is invalid, clamping to 1");
            1
        } else {
            capacity
        };
        let (changes, _) = broadcast::channel(capacity);
        let enabled = host.is_enabled();

        Arc::new_cyclic(|weak| Self {
            host,
            enabled: RwLock::new(enabled),
            changes,
            subscribers: RwLock::new(0),
            forwarder: RwLock::new(None),
            weak: Weak::clone(weak),
        })
    }

    /// Last known enabled flag
    pub fn is_enabled(&self) -> bool {
        *self.enabled.read()
    }

    /// Forward `message` to the platform announcement channel
    ///
    /// Gated the way the host module gates it: nothing is announced
    /// while accessibility services are off or when the text is blank.
    pub fn announce(&self, message: &str) -> Result<(), AnnounceError> {
        if !self.host.is_enabled() {
            tracing::warn!("accessibility announcement ignored: services not enabled");
            return Err(AnnounceError::Disabled);
        }
        if message.trim().is_empty() {
            tracing::warn!("accessibility announcement ignored: no text provided");
            return Err(AnnounceError::EmptyMessage);
        }

        self.host.announce(message);
        Ok(())
    }

    /// Subscribe to enabled-state changes
    ///
    /// The first live subscription registers a forwarding listener with
    /// the host; dropping the last one removes it again, so the host
    /// only sees a listener while one is wanted.
    pub fn subscribe(&self) -> AccessibilitySubscription {
        let mut to_attach = None;
        let receiver = {
            let mut subscribers = self.subscribers.write();
            *subscribers += 1;
            if *subscribers == 1 {
                let forwarder: Arc<dyn AccessibilityStateListener> = Arc::new(Forwarder {
                    watcher: Weak::clone(&self.weak),
                });
                *self.forwarder.write() = Some(Arc::clone(&forwarder));
                to_attach = Some(forwarder);
            }
            self.changes.subscribe()
        };

        // Outside the locks: the host may call back into us while
        // registering the listener.
        if let Some(forwarder) = to_attach {
            self.host.add_state_listener(forwarder);
        }

        AccessibilitySubscription {
            receiver,
            watcher: Weak::clone(&self.weak),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        *self.subscribers.read()
    }

    /// Whether a forwarding listener is currently registered with the host
    pub fn is_watching(&self) -> bool {
        self.forwarder.read().is_some()
    }

    fn drop_subscription(&self) {
        let to_remove = {
            let mut subscribers = self.subscribers.write();
            *subscribers -= 1;
            if *subscribers == 0 {
                self.forwarder.write().take()
            } else {
                None
            }
        };

        if let Some(forwarder) = to_remove {
            self.host.remove_state_listener(&forwarder);
        }
    }
}

/// Guard owning one enabled-change subscription
pub struct AccessibilitySubscription {
    receiver: broadcast::Receiver<AccessibilityChange>,
    watcher: Weak<AccessibilityWatcher>,
}

impl AccessibilitySubscription {
    pub async fn recv(&mut self) -> Result<AccessibilityChange, broadcast::error::RecvError> {
        self.receiver.recv().await
    }

    pub fn try_recv(&mut self) -> Result<AccessibilityChange, broadcast::error::TryRecvError> {
        self.receiver.try_recv()
    }
}

impl Drop for AccessibilitySubscription {
    fn drop(&mut self) {
        if let Some(watcher) = self.watcher.upgrade() {
            watcher.drop_subscription();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct FakeHost {
        enabled: RwLock<bool>,
        listeners: RwLock<Vec<Arc<dyn AccessibilityStateListener>>>,
        announced: RwLock<Vec<String>>,
    }

    impl FakeHost {
        fn enabled() -> Arc<Self> {
            let host = Self::default();
            *host.enabled.write() = true;
            Arc::new(host)
        }

        fn set_enabled(&self, enabled: bool) {
            *self.enabled.write() = enabled;
            let listeners = self.listeners.read().clone();
            for listener in listeners {
                listener.enabled_changed(enabled);
            }
        }

        fn listener_count(&self) -> usize {
            self.listeners.read().len()
        }
    }

    impl AccessibilityHost for FakeHost {
        fn is_enabled(&self) -> bool {
            *self.enabled.read()
        }

        fn announce(&self, message: &str) {
            self.announced.write().push(message.to_string());
        }

        fn add_state_listener(&self, listener: Arc<dyn AccessibilityStateListener>) {
            self.listeners.write().push(listener);
        }

        fn remove_state_listener(&self, listener: &Arc<dyn AccessibilityStateListener>) {
            self.listeners
                .write()
                .retain(|existing| !Arc::ptr_eq(existing, listener));
        }
    }

    #[test]
    fn test_announce_forwards_to_host() {
        let host = FakeHost::enabled();
        let watcher = AccessibilityWatcher::new(Arc::clone(&host) as Arc<dyn AccessibilityHost>, 16);

        watcher.announce("File saved").unwrap();
        assert_eq!(host.announced.read().as_slice(), ["File saved"]);
    }

    #[test]
    fn test_announce_gated_when_disabled() {
        let host = Arc::new(FakeHost::default());
        let watcher = AccessibilityWatcher::new(Arc::clone(&host) as Arc<dyn AccessibilityHost>, 16);

        assert_eq!(watcher.announce("File saved"), Err(AnnounceError::Disabled));
        assert!(host.announced.read().is_empty());
    }

    #[test]
    fn test_announce_rejects_blank_text() {
        let host = FakeHost::enabled();
        let watcher = AccessibilityWatcher::new(Arc::clone(&host) as Arc<dyn AccessibilityHost>, 16);

        assert_eq!(watcher.announce("   "), Err(AnnounceError::EmptyMessage));
        assert!(host.announced.read().is_empty());
    }

    #[test]
    fn test_watcher_attaches_only_while_subscribed() {
        let host = FakeHost::enabled();
        let watcher = AccessibilityWatcher::new(Arc::clone(&host) as Arc<dyn AccessibilityHost>, 16);
        assert_eq!(host.listener_count(), 0);

        let first = watcher.subscribe();
        assert_eq!(host.listener_count(), 1);
        assert!(watcher.is_watching());

        let second = watcher.subscribe();
        assert_eq!(host.listener_count(), 1);
        assert_eq!(watcher.subscriber_count(), 2);

        drop(first);
        assert_eq!(host.listener_count(), 1);

        drop(second);
        assert_eq!(host.listener_count(), 0);
        assert!(!watcher.is_watching());
    }

    #[test]
    fn test_enabled_changes_reach_subscribers_and_cache() {
        let host = FakeHost::enabled();
        let watcher = AccessibilityWatcher::new(Arc::clone(&host) as Arc<dyn AccessibilityHost>, 16);
        assert!(watcher.is_enabled());

        let mut subscription = watcher.subscribe();
        host.set_enabled(false);

        let change = subscription.try_recv().unwrap();
        assert!(!change.enabled);
        assert!(!watcher.is_enabled());
    }

    #[test]
    fn test_zero_capacity_is_clamped_not_fatal() {
        let host = FakeHost::enabled();
        let watcher = AccessibilityWatcher::new(Arc::clone(&host) as Arc<dyn AccessibilityHost>, 0);

        let mut subscription = watcher.subscribe();
        host.set_enabled(false);

        let change = subscription.try_recv().unwrap();
        assert!(!change.enabled);
    }

    /// Host that calls back into the watcher while registering and
    /// removing the forwarding listener.
    #[derive(Default)]
    struct ReentrantHost {
        watcher: RwLock<Option<Arc<AccessibilityWatcher>>>,
        listeners: RwLock<Vec<Arc<dyn AccessibilityStateListener>>>,
    }

    impl AccessibilityHost for ReentrantHost {
        fn is_enabled(&self) -> bool {
            true
        }

        fn announce(&self, _message: &str) {}

        fn add_state_listener(&self, listener: Arc<dyn AccessibilityStateListener>) {
            if let Some(watcher) = self.watcher.read().as_ref() {
                assert_eq!(watcher.subscriber_count(), 1);
                assert!(watcher.is_watching());
            }
            self.listeners.write().push(listener);
        }

        fn remove_state_listener(&self, listener: &Arc<dyn AccessibilityStateListener>) {
            if let Some(watcher) = self.watcher.read().as_ref() {
                assert_eq!(watcher.subscriber_count(), 0);
                assert!(!watcher.is_watching());
            }
            self.listeners
                .write()
                .retain(|existing| !Arc::ptr_eq(existing, listener));
        }
    }

    #[test]
    fn test_host_may_call_back_during_subscribe_and_drop() {
        let host = Arc::new(ReentrantHost::default());
        let watcher = AccessibilityWatcher::new(Arc::clone(&host) as Arc<dyn AccessibilityHost>, 16);
        *host.watcher.write() = Some(Arc::clone(&watcher));

        let subscription = watcher.subscribe();
        assert_eq!(host.listeners.read().len(), 1);

        drop(subscription);
        assert_eq!(host.listeners.read().len(), 0);

        // Watcher and host reference each other here; break the cycle.
        *host.watcher.write() = None;
    }

    #[test]
    fn test_changes_without_subscribers_are_not_observed() {
        let host = FakeHost::enabled();
        let watcher = AccessibilityWatcher::new(Arc::clone(&host) as Arc<dyn AccessibilityHost>, 16);

        // No subscription, so no forwarder: the cache keeps the seeded value.
        host.set_enabled(false);
        assert!(watcher.is_enabled());
    }
}
