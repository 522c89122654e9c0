//! Lifecycle state-change dispatch
//!
//! The broadcaster observes an external state source and, on every
//! change, invokes the named listeners for the mapped event and then
//! sends a generic notification that fires whether or not an event
//! mapped and whether or not any listener exists.

use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use tokio::sync::broadcast;

use hostkit_core::HostContext;

use crate::registry::{LifecycleCallback, ListenerRegistry, RegistryError};
use crate::state::{event_for_transition, AppState, LifecycleEvent, StateError};

/// Generic notification sent on every observed state change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateChange {
    pub old: AppState,
    pub new: AppState,
    /// Mapped event, `None` for transitions that fire no named event
    pub event: Option<LifecycleEvent>,
}

/// External notifier that reports host lifecycle changes
///
/// The broadcaster receives its source at `attach` time; it never looks
/// one up globally.
pub trait StateSource: Send + Sync {
    fn add_observer(&self, observer: Arc<dyn StateObserver>);
    fn remove_observer(&self, observer: &Arc<dyn StateObserver>);
}

/// Receiver side of a [`StateSource`]
pub trait StateObserver: Send + Sync {
    fn state_changed(&self, old: AppState, new: AppState);
}

struct Attachment {
    source: Arc<dyn StateSource>,
    observer: Arc<dyn StateObserver>,
}

/// Forwards source callbacks into the broadcaster without keeping it alive
struct ForwardingObserver {
    broadcaster: Weak<LifecycleBroadcaster>,
}

impl StateObserver for ForwardingObserver {
    fn state_changed(&self, old: AppState, new: AppState) {
        if let Some(broadcaster) = self.broadcaster.upgrade() {
            broadcaster.on_state_changed(old, new);
        }
    }
}

/// Dispatcher for lifecycle state changes
///
/// Stateless with respect to the lifecycle itself - the current state
/// lives entirely in the external source.
pub struct LifecycleBroadcaster {
    context: Arc<HostContext>,
    registry: ListenerRegistry,
    notifications: broadcast::Sender<StateChange>,
    attachment: RwLock<Option<Attachment>>,
    /// Handle to ourselves for the forwarding observer
    weak: Weak<LifecycleBroadcaster>,
}

impl LifecycleBroadcaster {
    pub fn new(context: Arc<HostContext>, capacity: usize) -> Arc<Self> {
        // broadcast::channel panics on a zero capacity, and the value
        // arrives from user-editable settings.
        let capacity = if capacity == 0 {
            tracing::warn!("lifecycle channel capacity 0 is invalid, clamping to 1");
            1
        } else {
            capacity
        };
        let (notifications, _) = broadcast::channel(capacity);

        Arc::new_cyclic(|weak| Self {
            context,
            registry: ListenerRegistry::new(),
            notifications,
            attachment: RwLock::new(None),
            weak: Weak::clone(weak),
        })
    }

    /// Subscribe to the generic state-change channel
    pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.notifications.subscribe()
    }

    /// Register `callback` for the named lifecycle event
    pub fn register(&self, event: &str, callback: LifecycleCallback) -> Result<(), RegistryError> {
        self.registry.register(event, callback)
    }

    /// Remove `callback` from the named event only
    pub fn unregister(&self, event: &str, callback: &LifecycleCallback) {
        self.registry.unregister(event, callback);
    }

    /// Remove `callback` from every event it was registered under
    pub fn unregister_all(&self, callback: &LifecycleCallback) {
        self.registry.unregister_all(callback);
    }

    /// Handle one observed transition
    ///
    /// Callbacks run outside every lock, on a snapshot of the registry,
    /// so a slow or failing callback cannot block registration or skew
    /// the batch. A failure in one callback is logged and the remaining
    /// callbacks still run.
    pub fn on_state_changed(&self, old: AppState, new: AppState) {
        let event = event_for_transition(old, new);

        if let Some(event) = event {
            for callback in self.registry.listeners_for(event.as_str()) {
                match panic::catch_unwind(AssertUnwindSafe(|| callback(&self.context))) {
                    Ok(Ok(())) => {}
                    Ok(Err(err)) => {
                        tracing::warn!(name = event.as_str(), error = %err, "lifecycle listener failed");
                    }
                    Err(_) => {
                        tracing::error!(name = event.as_str(), "lifecycle listener panicked");
                    }
                }
            }
        }

        // Fires even for unmapped transitions and with no listeners
        // registered, carrying the absence of an event as `None`.
        let _ = self.notifications.send(StateChange { old, new, event });
    }

    /// Handle a transition reported as raw state tokens
    ///
    /// An unrecognized token is a caller error: no listener runs and no
    /// generic notification is sent for that call.
    pub fn on_state_tokens(&self, old: &str, new: &str) -> Result<(), StateError> {
        let old = old.parse::<AppState>()?;
        let new = new.parse::<AppState>()?;
        self.on_state_changed(old, new);
        Ok(())
    }

    /// Start observing `source`; a no-op while already attached
    pub fn attach(&self, source: Arc<dyn StateSource>) {
        let observer: Arc<dyn StateObserver> = Arc::new(ForwardingObserver {
            broadcaster: Weak::clone(&self.weak),
        });

        {
            let mut attachment = self.attachment.write();
            if attachment.is_some() {
                return;
            }
            *attachment = Some(Attachment {
                source: Arc::clone(&source),
                observer: Arc::clone(&observer),
            });
        }

        // Outside the lock: the source may call back into us while
        // registering the observer.
        source.add_observer(observer);
    }

    /// Stop observing the attached source, if any
    ///
    /// Owners must call this before dropping the broadcaster; a skipped
    /// detach leaves the observer registered with the source.
    pub fn detach(&self) {
        let detached = self.attachment.write().take();
        if let Some(attachment) = detached {
            attachment.source.remove_observer(&attachment.observer);
        }
    }

    pub fn is_attached(&self) -> bool {
        self.attachment.read().is_some()
    }

    pub fn context(&self) -> &Arc<HostContext> {
        &self.context
    }
}
