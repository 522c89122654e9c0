//! # Hostkit Lifecycle
//!
//! Lifecycle event broadcasting for a host application: a thread-safe
//! listener registry keyed by event name, a pure transition-to-event
//! mapper, and a dispatcher that fires the named listeners for each
//! state change and then a generic notification that always fires.

pub mod broadcaster;
pub mod registry;
pub mod state;

pub use broadcaster::{LifecycleBroadcaster, StateChange, StateObserver, StateSource};
pub use registry::{LifecycleCallback, ListenerRegistry, RegistryError};
pub use state::{event_for_transition, AppState, LifecycleEvent, StateError};
