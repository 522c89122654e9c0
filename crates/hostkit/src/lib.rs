//! # Hostkit
//!
//! Umbrella over the hostkit services: builds the shared context from
//! settings, wires the lifecycle broadcaster to the host's state
//! source, and exposes the accessibility watcher.

use std::sync::Arc;

use anyhow::Result;
use parking_lot::RwLock;

pub use accessibility_state::{
    AccessibilityChange, AccessibilityHost, AccessibilityStateListener, AccessibilitySubscription,
    AccessibilityWatcher, AnnounceError,
};
pub use hostkit_core::{AppInfo, DeployType, HostContext, Settings, UptimeClock};
pub use lifecycle::{
    event_for_transition, AppState, LifecycleBroadcaster, LifecycleCallback, LifecycleEvent,
    ListenerRegistry, RegistryError, StateChange, StateError, StateObserver, StateSource,
};

/// One wired hostkit instance for a host application
pub struct Hostkit {
    context: Arc<HostContext>,
    lifecycle: Arc<LifecycleBroadcaster>,
    accessibility: Arc<AccessibilityWatcher>,
}

impl Hostkit {
    /// Build and wire the services, loading settings from disk
    pub fn new(
        app_info: AppInfo,
        state_source: Arc<dyn StateSource>,
        accessibility_host: Arc<dyn AccessibilityHost>,
    ) -> Result<Self> {
        let settings = Settings::load_or_default()?;
        Ok(Self::with_settings(
            app_info,
            settings,
            state_source,
            accessibility_host,
        ))
    }

    /// Build and wire the services with explicit settings
    pub fn with_settings(
        app_info: AppInfo,
        settings: Settings,
        state_source: Arc<dyn StateSource>,
        accessibility_host: Arc<dyn AccessibilityHost>,
    ) -> Self {
        let lifecycle_capacity = settings.lifecycle.channel_capacity;
        let accessibility_capacity = settings.accessibility.channel_capacity;
        let settings = Arc::new(RwLock::new(settings));

        let context = Arc::new(HostContext::new(app_info, settings));
        let lifecycle = LifecycleBroadcaster::new(Arc::clone(&context), lifecycle_capacity);
        lifecycle.attach(state_source);

        let accessibility = AccessibilityWatcher::new(accessibility_host, accessibility_capacity);

        tracing::info!(
            app = %context.app_info().id,
            session = %context.session_id(),
            "hostkit initialized"
        );

        Self {
            context,
            lifecycle,
            accessibility,
        }
    }

    pub fn context(&self) -> &Arc<HostContext> {
        &self.context
    }

    pub fn lifecycle(&self) -> &Arc<LifecycleBroadcaster> {
        &self.lifecycle
    }

    pub fn accessibility(&self) -> &Arc<AccessibilityWatcher> {
        &self.accessibility
    }

    /// Detach from the host state source; call before dropping
    pub fn shutdown(&self) {
        self.lifecycle.detach();
        tracing::info!("hostkit shut down");
    }
}
