//! Shared host context
//!
//! The per-instance handle passed through to lifecycle callbacks:
//! application metadata, session identity, uptime, and shared settings.
//! Components receive it at construction instead of looking it up
//! through a global instance.

use std::sync::Arc;

use parking_lot::RwLock;
use uuid::Uuid;

use crate::{AppInfo, Settings, UptimeClock};

pub struct HostContext {
    app_info: Arc<AppInfo>,
    session_id: String,
    uptime: UptimeClock,
    settings: Arc<RwLock<Settings>>,
}

impl HostContext {
    pub fn new(app_info: AppInfo, settings: Arc<RwLock<Settings>>) -> Self {
        Self {
            app_info: Arc::new(app_info),
            session_id: Uuid::new_v4().to_string(),
            uptime: UptimeClock::start(),
            settings,
        }
    }

    /// Host application metadata
    pub fn app_info(&self) -> &AppInfo {
        &self.app_info
    }

    /// Unique id for this process session
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Milliseconds since this context was created
    pub fn uptime_ms(&self) -> u64 {
        self.uptime.elapsed_ms()
    }

    /// Shared settings
    pub fn settings(&self) -> &Arc<RwLock<Settings>> {
        &self.settings
    }
}
