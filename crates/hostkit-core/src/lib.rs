//! # Hostkit Core
//!
//! Foundation layer for hostkit - host application metadata,
//! the shared context handed to lifecycle callbacks, and settings.

pub mod app_info;
pub mod context;
pub mod settings;
pub mod uptime;

pub use app_info::{AppInfo, DeployType};
pub use context::HostContext;
pub use settings::Settings;
pub use uptime::UptimeClock;
