//! Settings for hostkit services
//!
//! Loaded from a toml file under the user config directory, falling
//! back to defaults when no file exists.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Main settings structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Lifecycle broadcaster settings
    pub lifecycle: LifecycleSettings,
    /// Accessibility watcher settings
    pub accessibility: AccessibilitySettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifecycleSettings {
    /// Capacity of the generic state-change broadcast channel
    pub channel_capacity: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessibilitySettings {
    /// Capacity of the enabled-change broadcast channel
    pub channel_capacity: usize,
}

impl Settings {
    /// Load settings from disk or return defaults
    pub fn load_or_default() -> Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Self::default())
        }
    }

    /// Save settings to disk
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;

        Ok(())
    }

    fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("hostkit")
            .join("settings.toml")
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            lifecycle: LifecycleSettings {
                channel_capacity: 64,
            },
            accessibility: AccessibilitySettings {
                channel_capacity: 16,
            },
        }
    }
}
