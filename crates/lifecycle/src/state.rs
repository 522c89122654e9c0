//! Application lifecycle states and transition mapping

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Host application lifecycle phase
///
/// Transitions are driven entirely by the external state source; this
/// crate only observes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppState {
    Created,
    Started,
    Resumed,
    Paused,
    Stopped,
    Destroyed,
}

impl AppState {
    pub const ALL: [AppState; 6] = [
        AppState::Created,
        AppState::Started,
        AppState::Resumed,
        AppState::Paused,
        AppState::Stopped,
        AppState::Destroyed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Started => "started",
            Self::Resumed => "resumed",
            Self::Paused => "paused",
            Self::Stopped => "stopped",
            Self::Destroyed => "destroyed",
        }
    }
}

impl fmt::Display for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognized token from the external source
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StateError {
    #[error("unknown application state: {0}")]
    UnknownState(String),
    #[error("unknown lifecycle event: {0}")]
    UnknownEvent(String),
}

impl FromStr for AppState {
    type Err = StateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created" => Ok(Self::Created),
            "started" => Ok(Self::Started),
            "resumed" => Ok(Self::Resumed),
            "paused" => Ok(Self::Paused),
            "stopped" => Ok(Self::Stopped),
            "destroyed" => Ok(Self::Destroyed),
            other => Err(StateError::UnknownState(other.to_string())),
        }
    }
}

/// Named event fired when a transition lands in a new state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleEvent {
    Started,
    Resumed,
    Paused,
    Stopped,
    Destroyed,
}

impl LifecycleEvent {
    /// Registry key for this event
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Started => "started",
            Self::Resumed => "resumed",
            Self::Paused => "paused",
            Self::Stopped => "stopped",
            Self::Destroyed => "destroyed",
        }
    }
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LifecycleEvent {
    type Err = StateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "started" => Ok(Self::Started),
            "resumed" => Ok(Self::Resumed),
            "paused" => Ok(Self::Paused),
            "stopped" => Ok(Self::Stopped),
            "destroyed" => Ok(Self::Destroyed),
            other => Err(StateError::UnknownEvent(other.to_string())),
        }
    }
}

/// Map a state transition to the event it fires, if any
///
/// Self-transitions fire nothing. No transition lands in `Created`, so
/// that pair stays unmapped as well. Pure and total over valid states.
pub fn event_for_transition(old: AppState, new: AppState) -> Option<LifecycleEvent> {
    if old == new {
        return None;
    }

    match new {
        AppState::Created => None,
        AppState::Started => Some(LifecycleEvent::Started),
        AppState::Resumed => Some(LifecycleEvent::Resumed),
        AppState::Paused => Some(LifecycleEvent::Paused),
        AppState::Stopped => Some(LifecycleEvent::Stopped),
        AppState::Destroyed => Some(LifecycleEvent::Destroyed),
    }
}
