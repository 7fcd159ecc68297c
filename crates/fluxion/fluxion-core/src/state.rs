use serde::{Deserialize, Serialize};

/// Lifecycle state of a unit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FluxState {
    /// Created or re-entering a loop; not started
    #[default]
    Idle,
    /// Started, waiting out the delay
    DelayPhase,
    /// Advancing towards its duration
    Playing,
    /// Time does not accrue
    Paused,
    /// Reached its duration
    Completed,
    /// Terminal
    Killed,
}

impl FluxState {
    /// Get the name of this state
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::DelayPhase => "delay",
            Self::Playing => "playing",
            Self::Paused => "paused",
            Self::Completed => "completed",
            Self::Killed => "killed",
        }
    }

    /// Check if the unit is between start and completion
    #[inline]
    pub fn is_running(&self) -> bool {
        matches!(self, Self::DelayPhase | Self::Playing | Self::Paused)
    }

    /// Check if a pause request would take effect
    #[inline]
    pub fn can_pause(&self) -> bool {
        matches!(self, Self::DelayPhase | Self::Playing)
    }

    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Killed)
    }

    /// Lifecycle event fired when entering this state, if any.
    #[inline]
    pub fn event(&self) -> Option<LifecycleEvent> {
        match self {
            Self::Playing => Some(LifecycleEvent::Played),
            Self::Paused => Some(LifecycleEvent::Paused),
            Self::Completed => Some(LifecycleEvent::Completed),
            Self::Killed => Some(LifecycleEvent::Killed),
            Self::Idle | Self::DelayPhase => None,
        }
    }
}

/// How a tween re-enters on loop
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoopType {
    /// Same start and end every pass
    #[default]
    Restart,
    /// Swap start and end every pass
    Yoyo,
}

/// Named lifecycle notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LifecycleEvent {
    Played,
    Paused,
    Completed,
    Killed,
}

impl LifecycleEvent {
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Played => "played",
            Self::Paused => "paused",
            Self::Completed => "completed",
            Self::Killed => "killed",
        }
    }
}

/// Latched pause/resume request, applied at the start of the next update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PauseRequest {
    Pause,
    Resume,
}
