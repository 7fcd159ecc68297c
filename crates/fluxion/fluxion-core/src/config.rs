//! Engine configuration and per-unit settings.

use serde::{Deserialize, Serialize};

use crate::ease::Ease;
use crate::state::LoopType;
use crate::Result;

/// Configuration for engine sizing and defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Initial capacity of the unit arena.
    pub unit_capacity: usize,
    /// Release killed top-level units at the start of the next advance.
    pub dispose_killed: bool,
    /// Ease given to tweens that never set one.
    pub default_ease: Ease,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            unit_capacity: 256,
            dispose_killed: true,
            default_ease: Ease::Linear,
        }
    }
}

impl Config {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

fn default_loop_count() -> u32 {
    1
}

/// Timing and behaviour applied to a unit in one call.
///
/// Tween-only fields (`loop_type`, `ease`, `relative`, `speed_based`) are
/// ignored by other unit kinds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UnitSettings {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub delay: f32,
    #[serde(default = "default_loop_count")]
    pub loop_count: u32,
    #[serde(default)]
    pub infinite_loop: bool,
    #[serde(default)]
    pub loop_type: LoopType,
    #[serde(default)]
    pub ease: Option<Ease>,
    #[serde(default)]
    pub relative: bool,
    #[serde(default)]
    pub speed_based: bool,
}

impl Default for UnitSettings {
    fn default() -> Self {
        Self {
            name: None,
            delay: 0.0,
            loop_count: default_loop_count(),
            infinite_loop: false,
            loop_type: LoopType::Restart,
            ease: None,
            relative: false,
            speed_based: false,
        }
    }
}
