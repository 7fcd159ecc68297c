//! Motion profiles: the shape half of an evaluator key.

use serde::{Deserialize, Serialize};

/// Kind tag for a [`Profile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProfileKind {
    Linear,
    Bezier,
}

impl ProfileKind {
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::Bezier => "bezier",
        }
    }
}

/// What a Bezier control point is measured from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlPointAnchor {
    /// Absolute position
    #[default]
    None,
    /// Offset from the tween's start value
    StartPoint,
    /// Offset from the tween's end value
    EndPoint,
}

/// Control data for a quadratic Bezier path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BezierProfile {
    pub control_point: [f32; 3],
    #[serde(default)]
    pub anchor: ControlPointAnchor,
}

impl BezierProfile {
    pub fn new(control_point: [f32; 3]) -> Self {
        Self {
            control_point,
            anchor: ControlPointAnchor::None,
        }
    }

    pub fn anchored(mut self, anchor: ControlPointAnchor) -> Self {
        self.anchor = anchor;
        self
    }
}

/// Motion-shape descriptor consumed by an evaluator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum Profile {
    #[default]
    Linear,
    Bezier(BezierProfile),
}

impl Profile {
    #[inline]
    pub fn kind(&self) -> ProfileKind {
        match self {
            Self::Linear => ProfileKind::Linear,
            Self::Bezier(_) => ProfileKind::Bezier,
        }
    }

    pub fn bezier(control_point: [f32; 3]) -> Self {
        Self::Bezier(BezierProfile::new(control_point))
    }
}
