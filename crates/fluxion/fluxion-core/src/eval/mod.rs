//! Evaluators: per (value kind, profile kind) strategies that turn eased
//! normalized time into a value.

pub mod functions;
pub mod metrics;
pub mod registry;

pub use functions::*;
pub use metrics::*;
pub use registry::*;

use crate::profile::{Profile, ProfileKind};
use crate::value::{Value, ValueKind};
use crate::Result;

/// Mutable per-unit state an evaluator reads. Set right before use.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluatorContext {
    pub profile: Profile,
    pub start: Value,
    pub end: Value,
}

impl Default for EvaluatorContext {
    fn default() -> Self {
        Self {
            profile: Profile::Linear,
            start: Value::Float(0.0),
            end: Value::Float(0.0),
        }
    }
}

/// Strategy bound to exactly one value/profile pair.
pub trait Evaluator {
    /// Get the name of this evaluator
    fn name(&self) -> &str;

    fn value_kind(&self) -> ValueKind;

    fn profile_kind(&self) -> ProfileKind;

    /// Whether this evaluator can drive values of `kind`.
    #[inline]
    fn can_process(&self, kind: ValueKind) -> bool {
        kind == self.value_kind()
    }

    fn context(&self) -> &EvaluatorContext;

    fn context_mut(&mut self) -> &mut EvaluatorContext;

    /// Derive cached data from the context. Called after every context change.
    fn initialize(&mut self) -> Result<()> {
        Ok(())
    }

    /// `value` offset by `relative`.
    fn relative_value(&self, value: &Value, relative: &Value) -> Result<Value>;

    /// Path length between start and end under the current profile.
    fn distance(&self) -> Result<f32>;

    /// Value at eased normalized time `t`.
    fn evaluate(&self, t: f32) -> Result<Value>;
}
