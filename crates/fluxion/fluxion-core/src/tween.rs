//! Value tween payload: drives a host property from a start value to an end value.

use crate::ease::EaseFunction;
use crate::error::FluxError;
use crate::eval::{Evaluator, EvaluatorRegistry};
use crate::profile::{Profile, ProfileKind};
use crate::state::LoopType;
use crate::value::{Value, ValueKind};
use crate::Result;

pub type Getter = Box<dyn FnMut() -> Value>;
pub type Setter = Box<dyn FnMut(Value)>;

pub(crate) struct Tween {
    pub value_kind: ValueKind,
    getter: Getter,
    setter: Setter,
    pub start: Value,
    pub end: Value,
    /// End value as supplied by the caller; an offset in relative mode.
    pub target: Value,
    /// Seconds, or units per second when speed based.
    pub duration_or_speed: f32,
    actual_duration: Option<f32>,
    pub ease: Box<dyn EaseFunction>,
    pub relative: bool,
    pub speed_based: bool,
    pub loop_type: LoopType,
    pub profile: Profile,
    evaluator: Option<Box<dyn Evaluator>>,
    resolved_for: Option<ProfileKind>,
}

impl Tween {
    pub(crate) fn new(
        getter: Getter,
        setter: Setter,
        target: Value,
        duration: f32,
        ease: Box<dyn EaseFunction>,
    ) -> Self {
        Self {
            value_kind: target.kind(),
            getter,
            setter,
            start: target.clone(),
            end: target.clone(),
            target,
            duration_or_speed: duration,
            actual_duration: None,
            ease,
            relative: false,
            speed_based: false,
            loop_type: LoopType::Restart,
            profile: Profile::Linear,
            evaluator: None,
            resolved_for: None,
        }
    }

    /// `None` for a speed-based tween that has not captured its start value.
    pub(crate) fn duration(&self) -> Option<f32> {
        if self.speed_based {
            self.actual_duration
        } else {
            Some(self.duration_or_speed)
        }
    }

    pub(crate) fn set_speed_based(&mut self, speed_based: bool) {
        self.speed_based = speed_based;
        self.actual_duration = None;
    }

    fn ensure_evaluator(&mut self, registry: &mut EvaluatorRegistry) -> Result<()> {
        let kind = self.profile.kind();
        if self.evaluator.is_none() || self.resolved_for != Some(kind) {
            self.evaluator = Some(registry.try_resolve(self.value_kind, kind)?);
            self.resolved_for = Some(kind);
        }
        Ok(())
    }

    fn evaluator(&self) -> Result<&dyn Evaluator> {
        self.evaluator
            .as_deref()
            .ok_or_else(|| FluxError::InvalidState {
                reason: "tween evaluated before start".to_string(),
            })
    }

    /// Push profile and endpoints into the evaluator and let it re-derive.
    fn sync_context(&mut self) -> Result<()> {
        let (profile, start, end) = (self.profile, self.start.clone(), self.end.clone());
        let evaluator = self
            .evaluator
            .as_deref_mut()
            .ok_or_else(|| FluxError::InvalidState {
                reason: "tween has no evaluator".to_string(),
            })?;
        let context = evaluator.context_mut();
        context.profile = profile;
        context.start = start;
        context.end = end;
        evaluator.initialize()
    }

    /// Swap in a new profile. A running tween re-resolves only when the
    /// profile kind changes.
    pub(crate) fn set_profile(
        &mut self,
        profile: Profile,
        registry: &mut EvaluatorRegistry,
    ) -> Result<()> {
        let previous = self.profile;
        self.profile = profile;
        if self.evaluator.is_none() {
            return Ok(());
        }
        let applied = self
            .ensure_evaluator(registry)
            .and_then(|()| self.sync_context());
        if applied.is_err() {
            self.profile = previous;
        }
        applied
    }

    /// Start hook: capture endpoints, resolve the evaluator, derive duration.
    pub(crate) fn on_start(&mut self, in_loop: bool, registry: &mut EvaluatorRegistry) -> Result<()> {
        if in_loop {
            if self.loop_type == LoopType::Yoyo {
                std::mem::swap(&mut self.start, &mut self.end);
            }
            self.ensure_evaluator(registry)?;
            return self.sync_context();
        }

        let current = (self.getter)();
        if current.kind() != self.value_kind {
            return Err(FluxError::InvalidState {
                reason: format!(
                    "getter produced {} but the tween animates {}",
                    current.kind().name(),
                    self.value_kind.name()
                ),
            });
        }
        self.start = current;
        self.ensure_evaluator(registry)?;
        self.end = if self.relative {
            self.evaluator()?.relative_value(&self.start, &self.target)?
        } else {
            self.target.clone()
        };
        self.sync_context()?;

        if self.speed_based {
            if self.duration_or_speed <= 0.0 {
                return Err(FluxError::invalid_argument(
                    "speed",
                    format!("must be positive, got {}", self.duration_or_speed),
                ));
            }
            let distance = self.evaluator()?.distance()?;
            self.actual_duration = Some(distance / self.duration_or_speed);
        }
        Ok(())
    }

    /// Apply the value at `time` seconds into the playing phase.
    pub(crate) fn on_playing(&mut self, time: f32) -> Result<()> {
        let t = match self.duration() {
            Some(duration) if duration > 0.0 => (time / duration).clamp(0.0, 1.0),
            Some(_) => 1.0,
            None => return Ok(()),
        };
        let eased = self.ease.ease(t);
        let value = self.evaluator()?.evaluate(eased)?;
        (self.setter)(value);
        Ok(())
    }

    #[inline]
    pub(crate) fn endpoints(&self) -> (Value, Value) {
        (self.start.clone(), self.end.clone())
    }
}
