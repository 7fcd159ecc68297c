//! Built-in evaluators: linear for every value kind, quadratic Bezier for vectors.

use std::marker::PhantomData;

use crate::error::FluxError;
use crate::eval::{Evaluator, EvaluatorContext};
use crate::profile::{ControlPointAnchor, Profile, ProfileKind};
use crate::value::{Animatable, Value, ValueKind};
use crate::Result;

/// Segments used to estimate a quadratic Bezier's arc length.
pub const BEZIER_LENGTH_SAMPLES: usize = 16;

/// Arithmetic the built-in evaluators need from a value type.
pub trait Interpolate: Animatable + Copy {
    const ZERO: Self;

    fn lerp(a: Self, b: Self, t: f32) -> Self;

    fn offset(value: Self, relative: Self) -> Self;

    fn distance(a: Self, b: Self) -> f32;
}

#[inline]
fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    // Exact `b` at t = 1.
    a * (1.0 - t) + b * t
}

impl Interpolate for f32 {
    const ZERO: Self = 0.0;

    fn lerp(a: Self, b: Self, t: f32) -> Self {
        lerp_f32(a, b, t)
    }

    fn offset(value: Self, relative: Self) -> Self {
        value + relative
    }

    fn distance(a: Self, b: Self) -> f32 {
        (b - a).abs()
    }
}

impl Interpolate for i32 {
    const ZERO: Self = 0;

    fn lerp(a: Self, b: Self, t: f32) -> Self {
        lerp_f32(a as f32, b as f32, t).round() as i32
    }

    fn offset(value: Self, relative: Self) -> Self {
        value.saturating_add(relative)
    }

    fn distance(a: Self, b: Self) -> f32 {
        (b as f32 - a as f32).abs()
    }
}

impl<const N: usize> Interpolate for [f32; N]
where
    [f32; N]: Animatable,
{
    const ZERO: Self = [0.0; N];

    fn lerp(a: Self, b: Self, t: f32) -> Self {
        std::array::from_fn(|i| lerp_f32(a[i], b[i], t))
    }

    fn offset(value: Self, relative: Self) -> Self {
        std::array::from_fn(|i| value[i] + relative[i])
    }

    fn distance(a: Self, b: Self) -> f32 {
        a.iter()
            .zip(b.iter())
            .map(|(x, y)| (y - x) * (y - x))
            .sum::<f32>()
            .sqrt()
    }
}

/// Vector types a Bezier control point can be projected onto.
pub trait BezierPoint: Interpolate {
    fn from_control(point: [f32; 3]) -> Self;
}

impl BezierPoint for [f32; 2] {
    fn from_control(point: [f32; 3]) -> Self {
        [point[0], point[1]]
    }
}

impl BezierPoint for [f32; 3] {
    fn from_control(point: [f32; 3]) -> Self {
        point
    }
}

/// Point on the quadratic Bezier `p0 → p1 → p2` at `t`.
pub fn quadratic_bezier_point<T: Interpolate>(p0: T, p1: T, p2: T, t: f32) -> T {
    let a = T::lerp(p0, p1, t);
    let b = T::lerp(p1, p2, t);
    T::lerp(a, b, t)
}

/// Chord-sum estimate of the curve length.
pub fn estimate_quadratic_bezier_length<T: Interpolate>(p0: T, p1: T, p2: T) -> f32 {
    let mut length = 0.0;
    let mut previous = p0;
    for i in 1..=BEZIER_LENGTH_SAMPLES {
        let t = i as f32 / BEZIER_LENGTH_SAMPLES as f32;
        let point = quadratic_bezier_point(p0, p1, p2, t);
        length += T::distance(previous, point);
        previous = point;
    }
    length
}

fn typed<T: Animatable>(value: &Value, role: &str) -> Result<T> {
    T::from_value(value).ok_or_else(|| FluxError::InvalidState {
        reason: format!(
            "{role} value is {}, evaluator expects {}",
            value.kind().name(),
            T::KIND.name()
        ),
    })
}

/// Straight-line evaluator for any [`Interpolate`] type.
#[derive(Debug, Clone)]
pub struct LinearEvaluator<T> {
    context: EvaluatorContext,
    _marker: PhantomData<T>,
}

impl<T: Interpolate> LinearEvaluator<T> {
    pub fn new() -> Self {
        Self {
            context: EvaluatorContext {
                profile: Profile::Linear,
                start: T::ZERO.into_value(),
                end: T::ZERO.into_value(),
            },
            _marker: PhantomData,
        }
    }

    pub fn boxed() -> Box<dyn Evaluator> {
        Box::new(Self::new())
    }
}

impl<T: Interpolate> Default for LinearEvaluator<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Interpolate> Evaluator for LinearEvaluator<T> {
    fn name(&self) -> &str {
        "linear"
    }

    fn value_kind(&self) -> ValueKind {
        T::KIND
    }

    fn profile_kind(&self) -> ProfileKind {
        ProfileKind::Linear
    }

    fn context(&self) -> &EvaluatorContext {
        &self.context
    }

    fn context_mut(&mut self) -> &mut EvaluatorContext {
        &mut self.context
    }

    fn relative_value(&self, value: &Value, relative: &Value) -> Result<Value> {
        let value: T = typed(value, "base")?;
        let relative: T = typed(relative, "relative")?;
        Ok(T::offset(value, relative).into_value())
    }

    fn distance(&self) -> Result<f32> {
        let start: T = typed(&self.context.start, "start")?;
        let end: T = typed(&self.context.end, "end")?;
        Ok(T::distance(start, end))
    }

    fn evaluate(&self, t: f32) -> Result<Value> {
        let start: T = typed(&self.context.start, "start")?;
        let end: T = typed(&self.context.end, "end")?;
        Ok(T::lerp(start, end, t).into_value())
    }
}

/// Quadratic Bezier evaluator for vector types.
#[derive(Debug, Clone)]
pub struct BezierEvaluator<T> {
    context: EvaluatorContext,
    control: Option<T>,
}

impl<T: BezierPoint> BezierEvaluator<T> {
    pub fn new() -> Self {
        Self {
            context: EvaluatorContext {
                profile: Profile::bezier([0.0; 3]),
                start: T::ZERO.into_value(),
                end: T::ZERO.into_value(),
            },
            control: None,
        }
    }

    pub fn boxed() -> Box<dyn Evaluator> {
        Box::new(Self::new())
    }

    fn points(&self) -> Result<(T, T, T)> {
        let start: T = typed(&self.context.start, "start")?;
        let end: T = typed(&self.context.end, "end")?;
        let control = self.control.ok_or_else(|| FluxError::InvalidState {
            reason: "bezier evaluator used before initialize".to_string(),
        })?;
        Ok((start, control, end))
    }
}

impl<T: BezierPoint> Default for BezierEvaluator<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: BezierPoint> Evaluator for BezierEvaluator<T> {
    fn name(&self) -> &str {
        "bezier"
    }

    fn value_kind(&self) -> ValueKind {
        T::KIND
    }

    fn profile_kind(&self) -> ProfileKind {
        ProfileKind::Bezier
    }

    fn context(&self) -> &EvaluatorContext {
        &self.context
    }

    fn context_mut(&mut self) -> &mut EvaluatorContext {
        &mut self.context
    }

    fn initialize(&mut self) -> Result<()> {
        let Profile::Bezier(profile) = self.context.profile else {
            return Err(FluxError::configuration(format!(
                "bezier evaluator received a {} profile",
                self.context.profile.kind().name()
            )));
        };
        let point = T::from_control(profile.control_point);
        let control = match profile.anchor {
            ControlPointAnchor::None => point,
            ControlPointAnchor::StartPoint => T::offset(point, typed(&self.context.start, "start")?),
            ControlPointAnchor::EndPoint => T::offset(point, typed(&self.context.end, "end")?),
        };
        self.control = Some(control);
        Ok(())
    }

    fn relative_value(&self, value: &Value, relative: &Value) -> Result<Value> {
        let value: T = typed(value, "base")?;
        let relative: T = typed(relative, "relative")?;
        Ok(T::offset(value, relative).into_value())
    }

    fn distance(&self) -> Result<f32> {
        let (p0, p1, p2) = self.points()?;
        Ok(estimate_quadratic_bezier_length(p0, p1, p2))
    }

    fn evaluate(&self, t: f32) -> Result<Value> {
        let (p0, p1, p2) = self.points()?;
        Ok(quadratic_bezier_point(p0, p1, p2, t).into_value())
    }
}
