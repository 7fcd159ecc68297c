use hashbrown::HashMap;

use crate::error::FluxError;
use crate::eval::functions::{BezierEvaluator, LinearEvaluator};
use crate::eval::metrics::ResolutionMetrics;
use crate::eval::Evaluator;
use crate::profile::ProfileKind;
use crate::value::ValueKind;
use crate::Result;

/// Which profiles a descriptor serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileMatch {
    Exact(ProfileKind),
    /// Fallback for every profile of the value kind; loses to any exact match.
    Any,
}

impl ProfileMatch {
    /// Match strength against `profile`, `None` when it does not apply.
    #[inline]
    fn score(&self, profile: ProfileKind) -> Option<u8> {
        match self {
            Self::Exact(kind) if *kind == profile => Some(2),
            Self::Exact(_) => None,
            Self::Any => Some(1),
        }
    }
}

/// Declares one evaluator implementation and the pair it supports.
#[derive(Clone, Copy)]
pub struct EvaluatorDescriptor {
    pub name: &'static str,
    pub value: ValueKind,
    pub profile: ProfileMatch,
    pub create: fn() -> Box<dyn Evaluator>,
}

impl std::fmt::Debug for EvaluatorDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvaluatorDescriptor")
            .field("name", &self.name)
            .field("value", &self.value)
            .field("profile", &self.profile)
            .finish()
    }
}

impl EvaluatorDescriptor {
    pub const fn new(
        name: &'static str,
        value: ValueKind,
        profile: ProfileMatch,
        create: fn() -> Box<dyn Evaluator>,
    ) -> Self {
        Self {
            name,
            value,
            profile,
            create,
        }
    }
}

/// Descriptors shipped with the crate.
pub fn builtin_descriptors() -> Vec<EvaluatorDescriptor> {
    use ProfileKind::{Bezier, Linear};
    vec![
        EvaluatorDescriptor::new(
            "float-linear",
            ValueKind::Float,
            ProfileMatch::Exact(Linear),
            LinearEvaluator::<f32>::boxed,
        ),
        EvaluatorDescriptor::new(
            "int-linear",
            ValueKind::Int,
            ProfileMatch::Exact(Linear),
            LinearEvaluator::<i32>::boxed,
        ),
        EvaluatorDescriptor::new(
            "vec2-linear",
            ValueKind::Vec2,
            ProfileMatch::Exact(Linear),
            LinearEvaluator::<[f32; 2]>::boxed,
        ),
        EvaluatorDescriptor::new(
            "vec3-linear",
            ValueKind::Vec3,
            ProfileMatch::Exact(Linear),
            LinearEvaluator::<[f32; 3]>::boxed,
        ),
        EvaluatorDescriptor::new(
            "vec2-bezier",
            ValueKind::Vec2,
            ProfileMatch::Exact(Bezier),
            BezierEvaluator::<[f32; 2]>::boxed,
        ),
        EvaluatorDescriptor::new(
            "vec3-bezier",
            ValueKind::Vec3,
            ProfileMatch::Exact(Bezier),
            BezierEvaluator::<[f32; 3]>::boxed,
        ),
    ]
}

/// Cache key for resolved descriptors
pub type EvaluatorKey = (ValueKind, ProfileKind);

/// Resolves the best evaluator for a value/profile pair and caches the choice.
///
/// Exact profile matches beat [`ProfileMatch::Any`]; among equals the most
/// recently registered descriptor wins so hosts can override built-ins.
/// Each resolve hands out a fresh instance since evaluators carry per-unit
/// context.
#[derive(Debug)]
pub struct EvaluatorRegistry {
    descriptors: Vec<EvaluatorDescriptor>,
    cache: HashMap<EvaluatorKey, Option<usize>>,
    metrics: ResolutionMetrics,
}

impl EvaluatorRegistry {
    /// Registry preloaded with [`builtin_descriptors`].
    pub fn new() -> Self {
        Self::with_descriptors(builtin_descriptors())
    }

    /// Registry holding exactly `descriptors`.
    pub fn with_descriptors(descriptors: Vec<EvaluatorDescriptor>) -> Self {
        Self {
            descriptors,
            cache: HashMap::new(),
            metrics: ResolutionMetrics::new(),
        }
    }

    /// Add a descriptor. Invalidates cached resolutions.
    pub fn register(&mut self, descriptor: EvaluatorDescriptor) {
        log::debug!(
            "registering evaluator '{}' for {}/{:?}",
            descriptor.name,
            descriptor.value.name(),
            descriptor.profile
        );
        self.descriptors.push(descriptor);
        self.cache.clear();
    }

    #[inline]
    pub fn descriptors(&self) -> &[EvaluatorDescriptor] {
        &self.descriptors
    }

    fn best_match(&self, value: ValueKind, profile: ProfileKind) -> Option<usize> {
        let mut best: Option<(u8, usize)> = None;
        for (index, descriptor) in self.descriptors.iter().enumerate() {
            if descriptor.value != value {
                continue;
            }
            let Some(score) = descriptor.profile.score(profile) else {
                continue;
            };
            // `>=` so later registrations win ties.
            if best.map_or(true, |(top, _)| score >= top) {
                best = Some((score, index));
            }
        }
        best.map(|(_, index)| index)
    }

    /// Name of the descriptor chosen for the pair, if any.
    pub fn resolved_name(&mut self, value: ValueKind, profile: ProfileKind) -> Option<&'static str> {
        let index = self.lookup(value, profile)?;
        Some(self.descriptors[index].name)
    }

    fn lookup(&mut self, value: ValueKind, profile: ProfileKind) -> Option<usize> {
        let key = (value, profile);
        if let Some(cached) = self.cache.get(&key) {
            self.metrics.record(true, cached.is_some());
            return *cached;
        }
        let resolved = self.best_match(value, profile);
        self.cache.insert(key, resolved);
        self.metrics.record(false, resolved.is_some());
        resolved
    }

    /// Fresh evaluator for the pair, or `None` when nothing can drive it.
    pub fn resolve(
        &mut self,
        value: ValueKind,
        profile: ProfileKind,
    ) -> Option<Box<dyn Evaluator>> {
        let index = self.lookup(value, profile)?;
        let evaluator = (self.descriptors[index].create)();
        if !evaluator.can_process(value) {
            log::warn!(
                "evaluator '{}' declined value kind {}",
                self.descriptors[index].name,
                value.name()
            );
            return None;
        }
        Some(evaluator)
    }

    /// Like [`resolve`](Self::resolve) but fails with a configuration error.
    pub fn try_resolve(
        &mut self,
        value: ValueKind,
        profile: ProfileKind,
    ) -> Result<Box<dyn Evaluator>> {
        self.resolve(value, profile).ok_or_else(|| {
            FluxError::configuration(format!(
                "no evaluator for {} values with a {} profile",
                value.name(),
                profile.name()
            ))
        })
    }

    #[inline]
    pub fn metrics(&self) -> &ResolutionMetrics {
        &self.metrics
    }

    #[inline]
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    #[inline]
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }
}

impl Default for EvaluatorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::EvaluatorContext;
    use crate::value::Value;

    /// Jumps straight to the end value; used as a catch-all.
    struct SnapEvaluator {
        context: EvaluatorContext,
    }

    impl SnapEvaluator {
        fn boxed() -> Box<dyn Evaluator> {
            Box::new(Self {
                context: EvaluatorContext::default(),
            })
        }
    }

    impl Evaluator for SnapEvaluator {
        fn name(&self) -> &str {
            "snap"
        }
        fn value_kind(&self) -> ValueKind {
            ValueKind::Float
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
        fn relative_value(&self, _value: &Value, relative: &Value) -> Result<Value> {
            Ok(relative.clone())
        }
        fn distance(&self) -> Result<f32> {
            Ok(0.0)
        }
        fn evaluate(&self, _t: f32) -> Result<Value> {
            Ok(self.context.end.clone())
        }
    }

    /// Claims Int values but refuses them at instance level.
    struct PickyEvaluator(EvaluatorContext);

    impl Evaluator for PickyEvaluator {
        fn name(&self) -> &str {
            "picky"
        }
        fn value_kind(&self) -> ValueKind {
            ValueKind::Float
        }
        fn profile_kind(&self) -> ProfileKind {
            ProfileKind::Bezier
        }
        fn context(&self) -> &EvaluatorContext {
            &self.0
        }
        fn context_mut(&mut self) -> &mut EvaluatorContext {
            &mut self.0
        }
        fn relative_value(&self, value: &Value, _relative: &Value) -> Result<Value> {
            Ok(value.clone())
        }
        fn distance(&self) -> Result<f32> {
            Ok(0.0)
        }
        fn evaluate(&self, _t: f32) -> Result<Value> {
            Ok(self.0.start.clone())
        }
    }

    #[test]
    fn exact_match_resolves_builtin() {
        let mut registry = EvaluatorRegistry::new();
        let eval = registry
            .resolve(ValueKind::Vec2, ProfileKind::Bezier)
            .expect("vec2 bezier");
        assert_eq!(eval.name(), "bezier");
        assert_eq!(eval.value_kind(), ValueKind::Vec2);
    }

    #[test]
    fn missing_pair_is_configuration_error() {
        let mut registry = EvaluatorRegistry::new();
        let err = registry
            .try_resolve(ValueKind::Float, ProfileKind::Bezier)
            .err()
            .expect("float bezier is not built in");
        assert_eq!(err.category(), "configuration");
    }

    #[test]
    fn resolution_is_cached() {
        let mut registry = EvaluatorRegistry::new();
        registry.resolve(ValueKind::Float, ProfileKind::Linear);
        registry.resolve(ValueKind::Float, ProfileKind::Linear);
        registry.resolve(ValueKind::Float, ProfileKind::Bezier);
        registry.resolve(ValueKind::Float, ProfileKind::Bezier);

        let metrics = registry.metrics();
        assert_eq!(metrics.lookups, 4);
        assert_eq!(metrics.cache_hits, 2);
        assert_eq!(metrics.cache_misses, 2);
        assert_eq!(metrics.failures, 2);
        assert_eq!(registry.cache_len(), 2);
    }

    #[test]
    fn exact_match_beats_wildcard() {
        let mut registry = EvaluatorRegistry::new();
        registry.register(EvaluatorDescriptor::new(
            "float-snap",
            ValueKind::Float,
            ProfileMatch::Any,
            SnapEvaluator::boxed,
        ));

        assert_eq!(
            registry.resolved_name(ValueKind::Float, ProfileKind::Linear),
            Some("float-linear")
        );
        // No exact float/bezier exists, so the wildcard serves it.
        assert_eq!(
            registry.resolved_name(ValueKind::Float, ProfileKind::Bezier),
            Some("float-snap")
        );
    }

    #[test]
    fn later_registration_overrides_builtin() {
        let mut registry = EvaluatorRegistry::new();
        registry.resolve(ValueKind::Float, ProfileKind::Linear);
        registry.register(EvaluatorDescriptor::new(
            "float-snap-linear",
            ValueKind::Float,
            ProfileMatch::Exact(ProfileKind::Linear),
            SnapEvaluator::boxed,
        ));
        assert_eq!(
            registry.resolved_name(ValueKind::Float, ProfileKind::Linear),
            Some("float-snap-linear")
        );
    }

    #[test]
    fn declined_value_kind_yields_nothing() {
        let mut registry = EvaluatorRegistry::with_descriptors(vec![EvaluatorDescriptor::new(
            "picky",
            ValueKind::Int,
            ProfileMatch::Exact(ProfileKind::Bezier),
            || Box::new(PickyEvaluator(EvaluatorContext::default())),
        )]);
        assert!(registry.resolve(ValueKind::Int, ProfileKind::Bezier).is_none());
    }
}
