use crate::ease::EaseFunction;
use crate::engine::{non_negative, Engine};
use crate::profile::Profile;
use crate::state::{FluxState, LifecycleEvent, LoopType};
use crate::tween::Tween;
use crate::unit::{Unit, UnitId};
use crate::Result;

/// Transient chaining handle returned by [`Engine::unit`].
///
/// Setters that cannot fail consume and return the handle; `name` and
/// `profile` return `Result`. Tween-only setters log and do nothing on
/// other unit kinds.
pub struct UnitMut<'a> {
    engine: &'a mut Engine,
    id: UnitId,
}

impl std::fmt::Debug for UnitMut<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnitMut").field("id", &self.id).finish()
    }
}

impl<'a> UnitMut<'a> {
    pub(crate) fn new(engine: &'a mut Engine, id: UnitId) -> Self {
        Self { engine, id }
    }

    #[inline]
    pub fn id(&self) -> UnitId {
        self.id
    }

    #[inline]
    pub fn engine(&mut self) -> &mut Engine {
        &mut *self.engine
    }

    pub fn state(&self) -> FluxState {
        self.engine.state(self.id).unwrap_or(FluxState::Killed)
    }

    fn with_unit(self, f: impl FnOnce(&mut Unit)) -> Self {
        if let Some(unit) = self.engine.units.get_mut(self.id) {
            f(unit);
        }
        self
    }

    fn report(self, setting: &str, result: Result<()>) -> Self {
        if let Err(err) = result {
            log::warn!("{setting} ignored for {:?}: {err}", self.id);
        }
        self
    }

    fn with_tween(self, setting: &str, f: impl FnOnce(&mut Tween)) -> Self {
        let id = self.id;
        self.with_unit(|unit| {
            let label = unit.kind.label();
            match unit.tween_mut() {
                Some(tween) => f(tween),
                None => log::warn!("{setting} ignored: {id:?} is a {label}"),
            }
        })
    }

    pub fn delay(self, delay: f32) -> Self {
        let delay = non_negative("delay", delay);
        self.with_unit(|unit| unit.delay = delay)
    }

    pub fn loops(self, count: u32) -> Self {
        let result = self.engine.set_loops(self.id, count);
        self.report("loops", result)
    }

    pub fn infinite(self, infinite: bool) -> Self {
        self.with_unit(|unit| unit.infinite_loop = infinite)
    }

    pub fn liveness(self, alive: impl Fn() -> bool + 'static) -> Self {
        self.with_unit(|unit| unit.liveness = Some(Box::new(alive)))
    }

    pub fn loop_type(self, loop_type: LoopType) -> Self {
        self.with_tween("loop type", |tween| tween.loop_type = loop_type)
    }

    pub fn ease(self, ease: impl EaseFunction + 'static) -> Self {
        self.with_tween("ease", |tween| tween.ease = Box::new(ease))
    }

    pub fn relative(self, relative: bool) -> Self {
        self.with_tween("relative", |tween| tween.relative = relative)
    }

    /// Reinterpret the duration as units per second.
    pub fn speed_based(self, speed_based: bool) -> Self {
        self.with_tween("speed based", |tween| tween.set_speed_based(speed_based))
    }

    fn listen(self, event: LifecycleEvent, f: impl FnMut(&mut Engine, UnitId) + 'static) -> Self {
        self.with_unit(|unit| unit.listeners.slot(event).push(Box::new(f)))
    }

    pub fn on_played(self, f: impl FnMut(&mut Engine, UnitId) + 'static) -> Self {
        self.listen(LifecycleEvent::Played, f)
    }

    pub fn on_paused(self, f: impl FnMut(&mut Engine, UnitId) + 'static) -> Self {
        self.listen(LifecycleEvent::Paused, f)
    }

    pub fn on_completed(self, f: impl FnMut(&mut Engine, UnitId) + 'static) -> Self {
        self.listen(LifecycleEvent::Completed, f)
    }

    pub fn on_killed(self, f: impl FnMut(&mut Engine, UnitId) + 'static) -> Self {
        self.listen(LifecycleEvent::Killed, f)
    }

    pub fn name(self, name: impl Into<String>) -> Result<Self> {
        self.engine.set_name(self.id, name)?;
        Ok(self)
    }

    pub fn profile(self, profile: Profile) -> Result<Self> {
        self.engine.set_profile(self.id, profile)?;
        Ok(self)
    }

    /// Extra action for a callback unit.
    pub fn action(self, action: impl FnMut(&mut Engine) + 'static) -> Result<Self> {
        self.engine.add_action(self.id, action)?;
        Ok(self)
    }

    pub fn pause(self) -> Self {
        let result = self.engine.pause(self.id);
        self.report("pause", result)
    }

    pub fn resume(self) -> Self {
        let result = self.engine.resume(self.id);
        self.report("resume", result)
    }

    pub fn kill(self) -> Self {
        let result = self.engine.kill(self.id);
        self.report("kill", result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ease::Ease;
    use crate::error::FluxError;

    #[test]
    fn chained_setters_apply() {
        let mut engine = Engine::default();
        let id = engine.create(|| 0.0f32, |_| {}, 1.0, 1.0);
        engine
            .unit(id)
            .unwrap()
            .delay(0.25)
            .loops(3)
            .loop_type(LoopType::Yoyo)
            .ease(Ease::OUT_QUAD)
            .name("fade")
            .unwrap();

        assert_eq!(engine.delay(id), Some(0.25));
        assert_eq!(engine.loop_count(id), Some(3));
        assert_eq!(engine.get_by_name("fade"), Some(id));
    }

    #[test]
    fn tween_setters_ignore_other_kinds() {
        let mut engine = Engine::default();
        let id = engine.create_interval(1.0);
        engine.unit(id).unwrap().relative(true).delay(0.5);
        assert_eq!(engine.delay(id), Some(0.5));
        assert!(matches!(
            engine.unit(id).unwrap().profile(Profile::Linear),
            Err(FluxError::InvalidState { .. })
        ));
    }

    #[test]
    fn chaining_survives_a_released_unit() {
        let mut engine = Engine::new(crate::Config {
            dispose_killed: false,
            ..Default::default()
        });
        let id = engine.create_interval(0.0);
        engine.advance(0.1);
        engine.advance(0.1);
        assert_eq!(engine.state(id), Some(FluxState::Killed));

        let mut handle = engine.unit(id).unwrap();
        handle.engine().dispose(id).unwrap();
        let handle = handle.loops(2).pause().resume().kill();
        assert_eq!(handle.state(), FluxState::Killed);
        assert!(!engine.contains(id));
    }
}
