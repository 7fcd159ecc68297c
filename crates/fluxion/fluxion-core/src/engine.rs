//! The engine: owns every unit, the scheduler, the name registry and the
//! evaluator registry. Pass one around instead of reaching for a global.

use slotmap::SlotMap;

use crate::config::{Config, UnitSettings};
use crate::error::FluxError;
use crate::eval::EvaluatorRegistry;
use crate::handle::UnitMut;
use crate::profile::Profile;
use crate::registry::NameRegistry;
use crate::scheduler::Scheduler;
use crate::sequence::Sequence;
use crate::state::{FluxState, LifecycleEvent};
use crate::tween::Tween;
use crate::unit::{Action, Liveness, Listener, Unit, UnitId, UnitKind};
use crate::value::{Animatable, Value};
use crate::Result;

/// Clamp a negative timing argument to zero.
pub(crate) fn non_negative(name: &str, value: f32) -> f32 {
    if value >= 0.0 {
        value
    } else {
        log::warn!("{name} {value} is negative; clamping to 0");
        0.0
    }
}

pub(crate) fn not_found(id: UnitId) -> FluxError {
    FluxError::UnitNotFound {
        id: format!("{id:?}"),
    }
}

pub struct Engine {
    pub(crate) config: Config,
    pub(crate) units: SlotMap<UnitId, Unit>,
    pub(crate) scheduler: Scheduler,
    pub(crate) names: NameRegistry,
    pub(crate) evaluators: EvaluatorRegistry,
    /// Killed top-level units awaiting release.
    pub(crate) graveyard: Vec<UnitId>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("units", &self.units.len())
            .field("attached", &self.scheduler.len())
            .field("names", &self.names.len())
            .finish()
    }
}

impl Engine {
    pub fn new(config: Config) -> Self {
        Self::with_evaluators(config, EvaluatorRegistry::new())
    }

    /// Engine using a host-built evaluator registry.
    pub fn with_evaluators(config: Config, evaluators: EvaluatorRegistry) -> Self {
        Self {
            units: SlotMap::with_capacity_and_key(config.unit_capacity),
            scheduler: Scheduler::new(),
            names: NameRegistry::new(),
            evaluators,
            graveyard: Vec::new(),
            config,
        }
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[inline]
    pub fn evaluators(&self) -> &EvaluatorRegistry {
        &self.evaluators
    }

    #[inline]
    pub fn evaluators_mut(&mut self) -> &mut EvaluatorRegistry {
        &mut self.evaluators
    }

    #[inline]
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    fn insert(&mut self, kind: UnitKind) -> UnitId {
        let label = kind.label();
        let id = self.units.insert(Unit::new(kind));
        self.scheduler.attach(id);
        log::trace!("created {label} {id:?}");
        id
    }

    // ---------- Factories ----------

    /// Tween a typed host property towards `end` over `duration` seconds.
    pub fn create<T, G, S>(&mut self, mut getter: G, mut setter: S, end: T, duration: f32) -> UnitId
    where
        T: Animatable,
        G: FnMut() -> T + 'static,
        S: FnMut(T) + 'static,
    {
        self.create_value(
            move || getter().into_value(),
            move |value: Value| {
                if let Some(value) = T::from_value(&value) {
                    setter(value);
                }
            },
            end.into_value(),
            duration,
        )
    }

    /// Tween over dynamic [`Value`]s; the value kind comes from `end`.
    pub fn create_value<G, S>(&mut self, getter: G, setter: S, end: Value, duration: f32) -> UnitId
    where
        G: FnMut() -> Value + 'static,
        S: FnMut(Value) + 'static,
    {
        let tween = Tween::new(
            Box::new(getter),
            Box::new(setter),
            end,
            non_negative("duration", duration),
            Box::new(self.config.default_ease),
        );
        self.insert(UnitKind::Tween(Box::new(tween)))
    }

    pub fn create_sequence(&mut self) -> UnitId {
        self.insert(UnitKind::Sequence(Sequence::new()))
    }

    /// One-shot unit running `action` when started.
    pub fn create_callback<F>(&mut self, action: F) -> UnitId
    where
        F: FnMut(&mut Engine) + 'static,
    {
        let actions: Vec<Action> = vec![Box::new(action)];
        self.insert(UnitKind::Callback { actions })
    }

    /// Unit that only takes up time.
    pub fn create_interval(&mut self, duration: f32) -> UnitId {
        self.insert(UnitKind::Interval {
            duration: non_negative("duration", duration),
        })
    }

    /// Fluent handle for configuring `id`.
    pub fn unit(&mut self, id: UnitId) -> Result<UnitMut<'_>> {
        if self.units.contains_key(id) {
            Ok(UnitMut::new(self, id))
        } else {
            Err(not_found(id))
        }
    }

    pub(crate) fn get(&self, id: UnitId) -> Result<&Unit> {
        self.units.get(id).ok_or_else(|| not_found(id))
    }

    pub(crate) fn get_mut(&mut self, id: UnitId) -> Result<&mut Unit> {
        self.units.get_mut(id).ok_or_else(|| not_found(id))
    }

    // ---------- Queries ----------

    #[inline]
    pub fn contains(&self, id: UnitId) -> bool {
        self.units.contains_key(id)
    }

    #[inline]
    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    #[inline]
    pub fn attached_count(&self) -> usize {
        self.scheduler.len()
    }

    #[inline]
    pub fn is_attached(&self, id: UnitId) -> bool {
        self.scheduler.contains(id)
    }

    pub fn state(&self, id: UnitId) -> Option<FluxState> {
        self.units.get(id).map(|unit| unit.state)
    }

    /// `None` while undetermined (speed-based before start, callbacks,
    /// unfinished sequences) or when `id` is unknown.
    pub fn duration(&self, id: UnitId) -> Option<f32> {
        self.units.get(id).and_then(Unit::duration)
    }

    pub fn elapsed(&self, id: UnitId) -> Option<f32> {
        self.units.get(id).map(|unit| unit.elapsed)
    }

    pub fn last_play_time(&self, id: UnitId) -> Option<f32> {
        self.units.get(id).map(|unit| unit.last_play_time)
    }

    pub fn delay(&self, id: UnitId) -> Option<f32> {
        self.units.get(id).map(|unit| unit.delay)
    }

    /// Remaining passes, counting the current one.
    pub fn loop_count(&self, id: UnitId) -> Option<u32> {
        self.units.get(id).map(|unit| unit.loop_count)
    }

    pub fn name(&self, id: UnitId) -> Option<&str> {
        self.units.get(id).and_then(|unit| unit.name.as_deref())
    }

    pub fn owner(&self, id: UnitId) -> Option<UnitId> {
        self.units.get(id).and_then(|unit| unit.owner)
    }

    /// Own flag or any owning sequence's flag. Unknown ids report `false`.
    pub fn is_pending_kill(&self, id: UnitId) -> bool {
        let mut current = Some(id);
        // Ownership is acyclic; the bound only guards against corruption.
        for _ in 0..=self.units.len() {
            let Some(unit) = current.and_then(|id| self.units.get(id)) else {
                return false;
            };
            if unit.pending_kill {
                return true;
            }
            current = unit.owner;
        }
        false
    }

    /// Not flagged for termination and not killed.
    pub fn is_live(&self, id: UnitId) -> bool {
        self.units
            .get(id)
            .map_or(false, |unit| unit.state != FluxState::Killed)
            && !self.is_pending_kill(id)
    }

    /// Current `(start, end)` of a tween.
    pub fn tween_endpoints(&self, id: UnitId) -> Option<(Value, Value)> {
        match &self.units.get(id)?.kind {
            UnitKind::Tween(tween) => Some(tween.endpoints()),
            _ => None,
        }
    }

    pub fn profile(&self, id: UnitId) -> Option<Profile> {
        match &self.units.get(id)?.kind {
            UnitKind::Tween(tween) => Some(tween.profile),
            _ => None,
        }
    }

    // ---------- Names ----------

    /// Look up a live-or-retained unit by name.
    pub fn get_by_name(&self, name: &str) -> Option<UnitId> {
        self.names.get(name).filter(|id| self.units.contains_key(*id))
    }

    /// Register `name` for `id`, releasing its previous name. An empty name
    /// makes the unit anonymous. Fails while another live unit holds `name`;
    /// a holder pending termination is displaced.
    pub fn set_name(&mut self, id: UnitId, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        self.get(id)?;
        if let Some(holder) = self.names.get(&name) {
            if holder != id && self.is_live(holder) {
                return Err(FluxError::NameConflict { name });
            }
        }

        let unit = self.get_mut(id)?;
        let previous = unit.name.take();
        if !name.is_empty() {
            unit.name = Some(name.clone());
        }
        if let Some(previous) = previous {
            self.names.remove_if(&previous, id);
        }
        if !name.is_empty() {
            if let Some(displaced) = self.names.insert(name.clone(), id) {
                if displaced != id {
                    log::debug!("name '{name}' moved from {displaced:?} to {id:?}");
                    if let Some(old) = self.units.get_mut(displaced) {
                        old.name = None;
                    }
                }
            }
        }
        Ok(())
    }

    // ---------- Configuration ----------

    pub fn set_delay(&mut self, id: UnitId, delay: f32) -> Result<()> {
        self.get_mut(id)?.delay = non_negative("delay", delay);
        Ok(())
    }

    /// Number of passes; values below one are raised to one.
    pub fn set_loops(&mut self, id: UnitId, count: u32) -> Result<()> {
        if count == 0 {
            log::warn!("loop count 0 for {id:?}; using 1");
        }
        self.get_mut(id)?.loop_count = count.max(1);
        Ok(())
    }

    pub fn set_infinite(&mut self, id: UnitId, infinite: bool) -> Result<()> {
        self.get_mut(id)?.infinite_loop = infinite;
        Ok(())
    }

    pub fn set_liveness<F>(&mut self, id: UnitId, alive: F) -> Result<()>
    where
        F: Fn() -> bool + 'static,
    {
        let liveness: Liveness = Box::new(alive);
        self.get_mut(id)?.liveness = Some(liveness);
        Ok(())
    }

    /// Replace a tween's motion profile.
    pub fn set_profile(&mut self, id: UnitId, profile: Profile) -> Result<()> {
        let unit = self.units.get_mut(id).ok_or_else(|| not_found(id))?;
        let tween = unit.tween_mut().ok_or_else(|| FluxError::InvalidState {
            reason: "motion profiles apply to tweens only".to_string(),
        })?;
        tween.set_profile(profile, &mut self.evaluators)
    }

    /// Append an action to a callback unit.
    pub fn add_action<F>(&mut self, id: UnitId, action: F) -> Result<()>
    where
        F: FnMut(&mut Engine) + 'static,
    {
        match &mut self.get_mut(id)?.kind {
            UnitKind::Callback { actions } => {
                actions.push(Box::new(action));
                Ok(())
            }
            other => Err(FluxError::InvalidState {
                reason: format!("cannot add an action to a {}", other.label()),
            }),
        }
    }

    /// Subscribe to a lifecycle event.
    pub fn on<F>(&mut self, id: UnitId, event: LifecycleEvent, listener: F) -> Result<()>
    where
        F: FnMut(&mut Engine, UnitId) + 'static,
    {
        let listener: Listener = Box::new(listener);
        self.get_mut(id)?.listeners.slot(event).push(listener);
        Ok(())
    }

    /// Apply a settings bundle. Tween-only fields are ignored by other kinds.
    pub fn apply_settings(&mut self, id: UnitId, settings: &UnitSettings) -> Result<()> {
        if let Some(name) = &settings.name {
            self.set_name(id, name.clone())?;
        }
        self.set_delay(id, settings.delay)?;
        self.set_loops(id, settings.loop_count)?;
        self.set_infinite(id, settings.infinite_loop)?;
        if let Some(tween) = self.get_mut(id)?.tween_mut() {
            tween.loop_type = settings.loop_type;
            tween.relative = settings.relative;
            tween.set_speed_based(settings.speed_based);
            if let Some(ease) = settings.ease {
                tween.ease = Box::new(ease);
            }
        }
        Ok(())
    }

    // ---------- Scheduling ----------

    /// Put a top-level unit under the scheduler. Returns `false` when it
    /// already was.
    pub fn attach(&mut self, id: UnitId) -> Result<bool> {
        let unit = self.get(id)?;
        if let Some(owner) = unit.owner {
            return Err(FluxError::ownership(format!(
                "{id:?} belongs to sequence {owner:?}"
            )));
        }
        if unit.state == FluxState::Killed {
            return Err(FluxError::InvalidState {
                reason: format!("{id:?} is killed"),
            });
        }
        Ok(self.scheduler.attach(id))
    }

    /// Remove `id` from the scheduler without killing it.
    pub fn detach(&mut self, id: UnitId) -> bool {
        self.scheduler.detach(id)
    }

    // ---------- Disposal ----------

    /// Release a killed unit's slot, and its children's for sequences.
    ///
    /// Sequence children are only released together with their sequence.
    pub fn dispose(&mut self, id: UnitId) -> Result<()> {
        let unit = self.get(id)?;
        if let Some(owner) = unit.owner {
            return Err(FluxError::OwnershipViolation {
                reason: format!("{id:?} belongs to {owner:?}; dispose the sequence instead"),
            });
        }
        if unit.state != FluxState::Killed {
            return Err(FluxError::InvalidState {
                reason: format!("{id:?} is {} and cannot be disposed", unit.state.name()),
            });
        }
        self.graveyard.retain(|dead| *dead != id);
        self.release(id);
        Ok(())
    }

    pub(crate) fn release_graveyard(&mut self) {
        let graveyard = std::mem::take(&mut self.graveyard);
        for id in graveyard {
            match self.units.get(id).map(|unit| unit.state) {
                Some(FluxState::Killed) => self.release(id),
                Some(state) => log::warn!("{id:?} queued for release while {}", state.name()),
                None => {}
            }
        }
    }

    fn release(&mut self, id: UnitId) {
        self.scheduler.detach(id);
        let Some(unit) = self.units.remove(id) else {
            return;
        };
        if let Some(name) = &unit.name {
            self.names.remove_if(name, id);
        }
        if let UnitKind::Sequence(sequence) = unit.kind {
            for child in sequence.children() {
                self.release(child);
            }
        }
        log::trace!("released {id:?}");
    }
}
