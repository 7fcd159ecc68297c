//! Per-unit state machine.
//!
//! ```text
//! Idle ─start→ DelayPhase ─elapsed > delay→ Playing ─time ≥ duration→ Completed
//!                  ⇅ pause/resume (latched)    ⇅                         │
//!                Paused                      Paused          loops left? ─┴→ Idle → start
//! any ─kill (flag)→ reap → Killed
//! ```

use crate::engine::{not_found, Engine};
use crate::error::FluxError;
use crate::state::{FluxState, LifecycleEvent, PauseRequest};
use crate::unit::{UnitId, UnitKind};
use crate::Result;

impl Engine {
    /// Start an idle unit: run its start hook, then enter DelayPhase or
    /// Playing. A unit flagged for termination, or whose liveness predicate
    /// fails, is left for the reaper instead.
    pub fn start(&mut self, id: UnitId) -> Result<()> {
        let unit = self.get(id)?;
        if unit.state != FluxState::Idle {
            return Err(FluxError::InvalidState {
                reason: format!("cannot start {id:?} while {}", unit.state.name()),
            });
        }
        if self.is_pending_kill(id) {
            return Ok(());
        }
        if !unit.is_alive() {
            log::debug!("{id:?} failed its liveness check at start");
            self.get_mut(id)?.pending_kill = true;
            return Ok(());
        }

        self.get_mut(id)?.elapsed = 0.0;
        self.on_start(id)?;

        let Some(unit) = self.units.get_mut(id) else {
            return Ok(());
        };
        unit.in_loop = false;
        let next = if unit.delay > 0.0 {
            FluxState::DelayPhase
        } else {
            FluxState::Playing
        };
        self.set_state(id, next);
        Ok(())
    }

    fn on_start(&mut self, id: UnitId) -> Result<()> {
        let unit = self.units.get_mut(id).ok_or_else(|| not_found(id))?;
        let in_loop = unit.in_loop;
        match &mut unit.kind {
            UnitKind::Tween(tween) => tween.on_start(in_loop, &mut self.evaluators),
            UnitKind::Sequence(sequence) => {
                sequence.rewind();
                log::debug!("sequence {id:?} starting with {} clips", sequence.clips.len());
                Ok(())
            }
            UnitKind::Callback { .. } => {
                self.invoke_actions(id);
                Ok(())
            }
            UnitKind::Interval { .. } => Ok(()),
        }
    }

    /// Advance a started unit by `delta_time` seconds.
    ///
    /// Completed and killed units are left untouched. A pending-kill
    /// sequence is killed along with its remaining children; other
    /// pending-kill units wait for the reap pass.
    pub fn update(&mut self, id: UnitId, delta_time: f32) -> Result<()> {
        if delta_time < 0.0 || delta_time.is_nan() {
            return Err(FluxError::invalid_argument(
                "delta_time",
                format!("must be non-negative, got {delta_time}"),
            ));
        }
        self.update_unit(id, delta_time)
    }

    pub(crate) fn update_unit(&mut self, id: UnitId, dt: f32) -> Result<()> {
        let unit = self.get(id)?;
        match unit.state {
            FluxState::Completed | FluxState::Killed => return Ok(()),
            FluxState::Idle => {
                return Err(FluxError::InvalidState {
                    reason: format!("{id:?} updated before start"),
                })
            }
            _ => {}
        }
        let is_sequence = matches!(unit.kind, UnitKind::Sequence(_));
        if self.is_pending_kill(id) {
            // No reap pass runs for manually driven units.
            if is_sequence {
                self.handle_kill(id);
            }
            return Ok(());
        }
        let unit = self.get(id)?;
        if !unit.is_alive() {
            log::debug!("{id:?} failed its liveness check");
            self.get_mut(id)?.pending_kill = true;
            return Ok(());
        }

        let request = self.get_mut(id)?.pause_request.take();
        let state = self.get(id)?.state;
        match request {
            Some(PauseRequest::Pause) if state.can_pause() => {
                self.set_state(id, FluxState::Paused);
                return Ok(());
            }
            Some(PauseRequest::Resume) if state == FluxState::Paused => {
                let unit = self.get(id)?;
                let next = if unit.elapsed < unit.delay {
                    FluxState::DelayPhase
                } else {
                    FluxState::Playing
                };
                self.set_state(id, next);
            }
            _ => {}
        }

        let unit = self.get_mut(id)?;
        match unit.state {
            FluxState::Paused => return Ok(()),
            FluxState::DelayPhase => {
                unit.elapsed += dt;
                if unit.elapsed > unit.delay {
                    self.set_state(id, FluxState::Playing);
                }
                return Ok(());
            }
            FluxState::Playing => unit.elapsed += dt,
            // A listener fired above already moved the unit on.
            _ => return Ok(()),
        }

        let time = unit.elapsed - unit.delay;
        let overshoot = unit.duration().filter(|duration| time >= *duration);
        let finished = self.on_playing(id, overshoot.unwrap_or(time))?;
        if finished || overshoot.is_some() {
            self.complete(id)?;
        }
        Ok(())
    }

    /// Playing hook. Returns `true` when the unit finished on its own terms
    /// rather than by running out of time.
    fn on_playing(&mut self, id: UnitId, time: f32) -> Result<bool> {
        let unit = self.units.get_mut(id).ok_or_else(|| not_found(id))?;
        match &mut unit.kind {
            UnitKind::Tween(tween) => {
                tween.on_playing(time)?;
                Ok(false)
            }
            UnitKind::Interval { .. } => Ok(false),
            UnitKind::Callback { .. } => Ok(true),
            UnitKind::Sequence(_) => self.sequence_on_playing(id, time),
        }
    }

    /// Record the pass, then loop back in or flag for termination.
    fn complete(&mut self, id: UnitId) -> Result<()> {
        let unit = self.get_mut(id)?;
        unit.last_play_time = (unit.elapsed - unit.delay).max(0.0);
        self.set_state(id, FluxState::Completed);

        let Some(unit) = self.units.get_mut(id) else {
            return Ok(());
        };
        if unit.state != FluxState::Completed {
            return Ok(());
        }
        if unit.infinite_loop || unit.loop_count >= 2 {
            if !unit.infinite_loop {
                unit.loop_count -= 1;
            }
            unit.in_loop = true;
            unit.state = FluxState::Idle;
            log::trace!("{id:?} looping, {} passes left", unit.loop_count);
            self.start(id)
        } else {
            unit.pending_kill = true;
            Ok(())
        }
    }

    /// Latch a pause; takes effect at the start of the next update.
    pub fn pause(&mut self, id: UnitId) -> Result<()> {
        self.get_mut(id)?.pause_request = Some(PauseRequest::Pause);
        Ok(())
    }

    /// Latch a resume; takes effect at the start of the next update.
    pub fn resume(&mut self, id: UnitId) -> Result<()> {
        self.get_mut(id)?.pause_request = Some(PauseRequest::Resume);
        Ok(())
    }

    /// Request termination. The transition to Killed happens at the next
    /// reap pass, or the owning clip's next update for sequence children.
    pub fn kill(&mut self, id: UnitId) -> Result<()> {
        let unit = self.get_mut(id)?;
        if !unit.pending_kill {
            log::trace!("kill requested for {id:?}");
        }
        unit.pending_kill = true;
        Ok(())
    }

    /// Termination hook plus the final transition. Idempotent.
    pub(crate) fn handle_kill(&mut self, id: UnitId) {
        let Some(unit) = self.units.get_mut(id) else {
            return;
        };
        if unit.state == FluxState::Killed {
            return;
        }
        unit.pending_kill = true;
        if matches!(unit.kind, UnitKind::Sequence(_)) {
            self.sequence_on_kill(id);
        }
        self.set_state(id, FluxState::Killed);
        if let Some(name) = self.units.get_mut(id).and_then(|unit| unit.name.take()) {
            self.names.remove_if(&name, id);
        }
    }

    /// Force termination after a failed hook.
    pub(crate) fn force_kill(&mut self, id: UnitId, err: &FluxError) {
        log::error!("{id:?} failed ({}): {err}", err.category());
        if let Some(unit) = self.units.get_mut(id) {
            unit.pending_kill = true;
        }
    }

    pub(crate) fn set_state(&mut self, id: UnitId, state: FluxState) {
        let Some(unit) = self.units.get_mut(id) else {
            return;
        };
        if unit.state == state {
            return;
        }
        log::trace!("{id:?}: {} -> {}", unit.state.name(), state.name());
        unit.state = state;
        if let Some(event) = state.event() {
            self.fire(id, event);
        }
    }

    /// Run listeners for `event`. Listeners registered while firing are
    /// kept for the next occurrence.
    fn fire(&mut self, id: UnitId, event: LifecycleEvent) {
        let Some(unit) = self.units.get_mut(id) else {
            return;
        };
        let mut listeners = std::mem::take(unit.listeners.slot(event));
        if listeners.is_empty() {
            return;
        }
        for listener in listeners.iter_mut() {
            listener(self, id);
        }
        if let Some(unit) = self.units.get_mut(id) {
            let slot = unit.listeners.slot(event);
            listeners.append(slot);
            *slot = listeners;
        }
    }

    fn invoke_actions(&mut self, id: UnitId) {
        let Some(UnitKind::Callback { actions }) = self.units.get_mut(id).map(|unit| &mut unit.kind)
        else {
            return;
        };
        let mut taken = std::mem::take(actions);
        for action in taken.iter_mut() {
            action(self);
        }
        if let Some(UnitKind::Callback { actions }) =
            self.units.get_mut(id).map(|unit| &mut unit.kind)
        {
            taken.append(actions);
            *actions = taken;
        }
    }
}
