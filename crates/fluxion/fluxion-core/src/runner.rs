//! Manual driver for tests and tools: steps one unit directly, bypassing
//! the scheduler.

use crate::engine::Engine;
use crate::error::FluxError;
use crate::state::FluxState;
use crate::unit::UnitId;
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TestRunner {
    /// Step used by `run_to_completion` and `run_for`.
    pub time_step: f32,
    /// Simulated seconds before `run_to_completion` gives up.
    pub max_time: f32,
}

impl Default for TestRunner {
    fn default() -> Self {
        Self {
            time_step: 1.0 / 60.0,
            max_time: 10.0,
        }
    }
}

fn positive(name: &str, value: f32) -> Result<()> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(FluxError::invalid_argument(
            name,
            format!("must be positive, got {value}"),
        ))
    }
}

impl TestRunner {
    pub fn new(time_step: f32, max_time: f32) -> Self {
        Self {
            time_step,
            max_time,
        }
    }

    /// Start `id` if idle, then update it by `delta_time`.
    pub fn update_unit(&self, engine: &mut Engine, id: UnitId, delta_time: f32) -> Result<()> {
        if delta_time < 0.0 || delta_time.is_nan() {
            return Err(FluxError::invalid_argument(
                "delta_time",
                format!("must be non-negative, got {delta_time}"),
            ));
        }
        if engine.state(id) == Some(FluxState::Idle) && !engine.is_pending_kill(id) {
            engine.start(id)?;
        }
        engine.update(id, delta_time)
    }

    /// Step until `id` finishes every pass. Returns the simulated time.
    pub fn run_to_completion(&self, engine: &mut Engine, id: UnitId) -> Result<f32> {
        positive("time_step", self.time_step)?;
        positive("max_time", self.max_time)?;

        let mut time = 0.0;
        while !Self::finished(engine, id)? {
            if time >= self.max_time {
                return Err(FluxError::Timeout {
                    max_time: self.max_time,
                });
            }
            self.update_unit(engine, id, self.time_step)?;
            time += self.time_step;
        }
        Ok(time)
    }

    /// Step for `duration` seconds; the last step is shortened to land
    /// exactly on it.
    pub fn run_for(&self, engine: &mut Engine, id: UnitId, duration: f32) -> Result<()> {
        positive("time_step", self.time_step)?;
        positive("duration", duration)?;

        let mut time = 0.0;
        while time < duration {
            let step = self.time_step.min(duration - time);
            self.update_unit(engine, id, step)?;
            time += step;
        }
        Ok(())
    }

    fn finished(engine: &Engine, id: UnitId) -> Result<bool> {
        let state = engine.state(id).ok_or_else(|| FluxError::UnitNotFound {
            id: format!("{id:?}"),
        })?;
        Ok(state == FluxState::Killed || engine.is_pending_kill(id))
    }
}
