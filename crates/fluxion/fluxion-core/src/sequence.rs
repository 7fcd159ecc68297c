//! Sequences: ordered clips of concurrently running child units.
//!
//! A clip receives tick time only once every unit in the clips before it
//! has been killed. Children are retired to Killed in the same clip update
//! that completes them, and a tick's leftover time carries into the next
//! clip.

use crate::engine::{not_found, Engine};
use crate::error::FluxError;
use crate::state::FluxState;
use crate::unit::{Unit, UnitId};
use crate::Result;

/// Units that run side by side inside a sequence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Clip {
    pub(crate) units: Vec<UnitId>,
    pub(crate) elapsed: f32,
}

impl Clip {
    fn with_unit(id: UnitId) -> Self {
        Self {
            units: vec![id],
            elapsed: 0.0,
        }
    }

    #[inline]
    pub fn units(&self) -> &[UnitId] {
        &self.units
    }

    /// Time this clip has been given so far.
    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }
}

#[derive(Debug, Default)]
pub(crate) struct Sequence {
    pub clips: Vec<Clip>,
    /// Index of the clip currently receiving time.
    pub cursor: usize,
    /// Playing time already handed to clips.
    pub consumed: f32,
    /// Sum of clip durations, known once the last clip finishes.
    pub actual_duration: Option<f32>,
}

impl Sequence {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Back to the first clip. Children retired on an earlier pass stay
    /// killed.
    pub(crate) fn rewind(&mut self) {
        self.cursor = 0;
        self.consumed = 0.0;
        self.actual_duration = None;
    }

    pub(crate) fn children(&self) -> impl Iterator<Item = UnitId> + '_ {
        self.clips.iter().flat_map(|clip| clip.units.iter().copied())
    }
}

fn sequence_of(engine: &Engine, id: UnitId) -> Result<&Sequence> {
    engine
        .get(id)?
        .sequence()
        .ok_or_else(|| FluxError::InvalidState {
            reason: format!("{id:?} is not a sequence"),
        })
}

impl Engine {
    // ---------- Composition ----------

    fn check_adoptable(&self, sequence: UnitId, unit: UnitId) -> Result<()> {
        sequence_of(self, sequence)?;
        let child = self.get(unit)?;
        if unit == sequence {
            return Err(FluxError::ownership("a sequence cannot contain itself"));
        }
        match child.owner {
            Some(owner) if owner == sequence => {
                return Err(FluxError::ownership(format!(
                    "{unit:?} is already in {sequence:?}"
                )))
            }
            Some(owner) => {
                return Err(FluxError::ownership(format!(
                    "{unit:?} is owned by sequence {owner:?}"
                )))
            }
            None => {}
        }
        if child.state == FluxState::Killed {
            return Err(FluxError::InvalidState {
                reason: format!("{unit:?} is killed"),
            });
        }
        let mut ancestor = self.owner(sequence);
        while let Some(node) = ancestor {
            if node == unit {
                return Err(FluxError::ownership(format!(
                    "{unit:?} contains {sequence:?}; adding it would form a cycle"
                )));
            }
            ancestor = self.owner(node);
        }
        Ok(())
    }

    fn adopt(&mut self, sequence: UnitId, unit: UnitId) -> Result<()> {
        self.scheduler.detach(unit);
        self.get_mut(unit)?.owner = Some(sequence);
        Ok(())
    }

    fn sequence_mut(&mut self, id: UnitId) -> Result<&mut Sequence> {
        self.units
            .get_mut(id)
            .ok_or_else(|| not_found(id))?
            .sequence_mut()
            .ok_or_else(|| FluxError::InvalidState {
                reason: format!("{id:?} is not a sequence"),
            })
    }

    /// Append a clip holding only `unit`. The unit leaves the scheduler and
    /// becomes owned by `sequence`.
    pub fn add_as_new_clip(&mut self, sequence: UnitId, unit: UnitId) -> Result<()> {
        self.check_adoptable(sequence, unit)?;
        self.adopt(sequence, unit)?;
        let seq = self.sequence_mut(sequence)?;
        seq.clips.push(Clip::with_unit(unit));
        log::debug!("{sequence:?}: clip {} <- {unit:?}", seq.clips.len() - 1);
        Ok(())
    }

    /// Run `unit` alongside the most recent clip, or start the first clip.
    pub fn add_to_last_clip(&mut self, sequence: UnitId, unit: UnitId) -> Result<()> {
        if sequence_of(self, sequence)?.clips.is_empty() {
            return self.add_as_new_clip(sequence, unit);
        }
        self.check_adoptable(sequence, unit)?;
        self.adopt(sequence, unit)?;
        let seq = self.sequence_mut(sequence)?;
        let index = seq.clips.len() - 1;
        if let Some(clip) = seq.clips.last_mut() {
            clip.units.push(unit);
        }
        log::debug!("{sequence:?}: clip {index} += {unit:?}");
        Ok(())
    }

    // ---------- Queries ----------

    pub fn clip_count(&self, sequence: UnitId) -> Option<usize> {
        Some(self.units.get(sequence)?.sequence()?.clips.len())
    }

    pub fn clip(&self, sequence: UnitId, index: usize) -> Option<&Clip> {
        self.units.get(sequence)?.sequence()?.clips.get(index)
    }

    /// Index of the clip currently receiving time.
    pub fn current_clip(&self, sequence: UnitId) -> Option<usize> {
        Some(self.units.get(sequence)?.sequence()?.cursor)
    }

    /// Longest known child duration. Undetermined children are skipped;
    /// `None` until at least one child's duration is known.
    pub fn clip_duration(&self, sequence: UnitId, index: usize) -> Option<f32> {
        self.clip(sequence, index)?
            .units
            .iter()
            .filter_map(|child| self.duration(*child))
            .fold(None, |longest: Option<f32>, d| {
                Some(longest.map_or(d, |l| l.max(d)))
            })
    }

    // ---------- Playback ----------

    /// Hand the playing time not yet consumed to the clips, crossing clip
    /// boundaries within the tick. Returns `true` once past the last clip.
    pub(crate) fn sequence_on_playing(&mut self, id: UnitId, time: f32) -> Result<bool> {
        let seq = self.sequence_mut(id)?;
        let mut remaining = (time - seq.consumed).max(0.0);
        seq.consumed = seq.consumed.max(time);

        loop {
            let seq = sequence_of(self, id)?;
            let cursor = seq.cursor;
            if remaining <= 0.0 || cursor >= seq.clips.len() {
                break;
            }
            let elapsed_before = seq.clips[cursor].elapsed;
            if !self.update_clip(id, cursor, remaining) {
                break;
            }
            let clip_remaining =
                (self.clip_duration(id, cursor).unwrap_or(0.0) - elapsed_before).max(0.0);
            remaining = (remaining - clip_remaining).max(0.0);
            self.sequence_mut(id)?.cursor += 1;
            log::debug!("{id:?}: clip {cursor} done, {remaining}s carried over");
        }

        let clip_count = sequence_of(self, id)?.clips.len();
        if sequence_of(self, id)?.cursor < clip_count {
            return Ok(false);
        }
        let total = (0..clip_count)
            .map(|index| self.clip_duration(id, index).unwrap_or(0.0))
            .sum::<f32>();
        self.sequence_mut(id)?.actual_duration = Some(total);
        Ok(true)
    }

    /// Start and update every unit in one clip. Failures are logged and the
    /// failing child is killed; the rest of the clip carries on. Returns
    /// `true` when every child is killed.
    fn update_clip(&mut self, sequence: UnitId, index: usize, dt: f32) -> bool {
        let Some(clip) = self
            .units
            .get_mut(sequence)
            .and_then(Unit::sequence_mut)
            .and_then(|seq| seq.clips.get_mut(index))
        else {
            return true;
        };
        clip.elapsed += dt;
        let children = clip.units.clone();

        let mut all_killed = true;
        for child in children {
            let state = match self.state(child) {
                None | Some(FluxState::Killed) => continue,
                Some(state) => state,
            };
            if !self.is_pending_kill(child) && state == FluxState::Idle {
                if let Err(err) = self.start(child) {
                    self.force_kill(child, &err);
                }
            }
            if !self.is_pending_kill(child) {
                if let Err(err) = self.update_unit(child, dt) {
                    self.force_kill(child, &err);
                }
            }
            if self.is_pending_kill(child) {
                self.handle_kill(child);
            } else {
                all_killed = false;
            }
        }
        all_killed
    }

    /// Kill hook: terminate every child from the current clip onward.
    pub(crate) fn sequence_on_kill(&mut self, id: UnitId) {
        let Some(seq) = self.units.get(id).and_then(Unit::sequence) else {
            return;
        };
        let children: Vec<UnitId> = seq
            .clips
            .iter()
            .skip(seq.cursor)
            .flat_map(|clip| clip.units.iter().copied())
            .collect();
        for child in children {
            self.handle_kill(child);
        }
    }
}
