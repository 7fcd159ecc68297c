//! Tick engine for top-level units.

use hashbrown::HashSet;
use indexmap::IndexSet;

use crate::engine::Engine;
use crate::state::FluxState;
use crate::time::TimeSource;
use crate::unit::UnitId;

/// Insertion-ordered set of attached top-level units.
#[derive(Debug, Default, Clone)]
pub struct Scheduler {
    attached: IndexSet<UnitId>,
    /// Reused between passes.
    reap_queue: Vec<UnitId>,
    retired: HashSet<UnitId>,
    ticks: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if `id` was already attached.
    #[inline]
    pub fn attach(&mut self, id: UnitId) -> bool {
        self.attached.insert(id)
    }

    /// Order-preserving removal.
    #[inline]
    pub fn detach(&mut self, id: UnitId) -> bool {
        self.attached.shift_remove(&id)
    }

    /// Order-preserving removal of a batch in a single pass. Returns how
    /// many were attached.
    pub fn detach_all(&mut self, ids: &HashSet<UnitId>) -> usize {
        if ids.is_empty() {
            return 0;
        }
        let before = self.attached.len();
        self.attached.retain(|id| !ids.contains(id));
        before - self.attached.len()
    }

    #[inline]
    pub fn contains(&self, id: UnitId) -> bool {
        self.attached.contains(&id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.attached.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.attached.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = UnitId> + '_ {
        self.attached.iter().copied()
    }

    /// Completed advance passes that had work to do.
    #[inline]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

impl Engine {
    /// Advance every attached unit by `delta_time` seconds, then reap the
    /// ones flagged for termination.
    ///
    /// Units added during the pass are first processed on the next call;
    /// units detached during the pass are skipped. Start and update failures
    /// are logged and kill the failing unit without interrupting the pass.
    pub fn advance(&mut self, delta_time: f32) {
        if self.config.dispose_killed && !self.graveyard.is_empty() {
            self.release_graveyard();
        }

        let dt = if delta_time >= 0.0 {
            delta_time
        } else {
            log::warn!("advance called with delta time {delta_time}; using 0");
            0.0
        };
        if self.scheduler.is_empty() {
            return;
        }

        let snapshot: Vec<UnitId> = self.scheduler.ids().collect();
        let mut reap = std::mem::take(&mut self.scheduler.reap_queue);
        let mut retired = std::mem::take(&mut self.scheduler.retired);

        for id in snapshot {
            if !self.scheduler.contains(id) {
                continue;
            }
            match self.state(id) {
                None | Some(FluxState::Killed) => {
                    retired.insert(id);
                    continue;
                }
                Some(FluxState::Idle) if !self.is_pending_kill(id) => {
                    if let Err(err) = self.start(id) {
                        self.force_kill(id, &err);
                    }
                }
                Some(_) => {}
            }
            if self.is_pending_kill(id) {
                reap.push(id);
                continue;
            }
            if let Err(err) = self.update_unit(id, dt) {
                self.force_kill(id, &err);
                reap.push(id);
            }
        }

        for id in reap.drain(..) {
            self.handle_kill(id);
            if retired.insert(id) {
                self.graveyard.push(id);
            }
        }
        let detached = self.scheduler.detach_all(&retired);
        if detached > 0 {
            log::trace!("reaped {detached} units");
        }
        retired.clear();
        self.scheduler.reap_queue = reap;
        self.scheduler.retired = retired;
        self.scheduler.ticks += 1;
    }

    /// [`advance`](Self::advance) by whatever the time source reports.
    pub fn tick(&mut self, source: &mut impl TimeSource) {
        let dt = source.delta_time();
        self.advance(dt);
    }
}
