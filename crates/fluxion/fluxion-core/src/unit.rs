//! Unit storage: the state every schedulable entry shares, plus its
//! variant payload.

use slotmap::new_key_type;

use crate::engine::Engine;
use crate::sequence::Sequence;
use crate::state::{FluxState, LifecycleEvent, PauseRequest};
use crate::tween::Tween;

new_key_type! {
    /// Generational handle to a unit owned by an [`Engine`].
    pub struct UnitId;
}

/// Lifecycle listener. Receives the engine so it may create, attach or kill
/// units while a tick is in progress.
pub type Listener = Box<dyn FnMut(&mut Engine, UnitId)>;

/// Callback unit action.
pub type Action = Box<dyn FnMut(&mut Engine)>;

/// Host-supplied predicate; `false` makes the unit terminate itself.
pub type Liveness = Box<dyn Fn() -> bool>;

#[derive(Default)]
pub(crate) struct Listeners {
    played: Vec<Listener>,
    paused: Vec<Listener>,
    completed: Vec<Listener>,
    killed: Vec<Listener>,
}

impl Listeners {
    pub(crate) fn slot(&mut self, event: LifecycleEvent) -> &mut Vec<Listener> {
        match event {
            LifecycleEvent::Played => &mut self.played,
            LifecycleEvent::Paused => &mut self.paused,
            LifecycleEvent::Completed => &mut self.completed,
            LifecycleEvent::Killed => &mut self.killed,
        }
    }
}

/// Variant payload.
pub(crate) enum UnitKind {
    Tween(Box<Tween>),
    Interval { duration: f32 },
    Callback { actions: Vec<Action> },
    Sequence(Sequence),
}

impl UnitKind {
    pub(crate) fn label(&self) -> &'static str {
        match self {
            Self::Tween(_) => "tween",
            Self::Interval { .. } => "interval",
            Self::Callback { .. } => "callback",
            Self::Sequence(_) => "sequence",
        }
    }
}

pub(crate) struct Unit {
    pub name: Option<String>,
    pub delay: f32,
    pub loop_count: u32,
    pub infinite_loop: bool,
    /// Time accrued since the last start, delay included.
    pub elapsed: f32,
    pub last_play_time: f32,
    pub state: FluxState,
    /// Non-owning back reference to the sequence holding this unit.
    pub owner: Option<UnitId>,
    /// Own flag only; see `Engine::is_pending_kill` for the inherited view.
    pub pending_kill: bool,
    pub in_loop: bool,
    pub pause_request: Option<PauseRequest>,
    pub liveness: Option<Liveness>,
    pub listeners: Listeners,
    pub kind: UnitKind,
}

impl Unit {
    pub(crate) fn new(kind: UnitKind) -> Self {
        Self {
            name: None,
            delay: 0.0,
            loop_count: 1,
            infinite_loop: false,
            elapsed: 0.0,
            last_play_time: 0.0,
            state: FluxState::Idle,
            owner: None,
            pending_kill: false,
            in_loop: false,
            pause_request: None,
            liveness: None,
            listeners: Listeners::default(),
            kind,
        }
    }

    /// Evaluates the liveness predicate; units without one are always alive.
    #[inline]
    pub(crate) fn is_alive(&self) -> bool {
        self.liveness.as_ref().map_or(true, |alive| alive())
    }

    pub(crate) fn duration(&self) -> Option<f32> {
        match &self.kind {
            UnitKind::Tween(tween) => tween.duration(),
            UnitKind::Interval { duration } => Some(*duration),
            UnitKind::Callback { .. } => None,
            UnitKind::Sequence(sequence) => sequence.actual_duration,
        }
    }

    pub(crate) fn tween_mut(&mut self) -> Option<&mut Tween> {
        match &mut self.kind {
            UnitKind::Tween(tween) => Some(tween.as_mut()),
            _ => None,
        }
    }

    pub(crate) fn sequence(&self) -> Option<&Sequence> {
        match &self.kind {
            UnitKind::Sequence(sequence) => Some(sequence),
            _ => None,
        }
    }

    pub(crate) fn sequence_mut(&mut self) -> Option<&mut Sequence> {
        match &mut self.kind {
            UnitKind::Sequence(sequence) => Some(sequence),
            _ => None,
        }
    }
}
