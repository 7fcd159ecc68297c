//! Fluxion Core
//!
//! A tick-driven tween scheduler. Units (value tweens, intervals, callbacks
//! and sequences) live in an [`Engine`], which advances the attached ones
//! once per host tick, composes sequences out of ordered clips, and picks a
//! value evaluator per (value kind, profile kind) at runtime.
//!
//! ```
//! use fluxion_core::{Config, Engine, FluxState};
//! use std::{cell::Cell, rc::Rc};
//!
//! let mut engine = Engine::new(Config::default());
//! let x = Rc::new(Cell::new(0.0f32));
//! let (get, set) = (x.clone(), x.clone());
//! let id = engine.create(move || get.get(), move |v| set.set(v), 10.0, 1.0);
//!
//! engine.advance(0.5);
//! assert!((x.get() - 5.0).abs() < 1e-5);
//! engine.advance(0.6);
//! assert_eq!(x.get(), 10.0);
//! assert_eq!(engine.state(id), Some(FluxState::Completed));
//! ```

pub mod config;
pub mod ease;
pub mod engine;
pub mod error;
pub mod eval;
pub mod handle;
mod lifecycle;
pub mod profile;
pub mod registry;
pub mod runner;
pub mod scheduler;
pub mod sequence;
pub mod state;
pub mod time;
pub mod tween;
pub mod unit;
pub mod value;

// Re-export common types for convenience
pub use config::{Config, UnitSettings};
pub use ease::{Ease, EaseFunction};
pub use engine::Engine;
pub use error::FluxError;
pub use eval::{
    builtin_descriptors, Evaluator, EvaluatorContext, EvaluatorDescriptor, EvaluatorRegistry,
    ProfileMatch, ResolutionMetrics,
};
pub use handle::UnitMut;
pub use profile::{BezierProfile, ControlPointAnchor, Profile, ProfileKind};
pub use registry::NameRegistry;
pub use runner::TestRunner;
pub use scheduler::Scheduler;
pub use sequence::Clip;
pub use state::{FluxState, LifecycleEvent, LoopType};
pub use time::{FixedStep, ManualClock, TimeSource};
pub use unit::{Action, Listener, Liveness, UnitId};
pub use value::{Animatable, Value, ValueKind};

/// Fluxion result type
pub type Result<T> = core::result::Result<T, FluxError>;
