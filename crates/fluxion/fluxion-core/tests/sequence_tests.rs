//! Integration tests for sequences and clips

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use approx::assert_abs_diff_eq;
use fluxion_core::{Engine, FluxError, FluxState, LifecycleEvent, TestRunner, UnitId};

/// Sequence of single-interval clips with the given durations.
fn chain(engine: &mut Engine, durations: &[f32]) -> (UnitId, Vec<UnitId>) {
    let seq = engine.create_sequence();
    let children = durations
        .iter()
        .map(|d| {
            let id = engine.create_interval(*d);
            engine.add_as_new_clip(seq, id).unwrap();
            id
        })
        .collect();
    (seq, children)
}

#[test]
fn carry_over_into_second_clip() {
    let mut engine = Engine::default();
    let (seq, children) = chain(&mut engine, &[0.3, 0.3]);

    engine.advance(0.35);
    assert_eq!(engine.state(children[0]), Some(FluxState::Killed));
    assert_eq!(engine.state(children[1]), Some(FluxState::Playing));
    assert_abs_diff_eq!(engine.elapsed(children[1]).unwrap(), 0.05, epsilon = 1e-5);
    assert_eq!(engine.state(seq), Some(FluxState::Playing));
}

#[test]
fn one_tick_may_cross_several_clips() {
    let mut engine = Engine::default();
    let (seq, children) = chain(&mut engine, &[0.1, 0.1, 0.1, 0.5]);

    engine.advance(0.35);
    for child in &children[..3] {
        assert_eq!(engine.state(*child), Some(FluxState::Killed));
    }
    assert_eq!(engine.current_clip(seq), Some(3));
    assert_abs_diff_eq!(engine.elapsed(children[3]).unwrap(), 0.05, epsilon = 1e-5);
}

#[test]
fn final_duration_is_sum_of_clip_maxima() {
    let mut engine = Engine::default();
    let seq = engine.create_sequence();
    let layout: [&[f32]; 3] = [&[0.2, 0.5], &[0.25], &[0.1, 0.05, 0.3]];
    for clip in layout {
        for (i, d) in clip.iter().enumerate() {
            let id = engine.create_interval(*d);
            if i == 0 {
                engine.add_as_new_clip(seq, id).unwrap();
            } else {
                engine.add_to_last_clip(seq, id).unwrap();
            }
        }
    }

    assert_eq!(engine.duration(seq), None);
    TestRunner::new(0.05, 5.0)
        .run_to_completion(&mut engine, seq)
        .unwrap();
    assert_eq!(engine.state(seq), Some(FluxState::Completed));
    let expected = 0.5 + 0.25 + 0.3;
    assert_abs_diff_eq!(engine.duration(seq).unwrap(), expected, epsilon = 1e-6);
    let by_clip: f32 = (0..3).map(|i| engine.clip_duration(seq, i).unwrap()).sum();
    assert_abs_diff_eq!(engine.duration(seq).unwrap(), by_clip, epsilon = 1e-6);
}

#[test]
fn later_clip_waits_for_earlier_clip() {
    let mut engine = Engine::default();
    let seq = engine.create_sequence();
    let order = Rc::new(RefCell::new(Vec::new()));

    let slow = engine.create_interval(0.4);
    let fast = engine.create_interval(0.1);
    let next = engine.create_interval(0.1);
    for (id, label) in [(slow, "slow"), (fast, "fast"), (next, "next")] {
        let order = order.clone();
        engine
            .on(id, LifecycleEvent::Played, move |_, _| {
                order.borrow_mut().push(label)
            })
            .unwrap();
    }
    engine.add_as_new_clip(seq, slow).unwrap();
    engine.add_to_last_clip(seq, fast).unwrap();
    engine.add_as_new_clip(seq, next).unwrap();

    engine.advance(0.2);
    // `fast` is done but `slow` is not, so clip 1 has not started.
    assert_eq!(engine.state(fast), Some(FluxState::Killed));
    assert_eq!(engine.state(next), Some(FluxState::Idle));
    assert_eq!(engine.current_clip(seq), Some(0));

    engine.advance(0.25);
    assert_eq!(engine.state(slow), Some(FluxState::Killed));
    assert_eq!(engine.state(next), Some(FluxState::Playing));
    assert_eq!(*order.borrow(), vec!["slow", "fast", "next"]);
}

#[test]
fn killing_sequence_kills_every_child() {
    let mut engine = Engine::default();
    let (seq, children) = chain(&mut engine, &[0.2, 0.2, 0.2]);
    let extra = engine.create_interval(1.0);
    engine.add_to_last_clip(seq, extra).unwrap();

    engine.advance(0.3);
    engine.kill(seq).unwrap();
    for child in &children[1..] {
        assert!(engine.is_pending_kill(*child));
    }

    engine.advance(0.1);
    assert_eq!(engine.state(seq), Some(FluxState::Killed));
    for child in children.iter().chain([&extra]) {
        assert_eq!(engine.state(*child), Some(FluxState::Killed));
    }
}

#[test]
fn killing_a_child_lets_the_clip_finish() {
    let mut engine = Engine::default();
    let (seq, children) = chain(&mut engine, &[10.0, 0.2]);

    engine.advance(0.1);
    engine.kill(children[0]).unwrap();
    engine.advance(0.1);
    assert_eq!(engine.state(children[0]), Some(FluxState::Killed));
    assert_eq!(engine.current_clip(seq), Some(1));
}

#[test]
fn nested_sequences_propagate_time() {
    let mut engine = Engine::default();
    let (inner, inner_children) = chain(&mut engine, &[0.2, 0.2]);
    let outer = engine.create_sequence();
    let tail = engine.create_interval(0.5);
    engine.add_as_new_clip(outer, inner).unwrap();
    engine.add_as_new_clip(outer, tail).unwrap();
    assert!(!engine.is_attached(inner));

    engine.advance(0.3);
    assert_eq!(engine.state(inner_children[0]), Some(FluxState::Killed));
    assert_eq!(engine.state(inner_children[1]), Some(FluxState::Playing));

    engine.advance(0.2);
    assert_eq!(engine.state(inner), Some(FluxState::Killed));
    assert_eq!(engine.state(tail), Some(FluxState::Playing));
    assert_abs_diff_eq!(engine.elapsed(tail).unwrap(), 0.1, epsilon = 1e-5);
}

#[test]
fn grandchildren_inherit_pending_kill() {
    let mut engine = Engine::default();
    let (inner, inner_children) = chain(&mut engine, &[0.2, 0.2]);
    let outer = engine.create_sequence();
    engine.add_as_new_clip(outer, inner).unwrap();

    engine.advance(0.1);
    assert!(!engine.is_pending_kill(inner_children[0]));
    engine.kill(outer).unwrap();
    assert!(engine.is_pending_kill(inner_children[0]));
    assert!(engine.is_pending_kill(inner_children[1]));

    engine.advance(0.1);
    for id in [outer, inner, inner_children[0], inner_children[1]] {
        assert_eq!(engine.state(id), Some(FluxState::Killed));
    }
}

#[test]
fn child_start_failure_is_contained() {
    let mut engine = Engine::default();
    let seq = engine.create_sequence();
    let broken = engine.create(|| 0i32, |_| {}, 4, 0.2);
    engine
        .set_profile(broken, fluxion_core::Profile::bezier([0.0; 3]))
        .unwrap();
    let fine = engine.create_interval(0.2);
    engine.add_as_new_clip(seq, broken).unwrap();
    engine.add_to_last_clip(seq, fine).unwrap();

    engine.advance(0.1);
    assert_eq!(engine.state(broken), Some(FluxState::Killed));
    assert_eq!(engine.state(fine), Some(FluxState::Playing));
    assert_eq!(engine.state(seq), Some(FluxState::Playing));
}

#[test]
fn callbacks_run_in_clip_order() {
    let mut engine = Engine::default();
    let seq = engine.create_sequence();
    let log = Rc::new(RefCell::new(Vec::new()));
    for label in ["a", "b", "c"] {
        let log = log.clone();
        let cb = engine.create_callback(move |_| log.borrow_mut().push(label));
        engine.add_as_new_clip(seq, cb).unwrap();
        let gap = engine.create_interval(0.1);
        engine.add_as_new_clip(seq, gap).unwrap();
    }

    engine.advance(0.05);
    assert_eq!(*log.borrow(), vec!["a"]);
    engine.advance(0.1);
    assert_eq!(*log.borrow(), vec!["a", "b"]);
    engine.advance(0.2);
    assert_eq!(*log.borrow(), vec!["a", "b", "c"]);
}

#[test]
fn sequence_loop_rewinds_cursor_only() {
    let mut engine = Engine::default();
    let (seq, children) = chain(&mut engine, &[0.2]);
    engine.set_loops(seq, 2).unwrap();
    let passes = Rc::new(Cell::new(0));
    let counter = passes.clone();
    engine
        .on(seq, LifecycleEvent::Completed, move |_, _| {
            counter.set(counter.get() + 1)
        })
        .unwrap();

    engine.advance(0.3);
    assert_eq!(passes.get(), 1);
    assert_eq!(engine.loop_count(seq), Some(1));
    assert_eq!(engine.current_clip(seq), Some(0));

    // Retired children stay killed; the second pass finishes at once.
    engine.advance(0.1);
    assert_eq!(engine.state(children[0]), Some(FluxState::Killed));
    assert_eq!(passes.get(), 2);
    assert_eq!(engine.state(seq), Some(FluxState::Completed));
}

#[test]
fn empty_sequence_completes_immediately() {
    let mut engine = Engine::default();
    let seq = engine.create_sequence();
    engine.advance(0.1);
    assert_eq!(engine.state(seq), Some(FluxState::Completed));
    assert_eq!(engine.duration(seq), Some(0.0));
}

#[test]
fn disposal_releases_children() {
    let mut engine = Engine::default();
    let (seq, children) = chain(&mut engine, &[0.1, 0.1]);
    TestRunner::default()
        .run_to_completion(&mut engine, seq)
        .unwrap();
    engine.kill(seq).unwrap();
    engine.advance(0.0);
    assert_eq!(engine.state(seq), Some(FluxState::Killed));
    engine.advance(0.0);
    assert!(!engine.contains(seq));
    assert!(children.iter().all(|child| !engine.contains(*child)));
}

#[test]
fn runner_times_out_on_open_ended_sequence() {
    let mut engine = Engine::default();
    let (seq, _) = chain(&mut engine, &[0.5]);
    engine.set_infinite(seq, true).unwrap();
    let err = TestRunner::new(0.1, 1.0)
        .run_to_completion(&mut engine, seq)
        .unwrap_err();
    assert!(matches!(err, FluxError::Timeout { .. }));
}

#[test]
fn retired_child_cannot_be_disposed_alone() {
    let mut engine = Engine::default();
    let (seq, children) = chain(&mut engine, &[0.2, 0.3]);

    engine.advance(0.25);
    assert_eq!(engine.state(children[0]), Some(FluxState::Killed));
    assert!(matches!(
        engine.dispose(children[0]),
        Err(FluxError::OwnershipViolation { .. })
    ));
    assert!(engine.contains(children[0]));

    engine.advance(0.3);
    assert_eq!(engine.state(seq), Some(FluxState::Completed));
    assert_abs_diff_eq!(engine.clip_duration(seq, 0).unwrap(), 0.2, epsilon = 1e-6);
    assert_abs_diff_eq!(engine.duration(seq).unwrap(), 0.5, epsilon = 1e-6);
}

#[test]
fn killing_a_manually_driven_sequence_reaches_children() {
    let mut engine = Engine::default();
    let (seq, children) = chain(&mut engine, &[0.5, 0.5]);
    assert!(engine.detach(seq));

    engine.start(seq).unwrap();
    engine.update(seq, 0.2).unwrap();
    assert_eq!(engine.state(children[0]), Some(FluxState::Playing));
    assert_eq!(engine.state(children[1]), Some(FluxState::Idle));

    engine.kill(seq).unwrap();
    engine.update(seq, 0.1).unwrap();
    assert_eq!(engine.state(seq), Some(FluxState::Killed));
    for child in &children {
        assert_eq!(engine.state(*child), Some(FluxState::Killed));
    }
}

#[test]
fn test_runner_kill_reaches_nested_children() {
    let mut engine = Engine::default();
    let (inner, inner_children) = chain(&mut engine, &[0.4, 0.4]);
    let outer = engine.create_sequence();
    engine.add_as_new_clip(outer, inner).unwrap();
    assert!(engine.detach(outer));

    let runner = TestRunner::new(0.1, 5.0);
    runner.update_unit(&mut engine, outer, 0.1).unwrap();
    engine.kill(outer).unwrap();
    runner.update_unit(&mut engine, outer, 0.1).unwrap();
    for id in [outer, inner, inner_children[0], inner_children[1]] {
        assert_eq!(engine.state(id), Some(FluxState::Killed));
    }
}
