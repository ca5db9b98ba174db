//! Property-based tests for the state machine runtime.
//!
//! These tests use proptest to verify properties hold across
//! many randomly generated inputs.

use proptest::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;
use tickstate::core::{ManualClock, NoEvent, Phase, StateHistory, Tag};
use tickstate::transition::{Rule, TransitionTable};
use tickstate::{tag_enum, MachineConfig, Scheduler, SharedMachine, StateMachineBuilder};

tag_enum! {
    enum TestState {
        Initial,
        Processing,
        Complete,
        Failed,
    }
}

const ALL_STATES: [TestState; 4] = [
    TestState::Initial,
    TestState::Processing,
    TestState::Complete,
    TestState::Failed,
];

prop_compose! {
    fn arbitrary_state()(variant in 0..4usize) -> TestState {
        ALL_STATES[variant]
    }
}

fn arbitrary_phase() -> impl Strategy<Value = Phase> {
    prop_oneof![
        Just(Phase::Update),
        Just(Phase::FixedUpdate),
        Just(Phase::LateUpdate),
    ]
}

fn machine_with_history(capacity: usize) -> SharedMachine<TestState> {
    StateMachineBuilder::with_registry(Scheduler::new_shared())
        .config(MachineConfig {
            history_capacity: capacity,
            ..MachineConfig::default()
        })
        .initialize(TestState::Initial)
        .unwrap()
}

proptest! {
    #[test]
    fn first_matching_rule_wins(outcomes in prop::collection::vec(prop::option::of(arbitrary_state()), 0..8)) {
        let fsm = machine_with_history(0);
        let fsm = fsm.borrow();

        let mut table: TransitionTable<TestState, NoEvent> = TransitionTable::new();
        for outcome in &outcomes {
            let outcome = *outcome;
            table.add(Phase::Update, Rule::from_fn(move |_| outcome));
        }

        let expected = outcomes.iter().find_map(|outcome| *outcome);
        prop_assert_eq!(table.check(Phase::Update, &fsm, &()), expected);
    }

    #[test]
    fn history_preserves_order(targets in prop::collection::vec(arbitrary_state(), 1..10)) {
        let fsm = machine_with_history(16);
        for target in &targets {
            fsm.borrow_mut().set_state(*target).unwrap();
        }

        let mut expected_path = vec![TestState::Initial];
        expected_path.extend(targets.iter().copied());
        prop_assert_eq!(fsm.borrow().history().get_path(), expected_path);
        prop_assert_eq!(fsm.borrow().current_state(), *targets.last().unwrap());
    }

    #[test]
    fn history_keeps_most_recent_transitions(
        capacity in 1..6usize,
        targets in prop::collection::vec(arbitrary_state(), 0..12)
    ) {
        let fsm = machine_with_history(capacity);
        for target in &targets {
            fsm.borrow_mut().set_state(*target).unwrap();
        }

        let fsm = fsm.borrow();
        let kept: Vec<_> = fsm.history().transitions().map(|t| t.to).collect();
        let skip = targets.len().saturating_sub(capacity);
        prop_assert_eq!(kept, targets[skip..].to_vec());
    }

    #[test]
    fn data_is_reset_after_every_exit(
        initial in any::<i32>(),
        updates in prop::collection::vec(any::<i16>(), 0..10)
    ) {
        let mut builder: StateMachineBuilder<TestState> =
            StateMachineBuilder::with_registry(Scheduler::new_shared());
        let node = builder.stateful(TestState::Processing, initial);
        let fsm = builder.initialize(TestState::Processing).unwrap();

        for delta in &updates {
            let delta = i32::from(*delta);
            node.data().update(|value| *value = value.wrapping_add(delta));
        }
        fsm.borrow_mut().set_state(TestState::Complete).unwrap();

        prop_assert_eq!(node.data().get(), initial);
    }

    #[test]
    fn time_in_state_resets_on_every_transition(
        steps in prop::collection::vec((0..1_000u64, arbitrary_state()), 1..8)
    ) {
        let clock = Rc::new(ManualClock::new());
        let fsm: SharedMachine<TestState> = StateMachineBuilder::with_registry(Scheduler::new_shared())
            .clock(clock.clone())
            .initialize(TestState::Initial)
            .unwrap();

        for (millis, target) in steps {
            clock.advance(Duration::from_millis(millis));
            prop_assert_eq!(fsm.borrow().time_in_state(), Duration::from_millis(millis));

            fsm.borrow_mut().set_state(target).unwrap();
            prop_assert_eq!(fsm.borrow().time_in_state(), Duration::ZERO);
            let last = fsm.borrow().history().last().map(|t| t.time_in_previous);
            prop_assert_eq!(last, Some(Duration::from_millis(millis)));
        }
    }

    #[test]
    fn overlay_runs_once_before_current_every_tick(phases in prop::collection::vec(arbitrary_phase(), 0..12)) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut builder: StateMachineBuilder<TestState> =
            StateMachineBuilder::with_registry(Scheduler::new_shared());

        let overlay = Rc::clone(&log);
        let current = Rc::clone(&log);
        builder.any_state()
            .on_update(move |_| overlay.borrow_mut().push("any"))
            .on_fixed_update({
                let log = Rc::clone(&log);
                move |_| log.borrow_mut().push("any")
            })
            .on_late_update({
                let log = Rc::clone(&log);
                move |_| log.borrow_mut().push("any")
            });
        builder.state(TestState::Initial)
            .on_update(move |_| current.borrow_mut().push("current"))
            .on_fixed_update({
                let log = Rc::clone(&log);
                move |_| log.borrow_mut().push("current")
            })
            .on_late_update({
                let log = Rc::clone(&log);
                move |_| log.borrow_mut().push("current")
            });

        let fsm = builder.initialize(TestState::Initial).unwrap();
        for phase in &phases {
            fsm.borrow_mut().tick(*phase).unwrap();
        }

        let expected: Vec<_> = phases.iter().flat_map(|_| ["any", "current"]).collect();
        prop_assert_eq!(log.borrow().clone(), expected);
    }

    #[test]
    fn tag_name_is_stable(state in arbitrary_state()) {
        prop_assert_eq!(state.name().to_string(), format!("{state:?}"));
    }

    #[test]
    fn history_roundtrip_serialization(targets in prop::collection::vec(arbitrary_state(), 0..5)) {
        let fsm = machine_with_history(8);
        for target in &targets {
            fsm.borrow_mut().set_state(*target).unwrap();
        }

        let fsm = fsm.borrow();
        let json = serde_json::to_string(fsm.history()).unwrap();
        let deserialized: StateHistory<TestState, NoEvent> = serde_json::from_str(&json).unwrap();

        prop_assert_eq!(deserialized.get_path(), fsm.history().get_path());
        prop_assert_eq!(deserialized.len(), targets.len());
    }
}
