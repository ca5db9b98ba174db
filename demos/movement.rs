//! Character Movement State Machine
//!
//! This example drives a small character controller for a few simulated
//! frames.
//!
//! Key concepts:
//! - Phase rules with time-in-state conditions
//! - A stateful node counting its own frames
//! - An any-state overlay reacting to a knockdown event
//! - A manual clock advanced once per frame
//!
//! Run with: cargo run --example movement

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;
use tickstate::prelude::*;

tag_enum! {
    enum Movement {
        Normal,
        Dodging,
        Disabled,
    }
}

tag_enum! {
    enum Input {
        DodgePressed,
        Knockdown,
    }
}

const FRAME: Duration = Duration::from_millis(100);
const DODGE_FRAMES: u32 = 3;
const RECOVERY: Duration = Duration::from_millis(500);

fn main() -> Result<(), FsmError> {
    println!("=== Character Movement State Machine ===\n");

    let scheduler = Scheduler::new(SchedulerConfig::default());
    let clock = Rc::new(ManualClock::new());
    let mut builder =
        StateMachineBuilder::<Movement, Input>::with_registry(scheduler.clone()).clock(clock.clone());

    builder
        .any_state()
        .on_enter(|fsm| println!("  -> entered {}", fsm.current_state().name()))
        .event_transition(Input::Knockdown, Rule::to(Movement::Disabled));

    builder
        .state(Movement::Normal)
        .event_transition(Input::DodgePressed, Rule::to(Movement::Dodging));

    builder
        .stateful(Movement::Dodging, 0u32)
        .on_update_with(|_, frames| frames.update(|n| *n += 1))
        .on_exit_with(|_, frames| println!("  dodge lasted {} frames", frames.get()))
        .transition(
            Phase::Update,
            Rule::when_data(|_, frames: &u32| *frames >= DODGE_FRAMES, Movement::Normal),
        );

    let stand_ups = Rc::new(Cell::new(0));
    let counter = Rc::clone(&stand_ups);
    builder
        .state(Movement::Disabled)
        .on_exit(move |_| counter.set(counter.get() + 1))
        .transition(
            Phase::LateUpdate,
            Rule::when(|fsm| fsm.time_in_state() >= RECOVERY, Movement::Normal),
        );

    let character = builder.initialize(Movement::Normal)?;
    let _guard = CloseOnDrop::new(character.clone());

    let inputs = [
        (1, Input::DodgePressed),
        (6, Input::Knockdown),
        (8, Input::DodgePressed),
    ];

    for frame in 0..14 {
        clock.advance(FRAME);
        for (_, input) in inputs.iter().filter(|(at, _)| *at == frame) {
            println!("frame {frame:>2}: {}", input.name());
            character.borrow_mut().trigger_event(*input)?;
        }
        scheduler.frame()?;
    }

    let character = character.borrow();
    println!("\nFinal state: {:?}", character.current_state());
    println!("Stood up {} time(s)", stand_ups.get());
    println!("Path: {:?}", character.history().get_path());

    Ok(())
}
