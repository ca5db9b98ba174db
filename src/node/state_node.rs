//! The state node: one state's callbacks, rules and optional data slot.

use super::data::DataSlot;
use super::Behaviour;
use crate::core::{Hook, Phase, Tag};
use crate::machine::StateMachine;
use crate::transition::{Rule, TransitionTable};
use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Callback bound to a lifecycle hook or an event.
pub type Callback<S, E, D> = Rc<dyn Fn(&mut StateMachine<S, E>, &DataSlot<D>)>;

/// Behaviour of a single state.
///
/// A node holds five lifecycle hooks, optional per-event callbacks, a
/// [`TransitionTable`] and a [`DataSlot`]. Stateless nodes use `D = ()`;
/// stateful nodes carry a payload that every `*_with` callback and every
/// data rule can see.
///
/// Configuration methods take `&self` and return `&Self` so they chain:
///
/// ```rust
/// use tickstate::prelude::*;
///
/// tag_enum! {
///     enum Light { Red, Green }
/// }
///
/// let mut builder = StateMachineBuilder::<Light>::with_registry(Scheduler::new_shared());
/// builder
///     .state(Light::Red)
///     .on_enter(|_| println!("stop"))
///     .transition(Phase::Update, Rule::when(|fsm| fsm.time_in_state().as_secs() >= 30, Light::Green));
/// ```
pub struct StateNode<S: Tag, E: Tag, D: 'static = ()> {
    hooks: RefCell<[Option<Callback<S, E, D>>; 5]>,
    events: RefCell<HashMap<E, Callback<S, E, D>>>,
    transitions: RefCell<TransitionTable<S, E, D>>,
    data: DataSlot<D>,
}

impl<S: Tag, E: Tag, D: Clone + 'static> StateNode<S, E, D> {
    /// Create a node whose data slot starts at `initial`.
    pub fn new(initial: D) -> Self {
        Self {
            hooks: RefCell::new([None, None, None, None, None]),
            events: RefCell::new(HashMap::new()),
            transitions: RefCell::new(TransitionTable::new()),
            data: DataSlot::new(initial),
        }
    }

    pub fn on_enter(&self, f: impl Fn(&mut StateMachine<S, E>) + 'static) -> &Self {
        self.set_hook(Hook::Enter, ignore_data(f))
    }

    pub fn on_exit(&self, f: impl Fn(&mut StateMachine<S, E>) + 'static) -> &Self {
        self.set_hook(Hook::Exit, ignore_data(f))
    }

    pub fn on_update(&self, f: impl Fn(&mut StateMachine<S, E>) + 'static) -> &Self {
        self.set_hook(Hook::Update, ignore_data(f))
    }

    pub fn on_fixed_update(&self, f: impl Fn(&mut StateMachine<S, E>) + 'static) -> &Self {
        self.set_hook(Hook::FixedUpdate, ignore_data(f))
    }

    pub fn on_late_update(&self, f: impl Fn(&mut StateMachine<S, E>) + 'static) -> &Self {
        self.set_hook(Hook::LateUpdate, ignore_data(f))
    }

    pub fn on_enter_with(
        &self,
        f: impl Fn(&mut StateMachine<S, E>, &DataSlot<D>) + 'static,
    ) -> &Self {
        self.set_hook(Hook::Enter, Rc::new(f))
    }

    /// Runs before the slot is reset, so it observes the last live value.
    pub fn on_exit_with(
        &self,
        f: impl Fn(&mut StateMachine<S, E>, &DataSlot<D>) + 'static,
    ) -> &Self {
        self.set_hook(Hook::Exit, Rc::new(f))
    }

    pub fn on_update_with(
        &self,
        f: impl Fn(&mut StateMachine<S, E>, &DataSlot<D>) + 'static,
    ) -> &Self {
        self.set_hook(Hook::Update, Rc::new(f))
    }

    pub fn on_fixed_update_with(
        &self,
        f: impl Fn(&mut StateMachine<S, E>, &DataSlot<D>) + 'static,
    ) -> &Self {
        self.set_hook(Hook::FixedUpdate, Rc::new(f))
    }

    pub fn on_late_update_with(
        &self,
        f: impl Fn(&mut StateMachine<S, E>, &DataSlot<D>) + 'static,
    ) -> &Self {
        self.set_hook(Hook::LateUpdate, Rc::new(f))
    }

    /// Bind (or replace) the callback of `hook`.
    pub fn set_hook(&self, hook: Hook, callback: Callback<S, E, D>) -> &Self {
        self.hooks.borrow_mut()[hook.index()] = Some(callback);
        self
    }

    pub fn clear_hook(&self, hook: Hook) -> &Self {
        self.hooks.borrow_mut()[hook.index()] = None;
        self
    }

    /// Callback run whenever `event` is triggered while this node is active.
    pub fn on_event(&self, event: E, f: impl Fn(&mut StateMachine<S, E>) + 'static) -> &Self {
        self.events.borrow_mut().insert(event, ignore_data(f));
        self
    }

    pub fn on_event_with(
        &self,
        event: E,
        f: impl Fn(&mut StateMachine<S, E>, &DataSlot<D>) + 'static,
    ) -> &Self {
        self.events.borrow_mut().insert(event, Rc::new(f));
        self
    }

    /// Append a rule evaluated at the end of every `phase` tick.
    pub fn transition(&self, phase: Phase, rule: Rule<S, E, D>) -> &Self {
        self.transitions.borrow_mut().add(phase, rule);
        self
    }

    /// Append a rule evaluated when `event` is triggered.
    pub fn event_transition(&self, event: E, rule: Rule<S, E, D>) -> &Self {
        self.transitions.borrow_mut().add_event(event, rule);
        self
    }

    pub fn data(&self) -> &DataSlot<D> {
        &self.data
    }

    pub fn has_hook(&self, hook: Hook) -> bool {
        self.hooks.borrow()[hook.index()].is_some()
    }

    fn hook(&self, hook: Hook) -> Option<Callback<S, E, D>> {
        self.hooks.borrow()[hook.index()].clone()
    }
}

impl<S: Tag, E: Tag> Default for StateNode<S, E, ()> {
    fn default() -> Self {
        Self::new(())
    }
}

impl<S: Tag, E: Tag, D: Clone + 'static> Behaviour<S, E> for StateNode<S, E, D> {
    fn reset(&self) {
        self.data.reset();
    }

    fn run_hook(&self, hook: Hook, fsm: &mut StateMachine<S, E>) {
        // Cloned out so the callback may reconfigure this node.
        if let Some(callback) = self.hook(hook) {
            callback(fsm, &self.data);
        }
        if hook == Hook::Exit {
            self.data.reset();
        }
    }

    fn check_transitions(&self, phase: Phase, fsm: &StateMachine<S, E>) -> Option<S> {
        let data = self.data.borrow();
        self.transitions.borrow().check(phase, fsm, &data)
    }

    fn trigger_event(&self, event: E, fsm: &mut StateMachine<S, E>) -> Option<S> {
        let callback = self.events.borrow().get(&event).cloned();
        if let Some(callback) = callback {
            callback(fsm, &self.data);
        }
        let data = self.data.borrow();
        self.transitions.borrow().check_event(event, fsm, &data)
    }

    fn has_update_functions(&self) -> bool {
        let hooks = self.hooks.borrow();
        [Hook::Update, Hook::FixedUpdate, Hook::LateUpdate]
            .iter()
            .any(|hook| hooks[hook.index()].is_some())
            || self.transitions.borrow().has_phase_rules()
    }

    fn as_any(self: Rc<Self>) -> Rc<dyn Any> {
        self
    }
}

fn ignore_data<S: Tag, E: Tag, D: 'static>(
    f: impl Fn(&mut StateMachine<S, E>) + 'static,
) -> Callback<S, E, D> {
    Rc::new(move |fsm: &mut StateMachine<S, E>, _: &DataSlot<D>| f(fsm))
}
