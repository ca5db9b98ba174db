//! Transition rules: predicates that may name a target state.
//!
//! Every way of writing a rule (an unconditional target, a boolean condition
//! plus target, or a full function) normalizes to one shape: a function from
//! the machine and the node's data to an optional target state.

use crate::core::Tag;
use crate::machine::StateMachine;
use std::fmt;
use std::rc::Rc;

type RuleFn<S, E, D> = dyn Fn(&StateMachine<S, E>, &D) -> Option<S>;

/// A single transition rule.
///
/// Rules are evaluated read-only: they see the machine and the node's data
/// but cannot change either. Returning `None` means "no transition from this
/// rule"; evaluation then moves on to the next rule in the list.
///
/// # Example
///
/// ```rust
/// use tickstate::transition::Rule;
/// use tickstate::core::NoEvent;
/// use tickstate::tag_enum;
///
/// tag_enum! {
///     enum Mode { Idle, Busy }
/// }
///
/// let always: Rule<Mode, NoEvent> = Rule::to(Mode::Busy);
/// let when_long: Rule<Mode, NoEvent> = Rule::when(|fsm| fsm.time_in_state().as_secs() > 5, Mode::Idle);
/// let custom: Rule<Mode, NoEvent> = Rule::from_fn(|fsm| match fsm.current_state() {
///     Mode::Idle => Some(Mode::Busy),
///     Mode::Busy => None,
/// });
/// # let _ = (always, when_long, custom);
/// ```
pub struct Rule<S: Tag, E: Tag, D: 'static = ()> {
    predicate: Rc<RuleFn<S, E, D>>,
}

impl<S: Tag, E: Tag, D: 'static> Rule<S, E, D> {
    /// Rule that always yields `target`.
    pub fn to(target: S) -> Self {
        Self::from_data_fn(move |_, _| Some(target))
    }

    /// Rule that yields `target` iff `condition` holds.
    pub fn when<F>(condition: F, target: S) -> Self
    where
        F: Fn(&StateMachine<S, E>) -> bool + 'static,
    {
        Self::from_data_fn(move |fsm, _| condition(fsm).then_some(target))
    }

    /// Rule computed by an arbitrary function of the machine.
    pub fn from_fn<F>(rule: F) -> Self
    where
        F: Fn(&StateMachine<S, E>) -> Option<S> + 'static,
    {
        Self::from_data_fn(move |fsm, _| rule(fsm))
    }

    /// Rule that yields `target` iff `condition` holds for the node's data.
    pub fn when_data<F>(condition: F, target: S) -> Self
    where
        F: Fn(&StateMachine<S, E>, &D) -> bool + 'static,
    {
        Self::from_data_fn(move |fsm, data| condition(fsm, data).then_some(target))
    }

    /// Rule computed by an arbitrary function of the machine and node data.
    pub fn from_data_fn<F>(rule: F) -> Self
    where
        F: Fn(&StateMachine<S, E>, &D) -> Option<S> + 'static,
    {
        Self {
            predicate: Rc::new(rule),
        }
    }

    /// Evaluate the rule.
    pub fn evaluate(&self, fsm: &StateMachine<S, E>, data: &D) -> Option<S> {
        (self.predicate)(fsm, data)
    }
}

impl<S: Tag, E: Tag> Rule<S, E, ()> {
    /// Reuse a data-less rule on a stateful node by ignoring the data.
    pub fn lift<D: 'static>(self) -> Rule<S, E, D> {
        let inner = self.predicate;
        Rule::from_data_fn(move |fsm, _| inner(fsm, &()))
    }
}

impl<S: Tag, E: Tag, D: 'static> Clone for Rule<S, E, D> {
    fn clone(&self) -> Self {
        Self {
            predicate: Rc::clone(&self.predicate),
        }
    }
}

impl<S: Tag, E: Tag, D: 'static> fmt::Debug for Rule<S, E, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Rule(..)")
    }
}
