//! Ordered rule lists keyed by tick phase and by event.

use super::rule::Rule;
use crate::core::{Phase, Tag};
use crate::machine::StateMachine;
use std::collections::HashMap;

/// The transition rules of one state node.
///
/// Rules are kept in registration order; evaluation stops at the first rule
/// that yields a target.
pub struct TransitionTable<S: Tag, E: Tag, D: 'static = ()> {
    phases: [Vec<Rule<S, E, D>>; 3],
    events: HashMap<E, Vec<Rule<S, E, D>>>,
}

impl<S: Tag, E: Tag, D: 'static> TransitionTable<S, E, D> {
    pub fn new() -> Self {
        Self {
            phases: [Vec::new(), Vec::new(), Vec::new()],
            events: HashMap::new(),
        }
    }

    /// Append a rule evaluated while ticking `phase`.
    pub fn add(&mut self, phase: Phase, rule: Rule<S, E, D>) {
        self.phases[phase.index()].push(rule);
    }

    /// Append a rule evaluated when `event` is triggered.
    pub fn add_event(&mut self, event: E, rule: Rule<S, E, D>) {
        self.events.entry(event).or_default().push(rule);
    }

    /// First target produced by the rules of `phase`, if any.
    pub fn check(&self, phase: Phase, fsm: &StateMachine<S, E>, data: &D) -> Option<S> {
        first_match(&self.phases[phase.index()], fsm, data)
    }

    /// First target produced by the rules bound to `event`, if any.
    pub fn check_event(&self, event: E, fsm: &StateMachine<S, E>, data: &D) -> Option<S> {
        self.events
            .get(&event)
            .and_then(|rules| first_match(rules, fsm, data))
    }

    /// Whether any phase has at least one rule. Event rules do not count:
    /// events are triggered externally and never need polling.
    pub fn has_phase_rules(&self) -> bool {
        self.phases.iter().any(|rules| !rules.is_empty())
    }

    pub fn event_rules(&self, event: E) -> &[Rule<S, E, D>] {
        self.events.get(&event).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl<S: Tag, E: Tag, D: 'static> Default for TransitionTable<S, E, D> {
    fn default() -> Self {
        Self::new()
    }
}

fn first_match<S: Tag, E: Tag, D>(
    rules: &[Rule<S, E, D>],
    fsm: &StateMachine<S, E>,
    data: &D,
) -> Option<S> {
    rules.iter().find_map(|rule| rule.evaluate(fsm, data))
}
