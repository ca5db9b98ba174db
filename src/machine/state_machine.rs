//! The running state machine.

use super::nodes::NodeSet;
use crate::config::MachineConfig;
use crate::core::{Clock, Hook, NoEvent, Phase, StateHistory, StateTransition, Tag, TransitionCause};
use crate::error::FsmError;
use crate::node::StateNode;
use crate::scheduler::{MachineId, Registry, Tickable};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

/// Shared handle to an initialized machine.
///
/// The scheduler only ever holds a weak reference, so dropping every
/// `SharedMachine` for a machine is equivalent to deregistering it.
pub type SharedMachine<S, E = NoEvent> = Rc<RefCell<StateMachine<S, E>>>;

/// Whether a machine still accepts work.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum Lifecycle {
    Active,
    Closed,
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lifecycle::Active => f.write_str("active"),
            Lifecycle::Closed => f.write_str("closed"),
        }
    }
}

/// A tick-driven finite state machine.
///
/// Machines are created by
/// [`StateMachineBuilder::initialize`](crate::builder::StateMachineBuilder::initialize)
/// and are `Active` until [`close`](StateMachine::close) is called. Every
/// callback and rule receives the machine itself, so callbacks may query it,
/// configure nodes and request transitions while they run.
///
/// # Dispatch order
///
/// - **enter / exit / tick**: the any-state overlay runs first, then the
///   current state's node
/// - **phase rules**: the current node's rules are checked before the
///   overlay's; the first target found is taken
/// - **events**: both nodes' event callbacks always run (overlay first); a
///   target from the current node is preferred over one from the overlay
pub struct StateMachine<S: Tag, E: Tag = NoEvent> {
    nodes: NodeSet<S, E>,
    current: S,
    previous: Option<S>,
    next: Option<S>,
    entered_at: Duration,
    clock: Rc<dyn Clock>,
    registry: Rc<dyn Registry>,
    registration: Option<MachineId>,
    has_schedulable_work: bool,
    lifecycle: Lifecycle,
    transition_depth: usize,
    call_depth: usize,
    fault: Option<FsmError>,
    config: MachineConfig,
    history: StateHistory<S, E>,
}

impl<S: Tag, E: Tag> StateMachine<S, E> {
    pub(crate) fn new(
        nodes: NodeSet<S, E>,
        initial: S,
        clock: Rc<dyn Clock>,
        registry: Rc<dyn Registry>,
        config: MachineConfig,
    ) -> Self {
        let has_schedulable_work = nodes.has_update_functions();
        let entered_at = clock.now();
        Self {
            nodes,
            current: initial,
            previous: None,
            next: None,
            entered_at,
            clock,
            registry,
            registration: None,
            has_schedulable_work,
            lifecycle: Lifecycle::Active,
            transition_depth: 0,
            call_depth: 0,
            fault: None,
            history: StateHistory::with_capacity(config.history_capacity),
            config,
        }
    }

    pub(crate) fn registry(&self) -> Rc<dyn Registry> {
        Rc::clone(&self.registry)
    }

    pub(crate) fn set_registration(&mut self, id: MachineId) {
        self.registration = Some(id);
    }

    /// Run the initial enter sequence.
    pub(crate) fn start(&mut self) -> Result<(), FsmError> {
        self.dispatch("initialize", |fsm| {
            tracing::debug!(
                state = fsm.current.name(),
                scheduled = fsm.has_schedulable_work,
                "state machine initialized"
            );
            fsm.run_hook(Hook::Enter);
            Ok(())
        })
    }

    /// Run one phase: tick callbacks, then the phase's transition rules.
    ///
    /// At most one rule-driven transition happens per call.
    pub fn tick(&mut self, phase: Phase) -> Result<(), FsmError> {
        self.dispatch("tick", |fsm| {
            tracing::trace!(phase = %phase, state = fsm.current.name(), "tick");
            fsm.run_hook(Hook::from(phase));
            if !fsm.is_active() {
                return Ok(());
            }

            match fsm.resolve_phase(phase) {
                Some(target) => fsm.transition(target, TransitionCause::Phase(phase)),
                None => Ok(()),
            }
        })
    }

    /// Transition to `target` now.
    ///
    /// Exit runs on the outgoing state (with [`next_state`](Self::next_state)
    /// set), then enter on `target` (with
    /// [`previous_state`](Self::previous_state) set). Transitioning to the
    /// current state performs the full exit/enter cycle.
    pub fn set_state(&mut self, target: S) -> Result<(), FsmError> {
        self.dispatch("set_state", |fsm| fsm.transition(target, TransitionCause::Direct))
    }

    /// Deliver a discrete event.
    pub fn trigger_event(&mut self, event: E) -> Result<(), FsmError> {
        self.dispatch("trigger_event", |fsm| {
            tracing::trace!(event = event.name(), state = fsm.current.name(), "event");
            let overlay_target = match fsm.nodes.overlay() {
                Some(node) => node.trigger_event(event, fsm),
                None => None,
            };
            if !fsm.is_active() {
                return Ok(());
            }

            let current_target = match fsm.nodes.get(fsm.current) {
                Some(node) => node.trigger_event(event, fsm),
                None => None,
            };
            if !fsm.is_active() {
                return Ok(());
            }

            match current_target.or(overlay_target) {
                Some(target) => fsm.transition(target, TransitionCause::Event(event)),
                None => Ok(()),
            }
        })
    }

    /// Run exit on the current state and detach from the scheduler.
    ///
    /// The machine is marked closed before exit runs, so exit callbacks
    /// cannot start new transitions. Closing from inside an exit callback
    /// lets the exit sequence already in progress finish instead of running
    /// exit again, and the interrupted transition is abandoned.
    pub fn close(&mut self) -> Result<(), FsmError> {
        self.ensure_active("close")?;
        self.lifecycle = Lifecycle::Closed;
        if self.next.is_none() {
            self.run_hook(Hook::Exit);
        }
        self.previous = None;
        self.next = None;

        if let Some(id) = self.registration.take() {
            self.registry.deregister(id);
        }
        tracing::debug!(state = self.current.name(), "state machine closed");
        Ok(())
    }

    pub fn current_state(&self) -> S {
        self.current
    }

    /// State left by the most recent transition.
    pub fn previous_state(&self) -> Option<S> {
        self.previous
    }

    /// Target of the transition in progress. Only set while exit runs.
    pub fn next_state(&self) -> Option<S> {
        self.next
    }

    /// Time since the current state was entered, measured by the machine's
    /// clock.
    pub fn time_in_state(&self) -> Duration {
        self.clock.now().saturating_sub(self.entered_at)
    }

    pub fn history(&self) -> &StateHistory<S, E> {
        &self.history
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn is_active(&self) -> bool {
        self.lifecycle == Lifecycle::Active
    }

    /// Whether the machine was registered with its scheduler at initialize.
    pub fn has_schedulable_work(&self) -> bool {
        self.has_schedulable_work
    }

    pub fn registration(&self) -> Option<MachineId> {
        self.registration
    }

    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    pub fn nodes(&self) -> &NodeSet<S, E> {
        &self.nodes
    }

    /// See [`NodeSet::state`].
    pub fn state(&mut self, tag: S) -> Rc<StateNode<S, E>> {
        self.nodes.state(tag)
    }

    /// See [`NodeSet::stateful`].
    pub fn stateful<D: Clone + 'static>(&mut self, tag: S, initial: D) -> Rc<StateNode<S, E, D>> {
        self.nodes.stateful(tag, initial)
    }

    /// See [`NodeSet::node`].
    pub fn node<D: Clone + 'static>(&self, tag: S) -> Option<Rc<StateNode<S, E, D>>> {
        self.nodes.node(tag)
    }

    /// See [`NodeSet::any_state`].
    pub fn any_state(&mut self) -> Rc<StateNode<S, E>> {
        self.nodes.any_state()
    }

    /// See [`NodeSet::any_state_stateful`].
    pub fn any_state_stateful<D: Clone + 'static>(&mut self, initial: D) -> Rc<StateNode<S, E, D>> {
        self.nodes.any_state_stateful(initial)
    }

    fn ensure_active(&self, operation: &'static str) -> Result<(), FsmError> {
        match self.lifecycle {
            Lifecycle::Active => Ok(()),
            lifecycle => Err(FsmError::NotActive {
                operation,
                lifecycle,
            }),
        }
    }

    /// Wrap a public entry point. A fault recorded by any nested call is
    /// reported by the outermost one.
    fn dispatch(
        &mut self,
        operation: &'static str,
        f: impl FnOnce(&mut Self) -> Result<(), FsmError>,
    ) -> Result<(), FsmError> {
        self.ensure_active(operation)?;
        self.call_depth += 1;
        let result = f(self);
        self.call_depth -= 1;

        match self.fault.take() {
            Some(fault) if self.call_depth == 0 => Err(fault),
            fault => {
                self.fault = fault;
                result
            }
        }
    }

    fn transition(&mut self, target: S, cause: TransitionCause<E>) -> Result<(), FsmError> {
        if let Some(max) = self.config.max_transition_depth {
            if self.transition_depth >= max {
                let err = FsmError::TransitionDepthExceeded {
                    target: target.name().to_string(),
                    depth: max,
                };
                tracing::error!(
                    from = self.current.name(),
                    to = target.name(),
                    depth = max,
                    "transition depth limit exceeded"
                );
                self.fault.get_or_insert_with(|| err.clone());
                return Err(err);
            }
        }

        self.transition_depth += 1;
        self.next = Some(target);
        self.run_hook(Hook::Exit);
        self.next = None;
        if !self.is_active() {
            tracing::debug!(
                from = self.current.name(),
                to = target.name(),
                "machine closed during exit, transition abandoned"
            );
            self.transition_depth -= 1;
            return Ok(());
        }

        let from = self.current;
        let time_in_previous = self.time_in_state();
        self.previous = Some(from);
        self.current = target;
        self.entered_at = self.clock.now();
        self.history.record(StateTransition {
            from,
            to: target,
            cause,
            timestamp: Utc::now(),
            time_in_previous,
        });
        tracing::debug!(from = from.name(), to = target.name(), ?cause, "state transition");

        self.run_hook(Hook::Enter);
        self.transition_depth -= 1;
        Ok(())
    }

    fn run_hook(&mut self, hook: Hook) {
        if let Some(node) = self.nodes.overlay() {
            node.run_hook(hook, self);
        }
        // The overlay may have closed the machine. Exit keeps going so the
        // sequence completes exactly once.
        if hook != Hook::Exit && !self.is_active() {
            return;
        }
        if let Some(node) = self.nodes.get(self.current) {
            node.run_hook(hook, self);
        }
    }

    fn resolve_phase(&self, phase: Phase) -> Option<S> {
        let current = self
            .nodes
            .get(self.current)
            .and_then(|node| node.check_transitions(phase, self));
        current.or_else(|| {
            self.nodes
                .overlay()
                .and_then(|node| node.check_transitions(phase, self))
        })
    }
}

impl<S: Tag, E: Tag> Tickable for StateMachine<S, E> {
    fn tick(&mut self, phase: Phase) -> Result<(), FsmError> {
        StateMachine::tick(self, phase)
    }

    fn is_active(&self) -> bool {
        StateMachine::is_active(self)
    }

    fn close(&mut self) -> Result<(), FsmError> {
        StateMachine::close(self)
    }
}

impl<S: Tag, E: Tag> fmt::Debug for StateMachine<S, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateMachine")
            .field("current", &self.current)
            .field("previous", &self.previous)
            .field("next", &self.next)
            .field("lifecycle", &self.lifecycle)
            .field("registration", &self.registration)
            .field("nodes", &self.nodes)
            .finish_non_exhaustive()
    }
}
