//! Builder for constructing state machines.

use crate::config::MachineConfig;
use crate::core::{Clock, NoEvent, SystemClock, Tag};
use crate::error::FsmError;
use crate::machine::{NodeSet, SharedMachine, StateMachine};
use crate::node::StateNode;
use crate::scheduler::{Registry, Scheduler, Tickable};
use std::cell::RefCell;
use std::rc::Rc;

/// A state machine that has not been initialized yet.
///
/// Nodes, the any-state overlay, the registry, the clock and the config are
/// attached here; [`initialize`](Self::initialize) consumes the builder and
/// returns the running machine, so a machine can only be initialized once.
///
/// # Example
///
/// ```rust
/// use tickstate::prelude::*;
///
/// tag_enum! {
///     enum Player { Idle, Running }
/// }
///
/// let mut builder = StateMachineBuilder::<Player>::new();
/// builder
///     .state(Player::Idle)
///     .transition(Phase::Update, Rule::to(Player::Running));
///
/// let player = builder.initialize(Player::Idle).unwrap();
/// player.borrow_mut().tick(Phase::Update).unwrap();
/// assert_eq!(player.borrow().current_state(), Player::Running);
/// ```
pub struct StateMachineBuilder<S: Tag, E: Tag = NoEvent> {
    nodes: NodeSet<S, E>,
    registry: Rc<dyn Registry>,
    clock: Rc<dyn Clock>,
    config: MachineConfig,
}

impl<S: Tag, E: Tag> StateMachineBuilder<S, E> {
    /// Create a builder that registers with this thread's
    /// [`Scheduler::global`] and measures time with a [`SystemClock`].
    pub fn new() -> Self {
        Self::with_registry(Scheduler::global())
    }

    /// Create a builder that registers with `registry`.
    pub fn with_registry(registry: Rc<dyn Registry>) -> Self {
        Self {
            nodes: NodeSet::new(),
            registry,
            clock: Rc::new(SystemClock::new()),
            config: MachineConfig::default(),
        }
    }

    /// Replace the clock used for time-in-state.
    pub fn clock(mut self, clock: Rc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(mut self, config: MachineConfig) -> Self {
        self.config = config;
        self
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

    pub fn nodes(&self) -> &NodeSet<S, E> {
        &self.nodes
    }

    /// Start the machine in `initial`.
    ///
    /// Resets every data slot, decides once and for all whether the machine
    /// needs ticking, registers it if so, then runs enter (any-state first).
    /// Returns an error if the config is invalid or if the enter callbacks
    /// tripped the transition depth guard.
    pub fn initialize(self, initial: S) -> Result<SharedMachine<S, E>, FsmError> {
        self.config.validate()?;
        self.nodes.reset_all();

        let registry = Rc::clone(&self.registry);
        let machine = StateMachine::new(self.nodes, initial, self.clock, self.registry, self.config);
        let shared = Rc::new(RefCell::new(machine));

        if shared.borrow().has_schedulable_work() {
            let tickable: Rc<RefCell<dyn Tickable>> = shared.clone();
            let id = registry.register(Rc::downgrade(&tickable));
            shared.borrow_mut().set_registration(id);
        }

        shared.borrow_mut().start()?;
        Ok(shared)
    }
}

impl<S: Tag, E: Tag> Default for StateMachineBuilder<S, E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigError;
    use crate::core::{ManualClock, Phase};
    use crate::scheduler::MachineId;
    use crate::tag_enum;
    use crate::transition::Rule;
    use std::cell::Cell;
    use std::rc::Weak;
    use std::time::Duration;

    tag_enum! {
        enum TestState {
            Initial,
            Processing,
            Complete,
        }
    }

    tag_enum! {
        enum TestEvent {
            Start,
        }
    }

    #[derive(Default)]
    struct SpyRegistry {
        registered: Cell<u32>,
        deregistered: RefCell<Vec<MachineId>>,
    }

    impl Registry for SpyRegistry {
        fn register(&self, _machine: Weak<RefCell<dyn Tickable>>) -> MachineId {
            let id = MachineId(u64::from(self.registered.get()));
            self.registered.set(self.registered.get() + 1);
            id
        }

        fn deregister(&self, id: MachineId) {
            self.deregistered.borrow_mut().push(id);
        }
    }

    #[test]
    fn machine_without_tick_work_is_never_registered() {
        let spy = Rc::new(SpyRegistry::default());
        let mut builder: StateMachineBuilder<TestState, TestEvent> =
            StateMachineBuilder::with_registry(spy.clone());
        builder
            .state(TestState::Initial)
            .on_enter(|_| {})
            .on_exit(|_| {})
            .on_event(TestEvent::Start, |_| {})
            .event_transition(TestEvent::Start, Rule::to(TestState::Processing));

        let fsm = builder.initialize(TestState::Initial).unwrap();
        fsm.borrow_mut().close().unwrap();

        assert_eq!(spy.registered.get(), 0);
        assert!(spy.deregistered.borrow().is_empty());
        assert_eq!(fsm.borrow().registration(), None);
    }

    #[test]
    fn machine_with_tick_work_registers_once_and_deregisters_on_close() {
        let spy = Rc::new(SpyRegistry::default());
        let mut builder: StateMachineBuilder<TestState> =
            StateMachineBuilder::with_registry(spy.clone());
        builder
            .state(TestState::Processing)
            .transition(Phase::FixedUpdate, Rule::to(TestState::Complete));

        let fsm = builder.initialize(TestState::Initial).unwrap();
        assert_eq!(spy.registered.get(), 1);
        assert!(fsm.borrow().has_schedulable_work());

        fsm.borrow_mut().close().unwrap();
        assert_eq!(*spy.deregistered.borrow(), vec![MachineId(0)]);
    }

    #[test]
    fn overlay_tick_callback_counts_as_work() {
        let spy = Rc::new(SpyRegistry::default());
        let mut builder: StateMachineBuilder<TestState> =
            StateMachineBuilder::with_registry(spy.clone());
        builder.any_state().on_late_update(|_| {});

        builder.initialize(TestState::Initial).unwrap();
        assert_eq!(spy.registered.get(), 1);
    }

    #[test]
    fn work_added_after_initialize_does_not_register() {
        let spy = Rc::new(SpyRegistry::default());
        let builder: StateMachineBuilder<TestState> = StateMachineBuilder::with_registry(spy.clone());
        let fsm = builder.initialize(TestState::Initial).unwrap();

        fsm.borrow_mut().state(TestState::Initial).on_update(|_| {});

        assert_eq!(spy.registered.get(), 0);
        assert!(!fsm.borrow().has_schedulable_work());
    }

    #[test]
    fn initialize_resets_stateful_data() {
        let mut builder: StateMachineBuilder<TestState> =
            StateMachineBuilder::with_registry(Scheduler::new_shared());
        let node = builder.stateful(TestState::Processing, 3u8);
        node.data().modify(9);

        builder.initialize(TestState::Initial).unwrap();
        assert_eq!(node.data().get(), 3);
    }

    #[test]
    fn initial_enter_sees_the_injected_clock() {
        let clock = Rc::new(ManualClock::new());
        clock.advance(Duration::from_secs(10));
        let mut builder: StateMachineBuilder<TestState> =
            StateMachineBuilder::with_registry(Scheduler::new_shared()).clock(clock.clone());
        let entered = Rc::new(Cell::new(None));
        let sink = Rc::clone(&entered);
        builder
            .state(TestState::Initial)
            .on_enter(move |fsm| sink.set(Some(fsm.time_in_state())));

        let fsm = builder.initialize(TestState::Initial).unwrap();
        clock.advance(Duration::from_secs(2));

        assert_eq!(entered.get(), Some(Duration::ZERO));
        assert_eq!(fsm.borrow().time_in_state(), Duration::from_secs(2));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let builder: StateMachineBuilder<TestState> =
            StateMachineBuilder::with_registry(Scheduler::new_shared()).config(MachineConfig {
                max_transition_depth: Some(0),
                ..MachineConfig::default()
            });

        let result = builder.initialize(TestState::Initial);
        assert!(matches!(
            result,
            Err(FsmError::Config(ConfigError::ZeroTransitionDepth))
        ));
    }

    #[test]
    fn scheduler_ticks_registered_machine() {
        let scheduler = Scheduler::new_shared();
        let mut builder: StateMachineBuilder<TestState> =
            StateMachineBuilder::with_registry(scheduler.clone());
        builder
            .state(TestState::Initial)
            .transition(Phase::Update, Rule::to(TestState::Processing));
        builder
            .state(TestState::Processing)
            .transition(Phase::LateUpdate, Rule::to(TestState::Complete));

        let fsm = builder.initialize(TestState::Initial).unwrap();
        let id = fsm.borrow().registration().unwrap();
        assert!(scheduler.is_registered(id));

        scheduler.frame().unwrap();
        assert_eq!(fsm.borrow().current_state(), TestState::Complete);
        assert_eq!(
            fsm.borrow().history().get_path(),
            vec![TestState::Initial, TestState::Processing, TestState::Complete]
        );

        fsm.borrow_mut().close().unwrap();
        assert!(!scheduler.is_registered(id));
    }

    #[test]
    fn default_builder_uses_global_scheduler() {
        let before = Scheduler::global().len();
        let mut builder: StateMachineBuilder<TestState> = StateMachineBuilder::default();
        builder.state(TestState::Initial).on_update(|_| {});

        let fsm = builder.initialize(TestState::Initial).unwrap();
        assert_eq!(Scheduler::global().len(), before + 1);

        fsm.borrow_mut().close().unwrap();
        assert_eq!(Scheduler::global().len(), before);
    }
}
