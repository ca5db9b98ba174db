//! The central tick scheduler.

use super::registry::{MachineId, Registry, Tickable};
use crate::config::SchedulerConfig;
use crate::core::Phase;
use crate::error::FsmError;
use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::rc::{Rc, Weak};

thread_local! {
    static GLOBAL: Rc<Scheduler> = Scheduler::new(SchedulerConfig::default());
}

struct Entry {
    id: MachineId,
    machine: Weak<RefCell<dyn Tickable>>,
}

impl Entry {
    fn is_live(&self, pending: &HashSet<MachineId>) -> bool {
        self.machine.strong_count() > 0 && !pending.contains(&self.id)
    }
}

/// Ticks every registered machine once per phase, in registration order.
///
/// Deregistration is deferred: the id goes into a pending-removal set that
/// every phase skips, and the live list is compacted only once that set
/// grows past [`SchedulerConfig::cleanup_threshold`] and no tick is in
/// progress. Machines may therefore register or deregister themselves or
/// each other from inside their own callbacks. A machine registered during
/// a phase is ticked later in that same phase.
///
/// # Example
///
/// ```rust
/// use tickstate::prelude::*;
///
/// tag_enum! {
///     enum Blink { On, Off }
/// }
///
/// let scheduler = Scheduler::new(SchedulerConfig::default());
/// let mut builder = StateMachineBuilder::<Blink>::with_registry(scheduler.clone());
/// builder.state(Blink::On).transition(Phase::Update, Rule::to(Blink::Off));
/// builder.state(Blink::Off).transition(Phase::Update, Rule::to(Blink::On));
/// let light = builder.initialize(Blink::On).unwrap();
///
/// assert_eq!(scheduler.frame().unwrap(), 3);
/// assert_eq!(light.borrow().current_state(), Blink::Off);
/// ```
pub struct Scheduler {
    config: SchedulerConfig,
    live: RefCell<Vec<Entry>>,
    pending_removal: RefCell<HashSet<MachineId>>,
    next_id: Cell<u64>,
    ticking: Cell<usize>,
}

impl Scheduler {
    pub fn new(config: SchedulerConfig) -> Rc<Self> {
        Rc::new(Self {
            config,
            live: RefCell::new(Vec::new()),
            pending_removal: RefCell::new(HashSet::new()),
            next_id: Cell::new(0),
            ticking: Cell::new(0),
        })
    }

    /// A fresh scheduler with default settings.
    pub fn new_shared() -> Rc<Self> {
        Self::new(SchedulerConfig::default())
    }

    /// This thread's default scheduler, used by
    /// [`StateMachineBuilder::new`](crate::builder::StateMachineBuilder::new).
    pub fn global() -> Rc<Self> {
        GLOBAL.with(Rc::clone)
    }

    pub fn update(&self) -> Result<usize, FsmError> {
        self.tick(Phase::Update)
    }

    pub fn fixed_update(&self) -> Result<usize, FsmError> {
        self.tick(Phase::FixedUpdate)
    }

    pub fn late_update(&self) -> Result<usize, FsmError> {
        self.tick(Phase::LateUpdate)
    }

    /// Run all three phases in frame order. Returns the total number of
    /// machine ticks.
    pub fn frame(&self) -> Result<usize, FsmError> {
        let mut total = 0;
        for phase in Phase::ALL {
            total += self.tick(phase)?;
        }
        Ok(total)
    }

    /// Tick every live machine once for `phase`.
    ///
    /// Returns how many machines were ticked. The phase stops at the first
    /// machine that reports an error, and that error is returned.
    pub fn tick(&self, phase: Phase) -> Result<usize, FsmError> {
        let result = {
            let _guard = TickGuard::enter(&self.ticking);
            self.tick_live(phase)
        };
        if self.ticking.get() == 0 {
            self.maybe_compact();
        }
        result
    }

    /// Number of registered machines that are still alive and not pending
    /// removal.
    pub fn len(&self) -> usize {
        let pending = self.pending_removal.borrow();
        self.live
            .borrow()
            .iter()
            .filter(|entry| entry.is_live(&pending))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_registered(&self, id: MachineId) -> bool {
        let pending = self.pending_removal.borrow();
        self.live
            .borrow()
            .iter()
            .any(|entry| entry.id == id && entry.is_live(&pending))
    }

    pub fn pending_removals(&self) -> usize {
        self.pending_removal.borrow().len()
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    fn tick_live(&self, phase: Phase) -> Result<usize, FsmError> {
        let mut ticked = 0;
        let mut index = 0;
        // Re-read the length each time: callbacks may register machines.
        while let Some((id, machine)) = self.entry_at(index) {
            index += 1;
            if self.pending_removal.borrow().contains(&id) {
                continue;
            }
            let Some(handle) = machine.upgrade() else {
                tracing::debug!(%id, "machine dropped without closing");
                self.deregister(id);
                continue;
            };
            let Ok(mut machine) = handle.try_borrow_mut() else {
                tracing::warn!(%id, %phase, "machine already borrowed, skipping tick");
                continue;
            };
            machine.tick(phase)?;
            ticked += 1;
        }
        Ok(ticked)
    }

    fn entry_at(&self, index: usize) -> Option<(MachineId, Weak<RefCell<dyn Tickable>>)> {
        self.live
            .borrow()
            .get(index)
            .map(|entry| (entry.id, Weak::clone(&entry.machine)))
    }

    fn maybe_compact(&self) {
        let mut pending = self.pending_removal.borrow_mut();
        if pending.len() <= self.config.cleanup_threshold {
            return;
        }
        let mut live = self.live.borrow_mut();
        let before = live.len();
        live.retain(|entry| !pending.contains(&entry.id));
        pending.clear();
        tracing::debug!(removed = before - live.len(), remaining = live.len(), "compacted scheduler");
    }
}

impl Registry for Scheduler {
    fn register(&self, machine: Weak<RefCell<dyn Tickable>>) -> MachineId {
        let id = MachineId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.live.borrow_mut().push(Entry { id, machine });
        tracing::debug!(%id, "registered machine");
        id
    }

    fn deregister(&self, id: MachineId) {
        if self.pending_removal.borrow_mut().insert(id) {
            tracing::debug!(%id, "deregistered machine");
        }
        if self.ticking.get() == 0 {
            self.maybe_compact();
        }
    }
}

struct TickGuard<'a>(&'a Cell<usize>);

impl<'a> TickGuard<'a> {
    fn enter(depth: &'a Cell<usize>) -> Self {
        depth.set(depth.get() + 1);
        Self(depth)
    }
}

impl Drop for TickGuard<'_> {
    fn drop(&mut self) {
        self.0.set(self.0.get() - 1);
    }
}
