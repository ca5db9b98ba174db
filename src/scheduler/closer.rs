//! Closing machines when their host goes away.

use super::registry::Tickable;
use std::cell::RefCell;
use std::rc::Rc;

/// Closes a machine when dropped, unless it was already closed.
///
/// Hold one in whatever owns the machine's lifetime (an entity, a scene) so
/// that tearing the owner down also runs the machine's exit callbacks and
/// detaches it from its scheduler.
///
/// # Example
///
/// ```rust
/// use tickstate::prelude::*;
///
/// tag_enum! {
///     enum Door { Open, Shut }
/// }
///
/// let scheduler = Scheduler::new_shared();
/// let mut builder = StateMachineBuilder::<Door>::with_registry(scheduler.clone());
/// builder.state(Door::Open).on_update(|_| {});
/// let door = builder.initialize(Door::Open).unwrap();
/// assert_eq!(scheduler.len(), 1);
///
/// drop(CloseOnDrop::new(door.clone()));
/// assert!(!door.borrow().is_active());
/// assert_eq!(scheduler.len(), 0);
/// ```
pub struct CloseOnDrop {
    machine: Rc<RefCell<dyn Tickable>>,
}

impl CloseOnDrop {
    pub fn new(machine: Rc<RefCell<dyn Tickable>>) -> Self {
        Self { machine }
    }
}

impl Drop for CloseOnDrop {
    fn drop(&mut self) {
        let Ok(mut machine) = self.machine.try_borrow_mut() else {
            tracing::warn!("machine borrowed while its guard was dropped, not closing");
            return;
        };
        if !machine.is_active() {
            return;
        }
        if let Err(err) = machine.close() {
            tracing::warn!(error = %err, "failed to close machine on drop");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Phase;
    use crate::error::FsmError;
    use std::cell::Cell;

    struct Counter {
        closes: Rc<Cell<u32>>,
        active: bool,
    }

    impl Tickable for Counter {
        fn tick(&mut self, _phase: Phase) -> Result<(), FsmError> {
            Ok(())
        }

        fn is_active(&self) -> bool {
            self.active
        }

        fn close(&mut self) -> Result<(), FsmError> {
            self.active = false;
            self.closes.set(self.closes.get() + 1);
            Ok(())
        }
    }

    #[test]
    fn closes_active_machine_once() {
        let closes = Rc::new(Cell::new(0));
        let machine = Rc::new(RefCell::new(Counter {
            closes: Rc::clone(&closes),
            active: true,
        }));

        drop(CloseOnDrop::new(machine.clone()));
        drop(CloseOnDrop::new(machine.clone()));

        assert_eq!(closes.get(), 1);
        assert!(!machine.borrow().active);
    }

    #[test]
    fn leaves_closed_machine_alone() {
        let closes = Rc::new(Cell::new(0));
        let machine = Rc::new(RefCell::new(Counter {
            closes: Rc::clone(&closes),
            active: false,
        }));

        drop(CloseOnDrop::new(machine));
        assert_eq!(closes.get(), 0);
    }
}
