//! Per-node data slot for stateful nodes.

use std::cell::{Ref, RefCell};
use std::fmt;

/// Mutable payload owned by a stateful node.
///
/// The slot starts at its initial value, is changed only through
/// [`modify`](DataSlot::modify) or [`update`](DataSlot::update), and is reset
/// to the initial value after every exit of its node. Changes are visible
/// immediately to every later callback and rule in the same tick.
pub struct DataSlot<D> {
    initial: D,
    current: RefCell<D>,
}

impl<D: Clone> DataSlot<D> {
    pub(crate) fn new(initial: D) -> Self {
        Self {
            current: RefCell::new(initial.clone()),
            initial,
        }
    }

    /// Clone of the current value.
    pub fn get(&self) -> D {
        self.current.borrow().clone()
    }

    /// Read the current value without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&D) -> R) -> R {
        f(&self.current.borrow())
    }

    /// Replace the current value.
    pub fn modify(&self, value: D) {
        *self.current.borrow_mut() = value;
    }

    /// Change the current value in place.
    pub fn update(&self, f: impl FnOnce(&mut D)) {
        f(&mut self.current.borrow_mut());
    }

    /// Value the slot is reset to on exit.
    pub fn initial(&self) -> &D {
        &self.initial
    }

    pub(crate) fn reset(&self) {
        self.modify(self.initial.clone());
    }

    pub(crate) fn borrow(&self) -> Ref<'_, D> {
        self.current.borrow()
    }
}

impl<D: fmt::Debug> fmt::Debug for DataSlot<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataSlot")
            .field("initial", &self.initial)
            .field("current", &self.current)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_starts_at_initial_value() {
        let slot = DataSlot::new(7);
        assert_eq!(slot.get(), 7);
        assert_eq!(*slot.initial(), 7);
    }

    #[test]
    fn modify_is_immediately_visible() {
        let slot = DataSlot::new(String::from("a"));
        slot.modify(String::from("b"));
        assert_eq!(slot.get(), "b");
        assert_eq!(slot.with(|s| s.len()), 1);
    }

    #[test]
    fn update_changes_in_place() {
        let slot = DataSlot::new(vec![1, 2]);
        slot.update(|v| v.push(3));
        assert_eq!(slot.get(), vec![1, 2, 3]);
    }

    #[test]
    fn reset_restores_initial_value() {
        let slot = DataSlot::new(0u32);
        slot.update(|n| *n += 5);
        slot.reset();
        assert_eq!(slot.get(), 0);
    }
}
