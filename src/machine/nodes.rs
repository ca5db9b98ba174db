//! The node map shared by the builder and the running machine.

use crate::core::Tag;
use crate::node::{Behaviour, StateNode};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

type ErasedNode<S, E> = Rc<dyn Behaviour<S, E>>;

/// State nodes keyed by tag, plus the optional any-state overlay.
///
/// Nodes are created lazily on first access and handed out as `Rc`s, so a
/// node can be configured before or after the machine is initialized.
/// Configuration changes made after initialization take effect immediately,
/// but never change whether the machine is registered with its scheduler.
pub struct NodeSet<S: Tag, E: Tag> {
    nodes: HashMap<S, ErasedNode<S, E>>,
    any_state: Option<ErasedNode<S, E>>,
}

impl<S: Tag, E: Tag> NodeSet<S, E> {
    pub(crate) fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            any_state: None,
        }
    }

    /// Stateless node for `tag`, created if absent.
    ///
    /// # Panics
    ///
    /// Panics if `tag` is already bound to a stateful node.
    pub fn state(&mut self, tag: S) -> Rc<StateNode<S, E>> {
        self.stateful(tag, ())
    }

    /// Stateful node for `tag` whose data slot starts at `initial`.
    ///
    /// Returns the existing node (ignoring `initial`) if one with the same
    /// data type is already bound.
    ///
    /// # Panics
    ///
    /// Panics if `tag` is already bound to a node with a different data type.
    pub fn stateful<D: Clone + 'static>(&mut self, tag: S, initial: D) -> Rc<StateNode<S, E, D>> {
        match self.nodes.entry(tag) {
            Entry::Occupied(entry) => downcast(entry.get())
                .unwrap_or_else(|| mismatch::<D>(tag.name())),
            Entry::Vacant(entry) => {
                let node = Rc::new(StateNode::new(initial));
                entry.insert(Rc::clone(&node) as ErasedNode<S, E>);
                node
            }
        }
    }

    /// Typed lookup of an existing node. `None` if `tag` has no node or its
    /// data type is not `D`.
    pub fn node<D: Clone + 'static>(&self, tag: S) -> Option<Rc<StateNode<S, E, D>>> {
        self.nodes.get(&tag).and_then(downcast)
    }

    /// The stateless any-state overlay, created if absent.
    ///
    /// # Panics
    ///
    /// Panics if the overlay was installed as a stateful node.
    pub fn any_state(&mut self) -> Rc<StateNode<S, E>> {
        self.any_state_stateful(())
    }

    /// Stateful any-state overlay whose data slot starts at `initial`.
    ///
    /// # Panics
    ///
    /// Panics if the overlay already exists with a different data type.
    pub fn any_state_stateful<D: Clone + 'static>(&mut self, initial: D) -> Rc<StateNode<S, E, D>> {
        if let Some(existing) = &self.any_state {
            return downcast(existing).unwrap_or_else(|| mismatch::<D>("any-state"));
        }
        let node = Rc::new(StateNode::new(initial));
        self.any_state = Some(Rc::clone(&node) as ErasedNode<S, E>);
        node
    }

    pub fn contains(&self, tag: S) -> bool {
        self.nodes.contains_key(&tag)
    }

    pub fn has_any_state(&self) -> bool {
        self.any_state.is_some()
    }

    /// Number of per-state nodes (the overlay is not counted).
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub(crate) fn get(&self, tag: S) -> Option<ErasedNode<S, E>> {
        self.nodes.get(&tag).cloned()
    }

    pub(crate) fn overlay(&self) -> Option<ErasedNode<S, E>> {
        self.any_state.clone()
    }

    pub(crate) fn reset_all(&self) {
        self.nodes
            .values()
            .chain(self.any_state.iter())
            .for_each(|node| node.reset());
    }

    /// Whether any node, overlay included, has tick callbacks or phase rules.
    pub(crate) fn has_update_functions(&self) -> bool {
        self.nodes
            .values()
            .chain(self.any_state.iter())
            .any(|node| node.has_update_functions())
    }
}

impl<S: Tag, E: Tag> fmt::Debug for NodeSet<S, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeSet")
            .field("states", &self.nodes.keys().collect::<Vec<_>>())
            .field("any_state", &self.any_state.is_some())
            .finish()
    }
}

fn downcast<S: Tag, E: Tag, D: Clone + 'static>(
    node: &ErasedNode<S, E>,
) -> Option<Rc<StateNode<S, E, D>>> {
    Rc::clone(node).as_any().downcast().ok()
}

fn mismatch<D>(name: &str) -> ! {
    panic!(
        "node '{name}' is already bound with a different data type than {}",
        std::any::type_name::<D>()
    )
}
