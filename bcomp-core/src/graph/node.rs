//! Graph Nodes
//!
//! This module defines the node types that live in the circuit arena.

use std::fmt;
use std::sync::Arc;

use crate::component::{Component, Const, DataDestination, Register};
use crate::gates::{Control, Destinations, Not, PartWriter, Valve};

/// Handle of a node in a circuit's arena.
///
/// Handles are plain indices: they are only meaningful for the circuit that
/// issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Get the raw arena index.
    pub fn index(&self) -> usize {
        self.0
    }
}

impl From<usize> for NodeId {
    fn from(index: usize) -> Self {
        Self(index)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The kind of node in the circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// A storage cell. Leaf of every cascade.
    Register,

    /// A shared literal. Readable, never writable.
    Const,

    /// A conditional gate.
    Valve,

    /// An unconditional driver.
    Control,

    /// A single-bit inverter.
    Not,

    /// A bit-field injector into a register.
    PartWriter,

    /// An external destination outside the arena.
    Sink,
}

/// An external destination wired into the circuit.
///
/// Used by the device layer (and by tests) to observe what a cascade writes.
#[derive(Clone)]
pub(crate) struct Sink {
    pub(crate) component: Component,
    pub(crate) target: Arc<dyn DataDestination>,
}

impl fmt::Debug for Sink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sink")
            .field("width", &self.component.width())
            .finish_non_exhaustive()
    }
}

/// A node stored in the arena.
#[derive(Debug, Clone)]
pub(crate) enum Node {
    Register(Register),
    Const(&'static Const),
    Valve(Valve),
    Control(Control),
    Not(Not),
    PartWriter(PartWriter),
    Sink(Sink),
}

impl Node {
    pub(crate) fn kind(&self) -> NodeKind {
        match self {
            Node::Register(_) => NodeKind::Register,
            Node::Const(_) => NodeKind::Const,
            Node::Valve(_) => NodeKind::Valve,
            Node::Control(_) => NodeKind::Control,
            Node::Not(_) => NodeKind::Not,
            Node::PartWriter(_) => NodeKind::PartWriter,
            Node::Sink(_) => NodeKind::Sink,
        }
    }

    /// Nodes this node pushes values to. Empty for leaves.
    pub(crate) fn destinations(&self) -> &[NodeId] {
        match self {
            Node::Valve(valve) => &valve.destinations,
            Node::Control(control) => &control.destinations,
            Node::Not(not) => &not.destinations,
            _ => &[],
        }
    }

    pub(crate) fn destinations_mut(&mut self) -> Option<&mut Destinations> {
        match self {
            Node::Valve(valve) => Some(&mut valve.destinations),
            Node::Control(control) => Some(&mut control.destinations),
            Node::Not(not) => Some(&mut not.destinations),
            _ => None,
        }
    }

    /// Width of what the node pushes, for gates.
    pub(crate) fn output_width(&self) -> Option<u32> {
        match self {
            Node::Valve(valve) => Some(valve.output_width()),
            Node::Control(control) => Some(control.width()),
            Node::Not(_) => Some(1),
            _ => None,
        }
    }

    /// Bits the node can take in without truncation. `None` when the
    /// incoming value only triggers the node.
    pub(crate) fn input_width(&self) -> Option<u32> {
        match self {
            Node::Register(register) => Some(register.component().width()),
            Node::PartWriter(writer) => Some(writer.width()),
            Node::Sink(sink) => Some(sink.component.width()),
            Node::Control(control) => Some(control.input_width()),
            Node::Not(not) => Some(not.input_width()),
            Node::Valve(_) | Node::Const(_) => None,
        }
    }

    /// Width of the value the node can be read as.
    pub(crate) fn readable_width(&self) -> Option<u32> {
        match self {
            Node::Register(register) => Some(register.component().width()),
            Node::Const(constant) => Some(constant.component().width()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::Consts;

    #[test]
    fn node_id_displays_index() {
        let id = NodeId::from(7);
        assert_eq!(id.index(), 7);
        assert_eq!(id.to_string(), "#7");
    }

    #[test]
    fn only_gates_have_destinations() {
        let mut register = Node::Register(Register::new("r", 4).unwrap());
        assert!(register.destinations().is_empty());
        assert!(register.destinations_mut().is_none());

        let mut not = Node::Not(Not::new(0));
        not.destinations_mut().unwrap().push(NodeId::from(3));
        assert_eq!(not.destinations(), &[NodeId::from(3)]);
    }

    #[test]
    fn widths_by_kind() {
        let constant = Node::Const(Consts::shared().get(5).unwrap());
        assert_eq!(constant.kind(), NodeKind::Const);
        assert_eq!(constant.readable_width(), Some(3));
        assert_eq!(constant.input_width(), None);

        let control = Node::Control(Control::new(1, 1, 2).unwrap());
        assert_eq!(control.output_width(), Some(1));
        assert_eq!(control.input_width(), Some(3));
        assert_eq!(control.readable_width(), None);
    }
}
