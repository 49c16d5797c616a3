//! Propagation Graph
//!
//! This module implements the circuit: an arena of nodes wired together
//! through destination lists, and the engine that pushes values through it.
//!
//! # Overview
//!
//! The circuit is a directed acyclic graph where:
//!
//! - Nodes are registers, constants, gates, part writers and external sinks
//! - Edges are destination links: an edge from A to B means A writes to B
//!
//! When a value is written to a node, the node applies its rule and writes
//! the result to each of its destinations in order, recursively, until the
//! cascade ends at registers, part writers or sinks.
//!
//! # Design Decisions
//!
//! 1. Nodes live in a central arena and refer to each other by index, so the
//!    same register or gate can feed any number of consumers, and edges can
//!    be added after construction.
//!
//! 2. Acyclicity is enforced edge by edge at assembly time, which keeps the
//!    recursive cascade bounded by the size of the graph.
//!
//! 3. Mutable state lives only in registers, each behind its own lock.

mod circuit;
mod node;

pub use circuit::Circuit;
pub use node::{NodeId, NodeKind};
