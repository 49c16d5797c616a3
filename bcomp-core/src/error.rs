//! Error Taxonomy
//!
//! Every fallible operation in the crate returns [`CircuitError`]. Almost all
//! of them are assembly-time contract violations: a circuit that assembled
//! cleanly is expected to propagate without errors.

use thiserror::Error;

use crate::graph::{NodeId, NodeKind};

/// Errors raised while assembling or driving a circuit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CircuitError {
    /// A component was declared with a width outside `1..=64`.
    #[error("invalid component width {width}: must be between 1 and 64")]
    InvalidWidth {
        /// The rejected width.
        width: u32,
    },

    /// A wire cannot carry the bits being propagated without truncation.
    #[error("width mismatch in {context}: {needed} bits do not fit into {available}")]
    WidthMismatch {
        /// What was being connected or checked.
        context: &'static str,
        /// Bits the writer produces (or the field requires).
        needed: u32,
        /// Bits the receiver can hold.
        available: u32,
    },

    /// A constant source was used as a write target.
    #[error("attempted write to immutable constant {value}")]
    ImmutableWrite {
        /// The literal held by the constant.
        value: u64,
    },

    /// The circuit structure was changed while a propagation was in flight.
    #[error("circuit structure cannot change while a propagation is in flight")]
    ConcurrentMutation,

    /// A handle does not belong to this circuit.
    #[error("unknown node {0}")]
    UnknownNode(NodeId),

    /// Wiring the edge would make the propagation graph cyclic.
    #[error("wiring {from} -> {to} would create a cycle")]
    Cycle {
        /// The writer of the rejected edge.
        from: NodeId,
        /// The destination of the rejected edge.
        to: NodeId,
    },

    /// A cascade went deeper than the configured limit.
    #[error("propagation depth exceeded the limit of {limit}")]
    DepthExceeded {
        /// The configured maximum depth.
        limit: usize,
    },

    /// The node holds no value that can be read.
    #[error("node {node} ({kind:?}) cannot be read as a source")]
    NotReadable {
        /// The offending node.
        node: NodeId,
        /// Its kind.
        kind: NodeKind,
    },

    /// The node cannot be triggered on its own.
    #[error("node {node} ({kind:?}) cannot be triggered")]
    NotTriggerable {
        /// The offending node.
        node: NodeId,
        /// Its kind.
        kind: NodeKind,
    },

    /// The node has no destination list.
    #[error("node {node} ({kind:?}) does not accept destinations")]
    NoDestinations {
        /// The offending node.
        node: NodeId,
        /// Its kind.
        kind: NodeKind,
    },

    /// A register was required.
    #[error("node {node} ({kind:?}) is not a register")]
    NotARegister {
        /// The offending node.
        node: NodeId,
        /// Its kind.
        kind: NodeKind,
    },

    /// A snapshot names a register the circuit does not have.
    #[error("unknown register `{0}`")]
    UnknownRegister(String),

    /// A register name is already taken in this circuit.
    #[error("register `{0}` already exists")]
    DuplicateRegister(String),

    /// Configuration could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A snapshot could not be encoded or decoded.
    #[error("snapshot encoding failed: {0}")]
    Snapshot(String),
}

/// Result alias used throughout the crate.
pub type Result<T, E = CircuitError> = std::result::Result<T, E>;
