//! Gates
//!
//! Node descriptions for everything in a circuit that is not a storage cell.
//! Each gate is built and validated on its own, then handed to
//! [`Circuit`](crate::graph::Circuit), which stores it in the arena, checks
//! its wiring and drives it during propagation.
//!
//! - [`Valve`]: forwards a value only when selected bits of a source equal a
//!   literal condition.
//! - [`Control`]: unconditional driver; forwards what it receives, or its
//!   literal when triggered.
//! - [`Not`]: single-bit inverter.
//! - [`PartWriter`]: injects a narrow value into a bit range of a register.
//!
//! The evaluation rules here are pure; all fan-out happens in the graph.

mod control;
mod not;
mod part_writer;
mod valve;

pub use control::Control;
pub use not::Not;
pub use part_writer::PartWriter;
pub use valve::{Tap, Valve};

use smallvec::SmallVec;

use crate::graph::NodeId;

/// Ordered, append-only destination list.
pub(crate) type Destinations = SmallVec<[NodeId; 4]>;
