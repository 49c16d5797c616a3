//! BComp Core
//!
//! This crate provides the value-propagation substrate for the basic
//! educational computer. It implements:
//!
//! - Width-bounded storage cells (registers) and shared literal constants
//! - Gates that forward values conditionally or unconditionally
//! - Bit-field injection into wider registers
//! - An arena-backed circuit that wires all of the above and pushes values
//!   through it
//!
//! Devices, CPUs and front ends are built on top of this contract; the
//! `device` module carries a basic I/O controller as an example.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `component`: widths, masks, registers, constants and the data traits
//! - `gates`: valve, control, inverter and part writer descriptions
//! - `graph`: the circuit arena, wiring checks and propagation
//! - `snapshot`: saving and restoring register values
//! - `device`: circuits assembled from the primitives
//!
//! # Example
//!
//! ```rust
//! use bcomp_core::gates::{PartWriter, Valve};
//! use bcomp_core::graph::Circuit;
//!
//! let circuit = Circuit::new();
//! let ready = circuit.add_register("ready", 1).unwrap();
//! let status = circuit.add_register("status", 8).unwrap();
//! let bit6 = circuit
//!     .add_part_writer(PartWriter::new(status, 6, 1).unwrap())
//!     .unwrap();
//! let copy = circuit
//!     .add_valve(Valve::new(ready, 1, 0, 1).unwrap(), &[bit6])
//!     .unwrap();
//!
//! circuit.set_value(ready, 1).unwrap();
//! circuit.propagate(copy).unwrap();
//! assert_eq!(circuit.value(status).unwrap(), 64);
//! ```

pub mod component;
pub mod config;
pub mod device;
pub mod error;
pub mod gates;
pub mod graph;
pub mod snapshot;

pub use component::{Component, DataDestination, DataPart, DataSource, Register};
pub use config::CircuitConfig;
pub use error::{CircuitError, Result};
pub use graph::{Circuit, NodeId, NodeKind};
