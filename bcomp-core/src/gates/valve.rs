//! Valve Implementation
//!
//! A Valve is the conditional gate of the circuit. Whenever it is triggered
//! it reads `width` bits of its source starting at `startbit` and compares
//! them with a literal condition:
//!
//! - equal: the selected bits (or the bits of its output [`Tap`]) are written
//!   to every destination, in the order they were wired.
//! - different: nothing is written and no destination is touched.
//!
//! This is how a circuit says "if control line X is active, do Y". The value
//! that triggers a valve is ignored; only its source decides.

use super::Destinations;
use crate::component::{bits, Component};
use crate::error::{CircuitError, Result};
use crate::graph::NodeId;

/// A bit field of a readable node, used as a valve's output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tap {
    pub(crate) source: NodeId,
    pub(crate) startbit: u32,
    pub(crate) component: Component,
}

impl Tap {
    /// Tap `width` bits of `source` starting at `startbit`.
    pub fn new(source: NodeId, startbit: u32, width: u32) -> Result<Self> {
        Ok(Self {
            source,
            startbit,
            component: Component::new(width)?,
        })
    }

    /// Node the bits are read from.
    pub fn source(&self) -> NodeId {
        self.source
    }

    /// First tapped bit.
    pub fn startbit(&self) -> u32 {
        self.startbit
    }

    /// Number of tapped bits.
    pub fn width(&self) -> u32 {
        self.component.width()
    }

    /// The tapped field of `value`.
    pub fn select(&self, value: u64) -> u64 {
        bits::extract(value, self.startbit, self.component.mask())
    }
}

/// Conditional gate.
///
/// # Example
///
/// ```rust
/// use bcomp_core::gates::Valve;
/// use bcomp_core::graph::Circuit;
///
/// let circuit = Circuit::new();
/// let flag = circuit.add_register("flag", 1).unwrap();
/// let out = circuit.add_register("out", 1).unwrap();
/// let valve = circuit
///     .add_valve(Valve::new(flag, 1, 0, 1).unwrap(), &[out])
///     .unwrap();
///
/// circuit.propagate(valve).unwrap();
/// assert_eq!(circuit.value(out).unwrap(), 0);
///
/// circuit.set_value(flag, 1).unwrap();
/// circuit.propagate(valve).unwrap();
/// assert_eq!(circuit.value(out).unwrap(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Valve {
    pub(crate) component: Component,
    pub(crate) source: NodeId,
    pub(crate) startbit: u32,
    pub(crate) condition: u64,
    pub(crate) tap: Option<Tap>,
    pub(crate) destinations: Destinations,
}

impl Valve {
    /// Gate on `width` bits of `source` at `startbit` equalling `condition`.
    ///
    /// Fails with [`CircuitError::WidthMismatch`] when the condition cannot
    /// be represented in `width` bits, since such a valve could never open.
    pub fn new(source: NodeId, width: u32, startbit: u32, condition: u64) -> Result<Self> {
        let component = Component::new(width)?;
        if component.clamp(condition) != condition {
            return Err(CircuitError::WidthMismatch {
                context: "valve condition",
                needed: bits::width_of(condition),
                available: width,
            });
        }
        Ok(Self {
            component,
            source,
            startbit,
            condition,
            tap: None,
            destinations: Destinations::new(),
        })
    }

    /// Forward the tapped bits instead of the compared ones.
    pub fn with_tap(mut self, tap: Tap) -> Self {
        self.tap = Some(tap);
        self
    }

    /// Node whose bits are compared.
    pub fn source(&self) -> NodeId {
        self.source
    }

    /// Number of compared bits.
    pub fn width(&self) -> u32 {
        self.component.width()
    }

    /// Offset of the compared field.
    pub fn startbit(&self) -> u32 {
        self.startbit
    }

    /// Literal the field must equal.
    pub fn condition(&self) -> u64 {
        self.condition
    }

    /// Output tap, if any.
    pub fn tap(&self) -> Option<&Tap> {
        self.tap.as_ref()
    }

    /// Destinations in firing order.
    pub fn destinations(&self) -> &[NodeId] {
        &self.destinations
    }

    /// The compared field of a source value.
    pub fn select(&self, source_value: u64) -> u64 {
        bits::extract(source_value, self.startbit, self.component.mask())
    }

    /// Whether a selected field opens the valve.
    pub fn is_open(&self, selected: u64) -> bool {
        selected == self.condition
    }

    /// Width of what the valve writes to its destinations.
    pub fn output_width(&self) -> u32 {
        self.tap.map_or(self.component.width(), |tap| tap.width())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valve_selects_offset_field() {
        let valve = Valve::new(NodeId::from(0), 2, 3, 0b10).unwrap();
        let selected = valve.select(0b1_0000);
        assert_eq!(selected, 0b10);
        assert!(valve.is_open(selected));
        assert!(!valve.is_open(valve.select(0b0_1000)));
    }

    #[test]
    fn condition_must_fit_the_width() {
        let err = Valve::new(NodeId::from(0), 1, 0, 2).unwrap_err();
        assert_eq!(
            err,
            CircuitError::WidthMismatch {
                context: "valve condition",
                needed: 2,
                available: 1,
            }
        );
    }

    #[test]
    fn tap_changes_output_width() {
        let src = NodeId::from(0);
        let valve = Valve::new(src, 1, 0, 1).unwrap();
        assert_eq!(valve.output_width(), 1);

        let valve = valve.with_tap(Tap::new(NodeId::from(1), 0, 8).unwrap());
        assert_eq!(valve.output_width(), 8);
        assert_eq!(valve.tap().map(Tap::source), Some(NodeId::from(1)));
    }

    #[test]
    fn zero_width_valve_is_rejected() {
        assert_eq!(
            Valve::new(NodeId::from(0), 0, 0, 0),
            Err(CircuitError::InvalidWidth { width: 0 })
        );
    }
}
