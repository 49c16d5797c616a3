//! Control: the unconditional driver.
//!
//! Triggered on its own, a Control writes its literal to every destination.
//! Wired as a destination, it forwards the field `[startbit, startbit +
//! width)` of whatever it receives. Its destination list only ever grows,
//! so a device can keep attaching consumers to one logical signal while it
//! is being assembled.

use super::Destinations;
use crate::component::{bits, Component};
use crate::error::{CircuitError, Result};
use crate::graph::NodeId;

/// Unconditional signal driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Control {
    pub(crate) component: Component,
    pub(crate) startbit: u32,
    pub(crate) value: u64,
    pub(crate) destinations: Destinations,
}

impl Control {
    /// A driver of `width` bits with literal `value`.
    pub fn new(value: u64, width: u32, startbit: u32) -> Result<Self> {
        let component = Component::new(width)?;
        if component.clamp(value) != value {
            return Err(CircuitError::WidthMismatch {
                context: "control literal",
                needed: bits::width_of(value),
                available: width,
            });
        }
        Ok(Self {
            component,
            startbit,
            value,
            destinations: Destinations::new(),
        })
    }

    /// The literal written on activation.
    pub fn literal(&self) -> u64 {
        self.value
    }

    /// Output width.
    pub fn width(&self) -> u32 {
        self.component.width()
    }

    /// Offset of the forwarded field.
    pub fn startbit(&self) -> u32 {
        self.startbit
    }

    /// Bits an incoming value must provide.
    pub fn input_width(&self) -> u32 {
        self.startbit.saturating_add(self.component.width())
    }

    /// Destinations in firing order.
    pub fn destinations(&self) -> &[NodeId] {
        &self.destinations
    }

    /// Value forwarded when `input` is written to the control.
    pub fn forward(&self, input: u64) -> u64 {
        bits::extract(input, self.startbit, self.component.mask())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forwards_the_configured_field() {
        let control = Control::new(1, 2, 4).unwrap();
        assert_eq!(control.forward(0b11_0000), 0b11);
        assert_eq!(control.forward(0b00_1111), 0);
        assert_eq!(control.input_width(), 6);
    }

    #[test]
    fn literal_must_fit() {
        assert!(Control::new(3, 2, 0).is_ok());
        assert!(matches!(
            Control::new(4, 2, 0),
            Err(CircuitError::WidthMismatch { .. })
        ));
    }
}
