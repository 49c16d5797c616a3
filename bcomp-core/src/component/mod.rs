//! Components
//!
//! Every node in a circuit is width-bounded: it carries a [`Component`] that
//! fixes how many bits it holds or transmits, and every value it touches is
//! reduced to that width's mask before use or comparison.
//!
//! # Capabilities
//!
//! Three small traits describe what a node can do with a value:
//!
//! - [`DataSource`]: the node can be read (registers, constants).
//! - [`DataDestination`]: the node accepts a whole-value write.
//! - [`DataPart`]: the node accepts a write into a bit sub-range without
//!   disturbing the rest of its bits.
//!
//! [`Register`] is the only place mutable state lives and implements all
//! three. [`Consts`] provides the shared literal sources.

pub mod bits;
mod consts;
mod register;

pub use consts::{Const, Consts};
pub use register::Register;

use crate::error::{CircuitError, Result};

/// Fixed bit width and its derived mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Component {
    width: u32,
    mask: u64,
}

impl Component {
    /// Widest supported component.
    pub const MAX_WIDTH: u32 = u64::BITS;

    /// Create a component of the given width.
    ///
    /// Fails with [`CircuitError::InvalidWidth`] for zero or for widths
    /// above [`Component::MAX_WIDTH`].
    pub fn new(width: u32) -> Result<Self> {
        if width == 0 || width > Self::MAX_WIDTH {
            return Err(CircuitError::InvalidWidth { width });
        }
        Ok(Self {
            width,
            mask: bits::mask(width),
        })
    }

    /// Number of significant bits.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// `(1 << width) - 1`.
    pub fn mask(&self) -> u64 {
        self.mask
    }

    /// Reduce `value` to this component's width.
    pub fn clamp(&self, value: u64) -> u64 {
        value & self.mask
    }
}

/// A node whose current value can be read.
pub trait DataSource: Send + Sync {
    /// Declared width of the value.
    fn width(&self) -> u32;

    /// Current value, always within the node's mask.
    fn get_value(&self) -> u64;
}

/// A node that accepts a pushed scalar value.
pub trait DataDestination: Send + Sync {
    /// Accept `value`. Implementors reduce it to their own width.
    fn set_value(&self, value: u64);
}

/// A wide holder that accepts writes into a bit sub-range.
pub trait DataPart: Send + Sync {
    /// Replace bits `[startbit, startbit + width(submask))` with the
    /// corresponding low bits of `value`, leaving all other bits unchanged.
    fn set_part(&self, value: u64, startbit: u32, submask: u64);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn component_derives_mask() {
        let c = Component::new(8).unwrap();
        assert_eq!(c.width(), 8);
        assert_eq!(c.mask(), 0xFF);
        assert_eq!(c.clamp(0x1FF), 0xFF);
    }

    #[test]
    fn zero_width_is_rejected() {
        assert_eq!(
            Component::new(0),
            Err(CircuitError::InvalidWidth { width: 0 })
        );
    }

    #[test]
    fn oversized_width_is_rejected() {
        assert!(Component::new(64).is_ok());
        assert_eq!(
            Component::new(65),
            Err(CircuitError::InvalidWidth { width: 65 })
        );
    }
}
