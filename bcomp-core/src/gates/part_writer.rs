//! Bit-field injection into a wider register.
//!
//! A PartWriter has no state of its own. Every value it receives is reduced
//! to its width and merged into `[startbit, startbit + width)` of its target;
//! the other bits of the target are left as they were.

use crate::component::{Component, DataPart};
use crate::error::Result;
use crate::graph::NodeId;

/// Routing adapter from a narrow signal to a field of a register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartWriter {
    pub(crate) component: Component,
    pub(crate) target: NodeId,
    pub(crate) startbit: u32,
}

impl PartWriter {
    /// Write `width` bits at `startbit` of `target`.
    pub fn new(target: NodeId, startbit: u32, width: u32) -> Result<Self> {
        Ok(Self {
            component: Component::new(width)?,
            target,
            startbit,
        })
    }

    /// The register written to.
    pub fn target(&self) -> NodeId {
        self.target
    }

    /// First written bit.
    pub fn startbit(&self) -> u32 {
        self.startbit
    }

    /// Number of written bits.
    pub fn width(&self) -> u32 {
        self.component.width()
    }

    /// Merge `value` into `part`.
    pub fn write(&self, part: &dyn DataPart, value: u64) {
        part.set_part(self.component.clamp(value), self.startbit, self.component.mask());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{DataDestination, DataSource, Register};

    #[test]
    fn writes_ready_bit_into_status_word() {
        let status = Register::new("status", 8).unwrap();
        let writer = PartWriter::new(NodeId::from(0), 6, 1).unwrap();

        writer.write(&status, 1);
        assert_eq!(status.get_value(), 0b0100_0000);
    }

    #[test]
    fn masks_incoming_value_to_its_width() {
        let status = Register::new("status", 8).unwrap();
        status.set_value(0b1000_0001);
        let writer = PartWriter::new(NodeId::from(0), 2, 2).unwrap();

        writer.write(&status, 0b1111);
        assert_eq!(status.get_value(), 0b1000_1101);
    }
}
