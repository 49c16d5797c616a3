//! Single-bit inverter.

use super::Destinations;
use crate::component::bits;
use crate::graph::NodeId;

/// Writes the complement of bit `startbit` of its input to every destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Not {
    pub(crate) startbit: u32,
    pub(crate) destinations: Destinations,
}

impl Not {
    /// Invert bit `startbit` of the incoming value.
    pub fn new(startbit: u32) -> Self {
        Self {
            startbit,
            destinations: Destinations::new(),
        }
    }

    /// The inspected bit.
    pub fn startbit(&self) -> u32 {
        self.startbit
    }

    /// Bits an incoming value must provide.
    pub fn input_width(&self) -> u32 {
        self.startbit.saturating_add(1)
    }

    /// Destinations in firing order.
    pub fn destinations(&self) -> &[NodeId] {
        &self.destinations
    }

    /// `1 - bit`.
    pub fn invert(&self, input: u64) -> u64 {
        1 - bits::extract(input, self.startbit, 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inverts_the_selected_bit() {
        let not = Not::new(0);
        assert_eq!(not.invert(0), 1);
        assert_eq!(not.invert(1), 0);
        assert_eq!(not.invert(0b10), 1);

        let high = Not::new(3);
        assert_eq!(high.invert(0b1000), 0);
        assert_eq!(high.invert(0b0111), 1);
    }
}
