//! Shared constant sources.
//!
//! The table is built once per process and never mutated. Constants are
//! stateless, so every circuit can reference the same entries without
//! synchronization.

use std::sync::OnceLock;

use super::{bits, Component, DataSource};
use crate::error::{CircuitError, Result};

/// An immutable literal source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Const {
    component: Component,
    value: u64,
}

impl Const {
    fn new(value: u64) -> Self {
        let width = bits::width_of(value);
        Self {
            component: Component {
                width,
                mask: bits::mask(width),
            },
            value,
        }
    }

    /// The literal.
    pub fn value(&self) -> u64 {
        self.value
    }

    /// Width and mask. The width is the smallest that holds the literal.
    pub fn component(&self) -> Component {
        self.component
    }

    /// Constants reject every write.
    pub fn try_set_value(&self, _value: u64) -> Result<()> {
        Err(CircuitError::ImmutableWrite { value: self.value })
    }
}

impl DataSource for Const {
    fn width(&self) -> u32 {
        self.component.width()
    }

    fn get_value(&self) -> u64 {
        self.value
    }
}

/// The process-wide constant table, indexed by literal value.
#[derive(Debug)]
pub struct Consts {
    table: Vec<Const>,
}

static CONSTS: OnceLock<Consts> = OnceLock::new();

impl Consts {
    /// Number of literals in the table (`0..TABLE_SIZE`).
    pub const TABLE_SIZE: u64 = 256;

    /// The shared table, built on first use.
    pub fn shared() -> &'static Consts {
        CONSTS.get_or_init(|| Consts {
            table: (0..Self::TABLE_SIZE).map(Const::new).collect(),
        })
    }

    /// The constant for `value`, if the table holds it.
    pub fn get(&self, value: u64) -> Option<&Const> {
        usize::try_from(value).ok().and_then(|i| self.table.get(i))
    }

    /// Literal `0`.
    pub fn zero(&self) -> &Const {
        &self.table[0]
    }

    /// Literal `1`.
    pub fn one(&self) -> &Const {
        &self.table[1]
    }

    /// Number of constants.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Always false; the table is never empty.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_shared() {
        let a = Consts::shared();
        let b = Consts::shared();
        assert!(std::ptr::eq(a, b));
        assert_eq!(a.len(), 256);
    }

    #[test]
    fn constants_are_indexed_by_value() {
        let consts = Consts::shared();
        assert_eq!(consts.zero().get_value(), 0);
        assert_eq!(consts.one().get_value(), 1);
        assert_eq!(consts.get(200).map(Const::value), Some(200));
        assert!(consts.get(256).is_none());
    }

    #[test]
    fn constants_have_minimal_width() {
        let consts = Consts::shared();
        assert_eq!(consts.zero().width(), 1);
        assert_eq!(consts.one().width(), 1);
        assert_eq!(consts.get(6).unwrap().width(), 3);
        assert_eq!(consts.get(255).unwrap().width(), 8);
    }

    #[test]
    fn constants_reject_writes() {
        let one = Consts::shared().one();
        assert_eq!(
            one.try_set_value(0),
            Err(CircuitError::ImmutableWrite { value: 1 })
        );
        assert_eq!(one.get_value(), 1);
    }
}
