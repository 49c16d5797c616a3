//! Register Implementation
//!
//! A Register is the only stateful node in a circuit. It holds a single
//! width-bounded value and never notifies anyone when it changes: the
//! circuit around it decides what to propagate and when.
//!
//! # Thread Safety
//!
//! The value lives behind its own mutex, so whole-value writes and bit-range
//! merges are each a single critical section. Two writers of the same cell
//! never produce a torn value; writers of different cells never contend.
//!
//! Cloning a Register hands out another handle to the same cell, which is
//! how a UI thread can poll a value while a simulation thread writes it.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use super::{bits, Component, DataDestination, DataPart, DataSource};
use crate::error::Result;

/// A width-bounded storage cell.
///
/// # Example
///
/// ```rust
/// use bcomp_core::component::{DataDestination, DataSource, Register};
///
/// let dr = Register::new("dr", 8).unwrap();
/// dr.set_value(0x1FF);
/// assert_eq!(dr.get_value(), 0xFF);
/// ```
#[derive(Clone)]
pub struct Register {
    name: Arc<str>,
    component: Component,
    value: Arc<Mutex<u64>>,
}

impl Register {
    /// Create a register holding zero.
    pub fn new(name: impl Into<Arc<str>>, width: u32) -> Result<Self> {
        Ok(Self {
            name: name.into(),
            component: Component::new(width)?,
            value: Arc::new(Mutex::new(0)),
        })
    }

    /// The register's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Width and mask.
    pub fn component(&self) -> Component {
        self.component
    }

    /// Whether both handles refer to the same cell.
    pub fn same_cell(&self, other: &Register) -> bool {
        Arc::ptr_eq(&self.value, &other.value)
    }
}

impl DataSource for Register {
    fn width(&self) -> u32 {
        self.component.width()
    }

    fn get_value(&self) -> u64 {
        *self.value.lock()
    }
}

impl DataDestination for Register {
    fn set_value(&self, value: u64) {
        *self.value.lock() = self.component.clamp(value);
    }
}

impl DataPart for Register {
    fn set_part(&self, value: u64, startbit: u32, submask: u64) {
        let mut guard = self.value.lock();
        *guard = self
            .component
            .clamp(bits::insert(*guard, value, startbit, submask));
    }
}

impl fmt::Debug for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Register")
            .field("name", &self.name)
            .field("width", &self.component.width())
            .field("value", &self.get_value())
            .finish()
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.component.width().div_ceil(4) as usize;
        write!(f, "{:0digits$X}", self.get_value())
    }
}
