//! Devices
//!
//! Devices are particular wirings of core primitives. Nothing here extends
//! the engine: a device only adds registers and gates to a circuit through
//! its public API and keeps the handles it needs to drive them.

mod io_ctrl;

pub use io_ctrl::{IoBus, IoControlSignal, IoCtrlBasic, IoKind, IoRegister};
