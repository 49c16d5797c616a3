//! Basic I/O Controller
//!
//! A controller with a one-bit ready flag (`state`), an eight-bit data
//! register (`dr`) and a three-bit interrupt vector (`irqreg`), attached to
//! a shared [`IoBus`].
//!
//! # Bus cycle
//!
//! The bus master places an address on `ioaddr`, a control line on `ioctrl`
//! and, for writes, data on `iodata`, then strobes the device. Bits 1..8 of
//! `ioaddr` select the device and bit 0 selects its register:
//!
//! | register | line | effect                                          |
//! |----------|------|-------------------------------------------------|
//! | 0        | IN   | `dr` to `iodata`, clear `state`, raise RDY      |
//! | 0        | OUT  | `iodata` to `dr`, clear `state`, raise RDY      |
//! | 1        | IN   | `state` to bit 6 of `iodata`, raise RDY         |
//! | 1        | OUT  | `iodata[0..3)` to `irqreg`, raise RDY           |
//!
//! Data-register paths only exist for the directions the device's
//! [`IoKind`] allows.
//!
//! # Interrupt chain
//!
//! Acknowledging an interrupt writes 1 into the first device of the chain.
//! A ready device answers by putting its vector on `iodata` and raising IRQ;
//! every device passes the complement of its ready flag to the next one, so
//! only the first ready device answers.

use std::fmt;
use std::sync::Arc;

use crate::component::{DataDestination, DataSource, Register};
use crate::error::{CircuitError, Result};
use crate::gates::{Control, Not, PartWriter, Tap, Valve};
use crate::graph::{Circuit, NodeId};

/// Control lines of the I/O bus, by bit position in `ioctrl`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IoControlSignal {
    /// The addressed device finished the cycle.
    Rdy,
    /// A device answered an interrupt acknowledge.
    Irq,
    /// Read from the device.
    In,
    /// Write to the device.
    Out,
}

impl IoControlSignal {
    /// Bit position in `ioctrl`.
    pub const fn bit(self) -> u32 {
        match self {
            Self::Rdy => 0,
            Self::Irq => 1,
            Self::In => 2,
            Self::Out => 3,
        }
    }

    /// Single-line mask.
    pub const fn mask(self) -> u64 {
        1 << self.bit()
    }
}

/// Directions a controller supports for its data register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoKind {
    /// `dr` can be read by the bus master.
    Input,
    /// `dr` can be written by the bus master.
    Output,
    /// Both.
    InputOutput,
}

impl IoKind {
    fn reads(self) -> bool {
        matches!(self, Self::Input | Self::InputOutput)
    }

    fn writes(self) -> bool {
        matches!(self, Self::Output | Self::InputOutput)
    }
}

/// Logical register of a controller that consumers can attach to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoRegister {
    /// Values latched into `dr` by bus writes.
    Data,
    /// Changes of the ready flag.
    State,
    /// Vectors latched into `irqreg`.
    Irq,
}

/// Address, control and data lines shared by every device on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IoBus {
    /// Device address in bits 1..8, register select in bit 0.
    pub ioaddr: NodeId,
    /// Control lines, see [`IoControlSignal`].
    pub ioctrl: NodeId,
    /// Data lines.
    pub iodata: NodeId,
}

impl IoBus {
    /// Width of `ioctrl`.
    pub const CONTROL_LINES: u32 = 4;

    /// Create the bus registers on `circuit`.
    pub fn new(circuit: &Circuit) -> Result<Self> {
        Ok(Self {
            ioaddr: circuit.add_register("ioaddr", 8)?,
            ioctrl: circuit.add_register("ioctrl", Self::CONTROL_LINES)?,
            iodata: circuit.add_register("iodata", 8)?,
        })
    }

    /// Address register `register` of the device at `addr`.
    pub fn address(&self, circuit: &Circuit, addr: u64, register: u64) -> Result<()> {
        circuit.set_value(self.ioaddr, (addr << 1) | (register & 1))
    }

    /// Drive exactly the given control lines.
    pub fn signal(&self, circuit: &Circuit, lines: &[IoControlSignal]) -> Result<()> {
        let value = lines.iter().fold(0, |acc, line| acc | line.mask());
        circuit.set_value(self.ioctrl, value)
    }

    /// Whether a control line is currently raised.
    pub fn is_raised(&self, circuit: &Circuit, line: IoControlSignal) -> Result<bool> {
        Ok(circuit.value(self.ioctrl)? & line.mask() != 0)
    }
}

/// Basic I/O controller built from core primitives.
#[derive(Debug)]
pub struct IoCtrlBasic {
    circuit: Arc<Circuit>,
    dr: Register,
    state: Register,
    irqreg: Register,
    select: NodeId,
    irqsc: NodeId,
    change_flag: NodeId,
    write_dr: NodeId,
    set_irq: NodeId,
}

impl IoCtrlBasic {
    /// Wire a controller named `name` at address `addr` (0..128) onto `bus`.
    ///
    /// `chain` receives the interrupt acknowledge this device passes on.
    pub fn new(
        circuit: &Arc<Circuit>,
        bus: &IoBus,
        name: &str,
        addr: u64,
        kind: IoKind,
        chain: &[NodeId],
    ) -> Result<Self> {
        let c = circuit.as_ref();

        // Everything that can be rejected is checked before the first node lands.
        let decode = Valve::new(bus.ioaddr, 7, 1, addr)?;
        let names = ["dr", "state", "irq", "ack"].map(|reg| format!("{name}.{reg}"));
        if let Some(taken) = names.iter().find(|n| c.register_by_name(n).is_some()) {
            return Err(CircuitError::DuplicateRegister(taken.clone()));
        }
        let [dr_name, state_name, irq_name, ack_name] = &names;

        let dr = c.add_register(dr_name, 8)?;
        let state = c.add_register(state_name, 1)?;
        let irqreg = c.add_register(irq_name, 3)?;
        let ack = c.add_register(ack_name, 1)?;
        let zero = c.constant(0)?;
        let one = c.constant(1)?;

        let line = |signal: IoControlSignal| Valve::new(bus.ioctrl, 1, signal.bit(), 1);
        let always = || Valve::new(one, 1, 0, 1);

        // Shared completion signals
        let rdy_bit = c.add_part_writer(PartWriter::new(
            bus.ioctrl,
            IoControlSignal::Rdy.bit(),
            1,
        )?)?;
        let rdy = c.add_valve(always()?, &[rdy_bit])?;
        let change_flag = c.add_control(Control::new(1, 1, 0)?, &[state])?;
        let clear_flag = c.add_valve(Valve::new(zero, 1, 0, 0)?, &[change_flag])?;

        // Register 1: status and interrupt vector
        let status_bit = c.add_part_writer(PartWriter::new(bus.iodata, 6, 1)?)?;
        let status_in = c.add_valve(
            line(IoControlSignal::In)?.with_tap(Tap::new(state, 0, 1)?),
            &[status_bit, rdy],
        )?;
        let set_irq = c.add_valve(
            line(IoControlSignal::Out)?.with_tap(Tap::new(bus.iodata, 0, 3)?),
            &[irqreg, rdy],
        )?;
        let r1 = c.add_valve(Valve::new(bus.ioaddr, 1, 0, 1)?, &[status_in, set_irq])?;

        // Register 0: data
        let r0 = c.add_valve(Valve::new(bus.ioaddr, 1, 0, 0)?, &[])?;
        if kind.reads() {
            let read_dr = c.add_valve(
                line(IoControlSignal::In)?.with_tap(Tap::new(dr, 0, 8)?),
                &[bus.iodata, clear_flag, rdy],
            )?;
            c.add_destination(r0, &[read_dr])?;
        }
        let write_dr = c.add_valve(
            line(IoControlSignal::Out)?.with_tap(Tap::new(bus.iodata, 0, 8)?),
            &[dr],
        )?;
        if kind.writes() {
            let out_path = c.add_valve(
                line(IoControlSignal::Out)?,
                &[write_dr, clear_flag, rdy],
            )?;
            c.add_destination(r0, &[out_path])?;
        }

        let decode = c.add_valve(decode, &[r0, r1])?;
        let select = c.add_control(Control::new(1, 1, 0)?, &[decode])?;

        // Interrupt chain
        let vector = c.add_part_writer(PartWriter::new(bus.iodata, 0, 3)?)?;
        let irq_bit = c.add_part_writer(PartWriter::new(
            bus.ioctrl,
            IoControlSignal::Irq.bit(),
            1,
        )?)?;
        let raise_irq = c.add_valve(always()?, &[irq_bit])?;
        let answer = c.add_valve(
            Valve::new(state, 1, 0, 1)?.with_tap(Tap::new(irqreg, 0, 3)?),
            &[vector, raise_irq],
        )?;
        let pass_on = c.add_not(Not::new(0), chain)?;
        let forward = c.add_valve(always()?.with_tap(Tap::new(state, 0, 1)?), &[pass_on])?;
        let ack_gate = c.add_valve(Valve::new(ack, 1, 0, 1)?, &[answer, forward])?;
        let irqsc = c.add_control(Control::new(1, 1, 0)?, &[ack, ack_gate])?;

        tracing::debug!(name, addr, ?kind, "io controller wired");

        Ok(Self {
            circuit: Arc::clone(circuit),
            dr: c.register(dr)?,
            state: c.register(state)?,
            irqreg: c.register(irqreg)?,
            select,
            irqsc,
            change_flag,
            write_dr,
            set_irq,
        })
    }

    /// Run one bus cycle against this device.
    pub fn strobe(&self) -> Result<()> {
        self.circuit.propagate(self.select)
    }

    /// Start an interrupt acknowledge at this device.
    pub fn acknowledge_irq(&self) -> Result<()> {
        self.circuit.set_value(self.irqsc, 1)
    }

    /// Entry of this device's interrupt chain, for wiring a predecessor.
    pub fn irq_chain(&self) -> NodeId {
        self.irqsc
    }

    /// Whether the ready flag is set.
    pub fn is_ready(&self) -> bool {
        self.state.get_value() == 1
    }

    /// Raise the ready flag through the flag-change signal.
    pub fn set_ready(&self) -> Result<()> {
        self.circuit.propagate(self.change_flag)
    }

    /// Current data register.
    pub fn data(&self) -> u64 {
        self.dr.get_value()
    }

    /// Load the data register from the device side.
    pub fn set_data(&self, value: u64) {
        self.dr.set_value(value);
    }

    /// Data register, ready flag and interrupt vector.
    pub fn registers(&self) -> [Register; 3] {
        [self.dr.clone(), self.state.clone(), self.irqreg.clone()]
    }

    /// Attach consumers to the signal that changes `register`.
    pub fn add_destination(&self, register: IoRegister, destinations: &[NodeId]) -> Result<()> {
        let node = match register {
            IoRegister::State => self.change_flag,
            IoRegister::Data => self.write_dr,
            IoRegister::Irq => self.set_irq,
        };
        self.circuit.add_destination(node, destinations)
    }
}

impl fmt::Display for IoCtrlBasic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "IRQ = {} State = {} Data = {}",
            self.irqreg, self.state, self.dr
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_lines_are_distinct_bits() {
        let all = [
            IoControlSignal::Rdy,
            IoControlSignal::Irq,
            IoControlSignal::In,
            IoControlSignal::Out,
        ];
        let combined = all.iter().fold(0, |acc, s| acc | s.mask());
        assert_eq!(combined, 0b1111);
    }

    #[test]
    fn kinds_select_directions() {
        assert!(IoKind::Input.reads() && !IoKind::Input.writes());
        assert!(!IoKind::Output.reads() && IoKind::Output.writes());
        assert!(IoKind::InputOutput.reads() && IoKind::InputOutput.writes());
    }

    #[test]
    fn fresh_controller_is_idle() {
        let circuit = Arc::new(Circuit::new());
        let bus = IoBus::new(&circuit).unwrap();
        let dev = IoCtrlBasic::new(&circuit, &bus, "kbd", 3, IoKind::Input, &[]).unwrap();

        assert!(!dev.is_ready());
        assert_eq!(dev.data(), 0);
        assert_eq!(dev.to_string(), "IRQ = 0 State = 0 Data = 00");
    }

    #[test]
    fn address_must_fit_seven_bits() {
        let circuit = Arc::new(Circuit::new());
        let bus = IoBus::new(&circuit).unwrap();
        assert!(IoCtrlBasic::new(&circuit, &bus, "big", 128, IoKind::Output, &[]).is_err());
    }

    #[test]
    fn rejected_controller_leaves_circuit_untouched() {
        let circuit = Arc::new(Circuit::new());
        let bus = IoBus::new(&circuit).unwrap();
        let nodes = circuit.node_count();
        let saved = circuit.snapshot();

        assert_eq!(
            IoCtrlBasic::new(&circuit, &bus, "dev", 128, IoKind::Output, &[]).unwrap_err(),
            CircuitError::WidthMismatch {
                context: "valve condition",
                needed: 8,
                available: 7,
            }
        );
        assert_eq!(circuit.node_count(), nodes);
        assert_eq!(circuit.snapshot(), saved);

        let dev = IoCtrlBasic::new(&circuit, &bus, "dev", 5, IoKind::Output, &[]).unwrap();
        assert!(!dev.is_ready());
    }

    #[test]
    fn taken_names_are_rejected_before_wiring() {
        let circuit = Arc::new(Circuit::new());
        let bus = IoBus::new(&circuit).unwrap();
        circuit.add_register("dev.ack", 1).unwrap();
        let nodes = circuit.node_count();

        assert_eq!(
            IoCtrlBasic::new(&circuit, &bus, "dev", 5, IoKind::Input, &[]).unwrap_err(),
            CircuitError::DuplicateRegister("dev.ack".to_owned())
        );
        assert_eq!(circuit.node_count(), nodes);
    }
}
