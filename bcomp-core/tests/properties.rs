//! Property tests for the bit semantics of registers, part writers and valves.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use proptest::prelude::*;

use bcomp_core::component::bits;
use bcomp_core::gates::{PartWriter, Valve};
use bcomp_core::{Circuit, DataDestination, DataPart, DataSource, Register};

#[derive(Default)]
struct Counter(AtomicUsize);

impl DataDestination for Counter {
    fn set_value(&self, _value: u64) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

/// A field `(startbit, width)` lying inside a register of `reg_width` bits.
fn field(reg_width: u32) -> impl Strategy<Value = (u32, u32)> {
    (0..reg_width).prop_flat_map(move |start| (Just(start), 1..=reg_width - start))
}

proptest! {
    #[test]
    fn register_reads_back_masked_value(width in 1u32..=64, value in any::<u64>()) {
        let reg = Register::new("r", width).unwrap();
        reg.set_value(value);
        prop_assert_eq!(reg.get_value(), value & bits::mask(width));
    }

    #[test]
    fn part_writer_replaces_only_its_field(
        (startbit, width) in field(16),
        initial in any::<u16>(),
        value in any::<u64>(),
    ) {
        let circuit = Circuit::new();
        let reg = circuit.add_register("r", 16).unwrap();
        circuit.set_value(reg, u64::from(initial)).unwrap();
        let writer = circuit
            .add_part_writer(PartWriter::new(reg, startbit, width).unwrap())
            .unwrap();

        circuit.set_value(writer, value).unwrap();

        let field_mask = bits::mask(width) << startbit;
        let result = circuit.value(reg).unwrap();
        prop_assert_eq!(result & !field_mask, u64::from(initial) & !field_mask);
        prop_assert_eq!((result & field_mask) >> startbit, value & bits::mask(width));
    }

    #[test]
    fn disjoint_part_writes_commute(
        (low_end, high_start) in (1u32..15).prop_flat_map(|low| (Just(low), low + 1..16)),
        initial in any::<u16>(),
        a in any::<u64>(),
        b in any::<u64>(),
    ) {
        let low = bits::mask(low_end);
        let high = bits::mask(16 - high_start);
        let gap = bits::mask(high_start - low_end) << low_end;
        let initial = u64::from(initial);

        let forward = Register::new("f", 16).unwrap();
        forward.set_value(initial);
        forward.set_part(a, 0, low);
        forward.set_part(b, high_start, high);

        let backward = Register::new("b", 16).unwrap();
        backward.set_value(initial);
        backward.set_part(b, high_start, high);
        backward.set_part(a, 0, low);

        let result = forward.get_value();
        prop_assert_eq!(result, backward.get_value());
        prop_assert_eq!(result & gap, initial & gap);
        prop_assert_eq!(result & low, a & low);
        prop_assert_eq!(result >> high_start, b & high);
    }

    #[test]
    fn valve_fires_iff_field_matches(
        (startbit, width) in field(8),
        source in any::<u8>(),
        condition in any::<u64>(),
    ) {
        let condition = condition & bits::mask(width);
        let circuit = Circuit::new();
        let reg = circuit.add_register("src", 8).unwrap();
        circuit.set_value(reg, u64::from(source)).unwrap();

        let counter = Arc::new(Counter::default());
        let sinks = [
            circuit.add_sink(width, counter.clone()).unwrap(),
            circuit.add_sink(width, counter.clone()).unwrap(),
        ];
        let valve = circuit
            .add_valve(Valve::new(reg, width, startbit, condition).unwrap(), &sinks)
            .unwrap();

        circuit.propagate(valve).unwrap();

        let selected = (u64::from(source) >> startbit) & bits::mask(width);
        let expected = if selected == condition { 2 } else { 0 };
        prop_assert_eq!(counter.0.load(Ordering::SeqCst), expected);
    }
}
