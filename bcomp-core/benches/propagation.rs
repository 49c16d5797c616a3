//! Propagation throughput for deep chains and wide fan-out.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use bcomp_core::gates::{Control, PartWriter, Valve};
use bcomp_core::Circuit;

fn deep_chain(c: &mut Criterion) {
    let circuit = Circuit::new();
    let leaf = circuit.add_register("leaf", 1).unwrap();
    let mut head = leaf;
    for _ in 0..128 {
        head = circuit
            .add_control(Control::new(1, 1, 0).unwrap(), &[head])
            .unwrap();
    }

    c.bench_function("deep_chain_128", |b| {
        b.iter(|| circuit.set_value(black_box(head), black_box(1)).unwrap())
    });
}

fn wide_fan_out(c: &mut Criterion) {
    let circuit = Circuit::new();
    let flag = circuit.add_register("flag", 1).unwrap();
    circuit.set_value(flag, 1).unwrap();

    let writers: Vec<_> = (0..64)
        .map(|i| {
            let word = circuit.add_register(&format!("word{i}"), 64).unwrap();
            circuit
                .add_part_writer(PartWriter::new(word, i, 1).unwrap())
                .unwrap()
        })
        .collect();
    let valve = circuit
        .add_valve(Valve::new(flag, 1, 0, 1).unwrap(), &writers)
        .unwrap();

    c.bench_function("fan_out_64", |b| {
        b.iter(|| circuit.propagate(black_box(valve)).unwrap())
    });
}

criterion_group!(benches, deep_chain, wide_fan_out);
criterion_main!(benches);
