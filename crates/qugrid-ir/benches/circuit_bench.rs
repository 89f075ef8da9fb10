//! Benchmarks for qugrid circuit operations
//!
//! Run with: cargo bench -p qugrid-ir

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use qugrid_ir::{Circuit, GateOptions, ParamBindings, ParameterExpression, decompose};

/// Benchmark auto-placement of gates
fn bench_gate_placement(c: &mut Criterion) {
    let mut group = c.benchmark_group("gate_placement");

    for num_qubits in &[5, 10, 20] {
        group.bench_with_input(
            BenchmarkId::new("layers", num_qubits),
            num_qubits,
            |b, &n| {
                b.iter(|| {
                    let mut circuit = Circuit::new(n);
                    for _layer in 0..5 {
                        for i in 0..n {
                            circuit.h(black_box(i)).unwrap();
                        }
                        for i in (0..n - 1).step_by(2) {
                            circuit.cx(black_box(i), black_box(i + 1)).unwrap();
                        }
                    }
                    black_box(circuit)
                });
            },
        );
    }

    group.finish();
}

/// Benchmark GHZ state circuit creation
fn bench_ghz_circuit(c: &mut Criterion) {
    let mut group = c.benchmark_group("ghz_circuit");

    for num_qubits in &[3, 5, 10, 20, 50] {
        group.bench_with_input(
            BenchmarkId::new("create", num_qubits),
            num_qubits,
            |b, &n| {
                b.iter(|| black_box(Circuit::ghz(n).unwrap()));
            },
        );
    }

    group.finish();
}

/// Benchmark inlining of a parametric custom gate
fn bench_decompose(c: &mut Criterion) {
    let mut group = c.benchmark_group("decompose");

    let mut body = Circuit::new(2);
    body.set_params(["theta"]);
    body.append("ry", &[0], ParamBindings::named([("theta", "theta/2")]))
        .unwrap();
    body.cx(0, 1).unwrap();
    body.append("rz", &[1], ParamBindings::named([("phi", "-theta")]))
        .unwrap();
    let body = body.save(false).unwrap();

    for num_qubits in &[4, 8, 16] {
        let mut circuit = Circuit::new(*num_qubits);
        circuit.register_gate("entangle", body.clone());
        for i in 0..num_qubits - 1 {
            let params = ParamBindings::named([("theta", format!("pi/{}", i + 2))]);
            circuit
                .add_gate("entangle", None, &[i, i + 1], GateOptions::with_params(params))
                .unwrap();
        }
        let snapshot = circuit.save(false).unwrap();

        group.bench_with_input(
            BenchmarkId::new("inline", num_qubits),
            &snapshot,
            |b, snapshot| {
                b.iter(|| black_box(decompose(snapshot).unwrap()));
            },
        );
    }

    group.finish();
}

/// Benchmark expression parsing and evaluation
fn bench_expressions(c: &mut Criterion) {
    let mut group = c.benchmark_group("expressions");

    group.bench_function("parse", |b| {
        b.iter(|| {
            ParameterExpression::parse(black_box("exp(i*lambda+i*phi)*cos(theta/2)")).unwrap()
        });
    });

    let expr = ParameterExpression::parse("exp(i*pi/4)/sqrt(2)").unwrap();
    group.bench_function("evaluate", |b| {
        b.iter(|| black_box(expr.evaluate_constant().unwrap()));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_gate_placement,
    bench_ghz_circuit,
    bench_decompose,
    bench_expressions,
);

criterion_main!(benches);
