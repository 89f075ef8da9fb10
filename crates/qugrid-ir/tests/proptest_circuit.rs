//! Property-based tests for grid placement and expression printing.

use std::collections::BTreeMap;

use proptest::prelude::*;
use qugrid_ir::{Circuit, GateId, ParameterExpression, SymbolTable};

/// Gate operations that can be applied to a circuit.
#[derive(Debug, Clone)]
enum GateOp {
    H(usize),
    X(usize),
    CX(usize, usize),
    CCX(usize, usize, usize),
    Measure(usize),
    IfX(usize, u64),
}

impl GateOp {
    fn apply(self, circuit: &mut Circuit) {
        match self {
            GateOp::H(q) => {
                let _ = circuit.h(q);
            }
            GateOp::X(q) => {
                let _ = circuit.x(q);
            }
            GateOp::CX(c, t) => {
                let _ = circuit.cx(c, t);
            }
            GateOp::CCX(a, b, t) => {
                let _ = circuit.append("ccx", &[a, b, t], Default::default());
            }
            GateOp::Measure(q) => {
                let _ = circuit.measure(q, "c", q);
            }
            GateOp::IfX(q, v) => {
                let _ = circuit.conditional("x", &[q], "c", v);
            }
        }
    }
}

fn arb_gate_op(num_qubits: usize) -> impl Strategy<Value = GateOp> {
    prop_oneof![
        (0..num_qubits).prop_map(GateOp::H),
        (0..num_qubits).prop_map(GateOp::X),
        (0..num_qubits, 0..num_qubits)
            .prop_filter("Control and target must differ", |(c, t)| c != t)
            .prop_map(|(c, t)| GateOp::CX(c, t)),
        (0..num_qubits, 0..num_qubits, 0..num_qubits)
            .prop_filter("Wires must differ", |(a, b, t)| a != b && b != t && a != t)
            .prop_map(|(a, b, t)| GateOp::CCX(a, b, t)),
        (0..num_qubits).prop_map(GateOp::Measure),
        (0..num_qubits, 0_u64..4).prop_map(|(q, v)| GateOp::IfX(q, v)),
    ]
}

/// Circuits with 3-6 qubits and 1-20 auto-placed gates.
fn arb_circuit() -> impl Strategy<Value = Circuit> {
    (3_usize..=6).prop_flat_map(|num_qubits| {
        prop::collection::vec(arb_gate_op(num_qubits), 1..=20).prop_map(move |ops| {
            let mut circuit = Circuit::new(num_qubits);
            for op in ops {
                op.apply(&mut circuit);
            }
            circuit
        })
    })
}

fn arb_expr() -> impl Strategy<Value = ParameterExpression> {
    let leaf = prop_oneof![
        (-20_i32..20).prop_map(ParameterExpression::from),
        (1_i32..8).prop_map(|n| ParameterExpression::constant(f64::from(n) / 4.0)),
        prop::sample::select(vec!["theta", "phi", "lambda"])
            .prop_map(|name| ParameterExpression::symbol(name)),
        Just(ParameterExpression::pi()),
    ];
    leaf.prop_recursive(4, 32, 2, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone()).prop_map(|(a, b)| a + b),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| a - b),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| a * b),
            inner.clone().prop_map(|a| -a),
            inner.clone().prop_map(|a| ParameterExpression::parse(&format!("cos({a})")).unwrap()),
        ]
    })
}

fn symbols() -> SymbolTable {
    let mut table = SymbolTable::default();
    table.insert("theta".into(), num_complex::Complex64::new(0.3, 0.0));
    table.insert("phi".into(), num_complex::Complex64::new(-1.1, 0.0));
    table.insert("lambda".into(), num_complex::Complex64::new(2.0, 0.0));
    table
}

proptest! {
    /// Auto-placement never puts two instances with overlapping spans in one
    /// column, and `measure`/conditional instances are alone in theirs.
    #[test]
    fn test_auto_placement_never_overlaps(circuit in arb_circuit()) {
        for col in 0..circuit.num_cols() {
            let mut spans: BTreeMap<GateId, (usize, usize, bool)> = BTreeMap::new();
            for wire in 0..circuit.num_qubits() {
                if let Some(cell) = circuit.cell(col, wire) {
                    let entry = spans
                        .entry(cell.id.clone())
                        .or_insert((wire, wire, cell.is_column_exclusive()));
                    entry.1 = wire;
                }
            }
            let spans: Vec<_> = spans.into_values().collect();
            for (i, a) in spans.iter().enumerate() {
                if a.2 {
                    prop_assert_eq!(spans.len(), 1, "exclusive gate shares column {}", col);
                }
                for b in &spans[i + 1..] {
                    prop_assert!(a.1 < b.0 || b.1 < a.0, "overlapping spans in column {}", col);
                }
            }
        }
    }

    /// Every instance's cells carry connectors 0..k-1 in one column.
    #[test]
    fn test_connectors_are_contiguous(circuit in arb_circuit()) {
        let mut seen: BTreeMap<GateId, (usize, Vec<usize>)> = BTreeMap::new();
        for wire in 0..circuit.num_qubits() {
            for col in 0..circuit.num_cols() {
                if let Some(cell) = circuit.cell(col, wire) {
                    let entry = seen.entry(cell.id.clone()).or_insert((col, vec![]));
                    prop_assert_eq!(entry.0, col);
                    entry.1.push(cell.connector);
                }
            }
        }
        for (_, (_, mut connectors)) in seen {
            connectors.sort_unstable();
            let expected: Vec<usize> = (0..connectors.len()).collect();
            prop_assert_eq!(connectors, expected);
        }
    }

    /// Snapshots survive a JSON round trip.
    #[test]
    fn test_snapshot_json_roundtrip(circuit in arb_circuit()) {
        let snapshot = circuit.save(false).unwrap();
        let json = snapshot.to_json().unwrap();
        let parsed = qugrid_ir::CircuitSnapshot::from_json(&json).unwrap();
        prop_assert_eq!(parsed, snapshot);
    }

    /// Printing is a fixpoint of parse-then-print and preserves the value.
    #[test]
    fn test_expression_print_parse(expr in arb_expr()) {
        let printed = expr.to_string();
        let reparsed = ParameterExpression::parse(&printed).unwrap();
        prop_assert_eq!(reparsed.to_string(), printed.clone());

        let table = symbols();
        let a = expr.evaluate(&table).unwrap();
        let b = reparsed.evaluate(&table).unwrap();
        prop_assert!((a - b).norm() <= 1e-9 * (1.0 + a.norm()), "{} vs {}", printed, reparsed);
    }
}
