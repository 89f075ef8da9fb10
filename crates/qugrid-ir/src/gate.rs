//! The primitive gate catalog.
//!
//! Every primitive gate carries a `2^k × 2^k` matrix template whose entries
//! are either numeric literals or expressions over the gate's formal
//! parameters. [`PrimitiveGate::matrix`] evaluates a template against the
//! parameter bindings of one gate instance.

use std::fmt;
use std::sync::LazyLock;

use indexmap::IndexMap;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};
use crate::instruction::{ParamBindings, ParamValue};
use crate::matrix::{GateMatrix, make_controlled};
use crate::parameter::{ParameterExpression, SymbolTable};
use crate::snapshot::CircuitSnapshot;

/// Name of the measurement pseudo-gate. It has no matrix.
pub const MEASURE: &str = "measure";

/// One entry of a matrix template.
#[derive(Debug, Clone, PartialEq)]
pub enum MatrixEntry {
    /// A real literal.
    Value(f64),
    /// An expression over the gate's formal parameters.
    Expr(&'static str),
}

impl MatrixEntry {
    fn evaluate(&self, symbols: &SymbolTable) -> IrResult<Complex64> {
        match self {
            MatrixEntry::Value(v) => Ok(Complex64::new(*v, 0.0)),
            MatrixEntry::Expr(source) => ParameterExpression::parse(source)?.evaluate(symbols),
        }
    }
}

impl fmt::Display for MatrixEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatrixEntry::Value(v) => write!(f, "{v}"),
            MatrixEntry::Expr(source) => write!(f, "{source}"),
        }
    }
}

const O: MatrixEntry = MatrixEntry::Value(0.0);
const I: MatrixEntry = MatrixEntry::Value(1.0);
const fn ex(source: &'static str) -> MatrixEntry {
    MatrixEntry::Expr(source)
}

/// How a wire of the gate is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Connector {
    /// Labelled box.
    Box,
    /// Control dot.
    Dot,
    /// ⊕ target.
    Not,
    /// Swap cross.
    X,
    /// Measurement gauge.
    Gauge,
}

/// A catalog entry.
#[derive(Debug, Clone)]
pub struct PrimitiveGate {
    /// Catalog key.
    pub name: &'static str,
    /// Human readable description.
    pub description: &'static str,
    /// Formal parameter names, in positional order.
    pub params: &'static [&'static str],
    /// Matrix template.
    pub template: Vec<Vec<MatrixEntry>>,
    /// Drawing connector per wire.
    pub connectors: Vec<Connector>,
    /// Drawing label.
    pub label: &'static str,
    /// Quil instruction name, where one exists.
    pub quil_name: Option<&'static str>,
}

impl PrimitiveGate {
    /// Number of wires the gate acts on.
    pub fn num_qubits(&self) -> usize {
        self.connectors.len()
    }

    /// Evaluate the matrix template for one instance's bindings.
    ///
    /// Formal parameters are bound by name when `bindings` is a map and by
    /// position when it is a list. Binding values may themselves be
    /// expressions over built-in constants.
    pub fn matrix(&self, bindings: &ParamBindings) -> IrResult<GateMatrix> {
        let mut symbols = SymbolTable::default();
        for (index, &name) in self.params.iter().enumerate() {
            let value = bindings
                .lookup(index, name)
                .ok_or_else(|| IrError::UnboundParameter(name.to_string()))?;
            symbols.insert(name.to_string(), value.evaluate()?);
        }

        let rows = self
            .template
            .iter()
            .map(|row| {
                row.iter()
                    .map(|entry| entry.evaluate(&symbols))
                    .collect::<IrResult<Vec<_>>>()
            })
            .collect::<IrResult<Vec<_>>>()?;
        GateMatrix::from_rows(&rows)
    }
}

impl ParamValue {
    /// Evaluate the binding to a complex number.
    pub fn evaluate(&self) -> IrResult<Complex64> {
        match self {
            ParamValue::Number(v) => Ok(Complex64::new(*v, 0.0)),
            ParamValue::Expr(source) => ParameterExpression::parse(source)?.evaluate_constant(),
        }
    }
}

/// A condition on a classical register, compared as an unsigned integer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassicalCondition {
    /// The name of the classical register.
    #[serde(alias = "creg")]
    pub register: String,
    /// The value to compare against.
    pub value: u64,
}

impl ClassicalCondition {
    /// Create a new classical condition.
    pub fn new(register: impl Into<String>, value: u64) -> Self {
        Self {
            register: register.into(),
            value,
        }
    }
}

/// What a gate name resolves to.
#[derive(Debug, Clone, Copy)]
pub enum GateDefinition<'a> {
    /// An entry of the primitive catalog.
    Primitive(&'static PrimitiveGate),
    /// A custom gate registered on a circuit.
    Custom(&'a CircuitSnapshot),
}

impl GateDefinition<'_> {
    /// Formal parameter names.
    pub fn params(&self) -> Vec<&str> {
        match self {
            GateDefinition::Primitive(gate) => gate.params.to_vec(),
            GateDefinition::Custom(def) => def.params.iter().map(String::as_str).collect(),
        }
    }

    /// Number of wires the gate acts on.
    pub fn num_qubits(&self) -> usize {
        match self {
            GateDefinition::Primitive(gate) => gate.num_qubits(),
            GateDefinition::Custom(def) => def.num_qubits,
        }
    }
}

/// Look up a primitive gate by name.
pub fn lookup(name: &str) -> Option<&'static PrimitiveGate> {
    CATALOG.get(name)
}

/// Whether `name` needs no decomposition: a catalog entry or `measure`.
pub fn is_primitive(name: &str) -> bool {
    name == MEASURE || CATALOG.contains_key(name)
}

/// All primitive gates in catalog order.
pub fn catalog() -> impl Iterator<Item = &'static PrimitiveGate> {
    CATALOG.values()
}

static CATALOG: LazyLock<IndexMap<&'static str, PrimitiveGate>> = LazyLock::new(|| {
    build_catalog()
        .into_iter()
        .map(|gate| (gate.name, gate))
        .collect()
});

struct Header {
    name: &'static str,
    description: &'static str,
    params: &'static [&'static str],
    label: &'static str,
    quil_name: Option<&'static str>,
}

fn single(header: Header, template: Vec<Vec<MatrixEntry>>) -> PrimitiveGate {
    gate(header, template, vec![Connector::Box])
}

fn gate(header: Header, template: Vec<Vec<MatrixEntry>>, connectors: Vec<Connector>) -> PrimitiveGate {
    PrimitiveGate {
        name: header.name,
        description: header.description,
        params: header.params,
        template,
        connectors,
        label: header.label,
        quil_name: header.quil_name,
    }
}

fn controlled(header: Header, base: &PrimitiveGate) -> PrimitiveGate {
    let mut connectors = vec![Connector::Dot];
    connectors.extend(&base.connectors);
    gate(header, make_controlled(&base.template, &O, &I), connectors)
}

const fn header(
    name: &'static str,
    description: &'static str,
    params: &'static [&'static str],
    label: &'static str,
    quil_name: Option<&'static str>,
) -> Header {
    Header {
        name,
        description,
        params,
        label,
        quil_name,
    }
}

#[allow(clippy::too_many_lines)]
fn build_catalog() -> Vec<PrimitiveGate> {
    let id = single(
        header("id", "Single qubit identity gate", &[], "...", Some("I")),
        vec![vec![I, O], vec![O, I]],
    );
    let x = gate(
        header("x", "Pauli X (PI rotation over X-axis) aka \"NOT\" gate", &[], "X", Some("X")),
        vec![vec![O, I], vec![I, O]],
        vec![Connector::Not],
    );
    let y = single(
        header("y", "Pauli Y (PI rotation over Y-axis)", &[], "Y", Some("Y")),
        vec![vec![O, ex("-i")], vec![ex("i"), O]],
    );
    let z = single(
        header("z", "Pauli Z (PI rotation over Z-axis)", &[], "Z", Some("Z")),
        vec![vec![I, O], vec![O, MatrixEntry::Value(-1.0)]],
    );
    let h = single(
        header("h", "Hadamard gate", &[], "H", Some("H")),
        vec![
            vec![ex("1/sqrt(2)"), ex("1/sqrt(2)")],
            vec![ex("1/sqrt(2)"), ex("-1/sqrt(2)")],
        ],
    );
    let srn = single(
        header("srn", "Square root of NOT", &[], "", None),
        vec![
            vec![ex("(1+i)/2"), ex("(1-i)/2")],
            vec![ex("(1-i)/2"), ex("(1+i)/2")],
        ],
    );
    let r2 = single(
        header("r2", "PI/2 rotation over Z-axis aka \"Phase PI/2\"", &[], "R2", Some("S")),
        vec![vec![I, O], vec![O, ex("exp(i*pi/2)")]],
    );
    let r4 = single(
        header("r4", "PI/4 rotation over Z-axis aka \"Phase PI/4\"", &[], "R4", Some("T")),
        vec![vec![I, O], vec![O, ex("exp(i*pi/4)")]],
    );
    let r8 = single(
        header("r8", "PI/8 rotation over Z-axis aka \"Phase PI/8\"", &[], "R8", Some("RZ")),
        vec![vec![I, O], vec![O, ex("exp(i*pi/8)")]],
    );
    let rx = single(
        header("rx", "Rotation around the X-axis by given angle", &["theta"], "RX", Some("RX")),
        vec![
            vec![ex("cos(theta/2)"), ex("-i*sin(theta/2)")],
            vec![ex("-i*sin(theta/2)"), ex("cos(theta/2)")],
        ],
    );
    let ry = single(
        header("ry", "Rotation around the Y-axis by given angle", &["theta"], "RY", Some("RY")),
        vec![
            vec![ex("cos(theta/2)"), ex("-sin(theta/2)")],
            vec![ex("sin(theta/2)"), ex("cos(theta/2)")],
        ],
    );
    let rz = single(
        header("rz", "Rotation around the Z-axis by given angle", &["phi"], "RZ", Some("RZ")),
        vec![vec![I, O], vec![O, ex("exp(i*phi)")]],
    );
    let u1 = single(
        header("u1", "1-parameter 0-pulse single qubit gate", &["lambda"], "U1", Some("PHASE")),
        vec![vec![I, O], vec![O, ex("exp(i*lambda)")]],
    );
    let u2 = single(
        header("u2", "2-parameter 1-pulse single qubit gate", &["phi", "lambda"], "U2", None),
        vec![
            vec![ex("1/sqrt(2)"), ex("-exp(i*lambda)/sqrt(2)")],
            vec![ex("exp(i*phi)/sqrt(2)"), ex("exp(i*lambda+i*phi)/sqrt(2)")],
        ],
    );
    let u3 = single(
        header(
            "u3",
            "3-parameter 2-pulse single qubit gate",
            &["theta", "phi", "lambda"],
            "U3",
            None,
        ),
        vec![
            vec![ex("cos(theta/2)"), ex("-exp(i*lambda)*sin(theta/2)")],
            vec![
                ex("exp(i*phi)*sin(theta/2)"),
                ex("exp(i*lambda+i*phi)*cos(theta/2)"),
            ],
        ],
    );
    let s = single(
        header("s", "PI/2 rotation over Z-axis (synonym for `r2`)", &[], "S", Some("S")),
        r2.template.clone(),
    );
    let t = single(
        header("t", "PI/4 rotation over Z-axis (synonym for `r4`)", &[], "T", Some("T")),
        r4.template.clone(),
    );
    let sdg = single(
        header("sdg", "(-PI/2) rotation over Z-axis", &[], "-S", Some("RZ")),
        vec![vec![I, O], vec![O, ex("exp(-i*pi/2)")]],
    );
    let tdg = single(
        header("tdg", "(-PI/4) rotation over Z-axis", &[], "-T", Some("RZ")),
        vec![vec![I, O], vec![O, ex("exp(-i*pi/4)")]],
    );
    let swap = gate(
        header("swap", "Swaps the state of two qubits.", &[], "", Some("SWAP")),
        vec![
            vec![I, O, O, O],
            vec![O, O, I, O],
            vec![O, I, O, O],
            vec![O, O, O, I],
        ],
        vec![Connector::X, Connector::X],
    );
    let srswap = gate(
        header("srswap", "Square root of swap", &[], "", None),
        vec![
            vec![I, O, O, O],
            vec![O, ex("(1+i)/2"), ex("(1-i)/2"), O],
            vec![O, ex("(1-i)/2"), ex("(1+i)/2"), O],
            vec![O, O, O, I],
        ],
        vec![Connector::Box, Connector::Box],
    );

    let cx = controlled(
        header(
            "cx",
            "Controlled Pauli X (PI rotation over X-axis) aka \"CNOT\" gate",
            &[],
            "X",
            Some("CNOT"),
        ),
        &x,
    );
    let mut gates = vec![
        controlled(
            header("cy", "Controlled Pauli Y (PI rotation over Y-axis)", &[], "Y", None),
            &y,
        ),
        controlled(
            header("cz", "Controlled Pauli Z (PI rotation over Z-axis)", &[], "Z", Some("CZ")),
            &z,
        ),
        controlled(header("ch", "Controlled Hadamard gate", &[], "H", None), &h),
        controlled(
            header("csrn", "Controlled square root of NOT", &[], "", None),
            &srn,
        ),
        controlled(
            header("cr2", "Controlled PI/2 rotation over Z-axis", &[], "R2", Some("CPHASE")),
            &r2,
        ),
        controlled(
            header("cr4", "Controlled PI/4 rotation over Z-axis", &[], "R4", Some("CPHASE")),
            &r4,
        ),
        controlled(
            header("cr8", "Controlled PI/8 rotation over Z-axis", &[], "R8", Some("CPHASE")),
            &r8,
        ),
        controlled(
            header(
                "crx",
                "Controlled rotation around the X-axis by given angle",
                &["theta"],
                "RX",
                None,
            ),
            &rx,
        ),
        controlled(
            header(
                "cry",
                "Controlled rotation around the Y-axis by given angle",
                &["theta"],
                "RY",
                None,
            ),
            &ry,
        ),
        controlled(
            header(
                "crz",
                "Controlled rotation around the Z-axis by given angle",
                &["phi"],
                "RZ",
                Some("CPHASE"),
            ),
            &rz,
        ),
        controlled(
            header(
                "cu1",
                "Controlled 1-parameter 0-pulse single qubit gate",
                &["lambda"],
                "CU1",
                Some("CPHASE"),
            ),
            &u1,
        ),
        controlled(
            header(
                "cu2",
                "Controlled 2-parameter 1-pulse single qubit gate",
                &["phi", "lambda"],
                "CU2",
                None,
            ),
            &u2,
        ),
        controlled(
            header(
                "cu3",
                "Controlled 3-parameter 2-pulse single qubit gate",
                &["theta", "phi", "lambda"],
                "CU3",
                None,
            ),
            &u3,
        ),
        controlled(
            header(
                "cs",
                "Controlled PI/2 rotation over Z-axis (synonym for `cr2`)",
                &[],
                "S",
                Some("CPHASE"),
            ),
            &s,
        ),
        controlled(
            header(
                "ct",
                "Controlled PI/4 rotation over Z-axis (synonym for `cr4`)",
                &[],
                "T",
                Some("CPHASE"),
            ),
            &t,
        ),
        controlled(
            header("csdg", "Controlled (-PI/2) rotation over Z-axis", &[], "-S", Some("CPHASE")),
            &sdg,
        ),
        controlled(
            header("ctdg", "Controlled (-PI/4) rotation over Z-axis", &[], "-T", Some("CPHASE")),
            &tdg,
        ),
        controlled(
            header("ccx", "Toffoli aka \"CCNOT\" gate", &[], "CCNOT", Some("CCNOT")),
            &cx,
        ),
        controlled(
            header("cswap", "Controlled swap aka \"Fredkin\" gate", &[], "", Some("CSWAP")),
            &swap,
        ),
        controlled(
            header("csrswap", "Controlled square root of swap", &[], "", None),
            &srswap,
        ),
    ];

    let mut catalog = vec![
        id, x, y, z, h, srn, r2, r4, r8, rx, ry, rz, u1, u2, u3, s, t, sdg, tdg, swap, srswap, cx,
    ];
    catalog.append(&mut gates);
    catalog
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn no_params() -> ParamBindings {
        ParamBindings::default()
    }

    #[test]
    fn test_catalog_contents() {
        let names: Vec<_> = catalog().map(|g| g.name).collect();
        assert_eq!(names.len(), 42);
        for name in ["id", "x", "h", "cx", "ccx", "cswap", "csrswap", "u3", "cu3"] {
            assert!(names.contains(&name), "missing {name}");
        }
        assert!(is_primitive(MEASURE));
        assert!(lookup(MEASURE).is_none());
        assert!(!is_primitive("bell"));
    }

    #[test]
    fn test_templates_match_wire_count() {
        for gate in catalog() {
            assert_eq!(gate.template.len(), 1 << gate.num_qubits(), "{}", gate.name);
            assert!(gate.template.iter().all(|row| row.len() == gate.template.len()));
        }
    }

    #[test]
    fn test_parameterless_gates_are_unitary() {
        for gate in catalog().filter(|g| g.params.is_empty()) {
            let m = gate.matrix(&no_params()).unwrap();
            assert!(m.is_unitary(1e-10), "{} is not unitary", gate.name);
        }
    }

    #[test]
    fn test_parametric_gates_are_unitary() {
        let bindings = ParamBindings::Positional(vec![
            ParamValue::Number(0.7),
            ParamValue::Expr("pi/3".into()),
            ParamValue::Number(-1.2),
        ]);
        for gate in catalog().filter(|g| !g.params.is_empty()) {
            let m = gate.matrix(&bindings).unwrap();
            assert!(m.is_unitary(1e-10), "{} is not unitary", gate.name);
        }
    }

    #[test]
    fn test_named_bindings() {
        let rx = lookup("rx").unwrap();
        let m = rx
            .matrix(&ParamBindings::named([("theta", ParamValue::Number(PI))]))
            .unwrap();
        assert!(m.get(0, 0).norm() < 1e-12);
        assert!((m.get(0, 1) - Complex64::new(0.0, -1.0)).norm() < 1e-12);
    }

    #[test]
    fn test_missing_binding() {
        let rz = lookup("rz").unwrap();
        assert!(matches!(
            rz.matrix(&no_params()),
            Err(IrError::UnboundParameter(name)) if name == "phi"
        ));
    }

    #[test]
    fn test_controlled_layout() {
        let cx = lookup("cx").unwrap();
        assert_eq!(cx.connectors, vec![Connector::Dot, Connector::Not]);
        let ccx = lookup("ccx").unwrap();
        assert_eq!(
            ccx.connectors,
            vec![Connector::Dot, Connector::Dot, Connector::Not]
        );
        let m = ccx.matrix(&no_params()).unwrap();
        assert_eq!(m.get(6, 7), Complex64::new(1.0, 0.0));
        assert_eq!(m.get(7, 6), Complex64::new(1.0, 0.0));
        assert_eq!(m.get(5, 5), Complex64::new(1.0, 0.0));
    }

    #[test]
    fn test_hadamard_squares_to_identity() {
        let h = lookup("h").unwrap().matrix(&no_params()).unwrap();
        assert!(h.mul(&h).unwrap().approx_eq(&GateMatrix::identity(2), 1e-12));
    }
}
