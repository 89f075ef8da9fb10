//! qugrid Circuit Intermediate Representation
//!
//! This crate holds everything about a circuit that is not simulation: the
//! `wire × column` grid, the primitive gate catalog, parameter expressions,
//! classical registers and custom-gate decomposition.
//!
//! # Overview
//!
//! A [`Circuit`] is a grid of optional [`GateCell`]s indexed as
//! `gates[wire][column]`. A gate instance spanning several wires occupies
//! one cell per wire in a single column; the cells share a [`GateId`] and
//! carry their position in the instance's wire list as a connector.
//!
//! Custom gates are themselves circuits ([`CircuitSnapshot`]) with a list
//! of formal parameter names. [`decompose`] inlines them recursively,
//! substituting actual parameter expressions for the formals.
//!
//! # Core Components
//!
//! - **Circuit**: [`Circuit`] grid with placement, registers and persistence
//! - **Catalog**: [`PrimitiveGate`] entries with symbolic matrix templates
//! - **Parameters**: [`ParameterExpression`] parsing, evaluation and substitution
//! - **Registers**: [`ClassicalRegisters`] in declaration order
//! - **Decomposition**: [`decompose`] for custom-gate inlining
//!
//! # Example: Building a Bell State
//!
//! ```rust
//! use qugrid_ir::Circuit;
//!
//! let mut circuit = Circuit::new(2);
//! circuit.h(0).unwrap().cx(0, 1).unwrap();
//! circuit.measure(0, "c", 0).unwrap();
//!
//! assert_eq!(circuit.num_qubits(), 2);
//! assert_eq!(circuit.num_cols(), 3);
//! assert_eq!(circuit.creg_total_bits(), 1);
//! ```
//!
//! # Example: Parametric Custom Gate
//!
//! ```rust
//! use qugrid_ir::{Circuit, GateOptions, ParamBindings};
//!
//! let mut body = Circuit::new(1);
//! body.set_params(["theta"]);
//! body.append("rx", &[0], ParamBindings::named([("theta", "theta")])).unwrap();
//!
//! let mut circuit = Circuit::new(1);
//! circuit.register_gate("half_turn", body.save(false).unwrap());
//! let options = GateOptions::with_params(ParamBindings::named([("theta", "pi/2")]));
//! circuit.add_gate("half_turn", None, &[0], options).unwrap();
//!
//! let flat = circuit.save(true).unwrap();
//! let cell = flat.cell(0, 0).unwrap();
//! assert_eq!(cell.name, "rx");
//! assert_eq!(cell.options.params.lookup(0, "theta").unwrap().to_string(), "(pi/2)");
//! ```

pub mod circuit;
pub mod decompose;
pub mod error;
pub mod gate;
pub mod instruction;
pub mod matrix;
pub mod parameter;
pub mod register;
pub mod snapshot;

pub use circuit::Circuit;
pub use decompose::decompose;
pub use error::{IrError, IrResult};
pub use gate::{
    ClassicalCondition, Connector, GateDefinition, MEASURE, MatrixEntry, PrimitiveGate,
};
pub use instruction::{
    BitIndex, CregTarget, GateCell, GateId, GateInstance, GateOptions, ParamBindings, ParamValue,
};
pub use matrix::{GateMatrix, format_complex, make_controlled, round_to};
pub use parameter::{Function, ParameterExpression, SymbolTable};
pub use register::ClassicalRegisters;
pub use snapshot::CircuitSnapshot;
