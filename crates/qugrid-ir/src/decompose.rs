//! Inlining of custom gates.
//!
//! Every instance of a custom gate is replaced by the columns of its body.
//! Formal parameters in the body are first replaced by the instance's actual
//! expressions, then the body is itself decomposed, then its columns are
//! spliced into the parent grid at the instance's column. Wires the instance
//! does not touch are padded with empty cells for the inserted width.

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use crate::error::{IrError, IrResult};
use crate::gate::is_primitive;
use crate::instruction::{GateCell, GateId, ParamBindings, ParamValue};
use crate::parameter::ParameterExpression;
use crate::snapshot::CircuitSnapshot;

type Catalog = IndexMap<String, CircuitSnapshot>;

/// Return a copy of `snapshot` containing only primitive gates.
///
/// The result has an empty custom-gate catalog. Names that are neither
/// primitive nor defined in any enclosing catalog are left in place.
pub fn decompose(snapshot: &CircuitSnapshot) -> IrResult<CircuitSnapshot> {
    let mut expanding = Vec::new();
    let out = expand(snapshot, &[], &mut expanding)?;
    debug!(
        qubits = out.num_qubits,
        columns = out.num_cols(),
        "decomposed circuit"
    );
    Ok(out)
}

fn expand(
    circuit: &CircuitSnapshot,
    outer: &[&Catalog],
    expanding: &mut Vec<String>,
) -> IrResult<CircuitSnapshot> {
    let scopes: Vec<&Catalog> = std::iter::once(&circuit.custom_gates)
        .chain(outer.iter().copied())
        .collect();

    let mut out = CircuitSnapshot {
        num_qubits: circuit.num_qubits,
        params: circuit.params.clone(),
        gates: circuit.gates.clone(),
        custom_gates: IndexMap::new(),
    };
    out.normalize();

    let mut column = 0;
    while column < out.num_cols() {
        for wire in 0..out.gates.len() {
            let Some(cell) = out.gates[wire][column].as_ref() else {
                continue;
            };
            if cell.connector != 0 || is_primitive(&cell.name) {
                continue;
            }
            let Some(definition) = scopes.iter().find_map(|s| s.get(&cell.name)) else {
                warn!(gate = %cell.name, column, wire, "no definition for gate, leaving it in place");
                continue;
            };
            let cell = cell.clone();

            if expanding.contains(&cell.name) {
                return Err(IrError::RecursiveGate(cell.name));
            }
            if let Some(param) = definition
                .params
                .iter()
                .find(|p| ParameterExpression::is_reserved_name(p))
            {
                return Err(IrError::ReservedParameter {
                    gate_name: cell.name,
                    param: param.clone(),
                });
            }
            let mut body = definition.clone();
            body.normalize();
            substitute_params(&mut body, &cell.options.params)?;

            expanding.push(cell.name.clone());
            let body = expand(&body, &scopes, expanding)?;
            expanding.pop();

            splice(&mut out, column, &cell, &body)?;
        }
        column += 1;
    }

    Ok(out)
}

/// Replace the body's formal parameters by the instance's actuals.
fn substitute_params(body: &mut CircuitSnapshot, actuals: &ParamBindings) -> IrResult<()> {
    if body.params.is_empty() || actuals.is_empty() {
        return Ok(());
    }

    let mut replacements = FxHashMap::default();
    for (index, formal) in body.params.iter().enumerate() {
        let Some(actual) = actuals.lookup(index, formal) else {
            continue;
        };
        let expr = match actual {
            ParamValue::Number(v) => ParameterExpression::Constant(*v),
            ParamValue::Expr(source) => ParameterExpression::parse(source)?,
        };
        replacements.insert(formal.clone(), expr);
    }
    if replacements.is_empty() {
        return Ok(());
    }

    for cell in body.gates.iter_mut().flatten().flatten() {
        for value in cell.options.params.values_mut() {
            if let ParamValue::Expr(source) = value {
                let substituted = ParameterExpression::parse(source)?.substitute(&replacements);
                *source = substituted.to_string();
            }
        }
    }
    Ok(())
}

/// Splice `body` over the instance at `column`.
fn splice(
    out: &mut CircuitSnapshot,
    column: usize,
    instance: &GateCell,
    body: &CircuitSnapshot,
) -> IrResult<()> {
    let width = body.num_cols().max(1);
    let connectors: Vec<Option<usize>> = out
        .gates
        .iter()
        .map(|row| {
            row[column]
                .as_ref()
                .filter(|c| c.id == instance.id)
                .map(|c| c.connector)
        })
        .collect();

    let num_wires = connectors.iter().flatten().count();
    if let Some(row) = body
        .gates
        .iter()
        .skip(num_wires)
        .position(|row| row.iter().any(Option::is_some))
    {
        return Err(IrError::QubitCountMismatch {
            gate_name: instance.name.clone(),
            expected: num_wires + row + 1,
            got: num_wires,
        });
    }

    let mut fresh_ids: FxHashMap<GateId, GateId> = FxHashMap::default();
    for (row, connector) in out.gates.iter_mut().zip(connectors) {
        match connector {
            Some(connector) => {
                let mut inserted = body.gates.get(connector).cloned().unwrap_or_default();
                inserted.resize(width, None);
                for cell in inserted.iter_mut().flatten() {
                    cell.id = fresh_ids
                        .entry(cell.id.clone())
                        .or_insert_with(GateId::fresh)
                        .clone();
                    if cell.options.condition.is_none() {
                        cell.options.condition.clone_from(&instance.options.condition);
                    }
                }
                row.splice(column..=column, inserted);
            }
            None => {
                row.splice(column + 1..column + 1, std::iter::repeat_n(None, width - 1));
            }
        }
    }
    Ok(())
}
