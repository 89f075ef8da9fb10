//! Serializable circuit snapshots.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::IrResult;
use crate::instruction::GateCell;

/// A structural copy of a circuit: its grid and custom-gate catalog.
///
/// Custom gate definitions are themselves snapshots; their `params` list the
/// formal parameter names in positional order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CircuitSnapshot {
    /// Number of wires.
    pub num_qubits: usize,
    /// Formal parameters, when used as a custom gate definition.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<String>,
    /// `gates[wire][column]`.
    #[serde(default)]
    pub gates: Vec<Vec<Option<GateCell>>>,
    /// Nested custom gate definitions.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub custom_gates: IndexMap<String, CircuitSnapshot>,
}

impl CircuitSnapshot {
    /// Number of columns: the longest wire.
    pub fn num_cols(&self) -> usize {
        self.gates.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Cell at `(column, wire)`.
    pub fn cell(&self, column: usize, wire: usize) -> Option<&GateCell> {
        self.gates.get(wire)?.get(column)?.as_ref()
    }

    /// Pad every wire to `num_qubits` rows of `num_cols` cells.
    pub fn normalize(&mut self) {
        if self.gates.len() < self.num_qubits {
            self.gates.resize_with(self.num_qubits, Vec::new);
        }
        self.num_qubits = self.gates.len();
        let cols = self.num_cols();
        for row in &mut self.gates {
            row.resize(cols, None);
        }
    }

    /// Parse from JSON.
    pub fn from_json(json: &str) -> IrResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> IrResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::{GateId, GateOptions};

    #[test]
    fn test_field_names() {
        let json = r#"{
            "numQubits": 2,
            "gates": [[{"id": "a", "name": "h", "connector": 0}], [null]],
            "customGates": {
                "bell": {"numQubits": 2, "params": ["theta"], "gates": [[], []]}
            }
        }"#;
        let snap = CircuitSnapshot::from_json(json).unwrap();
        assert_eq!(snap.num_qubits, 2);
        assert_eq!(snap.num_cols(), 1);
        assert_eq!(snap.cell(0, 0).map(|c| c.name.as_str()), Some("h"));
        assert!(snap.cell(0, 1).is_none());
        assert_eq!(snap.custom_gates["bell"].params, vec!["theta".to_string()]);

        let out = snap.to_json().unwrap();
        assert!(out.contains("\"numQubits\""));
        assert!(out.contains("\"customGates\""));
    }

    #[test]
    fn test_normalize_pads_rows() {
        let mut snap = CircuitSnapshot {
            num_qubits: 3,
            gates: vec![vec![
                None,
                Some(GateCell {
                    id: GateId("a".into()),
                    name: "x".into(),
                    connector: 0,
                    options: GateOptions::default(),
                }),
            ]],
            ..CircuitSnapshot::default()
        };
        snap.normalize();
        assert_eq!(snap.gates.len(), 3);
        assert!(snap.gates.iter().all(|row| row.len() == 2));
    }
}
