//! The circuit grid and its placement operations.

use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use crate::decompose::decompose;
use crate::error::{IrError, IrResult};
use crate::gate::{self, ClassicalCondition, GateDefinition, MEASURE};
use crate::instruction::{
    BitIndex, CregTarget, GateCell, GateId, GateInstance, GateOptions, ParamBindings,
};
use crate::register::ClassicalRegisters;
use crate::snapshot::CircuitSnapshot;

/// A quantum circuit laid out as a `wire × column` grid.
///
/// Each gate instance occupies one cell per wire in a single column. All
/// cells of an instance share a [`GateId`]; the cell's connector is the
/// wire's position in the instance's wire list. The grid is always
/// rectangular: every wire has [`Circuit::num_cols`] cells.
#[derive(Debug, Clone)]
pub struct Circuit {
    num_qubits: usize,
    params: Vec<String>,
    gates: Vec<Vec<Option<GateCell>>>,
    custom_gates: IndexMap<String, CircuitSnapshot>,
    cregs: ClassicalRegisters,
}

impl Default for Circuit {
    fn default() -> Self {
        Self::new(1)
    }
}

impl Circuit {
    /// Create an empty circuit with `num_qubits` wires.
    pub fn new(num_qubits: usize) -> Self {
        Self {
            num_qubits,
            params: vec![],
            gates: vec![Vec::new(); num_qubits],
            custom_gates: IndexMap::new(),
            cregs: ClassicalRegisters::new(),
        }
    }

    /// Build a circuit from a snapshot.
    pub fn from_snapshot(snapshot: CircuitSnapshot) -> IrResult<Self> {
        let mut circuit = Self::new(1);
        circuit.load(snapshot)?;
        Ok(circuit)
    }

    // =========================================================================
    // Introspection
    // =========================================================================

    /// Number of wires.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Number of columns.
    pub fn num_cols(&self) -> usize {
        self.gates.first().map_or(0, Vec::len)
    }

    /// Formal parameters, when this circuit is used as a custom gate body.
    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// Declare the formal parameters.
    ///
    /// `pi`, `PI`, `e` and `i` always parse as constants, so a body
    /// declaring one of them fails to decompose.
    pub fn set_params(&mut self, params: impl IntoIterator<Item = impl Into<String>>) {
        self.params = params.into_iter().map(Into::into).collect();
    }

    /// The raw grid, `gates[wire][column]`.
    pub fn gates(&self) -> &[Vec<Option<GateCell>>] {
        &self.gates
    }

    /// Registered custom gates.
    pub fn custom_gates(&self) -> &IndexMap<String, CircuitSnapshot> {
        &self.custom_gates
    }

    /// Classical registers.
    pub fn cregs(&self) -> &ClassicalRegisters {
        &self.cregs
    }

    /// The cell at `(column, wire)`.
    pub fn cell(&self, column: usize, wire: usize) -> Option<&GateCell> {
        self.gates.get(wire)?.get(column)?.as_ref()
    }

    /// Reassemble the instance occupying `(column, wire)`.
    pub fn gate_at(&self, column: usize, wire: usize) -> Option<GateInstance> {
        let cell = self.cell(column, wire)?;
        let mut wires: Vec<(usize, usize)> = (0..self.gates.len())
            .filter_map(|w| {
                self.cell(column, w)
                    .filter(|c| c.id == cell.id)
                    .map(|c| (c.connector, w))
            })
            .collect();
        wires.sort_unstable();
        Some(GateInstance {
            id: cell.id.clone(),
            name: cell.name.clone(),
            wires: wires.into_iter().map(|(_, w)| w).collect(),
            options: cell.options.clone(),
        })
    }

    /// Whether `(column, wire)` is free for a new gate.
    ///
    /// The cell must be unoccupied, no instance in the column may span
    /// across the wire, and the column must not hold a `measure` or a
    /// conditional instance.
    pub fn is_empty_cell(&self, column: usize, wire: usize) -> bool {
        if self.cell(column, wire).is_some() {
            return false;
        }

        let mut spans: FxHashMap<&GateId, (usize, usize)> = FxHashMap::default();
        for w in 0..self.gates.len() {
            let Some(cell) = self.cell(column, w) else {
                continue;
            };
            if cell.is_column_exclusive() {
                return false;
            }
            spans
                .entry(&cell.id)
                .and_modify(|(lo, hi)| {
                    *lo = (*lo).min(w);
                    *hi = (*hi).max(w);
                })
                .or_insert((w, w));
        }

        !spans.values().any(|&(lo, hi)| lo < wire && wire < hi)
    }

    /// Last column that conflicts with a gate on `wires`, scanning backwards.
    ///
    /// When `column_exclusive` is set (the gate is a `measure` or is
    /// conditional), every wire of the circuit is checked.
    pub fn last_non_empty_place(&self, wires: &[usize], column_exclusive: bool) -> Option<usize> {
        let (mut lo, mut hi) = span(wires)?;
        if column_exclusive {
            lo = 0;
            hi = hi.max(self.num_qubits.saturating_sub(1));
        }
        (0..self.num_cols())
            .rev()
            .find(|&col| (lo..=hi).any(|wire| !self.is_empty_cell(col, wire)))
    }

    /// Number of gate instances, optionally after decomposition.
    pub fn num_gates(&self, decompose: bool) -> IrResult<usize> {
        let count = |gates: &[Vec<Option<GateCell>>]| {
            gates
                .iter()
                .flatten()
                .flatten()
                .filter(|c| c.connector == 0)
                .count()
        };
        if decompose {
            Ok(count(&self.save(true)?.gates))
        } else {
            Ok(count(&self.gates))
        }
    }

    /// Distinct gate names used once all custom gates are inlined.
    pub fn used_gates(&self) -> IrResult<Vec<String>> {
        let decomposed = self.save(true)?;
        let mut seen = FxHashSet::default();
        let mut used = Vec::new();
        for cell in decomposed.gates.iter().flatten().flatten() {
            if seen.insert(cell.name.as_str()) {
                used.push(cell.name.clone());
            }
        }
        Ok(used)
    }

    /// Resolve a gate name: primitives first, then custom gates.
    pub fn gate_def(&self, name: &str) -> Option<GateDefinition<'_>> {
        gate::lookup(name)
            .map(GateDefinition::Primitive)
            .or_else(|| self.custom_gates.get(name).map(GateDefinition::Custom))
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Place a gate on `wires`.
    ///
    /// With `column == None` the gate goes one column right of the last
    /// column that conflicts with its wire range. With an explicit column,
    /// any instance in that column whose span overlaps the new gate is
    /// removed first. The grid grows as needed. If `options.creg` is set the
    /// register is created or extended to hold that bit.
    pub fn add_gate(
        &mut self,
        name: impl Into<String>,
        column: Option<usize>,
        wires: &[usize],
        options: GateOptions,
    ) -> IrResult<GateId> {
        let name = name.into();
        let (lo, hi) = span(wires).ok_or_else(|| IrError::NoWires(name.clone()))?;
        let mut seen = FxHashSet::default();
        if let Some(&wire) = wires.iter().find(|&&w| !seen.insert(w)) {
            return Err(IrError::DuplicateQubit {
                wire,
                gate_name: Some(name),
            });
        }
        if let Some(target) = &options.creg {
            self.cregs.ensure_bit(&target.name, &target.bit)?;
        }

        let exclusive = name == MEASURE || options.condition.is_some();
        let column = column.unwrap_or_else(|| {
            self.last_non_empty_place(wires, exclusive)
                .map_or(0, |c| c + 1)
        });

        self.grow(hi + 1, column + 1);
        self.evict_overlapping(column, lo, hi);

        let id = GateId::fresh();
        for (connector, &wire) in wires.iter().enumerate() {
            self.gates[wire][column] = Some(GateCell {
                id: id.clone(),
                name: name.clone(),
                connector,
                options: options.clone(),
            });
        }
        debug!(gate = %name, column, ?wires, "placed gate");
        Ok(id)
    }

    /// Place a `measure` of `wire` into `creg[bit]`.
    pub fn add_measure(
        &mut self,
        wire: usize,
        creg: impl Into<String>,
        bit: impl Into<BitIndex>,
    ) -> IrResult<GateId> {
        let options = GateOptions::default().with_creg(CregTarget::new(creg, bit));
        self.add_gate(MEASURE, None, &[wire], options)
    }

    /// Remove the instance at `(column, wire)`, returning its id.
    pub fn remove_gate(&mut self, column: usize, wire: usize) -> Option<GateId> {
        let id = self.cell(column, wire)?.id.clone();
        for row in &mut self.gates {
            if let Some(slot) = row.get_mut(column) {
                if slot.as_ref().is_some_and(|c| c.id == id) {
                    *slot = None;
                }
            }
        }
        Some(id)
    }

    /// Register (or replace) a custom gate definition.
    pub fn register_gate(&mut self, name: impl Into<String>, definition: CircuitSnapshot) {
        self.custom_gates.insert(name.into(), definition);
    }

    fn grow(&mut self, num_qubits: usize, num_cols: usize) {
        if num_qubits > self.num_qubits {
            self.num_qubits = num_qubits;
        }
        if self.gates.len() < self.num_qubits {
            self.gates.resize_with(self.num_qubits, Vec::new);
        }
        let cols = self
            .gates
            .iter()
            .map(Vec::len)
            .max()
            .unwrap_or(0)
            .max(num_cols);
        for row in &mut self.gates {
            row.resize(cols, None);
        }
    }

    fn evict_overlapping(&mut self, column: usize, lo: usize, hi: usize) {
        let mut spans: IndexMap<GateId, (usize, usize)> = IndexMap::new();
        for (w, row) in self.gates.iter().enumerate() {
            if let Some(Some(cell)) = row.get(column) {
                spans
                    .entry(cell.id.clone())
                    .and_modify(|(a, b)| {
                        *a = (*a).min(w);
                        *b = (*b).max(w);
                    })
                    .or_insert((w, w));
            }
        }
        for (id, (a, b)) in spans {
            if a <= hi && lo <= b {
                if let Some(wire) = (a..=b).find(|&w| self.cell(column, w).is_some_and(|c| c.id == id)) {
                    debug!(%id, column, "replacing overlapping gate");
                    self.remove_gate(column, wire);
                }
            }
        }
    }

    // =========================================================================
    // Classical registers
    // =========================================================================

    /// Declare a register of `len` cleared bits.
    pub fn create_creg(&mut self, name: impl Into<String>, len: usize) {
        self.cregs.create(name, len);
    }

    /// Set one register bit, growing the register as needed.
    pub fn set_creg_bit(&mut self, name: &str, bit: impl Into<BitIndex>, value: bool) -> IrResult<()> {
        self.cregs.set_bit(name, &bit.into(), value)
    }

    /// Read one register bit.
    pub fn get_creg_bit(&self, name: &str, bit: impl Into<BitIndex>) -> IrResult<bool> {
        self.cregs.get_bit(name, &bit.into())
    }

    /// Offset of a register in the concatenation of all registers.
    pub fn creg_base(&self, name: &str) -> IrResult<usize> {
        self.cregs.base(name)
    }

    /// Total classical bits.
    pub fn creg_total_bits(&self) -> usize {
        self.cregs.total_bits()
    }

    /// Integer value of a register.
    pub fn creg_value(&self, name: &str) -> IrResult<u64> {
        self.cregs.value(name)
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Structural copy of the grid and custom gates, optionally fully inlined.
    pub fn save(&self, decompose_gates: bool) -> IrResult<CircuitSnapshot> {
        let snapshot = CircuitSnapshot {
            num_qubits: self.num_qubits,
            params: self.params.clone(),
            gates: self.gates.clone(),
            custom_gates: self.custom_gates.clone(),
        };
        if decompose_gates {
            decompose(&snapshot)
        } else {
            Ok(snapshot)
        }
    }

    /// Replace this circuit's grid and custom gates with `snapshot`.
    ///
    /// Register values are cleared; registers written by `measure` cells in
    /// the snapshot are declared so conditions on them can be evaluated.
    pub fn load(&mut self, mut snapshot: CircuitSnapshot) -> IrResult<()> {
        snapshot.num_qubits = snapshot.num_qubits.max(1);
        snapshot.normalize();
        self.cregs.reset();
        for cell in snapshot.gates.iter().flatten().flatten() {
            if let Some(target) = &cell.options.creg {
                self.cregs.ensure_bit(&target.name, &target.bit)?;
            }
        }
        self.num_qubits = snapshot.num_qubits;
        self.params = snapshot.params;
        self.gates = snapshot.gates;
        self.custom_gates = snapshot.custom_gates;
        Ok(())
    }

    /// A fully inlined copy of this circuit.
    pub fn decomposed(&self) -> IrResult<Circuit> {
        let mut circuit = Circuit {
            cregs: self.cregs.clone(),
            ..Circuit::new(self.num_qubits)
        };
        circuit.load(self.save(true)?)?;
        Ok(circuit)
    }

    // =========================================================================
    // Fluent builders
    // =========================================================================

    /// Append a gate with positional parameters.
    pub fn append(
        &mut self,
        name: &str,
        wires: &[usize],
        params: ParamBindings,
    ) -> IrResult<&mut Self> {
        self.add_gate(name, None, wires, GateOptions::with_params(params))?;
        Ok(self)
    }

    /// Apply Hadamard.
    pub fn h(&mut self, wire: usize) -> IrResult<&mut Self> {
        self.append("h", &[wire], ParamBindings::default())
    }

    /// Apply Pauli-X.
    pub fn x(&mut self, wire: usize) -> IrResult<&mut Self> {
        self.append("x", &[wire], ParamBindings::default())
    }

    /// Apply CNOT.
    pub fn cx(&mut self, control: usize, target: usize) -> IrResult<&mut Self> {
        self.append("cx", &[control, target], ParamBindings::default())
    }

    /// Apply controlled phase by `lambda` radians.
    pub fn cu1(&mut self, lambda: f64, control: usize, target: usize) -> IrResult<&mut Self> {
        self.append(
            "cu1",
            &[control, target],
            ParamBindings::named([("lambda", lambda)]),
        )
    }

    /// Apply SWAP.
    pub fn swap(&mut self, a: usize, b: usize) -> IrResult<&mut Self> {
        self.append("swap", &[a, b], ParamBindings::default())
    }

    /// Measure `wire` into `creg[bit]`.
    pub fn measure(&mut self, wire: usize, creg: &str, bit: usize) -> IrResult<&mut Self> {
        self.add_measure(wire, creg, bit)?;
        Ok(self)
    }

    /// Apply `name` only when `register == value`.
    pub fn conditional(
        &mut self,
        name: &str,
        wires: &[usize],
        register: &str,
        value: u64,
    ) -> IrResult<&mut Self> {
        let options = GateOptions::default().with_condition(ClassicalCondition::new(register, value));
        self.add_gate(name, None, wires, options)?;
        Ok(self)
    }

    // =========================================================================
    // Pre-built circuits
    // =========================================================================

    /// Create a Bell state circuit.
    pub fn bell() -> IrResult<Self> {
        let mut circuit = Self::new(2);
        circuit.h(0)?.cx(0, 1)?;
        Ok(circuit)
    }

    /// Create a GHZ state circuit.
    pub fn ghz(n: usize) -> IrResult<Self> {
        let mut circuit = Self::new(n.max(1));
        if n == 0 {
            return Ok(circuit);
        }
        circuit.h(0)?;
        for i in 0..n - 1 {
            circuit.cx(i, i + 1)?;
        }
        Ok(circuit)
    }

    /// Create a QFT circuit (without measurements).
    pub fn qft(n: usize) -> IrResult<Self> {
        use std::f64::consts::PI;

        let mut circuit = Self::new(n.max(1));
        for i in 0..n {
            circuit.h(i)?;
            for j in (i + 1)..n {
                let angle = PI / f64::from(1u32 << (j - i).min(31));
                circuit.cu1(angle, j, i)?;
            }
        }
        for i in 0..n / 2 {
            circuit.swap(i, n - 1 - i)?;
        }
        Ok(circuit)
    }
}

fn span(wires: &[usize]) -> Option<(usize, usize)> {
    let lo = *wires.iter().min()?;
    let hi = *wires.iter().max()?;
    Some((lo, hi))
}
