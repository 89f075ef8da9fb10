//! Sparse state-vector storage and the gate transform kernel.

use num_complex::Complex64;
use rustc_hash::FxHashMap;

use qugrid_ir::GateMatrix;

/// Widest state the `u64` basis index can address.
pub const MAX_STATE_QUBITS: usize = 63;

/// A quantum state stored as a map from basis index to amplitude.
///
/// Only populated amplitudes are stored. Wire `w` of an `n`-qubit state
/// is bit `n - 1 - w` of the basis index, so wire 0 is the most
/// significant bit of the printed bitstring.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseState {
    amplitudes: FxHashMap<u64, Complex64>,
    /// Union of every populated index.
    bits: u64,
    num_qubits: usize,
}

impl SparseState {
    /// Create `|0...0⟩` on `num_qubits` wires.
    pub fn new(num_qubits: usize) -> Self {
        let mut amplitudes = FxHashMap::default();
        amplitudes.insert(0, Complex64::new(1.0, 0.0));
        Self {
            amplitudes,
            bits: 0,
            num_qubits,
        }
    }

    /// Create a state with no populated amplitude.
    pub fn empty(num_qubits: usize) -> Self {
        Self {
            amplitudes: FxHashMap::default(),
            bits: 0,
            num_qubits,
        }
    }

    /// Number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Number of populated amplitudes.
    pub fn len(&self) -> usize {
        self.amplitudes.len()
    }

    /// Whether no amplitude is populated.
    pub fn is_empty(&self) -> bool {
        self.amplitudes.is_empty()
    }

    /// OR of all populated indices.
    pub fn bits(&self) -> u64 {
        self.bits
    }

    /// Amplitude of `index`, zero when unpopulated.
    pub fn amplitude(&self, index: u64) -> Complex64 {
        self.amplitudes
            .get(&index)
            .copied()
            .unwrap_or_else(|| Complex64::new(0.0, 0.0))
    }

    /// Populated amplitudes in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (u64, Complex64)> + '_ {
        self.amplitudes.iter().map(|(&i, &a)| (i, a))
    }

    /// Populated amplitudes by ascending index.
    pub fn sorted(&self) -> Vec<(u64, Complex64)> {
        let mut entries: Vec<_> = self.iter().collect();
        entries.sort_unstable_by_key(|(i, _)| *i);
        entries
    }

    /// Basis-index bit for `wire`.
    pub fn wire_bit(&self, wire: usize) -> u64 {
        1u64 << (self.num_qubits - 1 - wire)
    }

    /// Sum of `|a|²` over all populated amplitudes.
    pub fn total_probability(&self) -> f64 {
        self.amplitudes.values().map(Complex64::norm_sqr).sum()
    }

    /// Overwrite one amplitude.
    pub fn set(&mut self, index: u64, amplitude: Complex64) {
        self.amplitudes.insert(index, amplitude);
        self.bits |= index;
    }

    /// Apply `matrix` to `wires`.
    ///
    /// The first wire is the most significant bit of the matrix index.
    /// Callers guarantee `matrix.dim() == 2^wires.len()`, and that the
    /// wires are distinct and in range.
    ///
    /// Only bases that carry a populated amplitude are visited, so the cost
    /// follows [`len`](Self::len) rather than the width of [`bits`](Self::bits).
    /// Amplitudes whose norm ends below `prune_threshold` are dropped.
    pub fn apply_transform(&mut self, matrix: &GateMatrix, wires: &[usize], prune_threshold: f64) {
        // Matrix index bit k maps to the state bit of wires[len - 1 - k].
        let targets: Vec<u64> = wires.iter().rev().map(|&w| self.wire_bit(w)).collect();
        let target_mask = targets.iter().fold(0u64, |acc, b| acc | b);

        let one = Complex64::new(1.0, 0.0);
        let entries: Vec<(u64, u64, Complex64)> = matrix
            .nonzero_entries()
            .map(|(row, col, value)| {
                let (mut row_or, mut col_or) = (0u64, 0u64);
                for (k, &bit) in targets.iter().enumerate() {
                    if (row >> k) & 1 == 1 {
                        row_or |= bit;
                    }
                    if (col >> k) & 1 == 1 {
                        col_or |= bit;
                    }
                }
                (row_or, col_or, value)
            })
            .collect();

        let mut next: FxHashMap<u64, Complex64> = FxHashMap::default();
        let mut next_bits = 0u64;

        let mut bases: Vec<u64> = self.amplitudes.keys().map(|i| i & !target_mask).collect();
        bases.sort_unstable();
        bases.dedup();

        for base in bases {
            for &(row_or, col_or, value) in &entries {
                let Some(&amplitude) = self.amplitudes.get(&(base | col_or)) else {
                    continue;
                };
                let i = base | row_or;
                let term = if value == one {
                    amplitude
                } else {
                    value * amplitude
                };
                *next.entry(i).or_insert_with(|| Complex64::new(0.0, 0.0)) += term;
                next_bits |= i;
            }
        }

        if prune_threshold > 0.0 {
            next.retain(|_, a| a.norm() >= prune_threshold);
            next_bits = next.keys().fold(0u64, |acc, i| acc | i);
        }

        self.amplitudes = next;
        self.bits = next_bits;
    }
}
