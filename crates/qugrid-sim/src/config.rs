//! Simulator configuration.

use serde::{Deserialize, Serialize};

use crate::state::MAX_STATE_QUBITS;

/// Default maximum number of simulated qubits: the widest state the basis
/// index can address.
pub const DEFAULT_MAX_QUBITS: usize = MAX_STATE_QUBITS;

/// Default rounding for probabilities and state comparison.
pub const DEFAULT_PROBABILITY_DECIMALS: u32 = 5;

/// Default norm below which an amplitude is dropped. Pruning is off unless
/// a positive threshold is configured.
pub const DEFAULT_PRUNE_THRESHOLD: f64 = 0.0;

/// Configuration for a [`Simulator`](crate::Simulator).
///
/// Every field has a default, so a partial YAML or JSON document
/// deserializes cleanly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    /// Circuits wider than this are rejected by `run`. Values above 63 are
    /// clamped to 63.
    pub max_qubits: usize,
    /// Decimal places kept when rounding probabilities.
    pub probability_decimals: u32,
    /// Amplitudes with a smaller norm are removed after each transform.
    /// Zero keeps every amplitude the transform produced.
    pub prune_threshold: f64,
    /// Seed for the tie-break RNG of `measure_all`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            max_qubits: DEFAULT_MAX_QUBITS,
            probability_decimals: DEFAULT_PROBABILITY_DECIMALS,
            prune_threshold: DEFAULT_PRUNE_THRESHOLD,
            seed: None,
        }
    }
}

impl SimulatorConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the qubit limit.
    pub fn with_max_qubits(mut self, max_qubits: usize) -> Self {
        self.max_qubits = max_qubits;
        self
    }

    /// Set the probability rounding.
    pub fn with_probability_decimals(mut self, decimals: u32) -> Self {
        self.probability_decimals = decimals;
        self
    }

    /// Set the pruning threshold.
    pub fn with_prune_threshold(mut self, threshold: f64) -> Self {
        self.prune_threshold = threshold;
        self
    }

    /// Fix the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}
