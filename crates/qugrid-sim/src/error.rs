//! Error types for the simulator crate.

use thiserror::Error;

/// Errors produced while simulating a circuit.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SimError {
    /// No state exists yet; call `init_state` or `run` first.
    #[error("Simulator state is not initialized")]
    NotInitialized,

    /// A `measure` gate was applied without a classical destination.
    #[error("\"measure\" gate on wire {wire} requires destination")]
    MeasureWithoutDestination {
        /// The measured wire.
        wire: usize,
    },

    /// A gate references a wire outside the simulated state.
    #[error("Gate \"{gate_name}\" references wire {wire} but state only has {num_qubits} qubits")]
    QubitOutOfRange {
        /// The gate being applied.
        gate_name: String,
        /// The offending wire.
        wire: usize,
        /// Number of qubits in the state.
        num_qubits: usize,
    },

    /// Circuit is wider than the configured limit.
    #[error("Circuit has {requested} qubits, simulator supports at most {max}")]
    TooManyQubits {
        /// Qubits requested by the circuit.
        requested: usize,
        /// Configured maximum.
        max: usize,
    },

    /// Gate matrix dimension does not match the number of wires it is applied to.
    #[error("Matrix for \"{gate_name}\" has dimension {dim}, expected {expected} for {wires} wires")]
    MatrixSizeMismatch {
        /// The gate being applied.
        gate_name: String,
        /// Matrix dimension.
        dim: usize,
        /// Expected dimension, `2^wires`.
        expected: usize,
        /// Number of wires.
        wires: usize,
    },

    /// Expected state has the wrong number of amplitudes.
    #[error("Expected state has {got} amplitudes, state has {expected}")]
    StateSizeMismatch {
        /// `2^num_qubits`.
        expected: usize,
        /// Length of the supplied state.
        got: usize,
    },

    /// Circuit or register error.
    #[error("Circuit IR error: {0}")]
    Ir(#[from] qugrid_ir::IrError),
}

/// Result type for simulator operations.
pub type SimResult<T> = Result<T, SimError>;
