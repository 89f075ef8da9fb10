//! Error types for the IR crate.

use thiserror::Error;

/// Errors that can occur in IR operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IrError {
    /// Classical register is not declared.
    #[error("Unknown classical register '{0}'")]
    UnknownRegister(String),

    /// Classical bit index is not an integer.
    #[error("Invalid bit index for register '{register}': expected integer, got {found}")]
    InvalidBitIndex {
        /// The register being addressed.
        register: String,
        /// Textual form of the rejected index.
        found: String,
    },

    /// Classical bit index past the end of the register.
    #[error("Bit {bit} not found in register '{register}' of length {len}")]
    BitNotFound {
        /// The register being addressed.
        register: String,
        /// The requested bit.
        bit: usize,
        /// Current register length.
        len: usize,
    },

    /// A gate was placed without any wires.
    #[error("Gate '{0}' needs at least one wire")]
    NoWires(String),

    /// Duplicate wire in a single gate instance.
    #[error("Duplicate wire {wire} in operation{}", format_gate_context(.gate_name))]
    DuplicateQubit {
        /// The duplicate wire.
        wire: usize,
        /// Optional gate name for context.
        gate_name: Option<String>,
    },

    /// Gate requires a different number of wires.
    #[error("Gate '{gate_name}' requires {expected} qubits, got {got}")]
    QubitCountMismatch {
        /// Name of the gate.
        gate_name: String,
        /// Expected number of wires.
        expected: usize,
        /// Actual number of wires provided.
        got: usize,
    },

    /// Parameter is unbound.
    #[error("Parameter '{0}' is unbound")]
    UnboundParameter(String),

    /// Expression text could not be parsed.
    #[error("Invalid expression '{expression}': {message}")]
    InvalidExpression {
        /// The source text.
        expression: String,
        /// What went wrong.
        message: String,
    },

    /// Call to a function the evaluator does not know.
    #[error("Unknown function '{0}'")]
    UnknownFunction(String),

    /// Function called with the wrong number of arguments.
    #[error("Function '{function}' expects {expected} argument(s), got {got}")]
    ArityMismatch {
        /// Function name.
        function: String,
        /// Expected argument count.
        expected: usize,
        /// Actual argument count.
        got: usize,
    },

    /// Matrix has the wrong shape for the operation.
    #[error("Invalid matrix: {0}")]
    InvalidMatrix(String),

    /// Custom gate declares a formal parameter that parses as a constant.
    #[error("Custom gate '{gate_name}' declares reserved parameter name '{param}'")]
    ReservedParameter {
        /// The custom gate.
        gate_name: String,
        /// The offending formal name.
        param: String,
    },

    /// Custom gate expands into itself.
    #[error("Custom gate '{0}' is defined recursively")]
    RecursiveGate(String),

    /// Snapshot could not be (de)serialized.
    #[error("Snapshot serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Helper function to format optional gate context.
#[allow(clippy::ref_option)]
fn format_gate_context(gate_name: &Option<String>) -> String {
    match gate_name {
        Some(name) => format!(" (gate: {name})"),
        None => String::new(),
    }
}

/// Result type for IR operations.
pub type IrResult<T> = Result<T, IrError>;
