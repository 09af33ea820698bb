//! Error types for the IR crate.

use crate::qubit::{ClbitId, QubitId};
use thiserror::Error;

/// Errors that can occur while building or reading a program.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IrError {
    /// Qubit not declared in the program.
    #[error("Qubit {qubit} not found in program{}", format_gate_context(.gate_name))]
    QubitNotFound {
        /// The qubit that was not found.
        qubit: QubitId,
        /// Optional instruction name for context.
        gate_name: Option<String>,
    },

    /// Classical bit not declared in the program.
    #[error("Classical bit {clbit} not found in program{}", format_gate_context(.gate_name))]
    ClbitNotFound {
        /// The classical bit that was not found.
        clbit: ClbitId,
        /// Optional instruction name for context.
        gate_name: Option<String>,
    },

    /// Duplicate qubit in one instruction.
    #[error("Duplicate qubit {qubit} in operation{}", format_gate_context(.gate_name))]
    DuplicateQubit {
        /// The duplicate qubit.
        qubit: QubitId,
        /// Optional instruction name for context.
        gate_name: Option<String>,
    },

    /// A program model reported fewer instructions than it claimed to hold.
    #[error("Instruction {index} out of range for program with {count} instructions")]
    InstructionOutOfRange {
        /// Requested position.
        index: usize,
        /// Reported instruction count.
        count: usize,
    },

    /// Program (de)serialization failed.
    #[error("Invalid program JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[allow(clippy::ref_option)]
fn format_gate_context(gate_name: &Option<String>) -> String {
    match gate_name {
        Some(name) => format!(" (gate: {name})"),
        None => String::new(),
    }
}

/// Result type for IR operations.
pub type IrResult<T> = Result<T, IrError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_context() {
        let err = IrError::QubitNotFound {
            qubit: QubitId(4),
            gate_name: Some("cx".into()),
        };
        assert_eq!(err.to_string(), "Qubit q4 not found in program (gate: cx)");

        let err = IrError::ClbitNotFound {
            clbit: ClbitId(1),
            gate_name: None,
        };
        assert_eq!(err.to_string(), "Classical bit c1 not found in program");
    }
}
