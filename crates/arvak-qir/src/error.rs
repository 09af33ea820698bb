//! Error types for QIR generation.

use std::fmt;

use arvak_ir::IrError;
use thiserror::Error;

use crate::profile::Profile;

/// Which static resource an out-of-range index referred to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    /// A qubit handle.
    Qubit,
    /// A measurement result handle.
    Result,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Qubit => write!(f, "qubit"),
            ResourceKind::Result => write!(f, "result"),
        }
    }
}

/// Errors that can occur during translation to QIR.
///
/// Translation is a pure function of its inputs, so every error recurs
/// identically on retry: fix the input rather than re-invoking.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QirError {
    /// Instruction name has no QIS mapping.
    #[error("Unsupported instruction '{name}' at position {index}")]
    UnsupportedInstruction {
        /// The rejected instruction name.
        name: String,
        /// Position in the program.
        index: usize,
    },

    /// Profile name not recognized.
    #[error("Invalid profile: '{0}' (expected Base or AdaptiveProfileExecution)")]
    InvalidProfile(String),

    /// An instruction referenced an index beyond the declared register size.
    #[error("{kind} index {index} exceeds declared {kind} count {declared}")]
    ResourceMismatch {
        /// Qubit or result.
        kind: ResourceKind,
        /// The referenced index.
        index: u32,
        /// The declared register size.
        declared: u32,
    },

    /// A declared classical bit never received a result before finalize.
    #[error("Classical bit c{clbit} has no recorded result")]
    RecordingOmission {
        /// The unrecorded classical bit.
        clbit: u32,
    },

    /// Operands do not match the lowered call's signature.
    #[error("Invalid operands for '{name}' at position {index}: {reason}")]
    InvalidOperands {
        /// Instruction name.
        name: String,
        /// Position in the program.
        index: usize,
        /// What was wrong.
        reason: String,
    },

    /// The instruction needs a capability the profile does not grant.
    #[error("Profile {profile} does not allow {capability}")]
    CapabilityUnavailable {
        /// The missing capability.
        capability: &'static str,
        /// The selected profile.
        profile: Profile,
    },

    /// LLVM rejected the generated textual IR.
    #[error("Invalid IR: {0}")]
    InvalidIr(String),

    /// Input is not loadable QIR bitcode.
    #[error("Malformed bitcode: {0}")]
    MalformedBitcode(String),

    /// Configuration could not be loaded or validated.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The program model violated its contract.
    #[error("Program error: {0}")]
    Program(#[from] IrError),
}

/// Result type for QIR generation.
pub type QirResult<T> = Result<T, QirError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = QirError::ResourceMismatch {
            kind: ResourceKind::Qubit,
            index: 5,
            declared: 3,
        };
        assert_eq!(err.to_string(), "qubit index 5 exceeds declared qubit count 3");

        let err = QirError::UnsupportedInstruction {
            name: "u3".into(),
            index: 2,
        };
        assert_eq!(err.to_string(), "Unsupported instruction 'u3' at position 2");

        let err = QirError::CapabilityUnavailable {
            capability: "branch on measurement result",
            profile: Profile::Base,
        };
        assert_eq!(
            err.to_string(),
            "Profile Base does not allow branch on measurement result"
        );
    }
}
