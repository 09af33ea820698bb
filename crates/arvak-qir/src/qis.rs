//! Mapping from instruction names to quantum instruction set calls.
//!
//! The supported set is closed: [`QisOp::from_name`] is the only way in, and
//! anything it does not recognize is rejected by the generator.

use crate::module::{Callee, Type};

/// Instruction names accepted by the generator.
pub const SUPPORTED_INSTRUCTIONS: &[&str] = &[
    "barrier", "ccx", "cnot", "cx", "cz", "delay", "h", "id", "m", "measure", "mz", "reset", "rx",
    "ry", "rz", "s", "sdg", "swap", "t", "tdg", "x", "y", "z",
];

const Q1: &[Type] = &[Type::Qubit];
const Q2: &[Type] = &[Type::Qubit, Type::Qubit];
const Q3: &[Type] = &[Type::Qubit, Type::Qubit, Type::Qubit];
const ROT: &[Type] = &[Type::Double, Type::Qubit];

pub const H: Callee = Callee::new("__quantum__qis__h__body", Type::Void, Q1);
pub const X: Callee = Callee::new("__quantum__qis__x__body", Type::Void, Q1);
pub const Y: Callee = Callee::new("__quantum__qis__y__body", Type::Void, Q1);
pub const Z: Callee = Callee::new("__quantum__qis__z__body", Type::Void, Q1);
pub const S: Callee = Callee::new("__quantum__qis__s__body", Type::Void, Q1);
pub const S_ADJ: Callee = Callee::new("__quantum__qis__s__adj", Type::Void, Q1);
pub const T: Callee = Callee::new("__quantum__qis__t__body", Type::Void, Q1);
pub const T_ADJ: Callee = Callee::new("__quantum__qis__t__adj", Type::Void, Q1);
pub const RX: Callee = Callee::new("__quantum__qis__rx__body", Type::Void, ROT);
pub const RY: Callee = Callee::new("__quantum__qis__ry__body", Type::Void, ROT);
pub const RZ: Callee = Callee::new("__quantum__qis__rz__body", Type::Void, ROT);
pub const CNOT: Callee = Callee::new("__quantum__qis__cnot__body", Type::Void, Q2);
pub const CZ: Callee = Callee::new("__quantum__qis__cz__body", Type::Void, Q2);
pub const SWAP: Callee = Callee::new("__quantum__qis__swap__body", Type::Void, Q2);
pub const CCX: Callee = Callee::new("__quantum__qis__ccx__body", Type::Void, Q3);
pub const RESET: Callee = Callee::new("__quantum__qis__reset__body", Type::Void, Q1);
pub const BARRIER: Callee = Callee::new("__quantum__qis__barrier__body", Type::Void, &[]);

/// Measurement into a pre-addressed result slot.
pub const MZ: Callee = Callee::new(
    "__quantum__qis__mz__body",
    Type::Void,
    &[Type::Qubit, Type::Result],
);
/// Measurement returning a fresh result.
pub const M: Callee = Callee::new("__quantum__qis__m__body", Type::Result, Q1);
/// Read a result as a boolean.
pub const READ_RESULT: Callee = Callee::new(
    "__quantum__qis__read_result__body",
    Type::Bool,
    &[Type::Result],
);

pub const QUBIT_ALLOCATE: Callee = Callee::new("__quantum__rt__qubit_allocate", Type::Qubit, &[]);
pub const QUBIT_RELEASE: Callee = Callee::new("__quantum__rt__qubit_release", Type::Void, Q1);
pub const ARRAY_START_RECORD: Callee =
    Callee::new("__quantum__rt__array_start_record_output", Type::Void, &[]);
pub const RESULT_RECORD: Callee = Callee::new(
    "__quantum__rt__result_record_output",
    Type::Void,
    &[Type::Result],
);
pub const ARRAY_END_RECORD: Callee =
    Callee::new("__quantum__rt__array_end_record_output", Type::Void, &[]);
/// The constant zero result, recorded for bits no measurement wrote.
pub const RESULT_GET_ZERO: Callee =
    Callee::new("__quantum__rt__result_get_zero", Type::Result, &[]);

/// How many qubit operands an operation takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Exactly `n` qubits.
    Exact(usize),
    /// One or more qubits, each paired with a classical bit.
    Paired,
    /// Any number of qubits, including none.
    Any,
}

/// A supported operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QisOp {
    H,
    X,
    Y,
    Z,
    S,
    Sdg,
    T,
    Tdg,
    Rx,
    Ry,
    Rz,
    Cnot,
    Cz,
    Swap,
    Ccx,
    Measure,
    Reset,
    Barrier,
    Id,
    Delay,
}

impl QisOp {
    /// Look up an instruction name. Case-sensitive.
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "h" => Self::H,
            "x" => Self::X,
            "y" => Self::Y,
            "z" => Self::Z,
            "s" => Self::S,
            "sdg" => Self::Sdg,
            "t" => Self::T,
            "tdg" => Self::Tdg,
            "rx" => Self::Rx,
            "ry" => Self::Ry,
            "rz" => Self::Rz,
            "cx" | "cnot" => Self::Cnot,
            "cz" => Self::Cz,
            "swap" => Self::Swap,
            "ccx" => Self::Ccx,
            "measure" | "m" | "mz" => Self::Measure,
            "reset" => Self::Reset,
            "barrier" => Self::Barrier,
            "id" => Self::Id,
            "delay" => Self::Delay,
            _ => return None,
        })
    }

    /// Qubit operand count.
    pub fn arity(self) -> Arity {
        match self {
            Self::Cnot | Self::Cz | Self::Swap => Arity::Exact(2),
            Self::Ccx => Arity::Exact(3),
            Self::Measure => Arity::Paired,
            Self::Barrier => Arity::Any,
            _ => Arity::Exact(1),
        }
    }

    /// Accepted parameter counts, inclusive.
    pub fn params(self) -> (usize, usize) {
        match self {
            Self::Rx | Self::Ry | Self::Rz => (1, 1),
            Self::Delay => (0, 1),
            _ => (0, 0),
        }
    }

    /// The call lowering a unitary gate or reset, taking parameters then qubits.
    ///
    /// `None` for operations with bespoke lowering (measure, barrier) or no
    /// lowering at all (id, delay).
    pub fn callee(self) -> Option<Callee> {
        Some(match self {
            Self::H => H,
            Self::X => X,
            Self::Y => Y,
            Self::Z => Z,
            Self::S => S,
            Self::Sdg => S_ADJ,
            Self::T => T,
            Self::Tdg => T_ADJ,
            Self::Rx => RX,
            Self::Ry => RY,
            Self::Rz => RZ,
            Self::Cnot => CNOT,
            Self::Cz => CZ,
            Self::Swap => SWAP,
            Self::Ccx => CCX,
            Self::Reset => RESET,
            Self::Measure | Self::Barrier | Self::Id | Self::Delay => return None,
        })
    }

    /// Whether lowering emits a call that acts on the qubit operands.
    pub fn acts_on_qubits(self) -> bool {
        !matches!(self, Self::Barrier | Self::Id | Self::Delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_supported_name_resolves() {
        for name in SUPPORTED_INSTRUCTIONS {
            assert!(QisOp::from_name(name).is_some(), "{name}");
        }
        assert!(SUPPORTED_INSTRUCTIONS.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_unknown_names_rejected() {
        for name in ["u3", "H", "CX", "sx", "cswap", "", "measure "] {
            assert_eq!(QisOp::from_name(name), None, "{name}");
        }
    }

    #[test]
    fn test_aliases() {
        assert_eq!(QisOp::from_name("cx"), QisOp::from_name("cnot"));
        assert_eq!(QisOp::from_name("m"), Some(QisOp::Measure));
        assert_eq!(QisOp::from_name("mz"), Some(QisOp::Measure));
    }

    #[test]
    fn test_adjoint_lowering() {
        assert_eq!(QisOp::Sdg.callee().map(|c| c.name), Some("__quantum__qis__s__adj"));
        assert_eq!(QisOp::Tdg.callee().map(|c| c.name), Some("__quantum__qis__t__adj"));
        assert_eq!(QisOp::Cnot.callee().map(|c| c.name), Some("__quantum__qis__cnot__body"));
    }

    #[test]
    fn test_callee_signatures_match_shape() {
        for name in SUPPORTED_INSTRUCTIONS {
            let op = QisOp::from_name(name).unwrap();
            let Some(callee) = op.callee() else { continue };
            let Arity::Exact(qubits) = op.arity() else {
                panic!("{name} has a callee but no fixed arity");
            };
            assert_eq!(callee.params.len(), qubits + op.params().1, "{name}");
            assert_eq!(callee.ret, Type::Void);
        }
    }

    #[test]
    fn test_no_call_operations() {
        assert_eq!(QisOp::Id.callee(), None);
        assert_eq!(QisOp::Delay.callee(), None);
        assert!(!QisOp::Barrier.acts_on_qubits());
        assert!(QisOp::Reset.acts_on_qubits());
        assert_eq!(QisOp::Barrier.arity(), Arity::Any);
    }
}
