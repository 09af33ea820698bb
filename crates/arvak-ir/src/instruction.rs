//! Program instructions: an operation name applied to operands.

use serde::{Deserialize, Serialize};

use crate::qubit::{ClbitId, QubitId};

/// A classical condition guarding an instruction.
///
/// The instruction executes only if, for every position `k`, the measured
/// value of `clbits[k]` equals bit `k` of `value`. This is the flattened
/// form of a register comparison such as `c_if(creg, 3)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClassicalCondition {
    /// Classical bits compared, least significant first.
    pub clbits: Vec<ClbitId>,
    /// The value to compare against.
    pub value: u64,
}

impl ClassicalCondition {
    /// Create a new classical condition.
    pub fn new(clbits: impl IntoIterator<Item = ClbitId>, value: u64) -> Self {
        Self {
            clbits: clbits.into_iter().collect(),
            value,
        }
    }

    /// Condition on a single bit being set (`true`) or clear (`false`).
    pub fn bit(clbit: ClbitId, set: bool) -> Self {
        Self::new([clbit], u64::from(set))
    }

    /// Expected measurement outcome for each compared bit, in order.
    pub fn expectations(&self) -> impl Iterator<Item = (ClbitId, bool)> + '_ {
        self.clbits
            .iter()
            .enumerate()
            .map(|(k, &clbit)| (clbit, k < 64 && (self.value >> k) & 1 == 1))
    }

    /// Whether `value` is representable with the compared bits.
    pub fn fits(&self) -> bool {
        let width = self.clbits.len();
        width >= 64 || self.value >> width == 0
    }
}

/// A single program instruction.
///
/// Instructions are name-addressed: the set of names a consumer accepts is
/// decided by that consumer, not by this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    /// Operation name (`h`, `cx`, `measure`, ...).
    pub name: String,
    /// Qubits this instruction operates on, in operand order.
    pub qubits: Vec<QubitId>,
    /// Classical bits this instruction writes (for measure).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub clbits: Vec<ClbitId>,
    /// Numeric parameters (rotation angles, durations).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<f64>,
    /// Optional classical condition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<ClassicalCondition>,
}

impl Instruction {
    /// Create an instruction with the given name and qubit operands.
    pub fn new(name: impl Into<String>, qubits: impl IntoIterator<Item = QubitId>) -> Self {
        Self {
            name: name.into(),
            qubits: qubits.into_iter().collect(),
            clbits: vec![],
            params: vec![],
            condition: None,
        }
    }

    /// Create a gate instruction with parameters.
    pub fn gate(
        name: impl Into<String>,
        params: impl IntoIterator<Item = f64>,
        qubits: impl IntoIterator<Item = QubitId>,
    ) -> Self {
        Self::new(name, qubits).with_params(params)
    }

    /// Create a measurement instruction.
    pub fn measure(qubit: QubitId, clbit: ClbitId) -> Self {
        Self::new("measure", [qubit]).with_clbits([clbit])
    }

    /// Create a reset instruction.
    pub fn reset(qubit: QubitId) -> Self {
        Self::new("reset", [qubit])
    }

    /// Create a barrier instruction.
    pub fn barrier(qubits: impl IntoIterator<Item = QubitId>) -> Self {
        Self::new("barrier", qubits)
    }

    /// Create a delay instruction.
    #[allow(clippy::cast_precision_loss)]
    pub fn delay(qubit: QubitId, duration: u64) -> Self {
        Self::new("delay", [qubit]).with_params([duration as f64])
    }

    /// Replace the parameters.
    #[must_use]
    pub fn with_params(mut self, params: impl IntoIterator<Item = f64>) -> Self {
        self.params = params.into_iter().collect();
        self
    }

    /// Replace the classical bit operands.
    #[must_use]
    pub fn with_clbits(mut self, clbits: impl IntoIterator<Item = ClbitId>) -> Self {
        self.clbits = clbits.into_iter().collect();
        self
    }

    /// Attach a classical condition.
    #[must_use]
    pub fn with_condition(mut self, condition: ClassicalCondition) -> Self {
        self.condition = Some(condition);
        self
    }

    /// Attach a register-style condition: execute only if `clbits` read `value`.
    #[must_use]
    pub fn c_if(self, clbits: impl IntoIterator<Item = ClbitId>, value: u64) -> Self {
        self.with_condition(ClassicalCondition::new(clbits, value))
    }

    /// Get the name of the instruction.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Check if this is a measurement.
    pub fn is_measure(&self) -> bool {
        matches!(self.name.as_str(), "measure" | "m" | "mz")
    }

    /// Check if this instruction carries a classical condition.
    pub fn is_conditional(&self) -> bool {
        self.condition.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_instruction() {
        let inst = Instruction::gate("rx", [0.5], [QubitId(2)]);
        assert_eq!(inst.name(), "rx");
        assert_eq!(inst.qubits, vec![QubitId(2)]);
        assert_eq!(inst.params, vec![0.5]);
        assert!(!inst.is_measure());
    }

    #[test]
    fn test_measure_instruction() {
        let inst = Instruction::measure(QubitId(0), ClbitId(1));
        assert!(inst.is_measure());
        assert_eq!(inst.qubits.len(), 1);
        assert_eq!(inst.clbits, vec![ClbitId(1)]);
    }

    #[test]
    fn test_condition_expectations() {
        let cond = ClassicalCondition::new([ClbitId(0), ClbitId(1), ClbitId(2)], 0b101);
        let bits: Vec<_> = cond.expectations().collect();
        assert_eq!(
            bits,
            vec![(ClbitId(0), true), (ClbitId(1), false), (ClbitId(2), true)]
        );
        assert!(cond.fits());
        assert!(!ClassicalCondition::new([ClbitId(0)], 2).fits());
    }

    #[test]
    fn test_c_if_builder() {
        let inst = Instruction::new("x", [QubitId(1)]).c_if([ClbitId(0)], 1);
        assert!(inst.is_conditional());
        assert_eq!(inst.condition, Some(ClassicalCondition::bit(ClbitId(0), true)));
    }

    #[test]
    fn test_json_skips_empty_fields() {
        let inst = Instruction::new("h", [QubitId(0)]);
        let json = serde_json::to_string(&inst).unwrap();
        assert_eq!(json, r#"{"name":"h","qubits":[0]}"#);
        let back: Instruction = serde_json::from_str(&json).unwrap();
        assert_eq!(back, inst);
    }
}
