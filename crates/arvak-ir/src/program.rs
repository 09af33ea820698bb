//! High-level program builder API.

use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};
use crate::instruction::Instruction;
use crate::model::ProgramModel;
use crate::qubit::{ClbitId, QubitId, Register};

/// A quantum program: declared register sizes plus an ordered instruction list.
///
/// This provides a high-level API for building programs, with convenient
/// methods for common gates and operations. Instructions are stored exactly
/// in the order they are appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    /// Name of the program.
    name: String,
    /// Number of declared qubits.
    num_qubits: u32,
    /// Number of declared classical bits.
    num_clbits: u32,
    /// Named quantum registers.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    qregs: Vec<Register>,
    /// Named classical registers.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    cregs: Vec<Register>,
    /// Instructions in program order.
    instructions: Vec<Instruction>,
}

impl Program {
    /// Create a new empty program.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            num_qubits: 0,
            num_clbits: 0,
            qregs: vec![],
            cregs: vec![],
            instructions: vec![],
        }
    }

    /// Create a program with a given number of qubits and classical bits.
    pub fn with_size(name: impl Into<String>, num_qubits: u32, num_clbits: u32) -> Self {
        let mut program = Self::new(name);
        program.num_qubits = num_qubits;
        program.num_clbits = num_clbits;
        program
    }

    /// Assemble a program from parts without validating operands.
    ///
    /// Use this for programs produced and validated upstream; out-of-range
    /// operands are left for the consumer to reject.
    pub fn from_parts(
        name: impl Into<String>,
        num_qubits: u32,
        num_clbits: u32,
        instructions: impl IntoIterator<Item = Instruction>,
    ) -> Self {
        let mut program = Self::with_size(name, num_qubits, num_clbits);
        program.instructions = instructions.into_iter().collect();
        program
    }

    /// Parse a program from its JSON form.
    pub fn from_json(json: &str) -> IrResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize the program to JSON.
    pub fn to_json(&self) -> IrResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Add a single qubit to the program.
    pub fn add_qubit(&mut self) -> QubitId {
        let id = QubitId(self.num_qubits);
        self.num_qubits += 1;
        id
    }

    /// Add a quantum register with multiple qubits.
    pub fn add_qreg(&mut self, name: impl Into<String>, size: u32) -> Vec<QubitId> {
        let offset = self.num_qubits;
        self.num_qubits += size;
        self.qregs.push(Register::new(name, offset, size));
        (offset..offset + size).map(QubitId).collect()
    }

    /// Add a single classical bit to the program.
    pub fn add_clbit(&mut self) -> ClbitId {
        let id = ClbitId(self.num_clbits);
        self.num_clbits += 1;
        id
    }

    /// Add a classical register with multiple bits.
    pub fn add_creg(&mut self, name: impl Into<String>, size: u32) -> Vec<ClbitId> {
        let offset = self.num_clbits;
        self.num_clbits += size;
        self.cregs.push(Register::new(name, offset, size));
        (offset..offset + size).map(ClbitId).collect()
    }

    /// Append an instruction after checking its operands are declared.
    pub fn append(&mut self, instruction: Instruction) -> IrResult<&mut Self> {
        self.check_operands(&instruction)?;
        self.instructions.push(instruction);
        Ok(self)
    }

    fn check_operands(&self, instruction: &Instruction) -> IrResult<()> {
        let gate_name = || Some(instruction.name.clone());

        for (i, &qubit) in instruction.qubits.iter().enumerate() {
            if qubit.0 >= self.num_qubits {
                return Err(IrError::QubitNotFound {
                    qubit,
                    gate_name: gate_name(),
                });
            }
            if instruction.qubits[..i].contains(&qubit) {
                return Err(IrError::DuplicateQubit {
                    qubit,
                    gate_name: gate_name(),
                });
            }
        }

        let condition_bits = instruction
            .condition
            .iter()
            .flat_map(|c| c.clbits.iter());
        for &clbit in instruction.clbits.iter().chain(condition_bits) {
            if clbit.0 >= self.num_clbits {
                return Err(IrError::ClbitNotFound {
                    clbit,
                    gate_name: gate_name(),
                });
            }
        }

        Ok(())
    }

    // =========================================================================
    // Single-qubit gates
    // =========================================================================

    /// Apply Hadamard gate.
    pub fn h(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.append(Instruction::new("h", [qubit]))
    }

    /// Apply Pauli-X gate.
    pub fn x(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.append(Instruction::new("x", [qubit]))
    }

    /// Apply Pauli-Y gate.
    pub fn y(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.append(Instruction::new("y", [qubit]))
    }

    /// Apply Pauli-Z gate.
    pub fn z(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.append(Instruction::new("z", [qubit]))
    }

    /// Apply S gate.
    pub fn s(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.append(Instruction::new("s", [qubit]))
    }

    /// Apply S-dagger gate.
    pub fn sdg(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.append(Instruction::new("sdg", [qubit]))
    }

    /// Apply T gate.
    pub fn t(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.append(Instruction::new("t", [qubit]))
    }

    /// Apply T-dagger gate.
    pub fn tdg(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.append(Instruction::new("tdg", [qubit]))
    }

    /// Apply the identity.
    pub fn id(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.append(Instruction::new("id", [qubit]))
    }

    /// Apply Rx rotation gate.
    pub fn rx(&mut self, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.append(Instruction::gate("rx", [theta], [qubit]))
    }

    /// Apply Ry rotation gate.
    pub fn ry(&mut self, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.append(Instruction::gate("ry", [theta], [qubit]))
    }

    /// Apply Rz rotation gate.
    pub fn rz(&mut self, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.append(Instruction::gate("rz", [theta], [qubit]))
    }

    // =========================================================================
    // Multi-qubit gates
    // =========================================================================

    /// Apply CNOT (CX) gate.
    pub fn cx(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.append(Instruction::new("cx", [control, target]))
    }

    /// Apply CZ gate.
    pub fn cz(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.append(Instruction::new("cz", [control, target]))
    }

    /// Apply SWAP gate.
    pub fn swap(&mut self, q1: QubitId, q2: QubitId) -> IrResult<&mut Self> {
        self.append(Instruction::new("swap", [q1, q2]))
    }

    /// Apply Toffoli (CCX) gate.
    pub fn ccx(&mut self, c1: QubitId, c2: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.append(Instruction::new("ccx", [c1, c2, target]))
    }

    // =========================================================================
    // Non-unitary operations
    // =========================================================================

    /// Measure a qubit into a classical bit.
    pub fn measure(&mut self, qubit: QubitId, clbit: ClbitId) -> IrResult<&mut Self> {
        self.append(Instruction::measure(qubit, clbit))
    }

    /// Measure qubit `i` into classical bit `i` for every qubit with a matching bit.
    pub fn measure_all(&mut self) -> IrResult<&mut Self> {
        let n = self.num_qubits.min(self.num_clbits);
        if n == 0 {
            return Ok(self);
        }
        self.append(Instruction::new("measure", (0..n).map(QubitId)).with_clbits((0..n).map(ClbitId)))
    }

    /// Reset a qubit to |0⟩.
    pub fn reset(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.append(Instruction::reset(qubit))
    }

    /// Add a barrier on the given qubits.
    pub fn barrier(&mut self, qubits: impl IntoIterator<Item = QubitId>) -> IrResult<&mut Self> {
        self.append(Instruction::barrier(qubits))
    }

    /// Add a barrier on all qubits.
    pub fn barrier_all(&mut self) -> IrResult<&mut Self> {
        let qubits: Vec<_> = (0..self.num_qubits).map(QubitId).collect();
        self.barrier(qubits)
    }

    /// Add a delay on a qubit.
    pub fn delay(&mut self, qubit: QubitId, duration: u64) -> IrResult<&mut Self> {
        self.append(Instruction::delay(qubit, duration))
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Get the program name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> u32 {
        self.num_qubits
    }

    /// Get the number of classical bits.
    pub fn num_clbits(&self) -> u32 {
        self.num_clbits
    }

    /// Get the instructions in program order.
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Get the quantum registers.
    pub fn qregs(&self) -> &[Register] {
        &self.qregs
    }

    /// Get the classical registers.
    pub fn cregs(&self) -> &[Register] {
        &self.cregs
    }

    // =========================================================================
    // Pre-built programs
    // =========================================================================

    /// Create a Bell state program.
    pub fn bell() -> IrResult<Self> {
        let mut program = Self::with_size("bell", 2, 2);
        let q0 = QubitId(0);
        let q1 = QubitId(1);

        program
            .h(q0)?
            .cx(q0, q1)?
            .measure(q0, ClbitId(0))?
            .measure(q1, ClbitId(1))?;

        Ok(program)
    }

    /// Create a GHZ state program over `n` qubits.
    pub fn ghz(n: u32) -> IrResult<Self> {
        if n == 0 {
            return Ok(Self::new("ghz_0"));
        }

        let mut program = Self::with_size("ghz", n, n);

        program.h(QubitId(0))?;
        for i in 0..n - 1 {
            program.cx(QubitId(i), QubitId(i + 1))?;
        }
        for i in 0..n {
            program.measure(QubitId(i), ClbitId(i))?;
        }

        Ok(program)
    }
}

impl ProgramModel for Program {
    fn name(&self) -> &str {
        &self.name
    }

    fn qubit_count(&self) -> u32 {
        self.num_qubits
    }

    fn classical_bit_count(&self) -> u32 {
        self.num_clbits
    }

    fn instruction_count(&self) -> usize {
        self.instructions.len()
    }

    fn instruction_at(&self, index: usize) -> Option<&Instruction> {
        self.instructions.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_new_program() {
        let program = Program::new("test");
        assert_eq!(program.name(), "test");
        assert_eq!(program.num_qubits(), 0);
        assert_eq!(program.num_clbits(), 0);
        assert_eq!(program.instruction_count(), 0);
    }

    #[test]
    fn test_add_registers() {
        let mut program = Program::new("test");
        let qreg = program.add_qreg("q", 3);
        let creg_a = program.add_creg("a", 2);
        let creg_b = program.add_creg("b", 2);

        assert_eq!(qreg, vec![QubitId(0), QubitId(1), QubitId(2)]);
        assert_eq!(creg_a, vec![ClbitId(0), ClbitId(1)]);
        assert_eq!(creg_b, vec![ClbitId(2), ClbitId(3)]);
        assert_eq!(program.num_qubits(), 3);
        assert_eq!(program.num_clbits(), 4);
        assert_eq!(program.cregs()[1].offset, 2);
    }

    #[test]
    fn test_bell_program() {
        let program = Program::bell().unwrap();
        assert_eq!(program.qubit_count(), 2);
        assert_eq!(program.classical_bit_count(), 2);
        let names: Vec<_> = program.instructions().iter().map(Instruction::name).collect();
        assert_eq!(names, vec!["h", "cx", "measure", "measure"]);
    }

    #[test]
    fn test_ghz_program() {
        let program = Program::ghz(4).unwrap();
        assert_eq!(program.instruction_count(), 1 + 3 + 4);
        assert_eq!(Program::ghz(0).unwrap().instruction_count(), 0);
    }

    #[test]
    fn test_fluent_api_preserves_order() {
        let mut program = Program::with_size("test", 2, 1);
        program
            .rx(PI / 2.0, QubitId(0))
            .unwrap()
            .cz(QubitId(1), QubitId(0))
            .unwrap()
            .measure(QubitId(1), ClbitId(0))
            .unwrap();

        let at = |i| program.instruction_at(i).unwrap().name().to_string();
        assert_eq!(at(0), "rx");
        assert_eq!(at(1), "cz");
        assert_eq!(at(2), "measure");
        assert!(program.instruction_at(3).is_none());
    }

    #[test]
    fn test_append_rejects_undeclared_operands() {
        let mut program = Program::with_size("test", 2, 1);
        assert!(matches!(
            program.h(QubitId(2)),
            Err(IrError::QubitNotFound { .. })
        ));
        assert!(matches!(
            program.measure(QubitId(0), ClbitId(1)),
            Err(IrError::ClbitNotFound { .. })
        ));
        assert!(matches!(
            program.cx(QubitId(1), QubitId(1)),
            Err(IrError::DuplicateQubit { .. })
        ));
        assert!(matches!(
            program.append(Instruction::new("x", [QubitId(0)]).c_if([ClbitId(3)], 1)),
            Err(IrError::ClbitNotFound { .. })
        ));
        assert_eq!(program.instruction_count(), 0);
    }

    #[test]
    fn test_from_parts_is_unchecked() {
        let program = Program::from_parts("raw", 1, 0, [Instruction::new("h", [QubitId(5)])]);
        assert_eq!(program.instruction_count(), 1);
    }

    #[test]
    fn test_measure_all_broadcast() {
        let mut program = Program::with_size("test", 3, 2);
        program.measure_all().unwrap();
        let inst = program.instruction_at(0).unwrap();
        assert_eq!(inst.qubits, vec![QubitId(0), QubitId(1)]);
        assert_eq!(inst.clbits, vec![ClbitId(0), ClbitId(1)]);
    }

    #[test]
    fn test_json_roundtrip() {
        let mut program = Program::bell().unwrap();
        program.add_creg("flags", 1);
        let json = program.to_json().unwrap();
        let back = Program::from_json(&json).unwrap();
        assert_eq!(back, program);
        assert!(Program::from_json("{\"name\": 3}").is_err());
    }
}
