//! Read-only view consumed by code generators.

use crate::instruction::Instruction;

/// A read-only, ordered view of a quantum program.
///
/// Implementations must be immutable for the duration of any read: consumers
/// may call these methods repeatedly and expect identical answers. Position
/// in the instruction sequence is the only source of program order.
pub trait ProgramModel {
    /// Human-readable program name.
    fn name(&self) -> &str;

    /// Number of declared qubits.
    fn qubit_count(&self) -> u32;

    /// Number of declared classical bits.
    fn classical_bit_count(&self) -> u32;

    /// Number of instructions.
    fn instruction_count(&self) -> usize;

    /// The instruction at `index`, for `index < instruction_count()`.
    fn instruction_at(&self, index: usize) -> Option<&Instruction>;
}

impl<T: ProgramModel + ?Sized> ProgramModel for &T {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn qubit_count(&self) -> u32 {
        (**self).qubit_count()
    }

    fn classical_bit_count(&self) -> u32 {
        (**self).classical_bit_count()
    }

    fn instruction_count(&self) -> usize {
        (**self).instruction_count()
    }

    fn instruction_at(&self, index: usize) -> Option<&Instruction> {
        (**self).instruction_at(index)
    }
}

impl<T: ProgramModel + ?Sized> ProgramModel for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn qubit_count(&self) -> u32 {
        (**self).qubit_count()
    }

    fn classical_bit_count(&self) -> u32 {
        (**self).classical_bit_count()
    }

    fn instruction_count(&self) -> usize {
        (**self).instruction_count()
    }

    fn instruction_at(&self, index: usize) -> Option<&Instruction> {
        (**self).instruction_at(index)
    }
}
