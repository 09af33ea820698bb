//! Arvak Program Model
//!
//! This crate provides the read-only program representation consumed by the
//! Arvak code generators. A program is a pair of declared register sizes plus
//! an ordered list of name-addressed instructions; order in that list is the
//! only source of program order.
//!
//! # Core Components
//!
//! - **Qubits and Classical Bits**: [`QubitId`], [`ClbitId`] for addressing the
//!   flattened quantum and classical index spaces, [`Register`] for names
//! - **Instructions**: [`Instruction`] combining an operation name with its
//!   operands, parameters and an optional [`ClassicalCondition`]
//! - **Model**: [`ProgramModel`], the contract generators read through
//! - **Program**: [`Program`], a concrete model with a fluent builder API
//!
//! # Example: Building a Bell State
//!
//! ```rust
//! use arvak_ir::{ClbitId, Program, ProgramModel, QubitId};
//!
//! let mut program = Program::with_size("bell_state", 2, 2);
//! program
//!     .h(QubitId(0))?
//!     .cx(QubitId(0), QubitId(1))?
//!     .measure(QubitId(0), ClbitId(0))?
//!     .measure(QubitId(1), ClbitId(1))?;
//!
//! assert_eq!(program.qubit_count(), 2);
//! assert_eq!(program.instruction_count(), 4);
//! # Ok::<(), arvak_ir::IrError>(())
//! ```
//!
//! # Example: Conditional Correction
//!
//! ```rust
//! use arvak_ir::{ClbitId, Instruction, Program, QubitId};
//!
//! let mut program = Program::with_size("teleport_fixup", 2, 1);
//! program.measure(QubitId(0), ClbitId(0))?;
//! program.append(Instruction::new("x", [QubitId(1)]).c_if([ClbitId(0)], 1))?;
//! # Ok::<(), arvak_ir::IrError>(())
//! ```

pub mod error;
pub mod instruction;
pub mod model;
pub mod program;
pub mod qubit;

pub use error::{IrError, IrResult};
pub use instruction::{ClassicalCondition, Instruction};
pub use model::ProgramModel;
pub use program::Program;
pub use qubit::{ClbitId, QubitId, Register};
