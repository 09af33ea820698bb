//! QIR Generator for Arvak
//!
//! This crate lowers an Arvak program into Quantum Intermediate
//! Representation: an LLVM-style module whose entry point calls into the
//! quantum instruction set runtime (`__quantum__qis__*`, `__quantum__rt__*`).
//! Both a textual IR form and LLVM bitcode are produced.
//!
//! # Profiles
//!
//! | Profile | Addressing | Branch on results | Qubit reuse |
//! |---------|------------|-------------------|-------------|
//! | `Base` | static (`null`, `inttoptr`) | no | no |
//! | `AdaptiveProfileExecution` | dynamic (`qubit_allocate`, `m`) | yes | yes |
//!
//! # Example: Base Profile
//!
//! ```rust
//! use arvak_ir::Program;
//! use arvak_qir::{Profile, translate};
//!
//! let program = Program::bell()?;
//! let generated = translate(&program, Profile::Base)?;
//!
//! assert_eq!(generated.required_qubits(), 2);
//! assert_eq!(generated.required_results(), 2);
//! assert!(generated.text().contains("call void @__quantum__qis__h__body(%Qubit* null)"));
//! assert!(generated.text().contains(
//!     "call void @__quantum__qis__cnot__body(%Qubit* null, %Qubit* inttoptr (i64 1 to %Qubit*))"
//! ));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Example: Conditional Correction
//!
//! ```rust
//! use arvak_ir::{ClbitId, Instruction, Program, QubitId};
//! use arvak_qir::to_qir;
//!
//! let mut program = Program::with_size("fixup", 2, 1);
//! program.h(QubitId(0))?.measure(QubitId(0), ClbitId(0))?;
//! program.append(Instruction::new("x", [QubitId(1)]).c_if([ClbitId(0)], 1))?;
//!
//! let text = to_qir(&program, "AdaptiveProfileExecution")?;
//! assert!(text.contains("@__quantum__qis__read_result__body"));
//! assert!(text.contains("then0:"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Supported Instructions
//!
//! Single-qubit: `h`, `x`, `y`, `z`, `s`, `sdg`, `t`, `tdg`, `id`, `reset`
//!
//! Parameterized: `rx(θ)`, `ry(θ)`, `rz(θ)`, `delay`
//!
//! Multi-qubit: `cx`/`cnot`, `cz`, `swap`, `ccx`, `barrier`
//!
//! Measurement: `measure`/`m`/`mz`

pub mod addressing;
pub mod config;
mod error;
mod generator;
pub mod module;
mod profile;
pub mod qis;

pub use addressing::AddressingMode;
pub use config::QirConfig;
pub use error::{QirError, QirResult, ResourceKind};
pub use generator::{GeneratedModule, QirGenerator, TranslateOptions};
pub use module::bitcode::BitcodeModule;
pub use profile::{Capabilities, Profile};
pub use qis::SUPPORTED_INSTRUCTIONS;

use arvak_ir::ProgramModel;

/// Translate `program` with default options for `profile`.
pub fn translate<P: ProgramModel + ?Sized>(
    program: &P,
    profile: Profile,
) -> QirResult<GeneratedModule> {
    QirGenerator::for_profile(profile).translate(program)
}

/// Translate `program` with explicit options.
pub fn translate_with<P: ProgramModel + ?Sized>(
    program: &P,
    options: &TranslateOptions,
) -> QirResult<GeneratedModule> {
    QirGenerator::new(options.clone()).translate(program)
}

/// Translate to textual IR, selecting the profile by name.
///
/// The profile is parsed before the program is read, so an unknown name
/// fails with [`QirError::InvalidProfile`] without any traversal.
pub fn to_qir<P: ProgramModel + ?Sized>(program: &P, profile: &str) -> QirResult<String> {
    let profile: Profile = profile.parse()?;
    Ok(translate(program, profile)?.text().to_string())
}

/// Translate to LLVM bitcode, selecting the profile by name.
pub fn to_qir_bitcode<P: ProgramModel + ?Sized>(program: &P, profile: &str) -> QirResult<Vec<u8>> {
    let profile: Profile = profile.parse()?;
    Ok(translate(program, profile)?.bytes().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use arvak_ir::Program;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_outputs_are_thread_safe() {
        assert_send_sync::<GeneratedModule>();
        assert_send_sync::<QirGenerator>();
        assert_send_sync::<QirError>();
    }

    #[test]
    fn test_string_profiles() {
        let program = Program::bell().unwrap();
        let text = to_qir(&program, "Base").unwrap();
        assert!(text.contains("\"qir_profiles\"=\"base_profile\""));

        let bytes = to_qir_bitcode(&program, "adaptive").unwrap();
        let decoded = BitcodeModule::parse(&bytes).unwrap();
        assert_eq!(decoded.profile().unwrap(), Profile::AdaptiveProfileExecution);

        assert!(matches!(
            to_qir(&program, "Unknown"),
            Err(QirError::InvalidProfile(_))
        ));
    }

    #[test]
    fn test_translate_with_options() {
        let program = Program::bell().unwrap();
        let options = TranslateOptions::new(Profile::Base)
            .with_entry_point("run")
            .with_module_name("custom")
            .with_module_flags(false);
        let generated = translate_with(&program, &options).unwrap();
        let text = generated.text();
        assert!(text.starts_with("; ModuleID = 'custom'\n"));
        assert!(text.contains("define void @run() #0 {"));
        assert!(!text.contains("!llvm.module.flags"));
    }
}
