//! The QIR code generator.
//!
//! [`QirGenerator`] walks a [`ProgramModel`] once, in program order, lowering
//! every instruction to calls into the quantum instruction set. After the
//! scan it appends the output-recording epilogue and freezes the resource
//! counters into the entry point's attributes.

use std::collections::BTreeMap;
use std::fmt;

use arvak_ir::{ClassicalCondition, Instruction, IrError, ProgramModel};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace};

use crate::addressing::{AddressingMode, HandleTable};
use crate::error::{QirError, QirResult};
use crate::module::{
    BlockRef, ENTRY_POINT_ATTR, FlagValue, Module, ModuleBuilder, ModuleFlag, QIR_PROFILES_ATTR,
    REQUIRED_QUBITS_ATTR, REQUIRED_RESULTS_ATTR, Value, bitcode,
};
use crate::profile::{Capabilities, Profile};
use crate::qis::{self, Arity, QisOp};

/// Options controlling a single translation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslateOptions {
    /// Execution profile.
    pub profile: Profile,
    /// Name of the entry-point function.
    pub entry_point: String,
    /// Module identifier; defaults to the program name.
    pub module_name: Option<String>,
    /// Whether to emit `!llvm.module.flags`.
    pub emit_module_flags: bool,
}

impl Default for TranslateOptions {
    fn default() -> Self {
        Self::new(Profile::default())
    }
}

impl TranslateOptions {
    /// Default options for `profile`.
    pub fn new(profile: Profile) -> Self {
        Self {
            profile,
            entry_point: "main".into(),
            module_name: None,
            emit_module_flags: true,
        }
    }

    /// Set the entry-point name.
    #[must_use]
    pub fn with_entry_point(mut self, name: impl Into<String>) -> Self {
        self.entry_point = name.into();
        self
    }

    /// Set the module identifier.
    #[must_use]
    pub fn with_module_name(mut self, name: impl Into<String>) -> Self {
        self.module_name = Some(name.into());
        self
    }

    /// Enable or disable module flags.
    #[must_use]
    pub fn with_module_flags(mut self, enabled: bool) -> Self {
        self.emit_module_flags = enabled;
        self
    }

    /// Check that the options can produce a well-formed module.
    pub fn validate(&self) -> QirResult<()> {
        if !is_identifier(&self.entry_point) {
            return Err(QirError::Config(format!(
                "entry point '{}' is not a valid identifier",
                self.entry_point
            )));
        }
        Ok(())
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || matches!(c, '_' | '.' | '$'))
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '$' | '-'))
}

/// Module identifiers are quoted in the text form; drop anything that would break the quoting.
fn sanitize_module_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_control() || matches!(c, '"' | '\'' | '\\') {
                '_'
            } else {
                c
            }
        })
        .collect();
    if cleaned.is_empty() {
        "module".into()
    } else {
        cleaned
    }
}

/// The lifecycle of a translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Start,
    Scanning,
    Recording,
    Finalized,
}

impl State {
    fn successor(self) -> Option<State> {
        match self {
            State::Start => Some(State::Scanning),
            State::Scanning => Some(State::Recording),
            State::Recording => Some(State::Finalized),
            State::Finalized => None,
        }
    }
}

/// Single-use translator from a program to a QIR module.
///
/// [`QirGenerator::translate`] consumes the generator, so a second program
/// needs a fresh instance.
#[derive(Debug)]
pub struct QirGenerator {
    options: TranslateOptions,
    state: State,
}

impl QirGenerator {
    /// Create a generator.
    pub fn new(options: TranslateOptions) -> Self {
        Self {
            options,
            state: State::Start,
        }
    }

    /// Create a generator with default options for `profile`.
    pub fn for_profile(profile: Profile) -> Self {
        Self::new(TranslateOptions::new(profile))
    }

    /// The options this generator was created with.
    pub fn options(&self) -> &TranslateOptions {
        &self.options
    }

    /// Translate `program`.
    ///
    /// Either the whole program lowers and a complete module is returned, or
    /// translation fails and nothing is produced.
    #[instrument(skip_all, fields(program = program.name(), profile = %self.options.profile))]
    pub fn translate<P: ProgramModel + ?Sized>(mut self, program: &P) -> QirResult<GeneratedModule> {
        self.options.validate()?;
        let profile = self.options.profile;
        let count = program.instruction_count();

        self.advance();
        info!(
            "Translating program with {} instructions over {} qubits and {} classical bits",
            count,
            program.qubit_count(),
            program.classical_bit_count()
        );
        let module_name = sanitize_module_name(
            self.options
                .module_name
                .as_deref()
                .unwrap_or_else(|| program.name()),
        );
        let mut lowering = Lowering::new(
            profile,
            ModuleBuilder::new(module_name, self.options.entry_point.clone()),
            program.qubit_count(),
            program.classical_bit_count(),
        );
        for index in 0..count {
            let instruction = program
                .instruction_at(index)
                .ok_or(IrError::InstructionOutOfRange { index, count })?;
            lowering.lower(index, instruction)?;
        }

        self.advance();
        lowering.record_outputs()?;

        self.advance();
        let module = lowering.finish(self.options.emit_module_flags);
        let generated = GeneratedModule::new(module, profile)?;
        info!(
            "Translation complete: requiredQubits={}, requiredResults={}",
            generated.required_qubits(),
            generated.required_results()
        );
        Ok(generated)
    }

    fn advance(&mut self) {
        if let Some(next) = self.state.successor() {
            debug!("Generator state {:?} -> {:?}", self.state, next);
            self.state = next;
        }
    }
}

/// Per-translation lowering state.
struct Lowering {
    profile: Profile,
    capabilities: Capabilities,
    builder: ModuleBuilder,
    handles: HandleTable,
    /// Qubits measured so far, for profiles without qubit reuse.
    measured_qubits: FxHashSet<u32>,
    /// Counter for labels and condition values of conditional regions.
    regions: usize,
}

impl Lowering {
    fn new(profile: Profile, builder: ModuleBuilder, qubits: u32, clbits: u32) -> Self {
        let capabilities = profile.capabilities();
        Self {
            profile,
            capabilities,
            builder,
            handles: HandleTable::new(profile.addressing(), qubits, clbits)
                .with_bounds(capabilities.static_register_sizes),
            measured_qubits: FxHashSet::default(),
            regions: 0,
        }
    }

    fn lower(&mut self, index: usize, instruction: &Instruction) -> QirResult<()> {
        let name = instruction.name();
        let op = QisOp::from_name(name).ok_or_else(|| QirError::UnsupportedInstruction {
            name: name.to_string(),
            index,
        })?;
        self.check_shape(op, index, instruction)?;

        if instruction.condition.is_some() {
            if op == QisOp::Measure {
                return Err(self.unavailable("conditional measurement"));
            }
            if !self.capabilities.branch_on_result {
                return Err(self.unavailable("branch on measurement result"));
            }
        }

        // Operands resolve before any branch so their handles dominate later uses.
        let mut qubits = Vec::with_capacity(instruction.qubits.len());
        for qubit in &instruction.qubits {
            if op.acts_on_qubits()
                && !self.capabilities.qubit_reuse
                && self.measured_qubits.contains(&qubit.0)
            {
                return Err(self.unavailable("qubit use after measurement"));
            }
            qubits.push(self.handles.qubit(qubit.0, &mut self.builder)?);
        }

        match &instruction.condition {
            None => self.emit(op, instruction, qubits)?,
            Some(condition) => self.emit_conditional(op, index, instruction, condition, qubits)?,
        }
        trace!(index, name, "lowered instruction");
        Ok(())
    }

    fn check_shape(&self, op: QisOp, index: usize, instruction: &Instruction) -> QirResult<()> {
        let invalid = |reason: String| QirError::InvalidOperands {
            name: instruction.name.clone(),
            index,
            reason,
        };
        let qubits = instruction.qubits.len();
        let clbits = instruction.clbits.len();
        let duplicate = || {
            let mut seen = FxHashSet::default();
            instruction
                .qubits
                .iter()
                .find(|q| !seen.insert(q.0))
                .map(|dup| invalid(format!("duplicate qubit operand {dup}")))
        };

        match op.arity() {
            Arity::Exact(n) => {
                if qubits != n {
                    return Err(invalid(format!("expected {n} qubit(s), got {qubits}")));
                }
                if let Some(err) = duplicate() {
                    return Err(err);
                }
            }
            Arity::Paired => {
                if qubits == 0 || qubits != clbits {
                    return Err(invalid(format!(
                        "expected matching qubit and classical bit operands, got {qubits} and {clbits}"
                    )));
                }
                // Each qubit is measured once per instruction.
                if let Some(err) = duplicate() {
                    return Err(err);
                }
            }
            Arity::Any => {}
        }
        if op.arity() != Arity::Paired && clbits != 0 {
            return Err(invalid(format!("unexpected classical bit operands ({clbits})")));
        }

        let (min, max) = op.params();
        let params = instruction.params.len();
        if params < min || params > max {
            return Err(invalid(if min == max {
                format!("expected {min} parameter(s), got {params}")
            } else {
                format!("expected {min} to {max} parameter(s), got {params}")
            }));
        }

        // Statically sized registers report undeclared bits as a resource mismatch when resolving.
        if !self.capabilities.static_register_sizes {
            let declared = self.handles.declared_results();
            if let Some(bit) = instruction.clbits.iter().find(|c| c.0 >= declared) {
                return Err(invalid(format!("classical bit {bit} is not declared")));
            }
        }
        Ok(())
    }

    fn emit(&mut self, op: QisOp, instruction: &Instruction, qubits: Vec<Value>) -> QirResult<()> {
        match op {
            QisOp::Measure => {
                for ((qubit, value), clbit) in
                    instruction.qubits.iter().zip(qubits).zip(&instruction.clbits)
                {
                    self.handles.measure(value, clbit.0, &mut self.builder)?;
                    self.measured_qubits.insert(qubit.0);
                }
            }
            QisOp::Barrier => {
                self.builder.build_call(qis::BARRIER, vec![], None);
            }
            QisOp::Id | QisOp::Delay => {}
            _ => {
                if let Some(callee) = op.callee() {
                    let args = instruction
                        .params
                        .iter()
                        .map(|&p| Value::Double(p))
                        .chain(qubits)
                        .collect();
                    self.builder.build_call(callee, args, None);
                }
            }
        }
        Ok(())
    }

    /// Lower a guarded instruction as a chain of result tests.
    ///
    /// Each compared bit is read and branched on in turn; a mismatch jumps to
    /// the continuation, a match falls through to the next test and finally
    /// to the body.
    fn emit_conditional(
        &mut self,
        op: QisOp,
        index: usize,
        instruction: &Instruction,
        condition: &ClassicalCondition,
        qubits: Vec<Value>,
    ) -> QirResult<()> {
        let invalid = |reason: String| QirError::InvalidOperands {
            name: instruction.name.clone(),
            index,
            reason,
        };
        if condition.clbits.is_empty() {
            return Err(invalid("condition compares no classical bits".into()));
        }
        if !condition.fits() {
            return Err(invalid(format!(
                "condition value {} does not fit in {} bit(s)",
                condition.value,
                condition.clbits.len()
            )));
        }
        let mut tests = Vec::with_capacity(condition.clbits.len());
        for (clbit, expected) in condition.expectations() {
            let result = self
                .handles
                .measured(clbit.0)
                .cloned()
                .ok_or_else(|| invalid(format!("condition bit {clbit} was never measured")))?;
            tests.push((result, expected));
        }

        let region = self.regions;
        self.regions += 1;
        let mut targets: Vec<BlockRef> = (1..tests.len())
            .map(|k| self.builder.append_block(format!("cond{region}.{k}")))
            .collect();
        let body = self.builder.append_block(format!("then{region}"));
        let continuation = self.builder.append_block(format!("continue{region}"));
        targets.push(body);

        for (k, ((result, expected), next)) in tests.into_iter().zip(targets).enumerate() {
            let bit = self
                .builder
                .build_call(qis::READ_RESULT, vec![result], Some(format!("c{region}.{k}")))
                .unwrap_or(Value::Bool(false));
            if expected {
                self.builder.build_cond_br(bit, next, continuation);
            } else {
                self.builder.build_cond_br(bit, continuation, next);
            }
            self.builder.position_at_end(next);
        }

        self.emit(op, instruction, qubits)?;
        self.builder.build_br(continuation);
        self.builder.position_at_end(continuation);
        debug!("Lowered conditional region {} for instruction {}", region, index);
        Ok(())
    }

    /// Batched recording of every declared classical bit, ascending.
    ///
    /// Bits no measurement wrote record the runtime's zero result, fetched
    /// once ahead of the batch.
    fn record_outputs(&mut self) -> QirResult<()> {
        let declared = self.handles.declared_results();
        let recorded = (0..declared)
            .map(|clbit| self.handles.recorded(clbit))
            .collect::<QirResult<Vec<_>>>()?;

        let zero = match (0..declared).zip(&recorded).find(|(_, r)| r.is_none()) {
            Some((clbit, _)) => {
                debug!("Classical bit {} was never measured, recording zero", clbit);
                let zero = self
                    .builder
                    .build_call(qis::RESULT_GET_ZERO, vec![], Some("zero".into()))
                    .ok_or(QirError::RecordingOmission { clbit })?;
                Some(zero)
            }
            None => None,
        };

        self.builder.build_call(qis::ARRAY_START_RECORD, vec![], None);
        for (clbit, result) in (0..declared).zip(recorded) {
            let result = result
                .or_else(|| zero.clone())
                .ok_or(QirError::RecordingOmission { clbit })?;
            self.builder.build_call(qis::RESULT_RECORD, vec![result], None);
        }
        self.builder.build_call(qis::ARRAY_END_RECORD, vec![], None);
        debug!("Recorded {} classical bits", declared);
        Ok(())
    }

    fn finish(mut self, emit_module_flags: bool) -> Module {
        self.handles.release_all(&mut self.builder);
        self.builder.build_ret();

        let dynamic = self.handles.mode() == AddressingMode::Dynamic;
        self.builder.set_attribute(ENTRY_POINT_ATTR, None);
        self.builder.set_attribute(
            REQUIRED_QUBITS_ATTR,
            Some(self.handles.required_qubits().to_string()),
        );
        self.builder.set_attribute(
            REQUIRED_RESULTS_ATTR,
            Some(self.handles.required_results().to_string()),
        );
        self.builder.set_attribute(
            QIR_PROFILES_ATTR,
            Some(self.profile.qir_profile_name().to_string()),
        );

        if emit_module_flags {
            self.builder
                .add_flag(ModuleFlag::new(1, "qir_major_version", FlagValue::Int(1)));
            self.builder
                .add_flag(ModuleFlag::new(7, "qir_minor_version", FlagValue::Int(0)));
            self.builder.add_flag(ModuleFlag::new(
                1,
                "dynamic_qubit_management",
                FlagValue::Bool(dynamic),
            ));
            self.builder.add_flag(ModuleFlag::new(
                1,
                "dynamic_result_management",
                FlagValue::Bool(dynamic),
            ));
        }

        self.builder.finish()
    }

    fn unavailable(&self, capability: &'static str) -> QirError {
        QirError::CapabilityUnavailable {
            capability,
            profile: self.profile,
        }
    }
}

/// The result of a successful translation.
///
/// Both output forms are produced together, so holding a `GeneratedModule`
/// means translation succeeded.
#[derive(Clone)]
pub struct GeneratedModule {
    module: Module,
    text: String,
    bytes: Vec<u8>,
    profile: Profile,
}

impl GeneratedModule {
    fn new(module: Module, profile: Profile) -> QirResult<Self> {
        let text = module.to_text();
        let bytes = bitcode::ir_to_bitcode(&text, &module.name)?;
        Ok(Self {
            module,
            text,
            bytes,
            profile,
        })
    }

    /// Textual IR.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// LLVM bitcode of the same module.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The in-memory module.
    pub fn module(&self) -> &Module {
        &self.module
    }

    /// Take the in-memory module.
    pub fn into_module(self) -> Module {
        self.module
    }

    /// The profile the module was generated for.
    pub fn profile(&self) -> Profile {
        self.profile
    }

    /// The frozen `requiredQubits` attribute.
    pub fn required_qubits(&self) -> u32 {
        self.entry_int(REQUIRED_QUBITS_ATTR)
    }

    /// The frozen `requiredResults` attribute.
    pub fn required_results(&self) -> u32 {
        self.entry_int(REQUIRED_RESULTS_ATTR)
    }

    /// All entry-point attributes.
    pub fn entry_attributes(&self) -> BTreeMap<String, Option<String>> {
        self.module.entry_attributes()
    }

    fn entry_int(&self, key: &str) -> u32 {
        self.module
            .entry_point()
            .and_then(|f| f.int_attribute(key))
            .unwrap_or(0)
    }
}

impl fmt::Debug for GeneratedModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratedModule")
            .field("name", &self.module.name)
            .field("profile", &self.profile)
            .field("required_qubits", &self.required_qubits())
            .field("required_results", &self.required_results())
            .field("bytes", &self.bytes.len())
            .finish_non_exhaustive()
    }
}
