//! LLVM bitcode output and read-back.
//!
//! The textual IR is the source of truth. It is parsed by LLVM, verified and
//! written out as bitcode, so every consumer built on LLVM loads exactly the
//! module that [`super::text`] rendered. Reading bitcode back goes through
//! LLVM as well.

use std::collections::BTreeMap;

use inkwell::attributes::AttributeLoc;
use inkwell::context::Context;
use inkwell::memory_buffer::MemoryBuffer;
use inkwell::module::Module as LlvmModule;
use inkwell::values::{BasicMetadataValueEnum, FunctionValue};
use tracing::debug;

use super::{ENTRY_POINT_ATTR, QIR_PROFILES_ATTR, REQUIRED_QUBITS_ATTR, REQUIRED_RESULTS_ATTR};
use crate::error::{QirError, QirResult};
use crate::profile::Profile;

/// Leading bytes of every raw LLVM bitcode file.
pub const BITCODE_MAGIC: [u8; 4] = [b'B', b'C', 0xC0, 0xDE];

/// Parse textual IR with LLVM, verify it and serialize it as bitcode.
///
/// # Errors
/// Returns [`QirError::InvalidIr`] if LLVM rejects the text.
pub fn ir_to_bitcode(ir: &str, name: &str) -> QirResult<Vec<u8>> {
    let ctx = Context::create();
    let buffer = MemoryBuffer::create_from_memory_range_copy(ir.as_bytes(), name);
    let module = ctx
        .create_module_from_ir(buffer)
        .map_err(|e| QirError::InvalidIr(format!("failed to parse IR: {e}")))?;
    module
        .verify()
        .map_err(|e| QirError::InvalidIr(format!("verification failed: {e}")))?;

    let bytes = module.write_bitcode_to_memory().as_slice().to_vec();
    debug!("Wrote {} bytes of bitcode for module '{}'", bytes.len(), name);
    Ok(bytes)
}

/// A QIR module loaded back from bitcode.
///
/// Holds owned copies of what consumers inspect, so no LLVM context
/// outlives [`BitcodeModule::parse`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitcodeModule {
    source_filename: String,
    entry_point: String,
    entry_attributes: BTreeMap<String, Option<String>>,
    flags: BTreeMap<String, u64>,
    ir: String,
}

impl BitcodeModule {
    /// Load bitcode through LLVM.
    ///
    /// # Errors
    /// Returns [`QirError::MalformedBitcode`] if the bytes are not LLVM
    /// bitcode, LLVM cannot read them, or no function carries the
    /// `EntryPoint` attribute.
    pub fn parse(bytes: &[u8]) -> QirResult<Self> {
        if !bytes.starts_with(&BITCODE_MAGIC) {
            return Err(QirError::MalformedBitcode(
                "missing LLVM bitcode magic".into(),
            ));
        }

        let ctx = Context::create();
        let buffer = MemoryBuffer::create_from_memory_range_copy(bytes, "bitcode");
        let module = ctx
            .create_module_from_ir(buffer)
            .map_err(|e| QirError::MalformedBitcode(e.to_string()))?;

        let entry = find_entry_point(&module).ok_or_else(|| {
            QirError::MalformedBitcode("no function carries the EntryPoint attribute".into())
        })?;
        let entry_point = entry.get_name().to_string_lossy().into_owned();

        Ok(Self {
            source_filename: module.get_source_file_name().to_string_lossy().into_owned(),
            entry_point,
            entry_attributes: string_attributes(entry),
            flags: module_flags(&module),
            ir: module.print_to_string().to_string(),
        })
    }

    /// The module's `source_filename`.
    pub fn source_filename(&self) -> &str {
        &self.source_filename
    }

    /// Name of the entry-point function.
    pub fn entry_point(&self) -> &str {
        &self.entry_point
    }

    /// String attributes of the entry point; bare keys map to `None`.
    pub fn entry_attributes(&self) -> &BTreeMap<String, Option<String>> {
        &self.entry_attributes
    }

    /// The `requiredQubits` attribute, if present and numeric.
    pub fn required_qubits(&self) -> Option<u32> {
        self.int_attribute(REQUIRED_QUBITS_ATTR)
    }

    /// The `requiredResults` attribute, if present and numeric.
    pub fn required_results(&self) -> Option<u32> {
        self.int_attribute(REQUIRED_RESULTS_ATTR)
    }

    /// The profile named by the `qir_profiles` attribute.
    pub fn profile(&self) -> QirResult<Profile> {
        match self.entry_attributes.get(QIR_PROFILES_ATTR) {
            Some(Some(name)) => name.parse(),
            _ => Err(QirError::MalformedBitcode(
                "entry point has no qir_profiles attribute".into(),
            )),
        }
    }

    /// Integer value of a `!llvm.module.flags` entry (`i1` flags read as 0/1).
    pub fn module_flag(&self, key: &str) -> Option<u64> {
        self.flags.get(key).copied()
    }

    /// LLVM's own disassembly of the module.
    pub fn ir(&self) -> &str {
        &self.ir
    }

    fn int_attribute(&self, key: &str) -> Option<u32> {
        self.entry_attributes
            .get(key)?
            .as_deref()
            .and_then(|v| v.parse().ok())
    }
}

fn find_entry_point<'ctx>(module: &LlvmModule<'ctx>) -> Option<FunctionValue<'ctx>> {
    module.get_functions().find(|function| {
        function
            .get_string_attribute(AttributeLoc::Function, ENTRY_POINT_ATTR)
            .is_some()
    })
}

fn string_attributes(function: FunctionValue<'_>) -> BTreeMap<String, Option<String>> {
    function
        .attributes(AttributeLoc::Function)
        .into_iter()
        .filter(|attr| attr.is_string())
        .filter_map(|attr| {
            let key = attr.get_string_kind_id().to_str().ok()?.to_owned();
            let value = attr.get_string_value().to_str().ok()?;
            Some((key, (!value.is_empty()).then(|| value.to_owned())))
        })
        .collect()
}

fn module_flags(module: &LlvmModule<'_>) -> BTreeMap<String, u64> {
    let mut flags = BTreeMap::new();
    for node in module.get_global_metadata("llvm.module.flags") {
        let values = node.get_node_values();
        if let [
            _,
            BasicMetadataValueEnum::MetadataValue(key),
            BasicMetadataValueEnum::IntValue(value),
        ] = values.as_slice()
        {
            let key = key.get_string_value().and_then(|s| s.to_str().ok());
            if let (Some(key), Some(value)) = (key, value.get_zero_extended_constant()) {
                flags.insert(key.to_owned(), value);
            }
        }
    }
    flags
}
