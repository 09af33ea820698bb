//! Qubit and result handle resolution.
//!
//! The [`AddressingMode`] is chosen once per translation from the profile and
//! a [`HandleTable`] carries it, together with the resource counters, through
//! every resolve call.

use rustc_hash::FxHashMap;
use tracing::trace;

use crate::error::{QirError, QirResult, ResourceKind};
use crate::module::{ModuleBuilder, Value};
use crate::qis;

/// How qubit and result handles are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressingMode {
    /// Handles are constants derived from the index (`null` for 0, `inttoptr` otherwise).
    Static,
    /// Handles are returned by runtime allocation and measurement calls.
    Dynamic,
}

/// Handle bookkeeping and resource counters for a single translation.
#[derive(Debug)]
pub struct HandleTable {
    mode: AddressingMode,
    /// Reject static indices beyond the declared sizes instead of growing the counters.
    bounded: bool,
    declared_qubits: u32,
    declared_results: u32,
    required_qubits: u32,
    required_results: u32,
    /// Dynamic qubit handles by index.
    qubits: FxHashMap<u32, Value>,
    /// Qubit indices in allocation order.
    allocation_order: Vec<u32>,
    /// Most recent result bound to each classical bit.
    results: FxHashMap<u32, Value>,
}

impl HandleTable {
    /// Create a table for a program with the given declared sizes.
    ///
    /// Static counters start at the declared sizes, dynamic ones at zero.
    /// Static tables are bounded by default.
    pub fn new(mode: AddressingMode, declared_qubits: u32, declared_results: u32) -> Self {
        let (required_qubits, required_results) = match mode {
            AddressingMode::Static => (declared_qubits, declared_results),
            AddressingMode::Dynamic => (0, 0),
        };
        Self {
            mode,
            bounded: mode == AddressingMode::Static,
            declared_qubits,
            declared_results,
            required_qubits,
            required_results,
            qubits: FxHashMap::default(),
            allocation_order: vec![],
            results: FxHashMap::default(),
        }
    }

    /// Enable or disable the declared-size check on static indices.
    ///
    /// An unbounded static table grows `requiredQubits`/`requiredResults` to
    /// the highest index referenced.
    #[must_use]
    pub fn with_bounds(mut self, bounded: bool) -> Self {
        self.bounded = bounded;
        self
    }

    /// The addressing mode in effect.
    pub fn mode(&self) -> AddressingMode {
        self.mode
    }

    /// Final or running `requiredQubits`.
    pub fn required_qubits(&self) -> u32 {
        self.required_qubits
    }

    /// Final or running `requiredResults`.
    pub fn required_results(&self) -> u32 {
        self.required_results
    }

    /// Resolve a qubit index, allocating it first under dynamic addressing.
    pub fn qubit(&mut self, index: u32, builder: &mut ModuleBuilder) -> QirResult<Value> {
        match self.mode {
            AddressingMode::Static => {
                if self.bounded {
                    check_bound(ResourceKind::Qubit, index, self.declared_qubits)?;
                } else {
                    self.required_qubits = self.required_qubits.max(index.saturating_add(1));
                }
                Ok(Value::static_qubit(index))
            }
            AddressingMode::Dynamic => {
                if let Some(handle) = self.qubits.get(&index) {
                    return Ok(handle.clone());
                }
                let handle = builder
                    .build_call(qis::QUBIT_ALLOCATE, vec![], Some(format!("q{index}")))
                    .ok_or_else(|| missing_binding(qis::QUBIT_ALLOCATE.name))?;
                trace!(qubit = index, "allocated qubit");
                self.qubits.insert(index, handle.clone());
                self.allocation_order.push(index);
                self.required_qubits += 1;
                Ok(handle)
            }
        }
    }

    /// Emit a measurement of `qubit` into classical bit `clbit`.
    pub fn measure(
        &mut self,
        qubit: Value,
        clbit: u32,
        builder: &mut ModuleBuilder,
    ) -> QirResult<()> {
        match self.mode {
            AddressingMode::Static => {
                if self.bounded {
                    check_bound(ResourceKind::Result, clbit, self.declared_results)?;
                } else {
                    self.required_results = self.required_results.max(clbit.saturating_add(1));
                }
                let result = Value::static_result(clbit);
                builder.build_call(qis::MZ, vec![qubit, result.clone()], None);
                self.results.insert(clbit, result);
            }
            AddressingMode::Dynamic => {
                let name = format!("r{}", self.required_results);
                let result = builder
                    .build_call(qis::M, vec![qubit], Some(name))
                    .ok_or_else(|| missing_binding(qis::M.name))?;
                self.required_results += 1;
                self.results.insert(clbit, result);
            }
        }
        Ok(())
    }

    /// The result most recently bound to `clbit`, if it was ever measured.
    pub fn measured(&self, clbit: u32) -> Option<&Value> {
        self.results.get(&clbit)
    }

    /// The result to record for declared classical bit `clbit`.
    ///
    /// Static slots always exist. A dynamic bit yields `None` until a
    /// measurement writes it. Bits outside the declared range have no
    /// record at all.
    pub fn recorded(&self, clbit: u32) -> QirResult<Option<Value>> {
        if clbit >= self.declared_results {
            return Err(QirError::RecordingOmission { clbit });
        }
        Ok(match self.mode {
            AddressingMode::Static => Some(Value::static_result(clbit)),
            AddressingMode::Dynamic => self.results.get(&clbit).cloned(),
        })
    }

    /// Number of declared classical bits.
    pub fn declared_results(&self) -> u32 {
        self.declared_results
    }

    /// Release every dynamically allocated qubit, in allocation order.
    pub fn release_all(&self, builder: &mut ModuleBuilder) {
        for index in &self.allocation_order {
            if let Some(handle) = self.qubits.get(index) {
                builder.build_call(qis::QUBIT_RELEASE, vec![handle.clone()], None);
            }
        }
    }
}

fn check_bound(kind: ResourceKind, index: u32, declared: u32) -> QirResult<()> {
    if index < declared {
        Ok(())
    } else {
        Err(QirError::ResourceMismatch {
            kind,
            index,
            declared,
        })
    }
}

fn missing_binding(callee: &str) -> QirError {
    QirError::InvalidOperands {
        name: callee.to_string(),
        index: 0,
        reason: "call produced no value".into(),
    }
}
