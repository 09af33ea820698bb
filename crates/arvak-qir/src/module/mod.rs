//! In-memory QIR module model.
//!
//! A deliberately small slice of LLVM IR: opaque `%Qubit`/`%Result` pointer
//! types, one or more functions made of labelled blocks holding calls and
//! terminators, external declarations, string attributes and module flags.
//! [`ModuleBuilder`] appends to it, [`text`] renders it and [`bitcode`]
//! hands the rendered text to LLVM for bitcode.

pub mod bitcode;
mod builder;
pub mod text;

use std::collections::BTreeMap;

pub use builder::{BlockRef, ModuleBuilder};

/// Attribute marking the entry point of a QIR program.
pub const ENTRY_POINT_ATTR: &str = "EntryPoint";
/// Attribute carrying the number of qubits the entry point needs.
pub const REQUIRED_QUBITS_ATTR: &str = "requiredQubits";
/// Attribute carrying the number of results the entry point needs.
pub const REQUIRED_RESULTS_ATTR: &str = "requiredResults";
/// Attribute naming the profile the module conforms to.
pub const QIR_PROFILES_ATTR: &str = "qir_profiles";

/// IR value types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
    /// `void`
    Void,
    /// `i1`
    Bool,
    /// `i64`
    Int,
    /// `double`
    Double,
    /// `%Qubit*`
    Qubit,
    /// `%Result*`
    Result,
}

/// An operand or call result.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Typed null pointer constant.
    Null(Type),
    /// Pointer constant `inttoptr (i64 n to T)`.
    IntToPtr(Type, u64),
    /// Named SSA value `%name`.
    Local(Type, String),
    /// Floating-point constant.
    Double(f64),
    /// Integer constant.
    Int(i64),
    /// Boolean constant.
    Bool(bool),
}

impl Value {
    /// Static pointer handle for `index`: null for 0, `inttoptr` otherwise.
    pub fn pointer(ty: Type, index: u32) -> Self {
        if index == 0 {
            Value::Null(ty)
        } else {
            Value::IntToPtr(ty, u64::from(index))
        }
    }

    /// Static qubit handle.
    pub fn static_qubit(index: u32) -> Self {
        Self::pointer(Type::Qubit, index)
    }

    /// Static result handle.
    pub fn static_result(index: u32) -> Self {
        Self::pointer(Type::Result, index)
    }

    /// The type of this value.
    pub fn ty(&self) -> Type {
        match self {
            Value::Null(ty) | Value::IntToPtr(ty, _) | Value::Local(ty, _) => *ty,
            Value::Double(_) => Type::Double,
            Value::Int(_) => Type::Int,
            Value::Bool(_) => Type::Bool,
        }
    }
}

/// Signature of an external runtime function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Callee {
    /// Symbol name.
    pub name: &'static str,
    /// Return type.
    pub ret: Type,
    /// Parameter types.
    pub params: &'static [Type],
}

impl Callee {
    /// Define a callee signature.
    pub const fn new(name: &'static str, ret: Type, params: &'static [Type]) -> Self {
        Self { name, ret, params }
    }
}

/// An external function declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Declaration {
    /// Symbol name.
    pub name: String,
    /// Return type.
    pub ret: Type,
    /// Parameter types.
    pub params: Vec<Type>,
}

impl From<Callee> for Declaration {
    fn from(callee: Callee) -> Self {
        Self {
            name: callee.name.to_string(),
            ret: callee.ret,
            params: callee.params.to_vec(),
        }
    }
}

/// A single instruction inside a basic block.
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    /// Call an external function, optionally binding its result.
    Call {
        /// Callee symbol.
        callee: String,
        /// Return type.
        ret: Type,
        /// Arguments, in order.
        args: Vec<Value>,
        /// SSA name bound to the return value.
        result: Option<String>,
    },
    /// Unconditional branch.
    Br {
        /// Target block label.
        target: String,
    },
    /// Conditional branch on an `i1` value.
    CondBr {
        /// The branch condition.
        cond: Value,
        /// Label taken when the condition is true.
        then_label: String,
        /// Label taken when the condition is false.
        else_label: String,
    },
    /// `ret void`
    Ret,
}

impl Instruction {
    /// Whether this instruction ends a block.
    pub fn is_terminator(&self) -> bool {
        matches!(
            self,
            Instruction::Br { .. } | Instruction::CondBr { .. } | Instruction::Ret
        )
    }

    /// The callee symbol, for calls.
    pub fn callee(&self) -> Option<&str> {
        match self {
            Instruction::Call { callee, .. } => Some(callee),
            _ => None,
        }
    }
}

/// A labelled straight-line sequence of instructions.
#[derive(Debug, Clone, PartialEq)]
pub struct BasicBlock {
    /// Block label.
    pub label: String,
    /// Instructions, the last of which is a terminator once finished.
    pub instructions: Vec<Instruction>,
}

impl BasicBlock {
    /// Create an empty block.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            instructions: vec![],
        }
    }

    /// Whether the block ends in a terminator.
    pub fn is_terminated(&self) -> bool {
        self.instructions.last().is_some_and(Instruction::is_terminator)
    }
}

/// A string function attribute, with or without a value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Attribute {
    /// Attribute key.
    pub key: String,
    /// Attribute value, if any.
    pub value: Option<String>,
}

/// A function definition with no parameters returning `void`.
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    /// Function name.
    pub name: String,
    /// String attributes, in insertion order.
    pub attributes: Vec<Attribute>,
    /// Basic blocks; the first is the entry block.
    pub blocks: Vec<BasicBlock>,
}

impl Function {
    /// Create a function with a single empty `entry` block.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: vec![],
            blocks: vec![BasicBlock::new("entry")],
        }
    }

    /// Look up an attribute: `None` if absent, `Some(None)` for a bare key.
    pub fn attribute(&self, key: &str) -> Option<Option<&str>> {
        self.attributes
            .iter()
            .find(|a| a.key == key)
            .map(|a| a.value.as_deref())
    }

    /// Whether this function carries the entry-point attribute.
    pub fn is_entry_point(&self) -> bool {
        self.attribute(ENTRY_POINT_ATTR).is_some()
    }

    /// Parse an integer-valued attribute.
    pub fn int_attribute(&self, key: &str) -> Option<u32> {
        self.attribute(key).flatten().and_then(|v| v.parse().ok())
    }

    /// Iterate over all instructions in block order.
    pub fn instructions(&self) -> impl Iterator<Item = &Instruction> {
        self.blocks.iter().flat_map(|b| b.instructions.iter())
    }
}

/// Value of a module flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlagValue {
    /// `i32 n`
    Int(i32),
    /// `i1 b`
    Bool(bool),
}

/// An entry of `!llvm.module.flags`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModuleFlag {
    /// LLVM merge behavior (1 = error, 7 = max).
    pub behavior: u32,
    /// Flag key.
    pub key: String,
    /// Flag value.
    pub value: FlagValue,
}

impl ModuleFlag {
    /// Create a module flag.
    pub fn new(behavior: u32, key: impl Into<String>, value: FlagValue) -> Self {
        Self {
            behavior,
            key: key.into(),
            value,
        }
    }
}

/// A complete QIR module.
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    /// Module identifier and source file name.
    pub name: String,
    /// Function definitions.
    pub functions: Vec<Function>,
    /// External declarations, in first-use order.
    pub declarations: Vec<Declaration>,
    /// Module flags.
    pub flags: Vec<ModuleFlag>,
}

impl Module {
    /// Create an empty module.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            functions: vec![],
            declarations: vec![],
            flags: vec![],
        }
    }

    /// The function tagged with the entry-point attribute.
    pub fn entry_point(&self) -> Option<&Function> {
        self.functions.iter().find(|f| f.is_entry_point())
    }

    /// Attributes of the entry point as a key/value map (empty if none).
    pub fn entry_attributes(&self) -> BTreeMap<String, Option<String>> {
        self.entry_point()
            .map(|f| {
                f.attributes
                    .iter()
                    .map(|a| (a.key.clone(), a.value.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Render the module as textual IR.
    pub fn to_text(&self) -> String {
        text::render_module(self)
    }
}
