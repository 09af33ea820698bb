//! Textual IR rendering and reading.
//!
//! Output uses the typed-pointer LLVM dialect QIR consumers expect:
//! opaque `%Qubit`/`%Result` structs passed as pointers, string attributes
//! in a numbered attribute group, and `!llvm.module.flags` metadata.

use std::collections::BTreeMap;
use std::fmt::Write;

use super::{
    Attribute, BasicBlock, Declaration, FlagValue, Function, Instruction, Module, ModuleFlag,
    Type, Value,
};

/// Conversion of a model element into its textual IR form.
pub trait ToQir {
    /// Render as textual IR.
    fn to_qir(&self) -> String;
}

impl ToQir for Type {
    fn to_qir(&self) -> String {
        match self {
            Type::Void => "void",
            Type::Bool => "i1",
            Type::Int => "i64",
            Type::Double => "double",
            Type::Qubit => "%Qubit*",
            Type::Result => "%Result*",
        }
        .to_string()
    }
}

impl ToQir for Value {
    fn to_qir(&self) -> String {
        match self {
            Value::Null(ty) => format!("{} null", ty.to_qir()),
            Value::IntToPtr(ty, n) => {
                let ty = ty.to_qir();
                format!("{ty} inttoptr (i64 {n} to {ty})")
            }
            Value::Local(ty, name) => format!("{} %{name}", ty.to_qir()),
            Value::Double(d) => format!("double {}", format_double(*d)),
            Value::Int(i) => format!("i64 {i}"),
            Value::Bool(b) => format!("i1 {b}"),
        }
    }
}

impl ToQir for Instruction {
    fn to_qir(&self) -> String {
        match self {
            Instruction::Call {
                callee,
                ret,
                args,
                result,
            } => {
                let args = args
                    .iter()
                    .map(ToQir::to_qir)
                    .collect::<Vec<_>>()
                    .join(", ");
                match result {
                    Some(name) => format!("  %{name} = call {} @{callee}({args})", ret.to_qir()),
                    None => format!("  call {} @{callee}({args})", ret.to_qir()),
                }
            }
            Instruction::Br { target } => format!("  br label %{target}"),
            Instruction::CondBr {
                cond,
                then_label,
                else_label,
            } => format!(
                "  br {}, label %{then_label}, label %{else_label}",
                cond.to_qir()
            ),
            Instruction::Ret => "  ret void".to_string(),
        }
    }
}

impl ToQir for BasicBlock {
    fn to_qir(&self) -> String {
        let mut out = format!("{}:\n", self.label);
        for instruction in &self.instructions {
            out.push_str(&instruction.to_qir());
            out.push('\n');
        }
        out
    }
}

impl ToQir for Declaration {
    fn to_qir(&self) -> String {
        let params = self
            .params
            .iter()
            .map(ToQir::to_qir)
            .collect::<Vec<_>>()
            .join(", ");
        format!("declare {} @{}({params})", self.ret.to_qir(), self.name)
    }
}

impl ToQir for Attribute {
    fn to_qir(&self) -> String {
        match &self.value {
            Some(value) => format!("\"{}\"=\"{value}\"", self.key),
            None => format!("\"{}\"", self.key),
        }
    }
}

impl ToQir for ModuleFlag {
    fn to_qir(&self) -> String {
        let value = match self.value {
            FlagValue::Int(i) => format!("i32 {i}"),
            FlagValue::Bool(b) => format!("i1 {b}"),
        };
        format!("!{{i32 {}, !\"{}\", {value}}}", self.behavior, self.key)
    }
}

fn render_function(function: &Function, group: Option<usize>) -> String {
    let mut out = match group {
        Some(id) => format!("define void @{}() #{id} {{\n", function.name),
        None => format!("define void @{}() {{\n", function.name),
    };
    for (i, block) in function.blocks.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(&block.to_qir());
    }
    out.push_str("}\n");
    out
}

/// Render a complete module.
pub fn render_module(module: &Module) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "; ModuleID = '{}'", module.name);
    let _ = writeln!(out, "source_filename = \"{}\"", module.name);
    out.push('\n');
    out.push_str("%Qubit = type opaque\n");
    out.push_str("%Result = type opaque\n");

    // Attribute groups are numbered in function order, skipping functions without attributes.
    let mut groups = vec![];
    for function in &module.functions {
        let group = if function.attributes.is_empty() {
            None
        } else {
            groups.push(&function.attributes);
            Some(groups.len() - 1)
        };
        out.push('\n');
        out.push_str(&render_function(function, group));
    }

    if !module.declarations.is_empty() {
        out.push('\n');
        for declaration in &module.declarations {
            out.push_str(&declaration.to_qir());
            out.push('\n');
        }
    }

    for (id, attributes) in groups.iter().enumerate() {
        let body = attributes
            .iter()
            .map(ToQir::to_qir)
            .collect::<Vec<_>>()
            .join(" ");
        let _ = write!(out, "\nattributes #{id} = {{ {body} }}\n");
    }

    if !module.flags.is_empty() {
        let refs = (0..module.flags.len())
            .map(|i| format!("!{i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let _ = write!(out, "\n!llvm.module.flags = !{{{refs}}}\n");
        for (i, flag) in module.flags.iter().enumerate() {
            let _ = writeln!(out, "!{i} = {}", flag.to_qir());
        }
    }

    out
}

/// Render a double so that re-parsing yields the identical IEEE value.
///
/// Values whose six-digit exponential form parses back to the same bits
/// print that way (`1.500000e+00`); everything else, including non-finite
/// values, prints as a 64-bit hex constant.
pub fn format_double(value: f64) -> String {
    if value.is_finite() {
        let short = format!("{value:.6e}");
        if let Some((mantissa, exponent)) = short.split_once('e') {
            if let Ok(exponent) = exponent.parse::<i32>() {
                let sign = if exponent < 0 { '-' } else { '+' };
                let text = format!("{mantissa}e{sign}{:02}", exponent.unsigned_abs());
                if text.parse::<f64>().is_ok_and(|v| v.to_bits() == value.to_bits()) {
                    return text;
                }
            }
        }
    }
    format!("0x{:016X}", value.to_bits())
}

/// Read the entry point's attributes back from textual IR.
///
/// Finds the attribute group referenced by a `define` whose group contains
/// `"EntryPoint"` and returns its keys and values. Returns an empty map if
/// no entry point is present.
pub fn entry_attributes(text: &str) -> BTreeMap<String, Option<String>> {
    let mut groups: BTreeMap<&str, BTreeMap<String, Option<String>>> = BTreeMap::new();
    let mut referenced = vec![];

    for line in text.lines().map(str::trim) {
        if let Some(rest) = line.strip_prefix("attributes #") {
            if let Some((id, body)) = rest.split_once('=') {
                let body = body.trim().trim_start_matches('{').trim_end_matches('}');
                groups.insert(id.trim(), parse_attribute_group(body));
            }
        } else if line.starts_with("define ") {
            if let Some(id) = line
                .rsplit_once('#')
                .and_then(|(_, tail)| tail.split_whitespace().next())
            {
                referenced.push(id.to_string());
            }
        }
    }

    referenced
        .iter()
        .filter_map(|id| groups.get(id.as_str()))
        .find(|group| group.contains_key(super::ENTRY_POINT_ATTR))
        .cloned()
        .unwrap_or_default()
}

fn parse_attribute_group(body: &str) -> BTreeMap<String, Option<String>> {
    let mut attrs = BTreeMap::new();
    let mut chars = body.chars().peekable();

    let read_quoted = |chars: &mut std::iter::Peekable<std::str::Chars<'_>>| {
        let mut s = String::new();
        for c in chars.by_ref() {
            if c == '"' {
                break;
            }
            s.push(c);
        }
        s
    };

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }
        let key = if c == '"' {
            chars.next();
            read_quoted(&mut chars)
        } else {
            let mut word = String::new();
            while let Some(&c) = chars.peek() {
                if c.is_whitespace() || c == '=' {
                    break;
                }
                word.push(c);
                chars.next();
            }
            word
        };
        let value = if chars.peek() == Some(&'=') {
            chars.next();
            if chars.peek() == Some(&'"') {
                chars.next();
            }
            Some(read_quoted(&mut chars))
        } else {
            None
        };
        attrs.insert(key, value);
    }

    attrs
}
