//! Incremental construction of a [`Module`].

use rustc_hash::FxHashSet;

use super::{
    Attribute, BasicBlock, Callee, Declaration, Function, Instruction, Module, ModuleFlag, Type,
    Value,
};

/// Handle to a block of the current function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockRef(usize);

/// Appends instructions to a module at a movable insertion point.
///
/// The builder always has a current function: it is created together with
/// the first one, and [`ModuleBuilder::create_function`] switches to a new
/// one. Callee declarations are added to the module on first use.
#[derive(Debug)]
pub struct ModuleBuilder {
    module: Module,
    function: usize,
    block: usize,
    declared: FxHashSet<&'static str>,
}

impl ModuleBuilder {
    /// Create a module holding one function, positioned at its `entry` block.
    pub fn new(module_name: impl Into<String>, function_name: impl Into<String>) -> Self {
        let mut module = Module::new(module_name);
        module.functions.push(Function::new(function_name));
        Self {
            module,
            function: 0,
            block: 0,
            declared: FxHashSet::default(),
        }
    }

    /// Add another function and position at its `entry` block.
    pub fn create_function(&mut self, name: impl Into<String>) -> BlockRef {
        self.module.functions.push(Function::new(name));
        self.function = self.module.functions.len() - 1;
        self.block = 0;
        BlockRef(0)
    }

    /// Append an empty block to the current function.
    pub fn append_block(&mut self, label: impl Into<String>) -> BlockRef {
        let blocks = &mut self.current_function_mut().blocks;
        blocks.push(BasicBlock::new(label));
        BlockRef(blocks.len() - 1)
    }

    /// Move the insertion point to the end of `block`.
    pub fn position_at_end(&mut self, block: BlockRef) {
        self.block = block.0;
    }

    /// The block instructions are currently appended to.
    pub fn insertion_block(&self) -> BlockRef {
        BlockRef(self.block)
    }

    /// Label of `block` in the current function.
    pub fn label(&self, block: BlockRef) -> &str {
        &self.current_function().blocks[block.0].label
    }

    /// Append a call, binding its return value to `%result` when given.
    ///
    /// Returns the bound value for non-void callees with a result name.
    pub fn build_call(
        &mut self,
        callee: Callee,
        args: Vec<Value>,
        result: Option<String>,
    ) -> Option<Value> {
        debug_assert_eq!(callee.params.len(), args.len(), "{}", callee.name);
        if self.declared.insert(callee.name) {
            self.module.declarations.push(Declaration::from(callee));
        }

        let bound = match (&result, callee.ret) {
            (_, Type::Void) | (None, _) => None,
            (Some(name), ty) => Some(Value::Local(ty, name.clone())),
        };
        self.push(Instruction::Call {
            callee: callee.name.to_string(),
            ret: callee.ret,
            args,
            result: result.filter(|_| callee.ret != Type::Void),
        });
        bound
    }

    /// Append an unconditional branch to `target`.
    pub fn build_br(&mut self, target: BlockRef) {
        let target = self.label(target).to_string();
        self.push(Instruction::Br { target });
    }

    /// Append a conditional branch.
    pub fn build_cond_br(&mut self, cond: Value, then_block: BlockRef, else_block: BlockRef) {
        let then_label = self.label(then_block).to_string();
        let else_label = self.label(else_block).to_string();
        self.push(Instruction::CondBr {
            cond,
            then_label,
            else_label,
        });
    }

    /// Append `ret void`.
    pub fn build_ret(&mut self) {
        self.push(Instruction::Ret);
    }

    /// Set a string attribute on the current function, replacing any previous value.
    pub fn set_attribute(&mut self, key: impl Into<String>, value: Option<String>) {
        let key = key.into();
        let attributes = &mut self.current_function_mut().attributes;
        match attributes.iter_mut().find(|a| a.key == key) {
            Some(existing) => existing.value = value,
            None => attributes.push(Attribute { key, value }),
        }
    }

    /// Add a module flag.
    pub fn add_flag(&mut self, flag: ModuleFlag) {
        self.module.flags.push(flag);
    }

    /// Number of instructions in the current function.
    pub fn instruction_count(&self) -> usize {
        self.current_function().instructions().count()
    }

    /// Finish construction.
    pub fn finish(self) -> Module {
        self.module
    }

    fn push(&mut self, instruction: Instruction) {
        let block = self.block;
        self.current_function_mut().blocks[block]
            .instructions
            .push(instruction);
    }

    fn current_function(&self) -> &Function {
        &self.module.functions[self.function]
    }

    fn current_function_mut(&mut self) -> &mut Function {
        &mut self.module.functions[self.function]
    }
}
