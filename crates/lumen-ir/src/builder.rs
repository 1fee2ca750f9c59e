//! The builder: the only sanctioned way to grow or rewrite the graph.
//!
//! Every mutation validates its inputs before touching the module, then
//! updates instructions and usage lists together, so the def-use graph is
//! consistent again by the time the call returns.

use crate::Module;
use crate::arena::Handle;
use crate::block::Block;
use crate::instruction::{
    Binary, BinaryKind, Case, CaseSelector, ExitSwitch, Instruction, Switch, Unary, UnaryKind,
};
use crate::interner::TypeInterner;
use crate::types::Type;
use crate::value::{Literal, RuntimeId, Usage, UsageSlot, Value, ValueKind};

/// Constructs values and instructions against one [`Module`].
///
/// Handles passed to a builder must be live handles of the same module;
/// anything else is a bug in the calling compiler phase and panics before
/// the module is modified.
pub struct Builder<'m> {
    module: &'m mut Module,
    /// `None` once `u32::MAX` has been handed out.
    next_runtime_id: Option<u32>,
}

impl<'m> Builder<'m> {
    /// Creates a builder whose runtime IDs continue after the highest ID
    /// already present in `module` (0 for a fresh module).
    pub fn new(module: &'m mut Module) -> Self {
        let next = match module.values.iter().filter_map(|(_, v)| v.id()).max() {
            Some(RuntimeId(highest)) => highest.checked_add(1),
            None => Some(0),
        };
        Self {
            module,
            next_runtime_id: next,
        }
    }

    /// Returns the module being built.
    pub fn module(&self) -> &Module {
        self.module
    }

    /// Returns the module's type interner.
    pub fn types(&mut self) -> &mut TypeInterner {
        &mut self.module.types
    }

    /// Returns the ID the next runtime value will receive, or `None` once the
    /// ID space is used up.
    pub fn next_runtime_id(&self) -> Option<RuntimeId> {
        self.next_runtime_id.map(RuntimeId)
    }

    /// Pins the ID of the next runtime value. Intended for tests that assert
    /// on rendered IDs.
    pub fn set_next_runtime_id(&mut self, id: RuntimeId) {
        self.next_runtime_id = Some(id.0);
    }

    /// Wraps `literal` in a new constant value. Equal literals are not shared.
    pub fn constant(&mut self, literal: impl Into<Literal>) -> Handle<Value> {
        let literal = literal.into();
        let ty = self.module.types.intern(literal.ty());
        self.module
            .values
            .append(Value::new(ValueKind::Constant(literal), ty))
    }

    /// Creates `result: ty = lhs <kind> rhs`.
    ///
    /// # Panics
    ///
    /// Panics if `ty`, `lhs` or `rhs` is not live in this module, or if the
    /// runtime ID space is used up.
    pub fn binary(
        &mut self,
        kind: BinaryKind,
        ty: Handle<Type>,
        lhs: Handle<Value>,
        rhs: Handle<Value>,
    ) -> Handle<Instruction> {
        self.expect_type(ty);
        self.expect_value(lhs, "lhs");
        self.expect_value(rhs, "rhs");
        let result = self.runtime_value(ty);
        self.insert(Instruction::Binary(Binary {
            kind,
            operands: [lhs, rhs],
            result,
        }))
    }

    /// Creates `result: ty = <kind>val`.
    ///
    /// # Panics
    ///
    /// Panics if `ty` or `val` is not live in this module, or if the runtime
    /// ID space is used up.
    pub fn unary(
        &mut self,
        kind: UnaryKind,
        ty: Handle<Type>,
        val: Handle<Value>,
    ) -> Handle<Instruction> {
        self.expect_type(ty);
        self.expect_value(val, "val");
        let result = self.runtime_value(ty);
        self.insert(Instruction::Unary(Unary { kind, val, result }))
    }

    /// Creates `lhs & rhs`. See [`Builder::binary`].
    pub fn and(
        &mut self,
        ty: Handle<Type>,
        lhs: Handle<Value>,
        rhs: Handle<Value>,
    ) -> Handle<Instruction> {
        self.binary(BinaryKind::And, ty, lhs, rhs)
    }

    /// Creates `lhs | rhs`. See [`Builder::binary`].
    pub fn or(
        &mut self,
        ty: Handle<Type>,
        lhs: Handle<Value>,
        rhs: Handle<Value>,
    ) -> Handle<Instruction> {
        self.binary(BinaryKind::Or, ty, lhs, rhs)
    }

    /// Creates `lhs ^ rhs`. See [`Builder::binary`].
    pub fn xor(
        &mut self,
        ty: Handle<Type>,
        lhs: Handle<Value>,
        rhs: Handle<Value>,
    ) -> Handle<Instruction> {
        self.binary(BinaryKind::Xor, ty, lhs, rhs)
    }

    /// Creates `lhs && rhs`. See [`Builder::binary`].
    pub fn logical_and(
        &mut self,
        ty: Handle<Type>,
        lhs: Handle<Value>,
        rhs: Handle<Value>,
    ) -> Handle<Instruction> {
        self.binary(BinaryKind::LogicalAnd, ty, lhs, rhs)
    }

    /// Creates `lhs || rhs`. See [`Builder::binary`].
    pub fn logical_or(
        &mut self,
        ty: Handle<Type>,
        lhs: Handle<Value>,
        rhs: Handle<Value>,
    ) -> Handle<Instruction> {
        self.binary(BinaryKind::LogicalOr, ty, lhs, rhs)
    }

    /// Creates `lhs == rhs`. See [`Builder::binary`].
    pub fn equal(
        &mut self,
        ty: Handle<Type>,
        lhs: Handle<Value>,
        rhs: Handle<Value>,
    ) -> Handle<Instruction> {
        self.binary(BinaryKind::Equal, ty, lhs, rhs)
    }

    /// Creates `lhs != rhs`. See [`Builder::binary`].
    pub fn not_equal(
        &mut self,
        ty: Handle<Type>,
        lhs: Handle<Value>,
        rhs: Handle<Value>,
    ) -> Handle<Instruction> {
        self.binary(BinaryKind::NotEqual, ty, lhs, rhs)
    }

    /// Creates `lhs < rhs`. See [`Builder::binary`].
    pub fn less_than(
        &mut self,
        ty: Handle<Type>,
        lhs: Handle<Value>,
        rhs: Handle<Value>,
    ) -> Handle<Instruction> {
        self.binary(BinaryKind::LessThan, ty, lhs, rhs)
    }

    /// Creates `lhs > rhs`. See [`Builder::binary`].
    pub fn greater_than(
        &mut self,
        ty: Handle<Type>,
        lhs: Handle<Value>,
        rhs: Handle<Value>,
    ) -> Handle<Instruction> {
        self.binary(BinaryKind::GreaterThan, ty, lhs, rhs)
    }

    /// Creates `lhs <= rhs`. See [`Builder::binary`].
    pub fn less_than_equal(
        &mut self,
        ty: Handle<Type>,
        lhs: Handle<Value>,
        rhs: Handle<Value>,
    ) -> Handle<Instruction> {
        self.binary(BinaryKind::LessThanEqual, ty, lhs, rhs)
    }

    /// Creates `lhs >= rhs`. See [`Builder::binary`].
    pub fn greater_than_equal(
        &mut self,
        ty: Handle<Type>,
        lhs: Handle<Value>,
        rhs: Handle<Value>,
    ) -> Handle<Instruction> {
        self.binary(BinaryKind::GreaterThanEqual, ty, lhs, rhs)
    }

    /// Creates `lhs << rhs`. See [`Builder::binary`].
    pub fn shift_left(
        &mut self,
        ty: Handle<Type>,
        lhs: Handle<Value>,
        rhs: Handle<Value>,
    ) -> Handle<Instruction> {
        self.binary(BinaryKind::ShiftLeft, ty, lhs, rhs)
    }

    /// Creates `lhs >> rhs`. See [`Builder::binary`].
    pub fn shift_right(
        &mut self,
        ty: Handle<Type>,
        lhs: Handle<Value>,
        rhs: Handle<Value>,
    ) -> Handle<Instruction> {
        self.binary(BinaryKind::ShiftRight, ty, lhs, rhs)
    }

    /// Creates `lhs + rhs`. See [`Builder::binary`].
    pub fn add(
        &mut self,
        ty: Handle<Type>,
        lhs: Handle<Value>,
        rhs: Handle<Value>,
    ) -> Handle<Instruction> {
        self.binary(BinaryKind::Add, ty, lhs, rhs)
    }

    /// Creates `lhs - rhs`. See [`Builder::binary`].
    pub fn subtract(
        &mut self,
        ty: Handle<Type>,
        lhs: Handle<Value>,
        rhs: Handle<Value>,
    ) -> Handle<Instruction> {
        self.binary(BinaryKind::Subtract, ty, lhs, rhs)
    }

    /// Creates `lhs * rhs`. See [`Builder::binary`].
    pub fn multiply(
        &mut self,
        ty: Handle<Type>,
        lhs: Handle<Value>,
        rhs: Handle<Value>,
    ) -> Handle<Instruction> {
        self.binary(BinaryKind::Multiply, ty, lhs, rhs)
    }

    /// Creates `lhs / rhs`. See [`Builder::binary`].
    pub fn divide(
        &mut self,
        ty: Handle<Type>,
        lhs: Handle<Value>,
        rhs: Handle<Value>,
    ) -> Handle<Instruction> {
        self.binary(BinaryKind::Divide, ty, lhs, rhs)
    }

    /// Creates `lhs % rhs`. See [`Builder::binary`].
    pub fn modulo(
        &mut self,
        ty: Handle<Type>,
        lhs: Handle<Value>,
        rhs: Handle<Value>,
    ) -> Handle<Instruction> {
        self.binary(BinaryKind::Modulo, ty, lhs, rhs)
    }

    /// Creates `&val`. See [`Builder::unary`].
    pub fn address_of(&mut self, ty: Handle<Type>, val: Handle<Value>) -> Handle<Instruction> {
        self.unary(UnaryKind::AddressOf, ty, val)
    }

    /// Creates `~val`. See [`Builder::unary`].
    pub fn complement(&mut self, ty: Handle<Type>, val: Handle<Value>) -> Handle<Instruction> {
        self.unary(UnaryKind::Complement, ty, val)
    }

    /// Creates `*val`. See [`Builder::unary`].
    pub fn indirection(&mut self, ty: Handle<Type>, val: Handle<Value>) -> Handle<Instruction> {
        self.unary(UnaryKind::Indirection, ty, val)
    }

    /// Creates `-val`. See [`Builder::unary`].
    pub fn negation(&mut self, ty: Handle<Type>, val: Handle<Value>) -> Handle<Instruction> {
        self.unary(UnaryKind::Negation, ty, val)
    }

    /// Creates `!val`. See [`Builder::unary`].
    pub fn not(&mut self, ty: Handle<Type>, val: Handle<Value>) -> Handle<Instruction> {
        self.unary(UnaryKind::Not, ty, val)
    }

    /// Creates an empty block.
    pub fn block(&mut self) -> Handle<Block> {
        self.module.blocks.append(Block::default())
    }

    /// Adds a parameter of type `ty` to `block` and returns its value.
    ///
    /// # Panics
    ///
    /// Panics if `block` or `ty` is not live in this module, or if the runtime
    /// ID space is used up.
    pub fn block_param(&mut self, block: Handle<Block>, ty: Handle<Type>) -> Handle<Value> {
        self.expect_type(ty);
        let Some(target) = self.module.blocks.try_get(block) else {
            panic!("block {block:?} is not a live block of this module");
        };
        let index = u32::try_from(target.params.len())
            .unwrap_or_else(|_| panic!("block {block:?} has too many parameters"));
        let id = self.allocate_id();
        let param = self
            .module
            .values
            .append(Value::new(ValueKind::BlockArgument { id, block, index }, ty));
        self.module.blocks[block].params.push(param);
        param
    }

    /// Appends `inst` to the end of `block`.
    ///
    /// # Panics
    ///
    /// Panics if either handle is not live, if `block` already ends in a
    /// terminator, or if `inst` was already placed in a block.
    pub fn append(&mut self, block: Handle<Block>, inst: Handle<Instruction>) {
        assert!(
            self.module.blocks.contains(block),
            "block {block:?} is not a live block of this module"
        );
        assert!(
            self.module.instructions.contains(inst),
            "instruction {inst:?} is not a live instruction of this module"
        );
        assert!(
            !self.module.is_terminated(block),
            "cannot append {inst:?}: block {block:?} is already terminated"
        );
        if let Some(owner) = self.module.block_of(inst) {
            panic!("instruction {inst:?} is already placed in block {owner:?}");
        }
        self.module.blocks[block].instructions.push(inst);
        self.module.placement.insert(inst, block);
    }

    /// Creates a switch over `condition` with a fresh, empty merge block.
    ///
    /// # Panics
    ///
    /// Panics if `condition` is not live in this module.
    pub fn switch(&mut self, condition: Handle<Value>) -> Handle<Instruction> {
        self.expect_value(condition, "condition");
        let merge = self.block();
        self.insert(Instruction::Switch(Switch {
            condition,
            cases: Vec::new(),
            merge,
        }))
    }

    /// Adds a case with the given selectors to `switch` and returns its body.
    ///
    /// # Panics
    ///
    /// Panics if `switch` is not a live switch instruction.
    pub fn case(
        &mut self,
        switch: Handle<Instruction>,
        selectors: impl IntoIterator<Item = CaseSelector>,
    ) -> Handle<Block> {
        self.expect_switch(switch);
        let selectors = selectors.into_iter().collect();
        let block = self.block();
        if let Instruction::Switch(s) = &mut self.module.instructions[switch] {
            s.cases.push(Case { selectors, block });
        }
        block
    }

    /// Creates a terminator that leaves `switch`, passing `args` to its merge
    /// block.
    ///
    /// # Panics
    ///
    /// Panics if `switch` is not a live switch instruction of this module, or
    /// if any argument is not a live value.
    pub fn exit_switch(
        &mut self,
        switch: Handle<Instruction>,
        args: &[Handle<Value>],
    ) -> Handle<Instruction> {
        self.expect_switch(switch);
        for (i, &arg) in args.iter().enumerate() {
            assert!(
                self.module.values.contains(arg),
                "exit_switch argument {i} ({arg:?}) is not a live value of this module"
            );
        }
        if let Instruction::Switch(s) = &self.module.instructions[switch] {
            let params = self.module.blocks[s.merge].params.len();
            if params != args.len() {
                log::debug!(
                    "exit_switch of {switch:?} passes {} argument(s) to a merge block \
                     with {params} parameter(s)",
                    args.len()
                );
            }
        }
        self.insert(Instruction::ExitSwitch(ExitSwitch {
            switch,
            args: args.to_vec(),
        }))
    }

    /// Makes operand `index` of `inst` refer to `value`, moving the usage
    /// record from the previous operand to `value`.
    ///
    /// # Panics
    ///
    /// Panics if `inst` or `value` is not live, or `inst` has no operand `index`.
    pub fn set_operand(&mut self, inst: Handle<Instruction>, index: usize, value: Handle<Value>) {
        self.expect_value(value, "replacement");
        let Some(instruction) = self.module.instructions.try_get_mut(inst) else {
            panic!("instruction {inst:?} is not a live instruction of this module");
        };
        let Some(slot) = instruction.operand_mut(index) else {
            panic!("instruction {inst:?} has no operand {index}");
        };
        let old = std::mem::replace(slot, value);
        let usage = Usage::operand(inst, index as u32);
        if let Some(old_value) = self.module.values.try_get_mut(old) {
            old_value.remove_usage(usage);
        }
        self.module.values[value].add_usage(usage);
        log::trace!("operand {index} of {inst:?}: {old:?} -> {value:?}");
    }

    /// Redirects every operand that reads `old` to read `new` instead.
    ///
    /// Returns the number of operands rewritten. The result record of the
    /// instruction producing `old` is left in place.
    pub fn replace_all_uses_with(&mut self, old: Handle<Value>, new: Handle<Value>) -> usize {
        self.expect_value(old, "replaced");
        self.expect_value(new, "replacement");
        if old == new {
            return 0;
        }
        let uses: Vec<_> = self.module.values[old]
            .usages
            .iter()
            .filter_map(|u| match u.slot {
                UsageSlot::Operand(i) => Some((u.instruction, i as usize)),
                UsageSlot::Result => None,
            })
            .collect();
        for &(inst, index) in &uses {
            self.set_operand(inst, index, new);
        }
        uses.len()
    }

    /// Removes `inst` from the module together with its result value, and
    /// drops every usage record it registered on its operands.
    ///
    /// # Panics
    ///
    /// Panics if `inst` is not live, if its result is still read by another
    /// instruction, or if it is a switch still targeted by an `exit_switch`.
    pub fn remove(&mut self, inst: Handle<Instruction>) {
        let Some(instruction) = self.module.instructions.try_get(inst) else {
            panic!("instruction {inst:?} is not a live instruction of this module");
        };
        if let Some(result) = instruction.result() {
            assert!(
                !self.module.values[result].is_used(),
                "cannot remove {inst:?}: its result {result:?} is still in use"
            );
        }
        if instruction.as_switch().is_some() {
            let targeted = self
                .module
                .instructions
                .iter()
                .any(|(_, i)| i.as_exit_switch().is_some_and(|e| e.switch == inst));
            assert!(
                !targeted,
                "cannot remove switch {inst:?} while an exit_switch targets it"
            );
        }

        let Module {
            values,
            instructions,
            blocks,
            placement,
            ..
        } = &mut *self.module;
        if let Some(instruction) = instructions.remove(inst) {
            for (i, &operand) in instruction.operands().iter().enumerate() {
                if let Some(value) = values.try_get_mut(operand) {
                    value.remove_usage(Usage::operand(inst, i as u32));
                }
            }
            if let Some(result) = instruction.result() {
                values.remove(result);
            }
            if let Some(block) = placement.remove(&inst).and_then(|b| blocks.try_get_mut(b)) {
                block.instructions.retain(|&h| h != inst);
            }
            log::debug!("removed instruction {inst:?}");
        }
    }

    fn allocate_id(&mut self) -> RuntimeId {
        let Some(id) = self.next_runtime_id else {
            panic!("runtime id space exhausted");
        };
        self.next_runtime_id = id.checked_add(1);
        RuntimeId(id)
    }

    fn runtime_value(&mut self, ty: Handle<Type>) -> Handle<Value> {
        let id = self.allocate_id();
        let value = self
            .module
            .values
            .append(Value::new(ValueKind::Runtime(id), ty));
        log::trace!("allocated runtime value {id} as {value:?}");
        value
    }

    /// Appends `instruction` and registers its operand and result usages.
    fn insert(&mut self, instruction: Instruction) -> Handle<Instruction> {
        let Module {
            values,
            instructions,
            ..
        } = &mut *self.module;
        let inst = instructions.append(instruction);
        let instruction = &instructions[inst];
        for (i, &operand) in instruction.operands().iter().enumerate() {
            values[operand].add_usage(Usage::operand(inst, i as u32));
        }
        if let Some(result) = instruction.result() {
            values[result].add_usage(Usage::result(inst));
        }
        inst
    }

    fn expect_type(&self, ty: Handle<Type>) {
        assert!(
            self.module.types.contains(ty),
            "type {ty:?} is not owned by this module's interner"
        );
    }

    fn expect_value(&self, value: Handle<Value>, what: &str) {
        assert!(
            self.module.values.contains(value),
            "{what} operand {value:?} is not a live value of this module"
        );
    }

    fn expect_switch(&self, switch: Handle<Instruction>) {
        assert!(
            matches!(
                self.module.instructions.try_get(switch),
                Some(Instruction::Switch(_))
            ),
            "{switch:?} is not a live switch instruction of this module"
        );
    }
}
