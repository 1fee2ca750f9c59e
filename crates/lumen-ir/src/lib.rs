//! Lumen intermediate representation.
//!
//! A typed, handle-based def-use graph for shader programs. Values and
//! instructions live in generational arenas owned by a [`Module`]; every value
//! carries the list of instruction slots that read it, and the [`Builder`]
//! keeps those lists consistent across construction, operand replacement and
//! removal. Types are canonicalized by a [`TypeInterner`], so type identity is
//! handle equality.

mod access;
pub mod arena;
mod block;
mod builder;
mod display;
mod error;
mod instruction;
mod interner;
mod types;
mod value;
mod verify;

pub use access::{Access, AddressSpace, BindingPoint};
pub use arena::{Arena, Handle, UniqueArena};
pub use block::Block;
pub use builder::Builder;
pub use display::{dump_module, format_instruction, format_type, format_value};
pub use error::IrError;
pub use instruction::{
    Binary, BinaryKind, Case, CaseSelector, ExitSwitch, Instruction, Switch, Unary, UnaryKind,
};
pub use interner::TypeInterner;
pub use types::{ArraySize, SamplerKind, TexelFormat, TextureDimension, Type, VectorSize};
pub use value::{Literal, RuntimeId, Usage, UsageSlot, Value, ValueKind};

use std::collections::HashMap;

/// One compiled unit of IR.
///
/// The module owns every value, instruction and block created against it.
/// Graph mutation goes through a [`Builder`]; the module itself only offers
/// read access.
#[derive(Clone, Debug, Default)]
pub struct Module {
    /// Canonical type storage for this unit.
    pub types: TypeInterner,
    pub(crate) values: Arena<Value>,
    pub(crate) instructions: Arena<Instruction>,
    pub(crate) blocks: Arena<Block>,
    /// Block each placed instruction was appended to.
    pub(crate) placement: HashMap<Handle<Instruction>, Handle<Block>>,
}

impl Module {
    /// Creates an empty module.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value behind `handle`.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or belongs to another module.
    pub fn value(&self, handle: Handle<Value>) -> &Value {
        &self.values[handle]
    }

    /// Returns the value behind `handle`, or [`IrError::StaleHandle`].
    pub fn try_value(&self, handle: Handle<Value>) -> Result<&Value, IrError> {
        self.values.try_get(handle).ok_or(IrError::StaleHandle {
            kind: "value",
            index: handle.index(),
        })
    }

    /// Returns the instruction behind `handle`.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or belongs to another module.
    pub fn instruction(&self, handle: Handle<Instruction>) -> &Instruction {
        &self.instructions[handle]
    }

    /// Returns the instruction behind `handle`, or [`IrError::StaleHandle`].
    pub fn try_instruction(&self, handle: Handle<Instruction>) -> Result<&Instruction, IrError> {
        self.instructions.try_get(handle).ok_or(IrError::StaleHandle {
            kind: "instruction",
            index: handle.index(),
        })
    }

    /// Returns the block behind `handle`.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or belongs to another module.
    pub fn block(&self, handle: Handle<Block>) -> &Block {
        &self.blocks[handle]
    }

    /// Iterates over live values in slot order.
    pub fn values(&self) -> impl Iterator<Item = (Handle<Value>, &Value)> {
        self.values.iter()
    }

    /// Iterates over live instructions in slot order.
    pub fn instructions(&self) -> impl Iterator<Item = (Handle<Instruction>, &Instruction)> {
        self.instructions.iter()
    }

    /// Iterates over live blocks in slot order.
    pub fn blocks(&self) -> impl Iterator<Item = (Handle<Block>, &Block)> {
        self.blocks.iter()
    }

    /// Returns the type of `value`.
    pub fn type_of(&self, value: Handle<Value>) -> &Type {
        &self.types[self.values[value].ty]
    }

    /// Returns `true` if the last instruction of `block` is a terminator.
    pub fn is_terminated(&self, block: Handle<Block>) -> bool {
        self.blocks[block]
            .instructions
            .last()
            .is_some_and(|&inst| self.instructions[inst].is_terminator())
    }

    /// Returns the block `inst` was appended to, if any.
    pub fn block_of(&self, inst: Handle<Instruction>) -> Option<Handle<Block>> {
        self.placement.get(&inst).copied()
    }
}
