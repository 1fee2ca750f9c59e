//! Blocks: ordered instruction lists with parameters.

use crate::arena::Handle;
use crate::instruction::Instruction;
use crate::value::Value;

/// A sequence of instructions, optionally parameterized by block arguments.
#[derive(Clone, Debug, Default)]
pub struct Block {
    pub(crate) params: Vec<Handle<Value>>,
    pub(crate) instructions: Vec<Handle<Instruction>>,
}

impl Block {
    /// Returns the block-argument values bound on entry.
    pub fn params(&self) -> &[Handle<Value>] {
        &self.params
    }

    /// Returns the instructions in execution order.
    pub fn instructions(&self) -> &[Handle<Instruction>] {
        &self.instructions
    }

    /// Returns `true` if no instruction has been appended yet.
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}
