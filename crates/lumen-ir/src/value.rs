//! Values: the nodes of the def-use graph.

use crate::arena::Handle;
use crate::block::Block;
use crate::instruction::Instruction;
use crate::types::Type;

/// A literal scalar constant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Literal {
    Bool(bool),
    I32(i32),
    U32(u32),
    F32(f32),
}

impl Literal {
    /// Returns the type descriptor of this literal.
    pub fn ty(&self) -> Type {
        match self {
            Self::Bool(_) => Type::Bool,
            Self::I32(_) => Type::I32,
            Self::U32(_) => Type::U32,
            Self::F32(_) => Type::F32,
        }
    }
}

impl From<bool> for Literal {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for Literal {
    fn from(v: i32) -> Self {
        Self::I32(v)
    }
}

impl From<u32> for Literal {
    fn from(v: u32) -> Self {
        Self::U32(v)
    }
}

impl From<f32> for Literal {
    fn from(v: f32) -> Self {
        Self::F32(v)
    }
}

/// Identifier of a runtime value ("virtual register"), unique within a module.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct RuntimeId(pub u32);

/// Which part of an instruction a [`Usage`] refers to.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum UsageSlot {
    /// The operand at the given position.
    Operand(u32),
    /// The value the instruction produces.
    Result,
}

/// A back-reference from a value to one instruction slot that refers to it.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub struct Usage {
    pub instruction: Handle<Instruction>,
    pub slot: UsageSlot,
}

impl Usage {
    /// Record for operand slot `index` of `instruction`.
    pub fn operand(instruction: Handle<Instruction>, index: u32) -> Self {
        Self {
            instruction,
            slot: UsageSlot::Operand(index),
        }
    }

    /// Record for the result of `instruction`.
    pub fn result(instruction: Handle<Instruction>) -> Self {
        Self {
            instruction,
            slot: UsageSlot::Result,
        }
    }
}

/// What a value is.
#[derive(Clone, Debug, PartialEq)]
pub enum ValueKind {
    /// A compile-time literal.
    Constant(Literal),
    /// The result of exactly one instruction.
    Runtime(RuntimeId),
    /// A block parameter, bound when control enters `block`.
    BlockArgument {
        id: RuntimeId,
        block: Handle<Block>,
        index: u32,
    },
}

/// A node of the def-use graph.
///
/// Values are created by the [`Builder`](crate::Builder), which also keeps
/// their usage lists in sync with the instructions that refer to them.
#[derive(Clone, Debug)]
pub struct Value {
    pub(crate) kind: ValueKind,
    pub(crate) ty: Handle<Type>,
    pub(crate) usages: Vec<Usage>,
}

impl Value {
    pub(crate) fn new(kind: ValueKind, ty: Handle<Type>) -> Self {
        Self {
            kind,
            ty,
            usages: Vec::new(),
        }
    }

    /// Returns what this value is.
    pub fn kind(&self) -> &ValueKind {
        &self.kind
    }

    /// Returns the type of this value.
    pub fn ty(&self) -> Handle<Type> {
        self.ty
    }

    /// Returns every usage record in the order it was registered.
    pub fn usages(&self) -> &[Usage] {
        &self.usages
    }

    /// Returns the literal if this is a constant.
    pub fn as_constant(&self) -> Option<Literal> {
        match self.kind {
            ValueKind::Constant(lit) => Some(lit),
            _ => None,
        }
    }

    /// Returns the identifier of a runtime value or block argument.
    pub fn id(&self) -> Option<RuntimeId> {
        match self.kind {
            ValueKind::Constant(_) => None,
            ValueKind::Runtime(id) | ValueKind::BlockArgument { id, .. } => Some(id),
        }
    }

    /// Returns `true` for compile-time literals.
    pub fn is_constant(&self) -> bool {
        matches!(self.kind, ValueKind::Constant(_))
    }

    /// Returns `true` for instruction results. Block arguments are not included.
    pub fn is_runtime(&self) -> bool {
        matches!(self.kind, ValueKind::Runtime(_))
    }

    /// Returns the instruction that produced this value, if any.
    pub fn source(&self) -> Option<Handle<Instruction>> {
        self.usages
            .iter()
            .find(|u| u.slot == UsageSlot::Result)
            .map(|u| u.instruction)
    }

    /// Returns `true` if some instruction other than the producer reads this value.
    pub fn is_used(&self) -> bool {
        self.usages.iter().any(|u| u.slot != UsageSlot::Result)
    }

    pub(crate) fn add_usage(&mut self, usage: Usage) {
        self.usages.push(usage);
    }

    /// Removes one matching record, keeping the order of the rest.
    pub(crate) fn remove_usage(&mut self, usage: Usage) -> bool {
        match self.usages.iter().position(|u| *u == usage) {
            Some(pos) => {
                self.usages.remove(pos);
                true
            }
            None => false,
        }
    }
}
