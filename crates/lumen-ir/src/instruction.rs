//! Instructions: operations that consume values and optionally produce one.

use std::slice;

use crate::arena::Handle;
use crate::block::Block;
use crate::value::{Literal, Value};

/// A binary operator.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum BinaryKind {
    And,
    Or,
    Xor,
    LogicalAnd,
    LogicalOr,
    Equal,
    NotEqual,
    LessThan,
    GreaterThan,
    LessThanEqual,
    GreaterThanEqual,
    ShiftLeft,
    ShiftRight,
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
}

impl BinaryKind {
    /// Every binary kind, in declaration order.
    pub const ALL: [Self; 18] = [
        Self::And,
        Self::Or,
        Self::Xor,
        Self::LogicalAnd,
        Self::LogicalOr,
        Self::Equal,
        Self::NotEqual,
        Self::LessThan,
        Self::GreaterThan,
        Self::LessThanEqual,
        Self::GreaterThanEqual,
        Self::ShiftLeft,
        Self::ShiftRight,
        Self::Add,
        Self::Subtract,
        Self::Multiply,
        Self::Divide,
        Self::Modulo,
    ];

    /// Returns the source-language operator symbol.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::And => "&",
            Self::Or => "|",
            Self::Xor => "^",
            Self::LogicalAnd => "&&",
            Self::LogicalOr => "||",
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::LessThan => "<",
            Self::GreaterThan => ">",
            Self::LessThanEqual => "<=",
            Self::GreaterThanEqual => ">=",
            Self::ShiftLeft => "<<",
            Self::ShiftRight => ">>",
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::Modulo => "%",
        }
    }
}

/// A unary operator.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum UnaryKind {
    AddressOf,
    Complement,
    Indirection,
    Negation,
    Not,
}

impl UnaryKind {
    /// Every unary kind, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::AddressOf,
        Self::Complement,
        Self::Indirection,
        Self::Negation,
        Self::Not,
    ];

    /// Returns the source-language operator symbol.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::AddressOf => "&",
            Self::Complement => "~",
            Self::Indirection => "*",
            Self::Negation => "-",
            Self::Not => "!",
        }
    }
}

/// `result = lhs <op> rhs`
#[derive(Clone, Debug)]
pub struct Binary {
    pub(crate) kind: BinaryKind,
    pub(crate) operands: [Handle<Value>; 2],
    pub(crate) result: Handle<Value>,
}

impl Binary {
    /// Returns the operator.
    pub fn kind(&self) -> BinaryKind {
        self.kind
    }

    /// Returns the left operand (operand slot 0).
    pub fn lhs(&self) -> Handle<Value> {
        self.operands[0]
    }

    /// Returns the right operand (operand slot 1).
    pub fn rhs(&self) -> Handle<Value> {
        self.operands[1]
    }

    /// Returns the value this instruction defines.
    pub fn result(&self) -> Handle<Value> {
        self.result
    }
}

/// `result = <op>val`
#[derive(Clone, Debug)]
pub struct Unary {
    pub(crate) kind: UnaryKind,
    pub(crate) val: Handle<Value>,
    pub(crate) result: Handle<Value>,
}

impl Unary {
    /// Returns the operator.
    pub fn kind(&self) -> UnaryKind {
        self.kind
    }

    /// Returns the single operand.
    pub fn val(&self) -> Handle<Value> {
        self.val
    }

    /// Returns the value this instruction defines.
    pub fn result(&self) -> Handle<Value> {
        self.result
    }
}

/// A case selector of a [`Switch`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CaseSelector {
    Default,
    Literal(Literal),
}

/// One arm of a [`Switch`].
#[derive(Clone, Debug)]
pub struct Case {
    pub selectors: Vec<CaseSelector>,
    pub block: Handle<Block>,
}

/// A multi-way branch on `condition`.
///
/// Control leaves every case body through an [`ExitSwitch`] targeting this
/// switch, which continues in `merge` with the exit's arguments bound to the
/// merge block's parameters.
#[derive(Clone, Debug)]
pub struct Switch {
    pub(crate) condition: Handle<Value>,
    pub(crate) cases: Vec<Case>,
    pub(crate) merge: Handle<Block>,
}

impl Switch {
    /// Returns the value being switched on.
    pub fn condition(&self) -> Handle<Value> {
        self.condition
    }

    /// Returns the arms in the order they were added.
    pub fn cases(&self) -> &[Case] {
        &self.cases
    }

    /// Returns the block control continues in after the switch.
    pub fn merge(&self) -> Handle<Block> {
        self.merge
    }
}

/// Leaves the body of `switch`, passing `args` to its merge block.
#[derive(Clone, Debug)]
pub struct ExitSwitch {
    pub(crate) switch: Handle<Instruction>,
    pub(crate) args: Vec<Handle<Value>>,
}

impl ExitSwitch {
    /// Returns the switch instruction this terminator exits.
    pub fn switch(&self) -> Handle<Instruction> {
        self.switch
    }

    /// Returns the values bound to the merge block's parameters.
    pub fn args(&self) -> &[Handle<Value>] {
        &self.args
    }
}

/// An instruction in the IR.
///
/// Instructions live in the module's instruction arena and are referenced by
/// [`Handle<Instruction>`]. Each one owns its result value, if it has one.
#[derive(Clone, Debug)]
pub enum Instruction {
    Binary(Binary),
    Unary(Unary),
    Switch(Switch),
    ExitSwitch(ExitSwitch),
}

impl Instruction {
    /// Returns the operand values in positional order.
    pub fn operands(&self) -> &[Handle<Value>] {
        match self {
            Self::Binary(b) => &b.operands,
            Self::Unary(u) => slice::from_ref(&u.val),
            Self::Switch(s) => slice::from_ref(&s.condition),
            Self::ExitSwitch(e) => &e.args,
        }
    }

    pub(crate) fn operand_mut(&mut self, index: usize) -> Option<&mut Handle<Value>> {
        match self {
            Self::Binary(b) => b.operands.get_mut(index),
            Self::Unary(u) => (index == 0).then_some(&mut u.val),
            Self::Switch(s) => (index == 0).then_some(&mut s.condition),
            Self::ExitSwitch(e) => e.args.get_mut(index),
        }
    }

    /// Returns the value this instruction produces, if any.
    pub fn result(&self) -> Option<Handle<Value>> {
        match self {
            Self::Binary(b) => Some(b.result),
            Self::Unary(u) => Some(u.result),
            Self::Switch(_) | Self::ExitSwitch(_) => None,
        }
    }

    /// Returns `true` if this instruction ends its block.
    pub fn is_terminator(&self) -> bool {
        matches!(self, Self::ExitSwitch(_))
    }

    pub fn as_binary(&self) -> Option<&Binary> {
        match self {
            Self::Binary(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_unary(&self) -> Option<&Unary> {
        match self {
            Self::Unary(u) => Some(u),
            _ => None,
        }
    }

    pub fn as_switch(&self) -> Option<&Switch> {
        match self {
            Self::Switch(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_exit_switch(&self) -> Option<&ExitSwitch> {
        match self {
            Self::ExitSwitch(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value(index: u32) -> Handle<Value> {
        Handle::new(index, 0)
    }

    #[test]
    fn binary_operands_are_lhs_then_rhs() {
        let inst = Instruction::Binary(Binary {
            kind: BinaryKind::Add,
            operands: [value(0), value(1)],
            result: value(2),
        });
        assert_eq!(inst.operands(), &[value(0), value(1)]);
        assert_eq!(inst.result(), Some(value(2)));
        assert!(!inst.is_terminator());
        assert_eq!(inst.as_binary().map(Binary::kind), Some(BinaryKind::Add));
    }

    #[test]
    fn exit_switch_has_no_result() {
        let inst = Instruction::ExitSwitch(ExitSwitch {
            switch: Handle::new(0, 0),
            args: vec![value(4), value(5)],
        });
        assert_eq!(inst.operands().len(), 2);
        assert!(inst.result().is_none());
        assert!(inst.is_terminator());
    }

    #[test]
    fn operand_mut_rejects_out_of_range() {
        let mut inst = Instruction::Unary(Unary {
            kind: UnaryKind::Not,
            val: value(0),
            result: value(1),
        });
        assert!(inst.operand_mut(1).is_none());
        *inst.operand_mut(0).unwrap() = value(3);
        assert_eq!(inst.as_unary().map(Unary::val), Some(value(3)));
    }

    #[test]
    fn symbols_are_distinct_within_each_table() {
        let mut binary: Vec<_> = BinaryKind::ALL.iter().map(|k| k.symbol()).collect();
        binary.sort_unstable();
        binary.dedup();
        assert_eq!(binary.len(), BinaryKind::ALL.len());

        let mut unary: Vec<_> = UnaryKind::ALL.iter().map(|k| k.symbol()).collect();
        unary.sort_unstable();
        unary.dedup();
        assert_eq!(unary.len(), UnaryKind::ALL.len());
    }
}
