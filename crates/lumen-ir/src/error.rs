//! Error types for the Lumen IR.

use crate::arena::Handle;
use crate::instruction::Instruction;
use crate::value::{UsageSlot, Value};

/// Structural problems reported by non-panicking module queries.
///
/// Construction-time invariant violations are bugs in an earlier compiler
/// phase and panic instead; these errors come from inspecting a graph that
/// may have been built by someone else.
#[derive(Debug, thiserror::Error)]
pub enum IrError {
    /// A handle refers to a slot that was removed or never existed.
    #[error("stale {kind} handle {index}")]
    StaleHandle { kind: &'static str, index: usize },

    /// An instruction reads a value that has no matching usage record.
    #[error("value {value:?} has no usage record for {slot:?} of instruction {instruction:?}")]
    MissingUsage {
        value: Handle<Value>,
        instruction: Handle<Instruction>,
        slot: UsageSlot,
    },

    /// A usage record points at an instruction slot that no longer reads the value.
    #[error(
        "value {value:?} has a dangling usage record for {slot:?} of instruction {instruction:?}"
    )]
    DanglingUsage {
        value: Handle<Value>,
        instruction: Handle<Instruction>,
        slot: UsageSlot,
    },

    /// The same usage record appears more than once on a value.
    #[error("value {value:?} records {slot:?} of instruction {instruction:?} {count} times")]
    DuplicateUsage {
        value: Handle<Value>,
        instruction: Handle<Instruction>,
        slot: UsageSlot,
        count: usize,
    },
}
