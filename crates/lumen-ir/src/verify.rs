//! Consistency check for the def-use graph.

use std::collections::HashMap;

use crate::Module;
use crate::error::IrError;
use crate::value::{Usage, UsageSlot};

impl Module {
    /// Checks that usage lists and instruction operands agree.
    ///
    /// Every operand slot and result of a live instruction must be recorded
    /// exactly once on the value it refers to, and every record on a live
    /// value must point back at a live instruction slot holding that value.
    /// Returns the first violation found.
    pub fn verify_usages(&self) -> Result<(), IrError> {
        for (inst, instruction) in self.instructions.iter() {
            let result = instruction.result().map(|r| (r, Usage::result(inst)));
            let operands = instruction
                .operands()
                .iter()
                .enumerate()
                .map(|(i, &v)| (v, Usage::operand(inst, i as u32)));
            for (handle, usage) in operands.chain(result) {
                let value = self.try_value(handle)?;
                if !value.usages.contains(&usage) {
                    return Err(IrError::MissingUsage {
                        value: handle,
                        instruction: inst,
                        slot: usage.slot,
                    });
                }
            }
        }

        for (handle, value) in self.values.iter() {
            let mut seen: HashMap<Usage, usize> = HashMap::new();
            for &usage in &value.usages {
                *seen.entry(usage).or_default() += 1;
                let refers_back = self
                    .instructions
                    .try_get(usage.instruction)
                    .is_some_and(|instruction| match usage.slot {
                        UsageSlot::Result => instruction.result() == Some(handle),
                        UsageSlot::Operand(i) => {
                            instruction.operands().get(i as usize) == Some(&handle)
                        }
                    });
                if !refers_back {
                    return Err(IrError::DanglingUsage {
                        value: handle,
                        instruction: usage.instruction,
                        slot: usage.slot,
                    });
                }
            }
            if let Some((usage, &count)) = seen.iter().find(|&(_, &count)| count > 1) {
                return Err(IrError::DuplicateUsage {
                    value: handle,
                    instruction: usage.instruction,
                    slot: usage.slot,
                    count,
                });
            }
        }

        log::trace!(
            "verified usages of {} instruction(s) and {} value(s)",
            self.instructions.len(),
            self.values.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{Builder, IrError, Module, Usage};

    #[test]
    fn built_graph_verifies() {
        let mut module = Module::new();
        let mut b = Builder::new(&mut module);
        let ty = b.types().i32();
        let four = b.constant(4);
        let sum = b.add(ty, four, four);
        let sum_value = b.module().instruction(sum).result().unwrap();
        b.multiply(ty, sum_value, four);
        assert!(module.verify_usages().is_ok());
    }

    #[test]
    fn missing_record_is_reported() {
        let mut module = Module::new();
        let (lhs, inst) = {
            let mut b = Builder::new(&mut module);
            let ty = b.types().u32();
            let lhs = b.constant(1u32);
            let rhs = b.constant(2u32);
            (lhs, b.shift_left(ty, lhs, rhs))
        };
        module.values[lhs].remove_usage(Usage::operand(inst, 0));
        assert!(matches!(
            module.verify_usages(),
            Err(IrError::MissingUsage { value, .. }) if value == lhs
        ));
    }

    #[test]
    fn dangling_record_is_reported() {
        let mut module = Module::new();
        let (stray, inst) = {
            let mut b = Builder::new(&mut module);
            let ty = b.types().bool();
            let t = b.constant(true);
            let stray = b.constant(false);
            (stray, b.not(ty, t))
        };
        module.values[stray].add_usage(Usage::operand(inst, 0));
        assert!(matches!(
            module.verify_usages(),
            Err(IrError::DanglingUsage { value, .. }) if value == stray
        ));
    }

    #[test]
    fn duplicate_record_is_reported() {
        let mut module = Module::new();
        let (val, inst) = {
            let mut b = Builder::new(&mut module);
            let ty = b.types().i32();
            let val = b.constant(3);
            (val, b.negation(ty, val))
        };
        module.values[val].add_usage(Usage::operand(inst, 0));
        assert!(matches!(
            module.verify_usages(),
            Err(IrError::DuplicateUsage { count: 2, .. })
        ));
    }
}
