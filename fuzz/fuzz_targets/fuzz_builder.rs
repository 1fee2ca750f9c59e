#![no_main]

use libfuzzer_sys::fuzz_target;
use lumen_ir::{BinaryKind, Builder, Handle, Instruction, Module, UnaryKind, Value};

fn pick<T: Copy>(items: &[T], byte: u8) -> Option<T> {
    if items.is_empty() {
        None
    } else {
        Some(items[byte as usize % items.len()])
    }
}

fuzz_target!(|data: &[u8]| {
    // Drive the builder with valid handles only; usage lists must stay consistent.
    let mut module = Module::new();
    let mut b = Builder::new(&mut module);
    let i32_ty = b.types().i32();

    for chunk in data.chunks_exact(4) {
        let [op, x, y, z] = [chunk[0], chunk[1], chunk[2], chunk[3]];
        let values: Vec<Handle<Value>> = b.module().values().map(|(h, _)| h).collect();
        let insts: Vec<Handle<Instruction>> = b.module().instructions().map(|(h, _)| h).collect();
        let switches: Vec<_> = b
            .module()
            .instructions()
            .filter(|(_, i)| i.as_switch().is_some())
            .map(|(h, _)| h)
            .collect();

        match op % 8 {
            0 => {
                b.constant(i32::from(x));
            }
            1 => {
                if let (Some(lhs), Some(rhs)) = (pick(&values, x), pick(&values, y)) {
                    let kind = BinaryKind::ALL[z as usize % BinaryKind::ALL.len()];
                    b.binary(kind, i32_ty, lhs, rhs);
                }
            }
            2 => {
                if let Some(val) = pick(&values, x) {
                    let kind = UnaryKind::ALL[y as usize % UnaryKind::ALL.len()];
                    b.unary(kind, i32_ty, val);
                }
            }
            3 => {
                if let Some(cond) = pick(&values, x) {
                    b.switch(cond);
                }
            }
            4 => {
                if let Some(switch) = pick(&switches, x) {
                    let args: Vec<_> = (0..y % 4)
                        .filter_map(|i| pick(&values, z.wrapping_add(i)))
                        .collect();
                    b.exit_switch(switch, &args);
                }
            }
            5 => {
                if let (Some(inst), Some(value)) = (pick(&insts, x), pick(&values, y)) {
                    let arity = b.module().instruction(inst).operands().len();
                    if arity > 0 {
                        b.set_operand(inst, z as usize % arity, value);
                    }
                }
            }
            6 => {
                if let (Some(old), Some(new)) = (pick(&values, x), pick(&values, y)) {
                    b.replace_all_uses_with(old, new);
                }
            }
            _ => {
                if let Some(inst) = pick(&insts, x) {
                    let module = b.module();
                    let used = module
                        .instruction(inst)
                        .result()
                        .is_some_and(|r| module.value(r).is_used());
                    let targeted = module
                        .instructions()
                        .any(|(_, i)| i.as_exit_switch().is_some_and(|e| e.switch() == inst));
                    if !used && !targeted {
                        b.remove(inst);
                    }
                }
            }
        }

        if let Err(err) = b.module().verify_usages() {
            panic!("inconsistent usages after op {op}: {err}");
        }
    }
});
