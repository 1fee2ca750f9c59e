//! Operand replacement and removal keep usage lists consistent.

use lumen_ir::*;
use pretty_assertions::assert_eq;

#[test]
fn set_operand_moves_the_record() {
    let mut module = Module::new();
    let mut b = Builder::new(&mut module);
    let ty = b.types().i32();
    let old = b.constant(1);
    let new = b.constant(9);
    let other = b.constant(2);
    let inst = b.add(ty, old, other);
    b.set_operand(inst, 0, new);

    assert!(module.value(old).usages().is_empty());
    assert_eq!(module.value(new).usages(), &[Usage::operand(inst, 0)]);
    assert_eq!(module.instruction(inst).operands(), &[new, other]);
    assert!(module.verify_usages().is_ok());
}

#[test]
#[should_panic(expected = "has no operand 2")]
fn set_operand_out_of_range_is_fatal() {
    let mut module = Module::new();
    let mut b = Builder::new(&mut module);
    let ty = b.types().i32();
    let x = b.constant(1);
    let inst = b.add(ty, x, x);
    b.set_operand(inst, 2, x);
}

#[test]
fn replace_all_uses_with_rewrites_every_reader() {
    let mut module = Module::new();
    let mut b = Builder::new(&mut module);
    let ty = b.types().i32();
    let x = b.constant(1);
    let y = b.constant(2);
    let sum = b.add(ty, x, x);
    let neg = b.negation(ty, x);
    let switch = b.switch(x);

    assert_eq!(b.replace_all_uses_with(x, y), 4);
    assert!(module.value(x).usages().is_empty());
    let mut records = module.value(y).usages().to_vec();
    records.sort_by_key(|u| (u.instruction, format!("{:?}", u.slot)));
    let mut expected = vec![
        Usage::operand(sum, 0),
        Usage::operand(sum, 1),
        Usage::operand(neg, 0),
        Usage::operand(switch, 0),
    ];
    expected.sort_by_key(|u| (u.instruction, format!("{:?}", u.slot)));
    assert_eq!(records, expected);
    assert!(module.verify_usages().is_ok());
}

#[test]
fn replacing_a_runtime_value_keeps_its_result_record() {
    let mut module = Module::new();
    let mut b = Builder::new(&mut module);
    let ty = b.types().i32();
    let x = b.constant(1);
    let producer = b.negation(ty, x);
    let produced = b.module().instruction(producer).result().unwrap();
    let consumer = b.complement(ty, produced);
    let replacement = b.constant(7);

    assert_eq!(b.replace_all_uses_with(produced, replacement), 1);
    assert_eq!(module.value(produced).usages(), &[Usage::result(producer)]);
    assert_eq!(format_instruction(consumer, &module), "%1 (i32) = ~7");
}

#[test]
fn remove_restores_operand_usages_and_kills_result() {
    let mut module = Module::new();
    let mut b = Builder::new(&mut module);
    let ty = b.types().i32();
    let x = b.constant(1);
    let y = b.constant(2);
    let keep = b.add(ty, x, y);
    let doomed = b.subtract(ty, y, x);
    let result = b.module().instruction(doomed).result().unwrap();
    let block = b.block();
    b.append(block, keep);
    b.append(block, doomed);
    b.remove(doomed);

    assert_eq!(module.value(x).usages(), &[Usage::operand(keep, 0)]);
    assert_eq!(module.value(y).usages(), &[Usage::operand(keep, 1)]);
    assert!(matches!(
        module.try_value(result),
        Err(IrError::StaleHandle { kind: "value", .. })
    ));
    assert!(module.try_instruction(doomed).is_err());
    assert_eq!(module.block(block).instructions(), &[keep]);
    assert!(module.verify_usages().is_ok());
}

#[test]
#[should_panic(expected = "is still in use")]
fn removing_a_used_result_is_fatal() {
    let mut module = Module::new();
    let mut b = Builder::new(&mut module);
    let ty = b.types().i32();
    let x = b.constant(1);
    let producer = b.negation(ty, x);
    let produced = b.module().instruction(producer).result().unwrap();
    b.complement(ty, produced);
    b.remove(producer);
}

#[test]
fn reused_slot_does_not_revive_stale_handles() {
    let mut module = Module::new();
    let mut b = Builder::new(&mut module);
    let ty = b.types().i32();
    let x = b.constant(1);
    let first = b.negation(ty, x);
    b.remove(first);
    let second = b.negation(ty, x);

    assert_eq!(first.index(), second.index());
    assert_ne!(first, second);
    assert!(module.try_instruction(first).is_err());
    assert_eq!(module.value(x).usages(), &[Usage::operand(second, 0)]);
}

#[test]
fn dump_lists_blocks_and_unplaced_instructions() {
    let mut module = Module::new();
    let mut b = Builder::new(&mut module);
    let ty = b.types().i32();
    let cond = b.constant(1);
    let switch = b.switch(cond);
    let merge = b.module().instruction(switch).as_switch().unwrap().merge();
    b.block_param(merge, ty);
    let body = b.case(switch, [CaseSelector::Default]);
    let x = b.constant(4);
    let neg = b.negation(ty, x);
    let neg_value = b.module().instruction(neg).result().unwrap();
    b.append(body, neg);
    let exit = b.exit_switch(switch, &[neg_value]);
    b.append(body, exit);

    let expected = "\
Types:
  [0] i32

Blocks:
  %b0 (%0 (i32)) {
  }
  %b1 {
    %1 (i32) = -4
    exit_switch %b0 %1
  }

Unplaced:
  [0] switch 1 [c: (default, %b1)] # merge %b0
";
    assert_eq!(dump_module(&module), expected);
}
