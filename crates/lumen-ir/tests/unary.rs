//! Unary instruction construction and rendering.

use lumen_ir::*;
use pretty_assertions::assert_eq;

#[test]
fn address_of_renders_pointer_type() {
    let mut module = Module::new();
    let mut b = Builder::new(&mut module);
    let i32_ty = b.types().i32();
    let ptr = b
        .types()
        .pointer(i32_ty, AddressSpace::Private, Access::READ_WRITE);
    let val = b.constant(4);
    b.set_next_runtime_id(RuntimeId(42));
    let inst = b.address_of(ptr, val);
    assert_eq!(
        format_instruction(inst, &module),
        "%42 (ptr<private, i32, read_write>) = &4"
    );
}

#[test]
fn every_kind_renders_its_symbol() {
    let expected = [
        (UnaryKind::AddressOf, "&"),
        (UnaryKind::Complement, "~"),
        (UnaryKind::Indirection, "*"),
        (UnaryKind::Negation, "-"),
        (UnaryKind::Not, "!"),
    ];
    for (kind, symbol) in expected {
        let mut module = Module::new();
        let mut b = Builder::new(&mut module);
        let ty = b.types().i32();
        let val = b.constant(4);
        b.set_next_runtime_id(RuntimeId(42));
        let inst = b.unary(kind, ty, val);
        assert_eq!(module.instruction(inst).as_unary().map(Unary::kind), Some(kind));
        assert_eq!(
            format_instruction(inst, &module),
            format!("%42 (i32) = {symbol}4")
        );
    }
}

#[test]
fn operand_and_result_usages() {
    let mut module = Module::new();
    let mut b = Builder::new(&mut module);
    let ty = b.types().bool();
    let val = b.constant(false);
    let inst = b.not(ty, val);
    let result = module.instruction(inst).result().unwrap();

    assert_eq!(module.value(val).usages(), &[Usage::operand(inst, 0)]);
    assert_eq!(module.value(result).usages(), &[Usage::result(inst)]);
    assert!(module.value(result).is_runtime());
    assert!(!module.value(result).is_used());
}

#[test]
fn chained_unaries_number_sequentially() {
    let mut module = Module::new();
    let mut b = Builder::new(&mut module);
    let ty = b.types().i32();
    let val = b.constant(5);
    let neg = b.negation(ty, val);
    let neg_value = b.module().instruction(neg).result().unwrap();
    let inv = b.complement(ty, neg_value);
    assert_eq!(format_instruction(inv, &module), "%1 (i32) = ~%0");
    assert_eq!(module.value(neg_value).usages().len(), 2);
}
