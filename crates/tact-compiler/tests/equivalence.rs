use tact_compiler::ast::*;
use tact_compiler::equiv::{AstComparator, AstHasher, AstRenamer};
use tact_compiler::format::format_module;
use tact_compiler::semantic::check_module;

fn int(value: u64) -> Expression {
    Expression::new(ExpressionKind::Number {
        base: NumberBase::Dec,
        value,
    })
}

fn one_plus_one() -> Expression {
    Expression::new(ExpressionKind::OpBinary {
        op: BinaryOp::Add,
        left: Box::new(int(1)),
        right: Box::new(int(1)),
    })
}

fn constant(name: &str) -> Module {
    Module::new(vec![ModuleItem::Constant(ConstantDef {
        id: tact_common::next_id(),
        attributes: vec![],
        name: Id::new(name),
        type_ann: TypeAnnotation::named("Int"),
        initializer: one_plus_one(),
    })])
}

#[test]
fn constants_differing_only_in_name_hash_identically() {
    let a = constant("A");
    let b = constant("B");
    assert_eq!(format_module(&a), "const A: Int = 1 + 1;\n");
    for sort in [false, true] {
        let hasher = AstHasher::new(sort);
        assert_eq!(hasher.hash(&a), hasher.hash(&b));
    }
}

#[test]
fn constants_differing_only_in_name_compare_equal_when_canonicalized() {
    let a = constant("A");
    let b = constant("B");
    assert!(!AstComparator::new(false, false).compare(&a, &b));
    assert!(AstComparator::new(false, true).compare(&a, &b));
}

#[test]
fn renamed_module_still_checks() {
    let call = Expression::static_call("double", vec![Expression::ident("BASE")]);
    let double = FunctionDef {
        id: tact_common::next_id(),
        attributes: vec![],
        name: Id::new("double"),
        return_type: Some(TypeAnnotation::named("Int")),
        params: vec![TypedParameter {
            id: tact_common::next_id(),
            name: Id::new("n"),
            type_ann: TypeAnnotation::named("Int"),
        }],
        statements: vec![Statement::Return(ReturnStmt {
            id: tact_common::next_id(),
            expression: Some(Expression::new(ExpressionKind::OpBinary {
                op: BinaryOp::Mul,
                left: Box::new(Expression::ident("n")),
                right: Box::new(int(2)),
            })),
        })],
    };
    let module = Module::new(vec![
        ModuleItem::Function(double),
        ModuleItem::Constant(ConstantDef {
            id: tact_common::next_id(),
            attributes: vec![],
            name: Id::new("BASE"),
            type_ann: TypeAnnotation::named("Int"),
            initializer: int(21),
        }),
        ModuleItem::Constant(ConstantDef {
            id: tact_common::next_id(),
            attributes: vec![],
            name: Id::new("ANSWER"),
            type_ann: TypeAnnotation::named("Int"),
            initializer: call,
        }),
    ]);
    assert!(!check_module(&module).has_errors());

    let renamed = AstRenamer::new().rename_module(&module);
    assert!(!check_module(&renamed).has_errors());
    let text = format_module(&renamed);
    assert!(text.contains("fun function_0(n: Int): Int"));
    assert!(text.contains("= function_0(constant_"));
}

fn constants(names: &[&str]) -> Module {
    Module::new(names.iter().flat_map(|n| constant(n).items).collect())
}

#[test]
fn shuffled_same_shaped_items_compare_equal_when_sorted() {
    let a = constants(&["A", "B", "C"]);
    let b = constants(&["C", "A", "B"]);
    assert!(!AstComparator::new(false, false).compare(&a, &b));
    assert!(AstComparator::new(true, false).compare(&a, &b));
    assert!(!AstComparator::new(true, false).compare(&a, &constants(&["A", "B", "D"])));
}

/// `const <global> = 1; fun f(): Int { let limit: Int = 2; return <returned>; }`
fn shadowing(global: &str, returned: &str) -> Module {
    Module::new(vec![
        ModuleItem::Constant(ConstantDef {
            id: tact_common::next_id(),
            attributes: vec![],
            name: Id::new(global),
            type_ann: TypeAnnotation::named("Int"),
            initializer: int(1),
        }),
        ModuleItem::Function(FunctionDef {
            id: tact_common::next_id(),
            attributes: vec![],
            name: Id::new("f"),
            return_type: Some(TypeAnnotation::named("Int")),
            params: vec![],
            statements: vec![
                Statement::Let(LetStmt {
                    id: tact_common::next_id(),
                    name: Id::new("limit"),
                    type_ann: Some(TypeAnnotation::named("Int")),
                    expression: int(2),
                }),
                Statement::Return(ReturnStmt {
                    id: tact_common::next_id(),
                    expression: Some(Expression::ident(returned)),
                }),
            ],
        }),
    ])
}

#[test]
fn renaming_leaves_shadowing_locals_alone() {
    let shadowed = shadowing("limit", "limit");
    let renamed = AstRenamer::new().rename_module(&shadowed);
    assert!(!check_module(&renamed).has_errors());
    assert!(format_module(&renamed).contains("return limit;"));

    let cmp = AstComparator::new(false, true);
    assert!(cmp.compare(&shadowed, &shadowing("cap", "limit")));
    assert!(!cmp.compare(&shadowed, &shadowing("cap", "cap")));
}
