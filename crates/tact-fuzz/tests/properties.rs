//! Seed-driven properties of generated programs.

use std::collections::HashSet;

use proptest::prelude::*;
use tact_compiler::ast::{Declaration, Module, ModuleItem, TypedParameter};
use tact_compiler::equiv::{AstComparator, AstRenamer};
use tact_compiler::format::{format_expression, format_module};
use tact_compiler::semantic::{check_module, resolve_expression, Env, Type as CheckedType};
use tact_fuzz::scope::{Binding, Entity, ScopeItemKind};
use tact_fuzz::{
    sample_expression, sample_program, sample_program_with, FuzzConfig, ProgramOptions,
    ScopeKind, ScopeTree, Type,
};

fn binding(kind: ScopeItemKind) -> Binding {
    let id = tact_common::next_id();
    Binding {
        id,
        name: format!("item{}", id),
        ty: Type::INT,
        kind,
        entity: Entity::Parameter(TypedParameter {
            id,
            name: tact_compiler::ast::Id::new("item"),
            type_ann: tact_compiler::ast::TypeAnnotation::named("Int"),
        }),
        scope: None,
    }
}

fn assert_unique<'a>(names: impl IntoIterator<Item = &'a str>, what: &str) {
    let mut seen = HashSet::new();
    for name in names {
        assert!(seen.insert(name), "duplicate {} name `{}`", what, name);
    }
}

fn assert_unique_declarations(decls: &[Declaration], owner: &str) {
    assert_unique(decls.iter().filter_map(|d| d.name()).map(|n| n.text.as_str()), owner);
}

fn assert_no_duplicate_siblings(module: &Module) {
    assert_unique(module.items.iter().map(|i| i.name().text.as_str()), "top-level");
    for item in &module.items {
        match item {
            ModuleItem::Struct(s) => {
                assert_unique(s.fields.iter().map(|f| f.name.text.as_str()), "struct field")
            }
            ModuleItem::Message(m) => {
                assert_unique(m.fields.iter().map(|f| f.name.text.as_str()), "message field")
            }
            ModuleItem::Trait(t) => assert_unique_declarations(&t.declarations, "trait member"),
            ModuleItem::Contract(c) => {
                assert_unique_declarations(&c.declarations, "contract member")
            }
            _ => {}
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn same_seed_same_program(seed in any::<u64>()) {
        let config = FuzzConfig::default();
        let first = sample_program(&config, seed).unwrap();
        let second = sample_program(&config, seed).unwrap();
        prop_assert_eq!(format_module(&first.module), format_module(&second.module));
    }

    #[test]
    fn depth_never_exceeds_the_ceiling(seed in any::<u64>(), max_depth in 0usize..=4) {
        let mut config = FuzzConfig::default();
        config.max_depth = max_depth;
        let sample = sample_program(&config, seed).unwrap();
        prop_assert!(sample.peak_depth <= max_depth);
    }

    #[test]
    fn hoisting_follows_the_scope_chain(blocks in 0usize..6, in_receiver in any::<bool>()) {
        let mut tree = ScopeTree::new();
        let root = tree.root();
        let contract = tree.child(root, ScopeKind::Contract).unwrap();
        let body_kind = if in_receiver { ScopeKind::Receive } else { ScopeKind::Method };
        let mut scope = tree.child(contract, body_kind).unwrap();
        for _ in 0..blocks {
            scope = tree.child(scope, ScopeKind::Block).unwrap();
        }
        prop_assert_eq!(tree.add(scope, binding(ScopeItemKind::Let)).unwrap(), scope);
        prop_assert_eq!(tree.add(scope, binding(ScopeItemKind::Field)).unwrap(), contract);
        prop_assert_eq!(tree.add(scope, binding(ScopeItemKind::MethodDef)).unwrap(), contract);
        prop_assert_eq!(tree.add(scope, binding(ScopeItemKind::ConstantDef)).unwrap(), contract);
        prop_assert_eq!(tree.add(scope, binding(ScopeItemKind::FunctionDef)).unwrap(), root);
        prop_assert_eq!(tree.add(scope, binding(ScopeItemKind::Struct)).unwrap(), root);

        let function = tree.child(root, ScopeKind::Function).unwrap();
        prop_assert!(tree.add(function, binding(ScopeItemKind::Field)).is_err());
        prop_assert_eq!(tree.add(function, binding(ScopeItemKind::ConstantDef)).unwrap(), root);
    }

    #[test]
    fn generated_programs_check_cleanly(seed in any::<u64>()) {
        let sample = sample_program(&FuzzConfig::default(), seed).unwrap();
        let diagnostics = check_module(&sample.module);
        let errors: Vec<String> = diagnostics.errors().map(|d| d.message.clone()).collect();
        prop_assert!(
            errors.is_empty(),
            "{:?}\n{}",
            errors,
            format_module(&sample.module)
        );
        assert_no_duplicate_siblings(&sample.module);
    }

    #[test]
    fn renaming_preserves_canonical_equality(seed in any::<u64>()) {
        let sample = sample_program(&FuzzConfig::default(), seed).unwrap();
        let renamed = AstRenamer::new().rename_module(&sample.module);
        prop_assert!(AstComparator::new(false, true).compare(&sample.module, &renamed));
    }
}

#[test]
fn pure_expressions_have_the_requested_type() {
    let env = Env::new();
    let config = FuzzConfig::default();
    let cases = [
        (Type::INT, CheckedType::Int),
        (Type::BOOL, CheckedType::Bool),
        (Type::STRING, CheckedType::String),
    ];
    for (ty, expected) in cases {
        for seed in 0..100 {
            let expr = sample_expression(&config, seed, &ty).unwrap();
            assert_eq!(
                resolve_expression(&env, &expr),
                Ok(expected.clone()),
                "{}",
                format_expression(&expr)
            );
        }
    }
}

#[test]
fn fixed_shape_end_to_end() {
    let options = ProgramOptions {
        add_stdlib: false,
        structs: Some(1),
        messages: Some(1),
        traits: Some(0),
    };
    for seed in 0..20 {
        let sample = sample_program_with(&FuzzConfig::default(), seed, options.clone()).unwrap();
        let items = &sample.module.items;
        let count = |f: fn(&ModuleItem) -> bool| items.iter().filter(|i| f(i)).count();
        assert_eq!(count(|i| matches!(i, ModuleItem::Struct(_))), 1);
        assert_eq!(count(|i| matches!(i, ModuleItem::Message(_))), 1);
        assert_eq!(count(|i| matches!(i, ModuleItem::Trait(_))), 0);
        assert_eq!(count(|i| matches!(i, ModuleItem::Contract(_))), 1);
        let Some(ModuleItem::Contract(contract)) = items.last() else {
            panic!("the contract comes last");
        };
        assert!(!contract.declarations.is_empty());
        assert!(contract.traits.is_empty());
    }
}

#[test]
fn stdlib_declarations_lead_the_module() {
    let options = ProgramOptions {
        add_stdlib: true,
        ..ProgramOptions::default()
    };
    let sample = sample_program_with(&FuzzConfig::default(), 5, options).unwrap();
    let text = format_module(&sample.module);
    assert!(text.starts_with("primitive Int;\n"));
    assert!(!check_module(&sample.module).has_errors());
}
