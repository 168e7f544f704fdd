//! Alpha-renaming of modules into a canonical form.
//!
//! Every module-, trait- and contract-level declaration receives a name of
//! the form `<kind>_<n>` from a per-kind counter. A declaration reuses an
//! existing canonical name when its original name was already renamed (an
//! override of a trait member) or when a structurally identical declaration
//! was already named. References are rewritten to match, and top-level items
//! are sorted by kind and canonical name.
//!
//! Renaming changes reference text and therefore hashes, which can reveal
//! new structurally identical declarations. Rounds repeat until the number of
//! canonical names stops changing, which makes the output a fixed point.

use std::collections::HashMap;

use tracing::trace;

use super::hash::{AstHash, AstHasher};
use crate::ast::visitor::VisitorMut;
use crate::ast::*;

/// Upper bound on renaming rounds; each round can only merge names, so this
/// is never reached for well-formed modules.
const MAX_ROUNDS: usize = 16;

#[derive(Debug, Clone, Copy, Default)]
pub struct AstRenamer;

impl AstRenamer {
    pub fn new() -> Self {
        Self
    }

    /// Rename a module into canonical form. The input is left untouched.
    pub fn rename_module(&self, module: &Module) -> Module {
        let mut current = module.clone();
        let mut previous_count = None;
        for round in 0..MAX_ROUNDS {
            let mut pass = RenamePass::new();
            current = pass.run(current);
            let count = pass.name_count();
            trace!(round, count, "rename round");
            if previous_count == Some(count) {
                break;
            }
            previous_count = Some(count);
        }
        current
    }
}

/// State of a single renaming round. Maps never outlive the round.
struct RenamePass {
    hasher: AstHasher,
    counters: HashMap<&'static str, usize>,
    by_name: HashMap<String, String>,
    by_hash: HashMap<AstHash, String>,
}

impl RenamePass {
    fn new() -> Self {
        Self {
            hasher: AstHasher::new(true),
            counters: HashMap::new(),
            by_name: HashMap::new(),
            by_hash: HashMap::new(),
        }
    }

    fn name_count(&self) -> usize {
        self.counters.values().sum()
    }

    fn run(&mut self, mut module: Module) -> Module {
        // Counters are shared between top-level and member constants, so the
        // walk must follow the same kind order the output is sorted in.
        module.items.sort_by_key(|i| i.kind_rank());
        for item in &module.items {
            self.collect_item(item);
        }

        for item in &mut module.items {
            if let Some(canonical) = self.by_name.get(&item.name().text) {
                item.name_mut().text = canonical.clone();
            }
            match item {
                ModuleItem::Trait(t) => self.rename_declarations(&mut t.declarations),
                ModuleItem::Contract(c) => self.rename_declarations(&mut c.declarations),
                _ => {}
            }
        }
        References::new(&self.by_name).visit_module_mut(&mut module);

        module.items.sort_by(|a, b| {
            let key = |i: &ModuleItem| (i.kind_rank(), i.name().text.len());
            key(a)
                .cmp(&key(b))
                .then_with(|| a.name().text.cmp(&b.name().text))
        });
        module
    }

    fn collect_item(&mut self, item: &ModuleItem) {
        let kind = match item {
            ModuleItem::PrimitiveType(_) => return,
            ModuleItem::Struct(_) => "struct",
            ModuleItem::Message(_) => "message",
            ModuleItem::Constant(_) => "constant",
            ModuleItem::Function(_) => "function",
            ModuleItem::Trait(_) => "trait",
            ModuleItem::Contract(_) => "contract",
        };
        let hash = self.hasher.hash_item(item);
        self.assign(kind, &item.name().text, hash);

        let decls = match item {
            ModuleItem::Trait(t) => &t.declarations,
            ModuleItem::Contract(c) => &c.declarations,
            _ => return,
        };
        for decl in decls {
            let kind = match decl {
                Declaration::Field(_) => "field",
                Declaration::ConstantDef(_) | Declaration::ConstantDecl(_) => "constant",
                Declaration::FunctionDef(_) | Declaration::FunctionDecl(_) => "method",
                Declaration::Receiver(_) => continue,
            };
            if let Some(name) = decl.name() {
                let hash = self.hasher.hash_declaration(decl);
                self.assign(kind, &name.text, hash);
            }
        }
    }

    fn assign(&mut self, kind: &'static str, original: &str, hash: AstHash) {
        if self.by_name.contains_key(original) {
            return;
        }
        if let Some(existing) = self.by_hash.get(&hash) {
            let existing = existing.clone();
            self.by_name.insert(original.to_string(), existing);
            return;
        }
        let counter = self.counters.entry(kind).or_insert(0);
        let canonical = format!("{}_{}", kind, counter);
        *counter += 1;
        self.by_name.insert(original.to_string(), canonical.clone());
        self.by_hash.insert(hash, canonical);
    }

    fn rename_declarations(&self, decls: &mut [Declaration]) {
        for decl in decls {
            if let Some(name) = decl.name_mut() {
                if let Some(canonical) = self.by_name.get(&name.text) {
                    name.text = canonical.clone();
                }
            }
        }
    }
}

/// Rewrites references to renamed declarations. Names bound by an enclosing
/// parameter, `let`, loop or catch variable refer to that local and are kept.
struct References<'a> {
    names: &'a HashMap<String, String>,
    locals: Vec<Vec<String>>,
}

impl<'a> References<'a> {
    fn new(names: &'a HashMap<String, String>) -> Self {
        Self {
            names,
            locals: Vec::new(),
        }
    }

    fn is_local(&self, name: &str) -> bool {
        self.locals.iter().flatten().any(|local| local == name)
    }

    fn rewrite(&self, id: &mut Id) {
        if let Some(canonical) = self.names.get(&id.text) {
            id.text = canonical.clone();
        }
    }
}

impl VisitorMut for References<'_> {
    fn visit_type_name_mut(&mut self, id: &mut Id) {
        self.rewrite(id);
    }

    fn visit_reference_mut(&mut self, id: &mut Id) {
        if !self.is_local(&id.text) {
            self.rewrite(id);
        }
    }

    // Locals are never callable.
    fn visit_callee_mut(&mut self, id: &mut Id) {
        self.rewrite(id);
    }

    fn visit_self_member_mut(&mut self, id: &mut Id) {
        self.rewrite(id);
    }

    fn visit_binding_mut(&mut self, id: &mut Id) {
        if let Some(block) = self.locals.last_mut() {
            block.push(id.text.clone());
        }
    }

    fn enter_block_mut(&mut self) {
        self.locals.push(Vec::new());
    }

    fn exit_block_mut(&mut self) {
        self.locals.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equiv::{AstComparator, AstHasher};
    use crate::format::format_module;

    fn int(value: u64) -> Expression {
        Expression::new(ExpressionKind::Number {
            base: NumberBase::Dec,
            value,
        })
    }

    fn field(name: &str, ty: &str) -> FieldDecl {
        FieldDecl {
            id: tact_common::next_id(),
            name: Id::new(name),
            type_ann: TypeAnnotation::named(ty),
            initializer: None,
        }
    }

    fn sample_module() -> Module {
        let trait_decl = ModuleItem::Trait(TraitDecl {
            id: tact_common::next_id(),
            name: Id::new("Base"),
            traits: vec![],
            declarations: vec![Declaration::ConstantDecl(ConstantDecl {
                id: tact_common::next_id(),
                attributes: vec![ConstantAttribute::Abstract],
                name: Id::new("limit"),
                type_ann: TypeAnnotation::named("Int"),
            })],
        });
        let getter = FunctionDef {
            id: tact_common::next_id(),
            attributes: vec![],
            name: Id::new("current"),
            return_type: Some(TypeAnnotation::named("Point")),
            params: vec![],
            statements: vec![Statement::Return(ReturnStmt {
                id: tact_common::next_id(),
                expression: Some(Expression::new(ExpressionKind::StructInstance {
                    ty: Id::new("Point"),
                    args: vec![StructFieldInitializer {
                        id: tact_common::next_id(),
                        field: Id::new("x"),
                        initializer: Expression::self_access("limit"),
                    }],
                })),
            })],
        };
        let contract = ModuleItem::Contract(ContractDecl {
            id: tact_common::next_id(),
            name: Id::new("Main"),
            traits: vec![Id::new("Base")],
            declarations: vec![
                Declaration::ConstantDef(ConstantDef {
                    id: tact_common::next_id(),
                    attributes: vec![ConstantAttribute::Override],
                    name: Id::new("limit"),
                    type_ann: TypeAnnotation::named("Int"),
                    initializer: int(10),
                }),
                Declaration::FunctionDef(getter),
            ],
        });
        let point = ModuleItem::Struct(StructDecl {
            id: tact_common::next_id(),
            name: Id::new("Point"),
            fields: vec![field("x", "Int")],
        });
        Module::new(vec![contract, trait_decl, point])
    }

    #[test]
    fn renames_and_rewrites_references() {
        let renamed = AstRenamer::new().rename_module(&sample_module());
        let expected = "\
struct struct_0 {
    x: Int;
}

trait trait_0 {
    abstract const constant_0: Int;
}

contract contract_0 with trait_0 {
    override const constant_0: Int = 10;
    fun method_0(): struct_0 {
        return struct_0 { x: self.constant_0 };
    }
}
";
        assert_eq!(format_module(&renamed), expected);
    }

    #[test]
    fn renaming_is_idempotent() {
        let once = AstRenamer::new().rename_module(&sample_module());
        let twice = AstRenamer::new().rename_module(&once);
        assert!(AstComparator::new(false, false).compare(&once, &twice));
    }

    #[test]
    fn identical_declarations_share_a_name() {
        let c = |name: &str| {
            ModuleItem::Constant(ConstantDef {
                id: tact_common::next_id(),
                attributes: vec![],
                name: Id::new(name),
                type_ann: TypeAnnotation::named("Int"),
                initializer: int(1),
            })
        };
        let renamed = AstRenamer::new().rename_module(&Module::new(vec![c("a"), c("b")]));
        let names: Vec<&str> = renamed.items.iter().map(|i| i.name().text.as_str()).collect();
        assert_eq!(names, vec!["constant_0", "constant_0"]);
    }

    #[test]
    fn locals_shadowing_a_global_keep_their_uses() {
        let ret = |name: &str| {
            Statement::Return(ReturnStmt {
                id: tact_common::next_id(),
                expression: Some(Expression::ident(name)),
            })
        };
        let global = ModuleItem::Constant(ConstantDef {
            id: tact_common::next_id(),
            attributes: vec![],
            name: Id::new("a"),
            type_ann: TypeAnnotation::named("Int"),
            initializer: int(1),
        });
        let shadowed = ModuleItem::Function(FunctionDef {
            id: tact_common::next_id(),
            attributes: vec![],
            name: Id::new("f"),
            return_type: Some(TypeAnnotation::named("Int")),
            params: vec![],
            statements: vec![
                Statement::Let(LetStmt {
                    id: tact_common::next_id(),
                    name: Id::new("a"),
                    type_ann: Some(TypeAnnotation::named("Int")),
                    expression: int(2),
                }),
                ret("a"),
            ],
        });
        let by_param = ModuleItem::Function(FunctionDef {
            id: tact_common::next_id(),
            attributes: vec![],
            name: Id::new("g"),
            return_type: Some(TypeAnnotation::named("Int")),
            params: vec![TypedParameter {
                id: tact_common::next_id(),
                name: Id::new("a"),
                type_ann: TypeAnnotation::named("Int"),
            }],
            statements: vec![ret("a")],
        });
        let reads_global = ModuleItem::Function(FunctionDef {
            id: tact_common::next_id(),
            attributes: vec![],
            name: Id::new("h"),
            return_type: Some(TypeAnnotation::named("Int")),
            params: vec![],
            statements: vec![ret("a")],
        });
        let module = Module::new(vec![global, shadowed, by_param, reads_global]);
        let text = format_module(&AstRenamer::new().rename_module(&module));
        assert!(text.contains("let a: Int = 2;\n    return a;"), "{}", text);
        assert!(text.contains("(a: Int): Int {\n    return a;"), "{}", text);
        assert!(text.contains("return constant_0;"), "{}", text);
    }

    #[test]
    fn hash_is_stable_under_renaming() {
        let module = sample_module();
        let hasher = AstHasher::new(true);
        let renamed = AstRenamer::new().rename_module(&module);
        assert_eq!(
            hasher.hash(&AstRenamer::new().rename_module(&renamed)),
            hasher.hash(&renamed)
        );
    }
}
