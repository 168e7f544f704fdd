use std::collections::HashMap;

use tact_common::{AstId, Diagnostic, DiagnosticBag};

use crate::ast::visitor::is_self;
use crate::ast::*;

use super::env::{Env, MemberKind, SelfEnv, Signature, StructField, StructInfo};
use super::scope::{ScopeKind, SymbolKind};
use super::type_checker::types_assignable;
use super::types::Type;

/// Two-pass name resolver and type checker for a module.
///
/// Pass 1 collects top-level declarations so that forward references work.
/// Pass 2 walks all bodies, resolving names and checking types.
pub struct Resolver {
    env: Env,
    diagnostics: DiagnosticBag,
    traits: HashMap<String, TraitDecl>,
    /// The return type of the enclosing function or receiver (if any).
    current_return: Option<Type>,
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}

impl Resolver {
    pub fn new() -> Self {
        Self {
            env: Env::new(),
            diagnostics: DiagnosticBag::new(),
            traits: HashMap::new(),
            current_return: None,
        }
    }

    /// Run both passes and return accumulated diagnostics.
    pub fn resolve(mut self, module: &Module) -> DiagnosticBag {
        self.collect_declarations(module);
        for item in &module.items {
            self.resolve_item(item);
        }
        self.diagnostics
    }

    // ====================================================================
    // Pass 1: top-level declarations
    // ====================================================================

    fn collect_declarations(&mut self, module: &Module) {
        let mut seen: HashMap<String, AstId> = HashMap::new();
        for item in &module.items {
            let name = &item.name().text;
            if seen.insert(name.clone(), item.name().id).is_some() {
                self.diagnostics.report(
                    Diagnostic::error(format!("duplicate declaration `{}`", name))
                        .with_node(item.name().id)
                        .with_suggestion("top-level names must be unique"),
                );
                continue;
            }
            match item {
                ModuleItem::PrimitiveType(_) | ModuleItem::Contract(_) => {}
                ModuleItem::Struct(s) => self.env.define_struct(name, struct_info(&s.fields, false)),
                ModuleItem::Message(m) => self.env.define_struct(name, struct_info(&m.fields, true)),
                ModuleItem::Constant(c) => {
                    let ty = Type::from_annotation(&c.type_ann);
                    // Duplicates were filtered above.
                    let _ = self.env.define(name, SymbolKind::Constant, ty, c.id);
                }
                ModuleItem::Function(f) => self
                    .env
                    .define_function(name, Signature::of(&f.params, f.return_type.as_ref())),
                ModuleItem::Trait(t) => {
                    self.traits.insert(name.clone(), t.clone());
                }
            }
        }
    }

    // ====================================================================
    // Pass 2: bodies
    // ====================================================================

    fn resolve_item(&mut self, item: &ModuleItem) {
        match item {
            ModuleItem::PrimitiveType(p) => {
                if !Type::from_name(&p.name.text).is_primitive() {
                    self.diagnostics
                        .error(format!("unknown primitive type `{}`", p.name.text), p.id);
                }
            }
            ModuleItem::Struct(s) => self.resolve_fields(&s.fields),
            ModuleItem::Message(m) => {
                if let Some(ref opcode) = m.opcode {
                    self.expect_type(opcode, &Type::Int, "message opcode");
                }
                self.resolve_fields(&m.fields);
            }
            ModuleItem::Constant(c) => self.resolve_constant_def(c),
            ModuleItem::Function(f) => self.resolve_function(f),
            ModuleItem::Trait(t) => {
                let self_env = self.self_env_for(&t.name.text, &t.traits, &t.declarations);
                self.resolve_members(self_env, &t.declarations);
            }
            ModuleItem::Contract(c) => {
                self.check_abstract_members(c);
                let self_env = self.self_env_for(&c.name.text, &c.traits, &c.declarations);
                self.resolve_members(self_env, &c.declarations);
            }
        }
    }

    fn resolve_fields(&mut self, fields: &[FieldDecl]) {
        let mut seen: Vec<&str> = Vec::new();
        for field in fields {
            if seen.contains(&field.name.text.as_str()) {
                self.diagnostics
                    .error(format!("duplicate field `{}`", field.name.text), field.id);
            }
            seen.push(&field.name.text);
            self.resolve_field(field);
        }
    }

    fn resolve_field(&mut self, field: &FieldDecl) {
        let ty = self.check_annotation(&field.type_ann);
        if let Some(ref init) = field.initializer {
            self.expect_type(init, &ty, &format!("initializer of `{}`", field.name.text));
        }
    }

    fn resolve_constant_def(&mut self, c: &ConstantDef) {
        let ty = self.check_annotation(&c.type_ann);
        self.expect_type(
            &c.initializer,
            &ty,
            &format!("initializer of constant `{}`", c.name.text),
        );
    }

    fn check_annotation(&mut self, ann: &TypeAnnotation) -> Type {
        let ty = Type::from_annotation(ann);
        if !self.env.is_known_type(&ty) {
            self.diagnostics
                .error(format!("unknown type `{}`", ty.display_name()), ann.id);
            return Type::Error;
        }
        ty
    }

    /// Members visible through `self`: inherited trait members first, then
    /// the body's own declarations, which override them.
    fn self_env_for(&mut self, name: &str, traits: &[Id], decls: &[Declaration]) -> SelfEnv {
        let mut env = SelfEnv {
            name: name.to_string(),
            ..SelfEnv::default()
        };
        for t in traits {
            match self.traits.get(&t.text) {
                Some(trait_decl) => add_members(&mut env, &trait_decl.declarations),
                None => self
                    .diagnostics
                    .error(format!("undefined trait `{}`", t.text), t.id),
            }
        }
        add_members(&mut env, decls);
        env
    }

    fn check_abstract_members(&mut self, contract: &ContractDecl) {
        for t in &contract.traits {
            let Some(trait_decl) = self.traits.get(&t.text) else {
                continue;
            };
            for decl in &trait_decl.declarations {
                let abstract_name = match decl {
                    Declaration::ConstantDecl(c) => &c.name.text,
                    Declaration::FunctionDecl(f) => &f.name.text,
                    _ => continue,
                };
                let implemented = contract.declarations.iter().any(|d| {
                    matches!(d, Declaration::ConstantDef(_) | Declaration::FunctionDef(_))
                        && d.name().is_some_and(|n| &n.text == abstract_name)
                });
                if !implemented {
                    self.diagnostics.report(
                        Diagnostic::error(format!(
                            "contract `{}` does not implement abstract `{}` from trait `{}`",
                            contract.name.text, abstract_name, t.text
                        ))
                        .with_node(contract.id),
                    );
                }
            }
        }
    }

    fn resolve_members(&mut self, self_env: SelfEnv, decls: &[Declaration]) {
        self.env.enter_self(self_env);
        let mut seen: Vec<&str> = Vec::new();
        for decl in decls {
            if let Some(name) = decl.name() {
                if seen.contains(&name.text.as_str()) {
                    self.diagnostics
                        .error(format!("duplicate member `{}`", name.text), name.id);
                }
                seen.push(&name.text);
            }
            match decl {
                Declaration::Field(f) => self.resolve_field(f),
                Declaration::ConstantDef(c) => self.resolve_constant_def(c),
                Declaration::ConstantDecl(c) => {
                    self.check_annotation(&c.type_ann);
                }
                Declaration::FunctionDef(f) => self.resolve_function(f),
                Declaration::FunctionDecl(f) => {
                    for p in &f.params {
                        self.check_annotation(&p.type_ann);
                    }
                    if let Some(ref ret) = f.return_type {
                        self.check_annotation(ret);
                    }
                }
                Declaration::Receiver(r) => self.resolve_receiver(r),
            }
        }
        self.env.leave_self();
    }

    fn resolve_function(&mut self, func: &FunctionDef) {
        self.env.push_scope(ScopeKind::Function);
        for param in &func.params {
            let ty = self.check_annotation(&param.type_ann);
            self.define_local(&param.name, SymbolKind::Parameter, ty);
        }
        let ret = match func.return_type {
            Some(ref ann) => self.check_annotation(ann),
            None => Type::Void,
        };
        let needs_return = ret != Type::Void;
        self.current_return = Some(ret);
        self.resolve_statements(&func.statements);
        if needs_return && !always_returns(&func.statements) {
            self.diagnostics.error(
                format!("function `{}` does not always return a value", func.name.text),
                func.id,
            );
        }
        self.current_return = None;
        self.env.pop_scope();
    }

    fn resolve_receiver(&mut self, receiver: &Receiver) {
        self.env.push_scope(ScopeKind::Function);
        match &receiver.selector {
            ReceiverKind::Internal(ReceiverSubKind::Simple { param, type_ann })
            | ReceiverKind::External(ReceiverSubKind::Simple { param, type_ann }) => {
                let ty = self.check_annotation(type_ann);
                if !matches!(ty, Type::String | Type::Error)
                    && !self.is_message(&ty)
                {
                    self.diagnostics.error(
                        format!(
                            "receiver parameter must be a message or String, got {}",
                            ty.display_name()
                        ),
                        type_ann.id,
                    );
                }
                self.define_local(param, SymbolKind::Parameter, ty);
            }
            ReceiverKind::Bounce { param, type_ann } => {
                let ty = self.check_annotation(type_ann);
                self.define_local(param, SymbolKind::Parameter, ty);
            }
            ReceiverKind::Internal(_) | ReceiverKind::External(_) => {}
        }
        self.current_return = Some(Type::Void);
        self.resolve_statements(&receiver.statements);
        self.current_return = None;
        self.env.pop_scope();
    }

    fn is_message(&self, ty: &Type) -> bool {
        match ty {
            Type::Named(n) => self.env.struct_info(n).is_some_and(|s| s.is_message),
            _ => false,
        }
    }

    // ====================================================================
    // Statements
    // ====================================================================

    fn resolve_block(&mut self, stmts: &[Statement]) {
        self.env.push_scope(ScopeKind::Block);
        self.resolve_statements(stmts);
        self.env.pop_scope();
    }

    fn resolve_statements(&mut self, stmts: &[Statement]) {
        for stmt in stmts {
            self.resolve_stmt(stmt);
        }
    }

    fn resolve_stmt(&mut self, stmt: &Statement) {
        match stmt {
            Statement::Let(s) => self.resolve_let(s),
            Statement::Return(s) => self.resolve_return(s),
            Statement::Expression(s) => {
                self.resolve_expr(&s.expression);
            }
            Statement::Assign(s) => {
                if let Some(target) = self.check_assign_target(&s.path) {
                    self.expect_type(&s.expression, &target, "assigned value");
                }
            }
            Statement::AugmentedAssign(s) => {
                if let Some(target) = self.check_assign_target(&s.path) {
                    if !types_assignable(&target, &Type::Int) {
                        self.diagnostics.error(
                            format!(
                                "operator '{}' requires an Int target, got {}",
                                s.op.symbol(),
                                target.display_name()
                            ),
                            s.id,
                        );
                    }
                    self.expect_type(&s.expression, &Type::Int, "augmented assignment operand");
                }
            }
            Statement::Condition(s) => {
                self.expect_type(&s.condition, &Type::Bool, "if condition");
                self.resolve_block(&s.true_statements);
                if let Some(ref stmts) = s.false_statements {
                    self.resolve_block(stmts);
                }
            }
            Statement::While(s) => {
                self.expect_type(&s.condition, &Type::Bool, "while condition");
                self.resolve_block(&s.statements);
            }
            Statement::Until(s) => {
                self.resolve_block(&s.statements);
                self.expect_type(&s.condition, &Type::Bool, "until condition");
            }
            Statement::Repeat(s) => {
                self.expect_type(&s.iterations, &Type::Int, "repeat count");
                self.resolve_block(&s.statements);
            }
            Statement::Try(s) => {
                self.resolve_block(&s.statements);
                if let Some(ref catch) = s.catch_block {
                    self.env.push_scope(ScopeKind::Block);
                    self.define_local(&catch.name, SymbolKind::Variable, Type::Int);
                    self.resolve_statements(&catch.statements);
                    self.env.pop_scope();
                }
            }
            Statement::Foreach(s) => {
                let (key, value) = match self.resolve_expr(&s.map) {
                    Some(Type::Map(k, v)) => (*k, *v),
                    Some(Type::Error) | None => (Type::Error, Type::Error),
                    Some(other) => {
                        self.diagnostics.error(
                            format!("foreach requires a map, got {}", other.display_name()),
                            s.map.id,
                        );
                        (Type::Error, Type::Error)
                    }
                };
                self.env.push_scope(ScopeKind::Block);
                self.define_local(&s.key_name, SymbolKind::Variable, key);
                self.define_local(&s.value_name, SymbolKind::Variable, value);
                self.resolve_statements(&s.statements);
                self.env.pop_scope();
            }
        }
    }

    fn resolve_let(&mut self, stmt: &LetStmt) {
        let value = self.resolve_expr(&stmt.expression).unwrap_or(Type::Error);
        let ty = match stmt.type_ann {
            Some(ref ann) => {
                let declared = self.check_annotation(ann);
                if !types_assignable(&value, &declared) {
                    self.diagnostics.error(
                        format!(
                            "`{}` is declared as {} but initialized with {}",
                            stmt.name.text,
                            declared.display_name(),
                            value.display_name()
                        ),
                        stmt.id,
                    );
                }
                declared
            }
            None => {
                if matches!(value, Type::Null | Type::Void) {
                    self.diagnostics.error(
                        format!("cannot infer the type of `{}`", stmt.name.text),
                        stmt.id,
                    );
                }
                value
            }
        };
        self.define_local(&stmt.name, SymbolKind::Variable, ty);
    }

    fn resolve_return(&mut self, stmt: &ReturnStmt) {
        let Some(expected) = self.current_return.clone() else {
            self.diagnostics
                .error("'return' outside of a function", stmt.id);
            return;
        };
        match (&stmt.expression, expected) {
            (None, Type::Void) => {}
            (None, expected) => self.diagnostics.error(
                format!("missing return value of type {}", expected.display_name()),
                stmt.id,
            ),
            (Some(expr), Type::Void) => {
                self.diagnostics
                    .error("function without a return type returns a value", expr.id);
            }
            (Some(expr), expected) => self.expect_type(expr, &expected, "return value"),
        }
    }

    /// Resolve an assignment target; `None` means an error was reported.
    fn check_assign_target(&mut self, path: &Expression) -> Option<Type> {
        match &path.kind {
            ExpressionKind::Id(id) => match self.env.scopes.lookup(&id.text) {
                Some(sym) if sym.is_assignable() => Some(sym.ty.clone()),
                Some(_) => {
                    self.diagnostics
                        .error(format!("cannot assign to constant `{}`", id.text), path.id);
                    None
                }
                None => {
                    self.diagnostics
                        .error(format!("undefined name `{}`", id.text), path.id);
                    None
                }
            },
            ExpressionKind::FieldAccess { aggregate, field } if is_self(aggregate) => {
                let member = self
                    .env
                    .self_env()
                    .and_then(|s| s.members.get(&field.text))
                    .cloned();
                match member {
                    Some((MemberKind::Field, ty)) => Some(ty),
                    Some((MemberKind::Constant, _)) => {
                        self.diagnostics.error(
                            format!("cannot assign to constant `self.{}`", field.text),
                            path.id,
                        );
                        None
                    }
                    None => {
                        self.diagnostics
                            .error(format!("undefined field `self.{}`", field.text), path.id);
                        None
                    }
                }
            }
            _ => {
                self.diagnostics.error("invalid assignment target", path.id);
                None
            }
        }
    }

    // ====================================================================
    // Expressions
    // ====================================================================

    /// Resolve an expression; `None` means an error was reported.
    fn resolve_expr(&mut self, expr: &Expression) -> Option<Type> {
        match self.env.type_of(expr) {
            Ok(ty) => Some(ty),
            Err(message) => {
                self.diagnostics.error(message, expr.id);
                None
            }
        }
    }

    fn expect_type(&mut self, expr: &Expression, expected: &Type, what: &str) {
        if let Some(actual) = self.resolve_expr(expr) {
            if !types_assignable(&actual, expected) {
                self.diagnostics.error(
                    format!(
                        "{} must be {}, got {}",
                        what,
                        expected.display_name(),
                        actual.display_name()
                    ),
                    expr.id,
                );
            }
        }
    }

    fn define_local(&mut self, name: &Id, kind: SymbolKind, ty: Type) {
        if self.env.scopes.lookup(&name.text).is_some() {
            self.diagnostics.warning(
                format!("`{}` shadows an outer declaration", name.text),
                name.id,
            );
        }
        if self.env.define(&name.text, kind, ty, name.id).is_err() {
            self.diagnostics
                .error(format!("`{}` is already declared", name.text), name.id);
        }
    }
}

fn struct_info(fields: &[FieldDecl], is_message: bool) -> StructInfo {
    StructInfo {
        fields: fields
            .iter()
            .map(|f| StructField {
                name: f.name.text.clone(),
                ty: Type::from_annotation(&f.type_ann),
                has_default: f.initializer.is_some(),
            })
            .collect(),
        is_message,
    }
}

fn add_members(env: &mut SelfEnv, decls: &[Declaration]) {
    for decl in decls {
        match decl {
            Declaration::Field(f) => {
                env.members.insert(
                    f.name.text.clone(),
                    (MemberKind::Field, Type::from_annotation(&f.type_ann)),
                );
            }
            Declaration::ConstantDef(c) => {
                env.members.insert(
                    c.name.text.clone(),
                    (MemberKind::Constant, Type::from_annotation(&c.type_ann)),
                );
            }
            Declaration::ConstantDecl(c) => {
                env.members.insert(
                    c.name.text.clone(),
                    (MemberKind::Constant, Type::from_annotation(&c.type_ann)),
                );
            }
            Declaration::FunctionDef(f) => {
                env.methods.insert(
                    f.name.text.clone(),
                    Signature::of(&f.params, f.return_type.as_ref()),
                );
            }
            Declaration::FunctionDecl(f) => {
                env.methods.insert(
                    f.name.text.clone(),
                    Signature::of(&f.params, f.return_type.as_ref()),
                );
            }
            Declaration::Receiver(_) => {}
        }
    }
}

/// Whether every path through `stmts` ends in a `return`.
fn always_returns(stmts: &[Statement]) -> bool {
    match stmts.last() {
        Some(Statement::Return(_)) => true,
        Some(Statement::Condition(c)) => {
            always_returns(&c.true_statements)
                && c.false_statements.as_deref().is_some_and(always_returns)
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tact_common::Severity;

    fn errors(module: &Module) -> Vec<String> {
        Resolver::new()
            .resolve(module)
            .into_diagnostics()
            .into_iter()
            .filter(|d| d.severity == Severity::Error)
            .map(|d| d.message)
            .collect()
    }

    fn warnings(module: &Module) -> Vec<String> {
        Resolver::new()
            .resolve(module)
            .into_diagnostics()
            .into_iter()
            .filter(|d| d.severity == Severity::Warning)
            .map(|d| d.message)
            .collect()
    }

    fn int(value: u64) -> Expression {
        Expression::new(ExpressionKind::Number {
            base: NumberBase::Dec,
            value,
        })
    }

    fn let_stmt(name: &str, ty: &str, value: Expression) -> Statement {
        Statement::Let(LetStmt {
            id: tact_common::next_id(),
            name: Id::new(name),
            type_ann: Some(TypeAnnotation::named(ty)),
            expression: value,
        })
    }

    fn ret(value: Expression) -> Statement {
        Statement::Return(ReturnStmt {
            id: tact_common::next_id(),
            expression: Some(value),
        })
    }

    fn function(name: &str, ret_ty: Option<&str>, body: Vec<Statement>) -> FunctionDef {
        FunctionDef {
            id: tact_common::next_id(),
            attributes: vec![],
            name: Id::new(name),
            return_type: ret_ty.map(TypeAnnotation::named),
            params: vec![],
            statements: body,
        }
    }

    fn module(items: Vec<ModuleItem>) -> Module {
        Module::new(items)
    }

    #[test]
    fn undefined_variable() {
        let m = module(vec![ModuleItem::Function(function(
            "f",
            Some("Int"),
            vec![ret(Expression::ident("y"))],
        ))]);
        let errs = errors(&m);
        assert_eq!(errs.len(), 1);
        assert!(errs[0].contains("undefined name `y`"));
    }

    #[test]
    fn forward_reference_functions() {
        let main = function(
            "main",
            Some("Int"),
            vec![ret(Expression::static_call("helper", vec![]))],
        );
        let helper = function("helper", Some("Int"), vec![ret(int(1))]);
        let m = module(vec![
            ModuleItem::Function(main),
            ModuleItem::Function(helper),
        ]);
        assert!(errors(&m).is_empty());
    }

    #[test]
    fn duplicate_top_level() {
        let m = module(vec![
            ModuleItem::Function(function("foo", None, vec![])),
            ModuleItem::Function(function("foo", None, vec![])),
        ]);
        let errs = errors(&m);
        assert!(errs.iter().any(|e| e.contains("duplicate declaration `foo`")));
    }

    #[test]
    fn let_type_mismatch() {
        let m = module(vec![ModuleItem::Function(function(
            "f",
            None,
            vec![let_stmt("x", "Bool", int(1))],
        ))]);
        let errs = errors(&m);
        assert!(errs[0].contains("declared as Bool but initialized with Int"));
    }

    #[test]
    fn missing_return() {
        let m = module(vec![ModuleItem::Function(function(
            "f",
            Some("Int"),
            vec![let_stmt("x", "Int", int(1))],
        ))]);
        let errs = errors(&m);
        assert!(errs[0].contains("does not always return"));
    }

    #[test]
    fn while_condition_not_bool() {
        let body = vec![Statement::While(WhileStmt {
            id: tact_common::next_id(),
            condition: int(1),
            statements: vec![],
        })];
        let m = module(vec![ModuleItem::Function(function("f", None, body))]);
        let errs = errors(&m);
        assert!(errs[0].contains("while condition must be Bool"));
    }

    #[test]
    fn assign_to_constant() {
        let constant = ModuleItem::Constant(ConstantDef {
            id: tact_common::next_id(),
            attributes: vec![],
            name: Id::new("LIMIT"),
            type_ann: TypeAnnotation::named("Int"),
            initializer: int(3),
        });
        let body = vec![Statement::Assign(AssignStmt {
            id: tact_common::next_id(),
            path: Expression::ident("LIMIT"),
            expression: int(4),
        })];
        let m = module(vec![constant, ModuleItem::Function(function("f", None, body))]);
        let errs = errors(&m);
        assert!(errs[0].contains("cannot assign to constant `LIMIT`"));
    }

    #[test]
    fn contract_fields_and_abstract_members() {
        let trait_decl = ModuleItem::Trait(TraitDecl {
            id: tact_common::next_id(),
            name: Id::new("Limits"),
            traits: vec![],
            declarations: vec![Declaration::ConstantDecl(ConstantDecl {
                id: tact_common::next_id(),
                attributes: vec![ConstantAttribute::Abstract],
                name: Id::new("max"),
                type_ann: TypeAnnotation::named("Int"),
            })],
        });
        let bump = Statement::AugmentedAssign(AugmentedAssignStmt {
            id: tact_common::next_id(),
            op: AugmentedAssignOp::Add,
            path: Expression::self_access("count"),
            expression: Expression::self_access("max"),
        });
        let contract = |decls: Vec<Declaration>| {
            ModuleItem::Contract(ContractDecl {
                id: tact_common::next_id(),
                name: Id::new("Counter"),
                traits: vec![Id::new("Limits")],
                declarations: decls,
            })
        };
        let field = Declaration::Field(FieldDecl {
            id: tact_common::next_id(),
            name: Id::new("count"),
            type_ann: TypeAnnotation::named("Int"),
            initializer: Some(int(0)),
        });
        let receiver = Declaration::Receiver(Receiver {
            id: tact_common::next_id(),
            selector: ReceiverKind::Internal(ReceiverSubKind::Fallback),
            statements: vec![bump],
        });
        let max = Declaration::ConstantDef(ConstantDef {
            id: tact_common::next_id(),
            attributes: vec![ConstantAttribute::Override],
            name: Id::new("max"),
            type_ann: TypeAnnotation::named("Int"),
            initializer: int(10),
        });

        let complete = module(vec![
            trait_decl.clone(),
            contract(vec![field.clone(), max, receiver.clone()]),
        ]);
        assert!(errors(&complete).is_empty());

        let incomplete = module(vec![trait_decl, contract(vec![field, receiver])]);
        let errs = errors(&incomplete);
        assert!(errs[0].contains("does not implement abstract `max`"));
    }

    #[test]
    fn shadowing_warns() {
        let inner = Statement::Condition(ConditionStmt {
            id: tact_common::next_id(),
            condition: Expression::new(ExpressionKind::Boolean(true)),
            true_statements: vec![let_stmt("x", "Int", int(2))],
            false_statements: None,
        });
        let m = module(vec![ModuleItem::Function(function(
            "f",
            None,
            vec![let_stmt("x", "Int", int(1)), inner],
        ))]);
        assert!(errors(&m).is_empty());
        assert_eq!(warnings(&m), vec!["`x` shadows an outer declaration"]);
    }

    #[test]
    fn foreach_binds_key_and_value() {
        let map_field = Declaration::Field(FieldDecl {
            id: tact_common::next_id(),
            name: Id::new("balances"),
            type_ann: TypeAnnotation::new(TypeKind::Map {
                key: Id::new("Int"),
                value: Id::new("Bool"),
            }),
            initializer: None,
        });
        let body = vec![Statement::Foreach(ForeachStmt {
            id: tact_common::next_id(),
            key_name: Id::new("k"),
            value_name: Id::new("v"),
            map: Expression::self_access("balances"),
            statements: vec![let_stmt("copy", "Bool", Expression::ident("v"))],
        })];
        let contract = ModuleItem::Contract(ContractDecl {
            id: tact_common::next_id(),
            name: Id::new("Bank"),
            traits: vec![],
            declarations: vec![
                map_field,
                Declaration::FunctionDef(function("scan", None, body)),
            ],
        });
        assert!(errors(&module(vec![contract])).is_empty());
    }
}
