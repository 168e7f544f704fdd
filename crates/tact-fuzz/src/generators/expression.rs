//! Type-directed expression generation.
//!
//! An expression of the requested type is produced by one of several
//! strategies: reading an existing or new constant, field or local, reading a
//! field of a struct-typed variable, calling a function or method, or falling
//! back to a base case built from literals and operators. Strategies that
//! need a declaration which does not exist yet synthesize it and register it
//! in the scope tree as a side effect.

use rand::rngs::StdRng;
use rand::Rng;
use tact_common::{next_id, AstId};
use tact_compiler::ast::*;
use tracing::trace;

use super::constant::ConstantGen;
use super::field::FieldGen;
use super::function::FunctionGen;
use super::statement::StatementGen;
use super::{emit_statement, Declare, Generative};
use crate::context::Session;
use crate::error::{FuzzError, Result};
use crate::scope::{Binding, Entity, ScopeId, ScopeItemKind, ScopeKind};
use crate::types::{FunctionKind, StdlibType, Type, UtilType};
use crate::util::{random_element, random_number, random_string, weighted_choice};

/// Statements synthesized by one statement injection.
pub const STATEMENTS_PER_INJECTION: usize = 1;

/// Chance of reusing an existing declaration when a new one could be made.
const REUSE_PROBABILITY: f64 = 0.7;

/// Which declarations an expression generator may create on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Synthesis {
    pub functions: bool,
    pub methods: bool,
    pub constants: bool,
    pub fields: bool,
    pub statements: bool,
    pub lets: bool,
}

impl Synthesis {
    pub const ALL: Synthesis = Synthesis {
        functions: true,
        methods: true,
        constants: true,
        fields: true,
        statements: true,
        lets: true,
    };

    pub const NONE: Synthesis = Synthesis {
        functions: false,
        methods: false,
        constants: false,
        fields: false,
        statements: false,
        lets: false,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Strategy {
    Base,
    Constant,
    Field,
    Local,
    StructAccess,
    Call,
    Statements,
}

enum Pick<T> {
    Reuse(T),
    Synthesize,
    Nothing,
}

fn pick<T: Clone>(rng: &mut StdRng, candidates: &[T], can_synthesize: bool) -> Pick<T> {
    match random_element(rng, candidates) {
        Some(c) if !can_synthesize || rng.gen_bool(REUSE_PROBABILITY) => Pick::Reuse(c.clone()),
        _ if can_synthesize => Pick::Synthesize,
        _ => Pick::Nothing,
    }
}

pub struct ExpressionGen {
    id: AstId,
    ty: Type,
    scope: ScopeId,
    synthesis: Synthesis,
    /// Only literals and operators: constant and field initializers.
    compile_time: bool,
    /// The depth ceiling was reached when this generator was created.
    literal_only: bool,
}

impl ExpressionGen {
    pub fn new(session: &mut Session, scope: ScopeId, ty: Type) -> Self {
        Self::with_options(session, scope, ty, Synthesis::ALL, false)
    }

    /// A generator for initializers that must be evaluable at compile time.
    pub fn compile_time(session: &mut Session, scope: ScopeId, ty: Type) -> Self {
        Self::with_options(session, scope, ty, Synthesis::NONE, true)
    }

    pub fn with_options(
        session: &mut Session,
        scope: ScopeId,
        ty: Type,
        synthesis: Synthesis,
        compile_time: bool,
    ) -> Self {
        session.observe_depth();
        let literal_only = session.at_depth_limit();
        Self {
            id: next_id(),
            ty,
            scope,
            synthesis: if literal_only { Synthesis::NONE } else { synthesis },
            compile_time,
            literal_only,
        }
    }

    fn sub(&self, session: &mut Session, ty: Type) -> Result<Expression> {
        ExpressionGen::with_options(session, self.scope, ty, self.synthesis, self.compile_time)
            .generate(session)
    }

    fn applicable(&self, session: &Session) -> Vec<Strategy> {
        let mut strategies = vec![Strategy::Base];
        if self.compile_time {
            return strategies;
        }
        let scopes = &session.scopes;
        let in_body = scopes.has_parent(self.scope, ScopeKind::BODIES);
        let in_contract = scopes.has_parent(self.scope, &[ScopeKind::Contract]);

        if self.ty.is_compile_time_initializable() {
            strategies.push(Strategy::Constant);
        }
        if in_body && in_contract && (self.ty.is_compile_time_initializable() || self.ty.is_map()) {
            strategies.push(Strategy::Field);
        }
        if in_body && self.ty.is_storable() {
            strategies.push(Strategy::Local);
        }
        if in_body && matches!(self.ty, Type::Stdlib(_)) {
            strategies.push(Strategy::StructAccess);
        }
        if !self.literal_only {
            strategies.push(Strategy::Call);
        }
        if in_body && self.synthesis.statements {
            strategies.push(Strategy::Statements);
        }
        strategies
    }

    fn generate_value(&self, session: &mut Session) -> Result<Expression> {
        let mut strategies = self.applicable(session);
        let mut choice = random_element(&mut session.rng, &strategies)
            .copied()
            .unwrap_or(Strategy::Base);
        trace!(?choice, ty = %self.ty, depth = session.depth(), "expression strategy");
        if choice == Strategy::Statements {
            self.inject_statements(session)?;
            strategies.retain(|s| *s != Strategy::Statements);
            choice = random_element(&mut session.rng, &strategies)
                .copied()
                .unwrap_or(Strategy::Base);
        }
        let expr = match choice {
            Strategy::Constant => self.constant(session)?,
            Strategy::Field => self.field(session)?,
            Strategy::Local => self.local(session)?,
            Strategy::StructAccess => self.struct_access(session)?,
            Strategy::Call => self.call(session)?,
            Strategy::Base | Strategy::Statements => None,
        };
        match expr {
            Some(expr) => Ok(expr),
            None => self.base(session),
        }
    }

    // ====================================================================
    // Strategies
    // ====================================================================

    fn constant(&self, session: &mut Session) -> Result<Option<Expression>> {
        let scopes = &session.scopes;
        let in_trait = scopes.has_parent(self.scope, &[ScopeKind::Trait]);
        // (name, read through self)
        let candidates: Vec<(String, bool)> = scopes
            .get_items_recursive(
                self.scope,
                &[ScopeItemKind::ConstantDef, ScopeItemKind::ConstantDecl],
            )
            .into_iter()
            .filter(|(_, b)| b.ty == self.ty)
            .filter_map(|(owner, b)| match scopes.kind(owner) {
                ScopeKind::Program => Some((b.name.clone(), false)),
                ScopeKind::Trait if in_trait => None,
                _ => Some((b.name.clone(), true)),
            })
            .collect();
        let target = scopes.find_parent(
            self.scope,
            &[ScopeKind::Trait, ScopeKind::Contract, ScopeKind::Program],
        );
        let can_synthesize = self.synthesis.constants && target.is_some();

        match pick(&mut session.rng, &candidates, can_synthesize) {
            Pick::Reuse((name, through_self)) => Ok(Some(read(name, through_self))),
            Pick::Synthesize => {
                let Some(target) = target else {
                    return Ok(None);
                };
                // Inside a trait the value is left to the implementing contract.
                let gen = if session.scopes.kind(target) == ScopeKind::Trait {
                    ConstantGen::declaration(session, target, self.ty.clone(), None)?
                } else {
                    ConstantGen::definition(session, target, self.ty.clone(), None, vec![])?
                };
                gen.declare(session)?;
                let through_self = session.scopes.kind(target) != ScopeKind::Program;
                Ok(gen.name().map(|n| read(n.to_string(), through_self)))
            }
            Pick::Nothing => Ok(None),
        }
    }

    fn field(&self, session: &mut Session) -> Result<Option<Expression>> {
        let Some(contract) = session.scopes.find_parent(self.scope, &[ScopeKind::Contract]) else {
            return Ok(None);
        };
        let candidates: Vec<String> = session
            .scopes
            .get_all(contract, ScopeItemKind::Field)
            .into_iter()
            .filter(|b| b.ty == self.ty)
            .map(|b| b.name.clone())
            .collect();
        match pick(&mut session.rng, &candidates, self.synthesis.fields) {
            Pick::Reuse(name) => Ok(Some(Expression::self_access(name))),
            Pick::Synthesize => {
                let gen = FieldGen::new(session, contract, self.ty.clone(), None, true)?;
                gen.declare(session)?;
                Ok(gen.name().map(Expression::self_access))
            }
            Pick::Nothing => Ok(None),
        }
    }

    fn local(&self, session: &mut Session) -> Result<Option<Expression>> {
        let candidates = self.variables_of(session, &self.ty);
        match pick(&mut session.rng, &candidates, self.synthesis.lets) {
            Pick::Reuse(name) => Ok(Some(Expression::ident(name))),
            Pick::Synthesize => {
                let name = self.declare_let(session, self.ty.clone())?;
                Ok(Some(Expression::ident(name)))
            }
            Pick::Nothing => Ok(None),
        }
    }

    /// Read a field of a struct-typed variable. Candidate types are chosen
    /// first, then a variable of the chosen type (declared if none exists).
    fn struct_access(&self, session: &mut Session) -> Result<Option<Expression>> {
        let root = session.scopes.root();
        let types: Vec<Type> = [ScopeItemKind::Struct, ScopeItemKind::Message]
            .iter()
            .flat_map(|kind| session.scopes.get_all(root, *kind))
            .filter(|b| {
                b.ty.struct_type()
                    .is_some_and(|s| s.fields_of_type(&self.ty).next().is_some())
            })
            .map(|b| b.ty.clone())
            .collect();
        let Some(aggregate_ty) = random_element(&mut session.rng, &types).cloned() else {
            return Ok(None);
        };

        let variables = self.variables_of(session, &aggregate_ty);
        let variable = match random_element(&mut session.rng, &variables) {
            Some(v) => v.clone(),
            None if self.synthesis.lets => self.declare_let(session, aggregate_ty.clone())?,
            None => return Ok(None),
        };

        let fields: Vec<String> = aggregate_ty
            .struct_type()
            .map(|s| s.fields_of_type(&self.ty).map(|f| f.name.clone()).collect())
            .unwrap_or_default();
        let Some(field) = random_element(&mut session.rng, &fields).cloned() else {
            return Ok(None);
        };
        Ok(Some(Expression::new(ExpressionKind::FieldAccess {
            aggregate: Box::new(Expression::ident(variable)),
            field: Id::new(field),
        })))
    }

    fn call(&self, session: &mut Session) -> Result<Option<Expression>> {
        let contract = session.scopes.find_parent(self.scope, &[ScopeKind::Contract]);
        let mut candidates: Vec<(FunctionKind, String, Vec<Type>)> = session
            .scopes
            .find_function(self.scope, ScopeItemKind::FunctionDef, &self.ty)
            .into_iter()
            .map(|(name, ft)| (FunctionKind::Function, name, ft.params().to_vec()))
            .collect();
        if contract.is_some() {
            candidates.extend(
                session
                    .scopes
                    .find_function(self.scope, ScopeItemKind::MethodDef, &self.ty)
                    .into_iter()
                    .map(|(name, ft)| (FunctionKind::Method, name, ft.params().to_vec())),
            );
        }
        let can_method = self.synthesis.methods && contract.is_some();
        let can_synthesize = self.synthesis.functions || can_method;

        let (kind, name, params) = match pick(&mut session.rng, &candidates, can_synthesize) {
            Pick::Reuse(candidate) => candidate,
            Pick::Synthesize => {
                let kind = match (self.synthesis.functions, can_method) {
                    (true, true) if session.rng.gen_bool(0.5) => FunctionKind::Method,
                    (false, true) => FunctionKind::Method,
                    _ => FunctionKind::Function,
                };
                let owner = match (kind, contract) {
                    (FunctionKind::Method, Some(c)) => c,
                    _ => session.scopes.root(),
                };
                let gen = FunctionGen::definition(session, owner, kind, self.ty.clone(), None, vec![])?;
                gen.declare(session)?;
                let params = gen.function_type().params().to_vec();
                (kind, gen.name().unwrap_or_default().to_string(), params)
            }
            Pick::Nothing => return Ok(None),
        };

        let mut args = Vec::with_capacity(params.len());
        for param in params {
            args.push(self.sub(session, param)?);
        }
        Ok(Some(match kind {
            FunctionKind::Function => Expression::static_call(name, args),
            FunctionKind::Method => Expression::new(ExpressionKind::MethodCall {
                receiver: Box::new(Expression::ident("self")),
                method: Id::new(name),
                args,
            }),
        }))
    }

    fn inject_statements(&self, session: &mut Session) -> Result<()> {
        let level = session.config.limits.statement_nesting.saturating_sub(1);
        for _ in 0..STATEMENTS_PER_INJECTION {
            let stmt = StatementGen::new(session, self.scope, level)?.generate(session)?;
            emit_statement(session, self.scope, stmt)?;
        }
        Ok(())
    }

    // ====================================================================
    // Helpers
    // ====================================================================

    /// Visible `let`s and parameters of the given type, nearest first.
    fn variables_of(&self, session: &Session, ty: &Type) -> Vec<String> {
        session
            .scopes
            .get_items_recursive(self.scope, &[ScopeItemKind::Let, ScopeItemKind::Parameter])
            .into_iter()
            .filter(|(_, b)| &b.ty == ty)
            .map(|(_, b)| b.name.clone())
            .collect()
    }

    /// Declare `let <fresh>: <ty> = <expr>;` in the current scope.
    fn declare_let(&self, session: &mut Session, ty: Type) -> Result<String> {
        let name = session.fresh_name(self.scope, false);
        let expression = self.sub(session, ty.clone())?;
        let stmt = LetStmt {
            id: next_id(),
            name: Id::new(name.clone()),
            type_ann: Some(ty.to_annotation()?),
            expression,
        };
        trace!(name = %name, ty = %ty, "declared let");
        session.scopes.add(
            self.scope,
            Binding {
                id: stmt.id,
                name: name.clone(),
                ty,
                kind: ScopeItemKind::Let,
                entity: Entity::Let(stmt),
                scope: None,
            },
        )?;
        Ok(name)
    }

    // ====================================================================
    // Base cases
    // ====================================================================

    fn base(&self, session: &mut Session) -> Result<Expression> {
        if self.literal_only {
            return literal(&mut session.rng, &self.ty);
        }
        match &self.ty {
            Type::Stdlib(StdlibType::Int) => self.int(session),
            Type::Stdlib(StdlibType::Bool) => self.bool(session),
            Type::Struct(s) | Type::Message(s) => {
                let mut args = Vec::with_capacity(s.fields.len());
                for field in &s.fields {
                    args.push(StructFieldInitializer {
                        id: next_id(),
                        field: Id::new(field.name.clone()),
                        initializer: self.sub(session, field.ty.clone())?,
                    });
                }
                Ok(Expression::new(ExpressionKind::StructInstance {
                    ty: Id::new(s.name.clone()),
                    args,
                }))
            }
            Type::Util(UtilType::Unit) => {
                let condition = self.sub(session, Type::BOOL)?;
                let message = self.sub(session, Type::STRING)?;
                Ok(Expression::static_call("require", vec![condition, message]))
            }
            _ => literal(&mut session.rng, &self.ty),
        }
    }

    fn int(&self, session: &mut Session) -> Result<Expression> {
        #[derive(Clone, Copy)]
        enum Form {
            Literal,
            Binary,
            Negate,
        }
        let form = weighted_choice(
            &mut session.rng,
            &[(Form::Literal, 2), (Form::Binary, 2), (Form::Negate, 1)],
        );
        match form {
            Some(Form::Binary) => {
                let op = random_element(&mut session.rng, &[BinaryOp::Add, BinaryOp::Sub, BinaryOp::Mul])
                    .copied()
                    .unwrap_or(BinaryOp::Add);
                let left = self.sub(session, Type::INT)?;
                let right = self.sub(session, Type::INT)?;
                Ok(binary(op, left, right))
            }
            Some(Form::Negate) => {
                let operand = self.sub(session, Type::INT)?;
                Ok(unary(UnaryOp::Neg, operand))
            }
            _ => literal(&mut session.rng, &Type::INT),
        }
    }

    fn bool(&self, session: &mut Session) -> Result<Expression> {
        #[derive(Clone, Copy)]
        enum Form {
            Literal,
            Compare,
            Logic,
            Not,
        }
        let form = weighted_choice(
            &mut session.rng,
            &[
                (Form::Literal, 2),
                (Form::Compare, 2),
                (Form::Logic, 1),
                (Form::Not, 1),
            ],
        );
        match form {
            Some(Form::Compare) => {
                let op = random_element(
                    &mut session.rng,
                    &[
                        BinaryOp::Eq,
                        BinaryOp::Neq,
                        BinaryOp::Lt,
                        BinaryOp::Gt,
                        BinaryOp::Lte,
                        BinaryOp::Gte,
                    ],
                )
                .copied()
                .unwrap_or(BinaryOp::Eq);
                let left = self.sub(session, Type::INT)?;
                let right = self.sub(session, Type::INT)?;
                Ok(binary(op, left, right))
            }
            Some(Form::Logic) => {
                let op = if session.rng.gen_bool(0.5) {
                    BinaryOp::And
                } else {
                    BinaryOp::Or
                };
                let left = self.sub(session, Type::BOOL)?;
                let right = self.sub(session, Type::BOOL)?;
                Ok(binary(op, left, right))
            }
            Some(Form::Not) => {
                let operand = self.sub(session, Type::BOOL)?;
                Ok(unary(UnaryOp::Not, operand))
            }
            _ => literal(&mut session.rng, &Type::BOOL),
        }
    }
}

impl Generative for ExpressionGen {
    type Output = Expression;

    fn id(&self) -> AstId {
        self.id
    }

    fn ty(&self) -> &Type {
        &self.ty
    }

    fn generate(&self, session: &mut Session) -> Result<Expression> {
        if let Type::Function(_) = self.ty {
            return Err(FuzzError::FunctionTypedExpression(self.ty.to_string()));
        }
        session.nested(|s| self.generate_value(s))
    }
}

/// A non-recursive value of the given type.
pub fn literal<R: Rng>(rng: &mut R, ty: &Type) -> Result<Expression> {
    let kind = match ty {
        Type::Stdlib(StdlibType::Int) => {
            let (base, value) = random_number(rng);
            ExpressionKind::Number { base, value }
        }
        Type::Stdlib(StdlibType::Bool) => ExpressionKind::Boolean(rng.gen_bool(0.5)),
        Type::Stdlib(StdlibType::String) => ExpressionKind::String(random_string(rng)),
        Type::Map(_) => {
            if rng.gen_bool(0.5) {
                return Ok(Expression::static_call("emptyMap", vec![]));
            }
            ExpressionKind::Null
        }
        Type::Struct(s) | Type::Message(s) => {
            let mut args = Vec::with_capacity(s.fields.len());
            for field in &s.fields {
                args.push(StructFieldInitializer {
                    id: next_id(),
                    field: Id::new(field.name.clone()),
                    initializer: literal(rng, &field.ty)?,
                });
            }
            ExpressionKind::StructInstance {
                ty: Id::new(s.name.clone()),
                args,
            }
        }
        Type::Util(UtilType::Unit) => {
            let condition = literal(rng, &Type::BOOL)?;
            let message = literal(rng, &Type::STRING)?;
            return Ok(Expression::static_call("require", vec![condition, message]));
        }
        Type::Function(_) => return Err(FuzzError::FunctionTypedExpression(ty.to_string())),
        Type::Stdlib(_) | Type::Util(_) => return Err(FuzzError::UnsupportedType(ty.to_string())),
    };
    Ok(Expression::new(kind))
}

fn read(name: String, through_self: bool) -> Expression {
    if through_self {
        Expression::self_access(name)
    } else {
        Expression::ident(name)
    }
}

fn binary(op: BinaryOp, left: Expression, right: Expression) -> Expression {
    Expression::new(ExpressionKind::OpBinary {
        op,
        left: Box::new(left),
        right: Box::new(right),
    })
}

fn unary(op: UnaryOp, operand: Expression) -> Expression {
    Expression::new(ExpressionKind::OpUnary {
        op,
        operand: Box::new(operand),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FuzzConfig;
    use crate::types::{FunctionType, StructField, StructType};
    use rand::SeedableRng;
    use tact_compiler::format::format_expression;
    use tact_compiler::semantic::{resolve_expression, Env, Type as CheckedType};

    fn session(seed: u64) -> Session {
        Session::new(FuzzConfig::default(), seed)
    }

    #[test]
    fn pure_expressions_have_the_requested_type() {
        let env = Env::new();
        let cases = [
            (Type::INT, CheckedType::Int),
            (Type::BOOL, CheckedType::Bool),
            (Type::STRING, CheckedType::String),
        ];
        for seed in 0..20 {
            let mut session = session(seed);
            let root = session.scopes.root();
            for (ty, expected) in &cases {
                let expr = ExpressionGen::compile_time(&mut session, root, ty.clone())
                    .generate(&mut session)
                    .unwrap();
                assert_eq!(
                    resolve_expression(&env, &expr).as_ref(),
                    Ok(expected),
                    "{}",
                    format_expression(&expr)
                );
            }
            assert_eq!(session.depth(), 0);
        }
    }

    #[test]
    fn function_typed_request_fails() {
        let mut session = session(0);
        let root = session.scopes.root();
        let ft = FunctionType::new(FunctionKind::Function, vec![Type::INT]).unwrap();
        let err = ExpressionGen::new(&mut session, root, Type::Function(ft))
            .generate(&mut session)
            .unwrap_err();
        assert!(matches!(err, FuzzError::FunctionTypedExpression(_)));
    }

    #[test]
    fn depth_never_exceeds_the_ceiling() {
        for seed in 0..20 {
            let mut session = session(seed);
            let root = session.scopes.root();
            let function = session.scopes.child(root, ScopeKind::Function).unwrap();
            ExpressionGen::new(&mut session, function, Type::INT)
                .generate(&mut session)
                .unwrap();
            assert!(session.peak_depth() <= session.config.max_depth);
            assert_eq!(session.depth(), 0);
        }
    }

    #[test]
    fn literals_of_every_supported_kind() {
        let mut rng = StdRng::seed_from_u64(5);
        let point = Type::Struct(StructType {
            name: "Point".into(),
            fields: vec![StructField {
                name: "x".into(),
                ty: Type::INT,
            }],
        });
        let text = format_expression(&literal(&mut rng, &point).unwrap());
        assert!(text.starts_with("Point { x: "));
        let unit = format_expression(&literal(&mut rng, &Type::UNIT).unwrap());
        assert!(unit.starts_with("require("));
        assert!(literal(&mut rng, &Type::Stdlib(StdlibType::Cell)).is_err());
    }

    #[test]
    fn constants_requested_in_a_trait_are_abstract() {
        let mut session = session(3);
        let root = session.scopes.root();
        let trait_scope = session.scopes.child(root, ScopeKind::Trait).unwrap();
        let method = session.scopes.child(trait_scope, ScopeKind::Method).unwrap();
        let gen = ExpressionGen::new(&mut session, method, Type::INT);

        let first = gen.constant(&mut session).unwrap().unwrap();
        let decls = session.scopes.get_all(trait_scope, ScopeItemKind::ConstantDecl);
        assert_eq!(decls.len(), 1);
        assert_eq!(format_expression(&first), format!("self.{}", decls[0].name));
        assert!(session
            .scopes
            .get_all(trait_scope, ScopeItemKind::ConstantDef)
            .is_empty());

        // A trait never reads its own constants back, so each request declares one.
        gen.constant(&mut session).unwrap().unwrap();
        assert_eq!(
            session
                .scopes
                .get_all(trait_scope, ScopeItemKind::ConstantDecl)
                .len(),
            2
        );
    }

    #[test]
    fn constants_outside_bodies_are_hoisted_to_the_program() {
        // Expressions requested in a free function may declare global
        // constants, functions and locals, never contract members.
        for seed in 0..30 {
            let mut session = session(seed);
            let root = session.scopes.root();
            let function = session.scopes.child(root, ScopeKind::Function).unwrap();
            ExpressionGen::new(&mut session, function, Type::INT)
                .generate(&mut session)
                .unwrap();
            for b in session.scopes.bindings(root) {
                assert!(matches!(
                    b.kind,
                    ScopeItemKind::ConstantDef | ScopeItemKind::FunctionDef
                ));
            }
        }
    }
}
