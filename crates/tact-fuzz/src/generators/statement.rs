use rand::Rng;
use tact_common::{next_id, AstId};
use tact_compiler::ast::*;
use tracing::trace;

use super::expression::ExpressionGen;
use super::parameter::ParameterGen;
use super::{emit_statement, Declare, Generative};
use crate::context::Session;
use crate::error::{FuzzError, Result};
use crate::scope::{ScopeId, ScopeItemKind, ScopeKind};
use crate::types::{FunctionKind, StdlibType, Type};
use crate::util::random_element;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Form {
    Assign,
    AugmentedAssign,
    While,
    Until,
    Repeat,
    Foreach,
    Condition,
    Try,
    Call,
    Expression,
}

/// Something that can be assigned to.
#[derive(Debug, Clone)]
enum Target {
    Local(String),
    Field(String),
}

impl Target {
    fn path(&self) -> Expression {
        match self {
            Target::Local(name) => Expression::ident(name.clone()),
            Target::Field(name) => Expression::self_access(name.clone()),
        }
    }
}

/// A statement inside a function, method or receiver body.
///
/// `level` counts enclosing compound statements; past the configured
/// nesting limit only flat statements are produced.
pub struct StatementGen {
    id: AstId,
    scope: ScopeId,
    level: usize,
}

impl StatementGen {
    pub fn new(session: &Session, scope: ScopeId, level: usize) -> Result<Self> {
        if !session.scopes.has_parent(scope, ScopeKind::BODIES) {
            return Err(FuzzError::InvalidEnclosingScope {
                entity: "statement",
                scope: session.scopes.kind(scope),
            });
        }
        Ok(Self {
            id: next_id(),
            scope,
            level,
        })
    }

    fn applicable(&self, session: &Session) -> Vec<Form> {
        let mut forms = Vec::new();
        let targets = self.targets(session);
        if !targets.is_empty() {
            forms.push(Form::Assign);
        }
        if targets.iter().any(|(_, ty)| ty == &Type::INT) {
            forms.push(Form::AugmentedAssign);
        }
        if self.level < session.config.limits.statement_nesting {
            forms.extend([
                Form::While,
                Form::Until,
                Form::Repeat,
                Form::Condition,
                Form::Try,
            ]);
            if targets.iter().any(|(_, ty)| ty.is_map()) || !self.map_reads(session).is_empty() {
                forms.push(Form::Foreach);
            }
        }
        if !self.callables(session).is_empty() {
            forms.push(Form::Call);
        }
        if !session.at_depth_limit() {
            forms.push(Form::Expression);
        }
        forms
    }

    /// Assignable locals and, inside contracts, fields.
    fn targets(&self, session: &Session) -> Vec<(Target, Type)> {
        let scopes = &session.scopes;
        let mut targets: Vec<(Target, Type)> = scopes
            .get_items_recursive(self.scope, &[ScopeItemKind::Let])
            .into_iter()
            .map(|(_, b)| (Target::Local(b.name.clone()), b.ty.clone()))
            .collect();
        if let Some(contract) = scopes.find_parent(self.scope, &[ScopeKind::Contract]) {
            targets.extend(
                scopes
                    .get_all(contract, ScopeItemKind::Field)
                    .into_iter()
                    .map(|b| (Target::Field(b.name.clone()), b.ty.clone())),
            );
        }
        targets
    }

    /// Maps that can be iterated without being assignable: map parameters.
    fn map_reads(&self, session: &Session) -> Vec<(Target, Type)> {
        session
            .scopes
            .get_items_recursive(self.scope, &[ScopeItemKind::Parameter])
            .into_iter()
            .filter(|(_, b)| b.ty.is_map())
            .map(|(_, b)| (Target::Local(b.name.clone()), b.ty.clone()))
            .collect()
    }

    /// Functions and, inside contracts, methods that can be called.
    fn callables(&self, session: &Session) -> Vec<(FunctionKind, String, Vec<Type>)> {
        let scopes = &session.scopes;
        let mut callables: Vec<_> = scopes
            .get_items_recursive(self.scope, &[ScopeItemKind::FunctionDef])
            .into_iter()
            .filter_map(|(_, b)| match &b.ty {
                Type::Function(ft) => Some((FunctionKind::Function, b.name.clone(), ft.params().to_vec())),
                _ => None,
            })
            .collect();
        if let Some(contract) = scopes.find_parent(self.scope, &[ScopeKind::Contract]) {
            callables.extend(
                scopes
                    .get_all(contract, ScopeItemKind::MethodDef)
                    .into_iter()
                    .filter_map(|b| match &b.ty {
                        Type::Function(ft) => {
                            Some((FunctionKind::Method, b.name.clone(), ft.params().to_vec()))
                        }
                        _ => None,
                    }),
            );
        }
        callables
    }

    fn expression(&self, session: &mut Session, ty: Type) -> Result<Expression> {
        ExpressionGen::new(session, self.scope, ty).generate(session)
    }

    /// Generate a nested block in a fresh child scope. `bind` registers
    /// loop or catch variables before the body is generated.
    fn block(
        &self,
        session: &mut Session,
        bind: impl FnOnce(&mut Session, ScopeId) -> Result<()>,
    ) -> Result<Vec<Statement>> {
        let block = session.scopes.child(self.scope, ScopeKind::Block)?;
        bind(session, block)?;
        let count = session
            .rng
            .gen_range(session.config.limits.block_statements.clone());
        for _ in 0..count {
            let stmt = StatementGen::new(session, block, self.level + 1)?.generate(session)?;
            emit_statement(session, block, stmt)?;
        }
        Ok(session.scopes.statements(block))
    }

    fn empty_block(&self, session: &mut Session) -> Result<Vec<Statement>> {
        self.block(session, |_, _| Ok(()))
    }

    fn call(&self, session: &mut Session) -> Result<Statement> {
        let callables = self.callables(session);
        let Some((kind, name, params)) = random_element(&mut session.rng, &callables).cloned() else {
            return self.fallback();
        };
        let mut args = Vec::with_capacity(params.len());
        for param in params {
            args.push(self.expression(session, param)?);
        }
        let expression = match kind {
            FunctionKind::Function => Expression::static_call(name, args),
            FunctionKind::Method => Expression::new(ExpressionKind::MethodCall {
                receiver: Box::new(Expression::ident("self")),
                method: Id::new(name),
                args,
            }),
        };
        Ok(Statement::Expression(ExpressionStmt {
            id: self.id,
            expression,
        }))
    }

    /// `while (false) {}`
    fn fallback(&self) -> Result<Statement> {
        Ok(Statement::While(WhileStmt {
            id: self.id,
            condition: Expression::new(ExpressionKind::Boolean(false)),
            statements: vec![],
        }))
    }
}

impl Generative for StatementGen {
    type Output = Statement;

    fn id(&self) -> AstId {
        self.id
    }

    fn ty(&self) -> &Type {
        &Type::UNIT
    }

    fn generate(&self, session: &mut Session) -> Result<Statement> {
        let forms = self.applicable(session);
        let Some(form) = random_element(&mut session.rng, &forms).copied() else {
            return self.fallback();
        };
        trace!(?form, level = self.level, "statement form");
        let id = self.id;
        let stmt = match form {
            Form::Assign => {
                let targets = self.targets(session);
                let Some((target, ty)) = random_element(&mut session.rng, &targets).cloned() else {
                    return self.fallback();
                };
                Statement::Assign(AssignStmt {
                    id,
                    path: target.path(),
                    expression: self.expression(session, ty)?,
                })
            }
            Form::AugmentedAssign => {
                let targets: Vec<Target> = self
                    .targets(session)
                    .into_iter()
                    .filter(|(_, ty)| ty == &Type::INT)
                    .map(|(t, _)| t)
                    .collect();
                let Some(target) = random_element(&mut session.rng, &targets).cloned() else {
                    return self.fallback();
                };
                let op = random_element(
                    &mut session.rng,
                    &[
                        AugmentedAssignOp::Add,
                        AugmentedAssignOp::Sub,
                        AugmentedAssignOp::Mul,
                    ],
                )
                .copied()
                .unwrap_or(AugmentedAssignOp::Add);
                Statement::AugmentedAssign(AugmentedAssignStmt {
                    id,
                    op,
                    path: target.path(),
                    expression: self.expression(session, Type::INT)?,
                })
            }
            Form::While => {
                let condition = self.expression(session, Type::BOOL)?;
                let statements = self.empty_block(session)?;
                Statement::While(WhileStmt {
                    id,
                    condition,
                    statements,
                })
            }
            Form::Until => {
                let statements = self.empty_block(session)?;
                let condition = self.expression(session, Type::BOOL)?;
                Statement::Until(UntilStmt {
                    id,
                    condition,
                    statements,
                })
            }
            Form::Repeat => {
                let iterations = self.expression(session, Type::INT)?;
                let statements = self.empty_block(session)?;
                Statement::Repeat(RepeatStmt {
                    id,
                    iterations,
                    statements,
                })
            }
            Form::Foreach => {
                let mut maps: Vec<(Target, Type)> = self
                    .targets(session)
                    .into_iter()
                    .filter(|(_, ty)| ty.is_map())
                    .collect();
                maps.extend(self.map_reads(session));
                let Some((target, Type::Map(map))) = random_element(&mut session.rng, &maps).cloned()
                else {
                    return self.fallback();
                };
                let key_name = session.fresh_name(self.scope, false);
                let value_name = session.fresh_name(self.scope, false);
                let (key, value) = (key_name.clone(), value_name.clone());
                let statements = self.block(session, |session, block| {
                    ParameterGen::new(session, block, Type::Stdlib(map.key), Some(key))?
                        .declare(session)?;
                    ParameterGen::new(session, block, Type::Stdlib(map.value), Some(value))?
                        .declare(session)?;
                    Ok(())
                })?;
                Statement::Foreach(ForeachStmt {
                    id,
                    key_name: Id::new(key_name),
                    value_name: Id::new(value_name),
                    map: target.path(),
                    statements,
                })
            }
            Form::Condition => {
                let condition = self.expression(session, Type::BOOL)?;
                let true_statements = self.empty_block(session)?;
                let false_statements = if session.rng.gen_bool(0.5) {
                    Some(self.empty_block(session)?)
                } else {
                    None
                };
                Statement::Condition(ConditionStmt {
                    id,
                    condition,
                    true_statements,
                    false_statements,
                })
            }
            Form::Try => {
                let statements = self.empty_block(session)?;
                let catch_block = if session.rng.gen_bool(0.5) {
                    let name = session.fresh_name(self.scope, false);
                    let bound = name.clone();
                    let statements = self.block(session, |session, block| {
                        ParameterGen::new(session, block, Type::Stdlib(StdlibType::Int), Some(bound))?
                            .declare(session)?;
                        Ok(())
                    })?;
                    Some(CatchBlock {
                        name: Id::new(name),
                        statements,
                    })
                } else {
                    None
                };
                Statement::Try(TryStmt {
                    id,
                    statements,
                    catch_block,
                })
            }
            Form::Call => self.call(session)?,
            Form::Expression => Statement::Expression(ExpressionStmt {
                id,
                expression: self.expression(session, Type::UNIT)?,
            }),
        };
        Ok(stmt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FuzzConfig;
    use crate::scope::{Binding, Entity};
    use crate::types::MapType;
    use tact_compiler::format::format_statement;

    fn body(session: &mut Session) -> ScopeId {
        let root = session.scopes.root();
        session.scopes.child(root, ScopeKind::Function).unwrap()
    }

    #[test]
    fn statements_need_a_body() {
        let session = Session::new(FuzzConfig::default(), 0);
        let root = session.scopes.root();
        assert!(StatementGen::new(&session, root, 0).is_err());
    }

    #[test]
    fn nothing_applicable_falls_back_to_an_empty_loop() {
        let mut config = FuzzConfig::default();
        config.max_depth = 0;
        config.limits.statement_nesting = 0;
        let mut session = Session::new(config, 0);
        let scope = body(&mut session);
        let stmt = StatementGen::new(&session, scope, 0)
            .unwrap()
            .generate(&mut session)
            .unwrap();
        assert_eq!(format_statement(&stmt), "while (false) {\n}\n");
    }

    #[test]
    fn foreach_binds_loop_variables_in_its_block() {
        let mut config = FuzzConfig::default();
        config.limits.statement_nesting = 1;
        for seed in 0..200 {
            let mut session = Session::new(config.clone(), seed);
            let scope = body(&mut session);
            let map = Type::Map(MapType {
                key: StdlibType::Int,
                value: StdlibType::Bool,
            });
            let stmt = LetStmt {
                id: next_id(),
                name: Id::new("entries"),
                type_ann: Some(map.to_annotation().unwrap()),
                expression: Expression::static_call("emptyMap", vec![]),
            };
            session
                .scopes
                .add(
                    scope,
                    Binding {
                        id: stmt.id,
                        name: "entries".into(),
                        ty: map,
                        kind: ScopeItemKind::Let,
                        entity: Entity::Let(stmt),
                        scope: None,
                    },
                )
                .unwrap();
            let stmt = StatementGen::new(&session, scope, 0)
                .unwrap()
                .generate(&mut session)
                .unwrap();
            if let Statement::Foreach(f) = stmt {
                assert!(matches!(&f.map.kind, ExpressionKind::Id(id) if id.text == "entries"));
                assert_ne!(f.key_name.text, f.value_name.text);
                return;
            }
        }
        panic!("no foreach generated");
    }
}
