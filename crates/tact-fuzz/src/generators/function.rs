use rand::Rng;
use tact_common::{next_id, AstId};
use tact_compiler::ast::*;

use super::expression::ExpressionGen;
use super::parameter::{typed_parameter, ParameterGen};
use super::statement::StatementGen;
use super::{emit_statement, Declare, Generative};
use crate::context::Session;
use crate::error::{FuzzError, Result};
use crate::scope::{Entity, ScopeId, ScopeItemKind, ScopeKind};
use crate::types::{make_function_type, FunctionKind, FunctionType, Type};

/// A free function, or a trait/contract method with or without a body.
pub struct FunctionGen {
    id: AstId,
    name: String,
    ty: Type,
    ft: FunctionType,
    attributes: Vec<FunctionAttribute>,
    /// Program scope for functions, trait or contract scope for methods.
    owner: ScopeId,
    /// Body scope; `None` for abstract declarations.
    body: Option<ScopeId>,
    param_names: Vec<String>,
}

impl FunctionGen {
    /// A function or method with a random signature returning `ret`.
    pub fn definition(
        session: &mut Session,
        scope: ScopeId,
        kind: FunctionKind,
        ret: Type,
        name: Option<String>,
        attributes: Vec<FunctionAttribute>,
    ) -> Result<Self> {
        let max_params = *session.config.limits.function_params.end();
        let ft = make_function_type(&mut session.rng, kind, ret, max_params)?;
        Self::build(session, scope, ft, name, None, attributes, true)
    }

    /// `abstract fun name(...): ret;` inside a trait.
    pub fn declaration(
        session: &mut Session,
        scope: ScopeId,
        ret: Type,
        name: Option<String>,
    ) -> Result<Self> {
        if !session.scopes.defined_in(scope, &[ScopeKind::Trait]) {
            return Err(FuzzError::InvalidEnclosingScope {
                entity: "abstract method",
                scope: session.scopes.kind(scope),
            });
        }
        let max_params = *session.config.limits.function_params.end();
        let ft = make_function_type(&mut session.rng, FunctionKind::Method, ret, max_params)?;
        Self::build(
            session,
            scope,
            ft,
            name,
            None,
            vec![FunctionAttribute::Abstract],
            false,
        )
    }

    /// A definition with a fixed signature and parameter names; used for
    /// overrides of trait methods.
    pub fn with_signature(
        session: &mut Session,
        scope: ScopeId,
        ft: FunctionType,
        name: String,
        param_names: Vec<String>,
        attributes: Vec<FunctionAttribute>,
    ) -> Result<Self> {
        Self::build(session, scope, ft, Some(name), Some(param_names), attributes, true)
    }

    fn build(
        session: &mut Session,
        scope: ScopeId,
        ft: FunctionType,
        name: Option<String>,
        param_names: Option<Vec<String>>,
        attributes: Vec<FunctionAttribute>,
        with_body: bool,
    ) -> Result<Self> {
        let (owners, body_kind): (&[ScopeKind], _) = match ft.kind {
            FunctionKind::Function => (&[ScopeKind::Program], ScopeKind::Function),
            FunctionKind::Method => (&[ScopeKind::Trait, ScopeKind::Contract], ScopeKind::Method),
        };
        let owner = session
            .scopes
            .find_parent(scope, owners)
            .ok_or(FuzzError::InvalidEnclosingScope {
                entity: "method",
                scope: session.scopes.kind(scope),
            })?;
        let name = match name {
            Some(name) => {
                session.reserve_name(&name);
                name
            }
            None => session.fresh_name(owner, false),
        };
        let body = if with_body {
            Some(session.scopes.child(owner, body_kind)?)
        } else {
            None
        };
        let param_names = match param_names {
            Some(names) if names.len() == ft.params().len() => {
                for n in &names {
                    session.reserve_name(n);
                }
                names
            }
            _ => {
                let scope = body.unwrap_or(owner);
                ft.params()
                    .iter()
                    .map(|_| session.fresh_name(scope, false))
                    .collect()
            }
        };
        Ok(Self {
            id: next_id(),
            name,
            ty: Type::Function(ft.clone()),
            ft,
            attributes,
            owner,
            body,
            param_names,
        })
    }

    pub fn function_type(&self) -> &FunctionType {
        &self.ft
    }

    fn return_annotation(&self) -> Result<Option<TypeAnnotation>> {
        let ret = self.ft.return_type();
        if ret.is_unit() {
            Ok(None)
        } else {
            ret.to_annotation().map(Some)
        }
    }

    fn generate_body(&self, session: &mut Session, body: ScopeId) -> Result<Vec<Statement>> {
        let count = session
            .rng
            .gen_range(session.config.limits.body_statements.clone());
        for _ in 0..count {
            let stmt = StatementGen::new(session, body, 0)?.generate(session)?;
            emit_statement(session, body, stmt)?;
        }
        let ret = self.ft.return_type().clone();
        if !ret.is_unit() {
            let value = ExpressionGen::new(session, body, ret).generate(session)?;
            let stmt = Statement::Return(ReturnStmt {
                id: next_id(),
                expression: Some(value),
            });
            emit_statement(session, body, stmt)?;
        }
        Ok(session.scopes.statements(body))
    }
}

impl Generative for FunctionGen {
    type Output = Entity;

    fn id(&self) -> AstId {
        self.id
    }

    fn ty(&self) -> &Type {
        &self.ty
    }

    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }

    fn generate(&self, session: &mut Session) -> Result<Entity> {
        let mut params = Vec::with_capacity(self.param_names.len());
        for (name, ty) in self.param_names.iter().zip(self.ft.params()) {
            let param = match self.body {
                Some(body) => {
                    let gen = ParameterGen::new(session, body, ty.clone(), Some(name.clone()))?;
                    match gen.declare(session)? {
                        Entity::Parameter(p) => p,
                        _ => typed_parameter(gen.id(), name, ty)?,
                    }
                }
                None => typed_parameter(next_id(), name, ty)?,
            };
            params.push(param);
        }
        let return_type = self.return_annotation()?;

        let Some(body) = self.body else {
            return Ok(Entity::FunctionDecl(FunctionDecl {
                id: self.id,
                attributes: self.attributes.clone(),
                name: Id::new(self.name.clone()),
                return_type,
                params,
            }));
        };
        let statements = self.generate_body(session, body)?;
        Ok(Entity::FunctionDef(FunctionDef {
            id: self.id,
            attributes: self.attributes.clone(),
            name: Id::new(self.name.clone()),
            return_type,
            params,
            statements,
        }))
    }
}

impl Declare for FunctionGen {
    fn scope(&self) -> ScopeId {
        self.owner
    }

    fn item_kind(&self) -> ScopeItemKind {
        match (self.ft.kind, self.body.is_some()) {
            (FunctionKind::Function, true) => ScopeItemKind::FunctionDef,
            (FunctionKind::Function, false) => ScopeItemKind::FunctionDecl,
            (FunctionKind::Method, true) => ScopeItemKind::MethodDef,
            (FunctionKind::Method, false) => ScopeItemKind::MethodDecl,
        }
    }

    fn private_scope(&self) -> Option<ScopeId> {
        self.body
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FuzzConfig;
    use crate::types::UtilType;

    #[test]
    fn free_functions_end_with_a_return() {
        for seed in 0..10 {
            let mut session = Session::new(FuzzConfig::default(), seed);
            let root = session.scopes.root();
            let gen = FunctionGen::definition(
                &mut session,
                root,
                FunctionKind::Function,
                Type::INT,
                None,
                vec![],
            )
            .unwrap();
            let Entity::FunctionDef(def) = gen.declare(&mut session).unwrap() else {
                panic!("expected a function definition");
            };
            assert!(matches!(def.statements.last(), Some(Statement::Return(_))));
            assert_eq!(def.params.len(), gen.function_type().params().len());
            let found = session
                .scopes
                .find_function(root, ScopeItemKind::FunctionDef, &Type::INT);
            assert!(found.iter().any(|(name, _)| name == &def.name.text));
        }
    }

    #[test]
    fn unit_functions_have_no_return_type() {
        let mut session = Session::new(FuzzConfig::default(), 3);
        let root = session.scopes.root();
        let gen =
            FunctionGen::definition(&mut session, root, FunctionKind::Function, Type::UNIT, None, vec![])
                .unwrap();
        let Entity::FunctionDef(def) = gen.generate(&mut session).unwrap() else {
            panic!("expected a function definition");
        };
        assert!(def.return_type.is_none());
        assert!(!def
            .statements
            .iter()
            .any(|s| matches!(s, Statement::Return(_))));
    }

    #[test]
    fn methods_need_a_trait_or_contract() {
        let mut session = Session::new(FuzzConfig::default(), 3);
        let root = session.scopes.root();
        let err = FunctionGen::definition(&mut session, root, FunctionKind::Method, Type::INT, None, vec![]);
        assert!(matches!(err, Err(FuzzError::InvalidEnclosingScope { .. })));

        let contract = session.scopes.child(root, ScopeKind::Contract).unwrap();
        let gen =
            FunctionGen::definition(&mut session, contract, FunctionKind::Method, Type::BOOL, None, vec![])
                .unwrap();
        assert_eq!(gen.function_type().signature()[0], Type::Util(UtilType::This));
        gen.declare(&mut session).unwrap();
        assert_eq!(session.scopes.get_all(contract, ScopeItemKind::MethodDef).len(), 1);
    }

    #[test]
    fn abstract_declarations_have_no_body() {
        let mut session = Session::new(FuzzConfig::default(), 3);
        let root = session.scopes.root();
        let t = session.scopes.child(root, ScopeKind::Trait).unwrap();
        let gen = FunctionGen::declaration(&mut session, t, Type::INT, None).unwrap();
        assert!(matches!(gen.declare(&mut session).unwrap(), Entity::FunctionDecl(_)));
        assert_eq!(session.scopes.get_all(t, ScopeItemKind::MethodDecl).len(), 1);
    }
}
