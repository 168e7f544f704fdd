use tact_common::{next_id, AstId};
use tact_compiler::ast::{FieldDecl, Id};

use super::expression::ExpressionGen;
use super::{Declare, Generative};
use crate::context::Session;
use crate::error::{FuzzError, Result};
use crate::scope::{Entity, ScopeId, ScopeItemKind, ScopeKind};
use crate::types::Type;

/// A trait or contract field.
pub struct FieldGen {
    id: AstId,
    name: String,
    ty: Type,
    owner: ScopeId,
    with_initializer: bool,
}

impl FieldGen {
    /// Maps never get an initializer; other fields get a compile-time one
    /// when `with_initializer` is set.
    pub fn new(
        session: &mut Session,
        scope: ScopeId,
        ty: Type,
        name: Option<String>,
        with_initializer: bool,
    ) -> Result<Self> {
        let owner = session
            .scopes
            .find_parent(scope, &[ScopeKind::Trait, ScopeKind::Contract])
            .ok_or(FuzzError::InvalidEnclosingScope {
                entity: "field",
                scope: session.scopes.kind(scope),
            })?;
        if !(ty.is_compile_time_initializable() || ty.is_map()) {
            return Err(FuzzError::UnsupportedType(ty.to_string()));
        }
        let name = match name {
            Some(name) => {
                session.reserve_name(&name);
                name
            }
            None => session.fresh_name(owner, false),
        };
        Ok(Self {
            id: next_id(),
            name,
            ty,
            owner,
            with_initializer,
        })
    }
}

impl Generative for FieldGen {
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
        let initializer = if self.with_initializer && self.ty.is_compile_time_initializable() {
            Some(ExpressionGen::compile_time(session, self.owner, self.ty.clone()).generate(session)?)
        } else {
            None
        };
        Ok(Entity::Field(FieldDecl {
            id: self.id,
            name: Id::new(self.name.clone()),
            type_ann: self.ty.to_annotation()?,
            initializer,
        }))
    }
}

impl Declare for FieldGen {
    fn scope(&self) -> ScopeId {
        self.owner
    }

    fn item_kind(&self) -> ScopeItemKind {
        ScopeItemKind::Field
    }
}
