use tact_common::{next_id, AstId};
use tact_compiler::ast::{Id, TypedParameter};

use super::{Declare, Generative};
use crate::context::Session;
use crate::error::{FuzzError, Result};
use crate::scope::{Entity, ScopeId, ScopeItemKind, ScopeKind};
use crate::types::Type;

/// A function parameter, or a loop/catch variable bound in a block.
pub struct ParameterGen {
    id: AstId,
    name: String,
    ty: Type,
    scope: ScopeId,
}

impl ParameterGen {
    pub fn new(session: &mut Session, scope: ScopeId, ty: Type, name: Option<String>) -> Result<Self> {
        let kinds = [
            ScopeKind::Function,
            ScopeKind::Method,
            ScopeKind::Receive,
            ScopeKind::Block,
        ];
        if !session.scopes.defined_in(scope, &kinds) {
            return Err(FuzzError::InvalidEnclosingScope {
                entity: "parameter",
                scope: session.scopes.kind(scope),
            });
        }
        let name = match name {
            Some(name) => {
                session.reserve_name(&name);
                name
            }
            None => session.fresh_name(scope, false),
        };
        Ok(Self {
            id: next_id(),
            name,
            ty,
            scope,
        })
    }
}

/// `name: Type` for a parameter of the given type.
pub fn typed_parameter(id: AstId, name: &str, ty: &Type) -> Result<TypedParameter> {
    Ok(TypedParameter {
        id,
        name: Id::new(name),
        type_ann: ty.to_annotation()?,
    })
}

impl Generative for ParameterGen {
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

    fn generate(&self, _session: &mut Session) -> Result<Entity> {
        typed_parameter(self.id, &self.name, &self.ty).map(Entity::Parameter)
    }
}

impl Declare for ParameterGen {
    fn scope(&self) -> ScopeId {
        self.scope
    }

    fn item_kind(&self) -> ScopeItemKind {
        ScopeItemKind::Parameter
    }
}
