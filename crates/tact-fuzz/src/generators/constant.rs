use tact_common::{next_id, AstId};
use tact_compiler::ast::{ConstantAttribute, ConstantDecl, ConstantDef, Id};

use super::expression::ExpressionGen;
use super::{Declare, Generative};
use crate::context::Session;
use crate::error::{FuzzError, Result};
use crate::scope::{Entity, ScopeId, ScopeItemKind, ScopeKind};
use crate::types::Type;

/// A constant definition, or an abstract declaration inside a trait.
pub struct ConstantGen {
    id: AstId,
    name: String,
    ty: Type,
    /// The trait, contract or program scope owning the constant.
    owner: ScopeId,
    attributes: Vec<ConstantAttribute>,
    with_value: bool,
}

impl ConstantGen {
    /// `[attributes] const name: ty = <compile-time expression>;`
    pub fn definition(
        session: &mut Session,
        scope: ScopeId,
        ty: Type,
        name: Option<String>,
        attributes: Vec<ConstantAttribute>,
    ) -> Result<Self> {
        Self::build(session, scope, ty, name, attributes, true)
    }

    /// `abstract const name: ty;`, only inside traits.
    pub fn declaration(
        session: &mut Session,
        scope: ScopeId,
        ty: Type,
        name: Option<String>,
    ) -> Result<Self> {
        if !session.scopes.defined_in(scope, &[ScopeKind::Trait]) {
            return Err(FuzzError::InvalidEnclosingScope {
                entity: "abstract constant",
                scope: session.scopes.kind(scope),
            });
        }
        Self::build(session, scope, ty, name, vec![ConstantAttribute::Abstract], false)
    }

    fn build(
        session: &mut Session,
        scope: ScopeId,
        ty: Type,
        name: Option<String>,
        attributes: Vec<ConstantAttribute>,
        with_value: bool,
    ) -> Result<Self> {
        if !ty.is_compile_time_initializable() {
            return Err(FuzzError::UnsupportedType(ty.to_string()));
        }
        let owner = session
            .scopes
            .find_parent(
                scope,
                &[ScopeKind::Trait, ScopeKind::Contract, ScopeKind::Program],
            )
            .ok_or(FuzzError::InvalidEnclosingScope {
                entity: "constant",
                scope: session.scopes.kind(scope),
            })?;
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
            attributes,
            with_value,
        })
    }
}

impl Generative for ConstantGen {
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
        let type_ann = self.ty.to_annotation()?;
        if !self.with_value {
            return Ok(Entity::ConstantDecl(ConstantDecl {
                id: self.id,
                attributes: self.attributes.clone(),
                name: Id::new(self.name.clone()),
                type_ann,
            }));
        }
        let initializer =
            ExpressionGen::compile_time(session, self.owner, self.ty.clone()).generate(session)?;
        Ok(Entity::ConstantDef(ConstantDef {
            id: self.id,
            attributes: self.attributes.clone(),
            name: Id::new(self.name.clone()),
            type_ann,
            initializer,
        }))
    }
}

impl Declare for ConstantGen {
    fn scope(&self) -> ScopeId {
        self.owner
    }

    fn item_kind(&self) -> ScopeItemKind {
        if self.with_value {
            ScopeItemKind::ConstantDef
        } else {
            ScopeItemKind::ConstantDecl
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FuzzConfig;
    use tact_compiler::format::format_item;
    use tact_compiler::ast::ModuleItem;

    #[test]
    fn global_constant() {
        let mut session = Session::new(FuzzConfig::default(), 1);
        let root = session.scopes.root();
        let gen =
            ConstantGen::definition(&mut session, root, Type::INT, Some("limit".into()), vec![])
                .unwrap();
        let Entity::ConstantDef(def) = gen.declare(&mut session).unwrap() else {
            panic!("expected a constant definition");
        };
        let text = format_item(&ModuleItem::Constant(def));
        assert!(text.starts_with("const limit: Int = "));
        assert_eq!(session.scopes.get_all(root, ScopeItemKind::ConstantDef).len(), 1);
    }

    #[test]
    fn abstract_constants_only_in_traits() {
        let mut session = Session::new(FuzzConfig::default(), 1);
        let root = session.scopes.root();
        assert!(matches!(
            ConstantGen::declaration(&mut session, root, Type::INT, None),
            Err(FuzzError::InvalidEnclosingScope { .. })
        ));
        let t = session.scopes.child(root, ScopeKind::Trait).unwrap();
        let gen = ConstantGen::declaration(&mut session, t, Type::BOOL, None).unwrap();
        gen.declare(&mut session).unwrap();
        assert_eq!(session.scopes.get_all(t, ScopeItemKind::ConstantDecl).len(), 1);
    }

    #[test]
    fn maps_cannot_be_constants() {
        let mut session = Session::new(FuzzConfig::default(), 1);
        let root = session.scopes.root();
        let map = Type::Map(crate::types::MapType {
            key: crate::types::StdlibType::Int,
            value: crate::types::StdlibType::Bool,
        });
        assert!(ConstantGen::definition(&mut session, root, map, None, vec![]).is_err());
    }
}
