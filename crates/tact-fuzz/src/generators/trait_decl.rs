use rand::Rng;
use tact_common::{next_id, AstId};
use tact_compiler::ast::{ConstantAttribute, FunctionAttribute, Id, TraitDecl};

use super::constant::ConstantGen;
use super::field::FieldGen;
use super::function::FunctionGen;
use super::{Declare, Generative};
use crate::context::Session;
use crate::error::{FuzzError, Result};
use crate::scope::{Entity, ScopeId, ScopeItemKind, ScopeKind};
use crate::types::{random_field_type, random_stdlib_type, FunctionKind, Type, UtilType};

/// Chance that a trait method returns nothing.
const UNIT_METHOD_PROBABILITY: f64 = 0.2;

/// A trait with fields, constants and methods. Members are either abstract
/// or virtual, so a contract inheriting the trait can override all of them.
pub struct TraitGen {
    id: AstId,
    name: String,
    ty: Type,
    scope: ScopeId,
    body: ScopeId,
}

impl TraitGen {
    pub fn new(session: &mut Session, scope: ScopeId) -> Result<Self> {
        if !session.scopes.defined_in(scope, &[ScopeKind::Program]) {
            return Err(FuzzError::InvalidEnclosingScope {
                entity: "trait",
                scope: session.scopes.kind(scope),
            });
        }
        let name = session.fresh_name(scope, true);
        let body = session.scopes.child(scope, ScopeKind::Trait)?;
        Ok(Self {
            id: next_id(),
            name,
            ty: Type::Util(UtilType::Trait),
            scope,
            body,
        })
    }

    fn fields(&self, session: &mut Session) -> Result<()> {
        let n = session.rng.gen_range(session.config.limits.trait_fields.clone());
        for _ in 0..n {
            let ty = random_field_type(&mut session.rng);
            FieldGen::new(session, self.body, ty, None, false)?.declare(session)?;
        }
        Ok(())
    }

    fn constants(&self, session: &mut Session) -> Result<()> {
        let n = session.rng.gen_range(session.config.limits.trait_constants.clone());
        for _ in 0..n {
            let ty = random_stdlib_type(&mut session.rng);
            let gen = if session.rng.gen_bool(0.5) {
                ConstantGen::declaration(session, self.body, ty, None)?
            } else {
                ConstantGen::definition(session, self.body, ty, None, vec![ConstantAttribute::Virtual])?
            };
            gen.declare(session)?;
        }
        Ok(())
    }

    fn methods(&self, session: &mut Session) -> Result<()> {
        let n = session.rng.gen_range(session.config.limits.trait_methods.clone());
        for _ in 0..n {
            let ret = if session.rng.gen_bool(UNIT_METHOD_PROBABILITY) {
                Type::UNIT
            } else {
                random_stdlib_type(&mut session.rng)
            };
            let gen = if session.rng.gen_bool(0.5) {
                FunctionGen::declaration(session, self.body, ret, None)?
            } else {
                FunctionGen::definition(
                    session,
                    self.body,
                    FunctionKind::Method,
                    ret,
                    None,
                    vec![FunctionAttribute::Virtual],
                )?
            };
            gen.declare(session)?;
        }
        Ok(())
    }
}

impl Generative for TraitGen {
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
        self.fields(session)?;
        self.constants(session)?;
        self.methods(session)?;
        Ok(Entity::Trait(TraitDecl {
            id: self.id,
            name: Id::new(self.name.clone()),
            traits: vec![],
            declarations: session.scopes.declarations(self.body),
        }))
    }
}

impl Declare for TraitGen {
    fn scope(&self) -> ScopeId {
        self.scope
    }

    fn item_kind(&self) -> ScopeItemKind {
        ScopeItemKind::Trait
    }

    fn private_scope(&self) -> Option<ScopeId> {
        Some(self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FuzzConfig;
    use tact_compiler::ast::Declaration;

    #[test]
    fn traits_are_top_level() {
        let mut session = Session::new(FuzzConfig::default(), 8);
        let root = session.scopes.root();
        let contract = session.scopes.child(root, ScopeKind::Contract).unwrap();
        assert!(TraitGen::new(&mut session, contract).is_err());
    }

    #[test]
    fn members_are_abstract_or_virtual() {
        let mut config = FuzzConfig::default();
        config.limits.trait_fields = 1..=1;
        config.limits.trait_constants = 2..=2;
        config.limits.trait_methods = 2..=2;
        for seed in 0..10 {
            let mut session = Session::new(config.clone(), seed);
            let root = session.scopes.root();
            let gen = TraitGen::new(&mut session, root).unwrap();
            let Entity::Trait(decl) = gen.declare(&mut session).unwrap() else {
                panic!("expected a trait");
            };
            assert_eq!(decl.name.text, gen.name().unwrap());
            for d in &decl.declarations {
                match d {
                    Declaration::Field(f) => assert!(f.initializer.is_none()),
                    Declaration::ConstantDef(c) => {
                        assert_eq!(c.attributes, vec![ConstantAttribute::Virtual])
                    }
                    Declaration::ConstantDecl(c) => {
                        assert_eq!(c.attributes, vec![ConstantAttribute::Abstract])
                    }
                    Declaration::FunctionDef(f) => {
                        assert_eq!(f.attributes, vec![FunctionAttribute::Virtual])
                    }
                    Declaration::FunctionDecl(f) => {
                        assert_eq!(f.attributes, vec![FunctionAttribute::Abstract])
                    }
                    Declaration::Receiver(_) => panic!("traits get no receivers"),
                }
            }
            assert_eq!(
                decl.declarations
                    .iter()
                    .filter(|d| matches!(d, Declaration::Field(_)))
                    .count(),
                1
            );
            let binding = &session.scopes.get_all(root, ScopeItemKind::Trait)[0];
            assert_eq!(binding.scope, Some(gen.body));
        }
    }
}
