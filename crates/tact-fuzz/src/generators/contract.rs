use rand::Rng;
use tact_common::{next_id, AstId};
use tact_compiler::ast::{ConstantAttribute, ContractDecl, FunctionAttribute, Id, TypedParameter};

use super::constant::ConstantGen;
use super::field::FieldGen;
use super::function::FunctionGen;
use super::receiver::ReceiverGen;
use super::{Declare, Generative};
use crate::context::Session;
use crate::error::{FuzzError, Result};
use crate::scope::{Binding, Entity, ScopeId, ScopeItemKind, ScopeKind};
use crate::types::{random_stdlib_type, FunctionKind, Type, UtilType};
use crate::util::random_element;

/// A contract, optionally inheriting one trait. Every trait member is
/// re-declared in the contract: fields with initializers, constants and
/// methods as overrides.
pub struct ContractGen {
    id: AstId,
    name: String,
    ty: Type,
    scope: ScopeId,
    body: ScopeId,
    trait_binding: Option<Binding>,
}

impl ContractGen {
    pub fn new(session: &mut Session, scope: ScopeId, trait_name: Option<String>) -> Result<Self> {
        if !session.scopes.defined_in(scope, &[ScopeKind::Program]) {
            return Err(FuzzError::InvalidEnclosingScope {
                entity: "contract",
                scope: session.scopes.kind(scope),
            });
        }
        let trait_binding = match trait_name {
            Some(name) => Some(
                session
                    .scopes
                    .get_all(scope, ScopeItemKind::Trait)
                    .into_iter()
                    .find(|b| b.name == name)
                    .cloned()
                    .ok_or(FuzzError::UnknownTrait(name))?,
            ),
            None => None,
        };
        let name = session.fresh_name(scope, true);
        let body = session.scopes.child(scope, ScopeKind::Contract)?;
        Ok(Self {
            id: next_id(),
            name,
            ty: Type::Util(UtilType::Contract),
            scope,
            body,
            trait_binding,
        })
    }

    fn inherit(&self, session: &mut Session, trait_scope: ScopeId) -> Result<()> {
        let members = session.scopes.bindings(trait_scope).to_vec();
        for member in members {
            let name = Some(member.name.clone());
            match member.kind {
                ScopeItemKind::Field => {
                    FieldGen::new(session, self.body, member.ty, name, true)?.declare(session)?;
                }
                ScopeItemKind::ConstantDecl | ScopeItemKind::ConstantDef => {
                    ConstantGen::definition(
                        session,
                        self.body,
                        member.ty,
                        name,
                        vec![ConstantAttribute::Override],
                    )?
                    .declare(session)?;
                }
                ScopeItemKind::MethodDecl | ScopeItemKind::MethodDef => {
                    let Type::Function(ft) = member.ty else {
                        return Err(FuzzError::UnsupportedType(member.ty.to_string()));
                    };
                    let params: &[TypedParameter] = match &member.entity {
                        Entity::FunctionDecl(d) => &d.params,
                        Entity::FunctionDef(d) => &d.params,
                        _ => &[],
                    };
                    let param_names = params.iter().map(|p| p.name.text.clone()).collect();
                    FunctionGen::with_signature(
                        session,
                        self.body,
                        ft,
                        member.name.clone(),
                        param_names,
                        vec![FunctionAttribute::Override],
                    )?
                    .declare(session)?;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Return type of a contract method: mostly stdlib, sometimes nothing or
    /// one of the declared structs.
    fn method_return(&self, session: &mut Session) -> Type {
        let root = session.scopes.root();
        let structs: Vec<Type> = session
            .scopes
            .get_all(root, ScopeItemKind::Struct)
            .into_iter()
            .map(|b| b.ty.clone())
            .collect();
        let roll: f64 = session.rng.gen();
        if roll < 0.2 {
            Type::UNIT
        } else if roll < 0.4 && !structs.is_empty() {
            random_element(&mut session.rng, &structs)
                .cloned()
                .unwrap_or(Type::INT)
        } else {
            random_stdlib_type(&mut session.rng)
        }
    }
}

impl Generative for ContractGen {
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
        if let Some(trait_scope) = self.trait_binding.as_ref().and_then(|b| b.scope) {
            self.inherit(session, trait_scope)?;
        }
        let methods = session
            .rng
            .gen_range(session.config.limits.contract_methods.clone());
        for _ in 0..methods {
            let ret = self.method_return(session);
            FunctionGen::definition(session, self.body, FunctionKind::Method, ret, None, vec![])?
                .declare(session)?;
        }
        let receivers = session.rng.gen_range(session.config.limits.receivers.clone());
        for _ in 0..receivers {
            ReceiverGen::new(session, self.body)?.declare(session)?;
        }
        Ok(Entity::Contract(ContractDecl {
            id: self.id,
            name: Id::new(self.name.clone()),
            traits: self
                .trait_binding
                .iter()
                .map(|b| Id::new(b.name.clone()))
                .collect(),
            declarations: session.scopes.declarations(self.body),
        }))
    }
}

impl Declare for ContractGen {
    fn scope(&self) -> ScopeId {
        self.scope
    }

    fn item_kind(&self) -> ScopeItemKind {
        ScopeItemKind::Contract
    }

    fn private_scope(&self) -> Option<ScopeId> {
        Some(self.body)
    }
}
