use std::collections::HashSet;

use rand::Rng;
use tact_common::{next_id, AstId};
use tact_compiler::ast::{Id, Receiver, ReceiverKind, ReceiverSubKind, TypeAnnotation, TypeKind};
use tact_compiler::format::format_type;
use tracing::trace;

use super::parameter::ParameterGen;
use super::statement::StatementGen;
use super::{emit_statement, Declare, Generative};
use crate::context::Session;
use crate::error::{FuzzError, Result};
use crate::scope::{Entity, ScopeId, ScopeItemKind, ScopeKind};
use crate::types::Type;
use crate::util::{random_string, weighted_choice};

/// A `receive`, `external` or `bounced` handler whose selector is not yet
/// taken in the owning contract.
pub struct ReceiverGen {
    id: AstId,
    owner: ScopeId,
    body: ScopeId,
    selector: ReceiverKind,
    /// Type of the bound parameter of simple receivers.
    param_ty: Option<Type>,
}

/// Identity of a selector; two receivers with the same key collide.
fn selector_key(kind: &ReceiverKind) -> String {
    fn sub_key(sub: &ReceiverSubKind) -> String {
        match sub {
            ReceiverSubKind::Simple { type_ann, .. } => format_type(type_ann),
            ReceiverSubKind::Fallback => "()".to_string(),
            ReceiverSubKind::Comment(text) => format!("{:?}", text),
        }
    }
    match kind {
        ReceiverKind::Internal(sub) => format!("receive {}", sub_key(sub)),
        ReceiverKind::External(sub) => format!("external {}", sub_key(sub)),
        ReceiverKind::Bounce { type_ann, .. } => format!("bounced {}", format_type(type_ann)),
    }
}

fn placeholder() -> Id {
    Id::new(String::new())
}

impl ReceiverGen {
    pub fn new(session: &mut Session, scope: ScopeId) -> Result<Self> {
        let owner = session
            .scopes
            .find_parent(scope, &[ScopeKind::Trait, ScopeKind::Contract])
            .ok_or(FuzzError::InvalidEnclosingScope {
                entity: "receiver",
                scope: session.scopes.kind(scope),
            })?;
        let taken: HashSet<String> = session
            .scopes
            .get_all(owner, ScopeItemKind::Receive)
            .into_iter()
            .filter_map(|b| match &b.entity {
                Entity::Receiver(r) => Some(selector_key(&r.selector)),
                _ => None,
            })
            .collect();

        let root = session.scopes.root();
        let messages: Vec<Type> = session
            .scopes
            .get_all(root, ScopeItemKind::Message)
            .into_iter()
            .map(|b| b.ty.clone())
            .collect();

        // (selector, parameter type, weight)
        let mut candidates: Vec<(ReceiverKind, Option<Type>, u32)> = Vec::new();
        for ty in messages.iter().chain(std::iter::once(&Type::STRING)) {
            let simple = || -> Result<ReceiverSubKind> {
                Ok(ReceiverSubKind::Simple {
                    param: placeholder(),
                    type_ann: ty.to_annotation()?,
                })
            };
            candidates.push((ReceiverKind::Internal(simple()?), Some(ty.clone()), 4));
            candidates.push((ReceiverKind::External(simple()?), Some(ty.clone()), 1));
        }
        for ty in &messages {
            let Some(layout) = ty.struct_type() else {
                continue;
            };
            let type_ann = TypeAnnotation::new(TypeKind::Bounced(Id::new(layout.name.clone())));
            candidates.push((
                ReceiverKind::Bounce {
                    param: placeholder(),
                    type_ann,
                },
                None,
                2,
            ));
        }
        candidates.push((ReceiverKind::Internal(ReceiverSubKind::Fallback), None, 2));
        candidates.push((ReceiverKind::External(ReceiverSubKind::Fallback), None, 1));
        candidates.retain(|(kind, _, _)| !taken.contains(&selector_key(kind)));
        candidates.push((
            ReceiverKind::Internal(ReceiverSubKind::Comment(String::new())),
            None,
            2,
        ));
        candidates.push((
            ReceiverKind::External(ReceiverSubKind::Comment(String::new())),
            None,
            1,
        ));

        let weights: Vec<(usize, u32)> = candidates
            .iter()
            .enumerate()
            .map(|(i, (_, _, w))| (i, *w))
            .collect();
        let index = weighted_choice(&mut session.rng, &weights).unwrap_or(candidates.len() - 1);
        let (mut selector, param_ty, _) = candidates.swap_remove(index);

        match &mut selector {
            ReceiverKind::Internal(ReceiverSubKind::Simple { param, .. })
            | ReceiverKind::External(ReceiverSubKind::Simple { param, .. })
            | ReceiverKind::Bounce { param, .. } => {
                *param = Id::new(session.fresh_name(owner, false));
            }
            ReceiverKind::Internal(ReceiverSubKind::Comment(text))
            | ReceiverKind::External(ReceiverSubKind::Comment(text)) => {
                *text = Self::unused_comment(session, &taken);
            }
            _ => {}
        }
        trace!(selector = %selector_key(&selector), "receiver selector");

        let body = session.scopes.child(owner, ScopeKind::Receive)?;
        Ok(Self {
            id: next_id(),
            owner,
            body,
            selector,
            param_ty,
        })
    }

    fn unused_comment(session: &mut Session, taken: &HashSet<String>) -> String {
        loop {
            let text = random_string(&mut session.rng);
            let clash = ["receive", "external"]
                .iter()
                .any(|kw| taken.contains(&format!("{} {:?}", kw, text)));
            if !text.trim().is_empty() && !clash {
                return text;
            }
        }
    }

    pub fn selector(&self) -> &ReceiverKind {
        &self.selector
    }
}

impl Generative for ReceiverGen {
    type Output = Entity;

    fn id(&self) -> AstId {
        self.id
    }

    fn ty(&self) -> &Type {
        &Type::UNIT
    }

    fn generate(&self, session: &mut Session) -> Result<Entity> {
        if let (Some(ty), ReceiverKind::Internal(ReceiverSubKind::Simple { param, .. }))
        | (Some(ty), ReceiverKind::External(ReceiverSubKind::Simple { param, .. })) =
            (&self.param_ty, &self.selector)
        {
            ParameterGen::new(session, self.body, ty.clone(), Some(param.text.clone()))?
                .declare(session)?;
        }
        let count = session
            .rng
            .gen_range(session.config.limits.block_statements.clone());
        for _ in 0..count {
            let stmt = StatementGen::new(session, self.body, 0)?.generate(session)?;
            emit_statement(session, self.body, stmt)?;
        }
        Ok(Entity::Receiver(Receiver {
            id: self.id,
            selector: self.selector.clone(),
            statements: session.scopes.statements(self.body),
        }))
    }
}

impl Declare for ReceiverGen {
    fn scope(&self) -> ScopeId {
        self.owner
    }

    fn item_kind(&self) -> ScopeItemKind {
        ScopeItemKind::Receive
    }

    fn private_scope(&self) -> Option<ScopeId> {
        Some(self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FuzzConfig;
    use crate::generators::structs::{StructGen, StructKind};

    #[test]
    fn receivers_need_a_contract() {
        let mut session = Session::new(FuzzConfig::default(), 9);
        let root = session.scopes.root();
        assert!(ReceiverGen::new(&mut session, root).is_err());
    }

    #[test]
    fn selectors_never_repeat() {
        for seed in 0..10 {
            let mut session = Session::new(FuzzConfig::default(), seed);
            let root = session.scopes.root();
            StructGen::new(&mut session, root, StructKind::Message)
                .unwrap()
                .declare(&mut session)
                .unwrap();
            let contract = session.scopes.child(root, ScopeKind::Contract).unwrap();
            let mut keys = HashSet::new();
            for _ in 0..12 {
                let gen = ReceiverGen::new(&mut session, contract).unwrap();
                assert!(keys.insert(selector_key(gen.selector())));
                gen.declare(&mut session).unwrap();
            }
            assert_eq!(session.scopes.get_all(contract, ScopeItemKind::Receive).len(), 12);
        }
    }

    #[test]
    fn simple_receivers_bind_their_parameter() {
        for seed in 0..40 {
            let mut session = Session::new(FuzzConfig::default(), seed);
            let root = session.scopes.root();
            let contract = session.scopes.child(root, ScopeKind::Contract).unwrap();
            let gen = ReceiverGen::new(&mut session, contract).unwrap();
            let ReceiverKind::Internal(ReceiverSubKind::Simple { param, .. }) = gen.selector().clone()
            else {
                continue;
            };
            gen.declare(&mut session).unwrap();
            let params = session.scopes.get_all(gen.body, ScopeItemKind::Parameter);
            assert_eq!(params.len(), 1);
            assert_eq!(params[0].name, param.text);
            assert_eq!(params[0].ty, Type::STRING);
            return;
        }
        panic!("no simple receiver generated");
    }
}
