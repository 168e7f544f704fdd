use rand::Rng;
use tact_common::{next_id, AstId};
use tact_compiler::ast::{Expression, ExpressionKind, FieldDecl, Id, MessageDecl, NumberBase, StructDecl};

use super::{Declare, Generative};
use crate::context::Session;
use crate::error::{FuzzError, Result};
use crate::scope::{Entity, ScopeId, ScopeItemKind, ScopeKind};
use crate::types::{random_stdlib_type, StructField, StructType, Type};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructKind {
    Struct,
    Message,
}

/// A top-level struct or message with stdlib-typed fields.
pub struct StructGen {
    id: AstId,
    kind: StructKind,
    ty: Type,
    scope: ScopeId,
}

impl StructGen {
    pub fn new(session: &mut Session, scope: ScopeId, kind: StructKind) -> Result<Self> {
        if !session.scopes.defined_in(scope, &[ScopeKind::Program]) {
            return Err(FuzzError::InvalidEnclosingScope {
                entity: "struct",
                scope: session.scopes.kind(scope),
            });
        }
        let name = session.fresh_name(scope, true);
        let count = session
            .rng
            .gen_range(session.config.limits.struct_fields.clone());
        let mut fields = Vec::with_capacity(count);
        for _ in 0..count {
            let ty = random_stdlib_type(&mut session.rng);
            fields.push(StructField {
                name: session.fresh_name(scope, false),
                ty,
            });
        }
        let layout = StructType { name, fields };
        let ty = match kind {
            StructKind::Struct => Type::Struct(layout),
            StructKind::Message => Type::Message(layout),
        };
        Ok(Self {
            id: next_id(),
            kind,
            ty,
            scope,
        })
    }

    fn layout(&self) -> Result<&StructType> {
        self.ty
            .struct_type()
            .ok_or_else(|| FuzzError::UnsupportedType(self.ty.to_string()))
    }
}

impl Generative for StructGen {
    type Output = Entity;

    fn id(&self) -> AstId {
        self.id
    }

    fn ty(&self) -> &Type {
        &self.ty
    }

    fn name(&self) -> Option<&str> {
        self.ty.struct_type().map(|s| s.name.as_str())
    }

    fn generate(&self, session: &mut Session) -> Result<Entity> {
        let layout = self.layout()?;
        let mut fields = Vec::with_capacity(layout.fields.len());
        for field in &layout.fields {
            fields.push(FieldDecl {
                id: next_id(),
                name: Id::new(field.name.clone()),
                type_ann: field.ty.to_annotation()?,
                initializer: None,
            });
        }
        let name = Id::new(layout.name.clone());
        Ok(match self.kind {
            StructKind::Struct => Entity::Struct(StructDecl {
                id: self.id,
                name,
                fields,
            }),
            StructKind::Message => {
                let opcode = session.rng.gen_bool(0.5).then(|| {
                    Expression::new(ExpressionKind::Number {
                        base: NumberBase::Hex,
                        value: u64::from(session.rng.gen_range(1..=u32::MAX)),
                    })
                });
                Entity::Message(MessageDecl {
                    id: self.id,
                    name,
                    opcode,
                    fields,
                })
            }
        })
    }
}

impl Declare for StructGen {
    fn scope(&self) -> ScopeId {
        self.scope
    }

    fn item_kind(&self) -> ScopeItemKind {
        match self.kind {
            StructKind::Struct => ScopeItemKind::Struct,
            StructKind::Message => ScopeItemKind::Message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FuzzConfig;

    #[test]
    fn structs_are_top_level() {
        let mut session = Session::new(FuzzConfig::default(), 6);
        let root = session.scopes.root();
        let contract = session.scopes.child(root, ScopeKind::Contract).unwrap();
        assert!(StructGen::new(&mut session, contract, StructKind::Struct).is_err());
    }

    #[test]
    fn struct_layout_matches_declaration() {
        let mut session = Session::new(FuzzConfig::default(), 6);
        let root = session.scopes.root();
        let gen = StructGen::new(&mut session, root, StructKind::Struct).unwrap();
        let layout = gen.ty().struct_type().cloned().unwrap();
        assert!(layout.name.starts_with(|c: char| c.is_ascii_uppercase()));

        let Entity::Struct(decl) = gen.declare(&mut session).unwrap() else {
            panic!("expected a struct");
        };
        assert_eq!(decl.name.text, layout.name);
        let names: Vec<_> = decl.fields.iter().map(|f| f.name.text.clone()).collect();
        let expected: Vec<_> = layout.fields.iter().map(|f| f.name.clone()).collect();
        assert_eq!(names, expected);
        assert_eq!(session.scopes.get_all(root, ScopeItemKind::Struct).len(), 1);
    }

    #[test]
    fn messages_register_as_messages() {
        let mut session = Session::new(FuzzConfig::default(), 7);
        let root = session.scopes.root();
        let gen = StructGen::new(&mut session, root, StructKind::Message).unwrap();
        assert!(matches!(gen.ty(), Type::Message(_)));
        assert!(matches!(gen.declare(&mut session).unwrap(), Entity::Message(_)));
        assert_eq!(session.scopes.get_all(root, ScopeItemKind::Message).len(), 1);
    }
}
