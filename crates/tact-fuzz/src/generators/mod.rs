//! Generative entities, one per AST node family.
//!
//! A generator is constructed against a scope (validating that the scope can
//! hold what it builds), then `generate` materializes its AST. Declaration
//! generators additionally implement [`Declare`], which registers the result
//! in the scope tree so later generators can reuse it and the enclosing
//! generator can harvest it.

pub mod constant;
pub mod contract;
pub mod expression;
pub mod field;
pub mod function;
pub mod parameter;
pub mod program;
pub mod receiver;
pub mod statement;
pub mod structs;
pub mod trait_decl;

pub use constant::ConstantGen;
pub use contract::ContractGen;
pub use expression::{literal, ExpressionGen, Synthesis};
pub use field::FieldGen;
pub use function::FunctionGen;
pub use parameter::ParameterGen;
pub use program::{ProgramGen, ProgramOptions};
pub use receiver::ReceiverGen;
pub use statement::StatementGen;
pub use structs::{StructGen, StructKind};
pub use trait_decl::TraitGen;

use tact_common::AstId;
use tact_compiler::ast::Statement;
use tracing::debug;

use crate::context::Session;
use crate::error::Result;
use crate::scope::{Binding, Entity, ScopeId, ScopeItemKind};
use crate::types::Type;

/// Something that can build a piece of AST of a known type.
pub trait Generative {
    type Output;

    fn id(&self) -> AstId;

    fn ty(&self) -> &Type;

    fn name(&self) -> Option<&str> {
        None
    }

    fn generate(&self, session: &mut Session) -> Result<Self::Output>;
}

/// Generators whose output is registered in a scope.
pub trait Declare: Generative<Output = Entity> {
    /// Scope the declaration is requested from; registration hoists from here.
    fn scope(&self) -> ScopeId;

    fn item_kind(&self) -> ScopeItemKind;

    /// The child scope the entity was generated in, if it has one.
    fn private_scope(&self) -> Option<ScopeId> {
        None
    }

    /// Generate the entity and register it.
    fn declare(&self, session: &mut Session) -> Result<Entity> {
        let entity = self.generate(session)?;
        let name = self.name().unwrap_or_default().to_string();
        debug!(kind = ?self.item_kind(), name = %name, ty = %self.ty(), "declared");
        session.scopes.add(
            self.scope(),
            Binding {
                id: self.id(),
                name,
                ty: self.ty().clone(),
                kind: self.item_kind(),
                entity: entity.clone(),
                scope: self.private_scope(),
            },
        )?;
        Ok(entity)
    }
}

/// Register a finished statement in a body or block scope.
pub(crate) fn emit_statement(session: &mut Session, scope: ScopeId, stmt: Statement) -> Result<()> {
    session.scopes.add(
        scope,
        Binding {
            id: statement_id(&stmt),
            name: String::new(),
            ty: Type::UNIT,
            kind: ScopeItemKind::Statement,
            entity: Entity::Statement(stmt),
            scope: None,
        },
    )?;
    Ok(())
}

fn statement_id(stmt: &Statement) -> AstId {
    match stmt {
        Statement::Let(s) => s.id,
        Statement::Return(s) => s.id,
        Statement::Expression(s) => s.id,
        Statement::Assign(s) => s.id,
        Statement::AugmentedAssign(s) => s.id,
        Statement::Condition(s) => s.id,
        Statement::While(s) => s.id,
        Statement::Until(s) => s.id,
        Statement::Repeat(s) => s.id,
        Statement::Try(s) => s.id,
        Statement::Foreach(s) => s.id,
    }
}
