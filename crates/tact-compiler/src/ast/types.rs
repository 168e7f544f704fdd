use serde::Serialize;
use tact_common::{next_id, AstId};

use super::nodes::Id;

/// A type annotation in the source (e.g., `Int`, `map<Int, Bool>`, `bounced<Msg>`).
#[derive(Debug, Clone, Serialize)]
pub struct TypeAnnotation {
    pub id: AstId,
    pub kind: TypeKind,
}

impl TypeAnnotation {
    pub fn new(kind: TypeKind) -> Self {
        Self { id: next_id(), kind }
    }

    /// A simple named type: `Int`, `Point`.
    pub fn named(name: impl Into<String>) -> Self {
        Self::new(TypeKind::Named(Id::new(name)))
    }
}

/// The kinds of type annotations.
#[derive(Debug, Clone, Serialize)]
pub enum TypeKind {
    /// Simple named type: `Int`, `Bool`, `MyStruct`
    Named(Id),

    /// Map type: `map<Int, Bool>`
    Map { key: Id, value: Id },

    /// Bounced message type: `bounced<Msg>`
    Bounced(Id),
}
