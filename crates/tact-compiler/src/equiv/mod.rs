//! AST equivalence: structural comparison, content hashing and alpha-renaming.
//!
//! All three passes dispatch over [`AstNode`], a closed union of borrowed
//! node references. Adding a node family means adding a variant here, and
//! every pass then fails to compile until it handles it.

pub mod compare;
pub mod hash;
pub mod rename;

pub use compare::AstComparator;
pub use hash::{AstHash, AstHasher};
pub use rename::AstRenamer;

use crate::ast::*;

/// A borrowed reference to any hashable / comparable AST node.
#[derive(Debug, Clone, Copy)]
pub enum AstNode<'a> {
    Module(&'a Module),
    Item(&'a ModuleItem),
    Declaration(&'a Declaration),
    Field(&'a FieldDecl),
    Statement(&'a Statement),
    Expression(&'a Expression),
    Type(&'a TypeAnnotation),
    Id(&'a Id),
}

impl AstNode<'_> {
    /// Short name of the node family, used in hashes and mismatch reports.
    pub fn kind_name(&self) -> &'static str {
        match self {
            AstNode::Module(_) => "module",
            AstNode::Item(_) => "item",
            AstNode::Declaration(_) => "declaration",
            AstNode::Field(_) => "field",
            AstNode::Statement(_) => "statement",
            AstNode::Expression(_) => "expression",
            AstNode::Type(_) => "type",
            AstNode::Id(_) => "id",
        }
    }
}

impl<'a> From<&'a Module> for AstNode<'a> {
    fn from(node: &'a Module) -> Self {
        AstNode::Module(node)
    }
}

impl<'a> From<&'a ModuleItem> for AstNode<'a> {
    fn from(node: &'a ModuleItem) -> Self {
        AstNode::Item(node)
    }
}

impl<'a> From<&'a Declaration> for AstNode<'a> {
    fn from(node: &'a Declaration) -> Self {
        AstNode::Declaration(node)
    }
}

impl<'a> From<&'a Statement> for AstNode<'a> {
    fn from(node: &'a Statement) -> Self {
        AstNode::Statement(node)
    }
}

impl<'a> From<&'a Expression> for AstNode<'a> {
    fn from(node: &'a Expression) -> Self {
        AstNode::Expression(node)
    }
}
