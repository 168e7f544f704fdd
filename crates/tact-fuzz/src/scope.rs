//! The generator's scope tree.
//!
//! Every generated declaration is registered in a scope as a [`Binding`].
//! Registration hoists the binding to the nearest ancestor that can own its
//! kind, so a constant synthesized deep inside a method body still lands in
//! the enclosing contract. Bodies and blocks are later assembled from their
//! scope's bindings in registration order.

use tact_common::AstId;
use tact_compiler::ast::*;

use crate::error::{FuzzError, Result};
use crate::types::{FunctionType, Type};

pub type ScopeId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    Program,
    Trait,
    Contract,
    Function,
    Method,
    Receive,
    Block,
}

impl ScopeKind {
    /// Scopes that hold statements.
    pub const BODIES: &'static [ScopeKind] =
        &[ScopeKind::Function, ScopeKind::Method, ScopeKind::Receive];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeItemKind {
    Let,
    Parameter,
    Statement,
    ConstantDecl,
    ConstantDef,
    FunctionDecl,
    FunctionDef,
    MethodDecl,
    MethodDef,
    Field,
    Receive,
    Trait,
    Contract,
    Struct,
    Message,
}

impl ScopeItemKind {
    /// Scope kinds a binding of this kind can live in; `None` means the scope
    /// it is registered from.
    pub fn hoist_targets(self) -> Option<&'static [ScopeKind]> {
        use ScopeItemKind::*;
        match self {
            Let | Parameter | Statement => None,
            ConstantDecl | ConstantDef => Some(&[
                ScopeKind::Trait,
                ScopeKind::Contract,
                ScopeKind::Program,
            ]),
            FunctionDecl | FunctionDef | Trait | Contract | Struct | Message => {
                Some(&[ScopeKind::Program])
            }
            MethodDecl | MethodDef | Field | Receive => {
                Some(&[ScopeKind::Trait, ScopeKind::Contract])
            }
        }
    }
}

/// A materialized declaration.
#[derive(Debug, Clone)]
pub enum Entity {
    Let(LetStmt),
    Parameter(TypedParameter),
    Statement(Statement),
    ConstantDecl(ConstantDecl),
    ConstantDef(ConstantDef),
    FunctionDecl(FunctionDecl),
    FunctionDef(FunctionDef),
    Field(FieldDecl),
    Receiver(Receiver),
    Struct(StructDecl),
    Message(MessageDecl),
    Trait(TraitDecl),
    Contract(ContractDecl),
}

impl Entity {
    /// The trait/contract member this entity becomes, if any.
    pub fn to_declaration(&self) -> Option<Declaration> {
        match self {
            Entity::Field(d) => Some(Declaration::Field(d.clone())),
            Entity::ConstantDecl(d) => Some(Declaration::ConstantDecl(d.clone())),
            Entity::ConstantDef(d) => Some(Declaration::ConstantDef(d.clone())),
            Entity::FunctionDecl(d) => Some(Declaration::FunctionDecl(d.clone())),
            Entity::FunctionDef(d) => Some(Declaration::FunctionDef(d.clone())),
            Entity::Receiver(d) => Some(Declaration::Receiver(d.clone())),
            _ => None,
        }
    }

    /// The module item this entity becomes, if any.
    pub fn to_module_item(&self) -> Option<ModuleItem> {
        match self {
            Entity::ConstantDef(d) => Some(ModuleItem::Constant(d.clone())),
            Entity::FunctionDef(d) => Some(ModuleItem::Function(d.clone())),
            Entity::Struct(d) => Some(ModuleItem::Struct(d.clone())),
            Entity::Message(d) => Some(ModuleItem::Message(d.clone())),
            Entity::Trait(d) => Some(ModuleItem::Trait(d.clone())),
            Entity::Contract(d) => Some(ModuleItem::Contract(d.clone())),
            _ => None,
        }
    }

    fn to_statement(&self) -> Option<Statement> {
        match self {
            Entity::Let(s) => Some(Statement::Let(s.clone())),
            Entity::Statement(s) => Some(s.clone()),
            _ => None,
        }
    }
}

/// A generated declaration registered in a scope.
#[derive(Debug, Clone)]
pub struct Binding {
    pub id: AstId,
    /// Empty for statements and receivers.
    pub name: String,
    pub ty: Type,
    pub kind: ScopeItemKind,
    pub entity: Entity,
    /// The private scope the entity was generated in.
    pub scope: Option<ScopeId>,
}

#[derive(Debug)]
struct ScopeData {
    kind: ScopeKind,
    parent: Option<ScopeId>,
    bindings: Vec<Binding>,
}

/// Arena of scopes; index 0 is the program scope.
#[derive(Debug)]
pub struct ScopeTree {
    scopes: Vec<ScopeData>,
}

impl Default for ScopeTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeTree {
    pub fn new() -> Self {
        Self {
            scopes: vec![ScopeData {
                kind: ScopeKind::Program,
                parent: None,
                bindings: Vec::new(),
            }],
        }
    }

    pub fn root(&self) -> ScopeId {
        0
    }

    pub fn kind(&self, scope: ScopeId) -> ScopeKind {
        self.scopes[scope].kind
    }

    pub fn parent(&self, scope: ScopeId) -> Option<ScopeId> {
        self.scopes[scope].parent
    }

    /// Create a child scope.
    pub fn child(&mut self, parent: ScopeId, kind: ScopeKind) -> Result<ScopeId> {
        let parent_kind = self.kind(parent);
        let legal = match kind {
            ScopeKind::Program => false,
            ScopeKind::Trait | ScopeKind::Contract => parent_kind == ScopeKind::Program,
            _ => true,
        };
        if !legal {
            return Err(FuzzError::InvalidScopeNesting {
                kind,
                parent: parent_kind,
            });
        }
        self.scopes.push(ScopeData {
            kind,
            parent: Some(parent),
            bindings: Vec::new(),
        });
        Ok(self.scopes.len() - 1)
    }

    /// The scope and its ancestors, nearest first.
    pub fn ancestors(&self, scope: ScopeId) -> impl Iterator<Item = ScopeId> + '_ {
        std::iter::successors(Some(scope), |s| self.scopes[*s].parent)
    }

    /// Register a binding in the nearest scope that can own its kind and
    /// return that scope.
    pub fn add(&mut self, scope: ScopeId, binding: Binding) -> Result<ScopeId> {
        let target = match binding.kind.hoist_targets() {
            None => scope,
            Some(kinds) => self
                .find_parent(scope, kinds)
                .ok_or(FuzzError::NoHoistTarget {
                    kind: binding.kind,
                    scope: self.kind(scope),
                })?,
        };
        self.scopes[target].bindings.push(binding);
        Ok(target)
    }

    // ====================================================================
    // Direct queries
    // ====================================================================

    pub fn bindings(&self, scope: ScopeId) -> &[Binding] {
        &self.scopes[scope].bindings
    }

    pub fn get_all(&self, scope: ScopeId, kind: ScopeItemKind) -> Vec<&Binding> {
        self.scopes[scope]
            .bindings
            .iter()
            .filter(|b| b.kind == kind)
            .collect()
    }

    pub fn get_all_named(&self, scope: ScopeId, kind: ScopeItemKind) -> Vec<(&str, &Type)> {
        self.get_all(scope, kind)
            .into_iter()
            .map(|b| (b.name.as_str(), &b.ty))
            .collect()
    }

    pub fn has(&self, scope: ScopeId, name: &str) -> bool {
        self.scopes[scope]
            .bindings
            .iter()
            .any(|b| !b.name.is_empty() && b.name == name)
    }

    /// Members of a trait or contract, in registration order.
    pub fn declarations(&self, scope: ScopeId) -> Vec<Declaration> {
        self.scopes[scope]
            .bindings
            .iter()
            .filter_map(|b| b.entity.to_declaration())
            .collect()
    }

    /// Statements of a body or block, in registration order.
    pub fn statements(&self, scope: ScopeId) -> Vec<Statement> {
        self.scopes[scope]
            .bindings
            .iter()
            .filter_map(|b| b.entity.to_statement())
            .collect()
    }

    // ====================================================================
    // Recursive queries
    // ====================================================================

    pub fn get_items_recursive(
        &self,
        scope: ScopeId,
        kinds: &[ScopeItemKind],
    ) -> Vec<(ScopeId, &Binding)> {
        self.ancestors(scope)
            .flat_map(|s| {
                self.scopes[s]
                    .bindings
                    .iter()
                    .filter(|b| kinds.contains(&b.kind))
                    .map(move |b| (s, b))
            })
            .collect()
    }

    pub fn get_entries_recursive(
        &self,
        scope: ScopeId,
        kinds: &[ScopeItemKind],
    ) -> Vec<(String, Type)> {
        self.get_items_recursive(scope, kinds)
            .into_iter()
            .map(|(_, b)| (b.name.clone(), b.ty.clone()))
            .collect()
    }

    pub fn get_names_recursive(&self, scope: ScopeId, kind: ScopeItemKind, ty: &Type) -> Vec<String> {
        self.get_items_recursive(scope, &[kind])
            .into_iter()
            .filter(|(_, b)| &b.ty == ty)
            .map(|(_, b)| b.name.clone())
            .collect()
    }

    /// Functions or methods of `kind` visible from `scope` that return `ret`.
    pub fn find_function(
        &self,
        scope: ScopeId,
        kind: ScopeItemKind,
        ret: &Type,
    ) -> Vec<(String, FunctionType)> {
        self.get_items_recursive(scope, &[kind])
            .into_iter()
            .filter_map(|(_, b)| match &b.ty {
                Type::Function(ft) if ft.return_type() == ret => Some((b.name.clone(), ft.clone())),
                _ => None,
            })
            .collect()
    }

    pub fn has_recursive(&self, scope: ScopeId, name: &str) -> bool {
        self.ancestors(scope).any(|s| self.has(s, name))
    }

    /// Nearest scope of one of `kinds`, the scope itself included.
    pub fn find_parent(&self, scope: ScopeId, kinds: &[ScopeKind]) -> Option<ScopeId> {
        self.ancestors(scope)
            .find(|s| kinds.contains(&self.scopes[*s].kind))
    }

    pub fn has_parent(&self, scope: ScopeId, kinds: &[ScopeKind]) -> bool {
        self.find_parent(scope, kinds).is_some()
    }

    /// Whether the scope itself is of one of `kinds`.
    pub fn defined_in(&self, scope: ScopeId, kinds: &[ScopeKind]) -> bool {
        kinds.contains(&self.kind(scope))
    }
}
