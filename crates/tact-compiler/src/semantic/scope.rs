use std::collections::HashMap;

use tact_common::AstId;

use super::types::Type;

/// The kind of a declared symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Variable,
    Parameter,
    Constant,
}

/// A value-level symbol visible by bare name.
#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    pub ty: Type,
    pub defined_at: AstId,
}

impl Symbol {
    pub fn is_assignable(&self) -> bool {
        matches!(self.kind, SymbolKind::Variable | SymbolKind::Parameter)
    }
}

/// The kind of scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Global,
    Function,
    Block,
}

/// A lexical scope containing symbol declarations.
#[derive(Debug, Clone)]
pub struct Scope {
    pub kind: ScopeKind,
    pub symbols: HashMap<String, Symbol>,
    parent: Option<usize>,
}

/// Stack of nested scopes for lexical scoping.
///
/// Scopes are stored in a flat `Vec` and linked by parent indices.
/// `push` creates a child of the current scope; `pop` returns to the parent.
#[derive(Debug, Clone)]
pub struct ScopeStack {
    scopes: Vec<Scope>,
    current: usize,
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeStack {
    pub fn new() -> Self {
        let global = Scope {
            kind: ScopeKind::Global,
            symbols: HashMap::new(),
            parent: None,
        };
        Self {
            scopes: vec![global],
            current: 0,
        }
    }

    /// Push a new child scope of the given kind.
    pub fn push(&mut self, kind: ScopeKind) {
        let parent = self.current;
        let idx = self.scopes.len();
        self.scopes.push(Scope {
            kind,
            symbols: HashMap::new(),
            parent: Some(parent),
        });
        self.current = idx;
    }

    /// Pop the current scope. Popping the global scope is a no-op.
    pub fn pop(&mut self) {
        if let Some(parent) = self.scopes[self.current].parent {
            self.current = parent;
        }
    }

    pub fn current_kind(&self) -> ScopeKind {
        self.scopes[self.current].kind
    }

    /// Define a symbol in the current scope.
    /// Returns `Err` with the previous definition's node on duplicate.
    pub fn define(&mut self, symbol: Symbol) -> Result<(), AstId> {
        let scope = &mut self.scopes[self.current];
        if let Some(existing) = scope.symbols.get(&symbol.name) {
            return Err(existing.defined_at);
        }
        scope.symbols.insert(symbol.name.clone(), symbol);
        Ok(())
    }

    /// Look up a symbol by name, walking up the scope chain.
    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        let mut idx = self.current;
        loop {
            if let Some(sym) = self.scopes[idx].symbols.get(name) {
                return Some(sym);
            }
            match self.scopes[idx].parent {
                Some(parent) => idx = parent,
                None => return None,
            }
        }
    }

    /// Check if we are inside a function or receiver body.
    pub fn in_function(&self) -> bool {
        let mut idx = self.current;
        loop {
            if self.scopes[idx].kind == ScopeKind::Function {
                return true;
            }
            match self.scopes[idx].parent {
                Some(parent) => idx = parent,
                None => return false,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dummy_symbol(name: &str, kind: SymbolKind) -> Symbol {
        Symbol {
            name: name.to_string(),
            kind,
            ty: Type::Int,
            defined_at: 0,
        }
    }

    #[test]
    fn define_and_lookup() {
        let mut stack = ScopeStack::new();
        stack.define(dummy_symbol("x", SymbolKind::Constant)).unwrap();
        assert!(stack.lookup("x").is_some());
        assert!(stack.lookup("y").is_none());
    }

    #[test]
    fn nested_scope_lookup() {
        let mut stack = ScopeStack::new();
        stack.define(dummy_symbol("x", SymbolKind::Constant)).unwrap();
        stack.push(ScopeKind::Block);
        // Should find x from parent
        assert!(stack.lookup("x").is_some());
        stack.define(dummy_symbol("y", SymbolKind::Variable)).unwrap();
        assert!(stack.lookup("y").is_some());
        stack.pop();
        // y no longer visible
        assert!(stack.lookup("y").is_none());
    }

    #[test]
    fn duplicate_definition() {
        let mut stack = ScopeStack::new();
        stack.define(dummy_symbol("x", SymbolKind::Variable)).unwrap();
        assert!(stack.define(dummy_symbol("x", SymbolKind::Variable)).is_err());
    }

    #[test]
    fn constants_are_not_assignable() {
        assert!(!dummy_symbol("c", SymbolKind::Constant).is_assignable());
        assert!(dummy_symbol("p", SymbolKind::Parameter).is_assignable());
    }

    #[test]
    fn in_function_detection() {
        let mut stack = ScopeStack::new();
        assert!(!stack.in_function());
        stack.push(ScopeKind::Function);
        assert!(stack.in_function());
        stack.push(ScopeKind::Block);
        assert!(stack.in_function());
        stack.pop();
        stack.pop();
        assert!(!stack.in_function());
        assert_eq!(stack.current_kind(), ScopeKind::Global);
    }
}
