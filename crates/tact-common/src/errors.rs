use serde::Serialize;

use crate::id::AstId;

/// Severity level of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Severity {
    Error,
    Warning,
}

/// A checker diagnostic (error or warning).
///
/// Generated programs have no source text, so a diagnostic points at the id
/// of the offending AST node instead of a source span.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub node: Option<AstId>,
    pub suggestion: Option<String>,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
            node: None,
            suggestion: None,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
            node: None,
            suggestion: None,
        }
    }

    pub fn with_node(mut self, node: AstId) -> Self {
        self.node = Some(node);
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{}: {}", prefix, self.message)?;
        if let Some(node) = self.node {
            write!(f, "\n  --> node #{}", node)?;
        }
        if let Some(ref suggestion) = self.suggestion {
            write!(f, "\n   = help: {}", suggestion)?;
        }
        Ok(())
    }
}

/// Convenience collector for diagnostics during checking.
#[derive(Debug, Default)]
pub struct DiagnosticBag {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn error(&mut self, message: impl Into<String>, node: AstId) {
        self.report(Diagnostic::error(message).with_node(node));
    }

    pub fn warning(&mut self, message: impl Into<String>, node: AstId) {
        self.report(Diagnostic::warning(message).with_node(node));
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.is_error())
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_error())
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bag_tracks_errors() {
        let mut bag = DiagnosticBag::new();
        bag.warning("shadowed", 3);
        assert!(!bag.has_errors());
        bag.error("undefined variable `x`", 4);
        assert!(bag.has_errors());
        assert_eq!(bag.errors().count(), 1);
        assert_eq!(bag.diagnostics().len(), 2);
    }

    #[test]
    fn display_includes_node_and_help() {
        let d = Diagnostic::error("type mismatch")
            .with_node(7)
            .with_suggestion("annotate the binding");
        assert_eq!(
            d.to_string(),
            "error: type mismatch\n  --> node #7\n   = help: annotate the binding"
        );
    }
}
