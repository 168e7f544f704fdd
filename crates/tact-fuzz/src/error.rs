use thiserror::Error;

use crate::config::ConfigError;
use crate::scope::{ScopeItemKind, ScopeKind};

/// Internal invariant violations. Any of these aborts the current sample.
#[derive(Error, Debug)]
pub enum FuzzError {
    #[error("no scope to hoist {kind:?} into from a {scope:?} scope")]
    NoHoistTarget { kind: ScopeItemKind, scope: ScopeKind },

    #[error("a {kind:?} scope cannot be nested inside a {parent:?} scope")]
    InvalidScopeNesting { kind: ScopeKind, parent: ScopeKind },

    #[error("{entity} cannot be created inside a {scope:?} scope")]
    InvalidEnclosingScope {
        entity: &'static str,
        scope: ScopeKind,
    },

    #[error("generation depth dropped below zero")]
    NegativeDepth,

    #[error("cannot generate an expression of function type {0}")]
    FunctionTypedExpression(String),

    #[error("unsupported type: {0}")]
    UnsupportedType(String),

    #[error("trait `{0}` is not declared")]
    UnknownTrait(String),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, FuzzError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = FuzzError::NoHoistTarget {
            kind: ScopeItemKind::MethodDef,
            scope: ScopeKind::Program,
        };
        assert_eq!(
            err.to_string(),
            "no scope to hoist MethodDef into from a Program scope"
        );
        assert_eq!(
            FuzzError::NegativeDepth.to_string(),
            "generation depth dropped below zero"
        );
        let err: FuzzError = ConfigError::InvalidSampleFormat("yaml".into()).into();
        assert!(err.to_string().starts_with("configuration error: "));
    }
}
