use crate::ast::types::{TypeAnnotation, TypeKind};

/// Internal type representation for semantic analysis.
///
/// Separate from the AST `TypeAnnotation` so the checker can reason about
/// types without caring about node ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    // -- Primitives --
    Int,
    Bool,
    String,
    Cell,
    Slice,
    Builder,
    Address,
    StringBuilder,

    // -- Collections --
    Map(Box<Type>, Box<Type>),

    // -- User-defined (struct or message) --
    Named(std::string::String),

    /// `bounced<M>`: a message whose fields may be truncated.
    Bounced(std::string::String),

    /// The type of the `null` literal and of `emptyMap()`.
    Null,

    /// Result of functions without a return type.
    Void,

    // -- Error sentinel: used after error recovery to avoid cascading errors --
    Error,
}

impl Type {
    /// Convert an AST `TypeAnnotation` to the internal `Type`.
    pub fn from_annotation(ann: &TypeAnnotation) -> Self {
        match &ann.kind {
            TypeKind::Named(id) => Self::from_name(&id.text),
            TypeKind::Map { key, value } => Type::Map(
                Box::new(Self::from_name(&key.text)),
                Box::new(Self::from_name(&value.text)),
            ),
            TypeKind::Bounced(id) => Type::Bounced(id.text.clone()),
        }
    }

    /// Map a simple type name string to the corresponding `Type`.
    pub fn from_name(name: &str) -> Self {
        match name {
            "Int" => Type::Int,
            "Bool" => Type::Bool,
            "String" => Type::String,
            "Cell" => Type::Cell,
            "Slice" => Type::Slice,
            "Builder" => Type::Builder,
            "Address" => Type::Address,
            "StringBuilder" => Type::StringBuilder,
            other => Type::Named(other.to_string()),
        }
    }

    /// Whether this is one of the built-in primitive types.
    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            Type::Int
                | Type::Bool
                | Type::String
                | Type::Cell
                | Type::Slice
                | Type::Builder
                | Type::Address
                | Type::StringBuilder
        )
    }

    /// Whether `null` is a valid value of this type.
    pub fn is_nullable(&self) -> bool {
        matches!(self, Type::Map(_, _) | Type::Null)
    }

    /// Human-readable name for error messages.
    pub fn display_name(&self) -> std::string::String {
        match self {
            Type::Int => "Int".into(),
            Type::Bool => "Bool".into(),
            Type::String => "String".into(),
            Type::Cell => "Cell".into(),
            Type::Slice => "Slice".into(),
            Type::Builder => "Builder".into(),
            Type::Address => "Address".into(),
            Type::StringBuilder => "StringBuilder".into(),
            Type::Map(k, v) => format!("map<{}, {}>", k.display_name(), v.display_name()),
            Type::Named(n) => n.clone(),
            Type::Bounced(n) => format!("bounced<{}>", n),
            Type::Null => "null".into(),
            Type::Void => "void".into(),
            Type::Error => "<error>".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::nodes::Id;

    #[test]
    fn annotations_convert() {
        let map = TypeAnnotation::new(TypeKind::Map {
            key: Id::new("Int"),
            value: Id::new("Bool"),
        });
        assert_eq!(
            Type::from_annotation(&map),
            Type::Map(Box::new(Type::Int), Box::new(Type::Bool))
        );
        assert_eq!(
            Type::from_annotation(&TypeAnnotation::named("Point")),
            Type::Named("Point".into())
        );
    }

    #[test]
    fn display_names() {
        let map = Type::Map(Box::new(Type::Int), Box::new(Type::Int));
        assert_eq!(map.display_name(), "map<Int, Int>");
        assert_eq!(Type::Bounced("M".into()).display_name(), "bounced<M>");
        assert!(map.is_nullable());
        assert!(!Type::Int.is_nullable());
    }
}
