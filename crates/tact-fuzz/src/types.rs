//! The type universe the generator reasons about.
//!
//! These types are richer than annotations: a struct type carries its field
//! layout so that instances and field accesses can be generated without
//! looking the declaration up again.

use std::fmt;

use rand::Rng;
use tact_compiler::ast::{Id, TypeAnnotation, TypeKind};

use crate::error::{FuzzError, Result};
use crate::util::random_element;

// ============================================================================
// Stdlib types
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StdlibType {
    Int,
    Bool,
    Builder,
    Slice,
    Cell,
    Address,
    String,
    StringBuilder,
}

impl StdlibType {
    pub const ALL: [StdlibType; 8] = [
        StdlibType::Int,
        StdlibType::Bool,
        StdlibType::Builder,
        StdlibType::Slice,
        StdlibType::Cell,
        StdlibType::Address,
        StdlibType::String,
        StdlibType::StringBuilder,
    ];

    pub fn name(self) -> &'static str {
        match self {
            StdlibType::Int => "Int",
            StdlibType::Bool => "Bool",
            StdlibType::Builder => "Builder",
            StdlibType::Slice => "Slice",
            StdlibType::Cell => "Cell",
            StdlibType::Address => "Address",
            StdlibType::String => "String",
            StdlibType::StringBuilder => "StringBuilder",
        }
    }
}

/// Stdlib types values can be generated for.
pub const SUPPORTED_STDLIB_TYPES: &[StdlibType] =
    &[StdlibType::Int, StdlibType::Bool, StdlibType::String];

pub const SUPPORTED_MAP_KEYS: &[StdlibType] = &[StdlibType::Int];
pub const SUPPORTED_MAP_VALUES: &[StdlibType] = &[StdlibType::Int, StdlibType::Bool];

// ============================================================================
// Compound types
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MapType {
    pub key: StdlibType,
    pub value: StdlibType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructField {
    pub name: String,
    pub ty: Type,
}

/// Layout of a struct or message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructType {
    pub name: String,
    pub fields: Vec<StructField>,
}

impl StructType {
    pub fn fields_of_type<'a>(&'a self, ty: &'a Type) -> impl Iterator<Item = &'a StructField> {
        self.fields.iter().filter(move |f| &f.ty == ty)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionKind {
    Function,
    Method,
}

/// A function or method signature: parameters followed by the return type.
/// Method signatures start with `This`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionType {
    pub kind: FunctionKind,
    signature: Vec<Type>,
}

static UNIT: Type = Type::Util(UtilType::Unit);

impl FunctionType {
    pub fn new(kind: FunctionKind, signature: Vec<Type>) -> Result<Self> {
        if signature.is_empty() {
            return Err(FuzzError::UnsupportedType("empty function signature".into()));
        }
        Ok(Self { kind, signature })
    }

    pub fn signature(&self) -> &[Type] {
        &self.signature
    }

    pub fn return_type(&self) -> &Type {
        self.signature.last().unwrap_or(&UNIT)
    }

    /// Parameter types, without the leading `This` of methods.
    pub fn params(&self) -> &[Type] {
        let end = self.signature.len().saturating_sub(1);
        let start = match (self.kind, self.signature.first()) {
            (FunctionKind::Method, Some(Type::Util(UtilType::This))) => 1,
            _ => 0,
        };
        &self.signature[start.min(end)..end]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UtilType {
    Unit,
    Program,
    Trait,
    Contract,
    This,
}

// ============================================================================
// Type
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    Stdlib(StdlibType),
    Map(MapType),
    Struct(StructType),
    Message(StructType),
    Function(FunctionType),
    Util(UtilType),
}

impl Type {
    pub const INT: Type = Type::Stdlib(StdlibType::Int);
    pub const BOOL: Type = Type::Stdlib(StdlibType::Bool);
    pub const STRING: Type = Type::Stdlib(StdlibType::String);
    pub const UNIT: Type = Type::Util(UtilType::Unit);

    pub fn is_unit(&self) -> bool {
        matches!(self, Type::Util(UtilType::Unit))
    }

    pub fn is_map(&self) -> bool {
        matches!(self, Type::Map(_))
    }

    /// Layout of struct and message types.
    pub fn struct_type(&self) -> Option<&StructType> {
        match self {
            Type::Struct(s) | Type::Message(s) => Some(s),
            _ => None,
        }
    }

    /// Whether a value of this type can be written as a compile-time
    /// initializer (constants and field defaults).
    pub fn is_compile_time_initializable(&self) -> bool {
        matches!(self, Type::Stdlib(_))
    }

    /// Whether values of this type can be stored in a `let`, field or parameter.
    pub fn is_storable(&self) -> bool {
        matches!(
            self,
            Type::Stdlib(_) | Type::Map(_) | Type::Struct(_) | Type::Message(_)
        )
    }

    /// The source annotation naming this type.
    pub fn to_annotation(&self) -> Result<TypeAnnotation> {
        match self {
            Type::Stdlib(t) => Ok(TypeAnnotation::named(t.name())),
            Type::Map(m) => Ok(TypeAnnotation::new(TypeKind::Map {
                key: Id::new(m.key.name()),
                value: Id::new(m.value.name()),
            })),
            Type::Struct(s) | Type::Message(s) => Ok(TypeAnnotation::named(s.name.clone())),
            Type::Function(_) | Type::Util(_) => Err(FuzzError::UnsupportedType(self.to_string())),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Stdlib(t) => write!(f, "{}", t.name()),
            Type::Map(m) => write!(f, "map<{}, {}>", m.key.name(), m.value.name()),
            Type::Struct(s) | Type::Message(s) => write!(f, "{}", s.name),
            Type::Function(ft) => {
                let params: Vec<String> = ft.params().iter().map(|p| p.to_string()).collect();
                write!(f, "({}) -> {}", params.join(", "), ft.return_type())
            }
            Type::Util(u) => write!(f, "{:?}", u),
        }
    }
}

// ============================================================================
// Random types
// ============================================================================

pub fn random_stdlib_type<R: Rng>(rng: &mut R) -> Type {
    let t = random_element(rng, SUPPORTED_STDLIB_TYPES).copied();
    Type::Stdlib(t.unwrap_or(StdlibType::Int))
}

pub fn random_map_type<R: Rng>(rng: &mut R) -> MapType {
    MapType {
        key: random_element(rng, SUPPORTED_MAP_KEYS)
            .copied()
            .unwrap_or(StdlibType::Int),
        value: random_element(rng, SUPPORTED_MAP_VALUES)
            .copied()
            .unwrap_or(StdlibType::Int),
    }
}

/// A random type for a contract field: mostly stdlib, sometimes a map.
pub fn random_field_type<R: Rng>(rng: &mut R) -> Type {
    if rng.gen_bool(0.2) {
        Type::Map(random_map_type(rng))
    } else {
        random_stdlib_type(rng)
    }
}

/// A random signature with the given return type. Parameters are drawn from
/// the supported stdlib types.
pub fn make_function_type<R: Rng>(
    rng: &mut R,
    kind: FunctionKind,
    ret: Type,
    max_params: usize,
) -> Result<FunctionType> {
    let mut signature = Vec::new();
    if kind == FunctionKind::Method {
        signature.push(Type::Util(UtilType::This));
    }
    let count = rng.gen_range(0..=max_params);
    for _ in 0..count {
        signature.push(random_stdlib_type(rng));
    }
    signature.push(ret);
    FunctionType::new(kind, signature)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn empty_signature_is_rejected() {
        assert!(FunctionType::new(FunctionKind::Function, vec![]).is_err());
    }

    #[test]
    fn method_params_skip_this() {
        let ft = FunctionType::new(
            FunctionKind::Method,
            vec![Type::Util(UtilType::This), Type::INT, Type::BOOL],
        )
        .unwrap();
        assert_eq!(ft.params(), &[Type::INT]);
        assert_eq!(ft.return_type(), &Type::BOOL);
        assert_eq!(Type::Function(ft).to_string(), "(Int) -> Bool");
    }

    #[test]
    fn structural_equality() {
        let a = Type::Struct(StructType {
            name: "Point".into(),
            fields: vec![StructField {
                name: "x".into(),
                ty: Type::INT,
            }],
        });
        assert_eq!(a, a.clone());
        let mut b = a.clone();
        if let Type::Struct(ref mut s) = b {
            s.fields[0].ty = Type::BOOL;
        }
        assert_ne!(a, b);
    }

    #[test]
    fn annotations() {
        let map = Type::Map(MapType {
            key: StdlibType::Int,
            value: StdlibType::Bool,
        });
        assert_eq!(map.to_string(), "map<Int, Bool>");
        assert!(matches!(
            map.to_annotation().unwrap().kind,
            TypeKind::Map { .. }
        ));
        assert!(Type::UNIT.to_annotation().is_err());
    }

    #[test]
    fn random_signatures_end_with_return_type() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..20 {
            let ft = make_function_type(&mut rng, FunctionKind::Method, Type::STRING, 2).unwrap();
            assert_eq!(ft.return_type(), &Type::STRING);
            assert_eq!(ft.signature()[0], Type::Util(UtilType::This));
            assert!(ft.params().len() <= 2);
        }
    }
}
