pub mod nodes;
pub mod types;
pub mod visitor;

pub use nodes::*;
pub use types::{TypeAnnotation, TypeKind};
