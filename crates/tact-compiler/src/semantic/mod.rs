pub mod env;
pub mod resolver;
pub mod scope;
pub mod type_checker;
pub mod types;

use tact_common::DiagnosticBag;

use crate::ast::nodes::Module;

pub use env::{resolve_expression, Env};
pub use types::Type;

/// Run name resolution and type checking on a module.
///
/// Returns a `DiagnosticBag` containing any errors and warnings found.
/// The analysis performs:
///  1. Collection of top-level declarations (forward references allowed)
///  2. Name resolution of locals, globals and `self` members
///  3. Type checking of operators, calls, initializers and statements
///  4. Trait conformance of contracts (abstract members implemented)
pub fn check_module(module: &Module) -> DiagnosticBag {
    resolver::Resolver::new().resolve(module)
}
