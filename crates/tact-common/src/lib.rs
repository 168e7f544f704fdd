pub mod errors;
pub mod id;

pub use errors::{Diagnostic, DiagnosticBag, Severity};
pub use id::{next_id, AstId};
