//! Tact front-end pieces shared by the fuzzer: the AST, a concrete-syntax
//! printer, AST equivalence (compare / hash / rename) and a small semantic
//! checker for generated modules.

pub mod ast;
pub mod equiv;
pub mod format;
pub mod semantic;
