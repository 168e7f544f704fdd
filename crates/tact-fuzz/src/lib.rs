//! Type-directed random program generator for the Tact language.
//!
//! Programs are built bottom-up: a [`ProgramGen`] declares structs, messages
//! and traits in the root scope, then a contract whose expressions synthesize
//! the constants, fields, functions and locals they need on demand. Every
//! synthesized declaration is registered in the [`ScopeTree`] and later
//! harvested into the module, so the output is well-typed and scope-correct.
//!
//! ```no_run
//! use tact_fuzz::{sample_program, FuzzConfig};
//!
//! let sample = sample_program(&FuzzConfig::default(), 7).unwrap();
//! println!("{}", tact_compiler::format::format_module(&sample.module));
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod generators;
pub mod scope;
pub mod stdlib;
pub mod types;
pub mod util;

use tact_compiler::ast::{Expression, Module};
use tracing::debug;

pub use config::{ConfigError, FuzzConfig, GenerationLimits, RunCount, SampleFormat};
pub use context::Session;
pub use error::{FuzzError, Result};
pub use generators::{ExpressionGen, Generative, ProgramGen, ProgramOptions};
pub use scope::{ScopeId, ScopeKind, ScopeTree};
pub use types::Type;

/// One generated program.
#[derive(Debug, Clone)]
pub struct Sample {
    pub seed: u64,
    pub module: Module,
    /// Deepest expression nesting reached while generating.
    pub peak_depth: usize,
}

/// Generate a program with a randomly drawn shape.
pub fn sample_program(config: &FuzzConfig, seed: u64) -> Result<Sample> {
    sample_program_with(config, seed, ProgramOptions::default())
}

pub fn sample_program_with(
    config: &FuzzConfig,
    seed: u64,
    options: ProgramOptions,
) -> Result<Sample> {
    let mut session = Session::new(config.clone(), seed);
    let module = ProgramGen::new(options).generate(&mut session)?;
    debug!(seed, items = module.items.len(), peak_depth = session.peak_depth(), "sampled program");
    Ok(Sample {
        seed,
        module,
        peak_depth: session.peak_depth(),
    })
}

/// A pure expression of the given type, built in an empty program scope so
/// that it only uses literals and operators.
pub fn sample_expression(config: &FuzzConfig, seed: u64, ty: &Type) -> Result<Expression> {
    let mut session = Session::new(config.clone(), seed);
    let root = session.scopes.root();
    ExpressionGen::compile_time(&mut session, root, ty.clone()).generate(&mut session)
}
