use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

/// Errors produced while reading the fuzzer configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid SAMPLES_FORMAT `{0}`, expected one of: ast, json")]
    InvalidSampleFormat(String),

    #[error("invalid value `{value}` for {var}, expected an unsigned integer")]
    InvalidInteger { var: &'static str, value: String },
}

/// How dumped samples are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SampleFormat {
    /// Concrete Tact syntax.
    #[default]
    Ast,
    /// The serialized AST.
    Json,
}

impl FromStr for SampleFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ast" => Ok(SampleFormat::Ast),
            "json" => Ok(SampleFormat::Json),
            other => Err(ConfigError::InvalidSampleFormat(other.to_string())),
        }
    }
}

/// How many trials the harness runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunCount {
    Bounded(u64),
    /// `FUZZ=1`: run until interrupted.
    Unbounded,
}

pub const DEFAULT_NUM_RUNS: u64 = 100;
pub const DEFAULT_MAX_DEPTH: usize = 3;

/// Ranges controlling the shape of generated programs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationLimits {
    pub structs: RangeInclusive<usize>,
    pub messages: RangeInclusive<usize>,
    pub traits: RangeInclusive<usize>,
    pub struct_fields: RangeInclusive<usize>,
    pub function_params: RangeInclusive<usize>,
    pub trait_fields: RangeInclusive<usize>,
    pub trait_constants: RangeInclusive<usize>,
    pub trait_methods: RangeInclusive<usize>,
    pub contract_methods: RangeInclusive<usize>,
    pub receivers: RangeInclusive<usize>,
    /// Statements generated ahead of the result of a function body.
    pub body_statements: RangeInclusive<usize>,
    /// Statements per nested block.
    pub block_statements: RangeInclusive<usize>,
    /// Nesting limit of compound statements.
    pub statement_nesting: usize,
}

impl Default for GenerationLimits {
    fn default() -> Self {
        Self {
            structs: 1..=3,
            messages: 1..=3,
            traits: 0..=2,
            struct_fields: 1..=3,
            function_params: 0..=2,
            trait_fields: 0..=2,
            trait_constants: 0..=2,
            trait_methods: 0..=2,
            contract_methods: 1..=3,
            receivers: 1..=3,
            body_statements: 0..=3,
            block_statements: 1..=2,
            statement_nesting: 2,
        }
    }
}

/// Fuzzer configuration, normally read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuzzConfig {
    /// Number of samples to dump, if any.
    pub samples_num: Option<usize>,
    pub samples_format: SampleFormat,
    /// Fixed base seed; a random one is drawn when absent.
    pub seed: Option<u64>,
    pub num_runs: RunCount,
    pub max_depth: usize,
    pub compile_dir: PathBuf,
    pub limits: GenerationLimits,
}

impl Default for FuzzConfig {
    fn default() -> Self {
        Self {
            samples_num: None,
            samples_format: SampleFormat::Ast,
            seed: None,
            num_runs: RunCount::Bounded(DEFAULT_NUM_RUNS),
            max_depth: DEFAULT_MAX_DEPTH,
            compile_dir: std::env::temp_dir(),
            limits: GenerationLimits::default(),
        }
    }
}

impl FuzzConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read the configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(n) = parse_var(&lookup, "SAMPLES_NUM")? {
            config.samples_num = Some(n as usize);
        }
        if let Some(format) = lookup("SAMPLES_FORMAT") {
            config.samples_format = format.trim().parse()?;
        }
        config.seed = parse_var(&lookup, "SEED")?;
        if let Some(n) = parse_var(&lookup, "NUM_RUNS")? {
            config.num_runs = RunCount::Bounded(n);
        }
        if lookup("FUZZ").is_some_and(|v| v.trim() == "1") {
            config.num_runs = RunCount::Unbounded;
        }
        if let Some(dir) = lookup("COMPILE_DIR") {
            config.compile_dir = PathBuf::from(dir);
        }
        if let Some(depth) = parse_var(&lookup, "MAX_DEPTH")? {
            config.max_depth = depth as usize;
        }
        Ok(config)
    }
}

fn parse_var(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<u64>, ConfigError> {
    match lookup(var) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidInteger { var, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<FuzzConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        FuzzConfig::from_lookup(|var| vars.get(var).cloned())
    }

    #[test]
    fn defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.samples_num, None);
        assert_eq!(config.samples_format, SampleFormat::Ast);
        assert_eq!(config.seed, None);
        assert_eq!(config.num_runs, RunCount::Bounded(DEFAULT_NUM_RUNS));
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn reads_all_variables() {
        let config = config(&[
            ("SAMPLES_NUM", "5"),
            ("SAMPLES_FORMAT", "json"),
            ("SEED", "42"),
            ("NUM_RUNS", "7"),
            ("COMPILE_DIR", "/tmp/tact-out"),
            ("MAX_DEPTH", "4"),
        ])
        .unwrap();
        assert_eq!(config.samples_num, Some(5));
        assert_eq!(config.samples_format, SampleFormat::Json);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.num_runs, RunCount::Bounded(7));
        assert_eq!(config.compile_dir, PathBuf::from("/tmp/tact-out"));
        assert_eq!(config.max_depth, 4);
    }

    #[test]
    fn fuzz_mode_is_unbounded() {
        let config = config(&[("NUM_RUNS", "7"), ("FUZZ", "1")]).unwrap();
        assert_eq!(config.num_runs, RunCount::Unbounded);
    }

    #[test]
    fn bad_format_lists_legal_values() {
        let err = config(&[("SAMPLES_FORMAT", "yaml")]).unwrap_err();
        assert_eq!(err, ConfigError::InvalidSampleFormat("yaml".into()));
        assert!(err.to_string().contains("ast, json"));
    }

    #[test]
    fn bad_integer_names_the_variable() {
        let err = config(&[("SEED", "abc")]).unwrap_err();
        assert!(err.to_string().contains("SEED"));
    }
}
