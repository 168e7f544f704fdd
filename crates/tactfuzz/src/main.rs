use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use tact_common::Diagnostic;
use tact_compiler::ast::visitor::NodeCounter;
use tact_compiler::equiv::{AstHasher, AstRenamer};
use tact_compiler::format::{format_module, to_json};
use tact_compiler::semantic::check_module;
use tact_fuzz::{sample_program, FuzzConfig, RunCount, Sample, SampleFormat};

/// Tact program fuzzer.
///
/// Generates random well-typed Tact programs, checks each one and writes the
/// distinct ones to the compile directory.
#[derive(Parser)]
#[command(
    name = "tactfuzz",
    version,
    about,
    long_about = "Tact program fuzzer.\n\nGenerates random well-typed Tact programs, checks each with the semantic\nchecker and writes the distinct ones to COMPILE_DIR.\n\nSettings are read from the environment (SEED, NUM_RUNS, FUZZ, SAMPLES_NUM,\nSAMPLES_FORMAT, COMPILE_DIR, MAX_DEPTH); flags override them.\n\nExamples:\n  tactfuzz                       Run 100 trials with a random seed\n  tactfuzz --seed 7 --runs 10    Reproduce ten trials from seed 7\n  tactfuzz --samples 3           Print the first three programs\n  FUZZ=1 tactfuzz                Run until interrupted"
)]
struct Cli {
    /// Base seed; trial `i` uses `seed + i`.
    #[arg(long)]
    seed: Option<u64>,

    /// Number of trials.
    #[arg(short = 'n', long)]
    runs: Option<u64>,

    /// Run until interrupted.
    #[arg(long)]
    fuzz: bool,

    /// Print the first N distinct programs to stdout.
    #[arg(long)]
    samples: Option<usize>,

    /// Rendering of printed programs: ast or json.
    #[arg(long)]
    format: Option<SampleFormat>,

    /// Expression nesting ceiling.
    #[arg(long = "max-depth")]
    max_depth: Option<usize>,

    /// Directory the generated sources are written to.
    #[arg(long = "compile-dir")]
    compile_dir: Option<PathBuf>,

    /// Do not write generated sources.
    #[arg(long = "no-write")]
    no_write: bool,
}

impl Cli {
    fn apply(&self, mut config: FuzzConfig) -> FuzzConfig {
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(runs) = self.runs {
            config.num_runs = RunCount::Bounded(runs);
        }
        if self.fuzz {
            config.num_runs = RunCount::Unbounded;
        }
        if let Some(n) = self.samples {
            config.samples_num = Some(n);
        }
        if let Some(format) = self.format {
            config.samples_format = format;
        }
        if let Some(depth) = self.max_depth {
            config.max_depth = depth;
        }
        if let Some(ref dir) = self.compile_dir {
            config.compile_dir = dir.clone();
        }
        config
    }
}

/// Totals over all trials.
#[derive(Debug, Default)]
struct Report {
    runs: u64,
    failed_seeds: Vec<u64>,
    distinct: usize,
    peak_depth: usize,
    nodes: NodeCounter,
}

impl Report {
    fn record(&mut self, sample: &Sample) {
        let counts = NodeCounter::count(&sample.module);
        self.nodes.items += counts.items;
        self.nodes.declarations += counts.declarations;
        self.nodes.statements += counts.statements;
        self.nodes.expressions += counts.expressions;
        self.peak_depth = self.peak_depth.max(sample.peak_depth);
    }
}

fn main() -> ExitCode {
    if let Ok(filter) = EnvFilter::try_from_env("TACT_FUZZ_LOG") {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    }

    let cli = Cli::parse();
    let config = match FuzzConfig::from_env() {
        Ok(config) => cli.apply(config),
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(&config, !cli.no_write) {
        Ok(report) => {
            println!(
                "{} trials, {} distinct, {} failed (peak depth {}; {} items, {} declarations, {} statements, {} expressions)",
                report.runs,
                report.distinct,
                report.failed_seeds.len(),
                report.peak_depth,
                report.nodes.items,
                report.nodes.declarations,
                report.nodes.statements,
                report.nodes.expressions,
            );
            if report.failed_seeds.is_empty() {
                ExitCode::SUCCESS
            } else {
                eprintln!("error: failing seeds: {:?}", report.failed_seeds);
                ExitCode::FAILURE
            }
        }
        Err(msg) => {
            eprintln!("error: {}", msg);
            ExitCode::FAILURE
        }
    }
}

fn run(config: &FuzzConfig, write: bool) -> Result<Report, String> {
    if write {
        fs::create_dir_all(&config.compile_dir).map_err(|e| {
            format!(
                "could not create '{}': {}",
                config.compile_dir.display(),
                e
            )
        })?;
    }
    let base = config.seed.unwrap_or_else(rand::random);
    info!(seed = base, runs = ?config.num_runs, "starting");

    let hasher = AstHasher::new(true);
    let renamer = AstRenamer::new();
    let mut seen = HashSet::new();
    let mut printed = 0;
    let mut report = Report::default();

    for i in 0u64.. {
        if let RunCount::Bounded(n) = config.num_runs {
            if i >= n {
                break;
            }
        }
        let seed = base.wrapping_add(i);
        report.runs += 1;

        let sample = match sample_program(config, seed) {
            Ok(sample) => sample,
            Err(e) => {
                error!(seed, error = %e, "generation failed");
                report.failed_seeds.push(seed);
                continue;
            }
        };
        report.record(&sample);

        let diagnostics = check_module(&sample.module);
        for diag in diagnostics.diagnostics() {
            print_diagnostic(seed, diag);
        }
        if diagnostics.has_errors() {
            report.failed_seeds.push(seed);
            continue;
        }

        let hash = hasher.hash(&renamer.rename_module(&sample.module));
        if !seen.insert(hash) {
            debug!(seed, "duplicate program");
            continue;
        }
        report.distinct += 1;

        let source = format_module(&sample.module);
        if config.samples_num.is_some_and(|n| printed < n) {
            printed += 1;
            match config.samples_format {
                SampleFormat::Ast => println!("// seed {}\n{}", seed, source),
                SampleFormat::Json => {
                    let json = to_json(&sample.module)
                        .map_err(|e| format!("failed to serialize sample {}: {}", seed, e))?;
                    println!("{}", json);
                }
            }
        }
        if write {
            let path = config.compile_dir.join(format!("sample_{}.tact", seed));
            fs::write(&path, &source)
                .map_err(|e| format!("could not write '{}': {}", path.display(), e))?;
        }
    }
    Ok(report)
}

fn print_diagnostic(seed: u64, diag: &Diagnostic) {
    let node = diag
        .node
        .map(|id| format!(" (node {})", id))
        .unwrap_or_default();
    if diag.is_error() {
        error!(seed, "{}{}", diag.message, node);
    } else {
        warn!(seed, "{}{}", diag.message, node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_the_environment() {
        let cli = Cli::parse_from(["tactfuzz", "--seed", "9", "-n", "4", "--format", "json"]);
        let config = cli.apply(FuzzConfig {
            seed: Some(1),
            ..FuzzConfig::default()
        });
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.num_runs, RunCount::Bounded(4));
        assert_eq!(config.samples_format, SampleFormat::Json);
    }

    #[test]
    fn fuzz_flag_is_unbounded() {
        let cli = Cli::parse_from(["tactfuzz", "--fuzz", "-n", "4"]);
        assert_eq!(cli.apply(FuzzConfig::default()).num_runs, RunCount::Unbounded);
    }

    #[test]
    fn bounded_run_without_writing() {
        let mut config = FuzzConfig::default();
        config.seed = Some(3);
        config.num_runs = RunCount::Bounded(5);
        let report = run(&config, false).unwrap();
        assert_eq!(report.runs, 5);
        assert!(report.failed_seeds.is_empty());
        assert!(report.distinct >= 1);
        assert!(report.peak_depth <= config.max_depth);
    }
}
