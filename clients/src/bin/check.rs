//! `neon-check`: generates the NEON tests, builds each with the configured
//! toolchain and reports Pass, Fail or Skipped per test.
//!
//! **Usage:**
//! ```
//! neon-check [--catalog <toml>] [--config <toml>] [--out <dir>]
//!            [--requirement <name>] [--option <flag>]... [--family <name>]
//!            [--compiler <cc>] [--jobs N] [--timeout SECS] [--retain <dir>]
//!            [--summary <json>] [--format text|json]
//! ```
//!
//! Exits non-zero if any test fails. Skipped tests do not count as failures.
//! Ctrl-C stops running toolchains, removes their scratch directories and
//! exits with status 130.

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

use std::fs;
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use neon_clients::{build_options, load_catalog, select};
use neon_codegen::{emit_all, write_cases, EmitOptions, TestAction};
use neon_harness::{
    cancel_on_interrupt, run_batch, CancelToken, CapabilityGate, HarnessConfig, HarnessReport,
    Outcome, Runner,
};

/// Exit status after SIGINT, as a shell reports it.
const INTERRUPTED_EXIT: i32 = 130;

/// Report format on stdout.
#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

/// Build and check NEON intrinsic tests.
#[derive(Parser)]
#[command(
    name = "neon-check",
    about = "Build generated NEON intrinsic tests with the target toolchain"
)]
struct Args {
    /// TOML definition file to use instead of the built-in catalog.
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Harness configuration file (toolchain, timeouts, capabilities).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Also write the generated sources to this directory.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Effective-target requirement gating every test (empty for none).
    #[arg(long, default_value = "arm_neon_ok")]
    requirement: String,

    /// Build option, repeatable (default: -save-temps -O2).
    #[arg(long = "option", value_name = "FLAG", allow_hyphen_values = true)]
    options: Vec<String>,

    /// Only check tests of this family.
    #[arg(long)]
    family: Option<String>,

    /// How far the toolchain takes each test.
    #[arg(long, default_value = "assemble")]
    action: TestAction,

    /// Compiler driver, overriding the configuration.
    #[arg(long)]
    compiler: Option<String>,

    /// Worker threads, overriding the configuration.
    #[arg(long)]
    jobs: Option<usize>,

    /// Per-test timeout in seconds, overriding the configuration.
    #[arg(long)]
    timeout: Option<u64>,

    /// Keep intermediates of `-save-temps` tests under this directory.
    #[arg(long)]
    retain: Option<PathBuf>,

    /// Write the JSON summary to this path.
    #[arg(long)]
    summary: Option<PathBuf>,

    /// Report format on stdout.
    #[arg(long, value_enum, default_value = "text")]
    format: Format,
}

fn harness_config(args: &Args) -> Result<HarnessConfig> {
    let mut config = match &args.config {
        Some(path) => HarnessConfig::load(path)
            .with_context(|| format!("Failed to load configuration {}", path.display()))?,
        None => HarnessConfig::default(),
    };
    if let Some(compiler) = &args.compiler {
        config.toolchain.compiler = compiler.clone();
    }
    if let Some(jobs) = args.jobs {
        config.jobs = Some(jobs);
    }
    if let Some(timeout) = args.timeout {
        config.timeout_secs = timeout;
    }
    if let Some(retain) = &args.retain {
        config.retain_dir = Some(retain.clone());
    }
    config.validate().context("Invalid harness configuration")?;
    Ok(config)
}

fn print_text(report: &HarnessReport) {
    println!("NEON Intrinsic Test Report");
    println!("==========================");
    println!();

    for result in &report.results {
        println!(
            "[{}] {} ({})",
            result.outcome,
            result.case.file_name(),
            result.case.intrinsic().name
        );
        if result.outcome != Outcome::Pass {
            for line in result.diagnostic.lines() {
                println!("       {line}");
            }
        }
    }
    for rejection in &report.rejected {
        println!("[REJECTED] {}: {}", rejection.name, rejection.reason);
    }

    println!();
    println!(
        "Summary: {} passed, {} failed, {} skipped",
        report.passed(),
        report.failed(),
        report.skipped()
    );
}

fn main() -> Result<()> {
    neon_harness::logging::init().context("Failed to initialize logging")?;
    let args = Args::parse();
    let config = harness_config(&args)?;

    let loaded = load_catalog(args.catalog.as_deref())?;
    let specs = select(loaded.catalog.as_ref(), args.family.as_deref())?;

    let options = EmitOptions {
        target_requirement: args.requirement.clone(),
        build_options: build_options(&args.options),
        action: args.action,
    };
    let batch = emit_all(specs.iter().copied(), &options);

    if let Some(out) = &args.out {
        fs::create_dir_all(out)
            .with_context(|| format!("Failed to create output directory: {}", out.display()))?;
        write_cases(&batch, out)?;
    }

    let gate = CapabilityGate::resolve(&config, [options.target_requirement.as_str()]);
    let jobs = config.effective_jobs();
    let cancel = CancelToken::new();
    cancel_on_interrupt(&cancel).context("Failed to install the interrupt handler")?;
    let runner = Runner::new(config, gate).with_cancel_token(cancel.clone());
    let mut report = run_batch(&batch.cases, &runner, jobs)?;
    if cancel.is_cancelled() {
        eprintln!("Check INTERRUPTED: running tests were stopped.");
        process::exit(INTERRUPTED_EXIT);
    }
    for reason in &loaded.rejected {
        report.reject("catalog", reason.clone());
    }
    for (name, e) in &batch.rejected {
        report.reject(name.clone(), e.to_string());
    }

    let summary = report.summary();
    if let Some(path) = &args.summary {
        let text = serde_json::to_string_pretty(&summary).context("Failed to serialize summary")?;
        fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))?;
    }

    match args.format {
        Format::Text => print_text(&report),
        Format::Json => {
            let text =
                serde_json::to_string_pretty(&summary).context("Failed to serialize summary")?;
            println!("{text}");
        }
    }

    if !report.all_passed() {
        eprintln!("Check FAILED: {} test(s) did not pass.", report.failed());
        process::exit(report.exit_code());
    }

    Ok(())
}
