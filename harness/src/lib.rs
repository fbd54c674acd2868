//! NEON test harness.
//!
//! Builds the cases `neon-codegen` emits with a real toolchain and judges the
//! result. Each case runs in its own scratch directory on a `rayon` pool;
//! a requirement the toolchain cannot meet (`arm_neon_ok` on an x86 host)
//! makes its cases Skipped rather than Failed.
//!
//! # Entry Point
//!
//! ```no_run
//! use neon_catalog::Catalog;
//! use neon_codegen::EmitOptions;
//! use neon_harness::{run_catalog, HarnessConfig};
//!
//! let report = run_catalog(
//!     Catalog::builtin().all(),
//!     &EmitOptions::default(),
//!     HarnessConfig::default(),
//! )?;
//! println!("{} passed, {} failed", report.passed(), report.failed());
//! # Ok::<(), anyhow::Error>(())
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

pub mod capability;
pub mod checker;
pub mod config;
pub mod logging;
pub mod process;
pub mod report;
pub mod runner;

use anyhow::{Context, Result};
use neon_catalog::IntrinsicSpec;
use neon_codegen::{emit_all, EmitOptions, GeneratedTestCase};
use rayon::prelude::*;
use tracing::info;

pub use capability::{CapabilityGate, CapabilityStatus};
pub use checker::check;
pub use config::{CapabilityConfig, ConfigError, HarnessConfig, ToolchainConfig};
pub use process::{cancel_on_interrupt, CancelToken};
pub use report::{HarnessReport, Outcome, Summary, TestResult};
pub use runner::{RunOutcome, RunStatus, Runner};

/// Runs and checks every case on a pool of `jobs` workers.
///
/// Results keep the order of `cases`. A failing case never stops the batch.
///
/// # Errors
///
/// Returns an error only if the worker pool cannot be created.
pub fn run_batch(cases: &[GeneratedTestCase], runner: &Runner, jobs: usize) -> Result<HarnessReport> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs.max(1))
        .thread_name(|i| format!("neon-worker-{i}"))
        .build()
        .context("cannot start worker pool")?;

    info!(cases = cases.len(), jobs, "running batch");
    let results: Vec<TestResult> =
        pool.install(|| cases.par_iter().map(|case| check(runner.run(case))).collect());

    let report = HarnessReport {
        results,
        rejected: Vec::new(),
    };
    info!(
        passed = report.passed(),
        failed = report.failed(),
        skipped = report.skipped(),
        "batch finished"
    );
    Ok(report)
}

/// Emits, gates, runs and checks `specs` with `config`.
///
/// Entries the emitter rejects are recorded in the report, not run.
///
/// # Errors
///
/// As [`run_batch`].
pub fn run_catalog<'a>(
    specs: impl IntoIterator<Item = &'a IntrinsicSpec>,
    options: &EmitOptions,
    config: HarnessConfig,
) -> Result<HarnessReport> {
    run_catalog_with(specs, options, config, CancelToken::new())
}

/// [`run_catalog`] sharing `cancel` with the runner.
///
/// # Errors
///
/// As [`run_batch`].
pub fn run_catalog_with<'a>(
    specs: impl IntoIterator<Item = &'a IntrinsicSpec>,
    options: &EmitOptions,
    config: HarnessConfig,
    cancel: CancelToken,
) -> Result<HarnessReport> {
    let batch = emit_all(specs, options);
    let gate = CapabilityGate::resolve(&config, batch.cases.iter().map(|c| c.target_requirement()));
    let jobs = config.effective_jobs();
    let runner = Runner::new(config, gate).with_cancel_token(cancel);

    let mut report = run_batch(&batch.cases, &runner, jobs)?;
    for (name, e) in &batch.rejected {
        report.reject(name.clone(), e.to_string());
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use neon_catalog::Catalog;

    #[test]
    fn unsupported_target_skips_the_whole_family() {
        let mut config = HarnessConfig::default();
        config
            .capabilities
            .insert("arm_neon_ok".to_string(), CapabilityConfig::assume_unsupported());
        config.toolchain.compiler = "/nonexistent/cc".to_string();

        let report = run_catalog(Catalog::builtin().family("shift"), &EmitOptions::default(), config)
            .unwrap();
        assert_eq!(report.results.len(), 16);
        assert_eq!(report.skipped(), 16);
        assert!(report.all_passed());
        assert_eq!(report.exit_code(), 0);
    }

    #[test]
    fn results_keep_case_order() {
        let mut config = HarnessConfig::default();
        config
            .capabilities
            .insert("arm_neon_ok".to_string(), CapabilityConfig::assume_unsupported());
        let specs: Vec<_> = Catalog::builtin().family("arith").collect();
        let report = run_catalog(specs.iter().copied(), &EmitOptions::default(), config).unwrap();
        let names: Vec<_> = report.results.iter().map(|r| r.case.intrinsic().name.as_str()).collect();
        let expected: Vec<_> = specs.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, expected);
    }
}
