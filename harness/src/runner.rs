//! Builds one generated case with the target toolchain.
//!
//! Every case runs in its own temporary directory, dropped on every path
//! out of [`Runner::run`]. Cases built with `-save-temps` may copy their
//! intermediates to the configured retain directory first.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};

use neon_codegen::GeneratedTestCase;
use thiserror::Error;
use tracing::{debug, info_span, warn};

use crate::capability::{CapabilityGate, CapabilityStatus};
use crate::config::HarnessConfig;
use crate::process::{run_with_deadline, CancelToken, ChildExit};

const STDERR_FILE: &str = "stderr.txt";

/// Extensions of the intermediates `-save-temps` leaves behind.
pub const INTERMEDIATE_EXTENSIONS: [&str; 3] = ["i", "s", "o"];

/// How a toolchain invocation ended, or why it never started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    /// The toolchain exited with this code.
    Exited(i32),
    /// The toolchain was killed by a signal.
    Signaled,
    /// The toolchain ran past the timeout and was killed.
    TimedOut(Duration),
    /// The case's requirement is not met; nothing was run.
    Unsupported {
        /// The requirement.
        requirement: String,
        /// Why it is not met.
        reason: String,
    },
    /// The batch was cancelled before or during the run.
    Cancelled,
    /// The toolchain could not be started.
    LaunchFailed(String),
}

/// Everything the checker needs to judge one case.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// The case that was run.
    pub case: GeneratedTestCase,
    /// How the run ended.
    pub exit_status: RunStatus,
    /// Toolchain diagnostics (stderr), verbatim.
    pub captured_output: String,
    /// Assembly text the toolchain wrote, if any.
    pub assembly: Option<String>,
    /// Where intermediates were kept, if they were.
    pub retained: Option<PathBuf>,
    /// Why intermediates that should have been kept were not.
    pub retain_error: Option<String>,
    /// Wall time spent on the case.
    pub elapsed: Duration,
}

/// Failures preparing or running a case, before the toolchain could report.
#[derive(Debug, Error)]
pub enum RunError {
    /// The scratch directory could not be created.
    #[error("cannot create scratch directory: {0}")]
    Scratch(#[source] io::Error),
    /// A file in the scratch directory could not be written or read.
    #[error("cannot access {}: {source}", path.display())]
    Io {
        /// The file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
    /// The toolchain could not be started.
    #[error("cannot run `{compiler}`: {source}")]
    Spawn {
        /// The configured driver.
        compiler: String,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> RunError + '_ {
    move |source| RunError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Runs cases against one toolchain configuration.
#[derive(Debug, Clone)]
pub struct Runner {
    config: HarnessConfig,
    gate: CapabilityGate,
    cancel: CancelToken,
}

impl Runner {
    /// A runner for `config` that consults `gate` before every case.
    #[must_use]
    pub fn new(config: HarnessConfig, gate: CapabilityGate) -> Self {
        Self {
            config,
            gate,
            cancel: CancelToken::new(),
        }
    }

    /// Shares `cancel` with the runner; cancelling it stops pending and
    /// running cases.
    #[must_use]
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// The runner's configuration.
    #[must_use]
    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// The runner's cancellation token.
    #[must_use]
    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// Runs one case. Never fails: problems are reported in the outcome.
    pub fn run(&self, case: &GeneratedTestCase) -> RunOutcome {
        let stem = case.stem();
        let _span = info_span!("run", case = %stem).entered();
        let started = Instant::now();
        let mut outcome = RunOutcome {
            case: case.clone(),
            exit_status: RunStatus::Cancelled,
            captured_output: String::new(),
            assembly: None,
            retained: None,
            retain_error: None,
            elapsed: Duration::ZERO,
        };

        let flags = match self.gate.status(case.target_requirement()) {
            CapabilityStatus::Supported { flags } => flags,
            CapabilityStatus::Unsupported { reason } => {
                debug!(requirement = case.target_requirement(), "requirement unmet, not running");
                outcome.exit_status = RunStatus::Unsupported {
                    requirement: case.target_requirement().to_string(),
                    reason,
                };
                outcome.elapsed = started.elapsed();
                return outcome;
            }
        };

        if self.cancel.is_cancelled() {
            outcome.elapsed = started.elapsed();
            return outcome;
        }

        if let Err(e) = self.build(case, &flags, &mut outcome) {
            warn!(error = %e, "case did not run");
            outcome.exit_status = RunStatus::LaunchFailed(e.to_string());
        }
        outcome.elapsed = started.elapsed();
        debug!(status = ?outcome.exit_status, elapsed = ?outcome.elapsed, "case finished");
        outcome
    }

    fn build(
        &self,
        case: &GeneratedTestCase,
        flags: &[String],
        outcome: &mut RunOutcome,
    ) -> Result<(), RunError> {
        let stem = case.stem();
        let scratch = tempfile::Builder::new()
            .prefix(&format!("neon-{stem}-"))
            .tempdir()
            .map_err(RunError::Scratch)?;
        let dir = scratch.path();

        let source = dir.join(case.file_name());
        fs::write(&source, case.source_text()).map_err(io_error(&source))?;

        let stderr_path = dir.join(STDERR_FILE);
        let stderr = File::create(&stderr_path).map_err(io_error(&stderr_path))?;

        let action = case.action();
        let output = format!("{stem}.{}", action.output_extension());
        let mut cmd = self.config.toolchain.command(dir);
        cmd.args(case.build_options())
            .args(flags)
            .arg(action.driver_flag())
            .arg(case.file_name())
            .arg("-o")
            .arg(&output)
            .stdout(Stdio::null())
            .stderr(Stdio::from(stderr));
        debug!(command = ?cmd, "invoking toolchain");

        let exit = run_with_deadline(&mut cmd, self.config.timeout(), &self.cancel).map_err(
            |source| RunError::Spawn {
                compiler: self.config.toolchain.compiler.clone(),
                source,
            },
        )?;

        let captured = fs::read(&stderr_path).map_err(io_error(&stderr_path))?;
        outcome.captured_output = String::from_utf8_lossy(&captured).into_owned();
        outcome.exit_status = match exit {
            ChildExit::Exited(status) => match status.code() {
                Some(code) => RunStatus::Exited(code),
                None => RunStatus::Signaled,
            },
            ChildExit::TimedOut => RunStatus::TimedOut(self.config.timeout()),
            ChildExit::Cancelled => RunStatus::Cancelled,
        };

        let assembly = dir.join(format!("{stem}.s"));
        if assembly.is_file() {
            let text = fs::read(&assembly).map_err(io_error(&assembly))?;
            outcome.assembly = Some(String::from_utf8_lossy(&text).into_owned());
        }

        if case.retains_intermediates() {
            if let Some(root) = &self.config.retain_dir {
                match retain(dir, &stem, root) {
                    Ok(kept) => outcome.retained = Some(kept),
                    Err(e) => {
                        warn!(error = %e, "cannot retain intermediates");
                        outcome.retain_error = Some(e.to_string());
                    }
                }
            }
        }

        Ok(())
    }
}

/// Copies `<stem>.{i,s,o}` from `from` into `<root>/<stem>/`.
fn retain(from: &Path, stem: &str, root: &Path) -> Result<PathBuf, RunError> {
    let to = root.join(stem);
    fs::create_dir_all(&to).map_err(io_error(&to))?;
    for ext in INTERMEDIATE_EXTENSIONS {
        let name = format!("{stem}.{ext}");
        let src = from.join(&name);
        if src.is_file() {
            let dst = to.join(&name);
            fs::copy(&src, &dst).map_err(io_error(&dst))?;
        }
    }
    Ok(to)
}

#[cfg(test)]
mod tests {
    use super::*;
    use neon_catalog::Catalog;
    use neon_codegen::{emit_with, EmitOptions};

    fn vorn_case() -> GeneratedTestCase {
        let spec = Catalog::builtin().lookup("vorn_s64").unwrap();
        emit_with(spec, &EmitOptions::default()).unwrap()
    }

    #[test]
    fn unsupported_requirement_short_circuits() {
        let mut config = HarnessConfig::default();
        config.toolchain.compiler = "/nonexistent/cc".to_string();
        let gate = CapabilityGate::from_statuses([(
            "arm_neon_ok".to_string(),
            CapabilityStatus::Unsupported {
                reason: "no NEON".to_string(),
            },
        )]);
        let outcome = Runner::new(config, gate).run(&vorn_case());
        assert_eq!(
            outcome.exit_status,
            RunStatus::Unsupported {
                requirement: "arm_neon_ok".to_string(),
                reason: "no NEON".to_string()
            }
        );
        assert!(outcome.captured_output.is_empty());
        assert!(outcome.elapsed > Duration::ZERO);
    }

    #[test]
    fn missing_compiler_is_a_launch_failure() {
        let mut config = HarnessConfig::default();
        config.toolchain.compiler = "/nonexistent/neon-testgen-cc".to_string();
        let gate = CapabilityGate::from_statuses([(
            "arm_neon_ok".to_string(),
            CapabilityStatus::Supported { flags: vec![] },
        )]);
        let outcome = Runner::new(config, gate).run(&vorn_case());
        assert!(
            matches!(&outcome.exit_status, RunStatus::LaunchFailed(msg) if msg.contains("/nonexistent/neon-testgen-cc")),
            "{:?}",
            outcome.exit_status
        );
    }

    #[test]
    fn cancelled_runner_starts_nothing() {
        let token = CancelToken::new();
        token.cancel();
        let gate = CapabilityGate::from_statuses([(
            "arm_neon_ok".to_string(),
            CapabilityStatus::Supported { flags: vec![] },
        )]);
        let outcome = Runner::new(HarnessConfig::default(), gate)
            .with_cancel_token(token)
            .run(&vorn_case());
        assert_eq!(outcome.exit_status, RunStatus::Cancelled);
        assert!(outcome.elapsed > Duration::ZERO);
    }
}
