//! Turns a run outcome into Pass, Fail or Skipped.

use neon_codegen::GeneratedTestCase;
use regex::Regex;

use crate::report::{Outcome, TestResult};
use crate::runner::{RunOutcome, RunStatus};

/// Judges one outcome.
///
/// An unmet requirement or a cancelled batch is Skipped. A nonzero exit is a
/// Fail whose diagnostic is the toolchain's stderr verbatim. A clean exit
/// still fails if any of the intrinsic's scan-assembler patterns has no
/// match in the assembly text. A case whose intermediates could not be
/// retained fails too, with the reason appended to its diagnostic.
pub fn check(outcome: RunOutcome) -> TestResult {
    let RunOutcome {
        case,
        exit_status,
        captured_output,
        assembly,
        retain_error,
        ..
    } = outcome;

    let result = judge(case, exit_status, captured_output, assembly.as_deref());
    match retain_error {
        None => result,
        Some(_) if result.outcome == Outcome::Skipped => result,
        Some(e) => {
            let mut diagnostic = result.diagnostic;
            if !diagnostic.is_empty() && !diagnostic.ends_with('\n') {
                diagnostic.push('\n');
            }
            diagnostic.push_str("cannot retain intermediates: ");
            diagnostic.push_str(&e);
            TestResult::fail(result.case, diagnostic)
        }
    }
}

fn judge(
    case: GeneratedTestCase,
    exit_status: RunStatus,
    captured_output: String,
    assembly: Option<&str>,
) -> TestResult {
    match exit_status {
        RunStatus::Unsupported {
            requirement,
            reason,
        } => TestResult::skipped(
            case,
            format!("effective target `{requirement}` not supported: {reason}"),
        ),
        RunStatus::Cancelled => TestResult::skipped(case, "cancelled"),
        RunStatus::TimedOut(limit) => TestResult::fail(
            case,
            format!("toolchain timed out after {}s", limit.as_secs()),
        ),
        RunStatus::LaunchFailed(msg) => TestResult::fail(case, msg),
        RunStatus::Signaled => {
            let mut diagnostic = String::from("toolchain killed by a signal");
            if !captured_output.is_empty() {
                diagnostic.push('\n');
                diagnostic.push_str(&captured_output);
            }
            TestResult::fail(case, diagnostic)
        }
        RunStatus::Exited(code) if code != 0 => TestResult::fail(case, captured_output),
        RunStatus::Exited(_) => match scan_assembler(&case.intrinsic().scan_assembler, assembly) {
            Ok(()) => TestResult::pass(case),
            Err(diagnostic) => TestResult::fail(case, diagnostic),
        },
    }
}

fn scan_assembler(patterns: &[String], assembly: Option<&str>) -> Result<(), String> {
    if patterns.is_empty() {
        return Ok(());
    }
    let Some(text) = assembly else {
        return Err(format!(
            "scan-assembler \"{}\": no assembly output (build without -save-temps?)",
            patterns[0]
        ));
    };
    for pattern in patterns {
        let re = Regex::new(pattern)
            .map_err(|e| format!("scan-assembler \"{pattern}\": invalid pattern: {e}"))?;
        if !re.is_match(text) {
            return Err(format!("scan-assembler \"{pattern}\": no match"));
        }
    }
    Ok(())
}
