//! Harness report types: per-case results and batch aggregation.

use std::fmt;

use neon_codegen::GeneratedTestCase;
use serde::Serialize;

/// Terminal state of one case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// Built, and every scan-assembler pattern matched.
    Pass,
    /// Built with errors, timed out, or a pattern did not match.
    Fail,
    /// Not run: the requirement is unmet or the batch was cancelled.
    Skipped,
}

impl Outcome {
    /// Upper-case label used in text reports.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Outcome::Pass => "PASS",
            Outcome::Fail => "FAIL",
            Outcome::Skipped => "SKIP",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Judgement on one case.
#[derive(Debug, Clone)]
pub struct TestResult {
    /// The case judged.
    pub case: GeneratedTestCase,
    /// Pass, Fail or Skipped.
    pub outcome: Outcome,
    /// Why the case failed or was skipped; empty on a clean pass.
    pub diagnostic: String,
}

impl TestResult {
    /// Creates a passing result.
    pub fn pass(case: GeneratedTestCase) -> Self {
        Self::new(case, Outcome::Pass, String::new())
    }

    /// Creates a failure result.
    pub fn fail(case: GeneratedTestCase, diagnostic: impl Into<String>) -> Self {
        Self::new(case, Outcome::Fail, diagnostic)
    }

    /// Creates a skipped result.
    pub fn skipped(case: GeneratedTestCase, diagnostic: impl Into<String>) -> Self {
        Self::new(case, Outcome::Skipped, diagnostic)
    }

    fn new(case: GeneratedTestCase, outcome: Outcome, diagnostic: impl Into<String>) -> Self {
        Self {
            case,
            outcome,
            diagnostic: diagnostic.into(),
        }
    }

    /// Returns true if this result represents a failure.
    pub fn is_failure(&self) -> bool {
        self.outcome == Outcome::Fail
    }
}

/// One line of the serialized summary.
#[derive(Debug, Clone, Serialize)]
pub struct CaseSummary {
    /// Intrinsic name.
    pub intrinsic: String,
    /// Generated file name.
    pub file: String,
    /// Terminal state.
    pub outcome: Outcome,
    /// Diagnostic, omitted when empty.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub diagnostic: String,
}

/// An entry that never became a case.
#[derive(Debug, Clone, Serialize)]
pub struct Rejection {
    /// Intrinsic or definition name.
    pub name: String,
    /// Why it was rejected.
    pub reason: String,
}

/// Serializable batch summary.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    /// Cases run.
    pub total: usize,
    /// Passing cases.
    pub passed: usize,
    /// Failing cases.
    pub failed: usize,
    /// Skipped cases.
    pub skipped: usize,
    /// Catalog or emitter rejections.
    pub rejected: Vec<Rejection>,
    /// Every case, in batch order.
    pub cases: Vec<CaseSummary>,
}

/// Aggregated results of one batch.
#[derive(Debug, Default)]
pub struct HarnessReport {
    /// Every result, in case order.
    pub results: Vec<TestResult>,
    /// Entries rejected before running.
    pub rejected: Vec<Rejection>,
}

impl HarnessReport {
    /// Creates a new empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a result to this report.
    pub fn push(&mut self, result: TestResult) {
        self.results.push(result);
    }

    /// Records an entry that never became a case.
    pub fn reject(&mut self, name: impl Into<String>, reason: impl Into<String>) {
        self.rejected.push(Rejection {
            name: name.into(),
            reason: reason.into(),
        });
    }

    fn count(&self, outcome: Outcome) -> usize {
        self.results.iter().filter(|r| r.outcome == outcome).count()
    }

    /// Number of passing cases.
    pub fn passed(&self) -> usize {
        self.count(Outcome::Pass)
    }

    /// Number of failing cases.
    pub fn failed(&self) -> usize {
        self.count(Outcome::Fail)
    }

    /// Number of skipped cases.
    pub fn skipped(&self) -> usize {
        self.count(Outcome::Skipped)
    }

    /// Returns true if no case failed.
    pub fn all_passed(&self) -> bool {
        self.failed() == 0
    }

    /// Process exit code: 1 if any case failed, else 0.
    pub fn exit_code(&self) -> i32 {
        i32::from(!self.all_passed())
    }

    /// The serializable summary.
    pub fn summary(&self) -> Summary {
        Summary {
            total: self.results.len(),
            passed: self.passed(),
            failed: self.failed(),
            skipped: self.skipped(),
            rejected: self.rejected.clone(),
            cases: self
                .results
                .iter()
                .map(|r| CaseSummary {
                    intrinsic: r.case.intrinsic().name.clone(),
                    file: r.case.file_name(),
                    outcome: r.outcome,
                    diagnostic: r.diagnostic.clone(),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use neon_catalog::Catalog;
    use neon_codegen::{emit_with, EmitOptions};

    fn case(name: &str) -> GeneratedTestCase {
        emit_with(Catalog::builtin().lookup(name).unwrap(), &EmitOptions::default()).unwrap()
    }

    #[test]
    fn counts_and_exit_code() {
        let mut report = HarnessReport::new();
        report.push(TestResult::pass(case("vorn_s64")));
        report.push(TestResult::skipped(case("vorn_u8"), "arm_neon_ok unsupported"));
        assert_eq!((report.passed(), report.failed(), report.skipped()), (1, 0, 1));
        assert_eq!(report.exit_code(), 0);

        report.push(TestResult::fail(case("vorn_s8"), "error: unrecognized intrinsic"));
        assert!(!report.all_passed());
        assert_eq!(report.exit_code(), 1);
    }

    #[test]
    fn summary_serializes_in_order() {
        let mut report = HarnessReport::new();
        report.push(TestResult::pass(case("vorn_s64")));
        report.push(TestResult::fail(case("vornq_s64"), "boom"));
        report.reject("vbad", "arity 0");

        let json = serde_json::to_value(report.summary()).unwrap();
        assert_eq!(json["total"], 2);
        assert_eq!(json["failed"], 1);
        assert_eq!(json["cases"][0]["file"], "vorns64.c");
        assert_eq!(json["cases"][0]["outcome"], "pass");
        assert!(json["cases"][0].get("diagnostic").is_none());
        assert_eq!(json["cases"][1]["diagnostic"], "boom");
        assert_eq!(json["rejected"][0]["name"], "vbad");
    }
}
