//! Effective-target requirements and how they are decided.
//!
//! A requirement such as `arm_neon_ok` is met when the configured toolchain
//! can build NEON code at all. Each requirement resolves once per batch to
//! [`CapabilityStatus::Supported`] with the flags that enable it (what
//! `dg-add-options` would add) or [`CapabilityStatus::Unsupported`]. Workers
//! only read the resolved [`CapabilityGate`].

use std::collections::BTreeMap;
use std::fs;
use std::process::Stdio;

use tracing::{debug, info, info_span, warn};

use crate::config::{CapabilityConfig, HarnessConfig};
use crate::process::{run_with_deadline, CancelToken, ChildExit};

const PROBE_SOURCE: &str = "probe.c";
const PROBE_OBJECT: &str = "probe.o";

/// Resolution of one requirement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapabilityStatus {
    /// Met; build with these extra flags.
    Supported {
        /// Flags enabling the capability, possibly none.
        flags: Vec<String>,
    },
    /// Not met on this host and toolchain.
    Unsupported {
        /// Why the requirement was rejected.
        reason: String,
    },
}

impl CapabilityStatus {
    fn unsupported(reason: impl Into<String>) -> Self {
        CapabilityStatus::Unsupported {
            reason: reason.into(),
        }
    }

    /// Whether the requirement is met.
    #[must_use]
    pub fn is_supported(&self) -> bool {
        matches!(self, CapabilityStatus::Supported { .. })
    }
}

/// Resolved requirements for a batch.
#[derive(Debug, Clone, Default)]
pub struct CapabilityGate {
    statuses: BTreeMap<String, CapabilityStatus>,
}

impl CapabilityGate {
    /// Resolves every requirement in `requirements` against `config`.
    ///
    /// Duplicates are resolved once. The empty requirement is always met.
    pub fn resolve<'a>(
        config: &HarnessConfig,
        requirements: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        let mut statuses = BTreeMap::new();
        for requirement in requirements {
            if requirement.is_empty() || statuses.contains_key(requirement) {
                continue;
            }
            let status = resolve_one(config, requirement);
            match &status {
                CapabilityStatus::Supported { flags } => {
                    info!(requirement, flags = %flags.join(" "), "capability supported");
                }
                CapabilityStatus::Unsupported { reason } => {
                    warn!(requirement, %reason, "capability unsupported, dependent tests will be skipped");
                }
            }
            statuses.insert(requirement.to_string(), status);
        }
        Self { statuses }
    }

    /// A gate with fixed answers.
    #[must_use]
    pub fn from_statuses(statuses: impl IntoIterator<Item = (String, CapabilityStatus)>) -> Self {
        Self {
            statuses: statuses.into_iter().collect(),
        }
    }

    /// Status of `requirement`. Requirements never resolved are unsupported.
    #[must_use]
    pub fn status(&self, requirement: &str) -> CapabilityStatus {
        if requirement.is_empty() {
            return CapabilityStatus::Supported { flags: Vec::new() };
        }
        self.statuses.get(requirement).cloned().unwrap_or_else(|| {
            CapabilityStatus::unsupported(format!("requirement `{requirement}` was not resolved"))
        })
    }

    /// Every resolved requirement, by name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CapabilityStatus)> {
        self.statuses.iter().map(|(k, v)| (k.as_str(), v))
    }
}

fn resolve_one(config: &HarnessConfig, requirement: &str) -> CapabilityStatus {
    let Some(capability) = config.capabilities.get(requirement) else {
        return CapabilityStatus::unsupported(format!(
            "requirement `{requirement}` is not configured"
        ));
    };
    match capability.supported {
        Some(true) => CapabilityStatus::Supported {
            flags: capability.add_options.clone(),
        },
        Some(false) => {
            CapabilityStatus::unsupported(format!("requirement `{requirement}` is declared unsupported"))
        }
        None => probe(config, requirement, capability),
    }
}

/// Compiles the probe source with each candidate flag set in turn; the first
/// set that compiles wins.
fn probe(config: &HarnessConfig, requirement: &str, capability: &CapabilityConfig) -> CapabilityStatus {
    let _span = info_span!("probe", requirement).entered();

    let Some(source) = &capability.probe_source else {
        return CapabilityStatus::unsupported(format!(
            "requirement `{requirement}` has no probe source"
        ));
    };
    if capability.candidates.is_empty() {
        return CapabilityStatus::unsupported(format!(
            "requirement `{requirement}` has no candidate flag sets"
        ));
    }

    let dir = match tempfile::Builder::new().prefix("neon-probe-").tempdir() {
        Ok(dir) => dir,
        Err(e) => return CapabilityStatus::unsupported(format!("cannot create probe directory: {e}")),
    };
    if let Err(e) = fs::write(dir.path().join(PROBE_SOURCE), source) {
        return CapabilityStatus::unsupported(format!("cannot write probe source: {e}"));
    }

    // Probes are never cancelled; a batch resolves its gate before it starts.
    let cancel = CancelToken::new();
    for flags in &capability.candidates {
        let mut cmd = config.toolchain.command(dir.path());
        cmd.args(flags)
            .args(["-c", PROBE_SOURCE, "-o", PROBE_OBJECT])
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        match run_with_deadline(&mut cmd, config.timeout(), &cancel) {
            Ok(ChildExit::Exited(status)) if status.success() => {
                return CapabilityStatus::Supported {
                    flags: flags.clone(),
                };
            }
            Ok(exit) => debug!(flags = %flags.join(" "), ?exit, "probe candidate rejected"),
            Err(e) => {
                return CapabilityStatus::unsupported(format!(
                    "cannot run `{}`: {e}",
                    config.toolchain.compiler
                ));
            }
        }
    }

    CapabilityStatus::unsupported(format!(
        "`{}` built the `{requirement}` probe with none of {} candidate flag sets",
        config.toolchain.compiler,
        capability.candidates.len()
    ))
}
