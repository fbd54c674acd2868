//! Harness configuration.
//!
//! Loaded from TOML; every field has a default, so an empty file (or no file
//! at all) describes a native `gcc` with the `arm_neon_ok` probe.
//!
//! ```toml
//! timeout_secs = 30
//! jobs = 8
//! retain_dir = "saved-temps"
//!
//! [toolchain]
//! compiler = "arm-linux-gnueabihf-gcc"
//! args = ["-march=armv7-a"]
//!
//! [capabilities.arm_neon_ok]
//! candidates = [[], ["-mfpu=neon"], ["-mfpu=neon", "-mfloat-abi=softfp"]]
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors reading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("cannot read configuration {}", path.display())]
    Io {
        /// Path that was read.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The file is not a valid configuration.
    #[error("malformed configuration: {0}")]
    Parse(#[from] toml::de::Error),
    /// A value is out of range.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Probe source for `arm_neon_ok`: compiles only when NEON is enabled.
pub const ARM_NEON_PROBE: &str = "\
#include \"arm_neon.h\"
int dummy;
#ifndef __ARM_NEON__
#error not NEON
#endif
";

/// Top-level harness settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HarnessConfig {
    /// Toolchain invocation.
    pub toolchain: ToolchainConfig,
    /// Seconds a single toolchain invocation may run before it is killed.
    pub timeout_secs: u64,
    /// Worker threads; `None` uses the available parallelism.
    pub jobs: Option<usize>,
    /// Where `-save-temps` cases keep their intermediates. `None` discards them.
    pub retain_dir: Option<PathBuf>,
    /// Effective-target requirements, by name.
    pub capabilities: BTreeMap<String, CapabilityConfig>,
}

/// How to invoke the compiler driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolchainConfig {
    /// Driver program.
    pub compiler: String,
    /// Arguments placed before every other option.
    pub args: Vec<String>,
}

/// How to decide whether one effective-target requirement is met.
///
/// `supported` short-circuits probing. Otherwise the probe source is compiled
/// with each candidate flag set in turn and the first set that compiles wins;
/// those flags become the requirement's `dg-add-options` flags.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CapabilityConfig {
    /// Declared outcome; skips the probe when set.
    pub supported: Option<bool>,
    /// Flags added when `supported = true`.
    pub add_options: Vec<String>,
    /// Flag sets tried by the probe, in order.
    pub candidates: Vec<Vec<String>>,
    /// C source the probe compiles.
    pub probe_source: Option<String>,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            compiler: "gcc".to_string(),
            args: Vec::new(),
        }
    }
}

impl Default for HarnessConfig {
    fn default() -> Self {
        let mut capabilities = BTreeMap::new();
        capabilities.insert("arm_neon_ok".to_string(), CapabilityConfig::arm_neon());
        Self {
            toolchain: ToolchainConfig::default(),
            timeout_secs: 60,
            jobs: None,
            retain_dir: None,
            capabilities,
        }
    }
}

impl ToolchainConfig {
    /// A driver invocation running in `dir`, with the configured leading
    /// arguments already applied and stdin closed.
    #[must_use]
    pub fn command(&self, dir: &Path) -> Command {
        let mut cmd = Command::new(&self.compiler);
        cmd.current_dir(dir).args(&self.args).stdin(Stdio::null());
        cmd
    }
}

impl CapabilityConfig {
    /// The `arm_neon_ok` probe: the flag sets a soft-float, softfp and
    /// hard-float multilib each need to enable NEON.
    #[must_use]
    pub fn arm_neon() -> Self {
        let sets: [&[&str]; 4] = [
            &[],
            &["-mfloat-abi=softfp"],
            &["-mfpu=neon", "-mfloat-abi=softfp"],
            &["-mfpu=neon", "-mfloat-abi=hard"],
        ];
        Self {
            supported: None,
            add_options: Vec::new(),
            candidates: sets
                .iter()
                .map(|set| set.iter().map(|s| (*s).to_string()).collect())
                .collect(),
            probe_source: Some(ARM_NEON_PROBE.to_string()),
        }
    }

    /// A requirement declared met, adding `flags`.
    #[must_use]
    pub fn assume_supported(flags: &[&str]) -> Self {
        Self {
            supported: Some(true),
            add_options: flags.iter().map(|s| (*s).to_string()).collect(),
            ..Self::default()
        }
    }

    /// A requirement declared unmet.
    #[must_use]
    pub fn assume_unsupported() -> Self {
        Self {
            supported: Some(false),
            ..Self::default()
        }
    }
}

impl HarnessConfig {
    /// Parses a TOML configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML or unknown keys and
    /// [`ConfigError::Invalid`] for out-of-range values.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: HarnessConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a TOML configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise as
    /// [`HarnessConfig::from_toml_str`].
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.toolchain.compiler.trim().is_empty() {
            return Err(ConfigError::Invalid("toolchain.compiler is empty".into()));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid("timeout_secs must be positive".into()));
        }
        if self.jobs == Some(0) {
            return Err(ConfigError::Invalid("jobs must be positive".into()));
        }
        Ok(())
    }

    /// Per-invocation timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Worker count: configured, else the available parallelism.
    #[must_use]
    pub fn effective_jobs(&self) -> usize {
        self.jobs.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(usize::from)
                .unwrap_or(1)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_the_default() {
        let config = HarnessConfig::from_toml_str("").unwrap();
        assert_eq!(config, HarnessConfig::default());
        assert_eq!(config.toolchain.compiler, "gcc");
        assert_eq!(config.timeout(), Duration::from_secs(60));
        assert!(config.capabilities.contains_key("arm_neon_ok"));
    }

    #[test]
    fn file_values_override_defaults() {
        let config = HarnessConfig::from_toml_str(
            r#"
            timeout_secs = 5
            jobs = 2
            retain_dir = "keep"

            [toolchain]
            compiler = "arm-none-eabi-gcc"
            args = ["-mcpu=cortex-a9"]

            [capabilities.arm_neon_ok]
            supported = true
            add_options = ["-mfpu=neon", "-mfloat-abi=softfp"]
            "#,
        )
        .unwrap();
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.effective_jobs(), 2);
        assert_eq!(config.retain_dir, Some(PathBuf::from("keep")));
        assert_eq!(config.toolchain.args, ["-mcpu=cortex-a9"]);
        let neon = &config.capabilities["arm_neon_ok"];
        assert_eq!(neon.supported, Some(true));
        assert!(neon.candidates.is_empty());
    }

    #[test]
    fn zero_timeout_is_invalid() {
        let err = HarnessConfig::from_toml_str("timeout_secs = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = HarnessConfig::from_toml_str("timeout = 5").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
