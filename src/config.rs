//! Application configuration management.
//!
//! Settings are layered with figment, later layers winning:
//!
//! 1. Built-in defaults
//! 2. A TOML file (`--config PATH` or `config.toml` in the platform config
//!    directory)
//! 3. `DUPESCAN_*` environment variables
//! 4. Command-line flags
//!
//! ```toml
//! criterion = "size"
//! output = "json"
//! yield_every = 50
//! skip_hidden = true
//! ignore_patterns = ["*.tmp", "node_modules/"]
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::cli::{OutputFormat, ScanArgs};
use crate::duplicates::{Criterion, DEFAULT_YIELD_EVERY};
use crate::trace::{DEFAULT_TRACE_CAPACITY, DEFAULT_TRACE_THRESHOLD};

/// Prefix of configuration environment variables.
pub const ENV_PREFIX: &str = "DUPESCAN_";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Criterion used when `--by` is not given.
    pub criterion: Criterion,
    /// Output format used when `--output` is not given.
    pub output: OutputFormat,
    /// Files hashed between two cancellation checkpoints.
    pub yield_every: usize,
    /// Trace lines kept after a truncation.
    pub trace_capacity: usize,
    /// Trace length that triggers a truncation.
    pub trace_threshold: usize,
    /// Skip hidden files and directories.
    pub skip_hidden: bool,
    /// Gitignore-style patterns excluded from every scan.
    pub ignore_patterns: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            criterion: Criterion::default(),
            output: OutputFormat::default(),
            yield_every: DEFAULT_YIELD_EVERY,
            trace_capacity: DEFAULT_TRACE_CAPACITY,
            trace_threshold: DEFAULT_TRACE_THRESHOLD,
            skip_hidden: false,
            ignore_patterns: Vec::new(),
        }
    }
}

impl Config {
    /// Load the configuration from `path`, or from the default
    /// platform-specific path when `None`.
    ///
    /// An explicitly given file that cannot be read or parsed is an error.
    /// Problems with the default file are logged and the remaining layers
    /// are used.
    ///
    /// # Errors
    ///
    /// Returns an error if `path` is given and does not exist or does not
    /// parse.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                if !path.is_file() {
                    anyhow::bail!("Config file not found: {}", path.display());
                }
                Self::try_load_from_path(path)
            }
            None => Ok(Self::load_from_path(
                &Self::config_path().unwrap_or_default(),
            )),
        }
    }

    /// Load from `path` (missing files are skipped), falling back to the
    /// defaults and environment on any error.
    #[must_use]
    pub fn load_from_path(path: &Path) -> Self {
        match Self::try_load_from_path(path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Failed to load config, using defaults: {:#}", e);
                Self::figment(None)
                    .extract::<Self>()
                    .map(Self::normalized)
                    .unwrap_or_default()
            }
        }
    }

    /// Load from `path` (missing files are skipped).
    ///
    /// # Errors
    ///
    /// Returns an error if any layer fails to parse.
    pub fn try_load_from_path(path: &Path) -> Result<Self> {
        let file = (!path.as_os_str().is_empty()).then_some(path);
        let config: Self = Self::figment(file)
            .extract()
            .with_context(|| format!("Invalid configuration (file: {})", path.display()))?;
        log::debug!("Loaded configuration: {:?}", config);
        Ok(config.normalized())
    }

    fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(path) = path {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    /// Clamp values into their valid ranges.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.yield_every = self.yield_every.max(1);
        self.trace_capacity = self.trace_capacity.max(1);
        self.trace_threshold = self.trace_threshold.max(self.trace_capacity);
        self
    }

    /// Apply command-line flags on top of the loaded values.
    #[must_use]
    pub fn with_scan_args(mut self, args: &ScanArgs) -> Self {
        if let Some(criterion) = args.criterion {
            self.criterion = criterion;
        }
        if let Some(output) = args.output {
            self.output = output;
        }
        if let Some(n) = args.yield_every {
            self.yield_every = usize::try_from(n).unwrap_or(usize::MAX);
        }
        if args.skip_hidden {
            self.skip_hidden = true;
        }
        self.ignore_patterns
            .extend(args.ignore_patterns.iter().cloned());
        self.normalized()
    }

    /// Render as TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }

    /// Get the default platform-specific configuration path.
    #[must_use]
    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "dupescan", "dupescan")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }
}
