//! Configuration loading and typed config structures for the coherence
//! platform.
//!
//! The configuration lives in `coherence-config.yaml` in the working
//! directory. Every section and field is optional; missing values fall back
//! to the defaults documented on each field.

use std::path::{Path, PathBuf};

use coherence_types::InitialVitals;
use coherence_types::constants::{COHERENCE_MIN, DEFAULT_ENTROPY, PHI_THRESHOLD};
use serde::Deserialize;

use crate::engine::DEFAULT_DT;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value parsed but is outside its allowed range.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level platform configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PlatformConfig {
    /// Directory layout.
    #[serde(default)]
    pub paths: PathsConfig,

    /// Evolution loop parameters.
    #[serde(default)]
    pub evolution: EvolutionConfig,

    /// Scalars organisms are admitted with.
    #[serde(default)]
    pub admission: AdmissionConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl PlatformConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override path values afterwards:
    /// - `COHERENCE_ROOT` overrides `paths.root`
    /// - `COHERENCE_UPLOADS` overrides `paths.uploads`
    /// - `COHERENCE_CORPUS` overrides `paths.corpus`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&contents)?;
        config.paths.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a YAML string. No environment overrides
    /// are applied.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::InvalidConfig`] if a numeric value is out of range.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check numeric values the evolution step relies on.
    ///
    /// Every value must be finite. Entropy and consciousness must also be
    /// non-negative.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidConfig`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let admission = &self.admission;
        require_finite("evolution.dt", self.evolution.dt)?;
        require_finite("admission.initial_coherence", admission.initial_coherence)?;
        require_non_negative("admission.initial_entropy", admission.initial_entropy)?;
        require_non_negative(
            "admission.initial_consciousness",
            admission.initial_consciousness,
        )?;
        Ok(())
    }
}

fn require_finite(field: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::InvalidConfig {
            reason: format!("{field} must be finite, got {value}"),
        })
    }
}

fn require_non_negative(field: &str, value: f64) -> Result<(), ConfigError> {
    require_finite(field, value)?;
    if value < 0.0 {
        return Err(ConfigError::InvalidConfig {
            reason: format!("{field} must be non-negative, got {value}"),
        });
    }
    Ok(())
}

/// Directory layout. Relative directories resolve against `root`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PathsConfig {
    /// Platform root (default: `$HOME/coherence-platform`).
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Organism sources, `*.dna` (default: `organisms`).
    #[serde(default = "default_organisms")]
    pub organisms: PathBuf,

    /// Workload archive (default: `workloads`).
    #[serde(default = "default_workloads")]
    pub workloads: PathBuf,

    /// Per-channel log files (default: `logs`).
    #[serde(default = "default_logs")]
    pub logs: PathBuf,

    /// Exported reports (default: `output`).
    #[serde(default = "default_output")]
    pub output: PathBuf,

    /// Imported scripts and notes (default: `sdk`).
    #[serde(default = "default_sdk")]
    pub sdk: PathBuf,

    /// Optional upload directory imported at startup.
    #[serde(default)]
    pub uploads: Option<PathBuf>,

    /// Optional job corpus scanned at startup.
    #[serde(default)]
    pub corpus: Option<PathBuf>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            organisms: default_organisms(),
            workloads: default_workloads(),
            logs: default_logs(),
            output: default_output(),
            sdk: default_sdk(),
            uploads: None,
            corpus: None,
        }
    }
}

impl PathsConfig {
    /// Apply environment variable overrides for path values.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("COHERENCE_ROOT") {
            self.root = PathBuf::from(val);
        }
        if let Ok(val) = std::env::var("COHERENCE_UPLOADS") {
            self.uploads = Some(PathBuf::from(val));
        }
        if let Ok(val) = std::env::var("COHERENCE_CORPUS") {
            self.corpus = Some(PathBuf::from(val));
        }
    }

    /// Resolve a configured directory against the root.
    pub fn resolve(&self, dir: &Path) -> PathBuf {
        self.root.join(dir)
    }

    /// Organism source directory.
    pub fn organisms_dir(&self) -> PathBuf {
        self.resolve(&self.organisms)
    }

    /// Workload archive directory.
    pub fn workloads_dir(&self) -> PathBuf {
        self.resolve(&self.workloads)
    }

    /// Log directory.
    pub fn logs_dir(&self) -> PathBuf {
        self.resolve(&self.logs)
    }

    /// Report output directory.
    pub fn output_dir(&self) -> PathBuf {
        self.resolve(&self.output)
    }

    /// Script and note directory.
    pub fn sdk_dir(&self) -> PathBuf {
        self.resolve(&self.sdk)
    }

    /// Every directory the platform creates at startup.
    pub fn platform_dirs(&self) -> [PathBuf; 6] {
        [
            self.root.clone(),
            self.organisms_dir(),
            self.workloads_dir(),
            self.logs_dir(),
            self.output_dir(),
            self.sdk_dir(),
        ]
    }
}

/// Evolution loop parameters.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct EvolutionConfig {
    /// Iterations of step-all-then-normalize (default: 20).
    #[serde(default = "default_iterations")]
    pub iterations: u64,

    /// Time increment per step (default: 0.1).
    #[serde(default = "default_dt")]
    pub dt: f64,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            iterations: default_iterations(),
            dt: default_dt(),
        }
    }
}

/// Scalars organisms are admitted with, before repair.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct AdmissionConfig {
    /// Starting coherence (default: 0.97). Values below the minimum are
    /// repaired on admission.
    #[serde(default = "default_initial_coherence")]
    pub initial_coherence: f64,

    /// Starting entropy (default: 0.03).
    #[serde(default = "default_initial_entropy")]
    pub initial_entropy: f64,

    /// Starting consciousness level (default: 7.6901).
    #[serde(default = "default_initial_consciousness")]
    pub initial_consciousness: f64,
}

impl Default for AdmissionConfig {
    fn default() -> Self {
        Self {
            initial_coherence: default_initial_coherence(),
            initial_entropy: default_initial_entropy(),
            initial_consciousness: default_initial_consciousness(),
        }
    }
}

impl AdmissionConfig {
    /// The vitals every admitted organism starts from.
    pub const fn initial_vitals(&self) -> InitialVitals {
        InitialVitals {
            coherence: self.initial_coherence,
            entropy: self.initial_entropy,
            consciousness: self.initial_consciousness,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset (default: `info`).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines on stdout instead of human-readable text.
    #[serde(default)]
    pub json: bool,

    /// Also write one plain-text file per notice channel (default: true).
    #[serde(default = "default_true")]
    pub channel_files: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
            channel_files: true,
        }
    }
}

fn default_root() -> PathBuf {
    std::env::var_os("HOME")
        .map_or_else(|| PathBuf::from("."), PathBuf::from)
        .join("coherence-platform")
}

fn default_organisms() -> PathBuf {
    PathBuf::from("organisms")
}

fn default_workloads() -> PathBuf {
    PathBuf::from("workloads")
}

fn default_logs() -> PathBuf {
    PathBuf::from("logs")
}

fn default_output() -> PathBuf {
    PathBuf::from("output")
}

fn default_sdk() -> PathBuf {
    PathBuf::from("sdk")
}

const fn default_iterations() -> u64 {
    20
}

const fn default_dt() -> f64 {
    DEFAULT_DT
}

const fn default_initial_coherence() -> f64 {
    COHERENCE_MIN
}

const fn default_initial_entropy() -> f64 {
    DEFAULT_ENTROPY
}

const fn default_initial_consciousness() -> f64 {
    PHI_THRESHOLD
}

fn default_log_level() -> String {
    "info".to_owned()
}

const fn default_true() -> bool {
    true
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = PlatformConfig::default();
        assert_eq!(config.evolution.iterations, 20);
        assert_eq!(config.evolution.dt, 0.1);
        assert_eq!(config.admission.initial_coherence, 0.97);
        assert_eq!(config.admission.initial_entropy, 0.03);
        assert_eq!(config.logging.level, "info");
        assert!(config.logging.channel_files);
        assert!(config.paths.root.ends_with("coherence-platform"));
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r"
paths:
  root: /srv/coherence
  organisms: dna
  uploads: /mnt/uploads
evolution:
  iterations: 5
  dt: 0.25
admission:
  initial_coherence: 0.9
logging:
  level: debug
  json: true
  channel_files: false
";
        let config = PlatformConfig::parse(yaml).unwrap();
        assert_eq!(config.paths.root, PathBuf::from("/srv/coherence"));
        assert_eq!(config.paths.organisms_dir(), PathBuf::from("/srv/coherence/dna"));
        assert_eq!(config.paths.output_dir(), PathBuf::from("/srv/coherence/output"));
        assert_eq!(config.paths.uploads, Some(PathBuf::from("/mnt/uploads")));
        assert!(config.paths.corpus.is_none());
        assert_eq!(config.evolution.iterations, 5);
        assert_eq!(config.evolution.dt, 0.25);
        assert_eq!(config.admission.initial_coherence, 0.9);
        assert_eq!(config.admission.initial_entropy, 0.03);
        assert!(config.logging.json);
        assert!(!config.logging.channel_files);
    }

    #[test]
    fn empty_yaml_uses_defaults() {
        let config = PlatformConfig::parse("{}").unwrap();
        assert_eq!(config.evolution, EvolutionConfig::default());
        assert_eq!(config.admission, AdmissionConfig::default());
    }

    #[test]
    fn invalid_yaml_is_an_error() {
        let result = PlatformConfig::parse("evolution: [not, a, map");
        assert!(matches!(result, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn missing_file_is_io_error() {
        let result = PlatformConfig::from_file(Path::new("/definitely/not/here.yaml"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn admission_maps_to_initial_vitals() {
        let admission = AdmissionConfig {
            initial_coherence: 0.5,
            initial_entropy: 0.2,
            initial_consciousness: 1.0,
        };
        let vitals = admission.initial_vitals();
        assert_eq!(vitals.coherence, 0.5);
        assert_eq!(vitals.entropy, 0.2);
        assert_eq!(vitals.consciousness, 1.0);
    }

    #[test]
    fn non_finite_vitals_are_rejected() {
        for yaml in [
            "admission:\n  initial_consciousness: .nan\n",
            "admission:\n  initial_coherence: .inf\n",
            "admission:\n  initial_entropy: -.inf\n",
            "evolution:\n  dt: .nan\n",
        ] {
            let result = PlatformConfig::parse(yaml);
            assert!(
                matches!(result, Err(ConfigError::InvalidConfig { .. })),
                "accepted {yaml:?}"
            );
        }
    }

    #[test]
    fn negative_entropy_and_consciousness_are_rejected() {
        let entropy = PlatformConfig::parse("admission:\n  initial_entropy: -1\n");
        assert!(matches!(entropy, Err(ConfigError::InvalidConfig { .. })));
        let consciousness = PlatformConfig::parse("admission:\n  initial_consciousness: -0.5\n");
        assert!(matches!(consciousness, Err(ConfigError::InvalidConfig { .. })));
    }

    #[test]
    fn zero_entropy_and_low_coherence_are_accepted() {
        let config =
            PlatformConfig::parse("admission:\n  initial_entropy: 0\n  initial_coherence: 0.2\n")
                .unwrap();
        assert_eq!(config.admission.initial_entropy, 0.0);
        assert_eq!(config.admission.initial_coherence, 0.2);
    }
}
