//! Configuration system with YAML schema and validation.
//!
//! Implements Poka-Yoke (mistake-proofing) through:
//! - Type-safe configuration structs
//! - Schema validation via `validator`
//! - Runtime semantic validation
//!
//! Every field has a default, so an empty document reproduces the reference
//! experiment: a 50-element rod of 1 kg on planes tilted from `0.05π` to
//! `0.5π`, integrated for half a second at `dt = 1e-6`.

use serde::{Deserialize, Serialize};
use std::path::Path;
use validator::Validate;

use crate::engine::jidoka::JidokaConfig;
use crate::error::{SimError, SimResult};
use crate::report::ReportOptions;
use crate::scenarios::inclined_plane::{
    check_alpha_s, FrictionParams, ScenarioParams, DEFAULT_GRAVITY,
};
use crate::sweep::default_sweep;

/// Ratios `final_time / dt` within this relative distance of an integer
/// count as that integer.
const STEP_ROUNDING: f64 = 4.0 * f64::EPSILON;

/// Top-level validation configuration.
///
/// Loaded from YAML files with full schema validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct ValidationConfig {
    /// Schema version for forward compatibility.
    #[validate(length(min = 1))]
    #[serde(default = "default_schema_version")]
    pub schema_version: String,

    /// Rod geometry and material.
    #[validate(nested)]
    #[serde(default)]
    pub rod: ScenarioParams,

    /// Contact and friction.
    #[validate(nested)]
    #[serde(default)]
    pub friction: FrictionParams,

    /// Signed gravitational acceleration along `y` (m/s²).
    #[serde(default = "default_gravity")]
    pub gravity: f64,

    /// Time integration.
    #[validate(nested)]
    #[serde(default)]
    pub integration: IntegrationConfig,

    /// Inclination sweep.
    #[validate(nested)]
    #[serde(default)]
    pub sweep: SweepConfig,

    /// Jidoka (stop-on-error) configuration.
    #[serde(default)]
    pub jidoka: JidokaConfig,

    /// Output selection.
    #[serde(default)]
    pub report: ReportOptions,
}

fn default_schema_version() -> String {
    "1.0".to_string()
}

const fn default_gravity() -> f64 {
    DEFAULT_GRAVITY
}

impl ValidationConfig {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - YAML parsing fails
    /// - Validation fails
    pub fn load<P: AsRef<Path>>(path: P) -> SimResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML string.
    ///
    /// # Errors
    ///
    /// Returns error if parsing or validation fails.
    pub fn from_yaml(yaml: &str) -> SimResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.check()?;
        Ok(config)
    }

    /// Serialize to YAML.
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails.
    pub fn to_yaml(&self) -> SimResult<String> {
        serde_yaml::to_string(self).map_err(|e| SimError::serialization(e.to_string()))
    }

    /// Create a builder for configuration.
    #[must_use]
    pub fn builder() -> ValidationConfigBuilder {
        ValidationConfigBuilder::default()
    }

    /// Run schema and semantic validation.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint.
    pub fn check(&self) -> SimResult<()> {
        self.validate()?;
        self.validate_semantic()
    }

    /// Validate semantic constraints beyond schema.
    fn validate_semantic(&self) -> SimResult<()> {
        self.rod.check()?;
        self.friction.check()?;

        if !self.gravity.is_finite() {
            return Err(SimError::config("gravity must be finite"));
        }

        self.integration.total_steps()?;

        for alpha_s in &self.sweep.alpha_s {
            check_alpha_s(*alpha_s)?;
        }
        if self.sweep.workers == Some(0) {
            return Err(SimError::config("sweep.workers must be at least 1"));
        }

        if self.jidoka.check_finite && self.jidoka.check_interval == 0 {
            return Err(SimError::config(
                "jidoka.check_interval must be positive when check_finite is set",
            ));
        }

        Ok(())
    }

    /// Worker count for the sweep: the configured value, or the available
    /// parallelism.
    #[must_use]
    pub fn workers(&self) -> usize {
        self.sweep.workers.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(std::num::NonZeroUsize::get)
                .unwrap_or(1)
        })
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            rod: ScenarioParams::default(),
            friction: FrictionParams::default(),
            gravity: DEFAULT_GRAVITY,
            integration: IntegrationConfig::default(),
            sweep: SweepConfig::default(),
            jidoka: JidokaConfig::default(),
            report: ReportOptions::default(),
        }
    }
}

/// Configuration builder for programmatic construction.
#[derive(Debug, Default)]
pub struct ValidationConfigBuilder {
    rod: Option<ScenarioParams>,
    friction: Option<FrictionParams>,
    gravity: Option<f64>,
    final_time: Option<f64>,
    dt: Option<f64>,
    snapshots: Option<usize>,
    alpha_s: Option<Vec<f64>>,
    workers: Option<usize>,
    jidoka: Option<JidokaConfig>,
    report: Option<ReportOptions>,
}

impl ValidationConfigBuilder {
    /// Set the rod parameters.
    #[must_use]
    pub fn rod(mut self, rod: ScenarioParams) -> Self {
        self.rod = Some(rod);
        self
    }

    /// Set the friction parameters.
    #[must_use]
    pub fn friction(mut self, friction: FrictionParams) -> Self {
        self.friction = Some(friction);
        self
    }

    /// Set the signed gravitational acceleration.
    #[must_use]
    pub const fn gravity(mut self, gravity: f64) -> Self {
        self.gravity = Some(gravity);
        self
    }

    /// Set the final simulation time in seconds.
    #[must_use]
    pub const fn final_time(mut self, final_time: f64) -> Self {
        self.final_time = Some(final_time);
        self
    }

    /// Set the timestep in seconds.
    #[must_use]
    pub const fn dt(mut self, dt: f64) -> Self {
        self.dt = Some(dt);
        self
    }

    /// Set the number of recorded snapshots.
    #[must_use]
    pub const fn snapshots(mut self, snapshots: usize) -> Self {
        self.snapshots = Some(snapshots);
        self
    }

    /// Set the sweep values.
    #[must_use]
    pub fn alpha_s(mut self, alpha_s: Vec<f64>) -> Self {
        self.alpha_s = Some(alpha_s);
        self
    }

    /// Set the worker count.
    #[must_use]
    pub const fn workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    /// Set Jidoka configuration.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // JidokaConfig doesn't impl Copy
    pub fn jidoka(mut self, config: JidokaConfig) -> Self {
        self.jidoka = Some(config);
        self
    }

    /// Set output options.
    #[must_use]
    pub fn report(mut self, report: ReportOptions) -> Self {
        self.report = Some(report);
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> ValidationConfig {
        let mut config = ValidationConfig::default();

        if let Some(rod) = self.rod {
            config.rod = rod;
        }
        if let Some(friction) = self.friction {
            config.friction = friction;
        }
        if let Some(gravity) = self.gravity {
            config.gravity = gravity;
        }
        if let Some(final_time) = self.final_time {
            config.integration.final_time = final_time;
        }
        if let Some(dt) = self.dt {
            config.integration.dt = dt;
        }
        if let Some(snapshots) = self.snapshots {
            config.integration.snapshots = snapshots;
        }
        if let Some(alpha_s) = self.alpha_s {
            config.sweep.alpha_s = alpha_s;
        }
        if self.workers.is_some() {
            config.sweep.workers = self.workers;
        }
        if let Some(jidoka) = self.jidoka {
            config.jidoka = jidoka;
        }
        if let Some(report) = self.report {
            config.report = report;
        }

        config
    }
}

/// Fixed-step integration settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct IntegrationConfig {
    /// Simulated time span (s).
    #[serde(default = "default_final_time")]
    pub final_time: f64,
    /// Timestep (s).
    #[serde(default = "default_dt")]
    pub dt: f64,
    /// Upper bound on recorded snapshots per run (0 keeps only the initial
    /// and final states).
    #[serde(default = "default_snapshots")]
    pub snapshots: usize,
}

const fn default_final_time() -> f64 {
    0.5
}

const fn default_dt() -> f64 {
    1e-6
}

const fn default_snapshots() -> usize {
    1000
}

impl Default for IntegrationConfig {
    fn default() -> Self {
        Self {
            final_time: default_final_time(),
            dt: default_dt(),
            snapshots: default_snapshots(),
        }
    }
}

impl IntegrationConfig {
    /// Number of fixed steps, `trunc(final_time / dt)`.
    ///
    /// # Errors
    ///
    /// Returns `SimError::DegenerateSweep` if either time is non-positive or
    /// non-finite, or if fewer than one step fits.
    pub fn total_steps(&self) -> SimResult<usize> {
        let degenerate = SimError::DegenerateSweep {
            final_time: self.final_time,
            dt: self.dt,
        };
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if !(valid(self.final_time) && valid(self.dt)) {
            return Err(degenerate);
        }
        let ratio = self.final_time / self.dt;
        let steps = (ratio * (1.0 + STEP_ROUNDING)).trunc();
        if !(steps >= 1.0 && steps < usize::MAX as f64) {
            return Err(degenerate);
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let steps = steps as usize;
        Ok(steps)
    }

    /// Snapshot cadence in steps for a run of `total_steps`.
    #[must_use]
    pub const fn save_every(&self, total_steps: usize) -> usize {
        if self.snapshots == 0 {
            0
        } else if total_steps <= self.snapshots {
            1
        } else {
            total_steps / self.snapshots
        }
    }
}

/// Inclination sweep settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct SweepConfig {
    /// Sweep values, `α = alpha_s·π`.
    #[validate(length(min = 1))]
    #[serde(default = "default_sweep")]
    pub alpha_s: Vec<f64>,
    /// Worker threads (defaults to available parallelism).
    #[serde(default)]
    pub workers: Option<usize>,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            alpha_s: default_sweep(),
            workers: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = ValidationConfig::default();

        assert_eq!(config.schema_version, "1.0");
        assert_eq!(config.rod.n_elements, 50);
        assert!((config.gravity + 9.80665).abs() < f64::EPSILON);
        assert!((config.integration.dt - 1e-6).abs() < f64::EPSILON);
        assert_eq!(config.integration.total_steps().ok(), Some(500_000));
        assert_eq!(config.sweep.alpha_s.len(), 14);
        assert!(config.check().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = ValidationConfig::builder()
            .final_time(0.1)
            .dt(1e-4)
            .alpha_s(vec![0.1, 0.2])
            .workers(2)
            .build();

        assert_eq!(config.integration.total_steps().ok(), Some(1000));
        assert_eq!(config.sweep.alpha_s, vec![0.1, 0.2]);
        assert_eq!(config.workers(), 2);
    }

    #[test]
    fn test_config_yaml_parse() {
        let yaml = r"
rod:
  n_elements: 10
friction:
  static_mu: [0.5, 0.5, 0.5]
integration:
  final_time: 0.2
sweep:
  alpha_s: [0.05, 0.1]
  workers: 4
";
        let config = ValidationConfig::from_yaml(yaml);
        assert!(config.is_ok());

        let config = config.ok();
        assert_eq!(config.as_ref().map(|c| c.rod.n_elements), Some(10));
        assert_eq!(config.as_ref().map(|c| c.friction.static_mu[2]), Some(0.5));
        assert_eq!(config.as_ref().map(|c| c.sweep.workers), Some(Some(4)));
        assert_eq!(config.as_ref().map(|c| c.rod.base_radius), Some(0.025));
    }

    #[test]
    fn test_empty_yaml_is_reference_case() {
        let config = ValidationConfig::from_yaml("{}");
        assert_eq!(config.ok(), Some(ValidationConfig::default()));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let config = ValidationConfig::from_yaml("rod:\n  colour: red\n");
        assert!(matches!(config, Err(SimError::YamlParse(_))));
    }

    #[test]
    fn test_alpha_s_out_of_range_rejected() {
        let config = ValidationConfig::from_yaml("sweep:\n  alpha_s: [0.1, 0.75]\n");
        assert!(config.is_err());
    }

    #[test]
    fn test_empty_sweep_rejected() {
        let config = ValidationConfig::from_yaml("sweep:\n  alpha_s: []\n");
        assert!(matches!(config, Err(SimError::Validation(_))));
    }

    #[test]
    fn test_zero_workers_rejected() {
        let config = ValidationConfig::builder().workers(0).build();
        assert!(config.check().is_err());
    }

    #[test]
    fn test_degenerate_integration_rejected() {
        let config = ValidationConfig::builder().final_time(1e-7).build();
        assert!(matches!(
            config.check(),
            Err(SimError::DegenerateSweep { .. })
        ));
    }

    #[test]
    fn test_total_steps_tolerates_rounding() {
        let integration = IntegrationConfig {
            final_time: 0.01,
            dt: 1e-5,
            snapshots: 10,
        };
        assert_eq!(integration.total_steps().ok(), Some(1000));
        assert_eq!(integration.save_every(1000), 100);
    }

    #[test]
    fn test_total_steps_truncates() {
        let integration = IntegrationConfig {
            final_time: 0.5,
            dt: 0.3,
            snapshots: 0,
        };
        assert_eq!(integration.total_steps().ok(), Some(1));
        assert_eq!(integration.save_every(1), 0);
    }

    #[test]
    fn test_save_every_bounds() {
        let integration = IntegrationConfig::default();
        assert_eq!(integration.save_every(500_000), 500);
        assert_eq!(integration.save_every(10), 1);
    }

    #[test]
    fn test_yaml_roundtrip() {
        let config = ValidationConfig::default();
        let yaml = config.to_yaml().unwrap();
        let parsed = ValidationConfig::from_yaml(&yaml).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("case.yaml");
        std::fs::write(&path, "gravity: -9.81\n").unwrap();
        let config = ValidationConfig::load(&path).unwrap();
        assert!((config.gravity + 9.81).abs() < f64::EPSILON);

        let missing = ValidationConfig::load(dir.path().join("missing.yaml"));
        assert!(matches!(missing, Err(SimError::Io(_))));
    }
}
