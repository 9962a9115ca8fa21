// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Configuration management.
//!
//! Configuration is loaded from multiple sources with the following priority
//! (later sources override earlier ones):
//!
//! 1. Built-in defaults
//! 2. config.yaml file
//! 3. Environment variables (QUBITOS_*)
//! 4. CLI arguments

use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

use crate::error::{Error, Result};
use crate::plot::Colormap;

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Solver settings
    #[serde(default)]
    pub solver: SolverConfig,

    /// Plot settings
    #[serde(default)]
    pub plot: PlotConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Validation settings
    #[serde(default)]
    pub validation: ValidationConfig,
}

impl Config {
    /// Load configuration from file and environment.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut config = Config::default();

        if let Some(path) = config_path {
            if path.exists() {
                let content = std::fs::read_to_string(path)?;
                config = serde_yaml::from_str(&content)?;
            }
        } else {
            for path in &["config.yaml", "config.yml", "/etc/qubitos/experiment.yaml"] {
                let path = Path::new(path);
                if path.exists() {
                    let content = std::fs::read_to_string(path)?;
                    config = serde_yaml::from_str(&content)?;
                    break;
                }
            }
        }

        config.apply_env_overrides();

        Ok(config)
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = env::var("QUBITOS_LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Ok(val) = env::var("QUBITOS_LOG_FORMAT") {
            self.logging.format = val;
        }
        if let Ok(val) = env::var("QUBITOS_SOLVER_MAX_STEP") {
            if let Ok(step) = val.parse() {
                self.solver.max_step = step;
            }
        }
        if let Ok(val) = env::var("QUBITOS_SOLVER_EXACT_UNITARY") {
            self.solver.exact_unitary = val.to_lowercase() == "true" || val == "1";
        }
        if let Ok(val) = env::var("QUBITOS_PLOT_COLORMAP") {
            self.plot.colormap = val;
        }
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<()> {
        if !(self.solver.max_step.is_finite() && self.solver.max_step > 0.0) {
            return Err(Error::Config(format!(
                "solver.max_step must be > 0, got {}",
                self.solver.max_step
            )));
        }
        if self.plot.width == 0 || self.plot.height == 0 {
            return Err(Error::Config("plot size cannot be 0".into()));
        }
        if self.plot.panel_columns == 0 {
            return Err(Error::Config("plot.panel_columns cannot be 0".into()));
        }
        if let Err(e) = Colormap::by_name(&self.plot.colormap) {
            return Err(Error::Config(format!("plot.colormap: {}", e)));
        }
        if !matches!(self.logging.format.as_str(), "json" | "pretty") {
            return Err(Error::Config(format!(
                "logging.format must be 'json' or 'pretty', got '{}'",
                self.logging.format
            )));
        }
        if self.solver.max_step > 1.0 {
            tracing::warn!(
                max_step = self.solver.max_step,
                "Large solver step; RK4 may under-resolve fast dynamics"
            );
        }
        Ok(())
    }
}

/// Solver configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Largest RK4 substep between two sample times
    #[serde(default = "default_max_step")]
    pub max_step: f64,

    /// Use exp(−iH dt) for constant closed-system segments
    #[serde(default = "default_true")]
    pub exact_unitary: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_step: default_max_step(),
            exact_unitary: true,
        }
    }
}

fn default_max_step() -> f64 {
    1e-2
}

fn default_true() -> bool {
    true
}

/// Plot configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlotConfig {
    /// Figure width in pixels
    #[serde(default = "default_width")]
    pub width: u32,

    /// Figure height in pixels
    #[serde(default = "default_height")]
    pub height: u32,

    /// Colormap for image panels
    #[serde(default = "default_colormap")]
    pub colormap: String,

    /// Image panels per grid row
    #[serde(default = "default_panel_columns")]
    pub panel_columns: usize,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            colormap: default_colormap(),
            panel_columns: default_panel_columns(),
        }
    }
}

fn default_width() -> u32 {
    1000
}

fn default_height() -> u32 {
    600
}

fn default_colormap() -> String {
    "viridis".into()
}

fn default_panel_columns() -> usize {
    3
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (json, pretty)
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> String {
    "pretty".into()
}

/// Validation configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Resource limits
    #[serde(default)]
    pub limits: ResourceLimits,
}

/// Resource limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceLimits {
    /// Maximum Hilbert space dimension
    #[serde(default = "default_max_hilbert_dim")]
    pub max_hilbert_dim: u32,

    /// Maximum number of segments per experiment
    #[serde(default = "default_max_segments")]
    pub max_segments: u32,

    /// Maximum sample points per segment
    #[serde(default = "default_max_points_per_segment")]
    pub max_points_per_segment: u32,
}

impl Default for ResourceLimits {
    fn default() -> Self {
        Self {
            max_hilbert_dim: default_max_hilbert_dim(),
            max_segments: default_max_segments(),
            max_points_per_segment: default_max_points_per_segment(),
        }
    }
}

fn default_max_hilbert_dim() -> u32 {
    64
}

fn default_max_segments() -> u32 {
    1_000
}

fn default_max_points_per_segment() -> u32 {
    100_000
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.solver.max_step, 1e-2);
        assert!(config.solver.exact_unitary);
        assert_eq!(config.plot.colormap, "viridis");
        assert_eq!(config.plot.panel_columns, 3);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_config_validation() {
        let config = Config::default();
        assert!(config.validate().is_ok());

        let mut bad = Config::default();
        bad.solver.max_step = 0.0;
        assert!(bad.validate().is_err());

        let mut bad = Config::default();
        bad.plot.panel_columns = 0;
        assert!(bad.validate().is_err());

        let mut bad = Config::default();
        bad.plot.colormap = "rainbow".into();
        assert!(bad.validate().is_err());

        let mut bad = Config::default();
        bad.logging.format = "xml".into();
        let msg = bad.validate().unwrap_err().to_string();
        assert!(msg.contains("logging.format"));
    }

    #[test]
    fn test_config_load_from_file() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            f,
            r#"
plot:
  width: 800
  panel_columns: 2
validation:
  limits:
    max_segments: 4
"#
        )
        .unwrap();

        let config = Config::load(Some(f.path())).unwrap();
        assert_eq!(config.plot.width, 800);
        assert_eq!(config.plot.panel_columns, 2);
        assert_eq!(config.validation.limits.max_segments, 4);
        // Unspecified fields keep their defaults
        assert_eq!(config.plot.height, 600);
        assert_eq!(config.validation.limits.max_hilbert_dim, 64);
    }

    #[test]
    fn test_config_load_nonexistent_file() {
        let path = std::path::Path::new("/tmp/does_not_exist_qubitos_experiment.yaml");
        let config = Config::load(Some(path)).unwrap();
        assert_eq!(config.plot.height, 600);
    }

    #[test]
    fn test_config_load_invalid_yaml() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "{{{{not: valid: yaml::::").unwrap();
        assert!(Config::load(Some(f.path())).is_err());
    }

    #[test]
    fn test_env_override_max_step() {
        let mut config = Config::default();
        std::env::set_var("QUBITOS_SOLVER_MAX_STEP", "0.5");
        config.apply_env_overrides();
        assert_eq!(config.solver.max_step, 0.5);
        std::env::remove_var("QUBITOS_SOLVER_MAX_STEP");
    }

    #[test]
    fn test_env_override_exact_unitary() {
        let mut config = Config::default();
        std::env::set_var("QUBITOS_SOLVER_EXACT_UNITARY", "false");
        config.apply_env_overrides();
        assert!(!config.solver.exact_unitary);
        std::env::remove_var("QUBITOS_SOLVER_EXACT_UNITARY");
    }

    #[test]
    fn test_env_override_colormap() {
        let mut config = Config::default();
        std::env::set_var("QUBITOS_PLOT_COLORMAP", "jet");
        config.apply_env_overrides();
        assert_eq!(config.plot.colormap, "jet");
        std::env::remove_var("QUBITOS_PLOT_COLORMAP");
    }

    #[test]
    fn test_resource_limits_defaults() {
        let limits = ResourceLimits::default();
        assert_eq!(limits.max_hilbert_dim, 64);
        assert_eq!(limits.max_segments, 1_000);
        assert_eq!(limits.max_points_per_segment, 100_000);
    }
}
