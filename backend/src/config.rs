//! Analysis configuration file support.
//!
//! Settings are read from a TOML file (`timeslice.toml`) with every section
//! and field optional:
//!
//! ```toml
//! [density]
//! bin_count = 256
//! kernel_width = 2
//!
//! [suggestions]
//! bin_count = 50
//! debounce_ms = 400
//! sensitivity = "medium"
//! boundary_method = "peak"
//!
//! [suggestions.weights]
//! clarity = 0.4
//!
//! [adjustment]
//! min_duration_sec = 60
//! snap_mode = "fixed"
//! fixed_snap_preset_sec = 300
//!
//! [server]
//! port = 8080
//! ```
//!
//! `HOST` and `PORT` override the `[server]` section; `TIMESLICE_CONFIG`
//! points at an explicit file.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::algorithms::density::{DEFAULT_BIN_COUNT, DEFAULT_KERNEL_WIDTH};
use crate::algorithms::warp::DEFAULT_ANALYSIS_BINS;
use crate::algorithms::{ConfidenceWeights, DensityConfig, MIN_SLICE_DURATION_SEC};
use crate::models::{BoundaryMethod, Sensitivity, SnapMode, SnapUnit};

pub const CONFIG_FILE_NAME: &str = "timeslice.toml";
pub const CONFIG_PATH_ENV: &str = "TIMESLICE_CONFIG";

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("No {} found in standard locations", CONFIG_FILE_NAME)]
    NotFound,

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Complete configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub density: DensitySettings,
    pub suggestions: SuggestionSettings,
    pub adjustment: AdjustmentSettings,
    pub server: ServerSettings,
}

/// Global density map settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DensitySettings {
    #[serde(default = "default_density_bins")]
    pub bin_count: usize,
    #[serde(default = "default_kernel_width")]
    pub kernel_width: usize,
}

fn default_density_bins() -> usize {
    DEFAULT_BIN_COUNT
}

fn default_kernel_width() -> usize {
    DEFAULT_KERNEL_WIDTH
}

impl Default for DensitySettings {
    fn default() -> Self {
        Self {
            bin_count: default_density_bins(),
            kernel_width: default_kernel_width(),
        }
    }
}

impl DensitySettings {
    pub fn density_config(&self) -> DensityConfig {
        DensityConfig::new(self.bin_count, self.kernel_width)
    }
}

/// Suggestion generation defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionSettings {
    #[serde(default = "default_suggestion_bins")]
    pub bin_count: usize,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default)]
    pub sensitivity: Sensitivity,
    #[serde(default = "default_warp_count")]
    pub warp_count: usize,
    #[serde(default = "default_interval_count")]
    pub interval_count: usize,
    #[serde(default)]
    pub snap_to_unit: SnapUnit,
    #[serde(default)]
    pub boundary_method: BoundaryMethod,
    #[serde(default)]
    pub weights: ConfidenceWeights,
}

fn default_suggestion_bins() -> usize {
    DEFAULT_ANALYSIS_BINS
}

fn default_debounce_ms() -> u64 {
    400
}

fn default_warp_count() -> usize {
    3
}

fn default_interval_count() -> usize {
    5
}

impl Default for SuggestionSettings {
    fn default() -> Self {
        Self {
            bin_count: default_suggestion_bins(),
            debounce_ms: default_debounce_ms(),
            sensitivity: Sensitivity::default(),
            warp_count: default_warp_count(),
            interval_count: default_interval_count(),
            snap_to_unit: SnapUnit::default(),
            boundary_method: BoundaryMethod::default(),
            weights: ConfidenceWeights::default(),
        }
    }
}

impl SuggestionSettings {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// Boundary adjustment defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustmentSettings {
    #[serde(default = "default_min_duration")]
    pub min_duration_sec: f64,
    #[serde(default = "default_snap_enabled")]
    pub snap_enabled: bool,
    #[serde(default)]
    pub snap_mode: SnapMode,
    #[serde(default)]
    pub fixed_snap_preset_sec: Option<f64>,
}

fn default_min_duration() -> f64 {
    MIN_SLICE_DURATION_SEC
}

fn default_snap_enabled() -> bool {
    true
}

impl Default for AdjustmentSettings {
    fn default() -> Self {
        Self {
            min_duration_sec: default_min_duration(),
            snap_enabled: default_snap_enabled(),
            snap_mode: SnapMode::default(),
            fixed_snap_preset_sec: None,
        }
    }
}

/// Listen address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerSettings {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl AnalysisConfig {
    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: AnalysisConfig = toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: PathBuf::from("<inline>"),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let config: AnalysisConfig = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the default location.
    ///
    /// Searches for `timeslice.toml` in:
    /// 1. Current directory
    /// 2. `backend/` directory
    /// 3. Parent directory
    pub fn from_default_location() -> Result<Self, ConfigError> {
        let search_paths = [
            PathBuf::from(CONFIG_FILE_NAME),
            PathBuf::from("backend").join(CONFIG_FILE_NAME),
            PathBuf::from("..").join(CONFIG_FILE_NAME),
        ];

        for path in search_paths {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Err(ConfigError::NotFound)
    }

    /// Resolve the configuration for a process.
    ///
    /// `TIMESLICE_CONFIG` wins when set; otherwise the default locations are
    /// searched and built-in defaults are used when nothing is found. `HOST`
    /// and `PORT` are applied last.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::from_file(path)?,
            Err(_) => match Self::from_default_location() {
                Ok(config) => config,
                Err(ConfigError::NotFound) => {
                    log::info!("no {} found; using defaults", CONFIG_FILE_NAME);
                    Self::default()
                }
                Err(e) => return Err(e),
            },
        };
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Apply `HOST` / `PORT` environment overrides.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(host) = std::env::var("HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("PORT is not a valid port: {}", port)))?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.suggestions.warp_count > 3 {
            return Err(ConfigError::Invalid(format!(
                "suggestions.warp_count must be between 0 and 3, got {}",
                self.suggestions.warp_count
            )));
        }
        if !(self.adjustment.min_duration_sec.is_finite() && self.adjustment.min_duration_sec >= 0.0) {
            return Err(ConfigError::Invalid(
                "adjustment.min_duration_sec must be a non-negative number".to_string(),
            ));
        }
        if let Some(preset) = self.adjustment.fixed_snap_preset_sec {
            if !(preset.is_finite() && preset > 0.0) {
                return Err(ConfigError::Invalid(
                    "adjustment.fixed_snap_preset_sec must be positive".to_string(),
                ));
            }
        }
        Ok(())
    }
}
