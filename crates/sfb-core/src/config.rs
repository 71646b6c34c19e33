//! Studio configuration
//!
//! Loaded from TOML; every field has a default so an empty file is valid.
//!
//! ```toml
//! base_dir = "./firmware"
//! target_file = "M5Stampfly/src/direction_sequence.hpp"
//!
//! [upload]
//! program = "pio"
//! args = ["run", "-t", "upload"]
//! working_dir = "./firmware/M5Stampfly"
//!
//! [simulator]
//! grid_size = 11
//! step_delay_ms = 1000
//! ```

use crate::error::StudioError;
use serde::{Deserialize, Serialize};
use sfb_sim::{GridConfig, SimulatorConfig};
use sfb_store::CommandUploader;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable overriding [`StudioConfig::base_dir`]
pub const BASE_DIR_ENV: &str = "WRITE_BASE_DIR";

/// Default target inside the base directory
pub const DEFAULT_TARGET_FILE: &str = "M5Stampfly/src/direction_sequence.hpp";

/// Studio configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudioConfig {
    /// Sandbox root for all reads and writes
    pub base_dir: PathBuf,
    /// Header patched by `deploy`, relative to `base_dir`
    pub target_file: String,
    /// Command run after a successful write
    pub upload: Option<UploadConfig>,
    pub simulator: SimulatorSettings,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("./firmware"),
            target_file: DEFAULT_TARGET_FILE.to_string(),
            upload: None,
            simulator: SimulatorSettings::default(),
        }
    }
}

impl StudioConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With base directory
    #[inline]
    #[must_use]
    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = base_dir.into();
        self
    }

    /// With target file
    #[inline]
    #[must_use]
    pub fn with_target_file(mut self, target: impl Into<String>) -> Self {
        self.target_file = target.into();
        self
    }

    /// With upload command
    #[inline]
    #[must_use]
    pub fn with_upload(mut self, upload: UploadConfig) -> Self {
        self.upload = Some(upload);
        self
    }

    /// With simulator settings
    #[inline]
    #[must_use]
    pub fn with_simulator(mut self, simulator: SimulatorSettings) -> Self {
        self.simulator = simulator;
        self
    }

    /// Parse TOML
    ///
    /// # Errors
    /// `StudioError::Config` if the text is not valid configuration
    pub fn from_toml_str(text: &str) -> Result<Self, StudioError> {
        toml::from_str(text).map_err(|e| StudioError::config(e.to_string()))
    }

    /// Read and parse a TOML file
    ///
    /// # Errors
    /// `StudioError::Config` if the file cannot be read or parsed
    pub fn load(path: &Path) -> Result<Self, StudioError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| StudioError::config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    /// Apply overrides from the process environment
    #[must_use]
    pub fn with_env(self) -> Self {
        self.with_env_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup`
    #[must_use]
    pub fn with_env_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(BASE_DIR_ENV).filter(|d| !d.trim().is_empty()) {
            tracing::debug!(base_dir = %dir, "base directory from environment");
            self.base_dir = PathBuf::from(dir);
        }
        self
    }

    /// Check the configuration is usable
    ///
    /// # Errors
    /// `StudioError::Config` describing the first problem found
    pub fn validate(&self) -> Result<(), StudioError> {
        if self.target_file.trim().is_empty() {
            return Err(StudioError::config("target_file must not be empty"));
        }
        if let Some(upload) = &self.upload {
            if upload.program.trim().is_empty() {
                return Err(StudioError::config("upload.program must not be empty"));
            }
        }
        self.simulator
            .grid()
            .validate()
            .map_err(|e| StudioError::config(e.to_string()))
    }
}

/// External command run after a write
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadConfig {
    pub program: String,
    /// `{path}` is replaced by the written file
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub working_dir: Option<PathBuf>,
}

impl UploadConfig {
    /// Build the uploader this configuration describes
    #[must_use]
    pub fn to_uploader(&self) -> CommandUploader {
        let uploader = CommandUploader::new(self.program.clone()).with_args(self.args.clone());
        match &self.working_dir {
            Some(dir) => uploader.with_working_dir(dir.clone()),
            None => uploader,
        }
    }
}

/// Grid and pacing of the preview
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorSettings {
    pub grid_size: u32,
    pub start_x: u32,
    pub start_y: u32,
    pub start_delay_ms: u64,
    pub step_delay_ms: u64,
    pub flip_duration_ms: u64,
}

impl Default for SimulatorSettings {
    fn default() -> Self {
        Self {
            grid_size: 11,
            start_x: 5,
            start_y: 5,
            start_delay_ms: 500,
            step_delay_ms: 1000,
            flip_duration_ms: 500,
        }
    }
}

impl SimulatorSettings {
    /// With per-step delay in milliseconds
    #[inline]
    #[must_use]
    pub fn with_step_delay_ms(mut self, ms: u64) -> Self {
        self.step_delay_ms = ms;
        self
    }

    /// Largest coordinate on either axis
    #[inline]
    #[must_use]
    pub fn grid_max(&self) -> u32 {
        self.grid().grid_max()
    }

    /// Grid part only
    #[must_use]
    pub fn grid(&self) -> GridConfig {
        GridConfig::square(self.grid_size).with_start(self.start_x, self.start_y)
    }

    /// Runtime configuration for the simulator
    #[must_use]
    pub fn to_simulator_config(&self) -> SimulatorConfig {
        SimulatorConfig::default()
            .with_grid(self.grid())
            .with_start_delay(Duration::from_millis(self.start_delay_ms))
            .with_step_delay(Duration::from_millis(self.step_delay_ms))
            .with_flip_duration(Duration::from_millis(self.flip_duration_ms))
    }
}
