//! Engine settings for resflow
//!
//! Settings are read from a small YAML document:
//!
//! ```yaml
//! wait:
//!   max_retries: 60
//!   initial_delay_ms: 500
//!   max_delay_ms: 10000
//!   multiplier: 1.5
//! ```
//!
//! Every field is optional. Missing values fall back to the defaults below.

pub mod error;

pub use error::*;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable that points directly at a settings file
pub const CONFIG_PATH_ENV: &str = "RESFLOW_CONFIG_PATH";

const CANDIDATES: [&str; 2] = ["resflow.local.yaml", "resflow.yaml"];
const PROJECT_DIR: &str = ".resflow";
const GLOBAL_FILE: &str = "resflow.yaml";

/// Settings shared by every orchestration call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Task wait policy used by asynchronous creation
    #[serde(default)]
    pub wait: WaitConfig,
}

impl EngineSettings {
    /// Load settings from an explicit path
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let settings: EngineSettings =
            serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject values that would make the wait loop meaningless
    pub fn validate(&self) -> Result<()> {
        if self.wait.max_retries == 0 {
            return Err(ConfigError::Invalid(
                "wait.max_retries must be at least 1".to_string(),
            ));
        }
        if self.wait.multiplier < 1.0 {
            return Err(ConfigError::Invalid(format!(
                "wait.multiplier must be >= 1.0 (got {})",
                self.wait.multiplier
            )));
        }
        if self.wait.initial_delay_ms > self.wait.max_delay_ms {
            return Err(ConfigError::Invalid(format!(
                "wait.initial_delay_ms ({}) exceeds wait.max_delay_ms ({})",
                self.wait.initial_delay_ms, self.wait.max_delay_ms
            )));
        }
        Ok(())
    }
}

/// Polling policy for long-running remote tasks (exponential backoff)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaitConfig {
    /// Maximum number of status polls
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Delay before the second poll (milliseconds)
    #[serde(default = "default_initial_delay")]
    pub initial_delay_ms: u64,
    /// Upper bound for a single delay (milliseconds)
    #[serde(default = "default_max_delay")]
    pub max_delay_ms: u64,
    /// Exponential multiplier
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
}

fn default_max_retries() -> u32 {
    120
}
fn default_initial_delay() -> u64 {
    1000
}
fn default_max_delay() -> u64 {
    15000
}
fn default_multiplier() -> f64 {
    1.5
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_delay_ms: default_initial_delay(),
            max_delay_ms: default_max_delay(),
            multiplier: default_multiplier(),
        }
    }
}

impl WaitConfig {
    /// Delay after the given (0-based) attempt, capped at `max_delay_ms`
    pub fn delay_for_attempt(&self, attempt: u32) -> u64 {
        let delay = self.initial_delay_ms as f64 * self.multiplier.powi(attempt as i32);
        (delay as u64).min(self.max_delay_ms)
    }
}

/// resflow's global config directory (`~/.config/resflow`)
///
/// Only computes the path; the directory may not exist.
pub fn get_config_dir() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .ok_or(ConfigError::ConfigDirNotFound)?
        .join("resflow"))
}

/// Locate the settings file
///
/// Search order:
/// 1. `RESFLOW_CONFIG_PATH`
/// 2. current directory: resflow.local.yaml, resflow.yaml
/// 3. `./.resflow/` with the same names
/// 4. `~/.config/resflow/resflow.yaml`
pub fn find_settings_file() -> Result<PathBuf> {
    if let Ok(config_path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Ok(path);
        }
    }

    let current_dir = std::env::current_dir()?;

    for filename in &CANDIDATES {
        let path = current_dir.join(filename);
        if path.exists() {
            return Ok(path);
        }
    }

    let project_dir = current_dir.join(PROJECT_DIR);
    if project_dir.is_dir() {
        for filename in &CANDIDATES {
            let path = project_dir.join(filename);
            if path.exists() {
                return Ok(path);
            }
        }
    }

    if let Ok(config_dir) = get_config_dir() {
        let global = config_dir.join(GLOBAL_FILE);
        if global.exists() {
            return Ok(global);
        }
    }

    Err(ConfigError::SettingsFileNotFound)
}

/// Load settings from the discovered file, or defaults when there is none
pub fn load_settings() -> Result<EngineSettings> {
    match find_settings_file() {
        Ok(path) => EngineSettings::from_path(path),
        Err(ConfigError::SettingsFileNotFound) => Ok(EngineSettings::default()),
        Err(e) => Err(e),
    }
}
