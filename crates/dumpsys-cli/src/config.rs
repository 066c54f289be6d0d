//! Configuration file handling for dumpsys

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{ensure, Context, Result};
use dumpsys_engine::{DumpOptions, SkipPolicy, DEFAULT_TIMEOUT};
use dumpsys_socket::{SocketRegistryConfig, DEFAULT_HARDWARE_DIR, DEFAULT_SERVICES_DIR};
use serde::{Deserialize, Serialize};

/// Contents of `config.toml`; every field is optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Per-service timeout in seconds
    pub timeout_secs: Option<u64>,
    /// "annotate" (default) or "suppress"
    pub skip_policy: Option<SkipPolicy>,
    pub services_dir: Option<PathBuf>,
    pub hardware_dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the default config file
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Get the default config file path
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join("dumpsys");

        Ok(config_dir.join("config.toml"))
    }

    /// Merge CLI arguments over config file values
    pub fn merge_with_args(
        &self,
        timeout_secs: Option<u64>,
        services_dir: Option<&Path>,
        hardware_dir: Option<&Path>,
    ) -> Result<MergedConfig> {
        let timeout = match timeout_secs.or(self.timeout_secs) {
            Some(secs) => {
                ensure!(secs > 0, "timeout_secs must be a positive number of seconds");
                Duration::from_secs(secs)
            }
            None => DEFAULT_TIMEOUT,
        };

        Ok(MergedConfig {
            timeout,
            skip_policy: self.skip_policy.unwrap_or_default(),
            services_dir: services_dir
                .map(Path::to_path_buf)
                .or_else(|| self.services_dir.clone())
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SERVICES_DIR)),
            hardware_dir: hardware_dir
                .map(Path::to_path_buf)
                .or_else(|| self.hardware_dir.clone())
                .unwrap_or_else(|| PathBuf::from(DEFAULT_HARDWARE_DIR)),
        })
    }
}

/// Fully resolved configuration after merging CLI args
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedConfig {
    pub timeout: Duration,
    pub skip_policy: SkipPolicy,
    pub services_dir: PathBuf,
    pub hardware_dir: PathBuf,
}

impl MergedConfig {
    pub fn dump_options(&self) -> DumpOptions {
        DumpOptions {
            timeout: self.timeout,
            skip_policy: self.skip_policy,
        }
    }

    pub fn registry_config(&self) -> SocketRegistryConfig {
        SocketRegistryConfig::new(self.services_dir.clone(), self.hardware_dir.clone())
    }
}
