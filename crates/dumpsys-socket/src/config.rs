//! Socket registry configuration

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default directory holding general service sockets
pub const DEFAULT_SERVICES_DIR: &str = "/run/dumpsys/services";

/// Default directory holding hardware service sockets
pub const DEFAULT_HARDWARE_DIR: &str = "/run/dumpsys/hardware";

/// Where the socket registries look and how long they wait on a socket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocketRegistryConfig {
    /// General service sockets, one `<name>.sock` per service
    #[serde(default = "default_services_dir")]
    pub services_dir: PathBuf,
    /// Hardware service sockets, same layout
    #[serde(default = "default_hardware_dir")]
    pub hardware_dir: PathBuf,
    /// Upper bound for a single connect, in milliseconds
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

fn default_services_dir() -> PathBuf {
    PathBuf::from(DEFAULT_SERVICES_DIR)
}

fn default_hardware_dir() -> PathBuf {
    PathBuf::from(DEFAULT_HARDWARE_DIR)
}

fn default_connect_timeout_ms() -> u64 {
    500
}

impl Default for SocketRegistryConfig {
    fn default() -> Self {
        Self {
            services_dir: default_services_dir(),
            hardware_dir: default_hardware_dir(),
            connect_timeout_ms: default_connect_timeout_ms(),
        }
    }
}

impl SocketRegistryConfig {
    pub fn new(services_dir: impl Into<PathBuf>, hardware_dir: impl Into<PathBuf>) -> Self {
        Self {
            services_dir: services_dir.into(),
            hardware_dir: hardware_dir.into(),
            ..Self::default()
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let config: SocketRegistryConfig =
            serde_json::from_str(r#"{"services_dir": "/tmp/svc"}"#).unwrap();

        assert_eq!(config.services_dir, PathBuf::from("/tmp/svc"));
        assert_eq!(config.hardware_dir, PathBuf::from(DEFAULT_HARDWARE_DIR));
        assert_eq!(config.connect_timeout(), Duration::from_millis(500));
    }
}
