//! Wire format between dumpsys and a service socket
//!
//! The client sends one JSON line and half-closes its side:
//!
//! ```text
//! {"args":["-a","--proto"]}\n
//! ```
//!
//! Everything the service writes back until EOF is the dump text, passed
//! through untouched.

use std::path::{Path, PathBuf};

use dumpsys_core::ServiceName;
use serde::{Deserialize, Serialize};

/// File extension marking a service socket
pub const SOCKET_EXTENSION: &str = "sock";

/// Longest request line a server accepts
pub const MAX_REQUEST_LEN: usize = 64 * 1024;

/// A dump request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DumpRequest {
    /// Arguments forwarded verbatim to the service
    #[serde(default)]
    pub args: Vec<String>,
}

impl DumpRequest {
    pub fn new(args: Vec<String>) -> Self {
        Self { args }
    }

    /// Serialize as a single newline-terminated line
    pub fn encode(&self) -> serde_json::Result<Vec<u8>> {
        let mut line = serde_json::to_vec(self)?;
        line.push(b'\n');
        Ok(line)
    }

    pub fn decode(line: &str) -> serde_json::Result<Self> {
        serde_json::from_str(line.trim_end())
    }
}

/// Socket path of `name` inside `dir`
pub fn socket_path(dir: &Path, name: &ServiceName) -> PathBuf {
    dir.join(format!("{}.{}", name, SOCKET_EXTENSION))
}

/// Whether `name` names a socket directly inside a registry directory.
///
/// Names with a path separator, or that are empty, `.` or `..`, could point
/// outside the directory and never resolve.
pub fn is_plain_name(name: &ServiceName) -> bool {
    let name = name.as_str();
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(|c| c == '/' || c == '\0')
}

/// Service name for a socket path, if it carries the socket extension
pub fn service_name(path: &Path) -> Option<ServiceName> {
    if path.extension()? != SOCKET_EXTENSION {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    (!stem.is_empty()).then(|| ServiceName::from(stem))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_is_one_line() {
        let request = DumpRequest::new(vec!["-a".to_string(), "with\nnewline".to_string()]);
        let line = request.encode().unwrap();

        assert_eq!(line.iter().filter(|b| **b == b'\n').count(), 1);
        assert_eq!(line.last(), Some(&b'\n'));

        let decoded = DumpRequest::decode(std::str::from_utf8(&line).unwrap()).unwrap();
        assert_eq!(decoded, request);
    }

    #[test]
    fn test_missing_args_default_to_empty() {
        assert_eq!(DumpRequest::decode("{}\n").unwrap(), DumpRequest::default());
        assert!(DumpRequest::decode("not json").is_err());
    }

    #[test]
    fn test_socket_path_and_back() {
        let path = socket_path(Path::new("/run/dumpsys/services"), &"Valet".into());
        assert_eq!(path, PathBuf::from("/run/dumpsys/services/Valet.sock"));
        assert_eq!(service_name(&path), Some(ServiceName::from("Valet")));
    }

    #[test]
    fn test_plain_names() {
        for name in ["Valet", "android.hardware.power", "a..b", "-x"] {
            assert!(is_plain_name(&name.into()), "{} should be plain", name);
        }
        for name in ["", ".", "..", "../hardware/camera", "a/b", "/abs", "nul\0"] {
            assert!(!is_plain_name(&name.into()), "{:?} should be rejected", name);
        }
    }

    #[test]
    fn test_service_name_rejects_other_files() {
        assert_eq!(service_name(Path::new("/tmp/Valet.pid")), None);
        assert_eq!(service_name(Path::new("/tmp/Valet")), None);
        assert_eq!(service_name(Path::new("/tmp/.sock")), None);
    }
}
