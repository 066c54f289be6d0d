//! Service name model

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque, case-sensitive service identifier
///
/// Unique within its registry namespace; the general and hardware
/// namespaces are disjoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceName(String);

impl ServiceName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ServiceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ServiceName {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for ServiceName {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl AsRef<str> for ServiceName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ServiceName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_are_case_sensitive() {
        assert_ne!(ServiceName::from("Valet"), ServiceName::from("valet"));
        assert_eq!(ServiceName::from("Valet").as_str(), "Valet");
    }

    #[test]
    fn test_lookup_by_str() {
        let names: std::collections::BTreeSet<ServiceName> =
            ["Locksmith", "Valet"].into_iter().map(ServiceName::from).collect();
        assert!(names.contains("Valet"));
        assert!(!names.contains("Butler"));
    }
}
