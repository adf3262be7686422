//! Version numbers reported by the service under test.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A `major.minor.patch` version. Ordering compares the components in that order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl Version {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self { major, minor, patch }
    }

    /// Returns true when `self` is strictly older than `other`.
    pub fn before(&self, other: &Version) -> bool {
        self < other
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid version '{input}': {reason}")]
pub struct VersionParseError {
    pub input: String,
    pub reason: String,
}

impl FromStr for Version {
    type Err = VersionParseError;

    /// Parses `5.2.0`, `v7.10`, or `8.0.0-SNAPSHOT`. Qualifiers after `-` or `+`
    /// are dropped and missing components default to zero.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        let trimmed = trimmed.strip_prefix('v').unwrap_or(trimmed);
        let numeric = trimmed.split(['-', '+']).next().unwrap_or_default();
        if numeric.is_empty() {
            return Err(VersionParseError {
                input: input.to_string(),
                reason: "empty version".to_string(),
            });
        }

        let mut components = [0u32; 3];
        for (index, part) in numeric.split('.').enumerate() {
            if index >= components.len() {
                return Err(VersionParseError {
                    input: input.to_string(),
                    reason: "expected at most three components".to_string(),
                });
            }
            components[index] = part.parse::<u32>().map_err(|error| VersionParseError {
                input: input.to_string(),
                reason: format!("component '{part}' is not a number ({error})"),
            })?;
        }

        let [major, minor, patch] = components;
        Ok(Version { major, minor, patch })
    }
}

impl TryFrom<String> for Version {
    type Error = VersionParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Version> for String {
    fn from(version: Version) -> Self {
        version.to_string()
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_and_partial_versions() {
        assert_eq!("5.2.0".parse::<Version>().unwrap(), Version::new(5, 2, 0));
        assert_eq!("v7.10".parse::<Version>().unwrap(), Version::new(7, 10, 0));
        assert_eq!("8".parse::<Version>().unwrap(), Version::new(8, 0, 0));
    }

    #[test]
    fn drops_qualifiers() {
        assert_eq!("6.0.0-alpha1".parse::<Version>().unwrap(), Version::new(6, 0, 0));
        assert_eq!("5.1.2-SNAPSHOT".parse::<Version>().unwrap(), Version::new(5, 1, 2));
    }

    #[test]
    fn rejects_garbage() {
        assert!("".parse::<Version>().is_err());
        assert!("five.two".parse::<Version>().is_err());
        assert!("1.2.3.4".parse::<Version>().is_err());
    }

    #[test]
    fn orders_by_components() {
        let legacy = Version::new(5, 1, 9);
        let cutoff = Version::new(5, 2, 0);
        assert!(legacy.before(&cutoff));
        assert!(!cutoff.before(&cutoff));
        assert!(Version::new(10, 0, 0) > Version::new(9, 99, 99));
    }

    #[test]
    fn serializes_as_string() {
        let version: Version = serde_yaml::from_str("\"7.17.3\"").unwrap();
        assert_eq!(version, Version::new(7, 17, 3));
        assert_eq!(serde_json::to_string(&version).unwrap(), "\"7.17.3\"");
    }
}
