//! Dotted numeric versions used to name migration directories.
//!
//! Versions compare component by component as integers, never as text, so
//! `9.0` sorts before `10.0`. Missing trailing components count as zero.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// A dotted numeric version such as `10.1` or `11.0.2`.
#[derive(Debug, Clone)]
pub struct Version {
    text: String,
    components: Vec<u64>,
}

impl Version {
    /// Parse a version string.
    ///
    /// The string must start with a digit. A bare major version (`"10"`) is
    /// normalized to `"10.0"`.
    pub fn parse(input: &str) -> CoreResult<Self> {
        let trimmed = input.trim();
        if !trimmed.starts_with(|c: char| c.is_ascii_digit()) {
            return Err(CoreError::InvalidVersion {
                version: input.to_string(),
                reason: "must start with a digit".to_string(),
            });
        }

        let text = if trimmed.contains('.') {
            trimmed.to_string()
        } else {
            format!("{trimmed}.0")
        };

        let components = text
            .split('.')
            .map(|part| {
                part.parse::<u64>().map_err(|_| CoreError::InvalidVersion {
                    version: input.to_string(),
                    reason: format!("component '{part}' is not a number"),
                })
            })
            .collect::<CoreResult<Vec<_>>>()?;

        Ok(Self { text, components })
    }

    /// The `0.0` version, older than every migration directory.
    pub fn zero() -> Self {
        Self {
            text: "0.0".to_string(),
            components: vec![0, 0],
        }
    }

    /// The normalized version text (what directory names are compared against).
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Numeric components, in order.
    pub fn components(&self) -> &[u64] {
        &self.components
    }

    /// Components with trailing zeros removed; equal versions share this form.
    fn significant(&self) -> &[u64] {
        let end = self
            .components
            .iter()
            .rposition(|c| *c != 0)
            .map_or(0, |i| i + 1);
        &self.components[..end]
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.components.len().max(other.components.len());
        for i in 0..len {
            let a = self.components.get(i).copied().unwrap_or(0);
            let b = other.components.get(i).copied().unwrap_or(0);
            match a.cmp(&b) {
                Ordering::Equal => continue,
                unequal => return unequal,
            }
        }
        Ordering::Equal
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl Hash for Version {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.significant().hash(state);
    }
}

impl FromStr for Version {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl Serialize for Version {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.text)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        // YAML reads `11.0` as a float and `11` as an integer; accept any scalar.
        let value = serde_yaml::Value::deserialize(deserializer)?;
        let text = match value {
            serde_yaml::Value::String(s) => s,
            serde_yaml::Value::Number(n) => n.to_string(),
            other => {
                return Err(serde::de::Error::custom(format!(
                    "expected a version string, found {other:?}"
                )))
            }
        };
        Version::parse(&text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[path = "version_test.rs"]
mod tests;
