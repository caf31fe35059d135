//! Stable ledger key for a migration file.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::ops::Deref;
use std::path::{Component, Path};

/// Root-relative path of a migration file, e.g. `10.1/001-dummy.sql`.
///
/// Always `/`-separated regardless of the host platform, so the same
/// migration produces the same key on every machine that runs it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShortName(String);

impl ShortName {
    /// Create a short name from text, rejecting empty input.
    pub fn try_new(name: impl Into<String>) -> CoreResult<Self> {
        let s = name.into();
        let trimmed = s.trim_start_matches('/');
        if trimmed.is_empty() {
            return Err(CoreError::EmptyShortName);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Build a short name from a path already relative to the migration root.
    pub fn from_relative_path(relative: &Path) -> CoreResult<Self> {
        let parts: Vec<String> = relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();
        Self::try_new(parts.join("/"))
    }

    /// The version directory this migration belongs to (first path segment).
    pub fn version_dir(&self) -> &str {
        self.0.split('/').next().unwrap_or(&self.0)
    }

    /// Return the underlying name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the wrapper and return the inner `String`.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ShortName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ShortName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Deref for ShortName {
    type Target = str;
    fn deref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ShortName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for ShortName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for ShortName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
