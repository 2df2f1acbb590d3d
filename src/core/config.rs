//! Reader configuration
//!
//! Options are plain serde structs so they can be loaded from a TOML file:
//!
//! ```toml
//! locale_count = 8
//! string_cache_capacity = 1024
//! strict_field_count = true
//! ```

use crate::error::{DbcError, Result};
use semver::Version;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

/// Default LRU capacity of the string-pool memo
pub const DEFAULT_STRING_CACHE_CAPACITY: usize = 4096;

/// Options applied while building schemas and opening stores
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderOptions {
    /// Locale slots of a `localized_string` field unless the field overrides it
    pub locale_count: u32,

    /// Capacity of the resolved-string cache; 0 disables memoization
    pub string_cache_capacity: usize,

    /// Reject files whose header field count disagrees with the mapping
    pub strict_field_count: bool,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        ReaderOptions {
            locale_count: 1,
            string_cache_capacity: DEFAULT_STRING_CACHE_CAPACITY,
            strict_field_count: false,
        }
    }
}

impl ReaderOptions {
    /// Options matching the localization layout of a client release
    pub fn for_client(version: &ClientVersion) -> Self {
        ReaderOptions {
            locale_count: version.locale_count(),
            ..ReaderOptions::default()
        }
    }

    /// True when these options lay out localized strings the way `version` does
    ///
    /// Exports label their output with a client version; when options come
    /// from a config file the two can disagree.
    pub fn agrees_with(&self, version: &ClientVersion) -> bool {
        self.locale_count == version.locale_count()
    }

    /// Parse options from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| DbcError::Config(e.to_string()))
    }

    /// Load options from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}

/// Client release a file was produced for (e.g. "1.12.1")
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClientVersion(Version);

impl ClientVersion {
    pub fn new(version: Version) -> Self {
        ClientVersion(version)
    }

    pub fn version(&self) -> &Version {
        &self.0
    }

    /// Locale slots in a localized string for this release
    ///
    /// 1.x clients ship eight locales; later clients ship sixteen.
    pub fn locale_count(&self) -> u32 {
        if self.0.major <= 1 {
            8
        } else {
            16
        }
    }
}

impl Default for ClientVersion {
    fn default() -> Self {
        ClientVersion(Version::new(1, 12, 1))
    }
}

impl FromStr for ClientVersion {
    type Err = DbcError;

    fn from_str(s: &str) -> Result<Self> {
        Version::parse(s.trim())
            .map(ClientVersion)
            .map_err(|e| DbcError::Config(format!("invalid client version '{}': {}", s, e)))
    }
}

impl std::fmt::Display for ClientVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
