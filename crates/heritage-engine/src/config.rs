//! Scanner configuration
//!
//! ```toml
//! plain_type_prefixes = ["lang."]
//! excluded_types = ["lang.Ordered", "acme.Marker"]
//! ignorable_kind_prefixes = ["lang."]
//! failure_policy = "ignore"
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::failure::FailurePolicy;
use crate::filter::{AnnotationFilter, PlainTypes};

/// Default platform base-library prefix
pub const DEFAULT_PLATFORM_PREFIX: &str = "lang.";

/// Default explicitly excluded marker type
pub const DEFAULT_EXCLUDED_TYPE: &str = "lang.Ordered";

/// Scanner configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScanConfig {
    /// Name prefixes of types assumed to carry no relevant metadata
    pub plain_type_prefixes: Vec<String>,
    /// Marker types treated as plain regardless of name
    pub excluded_types: Vec<String>,
    /// Name prefixes of record kinds dropped from discovery
    pub ignorable_kind_prefixes: Vec<String>,
    /// What to do with contained introspection failures
    pub failure_policy: FailurePolicy,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            plain_type_prefixes: vec![DEFAULT_PLATFORM_PREFIX.to_string()],
            excluded_types: vec![DEFAULT_EXCLUDED_TYPE.to_string()],
            ignorable_kind_prefixes: vec![DEFAULT_PLATFORM_PREFIX.to_string()],
            failure_policy: FailurePolicy::Log,
        }
    }
}

impl ScanConfig {
    /// Parse a TOML config; missing keys take their defaults
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load a TOML config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Plain-type classifier for this config
    pub fn plain_types(&self) -> PlainTypes {
        PlainTypes::new(
            self.plain_type_prefixes.iter().cloned(),
            self.excluded_types.iter().cloned(),
        )
    }

    /// Ignorable-kind filter for this config
    pub fn annotation_filter(&self) -> AnnotationFilter {
        AnnotationFilter::packages(self.ignorable_kind_prefixes.iter().cloned())
    }
}
