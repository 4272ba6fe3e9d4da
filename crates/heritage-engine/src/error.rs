//! Engine errors

use std::path::PathBuf;

use heritage_types::IntrospectionError;
use thiserror::Error;

/// A record attribute could not be read
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AttributeError {
    /// Reading a hazardous attribute raised a deferred platform error
    #[error("Could not obtain annotation attribute value for {attribute} declared on {kind}")]
    Unreadable {
        /// Attribute name
        attribute: String,
        /// Declaring record kind name
        kind: String,
        /// Underlying platform error
        #[source]
        source: IntrospectionError,
    },
}

/// Configuration could not be loaded
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("Failed to read config {path}: {source}")]
    Io {
        /// File path
        path: PathBuf,
        /// I/O error
        #[source]
        source: std::io::Error,
    },

    /// Config text is not valid TOML for a scan config
    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}
