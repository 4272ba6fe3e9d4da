//! Introspection errors

use thiserror::Error;

use crate::ty::{MemberId, TypeId};

/// Errors raised by an introspector while answering a query
#[derive(Debug, Clone, Error, PartialEq)]
pub enum IntrospectionError {
    /// A referenced type exists by name but cannot be loaded
    #[error("Type not present: {name}")]
    TypeNotPresent {
        /// Name of the missing type
        name: String,
    },

    /// Type id not issued by this introspector
    #[error("Unknown type: {0}")]
    UnknownType(TypeId),

    /// Member id not issued by this introspector
    #[error("Unknown member: {0}")]
    UnknownMember(MemberId),

    /// A record has no value and no default for an attribute
    #[error("Missing value for attribute '{attribute}' in annotation [{kind}]")]
    MissingAttribute {
        /// Attribute name
        attribute: String,
        /// Record kind name
        kind: String,
    },

    /// The type model is internally inconsistent
    #[error("Inconsistent type model: {reason}")]
    Inconsistent {
        /// What is wrong
        reason: String,
    },
}

/// Errors raised while loading a type model
#[derive(Debug, Error)]
pub enum ModelError {
    /// Model JSON could not be parsed
    #[error("Invalid model: {0}")]
    Json(#[from] serde_json::Error),

    /// A name does not refer to a declared type
    #[error("Unknown type name '{name}' referenced from {context}")]
    UnknownTypeName {
        /// Referenced name
        name: String,
        /// Where it was referenced
        context: String,
    },

    /// A type name was declared twice
    #[error("Duplicate type name '{0}'")]
    DuplicateType(String),

    /// A value type string could not be parsed
    #[error("Invalid value type '{0}'")]
    InvalidValueType(String),

    /// A member reference could not be resolved
    #[error("Unknown member '{name}' on {owner}")]
    UnknownMemberName {
        /// Member name
        name: String,
        /// Owning type name
        owner: String,
    },
}
