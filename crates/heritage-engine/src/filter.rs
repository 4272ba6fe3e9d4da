//! Name-based type classification
//!
//! [`PlainTypes`] decides which types are assumed to carry no relevant
//! metadata; the scanner neither visits nor descends through them.
//! [`AnnotationFilter`] decides which record kinds are ignorable and dropped
//! before records are cached.

/// Classifies plain types by name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlainTypes {
    prefixes: Vec<String>,
    excluded: Vec<String>,
}

impl PlainTypes {
    /// Classifier for the given base-library prefixes and marker types
    pub fn new(
        prefixes: impl IntoIterator<Item = String>,
        excluded: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            prefixes: prefixes.into_iter().collect(),
            excluded: excluded.into_iter().collect(),
        }
    }

    /// Whether a type with this name is plain
    pub fn is_plain_name(&self, name: &str) -> bool {
        self.prefixes.iter().any(|prefix| name.starts_with(prefix.as_str()))
            || self.excluded.iter().any(|excluded| excluded == name)
    }
}

/// Matches ignorable record kinds by name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationFilter {
    prefixes: Vec<String>,
}

impl AnnotationFilter {
    /// Filter matching kinds under the given name prefixes
    pub fn packages(prefixes: impl IntoIterator<Item = String>) -> Self {
        Self {
            prefixes: prefixes.into_iter().collect(),
        }
    }

    /// Filter matching nothing
    pub fn none() -> Self {
        Self {
            prefixes: Vec::new(),
        }
    }

    /// Whether a kind with this name is ignorable
    pub fn matches(&self, kind_name: &str) -> bool {
        self.prefixes
            .iter()
            .any(|prefix| kind_name.starts_with(prefix.as_str()))
    }
}
