//! Hierarchy search strategies

use std::fmt;
use std::str::FromStr;

/// Which parts of a hierarchy a scan visits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchStrategy {
    /// The source element only
    Direct,
    /// The source type and its superclasses, keeping ancestor records only
    /// for kinds visible on the source through inheritance
    InheritedAnnotations,
    /// The source type and its superclasses
    Superclass,
    /// The source type, its interfaces (depth first), and its superclasses
    TypeHierarchy,
    /// Like [`TypeHierarchy`](Self::TypeHierarchy), plus lexically enclosing types
    TypeHierarchyAndEnclosingClasses,
}

impl SearchStrategy {
    /// All strategies
    pub const ALL: [SearchStrategy; 5] = [
        SearchStrategy::Direct,
        SearchStrategy::InheritedAnnotations,
        SearchStrategy::Superclass,
        SearchStrategy::TypeHierarchy,
        SearchStrategy::TypeHierarchyAndEnclosingClasses,
    ];

    /// Short name used in configuration and on the command line
    pub fn name(self) -> &'static str {
        match self {
            SearchStrategy::Direct => "direct",
            SearchStrategy::InheritedAnnotations => "inherited",
            SearchStrategy::Superclass => "superclass",
            SearchStrategy::TypeHierarchy => "type-hierarchy",
            SearchStrategy::TypeHierarchyAndEnclosingClasses => "enclosing",
        }
    }
}

impl fmt::Display for SearchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SearchStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SearchStrategy::ALL
            .into_iter()
            .find(|strategy| strategy.name() == s)
            .ok_or_else(|| {
                let names: Vec<_> = SearchStrategy::ALL.iter().map(|s| s.name()).collect();
                format!("unknown search strategy '{}' (expected one of: {})", s, names.join(", "))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for strategy in SearchStrategy::ALL {
            assert_eq!(strategy.name().parse::<SearchStrategy>().unwrap(), strategy);
        }
    }

    #[test]
    fn test_unknown_name() {
        let err = "everything".parse::<SearchStrategy>().unwrap_err();
        assert!(err.contains("type-hierarchy"));
    }
}
