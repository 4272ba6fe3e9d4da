//! Heritage Metadata Engine
//!
//! Discovers metadata records across type and member hierarchies:
//! - **Attribute models**: the ordered attributes of each record kind (`attributes` module)
//! - **Caches**: declared records per element and overridable members per type (`cache` module)
//! - **Scanner**: strategy-driven hierarchy walks feeding a processor (`scanner` module)
//!
//! # Example
//!
//! ```rust,ignore
//! use heritage_engine::{HierarchyScanner, LevelCollector, SearchStrategy};
//! use heritage_types::{Element, TypeRegistry};
//!
//! let registry = TypeRegistry::from_json_str(model)?;
//! let service = registry.lookup("acme.Service").unwrap();
//!
//! let scanner = HierarchyScanner::new(registry);
//! let levels = scanner.scan(
//!     &(),
//!     Element::Type(service),
//!     SearchStrategy::TypeHierarchy,
//!     &mut LevelCollector::new(),
//! );
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod attributes;
pub mod cache;
pub mod config;
pub mod error;
pub mod failure;
pub mod filter;
pub mod scanner;

pub use attributes::{describe, AttributeAccessor, AttributeModel, AttributeModels};
pub use cache::{DeclaredMetadataCache, MemberSignatureCache, MetadataLookup, Slot};
pub use config::ScanConfig;
pub use error::{AttributeError, ConfigError};
pub use failure::{FailureHandler, FailurePolicy, IgnoreFailures, LogFailures};
pub use filter::{AnnotationFilter, PlainTypes};
pub use scanner::{
    ClassFilter, FirstOfKind, Found, HierarchyScanner, Level, LevelCollector, MetadataProcessor,
    SearchStrategy,
};
