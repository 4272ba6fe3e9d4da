//! Heritage Type Model
//!
//! Types, members, metadata records, and the [`Introspector`] capability the
//! heritage scanner queries. [`TypeRegistry`] is an in-memory implementation
//! that can be built programmatically or loaded from a JSON model.

#![warn(missing_docs)]

pub mod error;
mod generics;
pub mod introspect;
pub mod model;
pub mod registry;
pub mod ty;
pub mod value;

pub use error::{IntrospectionError, ModelError};
pub use introspect::{IntrospectionResult, Introspector};
pub use model::ModelFile;
pub use registry::{MemberDefinition, TypeDefinition, TypeRegistry, ROOT_TYPE_NAME};
pub use ty::{
    Element, MemberDescriptor, MemberId, TypeArg, TypeDescriptor, TypeId, TypeKind, TypeParam,
    TypeRef, ValueType, Visibility,
};
pub use value::{AttributeValue, MetadataRecord};
