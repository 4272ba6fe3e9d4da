//! Process-wide recomputation caches
//!
//! Both caches map a stable element identity to a value that is a pure
//! function of that identity. Lookups never block on each other: a miss
//! computes outside the map and inserts the result, so concurrent misses for
//! the same key may compute twice and the last insert wins.

mod declared;
mod members;

pub use declared::{no_annotations, DeclaredMetadataCache, Slot};
pub use members::MemberSignatureCache;

use heritage_types::{Element, IntrospectionResult, Introspector, TypeId};

use crate::attributes::AttributeModels;
use crate::filter::{AnnotationFilter, PlainTypes};

/// Collaborators needed to compute cache entries
pub struct MetadataLookup<'a, I: ?Sized> {
    /// Platform introspector
    pub introspector: &'a I,
    /// Attribute model cache, used to validate records
    pub attributes: &'a AttributeModels,
    /// Ignorable record kinds
    pub ignorable: &'a AnnotationFilter,
    /// Plain types
    pub plain: &'a PlainTypes,
}

impl<'a, I: Introspector + ?Sized> MetadataLookup<'a, I> {
    /// Whether a type is plain
    pub fn is_plain_type(&self, ty: TypeId) -> IntrospectionResult<bool> {
        Ok(self.plain.is_plain_name(self.introspector.type_name(ty)?))
    }

    /// Whether an element is plain: a plain type or a member of one
    pub fn is_plain_element(&self, element: Element) -> IntrospectionResult<bool> {
        match element {
            Element::Type(ty) => self.is_plain_type(ty),
            Element::Member(member) => {
                let declaring = self.introspector.member_descriptor(member)?.declaring_type;
                self.is_plain_type(declaring)
            }
            Element::Parameter { .. } => Ok(false),
        }
    }

    /// Whether records of a kind are dropped from discovery
    pub fn is_ignorable(&self, kind: TypeId) -> IntrospectionResult<bool> {
        Ok(self.ignorable.matches(self.introspector.type_name(kind)?))
    }
}
