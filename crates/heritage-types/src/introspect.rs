//! The introspection capabilities the scanner needs from a platform
//!
//! An [`Introspector`] answers questions about a type model: which records
//! are declared on an element, what a type's supertypes and members are, and
//! how to read a record's attribute. Every query may fail lazily, for example
//! when a referenced type cannot be loaded; callers decide how to contain such
//! failures.

use std::sync::Arc;

use crate::error::IntrospectionError;
use crate::ty::{Element, MemberDescriptor, MemberId, TypeDescriptor, TypeId};
use crate::value::{AttributeValue, MetadataRecord};

/// Result type for introspection queries
pub type IntrospectionResult<T> = Result<T, IntrospectionError>;

/// Read-only view of a type model
pub trait Introspector: Send + Sync {
    /// The platform root type every class ultimately extends
    fn root_type(&self) -> TypeId;

    /// Describe a type; succeeds for types known only by name
    fn type_descriptor(&self, ty: TypeId) -> IntrospectionResult<&TypeDescriptor>;

    /// Describe a behavior member
    fn member_descriptor(&self, member: MemberId) -> IntrospectionResult<&MemberDescriptor>;

    /// Superclass of a type; `None` for interfaces and the root type
    fn superclass(&self, ty: TypeId) -> IntrospectionResult<Option<TypeId>>;

    /// Directly implemented interfaces, in declaration order
    fn interfaces(&self, ty: TypeId) -> IntrospectionResult<Vec<TypeId>>;

    /// Lexically enclosing type
    fn enclosing_type(&self, ty: TypeId) -> IntrospectionResult<Option<TypeId>>;

    /// Records declared directly on an element
    fn declared_annotations(&self, element: Element)
        -> IntrospectionResult<Vec<Arc<MetadataRecord>>>;

    /// Records visible on a type: declared records plus records of inherited
    /// kinds found on the superclass chain, the most-derived declaration winning
    fn annotations(&self, ty: TypeId) -> IntrospectionResult<Vec<Arc<MetadataRecord>>>;

    /// Members declared directly on a type, including private and bridge members
    fn declared_members(&self, ty: TypeId) -> IntrospectionResult<Vec<MemberId>>;

    /// Public members of a type, including those inherited from super-interfaces
    fn public_members(&self, ty: TypeId) -> IntrospectionResult<Vec<MemberId>>;

    /// Erased parameter types of a member
    fn parameter_types(&self, member: MemberId) -> IntrospectionResult<Vec<TypeId>>;

    /// Parameter type of `member` at `index`, resolved against the generic
    /// specialization seen from `against`
    fn resolve_parameter_type(
        &self,
        member: MemberId,
        index: usize,
        against: TypeId,
    ) -> IntrospectionResult<Option<TypeId>>;

    /// Whether a value of type `source` can be used where `target` is expected
    fn is_assignable_from(&self, target: TypeId, source: TypeId) -> IntrospectionResult<bool>;

    /// The original member a bridge shadows, or the member itself
    fn bridged_member(&self, member: MemberId) -> IntrospectionResult<MemberId>;

    /// Read the value of an attribute member from a record
    fn read_attribute(
        &self,
        record: &MetadataRecord,
        attribute: MemberId,
    ) -> IntrospectionResult<AttributeValue>;

    /// Name of a type, for diagnostics
    fn type_name(&self, ty: TypeId) -> IntrospectionResult<&str> {
        self.type_descriptor(ty).map(|descriptor| descriptor.name.as_str())
    }
}

impl<T: Introspector + ?Sized> Introspector for Arc<T> {
    fn root_type(&self) -> TypeId {
        (**self).root_type()
    }

    fn type_descriptor(&self, ty: TypeId) -> IntrospectionResult<&TypeDescriptor> {
        (**self).type_descriptor(ty)
    }

    fn member_descriptor(&self, member: MemberId) -> IntrospectionResult<&MemberDescriptor> {
        (**self).member_descriptor(member)
    }

    fn superclass(&self, ty: TypeId) -> IntrospectionResult<Option<TypeId>> {
        (**self).superclass(ty)
    }

    fn interfaces(&self, ty: TypeId) -> IntrospectionResult<Vec<TypeId>> {
        (**self).interfaces(ty)
    }

    fn enclosing_type(&self, ty: TypeId) -> IntrospectionResult<Option<TypeId>> {
        (**self).enclosing_type(ty)
    }

    fn declared_annotations(
        &self,
        element: Element,
    ) -> IntrospectionResult<Vec<Arc<MetadataRecord>>> {
        (**self).declared_annotations(element)
    }

    fn annotations(&self, ty: TypeId) -> IntrospectionResult<Vec<Arc<MetadataRecord>>> {
        (**self).annotations(ty)
    }

    fn declared_members(&self, ty: TypeId) -> IntrospectionResult<Vec<MemberId>> {
        (**self).declared_members(ty)
    }

    fn public_members(&self, ty: TypeId) -> IntrospectionResult<Vec<MemberId>> {
        (**self).public_members(ty)
    }

    fn parameter_types(&self, member: MemberId) -> IntrospectionResult<Vec<TypeId>> {
        (**self).parameter_types(member)
    }

    fn resolve_parameter_type(
        &self,
        member: MemberId,
        index: usize,
        against: TypeId,
    ) -> IntrospectionResult<Option<TypeId>> {
        (**self).resolve_parameter_type(member, index, against)
    }

    fn is_assignable_from(&self, target: TypeId, source: TypeId) -> IntrospectionResult<bool> {
        (**self).is_assignable_from(target, source)
    }

    fn bridged_member(&self, member: MemberId) -> IntrospectionResult<MemberId> {
        (**self).bridged_member(member)
    }

    fn read_attribute(
        &self,
        record: &MetadataRecord,
        attribute: MemberId,
    ) -> IntrospectionResult<AttributeValue> {
        (**self).read_attribute(record, attribute)
    }
}
