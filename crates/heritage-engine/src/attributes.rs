//! Attribute models for metadata-record kinds
//!
//! An [`AttributeModel`] is the reflective view of one record kind: its
//! attribute accessors sorted by name, which of them may fail lazily when
//! read, and whether any has a default or holds nested records. Models are
//! computed once per kind and shared through [`AttributeModels`].
//!
//! Attributes whose declared type is a type reference, an array of type
//! references, or an enumeration are *hazardous*: the platform may only
//! discover that the referenced type is missing when the value is read.
//! [`AttributeModel::is_valid`] probes exactly those attributes.

use std::sync::Arc;

use dashmap::DashMap;
use heritage_types::{
    AttributeValue, IntrospectionResult, Introspector, MemberDescriptor, MemberId, MetadataRecord,
    TypeId, ValueType,
};
use once_cell::sync::Lazy;
use tracing::trace;

use crate::error::AttributeError;

/// Name of the conventional single attribute
pub const VALUE: &str = "value";

static NONE: Lazy<Arc<AttributeModel>> =
    Lazy::new(|| Arc::new(AttributeModel::from_accessors(None, None, Vec::new())));

/// Accessor for one attribute of a record kind
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeAccessor {
    member: MemberId,
    name: String,
    value_type: ValueType,
    default_value: Option<AttributeValue>,
}

impl AttributeAccessor {
    fn from_member(member: &MemberDescriptor) -> Self {
        Self {
            member: member.id,
            name: member.name.clone(),
            value_type: member.return_type.clone(),
            default_value: member.default_value.clone(),
        }
    }

    /// Member that declares the attribute
    pub fn member(&self) -> MemberId {
        self.member
    }

    /// Attribute name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared value type
    pub fn value_type(&self) -> &ValueType {
        &self.value_type
    }

    /// Declared default value
    pub fn default_value(&self) -> Option<&AttributeValue> {
        self.default_value.as_ref()
    }

    /// Read this attribute from a record
    pub fn read<I: Introspector + ?Sized>(
        &self,
        introspector: &I,
        record: &MetadataRecord,
    ) -> IntrospectionResult<AttributeValue> {
        introspector.read_attribute(record, self.member)
    }
}

/// Ordered attribute accessors of one record kind
#[derive(Debug, PartialEq)]
pub struct AttributeModel {
    kind: Option<TypeId>,
    kind_name: Option<String>,
    accessors: Vec<AttributeAccessor>,
    can_fail_on_read: Vec<bool>,
    has_default_value: bool,
    has_nested_record: bool,
}

impl AttributeModel {
    fn from_accessors(
        kind: Option<TypeId>,
        kind_name: Option<String>,
        accessors: Vec<AttributeAccessor>,
    ) -> Self {
        let can_fail_on_read = accessors
            .iter()
            .map(|accessor| accessor.value_type.is_deferred_resolution())
            .collect();
        let has_default_value = accessors.iter().any(|a| a.default_value.is_some());
        let has_nested_record = accessors.iter().any(|a| a.value_type.is_nested_record());
        Self {
            kind,
            kind_name,
            accessors,
            can_fail_on_read,
            has_default_value,
            has_nested_record,
        }
    }

    /// The shared model for "any kind": no attributes
    pub fn none() -> Arc<AttributeModel> {
        NONE.clone()
    }

    /// Compute the model for a kind without consulting any cache
    ///
    /// With `restrict_to_attributes`, only members taking no parameters and
    /// returning a value are kept; otherwise every declared member is.
    pub fn compute<I: Introspector + ?Sized>(
        introspector: &I,
        kind: TypeId,
        restrict_to_attributes: bool,
    ) -> IntrospectionResult<Arc<AttributeModel>> {
        let kind_name = introspector.type_name(kind)?.to_string();
        let mut accessors = Vec::new();
        for member in introspector.declared_members(kind)? {
            let descriptor = introspector.member_descriptor(member)?;
            if !restrict_to_attributes || is_attribute_member(descriptor) {
                accessors.push(AttributeAccessor::from_member(descriptor));
            }
        }
        if accessors.is_empty() {
            return Ok(Self::none());
        }
        accessors.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(Arc::new(Self::from_accessors(
            Some(kind),
            Some(kind_name),
            accessors,
        )))
    }

    /// Record kind, `None` for the shared empty model
    pub fn kind(&self) -> Option<TypeId> {
        self.kind
    }

    /// Record kind name
    pub fn kind_name(&self) -> Option<&str> {
        self.kind_name.as_deref()
    }

    /// Whether the model has exactly one attribute and it is named `value`
    pub fn has_only_value_attribute(&self) -> bool {
        self.accessors.len() == 1 && self.accessors[0].name == VALUE
    }

    /// Whether every hazardous attribute of `record` can be read
    ///
    /// # Panics
    ///
    /// If `record` is not of this model's kind.
    pub fn is_valid<I: Introspector + ?Sized>(&self, introspector: &I, record: &MetadataRecord) -> bool {
        self.assert_record(record);
        self.hazardous()
            .all(|accessor| accessor.read(introspector, record).is_ok())
    }

    /// Like [`is_valid`](Self::is_valid), but reports the first unreadable attribute
    ///
    /// # Panics
    ///
    /// If `record` is not of this model's kind.
    pub fn validate<I: Introspector + ?Sized>(
        &self,
        introspector: &I,
        record: &MetadataRecord,
    ) -> Result<(), AttributeError> {
        self.assert_record(record);
        for accessor in self.hazardous() {
            if let Err(source) = accessor.read(introspector, record) {
                let kind = introspector
                    .type_name(record.kind())
                    .map(str::to_string)
                    .unwrap_or_else(|_| record.kind().to_string());
                return Err(AttributeError::Unreadable {
                    attribute: accessor.name.clone(),
                    kind,
                    source,
                });
            }
        }
        Ok(())
    }

    fn hazardous(&self) -> impl Iterator<Item = &AttributeAccessor> {
        self.accessors
            .iter()
            .zip(&self.can_fail_on_read)
            .filter(|(_, hazardous)| **hazardous)
            .map(|(accessor, _)| accessor)
    }

    fn assert_record(&self, record: &MetadataRecord) {
        if let Some(kind) = self.kind {
            assert_eq!(
                record.kind(),
                kind,
                "record {} is not an instance of {}",
                record,
                self.kind_name.as_deref().unwrap_or("<unknown>")
            );
        }
    }

    /// Accessor with the given name
    pub fn get_by_name(&self, name: &str) -> Option<&AttributeAccessor> {
        self.index_of(name).map(|index| &self.accessors[index])
    }

    /// Accessor at `index`
    ///
    /// # Panics
    ///
    /// If `index >= self.len()`.
    pub fn get(&self, index: usize) -> &AttributeAccessor {
        &self.accessors[index]
    }

    /// Whether reading the attribute at `index` may raise a deferred error
    pub fn can_fail_on_read(&self, index: usize) -> bool {
        self.can_fail_on_read[index]
    }

    /// Index of the attribute with the given name
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.accessors.iter().position(|a| a.name == name)
    }

    /// Index of an accessor in this model
    pub fn index_of_accessor(&self, accessor: &AttributeAccessor) -> Option<usize> {
        self.accessors.iter().position(|a| a.member == accessor.member)
    }

    /// Number of attributes
    pub fn len(&self) -> usize {
        self.accessors.len()
    }

    /// Whether the model has no attributes
    pub fn is_empty(&self) -> bool {
        self.accessors.is_empty()
    }

    /// Accessors in name order
    pub fn iter(&self) -> std::slice::Iter<'_, AttributeAccessor> {
        self.accessors.iter()
    }

    /// Whether at least one attribute declares a default value
    pub fn has_default_value_method(&self) -> bool {
        self.has_default_value
    }

    /// Whether at least one attribute holds a nested record or an array of them
    pub fn has_nested_record(&self) -> bool {
        self.has_nested_record
    }

    /// Description of the attribute at `index` for messages and logs
    pub fn describe_accessor(&self, index: Option<usize>) -> String {
        describe(
            self.kind_name.as_deref(),
            index.map(|i| self.accessors[i].name.as_str()),
        )
    }
}

impl<'a> IntoIterator for &'a AttributeModel {
    type Item = &'a AttributeAccessor;
    type IntoIter = std::slice::Iter<'a, AttributeAccessor>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Whether a member is an attribute accessor: no parameters and a return value
pub fn is_attribute_member(member: &MemberDescriptor) -> bool {
    member.params.is_empty() && member.return_type != ValueType::Void
}

/// Description of an attribute for messages and logs
pub fn describe(kind_name: Option<&str>, attribute: Option<&str>) -> String {
    let Some(attribute) = attribute else {
        return "(none)".to_string();
    };
    match kind_name {
        Some(kind) => format!("attribute '{}' in annotation [{}]", attribute, kind),
        None => format!("attribute '{}'", attribute),
    }
}

/// Cache of attribute models keyed by record kind
///
/// Computation is a pure function of the kind, so concurrent misses for the
/// same kind may both compute; the last insert wins and both results are equal.
#[derive(Debug, Default)]
pub struct AttributeModels {
    cache: DashMap<TypeId, Arc<AttributeModel>>,
}

impl AttributeModels {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Model for a kind; `None` yields the shared empty model
    pub fn for_kind<I: Introspector + ?Sized>(
        &self,
        introspector: &I,
        kind: Option<TypeId>,
    ) -> IntrospectionResult<Arc<AttributeModel>> {
        let Some(kind) = kind else {
            return Ok(AttributeModel::none());
        };
        if let Some(model) = self.cache.get(&kind).map(|entry| entry.clone()) {
            return Ok(model);
        }
        let model = AttributeModel::compute(introspector, kind, true)?;
        trace!(target: "heritage::cache", kind = %kind, attributes = model.len(),
            "Computed attribute model");
        self.cache.insert(kind, model.clone());
        Ok(model)
    }

    /// Drop every cached model
    pub fn clear(&self) {
        self.cache.clear();
    }

    /// Number of cached models
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Whether nothing is cached
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}
