//! Metadata records and their attribute values

use std::fmt;

use crate::ty::TypeId;

/// Value of a metadata record attribute
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    /// Boolean value
    Bool(bool),
    /// Integer value
    Int(i64),
    /// Floating point value
    Float(f64),
    /// String value
    Str(String),
    /// Reference to a type
    Type(TypeId),
    /// Enumeration constant
    Enum {
        /// Enumeration type
        ty: TypeId,
        /// Constant name
        constant: String,
    },
    /// Nested metadata record
    Record(Box<MetadataRecord>),
    /// Array of values
    Array(Vec<AttributeValue>),
}

impl AttributeValue {
    /// String value
    pub fn str(value: impl Into<String>) -> Self {
        AttributeValue::Str(value.into())
    }

    /// Enumeration constant
    pub fn enum_constant(ty: TypeId, constant: impl Into<String>) -> Self {
        AttributeValue::Enum {
            ty,
            constant: constant.into(),
        }
    }

    /// Every type referenced by this value, including inside arrays and enum constants
    ///
    /// Nested records are not descended into; their own attributes are read separately.
    pub fn referenced_types(&self) -> Vec<TypeId> {
        let mut out = Vec::new();
        self.collect_types(&mut out);
        out
    }

    fn collect_types(&self, out: &mut Vec<TypeId>) {
        match self {
            AttributeValue::Type(ty) => out.push(*ty),
            AttributeValue::Enum { ty, .. } => out.push(*ty),
            AttributeValue::Array(items) => items.iter().for_each(|item| item.collect_types(out)),
            _ => {}
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Bool(b) => write!(f, "{}", b),
            AttributeValue::Int(i) => write!(f, "{}", i),
            AttributeValue::Float(x) => write!(f, "{}", x),
            AttributeValue::Str(s) => write!(f, "{:?}", s),
            AttributeValue::Type(ty) => write!(f, "{}", ty),
            AttributeValue::Enum { ty, constant } => write!(f, "{}.{}", ty, constant),
            AttributeValue::Record(record) => write!(f, "{}", record),
            AttributeValue::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}

/// An instance of a metadata-record kind attached to an element
///
/// Equality is value-based: two records are equal when they have the same
/// kind and the same attribute values in the same order.
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataRecord {
    kind: TypeId,
    values: Vec<(String, AttributeValue)>,
}

impl MetadataRecord {
    /// Create a record with no explicit values
    pub fn new(kind: TypeId) -> Self {
        Self {
            kind,
            values: Vec::new(),
        }
    }

    /// Set an attribute value
    pub fn with(mut self, name: impl Into<String>, value: AttributeValue) -> Self {
        let name = name.into();
        match self.values.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.values.push((name, value)),
        }
        self
    }

    /// Record kind
    pub fn kind(&self) -> TypeId {
        self.kind
    }

    /// Explicitly provided value for the named attribute
    pub fn value(&self, name: &str) -> Option<&AttributeValue> {
        self.values
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, value)| value)
    }

    /// All explicitly provided values
    pub fn values(&self) -> &[(String, AttributeValue)] {
        &self.values
    }
}

impl fmt::Display for MetadataRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}(", self.kind)?;
        for (i, (name, value)) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}={}", name, value)?;
        }
        write!(f, ")")
    }
}
