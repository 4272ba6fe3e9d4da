//! Core type definitions for the heritage type model

use std::fmt;

use crate::value::AttributeValue;

/// Unique identifier for a type in an introspector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub(crate) u32);

impl TypeId {
    /// Raw index of this type
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeId({})", self.0)
    }
}

/// Unique identifier for a behavior member (method) in an introspector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MemberId(pub(crate) u32);

impl MemberId {
    /// Raw index of this member
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MemberId({})", self.0)
    }
}

/// Something metadata records can be attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Element {
    /// A type descriptor
    Type(TypeId),
    /// A behavior member
    Member(MemberId),
    /// A parameter of a behavior member
    Parameter {
        /// Owning member
        member: MemberId,
        /// Zero-based parameter position
        index: usize,
    },
}

impl Element {
    /// Whether this element has a stable identity that may be used as a cache key
    pub fn is_stable(&self) -> bool {
        matches!(self, Element::Type(_) | Element::Member(_))
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Element::Type(id) => write!(f, "{}", id),
            Element::Member(id) => write!(f, "{}", id),
            Element::Parameter { member, index } => write!(f, "{}#param{}", member, index),
        }
    }
}

/// Flavor of a type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// A class with an optional superclass
    Class,
    /// An interface; has no superclass
    Interface,
    /// A metadata-record kind
    Annotation,
    /// An enumeration
    Enum,
}

/// Member visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Visibility {
    /// Visible everywhere
    #[default]
    Public,
    /// Visible to subtypes
    Protected,
    /// Visible within the declaring namespace
    Package,
    /// Visible only to the declaring type
    Private,
}

/// Declared type parameter: `T` or `T extends Bound`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeParam {
    /// Parameter name
    pub name: String,
    /// Upper bound; the root type when absent
    pub bound: Option<TypeId>,
}

impl TypeParam {
    /// Unbounded type parameter
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bound: None,
        }
    }

    /// Bounded type parameter
    pub fn bounded(name: impl Into<String>, bound: TypeId) -> Self {
        Self {
            name: name.into(),
            bound: Some(bound),
        }
    }
}

/// A type argument as written in a signature or supertype reference
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeArg {
    /// A concrete type
    Concrete(TypeId),
    /// A type variable of the enclosing declaration
    Var(String),
}

impl From<TypeId> for TypeArg {
    fn from(id: TypeId) -> Self {
        TypeArg::Concrete(id)
    }
}

impl From<&str> for TypeArg {
    fn from(name: &str) -> Self {
        TypeArg::Var(name.to_string())
    }
}

/// Reference to a supertype, with type arguments: `Repo<Item>`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeRef {
    /// Referenced type
    pub target: TypeId,
    /// Type arguments, positionally matching the target's type parameters
    pub args: Vec<TypeArg>,
}

impl TypeRef {
    /// Reference without type arguments
    pub fn raw(target: TypeId) -> Self {
        Self {
            target,
            args: Vec::new(),
        }
    }

    /// Reference with type arguments
    pub fn generic(target: TypeId, args: Vec<TypeArg>) -> Self {
        Self { target, args }
    }
}

impl From<TypeId> for TypeRef {
    fn from(id: TypeId) -> Self {
        TypeRef::raw(id)
    }
}

/// Declared value type of an attribute or member return
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// No value
    Void,
    /// Boolean
    Bool,
    /// Integer
    Int,
    /// Floating point
    Float,
    /// String
    Str,
    /// Reference to a type
    Type,
    /// Constant of an enumeration
    Enum(TypeId),
    /// Nested metadata record of the given kind
    Record(TypeId),
    /// Array of the element type
    Array(Box<ValueType>),
}

impl ValueType {
    /// Array of this type
    pub fn array_of(element: ValueType) -> Self {
        ValueType::Array(Box::new(element))
    }

    /// Whether reading a value of this type may fail lazily because a
    /// referenced type cannot be resolved
    pub fn is_deferred_resolution(&self) -> bool {
        match self {
            ValueType::Type | ValueType::Enum(_) => true,
            ValueType::Array(element) => matches!(**element, ValueType::Type),
            _ => false,
        }
    }

    /// Whether this is a metadata record or an array of them
    pub fn is_nested_record(&self) -> bool {
        match self {
            ValueType::Record(_) => true,
            ValueType::Array(element) => matches!(**element, ValueType::Record(_)),
            _ => false,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Void => write!(f, "void"),
            ValueType::Bool => write!(f, "bool"),
            ValueType::Int => write!(f, "int"),
            ValueType::Float => write!(f, "float"),
            ValueType::Str => write!(f, "string"),
            ValueType::Type => write!(f, "type"),
            ValueType::Enum(id) => write!(f, "enum:{}", id),
            ValueType::Record(id) => write!(f, "record:{}", id),
            ValueType::Array(element) => write!(f, "{}[]", element),
        }
    }
}

/// Description of a type
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDescriptor {
    /// Type id
    pub id: TypeId,
    /// Fully qualified name
    pub name: String,
    /// Type flavor
    pub kind: TypeKind,
    /// Declared type parameters
    pub type_params: Vec<TypeParam>,
    /// Superclass reference (classes only)
    pub superclass: Option<TypeRef>,
    /// Implemented (or extended, for interfaces) interfaces in declaration order
    pub interfaces: Vec<TypeRef>,
    /// Lexically enclosing type
    pub enclosing: Option<TypeId>,
    /// Records of this kind are visible on subclasses (annotation kinds only)
    pub inherited: bool,
    pub(crate) present: bool,
}

impl TypeDescriptor {
    /// Whether the type can be loaded
    pub fn is_present(&self) -> bool {
        self.present
    }

    /// Whether this is an interface
    pub fn is_interface(&self) -> bool {
        self.kind == TypeKind::Interface
    }

    /// Whether this is a metadata-record kind
    pub fn is_annotation(&self) -> bool {
        self.kind == TypeKind::Annotation
    }

    /// Look up a declared type parameter by name
    pub fn type_param(&self, name: &str) -> Option<(usize, &TypeParam)> {
        self.type_params
            .iter()
            .enumerate()
            .find(|(_, param)| param.name == name)
    }
}

/// Description of a behavior member
#[derive(Debug, Clone, PartialEq)]
pub struct MemberDescriptor {
    /// Member id
    pub id: MemberId,
    /// Member name
    pub name: String,
    /// Declaring type
    pub declaring_type: TypeId,
    /// Visibility
    pub visibility: Visibility,
    /// Parameter types as declared (may reference type variables)
    pub params: Vec<TypeArg>,
    /// Declared return type
    pub return_type: ValueType,
    /// Default value (attribute members of annotation kinds)
    pub default_value: Option<AttributeValue>,
    /// Original member this synthetic bridge shadows
    pub bridge_of: Option<MemberId>,
}

impl MemberDescriptor {
    /// Whether the member is private
    pub fn is_private(&self) -> bool {
        self.visibility == Visibility::Private
    }

    /// Whether the member is a synthetic bridge
    pub fn is_bridge(&self) -> bool {
        self.bridge_of.is_some()
    }

    /// Number of declared parameters
    pub fn param_count(&self) -> usize {
        self.params.len()
    }
}
