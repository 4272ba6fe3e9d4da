//! JSON type models
//!
//! A model file lists types by name; every cross-reference (supertypes,
//! record kinds, attribute values) is also written by name and resolved when
//! the model is loaded into a [`TypeRegistry`].
//!
//! ```json
//! {
//!   "types": [
//!     { "name": "acme.Audited", "kind": "annotation" },
//!     { "name": "acme.A", "annotations": [ { "kind": "acme.Audited" } ] },
//!     { "name": "acme.B", "extends": "acme.A",
//!       "members": [ { "name": "save", "params": ["acme.A"] } ] }
//!   ]
//! }
//! ```

use std::collections::BTreeMap;

use rustc_hash::FxHashSet;
use serde::Deserialize;

use crate::error::ModelError;
use crate::registry::{MemberDefinition, TypeDefinition, TypeRegistry, ROOT_TYPE_NAME};
use crate::ty::{MemberId, TypeArg, TypeId, TypeKind, TypeParam, TypeRef, ValueType, Visibility};
use crate::value::{AttributeValue, MetadataRecord};

/// Root of a model file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelFile {
    /// Declared types
    #[serde(default)]
    pub types: Vec<TypeSpec>,
}

/// Type flavor as written in a model
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KindSpec {
    /// Class
    #[default]
    Class,
    /// Interface
    Interface,
    /// Metadata-record kind
    Annotation,
    /// Enumeration
    Enum,
}

impl From<KindSpec> for TypeKind {
    fn from(kind: KindSpec) -> Self {
        match kind {
            KindSpec::Class => TypeKind::Class,
            KindSpec::Interface => TypeKind::Interface,
            KindSpec::Annotation => TypeKind::Annotation,
            KindSpec::Enum => TypeKind::Enum,
        }
    }
}

/// One type
#[derive(Debug, Clone, Deserialize)]
pub struct TypeSpec {
    /// Fully qualified name
    pub name: String,
    /// Flavor
    #[serde(default)]
    pub kind: KindSpec,
    /// Type parameters
    #[serde(default)]
    pub type_params: Vec<TypeParamSpec>,
    /// Superclass
    #[serde(default)]
    pub extends: Option<TypeRefSpec>,
    /// Implemented interfaces
    #[serde(default)]
    pub implements: Vec<TypeRefSpec>,
    /// Enclosing type name
    #[serde(default)]
    pub enclosing: Option<String>,
    /// Records of this kind are inherited by subclasses
    #[serde(default)]
    pub inherited: bool,
    /// Known by name only
    #[serde(default)]
    pub absent: bool,
    /// Records declared on the type
    #[serde(default)]
    pub annotations: Vec<RecordSpec>,
    /// Behavior members
    #[serde(default)]
    pub members: Vec<MemberSpec>,
}

/// Type parameter
#[derive(Debug, Clone, Deserialize)]
pub struct TypeParamSpec {
    /// Name
    pub name: String,
    /// Bound type name
    #[serde(default)]
    pub bound: Option<String>,
}

/// Supertype reference: a bare name or a name with arguments
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TypeRefSpec {
    /// Raw reference
    Name(String),
    /// Parameterized reference; arguments are type names or type variables
    Generic {
        /// Referenced type
        name: String,
        /// Type arguments
        #[serde(default)]
        args: Vec<String>,
    },
}

/// Member visibility as written in a model
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisibilitySpec {
    /// Public
    #[default]
    Public,
    /// Protected
    Protected,
    /// Package
    Package,
    /// Private
    Private,
}

impl From<VisibilitySpec> for Visibility {
    fn from(visibility: VisibilitySpec) -> Self {
        match visibility {
            VisibilitySpec::Public => Visibility::Public,
            VisibilitySpec::Protected => Visibility::Protected,
            VisibilitySpec::Package => Visibility::Package,
            VisibilitySpec::Private => Visibility::Private,
        }
    }
}

/// One behavior member
#[derive(Debug, Clone, Deserialize)]
pub struct MemberSpec {
    /// Name
    pub name: String,
    /// Visibility
    #[serde(default)]
    pub visibility: VisibilitySpec,
    /// Parameter types: type names or type variables of the declaring type
    #[serde(default)]
    pub params: Vec<String>,
    /// Return value type, e.g. `string`, `type[]`, `enum:acme.Color`
    #[serde(default)]
    pub returns: Option<String>,
    /// Default value
    #[serde(default)]
    pub default: Option<ValueSpec>,
    /// Name of an earlier member of the same type this bridge shadows
    #[serde(default)]
    pub bridge_of: Option<String>,
    /// Records declared on the member
    #[serde(default)]
    pub annotations: Vec<RecordSpec>,
    /// Records declared on parameters, keyed by position
    #[serde(default)]
    pub parameter_annotations: BTreeMap<usize, Vec<RecordSpec>>,
}

/// A metadata record
#[derive(Debug, Clone, Deserialize)]
pub struct RecordSpec {
    /// Record kind name
    pub kind: String,
    /// Explicit attribute values
    #[serde(default)]
    pub values: BTreeMap<String, ValueSpec>,
}

/// An attribute value
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueSpec {
    /// Boolean
    Bool(bool),
    /// Integer
    Int(i64),
    /// Float
    Float(f64),
    /// String
    Str(String),
    /// Type reference by name
    Type(String),
    /// Enumeration constant
    Enum {
        /// Enumeration type name
        #[serde(rename = "type")]
        ty: String,
        /// Constant
        constant: String,
    },
    /// Nested record
    Record(RecordSpec),
    /// Array
    Array(Vec<ValueSpec>),
}

impl TypeRegistry {
    /// Parse a JSON model and load it
    pub fn from_json_str(json: &str) -> Result<Self, ModelError> {
        let model: ModelFile = serde_json::from_str(json)?;
        Self::from_model(&model)
    }

    /// Load a parsed model
    pub fn from_model(model: &ModelFile) -> Result<Self, ModelError> {
        let mut registry = TypeRegistry::new();

        // reserve ids so forward references resolve
        let mut seen = FxHashSet::default();
        for spec in &model.types {
            if spec.name == ROOT_TYPE_NAME || !seen.insert(spec.name.as_str()) {
                return Err(ModelError::DuplicateType(spec.name.clone()));
            }
            registry.declare_absent(spec.name.clone());
        }

        for spec in model.types.iter().filter(|spec| !spec.absent) {
            let definition = type_definition(&registry, spec)?;
            let id = registry.define(definition);
            let mut defined: Vec<(String, MemberId, bool)> = Vec::new();
            for member in &spec.members {
                let definition = member_definition(&registry, spec, member, &defined)?;
                let is_bridge = definition.bridge_of.is_some();
                let member_id = registry.add_member(id, definition);
                defined.push((member.name.clone(), member_id, is_bridge));
            }
        }
        Ok(registry)
    }
}

fn resolve_name(registry: &TypeRegistry, name: &str, context: &str) -> Result<TypeId, ModelError> {
    registry
        .lookup(name)
        .ok_or_else(|| ModelError::UnknownTypeName {
            name: name.to_string(),
            context: context.to_string(),
        })
}

/// A type variable of the declaring type, or a type name
fn type_arg(registry: &TypeRegistry, owner: &TypeSpec, arg: &str) -> Result<TypeArg, ModelError> {
    if owner.type_params.iter().any(|param| param.name == arg) {
        return Ok(TypeArg::Var(arg.to_string()));
    }
    resolve_name(registry, arg, &owner.name).map(TypeArg::Concrete)
}

fn type_ref(
    registry: &TypeRegistry,
    owner: &TypeSpec,
    spec: &TypeRefSpec,
) -> Result<TypeRef, ModelError> {
    match spec {
        TypeRefSpec::Name(name) => Ok(TypeRef::raw(resolve_name(registry, name, &owner.name)?)),
        TypeRefSpec::Generic { name, args } => {
            let target = resolve_name(registry, name, &owner.name)?;
            let args = args
                .iter()
                .map(|arg| type_arg(registry, owner, arg))
                .collect::<Result<_, _>>()?;
            Ok(TypeRef::generic(target, args))
        }
    }
}

fn type_definition(registry: &TypeRegistry, spec: &TypeSpec) -> Result<TypeDefinition, ModelError> {
    let mut definition = match spec.kind {
        KindSpec::Class => TypeDefinition::class(spec.name.clone()),
        KindSpec::Interface => TypeDefinition::interface(spec.name.clone()),
        KindSpec::Annotation => TypeDefinition::annotation(spec.name.clone()),
        KindSpec::Enum => TypeDefinition::enumeration(spec.name.clone()),
    };
    for param in &spec.type_params {
        definition = definition.with_type_param(match &param.bound {
            Some(bound) => TypeParam::bounded(&param.name, resolve_name(registry, bound, &spec.name)?),
            None => TypeParam::new(&param.name),
        });
    }
    if let Some(superclass) = &spec.extends {
        definition = definition.extends(type_ref(registry, spec, superclass)?);
    }
    for interface in &spec.implements {
        definition = definition.implements(type_ref(registry, spec, interface)?);
    }
    if let Some(enclosing) = &spec.enclosing {
        definition = definition.enclosed_in(resolve_name(registry, enclosing, &spec.name)?);
    }
    if spec.inherited {
        definition = definition.inherited();
    }
    for record in &spec.annotations {
        definition = definition.annotated(record_from(registry, record, &spec.name)?);
    }
    Ok(definition)
}

fn member_definition(
    registry: &TypeRegistry,
    owner: &TypeSpec,
    spec: &MemberSpec,
    defined: &[(String, MemberId, bool)],
) -> Result<MemberDefinition, ModelError> {
    let context = format!("{}#{}", owner.name, spec.name);
    let mut definition = MemberDefinition::new(spec.name.clone()).with_visibility(spec.visibility.into());
    for param in &spec.params {
        definition = definition.with_param(type_arg(registry, owner, param)?);
    }
    if let Some(returns) = &spec.returns {
        definition = definition.returns(parse_value_type(registry, returns)?);
    }
    if let Some(default) = &spec.default {
        definition = definition.with_default(value_from(registry, default, &context)?);
    }
    if let Some(original) = &spec.bridge_of {
        let (_, id, _) = defined
            .iter()
            .find(|(name, _, is_bridge)| name == original && !is_bridge)
            .ok_or_else(|| ModelError::UnknownMemberName {
                name: original.clone(),
                owner: owner.name.clone(),
            })?;
        definition = definition.bridge_of(*id);
    }
    for record in &spec.annotations {
        definition = definition.annotated(record_from(registry, record, &context)?);
    }
    for (index, records) in &spec.parameter_annotations {
        for record in records {
            definition = definition.annotate_param(*index, record_from(registry, record, &context)?);
        }
    }
    Ok(definition)
}

fn record_from(
    registry: &TypeRegistry,
    spec: &RecordSpec,
    context: &str,
) -> Result<MetadataRecord, ModelError> {
    let kind = resolve_name(registry, &spec.kind, context)?;
    let mut record = MetadataRecord::new(kind);
    for (name, value) in &spec.values {
        record = record.with(name.clone(), value_from(registry, value, context)?);
    }
    Ok(record)
}

fn value_from(
    registry: &TypeRegistry,
    spec: &ValueSpec,
    context: &str,
) -> Result<AttributeValue, ModelError> {
    Ok(match spec {
        ValueSpec::Bool(b) => AttributeValue::Bool(*b),
        ValueSpec::Int(i) => AttributeValue::Int(*i),
        ValueSpec::Float(x) => AttributeValue::Float(*x),
        ValueSpec::Str(s) => AttributeValue::Str(s.clone()),
        ValueSpec::Type(name) => AttributeValue::Type(resolve_name(registry, name, context)?),
        ValueSpec::Enum { ty, constant } => {
            AttributeValue::enum_constant(resolve_name(registry, ty, context)?, constant.clone())
        }
        ValueSpec::Record(record) => {
            AttributeValue::Record(Box::new(record_from(registry, record, context)?))
        }
        ValueSpec::Array(items) => AttributeValue::Array(
            items
                .iter()
                .map(|item| value_from(registry, item, context))
                .collect::<Result<_, _>>()?,
        ),
    })
}

/// Parse a value type: `void`, `bool`, `int`, `float`, `string`, `type`,
/// `enum:<name>`, `record:<name>`, each optionally suffixed with `[]`
pub fn parse_value_type(registry: &TypeRegistry, text: &str) -> Result<ValueType, ModelError> {
    let text = text.trim();
    if let Some(element) = text.strip_suffix("[]") {
        return Ok(ValueType::array_of(parse_value_type(registry, element)?));
    }
    let invalid = || ModelError::InvalidValueType(text.to_string());
    Ok(match text {
        "void" => ValueType::Void,
        "bool" => ValueType::Bool,
        "int" => ValueType::Int,
        "float" => ValueType::Float,
        "string" => ValueType::Str,
        "type" => ValueType::Type,
        _ => match text.split_once(':') {
            Some(("enum", name)) => ValueType::Enum(registry.lookup(name).ok_or_else(invalid)?),
            Some(("record", name)) => {
                ValueType::Record(registry.lookup(name).ok_or_else(invalid)?)
            }
            _ => return Err(invalid()),
        },
    })
}
