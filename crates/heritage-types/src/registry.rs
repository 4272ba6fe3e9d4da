//! In-memory type model
//!
//! [`TypeRegistry`] is an [`Introspector`] backed by plain tables. Types and
//! members are added with builder-style definitions; records are attached to
//! types, members, or parameters. Types may be declared *absent*: known by
//! name but not loadable, which makes every query that needs them fail with
//! [`IntrospectionError::TypeNotPresent`].

use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::IntrospectionError;
use crate::generics;
use crate::introspect::{IntrospectionResult, Introspector};
use crate::ty::{
    Element, MemberDescriptor, MemberId, TypeArg, TypeDescriptor, TypeId, TypeKind, TypeParam,
    TypeRef, ValueType, Visibility,
};
use crate::value::{AttributeValue, MetadataRecord};

/// Name of the root type every registry starts with
pub const ROOT_TYPE_NAME: &str = "lang.Object";

/// Definition for a type to be added to a registry
#[derive(Debug, Clone)]
pub struct TypeDefinition {
    /// Fully qualified name
    pub name: String,
    /// Type flavor
    pub kind: TypeKind,
    /// Declared type parameters
    pub type_params: Vec<TypeParam>,
    /// Superclass; classes default to the root type
    pub superclass: Option<TypeRef>,
    /// Implemented interfaces in declaration order
    pub interfaces: Vec<TypeRef>,
    /// Lexically enclosing type
    pub enclosing: Option<TypeId>,
    /// Records of this kind are visible on subclasses
    pub inherited: bool,
    /// Records declared on the type
    pub annotations: Vec<MetadataRecord>,
}

impl TypeDefinition {
    fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            type_params: Vec::new(),
            superclass: None,
            interfaces: Vec::new(),
            enclosing: None,
            inherited: false,
            annotations: Vec::new(),
        }
    }

    /// A class
    pub fn class(name: impl Into<String>) -> Self {
        Self::new(name, TypeKind::Class)
    }

    /// An interface
    pub fn interface(name: impl Into<String>) -> Self {
        Self::new(name, TypeKind::Interface)
    }

    /// A metadata-record kind
    pub fn annotation(name: impl Into<String>) -> Self {
        Self::new(name, TypeKind::Annotation)
    }

    /// An enumeration
    pub fn enumeration(name: impl Into<String>) -> Self {
        Self::new(name, TypeKind::Enum)
    }

    /// Add a type parameter
    pub fn with_type_param(mut self, param: TypeParam) -> Self {
        self.type_params.push(param);
        self
    }

    /// Set the superclass
    pub fn extends(mut self, superclass: impl Into<TypeRef>) -> Self {
        self.superclass = Some(superclass.into());
        self
    }

    /// Add an implemented interface
    pub fn implements(mut self, interface: impl Into<TypeRef>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    /// Set the enclosing type
    pub fn enclosed_in(mut self, enclosing: TypeId) -> Self {
        self.enclosing = Some(enclosing);
        self
    }

    /// Mark the kind as inherited by subclasses
    pub fn inherited(mut self) -> Self {
        self.inherited = true;
        self
    }

    /// Declare a record on the type
    pub fn annotated(mut self, record: MetadataRecord) -> Self {
        self.annotations.push(record);
        self
    }
}

/// Definition for a behavior member to be added to a type
#[derive(Debug, Clone)]
pub struct MemberDefinition {
    /// Member name
    pub name: String,
    /// Visibility
    pub visibility: Visibility,
    /// Parameter types
    pub params: Vec<TypeArg>,
    /// Return type
    pub return_type: ValueType,
    /// Default value (attribute members)
    pub default_value: Option<AttributeValue>,
    /// Member this bridge shadows
    pub bridge_of: Option<MemberId>,
    /// Records declared on the member
    pub annotations: Vec<MetadataRecord>,
    /// Records declared on parameters
    pub parameter_annotations: Vec<(usize, MetadataRecord)>,
}

impl MemberDefinition {
    /// A public member returning nothing
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            visibility: Visibility::Public,
            params: Vec::new(),
            return_type: ValueType::Void,
            default_value: None,
            bridge_of: None,
            annotations: Vec::new(),
            parameter_annotations: Vec::new(),
        }
    }

    /// An attribute member of a metadata-record kind
    pub fn attribute(name: impl Into<String>, value_type: ValueType) -> Self {
        Self::new(name).returns(value_type)
    }

    /// Add a parameter
    pub fn with_param(mut self, param: impl Into<TypeArg>) -> Self {
        self.params.push(param.into());
        self
    }

    /// Set the return type
    pub fn returns(mut self, value_type: ValueType) -> Self {
        self.return_type = value_type;
        self
    }

    /// Set the default value
    pub fn with_default(mut self, value: AttributeValue) -> Self {
        self.default_value = Some(value);
        self
    }

    /// Set visibility
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Mark as private
    pub fn private(self) -> Self {
        self.with_visibility(Visibility::Private)
    }

    /// Mark as a synthetic bridge for `original`
    pub fn bridge_of(mut self, original: MemberId) -> Self {
        self.bridge_of = Some(original);
        self
    }

    /// Declare a record on the member
    pub fn annotated(mut self, record: MetadataRecord) -> Self {
        self.annotations.push(record);
        self
    }

    /// Declare a record on a parameter
    pub fn annotate_param(mut self, index: usize, record: MetadataRecord) -> Self {
        self.parameter_annotations.push((index, record));
        self
    }
}

/// In-memory [`Introspector`]
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    types: Vec<TypeDescriptor>,
    members: Vec<MemberDescriptor>,
    type_members: Vec<Vec<MemberId>>,
    by_name: FxHashMap<String, TypeId>,
    records: FxHashMap<Element, Vec<Arc<MetadataRecord>>>,
    root: TypeId,
}

impl TypeRegistry {
    /// Create a registry containing only the root type
    pub fn new() -> Self {
        let mut registry = Self {
            types: Vec::new(),
            members: Vec::new(),
            type_members: Vec::new(),
            by_name: FxHashMap::default(),
            records: FxHashMap::default(),
            root: TypeId(0),
        };
        registry.root = registry.insert(TypeDescriptor {
            id: TypeId(0),
            name: ROOT_TYPE_NAME.to_string(),
            kind: TypeKind::Class,
            type_params: Vec::new(),
            superclass: None,
            interfaces: Vec::new(),
            enclosing: None,
            inherited: false,
            present: true,
        });
        registry
    }

    fn insert(&mut self, mut descriptor: TypeDescriptor) -> TypeId {
        if let Some(&existing) = self.by_name.get(&descriptor.name) {
            descriptor.id = existing;
            self.types[existing.index()] = descriptor;
            return existing;
        }
        let id = TypeId(self.types.len() as u32);
        descriptor.id = id;
        self.by_name.insert(descriptor.name.clone(), id);
        self.types.push(descriptor);
        self.type_members.push(Vec::new());
        id
    }

    /// The root type
    pub fn root(&self) -> TypeId {
        self.root
    }

    /// Number of registered types, including the root
    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    /// Add a type; redefining a name (for example one declared absent) replaces it
    pub fn define(&mut self, definition: TypeDefinition) -> TypeId {
        let superclass = match definition.kind {
            TypeKind::Class | TypeKind::Enum => definition
                .superclass
                .or_else(|| Some(TypeRef::raw(self.root))),
            TypeKind::Interface | TypeKind::Annotation => None,
        };
        let id = self.insert(TypeDescriptor {
            id: TypeId(0),
            name: definition.name,
            kind: definition.kind,
            type_params: definition.type_params,
            superclass,
            interfaces: definition.interfaces,
            enclosing: definition.enclosing,
            inherited: definition.inherited,
            present: true,
        });
        for record in definition.annotations {
            self.annotate(Element::Type(id), record);
        }
        id
    }

    /// Register a type known only by name; it cannot be loaded
    pub fn declare_absent(&mut self, name: impl Into<String>) -> TypeId {
        let name = name.into();
        if let Some(&existing) = self.by_name.get(&name) {
            self.types[existing.index()].present = false;
            return existing;
        }
        self.insert(TypeDescriptor {
            id: TypeId(0),
            name,
            kind: TypeKind::Class,
            type_params: Vec::new(),
            superclass: None,
            interfaces: Vec::new(),
            enclosing: None,
            inherited: false,
            present: false,
        })
    }

    /// Add a member to a type
    pub fn add_member(&mut self, ty: TypeId, definition: MemberDefinition) -> MemberId {
        let id = MemberId(self.members.len() as u32);
        self.members.push(MemberDescriptor {
            id,
            name: definition.name,
            declaring_type: ty,
            visibility: definition.visibility,
            params: definition.params,
            return_type: definition.return_type,
            default_value: definition.default_value,
            bridge_of: definition.bridge_of,
        });
        self.type_members[ty.index()].push(id);
        for record in definition.annotations {
            self.annotate(Element::Member(id), record);
        }
        for (index, record) in definition.parameter_annotations {
            self.annotate(Element::Parameter { member: id, index }, record);
        }
        id
    }

    /// Attach a record to an element
    pub fn annotate(&mut self, element: Element, record: MetadataRecord) {
        self.records
            .entry(element)
            .or_default()
            .push(Arc::new(record));
    }

    /// Look up a type by name
    pub fn lookup(&self, name: &str) -> Option<TypeId> {
        self.by_name.get(name).copied()
    }

    /// First member of `ty` with the given name
    pub fn find_member(&self, ty: TypeId, name: &str) -> Option<MemberId> {
        self.type_members
            .get(ty.index())?
            .iter()
            .copied()
            .find(|id| self.members[id.index()].name == name)
    }

    /// All members of `ty` with the given name, in declaration order
    pub fn members_named(&self, ty: TypeId, name: &str) -> Vec<MemberId> {
        self.type_members
            .get(ty.index())
            .map(|members| {
                members
                    .iter()
                    .copied()
                    .filter(|id| self.members[id.index()].name == name)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub(crate) fn descriptor(&self, ty: TypeId) -> Option<&TypeDescriptor> {
        self.types.get(ty.index())
    }

    pub(crate) fn member(&self, member: MemberId) -> Option<&MemberDescriptor> {
        self.members.get(member.index())
    }

    /// Descriptor of a type that must be loadable
    fn load(&self, ty: TypeId) -> IntrospectionResult<&TypeDescriptor> {
        let descriptor = self
            .descriptor(ty)
            .ok_or(IntrospectionError::UnknownType(ty))?;
        if !descriptor.present {
            return Err(IntrospectionError::TypeNotPresent {
                name: descriptor.name.clone(),
            });
        }
        Ok(descriptor)
    }

    fn load_member(&self, member: MemberId) -> IntrospectionResult<&MemberDescriptor> {
        let descriptor = self
            .member(member)
            .ok_or(IntrospectionError::UnknownMember(member))?;
        self.load(descriptor.declaring_type)?;
        Ok(descriptor)
    }

    fn is_present(&self, ty: TypeId) -> bool {
        self.descriptor(ty).is_some_and(|d| d.present)
    }

    fn records_of(&self, element: Element) -> Vec<Arc<MetadataRecord>> {
        self.records
            .get(&element)
            .map(|records| {
                records
                    .iter()
                    .filter(|record| self.is_present(record.kind()))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    fn collect_public(
        &self,
        ty: TypeId,
        seen: &mut FxHashSet<TypeId>,
        out: &mut Vec<MemberId>,
    ) -> IntrospectionResult<()> {
        if !seen.insert(ty) {
            return Ok(());
        }
        let descriptor = self.load(ty)?;
        out.extend(
            self.type_members[ty.index()]
                .iter()
                .copied()
                .filter(|id| self.members[id.index()].visibility == Visibility::Public),
        );
        for interface in &descriptor.interfaces {
            self.collect_public(interface.target, seen, out)?;
        }
        if let Some(superclass) = &descriptor.superclass {
            self.collect_public(superclass.target, seen, out)?;
        }
        Ok(())
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl Introspector for TypeRegistry {
    fn root_type(&self) -> TypeId {
        self.root
    }

    fn type_descriptor(&self, ty: TypeId) -> IntrospectionResult<&TypeDescriptor> {
        self.descriptor(ty).ok_or(IntrospectionError::UnknownType(ty))
    }

    fn member_descriptor(&self, member: MemberId) -> IntrospectionResult<&MemberDescriptor> {
        self.member(member)
            .ok_or(IntrospectionError::UnknownMember(member))
    }

    fn superclass(&self, ty: TypeId) -> IntrospectionResult<Option<TypeId>> {
        match &self.load(ty)?.superclass {
            Some(reference) => {
                self.load(reference.target)?;
                Ok(Some(reference.target))
            }
            None => Ok(None),
        }
    }

    fn interfaces(&self, ty: TypeId) -> IntrospectionResult<Vec<TypeId>> {
        self.load(ty)?
            .interfaces
            .iter()
            .map(|reference| self.load(reference.target).map(|_| reference.target))
            .collect()
    }

    fn enclosing_type(&self, ty: TypeId) -> IntrospectionResult<Option<TypeId>> {
        match self.load(ty)?.enclosing {
            Some(enclosing) => {
                self.load(enclosing)?;
                Ok(Some(enclosing))
            }
            None => Ok(None),
        }
    }

    fn declared_annotations(
        &self,
        element: Element,
    ) -> IntrospectionResult<Vec<Arc<MetadataRecord>>> {
        match element {
            Element::Type(ty) => {
                self.load(ty)?;
            }
            Element::Member(member) => {
                self.load_member(member)?;
            }
            Element::Parameter { member, index } => {
                let descriptor = self.load_member(member)?;
                if index >= descriptor.param_count() {
                    return Err(IntrospectionError::Inconsistent {
                        reason: format!(
                            "parameter {} out of range for member '{}'",
                            index, descriptor.name
                        ),
                    });
                }
            }
        }
        Ok(self.records_of(element))
    }

    fn annotations(&self, ty: TypeId) -> IntrospectionResult<Vec<Arc<MetadataRecord>>> {
        let mut visible = self.declared_annotations(Element::Type(ty))?;
        let mut current = self.superclass(ty)?;
        while let Some(ancestor) = current {
            for record in self.records_of(Element::Type(ancestor)) {
                let inherited = self
                    .descriptor(record.kind())
                    .is_some_and(|kind| kind.inherited);
                if inherited && !visible.iter().any(|r| r.kind() == record.kind()) {
                    visible.push(record);
                }
            }
            current = self.superclass(ancestor)?;
        }
        Ok(visible)
    }

    fn declared_members(&self, ty: TypeId) -> IntrospectionResult<Vec<MemberId>> {
        self.load(ty)?;
        Ok(self.type_members[ty.index()].clone())
    }

    fn public_members(&self, ty: TypeId) -> IntrospectionResult<Vec<MemberId>> {
        let mut out = Vec::new();
        self.collect_public(ty, &mut FxHashSet::default(), &mut out)?;
        Ok(out)
    }

    fn parameter_types(&self, member: MemberId) -> IntrospectionResult<Vec<TypeId>> {
        let descriptor = self.load_member(member)?;
        Ok(descriptor
            .params
            .iter()
            .map(|param| match param {
                TypeArg::Concrete(ty) => *ty,
                TypeArg::Var(name) => generics::erasure(self, descriptor.declaring_type, name),
            })
            .collect())
    }

    fn resolve_parameter_type(
        &self,
        member: MemberId,
        index: usize,
        against: TypeId,
    ) -> IntrospectionResult<Option<TypeId>> {
        generics::resolve_parameter(self, member, index, against)
    }

    fn is_assignable_from(&self, target: TypeId, source: TypeId) -> IntrospectionResult<bool> {
        if target == source || target == self.root {
            return Ok(true);
        }
        let mut stack = vec![source];
        let mut seen = FxHashSet::default();
        while let Some(ty) = stack.pop() {
            if !seen.insert(ty) {
                continue;
            }
            let descriptor = self.type_descriptor(ty)?;
            for reference in descriptor.superclass.iter().chain(&descriptor.interfaces) {
                if reference.target == target {
                    return Ok(true);
                }
                stack.push(reference.target);
            }
        }
        Ok(false)
    }

    fn bridged_member(&self, member: MemberId) -> IntrospectionResult<MemberId> {
        Ok(self.member_descriptor(member)?.bridge_of.unwrap_or(member))
    }

    fn read_attribute(
        &self,
        record: &MetadataRecord,
        attribute: MemberId,
    ) -> IntrospectionResult<AttributeValue> {
        let descriptor = self.member_descriptor(attribute)?;
        let value = record
            .value(&descriptor.name)
            .or(descriptor.default_value.as_ref())
            .cloned()
            .ok_or_else(|| IntrospectionError::MissingAttribute {
                attribute: descriptor.name.clone(),
                kind: self
                    .type_name(record.kind())
                    .unwrap_or("<unknown>")
                    .to_string(),
            })?;
        for referenced in value.referenced_types() {
            self.load(referenced)?;
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_registry_has_root() {
        let registry = TypeRegistry::new();
        assert_eq!(registry.type_count(), 1);
        assert_eq!(registry.type_name(registry.root()).unwrap(), ROOT_TYPE_NAME);
        assert_eq!(registry.superclass(registry.root()).unwrap(), None);
    }

    #[test]
    fn test_classes_default_to_root_superclass() {
        let mut registry = TypeRegistry::new();
        let a = registry.define(TypeDefinition::class("acme.A"));
        let i = registry.define(TypeDefinition::interface("acme.I"));

        assert_eq!(registry.superclass(a).unwrap(), Some(registry.root()));
        assert_eq!(registry.superclass(i).unwrap(), None);
    }

    #[test]
    fn test_absent_type_fails_to_load() {
        let mut registry = TypeRegistry::new();
        let missing = registry.declare_absent("ext.Missing");
        let a = registry.define(TypeDefinition::class("acme.A").implements(missing));

        assert!(matches!(
            registry.interfaces(a),
            Err(IntrospectionError::TypeNotPresent { .. })
        ));
        assert!(registry.declared_annotations(Element::Type(missing)).is_err());
        assert!(registry.type_descriptor(missing).is_ok());
    }

    #[test]
    fn test_redefine_absent_type() {
        let mut registry = TypeRegistry::new();
        let forward = registry.declare_absent("acme.Later");
        let defined = registry.define(TypeDefinition::class("acme.Later"));
        assert_eq!(forward, defined);
        assert!(registry.type_descriptor(defined).unwrap().is_present());
    }

    #[test]
    fn test_records_of_absent_kind_are_omitted() {
        let mut registry = TypeRegistry::new();
        let gone = registry.declare_absent("ext.Gone");
        let kept = registry.define(TypeDefinition::annotation("acme.Kept"));
        let a = registry.define(
            TypeDefinition::class("acme.A")
                .annotated(MetadataRecord::new(gone))
                .annotated(MetadataRecord::new(kept)),
        );

        let records = registry.declared_annotations(Element::Type(a)).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].kind(), kept);
    }

    #[test]
    fn test_inherited_annotations_visible_on_subclass() {
        let mut registry = TypeRegistry::new();
        let inherited = registry.define(TypeDefinition::annotation("acme.Inherited").inherited());
        let plain = registry.define(TypeDefinition::annotation("acme.Plain"));
        let base = registry.define(
            TypeDefinition::class("acme.Base")
                .annotated(MetadataRecord::new(inherited))
                .annotated(MetadataRecord::new(plain)),
        );
        let sub = registry.define(TypeDefinition::class("acme.Sub").extends(base));

        let visible = registry.annotations(sub).unwrap();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].kind(), inherited);
    }

    #[test]
    fn test_read_attribute_uses_default() {
        let mut registry = TypeRegistry::new();
        let retry = registry.define(TypeDefinition::annotation("acme.Retry"));
        let attempts = registry.add_member(
            retry,
            MemberDefinition::attribute("attempts", ValueType::Int)
                .with_default(AttributeValue::Int(3)),
        );

        let record = MetadataRecord::new(retry);
        assert_eq!(
            registry.read_attribute(&record, attempts).unwrap(),
            AttributeValue::Int(3)
        );
        let explicit = MetadataRecord::new(retry).with("attempts", AttributeValue::Int(5));
        assert_eq!(
            registry.read_attribute(&explicit, attempts).unwrap(),
            AttributeValue::Int(5)
        );
    }

    #[test]
    fn test_read_attribute_with_missing_type_fails() {
        let mut registry = TypeRegistry::new();
        let missing = registry.declare_absent("ext.Missing");
        let kind = registry.define(TypeDefinition::annotation("acme.Uses"));
        let on = registry.add_member(kind, MemberDefinition::attribute("on", ValueType::Type));

        let record = MetadataRecord::new(kind).with("on", AttributeValue::Type(missing));
        assert_eq!(
            registry.read_attribute(&record, on),
            Err(IntrospectionError::TypeNotPresent {
                name: "ext.Missing".to_string()
            })
        );
    }

    #[test]
    fn test_generic_parameter_resolution() {
        let mut registry = TypeRegistry::new();
        let item = registry.define(TypeDefinition::class("acme.Item"));
        let repo = registry.define(
            TypeDefinition::interface("acme.Repo").with_type_param(TypeParam::new("T")),
        );
        let save = registry.add_member(repo, MemberDefinition::new("save").with_param("T"));
        let items = registry.define(
            TypeDefinition::class("acme.Items")
                .implements(TypeRef::generic(repo, vec![TypeArg::Concrete(item)])),
        );

        assert_eq!(registry.parameter_types(save).unwrap(), vec![registry.root()]);
        assert_eq!(
            registry.resolve_parameter_type(save, 0, items).unwrap(),
            Some(item)
        );
        assert!(registry.is_assignable_from(repo, items).unwrap());
        assert!(!registry.is_assignable_from(items, repo).unwrap());
    }

    #[test]
    fn test_generic_resolution_through_intermediate_type() {
        let mut registry = TypeRegistry::new();
        let item = registry.define(TypeDefinition::class("acme.Item"));
        let repo = registry.define(
            TypeDefinition::interface("acme.Repo").with_type_param(TypeParam::new("T")),
        );
        let save = registry.add_member(repo, MemberDefinition::new("save").with_param("T"));
        let base = registry.define(
            TypeDefinition::class("acme.BaseRepo")
                .with_type_param(TypeParam::new("E"))
                .implements(TypeRef::generic(repo, vec![TypeArg::Var("E".into())])),
        );
        let items = registry.define(
            TypeDefinition::class("acme.Items")
                .extends(TypeRef::generic(base, vec![TypeArg::Concrete(item)])),
        );

        assert_eq!(
            registry.resolve_parameter_type(save, 0, items).unwrap(),
            Some(item)
        );
        // unresolved at the intermediate level: erases to the root
        assert_eq!(
            registry.resolve_parameter_type(save, 0, base).unwrap(),
            Some(registry.root())
        );
    }

    #[test]
    fn test_interface_public_members_include_super_interfaces() {
        let mut registry = TypeRegistry::new();
        let i0 = registry.define(TypeDefinition::interface("acme.I0"));
        let base = registry.add_member(i0, MemberDefinition::new("base"));
        let i1 = registry.define(TypeDefinition::interface("acme.I1").implements(i0));
        let own = registry.add_member(i1, MemberDefinition::new("own"));
        registry.add_member(i1, MemberDefinition::new("hidden").private());

        assert_eq!(registry.public_members(i1).unwrap(), vec![own, base]);
        assert_eq!(registry.declared_members(i1).unwrap().len(), 2);
    }

    #[test]
    fn test_bridged_member() {
        let mut registry = TypeRegistry::new();
        let a = registry.define(TypeDefinition::class("acme.A"));
        let original = registry.add_member(a, MemberDefinition::new("save"));
        let bridge = registry.add_member(a, MemberDefinition::new("save").bridge_of(original));

        assert_eq!(registry.bridged_member(bridge).unwrap(), original);
        assert_eq!(registry.bridged_member(original).unwrap(), original);
        assert_eq!(registry.members_named(a, "save"), vec![original, bridge]);
    }
}
