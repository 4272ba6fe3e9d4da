//! Members of a base type that carry metadata

use std::sync::Arc;

use dashmap::DashMap;
use heritage_types::{Element, IntrospectionResult, Introspector, MemberId, TypeId};
use once_cell::sync::Lazy;
use tracing::trace;

use super::{DeclaredMetadataCache, MetadataLookup};

static NO_MEMBERS: Lazy<Arc<[MemberId]>> = Lazy::new(|| Arc::from(Vec::<MemberId>::new()));

/// Cache of the members of each type that may override a scanned member
///
/// A member qualifies when it is non-private (for classes; every interface
/// member qualifies) and carries at least one non-ignorable record. Used only
/// by member hierarchy walks.
#[derive(Debug, Default)]
pub struct MemberSignatureCache {
    cache: DashMap<TypeId, Arc<[MemberId]>>,
}

impl MemberSignatureCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Qualifying members of `ty`, computed on first access
    pub fn get<I: Introspector + ?Sized>(
        &self,
        lookup: &MetadataLookup<'_, I>,
        declared: &DeclaredMetadataCache,
        ty: TypeId,
    ) -> IntrospectionResult<Arc<[MemberId]>> {
        if ty == lookup.introspector.root_type() || lookup.is_plain_type(ty)? {
            return Ok(NO_MEMBERS.clone());
        }
        if let Some(cached) = self.cache.get(&ty).map(|entry| entry.clone()) {
            return Ok(cached);
        }
        let computed = Self::compute(lookup, declared, ty)?;
        self.cache.insert(ty, computed.clone());
        Ok(computed)
    }

    fn compute<I: Introspector + ?Sized>(
        lookup: &MetadataLookup<'_, I>,
        declared: &DeclaredMetadataCache,
        ty: TypeId,
    ) -> IntrospectionResult<Arc<[MemberId]>> {
        let introspector = lookup.introspector;
        let is_interface = introspector.type_descriptor(ty)?.is_interface();
        let candidates = if is_interface {
            introspector.public_members(ty)?
        } else {
            introspector.declared_members(ty)?
        };

        let mut members = Vec::new();
        for member in candidates {
            let descriptor = introspector.member_descriptor(member)?;
            if !is_interface && descriptor.is_private() {
                continue;
            }
            if lookup.is_plain_type(descriptor.declaring_type)? {
                continue;
            }
            if declared.get(lookup, Element::Member(member))?.is_empty() {
                continue;
            }
            members.push(member);
        }
        trace!(target: "heritage::cache", ty = %ty, members = members.len(),
            "Computed base type members");
        if members.is_empty() {
            return Ok(NO_MEMBERS.clone());
        }
        Ok(Arc::from(members))
    }

    /// Drop every cached entry
    pub fn clear(&self) {
        self.cache.clear();
    }

    /// Number of cached types
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Whether nothing is cached
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}
