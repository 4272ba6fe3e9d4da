//! Hierarchy scanning
//!
//! A scan visits the levels of a type or member hierarchy in a fixed order
//! and hands the declared records of each level to a [`MetadataProcessor`].
//! Levels are numbered by an aggregation index starting at 0 for the source;
//! the index advances only past levels the processor was shown.

mod overrides;
mod processor;
mod strategy;
mod walk;

pub use processor::{ClassFilter, FirstOfKind, Found, Level, LevelCollector, MetadataProcessor};
pub use strategy::SearchStrategy;

use std::sync::Arc;

use heritage_types::{
    Element, IntrospectionResult, Introspector, MemberId, MetadataRecord, TypeId,
};
use tracing::debug;

use crate::attributes::{AttributeModel, AttributeModels};
use crate::cache::{DeclaredMetadataCache, MemberSignatureCache, MetadataLookup, Slot};
use crate::config::ScanConfig;
use crate::failure::FailureHandler;
use crate::filter::{AnnotationFilter, PlainTypes};

use walk::Walk;

/// Scans hierarchies of one platform, owning the caches that back the scans
///
/// Safe to share between threads; all caches are concurrent and no lock is
/// held while a processor runs.
pub struct HierarchyScanner<I> {
    introspector: I,
    plain: PlainTypes,
    ignorable: AnnotationFilter,
    attributes: AttributeModels,
    declared: DeclaredMetadataCache,
    base_members: MemberSignatureCache,
    failures: Arc<dyn FailureHandler>,
}

impl<I: Introspector> HierarchyScanner<I> {
    /// Create a scanner with the default configuration
    pub fn new(introspector: I) -> Self {
        Self::with_config(introspector, &ScanConfig::default())
    }

    /// Create a scanner from a configuration
    pub fn with_config(introspector: I, config: &ScanConfig) -> Self {
        Self {
            introspector,
            plain: config.plain_types(),
            ignorable: config.annotation_filter(),
            attributes: AttributeModels::new(),
            declared: DeclaredMetadataCache::new(),
            base_members: MemberSignatureCache::new(),
            failures: config.failure_policy.handler(),
        }
    }

    /// Replace the failure handler
    pub fn with_failure_handler(mut self, handler: Arc<dyn FailureHandler>) -> Self {
        self.failures = handler;
        self
    }

    /// The platform introspector
    pub fn introspector(&self) -> &I {
        &self.introspector
    }

    /// Attribute model cache
    pub fn attributes(&self) -> &AttributeModels {
        &self.attributes
    }

    /// Declared-records cache
    pub fn declared_cache(&self) -> &DeclaredMetadataCache {
        &self.declared
    }

    /// Base-type member cache
    pub fn member_cache(&self) -> &MemberSignatureCache {
        &self.base_members
    }

    /// Collaborators for cache computations
    pub fn lookup(&self) -> MetadataLookup<'_, I> {
        MetadataLookup {
            introspector: &self.introspector,
            attributes: &self.attributes,
            ignorable: &self.ignorable,
            plain: &self.plain,
        }
    }

    /// Attribute model of a record kind
    pub fn attribute_model(&self, kind: TypeId) -> IntrospectionResult<Arc<AttributeModel>> {
        self.attributes.for_kind(&self.introspector, Some(kind))
    }

    /// Scan `source` with `strategy`, returning the processor's result
    pub fn scan<C, P>(
        &self,
        context: &C,
        source: Element,
        strategy: SearchStrategy,
        processor: &mut P,
    ) -> Option<P::Output>
    where
        C: ?Sized,
        P: MetadataProcessor<C>,
    {
        self.scan_filtered(context, source, strategy, processor, None)
    }

    /// Scan `source`, skipping the records of types the filter rejects
    ///
    /// A rejected type still counts as a level in superclass walks; its
    /// records and its members are never delivered.
    pub fn scan_filtered<C, P>(
        &self,
        context: &C,
        source: Element,
        strategy: SearchStrategy,
        processor: &mut P,
        class_filter: Option<&ClassFilter<'_, C>>,
    ) -> Option<P::Output>
    where
        C: ?Sized,
        P: MetadataProcessor<C>,
    {
        debug!(target: "heritage::scan", source = %source, strategy = %strategy, "Scanning");
        let result = Walk::new(self, context, processor, class_filter).run(source, strategy);
        processor.finish(result)
    }

    /// Whether a scan of `source` is certain to deliver no records
    ///
    /// `true` for plain elements, and for elements with no hierarchy to walk
    /// (or any element under [`SearchStrategy::Direct`]) whose declared
    /// records are empty. Bridge members are never known to be empty.
    pub fn is_known_empty(&self, source: Element, strategy: SearchStrategy) -> bool {
        match self.try_known_empty(source, strategy) {
            Ok(empty) => empty,
            Err(error) => {
                self.report(source, &error);
                false
            }
        }
    }

    fn try_known_empty(&self, source: Element, strategy: SearchStrategy) -> IntrospectionResult<bool> {
        let lookup = self.lookup();
        if lookup.is_plain_element(source)? {
            return Ok(true);
        }
        if strategy == SearchStrategy::Direct || self.is_without_hierarchy(source, strategy)? {
            if let Element::Member(member) = source {
                if self.introspector.member_descriptor(member)?.is_bridge() {
                    return Ok(false);
                }
            }
            return Ok(self.declared.get(&lookup, source)?.is_empty());
        }
        Ok(false)
    }

    /// Declared records of an element, holes included
    ///
    /// The shared cached sequence; use [`declared_annotations_copy`](Self::declared_annotations_copy)
    /// for a sequence the caller may modify.
    pub fn declared_annotations(&self, element: Element) -> IntrospectionResult<Arc<[Slot]>> {
        self.declared.get(&self.lookup(), element)
    }

    /// Owned copy of an element's declared records
    pub fn declared_annotations_copy(&self, element: Element) -> IntrospectionResult<Vec<Slot>> {
        self.declared.get_defensive(&self.lookup(), element)
    }

    /// The declared record of `kind` on an element, if present and not filtered
    pub fn declared_annotation(
        &self,
        element: Element,
        kind: TypeId,
    ) -> IntrospectionResult<Option<Arc<MetadataRecord>>> {
        Ok(self
            .declared_annotations(element)?
            .iter()
            .flatten()
            .find(|record| record.kind() == kind)
            .cloned())
    }

    /// Members of `ty` that carry records and may override a scanned member
    pub fn base_type_members(&self, ty: TypeId) -> IntrospectionResult<Arc<[MemberId]>> {
        self.base_members.get(&self.lookup(), &self.declared, ty)
    }

    /// Whether an element is plain
    pub fn is_plain(&self, element: Element) -> IntrospectionResult<bool> {
        self.lookup().is_plain_element(element)
    }

    /// Drop every cached entry
    pub fn clear_caches(&self) {
        self.attributes.clear();
        self.declared.clear();
        self.base_members.clear();
        debug!(target: "heritage::cache", "Cleared caches");
    }

    /// Whether `element` has no supertypes to walk under `strategy`
    pub(crate) fn is_without_hierarchy(
        &self,
        element: Element,
        strategy: SearchStrategy,
    ) -> IntrospectionResult<bool> {
        let root = self.introspector.root_type();
        match element {
            Element::Type(ty) => {
                if ty == root {
                    return Ok(true);
                }
                let superclass = self.introspector.superclass(ty)?;
                let no_supertypes = superclass.map_or(true, |s| s == root)
                    && self.introspector.interfaces(ty)?.is_empty();
                if strategy == SearchStrategy::TypeHierarchyAndEnclosingClasses {
                    Ok(no_supertypes && self.introspector.enclosing_type(ty)?.is_none())
                } else {
                    Ok(no_supertypes)
                }
            }
            Element::Member(member) => {
                let descriptor = self.introspector.member_descriptor(member)?;
                Ok(descriptor.is_private()
                    || self.is_without_hierarchy(Element::Type(descriptor.declaring_type), strategy)?)
            }
            Element::Parameter { .. } => Ok(true),
        }
    }

    pub(crate) fn report(&self, element: Element, error: &heritage_types::IntrospectionError) {
        self.failures.handle(element, error);
    }
}

impl<I> std::fmt::Debug for HierarchyScanner<I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HierarchyScanner")
            .field("attributes", &self.attributes.len())
            .field("declared", &self.declared.len())
            .field("base_members", &self.base_members.len())
            .finish_non_exhaustive()
    }
}
