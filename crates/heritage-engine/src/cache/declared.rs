//! Records declared directly on an element

use std::sync::Arc;

use dashmap::DashMap;
use heritage_types::{Element, IntrospectionResult, Introspector, MetadataRecord};
use once_cell::sync::Lazy;
use tracing::trace;

use super::MetadataLookup;

/// One position in a record sequence; `None` marks a record removed by filtering
pub type Slot = Option<Arc<MetadataRecord>>;

static NO_ANNOTATIONS: Lazy<Arc<[Slot]>> = Lazy::new(|| Arc::from(Vec::<Slot>::new()));

/// The shared empty record sequence
pub fn no_annotations() -> Arc<[Slot]> {
    NO_ANNOTATIONS.clone()
}

/// Cache of declared records per element
///
/// Cached sequences are shared and immutable. Records of ignorable kinds and
/// records with an unreadable hazardous attribute are stored as holes, so
/// positions line up with the platform's declaration order.
#[derive(Debug, Default)]
pub struct DeclaredMetadataCache {
    cache: DashMap<Element, Arc<[Slot]>>,
}

impl DeclaredMetadataCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Declared records of an element, computed on first access
    ///
    /// Only types and members are cached; other elements are recomputed on
    /// every call.
    pub fn get<I: Introspector + ?Sized>(
        &self,
        lookup: &MetadataLookup<'_, I>,
        element: Element,
    ) -> IntrospectionResult<Arc<[Slot]>> {
        if let Some(cached) = self.cache.get(&element).map(|entry| entry.clone()) {
            return Ok(cached);
        }
        let computed = Self::compute(lookup, element)?;
        if element.is_stable() {
            self.cache.insert(element, computed.clone());
        }
        Ok(computed)
    }

    /// Declared records as an owned copy the caller may punch holes into
    pub fn get_defensive<I: Introspector + ?Sized>(
        &self,
        lookup: &MetadataLookup<'_, I>,
        element: Element,
    ) -> IntrospectionResult<Vec<Slot>> {
        Ok(self.get(lookup, element)?.to_vec())
    }

    fn compute<I: Introspector + ?Sized>(
        lookup: &MetadataLookup<'_, I>,
        element: Element,
    ) -> IntrospectionResult<Arc<[Slot]>> {
        let declared = lookup.introspector.declared_annotations(element)?;
        if declared.is_empty() {
            return Ok(no_annotations());
        }
        let mut all_ignored = true;
        let mut slots = Vec::with_capacity(declared.len());
        for record in declared {
            if lookup.is_ignorable(record.kind())? || !is_readable(lookup, &record) {
                slots.push(None);
            } else {
                all_ignored = false;
                slots.push(Some(record));
            }
        }
        trace!(target: "heritage::cache", element = %element, records = slots.len(),
            "Computed declared records");
        if all_ignored {
            return Ok(no_annotations());
        }
        Ok(Arc::from(slots))
    }

    /// Drop every cached entry
    pub fn clear(&self) {
        self.cache.clear();
    }

    /// Number of cached elements
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Whether nothing is cached
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Whether an element has a cached entry
    pub fn contains(&self, element: Element) -> bool {
        self.cache.contains_key(&element)
    }
}

fn is_readable<I: Introspector + ?Sized>(
    lookup: &MetadataLookup<'_, I>,
    record: &MetadataRecord,
) -> bool {
    match lookup
        .attributes
        .for_kind(lookup.introspector, Some(record.kind()))
    {
        Ok(model) => model.is_valid(lookup.introspector, record),
        Err(error) => {
            trace!(target: "heritage::cache", kind = %record.kind(), error = %error,
                "Attribute model unavailable; dropping record");
            false
        }
    }
}
