//! Shared fixtures for engine integration tests

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use heritage_engine::{
    FailureHandler, HierarchyScanner, LevelCollector, MetadataProcessor, SearchStrategy, Slot,
};
use heritage_types::{
    Element, IntrospectionError, MetadataRecord, TypeDefinition, TypeId, TypeRegistry,
};

/// Define a record kind without attributes
pub fn marker(registry: &mut TypeRegistry, name: &str) -> TypeId {
    registry.define(TypeDefinition::annotation(name))
}

/// Define a record kind visible on subclasses
pub fn inherited_marker(registry: &mut TypeRegistry, name: &str) -> TypeId {
    registry.define(TypeDefinition::annotation(name).inherited())
}

/// A record with no explicit values
pub fn record(kind: TypeId) -> MetadataRecord {
    MetadataRecord::new(kind)
}

/// Levels as `(index, source, kinds)`, holes and empty levels removed
pub fn levels(
    scanner: &HierarchyScanner<TypeRegistry>,
    source: Element,
    strategy: SearchStrategy,
) -> Vec<(usize, Element, Vec<TypeId>)> {
    filtered_levels(scanner, source, strategy, &|_, _| false)
}

/// Like [`levels`], with the given class filter applied to the scan
pub fn filtered_levels(
    scanner: &HierarchyScanner<TypeRegistry>,
    source: Element,
    strategy: SearchStrategy,
    filter: &dyn Fn(&(), TypeId) -> bool,
) -> Vec<(usize, Element, Vec<TypeId>)> {
    scanner
        .scan_filtered(&(), source, strategy, &mut LevelCollector::new(), Some(filter))
        .unwrap_or_default()
        .into_iter()
        .map(|level| {
            let kinds = level.records.iter().map(|r| r.kind()).collect();
            (level.aggregate_index, level.source, kinds)
        })
        .collect()
}

/// One `do_with_annotations` call
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub index: usize,
    pub source: Element,
    pub kinds: Vec<Option<TypeId>>,
}

/// Records every callback, never short-circuits
#[derive(Debug, Default)]
pub struct Recorder {
    pub aggregates: Vec<usize>,
    pub calls: Vec<Call>,
}

impl<C: ?Sized> MetadataProcessor<C> for Recorder {
    type Output = ();

    fn do_with_aggregate(&mut self, _context: &C, aggregate_index: usize) -> Option<()> {
        self.aggregates.push(aggregate_index);
        None
    }

    fn do_with_annotations(
        &mut self,
        _context: &C,
        aggregate_index: usize,
        source: Element,
        annotations: &[Slot],
    ) -> Option<()> {
        self.calls.push(Call {
            index: aggregate_index,
            source,
            kinds: annotations.iter().map(|s| s.as_ref().map(|r| r.kind())).collect(),
        });
        None
    }
}

/// Run a [`Recorder`] over a scan
pub fn record_scan(
    scanner: &HierarchyScanner<TypeRegistry>,
    source: Element,
    strategy: SearchStrategy,
) -> Recorder {
    let mut recorder = Recorder::default();
    scanner.scan(&(), source, strategy, &mut recorder);
    recorder
}

/// Failure handler that remembers what it was given
#[derive(Debug, Default)]
pub struct FailureLog {
    failures: Mutex<Vec<(Element, IntrospectionError)>>,
}

impl FailureLog {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failures(&self) -> Vec<(Element, IntrospectionError)> {
        self.failures.lock().unwrap().clone()
    }
}

impl FailureHandler for FailureLog {
    fn handle(&self, element: Element, error: &IntrospectionError) {
        self.failures.lock().unwrap().push((element, error.clone()));
    }
}

/// Scanner with a [`FailureLog`] attached
pub fn logged_scanner(
    registry: TypeRegistry,
) -> (HierarchyScanner<TypeRegistry>, Arc<FailureLog>) {
    let log = FailureLog::new();
    let scanner = HierarchyScanner::new(registry).with_failure_handler(log.clone());
    (scanner, log)
}
