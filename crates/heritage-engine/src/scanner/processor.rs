//! Callbacks that receive records one aggregation level at a time

use std::sync::Arc;

use heritage_types::{Element, MetadataRecord, TypeId};

use crate::cache::Slot;

/// Predicate excluding whole types from a scan; `true` means filtered out
pub type ClassFilter<'f, C> = dyn Fn(&C, TypeId) -> bool + 'f;

/// Receives the records found at each level of a scan
///
/// Returning `Some` from either callback ends the scan immediately; the value
/// is handed to [`finish`](Self::finish).
pub trait MetadataProcessor<C: ?Sized> {
    /// Result of the scan
    type Output;

    /// Called when a level is entered, before its records are fetched
    fn do_with_aggregate(&mut self, _context: &C, _aggregate_index: usize) -> Option<Self::Output> {
        None
    }

    /// Called with the records of a level; holes are records removed by filtering
    fn do_with_annotations(
        &mut self,
        context: &C,
        aggregate_index: usize,
        source: Element,
        annotations: &[Slot],
    ) -> Option<Self::Output>;

    /// Produce the scan result from the last short-circuit value, if any
    fn finish(&mut self, result: Option<Self::Output>) -> Option<Self::Output> {
        result
    }
}

/// Records delivered at one level
#[derive(Debug, Clone, PartialEq)]
pub struct Level {
    /// Aggregation index
    pub aggregate_index: usize,
    /// Element the records were found on
    pub source: Element,
    /// Records, holes removed
    pub records: Vec<Arc<MetadataRecord>>,
}

/// Collects every level that delivered at least one record
#[derive(Debug, Default)]
pub struct LevelCollector {
    levels: Vec<Level>,
}

impl LevelCollector {
    /// Create an empty collector
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C: ?Sized> MetadataProcessor<C> for LevelCollector {
    type Output = Vec<Level>;

    fn do_with_annotations(
        &mut self,
        _context: &C,
        aggregate_index: usize,
        source: Element,
        annotations: &[Slot],
    ) -> Option<Self::Output> {
        let records: Vec<_> = annotations.iter().flatten().cloned().collect();
        if !records.is_empty() {
            self.levels.push(Level {
                aggregate_index,
                source,
                records,
            });
        }
        None
    }

    fn finish(&mut self, _result: Option<Self::Output>) -> Option<Self::Output> {
        Some(std::mem::take(&mut self.levels))
    }
}

/// A record found by [`FirstOfKind`]
#[derive(Debug, Clone, PartialEq)]
pub struct Found {
    /// Aggregation index
    pub aggregate_index: usize,
    /// Element the record was found on
    pub source: Element,
    /// The record
    pub record: Arc<MetadataRecord>,
}

/// Stops at the first record of a kind
#[derive(Debug, Clone, Copy)]
pub struct FirstOfKind {
    kind: TypeId,
}

impl FirstOfKind {
    /// Search for records of `kind`
    pub fn new(kind: TypeId) -> Self {
        Self { kind }
    }
}

impl<C: ?Sized> MetadataProcessor<C> for FirstOfKind {
    type Output = Found;

    fn do_with_annotations(
        &mut self,
        _context: &C,
        aggregate_index: usize,
        source: Element,
        annotations: &[Slot],
    ) -> Option<Self::Output> {
        annotations
            .iter()
            .flatten()
            .find(|record| record.kind() == self.kind)
            .map(|record| Found {
                aggregate_index,
                source,
                record: record.clone(),
            })
    }
}
