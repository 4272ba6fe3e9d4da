//! Declared-record caches, attribute validity, and cache lifecycle

mod common;

use std::sync::Arc;
use std::thread;

use common::*;
use heritage_engine::{
    AttributeError, AttributeModel, FailurePolicy, HierarchyScanner, ScanConfig, SearchStrategy,
};
use heritage_types::{
    AttributeValue, Element, MemberDefinition, TypeDefinition, TypeId, TypeRegistry, ValueType,
};

struct Retry {
    registry: TypeRegistry,
    retry: TypeId,
    missing: TypeId,
    present: TypeId,
}

/// `@Retry(on: type[] = [], attempts: int = 3)` plus one present and one absent type
fn retry_kind() -> Retry {
    let mut registry = TypeRegistry::new();
    let retry = registry.define(TypeDefinition::annotation("acme.Retry"));
    registry.add_member(
        retry,
        MemberDefinition::attribute("on", ValueType::array_of(ValueType::Type))
            .with_default(AttributeValue::Array(Vec::new())),
    );
    registry.add_member(
        retry,
        MemberDefinition::attribute("attempts", ValueType::Int)
            .with_default(AttributeValue::Int(3)),
    );
    let missing = registry.declare_absent("ext.TimeoutError");
    let present = registry.define(TypeDefinition::class("acme.IoError"));
    Retry {
        registry,
        retry,
        missing,
        present,
    }
}

fn retry_on(kind: TypeId, ty: TypeId) -> heritage_types::MetadataRecord {
    record(kind).with("on", AttributeValue::Array(vec![AttributeValue::Type(ty)]))
}

#[test]
fn test_readable_record_is_cached_and_shared() {
    let fixture = retry_kind();
    let mut registry = fixture.registry;
    let client = registry.define(
        TypeDefinition::class("acme.Client").annotated(retry_on(fixture.retry, fixture.present)),
    );
    let scanner = HierarchyScanner::new(registry);

    let first = scanner.declared_annotations(Element::Type(client)).unwrap();
    let second = scanner.declared_annotations(Element::Type(client)).unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].as_ref().unwrap().kind(), fixture.retry);
    assert!(scanner.declared_cache().contains(Element::Type(client)));
}

#[test]
fn test_unreadable_hazardous_attribute_drops_record() {
    let fixture = retry_kind();
    let mut registry = fixture.registry;
    let audited = marker(&mut registry, "acme.Audited");
    let client = registry.define(
        TypeDefinition::class("acme.Client")
            .annotated(record(audited))
            .annotated(retry_on(fixture.retry, fixture.missing)),
    );
    let scanner = HierarchyScanner::new(registry);

    let slots = scanner.declared_annotations(Element::Type(client)).unwrap();
    let kinds: Vec<_> = slots.iter().map(|s| s.as_ref().map(|r| r.kind())).collect();
    assert_eq!(kinds, vec![Some(audited), None]);
    assert_eq!(
        scanner
            .declared_annotation(Element::Type(client), fixture.retry)
            .unwrap(),
        None
    );
}

#[test]
fn test_validate_reports_unreadable_attribute() {
    let fixture = retry_kind();
    let scanner = HierarchyScanner::new(fixture.registry);
    let model = scanner.attribute_model(fixture.retry).unwrap();

    let broken = retry_on(fixture.retry, fixture.missing);
    assert!(!model.is_valid(scanner.introspector(), &broken));
    let err = model.validate(scanner.introspector(), &broken).unwrap_err();
    assert!(matches!(err, AttributeError::Unreadable { ref attribute, .. } if attribute == "on"));
    assert_eq!(
        err.to_string(),
        "Could not obtain annotation attribute value for on declared on acme.Retry"
    );

    let fine = retry_on(fixture.retry, fixture.present);
    assert!(model.validate(scanner.introspector(), &fine).is_ok());
}

#[test]
#[should_panic(expected = "is not an instance of")]
fn test_validity_check_rejects_foreign_record() {
    let fixture = retry_kind();
    let mut registry = fixture.registry;
    let audited = marker(&mut registry, "acme.Audited");
    let scanner = HierarchyScanner::new(registry);
    let model = scanner.attribute_model(fixture.retry).unwrap();

    model.is_valid(scanner.introspector(), &record(audited));
}

#[test]
fn test_single_value_attribute_without_default() {
    let mut registry = TypeRegistry::new();
    let cacheable = registry.define(TypeDefinition::annotation("acme.Cacheable"));
    registry.add_member(cacheable, MemberDefinition::attribute("value", ValueType::Str));
    let scanner = HierarchyScanner::new(registry);

    let model = scanner.attribute_model(cacheable).unwrap();
    assert!(model.has_only_value_attribute());
    assert!(!model.has_default_value_method());
    assert!(!model.can_fail_on_read(0));
}

#[test]
fn test_no_hazardous_attributes_is_always_valid() {
    let mut registry = TypeRegistry::new();
    let cacheable = registry.define(TypeDefinition::annotation("acme.Cacheable"));
    registry.add_member(cacheable, MemberDefinition::attribute("value", ValueType::Str));
    let scanner = HierarchyScanner::new(registry);
    let model = scanner.attribute_model(cacheable).unwrap();

    // a missing value is never read, so the record still counts as valid
    for candidate in [
        record(cacheable),
        record(cacheable).with("value", AttributeValue::str("users")),
        record(cacheable).with("value", AttributeValue::Int(7)),
    ] {
        assert!(model.is_valid(scanner.introspector(), &candidate));
    }
}

#[test]
fn test_array_of_enum_is_not_hazardous() {
    let mut registry = TypeRegistry::new();
    let level = registry.define(TypeDefinition::enumeration("acme.Level"));
    let logged = registry.define(TypeDefinition::annotation("acme.Logged"));
    registry.add_member(
        logged,
        MemberDefinition::attribute("levels", ValueType::array_of(ValueType::Enum(level))),
    );
    registry.add_member(logged, MemberDefinition::attribute("level", ValueType::Enum(level)));

    let model = AttributeModel::compute(&registry, logged, true).unwrap();
    assert_eq!(model.get(0).name(), "level");
    assert!(model.can_fail_on_read(0));
    assert!(!model.can_fail_on_read(1));
}

#[test]
fn test_attribute_model_is_idempotent() {
    let fixture = retry_kind();
    let a = AttributeModel::compute(&fixture.registry, fixture.retry, true).unwrap();
    let b = AttributeModel::compute(&fixture.registry, fixture.retry, true).unwrap();
    assert_eq!(*a, *b);
    let names: Vec<_> = a.iter().map(|accessor| accessor.name()).collect();
    assert_eq!(names, vec!["attempts", "on"]);
}

#[test]
fn test_ignorable_kinds_become_holes() {
    let mut registry = TypeRegistry::new();
    let deprecated = marker(&mut registry, "lang.Deprecated");
    let audited = marker(&mut registry, "acme.Audited");
    let legacy = registry.define(TypeDefinition::class("acme.Legacy").annotated(record(deprecated)));
    let mixed = registry.define(
        TypeDefinition::class("acme.Mixed")
            .annotated(record(deprecated))
            .annotated(record(audited)),
    );
    let scanner = HierarchyScanner::new(registry);

    assert!(scanner.declared_annotations(Element::Type(legacy)).unwrap().is_empty());
    let kinds: Vec<_> = scanner
        .declared_annotations(Element::Type(mixed))
        .unwrap()
        .iter()
        .map(|s| s.as_ref().map(|r| r.kind()))
        .collect();
    assert_eq!(kinds, vec![None, Some(audited)]);
}

#[test]
fn test_no_ignorable_prefixes_keeps_platform_kinds() {
    let mut registry = TypeRegistry::new();
    let deprecated = marker(&mut registry, "lang.Deprecated");
    let legacy = registry.define(TypeDefinition::class("acme.Legacy").annotated(record(deprecated)));
    let config = ScanConfig::from_toml_str("ignorable_kind_prefixes = []").unwrap();
    let scanner = HierarchyScanner::with_config(registry, &config);

    assert_eq!(scanner.declared_annotations(Element::Type(legacy)).unwrap().len(), 1);
}

#[test]
fn test_defensive_copy_does_not_touch_cache() {
    let mut registry = TypeRegistry::new();
    let audited = marker(&mut registry, "acme.Audited");
    let a = registry.define(TypeDefinition::class("acme.A").annotated(record(audited)));
    let scanner = HierarchyScanner::new(registry);

    let mut copy = scanner.declared_annotations_copy(Element::Type(a)).unwrap();
    copy[0] = None;
    assert!(scanner.declared_annotations(Element::Type(a)).unwrap()[0].is_some());
}

#[test]
fn test_known_empty_direct_matches_declared_records() {
    let mut registry = TypeRegistry::new();
    let audited = marker(&mut registry, "acme.Audited");
    let deprecated = marker(&mut registry, "lang.Deprecated");
    let a = registry.define(TypeDefinition::class("acme.A").annotated(record(audited)));
    let b = registry.define(TypeDefinition::class("acme.B").extends(a));
    let c = registry.define(TypeDefinition::class("acme.C").annotated(record(deprecated)));
    let save = registry.add_member(a, MemberDefinition::new("save"));
    let scanner = HierarchyScanner::new(registry);

    for element in [
        Element::Type(a),
        Element::Type(b),
        Element::Type(c),
        Element::Member(save),
    ] {
        let declared_empty = scanner.declared_annotations(element).unwrap().is_empty();
        assert_eq!(
            scanner.is_known_empty(element, SearchStrategy::Direct),
            declared_empty,
            "{}",
            element
        );
    }
}

#[test]
fn test_known_empty_with_hierarchy() {
    let mut registry = TypeRegistry::new();
    let audited = marker(&mut registry, "acme.Audited");
    let a = registry.define(TypeDefinition::class("acme.A").annotated(record(audited)));
    let b = registry.define(TypeDefinition::class("acme.B").extends(a));
    let solo = registry.define(TypeDefinition::class("acme.Solo"));
    let outer = registry.define(TypeDefinition::class("acme.Outer"));
    let inner = registry.define(TypeDefinition::class("acme.Outer.Inner").enclosed_in(outer));
    let ordered = registry.define(TypeDefinition::interface("lang.Ordered").annotated(record(audited)));
    let scanner = HierarchyScanner::new(registry);

    assert!(!scanner.is_known_empty(Element::Type(b), SearchStrategy::TypeHierarchy));
    assert!(scanner.is_known_empty(Element::Type(solo), SearchStrategy::TypeHierarchy));
    assert!(scanner.is_known_empty(Element::Type(inner), SearchStrategy::TypeHierarchy));
    assert!(!scanner.is_known_empty(
        Element::Type(inner),
        SearchStrategy::TypeHierarchyAndEnclosingClasses
    ));
    assert!(scanner.is_known_empty(Element::Type(ordered), SearchStrategy::Direct));
}

#[test]
fn test_known_empty_failure_is_contained() {
    let mut registry = TypeRegistry::new();
    let missing = registry.declare_absent("ext.Missing");
    let b = registry.define(TypeDefinition::class("acme.B").extends(missing));
    let (scanner, log) = logged_scanner(registry);

    assert!(!scanner.is_known_empty(Element::Type(b), SearchStrategy::TypeHierarchy));
    assert_eq!(log.failures().len(), 1);
}

#[test]
fn test_clear_then_recompute_is_equal() {
    let fixture = retry_kind();
    let mut registry = fixture.registry;
    let audited = marker(&mut registry, "acme.Audited");
    let a = registry.define(
        TypeDefinition::class("acme.A")
            .annotated(record(audited))
            .annotated(retry_on(fixture.retry, fixture.present)),
    );
    let b = registry.define(TypeDefinition::class("acme.B").extends(a));
    let save = registry.add_member(a, MemberDefinition::new("save").annotated(record(audited)));
    let scanner = HierarchyScanner::new(registry);

    let before = levels(&scanner, Element::Type(b), SearchStrategy::TypeHierarchy);
    let declared_before = scanner.declared_annotations(Element::Type(a)).unwrap();
    let members_before = scanner.base_type_members(a).unwrap();
    assert!(!scanner.declared_cache().is_empty());
    assert!(!scanner.attributes().is_empty());

    scanner.clear_caches();
    assert!(scanner.declared_cache().is_empty());
    assert!(scanner.member_cache().is_empty());
    assert!(scanner.attributes().is_empty());

    assert_eq!(levels(&scanner, Element::Type(b), SearchStrategy::TypeHierarchy), before);
    let declared_after = scanner.declared_annotations(Element::Type(a)).unwrap();
    assert!(!Arc::ptr_eq(&declared_before, &declared_after));
    assert_eq!(declared_before, declared_after);
    assert_eq!(&*scanner.base_type_members(a).unwrap(), &*members_before);
    assert_eq!(&*members_before, &[save]);
}

#[test]
fn test_concurrent_scans_agree() {
    let mut registry = TypeRegistry::new();
    let audited = marker(&mut registry, "acme.Audited");
    let i = registry.define(TypeDefinition::interface("acme.I").annotated(record(audited)));
    let a = registry.define(TypeDefinition::class("acme.A").annotated(record(audited)));
    let b = registry.define(TypeDefinition::class("acme.B").extends(a).implements(i));
    let config = ScanConfig {
        failure_policy: FailurePolicy::Ignore,
        ..ScanConfig::default()
    };
    let scanner = Arc::new(HierarchyScanner::with_config(registry, &config));
    let expected = levels(&scanner, Element::Type(b), SearchStrategy::TypeHierarchy);

    let handles: Vec<_> = (0..8)
        .map(|n| {
            let scanner = Arc::clone(&scanner);
            thread::spawn(move || {
                if n % 4 == 0 {
                    scanner.clear_caches();
                }
                levels(&scanner, Element::Type(b), SearchStrategy::TypeHierarchy)
            })
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}
