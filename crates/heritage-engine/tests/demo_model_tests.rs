//! End-to-end scans over the demo shop model

mod common;

use common::*;
use heritage_engine::{HierarchyScanner, ScanConfig, SearchStrategy};
use heritage_types::{Element, TypeRegistry};

const SHOP: &str = include_str!("../../../demos/shop.json");
const CONFIG: &str = include_str!("../../../demos/heritage.toml");

fn scanner() -> HierarchyScanner<TypeRegistry> {
    let registry = TypeRegistry::from_json_str(SHOP).unwrap();
    let config = ScanConfig::from_toml_str(CONFIG).unwrap();
    HierarchyScanner::with_config(registry, &config)
}

#[test]
fn test_type_hierarchy() {
    let scanner = scanner();
    let registry = scanner.introspector();
    let service = registry.lookup("acme.ItemService").unwrap();
    let repo = registry.lookup("acme.Repo").unwrap();
    let base = registry.lookup("acme.BaseService").unwrap();
    let audited = registry.lookup("acme.Audited").unwrap();

    // the service's only record names an absent type and is dropped
    assert_eq!(
        levels(&scanner, Element::Type(service), SearchStrategy::TypeHierarchy),
        vec![
            (1, Element::Type(repo), vec![audited]),
            (2, Element::Type(base), vec![audited]),
        ]
    );
}

#[test]
fn test_inherited() {
    let scanner = scanner();
    let registry = scanner.introspector();
    let service = registry.lookup("acme.ItemService").unwrap();
    let base = registry.lookup("acme.BaseService").unwrap();
    let audited = registry.lookup("acme.Audited").unwrap();

    assert_eq!(
        levels(&scanner, Element::Type(service), SearchStrategy::InheritedAnnotations),
        vec![(1, Element::Type(base), vec![audited])]
    );
}

#[test]
fn test_enclosing() {
    let scanner = scanner();
    let registry = scanner.introspector();
    let config = registry.lookup("acme.ItemService.Config").unwrap();
    let repo = registry.lookup("acme.Repo").unwrap();
    let base = registry.lookup("acme.BaseService").unwrap();

    let found = levels(
        &scanner,
        Element::Type(config),
        SearchStrategy::TypeHierarchyAndEnclosingClasses,
    );
    let sources: Vec<_> = found.iter().map(|(index, source, _)| (*index, *source)).collect();
    assert_eq!(sources, vec![(2, Element::Type(repo)), (3, Element::Type(base))]);
}

#[test]
fn test_member_hierarchy() {
    let scanner = scanner();
    let registry = scanner.introspector();
    let service = registry.lookup("acme.ItemService").unwrap();
    let repo = registry.lookup("acme.Repo").unwrap();
    let base = registry.lookup("acme.BaseService").unwrap();
    let retry = registry.lookup("acme.Retry").unwrap();
    let tx = registry.lookup("acme.Tx").unwrap();
    let save = registry.members_named(service, "save")[0];
    let repo_save = registry.find_member(repo, "save").unwrap();
    let base_save = registry.find_member(base, "save").unwrap();

    assert_eq!(
        levels(&scanner, Element::Member(save), SearchStrategy::TypeHierarchy),
        vec![
            (1, Element::Member(repo_save), vec![retry]),
            (2, Element::Member(base_save), vec![tx]),
        ]
    );
}

#[test]
fn test_bridge_direct() {
    let scanner = scanner();
    let registry = scanner.introspector();
    let service = registry.lookup("acme.ItemService").unwrap();
    let valid = registry.lookup("acme.Valid").unwrap();
    let bridge = registry.members_named(service, "save")[1];

    assert_eq!(
        levels(&scanner, Element::Member(bridge), SearchStrategy::Direct),
        vec![(0, Element::Member(bridge), vec![valid])]
    );
    assert!(!scanner.is_known_empty(Element::Member(bridge), SearchStrategy::Direct));
}

#[test]
fn test_known_empty() {
    let scanner = scanner();
    let registry = scanner.introspector();
    let service = registry.lookup("acme.ItemService").unwrap();
    let item = registry.lookup("acme.Item").unwrap();

    assert!(scanner.is_known_empty(Element::Type(service), SearchStrategy::Direct));
    assert!(!scanner.is_known_empty(Element::Type(service), SearchStrategy::TypeHierarchy));
    assert!(scanner.is_known_empty(Element::Type(item), SearchStrategy::TypeHierarchy));
}
