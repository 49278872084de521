use super::*;

#[test]
fn default_catalog_parses() {
    let catalog = default_catalog().unwrap();
    assert!(catalog.tours().len() >= 6);
    assert!(catalog.offers().len() >= 3);
    assert!(catalog.tour("everest-base-camp-trek").is_some());
    assert!(catalog.offer("visa-assistance").is_some());
}

#[test]
fn parse_derives_missing_ids() {
    let yaml = r#"
tours:
  - title: Alpine Lakes
    location: Interlaken, Switzerland
    price: 1800
    duration: 6 Days
    difficulty: moderate
    category: Mountains
offers:
  - title: Airport Transfers
    description: Door to door.
"#;
    let catalog = parse_catalog(yaml).unwrap();
    assert_eq!(catalog.tours()[0].id, "alpine-lakes");
    assert_eq!(catalog.offers()[0].id, "airport-transfers");
    assert!(catalog.tours()[0].images.is_empty());
}

#[test]
fn parse_rejects_duplicate_ids() {
    let yaml = r#"
tours:
  - id: same
    title: One
    location: A
    price: 1
    duration: 1 Day
    difficulty: easy
    category: C
  - id: same
    title: Two
    location: B
    price: 2
    duration: 1 Day
    difficulty: easy
    category: C
"#;
    assert!(matches!(parse_catalog(yaml), Err(SeedError::Catalog(CatalogError::DuplicateId(_)))));
}

#[test]
fn parse_rejects_unknown_difficulty() {
    let yaml = r#"
tours:
  - title: One
    location: A
    price: 1
    duration: 1 Day
    difficulty: impossible
    category: C
"#;
    assert!(matches!(parse_catalog(yaml), Err(SeedError::Parse(_))));
}

#[test]
fn empty_document_is_an_empty_catalog() {
    let catalog = parse_catalog("{}").unwrap();
    assert!(catalog.tours().is_empty());
    assert!(catalog.offers().is_empty());
}
