//! End-to-end hierarchical imports over in-memory stores

use std::io::Write;

use pretty_assertions::assert_eq;
use serde_json::json;
use sync_engine::{
    Error, HierarchicalImporter, ImportConfig, ImportOptions, RelationResolver,
};
use sync_graph::CircularDependencyError;
use sync_model::{ObjectStore, PersistentId, TypeTag, ValidationIssue};
use sync_test_utils::{MemoryStore, StaticValidator};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn tag(s: &str) -> TypeTag {
    TypeTag::from(s)
}

fn lexicon_store(name: &str) -> MemoryStore {
    MemoryStore::new(name)
        .with_type("entry", &["headword", "variant_of"])
        .with_type("sense", &["gloss", "domain"])
        .with_type("example", &["text"])
        .with_type("domain", &["name"])
}

fn lexicon_resolver() -> RelationResolver {
    RelationResolver::new()
        .owns("entry", "sense")
        .owns("sense", "example")
        .references_via("sense", "domain", "domain")
        .cross_references_via("entry", "variant_of", "entry")
}

/// One entry with a sense, an example under the sense, and a domain the
/// sense references.
struct Fixture {
    source: MemoryStore,
    entry: PersistentId,
    sense: PersistentId,
    example: PersistentId,
    domain: PersistentId,
}

fn three_level_fixture() -> Fixture {
    let mut source = lexicon_store("source");

    let domain = PersistentId::random();
    let d = source.seed_object("domain", domain);
    source.seed_field(&d, "name", json!("athletics"));

    let entry = PersistentId::random();
    let e = source.seed_object("entry", entry);
    source.seed_field(&e, "headword", json!("run"));

    let sense = PersistentId::random();
    let s = source
        .create_object(&tag("sense"), sense, Some(&e))
        .unwrap();
    source.seed_field(&s, "gloss", json!("to move fast"));
    source.seed_field(&s, "domain", json!(domain.to_string()));

    let example = PersistentId::random();
    let x = source
        .create_object(&tag("example"), example, Some(&s))
        .unwrap();
    source.seed_field(&x, "text", json!("she runs daily"));

    Fixture {
        source,
        entry,
        sense,
        example,
        domain,
    }
}

#[test]
fn test_three_level_hierarchy_lands_fully_ordered() {
    init_tracing();
    let fixture = three_level_fixture();
    let mut target = lexicon_store("target");
    let resolver = lexicon_resolver();

    let mut importer = HierarchicalImporter::new(&fixture.source, &mut target, &resolver);
    let result = importer
        .import_with_dependencies(
            &tag("entry"),
            &[fixture.entry],
            &ImportConfig::default(),
            &ImportOptions::default(),
            None,
        )
        .unwrap();

    assert!(result.success());
    assert_eq!(result.num_created, 4);

    // Creation order respects every edge: the domain before the sense that
    // references it, each owner before what it owns.
    let created: Vec<PersistentId> = result
        .changes
        .iter()
        .filter_map(|c| c.id)
        .collect();
    let position = |id: PersistentId| created.iter().position(|&c| c == id).unwrap();
    assert!(position(fixture.domain) < position(fixture.sense));
    assert!(position(fixture.entry) < position(fixture.sense));
    assert!(position(fixture.sense) < position(fixture.example));

    // Ownership is reproduced in the target, not just existence.
    let entry = target.get_object(&tag("entry"), fixture.entry).unwrap().unwrap();
    let senses = target.all_objects(&tag("sense"), Some(&entry)).unwrap();
    assert_eq!(senses.len(), 1);
    let examples = target.all_objects(&tag("example"), Some(&senses[0])).unwrap();
    assert_eq!(examples.len(), 1);
    assert_eq!(
        target.read_field(&examples[0], "text").unwrap(),
        Some(json!("she runs daily"))
    );
}

#[test]
fn test_toml_config_restricts_owned_expansion() {
    init_tracing();
    let fixture = three_level_fixture();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("import.toml");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "owned_types = [\"sense\"]\nresolve_references = false").unwrap();
    let config = ImportConfig::load(&path).unwrap();

    let mut target = lexicon_store("target");
    let resolver = lexicon_resolver();
    let mut importer = HierarchicalImporter::new(&fixture.source, &mut target, &resolver);
    let result = importer
        .import_with_dependencies(
            &tag("entry"),
            &[fixture.entry],
            &config,
            &ImportOptions::default(),
            None,
        )
        .unwrap();

    // Only the entry and its sense: examples are outside the allow-list and
    // the domain reference was not followed.
    assert_eq!(result.num_created, 2);
    assert!(target.contains(&tag("sense"), fixture.sense));
    assert!(!target.contains(&tag("example"), fixture.example));
    assert!(!target.contains(&tag("domain"), fixture.domain));
}

#[test]
fn test_critical_issue_on_nested_child_blocks_the_whole_batch() {
    init_tracing();
    let fixture = three_level_fixture();

    // The defect is deep in the tree; nothing at all may be created.
    let validator = StaticValidator::accept_all().with_issue(
        fixture.example,
        ValidationIssue::critical(
            "content",
            tag("example"),
            fixture.example,
            "empty example text",
        ),
    );

    let mut target = lexicon_store("target");
    let resolver = lexicon_resolver();
    let mut importer = HierarchicalImporter::new(&fixture.source, &mut target, &resolver)
        .with_validator(&validator);
    let error = importer
        .import_with_dependencies(
            &tag("entry"),
            &[fixture.entry],
            &ImportConfig::default(),
            &ImportOptions::default(),
            None,
        )
        .unwrap_err();

    match error {
        Error::Validation { result } => assert_eq!(result.critical_issues().len(), 1),
        other => panic!("expected validation error, got {other}"),
    }
    assert!(target.all_objects(&tag("entry"), None).unwrap().is_empty());
    assert!(target.all_objects(&tag("sense"), None).unwrap().is_empty());
}

#[test]
fn test_variant_cycle_is_severed_when_tolerated() {
    init_tracing();
    let mut source = lexicon_store("source");
    let a = PersistentId::random();
    let b = PersistentId::random();
    let entry_a = source.seed_object("entry", a);
    let entry_b = source.seed_object("entry", b);
    source.seed_field(&entry_a, "headword", json!("colour"));
    source.seed_field(&entry_a, "variant_of", json!(b.to_string()));
    source.seed_field(&entry_b, "headword", json!("color"));
    source.seed_field(&entry_b, "variant_of", json!(a.to_string()));

    let mut target = lexicon_store("target");
    let resolver = lexicon_resolver();
    let mut importer = HierarchicalImporter::new(&source, &mut target, &resolver);

    // Refused by default, naming both participants.
    let error = importer
        .import_with_dependencies(
            &tag("entry"),
            &[a],
            &ImportConfig::default(),
            &ImportOptions::default(),
            None,
        )
        .unwrap_err();
    match error {
        Error::Cycle(CircularDependencyError { cycle }) => {
            assert!(cycle.contains(&a));
            assert!(cycle.contains(&b));
        }
        other => panic!("expected cycle error, got {other}"),
    }

    let config = ImportConfig {
        allow_cycles: true,
        ..Default::default()
    };
    let result = importer
        .import_with_dependencies(
            &tag("entry"),
            &[a],
            &config,
            &ImportOptions::default(),
            None,
        )
        .unwrap();

    assert!(result.success());
    assert_eq!(result.num_created, 2);
    assert!(target.contains(&tag("entry"), a));
    assert!(target.contains(&tag("entry"), b));
}

#[test]
fn test_reimport_only_fills_the_gaps() {
    init_tracing();
    let fixture = three_level_fixture();
    let mut target = lexicon_store("target");
    let resolver = lexicon_resolver();

    {
        let mut importer = HierarchicalImporter::new(&fixture.source, &mut target, &resolver);
        importer
            .import_with_dependencies(
                &tag("entry"),
                &[fixture.entry],
                &ImportConfig::default(),
                &ImportOptions::default(),
                None,
            )
            .unwrap();
    }

    let mut importer = HierarchicalImporter::new(&fixture.source, &mut target, &resolver);
    let second = importer
        .import_with_dependencies(
            &tag("entry"),
            &[fixture.entry],
            &ImportConfig::default(),
            &ImportOptions::default(),
            None,
        )
        .unwrap();

    assert!(second.success());
    assert_eq!(second.num_created, 0);
    assert_eq!(second.num_skipped, 4);
    // No duplicates were introduced by the second run.
    assert_eq!(target.all_objects(&tag("sense"), None).unwrap().len(), 1);
}

#[test]
fn test_import_related_carries_the_variant_cluster() {
    init_tracing();
    let mut source = lexicon_store("source");
    let base = PersistentId::random();
    let b = source.seed_object("entry", base);
    source.seed_field(&b, "headword", json!("color"));
    let variant = PersistentId::random();
    let v = source.seed_object("entry", variant);
    source.seed_field(&v, "headword", json!("colour"));
    source.seed_field(&v, "variant_of", json!(base.to_string()));
    source.seed_object("entry", PersistentId::random());

    let mut target = lexicon_store("target");
    let resolver = lexicon_resolver();
    let mut importer = HierarchicalImporter::new(&source, &mut target, &resolver);
    let result = importer
        .import_related(
            &tag("entry"),
            base,
            &[tag("entry")],
            &ImportConfig::default(),
            &ImportOptions::default(),
            None,
        )
        .unwrap();

    assert!(result.success());
    assert_eq!(result.num_created, 2);
    assert!(target.contains(&tag("entry"), base));
    assert!(target.contains(&tag("entry"), variant));
    // The unrelated entry stayed behind.
    assert_eq!(target.all_objects(&tag("entry"), None).unwrap().len(), 2);
}
