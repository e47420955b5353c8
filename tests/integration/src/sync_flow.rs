//! End-to-end compare/apply runs over in-memory stores

use pretty_assertions::assert_eq;
use serde_json::json;
use sync_engine::{
    CompareOptions, FieldMatch, HybridMatch, Phase, ProgressEvent, RuleBased, SyncEngine,
    SyncOptions, Winner,
};
use sync_model::{ObjectStore, PersistentId, TypeTag};
use sync_test_utils::MemoryStore;

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn entry_ty() -> TypeTag {
    TypeTag::from("entry")
}

fn entry_store(name: &str) -> MemoryStore {
    MemoryStore::new(name).with_type("entry", &["headword", "gloss"])
}

/// Source with one new, one modified, and one unchanged object; target with
/// one extra object the source never had.
fn mixed_stores() -> (MemoryStore, MemoryStore) {
    let mut source = entry_store("source");
    let mut target = entry_store("target");

    let fresh = source.seed_object("entry", PersistentId::random());
    source.seed_field(&fresh, "headword", json!("sprint"));

    let modified = PersistentId::random();
    let s = source.seed_object("entry", modified);
    source.seed_field(&s, "gloss", json!("to move fast"));
    let t = target.seed_object("entry", modified);
    target.seed_field(&t, "gloss", json!("to jog"));

    let unchanged = PersistentId::random();
    let s = source.seed_object("entry", unchanged);
    source.seed_field(&s, "headword", json!("walk"));
    let t = target.seed_object("entry", unchanged);
    target.seed_field(&t, "headword", json!("walk"));

    target.seed_object("entry", PersistentId::random());

    (source, target)
}

#[test]
fn test_mixed_population_converges_in_one_apply() {
    init_tracing();
    let (source, target) = mixed_stores();
    let mut engine = SyncEngine::new(Box::new(source), Box::new(target));

    let diff = engine.compare(&entry_ty()).unwrap();
    assert_eq!(diff.num_new(), 1);
    assert_eq!(diff.num_modified(), 1);
    assert_eq!(diff.num_unchanged(), 1);
    assert_eq!(diff.num_deleted(), 1);
    // Unchanged pairs are not actionable and stay out of the total.
    assert_eq!(diff.total(), 3);

    let result = engine
        .sync(&entry_ty(), &SyncOptions::default(), None)
        .unwrap();
    assert!(result.success());
    assert_eq!(result.num_created, 1);
    assert_eq!(result.num_updated, 1);
    assert_eq!(result.num_deleted, 0);
    assert_eq!(result.num_skipped, 1);

    // After the apply, only the target-side extra still shows up, and it
    // keeps showing up because deletes are never applied automatically.
    let second = engine.compare(&entry_ty()).unwrap();
    assert_eq!(second.num_new(), 0);
    assert_eq!(second.num_modified(), 0);
    assert_eq!(second.num_unchanged(), 3);
    assert_eq!(second.num_deleted(), 1);
}

#[test]
fn test_field_matching_pairs_unrelated_stores() {
    init_tracing();
    // Different identifiers on both sides; only content can pair them.
    let mut source = entry_store("source");
    let s = source.seed_object("entry", PersistentId::random());
    source.seed_field(&s, "headword", json!("run"));
    source.seed_field(&s, "gloss", json!("to move fast"));

    let mut target = entry_store("target");
    let t = target.seed_object("entry", PersistentId::random());
    target.seed_field(&t, "headword", json!("run"));
    target.seed_field(&t, "gloss", json!("to jog"));

    let mut engine = SyncEngine::new(Box::new(source), Box::new(target));
    engine.register_strategy(Box::new(FieldMatch::new(["headword"])));

    // By identifier the pair looks like one new and one deleted object.
    let by_guid = engine.compare(&entry_ty()).unwrap();
    assert_eq!(by_guid.num_new(), 1);
    assert_eq!(by_guid.num_deleted(), 1);

    let by_field = engine
        .compare_with(
            &entry_ty(),
            &CompareOptions {
                strategy: Some("field"),
                filter: None,
            },
            None,
        )
        .unwrap();
    assert_eq!(by_field.num_new(), 0);
    assert_eq!(by_field.num_modified(), 1);

    let result = engine
        .sync(
            &entry_ty(),
            &SyncOptions {
                strategy: Some("field"),
                ..Default::default()
            },
            None,
        )
        .unwrap();
    assert_eq!(result.num_updated, 1);
    // No duplicate was created.
    assert_eq!(
        engine.target().all_objects(&entry_ty(), None).unwrap().len(),
        1
    );
}

#[test]
fn test_hybrid_matching_copes_with_partial_lineage() {
    init_tracing();
    let shared = PersistentId::random();
    let mut source = entry_store("source");
    let s = source.seed_object("entry", shared);
    source.seed_field(&s, "headword", json!("run"));
    let s = source.seed_object("entry", PersistentId::random());
    source.seed_field(&s, "headword", json!("walk"));

    // One target object shares lineage, the other was entered by hand with
    // a different identifier but the same headword.
    let mut target = entry_store("target");
    target.seed_object("entry", shared);
    let t = target.seed_object("entry", PersistentId::random());
    target.seed_field(&t, "headword", json!("walk"));

    let mut engine = SyncEngine::new(Box::new(source), Box::new(target));
    engine.register_strategy(Box::new(HybridMatch::new(FieldMatch::new(["headword"]))));

    let diff = engine
        .compare_with(
            &entry_ty(),
            &CompareOptions {
                strategy: Some("hybrid"),
                filter: None,
            },
            None,
        )
        .unwrap();
    assert_eq!(diff.num_new(), 0);
    assert_eq!(diff.num_deleted(), 0);
}

#[test]
fn test_rule_based_resolver_decides_per_object() {
    init_tracing();
    let keep = PersistentId::random();
    let replace = PersistentId::random();

    let mut source = entry_store("source");
    let mut target = entry_store("target");
    for id in [keep, replace] {
        let s = source.seed_object("entry", id);
        source.seed_field(&s, "gloss", json!("from source"));
        let t = target.seed_object("entry", id);
        target.seed_field(&t, "gloss", json!("curated locally"));
    }
    let t = target.get_object(&entry_ty(), keep).unwrap().unwrap();
    target.seed_field(&t, "headword", json!("protected"));

    let mut engine = SyncEngine::new(Box::new(source), Box::new(target));
    engine.register_resolver(Box::new(RuleBased::new(
        "protect-marked",
        |_, target_object, _, target| {
            let marked = target
                .read_field(target_object, "headword")
                .ok()
                .flatten()
                .is_some();
            if marked { Winner::Target } else { Winner::Source }
        },
    )));

    let result = engine
        .sync(
            &entry_ty(),
            &SyncOptions {
                resolver: Some("protect-marked"),
                ..Default::default()
            },
            None,
        )
        .unwrap();

    assert_eq!(result.num_updated, 1);
    assert_eq!(result.num_skipped, 1);

    let kept = engine.target().get_object(&entry_ty(), keep).unwrap().unwrap();
    assert_eq!(
        engine.target().read_field(&kept, "gloss").unwrap(),
        Some(json!("curated locally"))
    );
    let replaced = engine
        .target()
        .get_object(&entry_ty(), replace)
        .unwrap()
        .unwrap();
    assert_eq!(
        engine.target().read_field(&replaced, "gloss").unwrap(),
        Some(json!("from source"))
    );
}

#[test]
fn test_dry_run_reports_the_same_counts_as_a_real_run() {
    init_tracing();
    let (source, target) = mixed_stores();
    let mut engine = SyncEngine::new(Box::new(source), Box::new(target));

    let preview = engine
        .sync(
            &entry_ty(),
            &SyncOptions {
                dry_run: true,
                ..Default::default()
            },
            None,
        )
        .unwrap();
    let applied = engine
        .sync(&entry_ty(), &SyncOptions::default(), None)
        .unwrap();

    assert!(preview.dry_run);
    assert!(!applied.dry_run);
    assert_eq!(preview.num_created, applied.num_created);
    assert_eq!(preview.num_updated, applied.num_updated);
    assert_eq!(preview.num_skipped, applied.num_skipped);
}

#[test]
fn test_filter_restricts_participating_objects() {
    init_tracing();
    let mut source = entry_store("source");
    let a = source.seed_object("entry", PersistentId::random());
    source.seed_field(&a, "headword", json!("run"));
    let b = source.seed_object("entry", PersistentId::random());
    source.seed_field(&b, "headword", json!("walk"));

    let mut engine = SyncEngine::new(Box::new(source), Box::new(entry_store("target")));
    let only_run = |store: &dyn ObjectStore, object: &sync_model::ObjectHandle| {
        store.read_field(object, "headword").ok().flatten() == Some(json!("run"))
    };
    let result = engine
        .sync(
            &entry_ty(),
            &SyncOptions {
                filter: Some(&only_run),
                ..Default::default()
            },
            None,
        )
        .unwrap();

    assert_eq!(result.num_created, 1);
    assert_eq!(
        engine.target().all_objects(&entry_ty(), None).unwrap().len(),
        1
    );
}

#[test]
fn test_progress_ticks_once_per_change() {
    init_tracing();
    let (source, target) = mixed_stores();
    let mut engine = SyncEngine::new(Box::new(source), Box::new(target));

    let mut events: Vec<ProgressEvent> = Vec::new();
    let mut callback = |event: ProgressEvent| events.push(event);
    engine
        .sync(&entry_ty(), &SyncOptions::default(), Some(&mut callback))
        .unwrap();

    let apply: Vec<&ProgressEvent> =
        events.iter().filter(|e| e.phase == Phase::Apply).collect();
    assert!(!apply.is_empty());
    let total = apply[0].total;
    assert_eq!(apply.len(), total);
    assert_eq!(apply.last().unwrap().current, total);
}
