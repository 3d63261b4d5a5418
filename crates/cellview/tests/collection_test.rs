//! Integration tests for the view collection coordinator, including the
//! invariant properties over arbitrary operation sequences.

use std::sync::Arc;

use pollster::block_on;
use proptest::prelude::*;
use serde_json::json;

use cellview::{
    CellviewError, HeadlessEngine, NewView, ViewCollection, ViewPatch, ViewerModel,
};

fn new_collection() -> (Arc<HeadlessEngine>, ViewCollection) {
    let _ = env_logger::builder().is_test(true).try_init();
    let engine = Arc::new(HeadlessEngine::new());
    let viewer = Arc::new(ViewerModel::new(engine.clone()));
    block_on(viewer.init());
    (engine, ViewCollection::new(viewer))
}

#[test]
fn test_create_update_delete_scenario() {
    let (_engine, mut collection) = new_collection();
    assert!(collection.is_empty());

    let created = block_on(collection.create_view(
        NewView::new()
            .with_name("A")
            .with_description("desc")
            .with_snapshot(json!({"camera": [1, 2, 3]})),
    ))
    .unwrap();

    let id = created.view.id.clone();
    assert!(!id.is_empty());
    assert_eq!(created.view.created_at, created.view.updated_at);
    assert!(collection.screenshot_url(&id).is_some());

    let updated = collection
        .update_view(&id, ViewPatch::new().with_name("B"))
        .unwrap()
        .clone();
    assert_eq!(updated.name, "B");
    assert_eq!(updated.id, id);
    assert!(updated.updated_at >= updated.created_at);

    collection.delete_view(&id).unwrap();
    assert!(collection.is_empty());
    assert!(collection.screenshots().is_empty());
    assert!(collection.get_view_by_id(&id).is_none());
}

#[test]
fn test_reorder_front_to_back() {
    let (_engine, mut collection) = new_collection();
    for name in ["V1", "V2", "V3"] {
        block_on(collection.create_view(NewView::new().with_name(name))).unwrap();
    }

    collection.reorder_views(0, 2).unwrap();
    let order: Vec<&str> = collection.views().iter().map(|v| v.name.as_str()).collect();
    assert_eq!(order, vec!["V2", "V3", "V1"]);
}

#[test]
fn test_missing_screenshot_backfill_end_to_end() {
    let (engine, mut collection) = new_collection();

    engine.fail_capture(true);
    for n in 1..=3 {
        block_on(collection.create_view(
            NewView::new().with_id(format!("v{n}")).with_snapshot(json!({"scene": n})),
        ))
        .unwrap();
    }
    assert!(collection.screenshots().is_empty());

    engine.fail_capture(false);
    let captured = block_on(collection.generate_missing_screenshots());
    assert_eq!(captured, 3);

    // each snapshot was applied in collection order before its capture
    assert_eq!(
        engine.applied_snapshots(),
        vec![json!({"scene": 1}), json!({"scene": 2}), json!({"scene": 3})]
    );
    for n in 1..=3 {
        assert!(collection.screenshot_url(&format!("v{n}")).is_some());
    }
}

/// One step of an arbitrary coordinator workout.
#[derive(Debug, Clone)]
enum Op {
    Create { with_snapshot: bool, fail_capture: bool },
    Update(usize),
    Delete(usize),
    Reorder(usize, usize),
    SetCurrent(usize),
    Backfill,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (any::<bool>(), any::<bool>())
            .prop_map(|(with_snapshot, fail_capture)| Op::Create { with_snapshot, fail_capture }),
        (0..8usize).prop_map(Op::Update),
        (0..8usize).prop_map(Op::Delete),
        (0..8usize, 0..8usize).prop_map(|(a, b)| Op::Reorder(a, b)),
        (0..8usize).prop_map(Op::SetCurrent),
        Just(Op::Backfill),
    ]
}

fn check_invariants(collection: &ViewCollection) {
    // no two records share an id
    let mut ids: Vec<&str> = collection.views().iter().map(|v| v.id.as_str()).collect();
    let total = ids.len();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), total, "duplicate view id in collection");

    // the cache never references an id absent from the collection
    for cached in collection.screenshots().keys() {
        assert!(
            collection.get_view_by_id(cached).is_some(),
            "cache entry '{cached}' has no backing view"
        );
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_id_uniqueness_and_cache_consistency(ops in prop::collection::vec(op_strategy(), 1..40)) {
        let (engine, mut collection) = new_collection();

        for op in ops {
            match op {
                Op::Create { with_snapshot, fail_capture } => {
                    engine.fail_capture(fail_capture);
                    let mut new = NewView::new();
                    if with_snapshot {
                        new = new.with_snapshot(json!({"n": collection.len()}));
                    }
                    block_on(collection.create_view(new)).unwrap();
                    engine.fail_capture(false);
                }
                Op::Update(seed) => {
                    if let Some(view) = collection.views().get(seed % collection.len().max(1)) {
                        let id = view.id.clone();
                        collection.update_view(&id, ViewPatch::new().with_name("renamed")).unwrap();
                    }
                }
                Op::Delete(seed) => {
                    if let Some(view) = collection.views().get(seed % collection.len().max(1)) {
                        let id = view.id.clone();
                        collection.delete_view(&id).unwrap();
                    }
                }
                Op::Reorder(a, b) => {
                    let result = collection.reorder_views(a, b);
                    let len = collection.len();
                    if a < len && b < len {
                        prop_assert!(result.is_ok());
                    } else {
                        prop_assert!(
                            matches!(result, Err(CellviewError::IndexOutOfRange { .. })),
                            "expected IndexOutOfRange error"
                        );
                    }
                }
                Op::SetCurrent(seed) => {
                    let id = collection
                        .views()
                        .get(seed % collection.len().max(1))
                        .map(|view| view.id.clone());
                    collection.set_current_view(id);
                }
                Op::Backfill => {
                    block_on(collection.generate_missing_screenshots());
                }
            }
            check_invariants(&collection);

            // a live current-view marker always points at a real record
            if let Some(current) = collection.current_view_id() {
                prop_assert!(collection.get_view_by_id(current).is_some());
            }
        }
    }

    #[test]
    fn prop_reorder_preserves_other_relative_order(
        len in 2..8usize,
        source in 0..8usize,
        destination in 0..8usize,
    ) {
        let source = source % len;
        let destination = destination % len;

        let (_engine, mut collection) = new_collection();
        for n in 0..len {
            block_on(collection.create_view(NewView::new().with_id(format!("v{n}")))).unwrap();
        }

        let before: Vec<String> = collection.views().iter().map(|v| v.id.clone()).collect();
        collection.reorder_views(source, destination).unwrap();
        let after: Vec<String> = collection.views().iter().map(|v| v.id.clone()).collect();

        // the moved element lands at the destination
        prop_assert_eq!(&after[destination], &before[source]);

        // everyone else keeps their relative order
        let moved = &before[source];
        let rest_before: Vec<&String> = before.iter().filter(|id| *id != moved).collect();
        let rest_after: Vec<&String> = after.iter().filter(|id| *id != moved).collect();
        prop_assert_eq!(rest_before, rest_after);

        if source == destination {
            prop_assert_eq!(before, after);
        }
    }
}
