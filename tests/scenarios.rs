//! The literal seed scenarios from the tuple-space's testable-properties
//! section, run end-to-end against [`Store`].

use lindadb::{Store, StoreConfig, Template, Tuple, Value, ValueTag};

fn tup(values: Vec<Value>) -> Tuple {
    Tuple::from_values(values).unwrap()
}

#[test]
fn scenario_1_read_leaves_the_tuple_in_place() {
    let store = Store::default();
    store.insert(tup(vec!["p".into(), 7i32.into()]));

    let template = Template::new(tup(vec!["p".into(), Value::wildcard(ValueTag::Int32)]));
    let found = store.try_read(&template).expect("tuple should be found");
    assert_eq!(found, tup(vec!["p".into(), 7i32.into()]));
    assert_eq!(store.len(), 1);
}

#[test]
fn scenario_2_take_then_read_reports_not_found() {
    let store = Store::default();
    store.insert(tup(vec!["p".into(), 7i32.into()]));

    let template = Template::new(tup(vec!["p".into(), 7i32.into()]));
    let taken = store.try_take(&template).expect("tuple should be found");
    assert_eq!(taken, tup(vec!["p".into(), 7i32.into()]));
    assert!(store.try_read(&template).is_none());
}

#[test]
fn scenario_3_blocking_take_released_by_concurrent_insert() {
    use std::sync::Arc;
    use std::time::Duration;

    let store = Arc::new(Store::default());
    let reader = Arc::clone(&store);
    let handle = std::thread::spawn(move || {
        let template = Template::new(tup(vec!["x".into(), Value::wildcard(ValueTag::Int32)]));
        reader.take(&template)
    });

    std::thread::sleep(Duration::from_millis(50));
    assert!(!handle.is_finished(), "take should still be blocked on an empty store");
    store.insert(tup(vec!["x".into(), 42i32.into()]));

    let found = handle.join().expect("reader thread must not panic");
    assert_eq!(found, tup(vec!["x".into(), 42i32.into()]));
}

#[test]
fn scenario_4_in_order_traversal_of_shuffled_inserts_is_ascending() {
    let store = Store::new(StoreConfig::new().with_payload_capacity(4).build().unwrap());
    let mut order: Vec<i32> = (0..1000).collect();
    // deterministic shuffle: a fixed permutation rather than a RNG dependency.
    order.sort_by_key(|&i| i.wrapping_mul(2654435761u32 as i32));
    for i in &order {
        store.insert(tup(vec!["k".into(), (*i).into()]));
    }

    let snapshot = store.snapshot();
    assert_eq!(snapshot.len(), 1000);
    let mut expected: Vec<i32> = (0..1000).collect();
    expected.sort();
    let actual: Vec<i32> = snapshot
        .iter()
        .map(|t| match &t[1] {
            Value::Int32(v) => *v,
            other => panic!("expected Int32, found {other:?}"),
        })
        .collect();
    assert_eq!(actual, expected);
}

/// Covers scenario 5's store-level behavior (every tuple removable, store
/// ends up empty). `Store` exposes no hook to inspect the underlying tree's
/// balance factors from outside the crate, so scenario 5's AVL-invariant
/// (P2) assertion after *every* remove is covered separately by
/// `index::tests::scenario_5_full_drain_stays_avl_balanced_after_every_remove`,
/// which runs the same 1000-entry drain directly against `Tree`.
#[test]
fn scenario_5_removing_everything_by_wildcard_template_empties_the_store() {
    let store = Store::new(StoreConfig::new().with_payload_capacity(4).build().unwrap());
    for i in 0..1000 {
        store.insert(tup(vec!["k".into(), i.into()]));
    }

    let template = Template::new(tup(vec!["k".into(), Value::wildcard(ValueTag::Int32)]));
    for _ in 0..1000 {
        assert!(store.try_take(&template).is_some());
    }
    assert!(store.is_empty());
    assert!(store.try_take(&template).is_none());
}

#[test]
fn scenario_6_heterogeneous_tuple_survives_wire_round_trip() {
    let tuple = tup(vec![
        1u16.into(),
        (-2i64).into(),
        3.5f32.into(),
        "hi".into(),
        Value::wildcard(ValueTag::Int32),
    ]);
    let mut buf = Vec::new();
    lindadb::wire::encode_tuple(&tuple, &mut buf);
    let decoded = lindadb::wire::decode_tuple(&buf).unwrap();
    assert_eq!(tuple, decoded);
}

#[test]
fn p4_take_then_read_returns_some_then_none() {
    let store = Store::default();
    let tuple = tup(vec!["once".into(), 1i32.into()]);
    store.insert(tuple.clone());
    let template = Template::new(tuple.clone());

    assert_eq!(store.try_take(&template), Some(tuple));
    assert_eq!(store.try_read(&template), None);
}
