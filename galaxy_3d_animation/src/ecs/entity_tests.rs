use super::*;
use slotmap::SlotMap;

fn make_ids(count: usize) -> Vec<EntityId> {
    let mut sm = SlotMap::<EntityId, ()>::with_key();
    (0..count).map(|_| sm.insert(())).collect()
}

// ============================================================================
// sort_dedup
// ============================================================================

#[test]
fn test_sort_dedup_removes_duplicates() {
    let ids = make_ids(4);
    let mut list = vec![ids[2], ids[0], ids[2], ids[3], ids[0], ids[1], ids[3]];

    sort_dedup(&mut list);

    assert_eq!(list, ids);
}

#[test]
fn test_sort_dedup_matches_std_sort() {
    let ids = make_ids(300);
    let mut list: Vec<EntityId> = ids.iter().rev().chain(ids.iter().step_by(7)).copied().collect();
    let mut expected = list.clone();
    expected.sort();
    expected.dedup();

    sort_dedup(&mut list);

    assert_eq!(list, expected);
}

#[test]
fn test_sort_dedup_orders_reused_slots_by_version() {
    let mut sm = SlotMap::<EntityId, ()>::with_key();
    let old = sm.insert(());
    sm.remove(old);
    let new = sm.insert(());
    let other = sm.insert(());
    let mut list = vec![other, new, old, new];

    sort_dedup(&mut list);

    let mut expected = vec![old, new, other];
    expected.sort();
    assert_eq!(list, expected);
}

#[test]
fn test_sort_dedup_small_inputs() {
    let mut empty: Vec<EntityId> = Vec::new();
    sort_dedup(&mut empty);
    assert!(empty.is_empty());

    let id = make_ids(1)[0];
    let mut single = vec![id];
    sort_dedup(&mut single);
    assert_eq!(single, vec![id]);
}
