/// Entity identifiers.
///
/// Entities are slot map keys: stable, `Copy`, totally ordered, and
/// invalidated only when their own entity is despawned.

use rdst::RadixSort;
use slotmap::{new_key_type, Key, KeyData};

// ===== SLOT MAP KEY =====

new_key_type! {
    /// Stable handle to an entity in a [`World`](super::World).
    pub struct EntityId;
}

/// Sort ids in ascending `EntityId` order and drop duplicates.
///
/// Keys are radix-sorted on their 64-bit form. The FFI layout keeps the
/// version in the high half, so halves are swapped to sort by slot index
/// first, matching the derived `Ord`.
pub fn sort_dedup(ids: &mut Vec<EntityId>) {
    if ids.len() < 2 {
        return;
    }

    let mut bits: Vec<u64> = ids.iter().map(|id| id.data().as_ffi().rotate_left(32)).collect();
    bits.radix_sort_unstable();
    bits.dedup();

    ids.clear();
    ids.extend(bits.into_iter().map(|b| EntityId::from(KeyData::from_ffi(b.rotate_right(32)))));
}

#[cfg(test)]
#[path = "entity_tests.rs"]
mod tests;
