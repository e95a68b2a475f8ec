use super::*;
use crate::camera::Frustum;
use glam::{Mat4, Vec3};
use slotmap::SlotMap;

// ============================================================================
// Helpers
// ============================================================================

fn grid() -> SpatialGrid {
    SpatialGrid::new(SpatialGridConfig { cell_size: 10.0, max_depth: 2 })
}

fn make_ids(count: usize) -> Vec<EntityId> {
    let mut sm = SlotMap::<EntityId, ()>::with_key();
    (0..count).map(|_| sm.insert(())).collect()
}

/// Camera at z = 5 looking down -Z, far = 100.
fn frustum() -> Frustum {
    let proj = Mat4::perspective_rh(std::f32::consts::FRAC_PI_2, 1.0, 0.1, 100.0);
    let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y);
    Frustum::from_view_projection(&(proj * view))
}

fn query_all(grid: &SpatialGrid, frustum: &Frustum) -> Vec<EntityId> {
    let mut ids = Vec::new();
    for key in grid.regions_for_frustum(frustum) {
        if let Some(region) = grid.region(key) {
            region.for_each_object_in_frustum(frustum, |entry, _| ids.push(entry.id));
        }
    }
    ids
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_default_config() {
    let config = SpatialGridConfig::default();
    assert!(config.cell_size > 0.0);
    assert_eq!(config.max_depth, 3);
}

#[test]
fn test_cell_bounds() {
    let grid = grid();
    let bounds = grid.cell_bounds(RegionKey::new(-1, 0, 2));
    assert_eq!(bounds.min, Vec3::new(-10.0, 0.0, 20.0));
    assert_eq!(bounds.max, Vec3::new(0.0, 10.0, 30.0));
}

// ============================================================================
// Mutation
// ============================================================================

#[test]
fn test_insert_creates_single_region() {
    let mut grid = grid();
    let id = make_ids(1)[0];

    grid.insert(id, AABB::new(Vec3::new(1.0, 1.0, 1.0), Vec3::new(2.0, 2.0, 2.0)));

    assert_eq!(grid.len(), 1);
    assert_eq!(grid.region_count(), 1);
    assert!(grid.region(RegionKey::new(0, 0, 0)).is_some());
    assert_eq!(
        grid.regions_for_aabb(&AABB::new(Vec3::splat(0.5), Vec3::splat(1.5))),
        vec![RegionKey::new(0, 0, 0)]
    );
}

#[test]
fn test_insert_spanning_cells_indexes_each_cell() {
    let mut grid = grid();
    let id = make_ids(1)[0];

    // Crosses x = 0 and y = 0 → four cells
    grid.insert(id, AABB::new(Vec3::new(-1.0, -1.0, 1.0), Vec3::new(1.0, 1.0, 2.0)));

    assert_eq!(grid.region_count(), 4);
    for key in [
        RegionKey::new(-1, -1, 0),
        RegionKey::new(0, -1, 0),
        RegionKey::new(-1, 0, 0),
        RegionKey::new(0, 0, 0),
    ] {
        let region = grid.region(key).unwrap();
        assert!(region.read_lock().unwrap().contains(id));
    }
}

#[test]
fn test_remove_clears_every_cell() {
    let mut grid = grid();
    let id = make_ids(1)[0];
    grid.insert(id, AABB::new(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0)));

    assert!(grid.remove(id));
    assert!(!grid.remove(id));
    assert!(grid.is_empty());
    assert!(query_all(&grid, &frustum()).is_empty());
}

#[test]
fn test_update_moves_between_cells() {
    let mut grid = grid();
    let id = make_ids(1)[0];
    grid.insert(id, AABB::new(Vec3::new(1.0, 1.0, 1.0), Vec3::new(2.0, 2.0, 2.0)));
    grid.update(id, AABB::new(Vec3::new(31.0, 1.0, 1.0), Vec3::new(32.0, 2.0, 2.0)));

    let old = grid.region(RegionKey::new(0, 0, 0)).unwrap();
    let new = grid.region(RegionKey::new(3, 0, 0)).unwrap();
    assert!(!old.read_lock().unwrap().contains(id));
    assert!(new.read_lock().unwrap().contains(id));
    assert_eq!(grid.len(), 1);
}

#[test]
fn test_clear_drops_regions() {
    let mut grid = grid();
    for (i, id) in make_ids(5).into_iter().enumerate() {
        let x = i as f32 * 20.0;
        grid.insert(id, AABB::new(Vec3::new(x, 0.0, 0.0), Vec3::new(x + 1.0, 1.0, 1.0)));
    }
    grid.clear();

    assert_eq!(grid.region_count(), 0);
    assert!(grid.is_empty());
}

// ============================================================================
// Queries
// ============================================================================

#[test]
fn test_regions_for_aabb_returns_only_built_regions_sorted() {
    let mut grid = grid();
    let ids = make_ids(3);
    grid.insert(ids[0], AABB::new(Vec3::splat(25.0), Vec3::splat(26.0)));
    grid.insert(ids[1], AABB::new(Vec3::splat(-15.0), Vec3::splat(-14.0)));
    grid.insert(ids[2], AABB::new(Vec3::splat(500.0), Vec3::splat(501.0)));

    let keys = grid.regions_for_aabb(&AABB::new(Vec3::splat(-50.0), Vec3::splat(50.0)));

    assert_eq!(keys, vec![RegionKey::new(-2, -2, -2), RegionKey::new(2, 2, 2)]);
}

#[test]
fn test_regions_for_huge_aabb_filters_built_regions() {
    let mut grid = grid();
    let id = make_ids(1)[0];
    grid.insert(id, AABB::new(Vec3::splat(1.0), Vec3::splat(2.0)));

    let everything = AABB::new(Vec3::splat(f32::MIN), Vec3::splat(f32::MAX));
    assert_eq!(grid.regions_for_aabb(&everything), vec![RegionKey::new(0, 0, 0)]);
}

#[test]
fn test_missing_region_yields_nothing() {
    let grid = grid();
    assert!(grid.region(RegionKey::new(7, 7, 7)).is_none());
    assert!(grid.regions_for_frustum(&frustum()).is_empty());
}

#[test]
fn test_frustum_query_reports_spanning_entity_once_per_region() {
    let mut grid = grid();
    let ids = make_ids(2);
    // In view, straddling the x = 0 cell boundary
    grid.insert(ids[0], AABB::new(Vec3::new(-1.0, 1.0, -3.0), Vec3::new(1.0, 2.0, -2.0)));
    // Behind the camera
    grid.insert(ids[1], AABB::new(Vec3::new(1.0, 1.0, 20.0), Vec3::new(2.0, 2.0, 21.0)));

    let ids_seen = query_all(&grid, &frustum());

    assert_eq!(ids_seen, vec![ids[0], ids[0]]);
}

// ============================================================================
// Overflow region
// ============================================================================

#[test]
fn test_huge_entity_goes_to_overflow_region() {
    let mut grid = grid();
    let id = make_ids(1)[0];

    grid.insert(id, AABB::new(Vec3::splat(-1e5), Vec3::splat(1e5)));

    assert_eq!(grid.len(), 1);
    assert_eq!(grid.overflow_len(), 1);
    assert_eq!(grid.region_count(), 0);
    let region = grid.region(OVERFLOW_REGION).unwrap();
    assert!(region.read_lock().unwrap().contains(id));
}

#[test]
fn test_unbounded_entity_goes_to_overflow_region() {
    let mut grid = grid();
    let id = make_ids(1)[0];

    grid.insert(id, AABB::new(Vec3::splat(f32::MIN), Vec3::splat(f32::MAX)));

    assert_eq!(grid.overflow_len(), 1);
    assert_eq!(grid.region_count(), 0);
}

#[test]
fn test_entity_at_cell_limit_stays_in_cells() {
    let mut grid = grid();
    let id = make_ids(1)[0];

    // 4 x 4 x 4 cells, exactly the limit
    grid.insert(id, AABB::new(Vec3::splat(0.5), Vec3::splat(39.5)));

    assert_eq!(grid.overflow_len(), 0);
    assert_eq!(grid.region_count() as i64, MAX_CELLS_PER_ENTITY);
}

#[test]
fn test_overflow_region_is_queried_and_culled_per_entry() {
    let mut grid = grid();
    let ids = make_ids(3);
    // Huge and in view
    grid.insert(ids[0], AABB::new(Vec3::new(-1e5, -1e5, -1e5), Vec3::new(1e5, 1e5, 0.0)));
    // Huge and entirely behind the camera
    grid.insert(ids[1], AABB::new(Vec3::new(-1e5, -1e5, 50.0), Vec3::new(1e5, 1e5, 1e5)));
    // Regular entity in view
    grid.insert(ids[2], AABB::new(Vec3::new(1.0, 1.0, -3.0), Vec3::new(2.0, 2.0, -2.0)));

    let keys = grid.regions_for_frustum(&frustum());
    assert_eq!(keys.first(), Some(&OVERFLOW_REGION));

    let mut seen = query_all(&grid, &frustum());
    seen.sort();
    let mut expected = vec![ids[0], ids[2]];
    expected.sort();
    assert_eq!(seen, expected);
}

#[test]
fn test_remove_and_move_out_of_overflow_region() {
    let mut grid = grid();
    let ids = make_ids(2);
    grid.insert(ids[0], AABB::new(Vec3::splat(-1e5), Vec3::splat(1e5)));
    grid.insert(ids[1], AABB::new(Vec3::splat(-1e5), Vec3::splat(1e5)));

    assert!(grid.remove(ids[0]));
    assert_eq!(grid.overflow_len(), 1);

    grid.update(ids[1], AABB::new(Vec3::splat(1.0), Vec3::splat(2.0)));
    assert_eq!(grid.overflow_len(), 0);
    assert!(grid.region(OVERFLOW_REGION).is_none());
    assert!(!grid.regions_for_frustum(&frustum()).contains(&OVERFLOW_REGION));
    assert!(grid.region(RegionKey::new(0, 0, 0)).unwrap().read_lock().unwrap().contains(ids[1]));
}

#[test]
fn test_clear_empties_overflow_region() {
    let mut grid = grid();
    let id = make_ids(1)[0];
    grid.insert(id, AABB::new(Vec3::splat(-1e5), Vec3::splat(1e5)));

    grid.clear();

    assert_eq!(grid.overflow_len(), 0);
    assert!(grid.region(OVERFLOW_REGION).is_none());
}
