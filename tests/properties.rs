//! Property-based tests for the quantified invariants in `SPEC_FULL.md` §8.

use asteroid_kernel::{
    kernels, mod32, update_asteroids, AsteroidStore, CollisionMap, Pos, TileMask, Vel,
};
use proptest::prelude::*;

fn arbitrary_lane() -> impl Strategy<Value = (f64, f64, f64, f64)> {
    (
        -500.0..500.0f64,
        -500.0..500.0f64,
        -15.0..15.0f64,
        -15.0..15.0f64,
    )
}

fn store_of(lanes: &[(f64, f64, f64, f64)]) -> AsteroidStore {
    let mut store = AsteroidStore::new();
    store.resize(lanes.len()).unwrap();
    for (i, &(px, py, vx, vy)) in lanes.iter().enumerate() {
        store.set_lane(
            i,
            i as u16,
            0,
            Pos::from_real(px).raw(),
            Pos::from_real(py).raw(),
            Vel::from_real(vx).raw(),
            Vel::from_real(vy).raw(),
        );
    }
    store
}

proptest! {
    /// Invariant 1: alignment. Capacity is always a multiple of 16, and the
    /// buffers' base pointers (checked indirectly through the SoA slices'
    /// addresses) are 32-byte aligned.
    #[test]
    fn alignment_holds_across_resize_sequences(sizes in prop::collection::vec(0usize..200, 1..20)) {
        let mut store = AsteroidStore::new();
        for size in sizes {
            store.resize(size).unwrap();
            prop_assert_eq!(store.capacity() % 16, 0);
            let ptr = store.position_x().as_ptr() as usize;
            if store.capacity() > 0 {
                prop_assert_eq!(ptr % 32, 0);
            }
        }
    }

    /// Invariant 2: padding. Every lane in `[size, capacity)` carries the
    /// Remove bit and zeroed position/velocity after a resize.
    #[test]
    fn padding_holds_after_arbitrary_resize(a in 0usize..100, b in 0usize..100) {
        let mut store = AsteroidStore::new();
        store.resize(a).unwrap();
        store.resize(b).unwrap();
        for i in b..store.capacity() {
            prop_assert!(store.is_removed(i));
        }
    }

    /// Invariant 3: pool canonicalization. After an arbitrary sequence of
    /// set/unset calls, no pool index above 1 is all-zero or all-one, and
    /// the free list never holds a sentinel.
    #[test]
    fn pool_canonicalization_holds(ops in prop::collection::vec((-200i32..200, -200i32..200, any::<bool>()), 0..200)) {
        let mut map = CollisionMap::new();
        for (x, y, set) in ops {
            if set { map.set(x, y); } else { map.unset(x, y); }
        }
        prop_assert!(!map.pool().free_indices().contains(&0));
        prop_assert!(!map.pool().free_indices().contains(&1));
        for &pool_idx in map.tiles() {
            if pool_idx > 1 {
                let mask = map.pool().get(pool_idx);
                prop_assert!(!mask.all());
                prop_assert!(!mask.none());
            }
        }
    }

    /// Invariant 4: every clamped query position falls within the indexable
    /// chunk grid.
    #[test]
    fn clamped_positions_always_index_in_range(x in -5000i32..5000, y in -5000i32..5000) {
        let map = CollisionMap::new();
        let bound = map.platform_bound();
        let border = asteroid_kernel::BORDER;
        let cx_world = x.clamp(bound.left - border, bound.right + border);
        let cy_world = y.clamp(bound.bottom - border, bound.top + border);
        let cx = asteroid_kernel::div32(cx_world);
        let cy = asteroid_kernel::div32(cy_world);
        prop_assert!(cx >= map.x_offset() && cx < map.x_offset() + map.grid_w());
        prop_assert!(cy >= map.y_offset() && cy < map.y_offset() + map.grid_h());
    }

    /// Invariant 5: the scalar and vector kernels agree bit-for-bit.
    #[test]
    fn scalar_and_vector_kernels_agree(
        lanes in prop::collection::vec(arbitrary_lane(), 1..40),
        pv in -2.0..2.0f64,
    ) {
        let map = CollisionMap::new();
        let mut a = store_of(&lanes);
        let mut b = store_of(&lanes);

        kernels::update_scalar(&mut a, &map, pv).unwrap();
        kernels::update_vector(&mut b, &map, pv).unwrap();

        prop_assert_eq!(a.size(), b.size());
        prop_assert_eq!(a.prototype_id(), b.prototype_id());
        prop_assert_eq!(a.flags(), b.flags());
        prop_assert_eq!(a.position_x(), b.position_x());
        prop_assert_eq!(a.position_y(), b.position_y());
        prop_assert_eq!(a.velocity_x(), b.velocity_x());
        prop_assert_eq!(a.velocity_y(), b.velocity_y());
    }

    /// Invariant 6: monotonic compaction. The surviving subsequence after a
    /// tick is a contiguous (in original order) subsequence of the inputs.
    #[test]
    fn compaction_preserves_relative_order(lanes in prop::collection::vec(arbitrary_lane(), 1..40)) {
        let map = CollisionMap::new();
        let mut store = store_of(&lanes);
        let original_ids: Vec<u16> = (0..lanes.len() as u16).collect();

        update_asteroids(&mut store, &map, 0.0).unwrap();

        let survivor_ids = store.prototype_id().to_vec();
        let mut cursor = 0usize;
        for &id in &survivor_ids {
            let found = original_ids[cursor..].iter().position(|&o| o == id);
            prop_assert!(found.is_some());
            cursor += found.unwrap() + 1;
        }
    }

    /// Invariant 7: `mod32` is always non-negative and in range.
    #[test]
    fn mod32_is_always_in_0_31(v in any::<i32>()) {
        let m = mod32(v);
        prop_assert!((0..32).contains(&m));
    }

    /// Invariant 8: the hub square is immune to `unset`.
    #[test]
    fn hub_immunity_holds(x in -5i32..5, y in -5i32..5) {
        let mut map = CollisionMap::new();
        prop_assert!(!map.unset(x, y));
        prop_assert!(map.get_tile(asteroid_kernel::div32(x), asteroid_kernel::div32(y))
            .unwrap()
            .get_bit(TileMask::bit_index(mod32(x) as u32, mod32(y) as u32)));
    }
}
