//! Scalar reference kernel. Grounded directly on the original benchmark's
//! `update_asteroids_fixed(vector<AsteroidFixed>&, ...)` (`normal.cpp`):
//! same precomputation, same per-lane formulas, same branchless compaction.
//! This implementation always compacts every tick (see `SPEC_FULL.md` §9,
//! Open Question (a) resolution) rather than the periodic-compaction
//! variant the source also contains.

use crate::error::KernelResult;
use crate::kernel::TickParams;
use crate::map::{div32, mod32, CollisionMap};
use crate::store::AsteroidStore;

/// Advances every live lane by one tick and compacts the store in place.
pub fn update_scalar(store: &mut AsteroidStore, map: &CollisionMap, platform_vel: f64) -> KernelResult<()> {
    let p = TickParams::new(map, platform_vel);
    let n = store.size();
    let mut write_index = 0usize;

    for i in 0..n {
        let vx = i32::from(*fast!(store.vel_x_raw(), [i]));
        let vy = i32::from(*fast!(store.vel_y_raw(), [i]));

        let new_px = *fast!(store.pos_x_raw(), [i]) + vx;
        let new_py = *fast!(store.pos_y_raw(), [i]) + vy + p.pv;

        let escaped =
            new_px < p.min_x || new_px > p.max_x || new_py < p.min_y || new_py > p.max_y;

        let clamped_px = new_px.clamp(p.min_x, p.max_x) >> crate::config::FRACTION_BITS;
        let clamped_py = new_py.clamp(p.min_y, p.max_y) >> crate::config::FRACTION_BITS;

        let cx = div32(clamped_px);
        let cy = div32(clamped_py);
        let tx = mod32(clamped_px);
        let ty = mod32(clamped_py);

        let chunk_idx = ((cx - p.ox) + (cy - p.oy) * p.gw) as usize;
        let pool_idx = *fast!(map.tiles(), [chunk_idx]);
        let bit = (tx + 32 * ty) as usize;
        let colli = map.pool().get(pool_idx).get_bit(bit);

        let dx = (p.cx - i64::from(new_px)) >> crate::config::FRACTION_BITS;
        let dy = (p.cy - i64::from(new_py)) >> crate::config::FRACTION_BITS;
        let dot = dx * i64::from(vx) + dy * i64::from(vy + p.pv);
        let leaving = escaped && dot <= 0;

        let remove = colli || leaving;

        store.copy_lane_raw(write_index, i, new_px, new_py);
        write_index += usize::from(!remove);
    }

    store.resize(write_index)
}
