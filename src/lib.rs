//! Asteroid Kernel - Deterministic fixed-point motion and culling kernel
//!
//! Architecture:
//! - fixed.rs   - Q11 fixed-point position/velocity newtypes
//! - memory.rs  - Aligned, zero-filled heap buffers for the SoA store
//! - store.rs   - Structure-of-Arrays asteroid storage with branchless
//!                compaction support
//! - tile.rs    - Bit-tile collision masks and an interning pool
//! - map.rs     - Auto-expanding sparse collision map over tile chunks
//! - kernel.rs  - Per-tick update: scalar reference and AVX2 vector kernel
//! - config.rs  - Frozen constants (fraction bits, chunk geometry, alignment)
//! - error.rs   - Fallible-allocation error type

#[macro_use]
mod core;

mod config;
mod error;
mod fixed;
mod memory;
mod tile;
mod map;
mod store;
mod kernel;

pub use config::{
    BORDER, CHUNK_SIZE, FRACTION_BITS, PAD_DEFAULT, REMOVE_BIT, REMOVE_BIT_INDEX, VECTOR_LANES,
};
pub use error::{KernelError, KernelResult};
pub use fixed::{Pos, Vel};
pub use kernel::update_asteroids;
pub use map::{div32, mod32, Aabb, CollisionMap};
pub use store::AsteroidStore;
pub use tile::{TileMask, TilePool};

#[cfg(feature = "parallel")]
pub use kernel::update_sharded;

/// Direct access to the scalar and AVX2 kernels, for callers that need to
/// pin a specific implementation (benchmarking, cross-kernel equivalence
/// tests) rather than the runtime-dispatched [`update_asteroids`].
pub mod kernels {
    pub use crate::kernel::scalar::update_scalar;
    pub use crate::kernel::vector::update_vector;
}
