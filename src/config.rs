//! Frozen constants shared by the fixed-point types, the collision map and
//! both update kernels. Everything here is load-bearing for the scalar and
//! vector kernels' equivalence: change one of these and both must change
//! together.

/// Fractional bits shared by `Pos` and `Vel` (Q-format width).
pub const FRACTION_BITS: u32 = 11;

/// Chunk edge length in tiles; also the tile mask's bit-grid edge length.
pub const CHUNK_SIZE: i32 = 32;

/// `log2(CHUNK_SIZE)`, used for the `>> 5` chunk-coordinate shifts.
pub const CHUNK_SHIFT: u32 = 5;

/// World-tile padding added to `platform_bound` on every side before
/// deriving the indexable chunk grid.
pub const BORDER: i32 = 48;

/// Half-extent of the permanently solid hub square seeded at map
/// construction, in world tile coordinates.
pub const PAD_DEFAULT: i32 = 5;

/// Bit index of the Remove flag within the low 16 bits of an asteroid's
/// `state` word.
pub const REMOVE_BIT_INDEX: u32 = 15;

/// The Remove flag itself, pre-shifted.
pub const REMOVE_BIT: u16 = 1 << REMOVE_BIT_INDEX;

/// SoA physical capacity is always a multiple of this many lanes.
pub const SOA_ALIGN_MULTIPLE: usize = 16;

/// Minimum byte alignment for every SoA backing buffer.
pub const SOA_MIN_ALIGN: usize = 32;

/// Buffers at or above this byte size prefer 2 MiB (huge-page) alignment
/// instead of the 32-byte SIMD minimum.
pub const HUGE_PAGE_THRESHOLD_BYTES: usize = 2 * 1024 * 1024;

/// The huge-page alignment itself.
pub const HUGE_PAGE_ALIGN: usize = 2 * 1024 * 1024;

/// Lane width of the vector kernel's hardware-accelerated path (AVX2, 256-bit).
pub const VECTOR_LANES: usize = 8;

/// Round `n` up to the next multiple of `SOA_ALIGN_MULTIPLE`.
#[inline]
#[must_use]
pub const fn round_up_16(n: usize) -> usize {
    (n + (SOA_ALIGN_MULTIPLE - 1)) & !(SOA_ALIGN_MULTIPLE - 1)
}
