//! Error type for the kernel's one genuinely fallible path: the system
//! allocator refusing a `Layout`. Everything else in this crate is either
//! infallible or explicitly documented undefined behaviour on caller misuse
//! (see `SPEC_FULL.md` §7).

/// Errors surfaced by `AlignedBuffer`, `AsteroidStore` and `CollisionMap`.
#[derive(Debug, thiserror::Error)]
pub enum KernelError {
    /// The system allocator rejected a request, or the requested layout
    /// would overflow `isize`.
    #[error("allocation of {requested_bytes} bytes failed")]
    Allocation { requested_bytes: usize },
}

/// Result alias used throughout the crate's fallible paths.
pub type KernelResult<T> = Result<T, KernelError>;
