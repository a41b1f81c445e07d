//! # Error types
//!
//! Only genuinely exceptional outcomes get a typed error here. The
//! contractual "none" results the public API returns for zero-size
//! requests and null operands are plain `Option`s, not errors — see the
//! crate's top-level documentation for the full rationale.

/// Failure initializing a fresh [`crate::SegHeap`].
#[derive(Debug, thiserror::Error)]
pub enum InitError<E: core::fmt::Debug> {
    /// The provider rejected the very first reservation (prologue + epilogue).
    #[error("heap provider rejected the initial reservation: {0:?}")]
    ProviderRejected(E),
    /// The provider rejected the initial chunk extension.
    #[error("heap provider rejected the initial chunk extension: {0:?}")]
    InitialExtendFailed(E),
}
