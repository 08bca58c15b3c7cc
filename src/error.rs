//! Defines error types.
use thiserror::Error;

/// Crate result type (re-exported),
pub type Result<T> = std::result::Result<T, Error>;

/// Error types.
#[derive(Error, Debug, Eq, PartialEq)]
pub enum Error {
    /// Queue capacity must allow modular indexing with a bitmask.
    #[error("capacity must be a positive power of two, provided: {0}")]
    InvalidCapacity(usize),
}

#[cold]
#[inline(never)]
pub(crate) const fn invalid_capacity(provided: usize) -> Error {
    Error::InvalidCapacity(provided)
}
