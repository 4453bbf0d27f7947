//! FerroSync integration test suite
//!
//! Cross-crate tests live under `tests/`. This library holds the utilities
//! they share, most importantly an in-memory bucket store that stands in for
//! a real object storage backend.

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Shared test utilities
///
/// In-memory storage with fault injection and helpers for building sync
/// objects and filesystem trees.
pub mod test_utils;
