//! Core type system and error handling for FerroSync
//!
//! This crate provides the foundational types shared by every FerroSync crate:
//!
//! - **Error handling**: the umbrella [`Error`] that each subsystem error converts into
//! - **Run accounting**: per-object outcomes and aggregated [`SyncStats`]
//! - **Traits**: reporting hooks for the outer run controller
//! - **Configuration primitives**: validated buffer sizes and worker counts
//!
//! # Features
//!
//! - `std` (default): Enable standard library features
//! - `serde`: Enable serialization support
//!
//! # Examples
//!
//! ```rust
//! use ferrosync_types::{ObjectOutcome, Result, SyncStats};
//!
//! fn example_run() -> Result<SyncStats> {
//!     let mut stats = SyncStats::new();
//!     stats.record(&ObjectOutcome::written("photos/cat.jpg", 2048));
//!     stats.record(&ObjectOutcome::skipped("photos/dog.jpg", "target newer than source"));
//!     Ok(stats)
//! }
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use config::{BufferSize, ThreadCount};
pub use error::{Error, ErrorKind};
pub use result::Result;
pub use traits::*;
pub use types::*;
