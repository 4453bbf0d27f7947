//! Copy engine for FerroSync
//!
//! This crate decides, object by object, whether a source object is written
//! to the target and performs the write.
//!
//! # Features
//!
//! - **Targets**: [`NamespaceCopyTarget`] copies bucket objects server-side across namespaces
//! - **Overwrite policy**: skip objects already in sync or newer on the target
//! - **Worker pool**: [`SyncExecutor`] runs a target over a source with bounded concurrency
//! - **Cancellation**: in-flight objects abort as [`CopyError::Cancelled`]
//!
//! # Examples
//!
//! ```rust,no_run
//! use ferrosync_config::EcsNamespaceCopyConfig;
//! use ferrosync_engine::{ExecutorConfig, NamespaceCopyTarget, ObjectBackend, SyncExecutor};
//! use ferrosync_model::SyncObject;
//! use std::sync::Arc;
//!
//! # async fn example<B: ObjectBackend + 'static>(
//! #     backend: Arc<B>,
//! #     config: EcsNamespaceCopyConfig,
//! #     objects: Vec<SyncObject>,
//! # ) -> Result<(), Box<dyn std::error::Error>> {
//! let target = NamespaceCopyTarget::configure(&config, backend).await?;
//! let executor = SyncExecutor::new(ExecutorConfig::default());
//! let stats = executor.run(Arc::new(target), objects.into_iter().map(Ok)).await;
//! println!("{} written, {} skipped", stats.objects_written, stats.objects_skipped);
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod backend;
pub mod error;
pub mod executor;
pub mod policy;
pub mod target;

pub use backend::{CopyObjectRequest, CopyObjectResult, ObjectBackend};
pub use error::{BoxError, CopyError, TargetError};
pub use executor::{ExecutorConfig, SyncExecutor};
pub use policy::{Decision, OverwritePolicy, SkipReason, WriteReason};
pub use target::{CopyOutcome, NamespaceCopyTarget, SyncTarget};
