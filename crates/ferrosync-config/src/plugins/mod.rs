//! Plugins shipped with FerroSync

mod filesystem;
mod filters;
mod namespace_copy;

pub use filesystem::{FilesystemConfig, URI_PREFIX as FILE_URI_PREFIX};
pub use filters::{GladinetMappingConfig, RestoreAclConfig};
pub use namespace_copy::{EcsNamespaceCopyConfig, URI_PREFIX as ECS_NS_COPY_URI_PREFIX};
