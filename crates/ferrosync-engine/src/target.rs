//! Sync targets
//!
//! [`NamespaceCopyTarget`] copies bucket objects server-side into a target
//! bucket, possibly across namespaces. For every object it:
//!
//! 1. skips directories, which have no representation in a bucket
//! 2. makes sure the source metadata is loaded
//! 3. computes the target key as root key plus relative path
//! 4. probes the target key, where "not found" means the key is free
//! 5. applies the [`OverwritePolicy`]
//! 6. issues a [`CopyObjectRequest`] and records the returned etag

use crate::backend::{CopyObjectRequest, ObjectBackend};
use crate::error::{CopyError, TargetError};
use crate::policy::{Decision, OverwritePolicy, SkipReason, WriteReason};
use async_trait::async_trait;
use ferrosync_config::{ConfigError, CopySettings, EcsNamespaceCopyConfig};
use ferrosync_model::{
    full_path, ObjectKind, ObjectLocation, ObjectReader, StorageError, SyncObject,
};
use ferrosync_types::ObjectOutcome;
use std::sync::Arc;
use tracing::{debug, info};

/// What a target did with one object
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyOutcome {
    /// Directory objects are never written
    SkippedDirectory,
    /// The overwrite policy kept the existing target
    Skipped(SkipReason),
    /// The object was written
    Written {
        /// Key written in the target bucket
        target_key: String,
        /// Integrity tag returned by the backend
        etag: Option<String>,
        /// Source content length
        bytes: u64,
        /// Why the policy allowed the write
        reason: WriteReason,
    },
}

impl CopyOutcome {
    /// Run accounting record for this outcome
    pub fn to_object_outcome(&self, relative_path: &str) -> ObjectOutcome {
        match self {
            Self::SkippedDirectory => ObjectOutcome::skipped(relative_path, "directory"),
            Self::Skipped(reason) => ObjectOutcome::skipped(relative_path, reason.to_string()),
            Self::Written { bytes, .. } => ObjectOutcome::written(relative_path, *bytes),
        }
    }
}

/// Destination of a sync run
#[async_trait]
pub trait SyncTarget: Send + Sync {
    /// Display name
    fn name(&self) -> &str;

    /// Copy one object, deciding between skip and write
    async fn copy(&self, object: &mut SyncObject) -> Result<CopyOutcome, CopyError>;

    /// Object representing what the target holds for `object`
    fn reverse(&self, object: &SyncObject) -> SyncObject;
}

/// Server-side copy into a bucket of another namespace
#[derive(Debug)]
pub struct NamespaceCopyTarget<B> {
    backend: Arc<B>,
    bucket: String,
    root_key: String,
    source_namespace: Option<String>,
    policy: OverwritePolicy,
}

impl<B: ObjectBackend + 'static> NamespaceCopyTarget<B> {
    /// Validate the configuration and set up the target
    ///
    /// Unless `verify_target_bucket` is off, the target bucket must exist.
    pub async fn configure(
        config: &EcsNamespaceCopyConfig,
        backend: Arc<B>,
    ) -> Result<Self, TargetError> {
        Self::configure_with_settings(config, &CopySettings::default(), backend).await
    }

    /// Set up the target under run-level copy settings
    ///
    /// `settings.force` turns forcing on for every target of the run; a
    /// plugin configuration cannot turn it back off.
    pub async fn configure_with_settings(
        config: &EcsNamespaceCopyConfig,
        settings: &CopySettings,
        backend: Arc<B>,
    ) -> Result<Self, TargetError> {
        config.validate()?;
        let force = config.force || settings.force;
        let bucket = config
            .target_bucket
            .clone()
            .ok_or_else(|| ConfigError::missing_required("targetBucket"))?;

        if config.verify_target_bucket {
            match backend.bucket_exists(&bucket).await {
                Ok(true) => {}
                Ok(false) => return Err(TargetError::BucketMissing { bucket }),
                Err(source) => return Err(TargetError::Backend { bucket, source }),
            }
        }

        let root_key = config.root_key.clone().unwrap_or_default();
        info!(
            "Namespace copy from {} into {} (root key '{}', force: {})",
            config.source_namespace.as_deref().unwrap_or("<object namespace>"),
            bucket,
            root_key,
            force
        );

        Ok(Self {
            backend,
            bucket,
            root_key,
            source_namespace: config.source_namespace.clone(),
            policy: OverwritePolicy::new(force),
        })
    }

    /// Target bucket
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Prefix of every target key
    pub fn root_key(&self) -> &str {
        &self.root_key
    }

    /// Overwrite policy in effect
    pub fn policy(&self) -> OverwritePolicy {
        self.policy
    }

    /// Key an object with `relative_path` is written to
    pub fn target_key(&self, relative_path: &str) -> String {
        format!("{}{}", self.root_key, relative_path)
    }

    fn copy_request(
        &self,
        object: &SyncObject,
        target_key: &str,
    ) -> Result<CopyObjectRequest, StorageError> {
        match object.location() {
            ObjectLocation::Bucket {
                namespace,
                bucket,
                key,
            } => Ok(CopyObjectRequest {
                source_namespace: self.source_namespace.clone().or_else(|| namespace.clone()),
                source_bucket: bucket.clone(),
                source_key: key.clone(),
                target_bucket: self.bucket.clone(),
                target_key: target_key.to_string(),
            }),
            other => Err(StorageError::UnsupportedLocation {
                location: other.to_string(),
            }),
        }
    }
}

#[async_trait]
impl<B: ObjectBackend + 'static> SyncTarget for NamespaceCopyTarget<B> {
    fn name(&self) -> &str {
        "ECS Namespace Copy Target"
    }

    async fn copy(&self, object: &mut SyncObject) -> Result<CopyOutcome, CopyError> {
        let relative_path = object.relative_path().to_string();
        if object.is_directory() {
            debug!("Skipping directory object {}", relative_path);
            return Ok(CopyOutcome::SkippedDirectory);
        }

        let source = object
            .metadata()
            .await
            .map_err(|e| CopyError::from_source(&relative_path, e))?
            .clone();

        let target_key = self.target_key(&relative_path);
        object.set_target_identifier(full_path(&self.bucket, &target_key));

        let target_location = ObjectLocation::bucket(&self.bucket, &target_key);
        let existing = match self.backend.read_metadata(&target_location).await {
            Ok(metadata) => Some(metadata),
            Err(e) if e.is_not_found() => None,
            Err(StorageError::Cancelled) => return Err(CopyError::Cancelled),
            Err(source) => return Err(CopyError::TargetProbeFailed { target_key, source }),
        };

        let reason = match self.policy.decide(&source, existing.as_ref()) {
            Decision::Skip(reason) => {
                info!("{}. Skipping {}", reason, relative_path);
                return Ok(CopyOutcome::Skipped(reason));
            }
            Decision::Write(reason) => reason,
        };

        let request = self
            .copy_request(object, &target_key)
            .map_err(|e| CopyError::write_failed(&relative_path, e))?;
        debug!("Server-side copy {} ({})", request, reason);

        let result = self
            .backend
            .copy_object(&request)
            .await
            .map_err(|e| CopyError::from_storage(&relative_path, e))?;
        debug!("Wrote {} etag: {:?}", target_key, result.etag);

        Ok(CopyOutcome::Written {
            target_key,
            etag: result.etag,
            bytes: source.content_length,
            reason,
        })
    }

    fn reverse(&self, object: &SyncObject) -> SyncObject {
        let reader: Arc<dyn ObjectReader> = self.backend.clone();
        let kind = if object.is_directory() {
            ObjectKind::Directory
        } else {
            ObjectKind::File
        };
        SyncObject::new(
            reader,
            ObjectLocation::bucket(&self.bucket, self.target_key(object.relative_path())),
            object.relative_path(),
            kind,
        )
    }
}
