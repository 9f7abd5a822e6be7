//! Cache-hit tracking for the local repository
//!
//! Artifacts served from the local cache never fire a download event.
//! [`TrackingLocalRepositoryManager`] forwards every call to the wrapped
//! manager unchanged and, when an artifact lookup finds a file, records
//! the active path under which it was requested.
//!
//! @module tracking/local_repo

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::warn;

use super::TrackingContext;
use crate::resolver::events::RepositorySession;
use crate::resolver::local::{
    LocalArtifactRegistration, LocalArtifactRequest, LocalArtifactResult,
    LocalMetadataRegistration, LocalMetadataRequest, LocalMetadataResult, LocalRepository,
    LocalRepositoryManager,
};
use crate::trace::types::{Artifact, Metadata, RemoteRepository};

/// Local repository manager that tracks cache hits
pub struct TrackingLocalRepositoryManager<M> {
    delegate: M,
    context: Arc<TrackingContext>,
}

impl<M: LocalRepositoryManager> TrackingLocalRepositoryManager<M> {
    pub fn new(delegate: M, context: Arc<TrackingContext>) -> Self {
        Self { delegate, context }
    }

    pub fn delegate(&self) -> &M {
        &self.delegate
    }
}

impl<M: LocalRepositoryManager> LocalRepositoryManager for TrackingLocalRepositoryManager<M> {
    fn repository(&self) -> &LocalRepository {
        self.delegate.repository()
    }

    fn path_for_local_artifact(&self, artifact: &Artifact) -> PathBuf {
        self.delegate.path_for_local_artifact(artifact)
    }

    fn path_for_remote_artifact(
        &self,
        artifact: &Artifact,
        repository: &RemoteRepository,
        context: &str,
    ) -> PathBuf {
        self.delegate
            .path_for_remote_artifact(artifact, repository, context)
    }

    fn path_for_local_metadata(&self, metadata: &Metadata) -> PathBuf {
        self.delegate.path_for_local_metadata(metadata)
    }

    fn path_for_remote_metadata(
        &self,
        metadata: &Metadata,
        repository: &RemoteRepository,
        context: &str,
    ) -> PathBuf {
        self.delegate
            .path_for_remote_metadata(metadata, repository, context)
    }

    fn find_artifact(
        &self,
        session: &RepositorySession,
        request: &LocalArtifactRequest,
    ) -> LocalArtifactResult {
        let result = self.delegate.find_artifact(session, request);

        if self.context.config().strategies.cache_hits {
            if let Some(dir) = result.file.as_deref().and_then(Path::parent) {
                let artifact = &result.request.artifact;
                if let Err(e) = self.context.track_active_path(dir, artifact) {
                    warn!("Failed to track cache hit for {}: {}", artifact, e);
                }
            }
        }

        result
    }

    fn add_artifact(&self, session: &RepositorySession, registration: &LocalArtifactRegistration) {
        self.delegate.add_artifact(session, registration)
    }

    fn find_metadata(
        &self,
        session: &RepositorySession,
        request: &LocalMetadataRequest,
    ) -> LocalMetadataResult {
        self.delegate.find_metadata(session, request)
    }

    fn add_metadata(&self, session: &RepositorySession, registration: &LocalMetadataRegistration) {
        self.delegate.add_metadata(session, registration)
    }
}
