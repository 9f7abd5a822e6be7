//! Local artifact repository interface
//!
//! The engine asks a [`LocalRepositoryManager`] where artifacts and metadata
//! live on disk and whether they are already cached. The tracker decorates
//! this interface (see `tracking::local_repo`) and relies on its path
//! computation to place records for missing artifacts.

use parking_lot::RwLock;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use super::events::RepositorySession;
use crate::trace::types::{Artifact, Metadata, RemoteRepository};

// =============================================================================
// REQUESTS AND RESULTS
// =============================================================================

/// The on-disk repository a manager serves
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalRepository {
    pub basedir: PathBuf,
    pub content_type: String,
}

impl LocalRepository {
    pub fn new(basedir: impl Into<PathBuf>) -> Self {
        Self {
            basedir: basedir.into(),
            content_type: "default".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalArtifactRequest {
    pub artifact: Artifact,
    pub repositories: Vec<RemoteRepository>,
    pub context: String,
}

impl LocalArtifactRequest {
    pub fn new(artifact: Artifact) -> Self {
        Self {
            artifact,
            repositories: Vec::new(),
            context: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalArtifactResult {
    pub request: LocalArtifactRequest,
    /// Cached file, if one exists
    pub file: Option<PathBuf>,
    /// Whether the cached file may be used for this request
    pub available: bool,
    pub repository: Option<RemoteRepository>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalArtifactRegistration {
    pub artifact: Artifact,
    /// Source repository, absent for locally installed artifacts
    pub repository: Option<RemoteRepository>,
    pub contexts: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalMetadataRequest {
    pub metadata: Metadata,
    pub repository: Option<RemoteRepository>,
    pub context: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalMetadataResult {
    pub request: LocalMetadataRequest,
    pub file: Option<PathBuf>,
    pub stale: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalMetadataRegistration {
    pub metadata: Metadata,
    pub repository: Option<RemoteRepository>,
    pub contexts: Vec<String>,
}

// =============================================================================
// MANAGER TRAIT
// =============================================================================

/// Path computation and cache lookup for the local repository
///
/// Paths returned by the `path_for_*` methods are relative to
/// [`repository().basedir`](LocalRepository::basedir).
pub trait LocalRepositoryManager: Send + Sync {
    fn repository(&self) -> &LocalRepository;

    fn path_for_local_artifact(&self, artifact: &Artifact) -> PathBuf;

    fn path_for_remote_artifact(
        &self,
        artifact: &Artifact,
        repository: &RemoteRepository,
        context: &str,
    ) -> PathBuf;

    fn path_for_local_metadata(&self, metadata: &Metadata) -> PathBuf;

    fn path_for_remote_metadata(
        &self,
        metadata: &Metadata,
        repository: &RemoteRepository,
        context: &str,
    ) -> PathBuf;

    fn find_artifact(
        &self,
        session: &RepositorySession,
        request: &LocalArtifactRequest,
    ) -> LocalArtifactResult;

    fn add_artifact(&self, session: &RepositorySession, registration: &LocalArtifactRegistration);

    fn find_metadata(
        &self,
        session: &RepositorySession,
        request: &LocalMetadataRequest,
    ) -> LocalMetadataResult;

    fn add_metadata(&self, session: &RepositorySession, registration: &LocalMetadataRegistration);
}

// =============================================================================
// DEFAULT LAYOUT
// =============================================================================

/// Local repository manager using the standard directory layout
///
/// `org.example:core:jar:1.0` lives at `org/example/core/1.0/core-1.0.jar`.
#[derive(Debug)]
pub struct SimpleLocalRepositoryManager {
    repository: LocalRepository,
    registered: RwLock<HashSet<PathBuf>>,
}

impl SimpleLocalRepositoryManager {
    pub fn new(basedir: impl Into<PathBuf>) -> Self {
        Self {
            repository: LocalRepository::new(basedir),
            registered: RwLock::new(HashSet::new()),
        }
    }

    fn artifact_dir(artifact: &Artifact) -> PathBuf {
        let mut dir: PathBuf = artifact.group_id.split('.').collect();
        dir.push(&artifact.artifact_id);
        dir.push(&artifact.version);
        dir
    }

    fn artifact_file_name(artifact: &Artifact) -> String {
        let mut name = format!("{}-{}", artifact.artifact_id, artifact.version);
        if let Some(classifier) = artifact.classifier.as_deref().filter(|c| !c.is_empty()) {
            name.push('-');
            name.push_str(classifier);
        }
        if !artifact.extension.is_empty() {
            name.push('.');
            name.push_str(&artifact.extension);
        }
        name
    }

    fn metadata_path(metadata: &Metadata, key: &str) -> PathBuf {
        let mut path = PathBuf::new();
        if !metadata.group_id.is_empty() {
            path.extend(metadata.group_id.split('.'));
            if !metadata.artifact_id.is_empty() {
                path.push(&metadata.artifact_id);
                if !metadata.version.is_empty() {
                    path.push(&metadata.version);
                }
            }
        }
        path.push(insert_repository_key(&metadata.kind, key));
        path
    }

    fn absolute(&self, relative: &Path) -> PathBuf {
        self.repository.basedir.join(relative)
    }
}

/// `maven-metadata.xml` + `central` -> `maven-metadata-central.xml`
fn insert_repository_key(file_name: &str, key: &str) -> String {
    match file_name.rfind('.') {
        Some(dot) => format!("{}-{}{}", &file_name[..dot], key, &file_name[dot..]),
        None => format!("{}-{}", file_name, key),
    }
}

impl LocalRepositoryManager for SimpleLocalRepositoryManager {
    fn repository(&self) -> &LocalRepository {
        &self.repository
    }

    fn path_for_local_artifact(&self, artifact: &Artifact) -> PathBuf {
        Self::artifact_dir(artifact).join(Self::artifact_file_name(artifact))
    }

    fn path_for_remote_artifact(
        &self,
        artifact: &Artifact,
        _repository: &RemoteRepository,
        _context: &str,
    ) -> PathBuf {
        self.path_for_local_artifact(artifact)
    }

    fn path_for_local_metadata(&self, metadata: &Metadata) -> PathBuf {
        Self::metadata_path(metadata, "local")
    }

    fn path_for_remote_metadata(
        &self,
        metadata: &Metadata,
        repository: &RemoteRepository,
        _context: &str,
    ) -> PathBuf {
        Self::metadata_path(metadata, &repository.id)
    }

    fn find_artifact(
        &self,
        _session: &RepositorySession,
        request: &LocalArtifactRequest,
    ) -> LocalArtifactResult {
        let relative = self.path_for_local_artifact(&request.artifact);
        let path = self.absolute(&relative);
        let file = path.is_file().then_some(path);
        let available = file.is_some()
            && (request.repositories.is_empty() || self.registered.read().contains(&relative));

        LocalArtifactResult {
            request: request.clone(),
            file,
            available,
            repository: None,
        }
    }

    fn add_artifact(&self, _session: &RepositorySession, registration: &LocalArtifactRegistration) {
        let relative = self.path_for_local_artifact(&registration.artifact);
        self.registered.write().insert(relative);
    }

    fn find_metadata(
        &self,
        _session: &RepositorySession,
        request: &LocalMetadataRequest,
    ) -> LocalMetadataResult {
        let relative = match &request.repository {
            Some(repo) => self.path_for_remote_metadata(&request.metadata, repo, &request.context),
            None => self.path_for_local_metadata(&request.metadata),
        };
        let path = self.absolute(&relative);

        LocalMetadataResult {
            request: request.clone(),
            file: path.is_file().then_some(path),
            stale: false,
        }
    }

    fn add_metadata(&self, _session: &RepositorySession, registration: &LocalMetadataRegistration) {
        let relative = match &registration.repository {
            Some(repo) => self.path_for_remote_metadata(&registration.metadata, repo, ""),
            None => self.path_for_local_metadata(&registration.metadata),
        };
        self.registered.write().insert(relative);
    }
}
