//! Repository events and the listener interface
//!
//! The resolution engine fires one [`RepositoryEvent`] per resolved or
//! downloaded artifact or metadata file. Listeners override only the
//! callbacks they care about.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::local::LocalRepositoryManager;
use crate::trace::types::{Artifact, ArtifactRepository, Metadata, RequestTrace};

/// Event kinds the tracker reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventKind {
    ArtifactResolved,
    ArtifactDownloaded,
    MetadataResolved,
    MetadataDownloaded,
}

impl EventKind {
    pub fn is_download(self) -> bool {
        matches!(self, EventKind::ArtifactDownloaded | EventKind::MetadataDownloaded)
    }
}

/// State shared by every call of one resolution session
#[derive(Clone)]
pub struct RepositorySession {
    local_repository_manager: Arc<dyn LocalRepositoryManager>,
}

impl RepositorySession {
    pub fn new(local_repository_manager: Arc<dyn LocalRepositoryManager>) -> Self {
        Self {
            local_repository_manager,
        }
    }

    pub fn local_repository_manager(&self) -> &dyn LocalRepositoryManager {
        self.local_repository_manager.as_ref()
    }
}

impl std::fmt::Debug for RepositorySession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepositorySession")
            .field(
                "local_repository",
                &self.local_repository_manager.repository().basedir,
            )
            .finish()
    }
}

/// One resolution event
#[derive(Debug, Clone)]
pub struct RepositoryEvent<'s> {
    pub kind: EventKind,
    pub artifact: Option<Artifact>,
    pub metadata: Option<Metadata>,
    /// Local file backing the artifact or metadata, if any
    pub file: Option<PathBuf>,
    pub repository: Option<ArtifactRepository>,
    pub trace: Option<Arc<RequestTrace>>,
    pub session: &'s RepositorySession,
}

impl<'s> RepositoryEvent<'s> {
    pub fn new(kind: EventKind, session: &'s RepositorySession) -> Self {
        Self {
            kind,
            artifact: None,
            metadata: None,
            file: None,
            repository: None,
            trace: None,
            session,
        }
    }

    pub fn with_artifact(mut self, artifact: Artifact) -> Self {
        self.artifact = Some(artifact);
        self
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn with_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }

    pub fn with_repository(mut self, repository: ArtifactRepository) -> Self {
        self.repository = Some(repository);
        self
    }

    pub fn with_trace(mut self, trace: Option<Arc<RequestTrace>>) -> Self {
        self.trace = trace;
        self
    }

    pub fn trace(&self) -> Option<&RequestTrace> {
        self.trace.as_deref()
    }

    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    /// Where the subject of this event lives (or would live) in the local repository
    pub fn local_path(&self) -> Option<PathBuf> {
        let manager = self.session.local_repository_manager();
        let relative = match (&self.artifact, &self.metadata) {
            (Some(artifact), _) => manager.path_for_local_artifact(artifact),
            (None, Some(metadata)) => manager.path_for_local_metadata(metadata),
            (None, None) => return None,
        };
        Some(manager.repository().basedir.join(relative))
    }

    /// Human-readable name of the event subject
    pub fn subject(&self) -> String {
        match (&self.artifact, &self.metadata) {
            (Some(artifact), _) => artifact.to_string(),
            (None, Some(metadata)) => metadata.to_string(),
            (None, None) => "?".to_string(),
        }
    }
}

/// Receives repository events from the resolution engine
///
/// Every callback defaults to a no-op.
pub trait RepositoryListener: Send + Sync {
    fn artifact_resolved(&self, _event: &RepositoryEvent<'_>) {}

    fn artifact_downloaded(&self, _event: &RepositoryEvent<'_>) {}

    fn metadata_resolved(&self, _event: &RepositoryEvent<'_>) {}

    fn metadata_downloaded(&self, _event: &RepositoryEvent<'_>) {}

    /// Route an event to the callback for its kind
    fn dispatch(&self, event: &RepositoryEvent<'_>) {
        match event.kind {
            EventKind::ArtifactResolved => self.artifact_resolved(event),
            EventKind::ArtifactDownloaded => self.artifact_downloaded(event),
            EventKind::MetadataResolved => self.metadata_resolved(event),
            EventKind::MetadataDownloaded => self.metadata_downloaded(event),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::local::SimpleLocalRepositoryManager;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Recording {
        seen: Mutex<Vec<EventKind>>,
    }

    impl RepositoryListener for Recording {
        fn artifact_downloaded(&self, event: &RepositoryEvent<'_>) {
            self.seen.lock().push(event.kind);
        }

        fn metadata_resolved(&self, event: &RepositoryEvent<'_>) {
            self.seen.lock().push(event.kind);
        }
    }

    #[test]
    fn test_dispatch_routes_by_kind() {
        let session = RepositorySession::new(Arc::new(SimpleLocalRepositoryManager::new("/repo")));
        let listener = Recording::default();

        for kind in [
            EventKind::ArtifactResolved,
            EventKind::ArtifactDownloaded,
            EventKind::MetadataResolved,
            EventKind::MetadataDownloaded,
        ] {
            listener.dispatch(&RepositoryEvent::new(kind, &session));
        }

        assert_eq!(
            *listener.seen.lock(),
            vec![EventKind::ArtifactDownloaded, EventKind::MetadataResolved]
        );
    }

    #[test]
    fn test_local_path_for_artifact() {
        let session = RepositorySession::new(Arc::new(SimpleLocalRepositoryManager::new("/repo")));
        let event = RepositoryEvent::new(EventKind::ArtifactResolved, &session)
            .with_artifact(Artifact::new("org.example", "core", "jar", "1.0"));

        assert_eq!(
            event.local_path().unwrap(),
            PathBuf::from("/repo/org/example/core/1.0/core-1.0.jar")
        );
        assert_eq!(event.subject(), "org.example:core:jar:1.0");
    }
}
