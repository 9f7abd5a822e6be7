//! Replay command implementation
//!
//! Drives recorded resolution events through the tracker as the engine
//! would: the recorded active path is entered for the duration of each
//! event, an optional local lookup goes through the tracking local
//! repository manager, then the event is dispatched to the listener.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use crate::cli::ReplayArgs;
use crate::core::config::Config;
use crate::core::error::Result;
use crate::resolver::events::{EventKind, RepositoryEvent, RepositoryListener, RepositorySession};
use crate::resolver::local::{LocalArtifactRequest, LocalRepositoryManager, SimpleLocalRepositoryManager};
use crate::trace::types::{
    Artifact, ArtifactRepository, DependencyNode, Metadata, RequestTrace, TraceFrame,
};
use crate::tracking::{TrackingContext, TrackingLocalRepositoryManager, TrackingRepositoryListener};

/// One event as captured from a resolution run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordedEvent {
    pub kind: EventKind,
    #[serde(default)]
    pub artifact: Option<Artifact>,
    #[serde(default)]
    pub metadata: Option<Metadata>,
    /// Local file, relative paths resolve against the local repository
    #[serde(default)]
    pub file: Option<PathBuf>,
    #[serde(default)]
    pub repository: Option<ArtifactRepository>,
    /// Trace frames, innermost first
    #[serde(default)]
    pub trace: Vec<TraceFrame>,
    /// Nodes under collection when the event fired, outermost first
    #[serde(default)]
    pub active_path: Vec<DependencyNode>,
    /// Look the artifact up in the local repository before dispatching
    #[serde(default)]
    pub lookup: bool,
}

impl RecordedEvent {
    fn to_event<'s>(&self, session: &'s RepositorySession, local_repo: &Path) -> RepositoryEvent<'s> {
        RepositoryEvent {
            kind: self.kind,
            artifact: self.artifact.clone(),
            metadata: self.metadata.clone(),
            file: self.file.as_ref().map(|f| local_repo.join(f)),
            repository: self.repository.clone(),
            trace: RequestTrace::from_frames(self.trace.iter().cloned()),
            session,
        }
    }
}

/// Counts reported after a replay
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub events: usize,
    pub downloads: usize,
    pub lookups: usize,
    pub cache_hits: usize,
}

/// Parse a JSON array of recorded events
pub fn load_events(path: &Path) -> Result<Vec<RecordedEvent>> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Replay events against a local repository
pub fn replay(
    events: &[RecordedEvent],
    local_repo: &Path,
    context: &Arc<TrackingContext>,
) -> ReplaySummary {
    let manager = Arc::new(TrackingLocalRepositoryManager::new(
        SimpleLocalRepositoryManager::new(local_repo),
        Arc::clone(context),
    ));
    let session = RepositorySession::new(manager.clone());
    let listener = TrackingRepositoryListener::new(Arc::clone(context));
    let mut summary = ReplaySummary::default();

    for recorded in events {
        let _active: Vec<_> = recorded
            .active_path
            .iter()
            .map(|node| context.stack().enter(Arc::new(node.clone())))
            .collect();

        if recorded.lookup {
            if let Some(artifact) = &recorded.artifact {
                let result = manager.find_artifact(&session, &LocalArtifactRequest::new(artifact.clone()));
                summary.lookups += 1;
                if result.file.is_some() {
                    summary.cache_hits += 1;
                }
            }
        }

        listener.dispatch(&recorded.to_event(&session, local_repo));
        summary.events += 1;
        if recorded.kind.is_download() {
            summary.downloads += 1;
        }
    }

    summary
}

/// Run the replay command
pub fn run(args: ReplayArgs, config: Config) -> Result<()> {
    let events = load_events(&args.events)?;
    let context = TrackingContext::shared(config);

    let summary = replay(&events, &args.local_repo, &context);
    info!(
        events = summary.events,
        downloads = summary.downloads,
        lookups = summary.lookups,
        cache_hits = summary.cache_hits,
        "Replay finished"
    );
    println!(
        "Replayed {} events ({} downloads, {} lookups, {} cache hits)",
        summary.events, summary.downloads, summary.lookups, summary.cache_hits
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const EVENTS: &str = r#"[
        {
            "kind": "artifact-downloaded",
            "artifact": {"group_id": "org.example", "artifact_id": "lib", "version": "1.0"},
            "file": "org/example/lib/1.0/lib-1.0.jar",
            "repository": {"kind": "remote", "id": "central", "url": "https://repo.example/central"},
            "trace": [
                {"frame": "artifact_fetch_request",
                 "artifact": {"group_id": "org.example", "artifact_id": "lib", "version": "1.0"},
                 "repositories": [{"id": "central", "url": "https://repo.example/central"}]},
                {"frame": "unrecognized", "label": "DefaultDependencyResolutionRequest"}
            ],
            "active_path": [
                {"artifact": {"group_id": "org.example", "artifact_id": "app", "version": "1.0"},
                 "request_context": "project"}
            ]
        },
        {
            "kind": "artifact-resolved",
            "artifact": {"group_id": "org.example", "artifact_id": "lib", "version": "1.0"},
            "file": "org/example/lib/1.0/lib-1.0.jar",
            "lookup": true,
            "trace": [
                {"frame": "dependency_request",
                 "root": {"artifact": {"group_id": "org.example", "artifact_id": "app", "version": "1.0"},
                          "request_context": "project"}}
            ],
            "active_path": [
                {"artifact": {"group_id": "org.example", "artifact_id": "parent", "version": "1.0"},
                 "request_context": "project"}
            ]
        }
    ]"#;

    #[test]
    fn test_replay_recorded_events() {
        let temp = TempDir::new().unwrap();
        let events_path = temp.path().join("events.json");
        fs::write(&events_path, EVENTS).unwrap();
        let repo = temp.path().join("repo");
        let lib_dir = repo.join("org/example/lib/1.0");
        fs::create_dir_all(&lib_dir).unwrap();
        fs::write(lib_dir.join("lib-1.0.jar"), b"jar").unwrap();

        let events = load_events(&events_path).unwrap();
        let context = TrackingContext::shared(Config::default());
        let summary = replay(&events, &repo, &context);

        assert_eq!(
            summary,
            ReplaySummary {
                events: 2,
                downloads: 1,
                lookups: 1,
                cache_hits: 1,
            }
        );
        assert!(context.stack().is_empty());

        let log = fs::read_to_string(lib_dir.join("_dependency-tracker.txt")).unwrap();
        assert!(log.starts_with("~~~\nDownloaded artifact org.example:lib:jar:1.0"));

        let tracking = lib_dir.join(".tracking");
        // Download under "app" and cache hit under "parent" land in the
        // active-path namespace; the resolution record for "app" sits beside them
        let active = tracking.join("active-path");
        assert!(active.join("org.example_app_jar_1.0.dep").is_file());
        assert!(active.join("org.example_parent_jar_1.0.dep").is_file());
        assert_eq!(fs::read_dir(&active).unwrap().count(), 2);
        assert!(tracking.join("org.example_app_jar_1.0.dep").is_file());
        assert_eq!(fs::read_dir(&tracking).unwrap().count(), 2);
    }

    #[test]
    fn test_load_events_rejects_bad_json() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("events.json");
        fs::write(&path, "{not json").unwrap();

        assert!(matches!(
            load_events(&path),
            Err(crate::core::error::Error::Json(_))
        ));
    }
}
