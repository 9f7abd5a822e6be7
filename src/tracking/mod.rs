//! Provenance Tracking
//!
//! Hooks that sit between the resolution engine and the trace/format
//! machinery:
//! - `listener`: reacts to repository events (audit log, provenance records)
//! - `collector`: brackets the engine's per-dependency step with the active path
//! - `local_repo`: records provenance for lookups answered from the local cache
//!
//! All three share one [`TrackingContext`].
//!
//! @module tracking

pub mod collector;
pub mod listener;
pub mod local_repo;
pub mod provenance;
pub mod store;

pub use collector::TrackingDependencyCollector;
pub use listener::TrackingRepositoryListener;
pub use local_repo::TrackingLocalRepositoryManager;
pub use provenance::Provenance;
pub use store::{
    path_slug, RecordKey, RecordKind, RecordOutcome, TrackingStore, ACTIVE_PATH_DIR, AUDIT_SEPARATOR,
};

use std::path::Path;
use std::sync::Arc;

use crate::core::config::Config;
use crate::core::error::Result;
use crate::trace::format::ProvenanceFormatter;
use crate::trace::stack::ActivePathStack;
use crate::trace::types::{Artifact, DependencyNode};

/// State shared by every tracking hook of one resolution session
#[derive(Debug, Default)]
pub struct TrackingContext {
    config: Config,
    stack: ActivePathStack,
    store: TrackingStore,
    formatter: ProvenanceFormatter,
}

impl TrackingContext {
    pub fn new(config: Config) -> Self {
        let store = TrackingStore::new(&config.output);
        Self {
            config,
            stack: ActivePathStack::new(),
            store,
            formatter: ProvenanceFormatter::new(),
        }
    }

    /// Convenience for sharing between hooks
    pub fn shared(config: Config) -> Arc<Self> {
        Arc::new(Self::new(config))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn stack(&self) -> &ActivePathStack {
        &self.stack
    }

    pub fn store(&self) -> &TrackingStore {
        &self.store
    }

    pub fn formatter(&self) -> &ProvenanceFormatter {
        &self.formatter
    }

    /// Record `artifact` under the node on top of the active path
    ///
    /// Returns `Ok(None)` when nothing is being collected right now.
    pub fn track_active_path(&self, dir: &Path, artifact: &Artifact) -> Result<Option<RecordOutcome>> {
        let active_path = self.stack.snapshot();
        self.track_with_path(dir, artifact, &active_path)
    }

    /// Same as [`track_active_path`](Self::track_active_path) for a snapshot already taken
    pub fn track_with_path(
        &self,
        dir: &Path,
        artifact: &Artifact,
        active_path: &[Arc<DependencyNode>],
    ) -> Result<Option<RecordOutcome>> {
        let Some(requirer) = active_path.last() else {
            return Ok(None);
        };

        let key = RecordKey::new(requirer.artifact.file_stem(), RecordKind::ActivePath);
        let body = self.formatter.format_active_path(artifact, active_path);
        let outcome = self.store.record_if_absent(dir, &key, &body)?;

        if outcome.was_written() {
            tracing::debug!(record = %outcome.path().display(), artifact = %artifact, "Recorded active path");
        }
        Ok(Some(outcome))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn node(id: &str) -> Arc<DependencyNode> {
        Arc::new(DependencyNode::new(
            Artifact::new("org.example", id, "jar", "1.0"),
            "project",
        ))
    }

    #[test]
    fn test_empty_stack_records_nothing() {
        let temp = TempDir::new().unwrap();
        let context = TrackingContext::default();
        let artifact = Artifact::new("org.example", "lib", "jar", "1.0");

        let outcome = context.track_active_path(temp.path(), &artifact).unwrap();
        assert!(outcome.is_none());
        assert!(!temp.path().join(".tracking").exists());
    }

    #[test]
    fn test_keyed_by_stack_top() {
        let temp = TempDir::new().unwrap();
        let context = TrackingContext::default();
        let artifact = Artifact::new("org.example", "lib", "jar", "1.0");

        let _root = context.stack().enter(node("app"));
        let _mid = context.stack().enter(node("mid"));
        let outcome = context
            .track_active_path(temp.path(), &artifact)
            .unwrap()
            .unwrap();

        assert_eq!(
            outcome.path(),
            temp.path()
                .join(".tracking/active-path")
                .join("org.example_mid_jar_1.0.dep")
        );
        let body = std::fs::read_to_string(outcome.path()).unwrap();
        assert_eq!(
            body,
            "org.example:lib:jar:1.0\n \
             -> org.example:mid:jar:1.0 (context: project)\n   \
             -> org.example:app:jar:1.0 (context: project)\n"
        );
    }
}
