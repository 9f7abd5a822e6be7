//! Tracking Repository Listener
//!
//! Two independent recording strategies, each toggled in configuration:
//!
//! - Audit log: every download appends the rendered trace to the audit log
//!   next to the downloaded file, and artifact fetches also file a record
//!   under the top of the active path (in the active-path namespace).
//! - Provenance: every resolution (outside the workspace) files one
//!   deduplicated record keyed by what the trace says caused it, with the
//!   outcome (`.dep`, `.miss`, `.plugin`) in the file extension.
//!
//! Failures are logged and swallowed; the engine never sees them.
//!
//! @module tracking/listener

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, warn};

use super::provenance::Provenance;
use super::TrackingContext;
use crate::core::error::Result;
use crate::resolver::events::{RepositoryEvent, RepositoryListener};
use crate::trace::format::Outcome;
use crate::trace::types::ArtifactRepository;

/// Repository listener writing audit logs and provenance records
#[derive(Debug, Clone)]
pub struct TrackingRepositoryListener {
    context: Arc<TrackingContext>,
}

impl TrackingRepositoryListener {
    pub fn new(context: Arc<TrackingContext>) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &Arc<TrackingContext> {
        &self.context
    }

    fn on_download(&self, event: &RepositoryEvent<'_>) {
        if !self.context.config().strategies.audit_log {
            return;
        }
        let Some(dir) = event.file().and_then(Path::parent) else {
            debug!(subject = %event.subject(), "Download without local file, nothing to log");
            return;
        };
        self.write_audit(event, dir);
    }

    fn on_resolved(&self, event: &RepositoryEvent<'_>) {
        if !self.context.config().strategies.provenance {
            return;
        }
        if let Err(e) = self.record_provenance(event) {
            warn!("Failed to record provenance for {}: {}", event.subject(), e);
        }
    }

    /// Append the event to the audit log of `dir`
    fn write_audit(&self, event: &RepositoryEvent<'_>, dir: &Path) {
        let provenance = Provenance::from_trace(event.trace());
        let active_path = self.context.stack().snapshot();
        let block = self.context.formatter().format_trace(
            provenance.frames(),
            &active_path,
            event.repository.as_ref(),
        );

        if let Err(e) = self.context.store().append_audit(dir, &block) {
            warn!("Failed to write audit log for {}: {}", event.subject(), e);
        }

        if !provenance.has_fetch() {
            return;
        }
        if let Some(artifact) = &event.artifact {
            if let Err(e) = self.context.track_with_path(dir, artifact, &active_path) {
                warn!("Failed to track {}: {}", artifact, e);
            }
        }
    }

    /// File a deduplicated provenance record for a resolution event
    fn record_provenance(&self, event: &RepositoryEvent<'_>) -> Result<()> {
        if matches!(event.repository, Some(ArtifactRepository::Workspace)) {
            debug!(subject = %event.subject(), "Resolved from workspace, not tracked");
            return Ok(());
        }

        let provenance = Provenance::from_trace(event.trace());
        let local_file = event.file().filter(|f| f.is_file());
        let missing = local_file.is_none();

        let Some(key) = provenance.record_key(missing) else {
            debug!(subject = %event.subject(), frames = provenance.frames().len(), "No record key derivable");
            return Ok(());
        };

        // A missing artifact is recorded where it would have been stored
        let target = match local_file {
            Some(file) => Some(file.to_path_buf()),
            None => event.local_path().or_else(|| event.file.clone()),
        };
        let Some(dir) = target.as_deref().and_then(Path::parent) else {
            debug!(subject = %event.subject(), "No directory to record into");
            return Ok(());
        };

        let outcome = if missing {
            Outcome::Missing {
                repositories: provenance.repositories(),
            }
        } else {
            Outcome::Resolved {
                repository: event.repository.as_ref(),
            }
        };

        let formatter = self.context.formatter();
        let active_path = self.context.stack().snapshot();
        let mut body = format!("{}\n", event.subject());
        body.push_str(&formatter.format_trace(
            provenance.frames(),
            &active_path,
            event.repository.as_ref(),
        ));
        body.push_str(&formatter.format_outcome(&outcome));

        let written = self.context.store().record_if_absent(dir, &key, &body)?;
        if written.was_written() {
            debug!(record = %written.path().display(), missing, "Recorded provenance");
        } else {
            debug!(record = %written.path().display(), "Provenance already recorded");
        }
        Ok(())
    }
}

impl RepositoryListener for TrackingRepositoryListener {
    fn artifact_resolved(&self, event: &RepositoryEvent<'_>) {
        self.on_resolved(event);
    }

    fn artifact_downloaded(&self, event: &RepositoryEvent<'_>) {
        self.on_download(event);
    }

    fn metadata_resolved(&self, event: &RepositoryEvent<'_>) {
        self.on_resolved(event);
    }

    fn metadata_downloaded(&self, event: &RepositoryEvent<'_>) {
        self.on_download(event);
    }
}
