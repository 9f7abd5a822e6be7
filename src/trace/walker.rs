//! Request Trace Walking and Classification
//!
//! Walks a child-to-parent request trace from the event outward and turns
//! every frame the tracer understands into a typed [`Classified`] value.
//! Frames it does not understand are dropped. The walk is cycle-safe: a
//! link seen twice ends it.
//!
//! @module trace/walker

use std::collections::HashSet;
use std::path::Path;

use super::types::{Artifact, Dependency, DependencyNode, RemoteRepository, RequestTrace, TraceFrame};

/// Scope reported when the declaring collect request cannot be found
pub const UNKNOWN_SCOPE: &str = "?";

/// Model id reported for plugins without a declaring model
pub const UNKNOWN_MODEL: &str = "?";

// =============================================================================
// CLASSIFIED FRAMES
// =============================================================================

/// A recognized trace frame, borrowing from the trace it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classified<'a> {
    DescriptorRead {
        artifact: &'a Artifact,
        request_context: &'a str,
        /// Declared scope of the edge, `/optional` appended when optional
        scope: String,
    },
    Collect {
        root: Option<&'a Dependency>,
        root_artifact: Option<&'a Artifact>,
    },
    CollectStep {
        path: &'a [DependencyNode],
        node: &'a DependencyNode,
        context: &'a str,
    },
    ArtifactFetch {
        artifact: &'a Artifact,
        repositories: &'a [RemoteRepository],
    },
    DependencyRequest {
        root: &'a DependencyNode,
    },
    Plugin {
        group_id: &'a str,
        artifact_id: &'a str,
        version: &'a str,
        model_id: &'a str,
    },
    ModelBuild {
        pom_file: Option<&'a Path>,
        location: Option<&'a str>,
    },
}

impl Classified<'_> {
    /// Whether this frame widens the context and so indents what follows
    pub fn zooms_out(&self) -> bool {
        matches!(
            self,
            Classified::DescriptorRead { .. }
                | Classified::Collect { .. }
                | Classified::ModelBuild { .. }
                | Classified::Plugin { .. }
        )
    }
}

// =============================================================================
// WALK
// =============================================================================

/// Collect the links of a chain, innermost first, stopping on a repeat
fn links(head: Option<&RequestTrace>) -> Vec<&RequestTrace> {
    let mut seen: HashSet<*const RequestTrace> = HashSet::new();
    let mut chain = Vec::new();
    let mut current = head;

    while let Some(link) = current {
        if !seen.insert(link as *const RequestTrace) {
            tracing::debug!(depth = chain.len(), "Request trace revisits a link, stopping walk");
            break;
        }
        chain.push(link);
        current = link.parent();
    }

    chain
}

/// Walk a trace outward and classify every recognized frame
///
/// # Arguments
/// * `head` - The innermost link, as attached to the event (may be absent)
///
/// # Returns
/// Recognized frames, innermost first. Empty for an absent trace.
pub fn walk<'a>(head: Option<&'a RequestTrace>) -> Vec<Classified<'a>> {
    let chain = links(head);

    chain
        .iter()
        .enumerate()
        .filter_map(|(i, &link)| classify(link.data(), &chain[i..]))
        .collect()
}

/// Classify one frame. `outward` starts at the frame's own link.
fn classify<'a>(frame: &'a TraceFrame, outward: &[&'a RequestTrace]) -> Option<Classified<'a>> {
    match frame {
        TraceFrame::DescriptorRequest {
            artifact,
            request_context,
        } => Some(Classified::DescriptorRead {
            artifact,
            request_context,
            scope: declared_scope(artifact, outward),
        }),
        TraceFrame::CollectRequest {
            root,
            root_artifact,
            ..
        } => Some(Classified::Collect {
            root: root.as_ref(),
            root_artifact: root_artifact.as_ref(),
        }),
        TraceFrame::CollectStepContext {
            path,
            node,
            context,
        } => Some(Classified::CollectStep {
            path,
            node,
            context,
        }),
        TraceFrame::ArtifactFetchRequest {
            artifact,
            repositories,
        } => Some(Classified::ArtifactFetch {
            artifact,
            repositories,
        }),
        TraceFrame::DependencyRequest { root } => Some(Classified::DependencyRequest { root }),
        TraceFrame::PluginReference {
            group_id,
            artifact_id,
            version,
            declaring_model_id,
        } => Some(Classified::Plugin {
            group_id,
            artifact_id,
            version,
            model_id: declaring_model_id.as_deref().unwrap_or(UNKNOWN_MODEL),
        }),
        TraceFrame::ModelBuildRequest {
            pom_file,
            model_source_location,
        } => Some(Classified::ModelBuild {
            pom_file: pom_file.as_deref(),
            location: model_source_location.as_deref(),
        }),
        TraceFrame::Unrecognized { .. } => None,
    }
}

/// Find the scope under which `artifact` was declared
///
/// Only the nearest enclosing collect request is consulted.
fn declared_scope(artifact: &Artifact, outward: &[&RequestTrace]) -> String {
    let dependencies = outward.iter().find_map(|link| match link.data() {
        TraceFrame::CollectRequest { dependencies, .. } => Some(dependencies),
        _ => None,
    });

    dependencies
        .and_then(|deps| deps.iter().find(|d| &d.artifact == artifact))
        .map(|d| {
            if d.optional {
                format!("{}/optional", d.scope)
            } else {
                d.scope.clone()
            }
        })
        .unwrap_or_else(|| UNKNOWN_SCOPE.to_string())
}
