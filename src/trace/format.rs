//! Provenance Text Formatting
//!
//! Renders classified trace frames, the active path and resolution outcomes
//! as plain indented text. Every frame that widens the context indents
//! what follows by one level (two spaces). Frames carrying leaf data print
//! their detail lines beneath themselves without changing the level.
//!
//! @module trace/format

use std::sync::Arc;

use super::types::{ArtifactRepository, DependencyNode, RemoteRepository};
use super::walker::Classified;

/// Width of one indentation level
const INDENT: &str = "  ";

/// Header that precedes the list of repositories tried for a missing artifact
pub const CONFIGURED_REPOSITORIES: &str = "Configured repositories:";

fn indent(level: usize) -> String {
    INDENT.repeat(level)
}

fn repository_label(repository: Option<&ArtifactRepository>) -> String {
    repository.map_or_else(|| "?".to_string(), ToString::to_string)
}

// =============================================================================
// OUTCOME
// =============================================================================

/// How a tracked resolution ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<'a> {
    /// A local file exists; `repository` is where it came from, if known
    Resolved {
        repository: Option<&'a ArtifactRepository>,
    },
    /// No local file; lists every remote repository that was tried
    Missing {
        repositories: Vec<&'a RemoteRepository>,
    },
}

impl Outcome<'_> {
    pub fn is_missing(&self) -> bool {
        matches!(self, Outcome::Missing { .. })
    }
}

// =============================================================================
// FORMATTER
// =============================================================================

/// Plain text provenance formatter
#[derive(Debug, Clone, Copy, Default)]
pub struct ProvenanceFormatter;

impl ProvenanceFormatter {
    pub fn new() -> Self {
        Self
    }

    /// Render classified frames, innermost first
    ///
    /// # Arguments
    /// * `frames` - Output of [`walk`](super::walker::walk)
    /// * `active_path` - Stack snapshot, oldest first; printed newest first under each artifact download
    /// * `repository` - Repository the event was sourced from
    pub fn format_trace(
        &self,
        frames: &[Classified<'_>],
        active_path: &[Arc<DependencyNode>],
        repository: Option<&ArtifactRepository>,
    ) -> String {
        let mut output = String::new();
        let mut level = 0;

        for frame in frames {
            let pad = indent(level);
            match frame {
                Classified::DescriptorRead {
                    artifact,
                    request_context,
                    scope,
                } => {
                    output.push_str(&format!(
                        "{}Reading descriptor for artifact {} (context: {}) (scope: {}) (repository: {})\n",
                        pad,
                        artifact,
                        request_context,
                        scope,
                        repository_label(repository)
                    ));
                }
                Classified::ArtifactFetch { artifact, .. } => {
                    output.push_str(&format!(
                        "{}Downloaded artifact {} (repository: {})\n",
                        pad,
                        artifact,
                        repository_label(repository)
                    ));
                    for (depth, node) in active_path.iter().rev().enumerate() {
                        output.push_str(&format!(
                            "{} -> {} (context: {})\n",
                            indent(level + depth + 1),
                            node,
                            node.request_context
                        ));
                    }
                }
                Classified::Collect {
                    root,
                    root_artifact,
                } => {
                    if let Some(root) = root {
                        output.push_str(&format!(
                            "{}Transitive dependencies collection for {}\n",
                            pad, root
                        ));
                    }
                    if let Some(root_artifact) = root_artifact {
                        output.push_str(&format!(
                            "{}Transitive dependencies collection for {}\n",
                            pad, root_artifact
                        ));
                    }
                }
                Classified::CollectStep {
                    path,
                    node,
                    context,
                } => {
                    output.push_str(&format!(
                        "{}Collecting {} (context: {})\n",
                        pad, node, context
                    ));
                    output.push_str(&self.format_resolved_path(path, context, level + 1));
                }
                Classified::DependencyRequest { .. } => {}
                Classified::Plugin {
                    group_id,
                    artifact_id,
                    version,
                    model_id,
                } => {
                    output.push_str(&format!(
                        "{}Resolution of plugin {}:{}:{} ({})\n",
                        pad, group_id, artifact_id, version, model_id
                    ));
                }
                Classified::ModelBuild { pom_file, location } => {
                    let source = location
                        .map(str::to_string)
                        .or_else(|| pom_file.map(|p| p.display().to_string()))
                        .unwrap_or_else(|| "?".to_string());
                    output.push_str(&format!("{}Model building for {}\n", pad, source));
                }
            }

            if frame.zooms_out() {
                level += 1;
            }
        }

        output
    }

    /// Render a collector path (root first) closest requirer first
    pub fn format_resolved_path(
        &self,
        path: &[DependencyNode],
        context: &str,
        level: usize,
    ) -> String {
        let pad = indent(level);
        path.iter()
            .rev()
            .map(|node| format!("{} -> {} ({})\n", pad, node.artifact, context))
            .collect()
    }

    /// Render an artifact followed by the active path that led to it
    ///
    /// `active_path` is oldest first. The direct requirer is printed first
    /// and each entry toward the root sits one level deeper.
    pub fn format_active_path(
        &self,
        subject: &dyn std::fmt::Display,
        active_path: &[Arc<DependencyNode>],
    ) -> String {
        let mut output = format!("{}\n", subject);
        for (depth, node) in active_path.iter().rev().enumerate() {
            output.push_str(&format!(
                "{} -> {} (context: {})\n",
                indent(depth),
                node,
                node.request_context
            ));
        }
        output
    }

    /// Render the closing lines for an outcome
    pub fn format_outcome(&self, outcome: &Outcome<'_>) -> String {
        match outcome {
            Outcome::Resolved { repository } => {
                format!("Repository: {}\n", repository_label(*repository))
            }
            Outcome::Missing { repositories } => {
                let mut output = format!("{}\n", CONFIGURED_REPOSITORIES);
                for repo in repositories {
                    output.push_str(&format!(" * {} : {}\n", repo.id, repo.url));
                }
                output
            }
        }
    }
}
