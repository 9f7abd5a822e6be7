//! Resolution Data Model
//!
//! Entities read by the tracer while a resolution engine runs: artifacts,
//! graph nodes, declared dependencies, repositories and the parent-linked
//! request trace attached to every event. The tracer never builds these
//! itself outside of tests and replay; it only reads and formats them.
//!
//! @module trace/types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

// =============================================================================
// ARTIFACT
// =============================================================================

/// Immutable identity of a resolvable unit of content
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Artifact {
    pub group_id: String,
    pub artifact_id: String,
    #[serde(default = "default_extension")]
    pub extension: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classifier: Option<String>,
    pub version: String,
}

fn default_extension() -> String {
    "jar".to_string()
}

impl Artifact {
    /// Create an artifact without classifier
    pub fn new(group_id: &str, artifact_id: &str, extension: &str, version: &str) -> Self {
        Self {
            group_id: group_id.to_string(),
            artifact_id: artifact_id.to_string(),
            extension: extension.to_string(),
            classifier: None,
            version: version.to_string(),
        }
    }

    /// Same artifact with a classifier
    pub fn with_classifier(mut self, classifier: &str) -> Self {
        self.classifier = Some(classifier.to_string());
        self
    }

    /// Identity with colons swapped for underscores, usable as a file stem
    pub fn file_stem(&self) -> String {
        self.to_string().replace(':', "_")
    }
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.extension)?;
        // An empty classifier is the same as none
        if let Some(classifier) = self.classifier.as_deref().filter(|c| !c.is_empty()) {
            write!(f, ":{}", classifier)?;
        }
        write!(f, ":{}", self.version)
    }
}

// =============================================================================
// METADATA
// =============================================================================

/// Repository metadata (version listings and the like)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default)]
    pub group_id: String,
    #[serde(default)]
    pub artifact_id: String,
    #[serde(default)]
    pub version: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl fmt::Display for Metadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let coords: Vec<&str> = [&self.group_id, &self.artifact_id, &self.version]
            .into_iter()
            .map(String::as_str)
            .filter(|s| !s.is_empty())
            .collect();
        write!(f, "{}/{}", coords.join(":"), self.kind)
    }
}

// =============================================================================
// DEPENDENCIES AND GRAPH NODES
// =============================================================================

/// A dependency edge as declared in a collect request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub artifact: Artifact,
    #[serde(default)]
    pub scope: String,
    #[serde(default)]
    pub optional: bool,
}

impl Dependency {
    pub fn new(artifact: Artifact, scope: &str) -> Self {
        Self {
            artifact,
            scope: scope.to_string(),
            optional: false,
        }
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}{})",
            self.artifact,
            self.scope,
            if self.optional { "?" } else { "" }
        )
    }
}

/// One vertex of the resolution graph. Owned by the engine, read-only here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyNode {
    pub artifact: Artifact,
    /// Scope of the edge that led here, absent for roots
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default)]
    pub optional: bool,
    /// Context the artifact was requested under ("project", "plugin", ...)
    #[serde(default)]
    pub request_context: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<DependencyNode>,
}

impl DependencyNode {
    pub fn new(artifact: Artifact, request_context: &str) -> Self {
        Self {
            artifact,
            scope: None,
            optional: false,
            request_context: request_context.to_string(),
            children: Vec::new(),
        }
    }

    pub fn with_scope(mut self, scope: &str) -> Self {
        self.scope = Some(scope.to_string());
        self
    }
}

impl fmt::Display for DependencyNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.scope {
            Some(scope) => write!(
                f,
                "{} ({}{})",
                self.artifact,
                scope,
                if self.optional { "?" } else { "" }
            ),
            None => write!(f, "{}", self.artifact),
        }
    }
}

// =============================================================================
// REPOSITORIES
// =============================================================================

/// A remote repository as configured for a request
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RemoteRepository {
    pub id: String,
    pub url: String,
}

impl RemoteRepository {
    pub fn new(id: &str, url: &str) -> Self {
        Self {
            id: id.to_string(),
            url: url.to_string(),
        }
    }
}

impl fmt::Display for RemoteRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.id, self.url)
    }
}

/// Where an event's content came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ArtifactRepository {
    Remote(RemoteRepository),
    Local { basedir: PathBuf },
    /// In-memory reactor/workspace pseudo-repository
    Workspace,
}

impl fmt::Display for ArtifactRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactRepository::Remote(remote) => write!(f, "{}", remote),
            ArtifactRepository::Local { basedir } => write!(f, "local ({})", basedir.display()),
            ArtifactRepository::Workspace => write!(f, "workspace"),
        }
    }
}

// =============================================================================
// TRACE FRAMES
// =============================================================================

/// Engine-native payload of one request trace link
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "frame", rename_all = "snake_case")]
pub enum TraceFrame {
    /// Reading the descriptor (POM) of an artifact
    DescriptorRequest {
        artifact: Artifact,
        #[serde(default)]
        request_context: String,
    },
    /// Transitive collection rooted at a dependency or artifact
    CollectRequest {
        #[serde(default)]
        root: Option<Dependency>,
        #[serde(default)]
        root_artifact: Option<Artifact>,
        #[serde(default)]
        dependencies: Vec<Dependency>,
    },
    /// The collector's own record of the path it is descending
    CollectStepContext {
        /// Root first, direct parent last
        path: Vec<DependencyNode>,
        node: DependencyNode,
        #[serde(default)]
        context: String,
    },
    /// Fetching artifact content from remote repositories
    ArtifactFetchRequest {
        artifact: Artifact,
        #[serde(default)]
        repositories: Vec<RemoteRepository>,
    },
    /// Resolution of a collected graph
    DependencyRequest { root: DependencyNode },
    /// Resolution of a build plugin
    PluginReference {
        group_id: String,
        artifact_id: String,
        version: String,
        #[serde(default)]
        declaring_model_id: Option<String>,
    },
    /// Building the effective model of a POM
    ModelBuildRequest {
        #[serde(default)]
        pom_file: Option<PathBuf>,
        #[serde(default)]
        model_source_location: Option<String>,
    },
    /// Anything the tracer does not interpret
    Unrecognized {
        #[serde(default)]
        label: String,
    },
}

// =============================================================================
// REQUEST TRACE
// =============================================================================

/// One link of a child-to-parent request trace chain
#[derive(Debug)]
pub struct RequestTrace {
    data: TraceFrame,
    parent: Option<Arc<RequestTrace>>,
}

impl RequestTrace {
    /// Start a new chain with no parent
    pub fn new(data: TraceFrame) -> Arc<Self> {
        Arc::new(Self { data, parent: None })
    }

    /// Link a new innermost frame below `parent`
    pub fn child(parent: &Arc<RequestTrace>, data: TraceFrame) -> Arc<Self> {
        Arc::new(Self {
            data,
            parent: Some(Arc::clone(parent)),
        })
    }

    /// Build a chain from frames listed innermost first, returning its head
    pub fn from_frames<I>(frames: I) -> Option<Arc<Self>>
    where
        I: IntoIterator<Item = TraceFrame>,
        I::IntoIter: DoubleEndedIterator,
    {
        frames.into_iter().rev().fold(None, |parent, data| {
            Some(Arc::new(Self { data, parent }))
        })
    }

    pub fn data(&self) -> &TraceFrame {
        &self.data
    }

    pub fn parent(&self) -> Option<&RequestTrace> {
        self.parent.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_display_omits_missing_classifier() {
        let plain = Artifact::new("org.example", "core", "jar", "1.0");
        assert_eq!(plain.to_string(), "org.example:core:jar:1.0");

        let sources = plain.clone().with_classifier("sources");
        assert_eq!(sources.to_string(), "org.example:core:jar:sources:1.0");
        assert_eq!(sources.file_stem(), "org.example_core_jar_sources_1.0");
    }

    #[test]
    fn test_node_display_includes_scope() {
        let artifact = Artifact::new("g", "a", "jar", "1");
        let root = DependencyNode::new(artifact.clone(), "project");
        assert_eq!(root.to_string(), "g:a:jar:1");

        let mut child = DependencyNode::new(artifact, "project").with_scope("test");
        child.optional = true;
        assert_eq!(child.to_string(), "g:a:jar:1 (test?)");
    }

    #[test]
    fn test_metadata_display() {
        let metadata = Metadata {
            group_id: "org.example".to_string(),
            artifact_id: "core".to_string(),
            version: String::new(),
            kind: "maven-metadata.xml".to_string(),
        };
        assert_eq!(metadata.to_string(), "org.example:core/maven-metadata.xml");
    }

    #[test]
    fn test_from_frames_links_innermost_first() {
        let head = RequestTrace::from_frames(vec![
            TraceFrame::Unrecognized {
                label: "inner".to_string(),
            },
            TraceFrame::Unrecognized {
                label: "outer".to_string(),
            },
        ])
        .unwrap();

        assert!(matches!(head.data(), TraceFrame::Unrecognized { label } if label == "inner"));
        let parent = head.parent().unwrap();
        assert!(matches!(parent.data(), TraceFrame::Unrecognized { label } if label == "outer"));
        assert!(parent.parent().is_none());
    }

    #[test]
    fn test_from_frames_empty() {
        assert!(RequestTrace::from_frames(Vec::new()).is_none());
    }

    #[test]
    fn test_frame_deserializes_from_tagged_json() {
        let json = r#"{"frame":"plugin_reference","group_id":"g","artifact_id":"p","version":"3"}"#;
        let frame: TraceFrame = serde_json::from_str(json).unwrap();
        assert_eq!(
            frame,
            TraceFrame::PluginReference {
                group_id: "g".to_string(),
                artifact_id: "p".to_string(),
                version: "3".to_string(),
                declaring_model_id: None,
            }
        );
    }
}
