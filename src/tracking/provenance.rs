//! Provenance Classification
//!
//! A fully classified trace plus the decisions made from it: which key a
//! record is filed under and which remote repositories were tried.
//!
//! @module tracking/provenance

use std::collections::HashSet;
use std::path::Path;

use super::store::{path_slug, RecordKey, RecordKind};
use crate::trace::types::{RemoteRepository, RequestTrace};
use crate::trace::walker::{walk, Classified};

/// Classified frames of one event's trace
#[derive(Debug, Clone)]
pub struct Provenance<'a> {
    frames: Vec<Classified<'a>>,
}

impl<'a> Provenance<'a> {
    pub fn from_trace(head: Option<&'a RequestTrace>) -> Self {
        Self { frames: walk(head) }
    }

    pub fn frames(&self) -> &[Classified<'a>] {
        &self.frames
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn has_fetch(&self) -> bool {
        self.frames
            .iter()
            .any(|f| matches!(f, Classified::ArtifactFetch { .. }))
    }

    /// Remote repositories named by fetch frames, first occurrence of each id
    pub fn repositories(&self) -> Vec<&'a RemoteRepository> {
        let mut seen: HashSet<String> = HashSet::new();
        self.frames
            .iter()
            .filter_map(|f| match f {
                Classified::ArtifactFetch { repositories, .. } => Some(*repositories),
                _ => None,
            })
            .flatten()
            .filter(|repo| seen.insert(repo.id.clone()))
            .collect()
    }

    /// Decide the record key, or `None` when nothing identifies a record
    ///
    /// Priority: collector path root, plugin, dependency request root,
    /// model source file. The innermost frame of each kind is used.
    pub fn record_key(&self, missing: bool) -> Option<RecordKey> {
        let kind = if missing {
            RecordKind::Missing
        } else {
            RecordKind::Dependency
        };

        if let Some(path) = self.frames.iter().find_map(|f| match f {
            Classified::CollectStep { path, .. } => Some(*path),
            _ => None,
        }) {
            // An empty collector path is malformed; derive nothing from it
            return path
                .first()
                .map(|root| RecordKey::new(root.artifact.file_stem(), kind));
        }

        if let Some(key) = self.frames.iter().find_map(|f| match f {
            Classified::Plugin {
                group_id,
                artifact_id,
                version,
                ..
            } => Some(RecordKey::new(
                format!("{}_{}_{}", group_id, artifact_id, version),
                RecordKind::Plugin,
            )),
            _ => None,
        }) {
            return Some(key);
        }

        if let Some(root) = self.frames.iter().find_map(|f| match f {
            Classified::DependencyRequest { root } => Some(*root),
            _ => None,
        }) {
            return Some(RecordKey::new(root.artifact.file_stem(), kind));
        }

        self.frames
            .iter()
            .find_map(|f| match f {
                Classified::ModelBuild { pom_file, location } => {
                    model_source_file(*pom_file, *location)
                }
                _ => None,
            })
            .map(|source| RecordKey::new(path_slug(source), kind))
    }
}

/// The POM file behind a model build, if it is a file path at all
fn model_source_file<'a>(pom_file: Option<&'a Path>, location: Option<&'a str>) -> Option<&'a Path> {
    pom_file.or_else(|| location.map(Path::new).filter(|p| p.is_absolute()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::types::{Artifact, DependencyNode, TraceFrame};
    use std::path::PathBuf;

    fn artifact(id: &str) -> Artifact {
        Artifact::new("org.example", id, "jar", "1.0")
    }

    fn node(id: &str) -> DependencyNode {
        DependencyNode::new(artifact(id), "project")
    }

    fn plugin() -> TraceFrame {
        TraceFrame::PluginReference {
            group_id: "org.apache.maven.plugins".to_string(),
            artifact_id: "maven-surefire-plugin".to_string(),
            version: "3.2.5".to_string(),
            declaring_model_id: None,
        }
    }

    fn key_of(frames: Vec<TraceFrame>, missing: bool) -> Option<String> {
        let head = RequestTrace::from_frames(frames);
        Provenance::from_trace(head.as_deref())
            .record_key(missing)
            .map(|k| k.file_name())
    }

    #[test]
    fn test_collect_step_root_wins() {
        let frames = vec![
            TraceFrame::CollectStepContext {
                path: vec![node("app"), node("mid")],
                node: node("leaf"),
                context: "compile".to_string(),
            },
            plugin(),
        ];
        assert_eq!(
            key_of(frames.clone(), false).as_deref(),
            Some("org.example_app_jar_1.0.dep")
        );
        assert_eq!(
            key_of(frames, true).as_deref(),
            Some("org.example_app_jar_1.0.miss")
        );
    }

    #[test]
    fn test_empty_collect_path_derives_nothing() {
        let frames = vec![
            TraceFrame::CollectStepContext {
                path: vec![],
                node: node("leaf"),
                context: "compile".to_string(),
            },
            plugin(),
        ];
        assert_eq!(key_of(frames, false), None);
    }

    #[test]
    fn test_plugin_key_ignores_outcome() {
        assert_eq!(
            key_of(vec![plugin()], true).as_deref(),
            Some("org.apache.maven.plugins_maven-surefire-plugin_3.2.5.plugin")
        );
    }

    #[test]
    fn test_dependency_request_root() {
        let frames = vec![
            TraceFrame::DependencyRequest { root: node("app") },
            TraceFrame::ModelBuildRequest {
                pom_file: Some(PathBuf::from("/work/pom.xml")),
                model_source_location: None,
            },
        ];
        assert_eq!(
            key_of(frames, false).as_deref(),
            Some("org.example_app_jar_1.0.dep")
        );
    }

    #[test]
    fn test_model_build_slug() {
        let frames = vec![TraceFrame::ModelBuildRequest {
            pom_file: None,
            model_source_location: Some("/work/app/pom.xml".to_string()),
        }];
        assert_eq!(
            key_of(frames, true).as_deref(),
            Some("work_app_pom.xml.miss")
        );
    }

    #[test]
    fn test_unresolvable_model_source() {
        let frames = vec![TraceFrame::ModelBuildRequest {
            pom_file: None,
            model_source_location: Some("org.example:parent:1.0".to_string()),
        }];
        assert_eq!(key_of(frames, false), None);
    }

    #[test]
    fn test_no_classifiable_frames() {
        assert_eq!(key_of(vec![], false), None);
        assert_eq!(
            key_of(
                vec![TraceFrame::Unrecognized {
                    label: "other".to_string()
                }],
                false
            ),
            None
        );
    }

    #[test]
    fn test_repositories_deduplicated() {
        let central = RemoteRepository::new("central", "https://repo.example/central");
        let snapshots = RemoteRepository::new("snapshots", "https://repo.example/snapshots");
        let head = RequestTrace::from_frames(vec![
            TraceFrame::ArtifactFetchRequest {
                artifact: artifact("lib"),
                repositories: vec![central.clone(), snapshots.clone()],
            },
            TraceFrame::ArtifactFetchRequest {
                artifact: artifact("lib"),
                repositories: vec![central.clone()],
            },
        ]);
        let provenance = Provenance::from_trace(head.as_deref());

        assert!(provenance.has_fetch());
        assert_eq!(provenance.repositories(), vec![&central, &snapshots]);
    }
}
