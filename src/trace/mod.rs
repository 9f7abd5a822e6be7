//! Request Trace Reconstruction
//!
//! This module turns the request trace attached to a resolution event into
//! readable provenance:
//! - Data model of artifacts, graph nodes and trace frames
//! - Cycle-safe walking and classification of trace frames
//! - The shared active-path stack of nodes under collection
//! - Plain text rendering
//!
//! @module trace

pub mod format;
pub mod stack;
pub mod types;
pub mod walker;

// =============================================================================
// RE-EXPORTS
// =============================================================================

pub use format::{Outcome, ProvenanceFormatter, CONFIGURED_REPOSITORIES};
pub use stack::{ActivePathGuard, ActivePathStack};
pub use types::{
    Artifact, ArtifactRepository, Dependency, DependencyNode, Metadata, RemoteRepository,
    RequestTrace, TraceFrame,
};
pub use walker::{walk, Classified, UNKNOWN_MODEL, UNKNOWN_SCOPE};
