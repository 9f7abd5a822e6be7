//! Interfaces of the resolution engine the tracker plugs into
//!
//! @module resolver

pub mod collect;
pub mod events;
pub mod local;

pub use collect::{CollectArgs, DependencyCollector};
pub use events::{EventKind, RepositoryEvent, RepositoryListener, RepositorySession};
pub use local::{
    LocalArtifactRegistration, LocalArtifactRequest, LocalArtifactResult,
    LocalMetadataRegistration, LocalMetadataRequest, LocalMetadataResult, LocalRepository,
    LocalRepositoryManager, SimpleLocalRepositoryManager,
};
