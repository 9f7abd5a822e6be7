//! Dep Tracker - provenance records for dependency resolution
//!
//! Observes a resolution engine's events and writes, next to every
//! resolved or downloaded artifact, a plain text explanation of which
//! request chain and which graph path brought it in.

pub mod cli;
pub mod core;
pub mod resolver;
pub mod trace;
pub mod tracking;

pub use core::config::Config;
pub use core::error::{Error, Result};
pub use tracking::{
    TrackingContext, TrackingDependencyCollector, TrackingLocalRepositoryManager,
    TrackingRepositoryListener,
};
