//! Dependency collection interface
//!
//! The engine's collector processes one declared dependency at a time and
//! recurses into that dependency's own dependencies. Recursion goes through
//! the `outer` collector so a decorator wrapping the engine sees every level.

use std::sync::Arc;

use crate::trace::types::{Dependency, DependencyNode};

/// Per-collection state handed down the recursion
#[derive(Debug, Default)]
pub struct CollectArgs {
    /// Nodes from the collection root down to the current parent
    pub nodes: Vec<Arc<DependencyNode>>,
}

impl CollectArgs {
    pub fn new(root: DependencyNode) -> Self {
        Self {
            nodes: vec![Arc::new(root)],
        }
    }

    /// The parent node of the dependency being processed
    pub fn top(&self) -> Option<&Arc<DependencyNode>> {
        self.nodes.last()
    }
}

/// Recursive per-dependency processing step of a collector
pub trait DependencyCollector: Send + Sync {
    type Error;

    /// Process `dependency` as a child of `args.top()`
    ///
    /// Implementations recurse by calling `outer.process_dependency`, never
    /// `self.process_dependency`, so that wrapping collectors stay in the loop.
    fn process_dependency(
        &self,
        outer: &dyn DependencyCollector<Error = Self::Error>,
        args: &mut CollectArgs,
        dependency: &Dependency,
    ) -> Result<(), Self::Error>;

    /// Entry point for the outermost collector
    fn collect(&self, args: &mut CollectArgs, dependency: &Dependency) -> Result<(), Self::Error>
    where
        Self: Sized,
    {
        self.process_dependency(self, args, dependency)
    }
}
