//! Active-path bracketing for dependency collection
//!
//! @module tracking/collector

use std::sync::Arc;

use super::TrackingContext;
use crate::resolver::collect::{CollectArgs, DependencyCollector};
use crate::trace::types::Dependency;

/// Wraps a collector so the current parent node is on the active path
/// for exactly as long as its dependency is being processed
pub struct TrackingDependencyCollector<C> {
    inner: C,
    context: Arc<TrackingContext>,
}

impl<C> TrackingDependencyCollector<C> {
    pub fn new(inner: C, context: Arc<TrackingContext>) -> Self {
        Self { inner, context }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    pub fn into_inner(self) -> C {
        self.inner
    }
}

impl<C: DependencyCollector> DependencyCollector for TrackingDependencyCollector<C> {
    type Error = C::Error;

    fn process_dependency(
        &self,
        outer: &dyn DependencyCollector<Error = Self::Error>,
        args: &mut CollectArgs,
        dependency: &Dependency,
    ) -> Result<(), Self::Error> {
        let _guard = args
            .top()
            .cloned()
            .map(|parent| self.context.stack().enter(parent));
        self.inner.process_dependency(outer, args, dependency)
    }
}
