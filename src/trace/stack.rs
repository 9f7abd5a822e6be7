//! Active-Path Stack
//!
//! The graph nodes the collector is currently descending through. Sibling
//! subtrees may be collected on different threads, so pushes and pops from
//! unrelated branches interleave; a snapshot is a best-effort view of the
//! current descent, not a single authoritative path.
//!
//! @module trace/stack

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

use super::types::DependencyNode;

/// Shared, insertion-ordered stack of nodes under resolution
#[derive(Debug, Default)]
pub struct ActivePathStack {
    nodes: Mutex<VecDeque<Arc<DependencyNode>>>,
}

impl ActivePathStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a node on top
    pub fn push(&self, node: Arc<DependencyNode>) {
        self.nodes.lock().push_back(node);
    }

    /// Pop the most recently pushed node
    pub fn pop(&self) -> Option<Arc<DependencyNode>> {
        self.nodes.lock().pop_back()
    }

    /// Remove one specific entry, searching from the top
    ///
    /// Under concurrent collection the top may belong to another branch,
    /// so bracketed pops remove their own entry by identity.
    pub fn remove(&self, node: &Arc<DependencyNode>) -> bool {
        let mut nodes = self.nodes.lock();
        match nodes.iter().rposition(|n| Arc::ptr_eq(n, node)) {
            Some(pos) => {
                nodes.remove(pos);
                true
            }
            None => false,
        }
    }

    /// The most recently pushed node
    pub fn top(&self) -> Option<Arc<DependencyNode>> {
        self.nodes.lock().back().cloned()
    }

    /// Current contents, oldest (outermost) first
    pub fn snapshot(&self) -> Vec<Arc<DependencyNode>> {
        self.nodes.lock().iter().cloned().collect()
    }

    pub fn depth(&self) -> usize {
        self.nodes.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.lock().is_empty()
    }

    /// Push `node` and pop it again when the returned guard drops
    ///
    /// The guard pops on every exit path of the enclosing scope: normal
    /// return, `?` propagation and unwinding.
    pub fn enter(&self, node: Arc<DependencyNode>) -> ActivePathGuard<'_> {
        self.push(Arc::clone(&node));
        ActivePathGuard { stack: self, node }
    }
}

/// Pops its node from the stack on drop
#[must_use = "the node is popped as soon as the guard is dropped"]
pub struct ActivePathGuard<'a> {
    stack: &'a ActivePathStack,
    node: Arc<DependencyNode>,
}

impl ActivePathGuard<'_> {
    pub fn node(&self) -> &DependencyNode {
        &self.node
    }
}

impl Drop for ActivePathGuard<'_> {
    fn drop(&mut self) {
        if !self.stack.remove(&self.node) {
            tracing::warn!(node = %self.node, "Active path entry already gone on exit");
        }
    }
}
