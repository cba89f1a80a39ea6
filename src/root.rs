//! Binds a persistent root container to the work loop's entry point.
//!
//! A [`RootContainer`] owns the fiber arena, the external container handle,
//! and the current generation's root fiber. Submitting a new top-level
//! description enqueues it on the root's update queue and synchronously runs
//! a full render pass; when the pass finishes, the work-in-progress root is
//! handed off as the new current generation. Applying the accumulated effect
//! flags to the host (the commit walk proper) is a separate concern and not
//! performed here.

use crate::element::Child;
use crate::fiber::{Fiber, FiberId, FiberKind, FiberProps, FiberTree};
use crate::host::{HostBackend, NativeHandle};
use crate::reconciler;
use crate::update_queue::{Update, UpdateQueue};

/// A persistent root binding one container handle to one fiber tree.
pub struct RootContainer {
    tree: FiberTree,
    container: NativeHandle,
    current: FiberId,
    finished_work: Option<FiberId>,
}

impl RootContainer {
    /// Creates a container bound to an external handle, with a fresh root
    /// fiber carrying an empty update queue.
    pub fn new(container: NativeHandle) -> Self {
        let mut tree = FiberTree::new();
        let mut root = Fiber::new(FiberKind::Root, FiberProps::Empty, None);
        root.updates = Some(UpdateQueue::new());
        let current = tree.insert(root);
        RootContainer {
            tree,
            container,
            current,
            finished_work: None,
        }
    }

    /// The external container handle this root renders into.
    pub fn container(&self) -> NativeHandle {
        self.container
    }

    /// The current generation's root fiber.
    pub fn current(&self) -> FiberId {
        self.current
    }

    /// The most recently completed pass's root, if it has not been handed
    /// off yet.
    pub fn finished_work(&self) -> Option<FiberId> {
        self.finished_work
    }

    /// Read access to the fiber arena.
    pub fn tree(&self) -> &FiberTree {
        &self.tree
    }

    /// Enqueues `description` as the new top-level rendered output and
    /// synchronously runs a full render pass. Returns the description it was
    /// given; a pass that aborts is indistinguishable here from one that
    /// rendered (the failure is logged, and the prior current generation
    /// stays visible).
    pub fn update_container(
        &mut self,
        description: Option<Child>,
        host: &mut dyn HostBackend,
    ) -> Option<Child> {
        let root = self.current;
        let update = Update::replace(description.clone());
        match self.tree.node_mut(root).updates.as_mut() {
            Some(queue) => queue.enqueue(update),
            None => log::warn!("[ROOT] root fiber {root:?} has no update queue; dropping update"),
        }
        self.schedule_update(root, host);
        description
    }

    /// Entry point for updates enqueued anywhere in the tree: walk up to the
    /// tree's top and, if it is this container's root anchor, run the pending
    /// tree to completion. An update on an unattached tree is a logged no-op.
    pub fn schedule_update(&mut self, fiber: FiberId, host: &mut dyn HostBackend) {
        let top = self.top_of_tree(fiber);
        if self.tree.node(top).kind != FiberKind::Root || top != self.current {
            log::warn!("[ROOT] update scheduled on an unattached tree (from {fiber:?}); ignoring");
            return;
        }

        if let Some(finished) = reconciler::render_root(&mut self.tree, host, self.current) {
            self.finished_work = Some(finished);
            self.hand_off();
        }
    }

    fn top_of_tree(&self, fiber: FiberId) -> FiberId {
        let mut node = fiber;
        while let Some(parent) = self.tree.parent(node) {
            node = parent;
        }
        node
    }

    /// The finished work-in-progress tree becomes the new current generation.
    fn hand_off(&mut self) {
        if let Some(finished) = self.finished_work.take() {
            self.current = finished;
        }
    }
}
