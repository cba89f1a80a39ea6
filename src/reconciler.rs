//! The reconciliation engine: child diffing, the begin/complete phases, and
//! the work loop that drives them.
//!
//! One render pass rebuilds the work-in-progress generation with a single
//! mutable work pointer, owned by [`RenderPass`]. The pointer descends through
//! the begin phase (resolve state, diff the child position, return the next
//! node) and, when a node returns no child, ascends through the complete
//! phase (materialize host instances, bubble effect flags) until a sibling
//! offers a new descent target. The current generation is read-only throughout
//! the pass except for its `alternate` back-links and the root queue hand-off.

use std::panic::{self, AssertUnwindSafe};

use crate::element::{Child, Element};
use crate::fiber::{EffectFlags, FiberId, FiberKind, FiberProps, FiberTree};
use crate::host::{HostBackend, NativeHandle};

/// Diffs one child position of a work-in-progress parent.
///
/// `current_first_child` is the parent's counterpart child in the current
/// generation, or `None` on first mount. `track_effects` selects update
/// traversal (per-child placement flags) versus mount traversal (the whole
/// subtree is inserted as one unit by completion, so per-child flags would be
/// redundant); both share this one implementation.
///
/// Returns the parent's new first child, already linked in.
pub(crate) fn reconcile_child_fibers(
    tree: &mut FiberTree,
    return_fiber: FiberId,
    current_first_child: Option<FiberId>,
    new_child: Option<&Child>,
    track_effects: bool,
) -> Option<FiberId> {
    let child = match new_child {
        None => {
            tree.node_mut(return_fiber).first_child = None;
            return None;
        }
        Some(Child::Element(element)) => {
            reconcile_single_element(tree, return_fiber, current_first_child, element)
        }
        Some(Child::Text(content)) => {
            reconcile_single_text(tree, return_fiber, current_first_child, content)
        }
        Some(Child::Many(_)) => {
            log::warn!("[RECONCILE] multi-child lists are not reconciled yet; dropping children");
            tree.node_mut(return_fiber).first_child = None;
            return None;
        }
    };

    place_single_child(tree, child, track_effects);
    tree.node_mut(return_fiber).first_child = Some(child);
    Some(child)
}

/// Reuse the current child when type and key both match; otherwise allocate a
/// fresh fiber from the description. Never mutates the current generation.
fn reconcile_single_element(
    tree: &mut FiberTree,
    return_fiber: FiberId,
    current_first_child: Option<FiberId>,
    element: &Element,
) -> FiberId {
    if let Some(existing) = current_first_child {
        let node = tree.node(existing);
        let same_type = node.element_type.as_ref() == Some(&element.element_type);
        let same_key = node.key == element.key;
        if same_type && same_key {
            log::trace!(
                "[RECONCILE] reusing {:?} fiber for <{}>",
                existing,
                element.element_type.name()
            );
            let wip = tree.create_work_in_progress(
                existing,
                FiberProps::Node(element.props.clone()),
            );
            let node = tree.node_mut(wip);
            node.index = 0;
            node.parent = Some(return_fiber);
            return wip;
        }
    }

    let fiber = tree.create_fiber_from_element(element);
    tree.node_mut(fiber).parent = Some(return_fiber);
    fiber
}

fn reconcile_single_text(
    tree: &mut FiberTree,
    return_fiber: FiberId,
    current_first_child: Option<FiberId>,
    content: &str,
) -> FiberId {
    if let Some(existing) = current_first_child {
        if tree.node(existing).kind == FiberKind::Text {
            let wip =
                tree.create_work_in_progress(existing, FiberProps::Text(content.to_owned()));
            let node = tree.node_mut(wip);
            node.index = 0;
            node.parent = Some(return_fiber);
            return wip;
        }
    }

    let fiber = tree.create_text_fiber(content);
    tree.node_mut(fiber).parent = Some(return_fiber);
    fiber
}

/// In update traversal, a produced child with no counterpart in the other
/// generation is brand new and must be inserted; mark it. Mount traversal
/// never marks individual children.
fn place_single_child(tree: &mut FiberTree, child: FiberId, track_effects: bool) {
    if track_effects && tree.node(child).alternate.is_none() {
        tree.node_mut(child).flags |= EffectFlags::PLACEMENT;
    }
}

/// The descend step: resolve state for this node, diff its child position,
/// and return the next node to visit (its new first child, if any).
pub(crate) fn begin_work(tree: &mut FiberTree, wip: FiberId) -> Option<FiberId> {
    match tree.node(wip).kind {
        FiberKind::Root => update_root(tree, wip),
        FiberKind::Element => update_element(tree, wip),
        FiberKind::Text => None,
        FiberKind::Component => {
            log::warn!("[BEGIN] functional units are not implemented; treating {wip:?} as a leaf");
            None
        }
    }
}

fn update_root(tree: &mut FiberTree, wip: FiberId) -> Option<FiberId> {
    let base = tree.node(wip).memoized_state.clone();
    let next = match tree.node_mut(wip).updates.as_mut() {
        Some(queue) => queue.consume(base),
        None => base,
    };
    let description = next.clone();
    tree.node_mut(wip).memoized_state = next;
    reconcile_children(tree, wip, description.as_ref())
}

fn update_element(tree: &mut FiberTree, wip: FiberId) -> Option<FiberId> {
    let next_children = tree
        .node(wip)
        .pending_props
        .as_node()
        .and_then(|props| props.children.clone());
    reconcile_children(tree, wip, next_children.as_ref())
}

/// Selects mount or update traversal for this node's child position. Tracking
/// is on exactly when a current-generation counterpart exists to diff against.
fn reconcile_children(
    tree: &mut FiberTree,
    wip: FiberId,
    new_child: Option<&Child>,
) -> Option<FiberId> {
    match tree.node(wip).alternate {
        Some(current) => {
            let current_first_child = tree.node(current).first_child;
            reconcile_child_fibers(tree, wip, current_first_child, new_child, true)
        }
        None => reconcile_child_fibers(tree, wip, None, new_child, false),
    }
}

/// The ascend step: materialize host instances for host kinds, then bubble
/// flags. Never yields a next node to begin; the work loop's own ascent logic
/// picks the next target.
pub(crate) fn complete_work(tree: &mut FiberTree, host: &mut dyn HostBackend, wip: FiberId) {
    let has_current = tree.node(wip).alternate.is_some();
    let already_materialized = has_current && tree.node(wip).native.is_some();

    match tree.node(wip).kind {
        FiberKind::Element => {
            if already_materialized {
                // Update-path native mutation is an unimplemented extension
                // point; the existing instance is carried over untouched.
            } else if let Some(element_type) = tree.node(wip).element_type.clone() {
                let props = tree
                    .node(wip)
                    .pending_props
                    .as_node()
                    .cloned()
                    .unwrap_or_default();
                let instance = host.create_instance(&element_type, &props);
                append_all_children(tree, host, wip, instance);
                tree.node_mut(wip).native = Some(instance);
            } else {
                log::warn!("[COMPLETE] host element {wip:?} has no type; skipping materialization");
            }
        }
        FiberKind::Text => {
            if !already_materialized {
                let content = tree
                    .node(wip)
                    .pending_props
                    .as_text()
                    .unwrap_or_default()
                    .to_owned();
                let instance = host.create_text_instance(&content);
                tree.node_mut(wip).native = Some(instance);
            }
        }
        FiberKind::Root => {}
        FiberKind::Component => {
            log::warn!("[COMPLETE] functional units are not implemented; nothing to materialize");
        }
    }

    bubble_properties(tree, wip);
}

/// Appends the nearest materialized host descendants under a freshly created
/// instance, bridging transparently over composite layers.
///
/// A pre-order walk using only the tree's own links: descend into a non-host
/// node's child, append host nodes and move to their sibling, ascend through
/// parents when a frontier runs out of siblings, and stop once ascent reaches
/// the node being completed. Begin-phase link construction guarantees every
/// visited `parent`/`next_sibling` link is valid.
fn append_all_children(
    tree: &mut FiberTree,
    host: &mut dyn HostBackend,
    wip: FiberId,
    parent_handle: NativeHandle,
) {
    let mut node = match tree.node(wip).first_child {
        Some(child) => child,
        None => return,
    };

    loop {
        let (kind, native, first_child) = {
            let fiber = tree.node(node);
            (fiber.kind, fiber.native, fiber.first_child)
        };

        match kind {
            FiberKind::Element | FiberKind::Text => {
                if let Some(handle) = native {
                    host.append_initial_child(parent_handle, handle);
                }
            }
            FiberKind::Root | FiberKind::Component => {
                if let Some(child) = first_child {
                    tree.node_mut(child).parent = Some(node);
                    node = child;
                    continue;
                }
            }
        }

        // Advance to the next frontier: a sibling here, or the first sibling
        // found while ascending back toward the completing node.
        loop {
            if let Some(sibling) = tree.node(node).next_sibling {
                let parent = tree.node(node).parent;
                tree.node_mut(sibling).parent = parent;
                node = sibling;
                break;
            }
            match tree.node(node).parent {
                None => return,
                Some(parent) if parent == wip => return,
                Some(parent) => node = parent,
            }
        }
    }
}

/// Folds every direct child's flags into this node's subtree flags and
/// re-establishes the structural parent link that descent bookkeeping may
/// have left stale.
fn bubble_properties(tree: &mut FiberTree, wip: FiberId) {
    let mut subtree_flags = EffectFlags::NONE;
    let mut child = tree.node(wip).first_child;
    while let Some(id) = child {
        let (flags, child_subtree, next) = {
            let node = tree.node(id);
            (node.flags, node.subtree_flags, node.next_sibling)
        };
        subtree_flags |= child_subtree;
        subtree_flags |= flags;
        tree.node_mut(id).parent = Some(wip);
        child = next;
    }
    tree.node_mut(wip).subtree_flags |= subtree_flags;
}

/// One synchronous render pass over one root. Owns the single work pointer;
/// not reentrant.
pub(crate) struct RenderPass<'a> {
    tree: &'a mut FiberTree,
    host: &'a mut dyn HostBackend,
    work_in_progress: Option<FiberId>,
}

impl<'a> RenderPass<'a> {
    pub(crate) fn new(tree: &'a mut FiberTree, host: &'a mut dyn HostBackend) -> Self {
        RenderPass {
            tree,
            host,
            work_in_progress: None,
        }
    }

    /// Points the pass at the work-in-progress counterpart of the current
    /// root, created with empty incoming props.
    fn prepare_fresh_stack(&mut self, root_current: FiberId) -> FiberId {
        let wip_root = self
            .tree
            .create_work_in_progress(root_current, FiberProps::Empty);
        self.work_in_progress = Some(wip_root);
        wip_root
    }

    fn work_loop(&mut self) {
        while let Some(unit) = self.work_in_progress {
            self.perform_unit_of_work(unit);
        }
    }

    /// Begin this unit, memoize its consumed props, and either keep
    /// descending or switch to completion.
    fn perform_unit_of_work(&mut self, fiber: FiberId) {
        let next = begin_work(self.tree, fiber);
        let consumed = self.tree.node(fiber).pending_props.clone();
        self.tree.node_mut(fiber).memoized_props = Some(consumed);

        match next {
            Some(child) => self.work_in_progress = Some(child),
            None => self.complete_unit_of_work(fiber),
        }
    }

    /// Complete this unit, then the first sibling found becomes the new
    /// descent target; with no sibling, keep completing ancestors until the
    /// traversal is exhausted.
    fn complete_unit_of_work(&mut self, fiber: FiberId) {
        let mut node = Some(fiber);
        while let Some(id) = node {
            complete_work(self.tree, self.host, id);

            if let Some(sibling) = self.tree.node(id).next_sibling {
                self.work_in_progress = Some(sibling);
                return;
            }

            node = self.tree.node(id).parent;
            self.work_in_progress = node;
        }
    }
}

/// Runs a full render pass, building the work-in-progress tree for
/// `root_current` to completion.
///
/// Returns the finished work-in-progress root, or `None` when the pass
/// aborted: any panic raised while executing a unit of work abandons the
/// whole pass, the work pointer drops, and the prior current generation
/// remains the externally visible state. No retry is attempted.
pub(crate) fn render_root(
    tree: &mut FiberTree,
    host: &mut dyn HostBackend,
    root_current: FiberId,
) -> Option<FiberId> {
    let (wip_root, outcome) = {
        let mut pass = RenderPass::new(tree, host);
        let wip_root = pass.prepare_fresh_stack(root_current);
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| pass.work_loop()));
        (wip_root, outcome)
    };

    match outcome {
        Ok(()) => Some(wip_root),
        Err(payload) => {
            log::error!("render pass aborted: {}", panic_message(payload.as_ref()));
            // The update queue followed the counterpart when the pass started;
            // bring it back so later updates still reach the root anchor.
            if let Some(queue) = tree.node_mut(wip_root).updates.take() {
                tree.node_mut(root_current).updates = Some(queue);
            }
            None
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "unknown panic payload"
    }
}
