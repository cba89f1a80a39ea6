//! The work-node model and the arena holding both tree generations.
//!
//! A [`Fiber`] is one unit of the reconciliation tree. Fibers form a
//! parent-pointer, first-child/next-sibling tree, and every logical tree
//! position has at most two live fibers at a time: one in the *current*
//! generation (the last committed render) and one in the *work-in-progress*
//! generation (the pass being built). The two are cross-linked through
//! `alternate`, which is how a pass recovers prior state in O(1) without
//! cloning the whole tree.
//!
//! All fibers live in a single slotmap arena, [`FiberTree`]; every structural
//! link is an [`FiberId`] rather than a reference, which sidesteps the
//! ownership cycle a two-node `alternate` loop would otherwise create.

use bitflags::bitflags;
use slotmap::{DefaultKey, SlotMap};

use crate::element::{Child, Element, ElementType, Key, Props};
use crate::host::NativeHandle;
use crate::update_queue::UpdateQueue;

bitflags! {
    /// Pending mutation kinds for a single fiber.
    ///
    /// `flags` marks the node's own mutations. `subtree_flags` is the union of
    /// every descendant's `flags | subtree_flags`, maintained by the complete
    /// phase so a later commit walk can skip subtrees with nothing pending.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct EffectFlags: u8 {
        /// The node must be inserted into the host tree.
        const PLACEMENT = 1 << 0;
        /// The node's existing host instance must be mutated in place.
        const UPDATE = 1 << 1;
        /// One or more of the node's children must be removed.
        ///
        /// Part of the flag vocabulary for commit-phase completeness; no
        /// reconcile path sets it because child-removal diffing is
        /// unimplemented.
        const CHILD_DELETION = 1 << 2;
    }
}

impl EffectFlags {
    /// Alias for the empty set.
    pub const NONE: EffectFlags = EffectFlags::empty();

    /// Whether any flag is set.
    pub fn any(self) -> bool {
        !self.is_empty()
    }
}

/// Identifies a fiber slot in the tree arena.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct FiberId(DefaultKey);

/// Node category. Immutable once a fiber is constructed; selects the begin
/// and complete behavior that applies.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FiberKind {
    /// The persistent anchor a container binds to. Consumes the update queue.
    Root,
    /// A host element, materialized through the host backend.
    Element,
    /// A host text leaf.
    Text,
    /// A functional unit. Described but not yet reconciled.
    Component,
}

/// The incoming or committed parameters of a fiber, shaped by its kind.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum FiberProps {
    /// No parameters; the root enters each pass this way.
    #[default]
    Empty,
    /// Host element parameters.
    Node(Props),
    /// Text content.
    Text(String),
}

impl FiberProps {
    /// The host element parameters, if this is a `Node`.
    pub fn as_node(&self) -> Option<&Props> {
        match self {
            FiberProps::Node(props) => Some(props),
            _ => None,
        }
    }

    /// The text content, if this is a `Text`.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FiberProps::Text(content) => Some(content),
            _ => None,
        }
    }
}

/// State memoized at the root: the top-level rendered description.
pub type RootState = Option<Child>;

/// One unit of the reconciliation tree.
pub struct Fiber {
    /// Node category; drives begin/complete dispatch.
    pub kind: FiberKind,
    /// The described node's underlying kind. Absent for root and text.
    pub element_type: Option<ElementType>,
    /// External identity hint.
    pub key: Option<Key>,
    /// The incoming description's parameters, consumed by the begin phase.
    pub pending_props: FiberProps,
    /// Snapshot of the last consumed parameters; written by the work loop
    /// right after the begin phase runs.
    pub memoized_props: Option<FiberProps>,
    /// Last committed derived state; at the root, the rendered description.
    pub memoized_state: RootState,
    /// The externally materialized instance, once complete has run.
    pub native: Option<NativeHandle>,
    /// Position among siblings. Bookkeeping only.
    pub index: u32,
    /// This node's own pending mutations.
    pub flags: EffectFlags,
    /// Union of all descendant flags, bubbled during completion.
    pub subtree_flags: EffectFlags,
    /// Pending external updates. Only root fibers carry a queue.
    pub updates: Option<UpdateQueue<RootState>>,

    /// Structural parent in the current traversal.
    pub parent: Option<FiberId>,
    /// First child link.
    pub first_child: Option<FiberId>,
    /// Next sibling link.
    pub next_sibling: Option<FiberId>,
    /// The counterpart fiber in the other generation.
    pub alternate: Option<FiberId>,
}

impl Fiber {
    /// A fresh, unlinked fiber.
    pub fn new(kind: FiberKind, pending_props: FiberProps, key: Option<Key>) -> Self {
        Fiber {
            kind,
            element_type: None,
            key,
            pending_props,
            memoized_props: None,
            memoized_state: None,
            native: None,
            index: 0,
            flags: EffectFlags::NONE,
            subtree_flags: EffectFlags::NONE,
            updates: None,
            parent: None,
            first_child: None,
            next_sibling: None,
            alternate: None,
        }
    }
}

/// The fiber arena. Holds both generations of one logical tree.
///
/// Ownership is tree-structural: a fiber stays alive as long as its slot does,
/// and slots are never reclaimed by the minimal design because no deletion
/// diffing exists to prove a subtree unreachable from either generation.
#[derive(Default)]
pub struct FiberTree {
    fibers: SlotMap<DefaultKey, Fiber>,
}

impl FiberTree {
    /// An empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    fn key_for_id(id: FiberId) -> DefaultKey {
        id.0
    }

    /// Number of live fibers across both generations.
    pub fn len(&self) -> usize {
        self.fibers.len()
    }

    /// Whether the arena holds no fibers.
    pub fn is_empty(&self) -> bool {
        self.fibers.is_empty()
    }

    /// Inserts a fiber and returns its id.
    pub fn insert(&mut self, fiber: Fiber) -> FiberId {
        FiberId(self.fibers.insert(fiber))
    }

    /// Gets a fiber by id.
    pub fn get(&self, id: FiberId) -> Option<&Fiber> {
        self.fibers.get(Self::key_for_id(id))
    }

    /// Gets a mutable fiber by id.
    pub fn get_mut(&mut self, id: FiberId) -> Option<&mut Fiber> {
        self.fibers.get_mut(Self::key_for_id(id))
    }

    /// Infallible access for ids minted by this tree.
    ///
    /// Slots are never reclaimed, so a stale id here means a corrupted
    /// traversal; the resulting panic is the pass-fatal tier.
    pub(crate) fn node(&self, id: FiberId) -> &Fiber {
        &self.fibers[Self::key_for_id(id)]
    }

    /// Mutable counterpart of [`FiberTree::node`].
    pub(crate) fn node_mut(&mut self, id: FiberId) -> &mut Fiber {
        &mut self.fibers[Self::key_for_id(id)]
    }

    /// Structural parent link.
    pub fn parent(&self, id: FiberId) -> Option<FiberId> {
        self.node(id).parent
    }

    /// First child link.
    pub fn first_child(&self, id: FiberId) -> Option<FiberId> {
        self.node(id).first_child
    }

    /// Next sibling link.
    pub fn next_sibling(&self, id: FiberId) -> Option<FiberId> {
        self.node(id).next_sibling
    }

    /// Counterpart in the other generation.
    pub fn alternate(&self, id: FiberId) -> Option<FiberId> {
        self.node(id).alternate
    }

    /// Allocates a fiber from a composite element description.
    pub fn create_fiber_from_element(&mut self, element: &Element) -> FiberId {
        let kind = match element.element_type {
            ElementType::Tag(_) => FiberKind::Element,
            ElementType::Component(_) => FiberKind::Component,
        };
        let mut fiber = Fiber::new(
            kind,
            FiberProps::Node(element.props.clone()),
            element.key.clone(),
        );
        fiber.element_type = Some(element.element_type.clone());
        self.insert(fiber)
    }

    /// Allocates a text fiber holding the given content.
    pub fn create_text_fiber(&mut self, content: impl Into<String>) -> FiberId {
        self.insert(Fiber::new(
            FiberKind::Text,
            FiberProps::Text(content.into()),
            None,
        ))
    }

    /// Produces the work-in-progress counterpart of a current-generation
    /// fiber, applying the dual-generation rule.
    ///
    /// If `current` already has an alternate from an earlier pass, that slot
    /// is reused: its effect flags are cleared, the new pending props move in,
    /// and the committed state is re-adopted from `current`. Otherwise a fresh
    /// counterpart is allocated and the two are cross-linked. Either way the
    /// counterpart starts the pass pointing at `current`'s children; child
    /// reconciliation relinks them as it walks.
    ///
    /// The update queue, when present, moves from `current` to the
    /// counterpart: the begin phase drains it on the work-in-progress side,
    /// and the hand-off at the end of the pass carries it into the next
    /// current generation.
    pub fn create_work_in_progress(
        &mut self,
        current: FiberId,
        pending_props: FiberProps,
    ) -> FiberId {
        let updates = self.node_mut(current).updates.take();
        let (kind, element_type, key, memoized_props, memoized_state, native, first_child, existing) = {
            let node = self.node(current);
            (
                node.kind,
                node.element_type.clone(),
                node.key.clone(),
                node.memoized_props.clone(),
                node.memoized_state.clone(),
                node.native,
                node.first_child,
                node.alternate,
            )
        };

        match existing {
            Some(wip_id) => {
                let wip = self.node_mut(wip_id);
                wip.kind = kind;
                wip.element_type = element_type;
                wip.key = key;
                wip.pending_props = pending_props;
                wip.flags = EffectFlags::NONE;
                wip.subtree_flags = EffectFlags::NONE;
                wip.memoized_props = memoized_props;
                wip.memoized_state = memoized_state;
                wip.native = native;
                wip.updates = updates;
                wip.first_child = first_child;
                wip.next_sibling = None;
                wip.parent = None;
                wip.index = 0;
                wip_id
            }
            None => {
                let mut wip = Fiber::new(kind, pending_props, key);
                wip.element_type = element_type;
                wip.memoized_props = memoized_props;
                wip.memoized_state = memoized_state;
                wip.native = native;
                wip.updates = updates;
                wip.first_child = first_child;
                wip.alternate = Some(current);
                let wip_id = self.insert(wip);
                self.node_mut(current).alternate = Some(wip_id);
                wip_id
            }
        }
    }
}

#[cfg(test)]
mod tests;
