use super::{EffectFlags, Fiber, FiberKind, FiberProps, FiberTree};
use crate::element::{Element, ElementType};
use crate::update_queue::{Update, UpdateQueue};

#[test]
fn create_from_element_sets_kind_type_and_key() {
    let mut tree = FiberTree::new();
    let id = tree.create_fiber_from_element(&Element::new("div").key("k").attr("a", "1"));

    let fiber = tree.get(id).expect("fiber should exist after creation");
    assert_eq!(fiber.kind, FiberKind::Element);
    assert_eq!(fiber.element_type, Some(ElementType::Tag("div".into())));
    assert_eq!(fiber.key.as_deref(), Some("k"));
    let props = fiber.pending_props.as_node().expect("element props");
    assert_eq!(props.attrs, vec![("a".into(), "1".into())]);
}

#[test]
fn component_descriptions_get_component_kind() {
    let mut tree = FiberTree::new();
    let id = tree.create_fiber_from_element(&Element::component("App"));
    assert_eq!(tree.node(id).kind, FiberKind::Component);
}

#[test]
fn first_work_in_progress_cross_links_alternates() {
    let mut tree = FiberTree::new();
    let current = tree.create_text_fiber("hi");

    let wip = tree.create_work_in_progress(current, FiberProps::Text("hi".into()));

    assert_ne!(current, wip);
    assert_eq!(tree.alternate(current), Some(wip));
    assert_eq!(tree.alternate(wip), Some(current));
    assert_eq!(tree.len(), 2);
}

#[test]
fn second_work_in_progress_reuses_the_same_slot() {
    let mut tree = FiberTree::new();
    let current = tree.create_text_fiber("hi");

    let first = tree.create_work_in_progress(current, FiberProps::Text("hi".into()));
    let second = tree.create_work_in_progress(current, FiberProps::Text("yo".into()));

    assert_eq!(first, second, "at most two generations per logical position");
    assert_eq!(tree.len(), 2);
    assert_eq!(tree.node(second).pending_props.as_text(), Some("yo"));
}

#[test]
fn reused_counterpart_is_reset_for_the_new_pass() {
    let mut tree = FiberTree::new();
    let current = tree.create_text_fiber("hi");
    let wip = tree.create_work_in_progress(current, FiberProps::Text("hi".into()));

    // Dirty the counterpart as a finished pass would.
    {
        let node = tree.node_mut(wip);
        node.flags = EffectFlags::PLACEMENT;
        node.subtree_flags = EffectFlags::UPDATE;
        node.next_sibling = Some(current);
    }

    let wip = tree.create_work_in_progress(current, FiberProps::Text("hi".into()));
    let node = tree.node(wip);
    assert_eq!(node.flags, EffectFlags::NONE);
    assert_eq!(node.subtree_flags, EffectFlags::NONE);
    assert_eq!(node.next_sibling, None);
    assert_eq!(node.parent, None);
}

#[test]
fn counterpart_adopts_committed_state_and_children() {
    let mut tree = FiberTree::new();
    let child = tree.create_text_fiber("inner");
    let current = tree.create_fiber_from_element(&Element::new("div"));
    {
        let node = tree.node_mut(current);
        node.memoized_props = Some(node.pending_props.clone());
        node.first_child = Some(child);
    }

    let wip = tree.create_work_in_progress(current, FiberProps::Empty);
    let node = tree.node(wip);
    assert_eq!(node.first_child, Some(child));
    assert_eq!(node.memoized_props, tree.node(current).memoized_props);
    assert_eq!(node.element_type, Some(ElementType::Tag("div".into())));
}

#[test]
fn update_queue_moves_to_the_counterpart() {
    let mut tree = FiberTree::new();
    let mut root = Fiber::new(FiberKind::Root, FiberProps::Empty, None);
    let mut queue = UpdateQueue::new();
    queue.enqueue(Update::replace(None));
    root.updates = Some(queue);
    let current = tree.insert(root);

    let wip = tree.create_work_in_progress(current, FiberProps::Empty);

    assert!(tree.node(current).updates.is_none());
    let moved = tree.node(wip).updates.as_ref().expect("queue moved to wip");
    assert!(!moved.is_empty());
}

#[test]
fn effect_flags_combine_and_report() {
    let flags = EffectFlags::PLACEMENT | EffectFlags::UPDATE;
    assert!(flags.any());
    assert!(flags.contains(EffectFlags::PLACEMENT));
    assert!(!flags.contains(EffectFlags::CHILD_DELETION));
    assert!(!EffectFlags::NONE.any());
}
