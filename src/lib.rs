//! Incremental UI-tree reconciliation over a dual-generation fiber arena.
//!
//! Given the previously rendered tree and a newly described tree, `fibril`
//! computes the minimal set of mutations needed to transform the rendered
//! output, without recursing over the full subtree at once. Two generations of
//! the same logical tree coexist in one arena: the *current* generation is the
//! last committed render, and the *work-in-progress* generation is rebuilt on
//! each pass by a hand-rolled depth-first state machine: a descending begin
//! phase that resolves state and diffs children, and an ascending complete
//! phase that materializes host instances and bubbles effect flags upward.
//!
//! The traversal reproduces recursion's ordering guarantees (pre-order
//! descent, post-order ascent) with an explicit work pointer and O(1)
//! auxiliary state, reusing the prior generation's fibers wherever the new
//! description matches by type and key.
//!
//! # Architecture
//!
//! - [`element`]: lightweight tree descriptions, pure data construction.
//! - [`update_queue`]: per-node FIFO of pending state transitions.
//! - [`fiber`]: the work-node model and the slotmap arena holding both
//!   generations, cross-linked by ids instead of references.
//! - [`host`]: the narrow capability set for creating platform-native
//!   instances; the reconciler never touches the platform directly.
//! - [`root`]: binds a persistent root container to the work loop's entry
//!   point and hands finished trees off as the new current generation.
//!
//! Rendering is single-threaded and fully synchronous: one pass runs
//! start-to-finish with no suspension points, and a panic inside the pass
//! abandons it, leaving the prior current generation as the visible state.

pub mod element;
pub mod fiber;
pub mod host;
pub mod root;
pub mod update_queue;

mod reconciler;

pub use element::{Child, Element, ElementType, Props};
pub use fiber::{EffectFlags, Fiber, FiberId, FiberKind, FiberProps, FiberTree, RootState};
pub use host::{HostBackend, NativeHandle};
pub use root::RootContainer;
pub use update_queue::{process, Action, Update, UpdateQueue};
