//! The host-environment capability set.
//!
//! The complete phase materializes fibers into platform-native instances, but
//! it never talks to a platform directly: it requests instances through this
//! narrow interface and treats the returned handles as opaque. A handle's only
//! contract is that it is usable as a parent in a later append.

use crate::element::{ElementType, Props};

/// Opaque identifier for a platform-native instance, minted by the backend.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct NativeHandle(pub u64);

/// Capabilities the completion phase needs from the host environment.
pub trait HostBackend {
    /// Creates a native instance for a host element.
    fn create_instance(&mut self, element_type: &ElementType, props: &Props) -> NativeHandle;

    /// Creates a native text instance.
    fn create_text_instance(&mut self, content: &str) -> NativeHandle;

    /// Appends an already materialized child under a parent instance during
    /// initial assembly.
    fn append_initial_child(&mut self, parent: NativeHandle, child: NativeHandle);
}

#[cfg(any(test, feature = "test-support"))]
pub use self::test_support::{HostOp, RecordingBackend};

#[cfg(any(test, feature = "test-support"))]
mod test_support {
    use super::{HostBackend, NativeHandle};
    use crate::element::{ElementType, Props};

    /// One recorded backend call.
    #[derive(Clone, Debug, PartialEq)]
    pub enum HostOp {
        CreateInstance {
            handle: NativeHandle,
            tag: String,
        },
        CreateTextInstance {
            handle: NativeHandle,
            content: String,
        },
        AppendInitialChild {
            parent: NativeHandle,
            child: NativeHandle,
        },
    }

    /// Backend that mints sequential handles and records every call, so tests
    /// can assert on materialization order and assembly structure.
    #[derive(Default)]
    pub struct RecordingBackend {
        next_handle: u64,
        /// Every call, in invocation order.
        pub ops: Vec<HostOp>,
    }

    impl RecordingBackend {
        pub fn new() -> Self {
            Self::default()
        }

        fn mint(&mut self) -> NativeHandle {
            self.next_handle += 1;
            NativeHandle(self.next_handle)
        }
    }

    impl HostBackend for RecordingBackend {
        fn create_instance(&mut self, element_type: &ElementType, _props: &Props) -> NativeHandle {
            let handle = self.mint();
            self.ops.push(HostOp::CreateInstance {
                handle,
                tag: element_type.name().to_owned(),
            });
            handle
        }

        fn create_text_instance(&mut self, content: &str) -> NativeHandle {
            let handle = self.mint();
            self.ops.push(HostOp::CreateTextInstance {
                handle,
                content: content.to_owned(),
            });
            handle
        }

        fn append_initial_child(&mut self, parent: NativeHandle, child: NativeHandle) {
            self.ops.push(HostOp::AppendInitialChild { parent, child });
        }
    }
}
