//! Opaque handle types for native middleware objects.
//!
//! Each handle is a newtype over a pointer-sized integer. Zero is the
//! invalid sentinel and never aliases a live object.

macro_rules! define_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[repr(transparent)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(usize);

        impl $name {
            /// The invalid (null) handle.
            #[inline]
            pub const fn invalid() -> Self {
                Self(0)
            }

            /// Whether this handle refers to an object (non-zero).
            #[inline]
            pub const fn is_valid(self) -> bool {
                self.0 != 0
            }

            #[inline]
            pub const fn from_raw(raw: usize) -> Self {
                Self(raw)
            }

            #[inline]
            pub const fn raw(self) -> usize {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::invalid()
            }
        }
    };
}

define_handle!(
    /// A middleware context, root of one session's node graph.
    XnContextHandle
);
define_handle!(
    /// A production node (generator, recorder, player, codec, device).
    XnNodeHandle
);
define_handle!(
    /// Descriptor of one existing or instantiable node.
    XnNodeInfoHandle
);
define_handle!(
    /// An enumeration result list of node descriptors.
    XnNodeInfoListHandle
);
define_handle!(
    /// A filter for node enumeration.
    XnQueryHandle
);
define_handle!(
    /// A collection of per-candidate enumeration failures.
    XnEnumerationErrorsHandle
);
define_handle!(
    /// Token returned by a callback registration, required to unregister.
    XnCallbackHandle
);
