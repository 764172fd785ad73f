//! Ownership primitive for opaque native resources.
//!
//! Every wrapped object (context, node, query, list, error collection)
//! holds one [`Owned`] pairing a handle with its release function. The
//! release function runs exactly once, on explicit `close()` or on drop,
//! whichever comes first. Several `Owned` instances may refer to the same
//! native object when it is reference counted natively (add-ref on share,
//! the last release frees).

use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::OpenNiError;
use crate::Result;

/// Raw handle types that carry a zero/invalid sentinel.
pub(crate) trait RawHandle: Copy {
    fn is_valid(self) -> bool;
}

macro_rules! impl_raw_handle {
    ($($ty:ty),* $(,)?) => {
        $(impl RawHandle for $ty {
            fn is_valid(self) -> bool {
                self.raw() != 0
            }
        })*
    };
}

impl_raw_handle!(
    crate::ffi::XnContextHandle,
    crate::ffi::XnNodeHandle,
    crate::ffi::XnNodeInfoListHandle,
    crate::ffi::XnQueryHandle,
    crate::ffi::XnEnumerationErrorsHandle,
);

/// Release callback invoked with the raw handle on the last close.
pub(crate) type ReleaseFn<H> = fn(H);

#[derive(Debug)]
pub(crate) struct Owned<H: RawHandle> {
    raw: H,
    release: ReleaseFn<H>,
    closed: AtomicBool,
}

impl<H: RawHandle> Owned<H> {
    /// Take ownership of `raw`. Fails on the invalid sentinel; a zero
    /// handle never names a live resource.
    pub fn open(raw: H, release: ReleaseFn<H>) -> Result<Self> {
        if !raw.is_valid() {
            return Err(OpenNiError::InvalidHandle);
        }
        Ok(Self {
            raw,
            release,
            closed: AtomicBool::new(false),
        })
    }

    /// The handle, or `AlreadyDisposed` once closed.
    pub fn get(&self) -> Result<H> {
        if self.closed.load(Ordering::Acquire) {
            Err(OpenNiError::AlreadyDisposed)
        } else {
            Ok(self.raw)
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Idempotent: the release function runs on the first call only. The
    /// swap is atomic so a drop on another thread cannot double-release.
    pub fn close(&self) -> bool {
        if self.closed.swap(true, Ordering::AcqRel) {
            false
        } else {
            (self.release)(self.raw);
            true
        }
    }
}

impl<H: RawHandle> Drop for Owned<H> {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ffi::XnNodeHandle;
    use std::sync::atomic::{AtomicUsize, Ordering};

    // Tests run in parallel; each gets its own release counter.
    static CLOSE_RELEASES: AtomicUsize = AtomicUsize::new(0);
    static DROP_RELEASES: AtomicUsize = AtomicUsize::new(0);

    fn close_counting_release(_: XnNodeHandle) {
        CLOSE_RELEASES.fetch_add(1, Ordering::SeqCst);
    }

    fn drop_counting_release(_: XnNodeHandle) {
        DROP_RELEASES.fetch_add(1, Ordering::SeqCst);
    }

    fn noop_release(_: XnNodeHandle) {}

    #[test]
    fn open_rejects_invalid_handle() {
        let err = Owned::open(XnNodeHandle::invalid(), noop_release).unwrap_err();
        assert!(matches!(err, OpenNiError::InvalidHandle));
    }

    #[test]
    fn close_runs_release_exactly_once() {
        let owned = Owned::open(XnNodeHandle::from_raw(7), close_counting_release).unwrap();
        assert!(owned.close(), "first close must perform the release");
        assert!(!owned.close(), "second close must be a no-op");
        drop(owned);
        assert_eq!(
            CLOSE_RELEASES.load(Ordering::SeqCst),
            1,
            "release ran more than once across close/close/drop"
        );
    }

    #[test]
    fn drop_is_the_backstop_release() {
        {
            let _owned = Owned::open(XnNodeHandle::from_raw(9), drop_counting_release).unwrap();
        }
        assert_eq!(DROP_RELEASES.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn get_fails_after_close() {
        let owned = Owned::open(XnNodeHandle::from_raw(3), noop_release).unwrap();
        assert!(owned.get().is_ok());
        owned.close();
        assert!(matches!(owned.get(), Err(OpenNiError::AlreadyDisposed)));
    }
}
