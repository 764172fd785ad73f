//! Two-phase staging of fixed-layout records for native calls.
//!
//! Flat records are passed to the middleware by plain reference. The
//! metadata records are different: an outer record embeds a pointer to an
//! inner one (`depth -> map -> output`), and the middleware writes through
//! the whole chain. [`Marshaler`] stages one record at a stable heap
//! address, patches child pointers before the parent copy is taken, and for
//! fetch-style calls copies the native buffer back into the source on drop.
//! Children are torn down after their parent, so the parent's copy-out
//! happens while every address it embeds is still alive.

use std::ffi::c_void;

/// A record staged in native-layout memory for the duration of one call.
pub(crate) trait Marshaled {
    /// Address of the staged buffer, for embedding into a parent record.
    fn native(&mut self) -> *mut c_void;
}

/// Stages a copy of `*src` on the heap. With `pass_out`, the (possibly
/// native-written) buffer is copied back into `src` when the marshaler is
/// dropped; without it the transfer is write-only and nothing flows back.
pub(crate) struct Marshaler<'a, T: Copy> {
    native: Box<T>,
    back: Option<&'a mut T>,
    // Children stay alive (and copy out) after the parent; declared last so
    // the parent's Drop body runs first.
    _inner: Option<Box<dyn Marshaled + 'a>>,
}

impl<'a, T: Copy> Marshaler<'a, T> {
    pub fn new(src: &'a mut T, pass_out: bool) -> Self {
        Self::with_inner(src, pass_out, None)
    }

    /// Stage `*src`, keeping `inner` alive underneath it. Callers must have
    /// already patched the pointer field in `*src` with the child's
    /// [`Marshaled::native`] address; the copy taken here freezes it.
    pub fn with_inner(
        src: &'a mut T,
        pass_out: bool,
        inner: Option<Box<dyn Marshaled + 'a>>,
    ) -> Self {
        let native = Box::new(*src);
        Self {
            native,
            back: if pass_out { Some(src) } else { None },
            _inner: inner,
        }
    }

    pub fn as_mut_ptr(&mut self) -> *mut T {
        &mut *self.native
    }
}

impl<T: Copy> Marshaled for Marshaler<'_, T> {
    fn native(&mut self) -> *mut c_void {
        self.as_mut_ptr() as *mut c_void
    }
}

impl<T: Copy> Drop for Marshaler<'_, T> {
    fn drop(&mut self) {
        if let Some(dst) = self.back.take() {
            *dst = *self.native;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy, PartialEq, Debug)]
    struct Inner {
        value: u64,
    }

    #[derive(Clone, Copy)]
    struct Outer {
        inner: *mut Inner,
        tag: u32,
    }

    #[test]
    fn pass_out_copies_back_on_drop() {
        let mut rec = Inner { value: 1 };
        {
            let mut m = Marshaler::new(&mut rec, true);
            unsafe {
                (*m.as_mut_ptr()).value = 42;
            }
        }
        assert_eq!(rec.value, 42);
    }

    #[test]
    fn write_only_marshaler_never_copies_back() {
        let mut rec = Inner { value: 1 };
        {
            let mut m = Marshaler::new(&mut rec, false);
            unsafe {
                (*m.as_mut_ptr()).value = 42;
            }
        }
        assert_eq!(rec.value, 1, "pass_out=false must not flow data back");
    }

    #[test]
    fn chained_records_see_the_child_address_and_copy_out_in_order() {
        let mut inner = Inner { value: 5 };
        let mut outer = Outer {
            inner: std::ptr::null_mut(),
            tag: 0,
        };
        {
            let mut child = Box::new(Marshaler::new(&mut inner, true));
            outer.inner = child.native() as *mut Inner;
            let mut parent = Marshaler::with_inner(&mut outer, true, Some(child));
            // The staged parent must embed the child's staged address.
            unsafe {
                let p = parent.as_mut_ptr();
                assert!(!(*p).inner.is_null());
                // Simulate the native side writing through the chain.
                (*(*p).inner).value = 77;
                (*p).tag = 9;
            }
        }
        assert_eq!(outer.tag, 9);
        assert_eq!(inner.value, 77, "child copy-out must run after parent's");
    }

    #[test]
    fn scalar_round_trip_is_exact() {
        #[derive(Clone, Copy, PartialEq, Debug)]
        struct Header {
            timestamp: u64,
            frame_id: u32,
            data_size: u32,
        }
        let original = Header {
            timestamp: 0x0102_0304_0506_0708,
            frame_id: 314,
            data_size: 640 * 480 * 2,
        };
        let mut rec = original;
        {
            let _m = Marshaler::new(&mut rec, true);
        }
        assert_eq!(rec, original);
    }
}
