//! Per-candidate enumeration failure collections.

use std::fmt;

use crate::error::{EnumerationError, Status};
use crate::ffi;
use crate::resource::Owned;
use crate::types::NodeDescription;
use crate::Result;

fn release_errors(handle: ffi::XnEnumerationErrorsHandle) {
    unsafe { ffi::xnEnumerationErrorsFree(handle) }
}

/// Collection of per-candidate failures populated by enumeration calls.
pub struct EnumerationErrors {
    owned: Owned<ffi::XnEnumerationErrorsHandle>,
}

impl EnumerationErrors {
    pub fn new() -> Result<EnumerationErrors> {
        let mut handle = ffi::XnEnumerationErrorsHandle::invalid();
        ffi::check(unsafe { ffi::xnEnumerationErrorsAllocate(&mut handle) })?;
        Ok(EnumerationErrors {
            owned: Owned::open(handle, release_errors)?,
        })
    }

    pub(crate) fn handle(&self) -> Result<ffi::XnEnumerationErrorsHandle> {
        self.owned.get()
    }

    pub fn is_empty(&self) -> bool {
        self.to_vec().is_empty()
    }

    /// Snapshot the collection into managed form.
    pub fn to_vec(&self) -> Vec<EnumerationError> {
        let Ok(handle) = self.owned.get() else {
            return Vec::new();
        };
        let mut out = Vec::new();
        unsafe {
            let mut it = ffi::xnEnumerationErrorsGetFirst(handle);
            while ffi::xnEnumerationErrorsIteratorIsValid(it) != ffi::XN_FALSE {
                let descr = ffi::xnEnumerationErrorsGetCurrentDescription(it);
                let status = ffi::xnEnumerationErrorsGetCurrentError(it);
                if !descr.is_null() {
                    out.push(EnumerationError {
                        description: NodeDescription::from_native(*descr),
                        status: Status::from_raw(status),
                    });
                }
                it = ffi::xnEnumerationErrorsGetNext(it);
            }
        }
        out
    }

    /// Idempotent; frees the native collection on the first call.
    pub fn close(&mut self) {
        self.owned.close();
    }
}

// One failed candidate per line, like the middleware's own error dump.
impl fmt::Display for EnumerationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.to_vec().iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", err)?;
        }
        Ok(())
    }
}
