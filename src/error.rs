use std::ffi::CStr;
use std::fmt;

use crate::ffi;

/// A native status word: zero is success, anything else packs a
/// `(group, code)` pair into 32 bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Status(ffi::XnStatus);

impl Status {
    pub const OK: Status = Status(ffi::XN_STATUS_OK);

    pub const fn from_raw(raw: ffi::XnStatus) -> Status {
        Status(raw)
    }

    pub const fn make(group: u16, code: u16) -> Status {
        Status(ffi::xn_status_make(group, code))
    }

    pub const fn raw(self) -> ffi::XnStatus {
        self.0
    }

    /// Error group: who defined the code (middleware, OS, vendor).
    pub const fn group(self) -> u16 {
        (self.0 >> 16) as u16
    }

    pub const fn code(self) -> u16 {
        (self.0 & 0xffff) as u16
    }

    pub const fn is_ok(self) -> bool {
        self.0 == ffi::XN_STATUS_OK
    }

    /// Symbolic name, via native lookup.
    pub fn name(self) -> String {
        unsafe { lookup(ffi::xnGetStatusName(self.0)) }
    }

    /// Human-readable description, via native lookup.
    pub fn description(self) -> String {
        unsafe { lookup(ffi::xnGetStatusString(self.0)) }
    }
}

unsafe fn lookup(ptr: *const std::os::raw::c_char) -> String {
    if ptr.is_null() {
        "unknown".to_string()
    } else {
        CStr::from_ptr(ptr).to_string_lossy().into_owned()
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name(), self.description())
    }
}

/// One candidate production tree that failed during enumeration.
#[derive(Debug, Clone)]
pub struct EnumerationError {
    pub description: crate::types::NodeDescription,
    pub status: Status,
}

impl fmt::Display for EnumerationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.description, self.status)
    }
}

/// Errors raised by the binding.
#[derive(Debug, thiserror::Error)]
pub enum OpenNiError {
    /// A native call returned a failure status.
    #[error("native call failed: {0}")]
    Status(Status),

    /// An enumeration call failed; carries the per-candidate failures when
    /// the middleware reported any.
    #[error("enumeration failed: {status}")]
    Enumeration {
        status: Status,
        errors: Vec<EnumerationError>,
    },

    /// Operation attempted with a zero/invalid native handle.
    #[error("invalid native handle")]
    InvalidHandle,

    /// Operation attempted on an object after `close()`.
    #[error("object already disposed")]
    AlreadyDisposed,

    /// The factory was handed a node type tag outside the wrapped set.
    #[error("unsupported node type: {0}")]
    UnsupportedNodeType(i32),
}
