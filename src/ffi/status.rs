//! Status word checking at native call sites.

use crate::error::{OpenNiError, Status};

use super::types::{XnStatus, XN_STATUS_OK};

/// Convert a native status word into a `Result`.
///
/// Every native call site checks its status immediately; failures are
/// raised synchronously, never batched.
pub(crate) fn check(status: XnStatus) -> crate::Result<()> {
    if status == XN_STATUS_OK {
        Ok(())
    } else {
        Err(OpenNiError::Status(Status::from_raw(status)))
    }
}
