//! The middleware C API surface.
//!
//! This module contains the low-level boundary: opaque handles, bit-exact
//! record layouts, status codes, and the function surface itself. Users
//! should prefer the safe wrappers in the parent modules.
//!
//! Two interchangeable backends provide the functions:
//! - with the `system` feature, `extern "C"` bindings to the installed
//!   native middleware;
//! - by default, an in-process software backend that emulates the
//!   middleware's bookkeeping and synthesizes frames, so everything here is
//!   exercisable without a sensor.

pub mod handles;
mod status;
pub mod types;

#[cfg(not(feature = "system"))]
mod emu;
#[cfg(feature = "system")]
mod system;

#[cfg(not(feature = "system"))]
pub use emu::*;
#[cfg(feature = "system")]
pub use system::*;

pub use handles::*;
pub(crate) use status::check;
pub use types::*;
