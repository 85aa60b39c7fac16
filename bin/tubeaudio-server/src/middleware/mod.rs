//! HTTP middleware stack.
//!
//! - [`forwarded`] resolves the real client behind a reverse proxy.
//! - [`trace`] opens a per-request span keyed by an `x-trace-id`.

pub mod forwarded;
pub mod trace;
