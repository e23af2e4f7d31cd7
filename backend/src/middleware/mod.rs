//! Request middleware.
//!
//! [`Trace`] scopes a trace identifier to each request and logs its outcome.

pub mod trace;

pub use trace::Trace;
