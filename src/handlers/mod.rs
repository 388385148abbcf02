//! Route handlers for `/action/{id}`.
//!
//! Handlers are stateless: each call builds whatever it returns from scratch.

mod action;

pub use action::{acknowledge_removal, create_stub_action, dump_request, MAX_DUMP_BODY_BYTES};
