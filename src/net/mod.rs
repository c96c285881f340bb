//! Networking modules for the shop REST backend.
//!
//! SYSTEM CONTEXT
//! ==============
//! `api` issues the HTTP calls and injects the bearer token; `types` defines
//! the wire schema and the error surface callers match on.

pub mod api;
pub mod types;
