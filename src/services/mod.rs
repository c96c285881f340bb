//! Multi-step flows built on the API client and session storage.

pub mod auth;
