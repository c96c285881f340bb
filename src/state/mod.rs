//! Client-side state persisted in storage.
//!
//! SYSTEM CONTEXT
//! ==============
//! `cart` owns the `cart` key, `session` owns the `token` and `user` keys.
//! Both are cheap handles over the same shared storage.

pub mod cart;
pub mod session;
