//! Storefront client: REST API wrapper, persisted cart, and route guard.
//!
//! SYSTEM CONTEXT
//! ==============
//! Everything here talks to the outside world through two seams: the shop's
//! REST backend (`net`) and a persistent key-value store (`storage`). The
//! cart, session, and route guard only ever read and write storage keys, so
//! the same code runs against browser `localStorage` (feature `hydrate`), a
//! JSON file (the CLI), or memory (tests).

pub mod config;
pub mod net;
pub mod router;
pub mod services;
pub mod state;
pub mod storage;

pub use config::ClientConfig;
pub use net::api::ApiClient;
pub use net::types::ApiError;
pub use router::guard::{Navigation, RouteGuard};
pub use state::cart::{CartError, CartManager, LineItem};
pub use state::session::{Session, SessionError};
pub use storage::{MemoryStorage, SharedStorage, Storage, StorageError};
