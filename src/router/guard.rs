//! Navigation guard enforcing login and admin requirements.
//!
//! SYSTEM CONTEXT
//! ==============
//! Runs synchronously before every navigation. It trusts token presence; the
//! token is never validated against the backend here. Expired tokens only
//! show up later as 401s from the API client.
//!
//! Decision order:
//! 1. route requires auth and no token -> `/login`
//! 2. route requires admin: superuser -> allow, plain user -> `/shop`,
//!    no user record -> `/login`
//! 3. otherwise allow

use super::{LOGIN_PATH, RouteMeta, SHOP_PATH, find_route, meta_for, normalize_path};
use crate::state::session::Session;

/// Guard outcome for one navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Allow,
    Redirect(&'static str),
}

/// Pure decision over what storage currently holds.
///
/// `superuser` is `None` when no user record exists.
#[must_use]
pub fn decide(meta: RouteMeta, has_token: bool, superuser: Option<bool>) -> Navigation {
    if meta.requires_auth && !has_token {
        return Navigation::Redirect(LOGIN_PATH);
    }
    if meta.requires_admin {
        return match superuser {
            Some(true) => Navigation::Allow,
            Some(false) => Navigation::Redirect(SHOP_PATH),
            None => Navigation::Redirect(LOGIN_PATH),
        };
    }
    Navigation::Allow
}

#[derive(Clone)]
pub struct RouteGuard {
    session: Session,
}

impl RouteGuard {
    #[must_use]
    pub fn new(session: Session) -> Self {
        Self { session }
    }

    /// Evaluate the guard for a route's requirements.
    ///
    /// Unreadable storage counts as "no token"; an unreadable user record
    /// counts as "no user". Both end at the login page.
    #[must_use]
    pub fn check(&self, meta: RouteMeta) -> Navigation {
        let has_token = match self.session.is_authenticated() {
            Ok(has_token) => has_token,
            Err(e) => {
                tracing::warn!(error = %e, "token unreadable; treating as signed out");
                false
            }
        };
        let superuser = if meta.requires_admin {
            match self.session.superuser_flag() {
                Ok(flag) => flag,
                Err(e) => {
                    tracing::warn!(error = %e, "user record unreadable; treating as absent");
                    None
                }
            }
        } else {
            None
        };
        decide(meta, has_token, superuser)
    }

    /// Resolve `path` against the route table and run the guard.
    ///
    /// Returns `Redirect` whenever the final destination differs from
    /// `path`, whether from a static table redirect or from the guard.
    #[must_use]
    pub fn navigate(&self, path: &str) -> Navigation {
        let requested = normalize_path(path);
        if let Some(to) = find_route(requested).and_then(|route| route.redirect) {
            return match self.check(meta_for(to)) {
                Navigation::Allow => Navigation::Redirect(to),
                denied => denied,
            };
        }
        let decision = self.check(meta_for(requested));
        if let Navigation::Redirect(to) = decision {
            tracing::debug!(path = requested, to, "navigation redirected");
        }
        decision
    }
}

#[cfg(test)]
#[path = "guard_test.rs"]
mod tests;
