//! Static route table for the storefront pages.
//!
//! Each route carries the access requirements the guard enforces. Static
//! redirects (`/` to `/login`) are part of the table and are resolved before
//! the guard runs.

pub mod guard;

pub const ROOT_PATH: &str = "/";
pub const LOGIN_PATH: &str = "/login";
pub const SHOP_PATH: &str = "/shop";
pub const CART_PATH: &str = "/cart";
pub const ADMIN_PATH: &str = "/admin";

/// Access requirements attached to a route.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteMeta {
    pub requires_auth: bool,
    pub requires_admin: bool,
}

impl RouteMeta {
    pub const PUBLIC: Self = Self { requires_auth: false, requires_admin: false };
    pub const AUTH: Self = Self { requires_auth: true, requires_admin: false };
    pub const ADMIN: Self = Self { requires_auth: true, requires_admin: true };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub path: &'static str,
    pub name: Option<&'static str>,
    pub redirect: Option<&'static str>,
    pub meta: RouteMeta,
}

pub const ROUTES: &[Route] = &[
    Route { path: ROOT_PATH, name: None, redirect: Some(LOGIN_PATH), meta: RouteMeta::PUBLIC },
    Route { path: LOGIN_PATH, name: Some("Login"), redirect: None, meta: RouteMeta::PUBLIC },
    Route { path: SHOP_PATH, name: Some("Shop"), redirect: None, meta: RouteMeta::AUTH },
    Route { path: CART_PATH, name: Some("Cart"), redirect: None, meta: RouteMeta::AUTH },
    Route { path: ADMIN_PATH, name: Some("Admin"), redirect: None, meta: RouteMeta::ADMIN },
];

/// Strip query string, fragment, and trailing slashes (except for `/`).
#[must_use]
pub fn normalize_path(path: &str) -> &str {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    let path = path.get(..end).unwrap_or(path);
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() { ROOT_PATH } else { trimmed }
}

/// Look up the route for `path`, ignoring ASCII case. Unknown paths have no route.
#[must_use]
pub fn find_route(path: &str) -> Option<&'static Route> {
    let path = normalize_path(path);
    ROUTES.iter().find(|route| route.path.eq_ignore_ascii_case(path))
}

/// Requirements for `path`; unknown paths are public.
#[must_use]
pub fn meta_for(path: &str) -> RouteMeta {
    find_route(path).map_or(RouteMeta::PUBLIC, |route| route.meta)
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
