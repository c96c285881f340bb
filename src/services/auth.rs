//! Sign-in, registration, and sign-out flows.
//!
//! ARCHITECTURE
//! ============
//! The backend only hands out a token; the user record the route guard needs
//! comes from a follow-up `GET /users/me`. These helpers run that two-step
//! exchange and leave storage holding both records, or neither on failure.

use thiserror::Error;

use crate::net::api::ApiClient;
use crate::net::types::{ApiError, Token, User};
use crate::state::session::SessionError;
use crate::storage::StorageError;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Session(#[from] SessionError),

    /// The backend issued a token type this client cannot send.
    #[error("unsupported token type '{0}'")]
    UnsupportedTokenType(String),
}

impl From<StorageError> for AuthError {
    fn from(e: StorageError) -> Self {
        Self::Session(SessionError::Storage(e))
    }
}

fn check_token_type(token: &Token) -> Result<(), AuthError> {
    if token.token_type.eq_ignore_ascii_case("bearer") {
        Ok(())
    } else {
        Err(AuthError::UnsupportedTokenType(token.token_type.clone()))
    }
}

/// Store `token`, fetch the user it belongs to, and store that too.
async fn establish(api: &ApiClient, token: Token) -> Result<User, AuthError> {
    check_token_type(&token)?;
    let session = api.session();
    session.set_token(&token.access_token)?;
    let stored = match api.auth().current_user().await {
        Ok(user) => session.set_user(&user).map(|()| user).map_err(AuthError::from),
        Err(e) => Err(e.into()),
    };
    match stored {
        Ok(user) => {
            tracing::info!(login = %user.login, is_superuser = user.is_superuser, "signed in");
            Ok(user)
        }
        Err(e) => {
            session.clear()?;
            Err(e)
        }
    }
}

/// Log in with `login`/`password` and persist the resulting session.
///
/// # Errors
///
/// Returns the API error (401 for bad credentials) or a storage failure.
/// On any failure no session is left behind.
pub async fn sign_in(api: &ApiClient, login: &str, password: &str) -> Result<User, AuthError> {
    let token = api.auth().login(login, password).await?;
    establish(api, token).await
}

/// Create an account, then persist the session the backend issues for it.
///
/// # Errors
///
/// Returns the API error (400 when the login is taken) or a storage failure.
pub async fn register(api: &ApiClient, login: &str, password: &str) -> Result<User, AuthError> {
    let token = api.auth().register(login, password).await?;
    establish(api, token).await
}

/// Forget the stored token and user record. The cart survives sign-out.
///
/// # Errors
///
/// Propagates storage write failures.
pub fn sign_out(api: &ApiClient) -> Result<(), AuthError> {
    api.session().clear()?;
    tracing::info!("signed out");
    Ok(())
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
