//! The authenticated session, as seen by the gallery.
//!
//! Sign-in itself happens elsewhere. The gallery only needs to know whether a
//! session is present and who it belongs to, so a [`Session`] is an access
//! token plus the [`User`] the identity service resolved it to. It is passed
//! explicitly into every run; nothing here is global.

use serde::{Deserialize, Serialize};
use std::future::Future;
use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("User lookup failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Identity service returned {status}: {message}")]
    Status { status: u16, message: String },
}

impl AuthError {
    /// Whether the service rejected the token itself (as opposed to failing).
    pub fn is_rejected_token(&self) -> bool {
        matches!(self, AuthError::Status { status: 401 | 403, .. })
    }
}

/// The signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// An authenticated session: the bearer token and who it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub access_token: String,
    pub user: User,
}

/// Resolves an access token to its user.
pub trait SessionSource: Sync {
    fn current_user(
        &self,
        access_token: &str,
    ) -> impl Future<Output = Result<User, AuthError>> + Send;
}

/// Turn an optional access token into an optional session.
///
/// No token, or a token the identity service rejects, means "signed out"
/// rather than an error. Transport failures still propagate.
pub async fn resolve_session<S: SessionSource>(
    source: &S,
    access_token: Option<&str>,
) -> Result<Option<Session>, AuthError> {
    let Some(token) = access_token.map(str::trim).filter(|t| !t.is_empty()) else {
        return Ok(None);
    };
    match source.current_user(token).await {
        Ok(user) => Ok(Some(Session {
            access_token: token.to_string(),
            user,
        })),
        Err(e) if e.is_rejected_token() => {
            warn!("Access token rejected, treating as signed out: {e}");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}
