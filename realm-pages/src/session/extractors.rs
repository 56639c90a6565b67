//! Read-only access to the page session.
//!
//! Pages never create or modify sessions; they only ask two questions of the
//! current one: is the visitor authenticated, and are they an admin.

use axum::{extract::FromRequestParts, http::request::Parts};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use tower_sessions::Session;

/// Key under which the login flow stores [`PageSession`].
pub const PAGE_SESSION_KEY: &str = "_page_session";

/// Session payload written by the login flow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSession {
    /// Authenticated user ID (None if not logged in).
    pub user_id: Option<String>,
    /// Email address reported by the identity provider.
    #[serde(default)]
    pub email: Option<String>,
    /// Whether the user has elevated privileges.
    #[serde(default)]
    pub admin: bool,
}

impl PageSession {
    /// Session for an authenticated, non-admin user.
    #[must_use]
    pub fn user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            email: None,
            admin: false,
        }
    }

    /// Session for an authenticated admin.
    #[must_use]
    pub fn admin(user_id: impl Into<String>) -> Self {
        Self {
            admin: true,
            ..Self::user(user_id)
        }
    }

    /// Check if the user is authenticated.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.user_id.is_some()
    }

    /// Check if the user is an authenticated admin.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.is_authenticated() && self.admin
    }
}

/// Look up the current session, treating every failure as "no session".
///
/// A missing `SessionManagerLayer`, a store error, or an undecodable payload
/// all yield `None`; the caller then sends the visitor to log in.
pub async fn current_session(parts: &Parts) -> Option<PageSession> {
    let session = parts.extensions.get::<Session>()?;

    match session.get::<PageSession>(PAGE_SESSION_KEY).await {
        Ok(found) => found,
        Err(e) => {
            tracing::debug!("Ignoring unreadable session: {}", e);
            None
        }
    }
}

/// Extractor for the optional current session.
///
/// Never rejects: absent or unreadable sessions come through as `None`.
#[derive(Debug, Clone, Default)]
pub struct CurrentSession(pub Option<PageSession>);

impl<S> FromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(current_session(parts).await))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    #[test]
    fn test_page_session_states() {
        let anonymous = PageSession::default();
        assert!(!anonymous.is_authenticated());
        assert!(!anonymous.is_admin());

        let user = PageSession::user("user-1");
        assert!(user.is_authenticated());
        assert!(!user.is_admin());

        let admin = PageSession::admin("user-2");
        assert!(admin.is_authenticated());
        assert!(admin.is_admin());
    }

    #[test]
    fn test_admin_flag_without_user_is_not_admin() {
        let session = PageSession {
            user_id: None,
            email: None,
            admin: true,
        };
        assert!(!session.is_admin());
    }

    #[test]
    fn test_page_session_deserialize_defaults() {
        let session: PageSession = serde_json::from_str(r#"{"user_id": "abc"}"#).unwrap();
        assert_eq!(session, PageSession::user("abc"));
    }

    #[tokio::test]
    async fn test_current_session_without_layer_is_none() {
        let (parts, _) = Request::get("/admin").body(()).unwrap().into_parts();
        assert!(current_session(&parts).await.is_none());
    }
}
