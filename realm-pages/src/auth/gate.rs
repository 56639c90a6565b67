//! Admin check and authentication redirect

use oauth2::url::Url;
use std::fmt;
use std::sync::Arc;

use super::provider::{provider_from_config, AuthenticationProvider};
use crate::config::AuthConfig;
use crate::error::{Error, Result};
use crate::request::RequestInfo;
use crate::session::PageSession;
use crate::templates::ResponseSink;

/// Query parameter carrying the post-login destination.
pub const CONTINUE_PARAM: &str = "continue";

/// What the current session says about admin access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminStatus {
    NoSession,
    NotAdmin,
    Admin,
}

impl AdminStatus {
    pub fn of(session: Option<&PageSession>) -> Self {
        match session {
            None => Self::NoSession,
            Some(s) if s.is_admin() => Self::Admin,
            Some(_) => Self::NotAdmin,
        }
    }

    pub fn is_admin(self) -> bool {
        self == Self::Admin
    }
}

/// Decides whether a request may see admin pages and, if not, sends the
/// visitor to log in.
#[derive(Clone)]
pub struct AuthGate {
    provider: Arc<dyn AuthenticationProvider>,
}

impl AuthGate {
    pub fn new(provider: impl AuthenticationProvider + 'static) -> Self {
        Self {
            provider: Arc::new(provider),
        }
    }

    /// Gate over the provider selected in `[auth]`.
    pub fn from_config(config: &AuthConfig) -> Result<Self> {
        let provider = provider_from_config(config)?;
        tracing::info!(provider = provider.name(), "Auth gate initialized");
        Ok(Self {
            provider: Arc::from(provider),
        })
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Check for an admin session.
    ///
    /// Returns `Ok(false)` after redirecting `response` to log in; the caller
    /// must stop and write nothing else.
    pub fn is_admin(
        &self,
        request: &RequestInfo,
        session: Option<&PageSession>,
        response: &mut dyn ResponseSink,
    ) -> Result<bool> {
        let status = AdminStatus::of(session);
        if status.is_admin() {
            return Ok(true);
        }

        tracing::info!(
            realm = request.realm(),
            path = request.url().path(),
            status = ?status,
            "Admin access denied"
        );
        self.authenticate(request, response)?;
        Ok(false)
    }

    /// Redirect `response` to the provider's authentication URL.
    pub fn authenticate(&self, request: &RequestInfo, response: &mut dyn ResponseSink) -> Result<()> {
        let target = self.authenticate_url(request)?;
        response.redirect(&target);
        Ok(())
    }

    /// Provider authentication URL for `request`.
    pub fn authenticate_url(&self, request: &RequestInfo) -> Result<String> {
        let return_url = login_return_url(request.url(), request.realm())?;
        let target = self.provider.authenticate_url(request, &return_url)?;
        tracing::debug!(provider = self.provider.name(), target = %target, "Authentication redirect");
        Ok(target)
    }
}

impl fmt::Debug for AuthGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthGate")
            .field("provider", &self.provider.name())
            .finish()
    }
}

/// Realm login endpoint for `request_url`, with the request path as `continue`.
///
/// `https://host/admin/x?y=1` in realm `beta` becomes
/// `https://host/realms/beta/login?continue=%2Fadmin%2Fx`.
///
/// The path is carried exactly as sent, still percent-encoded, so `/a%20b`
/// becomes `continue=%2Fa%2520b` and decodes back to `/a%20b`.
pub fn login_return_url(request_url: &Url, realm: &str) -> Result<String> {
    let destination = request_url.path();

    let mut login = request_url
        .join(&format!("/realms/{}/login", realm))
        .map_err(|e| Error::BadRequest(format!("Cannot build login URL from '{}': {}", request_url, e)))?;
    login
        .query_pairs_mut()
        .clear()
        .append_pair(CONTINUE_PARAM, destination);

    Ok(login.into())
}
