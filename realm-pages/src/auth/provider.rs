//! Authentication provider trait and the built-in providers

use oauth2::{basic::BasicClient, AuthUrl, ClientId, CsrfToken, EndpointSet, RedirectUrl, Scope};
use std::borrow::Cow;

use crate::config::{AuthConfig, AuthProviderKind, OpenIdConfig};
use crate::error::{Error, Result};
use crate::request::RequestInfo;

/// Produces the URL a visitor is sent to when they must log in.
///
/// Implementations run in-process and must not block.
pub trait AuthenticationProvider: Send + Sync {
    /// Provider name, for logs.
    fn name(&self) -> &str;

    /// Build the provider's authentication URL.
    ///
    /// `return_url` is the realm login endpoint the provider should come back
    /// to; it already carries the `continue` parameter.
    fn authenticate_url(&self, request: &RequestInfo, return_url: &str) -> Result<String>;
}

/// OpenID Connect authorization-code entry point.
///
/// Only the authorization redirect is built here. Code exchange and session
/// creation belong to the realm login endpoint.
#[derive(Clone, Debug)]
pub struct OpenIdProvider {
    client: BasicClient<EndpointSet>,
    scopes: Vec<String>,
}

impl OpenIdProvider {
    /// Create a provider from the `[auth.openid]` section
    pub fn new(config: &OpenIdConfig) -> Result<Self> {
        let auth_url = AuthUrl::new(config.auth_url.clone())
            .map_err(|e| Error::Internal(format!("Invalid auth URL: {}", e)))?;

        let client = BasicClient::new(ClientId::new(config.client_id.clone())).set_auth_uri(auth_url);

        Ok(Self {
            client,
            scopes: config.scopes.clone(),
        })
    }
}

impl AuthenticationProvider for OpenIdProvider {
    fn name(&self) -> &str {
        "openid"
    }

    fn authenticate_url(&self, _request: &RequestInfo, return_url: &str) -> Result<String> {
        let redirect = RedirectUrl::new(return_url.to_string())
            .map_err(|e| Error::Auth(format!("Invalid return URL: {}", e)))?;

        let (url, _state) = self
            .client
            .authorize_url(CsrfToken::new_random)
            .add_scopes(self.scopes.iter().cloned().map(Scope::new))
            .set_redirect_uri(Cow::Owned(redirect))
            .url();

        Ok(url.to_string())
    }
}

/// Sends visitors straight to the realm login endpoint.
#[derive(Clone, Copy, Debug, Default)]
pub struct LoginPageProvider;

impl AuthenticationProvider for LoginPageProvider {
    fn name(&self) -> &str {
        "login_page"
    }

    fn authenticate_url(&self, _request: &RequestInfo, return_url: &str) -> Result<String> {
        Ok(return_url.to_string())
    }
}

/// Build the provider selected by `auth.provider`.
pub fn provider_from_config(config: &AuthConfig) -> Result<Box<dyn AuthenticationProvider>> {
    match config.provider {
        AuthProviderKind::Openid => Ok(Box::new(OpenIdProvider::new(&config.openid)?)),
        AuthProviderKind::LoginPage => Ok(Box::new(LoginPageProvider)),
    }
}
