//! Admin gating and authentication redirects
//!
//! Pages that require admin access ask the [`AuthGate`] first. A request
//! without an admin session is redirected to an external authentication
//! provider, which eventually returns the visitor to the realm login endpoint:
//!
//! ```text
//! GET https://play.example.com/admin/empire?id=7         (realm "beta", no session)
//!  -> login endpoint  https://play.example.com/realms/beta/login?continue=%2Fadmin%2Fempire
//!  -> 302 to          provider.authenticate_url(request, login endpoint)
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use realm_pages::auth::{AuthGate, LoginPageProvider};
//!
//! let gate = AuthGate::new(LoginPageProvider);
//! if !gate.is_admin(&request, session.as_ref(), &mut response)? {
//!     return Ok(response);
//! }
//! ```

mod gate;
mod provider;

pub use gate::{login_return_url, AdminStatus, AuthGate, CONTINUE_PARAM};
pub use provider::{provider_from_config, AuthenticationProvider, LoginPageProvider, OpenIdProvider};
