//! Cookie-based session lookup for server-rendered pages.
//!
//! Sessions are stored and created by the login flow; this module wires the
//! `tower-sessions` layer so handlers can read them, and defines the payload
//! handlers look for.
//!
//! # Feature Flags
//!
//! - `session-memory`: In-memory session store (default)
//!
//! ```rust,ignore
//! use realm_pages::session::create_memory_session_layer;
//!
//! let app = Router::new()
//!     .route("/admin", get(admin_page))
//!     .layer(create_memory_session_layer(&config.session));
//! ```

mod config;
mod extractors;

pub use config::SessionConfig;
pub use extractors::{current_session, CurrentSession, PageSession, PAGE_SESSION_KEY};

pub use tower_sessions::{Expiry, Session, SessionManagerLayer};

#[cfg(feature = "session-memory")]
pub use tower_sessions_memory_store::MemoryStore;

use time::Duration;
use tower_sessions::cookie::SameSite;

/// Cookie expiry policy for the given configuration.
fn expiry(config: &SessionConfig) -> Expiry {
    if config.expiry_secs == 0 {
        Expiry::OnSessionEnd
    } else {
        Expiry::OnInactivity(Duration::seconds(config.expiry_secs as i64))
    }
}

fn same_site(config: &SessionConfig) -> SameSite {
    match config.same_site.to_lowercase().as_str() {
        "strict" => SameSite::Strict,
        "none" => SameSite::None,
        _ => SameSite::Lax,
    }
}

/// Create a `SessionManagerLayer` over the given store from configuration.
pub fn create_session_layer<S>(store: S, config: &SessionConfig) -> SessionManagerLayer<S>
where
    S: tower_sessions::SessionStore + Clone,
{
    let mut layer = SessionManagerLayer::new(store)
        .with_name(config.cookie_name.clone())
        .with_expiry(expiry(config))
        .with_secure(config.secure)
        .with_http_only(config.http_only)
        .with_same_site(same_site(config))
        .with_path(config.cookie_path.clone());

    if let Some(domain) = config.cookie_domain.clone() {
        layer = layer.with_domain(domain);
    }

    layer
}

/// Create an in-memory session layer (development and tests).
#[cfg(feature = "session-memory")]
pub fn create_memory_session_layer(config: &SessionConfig) -> SessionManagerLayer<MemoryStore> {
    create_session_layer(MemoryStore::default(), config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expiry_on_session_end() {
        let config = SessionConfig {
            expiry_secs: 0,
            ..SessionConfig::default()
        };
        assert!(matches!(expiry(&config), Expiry::OnSessionEnd));
    }

    #[test]
    fn test_expiry_on_inactivity() {
        let config = SessionConfig::default();
        assert!(matches!(
            expiry(&config),
            Expiry::OnInactivity(d) if d == Duration::seconds(86400)
        ));
    }

    #[test]
    fn test_same_site_parsing() {
        let mut config = SessionConfig::default();
        assert_eq!(same_site(&config), SameSite::Lax);
        config.same_site = "Strict".to_string();
        assert_eq!(same_site(&config), SameSite::Strict);
        config.same_site = "none".to_string();
        assert_eq!(same_site(&config), SameSite::None);
        config.same_site = "bogus".to_string();
        assert_eq!(same_site(&config), SameSite::Lax);
    }
}
