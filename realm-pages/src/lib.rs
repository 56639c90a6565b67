//! # realm-pages
//!
//! Authenticated, realm-aware server-rendered pages on axum.
//!
//! ## Features
//!
//! - **Templates**: minijinja templates loaded from a directory, with the
//!   `number`, `attr-escape` and `local-date` display filters
//! - **Admin gate**: admin-only pages redirect everyone else to an external
//!   authentication provider, carrying the requested path as `continue`
//! - **Realms**: every page knows its realm (`/realms/{realm}/...` or the
//!   configured default) and every template sees it as `realm`
//! - **Sessions**: read-only `tower-sessions` lookup of the login state
//! - **Ambient stack**: figment configuration, JSON tracing, graceful shutdown
//!
//! ## Example
//!
//! ```rust,no_run
//! use realm_pages::prelude::*;
//!
//! async fn admin_index(mut page: PageHandler) -> Result<PageHandler> {
//!     if !page.is_admin()? {
//!         return Ok(page);
//!     }
//!     let ctx = page.context().with("stars", 1204);
//!     page.render("admin/index.html", ctx)?;
//!     Ok(page)
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = Config::load()?;
//!     init_tracing(&config)?;
//!
//!     let state = AppState::from_config(config.clone())?;
//!
//!     let app = Router::new()
//!         .route("/admin", get(admin_index))
//!         .route("/realms/{realm}/admin", get(admin_index))
//!         .layer(create_memory_session_layer(&config.session))
//!         .with_state(state);
//!
//!     Server::new(config).serve(app).await
//! }
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod observability;
pub mod request;
pub mod server;
pub mod session;
pub mod state;
pub mod templates;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::auth::{AuthGate, AuthenticationProvider, LoginPageProvider, OpenIdProvider};
    pub use crate::config::Config;
    pub use crate::error::{Error, Result};
    pub use crate::handlers::PageHandler;
    pub use crate::middleware::require_admin;
    pub use crate::observability::init_tracing;
    pub use crate::request::RequestInfo;
    pub use crate::server::Server;
    pub use crate::session::{create_session_layer, CurrentSession, PageSession};
    pub use crate::state::AppState;
    pub use crate::templates::{
        FilterRegistry, NumberValue, PageResponse, RenderContext, ResponseSink, TemplateRenderer,
        Timestamp,
    };

    #[cfg(feature = "session-memory")]
    pub use crate::session::{create_memory_session_layer, MemoryStore};

    pub use axum::{
        routing::{get, post},
        Router,
    };
}
