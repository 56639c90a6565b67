//! Page handlers
//!
//! [`PageHandler`] is the extractor a page route takes. It composes the
//! shared [`AuthGate`](crate::auth::AuthGate) and
//! [`TemplateRenderer`](crate::templates::TemplateRenderer) with the facts of
//! the current request, and turns into the response when returned.
//!
//! # Example
//!
//! ```rust,ignore
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
//! let app = Router::new()
//!     .route("/realms/{realm}/admin", get(admin_index))
//!     .with_state(state);
//! ```

mod page;

pub use page::PageHandler;
