//! Server-side template rendering for pages.
//!
//! Templates are loaded by path from a source directory (`data/tmpl` by
//! default) and executed with minijinja. Three display filters are available
//! to every template:
//!
//! | Filter        | Template spelling | Input                       |
//! |---------------|-------------------|-----------------------------|
//! | `number`      | `number`          | any number, or none         |
//! | `attr-escape` | `attr_escape`     | anything with a string form |
//! | `local-date`  | `local_date`      | a [`Timestamp`]             |
//!
//! ```html
//! <!-- data/tmpl/admin/empire.html -->
//! <h1 title="{{ empire.name|attr_escape }}">{{ empire.name }}</h1>
//! <p>{{ empire.cash|number }} credits, last seen {{ empire.last_seen|local_date }}</p>
//! ```
//!
//! ```rust,ignore
//! use realm_pages::templates::{FilterRegistry, RenderContext, TemplateRenderer};
//!
//! let renderer = TemplateRenderer::new(&config.templates, &FilterRegistry::standard());
//!
//! let ctx = RenderContext::new()
//!     .with("empire", &empire)
//!     .with_realm("beta");
//! let html = renderer.render_to_string("admin/empire.html", &ctx)?;
//! ```

mod context;
pub mod filters;
mod registry;
mod renderer;
mod response;

pub use context::{RenderContext, REALM_KEY};
pub use filters::{NumberValue, Timestamp};
pub use registry::{template_identifier, FilterFn, FilterRegistry, FilterRegistryBuilder};
pub use renderer::TemplateRenderer;
pub use response::{PageResponse, ResponseSink, TEXT_HTML, TEXT_PLAIN};
