//! Template renderer backed by minijinja.

use axum::http::header;
use minijinja::{path_loader, Environment};
use std::path::{Path, PathBuf};

use super::context::RenderContext;
use super::registry::FilterRegistry;
use super::response::{ResponseSink, TEXT_HTML, TEXT_PLAIN};
use crate::config::TemplateConfig;
use crate::error::Result;

/// Renders named templates from a source directory.
///
/// Construct one per process and share it (it is `Send + Sync`); the engine
/// configuration and filters are fixed at construction.
pub struct TemplateRenderer {
    env: Environment<'static>,
    root: Option<PathBuf>,
}

impl TemplateRenderer {
    /// Renderer over the configured template root.
    pub fn new(config: &TemplateConfig, filters: &FilterRegistry) -> Self {
        Self::with_root(config.root(), filters)
    }

    /// Renderer over an explicit template root.
    pub fn with_root(root: impl Into<PathBuf>, filters: &FilterRegistry) -> Self {
        let root = root.into();
        let mut env = Environment::new();
        env.set_loader(path_loader(&root));
        filters.install(&mut env);

        tracing::info!(
            root = %root.display(),
            filters = ?filters.names().collect::<Vec<_>>(),
            "Template renderer initialized"
        );

        Self {
            env,
            root: Some(root),
        }
    }

    /// Renderer over in-memory templates, keyed by path.
    pub fn from_sources<I, N, S>(sources: I, filters: &FilterRegistry) -> Result<Self>
    where
        I: IntoIterator<Item = (N, S)>,
        N: Into<String>,
        S: Into<String>,
    {
        let mut env = Environment::new();
        for (name, source) in sources {
            env.add_template_owned(name.into(), source.into())?;
        }
        filters.install(&mut env);

        Ok(Self { env, root: None })
    }

    /// Template source directory, if loading from disk.
    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    /// Execute `path` against `ctx` and return the generated text.
    pub fn render_to_string(&self, path: &str, ctx: &RenderContext) -> Result<String> {
        tracing::debug!(template = path, "Rendering template");
        let template = self.env.get_template(path)?;
        Ok(template.render(ctx.to_value())?)
    }

    /// Render `path` as an HTML page into `sink`.
    ///
    /// Template and filter failures are returned. A failure writing the
    /// output is logged and discarded; the response may then be incomplete.
    pub fn render(&self, sink: &mut dyn ResponseSink, path: &str, ctx: &RenderContext) -> Result<()> {
        sink.set_content_type(TEXT_HTML);
        sink.set_header(header::CONTENT_TYPE, TEXT_HTML);

        let output = self.render_to_string(path, ctx)?;
        if let Err(e) = sink.write(&output) {
            tracing::error!(template = path, error = %e, "Error rendering template!");
        }
        Ok(())
    }

    /// Write `text` as a plain-text response into `sink`.
    ///
    /// Write failures are logged and discarded.
    pub fn write_text(&self, sink: &mut dyn ResponseSink, text: &str) {
        sink.set_content_type(TEXT_PLAIN);
        sink.set_header(header::CONTENT_TYPE, TEXT_PLAIN);

        if let Err(e) = sink.write(text) {
            tracing::error!(error = %e, "Error writing output!");
        }
    }
}

impl std::fmt::Debug for TemplateRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateRenderer")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}
