//! Application state management

use std::sync::Arc;

use crate::auth::AuthGate;
use crate::config::Config;
use crate::error::Result;
use crate::templates::{FilterRegistry, TemplateRenderer};

/// State shared by every page handler
///
/// Built once at startup; the renderer, its filters and the auth gate are
/// read-only afterwards. Cloning is cheap.
#[derive(Clone, Debug)]
pub struct AppState {
    config: Arc<Config>,
    renderer: Arc<TemplateRenderer>,
    gate: Arc<AuthGate>,
}

impl AppState {
    pub fn new(config: Config, renderer: TemplateRenderer, gate: AuthGate) -> Self {
        Self {
            config: Arc::new(config),
            renderer: Arc::new(renderer),
            gate: Arc::new(gate),
        }
    }

    /// Build the renderer (standard filters) and gate from configuration.
    pub fn from_config(config: Config) -> Result<Self> {
        let renderer = TemplateRenderer::new(&config.templates, &FilterRegistry::standard());
        let gate = AuthGate::from_config(&config.auth)?;
        Ok(Self::new(config, renderer, gate))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn renderer(&self) -> &Arc<TemplateRenderer> {
        &self.renderer
    }

    pub fn gate(&self) -> &Arc<AuthGate> {
        &self.gate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.templates.base_path = dir.path().to_path_buf();

        let state = AppState::from_config(config).unwrap();
        assert_eq!(state.renderer().root(), Some(dir.path().join("data/tmpl").as_path()));
        assert_eq!(state.gate().provider_name(), "openid");
        assert_eq!(state.config().auth.default_realm, "beta");
    }

    #[test]
    fn test_clone_shares_components() {
        let state = AppState::from_config(Config::default()).unwrap();
        let cloned = state.clone();
        assert!(Arc::ptr_eq(state.renderer(), cloned.renderer()));
        assert!(Arc::ptr_eq(state.gate(), cloned.gate()));
    }
}
