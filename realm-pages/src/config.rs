//! Configuration management using Figment
//!
//! Configuration is loaded from multiple sources with the following precedence (highest to lowest):
//! 1. Environment variables (prefix: REALM_PAGES_, nested keys split on `__`)
//! 2. Current working directory: ./config.toml
//! 3. XDG config directory: ~/.config/realm-pages/{service_name}/config.toml
//! 4. System directory: /etc/realm-pages/{service_name}/config.toml
//! 5. Default values

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::session::SessionConfig;

const ENV_PREFIX: &str = "REALM_PAGES_";
const CONFIG_PREFIX: &str = "realm-pages";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Service configuration
    pub service: ServiceConfig,

    /// Template source configuration
    #[serde(default)]
    pub templates: TemplateConfig,

    /// Authentication redirect configuration
    #[serde(default)]
    pub auth: AuthConfig,

    /// Session cookie configuration
    #[serde(default)]
    pub session: SessionConfig,
}

/// Service-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Service name
    pub name: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Environment (dev, staging, production)
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Externally visible base URL (e.g. `https://game.example.com`).
    ///
    /// When set, request URLs are rebuilt from this base instead of the
    /// `Host`/`X-Forwarded-*` headers.
    #[serde(default)]
    pub public_url: Option<String>,

    /// Honor `X-Forwarded-Proto`/`X-Forwarded-Host` from the client.
    ///
    /// Enable only behind a proxy that sets or strips these headers; they
    /// decide the host of the login redirect.
    #[serde(default)]
    pub trust_forwarded_headers: bool,
}

/// Template source configuration
///
/// ```toml
/// [templates]
/// base_path = "/srv/game"
/// dir = "data/tmpl"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateConfig {
    /// Installation base directory
    #[serde(default = "default_base_path")]
    pub base_path: PathBuf,

    /// Template directory, relative to `base_path`
    #[serde(default = "default_template_dir")]
    pub dir: PathBuf,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            base_path: default_base_path(),
            dir: default_template_dir(),
        }
    }
}

impl TemplateConfig {
    /// Absolute path of the template source root.
    ///
    /// Falls back to the joined path unchanged when the current directory
    /// cannot be determined.
    pub fn root(&self) -> PathBuf {
        let joined = self.base_path.join(&self.dir);
        if joined.is_absolute() {
            return joined;
        }
        std::env::current_dir()
            .map(|cwd| cwd.join(&joined))
            .unwrap_or(joined)
    }
}

/// Which authentication provider builds the login redirect
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuthProviderKind {
    /// OpenID/OAuth2 authorization endpoint
    #[default]
    Openid,
    /// The realm login page itself
    LoginPage,
}

/// Authentication redirect configuration
///
/// ```toml
/// [auth]
/// default_realm = "beta"
/// provider = "openid"
///
/// [auth.openid]
/// auth_url = "https://accounts.google.com/o/oauth2/v2/auth"
/// client_id = "my-client-id"
/// scopes = ["openid", "email"]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Realm used for requests outside `/realms/{realm}/...`
    #[serde(default = "default_realm")]
    pub default_realm: String,

    /// Provider used to build the authentication redirect
    #[serde(default)]
    pub provider: AuthProviderKind,

    /// OpenID provider settings
    #[serde(default)]
    pub openid: OpenIdConfig,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            default_realm: default_realm(),
            provider: AuthProviderKind::default(),
            openid: OpenIdConfig::default(),
        }
    }
}

/// OpenID provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenIdConfig {
    /// Authorization endpoint URL
    #[serde(default = "default_openid_auth_url")]
    pub auth_url: String,

    /// OAuth client ID registered with the provider
    #[serde(default)]
    pub client_id: String,

    /// Scopes to request
    #[serde(default = "default_openid_scopes")]
    pub scopes: Vec<String>,
}

impl Default for OpenIdConfig {
    fn default() -> Self {
        Self {
            auth_url: default_openid_auth_url(),
            client_id: String::new(),
            scopes: default_openid_scopes(),
        }
    }
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_environment() -> String {
    "dev".to_string()
}

fn default_base_path() -> PathBuf {
    PathBuf::from(".")
}

fn default_template_dir() -> PathBuf {
    PathBuf::from("data/tmpl")
}

fn default_realm() -> String {
    "beta".to_string()
}

fn default_openid_auth_url() -> String {
    "https://accounts.google.com/o/oauth2/v2/auth".to_string()
}

fn default_openid_scopes() -> Vec<String> {
    vec!["openid".to_string(), "email".to_string()]
}

impl Config {
    /// Load configuration from all sources
    ///
    /// Searches for config files in this order (first found wins per key):
    /// 1. Current working directory: ./config.toml
    /// 2. XDG config directory: ~/.config/realm-pages/{service_name}/config.toml
    /// 3. System directory: /etc/realm-pages/{service_name}/config.toml
    ///
    /// Environment variables (REALM_PAGES_ prefix) override all file-based configs.
    pub fn load() -> Result<Self> {
        let service_name = std::env::current_exe()
            .ok()
            .and_then(|p| p.file_stem().map(|s| s.to_string_lossy().into_owned()))
            .unwrap_or_else(|| CONFIG_PREFIX.to_string());

        Self::load_for_service(&service_name)
    }

    /// Load configuration for a specific service name
    pub fn load_for_service(service_name: &str) -> Result<Self> {
        let config_paths = Self::find_config_paths(service_name);

        tracing::debug!("Searching for config files in order:");
        for path in &config_paths {
            tracing::debug!("  - {}", path.display());
        }

        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        // Lowest priority first so later merges override
        for path in config_paths.iter().rev() {
            if path.exists() {
                tracing::info!("Loading configuration from: {}", path.display());
                figment = figment.merge(Toml::file(path));
            }
        }

        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config = figment.extract()?;
        Ok(config)
    }

    /// Load configuration from a specific file
    ///
    /// Bypasses the XDG and system directories.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;

        Ok(config)
    }

    /// Config file candidates, highest priority first
    fn find_config_paths(service_name: &str) -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        let xdg_dirs = xdg::BaseDirectories::with_prefix(CONFIG_PREFIX);
        let config_file_path = Path::new(service_name).join("config.toml");
        if let Ok(path) = xdg_dirs.place_config_file(&config_file_path) {
            paths.push(path);
        }

        paths.push(
            PathBuf::from("/etc")
                .join(CONFIG_PREFIX)
                .join(service_name)
                .join("config.toml"),
        );

        paths
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service: ServiceConfig {
                name: CONFIG_PREFIX.to_string(),
                port: default_port(),
                log_level: default_log_level(),
                timeout_secs: default_timeout(),
                environment: default_environment(),
                public_url: None,
                trust_forwarded_headers: false,
            },
            templates: TemplateConfig::default(),
            auth: AuthConfig::default(),
            session: SessionConfig::default(),
        }
    }
}
