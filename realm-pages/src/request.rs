//! Per-request facts that pages and authentication providers need.

use axum::extract::OriginalUri;
use axum::http::{header, request::Parts, HeaderMap, Uri};
use oauth2::url::Url;

use crate::config::Config;
use crate::error::{Error, Result};

const X_FORWARDED_PROTO: &str = "x-forwarded-proto";
const X_FORWARDED_HOST: &str = "x-forwarded-host";

/// The absolute URL, realm and headers of the request being served.
#[derive(Debug, Clone)]
pub struct RequestInfo {
    url: Url,
    realm: String,
    headers: HeaderMap,
}

impl RequestInfo {
    pub fn new(url: Url, realm: impl Into<String>) -> Self {
        Self {
            url,
            realm: realm.into(),
            headers: HeaderMap::new(),
        }
    }

    #[must_use]
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Derive the request facts from axum request parts.
    ///
    /// Uses the URI the client sent, not the one a nesting router rewrote.
    pub fn from_parts(parts: &Parts, config: &Config) -> Result<Self> {
        let uri = parts
            .extensions
            .get::<OriginalUri>()
            .map_or(&parts.uri, |original| &original.0);

        let url = request_url(
            uri,
            &parts.headers,
            config.service.public_url.as_deref(),
            config.service.trust_forwarded_headers,
        )?;
        let realm = realm_from_path(uri.path())
            .unwrap_or(&config.auth.default_realm)
            .to_string();

        Ok(Self {
            url,
            realm,
            headers: parts.headers.clone(),
        })
    }

    /// Full request URL as seen by the client.
    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn realm(&self) -> &str {
        &self.realm
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }
}

/// Realm named by a `/realms/{realm}/...` path, if any.
pub fn realm_from_path(path: &str) -> Option<&str> {
    let rest = path.strip_prefix("/realms/")?;
    let (realm, _) = rest.split_once('/')?;
    (!realm.is_empty()).then_some(realm)
}

/// Rebuild the absolute URL the client requested.
///
/// A configured public URL supplies scheme and authority. Otherwise they come
/// from the forwarding headers (only when `trust_forwarded` is set), the
/// `Host` header, or the request line. The path and query always come from
/// `uri` and never change the authority.
pub fn request_url(
    uri: &Uri,
    headers: &HeaderMap,
    public_url: Option<&str>,
    trust_forwarded: bool,
) -> Result<Url> {
    let mut url = match public_url {
        Some(base) => Url::parse(base)
            .map_err(|e| Error::Internal(format!("Invalid public URL '{}': {}", base, e)))?,
        None => {
            let forwarded = |name: &str| trust_forwarded.then(|| first_value(headers, name)).flatten();

            let scheme = forwarded(X_FORWARDED_PROTO)
                .or_else(|| uri.scheme_str())
                .unwrap_or("http");

            let authority = forwarded(X_FORWARDED_HOST)
                .or_else(|| first_value(headers, header::HOST.as_str()))
                .or_else(|| uri.authority().map(|a| a.as_str()))
                .ok_or_else(|| Error::BadRequest("Request has no host".to_string()))?;

            let origin = format!("{}://{}/", scheme, authority);
            Url::parse(&origin)
                .map_err(|e| Error::BadRequest(format!("Invalid request origin '{}': {}", origin, e)))?
        }
    };

    if url.cannot_be_a_base() {
        return Err(Error::Internal(format!("Public URL '{}' cannot carry a path", url)));
    }

    url.set_path(uri.path());
    url.set_query(uri.query());
    url.set_fragment(None);
    Ok(url)
}

/// First entry of a possibly comma-separated header.
fn first_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)?
        .to_str()
        .ok()?
        .split(',')
        .map(str::trim)
        .find(|v| !v.is_empty())
}
