//! Response sink that pages write into, and its axum conversion.

use axum::{
    http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use std::io;

pub const TEXT_HTML: &str = "text/html";
pub const TEXT_PLAIN: &str = "text/plain";

/// The transport surface a page writes to.
///
/// `write` is the only fallible operation; what a failed write means is up to
/// the caller (the renderer logs it and moves on).
pub trait ResponseSink {
    /// Set the response's media type.
    fn set_content_type(&mut self, mime: &str);

    /// Set a response header, replacing any previous value.
    fn set_header(&mut self, name: HeaderName, value: &str);

    /// Append text to the response body.
    fn write(&mut self, text: &str) -> io::Result<()>;

    /// Turn the response into a redirect to `url`.
    fn redirect(&mut self, url: &str);
}

/// Buffered page response.
///
/// Once [`redirect`](ResponseSink::redirect) has been called the response
/// carries no body, and further writes fail.
#[derive(Debug)]
pub struct PageResponse {
    status: StatusCode,
    content_type: Option<String>,
    headers: HeaderMap,
    body: String,
    location: Option<String>,
}

impl Default for PageResponse {
    fn default() -> Self {
        Self {
            status: StatusCode::OK,
            content_type: None,
            headers: HeaderMap::new(),
            body: String::new(),
            location: None,
        }
    }
}

impl PageResponse {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the HTTP status code used for a non-redirect response.
    #[must_use]
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    pub fn status(&self) -> StatusCode {
        if self.location.is_some() {
            StatusCode::FOUND
        } else {
            self.status
        }
    }

    /// Media type set through [`ResponseSink::set_content_type`].
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Headers set through [`ResponseSink::set_header`].
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// Redirect target, if the response was redirected.
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn is_redirect(&self) -> bool {
        self.location.is_some()
    }
}

impl ResponseSink for PageResponse {
    fn set_content_type(&mut self, mime: &str) {
        self.content_type = Some(mime.to_string());
    }

    fn set_header(&mut self, name: HeaderName, value: &str) {
        match HeaderValue::from_str(value) {
            Ok(value) => {
                self.headers.insert(name, value);
            }
            Err(_) => tracing::warn!(header = %name, "Dropping header with invalid value"),
        }
    }

    fn write(&mut self, text: &str) -> io::Result<()> {
        if self.location.is_some() {
            return Err(io::Error::other("response already redirected"));
        }
        self.body.push_str(text);
        Ok(())
    }

    fn redirect(&mut self, url: &str) {
        tracing::debug!(location = url, "Redirecting");
        self.body.clear();
        self.location = Some(url.to_string());
    }
}

impl IntoResponse for PageResponse {
    fn into_response(self) -> Response {
        if let Some(location) = self.location {
            return match HeaderValue::from_str(&location) {
                Ok(value) => (StatusCode::FOUND, [(header::LOCATION, value)]).into_response(),
                Err(_) => {
                    tracing::error!("Redirect target is not a valid header value: {}", location);
                    StatusCode::INTERNAL_SERVER_ERROR.into_response()
                }
            };
        }

        let mut response = (self.status, self.body).into_response();
        let headers = response.headers_mut();

        if let Some(mime) = self.content_type.as_deref() {
            if let Ok(value) = HeaderValue::from_str(mime) {
                headers.insert(header::CONTENT_TYPE, value);
            }
        }

        // Explicit headers win over the media type
        for name in self.headers.keys() {
            headers.remove(name);
        }
        for (name, value) in &self.headers {
            headers.append(name.clone(), value.clone());
        }

        response
    }
}
