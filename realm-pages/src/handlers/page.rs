//! Per-request page handler

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::auth::AuthGate;
use crate::error::{Error, Result};
use crate::request::RequestInfo;
use crate::session::{current_session, PageSession};
use crate::state::AppState;
use crate::templates::{PageResponse, RenderContext, TemplateRenderer};

/// Everything a page needs for one request.
///
/// Extract it in a handler, optionally gate on [`is_admin`](Self::is_admin),
/// then [`render`](Self::render) or [`write`](Self::write) and return it.
///
/// ```rust,ignore
/// async fn empire(mut page: PageHandler) -> Result<PageHandler> {
///     if !page.is_admin()? {
///         return Ok(page);
///     }
///     let ctx = page.context().with("empire", load_empire().await?);
///     page.render("admin/empire.html", ctx)?;
///     Ok(page)
/// }
/// ```
#[derive(Debug)]
pub struct PageHandler {
    renderer: Arc<TemplateRenderer>,
    gate: Arc<AuthGate>,
    request: RequestInfo,
    session: Option<PageSession>,
    response: PageResponse,
}

impl PageHandler {
    pub fn new(
        renderer: Arc<TemplateRenderer>,
        gate: Arc<AuthGate>,
        request: RequestInfo,
        session: Option<PageSession>,
    ) -> Self {
        Self {
            renderer,
            gate,
            request,
            session,
            response: PageResponse::new(),
        }
    }

    /// Admin check. On `Ok(false)` the response is already a login
    /// redirect and the handler should return without writing.
    pub fn is_admin(&mut self) -> Result<bool> {
        self.gate
            .is_admin(&self.request, self.session.as_ref(), &mut self.response)
    }

    /// Send the visitor to log in, whatever their session.
    pub fn authenticate(&mut self) -> Result<()> {
        self.gate.authenticate(&self.request, &mut self.response)
    }

    /// Render `path` as HTML with `ctx` plus the request realm.
    pub fn render(&mut self, path: &str, ctx: RenderContext) -> Result<()> {
        let ctx = ctx.with_realm(self.request.realm());
        self.renderer.render(&mut self.response, path, &ctx)
    }

    /// Write `text` as a plain-text response.
    pub fn write(&mut self, text: &str) {
        self.renderer.write_text(&mut self.response, text);
    }

    /// Fresh context for this request.
    pub fn context(&self) -> RenderContext {
        RenderContext::new().with_realm(self.request.realm())
    }

    pub fn realm(&self) -> &str {
        self.request.realm()
    }

    pub fn request(&self) -> &RequestInfo {
        &self.request
    }

    pub fn session(&self) -> Option<&PageSession> {
        self.session.as_ref()
    }

    pub fn response(&self) -> &PageResponse {
        &self.response
    }

    pub fn response_mut(&mut self) -> &mut PageResponse {
        &mut self.response
    }
}

impl<S> FromRequestParts<S> for PageHandler
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self> {
        let state = AppState::from_ref(state);
        let request = RequestInfo::from_parts(parts, state.config())?;
        let session = current_session(parts).await;

        Ok(Self::new(
            Arc::clone(state.renderer()),
            Arc::clone(state.gate()),
            request,
            session,
        ))
    }
}

impl IntoResponse for PageHandler {
    fn into_response(self) -> Response {
        self.response.into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::LoginPageProvider;
    use crate::config::Config;
    use crate::templates::FilterRegistry;
    use axum::{
        body::{self, Body},
        http::{header, Request, StatusCode},
        routing::get,
        Router,
    };
    use oauth2::url::Url;
    use tower::ServiceExt;

    fn test_state() -> AppState {
        let renderer = TemplateRenderer::from_sources(
            [
                ("admin/index.html", "<h1>{{ realm }}</h1><p>{{ stars|number }}</p>"),
                ("spoof.html", "{{ realm }}"),
            ],
            &FilterRegistry::standard(),
        )
        .unwrap();
        AppState::new(Config::default(), renderer, AuthGate::new(LoginPageProvider))
    }

    async fn admin_index(mut page: PageHandler) -> Result<PageHandler> {
        if !page.is_admin()? {
            return Ok(page);
        }
        let ctx = page.context().with("stars", 1234567);
        page.render("admin/index.html", ctx)?;
        Ok(page)
    }

    async fn spoof(mut page: PageHandler) -> Result<PageHandler> {
        page.render("spoof.html", RenderContext::new().with("realm", "other"))?;
        Ok(page)
    }

    async fn status(mut page: PageHandler) -> PageHandler {
        page.write("OK");
        page
    }

    fn test_router() -> Router {
        Router::new()
            .route("/admin", get(admin_index))
            .route("/realms/{realm}/admin", get(admin_index))
            .route("/realms/{realm}/spoof", get(spoof))
            .route("/status", get(status))
            .with_state(test_state())
    }

    async fn body_text(response: Response) -> String {
        let bytes = body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_anonymous_admin_request_redirects() {
        let response = test_router()
            .oneshot(
                Request::get("/realms/gamma/admin?tab=2")
                    .header(header::HOST, "play.example.com")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FOUND);
        let location = response
            .headers()
            .get(header::LOCATION)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert_eq!(
            location,
            "http://play.example.com/realms/gamma/login?continue=%2Frealms%2Fgamma%2Fadmin"
        );

        let continue_param = Url::parse(&location)
            .unwrap()
            .query_pairs()
            .find(|(k, _)| k == "continue")
            .map(|(_, v)| v.into_owned());
        assert_eq!(continue_param.as_deref(), Some("/realms/gamma/admin"));
        assert_eq!(body_text(response).await, "");
    }

    #[tokio::test]
    async fn test_nested_router_keeps_requested_path_and_realm() {
        let app = Router::new()
            .nest("/realms/gamma", Router::new().route("/admin", get(admin_index)))
            .with_state(test_state());

        let response = app
            .oneshot(
                Request::get("/realms/gamma/admin")
                    .header(header::HOST, "play.example.com")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "http://play.example.com/realms/gamma/login?continue=%2Frealms%2Fgamma%2Fadmin"
        );
    }

    #[tokio::test]
    async fn test_write_is_plain_text() {
        let response = test_router()
            .oneshot(
                Request::get("/status")
                    .header(header::HOST, "localhost")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get(header::CONTENT_TYPE).unwrap(), "text/plain");
        assert_eq!(body_text(response).await, "OK");
    }

    #[tokio::test]
    async fn test_realm_cannot_be_overridden() {
        let response = test_router()
            .oneshot(
                Request::get("/realms/gamma/spoof")
                    .header(header::HOST, "localhost")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(body_text(response).await, "gamma");
    }

    #[tokio::test]
    async fn test_missing_host_is_rejected() {
        let response = test_router()
            .oneshot(Request::get("/status").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[cfg(feature = "session-memory")]
    mod with_session {
        use super::*;
        use crate::session::{MemoryStore, Session, PAGE_SESSION_KEY};

        async fn request_with(session: PageSession, uri: &str) -> Request<Body> {
            let store = Arc::new(MemoryStore::default());
            let stored = Session::new(None, store, None);
            stored.insert(PAGE_SESSION_KEY, session).await.unwrap();

            let mut request = Request::get(uri)
                .header(header::HOST, "play.example.com")
                .body(Body::empty())
                .unwrap();
            request.extensions_mut().insert(stored);
            request
        }

        #[tokio::test]
        async fn test_admin_page_renders() {
            let request = request_with(PageSession::admin("u1"), "/admin").await;
            let response = test_router().oneshot(request).await.unwrap();

            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(response.headers().get(header::CONTENT_TYPE).unwrap(), "text/html");
            assert_eq!(body_text(response).await, "<h1>beta</h1><p>1,234,567</p>");
        }

        #[tokio::test]
        async fn test_non_admin_session_redirects() {
            let request = request_with(PageSession::user("u1"), "/admin").await;
            let response = test_router().oneshot(request).await.unwrap();

            assert_eq!(response.status(), StatusCode::FOUND);
            assert_eq!(
                response.headers().get(header::LOCATION).unwrap(),
                "http://play.example.com/realms/beta/login?continue=%2Fadmin"
            );
            assert_eq!(body_text(response).await, "");
        }
    }
}
