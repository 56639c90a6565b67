//! Admin gating for whole routers

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::Result;
use crate::request::RequestInfo;
use crate::session::current_session;
use crate::state::AppState;
use crate::templates::PageResponse;

/// Admin check as middleware.
///
/// Requests without an admin session never reach the inner service; they
/// get the login redirect instead.
///
/// ```rust,ignore
/// let admin = Router::new()
///     .route("/admin", get(admin_index))
///     .route_layer(axum::middleware::from_fn_with_state(state.clone(), require_admin));
/// ```
pub async fn require_admin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response> {
    let (parts, body) = request.into_parts();
    let info = RequestInfo::from_parts(&parts, state.config())?;
    let session = current_session(&parts).await;

    let mut response = PageResponse::new();
    if !state.gate().is_admin(&info, session.as_ref(), &mut response)? {
        return Ok(response.into_response());
    }

    Ok(next.run(Request::from_parts(parts, body)).await)
}
