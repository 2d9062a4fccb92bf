//! Slug redirect endpoint.

use crate::{AppState, WebResult};
use axum::{
    extract::{Path, State},
    http::{header::LOCATION, StatusCode},
    response::IntoResponse,
};

/// Redirect a visitor to the slug's target
///
/// ```text
/// GET /{slug}
/// ```
///
/// - `301 Moved Permanently` with `Location: <redirect>` when the slug resolves
/// - `404 {"code":"NOT_FOUND", ...}` otherwise, including backend failures
pub async fn follow_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> WebResult<impl IntoResponse> {
    let target = state.resolver.resolve(&slug).await?;

    tracing::debug!(%slug, target = %target, "Redirecting");
    Ok((StatusCode::MOVED_PERMANENTLY, [(LOCATION, target.into_string())]))
}
