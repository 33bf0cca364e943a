//! Callable endpoints.

use axum::{Json, body::Bytes, extract::State};

use wardrobe_core::callable::{RecommendRequest, RecommendResponse};

use crate::error::Result;
use crate::handlers;
use crate::middleware::CallerAuth;
use crate::state::AppState;

/// `POST /recommendOutfits`
///
/// An empty body is a request with every option defaulted.
pub async fn recommend_outfits(
    State(state): State<AppState>,
    CallerAuth(auth): CallerAuth,
    body: Bytes,
) -> Result<Json<RecommendResponse>> {
    // Anonymous callers are rejected before the body is looked at.
    let request = if auth.is_some() {
        RecommendRequest::from_body(&body)?
    } else {
        RecommendRequest::default()
    };
    let response = handlers::recommend_outfits(state.store(), auth.as_ref(), request).await?;
    Ok(Json(response))
}
