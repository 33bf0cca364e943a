//! Caller identity extractor.
//!
//! The gateway in front of the host verifies the caller's ID token and
//! forwards the uid in a trusted header (`x-wardrobe-uid` unless configured
//! otherwise). A missing or blank header means an anonymous call.

use axum::{extract::FromRequestParts, http::request::Parts};

use wardrobe_core::UserId;
use wardrobe_core::callable::AuthContext;

use crate::error::set_sentry_user;
use crate::state::AppState;

/// Extractor for the optional authenticated caller.
///
/// Never rejects; callables decide what an anonymous call means.
///
/// ```rust,ignore
/// async fn handler(CallerAuth(auth): CallerAuth) -> impl IntoResponse {
///     match auth {
///         Some(ctx) => ctx.uid.to_string(),
///         None => "anonymous".to_string(),
///     }
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CallerAuth(pub Option<AuthContext>);

impl FromRequestParts<AppState> for CallerAuth {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = parts
            .headers
            .get(state.config().auth_header.as_str())
            .and_then(|h| h.to_str().ok())
            .map(str::trim)
            .filter(|uid| !uid.is_empty())
            .map(|uid| AuthContext {
                uid: UserId::new(uid),
            });

        if let Some(ctx) = &auth {
            set_sentry_user(&ctx.uid);
        }

        Ok(Self(auth))
    }
}
