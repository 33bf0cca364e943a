//! Request and response schemas for callable functions.
//!
//! Payloads arrive untyped from mobile clients. They are decoded into the
//! structs below and defaults are resolved here, at the boundary, so the
//! handlers only ever see complete options.

use serde::{Deserialize, Serialize};

use crate::types::{OutfitId, UserId};
use crate::wardrobe::Outfit;

/// Occasion used when the request does not name one.
pub const DEFAULT_OCCASION: &str = "casual";

/// Number of recommendations returned when the request does not set a limit.
pub const DEFAULT_LIMIT: usize = 5;

/// The authenticated principal a callable runs as.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    pub uid: UserId,
}

/// Invalid callable arguments.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    /// The body is not a JSON object of the expected shape.
    #[error("malformed request: {0}")]
    Malformed(String),
    /// `limit` is negative.
    #[error("limit must be a positive integer, got {0}")]
    InvalidLimit(i64),
}

/// `recommendOutfits` request payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendRequest {
    #[serde(default)]
    pub occasion: Option<String>,
    #[serde(default)]
    pub limit: Option<i64>,
}

impl RecommendRequest {
    /// Decode a request body. An empty body is a request with no options.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::Malformed`] if the body is not valid JSON of
    /// the expected shape.
    pub fn from_body(body: &[u8]) -> Result<Self, RequestError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_json::from_slice(body).map_err(|e| RequestError::Malformed(e.to_string()))
    }

    /// Resolve defaults.
    ///
    /// A missing or empty occasion becomes [`DEFAULT_OCCASION`]; a missing or
    /// zero limit becomes [`DEFAULT_LIMIT`].
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::InvalidLimit`] for a negative limit.
    pub fn resolve(self) -> Result<RecommendOptions, RequestError> {
        let occasion = self
            .occasion
            .filter(|o| !o.is_empty())
            .unwrap_or_else(|| DEFAULT_OCCASION.to_owned());

        let limit = match self.limit {
            None | Some(0) => DEFAULT_LIMIT,
            Some(n) => usize::try_from(n).map_err(|_| RequestError::InvalidLimit(n))?,
        };

        Ok(RecommendOptions { occasion, limit })
    }
}

/// Fully resolved `recommendOutfits` options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecommendOptions {
    pub occasion: String,
    pub limit: usize,
}

/// One ranked outfit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendedOutfit {
    pub outfit_id: OutfitId,
    pub title: String,
    pub score: i64,
}

impl From<Outfit> for RecommendedOutfit {
    fn from(outfit: Outfit) -> Self {
        let score = outfit.score();
        Self {
            outfit_id: outfit.id,
            title: outfit.title,
            score,
        }
    }
}

/// `recommendOutfits` response payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendResponse {
    pub data: Vec<RecommendedOutfit>,
}
