//! `recommendOutfits` callable.
//!
//! Ranks the caller's outfits for one occasion by a popularity heuristic,
//! `likes + timesUsed`, and returns the top `limit`. Outfits with equal scores
//! keep the order the store returned them in; callers should not rely on it.

use serde_json::Value;
use tracing::{debug, instrument};

use wardrobe_core::callable::{
    AuthContext, RecommendRequest, RecommendResponse, RecommendedOutfit,
};
use wardrobe_core::wardrobe::{self, Outfit, field};

use crate::error::{FunctionError, Result};
use crate::store::DocumentStore;

/// Recommend outfits for the authenticated caller.
///
/// # Errors
///
/// - [`FunctionError::Unauthenticated`] when `auth` is `None`; the store is
///   not touched.
/// - [`FunctionError::InvalidArgument`] for a negative limit or a uid that
///   cannot name a document.
/// - [`FunctionError::Store`] if the query fails.
#[instrument(skip_all, fields(uid, occasion, limit))]
pub async fn recommend_outfits<S: DocumentStore>(
    store: &S,
    auth: Option<&AuthContext>,
    request: RecommendRequest,
) -> Result<RecommendResponse> {
    let auth = auth.ok_or(FunctionError::Unauthenticated)?;
    let options = request.resolve()?;

    let span = tracing::Span::current();
    span.record("uid", auth.uid.as_str());
    span.record("occasion", options.occasion.as_str());
    span.record("limit", options.limit);

    let collection = wardrobe::outfits(&auth.uid)?;
    let candidates = store
        .query_eq(
            &collection,
            field::OCCASION,
            &Value::String(options.occasion.clone()),
        )
        .await?;

    let mut ranked: Vec<RecommendedOutfit> = candidates
        .iter()
        .map(Outfit::from_document)
        .map(RecommendedOutfit::from)
        .collect();

    // Stable: equal scores stay in store order.
    ranked.sort_by(|a, b| b.score.cmp(&a.score));
    ranked.truncate(options.limit);

    debug!(
        candidates = candidates.len(),
        returned = ranked.len(),
        "Recommendations ranked"
    );

    Ok(RecommendResponse { data: ranked })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;
    use wardrobe_core::{DocumentPath, Fields, UserId};

    use crate::store::MemoryStore;

    fn auth(uid: &str) -> AuthContext {
        AuthContext {
            uid: UserId::new(uid),
        }
    }

    async fn put(store: &MemoryStore, path: &str, value: Value) {
        let fields = match value {
            Value::Object(map) => map,
            _ => Fields::new(),
        };
        store.insert(DocumentPath::parse(path).unwrap(), fields).await;
    }

    fn request(occasion: &str, limit: i64) -> RecommendRequest {
        RecommendRequest {
            occasion: Some(occasion.to_string()),
            limit: Some(limit),
        }
    }

    fn scores(response: &RecommendResponse) -> Vec<i64> {
        response.data.iter().map(|o| o.score).collect()
    }

    #[tokio::test]
    async fn test_work_scenario_returns_top_two() {
        let store = MemoryStore::new();
        put(&store, "users/u1/outfits/o1", json!({"occasion": "work", "likes": 2, "timesUsed": 1})).await;
        put(&store, "users/u1/outfits/o2", json!({"occasion": "work", "likes": 0, "timesUsed": 5})).await;
        put(&store, "users/u1/outfits/o3", json!({"occasion": "work", "likes": 1, "timesUsed": 1})).await;

        let response = recommend_outfits(&store, Some(&auth("u1")), request("work", 2))
            .await
            .unwrap();

        assert_eq!(scores(&response), vec![5, 3]);
        let ids: Vec<&str> = response.data.iter().map(|o| o.outfit_id.as_str()).collect();
        assert_eq!(ids, vec!["o2", "o1"]);
    }

    #[tokio::test]
    async fn test_unauthenticated_does_not_read() {
        let store = MemoryStore::new();
        put(&store, "users/u1/outfits/o1", json!({"occasion": "casual"})).await;

        let err = recommend_outfits(&store, None, RecommendRequest::default())
            .await
            .unwrap_err();

        assert!(matches!(err, FunctionError::Unauthenticated));
        assert_eq!(store.stats().reads, 0);
    }

    #[tokio::test]
    async fn test_only_exact_occasion_from_own_namespace() {
        let store = MemoryStore::new();
        put(&store, "users/u1/outfits/a", json!({"occasion": "party", "likes": 1})).await;
        put(&store, "users/u1/outfits/b", json!({"occasion": "Party", "likes": 9})).await;
        put(&store, "users/u1/outfits/c", json!({"occasion": "party-night", "likes": 9})).await;
        put(&store, "users/u2/outfits/d", json!({"occasion": "party", "likes": 9})).await;

        let response = recommend_outfits(&store, Some(&auth("u1")), request("party", 10))
            .await
            .unwrap();

        assert_eq!(response.data.len(), 1);
        assert_eq!(response.data[0].outfit_id.as_str(), "a");
    }

    #[tokio::test]
    async fn test_defaults_to_casual_and_five() {
        let store = MemoryStore::new();
        for i in 0..7 {
            put(
                &store,
                &format!("users/u1/outfits/o{i}"),
                json!({"occasion": "casual", "likes": i}),
            )
            .await;
        }
        put(&store, "users/u1/outfits/w", json!({"occasion": "work", "likes": 100})).await;

        let response = recommend_outfits(&store, Some(&auth("u1")), RecommendRequest::default())
            .await
            .unwrap();

        assert_eq!(scores(&response), vec![6, 5, 4, 3, 2]);
    }

    #[tokio::test]
    async fn test_missing_fields_score_zero_and_empty_title() {
        let store = MemoryStore::new();
        put(&store, "users/u1/outfits/bare", json!({"occasion": "work"})).await;
        put(&store, "users/u1/outfits/named", json!({"occasion": "work", "title": "Blazer", "timesUsed": 2})).await;

        let response = recommend_outfits(&store, Some(&auth("u1")), request("work", 5))
            .await
            .unwrap();

        assert_eq!(
            response.data,
            vec![
                RecommendedOutfit {
                    outfit_id: "named".into(),
                    title: "Blazer".to_string(),
                    score: 2,
                },
                RecommendedOutfit {
                    outfit_id: "bare".into(),
                    title: String::new(),
                    score: 0,
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_scores_are_non_increasing_and_bounded() {
        let store = MemoryStore::new();
        let counters = [(3, 4), (0, 0), (9, 1), (2, 2), (5, 5), (1, 0)];
        for (i, (likes, used)) in counters.iter().enumerate() {
            put(
                &store,
                &format!("users/u1/outfits/o{i}"),
                json!({"occasion": "gym", "likes": likes, "timesUsed": used}),
            )
            .await;
        }

        for limit in 1..=8 {
            let response = recommend_outfits(&store, Some(&auth("u1")), request("gym", limit))
                .await
                .unwrap();
            let got = scores(&response);
            assert!(got.len() <= usize::try_from(limit).unwrap());
            assert!(got.windows(2).all(|w| w[0] >= w[1]), "{got:?}");
        }
    }

    #[tokio::test]
    async fn test_ties_keep_store_order() {
        let store = MemoryStore::new();
        put(&store, "users/u1/outfits/b", json!({"occasion": "work", "likes": 1})).await;
        put(&store, "users/u1/outfits/a", json!({"occasion": "work", "timesUsed": 1})).await;
        put(&store, "users/u1/outfits/c", json!({"occasion": "work", "likes": 1})).await;

        let response = recommend_outfits(&store, Some(&auth("u1")), request("work", 3))
            .await
            .unwrap();

        let ids: Vec<&str> = response.data.iter().map(|o| o.outfit_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_negative_limit_is_invalid_argument() {
        let store = MemoryStore::new();

        let err = recommend_outfits(&store, Some(&auth("u1")), request("work", -2))
            .await
            .unwrap_err();

        assert!(matches!(err, FunctionError::InvalidArgument(_)));
        assert_eq!(store.stats().reads, 0);
    }
}
