//! Run `recommendOutfits` for a user and print the result.

use wardrobe_core::UserId;
use wardrobe_core::callable::{AuthContext, RecommendRequest};
use wardrobe_functions::handlers;

use super::{CliError, connect};

/// Print recommendations for `uid` as JSON.
///
/// # Errors
///
/// Returns an error if the store is unreachable or the arguments are invalid.
pub async fn run(uid: &str, occasion: Option<String>, limit: Option<i64>) -> Result<(), CliError> {
    let store = connect().await?;
    let auth = AuthContext {
        uid: UserId::new(uid),
    };

    let response =
        handlers::recommend_outfits(&store, Some(&auth), RecommendRequest { occasion, limit })
            .await?;

    #[allow(clippy::print_stdout)]
    {
        println!("{}", serde_json::to_string_pretty(&response)?);
    }
    Ok(())
}
