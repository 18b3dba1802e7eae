use std::collections::{HashMap, HashSet};

use base64::Engine;
use futures::{StreamExt, stream};
use uuid::Uuid;

use crate::App;

/// How many profile-picture lookups may be in flight at once when enriching
/// a listing.
const MAX_CONCURRENT_LOOKUPS: usize = 8;

/// Best effort: a failed lookup is logged and degrades to an empty string so
/// a broken avatar service never takes down a comment listing.
pub async fn get_profile_picture_data_url(ctx: &App, user_id: Uuid) -> String {
    match fetch_data_url(ctx, user_id).await {
        Ok(url) => url,
        Err(e) => {
            tracing::error!(?e, %user_id, "Failed to resolve profile picture");
            String::new()
        }
    }
}

async fn fetch_data_url(ctx: &App, user_id: Uuid) -> eyre::Result<String> {
    let Some(base_url) = &ctx.config.avatar_service_url else {
        return Ok(String::new());
    };

    let response = ctx
        .http
        .get(format!("{base_url}/users/{user_id}/picture"))
        .send()
        .await?
        .error_for_status()?;

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("image/png")
        .to_owned();

    let bytes = response.bytes().await?;

    Ok(format!(
        "data:{content_type};base64,{}",
        base64::engine::general_purpose::STANDARD.encode(&bytes)
    ))
}

/// Resolves each distinct user exactly once, with bounded concurrency, no
/// matter how often a user appears in the listing being enriched.
pub async fn resolve_profile_pictures(
    ctx: &App,
    user_ids: impl IntoIterator<Item = Uuid>,
) -> HashMap<Uuid, String> {
    let distinct: HashSet<Uuid> = user_ids.into_iter().collect();

    stream::iter(distinct)
        .map(|id| async move { (id, get_profile_picture_data_url(ctx, id).await) })
        .buffer_unordered(MAX_CONCURRENT_LOOKUPS)
        .collect()
        .await
}
