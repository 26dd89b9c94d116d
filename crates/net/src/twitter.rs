use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use ratezilla_database::basic_db::SafeDatabase;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TwitterStats {
    pub username: String,
    pub followers: u64,
    pub tweet_count: u64,
    pub last_update: Option<String>,
    pub is_active: bool,
}

pub async fn get_user<T: SafeDatabase>(
    State(state): State<AppState<T>>,
    Path(username): Path<String>,
) -> Result<Json<TwitterStats>, ApiError> {
    if username.trim().is_empty() {
        return Err(ApiError::Validation("Username is required".to_string()));
    }

    let data = state.twitter.user_metrics(&username).await?;
    Ok(Json(TwitterStats {
        username: data.username,
        followers: data.followers,
        tweet_count: data.tweet_count,
        last_update: data.last_update,
        is_active: data.is_active,
    }))
}
