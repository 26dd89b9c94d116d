use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use ratezilla_database::basic_db::SafeDatabase;
use ratezilla_social::github::extract_owner_and_repo;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoStats {
    pub stars: u64,
    pub forks: u64,
    pub last_update: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrgStats {
    pub name: String,
    pub stars: u64,
    pub forks: u64,
    pub last_update: String,
    pub most_recent_repo: String,
    pub repo_count: usize,
}

pub async fn get_repo<T: SafeDatabase>(
    State(state): State<AppState<T>>,
    Path((owner, repo)): Path<(String, String)>,
) -> Result<Json<RepoStats>, ApiError> {
    let data = state.github.repo(&owner, &repo).await?;
    Ok(Json(RepoStats {
        stars: data.stars,
        forks: data.forks,
        last_update: data.last_update,
    }))
}

/// Accepts either a bare organization name or a full GitHub URL.
pub async fn get_org<T: SafeDatabase>(
    State(state): State<AppState<T>>,
    Path(org): Path<String>,
) -> Result<Json<OrgStats>, ApiError> {
    let name = match extract_owner_and_repo(&org) {
        Some((owner, _)) => owner,
        None => org,
    };
    if name.trim().is_empty() {
        return Err(ApiError::Validation(
            "Organization name is required".to_string(),
        ));
    }

    let data = state.github.org(&name).await?;
    Ok(Json(OrgStats {
        name: data.name,
        stars: data.stars,
        forks: data.forks,
        last_update: data.last_update,
        most_recent_repo: data.most_recent_repo,
        repo_count: data.repo_count,
    }))
}
