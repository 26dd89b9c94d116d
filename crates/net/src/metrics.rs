use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use tracing::info;

use ratezilla_database::basic_db::SafeDatabase;
use ratezilla_service::model::{unix_now, SocialMetrics};
use ratezilla_service::score::{project_freshness, FreshnessInput};

use crate::error::ApiError;
use crate::project::metrics_or_zeroed;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct NameQuery {
    pub name: Option<String>,
}

/// Caller-supplied metric overrides. Anything left out keeps the stored value
/// unless a live GitHub fetch produces something fresher.
#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsUpdate {
    #[serde(default)]
    pub github_stars: Option<u64>,
    #[serde(default)]
    pub github_forks: Option<u64>,
    #[serde(default)]
    pub github_last_update: Option<u64>,
    #[serde(default)]
    pub commit_count: Option<u64>,
    #[serde(default)]
    pub twitter_followers: Option<u64>,
    #[serde(default)]
    pub twitter_last_update: Option<u64>,
}

/// Refreshes a project's social metrics by name. GitHub numbers are fetched
/// live when the project has a GitHub URL; fetched values win over supplied
/// ones, supplied ones win over stored ones. Freshness is recomputed from the
/// merged result.
pub async fn refresh_metrics<T: SafeDatabase>(
    State(state): State<AppState<T>>,
    Query(query): Query<NameQuery>,
    body: Option<Json<MetricsUpdate>>,
) -> Result<Json<SocialMetrics>, ApiError> {
    let name = query
        .name
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| ApiError::Validation("Project name is required".to_string()))?;
    let project = state.store.find_project_by_name(&name)?;

    let existing = metrics_or_zeroed(&state, project.id)?;
    let supplied = body.map(|Json(update)| update).unwrap_or_default();

    let fetched = match &project.github_url {
        Some(url) => state.github.repo_metrics(url).await,
        None => None,
    };
    if let Some(fetched) = &fetched {
        info!(
            "Refreshed GitHub metrics for {}: {} stars, {} forks",
            project.name, fetched.stars, fetched.forks
        );
    }

    let github_stars = fetched
        .as_ref()
        .map(|f| f.stars)
        .or(supplied.github_stars)
        .unwrap_or(existing.github_stars);
    let github_forks = fetched
        .as_ref()
        .map(|f| f.forks)
        .or(supplied.github_forks)
        .unwrap_or(existing.github_forks);
    let github_last_update = fetched
        .as_ref()
        .and_then(|f| f.last_update)
        .or(supplied.github_last_update)
        .or(existing.github_last_update);
    let commit_count = fetched
        .as_ref()
        .map(|f| f.commit_count)
        .or(supplied.commit_count)
        .unwrap_or(0);
    let twitter_followers = supplied
        .twitter_followers
        .unwrap_or(existing.twitter_followers);
    let twitter_last_update = supplied.twitter_last_update.or(existing.twitter_last_update);

    let freshness = project_freshness(
        &FreshnessInput {
            github_stars,
            github_forks,
            commit_count,
            github_last_update,
            twitter_followers,
            twitter_last_update,
        },
        unix_now(),
    );

    let metrics = SocialMetrics {
        project_id: project.id,
        github_stars,
        github_forks,
        github_last_update,
        twitter_followers,
        twitter_last_update,
        project_freshness: freshness,
    };
    state.store.save_metrics(&metrics)?;
    Ok(Json(metrics))
}
