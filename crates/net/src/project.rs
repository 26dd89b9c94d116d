use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use ratezilla_database::basic_db::SafeDatabase;
use ratezilla_service::model::{Category, Contract, Project, SocialMetrics, Vote};
use ratezilla_service::store::{average_rating, NewProject, StoreError};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct BlockchainQuery {
    blockchain: Option<String>,
}

#[derive(Deserialize)]
pub struct IdQuery {
    pub id: Option<String>,
}

pub(crate) fn require_id(id: &Option<String>, entity: &str) -> Result<u64, ApiError> {
    let raw = id
        .as_deref()
        .ok_or_else(|| ApiError::Validation(format!("{entity} ID is required")))?;
    raw.parse()
        .map_err(|_| ApiError::Validation(format!("Invalid {} ID", entity.to_lowercase())))
}

/// Listing shape the project pages expect: string id, empty strings for
/// missing URLs, rating and metrics inlined.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    pub id: String,
    pub name: String,
    pub description: String,
    pub website: String,
    pub github_url: String,
    pub twitter_url: String,
    pub logo_url: String,
    pub blockchain: String,
    pub average_rating: f64,
    pub metrics: MetricsSummary,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSummary {
    pub github_stars: u64,
    pub twitter_followers: u64,
    pub github_forks: u64,
    pub project_freshness: f64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDetail {
    #[serde(flatten)]
    pub project: Project,
    pub contracts: Vec<Contract>,
    pub social_metrics: SocialMetrics,
    pub categories: Vec<Category>,
}

#[derive(Serialize)]
pub struct ProjectDetailResponse {
    pub project: ProjectDetail,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminProject {
    #[serde(flatten)]
    pub project: Project,
    pub social_metrics: SocialMetrics,
    pub votes: Vec<Vote>,
    pub categories: Vec<Category>,
    pub average_rating: f64,
}

#[derive(Serialize)]
pub struct CreatedProject {
    pub success: bool,
    pub project: Project,
}

#[derive(Serialize)]
pub struct DeletedResponse {
    pub success: bool,
    pub message: String,
}

/// Metrics lookup for display paths: a project that never got a metrics row
/// reads as zeroed, but storage failures still propagate.
pub(crate) fn metrics_or_zeroed<T: SafeDatabase>(
    state: &AppState<T>,
    project_id: u64,
) -> Result<SocialMetrics, ApiError> {
    match state.store.metrics_for_project(project_id) {
        Ok(metrics) => Ok(metrics),
        Err(StoreError::NotFound(_)) => Ok(SocialMetrics::zeroed(project_id)),
        Err(e) => Err(e.into()),
    }
}

fn summarize<T: SafeDatabase>(state: &AppState<T>, project: Project) -> Result<ProjectSummary, ApiError> {
    let votes = state.store.votes_for_project(project.id)?;
    let metrics = metrics_or_zeroed(state, project.id)?;

    Ok(ProjectSummary {
        id: project.id.to_string(),
        name: project.name,
        description: project.description,
        website: project.website.unwrap_or_default(),
        github_url: project.github_url.unwrap_or_default(),
        twitter_url: project.twitter_url.unwrap_or_default(),
        logo_url: project.logo_url.unwrap_or_default(),
        blockchain: project.blockchain,
        average_rating: average_rating(&votes),
        metrics: MetricsSummary {
            github_stars: metrics.github_stars,
            twitter_followers: metrics.twitter_followers,
            github_forks: metrics.github_forks,
            project_freshness: metrics.project_freshness,
        },
    })
}

fn categories_of<T: SafeDatabase>(state: &AppState<T>, project: &Project) -> Vec<Category> {
    project
        .category_ids
        .iter()
        .filter_map(|id| state.store.get_category(*id).ok())
        .collect()
}

pub async fn list_projects<T: SafeDatabase>(
    State(state): State<AppState<T>>,
    Query(query): Query<BlockchainQuery>,
) -> Result<Json<Vec<ProjectSummary>>, ApiError> {
    let blockchain = query.blockchain.unwrap_or_else(|| "stellar".to_string());
    let projects = state.store.list_projects(Some(&blockchain))?;

    let mut summaries = Vec::with_capacity(projects.len());
    for project in projects {
        summaries.push(summarize(&state, project)?);
    }
    Ok(Json(summaries))
}

pub async fn get_project<T: SafeDatabase>(
    State(state): State<AppState<T>>,
    Path(id): Path<String>,
) -> Result<Json<ProjectDetailResponse>, ApiError> {
    let id: u64 = id
        .parse()
        .map_err(|_| ApiError::Validation("Invalid project ID".to_string()))?;
    let project = state.store.get_project(id)?;

    let contracts = state.store.contracts_for_project(id)?;
    let social_metrics = metrics_or_zeroed(&state, id)?;
    let categories = categories_of(&state, &project);

    Ok(Json(ProjectDetailResponse {
        project: ProjectDetail {
            project,
            contracts,
            social_metrics,
            categories,
        },
    }))
}

pub async fn admin_list_projects<T: SafeDatabase>(
    State(state): State<AppState<T>>,
) -> Result<Json<Vec<AdminProject>>, ApiError> {
    let projects = state.store.list_projects(None)?;

    let mut result = Vec::with_capacity(projects.len());
    for project in projects {
        let votes = state.store.votes_for_project(project.id)?;
        let social_metrics = metrics_or_zeroed(&state, project.id)?;
        let categories = categories_of(&state, &project);
        let average_rating = average_rating(&votes);
        result.push(AdminProject {
            project,
            social_metrics,
            votes,
            categories,
            average_rating,
        });
    }
    Ok(Json(result))
}

pub async fn create_project<T: SafeDatabase>(
    State(state): State<AppState<T>>,
    Json(body): Json<NewProject>,
) -> Result<(StatusCode, Json<CreatedProject>), ApiError> {
    if body.name.trim().is_empty() || body.description.trim().is_empty() {
        return Err(ApiError::Validation(
            "Name and description are required".to_string(),
        ));
    }

    let project = state.store.create_project(body)?;
    Ok((
        StatusCode::CREATED,
        Json(CreatedProject {
            success: true,
            project,
        }),
    ))
}

pub async fn update_project<T: SafeDatabase>(
    State(state): State<AppState<T>>,
    Query(query): Query<IdQuery>,
    Json(body): Json<NewProject>,
) -> Result<Json<Project>, ApiError> {
    let id = require_id(&query.id, "Project")?;
    if body.name.trim().is_empty() || body.description.trim().is_empty() {
        return Err(ApiError::Validation(
            "Name and description are required".to_string(),
        ));
    }

    let project = state.store.update_project(id, body)?;
    Ok(Json(project))
}

pub async fn delete_project<T: SafeDatabase>(
    State(state): State<AppState<T>>,
    Query(query): Query<IdQuery>,
) -> Result<Json<DeletedResponse>, ApiError> {
    let id = require_id(&query.id, "Project")?;
    state.store.delete_project(id)?;
    Ok(Json(DeletedResponse {
        success: true,
        message: "Project deleted successfully".to_string(),
    }))
}
