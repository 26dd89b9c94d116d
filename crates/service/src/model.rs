use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Seconds since the Unix epoch. All persisted timestamps use this form.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: u64,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub github_url: Option<String>,
    #[serde(default)]
    pub twitter_url: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
    pub blockchain: String,
    #[serde(default)]
    pub category_ids: Vec<u64>,
    pub created_at: u64,
    pub updated_at: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contract {
    pub name: String,
    pub address: String,
    #[serde(rename = "type")]
    pub contract_type: String,
    pub project_id: u64,
    pub interactions: u64,
    pub last_interaction: u64,
}

/// One record per project, updated through the metrics refresh endpoint.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialMetrics {
    pub project_id: u64,
    pub github_stars: u64,
    pub github_forks: u64,
    #[serde(default)]
    pub github_last_update: Option<u64>,
    pub twitter_followers: u64,
    #[serde(default)]
    pub twitter_last_update: Option<u64>,
    pub project_freshness: f64,
}

impl SocialMetrics {
    pub fn zeroed(project_id: u64) -> Self {
        Self {
            project_id,
            github_stars: 0,
            github_forks: 0,
            github_last_update: None,
            twitter_followers: 0,
            twitter_last_update: None,
            project_freshness: 0.0,
        }
    }
}

/// Keyed by `{project_id}:{user_id}`, so a second submission from the same
/// user overwrites rather than appends.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    pub project_id: u64,
    pub user_id: String,
    pub value: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub address: String,
    pub created_at: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredLogo {
    pub content_type: String,
    pub bytes: Vec<u8>,
}
