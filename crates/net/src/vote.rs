use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use ratezilla_database::basic_db::SafeDatabase;
use ratezilla_service::model::Vote;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteQuery {
    pub project_id: Option<String>,
    pub user_id: Option<String>,
    pub value: Option<f64>,
}

#[derive(Serialize)]
pub struct VoteResponse {
    pub success: bool,
    pub vote: Vote,
}

/// Upserts a 1..=5 rating for (project, user). The user address is just a
/// voter key, nothing is verified against it.
pub async fn submit_vote<T: SafeDatabase>(
    State(state): State<AppState<T>>,
    Query(query): Query<VoteQuery>,
) -> Result<(StatusCode, Json<VoteResponse>), ApiError> {
    let (project_id, user_id, value) = match (query.project_id, query.user_id, query.value) {
        (Some(p), Some(u), Some(v)) if !u.trim().is_empty() => (p, u, v),
        _ => return Err(ApiError::Validation("Invalid input".to_string())),
    };

    let project_id: u64 = project_id
        .parse()
        .map_err(|_| ApiError::Validation("Invalid input".to_string()))?;
    if !(1.0..=5.0).contains(&value) {
        return Err(ApiError::Validation("Invalid input".to_string()));
    }

    let vote = state.store.submit_vote(project_id, &user_id, value)?;
    Ok((
        StatusCode::CREATED,
        Json(VoteResponse {
            success: true,
            vote,
        }),
    ))
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::test_state;
    use ratezilla_service::store::NewProject;

    fn query(project_id: &str, user_id: &str, value: f64) -> VoteQuery {
        VoteQuery {
            project_id: Some(project_id.to_string()),
            user_id: Some(user_id.to_string()),
            value: Some(value),
        }
    }

    #[tokio::test]
    async fn vote_is_upserted_per_user() {
        let (_dir, state) = test_state();
        let project = state
            .store
            .create_project(NewProject {
                name: "Blend".to_string(),
                description: "Lending".to_string(),
                ..NewProject::default()
            })
            .unwrap();
        let id = project.id.to_string();

        let (status, Json(first)) =
            submit_vote(State(state.clone()), Query(query(&id, "GVOTER", 3.0)))
                .await
                .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert!(first.success);

        submit_vote(State(state.clone()), Query(query(&id, "GVOTER", 5.0)))
            .await
            .unwrap();

        let votes = state.store.votes_for_project(project.id).unwrap();
        assert_eq!(votes.len(), 1);
        assert_eq!(votes[0].value, 5.0);
    }

    #[tokio::test]
    async fn out_of_range_or_missing_fields_are_invalid_input() {
        let (_dir, state) = test_state();

        for bad in [
            query("1", "GVOTER", 0.5),
            query("1", "GVOTER", 5.5),
            query("abc", "GVOTER", 3.0),
            VoteQuery {
                project_id: Some("1".to_string()),
                user_id: None,
                value: Some(3.0),
            },
        ] {
            let result = submit_vote(State(state.clone()), Query(bad)).await;
            match result {
                Err(ApiError::Validation(msg)) => assert_eq!(msg, "Invalid input"),
                other => panic!("expected validation error, got {:?}", other.map(|_| ())),
            }
        }
    }

    #[tokio::test]
    async fn vote_for_unknown_project_is_not_found() {
        let (_dir, state) = test_state();
        let result = submit_vote(State(state), Query(query("404", "GVOTER", 3.0))).await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }
}
