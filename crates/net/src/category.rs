use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use ratezilla_database::basic_db::SafeDatabase;
use ratezilla_service::model::Category;
use ratezilla_service::store::NewCategory;

use crate::error::ApiError;
use crate::project::{require_id, DeletedResponse, IdQuery};
use crate::state::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryWithCount {
    #[serde(flatten)]
    pub category: Category,
    pub project_count: usize,
}

#[derive(Serialize)]
pub struct CreatedCategory {
    pub success: bool,
    pub category: Category,
}

pub async fn list_categories<T: SafeDatabase>(
    State(state): State<AppState<T>>,
) -> Result<Json<Vec<CategoryWithCount>>, ApiError> {
    let categories = state.store.list_categories()?;

    let mut result = Vec::with_capacity(categories.len());
    for category in categories {
        let project_count = state.store.category_project_count(category.id)?;
        result.push(CategoryWithCount {
            category,
            project_count,
        });
    }
    Ok(Json(result))
}

pub async fn create_category<T: SafeDatabase>(
    State(state): State<AppState<T>>,
    Json(body): Json<NewCategory>,
) -> Result<(StatusCode, Json<CreatedCategory>), ApiError> {
    if body.name.trim().is_empty() {
        return Err(ApiError::Validation("Name is required".to_string()));
    }

    let category = state.store.create_category(body)?;
    Ok((
        StatusCode::CREATED,
        Json(CreatedCategory {
            success: true,
            category,
        }),
    ))
}

pub async fn update_category<T: SafeDatabase>(
    State(state): State<AppState<T>>,
    Query(query): Query<IdQuery>,
    Json(body): Json<NewCategory>,
) -> Result<Json<Category>, ApiError> {
    let id = require_id(&query.id, "Category")?;
    if body.name.trim().is_empty() {
        return Err(ApiError::Validation("Name is required".to_string()));
    }

    let category = state.store.update_category(id, body)?;
    Ok(Json(category))
}

pub async fn delete_category<T: SafeDatabase>(
    State(state): State<AppState<T>>,
    Query(query): Query<IdQuery>,
) -> Result<Json<DeletedResponse>, ApiError> {
    let id = require_id(&query.id, "Category")?;
    state.store.delete_category(id)?;
    Ok(Json(DeletedResponse {
        success: true,
        message: "Category deleted successfully".to_string(),
    }))
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::test_state;
    use ratezilla_service::store::NewProject;

    fn body(name: &str) -> NewCategory {
        NewCategory {
            name: name.to_string(),
            description: Some(format!("{name} projects")),
        }
    }

    #[tokio::test]
    async fn listing_reports_per_category_project_counts() {
        let (_dir, state) = test_state();
        let (_, Json(defi)) = create_category(State(state.clone()), Json(body("DeFi")))
            .await
            .unwrap();
        create_category(State(state.clone()), Json(body("NFT")))
            .await
            .unwrap();

        state
            .store
            .create_project(NewProject {
                name: "Blend".to_string(),
                description: "Lending".to_string(),
                category_ids: vec![defi.category.id],
                ..NewProject::default()
            })
            .unwrap();

        let Json(listed) = list_categories(State(state)).await.unwrap();
        assert_eq!(listed.len(), 2);
        // Sorted by name: DeFi before NFT.
        assert_eq!(listed[0].category.name, "DeFi");
        assert_eq!(listed[0].project_count, 1);
        assert_eq!(listed[1].project_count, 0);
    }

    #[tokio::test]
    async fn blank_name_is_rejected() {
        let (_dir, state) = test_state();
        let result = create_category(State(state), Json(body("  "))).await;
        match result {
            Err(ApiError::Validation(msg)) => assert_eq!(msg, "Name is required"),
            other => panic!("expected validation error, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn delete_requires_an_id_and_is_not_idempotent() {
        let (_dir, state) = test_state();
        let (_, Json(created)) = create_category(State(state.clone()), Json(body("DeFi")))
            .await
            .unwrap();

        let missing = IdQuery { id: None };
        let result = delete_category(State(state.clone()), Query(missing)).await;
        assert!(matches!(result, Err(ApiError::Validation(_))));

        let query = IdQuery {
            id: Some(created.category.id.to_string()),
        };
        let Json(deleted) = delete_category(State(state.clone()), Query(query)).await.unwrap();
        assert!(deleted.success);

        let again = IdQuery {
            id: Some(created.category.id.to_string()),
        };
        let result = delete_category(State(state), Query(again)).await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn rename_to_a_taken_name_conflicts() {
        let (_dir, state) = test_state();
        let (_, Json(defi)) = create_category(State(state.clone()), Json(body("DeFi")))
            .await
            .unwrap();
        create_category(State(state.clone()), Json(body("NFT")))
            .await
            .unwrap();

        let query = IdQuery {
            id: Some(defi.category.id.to_string()),
        };
        let result = update_category(State(state), Query(query), Json(body("NFT"))).await;
        assert!(matches!(result, Err(ApiError::Conflict(_))));
    }
}
