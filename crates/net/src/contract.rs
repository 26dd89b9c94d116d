use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use ratezilla_database::basic_db::SafeDatabase;
use ratezilla_service::model::Contract;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct AddressQuery {
    pub address: Option<String>,
}

/// Bumps the interaction counter for a tracked contract and stamps the time.
pub async fn record_interaction<T: SafeDatabase>(
    State(state): State<AppState<T>>,
    Query(query): Query<AddressQuery>,
) -> Result<Json<Contract>, ApiError> {
    let address = query
        .address
        .filter(|a| !a.trim().is_empty())
        .ok_or_else(|| ApiError::Validation("Contract address is required".to_string()))?;

    let contract = state.store.record_interaction(&address)?;
    Ok(Json(contract))
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::test_state;
    use ratezilla_service::store::{NewContract, NewProject};

    #[tokio::test]
    async fn interactions_accumulate_per_contract() {
        let (_dir, state) = test_state();
        state
            .store
            .create_project(NewProject {
                name: "Soroswap".to_string(),
                description: "AMM".to_string(),
                contracts: vec![NewContract {
                    name: "Router".to_string(),
                    address: "CROUTER".to_string(),
                    contract_type: "Router".to_string(),
                }],
                ..NewProject::default()
            })
            .unwrap();

        let query = AddressQuery {
            address: Some("CROUTER".to_string()),
        };
        let Json(first) = record_interaction(State(state.clone()), Query(query)).await.unwrap();
        assert_eq!(first.interactions, 1);

        let query = AddressQuery {
            address: Some("CROUTER".to_string()),
        };
        let Json(second) = record_interaction(State(state), Query(query)).await.unwrap();
        assert_eq!(second.interactions, 2);
    }

    #[tokio::test]
    async fn unknown_address_is_not_found_and_missing_address_invalid() {
        let (_dir, state) = test_state();

        let query = AddressQuery {
            address: Some("CNOPE".to_string()),
        };
        let result = record_interaction(State(state.clone()), Query(query)).await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));

        let result = record_interaction(State(state), Query(AddressQuery { address: None })).await;
        assert!(matches!(result, Err(ApiError::Validation(_))));
    }
}
