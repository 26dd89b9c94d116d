use std::sync::Arc;

use axum::{http, Router};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

use ratezilla_database::basic_db::{InnerDatabase, SafeDatabase};
use ratezilla_service::seed::seed_if_empty;
use ratezilla_service::store::Store;
use ratezilla_social::github::GitHubClient;
use ratezilla_social::twitter::TwitterClient;

use crate::category::*;
use crate::config::Config;
use crate::contract::*;
use crate::github::*;
use crate::metrics::*;
use crate::project::*;
use crate::router::*;
use crate::state::AppState;
use crate::stellar::*;
use crate::twitter::*;
use crate::upload::*;
use crate::vote::*;

pub async fn build_server() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::load();

    let db = InnerDatabase::new(&config.db_path).unwrap();
    let store = Store::new(db);
    let seeded = seed_if_empty(&store).unwrap();
    if seeded > 0 {
        info!("Seeded {seeded} starter projects");
    }

    let shared_state = AppState {
        store,
        github: GitHubClient::new(config.github_token),
        twitter: Arc::new(TwitterClient::new(config.twitter_bearer)),
        horizon_override: config.horizon_url,
    };

    let components = collect_components();

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            http::Method::GET,
            http::Method::POST,
            http::Method::PUT,
            http::Method::DELETE,
            http::Method::OPTIONS
        ])
        .allow_headers(Any)
        .allow_credentials(false);

    let app = main_router(components, shared_state).layer(cors);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port))
        .await
        .unwrap();
    info!("Listening on 0.0.0.0:{}", config.port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}

type S = AppState<InnerDatabase>;

fn collect_components() -> Vec<(String, Router<S>)> {
    // Public directory
    let router_projects_get = get_router_builder("/api/projects".to_string(), list_projects::<InnerDatabase>);
    let router_project_get = get_router_builder("/api/projects/{id}".to_string(), get_project::<InnerDatabase>);
    let router_vote_post = post_router_builder("/api/votes".to_string(), submit_vote::<InnerDatabase>);

    // Admin CRUD
    let router_admin_projects_get = get_router_builder("/api/admin/projects".to_string(), admin_list_projects::<InnerDatabase>);
    let router_admin_project_post = post_router_builder("/api/admin/projects".to_string(), create_project::<InnerDatabase>);
    let router_admin_project_put = put_router_builder("/api/admin/projects".to_string(), update_project::<InnerDatabase>);
    let router_admin_project_delete = delete_router_builder("/api/admin/projects".to_string(), delete_project::<InnerDatabase>);

    let router_categories_get = get_router_builder("/api/admin/categories".to_string(), list_categories::<InnerDatabase>);
    let router_category_post = post_router_builder("/api/admin/categories".to_string(), create_category::<InnerDatabase>);
    let router_category_put = put_router_builder("/api/admin/categories".to_string(), update_category::<InnerDatabase>);
    let router_category_delete = delete_router_builder("/api/admin/categories".to_string(), delete_category::<InnerDatabase>);

    // Metrics and integrations
    let router_metrics_put = put_router_builder("/api/metrics".to_string(), refresh_metrics::<InnerDatabase>);
    let router_github_repo_get = get_router_builder("/api/github/{owner}/{repo}".to_string(), get_repo::<InnerDatabase>);
    let router_github_org_get = get_router_builder("/api/github/org/{org}".to_string(), get_org::<InnerDatabase>);
    let router_twitter_get = get_router_builder("/api/twitter/{username}".to_string(), get_user::<InnerDatabase>);

    // Contracts and chain data
    let router_interaction_post = post_router_builder("/api/contracts/interactions".to_string(), record_interaction::<InnerDatabase>);
    let router_wallet_history_get = get_router_builder("/api/stellar/wallet-history".to_string(), wallet_history::<InnerDatabase>);

    // Logo storage
    let router_upload_post = post_router_builder("/api/upload".to_string(), upload_logo::<InnerDatabase>);
    let router_logo_get = get_router_builder("/api/logos/{filename}".to_string(), serve_logo::<InnerDatabase>);

    vec![
        router_projects_get,
        router_project_get,
        router_vote_post,

        router_admin_projects_get,
        router_admin_project_post,
        router_admin_project_put,
        router_admin_project_delete,

        router_categories_get,
        router_category_post,
        router_category_put,
        router_category_delete,

        router_metrics_put,
        router_github_repo_get,
        router_github_org_get,
        router_twitter_get,

        router_interaction_post,
        router_wallet_history_get,

        router_upload_post,
        router_logo_get,
    ]
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::test_state;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn routes_are_wired_end_to_end() {
        let (_dir, state) = test_state();
        seed_if_empty(&state.store).unwrap();
        let app = main_router(collect_components(), state);

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/projects")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/projects/1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/votes?projectId=1&userId=GVOTER&value=4")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn unknown_project_is_a_404_with_error_body() {
        let (_dir, state) = test_state();
        let app = main_router(collect_components(), state);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/projects/999")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "Project not found");
    }
}
