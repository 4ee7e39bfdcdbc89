use std::sync::Arc;

use anyhow::Result;
use axum::{Json, Router, http::StatusCode, response::IntoResponse};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

use super::api::{self, AppState};
use super::db::{DbHandle, TodoDb};
use super::models::{Envelope, NOT_FOUND};
use crate::config::ServerConfig;
use crate::errors::TodoError;

/// Build the full application router: API routes, request tracing and an
/// envelope-shaped 404 for unknown paths.
pub fn build_router(state: Arc<AppState>) -> Router {
    api::api_router()
        .fallback(fallback_handler)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn fallback_handler() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(Envelope::failure(NOT_FOUND, "Route Not Found")),
    )
}

/// Open (and migrate) the database file, creating its directory if needed.
pub fn open_database(config: &ServerConfig) -> Result<TodoDb, TodoError> {
    if let Some(parent) = config.db_path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| TodoError::DatabaseOpen {
            path: config.db_path.clone(),
            source: e.into(),
        })?;
    }

    TodoDb::new(&config.db_path).map_err(|source| TodoError::DatabaseOpen {
        path: config.db_path.clone(),
        source,
    })
}

/// Start the HTTP server and run until Ctrl+C.
pub async fn start_server(config: ServerConfig) -> Result<(), TodoError> {
    let db = open_database(&config)?;
    info!(db_path = %config.db_path.display(), "Database ready");

    let state = Arc::new(AppState::new(DbHandle::new(db)));
    let mut app = build_router(state);

    if config.dev_mode {
        app = app.layer(CorsLayer::permissive());
    }

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|source| TodoError::Bind {
            addr: addr.clone(),
            source,
        })?;

    let local_addr = listener.local_addr().map_err(|source| TodoError::Bind {
        addr: addr.clone(),
        source,
    })?;
    info!(addr = %local_addr, dev_mode = config.dev_mode, "Todo API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| TodoError::Other(anyhow::Error::new(e).context("Server error")))?;

    info!("Server shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to install Ctrl+C handler; shutdown signal disabled");
        std::future::pending::<()>().await;
    }
    info!("Shutting down...");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn test_router() -> Router {
        let db = TodoDb::new_in_memory().unwrap();
        build_router(Arc::new(AppState::new(DbHandle::new(db))))
    }

    async fn read_json(resp: axum::response::Response) -> serde_json::Value {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_via_full_router() {
        let app = test_router();
        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_api_routes_mounted() {
        let app = test_router();
        let req = Request::builder()
            .uri("/todo-items")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = read_json(resp).await;
        assert_eq!(body["status"], "Success");
        assert_eq!(body["data"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_unknown_route_gets_envelope() {
        let app = test_router();
        let req = Request::builder()
            .uri("/some/unknown/route")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let body = read_json(resp).await;
        assert_eq!(body["status"], "Not Found");
        assert_eq!(body["message"], "Route Not Found");
    }

    #[tokio::test]
    async fn test_create_group_via_full_router() {
        let app = test_router();
        let req = Request::builder()
            .method("POST")
            .uri("/activity-groups")
            .header("content-type", "application/json")
            .body(Body::from(
                serde_json::json!({"title": "server-test", "email": "s@example.com"}).to_string(),
            ))
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);

        let body = read_json(resp).await;
        assert_eq!(body["data"]["title"], "server-test");
        assert_eq!(body["data"]["email"], "s@example.com");
    }

    #[test]
    fn test_open_database_creates_parent_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServerConfig {
            db_path: dir.path().join("nested/deeper/todo.db"),
            ..ServerConfig::default()
        };
        open_database(&config).unwrap();
        assert!(config.db_path.exists());
    }

    #[test]
    fn test_open_database_reports_path_on_failure() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the database file should be.
        let config = ServerConfig {
            db_path: dir.path().to_path_buf(),
            ..ServerConfig::default()
        };
        let err = open_database(&config).unwrap_err();
        assert!(matches!(err, TodoError::DatabaseOpen { .. }));
        assert!(err.to_string().contains(&config.db_path.display().to_string()));
    }
}
