use axum::Router;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

pub(crate) fn init(state: AppState) -> Router {
    let api = Router::new()
        .route("/config/{map}", get(handlers::map_config))
        .route("/config/{map}/layers/{layer}", get(handlers::normalized_layer))
        .route("/layers", get(handlers::layers_store))
        .route("/export/{map}/{format}", get(handlers::export))
        .route("/maps", get(handlers::available_maps))
        .route("/maps/{name}", post(handlers::create_map).delete(handlers::delete_map))
        .route("/maps/{src}/duplicate/{dest}", post(handlers::duplicate_map))
        .route("/usermaps", get(handlers::user_maps))
        .route("/groups", get(handlers::available_groups))
        .route("/groups/common", get(handlers::common_groups));

    Router::new()
        .nest("/api/v1", api)
        .merge(vista::server::router::system_router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Method, Request, StatusCode};
    use serde_json::{Value, json};
    use std::collections::BTreeMap;
    use tempfile::TempDir;
    use tower::ServiceExt;
    use vista::domain::config::ApiConfig;

    const HEADER: &str = "X-Control-Header";

    async fn app(temp: &TempDir) -> Router {
        let mut cfg = ApiConfig::default();
        cfg.storage.data_dir = temp.path().to_path_buf();
        cfg.access.restrict_by_groups = true;
        cfg.access.directory.members =
            BTreeMap::from([("alice".to_owned(), vec!["planners".to_owned()])]);

        std::fs::write(temp.path().join("layers.json"), r#"{ "wmslayers": [] }"#).unwrap();
        std::fs::write(
            temp.path().join("planning.json"),
            json!({
                "map": { "projection": "EPSG:3006" },
                "tools": [
                    { "type": "layerswitcher", "options": { "visibleForGroups": ["planners"] } }
                ]
            })
            .to_string(),
        )
        .unwrap();

        let service = vista::init(&cfg).await.unwrap();
        init(AppState::new(service, &cfg.access.identity_header))
    }

    async fn send(
        app: Router,
        method: Method,
        uri: &str,
        user: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            request = request.header(HEADER, user);
        }

        let response = app.oneshot(request.body(Body::empty()).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        if bytes.is_empty() {
            return (status, Value::Null);
        }
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_map_config_for_member() {
        let temp = TempDir::new().unwrap();
        let (status, body) =
            send(app(&temp).await, Method::GET, "/api/v1/config/planning", Some("alice")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["map"]["projection"], "EPSG:3006");
    }

    #[tokio::test]
    async fn test_errors_map_to_status_codes() {
        let temp = TempDir::new().unwrap();
        let app = app(&temp).await;

        let cases = [
            ("/api/v1/config/planning", None, StatusCode::FORBIDDEN),
            ("/api/v1/config/missing", Some("alice"), StatusCode::NOT_FOUND),
            ("/api/v1/config/layers", Some("alice"), StatusCode::BAD_REQUEST),
            ("/api/v1/export/planning/xlsx", Some("alice"), StatusCode::NOT_IMPLEMENTED),
        ];

        for (uri, user, expected) in cases {
            let (status, body) = send(app.clone(), Method::GET, uri, user).await;
            assert_eq!(status, expected, "{uri}");
            assert!(body["error"].is_string(), "{uri}");
        }
    }

    #[tokio::test]
    async fn test_map_lifecycle() {
        let temp = TempDir::new().unwrap();
        let app = app(&temp).await;
        std::fs::create_dir_all(temp.path().join("templates")).unwrap();
        std::fs::write(temp.path().join("templates/map.template"), r#"{ "tools": [] }"#).unwrap();

        let (status, _) = send(app.clone(), Method::POST, "/api/v1/maps/fresh", None).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, _) =
            send(app.clone(), Method::POST, "/api/v1/maps/fresh/duplicate/copy", None).await;
        assert_eq!(status, StatusCode::CREATED);

        let (_, maps) = send(app.clone(), Method::GET, "/api/v1/maps", None).await;
        assert_eq!(maps, json!(["copy", "fresh", "planning"]));

        let (status, _) = send(app.clone(), Method::DELETE, "/api/v1/maps/copy", None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_health_is_outside_the_api_prefix() {
        let temp = TempDir::new().unwrap();
        let (status, body) = send(app(&temp).await, Method::GET, "/health", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "up");
    }
}
