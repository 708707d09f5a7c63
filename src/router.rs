use std::time::Duration;

use axum::Router;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, Method};
use sqlx::PgPool;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::monitor::create_monitor_router;
use crate::survey_response::create_submit_router;

/// Builds the complete application: submission and monitoring routes behind the CORS
/// allow-list and request tracing.
pub fn create_router(pool: PgPool, allowed_origins: &[String]) -> Router {
    Router::new()
        .merge(create_submit_router(pool.clone()))
        .merge(create_monitor_router(pool))
        .layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
}

/// CORS restricted to an explicit list of frontend origins.
pub fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(%origin, "ignoring unparseable CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(Duration::from_secs(60 * 60))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_helpers::unreachable_pool;
    use axum::http::HeaderName;
    use axum_test::TestServer;

    fn origins() -> Vec<String> {
        vec![
            "https://ailights.org".to_string(),
            "http://localhost:3000".to_string(),
        ]
    }

    #[tokio::test]
    async fn allowed_origin_is_echoed() {
        let server = TestServer::new(create_router(unreachable_pool(), &origins())).unwrap();

        let response = server
            .get("/health")
            .add_header(
                HeaderName::from_static("origin"),
                HeaderValue::from_static("https://ailights.org"),
            )
            .await;

        response.assert_status_ok();
        assert_eq!(
            response.headers().get("access-control-allow-origin"),
            Some(&HeaderValue::from_static("https://ailights.org"))
        );
    }

    #[tokio::test]
    async fn foreign_origin_is_not_allowed() {
        let server = TestServer::new(create_router(unreachable_pool(), &origins())).unwrap();

        let response = server
            .get("/health")
            .add_header(
                HeaderName::from_static("origin"),
                HeaderValue::from_static("https://evil.example"),
            )
            .await;

        assert!(
            response
                .headers()
                .get("access-control-allow-origin")
                .is_none()
        );
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let server = TestServer::new(create_router(unreachable_pool(), &origins())).unwrap();
        server
            .get("/api/responses")
            .await
            .assert_status_not_found();
    }
}
