//! Monitoring endpoints: liveness, readiness and response statistics.
//!
//! `/health` answers as long as the process serves requests and never consults the
//! database. `/ready` is the stricter probe: it performs a round trip to PostgreSQL.

use axum::Router;
use axum::extract::State;
use axum::response::Json;
use axum::routing::get;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::{error, warn};

use crate::errors::ApiError;
use crate::sql;

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `"healthy"`.
    pub status: String,
    /// Server time in UTC.
    pub timestamp: DateTime<Utc>,
}

/// Body of `GET /ready`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadyResponse {
    /// Always `"ready"`.
    pub status: String,
    /// Server time in UTC.
    pub timestamp: DateTime<Utc>,
}

/// Body of `GET /api/stats`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsResponse {
    /// Number of stored survey responses.
    pub total_responses: i64,
    /// Server time in UTC.
    pub timestamp: DateTime<Utc>,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: Utc::now(),
    })
}

async fn ready(State(pool): State<PgPool>) -> Result<Json<ReadyResponse>, ApiError> {
    sql::ping(&pool).await.map_err(|e| {
        warn!(error = %e, "readiness probe failed");
        ApiError::Unavailable
    })?;
    Ok(Json(ReadyResponse {
        status: "ready".to_string(),
        timestamp: Utc::now(),
    }))
}

async fn stats(State(pool): State<PgPool>) -> Result<Json<StatsResponse>, ApiError> {
    let total_responses = sql::count_responses(&pool).await.inspect_err(|e| {
        error!(error = %e, "failed to count survey responses");
    })?;
    Ok(Json(StatsResponse {
        total_responses,
        timestamp: Utc::now(),
    }))
}

/// Creates an Axum router with the monitoring endpoints.
///
/// # Routes
/// - `GET /health` - Liveness; independent of database state
/// - `GET /ready` - Readiness; fails with 503 when the database is unreachable
/// - `GET /api/stats` - Total number of stored responses
pub fn create_monitor_router(pool: PgPool) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready))
        .route("/api/stats", get(stats))
        .with_state(pool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorEnvelope;
    use crate::survey_response::{SubmitResponse, create_submit_router};
    use crate::test_utils::test_helpers::{unreachable_pool, valid_payload};
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::{Value, json};

    #[tokio::test]
    async fn health_is_independent_of_database() {
        let server = TestServer::new(create_monitor_router(unreachable_pool())).unwrap();

        let response = server.get("/health").await;

        response.assert_status_ok();
        let body: HealthResponse = response.json();
        assert_eq!(body.status, "healthy");
        assert!(body.timestamp <= Utc::now());
    }

    #[tokio::test]
    async fn health_timestamp_is_iso8601() {
        let server = TestServer::new(create_monitor_router(unreachable_pool())).unwrap();

        let body: Value = server.get("/health").await.json();
        let timestamp = body["timestamp"].as_str().unwrap();
        assert!(DateTime::parse_from_rfc3339(timestamp).is_ok());
    }

    #[tokio::test]
    async fn ready_reports_unreachable_database() {
        let server = TestServer::new(create_monitor_router(unreachable_pool())).unwrap();

        let response = server.get("/ready").await;

        response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
        let envelope: ErrorEnvelope = response.json();
        assert_eq!(envelope.message, "database unreachable");
    }

    #[tokio::test]
    async fn stats_failure_is_server_error() {
        let server = TestServer::new(create_monitor_router(unreachable_pool())).unwrap();

        let response = server.get("/api/stats").await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn stats_track_accepted_submissions_only() {
        let pool = crate::sql::tests::setup_test_db().await;
        let app = create_submit_router(pool.clone()).merge(create_monitor_router(pool));
        let server = TestServer::new(app).unwrap();

        let before: StatsResponse = server.get("/api/stats").await.json();
        assert_eq!(before.total_responses, 0);

        let accepted: SubmitResponse = server
            .post("/api/submit")
            .json(&valid_payload())
            .await
            .json();
        assert!(accepted.response_id > 0);

        let after: StatsResponse = server.get("/api/stats").await.json();
        assert_eq!(after.total_responses, 1);

        let mut partial = valid_payload();
        partial["concerns"]
            .as_array_mut()
            .unwrap()
            .retain(|c| c["concern_type"] != "security");
        let response = server.post("/api/submit").json(&partial).await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        let envelope: ErrorEnvelope = response.json();
        assert!(envelope.errors.iter().any(|e| e.field == "concerns.security"));

        let mut wrong_scale = valid_payload();
        wrong_scale["features"][0]["rating"] = json!(0);
        server
            .post("/api/submit")
            .json(&wrong_scale)
            .await
            .assert_status(StatusCode::UNPROCESSABLE_ENTITY);

        let last: StatsResponse = server.get("/api/stats").await.json();
        assert_eq!(last.total_responses, 1);
    }

    #[tokio::test]
    async fn ready_against_live_database() {
        let pool = crate::sql::tests::setup_test_db().await;
        let server = TestServer::new(create_monitor_router(pool)).unwrap();

        let response = server.get("/ready").await;

        response.assert_status_ok();
        let body: ReadyResponse = response.json();
        assert_eq!(body.status, "ready");
    }
}
