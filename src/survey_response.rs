//! # Survey Submission Endpoint
//!
//! `POST /api/submit` accepts one questionnaire, validates it, and persists it as a
//! survey response with its concern and feature ratings in a single transaction.
//!
//! ## Responses
//!
//! | Outcome | Status | Body |
//! |---|---|---|
//! | stored | 200 | `{"status":"success","message":"Survey response recorded","response_id":17}` |
//! | body is not JSON | 400/415 | `{"status":"error","message":...,"errors":[{"field":"$","kind":"malformed",...}]}` |
//! | validation failed | 422 | `{"status":"error","message":...,"errors":[{"field":"concerns.trust","kind":"missing",...}]}` |
//! | storage failed | 500 | `{"status":"error","message":"failed to store survey data"}` |

use axum::Router;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::response::Json;
use axum::routing::post;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::PgPool;
use tracing::{error, info, warn};

use crate::errors::ApiError;
use crate::sql;
use crate::submission::ValidatedSubmission;

/// Success body of `POST /api/submit`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitResponse {
    /// Always `"success"`.
    pub status: String,
    /// Human-readable confirmation.
    pub message: String,
    /// Identifier of the stored survey response.
    pub response_id: i64,
}

impl SubmitResponse {
    /// The body returned after a response was stored.
    pub fn recorded(response_id: i64) -> Self {
        Self {
            status: "success".to_string(),
            message: "Survey response recorded".to_string(),
            response_id,
        }
    }
}

async fn submit(
    State(pool): State<PgPool>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<SubmitResponse>, ApiError> {
    let Json(payload) = payload.inspect_err(|rejection| {
        warn!(reason = %rejection.body_text(), "unreadable submission body");
    })?;

    let submission = ValidatedSubmission::from_value(&payload).inspect_err(|rejection| {
        warn!(%rejection, "rejected survey submission");
    })?;

    let response_id = sql::record_submission(&pool, &submission)
        .await
        .inspect_err(|e| {
            error!(error = %e, "failed to record survey response");
        })?;

    info!(
        response_id,
        group = %submission.group,
        "survey response recorded"
    );
    Ok(Json(SubmitResponse::recorded(response_id)))
}

/// Creates an Axum router with the submission endpoint.
///
/// # Routes
/// - `POST /api/submit` - Validate and store one questionnaire submission
pub fn create_submit_router(pool: PgPool) -> Router {
    Router::new()
        .route("/api/submit", post(submit))
        .with_state(pool)
}
