//! # survey-backend: Questionnaire Collection for a Civic Data-Sharing Study
//!
//! This crate accepts completed questionnaires over HTTP and stores them in a
//! normalized PostgreSQL schema for later analysis. Participants are assigned to one
//! of four vignettes in a 2x2 factorial design (transparency x user control) and rate
//! their willingness to share data, five concerns, and six governance features.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │ HTTP API Layer (Axum routes, CORS)      │
//! ├─────────────────────────────────────────┤
//! │ Validation (typed submission, errors)   │
//! ├─────────────────────────────────────────┤
//! │ Closed category sets                    │
//! ├─────────────────────────────────────────┤
//! │ Persistence (one transaction per POST)  │
//! ├─────────────────────────────────────────┤
//! │ Schema (sqlx migrations)                │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Schema
//!
//! - `survey_responses`: one row per participant
//! - `concern_ratings`: exactly five rows per response, one per [`ConcernCategory`]
//! - `feature_importance`: exactly six rows per response, one per [`FeatureCategory`]
//!
//! Both child tables reference their response with `ON DELETE CASCADE`. Responses are
//! append-only through the API.
//!
//! ## Validating a Submission
//!
//! ```rust
//! use survey_backend::{ConcernCategory, ExperimentalGroup, ValidatedSubmission};
//! use serde_json::json;
//!
//! let payload = json!({
//!     "q1_eligible": true,
//!     "q2_participation": 4,
//!     "q3_tech_comfort": 3,
//!     "experimental_group": "transparency-high/control-low",
//!     "q4_willingness": 5,
//!     "concerns": {"privacy": 6, "misuse": 5, "commercial": 7, "trust": 2, "security": 4},
//!     "features": {
//!         "anonymization": 7, "swiss_only": 6, "delete": 5,
//!         "impact": 3, "civic_use": 4, "time_limit": 1
//!     },
//!     "q7_data_usage": "public_institutions_only",
//!     "q8_question_usage": "aggregate_statistics",
//!     "q9_retention_time": "one_year",
//!     "q10_server_location": "switzerland",
//!     "q12_age": "25-34",
//!     "q13_gender": "female",
//!     "q14_canton": "ZH",
//!     "q15_language": "de",
//!     "q16_education": "university"
//! });
//!
//! let submission = ValidatedSubmission::from_value(&payload).unwrap();
//! assert_eq!(submission.group, ExperimentalGroup::TransparencyHighControlLow);
//! assert_eq!(submission.concerns.get(ConcernCategory::Commercial).unwrap().value(), 7);
//!
//! let mut incomplete = payload.clone();
//! incomplete["concerns"].as_object_mut().unwrap().remove("trust");
//! let rejection = ValidatedSubmission::from_value(&incomplete).unwrap_err();
//! assert!(rejection.mentions("concerns.trust"));
//! ```
//!
//! ## Serving
//!
//! ```no_run
//! # use sqlx::PgPool;
//! # async fn example(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
//! let origins = vec!["https://ailights.org".to_string()];
//! let app = survey_backend::create_router(pool, &origins);
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
mod category;
mod errors;
mod monitor;
mod router;
mod submission;
mod survey_response;
mod validate;

/// Command-line interface utilities for program termination and output formatting.
pub mod cli_utils;

/// Command handlers for the surveyctl CLI application.
pub mod commands;

/// Server configuration from command-line overrides and the environment.
pub mod config;

/// HTTP client utilities for interacting with a running survey server.
pub mod http_utils;

/// PostgreSQL operations, organized by table.
pub mod sql;

pub use category::{
    CategoryParseError, ConcernCategory, ExperimentalGroup, FeatureCategory, RatedCategory,
};
pub use errors::{ApiError, ErrorEnvelope, StorageError};
pub use monitor::{HealthResponse, ReadyResponse, StatsResponse, create_monitor_router};
pub use router::{cors_layer, create_router};
pub use submission::{Demographics, Governance, Screener, ValidatedSubmission};
pub use survey_response::{SubmitResponse, create_submit_router};
pub use validate::{
    CategoryRatings, FieldError, FieldErrorKind, Fields, MAX_CHOICE_LEN, MAX_OPEN_RESPONSE_LEN,
    Ordinal, RATING_SCALE, SCREENER_SCALE, SubmissionRejection,
};
