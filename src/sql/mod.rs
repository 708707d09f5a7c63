//! PostgreSQL database operations for the survey store.
//!
//! This module provides functions for interacting with the PostgreSQL database,
//! organized by table. Every write for one submission happens inside a single
//! transaction; see [`record_submission`].

use sqlx::PgPool;
use tracing::debug;

use crate::errors::StorageError;
use crate::submission::ValidatedSubmission;

/// Survey response (parent row) operations.
pub mod survey_response;

/// Concern rating (Q5) operations.
pub mod concern_rating;

/// Feature importance (Q6) operations.
pub mod feature_importance;

/// Result type for database operations.
pub type SqlResult<T> = Result<T, StorageError>;

/// Persists one validated submission atomically and returns its generated id.
///
/// The parent row, its five concern ratings and its six feature ratings are written in
/// one transaction. If any insert fails the transaction is dropped without commit, which
/// rolls it back, so no partial record is ever visible.
///
/// # Examples
/// ```no_run
/// # use survey_backend::{ValidatedSubmission, sql};
/// # use sqlx::PgPool;
/// # async fn example(pool: PgPool, payload: serde_json::Value) -> Result<(), Box<dyn std::error::Error>> {
/// let submission = ValidatedSubmission::from_value(&payload)?;
/// let response_id = sql::record_submission(&pool, &submission).await?;
/// assert!(response_id > 0);
/// # Ok(())
/// # }
/// ```
pub async fn record_submission(
    pool: &PgPool,
    submission: &ValidatedSubmission,
) -> SqlResult<i64> {
    let mut tx = pool.begin().await?;
    let response_id = survey_response::create(&mut tx, submission).await?;
    concern_rating::create_all(&mut tx, response_id, &submission.concerns).await?;
    feature_importance::create_all(&mut tx, response_id, &submission.features).await?;
    tx.commit().await?;
    debug!(response_id, "committed survey response transaction");
    Ok(response_id)
}

/// Counts every persisted survey response.
pub async fn count_responses(pool: &PgPool) -> SqlResult<i64> {
    let mut tx = pool.begin().await?;
    let count = survey_response::count(&mut tx).await?;
    tx.commit().await?;
    Ok(count)
}

/// Performs a round trip to the database.
pub async fn ping(pool: &PgPool) -> SqlResult<()> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
