//! Survey response operations for PostgreSQL database.
//!
//! Responses are append-only: this module can insert, read and count parent rows but
//! offers no update or delete.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, Postgres, Transaction};

use super::SqlResult;
use crate::submission::ValidatedSubmission;

/// A persisted survey response row.
#[derive(Debug, Clone, FromRow)]
pub struct SurveyResponseRecord {
    /// Generated identifier.
    pub id: i64,
    /// When the response was stored.
    pub created_at: DateTime<Utc>,
    /// Q1.
    pub q1_eligible: bool,
    /// Q2.
    pub q2_participation: i32,
    /// Q3.
    pub q3_tech_comfort: i32,
    /// Canonical experimental group slug.
    pub experimental_group: String,
    /// Q4.
    pub q4_willingness: i32,
    /// Q7.
    pub q7_data_usage: String,
    /// Q8.
    pub q8_question_usage: String,
    /// Q9.
    pub q9_retention_time: String,
    /// Q10.
    pub q10_server_location: String,
    /// Q11.
    pub q11_open_response: Option<String>,
    /// Q12.
    pub q12_age: String,
    /// Q13.
    pub q13_gender: String,
    /// Q14.
    pub q14_canton: String,
    /// Q15.
    pub q15_language: String,
    /// Q16.
    pub q16_education: String,
}

/// Inserts the parent row of a submission and returns its generated id.
///
/// # Arguments
/// * `tx` - PostgreSQL transaction
/// * `submission` - The validated submission
///
/// # Returns
/// * `Ok(i64)` - The generated response id
/// * `Err(StorageError::Constraint)` - A column check failed
/// * `Err(StorageError::Internal)` - Database error
pub async fn create(
    tx: &mut Transaction<'_, Postgres>,
    submission: &ValidatedSubmission,
) -> SqlResult<i64> {
    let id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO survey_responses (
            q1_eligible, q2_participation, q3_tech_comfort,
            experimental_group, q4_willingness,
            q7_data_usage, q8_question_usage, q9_retention_time, q10_server_location,
            q11_open_response,
            q12_age, q13_gender, q14_canton, q15_language, q16_education
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
        RETURNING id
        "#,
    )
    .bind(submission.screener.eligible)
    .bind(submission.screener.participation.value())
    .bind(submission.screener.tech_comfort.value())
    .bind(submission.group.as_str())
    .bind(submission.willingness.value())
    .bind(&submission.governance.data_usage)
    .bind(&submission.governance.question_usage)
    .bind(&submission.governance.retention_time)
    .bind(&submission.governance.server_location)
    .bind(submission.governance.open_response.as_deref())
    .bind(&submission.demographics.age)
    .bind(&submission.demographics.gender)
    .bind(&submission.demographics.canton)
    .bind(&submission.demographics.language)
    .bind(&submission.demographics.education)
    .fetch_one(&mut **tx)
    .await?;

    Ok(id)
}

/// Retrieves a response row by id.
///
/// # Returns
/// * `Ok(Some(SurveyResponseRecord))` - Response found
/// * `Ok(None)` - No response with that id
/// * `Err(StorageError::Internal)` - Database error
pub async fn get(
    tx: &mut Transaction<'_, Postgres>,
    id: i64,
) -> SqlResult<Option<SurveyResponseRecord>> {
    let record = sqlx::query_as::<_, SurveyResponseRecord>(
        r#"
        SELECT id, created_at,
               q1_eligible, q2_participation, q3_tech_comfort,
               experimental_group, q4_willingness,
               q7_data_usage, q8_question_usage, q9_retention_time, q10_server_location,
               q11_open_response,
               q12_age, q13_gender, q14_canton, q15_language, q16_education
        FROM survey_responses
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(&mut **tx)
    .await?;

    Ok(record)
}

/// Counts all response rows.
pub async fn count(tx: &mut Transaction<'_, Postgres>) -> SqlResult<i64> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM survey_responses")
        .fetch_one(&mut **tx)
        .await?;
    Ok(count)
}
