//! Concern rating operations for PostgreSQL database.
//!
//! Each survey response owns exactly five concern rows, one per
//! [`ConcernCategory`]. The table's `UNIQUE (response_id, concern_type)` constraint
//! backs that up at the storage level.

use sqlx::{Postgres, Transaction};

use super::SqlResult;
use crate::category::ConcernCategory;
use crate::errors::StorageError;
use crate::validate::{CategoryRatings, Ordinal};

/// A persisted concern rating row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConcernRatingRecord {
    /// Generated identifier.
    pub id: i64,
    /// The owning survey response.
    pub response_id: i64,
    /// The rated concern.
    pub concern_type: ConcernCategory,
    /// The rating value.
    pub rating: i32,
}

/// Inserts a single concern rating.
///
/// # Returns
/// * `Ok(())` - Row inserted
/// * `Err(StorageError::Constraint)` - Category already rated for this response, or the
///   response does not exist
/// * `Err(StorageError::Internal)` - Database error
pub async fn create(
    tx: &mut Transaction<'_, Postgres>,
    response_id: i64,
    concern: ConcernCategory,
    rating: Ordinal,
) -> SqlResult<()> {
    sqlx::query(
        r#"
        INSERT INTO concern_ratings (response_id, concern_type, rating)
        VALUES ($1, $2, $3)
        "#,
    )
    .bind(response_id)
    .bind(concern.to_string())
    .bind(rating.value())
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Inserts every concern rating of one response.
pub async fn create_all(
    tx: &mut Transaction<'_, Postgres>,
    response_id: i64,
    ratings: &CategoryRatings<ConcernCategory>,
) -> SqlResult<()> {
    for (concern, rating) in ratings.iter() {
        create(tx, response_id, concern, rating).await?;
    }
    Ok(())
}

/// Lists the concern ratings of one response, ordered by insertion.
pub async fn list_for_response(
    tx: &mut Transaction<'_, Postgres>,
    response_id: i64,
) -> SqlResult<Vec<ConcernRatingRecord>> {
    let rows: Vec<(i64, i64, String, i32)> = sqlx::query_as(
        r#"
        SELECT id, response_id, concern_type, rating
        FROM concern_ratings
        WHERE response_id = $1
        ORDER BY id ASC
        "#,
    )
    .bind(response_id)
    .fetch_all(&mut **tx)
    .await?;

    rows.into_iter()
        .map(|(id, response_id, concern_type, rating)| -> SqlResult<ConcernRatingRecord> {
            let concern_type = concern_type
                .parse::<ConcernCategory>()
                .map_err(|e| StorageError::Internal(format!("corrupt concern row {}: {}", id, e)))?;
            Ok(ConcernRatingRecord {
                id,
                response_id,
                concern_type,
                rating,
            })
        })
        .collect()
}
