//! Feature importance operations for PostgreSQL database.
//!
//! Each survey response owns exactly six feature rows, one per [`FeatureCategory`].

use sqlx::{Postgres, Transaction};

use super::SqlResult;
use crate::category::FeatureCategory;
use crate::errors::StorageError;
use crate::validate::{CategoryRatings, Ordinal};

/// A persisted feature importance row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureImportanceRecord {
    /// Generated identifier.
    pub id: i64,
    /// The owning survey response.
    pub response_id: i64,
    /// The rated feature.
    pub feature_type: FeatureCategory,
    /// The importance value.
    pub rating: i32,
}

/// Inserts a single feature importance rating.
pub async fn create(
    tx: &mut Transaction<'_, Postgres>,
    response_id: i64,
    feature: FeatureCategory,
    rating: Ordinal,
) -> SqlResult<()> {
    sqlx::query(
        r#"
        INSERT INTO feature_importance (response_id, feature_type, rating)
        VALUES ($1, $2, $3)
        "#,
    )
    .bind(response_id)
    .bind(feature.to_string())
    .bind(rating.value())
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Inserts every feature rating of one response.
pub async fn create_all(
    tx: &mut Transaction<'_, Postgres>,
    response_id: i64,
    ratings: &CategoryRatings<FeatureCategory>,
) -> SqlResult<()> {
    for (feature, rating) in ratings.iter() {
        create(tx, response_id, feature, rating).await?;
    }
    Ok(())
}

/// Lists the feature ratings of one response, ordered by insertion.
pub async fn list_for_response(
    tx: &mut Transaction<'_, Postgres>,
    response_id: i64,
) -> SqlResult<Vec<FeatureImportanceRecord>> {
    let rows: Vec<(i64, i64, String, i32)> = sqlx::query_as(
        r#"
        SELECT id, response_id, feature_type, rating
        FROM feature_importance
        WHERE response_id = $1
        ORDER BY id ASC
        "#,
    )
    .bind(response_id)
    .fetch_all(&mut **tx)
    .await?;

    rows.into_iter()
        .map(|(id, response_id, feature_type, rating)| -> SqlResult<FeatureImportanceRecord> {
            let feature_type = feature_type
                .parse::<FeatureCategory>()
                .map_err(|e| StorageError::Internal(format!("corrupt feature row {}: {}", id, e)))?;
            Ok(FeatureImportanceRecord {
                id,
                response_id,
                feature_type,
                rating,
            })
        })
        .collect()
}
