use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::discounts::dto::CreateDiscount;

/// Discount record. `active` is a stored flag; nothing here derives it
/// from the current time versus the start/end window.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Discount {
    pub id: Uuid,
    pub percentage: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub start_date: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub end_date: OffsetDateTime,
    pub active: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Discount {
    pub async fn create(db: &PgPool, input: &CreateDiscount) -> Result<Discount, sqlx::Error> {
        sqlx::query_as::<_, Discount>(
            r#"
            INSERT INTO discounts (percentage, start_date, end_date, active)
            VALUES ($1, $2, $3, $4)
            RETURNING id, percentage, start_date, end_date, active, created_at
            "#,
        )
        .bind(input.percentage)
        .bind(input.start_date)
        .bind(input.end_date)
        .bind(input.active)
        .fetch_one(db)
        .await
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> Result<Option<Discount>, sqlx::Error> {
        sqlx::query_as::<_, Discount>(
            r#"
            SELECT id, percentage, start_date, end_date, active, created_at
            FROM discounts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await
    }

    pub async fn list(db: &PgPool, limit: i64) -> Result<Vec<Discount>, sqlx::Error> {
        sqlx::query_as::<_, Discount>(
            r#"
            SELECT id, percentage, start_date, end_date, active, created_at
            FROM discounts
            ORDER BY created_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(db)
        .await
    }
}
