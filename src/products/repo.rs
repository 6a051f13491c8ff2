use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::products::dto::{CreateProduct, ProductFilter};

/// Product record. `discount_id` and `owner_id` are weak references:
/// no foreign keys, deleting the referent never cascades here.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub image_url: String,
    pub price: f64,
    pub marketplace_link: String,
    pub category: Option<String>,
    pub discount_id: Option<Uuid>,
    pub owner_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Escape LIKE metacharacters so a search for "50%" or "a_b" matches
/// literally instead of acting as a wildcard pattern.
pub(crate) fn escape_like(q: &str) -> String {
    q.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

impl Product {
    /// Filtered listing, newest first. Absent filters bind as NULL and
    /// collapse in SQL, so one static query covers every combination.
    pub async fn list(db: &PgPool, filter: &ProductFilter) -> Result<Vec<Product>, sqlx::Error> {
        sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, description, image_url, price, marketplace_link,
                   category, discount_id, owner_id, created_at
            FROM products
            WHERE ($1::text IS NULL OR name ILIKE '%' || $1 || '%'
                                    OR description ILIKE '%' || $1 || '%')
              AND ($2::text IS NULL OR category = $2)
              AND ($3::float8 IS NULL OR price >= $3)
              AND ($4::float8 IS NULL OR price <= $4)
            ORDER BY created_at DESC
            LIMIT $5
            "#,
        )
        .bind(filter.q.as_deref().map(escape_like))
        .bind(&filter.category)
        .bind(filter.min_price)
        .bind(filter.max_price)
        .bind(filter.effective_limit())
        .fetch_all(db)
        .await
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> Result<Option<Product>, sqlx::Error> {
        sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, description, image_url, price, marketplace_link,
                   category, discount_id, owner_id, created_at
            FROM products
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await
    }

    pub async fn create(
        db: &PgPool,
        input: &CreateProduct,
        owner_id: Uuid,
    ) -> Result<Product, sqlx::Error> {
        sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products
                (name, description, image_url, price, marketplace_link,
                 category, discount_id, owner_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, name, description, image_url, price, marketplace_link,
                      category, discount_id, owner_id, created_at
            "#,
        )
        .bind(&input.name)
        .bind(&input.description)
        .bind(&input.image_url)
        .bind(input.price)
        .bind(&input.marketplace_link)
        .bind(&input.category)
        .bind(input.discount_id)
        .bind(owner_id)
        .fetch_one(db)
        .await
    }

    /// Persist all mutable columns of an already-patched product.
    pub async fn save(&self, db: &PgPool) -> Result<Product, sqlx::Error> {
        sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET name = $2, description = $3, image_url = $4, price = $5,
                marketplace_link = $6, category = $7, discount_id = $8
            WHERE id = $1
            RETURNING id, name, description, image_url, price, marketplace_link,
                      category, discount_id, owner_id, created_at
            "#,
        )
        .bind(self.id)
        .bind(&self.name)
        .bind(&self.description)
        .bind(&self.image_url)
        .bind(self.price)
        .bind(&self.marketplace_link)
        .bind(&self.category)
        .bind(self.discount_id)
        .fetch_one(db)
        .await
    }

    pub async fn delete(db: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let res = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_like_neutralizes_wildcards() {
        assert_eq!(escape_like("50%"), "50\\%");
        assert_eq!(escape_like("a_b"), "a\\_b");
        assert_eq!(escape_like("back\\slash"), "back\\\\slash");
        assert_eq!(escape_like("plain chair"), "plain chair");
    }
}
