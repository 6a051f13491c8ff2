use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::{error::ApiError, products::repo::Product};

pub(crate) const DEFAULT_LIST_LIMIT: i64 = 100;

/// Result cap: defaults to 100, clamped to [1, 100].
pub(crate) fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_LIST_LIMIT).clamp(1, DEFAULT_LIST_LIMIT)
}

/// Bare `limit` query parameter for the admin listings.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
}

impl ListQuery {
    pub fn effective_limit(&self) -> i64 {
        clamp_limit(self.limit)
    }
}

/// Query parameters for the product listing.
#[derive(Debug, Default, Deserialize)]
pub struct ProductFilter {
    /// Case-insensitive substring match over name and description.
    pub q: Option<String>,
    pub category: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub limit: Option<i64>,
}

impl ProductFilter {
    pub fn effective_limit(&self) -> i64 {
        clamp_limit(self.limit)
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateProduct {
    pub name: String,
    pub description: String,
    pub image_url: String,
    pub price: f64,
    pub marketplace_link: String,
    pub category: Option<String>,
    pub discount_id: Option<Uuid>,
}

impl CreateProduct {
    pub fn validate(&self) -> Result<(), ApiError> {
        validate_price(self.price)
    }
}

pub(crate) fn validate_price(price: f64) -> Result<(), ApiError> {
    if !price.is_finite() || price < 0.0 {
        return Err(ApiError::Validation("Price must be non-negative".into()));
    }
    Ok(())
}

/// Distinguishes an absent field (keep current value) from an explicit
/// null (clear it): missing maps to None, null to Some(None).
fn clearable<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

/// Partial update: every field independently optional.
#[derive(Debug, Default, Deserialize)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub price: Option<f64>,
    pub marketplace_link: Option<String>,
    #[serde(default, deserialize_with = "clearable")]
    pub category: Option<Option<String>>,
    #[serde(default, deserialize_with = "clearable")]
    pub discount_id: Option<Option<Uuid>>,
}

impl ProductPatch {
    /// The discount id this patch introduces, if any. Only a newly set
    /// reference needs existence validation; clears and untouched fields
    /// do not.
    pub fn new_discount_id(&self) -> Option<Uuid> {
        match self.discount_id {
            Some(Some(id)) => Some(id),
            _ => None,
        }
    }

    pub fn apply(&self, product: &mut Product) {
        if let Some(name) = &self.name {
            product.name = name.clone();
        }
        if let Some(description) = &self.description {
            product.description = description.clone();
        }
        if let Some(image_url) = &self.image_url {
            product.image_url = image_url.clone();
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(link) = &self.marketplace_link {
            product.marketplace_link = link.clone();
        }
        if let Some(category) = &self.category {
            product.category = category.clone();
        }
        if let Some(discount_id) = self.discount_id {
            product.discount_id = discount_id;
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Deleted {
    pub deleted: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    fn sample_product() -> Product {
        Product {
            id: Uuid::new_v4(),
            name: "Rattan chair".into(),
            description: "Hand-woven".into(),
            image_url: "https://img.example/chair.jpg".into(),
            price: 45.0,
            marketplace_link: "https://shop.example/chair".into(),
            category: Some("furniture".into()),
            discount_id: Some(Uuid::new_v4()),
            owner_id: Uuid::new_v4(),
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn limit_defaults_and_clamps() {
        assert_eq!(ProductFilter::default().effective_limit(), 100);
        let f = ProductFilter {
            limit: Some(10),
            ..Default::default()
        };
        assert_eq!(f.effective_limit(), 10);
        let f = ProductFilter {
            limit: Some(5000),
            ..Default::default()
        };
        assert_eq!(f.effective_limit(), 100);
        let f = ProductFilter {
            limit: Some(0),
            ..Default::default()
        };
        assert_eq!(f.effective_limit(), 1);
    }

    #[test]
    fn list_query_limit_defaults_and_clamps() {
        assert_eq!(ListQuery::default().effective_limit(), 100);
        assert_eq!(ListQuery { limit: Some(5) }.effective_limit(), 5);
        assert_eq!(ListQuery { limit: Some(5000) }.effective_limit(), 100);
        assert_eq!(ListQuery { limit: Some(-3) }.effective_limit(), 1);
        let q: ListQuery = serde_json::from_str(r#"{"limit": 7}"#).expect("deserialize");
        assert_eq!(q.effective_limit(), 7);
    }

    #[test]
    fn negative_price_is_rejected() {
        assert!(validate_price(-0.01).is_err());
        assert!(validate_price(f64::NAN).is_err());
        assert!(validate_price(0.0).is_ok());
        assert!(validate_price(19.99).is_ok());
    }

    #[test]
    fn patch_absent_fields_keep_values() {
        let mut product = sample_product();
        let before = product.clone();
        let patch: ProductPatch = serde_json::from_str("{}").expect("deserialize");
        patch.apply(&mut product);
        assert_eq!(product.name, before.name);
        assert_eq!(product.category, before.category);
        assert_eq!(product.discount_id, before.discount_id);
    }

    #[test]
    fn patch_null_clears_discount_and_category() {
        let mut product = sample_product();
        let patch: ProductPatch =
            serde_json::from_str(r#"{"discount_id": null, "category": null}"#)
                .expect("deserialize");
        assert!(patch.new_discount_id().is_none());
        patch.apply(&mut product);
        assert_eq!(product.discount_id, None);
        assert_eq!(product.category, None);
    }

    #[test]
    fn patch_value_replaces_field() {
        let mut product = sample_product();
        let id = Uuid::new_v4();
        let patch: ProductPatch = serde_json::from_str(&format!(
            r#"{{"name": "Teak chair", "price": 60.5, "discount_id": "{id}"}}"#
        ))
        .expect("deserialize");
        assert_eq!(patch.new_discount_id(), Some(id));
        patch.apply(&mut product);
        assert_eq!(product.name, "Teak chair");
        assert_eq!(product.price, 60.5);
        assert_eq!(product.discount_id, Some(id));
    }
}
