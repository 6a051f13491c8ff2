use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::extractors::AdminUser,
    discounts::repo::Discount,
    error::ApiError,
    products::{
        dto::{validate_price, CreateProduct, Deleted, ProductFilter, ProductPatch},
        repo::Product,
    },
    state::AppState,
};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products))
        .route("/products/:id", get(get_product))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/products", post(create_product))
        .route("/products/:id", put(update_product).delete(delete_product))
}

/// A discount reference must resolve at write time. Read-then-write;
/// a concurrent discount delete between the two leaves a dangling id,
/// which reads tolerate.
async fn ensure_discount_exists(state: &AppState, id: Uuid) -> Result<(), ApiError> {
    if Discount::find_by_id(&state.db, id).await?.is_none() {
        warn!(discount_id = %id, "dangling discount reference");
        return Err(ApiError::Validation("Unknown discount".into()));
    }
    Ok(())
}

#[instrument(skip(state))]
pub async fn list_products(
    State(state): State<AppState>,
    Query(filter): Query<ProductFilter>,
) -> Result<Json<Vec<Product>>, ApiError> {
    let products = Product::list(&state.db, &filter).await?;
    Ok(Json(products))
}

#[instrument(skip(state))]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Product>, ApiError> {
    let product = Product::find_by_id(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("Product"))?;
    Ok(Json(product))
}

#[instrument(skip(state, payload))]
pub async fn create_product(
    State(state): State<AppState>,
    AdminUser(principal): AdminUser,
    Json(payload): Json<CreateProduct>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    payload.validate()?;
    if let Some(discount_id) = payload.discount_id {
        ensure_discount_exists(&state, discount_id).await?;
    }

    let product = Product::create(&state.db, &payload, principal.user_id).await?;
    info!(product_id = %product.id, owner_id = %principal.user_id, "product created");
    Ok((StatusCode::CREATED, Json(product)))
}

#[instrument(skip(state, payload))]
pub async fn update_product(
    State(state): State<AppState>,
    AdminUser(_principal): AdminUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ProductPatch>,
) -> Result<Json<Product>, ApiError> {
    if let Some(price) = payload.price {
        validate_price(price)?;
    }
    if let Some(discount_id) = payload.new_discount_id() {
        ensure_discount_exists(&state, discount_id).await?;
    }

    let mut product = Product::find_by_id(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("Product"))?;
    payload.apply(&mut product);
    let product = product.save(&state.db).await?;

    info!(product_id = %product.id, "product updated");
    Ok(Json(product))
}

#[instrument(skip(state))]
pub async fn delete_product(
    State(state): State<AppState>,
    AdminUser(_principal): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Deleted>, ApiError> {
    if !Product::delete(&state.db, id).await? {
        return Err(ApiError::NotFound("Product"));
    }
    info!(product_id = %id, "product deleted");
    Ok(Json(Deleted { deleted: true }))
}
