use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    auth::extractors::AdminUser,
    discounts::{dto::CreateDiscount, repo::Discount},
    error::ApiError,
    products::dto::ListQuery,
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new().route("/discounts", post(create_discount).get(list_discounts))
}

#[instrument(skip(state, payload))]
pub async fn create_discount(
    State(state): State<AppState>,
    AdminUser(principal): AdminUser,
    Json(payload): Json<CreateDiscount>,
) -> Result<(StatusCode, Json<Discount>), ApiError> {
    payload.validate()?;
    let discount = Discount::create(&state.db, &payload).await?;
    info!(
        discount_id = %discount.id,
        percentage = discount.percentage,
        created_by = %principal.user_id,
        "discount created"
    );
    Ok((StatusCode::CREATED, Json(discount)))
}

#[instrument(skip(state))]
pub async fn list_discounts(
    State(state): State<AppState>,
    AdminUser(_principal): AdminUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Discount>>, ApiError> {
    let discounts = Discount::list(&state.db, query.effective_limit()).await?;
    Ok(Json(discounts))
}
