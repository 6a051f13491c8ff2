use axum::{
    extract::{Path, Query, State},
    routing::{delete, get},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::{dto::PublicUser, extractors::AdminUser, repo_types::User},
    error::ApiError,
    products::dto::{Deleted, ListQuery},
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/:id", delete(delete_user))
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
    AdminUser(_principal): AdminUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<PublicUser>>, ApiError> {
    let users = User::list(&state.db, query.effective_limit()).await?;
    Ok(Json(users.into_iter().map(PublicUser::from).collect()))
}

/// Deleting a user leaves their products in place; the owner reference
/// is weak and dangles by design.
#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    AdminUser(principal): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Deleted>, ApiError> {
    if !User::delete(&state.db, id).await? {
        return Err(ApiError::NotFound("User"));
    }
    info!(user_id = %id, deleted_by = %principal.user_id, "user deleted");
    Ok(Json(Deleted { deleted: true }))
}
