use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;
use uuid::Uuid;

use crate::{
    auth::{jwt::JwtKeys, repo_types::Role},
    error::ApiError,
};

/// Authenticated identity derived from a verified bearer token.
#[derive(Debug, Clone, Copy)]
pub struct Principal {
    pub user_id: Uuid,
    pub role: Role,
}

/// Admits any authenticated principal.
#[derive(Debug)]
pub struct AuthUser(pub Principal);

/// Admits only principals with the admin role. Authentication is checked
/// first: a missing or invalid token is Unauthorized, never Forbidden.
#[derive(Debug)]
pub struct AdminUser(pub Principal);

fn authenticate<S>(parts: &Parts, state: &S) -> Result<Principal, ApiError>
where
    JwtKeys: FromRef<S>,
{
    let keys = JwtKeys::from_ref(state);
    let auth_header = parts
        .headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::Unauthorized("Missing Authorization header"))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .or_else(|| auth_header.strip_prefix("bearer "))
        .ok_or(ApiError::Unauthorized("Invalid Authorization header"))?;

    let claims = keys.verify(token).map_err(|_| {
        warn!("invalid or expired token");
        ApiError::Unauthorized("Invalid or expired token")
    })?;

    Ok(Principal {
        user_id: claims.sub,
        role: claims.role,
    })
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        authenticate(parts, state).map(AuthUser)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let principal = authenticate(parts, state)?;
        if principal.role != Role::Admin {
            warn!(user_id = %principal.user_id, "admin route denied");
            return Err(ApiError::Forbidden("Admin only"));
        }
        Ok(AdminUser(principal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppState;
    use axum::http::{header, Request, StatusCode};

    fn parts_with_auth(value: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/products");
        if let Some(v) = value {
            builder = builder.header(header::AUTHORIZATION, v);
        }
        let (parts, _) = builder.body(()).expect("request").into_parts();
        parts
    }

    fn token_for(state: &AppState, role: Role) -> (Uuid, String) {
        let keys = JwtKeys::from_ref(state);
        let id = Uuid::new_v4();
        (id, keys.sign(id, role).expect("sign"))
    }

    #[tokio::test]
    async fn missing_header_is_unauthorized() {
        let state = AppState::fake();
        let mut parts = parts_with_auth(None);
        let err = AuthUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn wrong_scheme_is_unauthorized() {
        let state = AppState::fake();
        let mut parts = parts_with_auth(Some("Basic dXNlcjpwdw=="));
        let err = AuthUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn valid_token_yields_principal() {
        let state = AppState::fake();
        let (id, token) = token_for(&state, Role::User);
        let mut parts = parts_with_auth(Some(&format!("Bearer {token}")));
        let AuthUser(principal) = AuthUser::from_request_parts(&mut parts, &state)
            .await
            .expect("authenticated");
        assert_eq!(principal.user_id, id);
        assert_eq!(principal.role, Role::User);
    }

    #[tokio::test]
    async fn admin_gate_rejects_user_role_with_forbidden() {
        let state = AppState::fake();
        let (_, token) = token_for(&state, Role::User);
        let mut parts = parts_with_auth(Some(&format!("Bearer {token}")));
        let err = AdminUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn admin_gate_accepts_admin_role() {
        let state = AppState::fake();
        let (id, token) = token_for(&state, Role::Admin);
        let mut parts = parts_with_auth(Some(&format!("Bearer {token}")));
        let AdminUser(principal) = AdminUser::from_request_parts(&mut parts, &state)
            .await
            .expect("authorized");
        assert_eq!(principal.user_id, id);
    }

    #[tokio::test]
    async fn bad_token_on_admin_route_is_unauthorized_not_forbidden() {
        let state = AppState::fake();
        let mut parts = parts_with_auth(Some("Bearer garbage"));
        let err = AdminUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }
}
