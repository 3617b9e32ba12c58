use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::auth::{repo as auth_repo, AuthUser};
use crate::db::is_foreign_key_violation;
use crate::errors::AppError;
use crate::models::user::{Role, UserProfile};
use crate::routes::pagination::{PageParams, Paginated};
use crate::state::AppState;
use crate::users::repo;

#[derive(Deserialize)]
pub struct UserListQuery {
    pub role: Option<String>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

#[derive(Deserialize)]
pub struct RoleUpdate {
    pub role: String,
}

/// GET /api/v1/users
pub async fn handle_list_users(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<UserListQuery>,
) -> Result<Json<Paginated<UserProfile>>, AppError> {
    auth.require(Role::can_manage_users)?;
    let page = PageParams {
        page: query.page,
        per_page: query.per_page,
    }
    .validate()?;
    let role = query
        .role
        .as_deref()
        .map(str::parse::<Role>)
        .transpose()
        .map_err(AppError::Validation)?;

    let (rows, total) = repo::list_users(&state.db, role, page.limit(), page.offset()).await?;
    let users: Vec<UserProfile> = rows.into_iter().map(UserProfile::from).collect();
    Ok(Json(Paginated::new(users, page, total)))
}

/// PATCH /api/v1/users/:id/role
pub async fn handle_update_role(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<RoleUpdate>,
) -> Result<Json<UserProfile>, AppError> {
    auth.require(Role::can_manage_users)?;
    let role = req.role.parse::<Role>().map_err(AppError::Validation)?;
    if id == auth.user_id && role != Role::Admin {
        return Err(AppError::Validation("Admins cannot demote themselves".to_string()));
    }

    let user = repo::update_role(&state.db, id, role)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {id} not found")))?;
    info!("User {id} is now {role} (changed by {})", auth.user_id);
    Ok(Json(user.into()))
}

/// POST /api/v1/users/:id/toggle-status
///
/// Deactivating a user also revokes all of their sessions.
pub async fn handle_toggle_status(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<UserProfile>, AppError> {
    auth.require(Role::can_manage_users)?;
    if id == auth.user_id {
        return Err(AppError::Validation("Admins cannot deactivate themselves".to_string()));
    }

    let user = repo::toggle_active(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {id} not found")))?;
    if !user.is_active {
        let revoked = auth_repo::delete_user_sessions(&state.db, id, None).await?;
        info!("User {id} deactivated by {}, {revoked} sessions revoked", auth.user_id);
    } else {
        info!("User {id} activated by {}", auth.user_id);
    }
    Ok(Json(user.into()))
}

/// DELETE /api/v1/users/:id
pub async fn handle_delete_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    auth.require(Role::can_manage_users)?;
    if id == auth.user_id {
        return Err(AppError::Validation("Admins cannot delete themselves".to_string()));
    }

    match repo::delete_user(&state.db, id).await {
        Ok(true) => {
            info!("User {id} deleted by {}", auth.user_id);
            Ok(StatusCode::NO_CONTENT)
        }
        Ok(false) => Err(AppError::NotFound(format!("User {id} not found"))),
        Err(e) if is_foreign_key_violation(&e) => Err(AppError::Conflict(format!(
            "User {id} still owns jobs or resumes; reassign or delete them first"
        ))),
        Err(e) => Err(e.into()),
    }
}
