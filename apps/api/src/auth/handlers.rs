use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::password::{
    hash_password_off_thread, verify_password_off_thread, MIN_PASSWORD_LEN,
};
use crate::auth::{repo, session_cookie, AuthUser};
use crate::db::is_unique_violation;
use crate::errors::AppError;
use crate::models::user::{Role, UserProfile, UserRow};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub role: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct PasswordChangeRequest {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

#[derive(Deserialize)]
pub struct ProfileUpdate {
    pub full_name: Option<String>,
    pub email: Option<String>,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Serialize)]
pub struct AuthResponse {
    pub user: UserProfile,
    /// Same value as the cookie, for clients that send a bearer header.
    pub token: String,
}

fn validate_email(email: &str) -> Result<(), AppError> {
    let email = email.trim();
    if email.len() > 254 || !email.contains('@') || email.starts_with('@') || email.ends_with('@') {
        return Err(AppError::Validation("A valid email address is required".to_string()));
    }
    Ok(())
}

fn validate_new_password(password: &str) -> Result<(), AppError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

fn validate_full_name(full_name: &str) -> Result<(), AppError> {
    if full_name.trim().is_empty() || full_name.chars().count() > 100 {
        return Err(AppError::Validation(
            "full_name must be between 1 and 100 characters".to_string(),
        ));
    }
    Ok(())
}

/// Checks registration input and resolves the requested role.
pub(crate) fn validate_registration(req: &RegisterRequest) -> Result<Role, AppError> {
    validate_email(&req.email)?;
    validate_new_password(&req.password)?;
    validate_full_name(&req.full_name)?;

    let role = match req.role.as_deref() {
        None => Role::Student,
        Some(raw) => raw.parse::<Role>().map_err(AppError::Validation)?,
    };
    if role == Role::Admin {
        return Err(AppError::Validation(
            "The admin role cannot be self-assigned".to_string(),
        ));
    }
    Ok(role)
}

async fn open_session(state: &AppState, user: UserRow) -> Result<(String, AuthResponse), AppError> {
    let session_id = Uuid::new_v4().to_string();
    let ttl = Duration::hours(state.config.session_ttl_hours);
    repo::create_session(&state.db, &session_id, user.id, Utc::now() + ttl).await?;

    let cookie = session_cookie(&session_id, ttl.num_seconds());
    Ok((
        cookie,
        AuthResponse {
            user: user.into(),
            token: session_id,
        },
    ))
}

/// POST /api/v1/auth/register
pub async fn handle_register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    let role = validate_registration(&req)?;
    let email = req.email.trim().to_lowercase();

    if repo::find_user_by_email(&state.db, &email).await?.is_some() {
        return Err(AppError::Conflict(format!("Email {email} is already registered")));
    }

    let password_hash = hash_password_off_thread(req.password.clone()).await?;
    let user = repo::create_user(&state.db, &email, req.full_name.trim(), role, &password_hash)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict(format!("Email {email} is already registered"))
            } else {
                AppError::Database(e)
            }
        })?;
    info!("Registered user {} as {}", user.id, role);

    let (cookie, body) = open_session(&state, user).await?;
    Ok((StatusCode::CREATED, [(header::SET_COOKIE, cookie)], Json(body)))
}

/// POST /api/v1/auth/login
pub async fn handle_login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = repo::find_user_by_email(&state.db, req.email.trim())
        .await?
        .ok_or(AppError::Unauthorized)?;

    let valid = user.is_active
        && verify_password_off_thread(req.password.clone(), user.password_hash.clone()).await;
    if !valid {
        warn!("Rejected login for {}", user.id);
        return Err(AppError::Unauthorized);
    }

    repo::touch_last_login(&state.db, user.id).await?;
    let purged = repo::purge_expired_sessions(&state.db).await?;
    if purged > 0 {
        info!("Purged {purged} expired sessions");
    }

    let (cookie, body) = open_session(&state, user).await?;
    Ok((StatusCode::OK, [(header::SET_COOKIE, cookie)], Json(body)))
}

/// POST /api/v1/auth/logout
pub async fn handle_logout(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<impl IntoResponse, AppError> {
    repo::delete_session(&state.db, &auth.session_id).await?;
    Ok((
        StatusCode::NO_CONTENT,
        [(header::SET_COOKIE, session_cookie("", 0))],
    ))
}

/// GET /api/v1/auth/me
pub async fn handle_me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<UserProfile>, AppError> {
    let user = repo::find_user(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", auth.user_id)))?;
    Ok(Json(user.into()))
}

/// Checks a password change before the current password is verified.
pub(crate) fn validate_password_change(req: &PasswordChangeRequest) -> Result<(), AppError> {
    if req.current_password.is_empty() {
        return Err(AppError::Validation("Current password is required".to_string()));
    }
    validate_new_password(&req.new_password)?;
    if req.new_password != req.confirm_password {
        return Err(AppError::Validation("New passwords do not match".to_string()));
    }
    Ok(())
}

/// POST /api/v1/auth/change-password
///
/// Other sessions of the user are revoked; the calling session stays valid.
pub async fn handle_change_password(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(req): Json<PasswordChangeRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    validate_password_change(&req)?;

    let user = repo::find_user(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", auth.user_id)))?;
    if !verify_password_off_thread(req.current_password, user.password_hash).await {
        return Err(AppError::Validation("Current password is incorrect".to_string()));
    }

    let password_hash = hash_password_off_thread(req.new_password).await?;
    repo::update_password(&state.db, user.id, &password_hash).await?;
    let revoked = repo::delete_user_sessions(&state.db, user.id, Some(&auth.session_id)).await?;
    info!("User {} changed password, {revoked} other sessions revoked", user.id);

    Ok(Json(MessageResponse {
        message: "Password changed successfully".to_string(),
    }))
}

/// PATCH /api/v1/auth/me
pub async fn handle_update_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(req): Json<ProfileUpdate>,
) -> Result<Json<UserProfile>, AppError> {
    if let Some(name) = &req.full_name {
        validate_full_name(name)?;
    }
    if let Some(email) = &req.email {
        validate_email(email)?;
    }
    let full_name = req.full_name.as_deref().map(str::trim);
    let email = req.email.as_deref().map(|e| e.trim().to_lowercase());

    let user = repo::update_profile(&state.db, auth.user_id, full_name, email.as_deref())
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict("Email is already registered".to_string())
            } else {
                AppError::Database(e)
            }
        })?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", auth.user_id)))?;
    Ok(Json(user.into()))
}
