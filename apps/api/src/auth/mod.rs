//! Session authentication: argon2 passwords, opaque session ids in
//! `auth_sessions`, presented as a `session` cookie or a bearer token.

pub mod handlers;
pub mod password;
pub mod repo;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::user::Role;
use crate::state::AppState;

pub const SESSION_COOKIE: &str = "session";

/// The authenticated caller, placed in request extensions by `require_auth`.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: Role,
    pub session_id: String,
}

impl AuthUser {
    /// Forbidden unless the caller's role passes `permitted`, e.g. `Role::can_evaluate`.
    pub fn require(&self, permitted: impl Fn(&Role) -> bool) -> Result<(), AppError> {
        if permitted(&self.role) {
            Ok(())
        } else {
            Err(AppError::Forbidden)
        }
    }

    /// Admins may act on anything; everyone else only on what they own.
    pub fn require_owner_or_admin(&self, owner: Uuid) -> Result<(), AppError> {
        if self.role == Role::Admin || self.user_id == owner {
            Ok(())
        } else {
            Err(AppError::Forbidden)
        }
    }
}

/// Session id from the `session` cookie, else from `Authorization: Bearer`.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let from_cookie = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .find_map(|c| {
            c.trim()
                .strip_prefix(SESSION_COOKIE)
                .and_then(|rest| rest.strip_prefix('='))
        })
        .filter(|v| !v.is_empty());

    from_cookie
        .or_else(|| {
            headers
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.strip_prefix("Bearer "))
                .map(str::trim)
                .filter(|v| !v.is_empty())
        })
        .map(str::to_string)
}

pub fn session_cookie(session_id: &str, max_age_secs: i64) -> String {
    format!(
        "{SESSION_COOKIE}={session_id}; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age={max_age_secs}"
    )
}

/// Rejects the request with 401 unless it carries a live session.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let session_id = session_token(req.headers()).ok_or(AppError::Unauthorized)?;

    // A lookup failure is a 500, not a logout.
    let user = repo::find_session_user(&state.db, &session_id)
        .await?
        .ok_or(AppError::Unauthorized)?;

    req.extensions_mut().insert(AuthUser {
        user_id: user.id,
        role: user.role(),
        session_id,
    });

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn user(role: Role) -> AuthUser {
        AuthUser {
            user_id: Uuid::new_v4(),
            role,
            session_id: "s".into(),
        }
    }

    #[test]
    fn test_token_from_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("theme=dark; session=abc-123"));
        assert_eq!(session_token(&headers).as_deref(), Some("abc-123"));
    }

    #[test]
    fn test_token_from_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer tok"));
        assert_eq!(session_token(&headers).as_deref(), Some("tok"));
    }

    #[test]
    fn test_similar_cookie_name_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("sessionx=nope"));
        assert_eq!(session_token(&headers), None);
    }

    #[test]
    fn test_role_guards() {
        let mentor = user(Role::Mentor);
        assert!(mentor.require(Role::can_manage_jobs).is_err());
        assert!(mentor.require(Role::can_evaluate).is_ok());
        assert!(mentor.require_owner_or_admin(mentor.user_id).is_ok());
        assert!(mentor.require_owner_or_admin(Uuid::new_v4()).is_err());
        assert!(user(Role::Admin).require_owner_or_admin(Uuid::new_v4()).is_ok());
    }

    #[test]
    fn test_cookie_format() {
        let cookie = session_cookie("abc", 3600);
        assert!(cookie.starts_with("session=abc;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.ends_with("Max-Age=3600"));
    }
}
