use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::CookieJar;

use crate::auth::jwt;
use crate::auth::session::{hash_session_id, SESSION_COOKIE};
use crate::db;
use crate::error::AppError;
use crate::models::Role;
use crate::state::SharedState;

/// An authenticated caller. Extracting it from a request without a live
/// session rejects with 401.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: u64,
    pub role: Role,
    pub session_hash: String,
}

impl AuthUser {
    pub fn require_role(&self, allowed: &[Role]) -> Result<(), AppError> {
        if allowed.contains(&self.role) {
            Ok(())
        } else {
            let names: Vec<&str> = allowed.iter().map(Role::as_str).collect();
            Err(AppError::Forbidden(format!(
                "Requires one of the roles: {}",
                names.join(", ")
            )))
        }
    }
}

impl FromRequestParts<SharedState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let bearer = parts
            .headers
            .get("authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.strip_prefix("Bearer "))
            .map(str::to_string);

        let token = match bearer {
            Some(token) => token,
            None => CookieJar::from_headers(&parts.headers)
                .get(SESSION_COOKIE)
                .map(|c| c.value().to_string())
                .ok_or_else(|| AppError::Unauthorized("Not authenticated".to_string()))?,
        };

        let claims = jwt::decode_token(&token, &state.config.session_secret)
            .map_err(|_| AppError::Unauthorized("Invalid or expired session".to_string()))?;

        let session_hash = hash_session_id(&claims.sid);
        let session = db::sessions::find_valid(&state.store, &session_hash)
            .await
            .ok_or_else(|| AppError::Unauthorized("Session has ended".to_string()))?;

        if session.user_id != claims.sub {
            return Err(AppError::Unauthorized("Invalid session".to_string()));
        }

        Ok(AuthUser {
            user_id: claims.sub,
            role: claims.role,
            session_hash,
        })
    }
}
