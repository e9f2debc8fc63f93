use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};

use crate::auth::extractor::AuthUser;
use crate::auth::password::{self, MIN_PASSWORD_LEN};
use crate::auth::session;
use crate::db;
use crate::error::AppError;
use crate::models::{NewUser, Role, User};
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: Option<Role>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Shape checks shared by self-registration and staff onboarding.
pub(crate) fn validate_account(
    username: &str,
    password: &str,
    name: &str,
    email: &str,
) -> Result<(), AppError> {
    if username.trim().len() < 3 {
        return Err(AppError::BadRequest(
            "Username must be at least 3 characters".to_string(),
        ));
    }
    if password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::BadRequest(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    if name.trim().len() < 2 {
        return Err(AppError::BadRequest(
            "Full name must be at least 2 characters".to_string(),
        ));
    }
    let valid_email = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if !valid_email {
        return Err(AppError::BadRequest(
            "Must be a valid email address".to_string(),
        ));
    }
    Ok(())
}

pub(crate) fn normalize_phone(phone: Option<String>) -> Option<String> {
    phone
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
}

pub async fn register(
    State(state): State<SharedState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, CookieJar, Json<User>), AppError> {
    validate_account(&req.username, &req.password, &req.name, &req.email)?;

    let role = match req.role.unwrap_or(Role::Tenant) {
        role @ (Role::Tenant | Role::Landlord | Role::Admin) => role,
        Role::Staff => {
            return Err(AppError::Forbidden(
                "Staff accounts are created by a landlord".to_string(),
            ));
        }
    };

    let password_hash = password::hash(&req.password).map_err(AppError::Internal)?;

    let new = NewUser {
        username: req.username.trim().to_string(),
        password_hash,
        role,
        name: req.name.trim().to_string(),
        email: req.email.trim().to_string(),
        phone: normalize_phone(req.phone),
        specialization: None,
    };

    // Only the very first account may bootstrap an administrator.
    let user = if role == Role::Admin {
        db::users::create_first(&state.store, new)
            .await?
            .ok_or_else(|| {
                AppError::Forbidden("Administrator accounts cannot be self-registered".to_string())
            })?
    } else {
        db::users::create(&state.store, new).await?
    };

    tracing::info!("Registered user {} as {}", user.id, role.as_str());

    let jar = session::start(&state, &user).await?;
    Ok((StatusCode::CREATED, jar, Json(user)))
}

pub async fn login(
    State(state): State<SharedState>,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, Json<User>), AppError> {
    if state.login_limiter.check(&req.username).is_err() {
        return Err(AppError::RateLimited(
            "Too many login attempts. Please try again later.".to_string(),
        ));
    }

    let Some(user) = db::users::find_by_username(&state.store, &req.username).await else {
        state.login_limiter.record_failure(&req.username);
        return Err(AppError::Unauthorized("Invalid credentials".to_string()));
    };

    let valid = password::verify(&req.password, &user.password_hash).map_err(AppError::Internal)?;
    if !valid {
        state.login_limiter.record_failure(&req.username);
        return Err(AppError::Unauthorized("Invalid credentials".to_string()));
    }

    state.login_limiter.reset(&req.username);

    let jar = session::start(&state, &user).await?;
    Ok((jar, Json(user)))
}

pub async fn logout(
    auth: AuthUser,
    State(state): State<SharedState>,
) -> (CookieJar, Json<MessageResponse>) {
    db::sessions::delete(&state.store, &auth.session_hash).await;

    (
        session::clear_cookie(),
        Json(MessageResponse {
            message: "Logged out successfully".to_string(),
        }),
    )
}

pub async fn current_user(
    auth: AuthUser,
    State(state): State<SharedState>,
) -> Result<Json<User>, AppError> {
    let user = db::users::find_by_id(&state.store, auth.user_id)
        .await
        .ok_or_else(|| AppError::Unauthorized("User not found".to_string()))?;
    Ok(Json(user))
}
