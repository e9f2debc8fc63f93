use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::auth::{normalize_phone, validate_account};
use crate::auth::extractor::AuthUser;
use crate::auth::password;
use crate::db;
use crate::error::AppError;
use crate::models::{NewUser, Role, User};
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct CreateStaff {
    pub username: String,
    pub password: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub specialization: Option<String>,
    pub role: Option<Role>,
}

pub async fn list(
    auth: AuthUser,
    State(state): State<SharedState>,
) -> Result<Json<Vec<User>>, AppError> {
    auth.require_role(&[Role::Landlord, Role::Admin])?;
    Ok(Json(db::users::list_by_role(&state.store, Role::Staff).await))
}

pub async fn create(
    auth: AuthUser,
    State(state): State<SharedState>,
    Json(req): Json<CreateStaff>,
) -> Result<(StatusCode, Json<User>), AppError> {
    auth.require_role(&[Role::Landlord, Role::Admin])?;
    validate_account(&req.username, &req.password, &req.name, &req.email)?;

    let role = match req.role.unwrap_or(Role::Staff) {
        Role::Staff => Role::Staff,
        Role::Admin if auth.role == Role::Admin => Role::Admin,
        Role::Admin => {
            return Err(AppError::Forbidden(
                "Only administrators can create administrators".to_string(),
            ));
        }
        _ => {
            return Err(AppError::BadRequest(
                "Role must be staff or admin".to_string(),
            ));
        }
    };

    let specialization = req
        .specialization
        .map(|s| s.trim().to_ascii_lowercase())
        .filter(|s| !s.is_empty());

    let password_hash = password::hash(&req.password).map_err(AppError::Internal)?;

    let user = db::users::create(
        &state.store,
        NewUser {
            username: req.username.trim().to_string(),
            password_hash,
            role,
            name: req.name.trim().to_string(),
            email: req.email.trim().to_string(),
            phone: normalize_phone(req.phone),
            specialization,
        },
    )
    .await?;

    tracing::info!(
        "User {} added {} {} ({})",
        auth.user_id,
        role.as_str(),
        user.id,
        user.specialization.as_deref().unwrap_or("no specialization")
    );

    Ok((StatusCode::CREATED, Json(user)))
}
