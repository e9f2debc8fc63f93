use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::auth::extractor::AuthUser;
use crate::db;
use crate::error::AppError;
use crate::models::{Role, SecurityAlert};
use crate::realtime::Event;
use crate::state::SharedState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAlert {
    pub property_id: u64,
    #[serde(rename = "type")]
    pub alert_type: String,
    pub message: String,
}

pub async fn list(
    _auth: AuthUser,
    State(state): State<SharedState>,
) -> Json<Vec<SecurityAlert>> {
    Json(db::alerts::list(&state.store).await)
}

pub async fn create(
    auth: AuthUser,
    State(state): State<SharedState>,
    Json(req): Json<CreateAlert>,
) -> Result<(StatusCode, Json<SecurityAlert>), AppError> {
    auth.require_role(&[Role::Landlord, Role::Admin, Role::Staff])?;

    if req.alert_type.trim().is_empty() || req.message.trim().is_empty() {
        return Err(AppError::BadRequest(
            "Alert type and message are required".to_string(),
        ));
    }

    db::properties::find_by_id(&state.store, req.property_id)
        .await
        .ok_or_else(|| AppError::NotFound("Property not found".to_string()))?;

    let alert = db::alerts::create(
        &state.store,
        req.property_id,
        req.alert_type.trim(),
        req.message.trim(),
    )
    .await;

    tracing::warn!(
        "Security alert {} on property {}: {}",
        alert.id,
        alert.property_id,
        alert.alert_type
    );
    state
        .broadcaster
        .publish(&Event::SecurityAlert(alert.clone()));

    Ok((StatusCode::CREATED, Json(alert)))
}

pub async fn mark_read(
    _auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<u64>,
) -> Result<Json<SecurityAlert>, AppError> {
    Ok(Json(db::alerts::mark_read(&state.store, id).await?))
}
