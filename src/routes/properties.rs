use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::auth::extractor::AuthUser;
use crate::db;
use crate::error::AppError;
use crate::models::{NewProperty, Property, PropertyStatus, Role};
use crate::state::SharedState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProperty {
    pub name: String,
    pub address: String,
    pub rent: i64,
    #[serde(default)]
    pub status: PropertyStatus,
    pub image_url: Option<String>,
    pub utilities: Option<serde_json::Value>,
    /// Only honoured for administrators; landlords always own what they add.
    pub landlord_id: Option<u64>,
}

#[derive(Deserialize)]
pub struct UpdateStatus {
    pub status: PropertyStatus,
}

pub async fn list(
    _auth: AuthUser,
    State(state): State<SharedState>,
) -> Json<Vec<Property>> {
    Json(db::properties::list(&state.store).await)
}

pub async fn get(
    _auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<u64>,
) -> Result<Json<Property>, AppError> {
    let property = db::properties::find_by_id(&state.store, id)
        .await
        .ok_or_else(|| AppError::NotFound("Property not found".to_string()))?;
    Ok(Json(property))
}

pub async fn create(
    auth: AuthUser,
    State(state): State<SharedState>,
    Json(req): Json<CreateProperty>,
) -> Result<(StatusCode, Json<Property>), AppError> {
    auth.require_role(&[Role::Landlord, Role::Admin])?;

    if req.name.trim().is_empty() || req.address.trim().is_empty() {
        return Err(AppError::BadRequest(
            "Name and address are required".to_string(),
        ));
    }
    if req.rent < 0 {
        return Err(AppError::BadRequest("Rent cannot be negative".to_string()));
    }

    let landlord_id = match (auth.role, req.landlord_id) {
        (Role::Admin, Some(id)) => {
            let landlord = db::users::find_by_id(&state.store, id)
                .await
                .ok_or_else(|| AppError::NotFound("Landlord not found".to_string()))?;
            if landlord.role != Role::Landlord {
                return Err(AppError::BadRequest(
                    "landlordId must refer to a landlord".to_string(),
                ));
            }
            landlord.id
        }
        _ => auth.user_id,
    };

    let utilities = match req.utilities {
        Some(v @ serde_json::Value::Object(_)) => v,
        Some(_) => {
            return Err(AppError::BadRequest(
                "utilities must be an object".to_string(),
            ));
        }
        None => serde_json::json!({}),
    };

    let property = db::properties::create(
        &state.store,
        NewProperty {
            name: req.name.trim().to_string(),
            address: req.address.trim().to_string(),
            landlord_id,
            status: req.status,
            rent: req.rent,
            image_url: req.image_url,
            utilities,
        },
    )
    .await;

    tracing::info!("Property {} created for landlord {landlord_id}", property.id);
    Ok((StatusCode::CREATED, Json(property)))
}

pub async fn update_status(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<u64>,
    Json(req): Json<UpdateStatus>,
) -> Result<Json<Property>, AppError> {
    auth.require_role(&[Role::Landlord, Role::Admin])?;

    let property = db::properties::find_by_id(&state.store, id)
        .await
        .ok_or_else(|| AppError::NotFound("Property not found".to_string()))?;
    if auth.role == Role::Landlord && property.landlord_id != auth.user_id {
        return Err(AppError::Forbidden(
            "You can only update your own properties".to_string(),
        ));
    }

    let property = db::properties::update_status(&state.store, id, req.status).await?;
    Ok(Json(property))
}
