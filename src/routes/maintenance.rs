use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::auth::extractor::AuthUser;
use crate::db;
use crate::error::AppError;
use crate::models::{
    MaintenanceReport, MaintenanceRequest, NewMaintenanceReport, NewMaintenanceRequest, Priority,
    Role,
};
use crate::services::maintenance;
use crate::state::SharedState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequest {
    pub property_id: u64,
    pub title: String,
    pub description: String,
    pub category: String,
    #[serde(default)]
    pub priority: Priority,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignRequest {
    pub staff_id: u64,
}

#[derive(Serialize)]
pub struct CompletionResponse {
    pub request: MaintenanceRequest,
    pub report: MaintenanceReport,
}

#[derive(Serialize)]
pub struct RecommendationResponse {
    pub recommendation: String,
}

fn can_view(auth: &AuthUser, request: &MaintenanceRequest) -> bool {
    match auth.role {
        Role::Tenant => request.tenant_id == auth.user_id,
        Role::Staff => request.assigned_staff_id == Some(auth.user_id),
        Role::Landlord | Role::Admin => true,
    }
}

async fn load_visible(
    state: &SharedState,
    auth: &AuthUser,
    id: u64,
) -> Result<MaintenanceRequest, AppError> {
    db::maintenance::find_by_id(&state.store, id)
        .await
        .filter(|r| can_view(auth, r))
        .ok_or_else(|| AppError::NotFound("Maintenance request not found".to_string()))
}

pub async fn list(
    auth: AuthUser,
    State(state): State<SharedState>,
) -> Json<Vec<MaintenanceRequest>> {
    let requests = match auth.role {
        Role::Tenant => db::maintenance::list_for_tenant(&state.store, auth.user_id).await,
        Role::Staff => db::maintenance::list_for_staff(&state.store, auth.user_id).await,
        Role::Landlord | Role::Admin => db::maintenance::list(&state.store).await,
    };
    Json(requests)
}

pub async fn get(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<u64>,
) -> Result<Json<MaintenanceRequest>, AppError> {
    Ok(Json(load_visible(&state, &auth, id).await?))
}

pub async fn create(
    auth: AuthUser,
    State(state): State<SharedState>,
    Json(req): Json<CreateRequest>,
) -> Result<(StatusCode, Json<MaintenanceRequest>), AppError> {
    let request = maintenance::create_request(
        &state,
        NewMaintenanceRequest {
            property_id: req.property_id,
            tenant_id: auth.user_id,
            title: req.title.trim().to_string(),
            description: req.description.trim().to_string(),
            category: req.category.trim().to_ascii_lowercase(),
            priority: req.priority,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(request)))
}

pub async fn assign(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<u64>,
    Json(req): Json<AssignRequest>,
) -> Result<Json<MaintenanceRequest>, AppError> {
    auth.require_role(&[Role::Landlord, Role::Admin])?;
    let request = maintenance::assign_request(&state, id, req.staff_id).await?;
    Ok(Json(request))
}

pub async fn complete(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<u64>,
    Json(report): Json<NewMaintenanceReport>,
) -> Result<Json<CompletionResponse>, AppError> {
    auth.require_role(&[Role::Staff])?;
    let (request, report) = maintenance::complete_request(&state, auth.user_id, id, report).await?;
    Ok(Json(CompletionResponse { request, report }))
}

pub async fn report(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<u64>,
) -> Result<Json<MaintenanceReport>, AppError> {
    let request = load_visible(&state, &auth, id).await?;
    let report = db::maintenance::reports_for_request(&state.store, request.id)
        .await
        .into_iter()
        .next()
        .ok_or_else(|| AppError::NotFound("No report filed for this request".to_string()))?;
    Ok(Json(report))
}

pub async fn recommendation(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<u64>,
) -> Result<Json<RecommendationResponse>, AppError> {
    auth.require_role(&[Role::Landlord, Role::Admin, Role::Staff])?;
    let request = load_visible(&state, &auth, id).await?;
    let recommendation = state
        .sentiment
        .recommend(&format!("{}\n\n{}", request.title, request.description))
        .await;
    Ok(Json(RecommendationResponse { recommendation }))
}
