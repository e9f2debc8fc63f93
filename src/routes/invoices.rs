use std::collections::BTreeMap;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::auth::extractor::AuthUser;
use crate::db;
use crate::error::AppError;
use crate::models::{Invoice, Payment, PaymentReminder, Role, UtilityUsage};
use crate::services::billing;
use crate::state::SharedState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUtilityInvoice {
    pub property_id: u64,
    pub tenant_id: u64,
    pub utilities: BTreeMap<String, UtilityUsage>,
}

#[derive(Serialize)]
pub struct InvoiceWithReminders {
    #[serde(flatten)]
    pub invoice: Invoice,
    pub reminders: Vec<PaymentReminder>,
}

/// Tenants reach only their own invoices; staff reach none.
pub(crate) async fn load_for(
    state: &SharedState,
    auth: &AuthUser,
    id: u64,
) -> Result<Invoice, AppError> {
    auth.require_role(&[Role::Tenant, Role::Landlord, Role::Admin])?;
    db::invoices::find_by_id(&state.store, id)
        .await
        .filter(|i| auth.role != Role::Tenant || i.tenant_id == auth.user_id)
        .ok_or_else(|| AppError::NotFound("Invoice not found".to_string()))
}

pub async fn list(
    auth: AuthUser,
    State(state): State<SharedState>,
) -> Result<Json<Vec<Invoice>>, AppError> {
    auth.require_role(&[Role::Tenant, Role::Landlord, Role::Admin])?;
    let invoices = if auth.role == Role::Tenant {
        db::invoices::list_by_tenant(&state.store, auth.user_id).await
    } else {
        db::invoices::list(&state.store).await
    };
    Ok(Json(invoices))
}

pub async fn get(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<u64>,
) -> Result<Json<Invoice>, AppError> {
    Ok(Json(load_for(&state, &auth, id).await?))
}

pub async fn create_utility(
    auth: AuthUser,
    State(state): State<SharedState>,
    Json(req): Json<CreateUtilityInvoice>,
) -> Result<(StatusCode, Json<InvoiceWithReminders>), AppError> {
    auth.require_role(&[Role::Landlord, Role::Admin])?;

    let (invoice, reminders) =
        billing::generate_utility_invoice(&state, req.property_id, req.tenant_id, req.utilities)
            .await?;

    Ok((
        StatusCode::CREATED,
        Json(InvoiceWithReminders { invoice, reminders }),
    ))
}

pub async fn payments(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<u64>,
) -> Result<Json<Vec<Payment>>, AppError> {
    let invoice = load_for(&state, &auth, id).await?;
    Ok(Json(
        db::payments::list_by_invoice(&state.store, invoice.id).await,
    ))
}
