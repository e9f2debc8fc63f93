use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::invoices::load_for;
use crate::auth::extractor::AuthUser;
use crate::db;
use crate::error::AppError;
use crate::models::Payment;
use crate::services::billing;
use crate::state::SharedState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardPaymentRequest {
    pub invoice_id: u64,
    pub payment_method_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MpesaPaymentRequest {
    pub invoice_id: u64,
    /// Falls back to the caller's phone on file.
    pub phone_number: Option<String>,
}

pub async fn card(
    auth: AuthUser,
    State(state): State<SharedState>,
    Json(req): Json<CardPaymentRequest>,
) -> Result<(StatusCode, Json<Payment>), AppError> {
    let invoice = load_for(&state, &auth, req.invoice_id).await?;
    let payment = billing::pay_by_card(&state, &invoice, &req.payment_method_id).await?;
    Ok((StatusCode::CREATED, Json(payment)))
}

pub async fn mpesa(
    auth: AuthUser,
    State(state): State<SharedState>,
    Json(req): Json<MpesaPaymentRequest>,
) -> Result<(StatusCode, Json<Payment>), AppError> {
    let invoice = load_for(&state, &auth, req.invoice_id).await?;

    let phone = match req.phone_number.filter(|p| !p.trim().is_empty()) {
        Some(phone) => phone,
        None => db::users::find_by_id(&state.store, auth.user_id)
            .await
            .and_then(|u| u.phone_number().map(str::to_string))
            .ok_or_else(|| AppError::BadRequest("phoneNumber is required".to_string()))?,
    };

    let payment = billing::pay_by_mpesa(&state, &invoice, phone.trim()).await?;
    Ok((StatusCode::CREATED, Json(payment)))
}
