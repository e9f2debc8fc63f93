use axum::extract::State;
use axum::Json;
use chrono::Utc;

use crate::auth::extractor::AuthUser;
use crate::db;
use crate::error::AppError;
use crate::models::{PaymentReminder, Role};
use crate::services::billing::{self, SweepSummary};
use crate::state::SharedState;

pub async fn due(
    auth: AuthUser,
    State(state): State<SharedState>,
) -> Result<Json<Vec<PaymentReminder>>, AppError> {
    auth.require_role(&[Role::Landlord, Role::Admin])?;
    Ok(Json(db::reminders::due(&state.store, Utc::now()).await))
}

pub async fn sweep(
    auth: AuthUser,
    State(state): State<SharedState>,
) -> Result<Json<SweepSummary>, AppError> {
    auth.require_role(&[Role::Landlord, Role::Admin])?;
    Ok(Json(billing::send_payment_reminders(&state).await))
}
