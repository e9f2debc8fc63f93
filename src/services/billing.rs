//! Utility invoicing, payments and the payment reminder sweep.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, Utc};
use serde::Serialize;
use serde_json::json;

use crate::db;
use crate::error::{AppError, ProviderError};
use crate::models::{
    BillingPeriod, Invoice, InvoiceStatus, InvoiceType, NewInvoice, Payment, PaymentMethod,
    PaymentReminder, PaymentStatus, ReminderType, UtilityUsage,
};
use crate::notify::templates;
use crate::payments::to_cents;
use crate::state::AppState;

pub const PAYMENT_TERM_DAYS: i64 = 14;
pub const EMAIL_REMINDER_DAYS_BEFORE: i64 = 3;
pub const SMS_REMINDER_DAYS_BEFORE: i64 = 2;

pub fn invoice_total(utilities: &BTreeMap<String, UtilityUsage>) -> f64 {
    utilities.values().map(|u| u.cost).sum()
}

/// Bills a tenant for metered utilities and schedules the email and SMS
/// reminders ahead of the due date.
pub async fn generate_utility_invoice(
    state: &AppState,
    property_id: u64,
    tenant_id: u64,
    utilities: BTreeMap<String, UtilityUsage>,
) -> Result<(Invoice, Vec<PaymentReminder>), AppError> {
    if utilities.is_empty() {
        return Err(AppError::BadRequest(
            "At least one utility entry is required".to_string(),
        ));
    }
    if let Some((name, _)) = utilities
        .iter()
        .find(|(_, u)| !u.cost.is_finite() || u.cost < 0.0)
    {
        return Err(AppError::BadRequest(format!(
            "Utility '{name}' has an invalid cost"
        )));
    }

    db::properties::find_by_id(&state.store, property_id)
        .await
        .ok_or_else(|| AppError::NotFound("Property not found".to_string()))?;
    db::users::find_by_id(&state.store, tenant_id)
        .await
        .ok_or_else(|| AppError::NotFound("Tenant not found".to_string()))?;

    let now = Utc::now();
    let due_date = now + Duration::days(PAYMENT_TERM_DAYS);

    let new = NewInvoice {
        property_id,
        tenant_id,
        amount: invoice_total(&utilities),
        due_date,
        invoice_type: InvoiceType::Utility,
        period: BillingPeriod {
            month: now.month(),
            year: now.year(),
        },
        details: utilities,
    };

    let schedule = [
        (
            ReminderType::Email,
            due_date - Duration::days(EMAIL_REMINDER_DAYS_BEFORE),
        ),
        (
            ReminderType::Sms,
            due_date - Duration::days(SMS_REMINDER_DAYS_BEFORE),
        ),
    ];

    let (invoice, reminders) =
        db::invoices::create_with_reminders(&state.store, new, &schedule).await;
    tracing::info!(
        "Invoice {} created for tenant {tenant_id}: {:.2}",
        invoice.id,
        invoice.amount
    );

    Ok((invoice, reminders))
}

/// Reserves the invoice, charges the card, then records the outcome. The
/// reservation makes a concurrent second charge fail with 409 before the
/// gateway is called.
pub async fn pay_by_card(
    state: &AppState,
    invoice: &Invoice,
    payment_method_id: &str,
) -> Result<Payment, AppError> {
    if payment_method_id.trim().is_empty() {
        return Err(AppError::BadRequest(
            "paymentMethodId is required".to_string(),
        ));
    }

    let reserved = db::payments::reserve(&state.store, invoice.id, PaymentMethod::Card).await?;

    let charge = match state
        .card_gateway
        .charge(
            to_cents(reserved.amount),
            payment_method_id,
            &format!("Invoice #{}", invoice.id),
        )
        .await
    {
        Ok(charge) => charge,
        Err(e) => {
            record_failure(state, reserved.id, &e).await;
            return Err(e.into());
        }
    };

    let status = if charge.succeeded {
        PaymentStatus::Completed
    } else {
        PaymentStatus::Pending
    };

    let payment = db::payments::settle(
        &state.store,
        reserved.id,
        status,
        Some(charge.id.clone()),
        json!({
            "paymentIntentId": charge.id,
            "gatewayStatus": charge.status,
        }),
    )
    .await?;

    tracing::info!(
        "Card payment {} for invoice {} is {:?}",
        payment.id,
        invoice.id,
        payment.status
    );
    Ok(payment)
}

/// Starts an M-Pesa checkout. The payment stays pending until the customer
/// confirms on their phone.
pub async fn pay_by_mpesa(
    state: &AppState,
    invoice: &Invoice,
    phone_number: &str,
) -> Result<Payment, AppError> {
    if phone_number.trim().is_empty() {
        return Err(AppError::BadRequest("phoneNumber is required".to_string()));
    }

    let reserved = db::payments::reserve(&state.store, invoice.id, PaymentMethod::Mpesa).await?;

    let reference = format!("invoice-{}-payment-{}", invoice.id, reserved.id);
    let receipt = match state
        .mobile_money
        .checkout(phone_number, reserved.amount, &reference)
        .await
    {
        Ok(receipt) => receipt,
        Err(e) => {
            record_failure(state, reserved.id, &e).await;
            return Err(e.into());
        }
    };

    let payment = db::payments::settle(
        &state.store,
        reserved.id,
        PaymentStatus::Pending,
        Some(receipt.transaction_id.clone()),
        json!({
            "mpesaTransactionId": receipt.transaction_id,
            "gatewayStatus": receipt.status,
            "description": receipt.description,
        }),
    )
    .await?;

    tracing::info!("M-Pesa checkout started for invoice {}", invoice.id);
    Ok(payment)
}

async fn record_failure(state: &AppState, payment_id: u64, error: &ProviderError) {
    if let Err(e) = db::payments::settle(
        &state.store,
        payment_id,
        PaymentStatus::Failed,
        None,
        json!({ "error": error.to_string() }),
    )
    .await
    {
        tracing::error!("Failed to mark payment {payment_id} failed: {e}");
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SweepSummary {
    pub claimed: usize,
    pub sent: usize,
    pub failed: usize,
}

/// Sends every due reminder once. Reminders are claimed before any message
/// goes out, so overlapping sweeps split the work instead of repeating it.
pub async fn send_payment_reminders(state: &AppState) -> SweepSummary {
    let claimed = db::reminders::claim_due(&state.store, Utc::now()).await;
    let mut summary = SweepSummary {
        claimed: claimed.len(),
        ..Default::default()
    };

    for reminder in claimed {
        let outcome = deliver_reminder(state, &reminder).await;
        let marked = match &outcome {
            Ok(()) => db::reminders::mark_sent(&state.store, reminder.id).await,
            Err(e) => {
                tracing::error!("Reminder {} not delivered: {e}", reminder.id);
                db::reminders::mark_failed(&state.store, reminder.id, e).await
            }
        };
        if let Err(e) = marked {
            tracing::error!("Failed to update reminder {}: {e}", reminder.id);
        }

        match outcome {
            Ok(()) => summary.sent += 1,
            Err(_) => summary.failed += 1,
        }
    }

    if summary.claimed > 0 {
        tracing::info!(
            "Reminder sweep: {} claimed, {} sent, {} failed",
            summary.claimed,
            summary.sent,
            summary.failed
        );
    }
    summary
}

async fn deliver_reminder(state: &AppState, reminder: &PaymentReminder) -> Result<(), String> {
    let invoice = db::invoices::find_by_id(&state.store, reminder.invoice_id)
        .await
        .ok_or_else(|| format!("invoice {} not found", reminder.invoice_id))?;

    if invoice.status == InvoiceStatus::Paid {
        tracing::debug!("Invoice {} already paid, skipping reminder", invoice.id);
        return Ok(());
    }

    let tenant = db::users::find_by_id(&state.store, invoice.tenant_id)
        .await
        .ok_or_else(|| format!("tenant {} not found", invoice.tenant_id))?;

    match reminder.reminder_type {
        ReminderType::Email => state
            .notifier
            .try_email(
                &tenant.email,
                "Payment Reminder: Invoice Due Soon",
                &templates::render_payment_reminder(&invoice, &state.config.base_url),
            )
            .await
            .map_err(|e| e.to_string()),
        ReminderType::Sms => {
            let phone = tenant
                .phone_number()
                .ok_or_else(|| format!("tenant {} has no phone number", tenant.id))?;
            state
                .notifier
                .try_sms(phone, &templates::sms_payment_reminder(&invoice))
                .await
                .map_err(|e| e.to_string())
        }
    }
}
