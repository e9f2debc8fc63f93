use chrono::{DateTime, Utc};

use super::{Store, StoreError};
use crate::models::{PaymentReminder, ReminderStatus};

fn is_due(reminder: &PaymentReminder, now: DateTime<Utc>) -> bool {
    reminder.status == ReminderStatus::Pending && reminder.scheduled_for <= now
}

/// Pending reminders whose scheduled time has passed.
pub async fn due(store: &Store, now: DateTime<Utc>) -> Vec<PaymentReminder> {
    store
        .read()
        .await
        .reminders
        .values()
        .filter(|r| is_due(r, now))
        .cloned()
        .collect()
}

/// Like [`due`], but moves every returned reminder to `Processing` under the
/// same lock so a concurrent sweep cannot pick it up again.
pub async fn claim_due(store: &Store, now: DateTime<Utc>) -> Vec<PaymentReminder> {
    let mut tables = store.write().await;
    tables
        .reminders
        .values_mut()
        .filter(|r| is_due(r, now))
        .map(|r| {
            r.status = ReminderStatus::Processing;
            r.clone()
        })
        .collect()
}

pub async fn mark_sent(store: &Store, id: u64) -> Result<PaymentReminder, StoreError> {
    let mut tables = store.write().await;
    let reminder = tables
        .reminders
        .get_mut(id)
        .ok_or_else(|| StoreError::NotFound("Reminder not found".to_string()))?;
    reminder.status = ReminderStatus::Sent;
    reminder.sent_at = Some(Utc::now());
    reminder.last_error = None;
    Ok(reminder.clone())
}

pub async fn mark_failed(
    store: &Store,
    id: u64,
    error: &str,
) -> Result<PaymentReminder, StoreError> {
    let mut tables = store.write().await;
    let reminder = tables
        .reminders
        .get_mut(id)
        .ok_or_else(|| StoreError::NotFound("Reminder not found".to_string()))?;
    reminder.status = ReminderStatus::Failed;
    reminder.last_error = Some(error.to_string());
    Ok(reminder.clone())
}

pub async fn list_by_invoice(store: &Store, invoice_id: u64) -> Vec<PaymentReminder> {
    store
        .read()
        .await
        .reminders
        .values()
        .filter(|r| r.invoice_id == invoice_id)
        .cloned()
        .collect()
}
