use chrono::{DateTime, Utc};

use super::Store;
use crate::models::{
    Invoice, InvoiceStatus, NewInvoice, PaymentReminder, ReminderStatus, ReminderType,
};

/// Creates the invoice together with its reminder schedule.
pub async fn create_with_reminders(
    store: &Store,
    new: NewInvoice,
    schedule: &[(ReminderType, DateTime<Utc>)],
) -> (Invoice, Vec<PaymentReminder>) {
    let mut tables = store.write().await;

    let invoice = tables.invoices.insert(|id| Invoice {
        id,
        property_id: new.property_id,
        tenant_id: new.tenant_id,
        amount: new.amount,
        due_date: new.due_date,
        status: InvoiceStatus::Pending,
        invoice_type: new.invoice_type,
        period: new.period,
        details: new.details,
        created_at: Utc::now(),
    });

    let reminders = schedule
        .iter()
        .map(|(reminder_type, scheduled_for)| {
            tables.reminders.insert(|id| PaymentReminder {
                id,
                invoice_id: invoice.id,
                reminder_type: *reminder_type,
                status: ReminderStatus::Pending,
                scheduled_for: *scheduled_for,
                sent_at: None,
                last_error: None,
            })
        })
        .collect();

    (invoice, reminders)
}

pub async fn find_by_id(store: &Store, id: u64) -> Option<Invoice> {
    store.read().await.invoices.get(id).cloned()
}

pub async fn list(store: &Store) -> Vec<Invoice> {
    store.read().await.invoices.values().cloned().collect()
}

pub async fn list_by_tenant(store: &Store, tenant_id: u64) -> Vec<Invoice> {
    store
        .read()
        .await
        .invoices
        .values()
        .filter(|i| i.tenant_id == tenant_id)
        .cloned()
        .collect()
}
