use chrono::Utc;

use super::{Store, StoreError};
use crate::models::{InvoiceStatus, Payment, PaymentMethod, PaymentStatus};

/// Opens a `Processing` payment for the full invoice amount before any
/// gateway is contacted. Fails while the invoice is paid or another payment
/// on it is still processing, so at most one gateway call is in flight per
/// invoice.
pub async fn reserve(
    store: &Store,
    invoice_id: u64,
    method: PaymentMethod,
) -> Result<Payment, StoreError> {
    let mut tables = store.write().await;

    let invoice = tables
        .invoices
        .get(invoice_id)
        .ok_or_else(|| StoreError::NotFound("Invoice not found".to_string()))?;

    if invoice.status == InvoiceStatus::Paid {
        return Err(StoreError::Conflict("Invoice is already paid".to_string()));
    }
    let amount = invoice.amount;

    let in_flight = tables
        .payments
        .values()
        .any(|p| p.invoice_id == invoice_id && p.status == PaymentStatus::Processing);
    if in_flight {
        return Err(StoreError::Conflict(
            "A payment for this invoice is already in progress".to_string(),
        ));
    }

    Ok(tables.payments.insert(|id| Payment {
        id,
        invoice_id,
        amount,
        method,
        status: PaymentStatus::Processing,
        transaction_id: None,
        metadata: serde_json::json!({}),
        created_at: Utc::now(),
    }))
}

/// Records the gateway outcome. A completed payment marks its invoice paid
/// under the same lock.
pub async fn settle(
    store: &Store,
    id: u64,
    status: PaymentStatus,
    transaction_id: Option<String>,
    metadata: serde_json::Value,
) -> Result<Payment, StoreError> {
    let mut tables = store.write().await;
    let payment = tables
        .payments
        .get_mut(id)
        .ok_or_else(|| StoreError::NotFound("Payment not found".to_string()))?;

    payment.status = status;
    if transaction_id.is_some() {
        payment.transaction_id = transaction_id;
    }
    payment.metadata = metadata;
    let payment = payment.clone();

    if status == PaymentStatus::Completed {
        if let Some(invoice) = tables.invoices.get_mut(payment.invoice_id) {
            invoice.status = InvoiceStatus::Paid;
        }
    }

    Ok(payment)
}

pub async fn list_by_invoice(store: &Store, invoice_id: u64) -> Vec<Payment> {
    store
        .read()
        .await
        .payments
        .values()
        .filter(|p| p.invoice_id == invoice_id)
        .cloned()
        .collect()
}
