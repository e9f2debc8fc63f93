mod common;

use std::collections::BTreeMap;

use chrono::{Duration, Utc};
use reqwest::StatusCode;
use serde_json::json;

use propsmart::db;
use propsmart::models::{
    BillingPeriod, InvoiceType, NewInvoice, PaymentMethod, PaymentStatus,
    ReminderStatus, ReminderType, UtilityUsage,
};
use propsmart::services::billing;

/// Creates an invoice whose email and SMS reminders are already overdue.
async fn overdue_invoice(app: &common::TestApp, tenant_id: u64, property_id: u64) -> u64 {
    let now = Utc::now();
    let mut details = BTreeMap::new();
    details.insert(
        "water".to_string(),
        UtilityUsage {
            usage: Some(8.0),
            unit: Some("m3".to_string()),
            cost: 800.0,
            extra: Default::default(),
        },
    );

    let (invoice, reminders) = db::invoices::create_with_reminders(
        &app.state.store,
        NewInvoice {
            property_id,
            tenant_id,
            amount: 800.0,
            due_date: now + Duration::days(1),
            invoice_type: InvoiceType::Utility,
            period: BillingPeriod { month: 1, year: 2026 },
            details,
        },
        &[
            (ReminderType::Email, now - Duration::hours(2)),
            (ReminderType::Sms, now - Duration::hours(1)),
        ],
    )
    .await;
    assert_eq!(reminders.len(), 2);
    invoice.id
}

async fn setup(app: &common::TestApp, phone: Option<&str>) -> (String, u64, u64) {
    let (_, landlord) = app.signup("landlord", "landlord", None).await;
    let (tenant, _) = app.signup("tenant", "tenant", phone).await;
    let property = app.create_property(&landlord, "Lakeview Court").await;
    (
        landlord,
        tenant["id"].as_u64().unwrap(),
        property["id"].as_u64().unwrap(),
    )
}

#[tokio::test]
async fn due_reminders_are_listed() {
    let app = common::spawn_app().await;
    let (landlord, tenant_id, property_id) = setup(&app, Some("+254722000001")).await;
    overdue_invoice(&app, tenant_id, property_id).await;

    let (due, status) = app.get_auth("/api/reminders/due", &landlord).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(due.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn sweep_sends_email_and_sms_once() {
    let app = common::spawn_app().await;
    let (landlord, tenant_id, property_id) = setup(&app, Some("+254722000001")).await;
    let invoice_id = overdue_invoice(&app, tenant_id, property_id).await;

    let (summary, status) = app.post_auth("/api/reminders/sweep", &landlord, &json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary, json!({ "claimed": 2, "sent": 2, "failed": 0 }));

    let emails = app.emails_to("tenant@test.com");
    assert_eq!(emails.len(), 1);
    assert_eq!(emails[0].subject, "Payment Reminder: Invoice Due Soon");
    assert_eq!(app.sms_to("+254722000001").len(), 1);

    let reminders = db::reminders::list_by_invoice(&app.state.store, invoice_id).await;
    assert!(reminders.iter().all(|r| r.status == ReminderStatus::Sent));
    assert!(reminders.iter().all(|r| r.sent_at.is_some()));

    // A second sweep finds nothing left to do.
    let (summary, _) = app.post_auth("/api/reminders/sweep", &landlord, &json!({})).await;
    assert_eq!(summary["claimed"], 0);
    assert_eq!(app.emails_to("tenant@test.com").len(), 1);
}

#[tokio::test]
async fn sms_reminder_fails_without_phone() {
    let app = common::spawn_app().await;
    let (_, tenant_id, property_id) = setup(&app, None).await;
    let invoice_id = overdue_invoice(&app, tenant_id, property_id).await;

    let summary = billing::send_payment_reminders(&app.state).await;
    assert_eq!(summary.sent, 1);
    assert_eq!(summary.failed, 1);

    let reminders = db::reminders::list_by_invoice(&app.state.store, invoice_id).await;
    let sms = reminders
        .iter()
        .find(|r| r.reminder_type == ReminderType::Sms)
        .unwrap();
    assert_eq!(sms.status, ReminderStatus::Failed);
    assert!(sms.last_error.as_deref().unwrap().contains("no phone"));
}

#[tokio::test]
async fn paid_invoice_reminders_are_closed_without_sending() {
    let app = common::spawn_app().await;
    let (_, tenant_id, property_id) = setup(&app, Some("+254722000001")).await;
    let invoice_id = overdue_invoice(&app, tenant_id, property_id).await;
    let payment = db::payments::reserve(&app.state.store, invoice_id, PaymentMethod::Card)
        .await
        .unwrap();
    db::payments::settle(
        &app.state.store,
        payment.id,
        PaymentStatus::Completed,
        Some("pi_test".to_string()),
        json!({}),
    )
    .await
    .unwrap();

    let summary = billing::send_payment_reminders(&app.state).await;
    assert_eq!(summary.claimed, 2);
    assert_eq!(summary.sent, 2);
    assert!(app.mailer.sent.lock().unwrap().is_empty());
    assert!(app.sms.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn concurrent_sweeps_never_double_send() {
    let app = common::spawn_app().await;
    let (_, tenant_id, property_id) = setup(&app, Some("+254722000001")).await;
    overdue_invoice(&app, tenant_id, property_id).await;
    overdue_invoice(&app, tenant_id, property_id).await;

    let (a, b) = tokio::join!(
        billing::send_payment_reminders(&app.state),
        billing::send_payment_reminders(&app.state),
    );
    assert_eq!(a.claimed + b.claimed, 4);
    assert_eq!(app.emails_to("tenant@test.com").len(), 2);
    assert_eq!(app.sms_to("+254722000001").len(), 2);
}

#[tokio::test]
async fn worker_runs_sweep_until_shutdown() {
    let app = common::spawn_app().await;
    let (_, tenant_id, property_id) = setup(&app, Some("+254722000001")).await;
    let invoice_id = overdue_invoice(&app, tenant_id, property_id).await;

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let handle = propsmart::worker::spawn(
        app.state.clone(),
        shutdown_rx,
        std::time::Duration::from_secs(3600),
    );

    tokio::time::timeout(std::time::Duration::from_secs(2), async {
        loop {
            let reminders = db::reminders::list_by_invoice(&app.state.store, invoice_id).await;
            if reminders.iter().all(|r| r.status == ReminderStatus::Sent) {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        }
    })
    .await
    .expect("worker never swept");

    shutdown_tx.send(true).unwrap();
    tokio::time::timeout(std::time::Duration::from_secs(2), handle)
        .await
        .expect("worker did not stop")
        .unwrap();
}
