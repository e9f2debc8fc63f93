pub mod alerts;
pub mod auth;
pub mod invoices;
pub mod maintenance;
pub mod payments;
pub mod properties;
pub mod reminders;
pub mod staff;

use axum::routing::{get, patch, post};
use axum::Router;

use crate::state::SharedState;

pub fn api_routes() -> Router<SharedState> {
    Router::new()
        // Auth
        .route("/api/register", post(auth::register))
        .route("/api/login", post(auth::login))
        .route("/api/logout", post(auth::logout))
        .route("/api/user", get(auth::current_user))
        // Staff
        .route("/api/staff", get(staff::list).post(staff::create))
        // Properties
        .route(
            "/api/properties",
            get(properties::list).post(properties::create),
        )
        .route("/api/properties/{id}", get(properties::get))
        .route(
            "/api/properties/{id}/status",
            patch(properties::update_status),
        )
        // Security alerts
        .route("/api/alerts", get(alerts::list).post(alerts::create))
        .route("/api/alerts/{id}/read", post(alerts::mark_read))
        // Maintenance
        .route(
            "/api/maintenance",
            get(maintenance::list).post(maintenance::create),
        )
        .route("/api/maintenance/{id}", get(maintenance::get))
        .route("/api/maintenance/{id}/assign", post(maintenance::assign))
        .route("/api/maintenance/{id}/complete", post(maintenance::complete))
        .route("/api/maintenance/{id}/report", get(maintenance::report))
        .route(
            "/api/maintenance/{id}/recommendation",
            get(maintenance::recommendation),
        )
        // Billing
        .route("/api/invoices", get(invoices::list))
        .route("/api/invoices/utility", post(invoices::create_utility))
        .route("/api/invoices/{id}", get(invoices::get))
        .route("/api/invoices/{id}/payments", get(invoices::payments))
        .route("/api/payments/card", post(payments::card))
        .route("/api/payments/mpesa", post(payments::mpesa))
        .route("/api/reminders/due", get(reminders::due))
        .route("/api/reminders/sweep", post(reminders::sweep))
}
