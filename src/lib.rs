pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod notify;
pub mod payments;
pub mod rate_limit;
pub mod realtime;
pub mod routes;
pub mod sentiment;
pub mod services;
pub mod state;
pub mod worker;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderName, HeaderValue};
use axum::routing::get;
use axum::Router;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::db::Store;
use crate::notify::Notifier;
use crate::rate_limit::LoginRateLimiter;
use crate::realtime::Broadcaster;
use crate::state::{AppState, Providers, SharedState};

/// Builds the router with providers wired from `config`.
pub fn build_app(config: Config) -> Result<(Router, SharedState), String> {
    let providers = Providers::from_config(&config)?;
    Ok(build_app_with(config, providers))
}

pub fn build_app_with(config: Config, providers: Providers) -> (Router, SharedState) {
    let max_body_size = config.max_body_size;

    let state: SharedState = Arc::new(AppState {
        config,
        store: Store::new(),
        notifier: Notifier::new(providers.mailer, providers.sms),
        card_gateway: providers.card_gateway,
        mobile_money: providers.mobile_money,
        sentiment: providers.sentiment,
        broadcaster: Broadcaster::new(),
        login_limiter: LoginRateLimiter::default(),
    });

    let app = Router::new()
        .merge(routes::api_routes())
        .route("/ws", get(realtime::ws_handler))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(max_body_size))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-content-type-options"),
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-frame-options"),
            HeaderValue::from_static("DENY"),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone());

    (app, state)
}

async fn health() -> &'static str {
    "ok"
}
