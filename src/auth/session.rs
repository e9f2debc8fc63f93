use axum_extra::extract::cookie::{Cookie, SameSite};
use axum_extra::extract::CookieJar;
use chrono::Duration;
use sha2::{Digest, Sha256};

use crate::auth::jwt::{encode_token, Claims};
use crate::config::Config;
use crate::db;
use crate::error::AppError;
use crate::models::User;
use crate::state::AppState;

pub const SESSION_COOKIE: &str = "propsmart_session";

pub fn generate_session_id() -> String {
    let bytes: [u8; 32] = rand::random();
    hex::encode(bytes)
}

pub fn hash_session_id(session_id: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(session_id.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Opens a server-side session for `user` and returns the cookie carrying it.
pub async fn start(state: &AppState, user: &User) -> Result<CookieJar, AppError> {
    let ttl = Duration::hours(state.config.session_ttl_hours);
    let session_id = generate_session_id();

    db::sessions::create(
        &state.store,
        &hash_session_id(&session_id),
        user.id,
        chrono::Utc::now() + ttl,
    )
    .await;

    let claims = Claims::new(user.id, user.role, session_id, ttl);
    let token = encode_token(&claims, &state.config.session_secret).map_err(AppError::Internal)?;

    Ok(CookieJar::new().add(session_cookie(&state.config, token)))
}

fn session_cookie(config: &Config, token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(config.secure_cookies)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::hours(config.session_ttl_hours))
        .build()
}

pub fn clear_cookie() -> CookieJar {
    let cookie = Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .max_age(time::Duration::ZERO)
        .build();
    CookieJar::new().add(cookie)
}
