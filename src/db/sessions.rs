use chrono::{DateTime, Utc};

use super::Store;
use crate::models::Session;

pub async fn create(store: &Store, token_hash: &str, user_id: u64, expires_at: DateTime<Utc>) {
    store.write().await.sessions.insert(
        token_hash.to_string(),
        Session {
            user_id,
            expires_at,
        },
    );
}

/// Returns the session only while it has not expired.
pub async fn find_valid(store: &Store, token_hash: &str) -> Option<Session> {
    store
        .read()
        .await
        .sessions
        .get(token_hash)
        .filter(|s| s.expires_at > Utc::now())
        .cloned()
}

pub async fn delete(store: &Store, token_hash: &str) -> bool {
    store.write().await.sessions.remove(token_hash).is_some()
}

pub async fn purge_expired(store: &Store) -> usize {
    let now = Utc::now();
    let mut tables = store.write().await;
    let before = tables.sessions.len();
    tables.sessions.retain(|_, s| s.expires_at > now);
    before - tables.sessions.len()
}
