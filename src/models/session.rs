use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: u64,
    pub expires_at: DateTime<Utc>,
}
