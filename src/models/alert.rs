use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    Unread,
    Read,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityAlert {
    pub id: u64,
    pub property_id: u64,
    #[serde(rename = "type")]
    pub alert_type: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub status: AlertStatus,
}
