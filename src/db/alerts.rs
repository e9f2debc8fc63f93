use chrono::Utc;

use super::{Store, StoreError};
use crate::models::{AlertStatus, SecurityAlert};

pub async fn create(
    store: &Store,
    property_id: u64,
    alert_type: &str,
    message: &str,
) -> SecurityAlert {
    store.write().await.alerts.insert(|id| SecurityAlert {
        id,
        property_id,
        alert_type: alert_type.to_string(),
        message: message.to_string(),
        timestamp: Utc::now(),
        status: AlertStatus::Unread,
    })
}

/// Newest first.
pub async fn list(store: &Store) -> Vec<SecurityAlert> {
    let mut alerts: Vec<_> = store.read().await.alerts.values().cloned().collect();
    alerts.reverse();
    alerts
}

pub async fn mark_read(store: &Store, id: u64) -> Result<SecurityAlert, StoreError> {
    let mut tables = store.write().await;
    let alert = tables
        .alerts
        .get_mut(id)
        .ok_or_else(|| StoreError::NotFound("Alert not found".to_string()))?;
    alert.status = AlertStatus::Read;
    Ok(alert.clone())
}
