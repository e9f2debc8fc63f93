use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Assigned,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        };
        f.write_str(s)
    }
}

/// A work order filed by a tenant.
///
/// `assigned_staff_id` is always set once `status` leaves `Pending`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceRequest {
    pub id: u64,
    pub property_id: u64,
    pub tenant_id: u64,
    pub assigned_staff_id: Option<u64>,
    pub title: String,
    pub description: String,
    pub category: String,
    pub status: RequestStatus,
    pub priority: Priority,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub resolution: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewMaintenanceRequest {
    pub property_id: u64,
    pub tenant_id: u64,
    pub title: String,
    pub description: String,
    pub category: String,
    pub priority: Priority,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceReport {
    pub id: u64,
    pub request_id: u64,
    pub staff_id: u64,
    pub description: String,
    pub work_done: String,
    pub materials: Vec<String>,
    pub cost: f64,
    pub time_spent: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMaintenanceReport {
    pub description: String,
    pub work_done: String,
    #[serde(default)]
    pub materials: Vec<String>,
    #[serde(default)]
    pub cost: f64,
    #[serde(default)]
    pub time_spent: String,
}
