use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Pending,
    Paid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceType {
    Utility,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingPeriod {
    pub month: u32,
    pub year: i32,
}

/// Metered usage for one utility (water, electricity, ...). Only `cost` is
/// billed; any other fields (rates, meter readings) are kept as supplied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UtilityUsage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    pub cost: f64,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: u64,
    pub property_id: u64,
    pub tenant_id: u64,
    pub amount: f64,
    pub due_date: DateTime<Utc>,
    pub status: InvoiceStatus,
    #[serde(rename = "type")]
    pub invoice_type: InvoiceType,
    pub period: BillingPeriod,
    pub details: BTreeMap<String, UtilityUsage>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewInvoice {
    pub property_id: u64,
    pub tenant_id: u64,
    pub amount: f64,
    pub due_date: DateTime<Utc>,
    pub invoice_type: InvoiceType,
    pub period: BillingPeriod,
    pub details: BTreeMap<String, UtilityUsage>,
}
