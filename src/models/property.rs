use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyStatus {
    #[default]
    Available,
    Occupied,
    Maintenance,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: u64,
    pub name: String,
    pub address: String,
    pub landlord_id: u64,
    pub status: PropertyStatus,
    pub rent: i64,
    pub image_url: Option<String>,
    pub utilities: serde_json::Value,
}

#[derive(Debug, Clone)]
pub struct NewProperty {
    pub name: String,
    pub address: String,
    pub landlord_id: u64,
    pub status: PropertyStatus,
    pub rent: i64,
    pub image_url: Option<String>,
    pub utilities: serde_json::Value,
}
