use super::{Store, StoreError};
use crate::models::{NewProperty, Property, PropertyStatus};

pub async fn create(store: &Store, new: NewProperty) -> Property {
    store.write().await.properties.insert(|id| Property {
        id,
        name: new.name,
        address: new.address,
        landlord_id: new.landlord_id,
        status: new.status,
        rent: new.rent,
        image_url: new.image_url,
        utilities: new.utilities,
    })
}

pub async fn list(store: &Store) -> Vec<Property> {
    store.read().await.properties.values().cloned().collect()
}

pub async fn find_by_id(store: &Store, id: u64) -> Option<Property> {
    store.read().await.properties.get(id).cloned()
}

pub async fn update_status(
    store: &Store,
    id: u64,
    status: PropertyStatus,
) -> Result<Property, StoreError> {
    let mut tables = store.write().await;
    let property = tables
        .properties
        .get_mut(id)
        .ok_or_else(|| StoreError::NotFound("Property not found".to_string()))?;
    property.status = status;
    Ok(property.clone())
}
