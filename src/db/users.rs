use chrono::Utc;

use super::{Store, StoreError, Tables};
use crate::models::{NewUser, Role, User};

pub async fn create(store: &Store, new: NewUser) -> Result<User, StoreError> {
    let mut tables = store.write().await;
    insert(&mut tables, new)
}

/// Creates the user only while the store has no users at all. Returns
/// `None` once any account exists. The emptiness check and the insert share
/// one lock, so at most one caller ever gets the first account.
pub async fn create_first(store: &Store, new: NewUser) -> Result<Option<User>, StoreError> {
    let mut tables = store.write().await;
    if tables.users.len() > 0 {
        return Ok(None);
    }
    insert(&mut tables, new).map(Some)
}

fn insert(tables: &mut Tables, new: NewUser) -> Result<User, StoreError> {
    if tables
        .users
        .values()
        .any(|u| u.username.eq_ignore_ascii_case(&new.username))
    {
        return Err(StoreError::Conflict("Username already exists".to_string()));
    }

    Ok(tables.users.insert(|id| User {
        id,
        username: new.username,
        password_hash: new.password_hash,
        role: new.role,
        name: new.name,
        email: new.email,
        phone: new.phone,
        specialization: new.specialization,
        created_at: Utc::now(),
    }))
}

pub async fn find_by_id(store: &Store, id: u64) -> Option<User> {
    store.read().await.users.get(id).cloned()
}

pub async fn find_by_username(store: &Store, username: &str) -> Option<User> {
    store
        .read()
        .await
        .users
        .values()
        .find(|u| u.username.eq_ignore_ascii_case(username))
        .cloned()
}

pub async fn list_by_role(store: &Store, role: Role) -> Vec<User> {
    store
        .read()
        .await
        .users
        .values()
        .filter(|u| u.role == role)
        .cloned()
        .collect()
}

/// First staff member, in registration order, carrying the specialization.
pub async fn first_staff_with_specialization(store: &Store, specialization: &str) -> Option<User> {
    store
        .read()
        .await
        .users
        .values()
        .find(|u| {
            u.role == Role::Staff
                && u.specialization
                    .as_deref()
                    .is_some_and(|s| s.eq_ignore_ascii_case(specialization))
        })
        .cloned()
}
