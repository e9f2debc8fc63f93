//! In-memory storage.
//!
//! Every table lives behind one `RwLock`, and every function in the
//! submodules takes that lock exactly once, so each call is atomic with
//! respect to the others. Nothing survives a restart.

pub mod alerts;
pub mod invoices;
pub mod maintenance;
pub mod payments;
pub mod properties;
pub mod reminders;
pub mod sessions;
pub mod users;

use std::collections::{BTreeMap, HashMap};

use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::models::{
    Invoice, MaintenanceReport, MaintenanceRequest, Payment, PaymentReminder, Property,
    SecurityAlert, Session, User,
};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    InvalidState(String),
}

/// Rows keyed by an auto-incrementing id starting at 1. Iteration follows
/// id order, which is also insertion order.
pub struct Table<T> {
    rows: BTreeMap<u64, T>,
    next_id: u64,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl<T: Clone> Table<T> {
    fn insert(&mut self, build: impl FnOnce(u64) -> T) -> T {
        let id = self.next_id;
        self.next_id += 1;
        let row = build(id);
        self.rows.insert(id, row.clone());
        row
    }

    fn get(&self, id: u64) -> Option<&T> {
        self.rows.get(&id)
    }

    fn get_mut(&mut self, id: u64) -> Option<&mut T> {
        self.rows.get_mut(&id)
    }

    fn values(&self) -> impl Iterator<Item = &T> {
        self.rows.values()
    }

    fn values_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.rows.values_mut()
    }

    fn len(&self) -> usize {
        self.rows.len()
    }
}

#[derive(Default)]
pub struct Tables {
    users: Table<User>,
    properties: Table<Property>,
    alerts: Table<SecurityAlert>,
    requests: Table<MaintenanceRequest>,
    reports: Table<MaintenanceReport>,
    invoices: Table<Invoice>,
    payments: Table<Payment>,
    reminders: Table<PaymentReminder>,
    /// Keyed by the SHA-256 of the session id, never the raw id.
    sessions: HashMap<String, Session>,
}

#[derive(Default)]
pub struct Store {
    tables: RwLock<Tables>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    async fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.tables.read().await
    }

    async fn write(&self) -> RwLockWriteGuard<'_, Tables> {
        self.tables.write().await
    }
}
