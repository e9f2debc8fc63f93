use chrono::Utc;

use super::{Store, StoreError};
use crate::models::{
    MaintenanceReport, MaintenanceRequest, NewMaintenanceReport, NewMaintenanceRequest,
    RequestStatus,
};

/// Inserts the request as pending with no staff.
pub async fn create(store: &Store, new: NewMaintenanceRequest) -> MaintenanceRequest {
    store.write().await.requests.insert(|id| MaintenanceRequest {
        id,
        property_id: new.property_id,
        tenant_id: new.tenant_id,
        assigned_staff_id: None,
        title: new.title,
        description: new.description,
        category: new.category,
        status: RequestStatus::Pending,
        priority: new.priority,
        created_at: Utc::now(),
        completed_at: None,
        resolution: None,
    })
}

pub async fn list(store: &Store) -> Vec<MaintenanceRequest> {
    store.read().await.requests.values().cloned().collect()
}

pub async fn list_for_tenant(store: &Store, tenant_id: u64) -> Vec<MaintenanceRequest> {
    store
        .read()
        .await
        .requests
        .values()
        .filter(|r| r.tenant_id == tenant_id)
        .cloned()
        .collect()
}

pub async fn list_for_staff(store: &Store, staff_id: u64) -> Vec<MaintenanceRequest> {
    store
        .read()
        .await
        .requests
        .values()
        .filter(|r| r.assigned_staff_id == Some(staff_id))
        .cloned()
        .collect()
}

pub async fn find_by_id(store: &Store, id: u64) -> Option<MaintenanceRequest> {
    store.read().await.requests.get(id).cloned()
}

/// Sets the staff member and moves the request to `Assigned`.
pub async fn assign(
    store: &Store,
    id: u64,
    staff_id: u64,
) -> Result<MaintenanceRequest, StoreError> {
    let mut tables = store.write().await;
    let request = tables
        .requests
        .get_mut(id)
        .ok_or_else(|| StoreError::NotFound("Maintenance request not found".to_string()))?;

    if request.status == RequestStatus::Completed {
        return Err(StoreError::InvalidState(
            "Maintenance request is already completed".to_string(),
        ));
    }

    request.assigned_staff_id = Some(staff_id);
    request.status = RequestStatus::Assigned;
    Ok(request.clone())
}

/// Files the report and closes the request in one step. Only an `Assigned`
/// request held by `staff_id` can be completed, so a request never gets two
/// reports.
pub async fn complete(
    store: &Store,
    id: u64,
    staff_id: u64,
    report: NewMaintenanceReport,
) -> Result<(MaintenanceRequest, MaintenanceReport), StoreError> {
    let mut tables = store.write().await;
    let now = Utc::now();

    let request = tables
        .requests
        .get_mut(id)
        .ok_or_else(|| StoreError::NotFound("Maintenance request not found".to_string()))?;

    match request.status {
        RequestStatus::Assigned => {}
        RequestStatus::Pending => {
            return Err(StoreError::InvalidState(
                "Maintenance request has not been assigned".to_string(),
            ));
        }
        RequestStatus::Completed => {
            return Err(StoreError::InvalidState(
                "Maintenance request is already completed".to_string(),
            ));
        }
    }

    if request.assigned_staff_id != Some(staff_id) {
        return Err(StoreError::InvalidState(
            "Maintenance request is assigned to another staff member".to_string(),
        ));
    }

    request.status = RequestStatus::Completed;
    request.completed_at = Some(now);
    request.resolution = Some(report.description.clone());
    let request = request.clone();

    let report = tables.reports.insert(|report_id| MaintenanceReport {
        id: report_id,
        request_id: id,
        staff_id,
        description: report.description,
        work_done: report.work_done,
        materials: report.materials,
        cost: report.cost,
        time_spent: report.time_spent,
        created_at: now,
    });

    Ok((request, report))
}

pub async fn reports_for_request(store: &Store, request_id: u64) -> Vec<MaintenanceReport> {
    store
        .read()
        .await
        .reports
        .values()
        .filter(|r| r.request_id == request_id)
        .cloned()
        .collect()
}
