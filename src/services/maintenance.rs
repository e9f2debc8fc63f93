//! Maintenance request lifecycle: creation with automatic staff dispatch,
//! manual assignment, and completion.

use crate::db;
use crate::error::AppError;
use crate::models::{
    MaintenanceReport, MaintenanceRequest, NewMaintenanceReport, NewMaintenanceRequest, RequestStatus,
    Role, User,
};
use crate::realtime::{Event, UrgentMaintenance};
use crate::state::{AppState, SharedState};

/// Maps a request category to the staff specialization that handles it.
pub fn required_specialization(category: &str) -> Option<&'static str> {
    match category.trim().to_ascii_lowercase().as_str() {
        "plumbing" => Some("plumber"),
        "electrical" => Some("electrician"),
        "hvac" => Some("hvac_technician"),
        "appliance" => Some("appliance_technician"),
        "structural" => Some("carpenter"),
        "pest" => Some("pest_control"),
        "general" => Some("general_maintenance"),
        _ => None,
    }
}

/// Files a request and tries to dispatch it. Dispatch problems never fail
/// the call: the request is returned pending instead.
pub async fn create_request(
    state: &SharedState,
    new: NewMaintenanceRequest,
) -> Result<MaintenanceRequest, AppError> {
    if new.title.trim().is_empty() || new.description.trim().is_empty() {
        return Err(AppError::BadRequest(
            "Title and description are required".to_string(),
        ));
    }
    if new.category.trim().is_empty() {
        return Err(AppError::BadRequest("Category is required".to_string()));
    }

    db::properties::find_by_id(&state.store, new.property_id)
        .await
        .ok_or_else(|| AppError::NotFound("Property not found".to_string()))?;

    let created = db::maintenance::create(&state.store, new).await;

    let request = match auto_assign(state, &created).await {
        Ok(Some(assigned)) => assigned,
        Ok(None) => {
            tracing::info!(
                "No staff available for request {} (category {}), leaving pending",
                created.id,
                created.category
            );
            created
        }
        Err(e) => {
            tracing::error!("Error assigning staff to request {}: {e}", created.id);
            created
        }
    };

    state
        .broadcaster
        .publish(&Event::MaintenanceRequest(request.clone()));

    let scoring_state = state.clone();
    let scored = request.clone();
    tokio::spawn(async move {
        flag_if_urgent(&scoring_state, scored).await;
    });

    Ok(request)
}

async fn auto_assign(
    state: &AppState,
    request: &MaintenanceRequest,
) -> Result<Option<MaintenanceRequest>, AppError> {
    let Some(specialization) = required_specialization(&request.category) else {
        return Ok(None);
    };

    let Some(staff) = db::users::first_staff_with_specialization(&state.store, specialization).await
    else {
        return Ok(None);
    };

    let assigned = db::maintenance::assign(&state.store, request.id, staff.id).await?;
    tracing::info!(
        "Assigned request {} to staff {} ({specialization})",
        assigned.id,
        staff.id
    );

    notify_assignment(state, &staff, &assigned).await;
    Ok(Some(assigned))
}

async fn notify_assignment(state: &AppState, staff: &User, request: &MaintenanceRequest) {
    let tenant = db::users::find_by_id(&state.store, request.tenant_id).await;
    state
        .notifier
        .maintenance_assigned(staff, tenant.as_ref(), request)
        .await;
}

async fn flag_if_urgent(state: &AppState, request: MaintenanceRequest) {
    let text = format!("{}\n\n{}", request.title, request.description);
    let sentiment = state.sentiment.analyze(&text).await;

    if sentiment.rating <= state.config.urgency_threshold {
        tracing::info!(
            "Request {} flagged urgent (rating {}, confidence {:.2})",
            request.id,
            sentiment.rating,
            sentiment.confidence
        );
        state
            .broadcaster
            .publish(&Event::UrgentMaintenance(UrgentMaintenance { request, sentiment }));
    }
}

/// Hands a request that is not yet completed to a specific staff member.
pub async fn assign_request(
    state: &AppState,
    request_id: u64,
    staff_id: u64,
) -> Result<MaintenanceRequest, AppError> {
    let staff = db::users::find_by_id(&state.store, staff_id)
        .await
        .ok_or_else(|| AppError::NotFound("Staff member not found".to_string()))?;
    if staff.role != Role::Staff {
        return Err(AppError::BadRequest(
            "Requests can only be assigned to staff".to_string(),
        ));
    }

    let assigned = db::maintenance::assign(&state.store, request_id, staff.id).await?;
    tracing::info!("Request {} manually assigned to staff {}", assigned.id, staff.id);

    notify_assignment(state, &staff, &assigned).await;
    Ok(assigned)
}

/// Closes an assigned request with the assignee's report and notifies the
/// tenant and the landlord.
pub async fn complete_request(
    state: &AppState,
    staff_id: u64,
    request_id: u64,
    report: NewMaintenanceReport,
) -> Result<(MaintenanceRequest, MaintenanceReport), AppError> {
    if report.description.trim().is_empty() || report.work_done.trim().is_empty() {
        return Err(AppError::BadRequest(
            "Description and work done are required".to_string(),
        ));
    }
    if !report.cost.is_finite() || report.cost < 0.0 {
        return Err(AppError::BadRequest(
            "Cost must be a non-negative number".to_string(),
        ));
    }

    let existing = db::maintenance::find_by_id(&state.store, request_id)
        .await
        .ok_or_else(|| AppError::NotFound("Maintenance request not found".to_string()))?;

    match existing.status {
        RequestStatus::Pending => {
            return Err(AppError::Conflict(
                "Maintenance request has not been assigned".to_string(),
            ));
        }
        RequestStatus::Completed => {
            return Err(AppError::Conflict(
                "Maintenance request is already completed".to_string(),
            ));
        }
        RequestStatus::Assigned if existing.assigned_staff_id != Some(staff_id) => {
            return Err(AppError::Forbidden(
                "Only the assigned staff member can complete this request".to_string(),
            ));
        }
        RequestStatus::Assigned => {}
    }

    let (request, report) =
        db::maintenance::complete(&state.store, request_id, staff_id, report).await?;
    tracing::info!("Request {} completed by staff {staff_id}", request.id);

    let tenant = db::users::find_by_id(&state.store, request.tenant_id).await;
    let landlord = match db::properties::find_by_id(&state.store, request.property_id).await {
        Some(property) => db::users::find_by_id(&state.store, property.landlord_id).await,
        None => None,
    };

    state
        .notifier
        .maintenance_completed(tenant.as_ref(), landlord.as_ref(), &request, &report)
        .await;

    state
        .broadcaster
        .publish(&Event::MaintenanceCompleted(request.clone()));

    Ok((request, report))
}

#[cfg(test)]
mod tests {
    use super::required_specialization;

    #[test]
    fn categories_map_to_specializations() {
        assert_eq!(required_specialization("plumbing"), Some("plumber"));
        assert_eq!(required_specialization(" Electrical "), Some("electrician"));
        assert_eq!(required_specialization("hvac"), Some("hvac_technician"));
        assert_eq!(required_specialization("structural"), Some("carpenter"));
        assert_eq!(required_specialization("roofing"), None);
    }
}
