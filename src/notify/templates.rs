use chrono::{DateTime, Utc};

use crate::models::{Invoice, MaintenanceReport, MaintenanceRequest};

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn layout(heading: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"></head>
<body style="font-family: sans-serif; max-width: 600px; margin: 0 auto; padding: 20px;">
    <h2>{heading}</h2>
{body}
    <p style="color: #666; font-size: 14px;">PropSmart property management</p>
</body>
</html>"#
    )
}

fn date(d: DateTime<Utc>) -> String {
    d.format("%B %-d, %Y").to_string()
}

pub fn render_staff_assigned(request: &MaintenanceRequest) -> String {
    layout(
        "New Maintenance Request Assigned",
        &format!(
            r#"    <p><strong>{title}</strong></p>
    <p>Category: {category}<br>Priority: {priority}<br>Location: Property #{property}</p>
    <p>{description}</p>"#,
            title = escape(&request.title),
            category = escape(&request.category),
            priority = request.priority,
            property = request.property_id,
            description = escape(&request.description),
        ),
    )
}

pub fn sms_staff_assigned(request: &MaintenanceRequest) -> String {
    format!(
        "New maintenance request assigned: {} - {}. Priority: {}",
        request.category, request.title, request.priority
    )
}

pub fn render_tenant_assigned(request: &MaintenanceRequest) -> String {
    layout(
        "Maintenance Request Update",
        &format!(
            r#"    <p>Your maintenance request <strong>{title}</strong> has been assigned to our maintenance staff.</p>
    <p>Category: {category}</p>
    <p>We will keep you updated on the progress.</p>"#,
            title = escape(&request.title),
            category = escape(&request.category),
        ),
    )
}

pub fn sms_tenant_assigned(request: &MaintenanceRequest) -> String {
    format!(
        "Your {} maintenance request has been assigned to our staff. We'll keep you updated.",
        request.category
    )
}

pub fn render_tenant_completed(request: &MaintenanceRequest, report: &MaintenanceReport) -> String {
    layout(
        "Maintenance Request Completed",
        &format!(
            r#"    <p>Your maintenance request <strong>{title}</strong> has been completed.</p>
    <p>Work done: {work_done}</p>
    <p>Completed on: {completed}</p>
    <p>Thank you for your patience.</p>"#,
            title = escape(&request.title),
            work_done = escape(&report.work_done),
            completed = date(report.created_at),
        ),
    )
}

pub fn sms_tenant_completed(request: &MaintenanceRequest) -> String {
    format!(
        "Your {} maintenance request has been completed. Please check your email for details.",
        request.category
    )
}

pub fn render_landlord_completed(
    request: &MaintenanceRequest,
    report: &MaintenanceReport,
) -> String {
    let materials = if report.materials.is_empty() {
        "none".to_string()
    } else {
        escape(&report.materials.join(", "))
    };

    layout(
        "Maintenance Request Completed",
        &format!(
            r#"    <p><strong>{title}</strong> at property #{property}</p>
    <p>Category: {category}<br>Description: {description}</p>
    <p>Work done: {work_done}<br>Cost: ${cost:.2}<br>Time spent: {time_spent}<br>Materials: {materials}</p>"#,
            title = escape(&request.title),
            property = request.property_id,
            category = escape(&request.category),
            description = escape(&request.description),
            work_done = escape(&report.work_done),
            cost = report.cost,
            time_spent = escape(&report.time_spent),
        ),
    )
}

pub fn render_payment_reminder(invoice: &Invoice, base_url: &str) -> String {
    layout(
        "Payment Reminder",
        &format!(
            r#"    <p>Your payment of ${amount:.2} is due on {due}.</p>
    <p><a href="{base_url}/billing" style="display: inline-block; padding: 10px 20px; background: #0070f3; color: white; text-decoration: none; border-radius: 4px;">Pay Now</a></p>"#,
            amount = invoice.amount,
            due = date(invoice.due_date),
        ),
    )
}

pub fn sms_payment_reminder(invoice: &Invoice) -> String {
    format!(
        "Payment Reminder: Your payment of ${:.2} is due on {}. Please log in to make payment.",
        invoice.amount,
        date(invoice.due_date)
    )
}
