pub mod email;
pub mod sms;
pub mod templates;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ProviderError;
use crate::models::{MaintenanceReport, MaintenanceRequest, User};

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), ProviderError>;
}

#[async_trait]
pub trait SmsSender: Send + Sync {
    async fn send(&self, to: &str, message: &str) -> Result<(), ProviderError>;
}

/// Fans maintenance events out to email and SMS. Delivery failures are
/// logged and never returned; the write that triggered them stands.
pub struct Notifier {
    mailer: Arc<dyn Mailer>,
    sms: Arc<dyn SmsSender>,
}

impl Notifier {
    pub fn new(mailer: Arc<dyn Mailer>, sms: Arc<dyn SmsSender>) -> Self {
        Self { mailer, sms }
    }

    pub async fn try_email(&self, to: &str, subject: &str, html: &str) -> Result<(), ProviderError> {
        self.mailer.send(to, subject, html).await
    }

    pub async fn try_sms(&self, to: &str, message: &str) -> Result<(), ProviderError> {
        self.sms.send(to, message).await
    }

    async fn email(&self, to: &str, subject: &str, html: &str) {
        if let Err(e) = self.try_email(to, subject, html).await {
            tracing::error!("Failed to send email to {to}: {e}");
        }
    }

    /// Skipped when the user has no phone number on file.
    async fn sms(&self, user: &User, message: &str) {
        let Some(phone) = user.phone_number() else {
            return;
        };
        if let Err(e) = self.try_sms(phone, message).await {
            tracing::error!("Failed to send SMS to user {}: {e}", user.id);
        }
    }

    pub async fn maintenance_assigned(
        &self,
        staff: &User,
        tenant: Option<&User>,
        request: &MaintenanceRequest,
    ) {
        self.email(
            &staff.email,
            "New Maintenance Request Assigned",
            &templates::render_staff_assigned(request),
        )
        .await;
        self.sms(staff, &templates::sms_staff_assigned(request)).await;

        if let Some(tenant) = tenant {
            self.email(
                &tenant.email,
                "Maintenance Request Update",
                &templates::render_tenant_assigned(request),
            )
            .await;
            self.sms(tenant, &templates::sms_tenant_assigned(request))
                .await;
        }
    }

    pub async fn maintenance_completed(
        &self,
        tenant: Option<&User>,
        landlord: Option<&User>,
        request: &MaintenanceRequest,
        report: &MaintenanceReport,
    ) {
        if let Some(tenant) = tenant {
            self.email(
                &tenant.email,
                "Maintenance Request Completed",
                &templates::render_tenant_completed(request, report),
            )
            .await;
            self.sms(tenant, &templates::sms_tenant_completed(request))
                .await;
        }

        if let Some(landlord) = landlord {
            self.email(
                &landlord.email,
                "Maintenance Request Completed",
                &templates::render_landlord_completed(request, report),
            )
            .await;
        }
    }
}
