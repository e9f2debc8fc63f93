pub mod alert;
pub mod invoice;
pub mod maintenance;
pub mod payment;
pub mod property;
pub mod reminder;
pub mod session;
pub mod user;

pub use alert::{AlertStatus, SecurityAlert};
pub use invoice::{BillingPeriod, Invoice, InvoiceStatus, InvoiceType, NewInvoice, UtilityUsage};
pub use maintenance::{
    MaintenanceReport, MaintenanceRequest, NewMaintenanceReport, NewMaintenanceRequest, Priority,
    RequestStatus,
};
pub use payment::{Payment, PaymentMethod, PaymentStatus};
pub use property::{NewProperty, Property, PropertyStatus};
pub use reminder::{PaymentReminder, ReminderStatus, ReminderType};
pub use session::Session;
pub use user::{NewUser, Role, User};
