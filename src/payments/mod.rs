pub mod mpesa;
pub mod stripe;

use async_trait::async_trait;

use crate::error::ProviderError;

/// Outcome of a card charge as reported by the gateway.
#[derive(Debug, Clone)]
pub struct CardCharge {
    pub id: String,
    pub succeeded: bool,
    pub status: String,
}

/// Outcome of starting a mobile-money checkout. The customer still has to
/// confirm on their handset.
#[derive(Debug, Clone)]
pub struct CheckoutReceipt {
    pub transaction_id: String,
    pub status: String,
    pub description: String,
}

#[async_trait]
pub trait CardGateway: Send + Sync {
    async fn charge(
        &self,
        amount_cents: i64,
        payment_method_id: &str,
        description: &str,
    ) -> Result<CardCharge, ProviderError>;
}

#[async_trait]
pub trait MobileMoneyGateway: Send + Sync {
    async fn checkout(
        &self,
        phone_number: &str,
        amount: f64,
        reference: &str,
    ) -> Result<CheckoutReceipt, ProviderError>;
}

/// Gateway slot with no credentials behind it.
pub struct Unconfigured(pub &'static str);

#[async_trait]
impl CardGateway for Unconfigured {
    async fn charge(&self, _: i64, _: &str, _: &str) -> Result<CardCharge, ProviderError> {
        Err(ProviderError::NotConfigured(self.0))
    }
}

#[async_trait]
impl MobileMoneyGateway for Unconfigured {
    async fn checkout(&self, _: &str, _: f64, _: &str) -> Result<CheckoutReceipt, ProviderError> {
        Err(ProviderError::NotConfigured(self.0))
    }
}

/// Converts a decimal amount to the smallest currency unit.
pub fn to_cents(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}
