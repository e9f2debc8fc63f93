use async_trait::async_trait;
use serde::Deserialize;

use super::{CardCharge, CardGateway};
use crate::config::StripeConfig;
use crate::error::ProviderError;

const PROVIDER: &str = "Stripe";
const PAYMENT_INTENTS_URL: &str = "https://api.stripe.com/v1/payment_intents";

/// Confirms a PaymentIntent immediately against a saved payment method.
pub struct StripeGateway {
    client: reqwest::Client,
    secret_key: String,
    currency: String,
    return_url: String,
}

impl StripeGateway {
    pub fn new(client: reqwest::Client, config: &StripeConfig, base_url: &str) -> Self {
        Self {
            client,
            secret_key: config.secret_key.clone(),
            currency: config.currency.clone(),
            return_url: format!("{base_url}/payment/confirm"),
        }
    }
}

#[derive(Deserialize)]
struct PaymentIntent {
    id: String,
    status: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: StripeError,
}

#[derive(Deserialize)]
struct StripeError {
    message: Option<String>,
    code: Option<String>,
}

#[async_trait]
impl CardGateway for StripeGateway {
    async fn charge(
        &self,
        amount_cents: i64,
        payment_method_id: &str,
        description: &str,
    ) -> Result<CardCharge, ProviderError> {
        let amount = amount_cents.to_string();
        let form = [
            ("amount", amount.as_str()),
            ("currency", self.currency.as_str()),
            ("payment_method", payment_method_id),
            ("description", description),
            ("confirm", "true"),
            ("return_url", self.return_url.as_str()),
        ];

        let resp = self
            .client
            .post(PAYMENT_INTENTS_URL)
            .bearer_auth(&self.secret_key)
            .form(&form)
            .send()
            .await
            .map_err(ProviderError::http(PROVIDER))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let message = match resp.json::<ErrorBody>().await {
                Ok(body) => body
                    .error
                    .message
                    .or(body.error.code)
                    .unwrap_or_else(|| status.to_string()),
                Err(_) => status.to_string(),
            };
            return Err(ProviderError::rejected(PROVIDER, message));
        }

        let intent: PaymentIntent = resp.json().await.map_err(ProviderError::http(PROVIDER))?;
        tracing::info!("PaymentIntent {} is {}", intent.id, intent.status);

        Ok(CardCharge {
            succeeded: intent.status == "succeeded",
            id: intent.id,
            status: intent.status,
        })
    }
}
