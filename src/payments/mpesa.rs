use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::{CheckoutReceipt, MobileMoneyGateway};
use crate::config::AfricasTalkingConfig;
use crate::error::ProviderError;

const PROVIDER: &str = "Africa's Talking payments";

/// M-Pesa STK push through Africa's Talking mobile checkout.
pub struct MpesaCheckout {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    username: String,
    product_name: String,
}

impl MpesaCheckout {
    pub fn new(client: reqwest::Client, config: &AfricasTalkingConfig) -> Self {
        let host = if config.is_sandbox() {
            "https://payments.sandbox.africastalking.com"
        } else {
            "https://payments.africastalking.com"
        };
        Self {
            client,
            endpoint: format!("{host}/mobile/checkout/request"),
            api_key: config.api_key.clone(),
            username: config.username.clone(),
            product_name: config.product_name.clone(),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CheckoutResponse {
    status: String,
    #[serde(default)]
    description: String,
    transaction_id: Option<String>,
}

#[async_trait]
impl MobileMoneyGateway for MpesaCheckout {
    async fn checkout(
        &self,
        phone_number: &str,
        amount: f64,
        reference: &str,
    ) -> Result<CheckoutReceipt, ProviderError> {
        let body = json!({
            "username": self.username,
            "productName": self.product_name,
            "phoneNumber": phone_number,
            "currencyCode": "KES",
            "amount": amount,
            "metadata": { "reference": reference },
        });

        let resp = self
            .client
            .post(&self.endpoint)
            .header("apiKey", &self.api_key)
            .header("Accept", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(ProviderError::http(PROVIDER))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(ProviderError::rejected(PROVIDER, format!("{status}: {text}")));
        }

        let parsed: CheckoutResponse =
            resp.json().await.map_err(ProviderError::http(PROVIDER))?;

        match parsed.transaction_id {
            Some(transaction_id) if parsed.status == "PendingConfirmation" => {
                Ok(CheckoutReceipt {
                    transaction_id,
                    status: parsed.status,
                    description: parsed.description,
                })
            }
            _ => Err(ProviderError::rejected(
                PROVIDER,
                format!("{}: {}", parsed.status, parsed.description),
            )),
        }
    }
}
