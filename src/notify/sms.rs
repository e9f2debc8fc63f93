use async_trait::async_trait;
use serde::Deserialize;

use super::SmsSender;
use crate::config::AfricasTalkingConfig;
use crate::error::ProviderError;

const PROVIDER: &str = "Africa's Talking SMS";

/// Bulk SMS through the Africa's Talking messaging API.
pub struct AfricasTalkingSms {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    username: String,
    sender_id: Option<String>,
}

impl AfricasTalkingSms {
    pub fn new(client: reqwest::Client, config: &AfricasTalkingConfig) -> Self {
        let host = if config.is_sandbox() {
            "https://api.sandbox.africastalking.com"
        } else {
            "https://api.africastalking.com"
        };
        Self {
            client,
            endpoint: format!("{host}/version1/messaging"),
            api_key: config.api_key.clone(),
            username: config.username.clone(),
            sender_id: config.sender_id.clone(),
        }
    }
}

#[derive(Deserialize)]
struct SendResponse {
    #[serde(rename = "SMSMessageData")]
    data: MessageData,
}

#[derive(Deserialize)]
struct MessageData {
    #[serde(rename = "Message")]
    message: String,
    #[serde(rename = "Recipients", default)]
    recipients: Vec<Recipient>,
}

#[derive(Deserialize)]
struct Recipient {
    status: String,
    number: String,
}

#[async_trait]
impl SmsSender for AfricasTalkingSms {
    async fn send(&self, to: &str, message: &str) -> Result<(), ProviderError> {
        let mut form = vec![
            ("username", self.username.as_str()),
            ("to", to),
            ("message", message),
        ];
        if let Some(from) = &self.sender_id {
            form.push(("from", from.as_str()));
        }

        let resp = self
            .client
            .post(&self.endpoint)
            .header("apiKey", &self.api_key)
            .header("Accept", "application/json")
            .form(&form)
            .send()
            .await
            .map_err(ProviderError::http(PROVIDER))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(ProviderError::rejected(PROVIDER, format!("{status}: {body}")));
        }

        let body: SendResponse = resp.json().await.map_err(ProviderError::http(PROVIDER))?;

        match body.data.recipients.first() {
            Some(r) if r.status == "Success" => {
                tracing::debug!("SMS queued for {}", r.number);
                Ok(())
            }
            Some(r) => Err(ProviderError::rejected(
                PROVIDER,
                format!("{}: {}", r.number, r.status),
            )),
            None => Err(ProviderError::rejected(PROVIDER, body.data.message)),
        }
    }
}

/// Stand-in used when no SMS provider is configured.
pub struct LogSms;

#[async_trait]
impl SmsSender for LogSms {
    async fn send(&self, to: &str, _message: &str) -> Result<(), ProviderError> {
        tracing::warn!("SMS provider not configured. Dropping SMS to {to}");
        Ok(())
    }
}
