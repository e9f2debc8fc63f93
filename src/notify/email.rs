use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use super::Mailer;
use crate::config::SmtpConfig;
use crate::error::ProviderError;

/// Sends HTML mail through an authenticated STARTTLS relay.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> Result<Self, ProviderError> {
        let creds = Credentials::new(config.user.clone(), config.pass.clone());

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| ProviderError::Smtp(format!("relay setup failed: {e}")))?
            .port(config.port)
            .credentials(creds)
            .build();

        Ok(Self {
            transport,
            from: config.from.clone(),
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), ProviderError> {
        let message = Message::builder()
            .from(
                self.from
                    .parse()
                    .map_err(|e| ProviderError::Address(format!("{}: {e}", self.from)))?,
            )
            .to(to
                .parse()
                .map_err(|e| ProviderError::Address(format!("{to}: {e}")))?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html_body.to_string())
            .map_err(|e| ProviderError::Smtp(format!("failed to build message: {e}")))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| ProviderError::Smtp(e.to_string()))?;

        tracing::debug!("Email sent to {to}: {subject}");
        Ok(())
    }
}

/// Stand-in used when no SMTP relay is configured.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, to: &str, subject: &str, _html_body: &str) -> Result<(), ProviderError> {
        tracing::warn!("SMTP not configured. Dropping email to {to}: {subject}");
        Ok(())
    }
}
