use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::db::Store;
use crate::notify::email::{LogMailer, SmtpMailer};
use crate::notify::sms::{AfricasTalkingSms, LogSms};
use crate::notify::{Mailer, Notifier, SmsSender};
use crate::payments::mpesa::MpesaCheckout;
use crate::payments::stripe::StripeGateway;
use crate::payments::{CardGateway, MobileMoneyGateway, Unconfigured};
use crate::rate_limit::LoginRateLimiter;
use crate::realtime::Broadcaster;
use crate::sentiment::{OpenAiAnalyzer, SentimentAnalyzer};

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub config: Config,
    pub store: Store,
    pub notifier: Notifier,
    pub card_gateway: Arc<dyn CardGateway>,
    pub mobile_money: Arc<dyn MobileMoneyGateway>,
    pub sentiment: Arc<dyn SentimentAnalyzer>,
    pub broadcaster: Broadcaster,
    pub login_limiter: LoginRateLimiter,
}

/// The outside services the app talks to. Tests swap these for fakes.
pub struct Providers {
    pub mailer: Arc<dyn Mailer>,
    pub sms: Arc<dyn SmsSender>,
    pub card_gateway: Arc<dyn CardGateway>,
    pub mobile_money: Arc<dyn MobileMoneyGateway>,
    pub sentiment: Arc<dyn SentimentAnalyzer>,
}

impl Providers {
    pub fn from_config(config: &Config) -> Result<Self, String> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| format!("Failed to build HTTP client: {e}"))?;

        let mailer: Arc<dyn Mailer> = match &config.smtp {
            Some(smtp) => match SmtpMailer::new(smtp) {
                Ok(mailer) => {
                    tracing::info!("SMTP configured");
                    Arc::new(mailer)
                }
                Err(e) => {
                    tracing::warn!("SMTP not available: {e}");
                    Arc::new(LogMailer)
                }
            },
            None => Arc::new(LogMailer),
        };

        let (sms, mobile_money): (Arc<dyn SmsSender>, Arc<dyn MobileMoneyGateway>) =
            match &config.africastalking {
                Some(at) => {
                    tracing::info!("Africa's Talking configured (user {})", at.username);
                    (
                        Arc::new(AfricasTalkingSms::new(client.clone(), at)),
                        Arc::new(MpesaCheckout::new(client.clone(), at)),
                    )
                }
                None => (Arc::new(LogSms), Arc::new(Unconfigured("M-Pesa"))),
            };

        let card_gateway: Arc<dyn CardGateway> = match &config.stripe {
            Some(stripe) => Arc::new(StripeGateway::new(client.clone(), stripe, &config.base_url)),
            None => Arc::new(Unconfigured("Card payments")),
        };

        let sentiment = Arc::new(OpenAiAnalyzer::new(client, &config.openai));

        Ok(Self {
            mailer,
            sms,
            card_gateway,
            mobile_money,
            sentiment,
        })
    }
}
