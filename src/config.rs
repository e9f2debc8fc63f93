use std::net::IpAddr;

#[derive(Debug, Clone)]
pub struct Config {
    pub session_secret: String,
    pub session_ttl_hours: i64,
    pub secure_cookies: bool,
    pub host: IpAddr,
    pub port: u16,
    pub base_url: String,
    pub max_body_size: usize,
    pub log_level: String,
    pub reminder_interval_secs: u64,
    /// Sentiment ratings at or below this value are broadcast as urgent.
    pub urgency_threshold: u8,
    pub smtp: Option<SmtpConfig>,
    pub africastalking: Option<AfricasTalkingConfig>,
    pub stripe: Option<StripeConfig>,
    pub openai: OpenAiConfig,
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub pass: String,
    pub from: String,
}

#[derive(Debug, Clone)]
pub struct AfricasTalkingConfig {
    pub api_key: String,
    pub username: String,
    pub sender_id: Option<String>,
    pub product_name: String,
}

impl AfricasTalkingConfig {
    pub fn is_sandbox(&self) -> bool {
        self.username == "sandbox"
    }
}

#[derive(Debug, Clone)]
pub struct StripeConfig {
    pub secret_key: String,
    pub currency: String,
}

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let session_secret = env_required("PROPSMART_SESSION_SECRET")?;
        if session_secret.len() < 32 {
            return Err("PROPSMART_SESSION_SECRET must be at least 32 characters".to_string());
        }

        let session_ttl_hours: i64 = env_or("PROPSMART_SESSION_TTL_HOURS", "24")
            .parse()
            .map_err(|e| format!("Invalid PROPSMART_SESSION_TTL_HOURS: {e}"))?;

        let secure_cookies = env_or("PROPSMART_SECURE_COOKIES", "true") != "false";

        let host: IpAddr = env_or("PROPSMART_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid PROPSMART_HOST: {e}"))?;

        let port: u16 = env_or("PROPSMART_PORT", "5000")
            .parse()
            .map_err(|e| format!("Invalid PROPSMART_PORT: {e}"))?;

        let base_url = env_or("PROPSMART_BASE_URL", &format!("http://{host}:{port}"));

        let max_body_size: usize = env_or("PROPSMART_MAX_BODY_SIZE", "1048576")
            .parse()
            .map_err(|e| format!("Invalid PROPSMART_MAX_BODY_SIZE: {e}"))?;

        let log_level = env_or("PROPSMART_LOG_LEVEL", "info");

        let reminder_interval_secs: u64 = env_or("PROPSMART_REMINDER_INTERVAL_SECS", "300")
            .parse()
            .map_err(|e| format!("Invalid PROPSMART_REMINDER_INTERVAL_SECS: {e}"))?;

        let urgency_threshold: u8 = env_or("PROPSMART_URGENCY_THRESHOLD", "2")
            .parse()
            .map_err(|e| format!("Invalid PROPSMART_URGENCY_THRESHOLD: {e}"))?;

        let smtp = match (
            std::env::var("PROPSMART_SMTP_HOST").ok(),
            std::env::var("PROPSMART_SMTP_PORT").ok(),
            std::env::var("PROPSMART_SMTP_USER").ok(),
            std::env::var("PROPSMART_SMTP_PASS").ok(),
            std::env::var("PROPSMART_SMTP_FROM").ok(),
        ) {
            (Some(host), Some(port), Some(user), Some(pass), Some(from)) => Some(SmtpConfig {
                host,
                port: port
                    .parse()
                    .map_err(|e| format!("Invalid PROPSMART_SMTP_PORT: {e}"))?,
                user,
                pass,
                from,
            }),
            _ => None,
        };

        let africastalking = match (
            std::env::var("AFRICASTALKING_API_KEY").ok(),
            std::env::var("AFRICASTALKING_USERNAME").ok(),
        ) {
            (Some(api_key), Some(username)) => Some(AfricasTalkingConfig {
                api_key,
                username,
                sender_id: std::env::var("AFRICASTALKING_SENDER_ID").ok(),
                product_name: env_or("AFRICASTALKING_PRODUCT_NAME", "PropSmart"),
            }),
            _ => None,
        };

        let stripe = std::env::var("STRIPE_SECRET_KEY").ok().map(|secret_key| StripeConfig {
            secret_key,
            currency: env_or("STRIPE_CURRENCY", "usd"),
        });

        let openai = OpenAiConfig {
            api_key: std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty()),
            model: env_or("PROPSMART_OPENAI_MODEL", "gpt-4o"),
            base_url: env_or("PROPSMART_OPENAI_BASE_URL", "https://api.openai.com/v1"),
        };

        Ok(Config {
            session_secret,
            session_ttl_hours,
            secure_cookies,
            host,
            port,
            base_url,
            max_body_size,
            log_level,
            reminder_interval_secs,
            urgency_threshold,
            smtp,
            africastalking,
            stripe,
            openai,
        })
    }
}

fn env_required(key: &str) -> Result<String, String> {
    std::env::var(key).map_err(|_| format!("Missing required environment variable: {key}"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
