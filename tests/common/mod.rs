#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

use propsmart::config::{Config, OpenAiConfig};
use propsmart::error::ProviderError;
use propsmart::notify::{Mailer, SmsSender};
use propsmart::payments::{CardCharge, CardGateway, CheckoutReceipt, MobileMoneyGateway};
use propsmart::sentiment::{Sentiment, SentimentAnalyzer};
use propsmart::state::{Providers, SharedState};

#[derive(Debug, Clone)]
pub struct SentEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Clone)]
pub struct SentSms {
    pub to: String,
    pub message: String,
}

/// Records every email; fails all sends when `failing` is set.
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<SentEmail>>,
    pub failing: bool,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), ProviderError> {
        if self.failing {
            return Err(ProviderError::Smtp("relay unavailable".to_string()));
        }
        self.sent.lock().unwrap().push(SentEmail {
            to: to.to_string(),
            subject: subject.to_string(),
            body: html_body.to_string(),
        });
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingSms {
    pub sent: Mutex<Vec<SentSms>>,
}

#[async_trait]
impl SmsSender for RecordingSms {
    async fn send(&self, to: &str, message: &str) -> Result<(), ProviderError> {
        self.sent.lock().unwrap().push(SentSms {
            to: to.to_string(),
            message: message.to_string(),
        });
        Ok(())
    }
}

/// Approves every charge unless the payment method is "pm_card_declined".
/// `delay` holds each charge open to let concurrent payments overlap.
#[derive(Default)]
pub struct FakeCardGateway {
    pub charges: Mutex<Vec<i64>>,
    pub delay: Option<Duration>,
}

#[async_trait]
impl CardGateway for FakeCardGateway {
    async fn charge(
        &self,
        amount_cents: i64,
        payment_method_id: &str,
        _description: &str,
    ) -> Result<CardCharge, ProviderError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if payment_method_id == "pm_card_declined" {
            return Err(ProviderError::rejected("Stripe", "Your card was declined."));
        }
        let mut charges = self.charges.lock().unwrap();
        charges.push(amount_cents);
        Ok(CardCharge {
            id: format!("pi_test_{}", charges.len()),
            succeeded: true,
            status: "succeeded".to_string(),
        })
    }
}

/// Rejects checkouts for the number "+254700000000".
#[derive(Default)]
pub struct FakeMobileMoney {
    pub checkouts: Mutex<Vec<(String, f64)>>,
}

#[async_trait]
impl MobileMoneyGateway for FakeMobileMoney {
    async fn checkout(
        &self,
        phone_number: &str,
        amount: f64,
        _reference: &str,
    ) -> Result<CheckoutReceipt, ProviderError> {
        if phone_number == "+254700000000" {
            return Err(ProviderError::rejected("Africa's Talking payments", "InvalidPhoneNumber"));
        }
        self.checkouts
            .lock()
            .unwrap()
            .push((phone_number.to_string(), amount));
        Ok(CheckoutReceipt {
            transaction_id: "ATPid_test".to_string(),
            status: "PendingConfirmation".to_string(),
            description: "Waiting for user input".to_string(),
        })
    }
}

pub struct FixedSentiment(pub u8);

#[async_trait]
impl SentimentAnalyzer for FixedSentiment {
    async fn analyze(&self, _text: &str) -> Sentiment {
        Sentiment {
            rating: self.0,
            confidence: 0.9,
        }
    }

    async fn recommend(&self, _description: &str) -> String {
        "Shut off the water supply and call a plumber.".to_string()
    }
}

pub struct TestOptions {
    pub failing_mailer: bool,
    pub sentiment_rating: u8,
    pub card_delay: Option<Duration>,
}

impl Default for TestOptions {
    fn default() -> Self {
        Self {
            failing_mailer: false,
            sentiment_rating: 4,
            card_delay: None,
        }
    }
}

/// A running test server plus handles on every fake provider.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub state: SharedState,
    pub mailer: Arc<RecordingMailer>,
    pub sms: Arc<RecordingSms>,
    pub cards: Arc<FakeCardGateway>,
    pub mobile_money: Arc<FakeMobileMoney>,
}

pub fn test_config() -> Config {
    Config {
        session_secret: "test-session-secret-that-is-long-enough".to_string(),
        session_ttl_hours: 1,
        secure_cookies: false,
        host: "127.0.0.1".parse().unwrap(),
        port: 0,
        base_url: "http://localhost:0".to_string(),
        max_body_size: 1_048_576,
        log_level: "warn".to_string(),
        reminder_interval_secs: 60,
        urgency_threshold: 2,
        smtp: None,
        africastalking: None,
        stripe: None,
        openai: OpenAiConfig {
            api_key: None,
            model: "gpt-4o".to_string(),
            base_url: "http://localhost:0".to_string(),
        },
    }
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(TestOptions::default()).await
}

pub async fn spawn_app_with(options: TestOptions) -> TestApp {
    let mailer = Arc::new(RecordingMailer {
        failing: options.failing_mailer,
        ..Default::default()
    });
    let sms = Arc::new(RecordingSms::default());
    let cards = Arc::new(FakeCardGateway {
        delay: options.card_delay,
        ..Default::default()
    });
    let mobile_money = Arc::new(FakeMobileMoney::default());

    let providers = Providers {
        mailer: mailer.clone(),
        sms: sms.clone(),
        card_gateway: cards.clone(),
        mobile_money: mobile_money.clone(),
        sentiment: Arc::new(FixedSentiment(options.sentiment_rating)),
    };

    let (app, state) = propsmart::build_app_with(test_config(), providers);

    // Bind to random port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });

    TestApp {
        addr,
        client: Client::new(),
        state,
        mailer,
        sms,
        cards,
        mobile_money,
    }
}

fn session_cookie(resp: &reqwest::Response) -> Option<String> {
    resp.headers()
        .get_all("set-cookie")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("propsmart_session=") && !v.starts_with("propsmart_session=;"))
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn emails_to(&self, to: &str) -> Vec<SentEmail> {
        self.mailer
            .sent
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.to == to)
            .cloned()
            .collect()
    }

    pub fn sms_to(&self, to: &str) -> Vec<SentSms> {
        self.sms
            .sent
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.to == to)
            .cloned()
            .collect()
    }

    /// Register and return (body, status, session cookie).
    pub async fn register(&self, body: &Value) -> (Value, StatusCode, Option<String>) {
        let resp = self
            .client
            .post(self.url("/api/register"))
            .json(body)
            .send()
            .await
            .expect("register request failed");
        let status = resp.status();
        let cookie = session_cookie(&resp);
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status, cookie)
    }

    pub async fn login(&self, username: &str, password: &str) -> (Value, StatusCode, Option<String>) {
        let resp = self
            .client
            .post(self.url("/api/login"))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await
            .expect("login request failed");
        let status = resp.status();
        let cookie = session_cookie(&resp);
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status, cookie)
    }

    /// Register a user with the given role; returns (user JSON, cookie).
    pub async fn signup(&self, username: &str, role: &str, phone: Option<&str>) -> (Value, String) {
        let (body, status, cookie) = self
            .register(&json!({
                "username": username,
                "password": "password123",
                "name": format!("{username} user"),
                "email": format!("{username}@test.com"),
                "phone": phone,
                "role": role,
            }))
            .await;
        assert_eq!(status, StatusCode::CREATED, "signup failed: {body}");
        (body, cookie.expect("no session cookie"))
    }

    /// Add a staff member as `landlord_cookie`; returns the staff JSON.
    pub async fn add_staff(
        &self,
        landlord_cookie: &str,
        username: &str,
        specialization: &str,
        phone: Option<&str>,
    ) -> Value {
        let (body, status) = self
            .post_auth(
                "/api/staff",
                landlord_cookie,
                &json!({
                    "username": username,
                    "password": "password123",
                    "name": format!("{username} staff"),
                    "email": format!("{username}@test.com"),
                    "phone": phone,
                    "specialization": specialization,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "add staff failed: {body}");
        body
    }

    pub async fn create_property(&self, landlord_cookie: &str, name: &str) -> Value {
        let (body, status) = self
            .post_auth(
                "/api/properties",
                landlord_cookie,
                &json!({ "name": name, "address": "12 Moi Avenue", "rent": 45000 }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create property failed: {body}");
        body
    }

    pub async fn file_request(
        &self,
        tenant_cookie: &str,
        property_id: u64,
        category: &str,
    ) -> (Value, StatusCode) {
        self.post_auth(
            "/api/maintenance",
            tenant_cookie,
            &json!({
                "propertyId": property_id,
                "title": "Leaking sink",
                "description": "Water is dripping under the kitchen sink",
                "category": category,
                "priority": "high",
            }),
        )
        .await
    }

    pub async fn get_auth(&self, path: &str, cookie: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .get(self.url(path))
            .header("cookie", cookie)
            .send()
            .await
            .expect("get request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub async fn post_auth(&self, path: &str, cookie: &str, body: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url(path))
            .header("cookie", cookie)
            .json(body)
            .send()
            .await
            .expect("post request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub async fn patch_auth(&self, path: &str, cookie: &str, body: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .patch(self.url(path))
            .header("cookie", cookie)
            .json(body)
            .send()
            .await
            .expect("patch request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }
}
