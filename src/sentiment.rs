use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::OpenAiConfig;
use crate::error::ProviderError;

const PROVIDER: &str = "OpenAI";

/// Urgency score of a maintenance description. `rating` runs from 1 (most
/// urgent) to 5.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sentiment {
    pub rating: u8,
    pub confidence: f64,
}

impl Sentiment {
    pub const NEUTRAL: Sentiment = Sentiment {
        rating: 3,
        confidence: 0.5,
    };

    /// Out-of-range values are clamped. A non-finite rating scores neutral.
    fn clamped(rating: f64, confidence: f64) -> Self {
        if !rating.is_finite() {
            return Sentiment::NEUTRAL;
        }
        Sentiment {
            rating: rating.round().clamp(1.0, 5.0) as u8,
            confidence: if confidence.is_finite() {
                confidence.clamp(0.0, 1.0)
            } else {
                0.0
            },
        }
    }
}

pub const RECOMMENDATION_FALLBACK: &str = "Unable to generate recommendation at this time.";

/// Never fails: on any provider problem the neutral score or the fallback
/// recommendation is returned.
#[async_trait]
pub trait SentimentAnalyzer: Send + Sync {
    async fn analyze(&self, text: &str) -> Sentiment;
    async fn recommend(&self, description: &str) -> String;
}

pub struct OpenAiAnalyzer {
    client: reqwest::Client,
    api_key: Option<String>,
    model: String,
    endpoint: String,
}

impl OpenAiAnalyzer {
    pub fn new(client: reqwest::Client, config: &OpenAiConfig) -> Self {
        if config.api_key.is_none() {
            tracing::warn!("OPENAI_API_KEY is not set; urgency scoring falls back to neutral");
        }
        Self {
            client,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
        }
    }

    async fn complete(
        &self,
        system: &str,
        user: &str,
        json_mode: bool,
    ) -> Result<String, ProviderError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ProviderError::NotConfigured(PROVIDER))?;

        let mut body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user },
            ],
        });
        if json_mode {
            body["response_format"] = json!({ "type": "json_object" });
        }

        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(ProviderError::http(PROVIDER))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(ProviderError::rejected(PROVIDER, format!("{status}: {text}")));
        }

        let completion: ChatCompletion =
            resp.json().await.map_err(ProviderError::http(PROVIDER))?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ProviderError::rejected(PROVIDER, "empty completion"))
    }
}

#[derive(Deserialize)]
struct ChatCompletion {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct RawScore {
    rating: f64,
    confidence: f64,
}

const URGENCY_PROMPT: &str = "Rate how severe and time-critical this property maintenance \
request is. Reply with a JSON object {\"rating\": number, \"confidence\": number} where rating \
is 1 (most urgent) to 5 (least urgent) and confidence is between 0 and 1.";

const RECOMMENDATION_PROMPT: &str = "You advise property managers. Give a short, practical \
recommendation for handling this maintenance request.";

#[async_trait]
impl SentimentAnalyzer for OpenAiAnalyzer {
    async fn analyze(&self, text: &str) -> Sentiment {
        let result = self
            .complete(URGENCY_PROMPT, text, true)
            .await
            .and_then(|content| {
                serde_json::from_str::<RawScore>(&content)
                    .map_err(|e| ProviderError::rejected(PROVIDER, format!("bad score JSON: {e}")))
            });

        match result {
            Ok(raw) => Sentiment::clamped(raw.rating, raw.confidence),
            Err(ProviderError::NotConfigured(_)) => Sentiment::NEUTRAL,
            Err(e) => {
                tracing::error!("Failed to analyze sentiment: {e}");
                Sentiment::NEUTRAL
            }
        }
    }

    async fn recommend(&self, description: &str) -> String {
        match self.complete(RECOMMENDATION_PROMPT, description, false).await {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => "No recommendation available.".to_string(),
            Err(e) => {
                tracing::error!("Failed to generate recommendation: {e}");
                RECOMMENDATION_FALLBACK.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scores_are_clamped_into_range() {
        assert_eq!(Sentiment::clamped(0.2, 1.7), Sentiment { rating: 1, confidence: 1.0 });
        assert_eq!(Sentiment::clamped(9.0, -0.3), Sentiment { rating: 5, confidence: 0.0 });
        assert_eq!(Sentiment::clamped(2.4, f64::NAN).confidence, 0.0);
        assert_eq!(Sentiment::clamped(2.6, 0.8).rating, 3);
    }

    #[test]
    fn non_finite_rating_is_neutral() {
        assert_eq!(Sentiment::clamped(f64::NAN, 0.9), Sentiment::NEUTRAL);
        assert_eq!(Sentiment::clamped(f64::INFINITY, 0.9), Sentiment::NEUTRAL);
        assert_eq!(Sentiment::clamped(f64::NEG_INFINITY, 0.9), Sentiment::NEUTRAL);
    }

    #[tokio::test]
    async fn unconfigured_analyzer_is_neutral() {
        let analyzer = OpenAiAnalyzer::new(
            reqwest::Client::new(),
            &OpenAiConfig {
                api_key: None,
                model: "gpt-4o".to_string(),
                base_url: "http://127.0.0.1:9".to_string(),
            },
        );
        assert_eq!(analyzer.analyze("the ceiling collapsed").await, Sentiment::NEUTRAL);
        assert_eq!(analyzer.recommend("leaking tap").await, RECOMMENDATION_FALLBACK);
    }
}
