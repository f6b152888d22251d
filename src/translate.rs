use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use crate::config::TranslateConfig;

/// Text translation backend
#[async_trait::async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, target_language: &str) -> Result<String>;
}

/// Client for the Google Cloud Translation v2 REST API
#[derive(Debug, Clone)]
pub struct GoogleTranslator {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    data: TranslateData,
}

#[derive(Debug, Deserialize)]
struct TranslateData {
    translations: Vec<Translation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Translation {
    translated_text: String,
}

impl GoogleTranslator {
    pub fn new(config: &TranslateConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build translation HTTP client")?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait::async_trait]
impl Translator for GoogleTranslator {
    async fn translate(&self, text: &str, target_language: &str) -> Result<String> {
        let mut request = self.client.post(&self.endpoint).json(&json!({
            "q": text,
            "target": target_language,
            "format": "text",
        }));
        if let Some(key) = &self.api_key {
            request = request.query(&[("key", key)]);
        }

        let response = request
            .send()
            .await
            .context("Translation request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("Translation API returned {}: {}", status, body));
        }

        let body: TranslateResponse = response
            .json()
            .await
            .context("Malformed translation response")?;

        body.data
            .translations
            .into_iter()
            .next()
            .map(|t| t.translated_text)
            .ok_or_else(|| anyhow!("Translation response contained no translations"))
    }
}

/// Echoes the input with the target language tag; used when no API key is configured
#[derive(Debug, Clone, Default)]
pub struct EchoTranslator;

#[async_trait::async_trait]
impl Translator for EchoTranslator {
    async fn translate(&self, text: &str, target_language: &str) -> Result<String> {
        Ok(format!("[{}] {}", target_language, text))
    }
}
