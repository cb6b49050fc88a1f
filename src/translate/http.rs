use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::Translator;

/// Translator backed by a LibreTranslate-compatible JSON endpoint.
pub struct HttpTranslator {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

#[derive(Serialize)]
struct TranslateRequest<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

#[derive(Deserialize)]
struct TranslateResponse {
    #[serde(rename = "translatedText")]
    translated_text: String,
}

impl HttpTranslator {
    pub fn new(endpoint: String, api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint,
            api_key,
        }
    }
}

#[async_trait]
impl Translator for HttpTranslator {
    fn name(&self) -> &str {
        "http"
    }

    async fn translate(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<String> {
        debug!(
            "Translating {} chars {} -> {}",
            text.len(),
            source_lang,
            target_lang
        );

        let request = TranslateRequest {
            q: text,
            source: source_lang,
            target: target_lang,
            api_key: self.api_key.as_deref(),
        };

        let res = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .context("Failed to send translation request")?;

        if !res.status().is_success() {
            let status = res.status();
            let error_text = res.text().await.unwrap_or_default();
            return Err(anyhow!("Translation API error ({}): {}", status, error_text));
        }

        let body: TranslateResponse = res
            .json()
            .await
            .context("Failed to parse translation response")?;

        Ok(body.translated_text)
    }
}
