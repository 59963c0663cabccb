// src/services/language.rs
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Language all model traffic passes through.
pub const PIVOT_LANG: &str = "en";
/// Sentinel tag used when the language is unknown or detection is off.
pub const AUTO_LANG: &str = "auto";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const TRANSLATE_ENDPOINT: &str = "https://translate.googleapis.com/translate_a/single";

#[derive(Debug, Error)]
pub enum LanguageError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("unexpected translation payload")]
    MalformedPayload,
}

/// Best-effort language detection and round-trip translation. Callers decide
/// how to degrade when a method fails; implementations just report it.
#[async_trait]
pub trait LanguageAdapter: Send + Sync {
    async fn detect(&self, text: &str) -> Result<String, LanguageError>;

    async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<String, LanguageError>;
}

/// Pass-through adapter used when translation is disabled by configuration.
pub struct NoopLanguage;

#[async_trait]
impl LanguageAdapter for NoopLanguage {
    async fn detect(&self, _text: &str) -> Result<String, LanguageError> {
        Ok(AUTO_LANG.to_string())
    }

    async fn translate(
        &self,
        text: &str,
        _source: &str,
        _target: &str,
    ) -> Result<String, LanguageError> {
        Ok(text.to_string())
    }
}

/// Adapter backed by the public Google Translate web endpoint (the same one
/// the usual unofficial clients use; no API key required).
pub struct GoogleLanguage {
    client: reqwest::Client,
}

impl GoogleLanguage {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .expect("failed to build HTTP client"),
        }
    }

    async fn call(&self, text: &str, source: &str, target: &str) -> Result<Value, LanguageError> {
        let response = self
            .client
            .get(TRANSLATE_ENDPOINT)
            .query(&[
                ("client", "gtx"),
                ("dt", "t"),
                ("sl", source),
                ("tl", target),
                ("q", text),
            ])
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json().await?)
    }
}

impl Default for GoogleLanguage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LanguageAdapter for GoogleLanguage {
    async fn detect(&self, text: &str) -> Result<String, LanguageError> {
        // The endpoint reports the detected source language at index 2.
        let payload = self.call(text, AUTO_LANG, PIVOT_LANG).await?;
        payload
            .get(2)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or(LanguageError::MalformedPayload)
    }

    async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<String, LanguageError> {
        // Already in the target language (or unknown source): nothing to do.
        if source == target || source == AUTO_LANG || target == AUTO_LANG {
            return Ok(text.to_string());
        }

        let payload = self.call(text, source, target).await?;
        let segments = payload
            .get(0)
            .and_then(Value::as_array)
            .ok_or(LanguageError::MalformedPayload)?;

        let mut out = String::new();
        for segment in segments {
            if let Some(piece) = segment.get(0).and_then(Value::as_str) {
                out.push_str(piece);
            }
        }

        if out.is_empty() {
            return Err(LanguageError::MalformedPayload);
        }
        Ok(out)
    }
}
