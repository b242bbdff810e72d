// src/insight/gemini.rs
//! Google Gemini `generateContent` provider.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{prompt_digest, InsightError, InsightProvider, InsightRequest};
use crate::config::insight::{InsightConfig, DEFAULT_BASE_URL, DEFAULT_MODEL};

pub struct GeminiProvider {
    http: Client,
    api_key: String,
    model: String,
    base_url: String,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateResponse {
    /// Concatenated text parts of the first candidate.
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| {
                c.parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default()
    }
}

impl GeminiProvider {
    pub fn new(
        api_key: impl Into<String>,
        model: Option<&str>,
        base_url: Option<&str>,
    ) -> Result<Self, InsightError> {
        let http = Client::builder()
            .user_agent("kormo-stream/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(15))
            .build()?;
        Ok(Self {
            http,
            api_key: api_key.into(),
            model: model.unwrap_or(DEFAULT_MODEL).to_string(),
            base_url: base_url
                .unwrap_or(DEFAULT_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
        })
    }

    pub fn from_config(cfg: &InsightConfig) -> Result<Self, InsightError> {
        Self::new(
            cfg.api_key.clone(),
            Some(cfg.model.as_str()),
            Some(cfg.base_url.as_str()),
        )
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

#[async_trait]
impl InsightProvider for GeminiProvider {
    async fn generate(&self, req: &InsightRequest) -> Result<String, InsightError> {
        if self.api_key.trim().is_empty() {
            return Err(InsightError::MissingKey);
        }

        let prompt = req.prompt();
        debug!(
            target: "insight",
            model = %self.model,
            prompt = %prompt_digest(&prompt),
            "gemini request"
        );

        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: &prompt }],
            }],
        };

        let resp = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(InsightError::Status {
                status: status.as_u16(),
                message: message.chars().take(200).collect(),
            });
        }

        let parsed: GenerateResponse = resp.json().await?;
        let text = parsed.text();
        if text.trim().is_empty() {
            return Err(InsightError::Empty);
        }
        Ok(text.trim().to_string())
    }

    fn name(&self) -> &'static str {
        "gemini"
    }

    fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}
