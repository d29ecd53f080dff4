use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const API_KEY_HEADER: &str = "x-goog-api-key";
const MAX_ERROR_BODY_CHARS: usize = 200;

/// Image bytes as sent to a remote model.
#[derive(Debug, Clone)]
pub struct ImagePayload {
    pub mime_type: &'static str,
    pub data: Vec<u8>,
}

impl ImagePayload {
    pub fn png(data: Vec<u8>) -> Self {
        Self {
            mime_type: "image/png",
            data,
        }
    }
}

/// A vision-capable text generation service. The response is free-form text.
#[async_trait]
pub trait VisionModel: Send + Sync {
    async fn analyze(&self, image: &ImagePayload, instruction: &str) -> Result<String>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionSettings {
    pub endpoint: String,
    pub model: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    pub timeout_secs: u64,
}

impl Default for VisionSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://generativelanguage.googleapis.com/v1beta".into(),
            model: "gemini-1.5-flash".into(),
            api_key_env: "GEMINI_API_KEY".into(),
            timeout_secs: 30,
        }
    }
}

impl VisionSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Client for a `generateContent`-style endpoint.
pub struct GeminiClient {
    http: reqwest::Client,
    url: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(settings: &VisionSettings, api_key: String) -> Result<Self> {
        if api_key.trim().is_empty() {
            bail!("vision API key is empty");
        }
        let http = reqwest::Client::builder()
            .timeout(settings.timeout())
            .build()
            .context("failed to build vision HTTP client")?;

        Ok(Self {
            http,
            url: format!(
                "{}/models/{}:generateContent",
                settings.endpoint.trim_end_matches('/'),
                settings.model
            ),
            api_key,
        })
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let key = HeaderValue::from_str(&self.api_key)
            .map_err(|e| anyhow!("invalid API key header: {e}"))?;
        headers.insert(API_KEY_HEADER, key);
        Ok(headers)
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text { text: &'a str },
    Inline { inline_data: InlineData<'a> },
}

#[derive(Serialize)]
struct InlineData<'a> {
    mime_type: &'a str,
    data: String,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

fn response_text(response: GenerateResponse) -> Option<String> {
    let texts: Vec<String> = response
        .candidates
        .into_iter()
        .filter_map(|candidate| candidate.content)
        .flat_map(|content| content.parts)
        .filter_map(|part| part.text)
        .filter(|text| !text.trim().is_empty())
        .collect();

    (!texts.is_empty()).then(|| texts.join("\n"))
}

#[async_trait]
impl VisionModel for GeminiClient {
    async fn analyze(&self, image: &ImagePayload, instruction: &str) -> Result<String> {
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![
                    Part::Text { text: instruction },
                    Part::Inline {
                        inline_data: InlineData {
                            mime_type: image.mime_type,
                            data: STANDARD.encode(&image.data),
                        },
                    },
                ],
            }],
        };

        let resp = self
            .http
            .post(&self.url)
            .headers(self.headers()?)
            .json(&body)
            .send()
            .await
            .context("vision request failed")?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            let snippet: String = text.chars().take(MAX_ERROR_BODY_CHARS).collect();
            bail!("vision service returned {status}: {snippet}");
        }

        let parsed: GenerateResponse = resp
            .json()
            .await
            .context("vision response was not valid JSON")?;
        response_text(parsed).ok_or_else(|| anyhow!("vision service returned no text"))
    }
}
