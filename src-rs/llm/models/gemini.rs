use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

use crate::config::AppConfig;
use crate::cons::provider_cons::LLMProvider;
use crate::llm::models::provider_base::{
    ChatMessage, ModelEntry, ProviderClient, ProviderConfig, Readiness, Role, TokenLimits,
};
use crate::llm::utils::network::error_from_response;

/// Substrings that mark a failed key check as a rejected key rather than a transport problem.
const REJECTED_KEY_MARKERS: &[&str] = &["401", "403", "API_KEY_INVALID", "API key not valid"];

const GENERATE_CONTENT: &str = "generateContent";

#[derive(Debug, Deserialize)]
struct ModelsResponse {
    #[serde(default)]
    models: Vec<ModelInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelInfo {
    name: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    supported_generation_methods: Vec<String>,
}

/// Result of validating a key once: the readiness to use from then on and the
/// `generateContent`-capable models the key can see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCheck {
    pub readiness: Readiness,
    pub models: Vec<ModelEntry>,
}

#[derive(Debug, Clone)]
pub struct GeminiClient {
    pub base_url: String,
    api_key: String,
    pub model_name: String,
    readiness: Readiness,
    discovered: Vec<ModelEntry>,
    limits: TokenLimits,
    http_client: reqwest::Client,
}

impl GeminiClient {
    /// Builds the client without contacting the API. A present key is assumed
    /// valid until [`check_key`](Self::check_key) says otherwise.
    pub fn new(
        base_url: String,
        api_key: Option<String>,
        model_name: String,
        http_client: reqwest::Client,
    ) -> Self {
        let readiness = match &api_key {
            Some(_) => Readiness::Ready,
            None => Readiness::missing_credential(LLMProvider::Gemini),
        };
        Self {
            base_url,
            api_key: api_key.unwrap_or_default(),
            model_name,
            readiness,
            discovered: Vec::new(),
            limits: TokenLimits::default(),
            http_client,
        }
    }

    pub fn from_config(config: &AppConfig, http_client: reqwest::Client) -> Self {
        let endpoint = config.endpoint(LLMProvider::Gemini);
        let mut client = Self::new(
            endpoint.base_url.clone(),
            config.credentials.get(LLMProvider::Gemini).map(str::to_string),
            endpoint.model.clone(),
            http_client,
        );
        client.limits = TokenLimits {
            generate: endpoint.max_tokens,
            fix: endpoint.fix_max_tokens,
        };
        client
    }

    /// Validates the key by listing models. Never fails: a failed listing
    /// becomes a degraded readiness.
    pub async fn check_key(&self, timeout: Duration) -> KeyCheck {
        if let Readiness::Degraded(_) = self.readiness {
            return KeyCheck {
                readiness: self.readiness.clone(),
                models: Vec::new(),
            };
        }
        match self.list_models(timeout).await {
            Ok(models) => KeyCheck {
                readiness: Readiness::Ready,
                models,
            },
            Err(e) => {
                let reason = format!("{:#}", e);
                log::warn!("Gemini readiness check failed: {}", reason);
                KeyCheck {
                    readiness: classify_key_check_failure(&reason),
                    models: Vec::new(),
                }
            }
        }
    }

    pub fn with_key_check(mut self, check: KeyCheck) -> Self {
        self.readiness = check.readiness;
        self.discovered = check.models;
        self
    }

    async fn list_models(&self, timeout: Duration) -> Result<Vec<ModelEntry>> {
        let url = format!("{}/models", self.base_url.trim_end_matches('/'));
        let response = self
            .http_client
            .get(&url)
            .query(&[("key", self.api_key.as_str())])
            .timeout(timeout)
            .send()
            .await
            .map_err(reqwest::Error::without_url)
            .context("Failed to reach Gemini API")?;

        if !response.status().is_success() {
            return Err(error_from_response("Gemini", response).await);
        }

        let body: ModelsResponse = response
            .json()
            .await
            .map_err(reqwest::Error::without_url)
            .context("Failed to parse Gemini model list")?;
        Ok(generate_content_models(body.models))
    }
}

fn generate_content_models(models: Vec<ModelInfo>) -> Vec<ModelEntry> {
    models
        .into_iter()
        .filter(|m| m.supported_generation_methods.iter().any(|g| g == GENERATE_CONTENT))
        .map(|m| {
            let id = m.name.strip_prefix("models/").unwrap_or(&m.name).to_string();
            let name = m.display_name.unwrap_or_else(|| id.clone());
            ModelEntry { id, name }
        })
        .collect()
}

pub(crate) fn classify_key_check_failure(reason: &str) -> Readiness {
    if REJECTED_KEY_MARKERS.iter().any(|m| reason.contains(m)) {
        Readiness::Degraded(
            "Google API key was rejected by the API. Please provide a valid API key in the settings."
                .to_string(),
        )
    } else {
        Readiness::Degraded(format!("Google API key could not be validated: {}", reason))
    }
}

/// Gemini calls assistant turns `model`; everything else is a user turn.
fn gemini_role(role: Role) -> &'static str {
    match role {
        Role::Assistant => "model",
        _ => "user",
    }
}

/// The persona rides in the first user turn; older models reject `systemInstruction`.
pub(crate) fn build_generate_content_body(
    system: &str,
    messages: &[ChatMessage],
    max_tokens: u32,
) -> Value {
    let turn = |msg: &ChatMessage| {
        json!({
            "role": gemini_role(msg.role),
            "parts": [{ "text": msg.content }]
        })
    };

    let mut contents: Vec<Value> = Vec::with_capacity(messages.len() + 1);
    match messages.split_first() {
        Some((first, rest)) if first.role != Role::Assistant => {
            contents.push(json!({
                "role": "user",
                "parts": [{ "text": system }, { "text": first.content }]
            }));
            contents.extend(rest.iter().map(turn));
        }
        _ => {
            contents.push(json!({ "role": "user", "parts": [{ "text": system }] }));
            contents.extend(messages.iter().map(turn));
        }
    }

    json!({
        "contents": contents,
        "generationConfig": { "maxOutputTokens": max_tokens }
    })
}

pub(crate) fn extract_candidate_text(json: &Value) -> Result<String> {
    let parts = json
        .pointer("/candidates/0/content/parts")
        .and_then(|p| p.as_array())
        .ok_or_else(|| {
            let reason = json
                .pointer("/promptFeedback/blockReason")
                .and_then(|r| r.as_str())
                .unwrap_or("no candidates");
            anyhow::anyhow!("Gemini returned no content ({})", reason)
        })?;

    Ok(parts
        .iter()
        .filter_map(|part| part.get("text").and_then(|t| t.as_str()))
        .collect())
}

impl ProviderClient for GeminiClient {
    fn provider(&self) -> LLMProvider {
        LLMProvider::Gemini
    }

    fn model(&self) -> &str {
        &self.model_name
    }

    fn readiness(&self) -> &Readiness {
        &self.readiness
    }

    fn limits(&self) -> TokenLimits {
        self.limits
    }

    /// Models seen by the key check, or the built-in list when none were discovered.
    async fn get_config(&self) -> ProviderConfig {
        if self.discovered.is_empty() {
            return ProviderConfig::catalog(LLMProvider::Gemini, &self.model_name);
        }
        ProviderConfig::new(LLMProvider::Gemini, &self.model_name, self.discovered.clone())
    }

    async fn chat(&self, system: &str, messages: Vec<ChatMessage>, max_tokens: u32) -> Result<String> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model_name
        );
        let request_body = build_generate_content_body(system, &messages, max_tokens);

        // the key travels in the query string; errors are stripped of the URL
        let response = self
            .http_client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .header("Content-Type", "application/json")
            .json(&request_body)
            .send()
            .await
            .map_err(reqwest::Error::without_url)
            .context("Failed to send request to Gemini API")?;

        if !response.status().is_success() {
            return Err(error_from_response("Gemini", response).await);
        }

        let json: Value = response
            .json()
            .await
            .map_err(reqwest::Error::without_url)
            .context("Failed to parse Gemini response JSON")?;
        extract_candidate_text(&json)
    }
}
