use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

use crate::config::AppConfig;
use crate::cons::provider_cons::LLMProvider;
use crate::llm::models::provider_base::{
    ChatMessage, ModelEntry, ProviderClient, ProviderConfig, Readiness, TokenLimits,
};
use crate::llm::utils::network::error_from_response;

#[derive(Debug, Deserialize)]
struct TagsResponse {
    models: Option<Vec<TagModel>>,
}

#[derive(Debug, Deserialize)]
struct TagModel {
    name: String,
}

/// Client for a local Ollama daemon. There is no credential, so it is always ready;
/// an unreachable daemon surfaces as a per-request error.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    pub base_url: String,
    pub model: String,
    readiness: Readiness,
    limits: TokenLimits,
    request_timeout: Option<Duration>,
    discovery_timeout: Duration,
    http_client: reqwest::Client,
}

impl OllamaClient {
    pub fn new(base_url: String, model: String, http_client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            readiness: Readiness::Ready,
            limits: TokenLimits::default(),
            request_timeout: Some(Duration::from_secs(60)),
            discovery_timeout: Duration::from_secs(5),
            http_client,
        }
    }

    pub fn from_config(config: &AppConfig, http_client: reqwest::Client) -> Self {
        let endpoint = config.endpoint(LLMProvider::Ollama);
        let mut client = Self::new(endpoint.base_url.clone(), endpoint.model.clone(), http_client);
        client.limits = TokenLimits {
            generate: endpoint.max_tokens,
            fix: endpoint.fix_max_tokens,
        };
        client.request_timeout = endpoint.timeout();
        client.discovery_timeout = config.http.discovery_timeout();
        client
    }

    /// Names of the models installed in the local daemon.
    pub async fn list_models(&self) -> Result<Vec<String>> {
        let url = format!("{}/api/tags", self.base_url);
        let res = self
            .http_client
            .get(&url)
            .timeout(self.discovery_timeout)
            .send()
            .await
            .context("Failed to reach Ollama")?;
        if !res.status().is_success() {
            return Err(error_from_response("Ollama", res).await);
        }
        let body: TagsResponse = res.json().await.context("Failed to parse Ollama model list")?;
        Ok(body
            .models
            .unwrap_or_default()
            .into_iter()
            .map(|m| m.name)
            .collect())
    }
}

pub(crate) fn build_chat_request_body(
    model: &str,
    system: &str,
    messages: &[ChatMessage],
    max_tokens: u32,
) -> Value {
    let mut ollama_messages = Vec::with_capacity(messages.len() + 1);
    ollama_messages.push(json!({ "role": "system", "content": system }));
    ollama_messages.extend(messages.iter().map(|msg| {
        json!({
            "role": msg.role.as_str(),
            "content": msg.content
        })
    }));

    json!({
        "model": model,
        "messages": ollama_messages,
        "stream": false,
        "options": { "num_predict": max_tokens }
    })
}

impl ProviderClient for OllamaClient {
    fn provider(&self) -> LLMProvider {
        LLMProvider::Ollama
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn readiness(&self) -> &Readiness {
        &self.readiness
    }

    fn limits(&self) -> TokenLimits {
        self.limits
    }

    async fn chat(&self, system: &str, messages: Vec<ChatMessage>, max_tokens: u32) -> Result<String> {
        let url = format!("{}/api/chat", self.base_url);
        let body = build_chat_request_body(&self.model, system, &messages, max_tokens);

        let mut request = self.http_client.post(&url).json(&body);
        if let Some(timeout) = self.request_timeout {
            request = request.timeout(timeout);
        }
        let res = request.send().await.context("Failed to send request to Ollama")?;
        if !res.status().is_success() {
            return Err(error_from_response("Ollama", res).await);
        }

        let json: Value = res.json().await.context("Failed to parse Ollama response JSON")?;
        Ok(json
            .pointer("/message/content")
            .and_then(|c| c.as_str())
            .unwrap_or_default()
            .to_string())
    }

    /// Reports the installed models, or the built-in list when the daemon
    /// does not answer within the discovery timeout.
    async fn get_config(&self) -> ProviderConfig {
        match self.list_models().await {
            Ok(names) => {
                let models = names
                    .into_iter()
                    .map(|name| ModelEntry {
                        id: name.clone(),
                        name,
                    })
                    .collect();
                ProviderConfig::new(LLMProvider::Ollama, &self.model, models)
            }
            Err(e) => {
                log::debug!("Ollama model discovery failed, using defaults: {:#}", e);
                ProviderConfig::catalog(LLMProvider::Ollama, &self.model)
            }
        }
    }
}
