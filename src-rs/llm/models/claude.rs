use anyhow::{Context, Result};
use serde_json::{json, Value};

use crate::config::AppConfig;
use crate::cons::provider_cons::LLMProvider;
use crate::llm::models::provider_base::{
    ChatMessage, ProviderClient, Readiness, Role, TokenLimits,
};
use crate::llm::utils::network::error_from_response;

const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Clone)]
pub struct ClaudeClient {
    pub base_url: String,
    api_key: String,
    pub model_name: String,
    readiness: Readiness,
    limits: TokenLimits,
    http_client: reqwest::Client,
}

impl ClaudeClient {
    pub fn new(
        base_url: String,
        api_key: Option<String>,
        model_name: String,
        http_client: reqwest::Client,
    ) -> Self {
        let readiness = match &api_key {
            Some(_) => Readiness::Ready,
            None => Readiness::missing_credential(LLMProvider::Anthropic),
        };
        Self {
            base_url,
            api_key: api_key.unwrap_or_default(),
            model_name,
            readiness,
            limits: TokenLimits {
                generate: 4000,
                fix: 2000,
            },
            http_client,
        }
    }

    pub fn from_config(config: &AppConfig, http_client: reqwest::Client) -> Self {
        let endpoint = config.endpoint(LLMProvider::Anthropic);
        let mut client = Self::new(
            endpoint.base_url.clone(),
            config.credentials.get(LLMProvider::Anthropic).map(str::to_string),
            endpoint.model.clone(),
            http_client,
        );
        client.limits = TokenLimits {
            generate: endpoint.max_tokens,
            fix: endpoint.fix_max_tokens,
        };
        client
    }
}

/// Anthropic only knows `user` and `assistant`; system turns from history are sent as user turns.
fn anthropic_role(role: Role) -> &'static str {
    match role {
        Role::Assistant => "assistant",
        _ => "user",
    }
}

pub(crate) fn build_messages_request_body(
    model: &str,
    system: &str,
    messages: &[ChatMessage],
    max_tokens: u32,
) -> Value {
    let anthropic_messages: Vec<Value> = messages
        .iter()
        .map(|msg| {
            json!({
                "role": anthropic_role(msg.role),
                "content": msg.content
            })
        })
        .collect();

    json!({
        "model": model,
        "system": system,
        "messages": anthropic_messages,
        "max_tokens": max_tokens
    })
}

/// Concatenates the text blocks of a Messages API response.
pub(crate) fn extract_text_content(json: &Value) -> Result<String> {
    let blocks = json
        .get("content")
        .and_then(|c| c.as_array())
        .ok_or_else(|| anyhow::anyhow!("Claude response has no content blocks"))?;

    let text: String = blocks
        .iter()
        .filter(|block| block.get("type").and_then(|t| t.as_str()).unwrap_or("text") == "text")
        .filter_map(|block| block.get("text").and_then(|t| t.as_str()))
        .collect();

    if text.is_empty() && !blocks.is_empty() {
        anyhow::bail!("Claude response contained no text blocks");
    }
    Ok(text)
}

impl ProviderClient for ClaudeClient {
    fn provider(&self) -> LLMProvider {
        LLMProvider::Anthropic
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

    async fn chat(&self, system: &str, messages: Vec<ChatMessage>, max_tokens: u32) -> Result<String> {
        let url = format!("{}/messages", self.base_url.trim_end_matches('/'));
        let request_body = build_messages_request_body(&self.model_name, system, &messages, max_tokens);

        let response = self
            .http_client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await
            .context("Failed to send request to Anthropic API (possible timeout or network error)")?;

        if !response.status().is_success() {
            return Err(error_from_response("Claude", response).await);
        }

        let json: Value = response.json().await.context("Failed to parse Claude response JSON")?;
        extract_text_content(&json)
    }
}
