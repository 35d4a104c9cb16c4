use anyhow::{Context, Result};
use serde_json::{json, Value};

use crate::config::AppConfig;
use crate::cons::provider_cons::LLMProvider;
use crate::llm::models::provider_base::{
    ChatMessage, ProviderClient, Readiness, TokenLimits,
};
use crate::llm::utils::network::error_from_response;

#[derive(Debug, Clone)]
pub struct OpenAiClient {
    pub api_base: String,
    api_key: String,
    pub model: String,
    readiness: Readiness,
    limits: TokenLimits,
    http_client: reqwest::Client,
}

impl OpenAiClient {
    pub fn new(
        api_base: String,
        api_key: Option<String>,
        model: String,
        http_client: reqwest::Client,
    ) -> Self {
        let readiness = match &api_key {
            Some(_) => Readiness::Ready,
            None => Readiness::missing_credential(LLMProvider::OpenAI),
        };
        Self {
            api_base,
            api_key: api_key.unwrap_or_default(),
            model,
            readiness,
            limits: TokenLimits::default(),
            http_client,
        }
    }

    pub fn from_config(config: &AppConfig, http_client: reqwest::Client) -> Self {
        let endpoint = config.endpoint(LLMProvider::OpenAI);
        Self::new(
            endpoint.base_url.clone(),
            config.credentials.get(LLMProvider::OpenAI).map(str::to_string),
            endpoint.model.clone(),
            http_client,
        )
        .with_limits(TokenLimits {
            generate: endpoint.max_tokens,
            fix: endpoint.fix_max_tokens,
        })
    }

    pub fn with_limits(mut self, limits: TokenLimits) -> Self {
        self.limits = limits;
        self
    }
}

impl ProviderClient for OpenAiClient {
    fn provider(&self) -> LLMProvider {
        LLMProvider::OpenAI
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
        let request_body = build_chat_completions_request_body(&self.model, system, &messages, max_tokens);
        let url = format!("{}/chat/completions", self.api_base.trim_end_matches('/'));

        let response = self
            .http_client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request_body)
            .send()
            .await
            .context("Failed to send request to OpenAI API (possible timeout or network error)")?;

        if !response.status().is_success() {
            return Err(error_from_response("OpenAI", response).await);
        }

        let json: Value = response
            .json()
            .await
            .context("Failed to parse response JSON")?;

        extract_message_content(&json)
    }
}

pub(crate) fn build_chat_completions_request_body(
    model: &str,
    system: &str,
    messages: &[ChatMessage],
    max_tokens: u32,
) -> Value {
    let mut converted_messages = Vec::with_capacity(messages.len() + 1);
    converted_messages.push(json!({ "role": "system", "content": system }));
    converted_messages.extend(messages.iter().map(|msg| {
        json!({
            "role": msg.role.as_str(),
            "content": msg.content,
        })
    }));

    json!({
        "model": model,
        "messages": converted_messages,
        "max_tokens": max_tokens,
        "stream": false,
    })
}

pub(crate) fn extract_message_content(json: &Value) -> Result<String> {
    json.pointer("/choices/0/message/content")
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .ok_or_else(|| anyhow::anyhow!("OpenAI response contained no message content"))
}
