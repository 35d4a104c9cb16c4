use anyhow::Result;
use std::sync::Arc;
use tokio::sync::OnceCell;

use crate::config::AppConfig;
use crate::cons::provider_cons::LLMProvider;
use crate::llm::utils::network::build_http_client;

use super::claude::ClaudeClient;
use super::gemini::{GeminiClient, KeyCheck};
use super::ollama::OllamaClient;
use super::openai::OpenAiClient;
pub use super::provider_base::{ChatMessage, ProviderClient, ProviderConfig, Readiness, TokenLimits};

pub enum AnyProviderClient {
    OpenAI(OpenAiClient),
    Claude(ClaudeClient),
    Gemini(GeminiClient),
    Ollama(OllamaClient),
}

impl ProviderClient for AnyProviderClient {
    fn provider(&self) -> LLMProvider {
        match self {
            AnyProviderClient::OpenAI(c) => c.provider(),
            AnyProviderClient::Claude(c) => c.provider(),
            AnyProviderClient::Gemini(c) => c.provider(),
            AnyProviderClient::Ollama(c) => c.provider(),
        }
    }

    fn model(&self) -> &str {
        match self {
            AnyProviderClient::OpenAI(c) => c.model(),
            AnyProviderClient::Claude(c) => c.model(),
            AnyProviderClient::Gemini(c) => c.model(),
            AnyProviderClient::Ollama(c) => c.model(),
        }
    }

    fn readiness(&self) -> &Readiness {
        match self {
            AnyProviderClient::OpenAI(c) => c.readiness(),
            AnyProviderClient::Claude(c) => c.readiness(),
            AnyProviderClient::Gemini(c) => c.readiness(),
            AnyProviderClient::Ollama(c) => c.readiness(),
        }
    }

    fn limits(&self) -> TokenLimits {
        match self {
            AnyProviderClient::OpenAI(c) => c.limits(),
            AnyProviderClient::Claude(c) => c.limits(),
            AnyProviderClient::Gemini(c) => c.limits(),
            AnyProviderClient::Ollama(c) => c.limits(),
        }
    }

    async fn chat(&self, system: &str, messages: Vec<ChatMessage>, max_tokens: u32) -> Result<String> {
        match self {
            AnyProviderClient::OpenAI(c) => c.chat(system, messages, max_tokens).await,
            AnyProviderClient::Claude(c) => c.chat(system, messages, max_tokens).await,
            AnyProviderClient::Gemini(c) => c.chat(system, messages, max_tokens).await,
            AnyProviderClient::Ollama(c) => c.chat(system, messages, max_tokens).await,
        }
    }

    async fn get_config(&self) -> ProviderConfig {
        match self {
            AnyProviderClient::OpenAI(c) => c.get_config().await,
            AnyProviderClient::Claude(c) => c.get_config().await,
            AnyProviderClient::Gemini(c) => c.get_config().await,
            AnyProviderClient::Ollama(c) => c.get_config().await,
        }
    }
}

/// Seam between the fallback router and client construction.
#[allow(async_fn_in_trait)]
pub trait ProviderResolver: Send + Sync {
    type Client: ProviderClient;

    async fn client_for(&self, provider: LLMProvider) -> Self::Client;
}

/// Builds provider clients from the shared configuration. Clients are cheap
/// and built per request; the HTTP connection pool is shared, and the Gemini
/// key is checked at most once per factory.
#[derive(Clone)]
pub struct ProviderFactory {
    config: Arc<AppConfig>,
    http_client: reqwest::Client,
    gemini_key: Arc<OnceCell<KeyCheck>>,
}

impl ProviderFactory {
    pub fn new(config: Arc<AppConfig>) -> Result<Self> {
        let http_client = build_http_client(&config.http)?;
        Ok(Self::with_http_client(config, http_client))
    }

    pub fn with_http_client(config: Arc<AppConfig>, http_client: reqwest::Client) -> Self {
        Self {
            config,
            http_client,
            gemini_key: Arc::new(OnceCell::new()),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Total mapping from a wire identifier to a client; unknown names get OpenAI.
    pub async fn resolve(&self, provider_name: &str) -> AnyProviderClient {
        self.client_for(LLMProvider::resolve(provider_name)).await
    }

    /// Provider descriptions in listing order. Only the live listing touches
    /// the network (Ollama tags, the Gemini key check); OpenAI and Anthropic are
    /// always static.
    pub async fn catalog(&self, live: bool) -> Vec<ProviderConfig> {
        let mut out = Vec::with_capacity(LLMProvider::ALL.len());
        for provider in LLMProvider::ALL {
            let discovers = matches!(provider, LLMProvider::Gemini | LLMProvider::Ollama);
            let entry = if live && discovers {
                self.client_for(provider).await.get_config().await
            } else {
                ProviderConfig::catalog(provider, &self.config.endpoint(provider).model)
            };
            out.push(entry);
        }
        out
    }

    /// Runs the one-time Gemini key check up front so that no request pays for it.
    pub async fn warm_up(&self) {
        if let Readiness::Degraded(diagnostic) = self.gemini_client().await.readiness() {
            log::info!("Gemini unavailable: {}", diagnostic);
        }
    }

    async fn gemini_client(&self) -> GeminiClient {
        let client = GeminiClient::from_config(&self.config, self.http_client.clone());
        if client.readiness() != &Readiness::Ready {
            return client;
        }
        let timeout = self.config.http.discovery_timeout();
        let check = self
            .gemini_key
            .get_or_init(|| client.check_key(timeout))
            .await
            .clone();
        client.with_key_check(check)
    }
}

impl ProviderResolver for ProviderFactory {
    type Client = AnyProviderClient;

    async fn client_for(&self, provider: LLMProvider) -> AnyProviderClient {
        let http_client = self.http_client.clone();
        match provider {
            LLMProvider::OpenAI => {
                AnyProviderClient::OpenAI(OpenAiClient::from_config(&self.config, http_client))
            }
            LLMProvider::Anthropic => {
                AnyProviderClient::Claude(ClaudeClient::from_config(&self.config, http_client))
            }
            LLMProvider::Gemini => AnyProviderClient::Gemini(self.gemini_client().await),
            LLMProvider::Ollama => {
                AnyProviderClient::Ollama(OllamaClient::from_config(&self.config, http_client))
            }
        }
    }
}
