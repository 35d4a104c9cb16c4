use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::cons::provider_cons::LLMProvider;

/// HTTP listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// When set, the config endpoint asks each provider for its live model
    /// list (Ollama queries the local daemon). Otherwise the listing is static.
    #[serde(default)]
    pub live_config: bool,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

/// Fallback routing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterConfig {
    /// Provider tried when the requested one fails. Unrecognized values mean "openai".
    #[serde(default = "default_provider_id")]
    pub default_provider: String,
}

fn default_provider_id() -> String {
    "openai".to_string()
}

/// Outbound HTTP limits shared by every provider client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Upper bound for readiness checks and model discovery.
    #[serde(default = "default_discovery_timeout_secs")]
    pub discovery_timeout_secs: u64,
}

fn default_request_timeout_secs() -> u64 {
    120
}

fn default_connect_timeout_secs() -> u64 {
    30
}

fn default_discovery_timeout_secs() -> u64 {
    5
}

impl HttpConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn discovery_timeout(&self) -> Duration {
        Duration::from_secs(self.discovery_timeout_secs)
    }
}

/// Per-provider endpoint configuration from Config.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderEndpoint {
    /// Base URL for the vendor API
    pub base_url: String,

    /// Model used for every request to this provider
    pub model: String,

    /// Response ceiling for free-form generation
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Response ceiling for code fixes
    #[serde(default = "default_fix_max_tokens")]
    pub fix_max_tokens: u32,

    /// Per-request timeout overriding `http.request_timeout_secs`
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_fix_max_tokens() -> u32 {
    2000
}

impl ProviderEndpoint {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidersConfig {
    pub openai: ProviderEndpoint,
    pub anthropic: ProviderEndpoint,
    pub gemini: ProviderEndpoint,
    pub ollama: ProviderEndpoint,
}

impl ProvidersConfig {
    pub fn endpoint(&self, provider: LLMProvider) -> &ProviderEndpoint {
        match provider {
            LLMProvider::OpenAI => &self.openai,
            LLMProvider::Anthropic => &self.anthropic,
            LLMProvider::Gemini => &self.gemini,
            LLMProvider::Ollama => &self.ollama,
        }
    }

    pub fn endpoint_mut(&mut self, provider: LLMProvider) -> &mut ProviderEndpoint {
        match provider {
            LLMProvider::OpenAI => &mut self.openai,
            LLMProvider::Anthropic => &mut self.anthropic,
            LLMProvider::Gemini => &mut self.gemini,
            LLMProvider::Ollama => &mut self.ollama,
        }
    }
}

/// API keys read from the environment. Never serialized, redacted in Debug output.
#[derive(Clone, Default)]
pub struct Credentials {
    keys: HashMap<LLMProvider, String>,
}

impl Credentials {
    pub fn from_env<F>(env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut keys = HashMap::new();
        for provider in LLMProvider::ALL {
            let Some(var) = provider.api_key_env() else {
                continue;
            };
            if let Some(value) = env(var) {
                let value = value.trim().to_string();
                if !value.is_empty() {
                    keys.insert(provider, value);
                }
            }
        }
        Self { keys }
    }

    pub fn get(&self, provider: LLMProvider) -> Option<&str> {
        self.keys.get(&provider).map(|s| s.as_str())
    }

    pub fn set(&mut self, provider: LLMProvider, key: impl Into<String>) {
        self.keys.insert(provider, key.into());
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut present: Vec<&str> = self.keys.keys().map(|p| p.provider_name()).collect();
        present.sort_unstable();
        f.debug_struct("Credentials").field("present", &present).finish()
    }
}

/// User override configuration (restricted fields)
#[derive(Deserialize)]
pub struct UserOverrideConfig {
    pub server: Option<ServerPatch>,
    pub router: Option<RouterConfig>,
    pub providers: Option<HashMap<String, EndpointPatch>>,
}

#[derive(Deserialize)]
pub struct ServerPatch {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub live_config: Option<bool>,
}

#[derive(Deserialize)]
pub struct EndpointPatch {
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    pub fix_max_tokens: Option<u32>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub router: RouterConfig,
    pub http: HttpConfig,
    pub providers: ProvidersConfig,

    #[serde(skip)]
    pub credentials: Credentials,
}

impl AppConfig {
    /// Load configuration with layered strategy:
    /// 1. Defaults (Embedded Config.toml)
    /// 2. User Config (~/.nbassist/config.json)
    /// 3. Project Config (./.nbassist/config.json)
    /// 4. Environment (API keys, OLLAMA_HOST, NBASSIST_*)
    pub fn load() -> Result<Self> {
        let home = dirs::home_dir();
        Self::load_layered(home.as_deref(), Path::new("."), |key| std::env::var(key).ok())
    }

    /// Embedded defaults only, no credentials.
    pub fn embedded() -> Result<Self> {
        let default_str = include_str!("../Config.toml");
        toml::from_str(default_str).context("Failed to parse embedded Config.toml")
    }

    pub(crate) fn load_layered<F>(home: Option<&Path>, project_dir: &Path, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::embedded()?;

        if let Some(home) = home {
            Self::apply_patch(&mut config, home.join(".nbassist").join("config.json"));
        }
        Self::apply_patch(&mut config, project_dir.join(".nbassist").join("config.json"));

        config.apply_env(&env)?;
        config.validate()?;
        Ok(config)
    }

    pub(crate) fn apply_patch<P: AsRef<Path>>(config: &mut AppConfig, path: P) {
        let path = path.as_ref();
        if !path.exists() {
            return;
        }
        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                log::warn!("Failed to read config patch at {}: {}", path.display(), e);
                return;
            }
        };

        let patch = match serde_json::from_str::<UserOverrideConfig>(&content) {
            Ok(p) => p,
            Err(e) => {
                log::warn!("Failed to parse config patch at {}: {}", path.display(), e);
                return;
            }
        };

        if let Some(server) = patch.server {
            if let Some(host) = server.host {
                config.server.host = host;
            }
            if let Some(port) = server.port {
                config.server.port = port;
            }
            if let Some(live) = server.live_config {
                config.server.live_config = live;
            }
        }

        if let Some(router) = patch.router {
            config.router = router;
        }

        if let Some(providers) = patch.providers {
            for (name, p) in providers {
                let Some(provider) = LLMProvider::from_name(&name) else {
                    log::warn!("Ignoring unknown provider '{}' in {}", name, path.display());
                    continue;
                };
                let endpoint = config.providers.endpoint_mut(provider);
                if let Some(v) = p.base_url {
                    endpoint.base_url = v;
                }
                if let Some(v) = p.model {
                    endpoint.model = v;
                }
                if let Some(v) = p.max_tokens {
                    endpoint.max_tokens = v;
                }
                if let Some(v) = p.fix_max_tokens {
                    endpoint.fix_max_tokens = v;
                }
                if p.timeout_secs.is_some() {
                    endpoint.timeout_secs = p.timeout_secs;
                }
            }
        }
    }

    fn apply_env<F>(&mut self, env: &F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        self.credentials = Credentials::from_env(env);

        if let Some(host) = non_empty(env("OLLAMA_HOST")) {
            self.providers.ollama.base_url = normalize_ollama_host(&host);
        }
        if let Some(host) = non_empty(env("NBASSIST_HOST")) {
            self.server.host = host;
        }
        if let Some(port) = non_empty(env("NBASSIST_PORT")) {
            self.server.port = port
                .parse()
                .with_context(|| format!("NBASSIST_PORT is not a valid port: {}", port))?;
        }
        if let Some(provider) = non_empty(env("NBASSIST_DEFAULT_PROVIDER")) {
            self.router.default_provider = provider;
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        for provider in LLMProvider::ALL {
            let endpoint = self.providers.endpoint(provider);
            url::Url::parse(&endpoint.base_url).with_context(|| {
                format!("Invalid base_url for {}: {}", provider, endpoint.base_url)
            })?;
            if endpoint.model.trim().is_empty() {
                anyhow::bail!("Model for {} must not be empty", provider);
            }
        }
        if self.http.request_timeout_secs == 0 || self.http.discovery_timeout_secs == 0 {
            anyhow::bail!("HTTP timeouts must be greater than zero");
        }
        Ok(())
    }

    pub fn default_provider(&self) -> LLMProvider {
        let provider = LLMProvider::from_name(&self.router.default_provider);
        if provider.is_none() {
            log::warn!(
                "Unknown default provider '{}', using openai",
                self.router.default_provider
            );
        }
        provider.unwrap_or(LLMProvider::OpenAI)
    }

    pub fn endpoint(&self, provider: LLMProvider) -> &ProviderEndpoint {
        self.providers.endpoint(provider)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// `OLLAMA_HOST` is commonly set as `host:port` without a scheme.
pub(crate) fn normalize_ollama_host(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.contains("://") {
        host.to_string()
    } else {
        format!("http://{}", host)
    }
}
