use anyhow::Result;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::cons::model_cons::default_models;
use crate::cons::provider_cons::LLMProvider;
use crate::llm::notebook::{format_notebook, NotebookSnapshot};
use crate::llm::prompts;
use crate::llm::utils::string_util::{has_code_fence, strip_code_fence};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "Option<Value>")]
pub enum Role {
    #[default]
    User,
    Assistant,
    System,
}

/// Anything other than `"assistant"` or `"system"` (null, numbers, unknown names) is a user turn.
impl From<Option<Value>> for Role {
    fn from(raw: Option<Value>) -> Self {
        match raw.as_ref().and_then(Value::as_str) {
            Some("assistant") => Role::Assistant,
            Some("system") => Role::System,
            _ => Role::User,
        }
    }
}

/// Text field that never fails: null becomes empty, non-strings keep their JSON text.
pub(crate) fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s,
        Some(other) => other.to_string(),
    })
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(default)]
    pub role: Role,
    #[serde(default, deserialize_with = "lenient_text")]
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }
}

/// An error reported against a piece of code. Only `message` reaches the prompt.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CodeError {
    #[serde(default, deserialize_with = "lenient_text")]
    pub message: String,
}

fn is_false(v: &bool) -> bool {
    !*v
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LlmResult {
    pub content: String,
    pub has_code: bool,
    pub model: String,
    pub provider: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub error: bool,
}

impl LlmResult {
    pub fn success(content: String, model: &str, provider: LLMProvider) -> Self {
        Self {
            has_code: has_code_fence(&content),
            content,
            model: model.to_string(),
            provider: provider.display_name().to_string(),
            error: false,
        }
    }

    pub fn failure(content: String, model: &str, provider: LLMProvider) -> Self {
        Self {
            content,
            has_code: false,
            model: model.to_string(),
            provider: provider.display_name().to_string(),
            error: true,
        }
    }
}

/// Result of a code-fix request. On the wire a failure is the original code
/// preceded by a single `# Error: ...` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FixOutcome {
    Fixed(String),
    Failed { reason: String, original: String },
}

impl FixOutcome {
    pub const SENTINEL: &'static str = "# Error:";

    pub fn failed(reason: impl Into<String>, original: &str) -> Self {
        FixOutcome::Failed {
            reason: reason.into(),
            original: original.to_string(),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, FixOutcome::Failed { .. })
    }

    pub fn into_wire(self) -> String {
        match self {
            FixOutcome::Fixed(code) => code,
            FixOutcome::Failed { reason, original } => {
                // the sentinel must stay a single line
                let reason = reason.replace(['\r', '\n'], " ");
                format!("{} {}\n{}", Self::SENTINEL, reason, original)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelEntry {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub name: String,
    pub id: String,
    #[serde(rename = "defaultModel")]
    pub default_model: String,
    pub models: Vec<ModelEntry>,
    pub local: bool,
}

impl ProviderConfig {
    pub fn new(provider: LLMProvider, default_model: &str, models: Vec<ModelEntry>) -> Self {
        Self {
            name: provider.catalog_name().to_string(),
            id: provider.provider_name().to_string(),
            default_model: default_model.to_string(),
            models,
            local: provider.is_local(),
        }
    }

    /// Static description built from the built-in model list.
    pub fn catalog(provider: LLMProvider, default_model: &str) -> Self {
        let models = default_models(provider)
            .iter()
            .map(|(id, name)| ModelEntry {
                id: id.to_string(),
                name: name.to_string(),
            })
            .collect();
        Self::new(provider, default_model, models)
    }
}

/// Credential state captured once at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Readiness {
    Ready,
    /// Every call short-circuits with this diagnostic, no network.
    Degraded(String),
}

impl Readiness {
    pub fn missing_credential(provider: LLMProvider) -> Self {
        Readiness::Degraded(format!(
            "{} API key is not set or is invalid. Please provide a valid API key in the settings.",
            vendor_label(provider)
        ))
    }
}

/// Vendor name used in credential diagnostics.
pub(crate) fn vendor_label(provider: LLMProvider) -> &'static str {
    match provider {
        LLMProvider::OpenAI => "OpenAI",
        LLMProvider::Anthropic => "Anthropic",
        LLMProvider::Gemini => "Google",
        LLMProvider::Ollama => "Ollama",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenLimits {
    pub generate: u32,
    pub fix: u32,
}

impl Default for TokenLimits {
    fn default() -> Self {
        Self {
            generate: 4096,
            fix: 2000,
        }
    }
}

/// Uniform contract over one vendor protocol.
///
/// Implementors supply the vendor call (`chat`) and their construction-time
/// state; `generate_response` and `fix_errors` are shared and never fail:
/// errors come back inside the returned value.
#[allow(async_fn_in_trait)]
pub trait ProviderClient: Send + Sync {
    fn provider(&self) -> LLMProvider;

    fn model(&self) -> &str;

    fn readiness(&self) -> &Readiness;

    fn limits(&self) -> TokenLimits;

    /// One non-streaming completion. `messages` holds the replayed history with
    /// the current turn last; the system prompt goes in the vendor's system slot.
    async fn chat(&self, system: &str, messages: Vec<ChatMessage>, max_tokens: u32) -> Result<String>;

    async fn get_config(&self) -> ProviderConfig {
        ProviderConfig::catalog(self.provider(), self.model())
    }

    async fn generate_response(
        &self,
        prompt: &str,
        history: &[ChatMessage],
        snapshot: &NotebookSnapshot,
    ) -> LlmResult {
        let provider = self.provider();
        if let Readiness::Degraded(diagnostic) = self.readiness() {
            return LlmResult::failure(format!("Error: {}", diagnostic), self.model(), provider);
        }

        let notebook_context = format_notebook(snapshot);
        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.extend_from_slice(history);
        messages.push(ChatMessage::user(prompts::notebook_turn(&notebook_context, prompt)));

        match self
            .chat(prompts::ASSISTANT_SYSTEM_PROMPT, messages, self.limits().generate)
            .await
        {
            Ok(content) => LlmResult::success(content, self.model(), provider),
            Err(e) => {
                log::warn!("{} generate_response failed: {:#}", provider, e);
                LlmResult::failure(
                    format!("Error generating response: {:#}", e),
                    self.model(),
                    provider,
                )
            }
        }
    }

    async fn fix_errors(&self, code: &str, errors: &[CodeError]) -> FixOutcome {
        if let Readiness::Degraded(diagnostic) = self.readiness() {
            return FixOutcome::failed(diagnostic.clone(), code);
        }

        let request = prompts::fix_request(code, errors);
        match self
            .chat(
                prompts::DEBUGGER_SYSTEM_PROMPT,
                vec![ChatMessage::user(request)],
                self.limits().fix,
            )
            .await
        {
            Ok(reply) => FixOutcome::Fixed(strip_code_fence(&reply)),
            Err(e) => {
                log::warn!("{} fix_errors failed: {:#}", self.provider(), e);
                FixOutcome::failed(format!("Could not fix code: {:#}", e), code)
            }
        }
    }
}
