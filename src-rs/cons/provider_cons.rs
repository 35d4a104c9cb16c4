use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LLMProvider {
    OpenAI,
    Anthropic,
    Gemini,
    Ollama,
}

impl LLMProvider {
    /// Listing order used by the config endpoint.
    pub const ALL: [LLMProvider; 4] = [
        LLMProvider::OpenAI,
        LLMProvider::Anthropic,
        LLMProvider::Gemini,
        LLMProvider::Ollama,
    ];

    /// Returns the identifier used on the wire and in configuration (e.g., "openai", "anthropic")
    pub fn provider_name(&self) -> &'static str {
        match self {
            LLMProvider::OpenAI => "openai",
            LLMProvider::Anthropic => "anthropic",
            LLMProvider::Gemini => "gemini",
            LLMProvider::Ollama => "ollama",
        }
    }

    /// Exact wire identifier. Request payloads are matched with this only.
    pub fn from_id(s: &str) -> Option<Self> {
        match s {
            "openai" => Some(LLMProvider::OpenAI),
            "anthropic" => Some(LLMProvider::Anthropic),
            "gemini" => Some(LLMProvider::Gemini),
            "ollama" => Some(LLMProvider::Ollama),
            _ => None,
        }
    }

    /// Lenient lookup for configuration files and env (case-insensitive, handles aliases)
    pub fn from_name(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Some(LLMProvider::OpenAI),
            "anthropic" | "claude" => Some(LLMProvider::Anthropic),
            "gemini" | "google" => Some(LLMProvider::Gemini),
            "ollama" => Some(LLMProvider::Ollama),
            _ => None,
        }
    }

    /// Total variant of [`from_id`](Self::from_id): anything else, including
    /// aliases, other casing and surrounding whitespace, is OpenAI.
    pub fn resolve(s: &str) -> Self {
        Self::from_id(s).unwrap_or(LLMProvider::OpenAI)
    }

    /// Name reported in `LlmResult::provider` and in fallback notes.
    pub fn display_name(&self) -> &'static str {
        match self {
            LLMProvider::OpenAI => "OpenAI",
            LLMProvider::Anthropic => "Anthropic",
            LLMProvider::Gemini => "Google Gemini",
            LLMProvider::Ollama => "Ollama",
        }
    }

    /// Name shown in the provider picker.
    pub fn catalog_name(&self) -> &'static str {
        match self {
            LLMProvider::OpenAI => "OpenAI ChatGPT",
            LLMProvider::Anthropic => "Anthropic Claude",
            LLMProvider::Gemini => "Google Gemini",
            LLMProvider::Ollama => "Ollama",
        }
    }

    /// Environment variable holding the API key. Ollama runs locally and has none.
    pub fn api_key_env(&self) -> Option<&'static str> {
        match self {
            LLMProvider::OpenAI => Some("OPENAI_API_KEY"),
            LLMProvider::Anthropic => Some("ANTHROPIC_API_KEY"),
            LLMProvider::Gemini => Some("GOOGLE_API_KEY"),
            LLMProvider::Ollama => None,
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self, LLMProvider::Ollama)
    }
}

// Ensure Display trait matches provider_name for convenience
impl std::fmt::Display for LLMProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.provider_name())
    }
}
