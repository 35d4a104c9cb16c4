use crate::cons::provider_cons::LLMProvider;

/// Built-in model list per provider as `(id, name)` pairs.
///
/// Hosted providers always report this list. Ollama reports it only when the
/// local daemon cannot be asked for its installed models.
pub fn default_models(provider: LLMProvider) -> &'static [(&'static str, &'static str)] {
    match provider {
        LLMProvider::OpenAI => &[
            ("gpt-4o", "GPT-4o"),
            ("gpt-4-turbo", "GPT-4 Turbo"),
            ("gpt-3.5-turbo", "GPT-3.5 Turbo"),
        ],
        LLMProvider::Anthropic => &[
            ("claude-3-5-sonnet-20241022", "Claude 3.5 Sonnet"),
            ("claude-3-opus-20240229", "Claude 3 Opus"),
            ("claude-3-sonnet-20240229", "Claude 3 Sonnet"),
            ("claude-3-haiku-20240307", "Claude 3 Haiku"),
        ],
        LLMProvider::Gemini => &[
            ("gemini-pro", "Gemini Pro"),
            ("gemini-1.5-pro", "Gemini 1.5 Pro"),
            ("gemini-1.0-pro", "Gemini 1.0 Pro"),
        ],
        LLMProvider::Ollama => &[
            ("llama3", "Llama 3"),
            ("mistral", "Mistral"),
            ("codellama", "Code Llama"),
            ("llama2", "Llama 2"),
        ],
    }
}
