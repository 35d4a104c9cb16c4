use crate::cons::provider_cons::LLMProvider;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_accepts_exact_ids() {
        for provider in LLMProvider::ALL {
            assert_eq!(LLMProvider::resolve(provider.provider_name()), provider);
        }
    }

    #[test]
    fn resolve_sends_everything_else_to_openai() {
        for raw in ["claude", "google", "Anthropic", " gemini ", "OLLAMA", "", "bogus"] {
            assert_eq!(LLMProvider::resolve(raw), LLMProvider::OpenAI, "input {:?}", raw);
        }
    }

    #[test]
    fn config_lookup_keeps_aliases() {
        assert_eq!(LLMProvider::from_name("claude"), Some(LLMProvider::Anthropic));
        assert_eq!(LLMProvider::from_name(" Google "), Some(LLMProvider::Gemini));
        assert_eq!(LLMProvider::from_name("mistral"), None);
        assert_eq!(LLMProvider::from_id("claude"), None);
    }
}
