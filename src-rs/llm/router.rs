use crate::cons::provider_cons::LLMProvider;
use crate::llm::models::provider_base::{ChatMessage, CodeError, FixOutcome, LlmResult, ProviderClient};
use crate::llm::models::provider_handle::ProviderResolver;
use crate::llm::notebook::NotebookSnapshot;

/// Sends a request to the requested provider and, when that fails, retries it
/// once against the default provider.
///
/// * The fallback runs only if the requested provider is not the default.
/// * A successful fallback replaces the original result and carries a note
///   naming the provider that failed.
/// * If the fallback also fails, the original failure is returned unchanged.
pub struct FallbackRouter<R> {
    resolver: R,
    default_provider: LLMProvider,
}

impl<R: ProviderResolver> FallbackRouter<R> {
    pub fn new(resolver: R, default_provider: LLMProvider) -> Self {
        Self {
            resolver,
            default_provider,
        }
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    pub fn default_provider(&self) -> LLMProvider {
        self.default_provider
    }

    pub async fn generate(
        &self,
        llm_type: &str,
        prompt: &str,
        history: &[ChatMessage],
        snapshot: &NotebookSnapshot,
    ) -> LlmResult {
        let requested = LLMProvider::resolve(llm_type);
        let primary = self.resolver.client_for(requested).await;
        let result = primary.generate_response(prompt, history, snapshot).await;

        if !result.error || requested == self.default_provider {
            return result;
        }

        log::info!(
            "Primary LLM {} failed, falling back to {}",
            requested,
            self.default_provider
        );
        let fallback = self.resolver.client_for(self.default_provider).await;
        let mut fallback_result = fallback.generate_response(prompt, history, snapshot).await;
        if fallback_result.error {
            log::warn!("Fallback to {} failed as well", self.default_provider);
            return result;
        }

        fallback_result.content = format!(
            "[Note: Using {} as fallback due to issues with {}]\n\n{}",
            self.default_provider.display_name(),
            requested,
            fallback_result.content
        );
        fallback_result
    }

    pub async fn fix(&self, llm_type: &str, code: &str, errors: &[CodeError]) -> FixOutcome {
        let requested = LLMProvider::resolve(llm_type);
        let primary = self.resolver.client_for(requested).await;
        let outcome = primary.fix_errors(code, errors).await;

        if !outcome.is_failure() || requested == self.default_provider {
            return outcome;
        }

        log::info!(
            "Primary LLM {} error fixing failed, falling back to {}",
            requested,
            self.default_provider
        );
        let fallback = self.resolver.client_for(self.default_provider).await;
        match fallback.fix_errors(code, errors).await {
            FixOutcome::Fixed(fixed) => FixOutcome::Fixed(format!(
                "# Note: Using {} as fallback due to issues with {}\n{}",
                self.default_provider.display_name(),
                requested,
                fixed
            )),
            FixOutcome::Failed { .. } => {
                log::warn!("Fallback to {} failed as well", self.default_provider);
                outcome
            }
        }
    }
}
