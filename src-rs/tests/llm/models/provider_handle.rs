use crate::config::AppConfig;
use crate::cons::provider_cons::LLMProvider;
use crate::llm::models::provider_handle::{
    AnyProviderClient, ProviderClient, ProviderFactory, ProviderResolver, Readiness,
};
use crate::tests::support::{direct_client, route, StubServer};
use std::sync::Arc;

#[cfg(test)]
mod tests {
    use super::*;

    fn factory() -> ProviderFactory {
        ProviderFactory::new(Arc::new(AppConfig::embedded().unwrap())).unwrap()
    }

    #[tokio::test]
    async fn resolve_maps_exact_ids() {
        let f = factory();
        assert_eq!(f.resolve("openai").await.provider(), LLMProvider::OpenAI);
        assert_eq!(f.resolve("anthropic").await.provider(), LLMProvider::Anthropic);
        assert_eq!(f.resolve("gemini").await.provider(), LLMProvider::Gemini);
        assert!(matches!(f.resolve("ollama").await, AnyProviderClient::Ollama(_)));
    }

    #[tokio::test]
    async fn aliases_and_other_casing_resolve_to_openai() {
        let f = factory();
        for raw in ["claude", "Anthropic", " gemini ", "google"] {
            assert_eq!(f.resolve(raw).await.provider(), LLMProvider::OpenAI, "input {:?}", raw);
        }
    }

    #[tokio::test]
    async fn unknown_name_behaves_like_openai() {
        let f = factory();
        let bogus = f.resolve("bogus").await;
        let openai = f.resolve("openai").await;
        assert_eq!(bogus.provider(), openai.provider());
        assert_eq!(bogus.model(), openai.model());
        assert_eq!(bogus.readiness(), openai.readiness());
    }

    #[tokio::test]
    async fn hosted_providers_without_keys_are_degraded() {
        let f = factory();
        for provider in [LLMProvider::OpenAI, LLMProvider::Anthropic, LLMProvider::Gemini] {
            let client = f.client_for(provider).await;
            assert_eq!(client.readiness(), &Readiness::missing_credential(provider));
        }
        assert_eq!(f.client_for(LLMProvider::Ollama).await.readiness(), &Readiness::Ready);
    }

    #[tokio::test]
    async fn limits_follow_config() {
        let mut config = AppConfig::embedded().unwrap();
        config.providers.anthropic.max_tokens = 1234;
        let f = ProviderFactory::new(Arc::new(config)).unwrap();
        assert_eq!(f.client_for(LLMProvider::Anthropic).await.limits().generate, 1234);
    }

    #[tokio::test]
    async fn static_catalog_is_ordered_and_stable() {
        let f = factory();
        let first = f.catalog(false).await;
        let second = f.catalog(false).await;
        assert_eq!(first, second);

        let ids: Vec<&str> = first.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["openai", "anthropic", "gemini", "ollama"]);
        assert_eq!(first[0].default_model, "gpt-4o");
        assert!(first[3].local);
        assert!(first.iter().take(3).all(|c| !c.local));
    }

    const GEMINI_MODELS: &str = r#"{"models":[
        {"name":"models/gemini-1.5-pro","displayName":"Gemini 1.5 Pro","supportedGenerationMethods":["generateContent","countTokens"]},
        {"name":"models/embedding-001","displayName":"Embedding 001","supportedGenerationMethods":["embedContent"]}
    ]}"#;

    fn gemini_factory(base_url: &str) -> ProviderFactory {
        let mut config = AppConfig::embedded().unwrap();
        config.providers.gemini.base_url = base_url.to_string();
        config.credentials.set(LLMProvider::Gemini, "test-key");
        ProviderFactory::with_http_client(Arc::new(config), direct_client())
    }

    #[tokio::test]
    async fn gemini_key_is_checked_once_per_factory() {
        let server = StubServer::start(vec![route("/models", 200, GEMINI_MODELS)]).await;
        let f = gemini_factory(&server.base_url);

        let first = f.client_for(LLMProvider::Gemini).await;
        let second = f.client_for(LLMProvider::Gemini).await;
        let cloned = f.clone().client_for(LLMProvider::Gemini).await;

        assert_eq!(first.readiness(), &Readiness::Ready);
        assert_eq!(second.readiness(), &Readiness::Ready);
        assert_eq!(cloned.readiness(), &Readiness::Ready);
        assert_eq!(server.count("GET /models"), 1);
    }

    #[tokio::test]
    async fn rejected_gemini_key_stays_degraded_without_rechecking() {
        let server = StubServer::start(vec![route(
            "/models",
            400,
            r#"{"error":{"status":"INVALID_ARGUMENT","details":[{"reason":"API_KEY_INVALID"}]}}"#,
        )])
        .await;
        let f = gemini_factory(&server.base_url);

        for _ in 0..2 {
            match f.client_for(LLMProvider::Gemini).await.readiness() {
                Readiness::Degraded(msg) => assert!(msg.contains("rejected")),
                Readiness::Ready => panic!("rejected key must degrade"),
            }
        }
        assert_eq!(server.count("GET /models"), 1);
    }

    #[tokio::test]
    async fn live_catalog_reports_discovered_gemini_models() {
        let server = StubServer::start(vec![route("/models", 200, GEMINI_MODELS)]).await;
        let f = gemini_factory(&server.base_url);

        let static_listing = f.catalog(false).await;
        assert_eq!(static_listing[2].models.len(), 3);
        assert_eq!(server.count("GET /models"), 0);

        let live = f.catalog(true).await;
        let gemini = &live[2];
        assert_eq!(gemini.id, "gemini");
        assert_eq!(gemini.models.len(), 1);
        assert_eq!(gemini.models[0].id, "gemini-1.5-pro");
        assert_eq!(gemini.models[0].name, "Gemini 1.5 Pro");
        assert_eq!(live[0], static_listing[0]);
    }

    #[tokio::test]
    async fn warm_up_moves_the_key_check_out_of_requests() {
        let server = StubServer::start(vec![
            route(":generateContent", 500, r#"{"error":{"message":"backend unavailable"}}"#),
            route("/models", 200, GEMINI_MODELS),
        ])
        .await;
        let f = gemini_factory(&server.base_url);
        f.warm_up().await;
        assert_eq!(server.count("GET /models"), 1);

        let client = f.client_for(LLMProvider::Gemini).await;
        let result = client
            .generate_response("hi", &[], &Default::default())
            .await;
        assert!(result.error);
        assert_eq!(server.count("GET /models"), 1);
        assert_eq!(server.requests().len(), 2);
    }
}
