use crate::cons::provider_cons::LLMProvider;
use crate::llm::models::openai::{build_chat_completions_request_body, extract_message_content, OpenAiClient};
use crate::llm::models::provider_base::{ChatMessage, ProviderClient, Readiness, Role};
use crate::llm::notebook::NotebookSnapshot;
use crate::tests::support::{direct_client, route, StubServer};
use serde_json::json;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_puts_system_first_and_disables_streaming() {
        let messages = vec![
            ChatMessage::user("hi"),
            ChatMessage::new(Role::Assistant, "hello"),
        ];
        let body = build_chat_completions_request_body("gpt-4o", "be brief", &messages, 4096);

        assert_eq!(body["model"], "gpt-4o");
        assert_eq!(body["max_tokens"], 4096);
        assert_eq!(body["stream"], false);
        assert_eq!(body["messages"][0], json!({ "role": "system", "content": "be brief" }));
        assert_eq!(body["messages"][1], json!({ "role": "user", "content": "hi" }));
        assert_eq!(body["messages"][2], json!({ "role": "assistant", "content": "hello" }));
    }

    #[test]
    fn extracts_first_choice_content() {
        let resp = json!({
            "choices": [{ "message": { "role": "assistant", "content": "answer" } }]
        });
        assert_eq!(extract_message_content(&resp).unwrap(), "answer");
        assert!(extract_message_content(&json!({ "choices": [] })).is_err());
    }

    #[tokio::test]
    async fn missing_key_degrades_without_network() {
        let client = OpenAiClient::new(
            "http://127.0.0.1:9".to_string(),
            None,
            "gpt-4o".to_string(),
            reqwest::Client::new(),
        );
        assert!(matches!(client.readiness(), Readiness::Degraded(_)));

        let result = client
            .generate_response("hi", &[], &NotebookSnapshot::default())
            .await;
        assert!(result.error);
        assert_eq!(
            result.content,
            "Error: OpenAI API key is not set or is invalid. Please provide a valid API key in the settings."
        );
        assert_eq!(result.provider, "OpenAI");
        assert_eq!(result.model, "gpt-4o");
    }

    #[tokio::test]
    async fn get_config_is_static() {
        let client = OpenAiClient::new(
            "http://127.0.0.1:9".to_string(),
            Some("k".to_string()),
            "gpt-4o".to_string(),
            reqwest::Client::new(),
        );
        let cfg = client.get_config().await;
        assert_eq!(cfg.id, LLMProvider::OpenAI.provider_name());
        assert_eq!(cfg.name, "OpenAI ChatGPT");
        assert_eq!(cfg.models.len(), 3);
        assert!(!cfg.local);
    }

    fn keyed_client(base_url: &str) -> OpenAiClient {
        OpenAiClient::new(
            base_url.to_string(),
            Some("k".to_string()),
            "gpt-4o".to_string(),
            direct_client(),
        )
    }

    #[tokio::test]
    async fn chat_completion_over_http() {
        let server = StubServer::start(vec![route(
            "/chat/completions",
            200,
            r#"{"choices":[{"message":{"role":"assistant","content":"print(1)"}}]}"#,
        )])
        .await;
        let result = keyed_client(&server.base_url)
            .generate_response("hi", &[], &NotebookSnapshot::default())
            .await;

        assert!(!result.error, "{}", result.content);
        assert_eq!(result.content, "print(1)");
        let requests = server.requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].head.contains("authorization: bearer k"));
        assert!(requests[0].body.contains(r#""stream":false"#));
    }

    #[tokio::test]
    async fn not_found_is_reported_without_retrying_another_path() {
        let server = StubServer::start(vec![route(
            "/chat/completions",
            404,
            r#"{"error":{"message":"model not found"}}"#,
        )])
        .await;
        let result = keyed_client(&server.base_url)
            .generate_response("hi", &[], &NotebookSnapshot::default())
            .await;

        assert!(result.error);
        assert!(result.content.starts_with("Error generating response: OpenAI API error (404"));
        assert_eq!(server.count("POST /chat/completions"), 1);
        assert_eq!(server.requests().len(), 1);
    }

    #[tokio::test]
    async fn malformed_success_body_is_an_error() {
        let server = StubServer::start(vec![route("/chat/completions", 200, "<html>oops</html>")]).await;
        let result = keyed_client(&server.base_url)
            .generate_response("hi", &[], &NotebookSnapshot::default())
            .await;

        assert!(result.error);
        assert!(result.content.contains("Failed to parse response JSON"));
    }

    #[tokio::test]
    async fn empty_choices_is_an_error() {
        let server = StubServer::start(vec![route("/chat/completions", 200, r#"{"choices":[]}"#)]).await;
        let result = keyed_client(&server.base_url)
            .generate_response("hi", &[], &NotebookSnapshot::default())
            .await;

        assert!(result.error);
        assert!(result.content.contains("no message content"));
    }
}
