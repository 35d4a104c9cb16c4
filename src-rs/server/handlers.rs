use axum::body::Bytes;
use axum::extract::State;
use axum::response::Json;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::llm::models::provider_base::{
    lenient_text, ChatMessage, CodeError, LlmResult, ProviderConfig,
};
use crate::llm::notebook::NotebookSnapshot;
use crate::llm::utils::string_util::truncate_utf8_with_ellipsis;

use super::error::ApiError;
use super::AppState;

fn default_llm_type() -> String {
    "openai".to_string()
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// An `llm_type` that is null or not a string resolves like any other unknown id.
#[derive(Debug, Deserialize)]
pub struct LlmRequest {
    #[serde(default = "default_llm_type", deserialize_with = "lenient_text")]
    pub llm_type: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub prompt: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub messages: Vec<ChatMessage>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub notebook_content: NotebookSnapshot,
}

#[derive(Debug, Deserialize)]
pub struct FixErrorRequest {
    #[serde(default = "default_llm_type", deserialize_with = "lenient_text")]
    pub llm_type: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub code: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub errors: Vec<CodeError>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FixErrorResponse {
    pub fixed_code: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ConfigResponse {
    pub available_models: Vec<ProviderConfig>,
}

pub async fn index() -> Json<Value> {
    Json(json!({ "status": "JupyterLab AI Assistant API is running" }))
}

pub async fn get_llm_config(State(state): State<Arc<AppState>>) -> Json<ConfigResponse> {
    let available_models = state.router.resolver().catalog(state.live_config).await;
    Json(ConfigResponse { available_models })
}

pub async fn llm_request(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<LlmResult>, ApiError> {
    let req: LlmRequest = serde_json::from_slice(&body)?;
    log::debug!(
        "LLM request: {}, prompt: {}",
        req.llm_type,
        truncate_utf8_with_ellipsis(&req.prompt, 50)
    );

    let result = state
        .router
        .generate(&req.llm_type, &req.prompt, &req.messages, &req.notebook_content)
        .await;
    Ok(Json(result))
}

pub async fn fix_error(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<FixErrorResponse>, ApiError> {
    let req: FixErrorRequest = serde_json::from_slice(&body)?;
    log::debug!(
        "Error fix request: {}, code length: {}",
        req.llm_type,
        req.code.len()
    );

    let outcome = state.router.fix(&req.llm_type, &req.code, &req.errors).await;
    Ok(Json(FixErrorResponse {
        fixed_code: outcome.into_wire(),
    }))
}
