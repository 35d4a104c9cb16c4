// Provider clients and the uniform adapter contract

pub mod provider_base;
pub mod provider_handle;
pub mod claude;
pub mod gemini;
pub mod ollama;
pub mod openai;
