

#[cfg(test)]
pub mod cons {
    pub mod provider_cons;
}

#[cfg(test)]
pub mod llm {
    pub mod notebook;
    pub mod router;
    pub mod models {
        pub mod claude;
        pub mod gemini;
        pub mod ollama;
        pub mod openai;
        pub mod provider_base;
        pub mod provider_handle;
    }
}

#[cfg(test)]
pub mod server {
    pub mod handlers;
}
