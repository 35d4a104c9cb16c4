#![deny(clippy::all)]

pub mod config;
pub mod cons;
pub mod llm;
pub mod server;

#[cfg(test)]
mod tests;

use std::str::FromStr;
use std::sync::Once;

pub use config::AppConfig;
pub use cons::provider_cons::LLMProvider;
pub use llm::models::provider_base::{FixOutcome, LlmResult, ProviderClient, ProviderConfig};
pub use llm::models::provider_handle::{AnyProviderClient, ProviderFactory, ProviderResolver};
pub use llm::notebook::{format_notebook, NotebookSnapshot};
pub use llm::router::FallbackRouter;

static INIT: Once = Once::new();

pub fn init_logger() {
    INIT.call_once(|| {
        use log::LevelFilter;
        use log4rs::append::console::ConsoleAppender;
        use log4rs::config::{Appender, Config, Root};
        use log4rs::encode::pattern::PatternEncoder;

        // Try to load log4rs configuration from file first
        let config_path =
            std::env::var("LOG4RS_CONFIG").unwrap_or_else(|_| "log4rs.yaml".to_string());
        if log4rs::init_file(&config_path, Default::default()).is_ok() {
            println!("[INIT] Logger initialized from {}", config_path);
            return;
        }

        let level = std::env::var("NBASSIST_LOG_LEVEL")
            .ok()
            .and_then(|v| LevelFilter::from_str(v.trim()).ok())
            .unwrap_or(LevelFilter::Info);

        let pattern = "{d(%Y-%m-%d %H:%M:%S)} [{l}] {t} - {m}{n}";
        let stdout = ConsoleAppender::builder()
            .encoder(Box::new(PatternEncoder::new(pattern)))
            .build();

        let config = match Config::builder()
            .appender(Appender::builder().build("stdout", Box::new(stdout)))
            .build(Root::builder().appender("stdout").build(level))
        {
            Ok(c) => c,
            Err(e) => {
                println!("[INIT] Failed to build config: {}", e);
                return;
            }
        };

        match log4rs::init_config(config) {
            Ok(_) => println!("[INIT] Logger initialized at level {}", level),
            Err(e) => println!("[INIT] Failed to initialize logger: {}", e),
        }
    });
}
