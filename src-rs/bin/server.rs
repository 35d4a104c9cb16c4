use anyhow::Result;
use nbassist_core::{config::AppConfig, init_logger, server};

#[tokio::main]
async fn main() -> Result<()> {
    init_logger();
    let config = AppConfig::load()?;
    server::serve(config).await
}
