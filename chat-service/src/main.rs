use chat_service::config::ChatConfig;
use chat_service::services::metrics::init_metrics;
use chat_service::startup::Application;
use dotenvy::dotenv;
use service_core::observability::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config = ChatConfig::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    init_tracing(
        "chat-service",
        &config.server.log_level,
        config.server.otlp_endpoint.as_deref(),
    );

    let metrics = init_metrics()?;

    let app = Application::build(config, Some(metrics)).await?;
    app.run_until_stopped().await?;

    Ok(())
}
