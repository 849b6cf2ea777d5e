use hq_server::{Config, Server};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env before reading any configuration
    let _ = dotenvy::dotenv();

    hq_server::init_logger_with_file(
        std::env::var("LOG_LEVEL").ok().as_deref(),
        std::env::var("LOG_DIR").ok().as_deref(),
    );

    let config = Config::from_env();
    tracing::info!(
        environment = %config.environment,
        port = config.http_port,
        timezone = %config.timezone,
        "hq-server starting"
    );

    let server = Server::initialize(config).await?;
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
