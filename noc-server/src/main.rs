use noc_server::utils::logger;
use noc_server::{Config, Server, ServerState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    let config = Config::from_env();
    logger::init_logger_with_file(&config.log_level, config.log_dir.as_deref());

    // A generated dev secret is fine for development builds, never for a
    // production deployment.
    if config.is_production() && std::env::var("JWT_SECRET").is_err() {
        return Err("JWT_SECRET must be set when ENVIRONMENT=production".into());
    }

    tracing::info!("NOC server starting (env: {})...", config.environment);

    let state = ServerState::initialize(&config).await?;
    let server = Server::with_state(state);

    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
