use dotenv::dotenv;
use storefront_backend::app::app::App;
use storefront_backend::util::logger::Logger;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Keep the appender guards alive for the whole process
    let _logger = match Logger::new() {
        Ok(logger) => Some(logger),
        Err(e) => {
            let env_filter = EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"));
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_target(true)
                .with_thread_ids(true)
                .try_init()
                .ok();
            warn!("File logging disabled: {}", e);
            None
        }
    };

    info!("Starting storefront backend");

    match dotenv() {
        Ok(_) => info!("Loaded .env file"),
        Err(e) => warn!("Failed to load .env file: {} (using system env vars)", e),
    }

    let app = match App::new().await {
        Ok(app) => app,
        Err(e) => {
            error!("Failed to initialise application: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = app.start().await {
        error!("Server stopped with error: {}", e);
        std::process::exit(1);
    }
}
