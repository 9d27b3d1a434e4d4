use tracing_appender::{non_blocking, non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Holds the appender guards; dropping it stops the background writers.
pub struct Logger {
    pub guards: Vec<WorkerGuard>,
}

impl Logger {
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let guards = Self::setup_logging()?;
        Ok(Logger { guards })
    }

    /// Console plus daily-rolled files under `logs/`: plain and JSON, each with an errors-only twin.
    pub fn setup_logging() -> Result<Vec<WorkerGuard>, Box<dyn std::error::Error>> {
        std::fs::create_dir_all("logs")?;

        let console_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("info,storefront_backend=debug"));
        let file_log_level = std::env::var("FILE_LOG_LEVEL").unwrap_or_else(|_| "debug".to_string());
        let error_file_log_level =
            std::env::var("ERROR_FILE_LOG_LEVEL").unwrap_or_else(|_| "error".to_string());

        let (general, general_guard) = non_blocking(rolling::daily("logs", "storefront-backend.log"));
        let (errors, errors_guard) = non_blocking(rolling::daily("logs/error", "storefront-backend-error.log"));
        let (json, json_guard) = non_blocking(rolling::daily("logs/json", "storefront-backend.json"));
        let (errors_json, errors_json_guard) =
            non_blocking(rolling::daily("logs/error/json", "storefront-backend-error.json"));

        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .pretty()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_filter(console_filter),
            )
            .with(
                fmt::layer()
                    .with_writer(general)
                    .with_ansi(false)
                    .with_file(true)
                    .with_line_number(true)
                    .with_filter(EnvFilter::try_new(&file_log_level)?),
            )
            .with(
                fmt::layer()
                    .with_writer(errors)
                    .with_ansi(false)
                    .with_file(true)
                    .with_line_number(true)
                    .with_filter(EnvFilter::try_new(&error_file_log_level)?),
            )
            .with(
                fmt::layer()
                    .json()
                    .with_writer(json)
                    .with_file(true)
                    .with_line_number(true)
                    .with_filter(EnvFilter::try_new(&file_log_level)?),
            )
            .with(
                fmt::layer()
                    .json()
                    .with_writer(errors_json)
                    .with_file(true)
                    .with_line_number(true)
                    .with_filter(EnvFilter::try_new(&error_file_log_level)?),
            )
            .try_init()?;

        Ok(vec![general_guard, errors_guard, json_guard, errors_json_guard])
    }
}
