use std::env;

pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Allowed browser origin; any origin when unset
    pub cors_origin: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(8080);
        let cors_origin = env::var("CORS_ORIGIN").ok().filter(|o| !o.trim().is_empty());
        AppConfig { host, port, cors_origin }
    }
}
