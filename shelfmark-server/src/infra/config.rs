use std::env;

use serde::Deserialize;

/// Server configuration loaded via environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // Server settings
    pub server_host: String,
    pub server_port: u16,

    // Database settings
    pub database_url: Option<String>,

    // Cover image storage: an object_store URL (file:// or s3://) plus the
    // base under which stored covers are reachable by clients.
    pub blob_store_url: String,
    pub cover_public_base_url: String,

    // CORS settings
    pub cors_allowed_origins: Vec<String>,

    // Development settings
    pub dev_mode: bool,

    // Bearer-token validation against the external identity provider
    pub auth_enabled: bool,
    pub auth_issuer: Option<String>,
    pub auth_audience: Option<String>,
    pub auth_token_key: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .unwrap_or(3000);

        Ok(Self {
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port,

            database_url: env::var("DATABASE_URL").ok(),

            // object_store file URLs need an absolute path
            blob_store_url: match env::var("BLOB_STORE_URL") {
                Ok(url) => url,
                Err(_) => format!(
                    "file://{}",
                    env::current_dir()?.join("data/covers").display()
                ),
            },
            cover_public_base_url: env::var("COVER_PUBLIC_BASE_URL").unwrap_or_else(|_| {
                format!("http://localhost:{}/api/v1/covers", server_port)
            }),

            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .unwrap_or_else(|_| "http://localhost:3000,http://localhost:5173".to_string())
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),

            dev_mode: env::var("DEV_MODE")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .unwrap_or(false),

            auth_enabled: env::var("AUTH_ENABLED")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .unwrap_or(false),
            auth_issuer: env::var("AUTH_ISSUER").ok(),
            auth_audience: env::var("AUTH_AUDIENCE").ok(),
            auth_token_key: env::var("AUTH_TOKEN_KEY")
                .unwrap_or_else(|_| "change-me-hmac-key".to_string()),
        })
    }

    /// Create the local cover directory when the blob store points at the
    /// filesystem. Called once during startup.
    pub fn ensure_directories(&self) -> anyhow::Result<()> {
        if let Some(path) = self.blob_store_url.strip_prefix("file://") {
            std::fs::create_dir_all(path)?;
        }
        Ok(())
    }
}
