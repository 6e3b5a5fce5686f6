use std::env;

use crate::constants::DEFAULT_SESSION_TTL_SECS;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub allowed_origins: Vec<String>,
    pub environment: String,
    /// Hosted store REST endpoint (Supabase project URL)
    pub supabase_url: Option<String>,
    /// Hosted store access key
    pub supabase_key: Option<String>,
    /// Direct Postgres connection to the same store, preferred when set
    pub database_url: Option<String>,
    /// HMAC key for identity tokens
    pub session_secret: String,
    pub session_ttl_secs: i64,
    pub log_requests: bool,
}

/// Read an optional variable, treating empty values as unset
fn optional_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if it exists (development)
        dotenvy::dotenv().ok();

        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .map_err(|_| "Invalid SERVER_PORT")?;

        let allowed_origins = env::var("ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        let session_secret = optional_var("SESSION_SECRET")
            .ok_or("SESSION_SECRET must be set for identity tokens")?;

        let session_ttl_secs = match optional_var("SESSION_TTL_SECS") {
            Some(v) => v.parse().map_err(|_| "Invalid SESSION_TTL_SECS")?,
            None => DEFAULT_SESSION_TTL_SECS,
        };

        let log_requests = optional_var("LOG_REQUESTS")
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(Config {
            server_host,
            server_port,
            allowed_origins,
            environment,
            supabase_url: optional_var("SUPABASE_URL"),
            supabase_key: optional_var("SUPABASE_KEY"),
            database_url: optional_var("DATABASE_URL"),
            session_secret,
            session_ttl_secs,
            log_requests,
        })
    }

    /// Get server address as string
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    /// Whether the connection parameters for the external store are present.
    ///
    /// Used to tell "configuration missing" apart from "no rows" when a read
    /// comes back empty.
    pub fn store_credentials_present(&self) -> bool {
        let rest = self.supabase_url.is_some() && self.supabase_key.is_some();
        rest || self.database_url.is_some()
    }
}
