//! Environment-driven application configuration.

use std::net::SocketAddr;

use tracing::warn;

/// Settings read once at startup.
///
/// Every third-party integration is optional: a missing key wires the
/// corresponding fixture adapter so the service still boots in development
/// and in tests.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub public_base_url: String,
    pub database_url: Option<String>,
    pub google_api_key: Option<String>,
    pub brave_api_key: Option<String>,
    pub stripe_secret_key: Option<String>,
    pub stripe_webhook_secret: Option<String>,
}

fn optional(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.is_empty())
}

impl AppConfig {
    /// Read configuration from the environment.
    pub fn from_env() -> Self {
        let port: u16 = optional("PORT")
            .and_then(|raw| match raw.parse() {
                Ok(port) => Some(port),
                Err(err) => {
                    warn!(raw, error = %err, "invalid PORT, using 8080");
                    None
                }
            })
            .unwrap_or(8080);

        let config = Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], port)),
            public_base_url: optional("PUBLIC_BASE_URL")
                .unwrap_or_else(|| format!("http://localhost:{port}")),
            database_url: optional("DATABASE_URL"),
            google_api_key: optional("GOOGLE_API_KEY"),
            brave_api_key: optional("BRAVE_API_KEY"),
            stripe_secret_key: optional("STRIPE_SECRET_KEY"),
            stripe_webhook_secret: optional("STRIPE_WEBHOOK_SECRET"),
        };

        for (key, value) in [
            ("DATABASE_URL", &config.database_url),
            ("GOOGLE_API_KEY", &config.google_api_key),
            ("BRAVE_API_KEY", &config.brave_api_key),
            ("STRIPE_SECRET_KEY", &config.stripe_secret_key),
            ("STRIPE_WEBHOOK_SECRET", &config.stripe_webhook_secret),
        ] {
            if value.is_none() {
                warn!(key, "not set; the dependent integration runs on fixtures");
            }
        }

        config
    }
}
