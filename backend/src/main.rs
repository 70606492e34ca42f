//! Backend entry point: tracing, configuration, schema bootstrap, serve.

use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use backend::outbound::persistence::{DbPool, PoolConfig, ensure_schema};
use backend::server::{AppConfig, run};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let config = AppConfig::from_env();

    let pool = match &config.database_url {
        Some(url) => {
            let pool = DbPool::new(PoolConfig::new(url.clone()))
                .await
                .map_err(|err| std::io::Error::other(format!("database pool: {err}")))?;
            ensure_schema(&pool)
                .await
                .map_err(|err| std::io::Error::other(format!("schema bootstrap: {err}")))?;
            info!("database schema ensured");
            Some(pool)
        }
        None => {
            warn!("DATABASE_URL not set; persistence runs in-memory");
            None
        }
    };

    run(&config, pool)?.await
}
