//! Idempotent schema creation at process startup.
//!
//! Every table is `CREATE TABLE IF NOT EXISTS`, so repeated startups are
//! harmless. [`super::schema`] must be kept in sync with this DDL.

use diesel_async::SimpleAsyncConnection;

use super::pool::{DbPool, PoolError};

const DDL: &str = r#"
CREATE TABLE IF NOT EXISTS leads (
    id VARCHAR(255) PRIMARY KEY,
    company_name VARCHAR(255) NOT NULL,
    website VARCHAR(500) NOT NULL,
    industry VARCHAR(100) NOT NULL,
    contact_email VARCHAR(255),
    contact_name VARCHAR(255),
    estimated_size VARCHAR(50) NOT NULL,
    source VARCHAR(50) NOT NULL,
    status VARCHAR(50) NOT NULL DEFAULT 'new',
    metadata JSONB NOT NULL DEFAULT '{}',
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE TABLE IF NOT EXISTS orders (
    id VARCHAR(255) PRIMARY KEY,
    customer_email VARCHAR(255) NOT NULL,
    package_id VARCHAR(100) NOT NULL,
    amount BIGINT NOT NULL,
    status VARCHAR(50) NOT NULL,
    payment_intent_id VARCHAR(255) NOT NULL UNIQUE,
    metadata JSONB NOT NULL DEFAULT '{}',
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE TABLE IF NOT EXISTS ads (
    id VARCHAR(255) PRIMARY KEY,
    payment_intent_id VARCHAR(255),
    html TEXT NOT NULL,
    css TEXT NOT NULL,
    javascript TEXT NOT NULL,
    preview TEXT NOT NULL DEFAULT '',
    metadata JSONB NOT NULL DEFAULT '{}',
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE TABLE IF NOT EXISTS analytics_events (
    id VARCHAR(255) PRIMARY KEY,
    ad_id VARCHAR(255) NOT NULL,
    event_type VARCHAR(50) NOT NULL,
    timestamp TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    url VARCHAR(1000) NOT NULL DEFAULT 'unknown',
    referrer VARCHAR(1000),
    user_agent TEXT,
    ip_address VARCHAR(64),
    metadata JSONB NOT NULL DEFAULT '{}'
);

CREATE TABLE IF NOT EXISTS payment_failures (
    id SERIAL PRIMARY KEY,
    payment_intent_id VARCHAR(255) NOT NULL,
    amount BIGINT NOT NULL,
    currency VARCHAR(10) NOT NULL,
    failure_reason TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE TABLE IF NOT EXISTS webhook_events (
    id VARCHAR(255) PRIMARY KEY,
    event_type VARCHAR(100) NOT NULL,
    received_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
"#;

/// Create any missing tables.
///
/// # Errors
/// Returns [`PoolError`] when a connection cannot be checked out or the DDL
/// batch fails.
pub async fn ensure_schema(pool: &DbPool) -> Result<(), PoolError> {
    let mut conn = pool.get().await?;
    conn.batch_execute(DDL)
        .await
        .map_err(|err| PoolError::build(format!("schema bootstrap failed: {err}")))
}
