//! PostgreSQL persistence adapters (Diesel + diesel-async).

pub mod bootstrap;
mod diesel_ad_repository;
mod diesel_analytics_repository;
mod diesel_lead_repository;
mod diesel_order_repository;
mod diesel_webhook_ledger;
mod models;
mod pool;
pub mod schema;

pub use bootstrap::ensure_schema;
pub use diesel_ad_repository::DieselAdRepository;
pub use diesel_analytics_repository::DieselAnalyticsRepository;
pub use diesel_lead_repository::DieselLeadRepository;
pub use diesel_order_repository::DieselOrderRepository;
pub use diesel_webhook_ledger::DieselWebhookLedger;
pub use pool::{DbPool, PoolConfig, PoolError};
