//! Payment provider adapters: REST gateway and webhook signature
//! verification.

mod gateway;
mod signature;

pub use gateway::StripeGateway;
pub use signature::{StripeWebhookVerifier, sign_payload};
