//! Domain ports and supporting types for the hexagonal boundary.

mod ad_repository;
mod analytics_repository;
mod lead_repository;
mod order_repository;
mod payment_gateway;
mod places;
mod signature;
mod text_generator;
mod video;
mod web_search;
mod webhook_ledger;

#[cfg(test)]
pub use ad_repository::MockAdRepository;
pub use ad_repository::{AdPage, AdRepository, AdRepositoryError, AdSummary, FixtureAdRepository};
#[cfg(test)]
pub use analytics_repository::MockAnalyticsRepository;
pub use analytics_repository::{
    AnalyticsRepository, AnalyticsRepositoryError, FixtureAnalyticsRepository,
};
#[cfg(test)]
pub use lead_repository::MockLeadRepository;
pub use lead_repository::{FixtureLeadRepository, LeadRepository, LeadRepositoryError};
#[cfg(test)]
pub use order_repository::MockOrderRepository;
pub use order_repository::{
    FixtureOrderRepository, OrderRepository, OrderRepositoryError, OrderWithAd,
};
#[cfg(test)]
pub use payment_gateway::MockPaymentGateway;
pub use payment_gateway::{
    CreatePaymentIntent, CustomerHandle, FixturePaymentGateway, PaymentGateway,
    PaymentGatewayError, PaymentIntent, SubscriptionHandle,
};
#[cfg(test)]
pub use places::MockPlacesDirectory;
pub use places::{
    BusinessDetails, BusinessSummary, FixturePlacesDirectory, KeyValidation, PlacesDirectory,
    PlacesError,
};
pub use signature::{FixtureWebhookVerifier, SignatureError, WebhookVerifier};
#[cfg(test)]
pub use text_generator::MockTextGenerator;
pub use text_generator::{FixtureTextGenerator, TextGenerationError, TextGenerator};
#[cfg(test)]
pub use video::MockVideoInspiration;
pub use video::{FixtureVideoInspiration, VideoInspiration, VideoStats, VideoSummary};
#[cfg(test)]
pub use web_search::MockWebSearch;
pub use web_search::{FixtureWebSearch, SearchHit, WebSearch, WebSearchError};
#[cfg(test)]
pub use webhook_ledger::MockWebhookLedger;
pub use webhook_ledger::{FixtureWebhookLedger, WebhookLedger, WebhookLedgerError};
