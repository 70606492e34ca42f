//! Shared HTTP adapter state.
//!
//! Handlers receive this via `actix_web::web::Data` and depend only on
//! domain services and ports, so the whole HTTP surface runs unchanged over
//! fixture ports in tests.

use std::sync::Arc;

use crate::domain::ad_service::AdCreationService;
use crate::domain::analytics_service::AnalyticsService;
use crate::domain::delivery_service::DeliveryService;
use crate::domain::lead_service::LeadSourcingService;
use crate::domain::payment_service::PaymentService;
use crate::domain::ports::{AdRepository, WebhookVerifier};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub ad_creation: Arc<AdCreationService>,
    pub payments: Arc<PaymentService>,
    pub analytics: Arc<AnalyticsService>,
    pub leads: Arc<LeadSourcingService>,
    pub delivery: Arc<DeliveryService>,
    pub ads: Arc<dyn AdRepository>,
    pub webhook_verifier: Arc<dyn WebhookVerifier>,
}
