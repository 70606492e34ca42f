//! Domain types, services, and ports.
//!
//! Everything in this module is transport agnostic: no HTTP, no SQL, no
//! provider SDK types. Inbound adapters call the services; outbound adapters
//! implement the [`ports`] traits.

pub mod ad;
pub mod ad_copy;
pub mod ad_service;
pub mod analytics;
pub mod analytics_service;
pub mod brand;
pub mod delivery_service;
pub mod error;
pub mod intake;
pub mod lead;
pub mod lead_service;
pub mod order;
pub mod package;
pub mod payment_service;
pub mod popup;
pub mod ports;
pub mod templates;

pub use self::error::{Error, ErrorCode};

/// Convenient result alias for domain operations.
pub type ApiResult<T> = Result<T, Error>;
