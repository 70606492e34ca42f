//! AI popup-ad generation backend.
//!
//! Hexagonal layout: [`domain`] holds the entities, services, and ports;
//! [`inbound`] adapts HTTP onto the services; [`outbound`] implements the
//! ports over PostgreSQL and third-party APIs; [`server`] wires it all
//! together.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod server;

pub use doc::ApiDoc;
pub use middleware::Trace;
