//! Outbound adapters: persistence and third-party API clients.

pub mod brave;
pub mod gemini;
pub mod google;
pub mod persistence;
pub mod stripe;
