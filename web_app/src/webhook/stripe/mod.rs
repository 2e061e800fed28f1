//! Stripe webhook integration
//!
//! ## Submodules
//!
//! - [`handler`] - Turns payment intent events into orders and emails
//! - [`routes`] - HTTP endpoint receiving the events
//! - [`schemas`] - Event payload structures
//! - [`security`] - `Stripe-Signature` verification

pub mod handler;
pub mod routes;
pub mod schemas;
pub mod security;

pub use routes::receive;
