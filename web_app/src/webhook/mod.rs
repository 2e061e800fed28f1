//! Webhook handlers for external integrations
//!
//! ## Modules
//!
//! - [`stripe`] - Stripe payment events

pub mod stripe;
