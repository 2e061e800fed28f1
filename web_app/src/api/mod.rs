//! # API Module
//!
//! Business logic of the storefront, independent of the HTTP layer.
//!
//! ## Modules
//!
//! - [`bag`] - Shopping bag pricing and updates
//! - [`checkout`] - Payment intents, orders and confirmation emails
//! - [`profile`] - Delivery defaults and order history

pub mod bag;
pub mod checkout;
pub mod profile;
