//! # Storefront client
//!
//! Browser-side glue for the storefront pages, compiled to WASM.
//!
//! - [`size_selector`] reveals the product size select on detail pages.
//! - [`checkout`] drives the Stripe card widget and the two-step checkout
//!   (cache checkout data, then confirm the payment).
//!
//! Everything that touches the DOM, Stripe.js or the network goes through
//! the capability traits of each module, so the flows run natively in
//! tests. The [`browser`] module holds the `web-sys` implementations and
//! the exported entry points.

pub mod checkout;
pub mod errors;
pub mod size_selector;

#[cfg(target_arch = "wasm32")]
pub mod browser;

pub use errors::ClientError;
