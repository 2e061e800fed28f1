//! Frontend route configuration module.
//!
//! Routes are grouped by functionality into scopes.

use super::{bag, checkout, products, profile};
use crate::webhook;
use ntex::web;

/// Configures catalogue routes.
///
/// # Routes
/// - `GET /products` - Product list
/// - `GET /products/{product_id}` - Product details with the size select
pub fn products(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/products").service((
        products::get_products_view,
        products::get_product_detail_view,
    )));
}

/// Configures shopping bag routes. The bag lives in the session.
///
/// # Routes
/// - `GET /bag` - Bag contents with delivery and totals
/// - `POST /bag/add/{item_id}` - Add a product, optionally with a size
/// - `POST /bag/remove/{item_id}` - Remove a product or one of its sizes
pub fn bag(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/bag").service((
        bag::get_bag_view,
        bag::add_to_bag,
        bag::remove_from_bag,
    )));
}

/// Configures checkout routes, including the Stripe webhook receiver.
///
/// # Routes
/// - `GET /checkout` - Checkout page, creates the payment intent
/// - `POST /checkout` - Place the order once the card payment succeeded
/// - `POST /checkout/cache_checkout_data/` - Store the bag on the payment intent
/// - `GET /checkout/checkout_success/{order_number}` - Order confirmation
/// - `POST /checkout/wh/` - Stripe webhook events
pub fn checkout(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/checkout").service((
        checkout::get_checkout_view,
        checkout::place_order,
        checkout::cache_checkout_data,
        checkout::checkout_success,
        webhook::stripe::receive,
    )));
}

/// Configures user profile routes. All of them require a logged in user.
///
/// # Routes
/// - `GET /profile` - Delivery defaults and order history
/// - `POST /profile` - Update delivery defaults
/// - `GET /profile/order_history/{order_number}` - Past order confirmation
pub fn user_profile(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/profile").service((
        profile::get_profile_view,
        profile::update_profile,
        profile::get_order_history_view,
    )));
}
