use anyhow::Context;
use derive_more::{Display, Error};
use serde_json::json;

use crate::{
    front::templates,
    models::{
        self,
        bag::{Bag, DeliveryPolicy},
        order::{DeliveryDetails, Order, OrderLineItem},
        stripe::CheckoutMetadata,
    },
    repo, services,
};

#[derive(Debug, Display, Error, PartialEq, Eq)]
pub enum CheckoutError {
    #[display("product {_0} in the bag was not found")]
    ProductNotFound(#[error(not(source))] i64),
    #[display("client secret does not contain a payment intent id")]
    InvalidClientSecret,
}

/// Creates the payment intent that the checkout page confirms with the card.
pub async fn create_payment_intent(
    gateway: &services::ImplPaymentGateway,
    grand_total: rust_decimal::Decimal,
    currency: &str,
) -> anyhow::Result<models::stripe::CreatedPaymentIntent> {
    let amount = models::stripe::to_minor_units(grand_total)?;
    gateway.create_payment_intent(amount, currency).await
}

/// Stores what the webhook needs to rebuild the order on the payment intent.
pub async fn cache_checkout_data(
    gateway: &services::ImplPaymentGateway,
    client_secret: &str,
    bag: &Bag,
    save_info: bool,
    username: &str,
) -> anyhow::Result<()> {
    let pid =
        models::stripe::payment_intent_id(client_secret).ok_or(CheckoutError::InvalidClientSecret)?;

    gateway
        .modify_payment_intent_metadata(
            pid,
            &CheckoutMetadata {
                bag: bag.to_json(),
                save_info,
                username: username.to_string(),
            },
        )
        .await
}

/// Inserts one line item per bag entry. Fails on the first product that no
/// longer exists.
pub async fn create_line_items(
    repo: &repo::ImplAppRepo,
    order_id: i64,
    bag: &Bag,
) -> anyhow::Result<Vec<OrderLineItem>> {
    let mut line_items = Vec::new();

    for (item_id, size, quantity) in bag.entries() {
        let product = repo
            .get_product(item_id)
            .await?
            .ok_or(CheckoutError::ProductNotFound(item_id))?;

        let mut line_item = OrderLineItem::new(order_id, product.id, size, quantity, product.price);
        line_item.id = repo.insert_order_line_item(&line_item).await?;
        line_items.push(line_item);
    }

    Ok(line_items)
}

/// Persists an order with its line items and totals. A partially created
/// order is deleted before the error is returned.
pub async fn place_order(
    repo: &repo::ImplAppRepo,
    details: DeliveryDetails,
    bag: &Bag,
    stripe_pid: &str,
    user_profile_id: Option<i64>,
    policy: &DeliveryPolicy,
) -> anyhow::Result<Order> {
    let mut order = Order::new(details, bag.to_json(), stripe_pid.to_string());
    order.user_profile_id = user_profile_id;
    order.id = repo.insert_order(&order).await?;

    let line_items = match create_line_items(repo, order.id, bag).await {
        Ok(line_items) => line_items,
        Err(e) => {
            repo.delete_order(order.id)
                .await
                .context("partial order could not be deleted")?;
            return Err(e);
        }
    };

    order.update_totals(&line_items, policy);
    if let Err(e) = repo.update_order_totals(&order).await {
        repo.delete_order(order.id).await?;
        return Err(e);
    }

    Ok(order)
}

/// Links a finished order to the buyer's profile and, when they opted in,
/// keeps its delivery details as their defaults.
pub async fn complete_checkout(
    repo: &repo::ImplAppRepo,
    order: &mut Order,
    username: Option<&str>,
    save_info: bool,
) -> anyhow::Result<()> {
    let Some(username) = username else {
        return Ok(());
    };

    let Some(profile) = repo.get_profile_by_username(username).await? else {
        return Ok(());
    };

    repo.attach_order_to_profile(order.id, profile.id).await?;
    order.user_profile_id = Some(profile.id);

    if save_info {
        repo.update_profile_defaults(
            profile.id,
            &models::profile::ProfileDefaults::from_delivery(&order.details),
        )
        .await?;
    }

    Ok(())
}

/// Renders the order confirmation and emails it to the buyer.
pub async fn send_confirmation_email(
    repo: &repo::ImplAppRepo,
    mail_service: &services::ImplMailService,
    order: &Order,
    contact_email: &str,
) -> anyhow::Result<()> {
    let line_items = repo.get_order_line_details(order.id).await?;
    let context = tera::Context::from_value(json!({
        "order": order,
        "line_items": line_items,
        "contact_email": contact_email,
    }))?;

    let subject = templates::WEB_TEMPLATES.render(
        "checkout/confirmation_emails/confirmation_email_subject.txt",
        &context,
    )?;
    let body = templates::WEB_TEMPLATES.render(
        "checkout/confirmation_emails/confirmation_email_body.txt",
        &context,
    )?;

    mail_service
        .send_email(&order.details.email, &subject, &body)
        .await
}
