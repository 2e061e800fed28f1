//! # Stripe Webhook Handler
//!
//! Makes sure every successful payment ends up as an order, even when the
//! browser never returned to the checkout form after the card was charged.

use std::time::Duration;

use ntex::http::StatusCode;

use super::schemas::{PaymentIntentObject, Shipping, StripeEvent};
use crate::{
    api, consts,
    models::{
        bag::{Bag, DeliveryPolicy},
        order::{DeliveryDetails, Order, OrderMatch},
        profile::ProfileDefaults,
        stripe,
    },
    repo, services,
};

pub const EVENT_PAYMENT_SUCCEEDED: &str = "payment_intent.succeeded";
pub const EVENT_PAYMENT_FAILED: &str = "payment_intent.payment_failed";

/// Status and plain text body answered to Stripe
#[derive(Debug, PartialEq, Eq)]
pub struct WebhookReply {
    pub status: StatusCode,
    pub content: String,
}

impl WebhookReply {
    fn ok(content: String) -> Self {
        Self {
            status: StatusCode::OK,
            content,
        }
    }
}

pub struct StripeWebhookHandler<'a> {
    pub repo: &'a repo::ImplAppRepo,
    pub mail_service: &'a services::ImplMailService,
    pub policy: DeliveryPolicy,
    /// Shop address shown in the confirmation email
    pub contact_email: &'a str,
    pub lookup_attempts: u32,
    pub lookup_delay: Duration,
}

/// Blank strings become `None`
fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn delivery_details(shipping: Shipping, email: String) -> DeliveryDetails {
    let address = shipping.address;

    DeliveryDetails {
        full_name: non_blank(shipping.name).unwrap_or_default(),
        email,
        phone_number: non_blank(shipping.phone).unwrap_or_default(),
        country: non_blank(address.country).unwrap_or_default(),
        postcode: non_blank(address.postal_code),
        town_or_city: non_blank(address.city).unwrap_or_default(),
        street_address1: non_blank(address.line1).unwrap_or_default(),
        street_address2: non_blank(address.line2),
        county: non_blank(address.state),
    }
}

impl StripeWebhookHandler<'_> {
    pub async fn handle_event(&self, event: StripeEvent) -> WebhookReply {
        match event.event_type.as_str() {
            EVENT_PAYMENT_SUCCEEDED => self.handle_payment_intent_succeeded(event).await,
            EVENT_PAYMENT_FAILED => {
                WebhookReply::ok(format!("Webhook received: {}", event.event_type))
            }
            _ => WebhookReply::ok(format!("Unhandled webhook received: {}", event.event_type)),
        }
    }

    async fn handle_payment_intent_succeeded(&self, event: StripeEvent) -> WebhookReply {
        let event_type = event.event_type;
        let intent: PaymentIntentObject = match serde_json::from_value(event.data.object) {
            Ok(intent) => intent,
            Err(e) => {
                logfire::error!(
                    "Failed to parse payment intent: {error}",
                    error = e.to_string()
                );
                return WebhookReply {
                    status: StatusCode::BAD_REQUEST,
                    content: format!("Webhook received: {event_type} | ERROR: {e}"),
                };
            }
        };

        let email = intent.billing_email();
        let grand_total = stripe::from_minor_units(intent.charged_amount());
        let save_info = intent.metadata.save_info();
        let original_bag = intent.metadata.bag.clone().unwrap_or_default();
        let username = intent
            .metadata
            .username
            .clone()
            .unwrap_or_else(|| consts::ANONYMOUS_USER.to_string());
        let details = delivery_details(intent.shipping.unwrap_or_default(), email);

        let profile_id = self
            .update_buyer_profile(&username, save_info, &details)
            .await;

        let order_match = OrderMatch {
            details: details.clone(),
            grand_total,
            original_bag: original_bag.clone(),
            stripe_pid: intent.id.clone(),
        };

        if let Some(order) = self.find_existing_order(&order_match).await {
            self.send_confirmation_email(&order).await;
            return WebhookReply::ok(format!(
                "Webhook received: {event_type} | SUCCESS: Verified order already in database"
            ));
        }

        let bag = Bag::from_json_lossy(&original_bag);
        if bag.is_empty() {
            logfire::error!(
                "Payment intent {pid} has no bag to build the order from",
                pid = intent.id.clone()
            );
            return WebhookReply {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                content: format!("Webhook received: {event_type} | ERROR: no bag in metadata"),
            };
        }

        let order = match api::checkout::place_order(
            self.repo,
            details,
            &bag,
            &intent.id,
            profile_id,
            &self.policy,
        )
        .await
        {
            Ok(order) => order,
            Err(e) => {
                logfire::error!(
                    "Order could not be created in webhook: {error}",
                    error = e.to_string()
                );
                return WebhookReply {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    content: format!("Webhook received: {event_type} | ERROR: {e}"),
                };
            }
        };

        self.send_confirmation_email(&order).await;

        WebhookReply::ok(format!(
            "Webhook received: {event_type} | SUCCESS: Created order in webhook"
        ))
    }

    /// Profile id of a known buyer, saving the delivery details as defaults
    /// when they opted in.
    async fn update_buyer_profile(
        &self,
        username: &str,
        save_info: bool,
        details: &DeliveryDetails,
    ) -> Option<i64> {
        if username == consts::ANONYMOUS_USER {
            return None;
        }

        let profile = match self.repo.get_profile_by_username(username).await {
            Ok(Some(profile)) => profile,
            Ok(None) => {
                logfire::warn!(
                    "Webhook buyer {username} has no profile",
                    username = username.to_string()
                );
                return None;
            }
            Err(e) => {
                logfire::error!(
                    "Failed to get profile in webhook: {error}",
                    error = e.to_string()
                );
                return None;
            }
        };

        if save_info {
            let defaults = ProfileDefaults::from_delivery(details);
            if let Err(e) = self.repo.update_profile_defaults(profile.id, &defaults).await {
                logfire::error!(
                    "Failed to save profile defaults in webhook: {error}",
                    error = e.to_string()
                );
            }
        }

        Some(profile.id)
    }

    async fn find_existing_order(&self, order_match: &OrderMatch) -> Option<Order> {
        for attempt in 1..=self.lookup_attempts {
            match self.repo.find_matching_order(order_match).await {
                Ok(Some(order)) => return Some(order),
                Ok(None) => {}
                Err(e) => logfire::error!(
                    "Failed to look up order in webhook: {error}",
                    error = e.to_string()
                ),
            }

            if attempt < self.lookup_attempts {
                ntex::time::sleep(self.lookup_delay).await;
            }
        }

        None
    }

    async fn send_confirmation_email(&self, order: &Order) {
        if let Err(e) = api::checkout::send_confirmation_email(
            self.repo,
            self.mail_service,
            order,
            self.contact_email,
        )
        .await
        {
            logfire::error!(
                "Failed to send confirmation email for order {order_number}: {error}",
                order_number = order.order_number.clone(),
                error = e.to_string()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{models, repo::MockAppRepo, services::MockMailService};
    use mockall::predicate::*;
    use rust_decimal_macros::dec;

    fn event(event_type: &str, object: serde_json::Value) -> StripeEvent {
        serde_json::from_value(serde_json::json!({
            "id": "evt_1",
            "type": event_type,
            "data": {"object": object},
        }))
        .unwrap()
    }

    fn succeeded_event(username: &str, save_info: bool) -> StripeEvent {
        event(
            EVENT_PAYMENT_SUCCEEDED,
            serde_json::json!({
                "id": "pi_1",
                "amount": 2750,
                "metadata": {
                    "bag": "{\"1\":2,\"2\":1}",
                    "save_info": save_info.to_string(),
                    "username": username,
                },
                "shipping": {
                    "name": "Ada Lovelace",
                    "phone": "5550100",
                    "address": {"line1": "1 Main St", "line2": "", "city": "London",
                                "state": "", "country": "GB", "postal_code": "N1 9GU"}
                },
                "charges": {"data": [{"amount": 2750,
                    "billing_details": {"email": "ada@example.com"}}]}
            }),
        )
    }

    fn product(id: i64) -> models::product::Product {
        models::product::Product {
            id,
            sku: None,
            name: format!("Product {id}"),
            description: String::new(),
            has_sizes: false,
            price: if id == 1 { dec!(10.00) } else { dec!(5.00) },
            rating: None,
            image_url: None,
            image: None,
        }
    }

    fn existing_order() -> Order {
        let mut order = Order::new(Default::default(), "{}".into(), "pi_1".into());
        order.id = 1;
        order.details.email = "ada@example.com".into();
        order
    }

    fn handler<'a>(
        repo: &'a repo::ImplAppRepo,
        mail_service: &'a services::ImplMailService,
    ) -> StripeWebhookHandler<'a> {
        StripeWebhookHandler {
            repo,
            mail_service,
            policy: DeliveryPolicy::default(),
            contact_email: "shop@example.com",
            lookup_attempts: consts::ORDER_LOOKUP_ATTEMPTS,
            lookup_delay: Duration::ZERO,
        }
    }

    fn mail_expecting(times: usize) -> services::ImplMailService {
        let mut mock_mail = MockMailService::new();
        mock_mail
            .expect_send_email()
            .withf(|to, _, body| to == "ada@example.com" && body.contains("shop@example.com"))
            .times(times)
            .returning(|_, _, _| Ok(()));
        Box::new(mock_mail)
    }

    #[ntex::test]
    async fn test_unhandled_event() {
        let repo: repo::ImplAppRepo = Box::new(MockAppRepo::new());
        let mail: services::ImplMailService = Box::new(MockMailService::new());

        let reply = handler(&repo, &mail)
            .handle_event(event("charge.refunded", serde_json::json!({})))
            .await;

        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(reply.content, "Unhandled webhook received: charge.refunded");
    }

    #[ntex::test]
    async fn test_payment_failed_event() {
        let repo: repo::ImplAppRepo = Box::new(MockAppRepo::new());
        let mail: services::ImplMailService = Box::new(MockMailService::new());

        let reply = handler(&repo, &mail)
            .handle_event(event(EVENT_PAYMENT_FAILED, serde_json::json!({"id": "pi_1"})))
            .await;

        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(reply.content, "Webhook received: payment_intent.payment_failed");
    }

    #[ntex::test]
    async fn test_succeeded_with_existing_order() {
        let mut mock_repo = MockAppRepo::new();
        mock_repo
            .expect_find_matching_order()
            .withf(|m: &OrderMatch| {
                m.stripe_pid == "pi_1"
                    && m.grand_total == dec!(27.50)
                    && m.details.street_address2.is_none()
                    && m.details.county.is_none()
                    && m.details.email == "ada@example.com"
            })
            .times(1)
            .returning(|_| Ok(Some(existing_order())));
        mock_repo
            .expect_get_order_line_details()
            .returning(|_| Ok(vec![]));
        mock_repo.expect_insert_order().never();
        let repo: repo::ImplAppRepo = Box::new(mock_repo);
        let mail = mail_expecting(1);

        let reply = handler(&repo, &mail)
            .handle_event(succeeded_event(consts::ANONYMOUS_USER, false))
            .await;

        assert_eq!(reply.status, StatusCode::OK);
        assert!(reply.content.ends_with("SUCCESS: Verified order already in database"));
    }

    #[ntex::test]
    async fn test_succeeded_creates_missing_order() {
        let mut mock_repo = MockAppRepo::new();
        mock_repo
            .expect_get_profile_by_username()
            .with(eq("ada"))
            .returning(|_| {
                Ok(Some(models::profile::UserProfile {
                    id: 4,
                    username: "ada".into(),
                    email: "ada@example.com".into(),
                    first_name: "Ada".into(),
                    last_name: "Lovelace".into(),
                    defaults: Default::default(),
                }))
            });
        mock_repo
            .expect_update_profile_defaults()
            .withf(|id, defaults| *id == 4 && defaults.default_country.as_deref() == Some("GB"))
            .times(1)
            .returning(|_, _| Ok(()));
        mock_repo
            .expect_find_matching_order()
            .times(consts::ORDER_LOOKUP_ATTEMPTS as usize)
            .returning(|_| Ok(None));
        mock_repo
            .expect_insert_order()
            .withf(|order: &Order| order.user_profile_id == Some(4) && order.stripe_pid == "pi_1")
            .times(1)
            .returning(|_| Ok(1));
        mock_repo
            .expect_get_product()
            .returning(|id| Ok(Some(product(id))));
        mock_repo
            .expect_insert_order_line_item()
            .times(2)
            .returning(|_| Ok(1));
        mock_repo
            .expect_update_order_totals()
            .withf(|order: &Order| order.grand_total == dec!(27.50))
            .returning(|_| Ok(()));
        mock_repo
            .expect_get_order_line_details()
            .returning(|_| Ok(vec![]));
        let repo: repo::ImplAppRepo = Box::new(mock_repo);
        let mail = mail_expecting(1);

        let reply = handler(&repo, &mail)
            .handle_event(succeeded_event("ada", true))
            .await;

        assert_eq!(reply.status, StatusCode::OK);
        assert!(reply.content.ends_with("SUCCESS: Created order in webhook"));
    }

    #[ntex::test]
    async fn test_succeeded_deletes_partial_order_on_failure() {
        let mut mock_repo = MockAppRepo::new();
        mock_repo.expect_find_matching_order().returning(|_| Ok(None));
        mock_repo.expect_insert_order().returning(|_| Ok(8));
        mock_repo.expect_get_product().returning(|_| Ok(None));
        mock_repo
            .expect_delete_order()
            .with(eq(8))
            .times(1)
            .returning(|_| Ok(()));
        let repo: repo::ImplAppRepo = Box::new(mock_repo);
        let mail = mail_expecting(0);

        let reply = handler(&repo, &mail)
            .handle_event(succeeded_event(consts::ANONYMOUS_USER, false))
            .await;

        assert_eq!(reply.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(reply.content.contains("| ERROR:"));
    }

    #[ntex::test]
    async fn test_succeeded_without_bag_metadata() {
        let mut mock_repo = MockAppRepo::new();
        mock_repo.expect_find_matching_order().returning(|_| Ok(None));
        mock_repo.expect_insert_order().never();
        let repo: repo::ImplAppRepo = Box::new(mock_repo);
        let mail = mail_expecting(0);

        let reply = handler(&repo, &mail)
            .handle_event(event(
                EVENT_PAYMENT_SUCCEEDED,
                serde_json::json!({"id": "pi_9", "amount": 100}),
            ))
            .await;

        assert_eq!(reply.status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_delivery_details_blank_fields_become_none() {
        let shipping: Shipping = serde_json::from_value(serde_json::json!({
            "name": "Ada",
            "phone": " ",
            "address": {"line1": "1 Main St", "line2": "", "city": "London",
                        "state": null, "country": "GB", "postal_code": ""}
        }))
        .unwrap();

        let details = delivery_details(shipping, "ada@example.com".into());

        assert_eq!(details.phone_number, "");
        assert_eq!(details.postcode, None);
        assert_eq!(details.street_address2, None);
        assert_eq!(details.county, None);
        assert_eq!(details.street_address1, "1 Main St");
    }

    #[test]
    fn test_delivery_details_match_the_posted_order_form() {
        let shipping: Shipping = serde_json::from_value(serde_json::json!({
            "name": "Smith & Jones",
            "phone": "5550100",
            "address": {"line1": "Barn & Mill", "line2": "", "city": "London",
                        "state": "", "country": "GB", "postal_code": "N1 9GU"}
        }))
        .unwrap();
        let form = crate::front::forms::order::OrderForm {
            full_name: "Smith & Jones".into(),
            email: "ada@example.com".into(),
            phone_number: "5550100".into(),
            country: "GB".into(),
            postcode: "N1 9GU".into(),
            town_or_city: "London".into(),
            street_address1: "Barn & Mill".into(),
            ..Default::default()
        };

        let from_webhook = delivery_details(shipping, "ada@example.com".into());
        let from_form = form.validate().unwrap();

        assert_eq!(from_webhook.full_name, from_form.full_name);
        assert_eq!(from_webhook.street_address1, from_form.street_address1);
        assert_eq!(from_webhook.postcode, from_form.postcode);
        assert_eq!(from_form.full_name, "Smith & Jones");
    }
}
