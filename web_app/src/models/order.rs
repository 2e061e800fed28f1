use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::bag::DeliveryPolicy;

/// Delivery contact and address of an order, as typed at checkout or
/// reported by Stripe.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeliveryDetails {
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
    pub country: String,
    pub postcode: Option<String>,
    pub town_or_city: String,
    pub street_address1: String,
    pub street_address2: Option<String>,
    pub county: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub order_number: String,
    pub user_profile_id: Option<i64>,
    #[serde(flatten)]
    pub details: DeliveryDetails,
    pub date: DateTime<Utc>,
    pub delivery_cost: Decimal,
    pub order_total: Decimal,
    pub grand_total: Decimal,
    pub original_bag: String,
    pub stripe_pid: String,
}

impl Order {
    pub fn new(details: DeliveryDetails, original_bag: String, stripe_pid: String) -> Self {
        Self {
            id: 0,
            order_number: generate_order_number(),
            user_profile_id: None,
            details,
            date: Utc::now(),
            delivery_cost: Decimal::ZERO,
            order_total: Decimal::ZERO,
            grand_total: Decimal::ZERO,
            original_bag,
            stripe_pid,
        }
    }

    /// Recomputes the totals from the order's line items.
    pub fn update_totals(&mut self, line_items: &[OrderLineItem], policy: &DeliveryPolicy) {
        self.order_total = line_items.iter().map(|item| item.lineitem_total).sum();
        self.delivery_cost = policy.delivery_for(self.order_total).0;
        self.grand_total = self.order_total + self.delivery_cost;
    }
}

/// Random, unguessable order number: 32 upper-case hex chars
pub fn generate_order_number() -> String {
    Uuid::new_v4().simple().to_string().to_uppercase()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLineItem {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub product_size: Option<String>,
    pub quantity: u32,
    pub lineitem_total: Decimal,
}

impl OrderLineItem {
    pub fn new(
        order_id: i64,
        product_id: i64,
        product_size: Option<String>,
        quantity: u32,
        unit_price: Decimal,
    ) -> Self {
        Self {
            id: 0,
            order_id,
            product_id,
            product_size,
            quantity,
            lineitem_total: unit_price * Decimal::from(quantity),
        }
    }
}

/// Line item joined with its product, for confirmation pages and emails
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderLineDetails {
    pub product_name: String,
    pub product_sku: Option<String>,
    pub product_size: Option<String>,
    pub quantity: u32,
    pub lineitem_total: Decimal,
}

/// Fields the webhook uses to recognise an order the checkout view already
/// created. Text fields compare case-insensitively.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderMatch {
    pub details: DeliveryDetails,
    pub grand_total: Decimal,
    pub original_bag: String,
    pub stripe_pid: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_order_number_format() {
        let number = generate_order_number();

        assert_eq!(number.len(), 32);
        assert!(
            number
                .chars()
                .all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c))
        );
        assert_ne!(number, generate_order_number());
    }

    #[test]
    fn test_update_totals_with_delivery() {
        let mut order = Order::new(DeliveryDetails::default(), "{}".into(), "pi_1".into());
        let items = vec![
            OrderLineItem::new(1, 10, None, 2, dec!(9.99)),
            OrderLineItem::new(1, 11, Some("m".into()), 1, dec!(5.00)),
        ];

        order.update_totals(&items, &DeliveryPolicy::default());

        assert_eq!(order.order_total, dec!(24.98));
        assert_eq!(order.delivery_cost, dec!(2.50));
        assert_eq!(order.grand_total, dec!(27.48));
    }

    #[test]
    fn test_update_totals_free_delivery() {
        let mut order = Order::new(DeliveryDetails::default(), "{}".into(), "pi_1".into());
        let items = vec![OrderLineItem::new(1, 10, None, 3, dec!(20))];

        order.update_totals(&items, &DeliveryPolicy::default());

        assert_eq!(order.delivery_cost, Decimal::ZERO);
        assert_eq!(order.grand_total, dec!(60));
    }
}
