//! # Stripe Webhook Schemas
//!
//! Subset of the Stripe event payload read by the webhook. Unknown fields
//! are ignored and most fields default, so payloads of other event types
//! still parse.

use serde::Deserialize;

/// Root webhook event
#[derive(Debug, Deserialize)]
pub struct StripeEvent {
    pub id: String,
    /// Event type, e.g. `payment_intent.succeeded`
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: EventData,
}

#[derive(Debug, Deserialize)]
pub struct EventData {
    pub object: serde_json::Value,
}

/// Payment intent carried by `payment_intent.*` events
#[derive(Debug, Default, Deserialize)]
pub struct PaymentIntentObject {
    pub id: String,
    #[serde(default)]
    pub amount: i64,
    #[serde(default)]
    pub receipt_email: Option<String>,
    #[serde(default)]
    pub metadata: IntentMetadata,
    #[serde(default)]
    pub shipping: Option<Shipping>,
    #[serde(default)]
    pub charges: Option<ChargeList>,
}

impl PaymentIntentObject {
    fn first_charge(&self) -> Option<&Charge> {
        self.charges.as_ref().and_then(|c| c.data.first())
    }

    /// Billing email of the first charge, falling back to the receipt email
    pub fn billing_email(&self) -> String {
        self.first_charge()
            .and_then(|charge| charge.billing_details.email.clone())
            .or_else(|| self.receipt_email.clone())
            .unwrap_or_default()
    }

    /// Charged amount in the smallest currency unit
    pub fn charged_amount(&self) -> i64 {
        self.first_charge()
            .map(|charge| charge.amount)
            .unwrap_or(self.amount)
    }
}

/// Metadata stored on the intent right before the card is confirmed.
/// Stripe keeps metadata values as strings.
#[derive(Debug, Default, Deserialize)]
pub struct IntentMetadata {
    #[serde(default)]
    pub bag: Option<String>,
    #[serde(default)]
    pub save_info: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

impl IntentMetadata {
    pub fn save_info(&self) -> bool {
        self.save_info
            .as_deref()
            .is_some_and(|value| value.eq_ignore_ascii_case("true"))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct Shipping {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Address,
}

#[derive(Debug, Default, Deserialize)]
pub struct Address {
    pub line1: Option<String>,
    pub line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub postal_code: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChargeList {
    #[serde(default)]
    pub data: Vec<Charge>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Charge {
    #[serde(default)]
    pub amount: i64,
    #[serde(default)]
    pub billing_details: BillingDetails,
}

#[derive(Debug, Default, Deserialize)]
pub struct BillingDetails {
    #[serde(default)]
    pub email: Option<String>,
}
